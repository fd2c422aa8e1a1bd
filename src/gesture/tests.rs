use super::*;
use crate::{
    events::{ActivationSignal, Disposition, TouchInput, TouchPhase, TouchPoint},
    geometry::{Point, Rect, ScrollOffset},
    options::FeedbackOptions,
    platform::Capabilities,
    tree::{NodeId, VisualTree},
    virtual_tree::VirtualTree,
};

const SUPPRESS_ALL: Disposition = Disposition::Suppress { immediate: true };
const SUPPRESS_TOUCH: Disposition = Disposition::Suppress { immediate: false };

fn touch(phase: TouchPhase, t_ms: u64, x: f64, y: f64) -> TouchInput {
    TouchInput::single(phase, t_ms, TouchPoint::new(Point::new(x, y), Point::new(x, y)))
}

fn scrolled_touch(phase: TouchPhase, t_ms: u64, client: Point, scroll: ScrollOffset) -> TouchInput {
    TouchInput::single(phase, t_ms, TouchPoint::new(client + scroll, client))
}

fn native(cancelable: bool) -> ActivationSignal {
    native_at(300, cancelable)
}

fn native_at(t_ms: u64, cancelable: bool) -> ActivationSignal {
    ActivationSignal::Native { t_ms, cancelable }
}

fn page_with(tag: &str) -> (VirtualTree, NodeId) {
    let mut tree = VirtualTree::new();
    let body = tree.root();
    let node = tree.append_element(body, tag, Rect::new(50.0, 150.0, 200.0, 100.0));
    (tree, node)
}

fn tap(engine: &mut GestureEngine, tree: &mut VirtualTree, x: f64, y: f64) -> Disposition {
    engine.touch_start(tree, &touch(TouchPhase::Start, 0, x, y));
    engine.touch_end(tree, &touch(TouchPhase::End, 90, x, y))
}

#[test]
fn plain_tap_dispatches_once_and_kills_native_duplicate() {
    let (mut tree, div) = page_with("div");
    let mut engine = GestureEngine::new(Capabilities::default(), None);

    assert_eq!(
        engine.touch_start(&mut tree, &touch(TouchPhase::Start, 0, 100.0, 200.0)),
        Disposition::Continue
    );
    assert!(engine.is_tracking());
    let end = engine.touch_end(&mut tree, &touch(TouchPhase::End, 80, 100.0, 200.0));

    assert_eq!(end, SUPPRESS_TOUCH);
    assert!(!engine.is_tracking());
    let dispatched = tree.take_dispatched();
    assert_eq!(dispatched.len(), 1);
    assert_eq!(dispatched[0].target, div);
    assert_eq!(dispatched[0].client, Point::new(100.0, 200.0));
    assert_eq!(dispatched[0].detail, 1);
    assert!(dispatched[0].bubbles && dispatched[0].cancelable);

    let forwarded = ActivationSignal::Forwarded(dispatched[0]);
    assert_eq!(engine.activation(&tree, &forwarded), Disposition::Continue);
    let duplicate = engine.activation(&tree, &native(true));
    assert_eq!(duplicate, SUPPRESS_ALL);
    assert!(duplicate.stops_immediate_propagation());
    assert_eq!(
        engine.last_trace(),
        TapTrace {
            t_ms: 80,
            target: Some(div),
            decision: TapDecision::Synthesized,
        }
    );
}

#[test]
fn movement_beyond_tolerance_invalidates_tracking() {
    let (mut tree, _) = page_with("div");
    let mut engine = GestureEngine::new(Capabilities::default(), None);

    engine.touch_start(&mut tree, &touch(TouchPhase::Start, 0, 100.0, 200.0));
    engine.touch_move(&mut tree, &touch(TouchPhase::Move, 20, 150.0, 200.0));

    assert!(!engine.is_tracking());
    assert_eq!(
        engine.last_trace().decision,
        TapDecision::Invalidated(Invalidation {
            moved: true,
            scrolled: false,
        })
    );
    assert_eq!(
        engine.touch_end(&mut tree, &touch(TouchPhase::End, 60, 150.0, 200.0)),
        Disposition::Continue
    );
    assert!(tree.dispatched().is_empty());
    assert_eq!(engine.activation(&tree, &native(true)), SUPPRESS_ALL);
}

#[test]
fn moved_tap_on_native_element_lets_native_activation_through() {
    let (mut tree, video) = page_with("video");
    let mut engine = GestureEngine::new(Capabilities::default(), None);

    engine.touch_start(&mut tree, &touch(TouchPhase::Start, 0, 100.0, 200.0));
    engine.touch_move(&mut tree, &touch(TouchPhase::Move, 20, 100.0, 240.0));
    engine.touch_end(&mut tree, &touch(TouchPhase::End, 60, 100.0, 240.0));

    assert!(tree.dispatched().is_empty());
    assert!(tree.contains(video));
    assert_eq!(engine.activation(&tree, &native(true)), Disposition::Continue);
}

#[test]
fn movement_on_the_tolerance_boundary_keeps_tracking() {
    let (mut tree, _) = page_with("div");
    let mut engine = GestureEngine::new(Capabilities::default(), None);

    engine.touch_start(&mut tree, &touch(TouchPhase::Start, 0, 100.0, 200.0));
    engine.touch_move(&mut tree, &touch(TouchPhase::Move, 10, 137.0, 200.0));
    assert!(engine.is_tracking());

    engine.touch_move(&mut tree, &touch(TouchPhase::Move, 20, 137.5, 200.0));
    assert!(!engine.is_tracking());
}

#[test]
fn scrolling_past_the_boundary_invalidates_independently() {
    let (mut tree, _) = page_with("div");
    let mut engine = GestureEngine::new(Capabilities::default(), None);
    let client = Point::new(100.0, 200.0);

    engine.touch_start(&mut tree, &touch(TouchPhase::Start, 0, client.x, client.y));
    tree.set_scroll(ScrollOffset::new(0.0, 6.0));
    engine.touch_move(
        &mut tree,
        &scrolled_touch(TouchPhase::Move, 30, client, ScrollOffset::new(0.0, 6.0)),
    );

    assert_eq!(
        engine.last_trace().decision,
        TapDecision::Invalidated(Invalidation {
            moved: false,
            scrolled: true,
        })
    );
}

#[test]
fn movement_and_scroll_are_both_reported() {
    let (mut tree, _) = page_with("div");
    let mut engine = GestureEngine::new(Capabilities::default(), None);

    engine.touch_start(&mut tree, &touch(TouchPhase::Start, 0, 100.0, 200.0));
    tree.set_scroll(ScrollOffset::new(10.0, 0.0));
    engine.touch_move(&mut tree, &touch(TouchPhase::Move, 30, 100.0, 260.0));

    assert_eq!(
        engine.last_trace().decision,
        TapDecision::Invalidated(Invalidation {
            moved: true,
            scrolled: true,
        })
    );
}

#[test]
fn wide_boundary_platform_tolerates_small_scrolls() {
    let (mut tree, _) = page_with("div");
    let caps = Capabilities {
        wide_scroll_boundary: true,
        ..Capabilities::default()
    };
    let mut engine = GestureEngine::new(caps, None);
    let client = Point::new(100.0, 200.0);

    engine.touch_start(&mut tree, &touch(TouchPhase::Start, 0, client.x, client.y));
    let small = ScrollOffset::new(0.0, 12.0);
    tree.set_scroll(small);
    engine.touch_move(&mut tree, &scrolled_touch(TouchPhase::Move, 20, client, small));
    assert!(engine.is_tracking());

    let large = ScrollOffset::new(0.0, 21.0);
    tree.set_scroll(large);
    engine.touch_move(&mut tree, &scrolled_touch(TouchPhase::Move, 40, client, large));
    assert!(!engine.is_tracking());
}

#[test]
fn repeated_end_and_cancel_have_no_further_effect() {
    let (mut tree, _) = page_with("div");
    let mut engine = GestureEngine::new(Capabilities::default(), None);

    tap(&mut engine, &mut tree, 100.0, 200.0);
    let trace = engine.last_trace();
    assert_eq!(tree.take_dispatched().len(), 1);

    assert_eq!(
        engine.touch_end(&mut tree, &touch(TouchPhase::End, 120, 100.0, 200.0)),
        Disposition::Continue
    );
    assert_eq!(
        engine.touch_cancel(&mut tree, &touch(TouchPhase::Cancel, 130, 100.0, 200.0)),
        Disposition::Continue
    );
    assert!(tree.dispatched().is_empty());
    assert_eq!(engine.last_trace().decision, TapDecision::Ignored);
    assert_eq!(engine.session().origin, Point::new(100.0, 200.0));
    assert_ne!(engine.last_trace(), trace);
}

#[test]
fn cancel_stops_tracking_without_synthesizing() {
    let (mut tree, _) = page_with("div");
    let mut engine = GestureEngine::new(Capabilities::default(), None);

    engine.touch_start(&mut tree, &touch(TouchPhase::Start, 0, 100.0, 200.0));
    engine.touch_cancel(&mut tree, &touch(TouchPhase::Cancel, 40, 100.0, 200.0));
    engine.touch_end(&mut tree, &touch(TouchPhase::End, 50, 100.0, 200.0));

    assert!(!engine.is_tracking());
    assert!(tree.dispatched().is_empty());
}

#[test]
fn checkbox_takes_the_synthesized_path() {
    let (mut tree, checkbox) = page_with("input");
    tree.set_attribute(checkbox, "type", "checkbox");
    let mut engine = GestureEngine::new(Capabilities::default(), None);

    assert_eq!(tap(&mut engine, &mut tree, 100.0, 200.0), SUPPRESS_TOUCH);
    assert_eq!(tree.dispatched().len(), 1);
    assert_eq!(tree.focused(), None);
}

#[test]
fn textarea_is_focused_and_native_activation_suppressed() {
    let (mut tree, textarea) = page_with("textarea");
    let mut engine = GestureEngine::new(Capabilities::default(), None);

    assert_eq!(tap(&mut engine, &mut tree, 100.0, 200.0), Disposition::Handled);
    assert_eq!(tree.focused(), Some(textarea));
    assert!(tree.dispatched().is_empty());
    assert_eq!(
        engine.last_trace().decision,
        TapDecision::Focused {
            native_passthrough: false,
        }
    );
    assert_eq!(engine.activation(&tree, &native(true)), SUPPRESS_ALL);
}

#[test]
fn select_is_focused_and_native_activation_allowed() {
    let (mut tree, select) = page_with("select");
    let mut engine = GestureEngine::new(Capabilities::default(), None);

    assert_eq!(tap(&mut engine, &mut tree, 100.0, 200.0), Disposition::Handled);
    assert_eq!(tree.focused(), Some(select));
    assert!(tree.dispatched().is_empty());
    assert_eq!(engine.activation(&tree, &native(true)), Disposition::Continue);
    // The verdict is spent; a second native activation falls back to
    // resolving the last origin.
    assert_eq!(engine.activation(&tree, &native(true)), SUPPRESS_ALL);
}

#[test]
fn native_elements_are_left_to_the_platform() {
    let (mut tree, div) = page_with("div");
    tree.add_class(div, "needsclick");
    let mut engine = GestureEngine::new(Capabilities::default(), None);

    assert_eq!(tap(&mut engine, &mut tree, 100.0, 200.0), Disposition::Handled);
    assert!(tree.dispatched().is_empty());
    assert_eq!(engine.last_trace().decision, TapDecision::NativePassThrough);
    assert_eq!(engine.activation(&tree, &native(true)), Disposition::Continue);
}

#[test]
fn forwarded_and_programmatic_activations_always_pass() {
    let (tree, div) = page_with("div");
    let mut engine = GestureEngine::new(Capabilities::default(), None);
    let own = crate::events::SyntheticActivation::at(div, Point::default(), Point::default());

    assert_eq!(
        engine.activation(&tree, &ActivationSignal::Forwarded(own)),
        Disposition::Continue
    );
    assert_eq!(engine.activation(&tree, &native(false)), Disposition::Continue);
}

#[test]
fn programmatic_activation_does_not_spend_the_verdict() {
    let (mut tree, _) = page_with("div");
    let mut engine = GestureEngine::new(Capabilities::default(), None);

    tap(&mut engine, &mut tree, 100.0, 200.0);
    assert_eq!(engine.activation(&tree, &native(false)), Disposition::Continue);
    assert_eq!(engine.activation(&tree, &native(true)), SUPPRESS_ALL);
}

#[test]
fn tap_on_empty_area_is_dropped_and_native_suppressed() {
    let (mut tree, _) = page_with("div");
    let mut engine = GestureEngine::new(Capabilities::default(), None);

    assert_eq!(tap(&mut engine, &mut tree, 400.0, 400.0), Disposition::Handled);
    assert!(tree.dispatched().is_empty());
    assert_eq!(engine.last_trace().decision, TapDecision::NoTarget);
    assert_eq!(engine.activation(&tree, &native(true)), SUPPRESS_ALL);
}

#[test]
fn element_removed_before_release_counts_as_no_target() {
    let (mut tree, div) = page_with("div");
    let mut engine = GestureEngine::new(Capabilities::default(), None);

    engine.touch_start(&mut tree, &touch(TouchPhase::Start, 0, 100.0, 200.0));
    tree.detach(div);
    engine.touch_end(&mut tree, &touch(TouchPhase::End, 50, 100.0, 200.0));

    assert_eq!(engine.last_trace().decision, TapDecision::NoTarget);
    assert!(tree.dispatched().is_empty());
}

#[test]
fn label_with_control_forwards_to_the_control() {
    let mut tree = VirtualTree::new();
    let body = tree.root();
    let label = tree.append_element(body, "label", Rect::new(0.0, 0.0, 100.0, 30.0));
    let checkbox = tree.append_element(body, "input", Rect::new(0.0, 40.0, 20.0, 20.0));
    tree.set_attribute(checkbox, "type", "checkbox");
    tree.set_label_for(label, checkbox);
    let mut engine = GestureEngine::new(Capabilities::default(), None);

    assert_eq!(tap(&mut engine, &mut tree, 10.0, 10.0), SUPPRESS_TOUCH);
    assert_eq!(tree.focused(), Some(label));
    let dispatched = tree.take_dispatched();
    assert_eq!(dispatched.len(), 1);
    assert_eq!(dispatched[0].target, checkbox);
    assert_eq!(engine.last_trace().decision, TapDecision::LabelForwarded);
    assert_eq!(engine.activation(&tree, &native(true)), SUPPRESS_ALL);
}

#[test]
fn stale_release_verdict_does_not_block_later_activations() {
    let mut tree = VirtualTree::new();
    let body = tree.root();
    let label = tree.append_element(body, "label", Rect::new(0.0, 0.0, 100.0, 30.0));
    let checkbox = tree.append_element(body, "input", Rect::new(0.0, 40.0, 20.0, 20.0));
    tree.set_attribute(checkbox, "type", "checkbox");
    tree.set_label_for(label, checkbox);
    let mut engine = GestureEngine::new(Capabilities::default(), None);

    assert_eq!(tap(&mut engine, &mut tree, 10.0, 10.0), SUPPRESS_TOUCH);
    tree.take_dispatched();

    // No delayed duplicate came; a keyboard activation of the label much
    // later resolves at the origin, where the label needs native handling.
    assert_eq!(
        engine.activation(&tree, &native_at(5_000, true)),
        Disposition::Continue
    );
}

#[test]
fn release_verdict_holds_through_the_window_edge() {
    let (mut tree, _) = page_with("select");
    let mut engine = GestureEngine::new(Capabilities::default(), None);

    tap(&mut engine, &mut tree, 100.0, 200.0);
    assert_eq!(
        engine.activation(&tree, &native_at(90 + 1_000, true)),
        Disposition::Continue
    );
}

#[test]
fn label_on_android_keeps_native_activation() {
    let mut tree = VirtualTree::new();
    let body = tree.root();
    let label = tree.append_element(body, "label", Rect::new(0.0, 0.0, 100.0, 30.0));
    let field = tree.append_element(body, "input", Rect::new(0.0, 40.0, 100.0, 20.0));
    tree.set_label_for(label, field);
    let caps = Capabilities {
        android: true,
        ..Capabilities::default()
    };
    let mut engine = GestureEngine::new(caps, None);

    assert_eq!(tap(&mut engine, &mut tree, 10.0, 10.0), Disposition::Handled);
    assert_eq!(tree.focused(), Some(label));
    assert!(tree.dispatched().is_empty());
    assert_eq!(engine.last_trace().decision, TapDecision::LabelNative);
    assert_eq!(engine.activation(&tree, &native(true)), Disposition::Continue);
}

#[test]
fn label_without_control_is_native() {
    let (mut tree, _) = page_with("label");
    let mut engine = GestureEngine::new(Capabilities::default(), None);

    assert_eq!(tap(&mut engine, &mut tree, 100.0, 200.0), Disposition::Handled);
    assert_eq!(engine.last_trace().decision, TapDecision::NativePassThrough);
    assert_eq!(tree.focused(), None);
}

#[test]
fn text_leaf_hit_synthesizes_on_its_parent() {
    let (mut tree, div) = page_with("div");
    tree.append_text(div, Rect::new(60.0, 160.0, 100.0, 20.0));
    let mut engine = GestureEngine::new(Capabilities::default(), None);

    tap(&mut engine, &mut tree, 70.0, 170.0);

    assert_eq!(tree.dispatched()[0].target, div);
}

#[test]
fn touch_start_while_tracking_restarts_at_the_new_origin() {
    let (mut tree, _) = page_with("div");
    let mut engine = GestureEngine::new(Capabilities::default(), None);

    engine.touch_start(&mut tree, &touch(TouchPhase::Start, 0, 100.0, 200.0));
    engine.touch_start(&mut tree, &touch(TouchPhase::Start, 15, 200.0, 220.0));

    assert!(engine.is_tracking());
    assert_eq!(engine.session().origin, Point::new(200.0, 220.0));
    assert_eq!(engine.last_trace().decision, TapDecision::Restarted);
}

#[test]
fn page_coordinates_missing_scroll_are_corrected_on_start() {
    let mut tree = VirtualTree::new();
    let body = tree.root();
    let row = tree.append_element(body, "div", Rect::new(0.0, 1_000.0, 300.0, 50.0));
    tree.set_scroll(ScrollOffset::new(0.0, 980.0));
    let mut engine = GestureEngine::new(Capabilities::default(), None);

    // page == client: the platform left the scroll offset out.
    engine.touch_start(&mut tree, &touch(TouchPhase::Start, 0, 20.0, 30.0));
    assert_eq!(engine.session().origin, Point::new(20.0, 1_010.0));
    assert_eq!(engine.session().scroll_origin, ScrollOffset::new(0.0, 980.0));
    assert_eq!(engine.session().target_hint, Some(row));

    engine.touch_end(&mut tree, &touch(TouchPhase::End, 60, 20.0, 30.0));
    let dispatched = tree.take_dispatched();
    assert_eq!(dispatched[0].target, row);
    assert_eq!(dispatched[0].client, Point::new(20.0, 30.0));
}

#[test]
fn page_coordinates_missing_scroll_are_corrected_on_move() {
    let mut tree = VirtualTree::new();
    let body = tree.root();
    let row = tree.append_element(body, "div", Rect::new(0.0, 1_000.0, 300.0, 50.0));
    tree.set_scroll(ScrollOffset::new(0.0, 980.0));
    let mut engine = GestureEngine::new(Capabilities::default(), None);

    engine.touch_start(&mut tree, &touch(TouchPhase::Start, 0, 20.0, 30.0));
    engine.touch_move(&mut tree, &touch(TouchPhase::Move, 20, 20.0, 30.0));
    assert!(engine.is_tracking());
    assert_eq!(engine.last_trace().decision, TapDecision::Tracking);

    engine.touch_move(&mut tree, &touch(TouchPhase::Move, 30, 24.0, 33.0));
    assert!(engine.is_tracking());

    assert_eq!(
        engine.touch_end(&mut tree, &touch(TouchPhase::End, 60, 24.0, 33.0)),
        SUPPRESS_TOUCH
    );
    let dispatched = tree.take_dispatched();
    assert_eq!(dispatched.len(), 1);
    assert_eq!(dispatched[0].target, row);
}

#[test]
fn platform_without_stop_immediate_degrades_suppression() {
    let (mut tree, _) = page_with("div");
    let caps = Capabilities {
        stop_immediate_propagation: false,
        ..Capabilities::default()
    };
    let mut engine = GestureEngine::new(caps, None);

    tap(&mut engine, &mut tree, 100.0, 200.0);
    let disposition = engine.activation(&tree, &native(true));
    assert_eq!(disposition, Disposition::Suppress { immediate: false });
    assert!(disposition.prevents_default() && disposition.stops_propagation());
    assert!(!disposition.stops_immediate_propagation());
}

#[test]
fn touches_without_points_are_ignored() {
    let (mut tree, _) = page_with("div");
    let mut engine = GestureEngine::new(Capabilities::default(), None);
    let empty = TouchInput::new(TouchPhase::Start, 0, Vec::new());

    assert_eq!(engine.touch_start(&mut tree, &empty), Disposition::Continue);
    assert!(!engine.is_tracking());
}

#[cfg(feature = "feedback")]
mod feedback {
    use super::*;

    fn markers(delay_ms: u64) -> Option<FeedbackOptions> {
        Some(FeedbackOptions {
            start_marker_class: "pressed".to_string(),
            end_marker_class: Some("released".to_string()),
            delay_ms,
        })
    }

    #[test]
    fn markers_follow_a_completed_tap() {
        let (mut tree, div) = page_with("div");
        let mut engine = GestureEngine::new(Capabilities::default(), markers(0));

        engine.touch_start(&mut tree, &touch(TouchPhase::Start, 0, 100.0, 200.0));
        assert!(tree.has_class(div, "pressed"));

        engine.touch_end(&mut tree, &touch(TouchPhase::End, 70, 100.0, 200.0));
        assert!(!tree.has_class(div, "pressed"));
        assert!(tree.has_class(div, "released"));
    }

    #[test]
    fn deferred_marker_is_cancelled_by_invalidation() {
        let (mut tree, div) = page_with("div");
        let mut engine = GestureEngine::new(Capabilities::default(), markers(100));

        engine.touch_start(&mut tree, &touch(TouchPhase::Start, 1_000, 100.0, 200.0));
        assert_eq!(engine.next_deadline_ms(), Some(1_100));

        engine.touch_move(&mut tree, &touch(TouchPhase::Move, 1_050, 180.0, 200.0));
        assert_eq!(engine.next_deadline_ms(), None);
        assert!(!engine.tick(&mut tree, 1_200));
        assert!(tree.class_list(div).is_empty());
    }

    #[test]
    fn deferred_marker_lands_when_tracking_outlives_the_delay() {
        let (mut tree, div) = page_with("div");
        let mut engine = GestureEngine::new(Capabilities::default(), markers(100));

        engine.touch_start(&mut tree, &touch(TouchPhase::Start, 1_000, 100.0, 200.0));
        assert!(engine.tick(&mut tree, 1_100));
        assert!(tree.has_class(div, "pressed"));

        engine.touch_cancel(&mut tree, &touch(TouchPhase::Cancel, 1_300, 100.0, 200.0));
        assert!(tree.has_class(div, "released"));
        assert!(!tree.has_class(div, "pressed"));
    }

    #[test]
    fn restart_finalizes_the_previous_target() {
        let mut tree = VirtualTree::new();
        let body = tree.root();
        let first = tree.append_element(body, "div", Rect::new(0.0, 0.0, 50.0, 50.0));
        let second = tree.append_element(body, "div", Rect::new(100.0, 0.0, 50.0, 50.0));
        let mut engine = GestureEngine::new(Capabilities::default(), markers(0));

        engine.touch_start(&mut tree, &touch(TouchPhase::Start, 0, 10.0, 10.0));
        engine.touch_start(&mut tree, &touch(TouchPhase::Start, 10, 110.0, 10.0));

        assert!(tree.has_class(first, "released"));
        assert!(!tree.has_class(first, "pressed"));
        assert!(tree.has_class(second, "pressed"));
    }
}
