use log::{debug, trace, warn};
use statig::blocking::IntoStateMachineExt as _;

mod hsm;
mod tap;

use hsm::GestureHsm;
use tap::{TapRules, Verdict};

#[cfg(feature = "feedback")]
use crate::feedback::FeedbackController;
use crate::{
    classify::Classifier,
    config::{active_config, TapConfig},
    events::{ActivationSignal, Disposition, TouchInput, TouchPoint},
    geometry::{Point, ScrollOffset},
    gesture::trace::{Invalidation, TapDecision, TapTrace},
    options::FeedbackOptions,
    platform::Capabilities,
    resolve::Resolver,
    tree::{NodeId, VisualTree},
};

/// The one tracked touch sequence of a bound region.
///
/// `origin` is in page coordinates. Fields other than `active` keep their
/// values after the session ends; the activation listener resolves against
/// the last origin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GestureSession {
    pub active: bool,
    pub origin: Point,
    pub scroll_origin: ScrollOffset,
    pub target_hint: Option<NodeId>,
}

#[derive(Clone, Copy, Debug)]
struct StartSample {
    origin: Point,
    scroll: ScrollOffset,
    target_hint: Option<NodeId>,
}

#[derive(Clone, Copy, Debug)]
enum GestureEvent {
    Start(StartSample),
    Move { at: Point, scroll: ScrollOffset },
    End,
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum SessionAction {
    Began { restarted: bool },
    Invalidated(Invalidation),
    Released(GestureSession),
    Cancelled,
    Ignored,
}

#[derive(Default)]
struct DispatchContext {
    actions: heapless::Vec<SessionAction, 2>,
}

impl DispatchContext {
    fn emit(&mut self, action: SessionAction) {
        let _ = self.actions.push(action);
    }

    fn finish(self) -> heapless::Vec<SessionAction, 2> {
        self.actions
    }
}

/// How long after a release its verdict still applies to a native
/// activation. The platform's delayed activation lands well inside it; a
/// later one (keyboard, assistive tech) resolves at the origin instead.
const VERDICT_WINDOW_MS: u64 = 1_000;

pub struct GestureEngine {
    machine: statig::blocking::StateMachine<GestureHsm>,
    caps: Capabilities,
    resolver: Resolver,
    classifier: Classifier,
    #[cfg(feature = "feedback")]
    feedback: Option<FeedbackController>,
    verdict: Option<(Verdict, u64)>,
    last_trace: TapTrace,
}

impl GestureEngine {
    pub fn new(caps: Capabilities, feedback: Option<FeedbackOptions>) -> Self {
        Self::with_config(active_config(), caps, feedback)
    }

    pub fn with_config(
        config: &'static TapConfig,
        caps: Capabilities,
        feedback: Option<FeedbackOptions>,
    ) -> Self {
        if feedback.is_some() && !cfg!(feature = "feedback") {
            warn!("feedback options ignored: built without the `feedback` feature");
        }
        #[cfg(not(feature = "feedback"))]
        let _ = feedback;

        let scroll_boundary_px = caps.scroll_boundary_px(&config.gesture);
        Self {
            machine: GestureHsm::new(&config.gesture, scroll_boundary_px).state_machine(),
            caps,
            resolver: Resolver::new(caps),
            classifier: Classifier::new(&config.classify),
            #[cfg(feature = "feedback")]
            feedback: feedback.map(FeedbackController::new),
            verdict: None,
            last_trace: TapTrace::default(),
        }
    }

    pub fn touch_start<T: VisualTree + ?Sized>(
        &mut self,
        tree: &mut T,
        input: &TouchInput,
    ) -> Disposition {
        let Some(touch) = input.primary() else {
            return Disposition::Continue;
        };
        let scroll = tree.scroll_offset();
        let origin = page_point(touch, scroll);
        self.verdict = None;
        let target_hint = self.resolver.resolve_element_at(tree, origin - scroll);

        self.dispatch(
            tree,
            GestureEvent::Start(StartSample {
                origin,
                scroll,
                target_hint,
            }),
            input,
        )
    }

    pub fn touch_move<T: VisualTree + ?Sized>(
        &mut self,
        tree: &mut T,
        input: &TouchInput,
    ) -> Disposition {
        let Some(touch) = input.primary() else {
            return Disposition::Continue;
        };
        let scroll = tree.scroll_offset();
        let event = GestureEvent::Move {
            at: page_point(touch, scroll),
            scroll,
        };
        self.dispatch(tree, event, input)
    }

    pub fn touch_end<T: VisualTree + ?Sized>(
        &mut self,
        tree: &mut T,
        input: &TouchInput,
    ) -> Disposition {
        self.dispatch(tree, GestureEvent::End, input)
    }

    pub fn touch_cancel<T: VisualTree + ?Sized>(
        &mut self,
        tree: &mut T,
        input: &TouchInput,
    ) -> Disposition {
        let disposition = self.dispatch(tree, GestureEvent::Cancel, input);
        self.finalize_feedback(tree);
        disposition
    }

    pub fn activation<T: VisualTree + ?Sized>(
        &mut self,
        tree: &T,
        signal: &ActivationSignal,
    ) -> Disposition {
        let verdict = match signal {
            ActivationSignal::Native {
                t_ms,
                cancelable: true,
            } => self.verdict.take().and_then(|(verdict, released_ms)| {
                let age_ms = t_ms.saturating_sub(released_ms);
                if age_ms > VERDICT_WINDOW_MS {
                    trace!("release verdict expired after {age_ms}ms");
                    return None;
                }
                Some(verdict)
            }),
            _ => None,
        };
        let disposition = self
            .rules()
            .activation(tree, &self.session(), signal, verdict);
        debug!(
            "activation forwarded={} -> {disposition:?}",
            signal.is_forwarded()
        );
        disposition
    }

    /// Applies a due deferred feedback marker. Returns whether anything
    /// changed.
    #[cfg(feature = "feedback")]
    pub fn tick<T: VisualTree + ?Sized>(&mut self, tree: &mut T, now_ms: u64) -> bool {
        self.feedback
            .as_mut()
            .is_some_and(|feedback| feedback.poll(tree, now_ms))
    }

    #[cfg(not(feature = "feedback"))]
    pub fn tick<T: VisualTree + ?Sized>(&mut self, _tree: &mut T, _now_ms: u64) -> bool {
        false
    }

    #[cfg(feature = "feedback")]
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.feedback
            .as_ref()
            .and_then(FeedbackController::next_deadline_ms)
    }

    #[cfg(not(feature = "feedback"))]
    pub fn next_deadline_ms(&self) -> Option<u64> {
        None
    }

    pub fn session(&self) -> GestureSession {
        self.machine.inner().session
    }

    pub fn is_tracking(&self) -> bool {
        self.session().active
    }

    pub fn last_trace(&self) -> TapTrace {
        self.last_trace
    }

    fn rules(&self) -> TapRules<'_> {
        TapRules {
            caps: &self.caps,
            resolver: &self.resolver,
            classifier: &self.classifier,
        }
    }

    fn dispatch<T: VisualTree + ?Sized>(
        &mut self,
        tree: &mut T,
        event: GestureEvent,
        input: &TouchInput,
    ) -> Disposition {
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&event, &mut context);

        let mut disposition = Disposition::Continue;
        for action in context.finish() {
            disposition = self.apply(tree, action, input);
        }
        disposition
    }

    fn apply<T: VisualTree + ?Sized>(
        &mut self,
        tree: &mut T,
        action: SessionAction,
        input: &TouchInput,
    ) -> Disposition {
        let t_ms = input.t_ms;
        match action {
            SessionAction::Began { restarted } => {
                if restarted {
                    self.finalize_feedback(tree);
                }
                let target_hint = self.session().target_hint;
                self.begin_feedback(tree, target_hint, t_ms);
                let decision = if restarted {
                    TapDecision::Restarted
                } else {
                    TapDecision::Tracking
                };
                self.record(t_ms, target_hint, decision);
                Disposition::Continue
            }
            SessionAction::Invalidated(invalidation) => {
                trace!(
                    "session invalidated moved={} scrolled={}",
                    invalidation.moved,
                    invalidation.scrolled
                );
                self.finalize_feedback(tree);
                self.record(t_ms, None, TapDecision::Invalidated(invalidation));
                Disposition::Continue
            }
            SessionAction::Released(session) => {
                self.finalize_feedback(tree);
                let outcome = self.rules().release(tree, &session, input.primary());
                debug!(
                    "tap released: {:?} target={:?} -> {:?}",
                    outcome.decision, outcome.target, outcome.disposition
                );
                self.verdict = Some((outcome.verdict, t_ms));
                self.record(t_ms, outcome.target, outcome.decision);
                outcome.disposition
            }
            SessionAction::Cancelled => {
                self.finalize_feedback(tree);
                self.record(t_ms, None, TapDecision::Cancelled);
                Disposition::Continue
            }
            SessionAction::Ignored => {
                self.record(t_ms, None, TapDecision::Ignored);
                Disposition::Continue
            }
        }
    }

    fn record(&mut self, t_ms: u64, target: Option<NodeId>, decision: TapDecision) {
        self.last_trace = TapTrace {
            t_ms,
            target,
            decision,
        };
    }

    #[cfg(feature = "feedback")]
    fn begin_feedback<T: VisualTree + ?Sized>(
        &mut self,
        tree: &mut T,
        target: Option<NodeId>,
        t_ms: u64,
    ) {
        if let Some(feedback) = self.feedback.as_mut() {
            feedback.begin(tree, target, t_ms);
        }
    }

    #[cfg(not(feature = "feedback"))]
    fn begin_feedback<T: VisualTree + ?Sized>(
        &mut self,
        _tree: &mut T,
        _target: Option<NodeId>,
        _t_ms: u64,
    ) {
    }

    #[cfg(feature = "feedback")]
    fn finalize_feedback<T: VisualTree + ?Sized>(&mut self, tree: &mut T) {
        if let Some(feedback) = self.feedback.as_mut() {
            feedback.finalize(tree);
        }
    }

    #[cfg(not(feature = "feedback"))]
    fn finalize_feedback<T: VisualTree + ?Sized>(&mut self, _tree: &mut T) {}
}

// Some platforms report page coordinates without the scroll offset; when a
// page axis equals its client axis the offset is added back.
fn page_point(touch: &TouchPoint, scroll: ScrollOffset) -> Point {
    let mut at = touch.page;
    if touch.page.x == touch.client.x {
        at.x += scroll.x;
    }
    if touch.page.y == touch.client.y {
        at.y += scroll.y;
    }
    at
}
