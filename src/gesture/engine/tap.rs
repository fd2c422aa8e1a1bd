use super::GestureSession;
use crate::{
    classify::Classifier,
    events::{ActivationSignal, Disposition, SyntheticActivation, TouchPoint},
    geometry::Point,
    gesture::trace::TapDecision,
    platform::Capabilities,
    resolve::Resolver,
    tree::{NodeId, VisualTree},
};

/// What the next cancelable native activation gets, decided on release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Verdict {
    Allow,
    Suppress,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct ReleaseOutcome {
    pub decision: TapDecision,
    pub target: Option<NodeId>,
    pub disposition: Disposition,
    pub verdict: Verdict,
}

impl ReleaseOutcome {
    fn new(
        decision: TapDecision,
        target: Option<NodeId>,
        disposition: Disposition,
        verdict: Verdict,
    ) -> Self {
        Self {
            decision,
            target,
            disposition,
            verdict,
        }
    }
}

pub(super) struct TapRules<'a> {
    pub caps: &'a Capabilities,
    pub resolver: &'a Resolver,
    pub classifier: &'a Classifier,
}

impl TapRules<'_> {
    /// Decides what a completed tap does. Labels with a control come first,
    /// then native elements, then focus targets; anything else gets a
    /// forwarded activation.
    pub fn release<T: VisualTree + ?Sized>(
        &self,
        tree: &mut T,
        session: &GestureSession,
        end_touch: Option<&TouchPoint>,
    ) -> ReleaseOutcome {
        let client = last_client_point(session);
        let Some(target) = self.resolver.resolve_element_at(tree, client) else {
            return ReleaseOutcome::new(
                TapDecision::NoTarget,
                None,
                Disposition::Handled,
                Verdict::Suppress,
            );
        };
        let screen = end_touch.map_or(client, |touch| touch.screen);
        let forwarded = Disposition::Suppress { immediate: false };

        if tree.tag_name(target).as_deref() == Some("label") {
            if let Some(control) = tree.label_control(target) {
                tree.focus(target);
                if self.caps.android || self.classifier.needs_native_activation(tree, control) {
                    return ReleaseOutcome::new(
                        TapDecision::LabelNative,
                        Some(target),
                        Disposition::Handled,
                        Verdict::Allow,
                    );
                }
                tree.dispatch_activation(SyntheticActivation::at(control, client, screen));
                return ReleaseOutcome::new(
                    TapDecision::LabelForwarded,
                    Some(control),
                    forwarded,
                    Verdict::Suppress,
                );
            }
        }

        if self.classifier.needs_native_activation(tree, target) {
            return ReleaseOutcome::new(
                TapDecision::NativePassThrough,
                Some(target),
                Disposition::Handled,
                Verdict::Allow,
            );
        }

        if self.classifier.needs_explicit_focus(tree, target) {
            tree.focus(target);
            let native_passthrough = self.classifier.allows_native_after_focus(tree, target);
            return ReleaseOutcome::new(
                TapDecision::Focused { native_passthrough },
                Some(target),
                Disposition::Handled,
                if native_passthrough {
                    Verdict::Allow
                } else {
                    Verdict::Suppress
                },
            );
        }

        tree.dispatch_activation(SyntheticActivation::at(target, client, screen));
        ReleaseOutcome::new(
            TapDecision::Synthesized,
            Some(target),
            forwarded,
            Verdict::Suppress,
        )
    }

    /// Disposition for an activation arriving at the region. `verdict` is
    /// the release verdict the caller took for a cancelable native
    /// activation.
    pub fn activation<T: VisualTree + ?Sized>(
        &self,
        tree: &T,
        session: &GestureSession,
        signal: &ActivationSignal,
        verdict: Option<Verdict>,
    ) -> Disposition {
        let cancelable = match signal {
            ActivationSignal::Forwarded(_) => return Disposition::Continue,
            ActivationSignal::Native { cancelable, .. } => *cancelable,
        };
        if !cancelable {
            return Disposition::Continue;
        }

        let suppress = Disposition::Suppress {
            immediate: self.caps.stop_immediate_propagation,
        };
        match verdict {
            Some(Verdict::Allow) => Disposition::Continue,
            Some(Verdict::Suppress) => suppress,
            None => match self
                .resolver
                .resolve_element_at(tree, last_client_point(session))
            {
                Some(node) if self.classifier.needs_native_activation(tree, node) => {
                    Disposition::Continue
                }
                _ => suppress,
            },
        }
    }
}

fn last_client_point(session: &GestureSession) -> Point {
    session.origin - session.scroll_origin
}
