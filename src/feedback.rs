use log::trace;

use crate::{
    options::FeedbackOptions,
    resolve::normalize_text_target,
    tree::{NodeId, VisualTree},
};

/// Applies the tracking markers to the element under a touch.
///
/// The start marker may be deferred; the deferral is a deadline the host
/// polls through [`FeedbackController::poll`]. `finalize` always clears the
/// deadline, so a deferred marker can never land after tracking ended.
#[derive(Clone, Debug)]
pub struct FeedbackController {
    options: FeedbackOptions,
    target: Option<NodeId>,
    pending_until_ms: Option<u64>,
}

impl FeedbackController {
    pub fn new(options: FeedbackOptions) -> Self {
        Self {
            options,
            target: None,
            pending_until_ms: None,
        }
    }

    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    pub fn begin<T: VisualTree + ?Sized>(
        &mut self,
        tree: &mut T,
        target: Option<NodeId>,
        now_ms: u64,
    ) {
        self.pending_until_ms = None;
        self.target = target.and_then(|node| normalize_text_target(tree, node));
        let Some(node) = self.target else {
            return;
        };

        if self.options.delay_ms == 0 {
            self.apply_start(tree, node);
        } else {
            let due = now_ms.saturating_add(self.options.delay_ms);
            trace!("feedback start marker deferred until {due}ms");
            self.pending_until_ms = Some(due);
        }
    }

    /// Applies a due deferred marker. Returns whether one was applied.
    pub fn poll<T: VisualTree + ?Sized>(&mut self, tree: &mut T, now_ms: u64) -> bool {
        match self.pending_until_ms {
            Some(due) if now_ms >= due => {
                self.pending_until_ms = None;
                match self.target {
                    Some(node) if tree.contains(node) => {
                        self.apply_start(tree, node);
                        true
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    pub fn apply_start<T: VisualTree + ?Sized>(&mut self, tree: &mut T, node: NodeId) {
        let Some(node) = normalize_text_target(tree, node) else {
            return;
        };
        if let Some(end) = self.options.end_marker_class.as_deref() {
            tree.remove_class(node, end);
        }
        if !tree.has_class(node, &self.options.start_marker_class) {
            tree.add_class(node, &self.options.start_marker_class);
        }
    }

    pub fn finalize<T: VisualTree + ?Sized>(&mut self, tree: &mut T) {
        self.pending_until_ms = None;
        let Some(node) = self
            .target
            .take()
            .and_then(|node| normalize_text_target(tree, node))
        else {
            return;
        };

        let start = self.options.start_marker_class.as_str();
        if tree.has_class(node, start) {
            if let Some(end) = self.options.end_marker_class.as_deref() {
                tree.add_class(node, end);
            }
            tree.remove_class(node, start);
        }
    }

    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.pending_until_ms
    }

    pub fn is_pending(&self) -> bool {
        self.pending_until_ms.is_some()
    }
}
