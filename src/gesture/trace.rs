use crate::tree::NodeId;

/// Which tolerance checks failed when a session was invalidated. Both are
/// evaluated on every move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Invalidation {
    pub moved: bool,
    pub scrolled: bool,
}

impl Invalidation {
    pub fn any(self) -> bool {
        self.moved || self.scrolled
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TapDecision {
    #[default]
    None,
    Tracking,
    Restarted,
    Invalidated(Invalidation),
    Cancelled,
    Ignored,
    NoTarget,
    NativePassThrough,
    Focused {
        native_passthrough: bool,
    },
    LabelForwarded,
    LabelNative,
    Synthesized,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TapTrace {
    pub t_ms: u64,
    pub target: Option<NodeId>,
    pub decision: TapDecision,
}
