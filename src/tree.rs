use crate::{
    events::SyntheticActivation,
    geometry::{Point, ScrollOffset},
};

/// Non-owning handle to a node of the host's visual tree.
///
/// Handles are only meaningful for the tree that issued them and are resolved
/// fresh on every query; a detached node simply stops resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element,
    Text,
}

pub trait VisualTree {
    fn contains(&self, node: NodeId) -> bool;
    fn node_kind(&self, node: NodeId) -> Option<NodeKind>;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    /// Lower-case tag name; `None` for text and document nodes.
    fn tag_name(&self, node: NodeId) -> Option<String>;
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn has_class(&self, node: NodeId, class: &str) -> bool;
    /// Control associated with a `<label for=...>`, if it resolves.
    fn label_control(&self, node: NodeId) -> Option<NodeId>;
    /// Topmost node at a viewport point.
    fn element_from_point(&self, at: Point) -> Option<NodeId>;
    fn scroll_offset(&self) -> ScrollOffset;

    fn add_class(&mut self, node: NodeId, class: &str);
    fn remove_class(&mut self, node: NodeId, class: &str);
    fn focus(&mut self, node: NodeId);
    /// Queues an activation for delivery after the current event returns.
    /// The engine is still borrowed here, so the host must not deliver it
    /// synchronously; it comes back as `ActivationSignal::Forwarded`.
    fn dispatch_activation(&mut self, activation: SyntheticActivation);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Activation,
    TouchStart,
    TouchMove,
    TouchEnd,
    TouchCancel,
}

impl EventKind {
    pub const LIFECYCLE: [EventKind; 5] = [
        EventKind::Activation,
        EventKind::TouchStart,
        EventKind::TouchMove,
        EventKind::TouchEnd,
        EventKind::TouchCancel,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Capture,
    Bubble,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u32);

/// What a registered listener runs: the tap engine itself, or a handler the
/// host already owned and that was moved out of the legacy single slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Listener<H> {
    Engine,
    Adopted(H),
}

pub trait EventTarget {
    type Handler;

    fn add_listener(
        &mut self,
        node: NodeId,
        kind: EventKind,
        phase: Phase,
        listener: Listener<Self::Handler>,
    ) -> ListenerId;
    fn remove_listener(&mut self, node: NodeId, id: ListenerId);
    /// Empties the legacy single-slot activation handler (`onclick`),
    /// returning whatever was there.
    fn take_legacy_activation_handler(&mut self, node: NodeId) -> Option<Self::Handler>;
}
