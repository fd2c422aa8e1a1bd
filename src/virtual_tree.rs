use std::collections::BTreeMap;

use crate::{
    events::SyntheticActivation,
    geometry::{Point, Rect, ScrollOffset},
    tree::{EventKind, EventTarget, Listener, ListenerId, NodeId, NodeKind, Phase, VisualTree},
};

/// In-memory visual tree for headless hosts, replay and tests.
///
/// Hit-testing walks nodes in reverse insertion order, so a node appended
/// later paints above earlier ones. Bounds are in page coordinates.
#[derive(Clone, Debug)]
pub struct VirtualTree {
    nodes: Vec<VirtualNode>,
    scroll: ScrollOffset,
    focused: Option<NodeId>,
    dispatched: Vec<SyntheticActivation>,
    listeners: Vec<RegisteredListener>,
    legacy_handlers: BTreeMap<NodeId, String>,
    next_listener_id: u32,
}

#[derive(Clone, Debug)]
struct VirtualNode {
    kind: NodeKind,
    parent: Option<NodeId>,
    tag: Option<String>,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    bounds: Option<Rect>,
    label_for: Option<NodeId>,
    attached: bool,
}

impl VirtualNode {
    fn new(kind: NodeKind, parent: Option<NodeId>, tag: Option<String>, bounds: Option<Rect>) -> Self {
        Self {
            kind,
            parent,
            tag,
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            bounds,
            label_for: None,
            attached: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisteredListener {
    pub node: NodeId,
    pub id: ListenerId,
    pub kind: EventKind,
    pub phase: Phase,
    pub listener: Listener<String>,
}

impl Default for VirtualTree {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![VirtualNode::new(NodeKind::Document, None, None, None)],
            scroll: ScrollOffset::default(),
            focused: None,
            dispatched: Vec::new(),
            listeners: Vec::new(),
            legacy_handlers: BTreeMap::new(),
            next_listener_id: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn append_element(&mut self, parent: NodeId, tag: &str, bounds: Rect) -> NodeId {
        self.push(VirtualNode::new(
            NodeKind::Element,
            Some(parent),
            Some(tag.to_ascii_lowercase()),
            Some(bounds),
        ))
    }

    pub fn append_text(&mut self, parent: NodeId, bounds: Rect) -> NodeId {
        self.push(VirtualNode::new(
            NodeKind::Text,
            Some(parent),
            None,
            Some(bounds),
        ))
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(entry) = self.node_mut(node) {
            entry
                .attributes
                .insert(name.to_ascii_lowercase(), value.to_string());
        }
    }

    pub fn set_label_for(&mut self, label: NodeId, control: NodeId) {
        if let Some(entry) = self.node_mut(label) {
            entry.label_for = Some(control);
        }
    }

    pub fn set_scroll(&mut self, scroll: ScrollOffset) {
        self.scroll = scroll;
    }

    /// Removes a node and its descendants from layout and lookups.
    pub fn detach(&mut self, node: NodeId) {
        let doomed: Vec<usize> = (0..self.nodes.len())
            .filter(|&index| self.is_within(NodeId(index as u32), node))
            .collect();
        for index in doomed {
            self.nodes[index].attached = false;
        }
        if self.focused.is_some_and(|focused| !self.contains(focused)) {
            self.focused = None;
        }
    }

    pub fn class_list(&self, node: NodeId) -> &[String] {
        self.node(node)
            .map(|entry| entry.classes.as_slice())
            .unwrap_or(&[])
    }

    pub fn set_legacy_activation_handler(&mut self, node: NodeId, handler: &str) {
        self.legacy_handlers.insert(node, handler.to_string());
    }

    pub fn legacy_activation_handler(&self, node: NodeId) -> Option<&str> {
        self.legacy_handlers.get(&node).map(String::as_str)
    }

    pub fn listeners(&self) -> &[RegisteredListener] {
        &self.listeners
    }

    pub fn listeners_on(&self, node: NodeId) -> impl Iterator<Item = &RegisteredListener> + '_ {
        self.listeners.iter().filter(move |entry| entry.node == node)
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn dispatched(&self) -> &[SyntheticActivation] {
        &self.dispatched
    }

    pub fn take_dispatched(&mut self) -> Vec<SyntheticActivation> {
        std::mem::take(&mut self.dispatched)
    }

    fn push(&mut self, node: VirtualNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn node(&self, node: NodeId) -> Option<&VirtualNode> {
        self.nodes
            .get(node.0 as usize)
            .filter(|entry| entry.attached)
    }

    fn node_mut(&mut self, node: NodeId) -> Option<&mut VirtualNode> {
        self.nodes
            .get_mut(node.0 as usize)
            .filter(|entry| entry.attached)
    }

    fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self
                .nodes
                .get(current.0 as usize)
                .and_then(|entry| entry.parent);
        }
        false
    }
}

impl VisualTree for VirtualTree {
    fn contains(&self, node: NodeId) -> bool {
        self.node(node).is_some()
    }

    fn node_kind(&self, node: NodeId) -> Option<NodeKind> {
        self.node(node).map(|entry| entry.kind)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)
            .and_then(|entry| entry.parent)
            .filter(|parent| self.contains(*parent))
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.node(node).and_then(|entry| entry.tag.clone())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.node(node)
            .and_then(|entry| entry.attributes.get(&name.to_ascii_lowercase()).cloned())
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.class_list(node).iter().any(|entry| entry == class)
    }

    fn label_control(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)
            .and_then(|entry| entry.label_for)
            .filter(|control| self.contains(*control))
    }

    fn element_from_point(&self, at: Point) -> Option<NodeId> {
        let page = at + self.scroll;
        self.nodes
            .iter()
            .enumerate()
            .rev()
            .find(|(_, entry)| {
                entry.attached && entry.bounds.is_some_and(|bounds| bounds.contains(page))
            })
            .map(|(index, _)| NodeId(index as u32))
    }

    fn scroll_offset(&self) -> ScrollOffset {
        self.scroll
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(entry) = self.node_mut(node) {
            if !entry.classes.iter().any(|existing| existing == class) {
                entry.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(entry) = self.node_mut(node) {
            entry.classes.retain(|existing| existing != class);
        }
    }

    fn focus(&mut self, node: NodeId) {
        if self.contains(node) {
            self.focused = Some(node);
        }
    }

    fn dispatch_activation(&mut self, activation: SyntheticActivation) {
        self.dispatched.push(activation);
    }
}

impl EventTarget for VirtualTree {
    type Handler = String;

    fn add_listener(
        &mut self,
        node: NodeId,
        kind: EventKind,
        phase: Phase,
        listener: Listener<String>,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id = self.next_listener_id.wrapping_add(1);
        self.listeners.push(RegisteredListener {
            node,
            id,
            kind,
            phase,
            listener,
        });
        id
    }

    fn remove_listener(&mut self, node: NodeId, id: ListenerId) {
        self.listeners
            .retain(|entry| !(entry.node == node && entry.id == id));
    }

    fn take_legacy_activation_handler(&mut self, node: NodeId) -> Option<String> {
        self.legacy_handlers.remove(&node)
    }
}
