use crate::{
    config::{active_config, ClassificationRules},
    tree::{NodeId, VisualTree},
};

const INPUT_TAG: &str = "input";
const DEFAULT_INPUT_TYPE: &str = "text";

/// Element predicates evaluated against the compiled classification rules.
///
/// Nothing is cached: class lists and attributes may change between calls.
#[derive(Clone, Copy, Debug)]
pub struct Classifier {
    rules: &'static ClassificationRules,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&active_config().classify)
    }
}

impl Classifier {
    pub fn new(rules: &'static ClassificationRules) -> Self {
        Self { rules }
    }

    pub fn needs_native_activation<T: VisualTree + ?Sized>(&self, tree: &T, node: NodeId) -> bool {
        if tree.has_class(node, self.rules.native_marker_class) {
            return true;
        }
        tree.tag_name(node)
            .is_some_and(|tag| listed(self.rules.native_tags, &tag))
    }

    pub fn needs_explicit_focus<T: VisualTree + ?Sized>(&self, tree: &T, node: NodeId) -> bool {
        if tree.has_class(node, self.rules.focus_marker_class) {
            return true;
        }
        let Some(tag) = tree.tag_name(node) else {
            return false;
        };
        if tag == INPUT_TAG {
            let input_type = input_type(tree, node);
            return !listed(self.rules.focus_exempt_input_types, &input_type);
        }
        listed(self.rules.focus_tags, &tag)
    }

    /// Focus targets (option lists) that still need the platform's own
    /// activation to open.
    pub fn allows_native_after_focus<T: VisualTree + ?Sized>(&self, tree: &T, node: NodeId) -> bool {
        tree.tag_name(node)
            .is_some_and(|tag| listed(self.rules.focus_native_passthrough_tags, &tag))
    }
}

pub fn needs_native_activation<T: VisualTree + ?Sized>(tree: &T, node: NodeId) -> bool {
    Classifier::default().needs_native_activation(tree, node)
}

pub fn needs_explicit_focus<T: VisualTree + ?Sized>(tree: &T, node: NodeId) -> bool {
    Classifier::default().needs_explicit_focus(tree, node)
}

fn listed(names: &[&str], name: &str) -> bool {
    names.iter().any(|candidate| *candidate == name)
}

// Missing or empty `type` behaves like a text field.
fn input_type<T: VisualTree + ?Sized>(tree: &T, node: NodeId) -> String {
    tree.attribute(node, "type")
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_INPUT_TYPE.to_string())
}
