use crate::{
    geometry::Point,
    platform::Capabilities,
    tree::{NodeId, NodeKind, VisualTree},
};

/// Maps viewport points to the topmost element under them.
#[derive(Clone, Copy, Debug)]
pub struct Resolver {
    caps: Capabilities,
}

impl Resolver {
    pub fn new(caps: Capabilities) -> Self {
        Self { caps }
    }

    pub fn resolve_element_at<T: VisualTree + ?Sized>(&self, tree: &T, at: Point) -> Option<NodeId> {
        let probe = if self.caps.scaled_hit_testing {
            at.scaled(self.caps.device_pixel_ratio)
        } else {
            at
        };
        let hit = tree.element_from_point(probe)?;
        normalize_text_target(tree, hit)
    }
}

/// Text leaves have no interactive semantics; their parent stands in for
/// them. A parentless text leaf does not resolve.
pub fn normalize_text_target<T: VisualTree + ?Sized>(tree: &T, node: NodeId) -> Option<NodeId> {
    match tree.node_kind(node)? {
        NodeKind::Text => tree.parent(node),
        NodeKind::Element | NodeKind::Document => Some(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geometry::{Rect, ScrollOffset},
        virtual_tree::VirtualTree,
    };

    fn scaled_caps(ratio: f64) -> Capabilities {
        Capabilities {
            android: true,
            scaled_hit_testing: true,
            device_pixel_ratio: ratio,
            ..Capabilities::default()
        }
    }

    #[test]
    fn passes_coordinates_through_on_regular_platforms() {
        let mut tree = VirtualTree::new();
        let body = tree.root();
        let near = tree.append_element(body, "div", Rect::new(0.0, 0.0, 100.0, 100.0));
        let far = tree.append_element(body, "div", Rect::new(150.0, 150.0, 100.0, 100.0));
        let resolver = Resolver::new(Capabilities {
            device_pixel_ratio: 2.0,
            ..Capabilities::default()
        });

        assert_eq!(resolver.resolve_element_at(&tree, Point::new(80.0, 80.0)), Some(near));
        assert_ne!(resolver.resolve_element_at(&tree, Point::new(80.0, 80.0)), Some(far));
    }

    #[test]
    fn scales_by_pixel_ratio_on_the_buggy_platform() {
        let mut tree = VirtualTree::new();
        let body = tree.root();
        let near = tree.append_element(body, "div", Rect::new(0.0, 0.0, 100.0, 100.0));
        let far = tree.append_element(body, "div", Rect::new(150.0, 150.0, 100.0, 100.0));
        let resolver = Resolver::new(scaled_caps(2.0));

        assert_eq!(resolver.resolve_element_at(&tree, Point::new(80.0, 80.0)), Some(far));
        assert_eq!(resolver.resolve_element_at(&tree, Point::new(20.0, 20.0)), Some(near));
    }

    #[test]
    fn text_hits_resolve_to_their_parent() {
        let mut tree = VirtualTree::new();
        let body = tree.root();
        let link = tree.append_element(body, "a", Rect::new(0.0, 0.0, 120.0, 20.0));
        let text = tree.append_text(link, Rect::new(2.0, 2.0, 80.0, 16.0));
        let resolver = Resolver::new(Capabilities::default());

        assert_eq!(tree.element_from_point(Point::new(10.0, 10.0)), Some(text));
        assert_eq!(resolver.resolve_element_at(&tree, Point::new(10.0, 10.0)), Some(link));
    }

    #[test]
    fn empty_points_and_stale_layouts_resolve_to_none() {
        let mut tree = VirtualTree::new();
        let body = tree.root();
        let card = tree.append_element(body, "div", Rect::new(0.0, 0.0, 50.0, 50.0));
        let resolver = Resolver::new(Capabilities::default());

        assert_eq!(resolver.resolve_element_at(&tree, Point::new(200.0, 200.0)), None);

        tree.set_scroll(ScrollOffset::new(0.0, 100.0));
        assert_eq!(resolver.resolve_element_at(&tree, Point::new(10.0, 10.0)), None);

        tree.set_scroll(ScrollOffset::default());
        tree.detach(card);
        assert_eq!(resolver.resolve_element_at(&tree, Point::new(10.0, 10.0)), None);
    }
}
