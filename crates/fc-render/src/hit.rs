//! Hit testing: point → node lookup.
//!
//! Walks nodes in reverse paint order (last drawn = topmost) and tests each
//! category outline, so clicks on a diamond's empty corner miss it.

use crate::paint::NodeShape;
use crate::view::ViewTransform;
use fc_core::Graph;
use fc_core::id::NodeId;
use kurbo::Point;

/// Find the topmost node at `world`. Returns `None` on empty canvas.
pub fn hit_test(graph: &Graph, world: Point) -> Option<NodeId> {
    graph
        .nodes
        .iter()
        .rev()
        .find(|node| NodeShape::for_node(node).contains(world))
        .map(|node| node.id)
}

/// [`hit_test`] for a point in canvas pixels.
pub fn hit_test_screen(graph: &Graph, view: &ViewTransform, screen: Point) -> Option<NodeId> {
    hit_test(graph, view.screen_to_world(screen))
}
