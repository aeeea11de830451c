//! Pan/zoom view transform.
//!
//! Maps world coordinates (where the simulation positions nodes) to screen
//! coordinates (canvas pixels). Zooming keeps the point under the anchor
//! fixed, the way d3-zoom does.

use crate::paint::{LABEL_OFFSET, NodeShape};
use fc_core::id::NodeId;
use fc_core::{Graph, Viewport};
use kurbo::{Affine, Point, Rect, Vec2};

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 8.0;
pub const ZOOM_IN_STEP: f64 = 1.3;
pub const ZOOM_OUT_STEP: f64 = 0.7;

/// Wheel delta (pixels) → exponent of 2, as d3-zoom.
const WHEEL_SENSITIVITY: f64 = 0.002;

/// Uniform scale followed by a translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    scale: f64,
    translate: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate: Vec2::ZERO,
        }
    }
}

impl ViewTransform {
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translation(&self) -> Vec2 {
        self.translate
    }

    /// World → screen.
    pub fn affine(&self) -> Affine {
        Affine::translate(self.translate) * Affine::scale(self.scale)
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        self.affine() * world
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.translate.x) / self.scale,
            (screen.y - self.translate.y) / self.scale,
        )
    }

    /// Multiply the scale by `factor`, clamped to the scale extent, keeping
    /// the world point under `anchor` (screen space) in place.
    pub fn zoom_by(&mut self, factor: f64, anchor: Point) {
        let target = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        if target == self.scale {
            return;
        }
        let world = self.screen_to_world(anchor);
        self.scale = target;
        self.translate = anchor.to_vec2() - world.to_vec2() * target;
        log::trace!("zoom {:.3} at ({}, {})", self.scale, anchor.x, anchor.y);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.translate += delta;
    }

    pub fn zoom_in(&mut self, viewport: Viewport) {
        self.zoom_by(ZOOM_IN_STEP, viewport_center(viewport));
    }

    pub fn zoom_out(&mut self, viewport: Viewport) {
        self.zoom_by(ZOOM_OUT_STEP, viewport_center(viewport));
    }

    /// Mouse-wheel zoom around the pointer.
    pub fn wheel(&mut self, delta_y: f64, anchor: Point) {
        self.zoom_by((-delta_y * WHEEL_SENSITIVITY).exp2(), anchor);
    }

    /// Scale 1 with the chart's bounding box centred in the viewport.
    pub fn home(&mut self, graph: &Graph, viewport: Viewport) {
        self.scale = 1.0;
        self.translate = match chart_bounds(graph) {
            Some(bounds) => viewport_center(viewport) - bounds.center(),
            None => Vec2::ZERO,
        };
    }
}

fn viewport_center(viewport: Viewport) -> Point {
    Point::new(viewport.width as f64 / 2.0, viewport.height as f64 / 2.0)
}

/// Union of every node outline, in world space.
pub fn chart_bounds(graph: &Graph) -> Option<Rect> {
    graph
        .nodes
        .iter()
        .map(|n| NodeShape::for_node(n).bounding_box())
        .reduce(|a, b| a.union(b))
}

/// Screen position for the label edit overlay of `id`.
pub fn label_anchor(graph: &Graph, view: &ViewTransform, id: NodeId) -> Option<Point> {
    let node = graph.node(id)?;
    let world = Point::new(node.x as f64, node.y as f64) + LABEL_OFFSET;
    Some(view.world_to_screen(world))
}
