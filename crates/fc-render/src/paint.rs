//! Graph → display list.
//!
//! Walks the graph and emits backend-agnostic primitives in paint order:
//! every link first, then every node in sequence order, so later nodes are
//! drawn on top. Geometry is in world coordinates; the list carries the
//! view transform for the backend to apply.

use crate::view::ViewTransform;
use fc_core::id::NodeId;
use fc_core::{Category, Graph, Node};
use kurbo::{Affine, BezPath, Circle, Line, Point, Rect, Shape, Vec2};
use peniko::Color;

/// Half-extent of every node shape.
pub const NODE_RADIUS: f64 = 20.0;

/// Label baseline origin relative to the node centre.
pub const LABEL_OFFSET: Vec2 = Vec2::new(-10.0, 5.0);

const ARROW_LENGTH: f64 = 8.0;
const ARROW_HALF_WIDTH: f64 = 4.0;
const TOLERANCE: f64 = 0.1;

// ─── Shapes ──────────────────────────────────────────────────────────────────

/// Outline of a node, centred on its position.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeShape {
    /// 40×40 square (Start).
    Square(Rect),
    /// Rhombus with vertices 20 from the centre (Decision).
    Diamond(BezPath),
    /// Flattened octagon 50 wide, 40 high (End).
    Octagon(BezPath),
    /// Circle of radius 20 (everything else).
    Circle(Circle),
}

impl NodeShape {
    pub fn for_node(node: &Node) -> Self {
        let c = Point::new(node.x as f64, node.y as f64);
        let r = NODE_RADIUS;
        match node.category {
            Category::Start => NodeShape::Square(Rect::from_center_size(c, (2.0 * r, 2.0 * r))),
            Category::Decision => {
                NodeShape::Diamond(polygon(c, &[(0.0, -r), (r, 0.0), (0.0, r), (-r, 0.0)]))
            }
            Category::End => NodeShape::Octagon(polygon(
                c,
                &[
                    (15.0, -20.0),
                    (25.0, -10.0),
                    (25.0, 10.0),
                    (15.0, 20.0),
                    (-15.0, 20.0),
                    (-25.0, 10.0),
                    (-25.0, -10.0),
                    (-15.0, -20.0),
                ],
            )),
            Category::Verb | Category::Action | Category::New => {
                NodeShape::Circle(Circle::new(c, r))
            }
        }
    }

    pub fn contains(&self, pt: Point) -> bool {
        match self {
            NodeShape::Square(rect) => rect.contains(pt),
            NodeShape::Diamond(path) | NodeShape::Octagon(path) => path.contains(pt),
            NodeShape::Circle(circle) => circle.contains(pt),
        }
    }

    pub fn bounding_box(&self) -> Rect {
        match self {
            NodeShape::Square(rect) => *rect,
            NodeShape::Diamond(path) | NodeShape::Octagon(path) => path.bounding_box(),
            NodeShape::Circle(circle) => circle.bounding_box(),
        }
    }

    pub fn to_path(&self) -> BezPath {
        match self {
            NodeShape::Square(rect) => rect.to_path(TOLERANCE),
            NodeShape::Diamond(path) | NodeShape::Octagon(path) => path.clone(),
            NodeShape::Circle(circle) => circle.to_path(TOLERANCE),
        }
    }
}

fn polygon(center: Point, offsets: &[(f64, f64)]) -> BezPath {
    let mut path = BezPath::new();
    for (i, &(dx, dy)) in offsets.iter().enumerate() {
        let p = center + Vec2::new(dx, dy);
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

// ─── Theme ───────────────────────────────────────────────────────────────────

/// Colours used by the display list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub background: Color,
    pub link: Color,
    pub label: Color,
    pub outline: Color,
    /// Outline of the pending link source.
    pub highlight: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::from_rgb8(0xFF, 0xFF, 0xFF),
            link: Color::from_rgb8(0x99, 0x99, 0x99),
            label: Color::from_rgb8(0x00, 0x00, 0x00),
            outline: Color::from_rgba8(0x00, 0x00, 0x00, 0x00),
            highlight: Color::from_rgb8(0x1E, 0x88, 0xE5),
        }
    }
}

/// Fill colour of a category (CSS named colours).
pub fn category_fill(category: Category) -> Color {
    match category {
        Category::Start => Color::from_rgb8(0xAD, 0xD8, 0xE6), // lightblue
        Category::Decision => Color::from_rgb8(0xFF, 0xA5, 0x00), // orange
        Category::End => Color::from_rgb8(0xFF, 0x00, 0x00),   // red
        Category::Verb | Category::Action | Category::New => {
            Color::from_rgb8(0xD3, 0xD3, 0xD3) // lightgrey
        }
    }
}

// ─── Display list ────────────────────────────────────────────────────────────

/// A link segment between two node centres.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkItem {
    pub line: Line,
    /// Arrow head at the target's edge; `None` for self-loops and
    /// coincident endpoints.
    pub head: Option<BezPath>,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeItem {
    pub id: NodeId,
    pub shape: NodeShape,
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f64,
    pub label: String,
    pub label_origin: Point,
    pub label_color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Link(LinkItem),
    Node(NodeItem),
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayList {
    /// World → screen.
    pub transform: Affine,
    pub background: Color,
    pub items: Vec<Primitive>,
}

impl DisplayList {
    pub fn nodes(&self) -> impl Iterator<Item = &NodeItem> {
        self.items.iter().filter_map(|item| match item {
            Primitive::Node(node) => Some(node),
            Primitive::Link(_) => None,
        })
    }

    pub fn links(&self) -> impl Iterator<Item = &LinkItem> {
        self.items.iter().filter_map(|item| match item {
            Primitive::Link(link) => Some(link),
            Primitive::Node(_) => None,
        })
    }
}

/// Build the display list for the current frame.
pub fn display_list(graph: &Graph, view: &ViewTransform, theme: &Theme) -> DisplayList {
    let mut items = Vec::with_capacity(graph.links.len() + graph.nodes.len());

    for link in &graph.links {
        let (Some(source), Some(target)) = (graph.node(link.source), graph.node(link.target))
        else {
            continue;
        };
        let from = center(source);
        let to = center(target);
        log::trace!("LINK {} -> {}", link.source, link.target);
        items.push(Primitive::Link(LinkItem {
            line: Line::new(from, to),
            head: arrow_head(from, to),
            color: theme.link,
        }));
    }

    for node in &graph.nodes {
        let shape = NodeShape::for_node(node);
        let (stroke, stroke_width) = if node.selected {
            (theme.highlight, 3.0)
        } else {
            (theme.outline, 0.0)
        };
        log::trace!(
            "NODE #{} {:?} at ({}, {})",
            node.id,
            node.category,
            node.x,
            node.y
        );
        items.push(Primitive::Node(NodeItem {
            id: node.id,
            shape,
            fill: category_fill(node.category),
            stroke,
            stroke_width,
            label: node.content.clone(),
            label_origin: center(node) + LABEL_OFFSET,
            label_color: theme.label,
        }));
    }

    DisplayList {
        transform: view.affine(),
        background: theme.background,
        items,
    }
}

fn center(node: &Node) -> Point {
    Point::new(node.x as f64, node.y as f64)
}

/// Triangle whose tip touches the target's outline (approximated by
/// `NODE_RADIUS`).
fn arrow_head(from: Point, to: Point) -> Option<BezPath> {
    let delta = to - from;
    let length = delta.hypot();
    if length <= NODE_RADIUS + ARROW_LENGTH {
        return None;
    }
    let dir = delta / length;
    let normal = Vec2::new(-dir.y, dir.x);
    let tip = to - dir * NODE_RADIUS;
    let base = tip - dir * ARROW_LENGTH;

    let mut path = BezPath::new();
    path.move_to(tip);
    path.line_to(base + normal * ARROW_HALF_WIDTH);
    path.line_to(base - normal * ARROW_HALF_WIDTH);
    path.close_path();
    Some(path)
}
