//! Canvas2D renderer.
//!
//! Replays a [`DisplayList`] onto an HTML `<canvas>` through
//! `CanvasRenderingContext2d`. All geometry arrives in world space; the
//! list's view transform is installed once per frame.

use fc_render::paint::{LinkItem, NodeItem, NodeShape};
use fc_render::{DisplayList, Primitive};
use kurbo::{BezPath, PathEl};
use peniko::Color;
use web_sys::CanvasRenderingContext2d;

const LABEL_FONT: &str = "12px system-ui, sans-serif";
const LINK_WIDTH: f64 = 1.5;

/// Draw one frame.
pub fn render_display_list(
    ctx: &CanvasRenderingContext2d,
    list: &DisplayList,
    canvas_width: f64,
    canvas_height: f64,
) {
    // Clear in screen space
    let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    ctx.set_fill_style_str(&css(list.background));
    ctx.fill_rect(0.0, 0.0, canvas_width, canvas_height);

    let [a, b, c, d, e, f] = list.transform.as_coeffs();
    let _ = ctx.set_transform(a, b, c, d, e, f);

    for item in &list.items {
        match item {
            Primitive::Link(link) => draw_link(ctx, link),
            Primitive::Node(node) => draw_node(ctx, node),
        }
    }

    let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
}

// ─── Links ───────────────────────────────────────────────────────────────

fn draw_link(ctx: &CanvasRenderingContext2d, link: &LinkItem) {
    let color = css(link.color);
    ctx.save();
    ctx.set_stroke_style_str(&color);
    ctx.set_line_width(LINK_WIDTH);
    ctx.begin_path();
    ctx.move_to(link.line.p0.x, link.line.p0.y);
    ctx.line_to(link.line.p1.x, link.line.p1.y);
    ctx.stroke();

    if let Some(head) = &link.head {
        ctx.set_fill_style_str(&color);
        trace_path(ctx, head);
        ctx.fill();
    }
    ctx.restore();
}

// ─── Nodes ───────────────────────────────────────────────────────────────

fn draw_node(ctx: &CanvasRenderingContext2d, node: &NodeItem) {
    ctx.save();
    trace_shape(ctx, &node.shape);
    ctx.set_fill_style_str(&css(node.fill));
    ctx.fill();

    if node.stroke_width > 0.0 {
        // Pending link source: dashed outline
        ctx.set_stroke_style_str(&css(node.stroke));
        ctx.set_line_width(node.stroke_width);
        let _ = ctx.set_line_dash(&js_sys::Array::of2(
            &wasm_bindgen::JsValue::from_f64(5.0),
            &wasm_bindgen::JsValue::from_f64(3.0),
        ));
        ctx.stroke();
        let _ = ctx.set_line_dash(&js_sys::Array::new());
    }

    if !node.label.is_empty() {
        ctx.set_font(LABEL_FONT);
        ctx.set_fill_style_str(&css(node.label_color));
        ctx.set_text_align("left");
        ctx.set_text_baseline("alphabetic");
        let _ = ctx.fill_text(&node.label, node.label_origin.x, node.label_origin.y);
    }
    ctx.restore();
}

fn trace_shape(ctx: &CanvasRenderingContext2d, shape: &NodeShape) {
    match shape {
        NodeShape::Square(rect) => {
            ctx.begin_path();
            ctx.rect(rect.x0, rect.y0, rect.width(), rect.height());
        }
        NodeShape::Circle(circle) => {
            ctx.begin_path();
            let _ = ctx.arc(
                circle.center.x,
                circle.center.y,
                circle.radius,
                0.0,
                std::f64::consts::TAU,
            );
        }
        NodeShape::Diamond(path) | NodeShape::Octagon(path) => trace_path(ctx, path),
    }
}

fn trace_path(ctx: &CanvasRenderingContext2d, path: &BezPath) {
    ctx.begin_path();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => ctx.move_to(p.x, p.y),
            PathEl::LineTo(p) => ctx.line_to(p.x, p.y),
            PathEl::QuadTo(c, p) => ctx.quadratic_curve_to(c.x, c.y, p.x, p.y),
            PathEl::CurveTo(c1, c2, p) => ctx.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
            PathEl::ClosePath => ctx.close_path(),
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

/// CSS `rgba()` string for a colour.
pub(crate) fn css(color: Color) -> String {
    let [r, g, b, a] = color.components;
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "rgba({}, {}, {}, {})",
        channel(r),
        channel(g),
        channel(b),
        a.clamp(0.0, 1.0)
    )
}
