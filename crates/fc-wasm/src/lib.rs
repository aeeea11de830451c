//! WASM bridge for FC: exposes the flowchart editor to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The page owns the toolbar,
//! the title input and the label overlay; everything else goes through
//! [`FlowCanvas`].

mod render2d;

use fc_core::id::NodeId;
use fc_core::{Category, Viewport};
use fc_editor::input::Modifiers;
use fc_editor::shortcuts::ShortcutAction;
use fc_editor::tools::ToolKind;
use fc_editor::{Editor, EditorConfig};
use fc_render::{Theme, ViewTransform, display_list, hit_test_screen, label_anchor};
use kurbo::{Point, Vec2};
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// The main WASM-facing canvas controller.
///
/// Pointer coordinates are canvas pixels; the bridge converts them to world
/// space through the view transform before the editor sees them.
#[wasm_bindgen]
pub struct FlowCanvas {
    editor: Editor,
    view: ViewTransform,
    theme: Theme,
    width: f64,
    height: f64,
    /// Last pointer position of a background pan.
    pan_from: Option<Point>,
}

#[wasm_bindgen]
impl FlowCanvas {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();

        Self {
            editor: Editor::new(EditorConfig::default(), viewport(width, height)),
            view: ViewTransform::default(),
            theme: Theme::default(),
            width,
            height,
            pan_from: None,
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.editor.set_viewport(viewport(width, height));
    }

    // ─── Frame loop ──────────────────────────────────────────────────────

    /// Advance the layout one step. Returns `true` while it is settling,
    /// i.e. while the page should keep requesting frames.
    pub fn tick(&mut self) -> bool {
        self.editor.tick()
    }

    pub fn is_settling(&self) -> bool {
        self.editor.is_settling()
    }

    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        let list = display_list(self.editor.graph(), &self.view, &self.theme);
        render2d::render_display_list(ctx, &list, self.width, self.height);
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    /// Returns `true` if a redraw is needed.
    pub fn handle_pointer_down(&mut self, x: f64, y: f64) -> bool {
        let screen = Point::new(x, y);
        let hit = hit_test_screen(self.editor.graph(), &self.view, screen);
        if hit.is_none() {
            self.pan_from = Some(screen);
        }
        let world = self.view.screen_to_world(screen);
        self.editor.pointer_down(world.x as f32, world.y as f32, hit)
    }

    pub fn handle_pointer_move(&mut self, x: f64, y: f64) -> bool {
        let screen = Point::new(x, y);
        if let Some(from) = self.pan_from {
            self.pan_from = Some(screen);
            self.view.pan_by(screen - from);
            return true;
        }
        let world = self.view.screen_to_world(screen);
        self.editor.pointer_move(world.x as f32, world.y as f32)
    }

    pub fn handle_pointer_up(&mut self, x: f64, y: f64) -> bool {
        if self.pan_from.take().is_some() {
            return false;
        }
        let world = self.view.screen_to_world(Point::new(x, y));
        self.editor.pointer_up(world.x as f32, world.y as f32)
    }

    /// Mouse-wheel zoom around the pointer.
    pub fn wheel(&mut self, delta_y: f64, x: f64, y: f64) {
        self.view.wheel(delta_y, Point::new(x, y));
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Handle a keyboard event. `text_focus` is true while a page input
    /// (the title field) has focus. Returns a JSON string:
    /// `{"changed":bool, "action":"<action_name>", "tool":"<tool_name>"}`.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
        text_focus: bool,
    ) -> String {
        let mods = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        let Some(outcome) = self.editor.handle_key(key, mods, text_focus) else {
            return r#"{"changed":false,"action":"none","tool":""}"#.to_string();
        };
        let before = self.view;
        match outcome.action {
            ShortcutAction::ZoomIn => self.zoom_in(),
            ShortcutAction::ZoomOut => self.zoom_out(),
            ShortcutAction::Home => self.home(),
            _ => {}
        }
        let changed = outcome.changed || self.view != before;
        serde_json::json!({
            "changed": changed,
            "action": outcome.action.name(),
            "tool": self.tool_name(),
        })
        .to_string()
    }

    // ─── Tools ───────────────────────────────────────────────────────────

    /// Activate `"pencil"`, `"eraser"`, or no tool (any other name).
    pub fn set_tool(&mut self, name: &str) {
        self.editor.set_tool(ToolKind::from_name(name));
    }

    /// Toggle a tool; returns whether it is active afterwards.
    pub fn toggle_tool(&mut self, name: &str) -> bool {
        match ToolKind::from_name(name) {
            Some(tool) => self.editor.toggle_tool(tool),
            None => false,
        }
    }

    pub fn tool_name(&self) -> String {
        self.editor
            .active_tool()
            .map(ToolKind::name)
            .unwrap_or("")
            .to_string()
    }

    // ─── Toolbar ─────────────────────────────────────────────────────────

    /// Add a node by category name. Returns its id, or `""` if rejected.
    pub fn add_node(&mut self, category: &str) -> String {
        match Category::from_name(category) {
            Some(category) => self.add(category),
            None => String::new(),
        }
    }

    pub fn add_start(&mut self) -> String {
        self.add(Category::Start)
    }

    pub fn add_decision(&mut self) -> String {
        self.add(Category::Decision)
    }

    pub fn add_verb(&mut self) -> String {
        self.add(Category::Verb)
    }

    pub fn add_action(&mut self) -> String {
        self.add(Category::Action)
    }

    pub fn add_end(&mut self) -> String {
        self.add(Category::End)
    }

    pub fn add_new(&mut self) -> String {
        self.add(Category::New)
    }

    pub fn undo(&mut self) -> bool {
        self.editor.undo().is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    pub fn delete_all(&mut self) -> bool {
        self.editor.delete_all()
    }

    pub fn rename_graph(&mut self, name: &str) -> bool {
        self.editor.rename_graph(name)
    }

    pub fn graph_name(&self) -> String {
        self.editor.graph().name.clone()
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// Replace the chart with a JSON document. On failure the user is
    /// alerted, the chart is left as it was, and `false` is returned.
    pub fn import_json(&mut self, text: &str) -> bool {
        match self.editor.import_json(text) {
            Ok(()) => {
                self.home();
                true
            }
            Err(err) => {
                alert(&format!("Could not load flowchart: {err}"));
                false
            }
        }
    }

    pub fn export_json(&self) -> String {
        self.editor.export_json()
    }

    // ─── Label overlay ───────────────────────────────────────────────────

    pub fn set_draft(&mut self, text: &str) -> bool {
        self.editor.set_draft(text)
    }

    pub fn commit_text(&mut self) -> bool {
        self.editor.commit_text()
    }

    pub fn cancel_text(&mut self) -> bool {
        self.editor.cancel_text()
    }

    /// Where to show the label input. Returns JSON:
    /// `{"open":true,"id":"3","x":..,"y":..,"draft":".."}` or `{"open":false}`.
    pub fn edit_overlay(&self) -> String {
        let Some((id, draft)) = self.editor.edit_target() else {
            return r#"{"open":false}"#.to_string();
        };
        let Some(anchor) = label_anchor(self.editor.graph(), &self.view, id) else {
            return r#"{"open":false}"#.to_string();
        };
        serde_json::json!({
            "open": true,
            "id": id.as_str(),
            "x": anchor.x,
            "y": anchor.y,
            "draft": draft,
        })
        .to_string()
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) {
        self.view.zoom_in(self.viewport());
    }

    pub fn zoom_out(&mut self) {
        self.view.zoom_out(self.viewport());
    }

    pub fn home(&mut self) {
        self.view.home(self.editor.graph(), self.viewport());
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.view.pan_by(Vec2::new(dx, dy));
    }

    pub fn zoom_level(&self) -> f64 {
        self.view.scale()
    }

    /// Id of the node under a canvas point, or `""`.
    pub fn node_at(&self, x: f64, y: f64) -> String {
        hit_test_screen(self.editor.graph(), &self.view, Point::new(x, y))
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }
}

impl FlowCanvas {
    fn add(&mut self, category: Category) -> String {
        self.editor
            .add_node(category)
            .map(|id: NodeId| id.as_str().to_string())
            .unwrap_or_default()
    }

    fn viewport(&self) -> Viewport {
        viewport(self.width, self.height)
    }
}

fn viewport(width: f64, height: f64) -> Viewport {
    Viewport {
        width: width as f32,
        height: height as f32,
    }
}

fn alert(message: &str) {
    log::warn!("{message}");
    #[cfg(target_arch = "wasm32")]
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("FC WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
