//! The editor controller.
//!
//! [`Editor`] owns everything a canvas session needs: the [`SyncEngine`]
//! (graph + layout), the [`UndoLog`], the current [`InteractionState`] and an
//! in-flight [`DragGesture`]. Hosts feed it pointer and key events in world
//! coordinates and read the graph back for rendering.

use crate::commands::{UndoEntry, UndoKind, UndoLog};
use crate::input::{InputEvent, Modifiers};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::sync::{GraphMutation, SyncEngine};
use crate::tools::{DragGesture, InteractionState, ToolKind};
use fc_core::id::NodeId;
use fc_core::{Category, Graph, ImportError, LayoutConfig, Viewport};
use serde::{Deserialize, Serialize};

/// Editor tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undo entries kept.
    pub undo_depth: usize,
    /// Pointer travel (world units) below which a press counts as a click.
    pub click_slop: f32,
    pub layout: LayoutConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_depth: 200,
            click_slop: 3.0,
            layout: LayoutConfig::default(),
        }
    }
}

/// Result of a resolved key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOutcome {
    pub action: ShortcutAction,
    /// Whether the editor state changed. View actions are left to the host
    /// and always report `false` here.
    pub changed: bool,
}

pub struct Editor {
    engine: SyncEngine,
    undo: UndoLog,
    state: InteractionState,
    drag: Option<DragGesture>,
    config: EditorConfig,
}

impl Editor {
    pub fn new(config: EditorConfig, viewport: Viewport) -> Self {
        Self::with_graph(Graph::default(), config, viewport)
    }

    pub fn with_graph(graph: Graph, config: EditorConfig, viewport: Viewport) -> Self {
        Self {
            engine: SyncEngine::with_graph(graph, config.layout.clone(), viewport),
            undo: UndoLog::new(config.undo_depth),
            state: InteractionState::Idle,
            drag: None,
            config,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn graph(&self) -> &Graph {
        &self.engine.graph
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn active_tool(&self) -> Option<ToolKind> {
        self.state.active_tool()
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.as_ref().is_some_and(|d| d.moved)
    }

    // ─── Mutation plumbing ───────────────────────────────────────────────

    /// Apply mutations in order, recording undo entries. Returns whether
    /// anything changed.
    fn apply(&mut self, mutations: Vec<GraphMutation>) -> bool {
        let mut changed = false;
        for mutation in mutations {
            let applied = self.engine.apply_mutation(mutation);
            changed |= applied.changed;
            if let Some(entry) = applied.undo {
                self.undo.push(entry);
            }
        }
        changed
    }

    // ─── Tools ───────────────────────────────────────────────────────────

    /// Toggle pencil or eraser. An open label edit is committed first.
    pub fn toggle_tool(&mut self, tool: ToolKind) -> bool {
        let mut mutations = self.state.commit_text();
        mutations.extend(self.state.toggle(tool));
        self.apply(mutations);
        self.state.active_tool() == Some(tool)
    }

    /// Activate `tool` (or no tool) regardless of the current one.
    pub fn set_tool(&mut self, tool: Option<ToolKind>) {
        if self.state.active_tool() == tool {
            return;
        }
        match tool {
            Some(tool) => {
                self.toggle_tool(tool);
            }
            None => {
                self.drop_tool();
            }
        }
    }

    /// Deactivate the active tool. Returns whether one was active.
    pub fn drop_tool(&mut self) -> bool {
        let was_active = self.state.active_tool().is_some();
        let mutations = self.state.drop_tool();
        self.apply(mutations);
        was_active
    }

    // ─── Toolbar ─────────────────────────────────────────────────────────

    /// Append a node with the category's default label, chained from the
    /// previously last node.
    pub fn add_node(&mut self, category: Category) -> Option<NodeId> {
        self.add_node_with(category, category.default_label())
    }

    pub fn add_node_with(&mut self, category: Category, content: impl Into<String>) -> Option<NodeId> {
        let mutations = self.state.commit_text();
        self.apply(mutations);
        let applied = self.engine.apply_mutation(GraphMutation::AddNode {
            category,
            content: content.into(),
            chain: true,
        });
        let entry = applied.undo?;
        let id = match &entry {
            UndoEntry::AddNode { id, .. } => Some(*id),
            _ => None,
        };
        self.undo.push(entry);
        id
    }

    /// Clear the chart. The pending link source is dropped first.
    pub fn delete_all(&mut self) -> bool {
        let mut mutations = self.state.commit_text();
        mutations.extend(self.state.clear_pending());
        mutations.push(GraphMutation::DeleteAll);
        let released = self.cancel_drag();
        self.apply(mutations) || released
    }

    pub fn rename_graph(&mut self, name: impl Into<String>) -> bool {
        self.apply(vec![GraphMutation::RenameGraph { name: name.into() }])
    }

    /// Undo the newest structural change. Also drops the pending link
    /// source and any label edit of a node that no longer exists.
    pub fn undo(&mut self) -> Option<UndoKind> {
        let mut mutations = self.state.commit_text();
        mutations.extend(self.state.clear_pending());
        self.apply(mutations);
        self.cancel_drag();

        let kind = self.undo.pop_and_apply(&mut self.engine)?;
        self.engine.graph.clear_selection();
        self.state.forget_missing(&self.engine.graph);
        log::debug!("undid {}", kind.description());
        Some(kind)
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    /// Dispatch a normalized input event. `hit` is the node under the
    /// pointer and only matters for presses.
    pub fn handle_event(&mut self, event: &InputEvent, hit: Option<NodeId>) -> bool {
        match event {
            InputEvent::PointerDown { x, y, .. } => self.pointer_down(*x, *y, hit),
            InputEvent::PointerMove { x, y, .. } => self.pointer_move(*x, *y),
            InputEvent::PointerUp { x, y, .. } => self.pointer_up(*x, *y),
            InputEvent::Key { key, modifiers } => self
                .handle_key(key, *modifiers, false)
                .is_some_and(|outcome| outcome.changed),
        }
    }

    /// Pointer pressed at `(x, y)` with `hit` the node under it, if any.
    pub fn pointer_down(&mut self, x: f32, y: f32, hit: Option<NodeId>) -> bool {
        let editing_other = match &self.state {
            InteractionState::TextEditing { id, .. } => Some(*id) != hit,
            _ => false,
        };
        let mut changed = false;
        if editing_other {
            let mutations = self.state.commit_text();
            changed |= self.apply(mutations);
        }

        changed |= self.cancel_drag();

        let Some(id) = hit else {
            return changed;
        };
        match DragGesture::begin(id, x, y, &self.engine.graph, self.config.click_slop) {
            Some((gesture, pin)) => {
                self.drag = Some(gesture);
                self.engine.simulation.hold();
                self.apply(vec![pin]) || changed
            }
            None => changed,
        }
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        let Some(gesture) = self.drag.as_mut() else {
            return false;
        };
        match gesture.update(x, y) {
            Some(pin) => self.apply(vec![pin]),
            None => false,
        }
    }

    /// Pointer released. A press that never became a drag is a click.
    pub fn pointer_up(&mut self, _x: f32, _y: f32) -> bool {
        let Some(gesture) = self.drag.take() else {
            return false;
        };
        let (unpin, click) = gesture.end();
        self.engine.simulation.release();
        let mut changed = self.apply(vec![unpin]);
        if let Some(id) = click {
            changed |= self.click(id);
        }
        changed
    }

    /// Abandon an in-flight gesture: give the pin back to the simulation and
    /// let energy decay again. Must run while the dragged node still exists.
    fn cancel_drag(&mut self) -> bool {
        let Some(gesture) = self.drag.take() else {
            return false;
        };
        let (unpin, _) = gesture.end();
        self.engine.simulation.release();
        log::debug!("drag cancelled");
        self.apply(vec![unpin])
    }

    /// Route a click on `id` through the active tool.
    pub fn click(&mut self, id: NodeId) -> bool {
        let was_editing = self.state.is_text_editing();
        let mutations = self.state.click(id, &self.engine.graph);
        self.apply(mutations) || (!was_editing && self.state.is_text_editing())
    }

    // ─── Label editing ───────────────────────────────────────────────────

    pub fn set_draft(&mut self, text: &str) -> bool {
        self.state.set_draft(text)
    }

    pub fn commit_text(&mut self) -> bool {
        let mutations = self.state.commit_text();
        self.apply(mutations)
    }

    pub fn cancel_text(&mut self) -> bool {
        self.state.cancel_text()
    }

    /// The node being edited and its draft.
    pub fn edit_target(&self) -> Option<(NodeId, &str)> {
        match &self.state {
            InteractionState::TextEditing { id, draft } => Some((*id, draft.as_str())),
            _ => None,
        }
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Handle a key press. `host_text_focus` reports whether a host-owned
    /// input (such as the title field) has the keyboard. View actions are
    /// returned for the host to carry out.
    pub fn handle_key(
        &mut self,
        key: &str,
        modifiers: Modifiers,
        host_text_focus: bool,
    ) -> Option<KeyOutcome> {
        let text_focus = host_text_focus || self.state.is_text_editing();
        let action = ShortcutMap::resolve(key, modifiers, text_focus)?;
        let changed = match action {
            // A toggle always flips the tool on or off.
            ShortcutAction::TogglePencil => {
                self.toggle_tool(ToolKind::Pencil);
                true
            }
            ShortcutAction::ToggleEraser => {
                self.toggle_tool(ToolKind::Eraser);
                true
            }
            ShortcutAction::Undo => {
                let had_pending = self.state.pending_source().is_some() || self.drag.is_some();
                self.undo().is_some() || had_pending
            }
            ShortcutAction::CommitText => {
                let was_editing = self.state.is_text_editing();
                self.commit_text() || was_editing
            }
            ShortcutAction::Cancel => self.cancel_text() || self.drop_tool(),
            ShortcutAction::ZoomIn | ShortcutAction::ZoomOut | ShortcutAction::Home => false,
        };
        Some(KeyOutcome { action, changed })
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// Replace the chart with a JSON document. On error nothing changes.
    pub fn import_json(&mut self, text: &str) -> Result<(), ImportError> {
        let graph = match fc_core::import_json(text) {
            Ok(graph) => graph,
            Err(err) => {
                log::warn!("import failed: {err}");
                return Err(err);
            }
        };
        self.cancel_drag();
        self.engine.replace_graph(graph);
        self.undo.clear();
        self.state.reset_for_new_graph();
        log::debug!(
            "imported {:?}: {} nodes, {} links",
            self.engine.graph.name,
            self.engine.graph.nodes.len(),
            self.engine.graph.links.len()
        );
        Ok(())
    }

    pub fn export_json(&self) -> String {
        fc_core::export_json(&self.engine.graph)
    }

    // ─── Layout ──────────────────────────────────────────────────────────

    pub fn tick(&mut self) -> bool {
        self.engine.tick()
    }

    pub fn is_settling(&self) -> bool {
        self.engine.is_settling()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.engine.set_viewport(viewport);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn editor() -> Editor {
        Editor::new(EditorConfig::default(), Viewport::default())
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: EditorConfig = serde_json::from_str(r#"{ "undo_depth": 5 }"#).unwrap();
        assert_eq!(config.undo_depth, 5);
        assert_eq!(config.click_slop, 3.0);
        assert_eq!(config.layout, LayoutConfig::default());
    }

    #[test]
    fn toolbar_add_chains_and_undoes_as_one() {
        let mut ed = editor();
        ed.add_node(Category::Start);
        ed.add_node(Category::Verb);
        assert_eq!(ed.graph().links.len(), 1);
        assert_eq!(ed.undo(), Some(UndoKind::AddNode));
        assert_eq!(ed.graph().nodes.len(), 1);
        assert!(ed.graph().links.is_empty());
    }

    #[test]
    fn switching_tool_commits_label_edit() {
        let mut ed = editor();
        let a = ed.add_node(Category::Verb).unwrap();
        assert!(ed.click(a));
        ed.set_draft("Ship");
        ed.toggle_tool(ToolKind::Pencil);
        assert_eq!(ed.graph().node(a).unwrap().content, "Ship");
        assert_eq!(ed.active_tool(), Some(ToolKind::Pencil));
    }

    #[test]
    fn press_and_release_in_place_is_a_click() {
        let mut ed = editor();
        let a = ed.add_node(Category::Verb).unwrap();
        let (x, y) = ed.graph().node(a).unwrap().position();
        ed.toggle_tool(ToolKind::Eraser);
        ed.pointer_down(x, y, Some(a));
        assert!(ed.graph().node(a).unwrap().is_pinned());
        ed.pointer_up(x + 1.0, y);
        assert!(ed.graph().is_empty());
    }

    #[test]
    fn drag_pins_and_releases() {
        let mut ed = editor();
        let a = ed.add_node(Category::Verb).unwrap();
        let (x, y) = ed.graph().node(a).unwrap().position();
        ed.pointer_down(x, y, Some(a));
        assert_eq!(ed.engine().simulation.alpha_target(), 0.3);
        ed.pointer_move(x + 50.0, y);
        assert!(ed.is_dragging());
        ed.tick();
        assert_eq!(ed.graph().node(a).unwrap().position(), (x + 50.0, y));
        ed.pointer_up(x + 50.0, y);
        assert!(!ed.graph().node(a).unwrap().is_pinned());
        assert_eq!(ed.engine().simulation.alpha_target(), 0.0);
        // A drag never opens the label editor.
        assert_eq!(ed.state(), &InteractionState::Idle);
    }

    #[test]
    fn escape_cancels_edit_before_dropping_tool() {
        let mut ed = editor();
        let a = ed.add_node(Category::Verb).unwrap();
        ed.click(a);
        ed.set_draft("typo");
        assert_eq!(
            ed.handle_key("Escape", Modifiers::NONE, false),
            Some(KeyOutcome {
                action: ShortcutAction::Cancel,
                changed: true
            })
        );
        assert_eq!(ed.graph().node(a).unwrap().content, "Verb");

        ed.toggle_tool(ToolKind::Pencil);
        ed.handle_key("Escape", Modifiers::NONE, false);
        assert_eq!(ed.active_tool(), None);
    }

    #[test]
    fn idle_keys_report_no_change() {
        let mut ed = editor();
        let outcome = |ed: &mut Editor, key: &str, mods: Modifiers| {
            ed.handle_key(key, mods, false).map(|o| o.changed)
        };
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::NONE
        };
        // Nothing to undo, nothing to cancel.
        assert_eq!(outcome(&mut ed, "z", ctrl), Some(false));
        assert_eq!(outcome(&mut ed, "Escape", Modifiers::NONE), Some(false));
        assert_eq!(outcome(&mut ed, "+", Modifiers::NONE), Some(false));

        ed.add_node(Category::Verb);
        assert_eq!(outcome(&mut ed, "z", ctrl), Some(true));
        assert_eq!(outcome(&mut ed, "p", Modifiers::NONE), Some(true));
        assert_eq!(outcome(&mut ed, "Escape", Modifiers::NONE), Some(true));
    }

    #[test]
    fn new_press_releases_previous_gesture() {
        let mut ed = editor();
        let a = ed.add_node(Category::Verb).unwrap();
        let b = ed.add_node(Category::Verb).unwrap();
        let (ax, ay) = ed.graph().node(a).unwrap().position();
        let (bx, by) = ed.graph().node(b).unwrap().position();

        // The release of the first press never arrives.
        ed.pointer_down(ax, ay, Some(a));
        ed.pointer_move(ax + 40.0, ay);
        ed.pointer_down(bx, by, Some(b));

        assert!(!ed.graph().node(a).unwrap().is_pinned());
        assert!(ed.graph().node(b).unwrap().is_pinned());
        ed.pointer_up(bx, by);
        assert!(ed.graph().nodes.iter().all(|n| !n.is_pinned()));
        assert_eq!(ed.engine().simulation.alpha_target(), 0.0);
    }
}
