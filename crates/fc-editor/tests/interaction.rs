//! Integration tests: pointer, keyboard, and import flows through the
//! `Editor` controller.

use fc_core::id::NodeId;
use fc_core::{Category, Viewport};
use fc_editor::input::{InputEvent, Modifiers};
use fc_editor::shortcuts::ShortcutAction;
use fc_editor::tools::{InteractionState, ToolKind};
use fc_editor::{Editor, EditorConfig, KeyOutcome};
use pretty_assertions::assert_eq;

const CTRL: Modifiers = Modifiers {
    ctrl: true,
    ..Modifiers::NONE
};

fn checkout() -> Editor {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut editor = Editor::new(EditorConfig::default(), Viewport::default());
    editor
        .import_json(include_str!("fixtures/checkout.json"))
        .unwrap();
    editor
}

fn id(s: &str) -> NodeId {
    NodeId::intern(s)
}

fn selected_count(editor: &Editor) -> usize {
    editor.graph().nodes.iter().filter(|n| n.selected).count()
}

fn outcome(action: ShortcutAction, changed: bool) -> Option<KeyOutcome> {
    Some(KeyOutcome { action, changed })
}

/// Press on a node and move it well past the click slop, without releasing.
fn start_drag(editor: &mut Editor, target: NodeId) {
    let (x, y) = editor.graph().node(target).unwrap().position();
    editor.pointer_down(x, y, Some(target));
    editor.pointer_move(x + 50.0, y);
    assert!(editor.is_dragging());
    assert!(editor.graph().node(target).unwrap().is_pinned());
}

/// Nothing pinned, drag energy released, and the layout comes to rest.
fn assert_released(editor: &mut Editor) {
    assert!(!editor.is_dragging());
    assert!(editor.graph().nodes.iter().all(|n| !n.is_pinned()));
    assert_eq!(editor.engine().simulation.alpha_target(), 0.0);
    let mut ticks = 0;
    while editor.tick() {
        ticks += 1;
        assert!(ticks < 2000, "layout never settled");
    }
    assert!(!editor.is_settling());
}

/// Press and release on a node without moving.
fn tap(editor: &mut Editor, target: NodeId) {
    let (x, y) = editor.graph().node(target).unwrap().position();
    for event in [InputEvent::pointer_down(x, y), InputEvent::pointer_up(x, y)] {
        assert_eq!(event.position(), Some((x, y)));
        editor.handle_event(&event, Some(target));
    }
}

// ─── Import ─────────────────────────────────────────────────────────────

#[test]
fn malformed_import_leaves_graph_untouched() {
    let mut editor = checkout();
    let before = editor.export_json();
    let undo_before = editor.undo_len();

    assert!(editor.import_json("{not valid").is_err());
    assert_eq!(editor.export_json(), before);
    assert_eq!(editor.undo_len(), undo_before);
}

#[test]
fn import_drops_pending_state() {
    let mut editor = checkout();
    editor.toggle_tool(ToolKind::Pencil);
    editor.click(id("2"));
    editor.add_node(Category::End);
    assert!(editor.can_undo());

    editor
        .import_json(include_str!("fixtures/checkout.json"))
        .unwrap();
    assert_eq!(editor.state(), &InteractionState::Pencil { source: None });
    assert!(!editor.can_undo());
    assert_eq!(editor.graph().name, "Checkout");
}

// ─── Tools ──────────────────────────────────────────────────────────────

#[test]
fn pencil_and_eraser_never_both_active() {
    let mut editor = checkout();
    let sequence = [
        ToolKind::Pencil,
        ToolKind::Eraser,
        ToolKind::Eraser,
        ToolKind::Eraser,
        ToolKind::Pencil,
        ToolKind::Pencil,
    ];
    let mut expected = None;
    for tool in sequence {
        expected = if expected == Some(tool) { None } else { Some(tool) };
        editor.toggle_tool(tool);
        assert_eq!(editor.active_tool(), expected);
    }
}

#[test]
fn at_most_one_node_selected() {
    let mut editor = checkout();
    editor.toggle_tool(ToolKind::Pencil);
    for target in ["1", "2", "2", "3", "4", "5", "1"] {
        editor.click(id(target));
        assert!(selected_count(&editor) <= 1);
    }
    editor.toggle_tool(ToolKind::Eraser);
    assert_eq!(selected_count(&editor), 0);
}

#[test]
fn tap_with_eraser_deletes() {
    let mut editor = checkout();
    editor.toggle_tool(ToolKind::Eraser);
    tap(&mut editor, id("5"));
    assert!(!editor.graph().contains(id("5")));
    assert_eq!(editor.graph().nodes.len(), 4);
}

#[test]
fn tap_without_tool_edits_label() {
    let mut editor = checkout();
    tap(&mut editor, id("4"));
    assert_eq!(editor.edit_target(), Some((id("4"), "Pay")));

    editor.set_draft("Pay now");
    // Pressing on empty canvas commits.
    editor.pointer_down(0.0, 0.0, None);
    editor.pointer_up(0.0, 0.0);
    assert_eq!(editor.edit_target(), None);
    assert_eq!(editor.graph().node(id("4")).unwrap().content, "Pay now");
}

#[test]
fn dragging_moves_without_clicking() {
    let mut editor = checkout();
    editor.toggle_tool(ToolKind::Eraser);
    let target = id("3");
    let (x, y) = editor.graph().node(target).unwrap().position();

    editor.pointer_down(x, y, Some(target));
    editor.pointer_move(x + 40.0, y + 30.0);
    for _ in 0..5 {
        editor.tick();
    }
    assert_eq!(
        editor.graph().node(target).unwrap().position(),
        (x + 40.0, y + 30.0)
    );
    editor.pointer_up(x + 40.0, y + 30.0);

    // A drag is not an erase.
    assert!(editor.graph().contains(target));
    assert!(!editor.graph().node(target).unwrap().is_pinned());
}

// ─── Interrupted drags ──────────────────────────────────────────────────

#[test]
fn undo_during_drag_releases_node() {
    let mut editor = checkout();
    editor.add_node(Category::Action);
    start_drag(&mut editor, id("2"));

    editor.undo();
    assert_eq!(editor.graph().nodes.len(), 5);
    assert_released(&mut editor);
}

#[test]
fn delete_all_during_drag_then_undo_restores_unpinned() {
    let mut editor = checkout();
    editor.add_node(Category::Action);
    start_drag(&mut editor, id("4"));

    assert!(editor.delete_all());
    assert!(editor.graph().is_empty());
    assert_released(&mut editor);

    editor.undo();
    assert_eq!(editor.graph().nodes.len(), 6);
    assert!(!editor.graph().node(id("4")).unwrap().is_pinned());
    assert_released(&mut editor);

    // The stray release from the abandoned gesture is ignored.
    assert!(!editor.pointer_up(0.0, 0.0));
}

#[test]
fn import_during_drag_releases_energy() {
    let mut editor = checkout();
    start_drag(&mut editor, id("3"));

    editor
        .import_json(include_str!("fixtures/checkout.json"))
        .unwrap();
    assert_eq!(editor.graph().nodes.len(), 5);
    assert_released(&mut editor);
}

#[test]
fn failed_import_keeps_drag_alive() {
    let mut editor = checkout();
    start_drag(&mut editor, id("3"));

    assert!(editor.import_json("{").is_err());
    assert!(editor.is_dragging());
    assert!(editor.graph().node(id("3")).unwrap().is_pinned());

    let (x, y) = editor.graph().node(id("3")).unwrap().position();
    editor.pointer_up(x, y);
    assert_released(&mut editor);
}

// ─── Keyboard ───────────────────────────────────────────────────────────

#[test]
fn shortcuts_drive_tools_and_undo() {
    let mut editor = checkout();
    assert_eq!(
        editor.handle_key("e", Modifiers::NONE, false),
        outcome(ShortcutAction::ToggleEraser, true)
    );
    editor.click(id("5"));
    assert_eq!(editor.graph().nodes.len(), 4);

    assert_eq!(
        editor.handle_key("z", CTRL, false),
        outcome(ShortcutAction::Undo, true)
    );
    assert_eq!(editor.graph().nodes.len(), 5);
    assert_eq!(
        editor.handle_key("z", CTRL, false),
        outcome(ShortcutAction::Undo, false)
    );

    editor.handle_event(&InputEvent::key("p", Modifiers::NONE), None);
    assert_eq!(editor.active_tool(), Some(ToolKind::Pencil));
}

#[test]
fn undo_shortcut_ignored_while_typing() {
    let mut editor = checkout();
    editor.add_node(Category::Action);
    let nodes = editor.graph().nodes.len();

    // Host-owned input (the title field) has focus.
    assert_eq!(editor.handle_key("z", CTRL, true), None);
    assert_eq!(editor.graph().nodes.len(), nodes);

    // The label overlay is open.
    editor.click(id("1"));
    assert_eq!(editor.handle_key("z", CTRL, false), None);
    assert_eq!(editor.graph().nodes.len(), nodes);

    editor.set_draft("Basket");
    assert_eq!(
        editor.handle_key("Enter", Modifiers::NONE, false),
        outcome(ShortcutAction::CommitText, true)
    );
    assert_eq!(editor.graph().node(id("1")).unwrap().content, "Basket");
}

#[test]
fn view_shortcuts_are_left_to_the_host() {
    let mut editor = checkout();
    let before = editor.export_json();
    assert_eq!(
        editor.handle_key("+", Modifiers::NONE, false),
        outcome(ShortcutAction::ZoomIn, false)
    );
    assert_eq!(editor.export_json(), before);
}

#[test]
fn escape_with_nothing_open_reports_no_change() {
    let mut editor = checkout();
    assert_eq!(
        editor.handle_key("Escape", Modifiers::NONE, false),
        outcome(ShortcutAction::Cancel, false)
    );
    assert!(!editor.handle_event(&InputEvent::key("Escape", Modifiers::NONE), None));

    editor.toggle_tool(ToolKind::Pencil);
    assert!(editor.handle_event(&InputEvent::key("Escape", Modifiers::NONE), None));
    assert_eq!(editor.active_tool(), None);
}
