//! Interaction state machine.
//!
//! One [`InteractionState`] value describes what a click on a node means.
//! Pencil and eraser are variants of the same enum, so both being active at
//! once cannot be represented. Clicks are translated into `GraphMutation`s
//! that the controller applies via the `SyncEngine`.
//!
//! Dragging is independent of the active tool and lives in [`DragGesture`].

use crate::sync::GraphMutation;
use fc_core::Graph;
use fc_core::id::NodeId;

/// Toolbar tools. No tool active means clicks edit labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// Two-click link drawing.
    Pencil,
    /// Delete-on-click.
    Eraser,
}

impl ToolKind {
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Pencil => "pencil",
            ToolKind::Eraser => "eraser",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pencil" => Some(ToolKind::Pencil),
            "eraser" => Some(ToolKind::Eraser),
            _ => None,
        }
    }
}

/// The editor's interaction mode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InteractionState {
    /// No tool; clicking a node opens its label editor.
    #[default]
    Idle,
    /// Pencil active. `Some(source)` means a link source is pending.
    Pencil { source: Option<NodeId> },
    /// Eraser active.
    Eraser,
    /// A node's label is being edited through an overlay input.
    TextEditing { id: NodeId, draft: String },
}

impl InteractionState {
    pub fn active_tool(&self) -> Option<ToolKind> {
        match self {
            InteractionState::Pencil { .. } => Some(ToolKind::Pencil),
            InteractionState::Eraser => Some(ToolKind::Eraser),
            InteractionState::Idle | InteractionState::TextEditing { .. } => None,
        }
    }

    pub fn pending_source(&self) -> Option<NodeId> {
        match self {
            InteractionState::Pencil { source } => *source,
            _ => None,
        }
    }

    pub fn is_text_editing(&self) -> bool {
        matches!(self, InteractionState::TextEditing { .. })
    }

    /// Leave the current state. Returns the mutations needed to clean up
    /// after it (unmarking a pending link source).
    fn exit(&mut self) -> Vec<GraphMutation> {
        match std::mem::take(self) {
            InteractionState::Pencil { source: Some(id) } => vec![GraphMutation::Select {
                id,
                selected: false,
            }],
            _ => vec![],
        }
    }

    /// Toggle a toolbar tool. Activating one tool deactivates the other;
    /// toggling the active tool turns it off. A label edit in progress must
    /// be committed by the caller beforehand.
    pub fn toggle(&mut self, tool: ToolKind) -> Vec<GraphMutation> {
        let was_active = self.active_tool() == Some(tool);
        let mutations = self.exit();
        if !was_active {
            *self = match tool {
                ToolKind::Pencil => InteractionState::Pencil { source: None },
                ToolKind::Eraser => InteractionState::Eraser,
            };
        }
        log::debug!("tool toggled: {:?} -> {:?}", tool, self.active_tool());
        mutations
    }

    /// Deactivate whichever tool is active.
    pub fn drop_tool(&mut self) -> Vec<GraphMutation> {
        if self.active_tool().is_some() {
            self.exit()
        } else {
            vec![]
        }
    }

    /// Route a click on `target` according to the active tool.
    pub fn click(&mut self, target: NodeId, graph: &Graph) -> Vec<GraphMutation> {
        if !graph.contains(target) {
            return vec![];
        }
        if let InteractionState::Eraser = self {
            return vec![GraphMutation::RemoveNode { id: target }];
        }
        if let InteractionState::Pencil { source } = self {
            return match source.take() {
                None => {
                    *source = Some(target);
                    vec![GraphMutation::Select {
                        id: target,
                        selected: true,
                    }]
                }
                Some(pending) if pending == target => vec![GraphMutation::Select {
                    id: target,
                    selected: false,
                }],
                Some(pending) => vec![
                    GraphMutation::AddLink {
                        source: pending,
                        target,
                    },
                    GraphMutation::Select {
                        id: pending,
                        selected: false,
                    },
                ],
            };
        }

        if let InteractionState::TextEditing { id, .. } = self
            && *id == target
        {
            return vec![];
        }

        // Opening another node's editor commits the current one.
        let mutations = self.commit_text();
        let draft = graph
            .node(target)
            .map(|n| n.content.clone())
            .unwrap_or_default();
        *self = InteractionState::TextEditing { id: target, draft };
        mutations
    }

    /// Replace the draft text of an open label editor.
    pub fn set_draft(&mut self, text: &str) -> bool {
        match self {
            InteractionState::TextEditing { draft, .. } => {
                text.clone_into(draft);
                true
            }
            _ => false,
        }
    }

    /// Close the label editor, writing the draft back.
    pub fn commit_text(&mut self) -> Vec<GraphMutation> {
        match std::mem::take(self) {
            InteractionState::TextEditing { id, draft } => {
                vec![GraphMutation::RenameNode { id, content: draft }]
            }
            other => {
                *self = other;
                vec![]
            }
        }
    }

    /// Close the label editor, discarding the draft.
    pub fn cancel_text(&mut self) -> bool {
        if self.is_text_editing() {
            *self = InteractionState::Idle;
            true
        } else {
            false
        }
    }

    /// Drop a pending link source but keep the pencil active.
    pub fn clear_pending(&mut self) -> Vec<GraphMutation> {
        match self {
            InteractionState::Pencil { source } => source
                .take()
                .map(|id| GraphMutation::Select {
                    id,
                    selected: false,
                })
                .into_iter()
                .collect(),
            _ => vec![],
        }
    }

    /// State to carry over when the whole graph is replaced. The tool stays
    /// active; references into the old graph go, along with any open label
    /// edit. Nothing is returned because the old graph is discarded.
    pub fn reset_for_new_graph(&mut self) {
        match self {
            InteractionState::Pencil { source } => *source = None,
            InteractionState::TextEditing { .. } => *self = InteractionState::Idle,
            InteractionState::Idle | InteractionState::Eraser => {}
        }
    }

    /// Forget references to nodes that no longer exist (after undo/import).
    pub fn forget_missing(&mut self, graph: &Graph) {
        let stale_edit = matches!(
            self,
            InteractionState::TextEditing { id, .. } if !graph.contains(*id)
        );
        if stale_edit {
            *self = InteractionState::Idle;
        } else if let InteractionState::Pencil { source } = self
            && source.is_some_and(|id| !graph.contains(id))
        {
            *source = None;
        }
    }
}

// ─── Drag gesture ────────────────────────────────────────────────────────

/// A press on a node that becomes a drag once the pointer leaves the slop.
///
/// The node is pinned from press to release, so the simulation treats it as
/// fixed while its neighbours keep reacting.
#[derive(Debug, Clone, PartialEq)]
pub struct DragGesture {
    pub id: NodeId,
    start: (f32, f32),
    /// Pointer position minus node position at press time.
    grab: (f32, f32),
    slop: f32,
    pub moved: bool,
}

impl DragGesture {
    /// Start a gesture on `id`; returns the pin mutation.
    pub fn begin(id: NodeId, x: f32, y: f32, graph: &Graph, slop: f32) -> Option<(Self, GraphMutation)> {
        let node = graph.node(id)?;
        let gesture = Self {
            id,
            start: (x, y),
            grab: (x - node.x, y - node.y),
            slop,
            moved: false,
        };
        Some((
            gesture,
            GraphMutation::Pin {
                id,
                x: node.x,
                y: node.y,
            },
        ))
    }

    /// Follow the pointer; returns the updated pin once the slop is left.
    pub fn update(&mut self, x: f32, y: f32) -> Option<GraphMutation> {
        if !self.moved {
            let (dx, dy) = (x - self.start.0, y - self.start.1);
            if dx * dx + dy * dy <= self.slop * self.slop {
                return None;
            }
            self.moved = true;
        }
        Some(GraphMutation::Pin {
            id: self.id,
            x: x - self.grab.0,
            y: y - self.grab.1,
        })
    }

    /// Release the pin. A gesture that never moved is reported as a click.
    pub fn end(self) -> (GraphMutation, Option<NodeId>) {
        let click = (!self.moved).then_some(self.id);
        (GraphMutation::Unpin { id: self.id }, click)
    }
}
