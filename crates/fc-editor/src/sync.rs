//! Sync engine: graph store ↔ layout simulation.
//!
//! The engine owns the authoritative [`Graph`] and the [`Simulation`] that
//! positions it. Every edit goes through [`SyncEngine::apply_mutation`]:
//!
//! - **Structural** mutations (add/remove nodes and links, delete-all) change
//!   the node or link sequences, reseed the simulation so the chart settles
//!   again, and hand back an [`UndoEntry`] describing the exact inverse.
//! - **In-place** mutations (labels, selection marker, pins) edit fields of
//!   existing nodes and are never undoable.

use crate::commands::UndoEntry;
use fc_core::id::NodeId;
use fc_core::{Category, Graph, ImportError, LayoutConfig, Simulation, Viewport};

/// A mutation requested by a tool, the toolbar, or the host.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphMutation {
    /// Append a node; with `chain`, also link the previously last node to it.
    AddNode {
        category: Category,
        content: String,
        chain: bool,
    },
    AddLink {
        source: NodeId,
        target: NodeId,
    },
    RemoveNode {
        id: NodeId,
    },
    DeleteAll,
    RenameNode {
        id: NodeId,
        content: String,
    },
    RenameGraph {
        name: String,
    },
    /// Set or clear the pending link-source marker.
    Select {
        id: NodeId,
        selected: bool,
    },
    ClearSelection,
    Pin {
        id: NodeId,
        x: f32,
        y: f32,
    },
    Unpin {
        id: NodeId,
    },
}

impl GraphMutation {
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::AddNode { .. } | Self::AddLink { .. } | Self::RemoveNode { .. } | Self::DeleteAll
        )
    }
}

/// Result of applying one mutation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Applied {
    /// Whether the graph changed at all.
    pub changed: bool,
    /// Inverse record for structural changes.
    pub undo: Option<UndoEntry>,
}

impl Applied {
    fn unchanged() -> Self {
        Self::default()
    }

    fn changed(changed: bool) -> Self {
        Self {
            changed,
            undo: None,
        }
    }

    fn undoable(entry: UndoEntry) -> Self {
        Self {
            changed: true,
            undo: Some(entry),
        }
    }
}

/// Holds the graph and its layout and keeps the two consistent.
pub struct SyncEngine {
    /// The current graph (single source of truth).
    pub graph: Graph,

    /// The force simulation positioning `graph`.
    pub simulation: Simulation,
}

impl SyncEngine {
    /// Create an engine around an empty, untitled graph.
    pub fn new(config: LayoutConfig, viewport: Viewport) -> Self {
        Self::with_graph(Graph::default(), config, viewport)
    }

    pub fn with_graph(mut graph: Graph, config: LayoutConfig, viewport: Viewport) -> Self {
        let mut simulation = Simulation::new(config, viewport);
        simulation.reseed(&mut graph);
        Self { graph, simulation }
    }

    /// Create an engine from a JSON document.
    pub fn from_json(text: &str, config: LayoutConfig, viewport: Viewport) -> Result<Self, ImportError> {
        let graph = fc_core::import_json(text)?;
        Ok(Self::with_graph(graph, config, viewport))
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Apply a mutation. Structural changes reseed the layout.
    pub fn apply_mutation(&mut self, mutation: GraphMutation) -> Applied {
        let structural = mutation.is_structural();
        let applied = match mutation {
            GraphMutation::AddNode {
                category,
                content,
                chain,
            } => {
                let previous = self.graph.last_node().map(|n| n.id);
                match self.graph.add_node(category, content) {
                    Some(id) => {
                        let link = match (chain, previous) {
                            (true, Some(prev)) => self.graph.add_link(prev, id),
                            _ => None,
                        };
                        Applied::undoable(UndoEntry::AddNode { id, link })
                    }
                    None => Applied::unchanged(),
                }
            }
            GraphMutation::AddLink { source, target } => {
                match self.graph.add_link(source, target) {
                    Some(index) => Applied::undoable(UndoEntry::AddLink {
                        index,
                        link: self.graph.links[index],
                    }),
                    None => Applied::unchanged(),
                }
            }
            GraphMutation::RemoveNode { id } => match self.graph.remove_node(id) {
                Some(removed) => Applied::undoable(UndoEntry::RemoveNode(removed)),
                None => Applied::unchanged(),
            },
            GraphMutation::DeleteAll => {
                if self.graph.nodes.is_empty() && self.graph.links.is_empty() {
                    Applied::unchanged()
                } else {
                    Applied::undoable(UndoEntry::DeleteAll(self.graph.delete_all()))
                }
            }
            GraphMutation::RenameNode { id, content } => {
                Applied::changed(self.graph.rename_node(id, content))
            }
            GraphMutation::RenameGraph { name } => {
                let changed = self.graph.name != name;
                self.graph.rename_graph(name);
                Applied::changed(changed)
            }
            GraphMutation::Select { id, selected } => {
                Applied::changed(self.graph.set_selected(id, selected))
            }
            GraphMutation::ClearSelection => {
                let changed = self.graph.selected_node().is_some();
                self.graph.clear_selection();
                Applied::changed(changed)
            }
            GraphMutation::Pin { id, x, y } => Applied::changed(self.graph.pin(id, x, y)),
            GraphMutation::Unpin { id } => Applied::changed(self.graph.unpin(id)),
        };

        if structural && applied.changed {
            self.reseed();
        }
        applied
    }

    /// Replace the whole graph (file import) and restart the layout.
    pub fn replace_graph(&mut self, graph: Graph) {
        self.graph = graph;
        self.reseed();
    }

    // ─── Layout ──────────────────────────────────────────────────────────

    /// Restart the simulation from current positions at full energy.
    pub fn reseed(&mut self) {
        self.simulation.reseed(&mut self.graph);
    }

    /// Advance the layout by one step. Returns whether it is still running.
    pub fn tick(&mut self) -> bool {
        self.simulation.tick(&mut self.graph)
    }

    pub fn is_settling(&self) -> bool {
        self.simulation.is_running()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.simulation.set_viewport(viewport);
    }
}
