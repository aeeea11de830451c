//! Undo log.
//!
//! Every structural mutation (adding or removing nodes and links, clearing the
//! chart) pushes an [`UndoEntry`] that records exactly what is needed to put
//! the graph back. Undo pops the newest entry and applies its inverse.
//! Position and label edits are deliberately not recorded.

use crate::sync::SyncEngine;
use fc_core::id::NodeId;
use fc_core::{Graph, GraphSnapshot, Link, RemovedNode};

/// One reversible structural change.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoEntry {
    /// A node was appended; `link` is the index of the link created with it.
    AddNode { id: NodeId, link: Option<usize> },
    /// A link was appended at `index`.
    AddLink { index: usize, link: Link },
    /// A node and its incident links were removed.
    RemoveNode(RemovedNode),
    /// The chart was cleared.
    DeleteAll(GraphSnapshot),
}

/// Discriminant of an [`UndoEntry`], for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoKind {
    AddNode,
    AddLink,
    RemoveNode,
    DeleteAll,
}

impl UndoEntry {
    pub fn kind(&self) -> UndoKind {
        match self {
            UndoEntry::AddNode { .. } => UndoKind::AddNode,
            UndoEntry::AddLink { .. } => UndoKind::AddLink,
            UndoEntry::RemoveNode(_) => UndoKind::RemoveNode,
            UndoEntry::DeleteAll(_) => UndoKind::DeleteAll,
        }
    }
}

impl UndoKind {
    pub fn description(self) -> &'static str {
        match self {
            UndoKind::AddNode => "add node",
            UndoKind::AddLink => "add link",
            UndoKind::RemoveNode => "remove node",
            UndoKind::DeleteAll => "delete all",
        }
    }
}

/// Last-in-first-out log of undo entries.
pub struct UndoLog {
    entries: Vec<UndoEntry>,
    /// Maximum undo depth.
    max_depth: usize,
}

impl UndoLog {
    pub fn new(max_depth: usize) -> Self {
        Self {
            entries: Vec::with_capacity(max_depth.min(64)),
            max_depth,
        }
    }

    /// Record an entry, dropping the oldest once the depth is exceeded.
    pub fn push(&mut self, entry: UndoEntry) {
        self.entries.push(entry);
        if self.entries.len() > self.max_depth {
            self.entries.remove(0);
        }
    }

    /// Undo the newest entry. Returns `None` when there is nothing to undo.
    pub fn pop_and_apply(&mut self, engine: &mut SyncEngine) -> Option<UndoKind> {
        let entry = self.entries.pop()?;
        let kind = entry.kind();
        if apply_inverse(&mut engine.graph, entry) {
            engine.reseed();
        } else {
            log::warn!("undo of {} no longer matches the graph; skipped", kind.description());
        }
        Some(kind)
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn peek(&self) -> Option<&UndoEntry> {
        self.entries.last()
    }
}

/// Apply the inverse of `entry`. Returns `false` (graph untouched) if the
/// graph has drifted from what the entry expects.
fn apply_inverse(graph: &mut Graph, entry: UndoEntry) -> bool {
    match entry {
        UndoEntry::AddNode { id, link } => {
            let Some(index) = graph.index_of(id) else {
                return false;
            };
            if let Some(i) = link {
                match graph.links.get(i) {
                    Some(l) if l.target == id => {
                        graph.links.remove(i);
                    }
                    _ => return false,
                }
            }
            let removed = graph.remove_node(id);
            debug_assert!(removed.is_some_and(|r| r.index == index));
            true
        }
        UndoEntry::AddLink { index, link } => {
            if graph.links.get(index) != Some(&link) {
                return false;
            }
            graph.remove_link_at(index).is_some()
        }
        UndoEntry::RemoveNode(removed) => {
            if graph.contains(removed.node.id) {
                return false;
            }
            graph.restore_node(removed);
            true
        }
        UndoEntry::DeleteAll(snapshot) => {
            graph.restore(snapshot);
            true
        }
    }
}
