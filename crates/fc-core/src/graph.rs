//! The graph store: ordered node and link sequences plus the mutation
//! primitives the editor builds on.
//!
//! Every structural operation either succeeds completely or leaves the graph
//! untouched. Removal hands back everything needed to put the graph back
//! exactly as it was (including sequence positions), which is what the undo
//! log records.

use crate::id::NodeId;
use crate::model::{Category, Link, Node, Pin};
use smallvec::SmallVec;

pub const UNTITLED: &str = "Untitled";

/// A flowchart document: name, nodes, and directed links.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    pub name: String,
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

/// A node taken out of the graph together with its incident links.
/// Indices are the positions the items occupied before removal.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedNode {
    pub node: Node,
    pub index: usize,
    pub links: SmallVec<[(usize, Link); 4]>,
}

/// Full copy of the node and link sequences (used by delete-all).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl Graph {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn start_node(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.category == Category::Start)
    }

    pub fn selected_node(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.selected)
    }

    pub fn last_node(&self) -> Option<&Node> {
        self.nodes.last()
    }

    /// Links with `id` as source or target, in sequence order.
    pub fn incident_links(&self, id: NodeId) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(move |l| l.touches(id))
    }

    // ─── Structural mutations ────────────────────────────────────────────

    /// The id a new node would receive: the node count plus one, bumped past
    /// any surviving node that already holds it.
    pub fn next_node_id(&self) -> NodeId {
        let mut n = self.nodes.len() + 1;
        loop {
            let id = NodeId::ordinal(n);
            if !self.contains(id) {
                return id;
            }
            n += 1;
        }
    }

    /// Append a new node. A second `Start` node is rejected (returns `None`,
    /// graph unchanged).
    pub fn add_node(&mut self, category: Category, content: impl Into<String>) -> Option<NodeId> {
        if category == Category::Start && self.start_node().is_some() {
            log::debug!("add_node rejected: graph already has a Start node");
            return None;
        }
        let id = self.next_node_id();
        self.nodes.push(Node::new(id, category, content));
        Some(id)
    }

    /// Append a link. Returns its index, or `None` if an endpoint is missing.
    pub fn add_link(&mut self, source: NodeId, target: NodeId) -> Option<usize> {
        if !self.contains(source) || !self.contains(target) {
            log::debug!("add_link rejected: {source} -> {target} has a missing endpoint");
            return None;
        }
        self.links.push(Link::new(source, target));
        Some(self.links.len() - 1)
    }

    pub fn remove_link_at(&mut self, index: usize) -> Option<Link> {
        (index < self.links.len()).then(|| self.links.remove(index))
    }

    /// Remove a node and, in the same step, every link touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Option<RemovedNode> {
        let index = self.index_of(id)?;
        let node = self.nodes.remove(index);

        let mut links = SmallVec::new();
        let mut kept = Vec::with_capacity(self.links.len());
        for (i, link) in self.links.drain(..).enumerate() {
            if link.touches(id) {
                links.push((i, link));
            } else {
                kept.push(link);
            }
        }
        self.links = kept;

        Some(RemovedNode { node, index, links })
    }

    /// Exact inverse of [`Graph::remove_node`].
    pub fn restore_node(&mut self, removed: RemovedNode) {
        let index = removed.index.min(self.nodes.len());
        self.nodes.insert(index, removed.node);
        // Ascending order reproduces the original positions.
        for (i, link) in removed.links {
            let i = i.min(self.links.len());
            self.links.insert(i, link);
        }
    }

    /// Clear both sequences, returning what was there.
    pub fn delete_all(&mut self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: std::mem::take(&mut self.nodes),
            links: std::mem::take(&mut self.links),
        }
    }

    pub fn restore(&mut self, snapshot: GraphSnapshot) {
        self.nodes = snapshot.nodes;
        self.links = snapshot.links;
    }

    // ─── In-place edits (not undoable) ───────────────────────────────────

    pub fn rename_node(&mut self, id: NodeId, text: impl Into<String>) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.content = text.into();
                true
            }
            None => false,
        }
    }

    pub fn rename_graph(&mut self, text: impl Into<String>) {
        self.name = text.into();
    }

    /// Mark `id` as the pending link source, unmarking any other node.
    pub fn set_selected(&mut self, id: NodeId, selected: bool) -> bool {
        if !self.contains(id) {
            return false;
        }
        for node in &mut self.nodes {
            node.selected = if node.id == id {
                selected
            } else {
                node.selected && !selected
            };
        }
        true
    }

    pub fn clear_selection(&mut self) {
        for node in &mut self.nodes {
            node.selected = false;
        }
    }

    /// Hand position ownership to the caller.
    pub fn pin(&mut self, id: NodeId, x: f32, y: f32) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.pin = Some(Pin { x, y });
                true
            }
            None => false,
        }
    }

    /// Give position ownership back to the simulation.
    pub fn unpin(&mut self, id: NodeId) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.pin = None;
                true
            }
            None => false,
        }
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new(UNTITLED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> NodeId {
        NodeId::intern(s)
    }

    #[test]
    fn ids_follow_node_count() {
        let mut g = Graph::default();
        assert_eq!(g.add_node(Category::Start, "Begin"), Some(id("1")));
        assert_eq!(g.add_node(Category::Verb, "Do"), Some(id("2")));
        assert_eq!(g.add_node(Category::End, "Stop"), Some(id("3")));
    }

    #[test]
    fn id_allocation_skips_surviving_ids() {
        let mut g = Graph::default();
        g.add_node(Category::New, "a");
        g.add_node(Category::New, "b");
        g.add_node(Category::New, "c");
        g.remove_node(id("1"));
        // len + 1 == 3 is still taken by "c".
        assert_eq!(g.add_node(Category::New, "d"), Some(id("4")));
    }

    #[test]
    fn second_start_is_a_noop() {
        let mut g = Graph::default();
        g.add_node(Category::Start, "Begin");
        let before = g.clone();
        assert_eq!(g.add_node(Category::Start, "Again"), None);
        assert_eq!(g, before);
    }

    #[test]
    fn links_to_missing_nodes_are_rejected() {
        let mut g = Graph::default();
        let a = g.add_node(Category::Verb, "a").unwrap();
        assert_eq!(g.add_link(a, id("nope")), None);
        assert!(g.links.is_empty());
        // Self-loops are allowed.
        assert_eq!(g.add_link(a, a), Some(0));
    }

    #[test]
    fn remove_then_restore_is_exact() {
        let mut g = Graph::default();
        let a = g.add_node(Category::Start, "a").unwrap();
        let b = g.add_node(Category::Verb, "b").unwrap();
        let c = g.add_node(Category::End, "c").unwrap();
        g.add_link(a, b);
        g.add_link(b, c);
        g.add_link(a, c);
        g.add_link(c, b);
        let before = g.clone();

        let removed = g.remove_node(b).unwrap();
        assert_eq!(removed.index, 1);
        assert_eq!(removed.links.len(), 3);
        assert!(g.links.iter().all(|l| !l.touches(b)));

        g.restore_node(removed);
        assert_eq!(g, before);
    }

    #[test]
    fn delete_all_roundtrip() {
        let mut g = Graph::default();
        let a = g.add_node(Category::Start, "a").unwrap();
        let b = g.add_node(Category::Verb, "b").unwrap();
        g.add_link(a, b);
        let before = g.clone();

        let snap = g.delete_all();
        assert!(g.nodes.is_empty() && g.links.is_empty());
        g.restore(snap);
        assert_eq!(g, before);
    }

    #[test]
    fn selection_is_exclusive() {
        let mut g = Graph::default();
        let a = g.add_node(Category::Verb, "a").unwrap();
        let b = g.add_node(Category::Verb, "b").unwrap();
        g.set_selected(a, true);
        g.set_selected(b, true);
        let selected: Vec<_> = g.nodes.iter().filter(|n| n.selected).map(|n| n.id).collect();
        assert_eq!(selected, vec![b]);
        g.set_selected(b, false);
        assert!(g.selected_node().is_none());
    }

    #[test]
    fn rename_and_pin() {
        let mut g = Graph::default();
        let a = g.add_node(Category::Decision, "?").unwrap();
        assert!(g.rename_node(a, "ok?"));
        assert!(!g.rename_node(id("zz"), "x"));
        g.rename_graph("Flow");
        assert_eq!(g.name, "Flow");
        assert_eq!(g.node(a).unwrap().content, "ok?");

        g.pin(a, 1.0, 2.0);
        assert_eq!(g.node(a).unwrap().pin, Some(Pin { x: 1.0, y: 2.0 }));
        g.unpin(a);
        assert!(!g.node(a).unwrap().is_pinned());
    }
}
