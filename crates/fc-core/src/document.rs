//! JSON document format.
//!
//! ```json
//! { "name": "Checkout",
//!   "nodes": [ { "id": "1", "category": "Start", "content": "Begin" } ],
//!   "links": [ { "source": "1", "target": "2" } ] }
//! ```
//!
//! Export keeps only `{id, category, content}` per node and `{source, target}`
//! per link; positions and editor flags never leave the process. Import
//! validates ids and link endpoints and returns unplaced nodes, so the layout
//! engine assigns fresh positions on the next reseed.

use crate::graph::{Graph, UNTITLED};
use crate::id::NodeId;
use crate::model::{Category, Link, Node};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors surfaced when reading a document. The caller's graph is never
/// touched on error.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid flowchart JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate node id \"{0}\"")]
    DuplicateNodeId(String),
    #[error("link {from} -> {to} refers to a missing node")]
    DanglingLink { from: String, to: String },
}

/// Wire representation of a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default = "untitled")]
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub category: Category,
    #[serde(default)]
    pub content: String,
}

fn untitled() -> String {
    UNTITLED.to_string()
}

impl Document {
    pub fn from_graph(graph: &Graph) -> Self {
        Self {
            name: graph.name.clone(),
            nodes: graph
                .nodes
                .iter()
                .map(|n| NodeRecord {
                    id: n.id,
                    category: n.category,
                    content: n.content.clone(),
                })
                .collect(),
            links: graph.links.clone(),
        }
    }

    /// Validate and build a graph with unplaced nodes.
    pub fn into_graph(self) -> Result<Graph, ImportError> {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        for record in &self.nodes {
            if !seen.insert(record.id) {
                return Err(ImportError::DuplicateNodeId(record.id.to_string()));
            }
        }
        if let Some(link) = self
            .links
            .iter()
            .find(|l| !seen.contains(&l.source) || !seen.contains(&l.target))
        {
            return Err(ImportError::DanglingLink {
                from: link.source.to_string(),
                to: link.target.to_string(),
            });
        }

        Ok(Graph {
            name: self.name,
            nodes: self
                .nodes
                .into_iter()
                .map(|r| Node::new(r.id, r.category, r.content))
                .collect(),
            links: self.links,
        })
    }
}

/// Serialize a graph to pretty-printed JSON.
pub fn export_json(graph: &Graph) -> String {
    // Plain strings and enums only, so serialization cannot fail.
    serde_json::to_string_pretty(&Document::from_graph(graph)).unwrap_or_default()
}

/// Parse a document. On failure nothing is modified and the error describes
/// what the user should fix.
pub fn import_json(text: &str) -> Result<Graph, ImportError> {
    let doc: Document = serde_json::from_str(text)?;
    let graph = doc.into_graph()?;
    log::debug!(
        "imported \"{}\": {} nodes, {} links",
        graph.name,
        graph.nodes.len(),
        graph.links.len()
    );
    Ok(graph)
}
