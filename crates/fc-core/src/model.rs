//! Core data model for flowchart documents.
//!
//! A flowchart is an ordered list of typed nodes joined by directed links.
//! Links refer to nodes by id only; endpoint coordinates are always read from
//! the nodes themselves. Node positions are written by the layout simulation
//! unless the node is pinned, in which case the pin holder owns them.

use crate::id::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Category ────────────────────────────────────────────────────────────

/// The flowchart role of a node. Serialized by name (`"Decision"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Start,
    Decision,
    Verb,
    End,
    Action,
    New,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Start,
        Category::Decision,
        Category::Verb,
        Category::End,
        Category::Action,
        Category::New,
    ];

    /// Label given to a node created from the toolbar.
    pub fn default_label(self) -> &'static str {
        match self {
            Category::Start => "Start",
            Category::Decision => "Decision",
            Category::Verb => "Verb",
            Category::End => "End",
            Category::Action => "Action",
            Category::New => "New Node",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Start => "Start",
            Category::Decision => "Decision",
            Category::Verb => "Verb",
            Category::End => "End",
            Category::Action => "Action",
            Category::New => "New",
        }
    }

    /// Case-insensitive lookup, used by the browser toolbar.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// A fixed position that overrides the simulation (d3's `fx`/`fy`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pin {
    pub x: f32,
    pub y: f32,
}

/// A single flowchart node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub category: Category,
    /// User-editable label.
    pub content: String,

    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,

    /// `Some` while a drag holds the position; the simulation then only
    /// copies the pin into `x`/`y`.
    pub pin: Option<Pin>,

    /// Pending link source of the pencil tool.
    pub selected: bool,

    /// `false` until the layout engine assigns an initial position.
    pub placed: bool,
}

impl Node {
    pub fn new(id: NodeId, category: Category, content: impl Into<String>) -> Self {
        Self {
            id,
            category,
            content: content.into(),
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            pin: None,
            selected: false,
            placed: false,
        }
    }

    /// Place the node at a fixed position (tests, programmatic layouts).
    #[must_use]
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self.placed = true;
        self
    }

    pub fn is_pinned(&self) -> bool {
        self.pin.is_some()
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

// ─── Links ───────────────────────────────────────────────────────────────

/// A directed link between two nodes. Self-loops and duplicates are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub source: NodeId,
    pub target: NodeId,
}

impl Link {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self { source, target }
    }

    pub fn touches(&self, id: NodeId) -> bool {
        self.source == id || self.target == id
    }
}
