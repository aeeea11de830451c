pub mod document;
pub mod graph;
pub mod id;
pub mod layout;
pub mod model;

pub use document::{Document, ImportError, export_json, import_json};
pub use graph::{Graph, GraphSnapshot, RemovedNode};
pub use id::NodeId;
pub use layout::{LayoutConfig, Simulation, Viewport};
pub use model::*;
