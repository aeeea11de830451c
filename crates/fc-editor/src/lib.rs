pub mod commands;
pub mod controller;
pub mod input;
pub mod shortcuts;
pub mod sync;
pub mod tools;

pub use controller::{Editor, EditorConfig, KeyOutcome};
