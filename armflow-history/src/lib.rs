//! Armflow History
//!
//! Bounded undo/redo over ARM template snapshots, with a file-backed
//! store so an editing session can be persisted and resumed.

pub mod history;
pub mod store;

// Re-export main types for convenience
pub use history::{Snapshot, TemplateHistory};
pub use store::{HistoryFile, HistoryStore, StoreError};
