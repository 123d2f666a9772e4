//! # BoardSync Core
//!
//! Drag-and-drop ordering and optimistic synchronization for kanban boards.
//!
//! This crate keeps a local board in dense order while cards and columns are
//! dragged, applies moves optimistically and reconciles them against a
//! remote service behind the [`RemoteSync`] trait. It has no dependency on a
//! specific UI toolkit or transport.

pub mod config;
pub mod domain;
pub mod drag;
pub mod error;
pub mod remote;
pub mod store;

// Re-export commonly used types
pub use config::SyncConfig;
pub use domain::{
    board::{Board, BoardView, Column, ColumnOrder},
    card::{Card, Priority},
    id::{BoardId, CardId, ColumnId},
};
pub use drag::{DragController, DragOutcome, DragSubject, DropTarget};
pub use error::{BoardSyncError, Result};
pub use remote::{InMemoryRemote, RemoteSync};
pub use store::BoardStore;
