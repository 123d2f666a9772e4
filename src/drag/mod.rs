//! Drag-and-drop interaction: typed subjects and targets, drop resolution
//! and the drag session state machine.

pub mod resolve;
pub mod session;
pub mod subject;

pub use resolve::{resolve_column_drop, resolve_drop, DropResolution};
pub use session::{DragController, DragOutcome, DragSession, DragState};
pub use subject::{DragIdCodec, DragSubject, DropTarget, SubjectKind};
