pub mod board;
pub mod card;
pub mod id;
pub mod ordering;

pub use board::{Board, BoardView, CardLocation, Column, ColumnOrder, ColumnPatch, NewColumn};
pub use card::{Card, CardPatch, NewCard, Priority};
pub use id::{BoardId, CardId, ColumnId};
pub use ordering::{is_dense, move_within_or_between, renumber, sort_by_order, Destination, Ordered};
