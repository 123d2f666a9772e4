use crate::{
    domain::{
        BoardId, BoardView, Card, CardId, CardPatch, Column, ColumnId, ColumnOrder, ColumnPatch,
        NewCard, NewColumn,
    },
    error::Result,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod authority;
pub mod memory;

#[cfg(feature = "file-remote")]
pub mod file_remote;

pub use memory::InMemoryRemote;

#[cfg(feature = "file-remote")]
pub use file_remote::FileRemote;

/// Destination of a card move as sent to the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCardRequest {
    pub column_id: ColumnId,
    pub index: usize,
}

/// Operations of the remote service, used for error reporting and call
/// accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteOperation {
    FetchBoard,
    ReorderColumns,
    MoveCard,
    CreateColumn,
    UpdateColumn,
    DeleteColumn,
    CreateCard,
    UpdateCard,
    DeleteCard,
}

impl RemoteOperation {
    /// Human phrasing, e.g. "move card"
    pub fn describe(&self) -> &'static str {
        match self {
            Self::FetchBoard => "fetch board",
            Self::ReorderColumns => "reorder columns",
            Self::MoveCard => "move card",
            Self::CreateColumn => "create column",
            Self::UpdateColumn => "update column",
            Self::DeleteColumn => "delete column",
            Self::CreateCard => "create card",
            Self::UpdateCard => "update card",
            Self::DeleteCard => "delete card",
        }
    }
}

impl fmt::Display for RemoteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FetchBoard => "fetch_board",
            Self::ReorderColumns => "reorder_columns",
            Self::MoveCard => "move_card",
            Self::CreateColumn => "create_column",
            Self::UpdateColumn => "update_column",
            Self::DeleteColumn => "delete_column",
            Self::CreateCard => "create_card",
            Self::UpdateCard => "update_card",
            Self::DeleteCard => "delete_card",
        };
        f.write_str(name)
    }
}

/// Contract with the service that owns authoritative board state
///
/// The engine makes no assumption about transport. Every failure is reported
/// as an `Err`; there are no timeouts or retries at this layer.
#[async_trait]
pub trait RemoteSync: Send + Sync {
    /// Fetches a board with its columns, each column's cards sorted by order
    async fn fetch_board(&self, board_id: &BoardId) -> Result<BoardView>;

    /// Persists a full column order; entries must be dense and match their
    /// list position. An empty order is rejected with `InvalidOrder`.
    async fn reorder_columns(&self, order: &[ColumnOrder]) -> Result<()>;

    /// Moves a card from its current column to the requested position and
    /// returns its authoritative state
    async fn move_card(&self, card_id: &CardId, request: &MoveCardRequest) -> Result<Card>;

    /// Appends a new column to a board
    async fn create_column(&self, board_id: &BoardId, column: &NewColumn) -> Result<Column>;

    async fn update_column(&self, column_id: &ColumnId, patch: &ColumnPatch) -> Result<Column>;

    /// Deletes a column and its cards
    async fn delete_column(&self, column_id: &ColumnId) -> Result<()>;

    /// Appends a new card to a column
    async fn create_card(&self, column_id: &ColumnId, card: &NewCard) -> Result<Card>;

    async fn update_card(&self, card_id: &CardId, patch: &CardPatch) -> Result<Card>;

    async fn delete_card(&self, card_id: &CardId) -> Result<()>;
}
