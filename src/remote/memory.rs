use crate::{
    domain::{
        BoardId, BoardView, Card, CardId, CardPatch, Column, ColumnId, ColumnOrder, ColumnPatch,
        NewCard, NewColumn,
    },
    error::{BoardSyncError, Result},
    remote::{authority, MoveCardRequest, RemoteOperation, RemoteSync},
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

/// Injected failure behaviour for one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    Times(usize),
    Always,
}

#[derive(Debug, Default)]
struct State {
    boards: HashMap<BoardId, BoardView>,
    failures: HashMap<RemoteOperation, Failure>,
    calls: HashMap<RemoteOperation, usize>,
}

impl State {
    fn board_mut(&mut self, board_id: &BoardId) -> Result<&mut BoardView> {
        self.boards
            .get_mut(board_id)
            .ok_or_else(|| BoardSyncError::BoardNotFound(board_id.to_string()))
    }

    fn board_with_column(&mut self, column_id: &ColumnId) -> Result<&mut BoardView> {
        self.boards
            .values_mut()
            .find(|view| view.find_column(column_id).is_some())
            .ok_or_else(|| BoardSyncError::ColumnNotFound(column_id.to_string()))
    }

    fn board_with_card(&mut self, card_id: &CardId) -> Result<&mut BoardView> {
        self.boards
            .values_mut()
            .find(|view| view.find_card(card_id).is_some())
            .ok_or_else(|| BoardSyncError::CardNotFound(card_id.to_string()))
    }
}

/// Authoritative board service held in memory
///
/// Besides serving as an offline backend it records how often each
/// operation was called and can be told to reject calls, which is how the
/// engine's recovery paths are exercised.
#[derive(Debug, Default)]
pub struct InMemoryRemote {
    state: Mutex<State>,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a board, normalizing it first
    pub fn with_board(self, view: BoardView) -> Self {
        self.insert_board(view);
        self
    }

    pub fn insert_board(&self, mut view: BoardView) {
        view.normalize();
        self.state().boards.insert(view.board.id.clone(), view);
    }

    /// Stores a board exactly as given, so `fetch_board` serves it unsorted
    #[cfg(test)]
    pub(crate) fn insert_raw_board(&self, view: BoardView) {
        self.state().boards.insert(view.board.id.clone(), view);
    }

    /// Current authoritative state of a board, without counting a call
    pub fn snapshot(&self, board_id: &BoardId) -> Option<BoardView> {
        self.state().boards.get(board_id).cloned()
    }

    /// Rejects the next `times` calls of `operation`
    pub fn fail_next(&self, operation: RemoteOperation, times: usize) {
        self.state().failures.insert(operation, Failure::Times(times));
    }

    /// Rejects every call of `operation` until cleared
    pub fn fail_always(&self, operation: RemoteOperation) {
        self.state().failures.insert(operation, Failure::Always);
    }

    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }

    /// Number of calls made to `operation`, including rejected ones
    pub fn calls(&self, operation: RemoteOperation) -> usize {
        self.state().calls.get(&operation).copied().unwrap_or(0)
    }

    pub fn reset_calls(&self) {
        self.state().calls.clear();
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Counts the call and applies any injected failure
    fn begin(&self, operation: RemoteOperation) -> Result<MutexGuard<'_, State>> {
        let mut state = self.state();
        *state.calls.entry(operation).or_insert(0) += 1;

        let reject = match state.failures.get(&operation).copied() {
            Some(Failure::Always) => true,
            Some(Failure::Times(n)) if n > 0 => {
                if n == 1 {
                    state.failures.remove(&operation);
                } else {
                    state.failures.insert(operation, Failure::Times(n - 1));
                }
                true
            }
            _ => false,
        };

        if reject {
            tracing::debug!(%operation, "rejecting call by injected failure");
            return Err(BoardSyncError::Remote(format!(
                "{} rejected by remote",
                operation
            )));
        }
        Ok(state)
    }
}

#[async_trait]
impl RemoteSync for InMemoryRemote {
    async fn fetch_board(&self, board_id: &BoardId) -> Result<BoardView> {
        let mut state = self.begin(RemoteOperation::FetchBoard)?;
        Ok(state.board_mut(board_id)?.clone())
    }

    async fn reorder_columns(&self, order: &[ColumnOrder]) -> Result<()> {
        let mut state = self.begin(RemoteOperation::ReorderColumns)?;
        let Some(first) = order.first() else {
            return Err(BoardSyncError::InvalidOrder("column order is empty".to_string()));
        };
        let view = state.board_with_column(&first.column_id)?;
        authority::reorder_columns(view, order)
    }

    async fn move_card(&self, card_id: &CardId, request: &MoveCardRequest) -> Result<Card> {
        let mut state = self.begin(RemoteOperation::MoveCard)?;
        let view = state.board_with_card(card_id)?;
        authority::move_card(view, card_id, request)
    }

    async fn create_column(&self, board_id: &BoardId, column: &NewColumn) -> Result<Column> {
        let mut state = self.begin(RemoteOperation::CreateColumn)?;
        authority::create_column(state.board_mut(board_id)?, column)
    }

    async fn update_column(&self, column_id: &ColumnId, patch: &ColumnPatch) -> Result<Column> {
        let mut state = self.begin(RemoteOperation::UpdateColumn)?;
        authority::update_column(state.board_with_column(column_id)?, column_id, patch)
    }

    async fn delete_column(&self, column_id: &ColumnId) -> Result<()> {
        let mut state = self.begin(RemoteOperation::DeleteColumn)?;
        authority::delete_column(state.board_with_column(column_id)?, column_id)
    }

    async fn create_card(&self, column_id: &ColumnId, card: &NewCard) -> Result<Card> {
        let mut state = self.begin(RemoteOperation::CreateCard)?;
        authority::create_card(state.board_with_column(column_id)?, column_id, card)
    }

    async fn update_card(&self, card_id: &CardId, patch: &CardPatch) -> Result<Card> {
        let mut state = self.begin(RemoteOperation::UpdateCard)?;
        authority::update_card(state.board_with_card(card_id)?, card_id, patch)
    }

    async fn delete_card(&self, card_id: &CardId) -> Result<()> {
        let mut state = self.begin(RemoteOperation::DeleteCard)?;
        authority::delete_card(state.board_with_card(card_id)?, card_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::fixtures::{board, layout};

    fn remote() -> InMemoryRemote {
        InMemoryRemote::new().with_board(board(&[("a", &["x", "y"]), ("b", &["z"])]))
    }

    #[tokio::test]
    async fn test_fetch_board() {
        let remote = remote();

        let view = remote.fetch_board(&BoardId::new("b1")).await.unwrap();
        assert_eq!(view.card_count(), 3);
        assert_eq!(remote.calls(RemoteOperation::FetchBoard), 1);

        let missing = remote.fetch_board(&BoardId::new("nope")).await;
        assert!(matches!(missing, Err(BoardSyncError::BoardNotFound(_))));
        assert_eq!(remote.calls(RemoteOperation::FetchBoard), 2);
    }

    #[tokio::test]
    async fn test_move_card_finds_owning_board() {
        let remote = remote();

        let card = remote
            .move_card(
                &CardId::new("z"),
                &MoveCardRequest {
                    column_id: ColumnId::new("a"),
                    index: 0,
                },
            )
            .await
            .unwrap();

        assert_eq!(card.order, 0);
        let view = remote.snapshot(&BoardId::new("b1")).unwrap();
        assert_eq!(layout(&view)[0].1, vec!["z", "x", "y"]);
        assert!(layout(&view)[1].1.is_empty());
    }

    #[tokio::test]
    async fn test_fail_next_counts_down() {
        let remote = remote();
        remote.fail_next(RemoteOperation::FetchBoard, 2);

        let board_id = BoardId::new("b1");
        assert!(remote.fetch_board(&board_id).await.is_err());
        assert!(remote.fetch_board(&board_id).await.is_err());
        assert!(remote.fetch_board(&board_id).await.is_ok());
        assert_eq!(remote.calls(RemoteOperation::FetchBoard), 3);
    }

    #[tokio::test]
    async fn test_fail_always_until_cleared() {
        let remote = remote();
        remote.fail_always(RemoteOperation::DeleteCard);

        assert!(remote.delete_card(&CardId::new("x")).await.is_err());
        assert!(remote.delete_card(&CardId::new("x")).await.is_err());

        remote.clear_failures();
        remote.delete_card(&CardId::new("x")).await.unwrap();

        let view = remote.snapshot(&BoardId::new("b1")).unwrap();
        assert_eq!(layout(&view)[0].1, vec!["y"]);
        assert_eq!(view.columns[0].cards[0].order, 0);
    }

    #[tokio::test]
    async fn test_reorder_with_empty_order_is_rejected() {
        let remote = remote();
        let result = remote.reorder_columns(&[]).await;

        assert!(matches!(result, Err(BoardSyncError::InvalidOrder(_))));
        assert_eq!(remote.calls(RemoteOperation::ReorderColumns), 1);
        let ids: Vec<_> = layout(&remote.snapshot(&BoardId::new("b1")).unwrap())
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
