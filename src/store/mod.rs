//! Owned board state for one open board view.
//!
//! A `BoardStore` is opened when a board view is entered and closed when it
//! is left. It holds the only in-memory copy of the board, so every mutation
//! (optimistic drag moves, CRUD results, resyncs) goes through it.

use crate::{
    config::SyncConfig,
    domain::{
        ordering, BoardId, BoardView, Card, CardId, CardPatch, Column, ColumnId, ColumnPatch,
        NewCard, NewColumn,
    },
    error::{BoardSyncError, Result},
    remote::{RemoteOperation, RemoteSync},
};
use std::{fmt, sync::Arc};

pub mod optimistic;

pub use optimistic::{Applied, Confirmed, Mutation};

pub struct BoardStore {
    remote: Arc<dyn RemoteSync>,
    config: SyncConfig,
    board_id: BoardId,
    view: BoardView,
    last_error: Option<String>,
}

impl fmt::Debug for BoardStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoardStore")
            .field("board_id", &self.board_id)
            .field("columns", &self.view.columns.len())
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl BoardStore {
    /// Fetches the board and opens a store for it
    pub async fn open(
        remote: Arc<dyn RemoteSync>,
        config: SyncConfig,
        board_id: BoardId,
    ) -> Result<Self> {
        config.validate()?;

        let mut view = remote.fetch_board(&board_id).await?;
        view.normalize();
        tracing::debug!(board_id = %board_id, columns = view.columns.len(), "board store opened");

        Ok(Self {
            remote,
            config,
            board_id,
            view,
            last_error: None,
        })
    }

    /// Tears the store down, handing back the last known board state
    pub fn close(self) -> BoardView {
        tracing::debug!(board_id = %self.board_id, "board store closed");
        self.view
    }

    pub fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    pub fn view(&self) -> &BoardView {
        &self.view
    }

    pub fn columns(&self) -> &[Column] {
        &self.view.columns
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Message of the last failed operation, for a transient notification
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Replaces local state with the remote's authoritative snapshot
    pub async fn resync(&mut self) -> Result<()> {
        match self.remote.fetch_board(&self.board_id).await {
            Ok(mut view) => {
                view.normalize();
                self.view = view;
                tracing::info!(board_id = %self.board_id, "board resynced");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(board_id = %self.board_id, error = %err, "resync failed");
                let err = BoardSyncError::persist(RemoteOperation::FetchBoard, err);
                self.last_error = Some(err.user_message());
                Err(err)
            }
        }
    }

    pub async fn create_column(&mut self, column: NewColumn) -> Result<Column> {
        column.validate()?;
        let result = self.remote.create_column(&self.board_id, &column).await;
        let mut created = self.surface(RemoteOperation::CreateColumn, result)?;

        created.cards.clear();
        self.view.columns.push(created.clone());
        ordering::renumber(&mut self.view.columns);
        Ok(created)
    }

    pub async fn update_column(&mut self, column_id: &ColumnId, patch: ColumnPatch) -> Result<Column> {
        let result = self.remote.update_column(column_id, &patch).await;
        let updated = self.surface(RemoteOperation::UpdateColumn, result)?;

        if let Some(local) = self.view.find_column_mut(column_id) {
            local.name = updated.name.clone();
            local.color = updated.color.clone();
        }
        Ok(updated)
    }

    pub async fn delete_column(&mut self, column_id: &ColumnId) -> Result<()> {
        let result = self.remote.delete_column(column_id).await;
        self.surface(RemoteOperation::DeleteColumn, result)?;

        if let Some(index) = self.view.column_index(column_id) {
            self.view.columns.remove(index);
            ordering::renumber(&mut self.view.columns);
        }
        Ok(())
    }

    pub async fn create_card(&mut self, column_id: &ColumnId, card: NewCard) -> Result<Card> {
        card.validate()?;
        if self.view.find_column(column_id).is_none() {
            return Err(BoardSyncError::ColumnNotFound(column_id.to_string()));
        }

        let result = self.remote.create_card(column_id, &card).await;
        let created = self.surface(RemoteOperation::CreateCard, result)?;

        if let Some(column) = self.view.find_column_mut(column_id) {
            column.cards.push(created.clone());
            ordering::renumber(&mut column.cards);
        }
        Ok(created)
    }

    /// Updates a card's non-ordering fields; its local position is kept
    pub async fn update_card(&mut self, card_id: &CardId, patch: CardPatch) -> Result<Card> {
        patch.validate()?;
        let result = self.remote.update_card(card_id, &patch).await;
        let updated = self.surface(RemoteOperation::UpdateCard, result)?;

        if let Some(local) = self.view.find_card_mut(card_id) {
            let (column_id, order) = (local.column_id.clone(), local.order);
            *local = updated.clone();
            local.column_id = column_id;
            local.order = order;
        }
        Ok(updated)
    }

    pub async fn delete_card(&mut self, card_id: &CardId) -> Result<()> {
        let result = self.remote.delete_card(card_id).await;
        self.surface(RemoteOperation::DeleteCard, result)?;

        if let Some(location) = self.view.locate_card(card_id) {
            let cards = &mut self.view.columns[location.column].cards;
            cards.remove(location.index);
            ordering::renumber(cards);
        }
        Ok(())
    }

    /// Records a failed CRUD call without any compensating resync
    fn surface<T>(&mut self, operation: RemoteOperation, result: Result<T>) -> Result<T> {
        result.map_err(|err| {
            tracing::warn!(%operation, error = %err, "remote call failed");
            let err = BoardSyncError::persist(operation, err);
            self.last_error = Some(err.user_message());
            err
        })
    }

    pub(crate) fn remote(&self) -> &Arc<dyn RemoteSync> {
        &self.remote
    }

    pub(crate) fn view_mut(&mut self) -> &mut BoardView {
        &mut self.view
    }

    pub(crate) fn set_error(&mut self, message: String) {
        self.last_error = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::fixtures::{board, layout};
    use crate::remote::InMemoryRemote;

    async fn open(remote: &Arc<InMemoryRemote>) -> BoardStore {
        BoardStore::open(remote.clone(), SyncConfig::default(), BoardId::new("b1"))
            .await
            .unwrap()
    }

    fn remote() -> Arc<InMemoryRemote> {
        Arc::new(InMemoryRemote::new().with_board(board(&[("a", &["x", "y"]), ("b", &["z"])])))
    }

    /// Columns and cards out of list order, with gaps, duplicate orders and
    /// a card pointing at the wrong column
    fn scrambled() -> BoardView {
        let mut view = board(&[("a", &["x", "y", "z"]), ("b", &["w"]), ("c", &[])]);
        view.columns[0].order = 7;
        view.columns[1].order = 2;
        view.columns[2].order = 2;
        let cards = &mut view.columns[0].cards;
        cards[0].order = 9;
        cards[1].order = 3;
        cards[2].order = 3;
        view.columns[1].cards[0].column_id = ColumnId::new("a");
        view
    }

    #[tokio::test]
    async fn test_open_normalizes_snapshot() {
        let remote = Arc::new(InMemoryRemote::new());
        remote.insert_raw_board(scrambled());
        assert!(!remote.snapshot(&BoardId::new("b1")).unwrap().is_normalized());

        let store = open(&remote).await;

        assert!(store.view().is_normalized());
        assert_eq!(
            layout(store.view()),
            vec![
                ("b".to_string(), vec!["w".to_string()]),
                ("c".to_string(), vec![]),
                (
                    "a".to_string(),
                    vec!["y".to_string(), "z".to_string(), "x".to_string()]
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_resync_normalizes_snapshot() {
        let remote = remote();
        let mut store = open(&remote).await;

        let mut view = scrambled();
        view.columns[2].order = 0;
        remote.insert_raw_board(view);
        store.resync().await.unwrap();

        assert!(store.view().is_normalized());
        let ids: Vec<_> = layout(store.view()).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
        assert_eq!(layout(store.view())[2].1, vec!["y", "z", "x"]);
        let (card, column) = store.view().find_card(&CardId::new("w")).unwrap();
        assert_eq!(card.column_id, column.id);
    }

    #[tokio::test]
    async fn test_open_unknown_board_fails() {
        let remote = remote();
        let result =
            BoardStore::open(remote, SyncConfig::default(), BoardId::new("missing")).await;
        assert!(matches!(result, Err(BoardSyncError::BoardNotFound(_))));
    }

    #[tokio::test]
    async fn test_resync_failure_sets_error() {
        let remote = remote();
        let mut store = open(&remote).await;
        remote.fail_next(RemoteOperation::FetchBoard, 1);

        let err = store.resync().await.unwrap_err();

        assert!(err.is_persist_failure());
        assert_eq!(store.last_error(), Some("Failed to fetch board."));
        store.clear_error();
        assert!(store.last_error().is_none());
    }

    #[tokio::test]
    async fn test_column_crud_keeps_order_dense() {
        let remote = remote();
        let mut store = open(&remote).await;

        let created = store.create_column(NewColumn::named("Done")).await.unwrap();
        assert_eq!(created.order, 2);

        store
            .update_column(
                &created.id,
                ColumnPatch {
                    name: Some("Shipped".to_string()),
                    ..ColumnPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(store.view().find_column(&created.id).unwrap().name, "Shipped");

        store.delete_column(&ColumnId::new("a")).await.unwrap();

        assert!(store.view().is_normalized());
        assert_eq!(store.columns().len(), 2);
        assert_eq!(store.columns()[1].id, created.id);
        assert_eq!(remote.snapshot(&BoardId::new("b1")).unwrap(), *store.view());
    }

    #[tokio::test]
    async fn test_card_crud_keeps_order_dense() {
        let remote = remote();
        let mut store = open(&remote).await;

        let card = store
            .create_card(&ColumnId::new("b"), NewCard::titled("w"))
            .await
            .unwrap();
        assert_eq!(card.order, 1);

        let updated = store
            .update_card(
                &card.id,
                CardPatch {
                    title: Some("w2".to_string()),
                    ..CardPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "w2");

        store.delete_card(&CardId::new("z")).await.unwrap();

        assert!(store.view().is_normalized());
        let (local, column) = store.view().find_card(&card.id).unwrap();
        assert_eq!(local.title, "w2");
        assert_eq!(local.order, 0);
        assert_eq!(column.id.as_str(), "b");
    }

    #[tokio::test]
    async fn test_crud_failure_is_surfaced_without_resync() {
        let remote = remote();
        let mut store = open(&remote).await;
        remote.reset_calls();
        remote.fail_next(RemoteOperation::DeleteCard, 1);

        let err = store.delete_card(&CardId::new("x")).await.unwrap_err();

        assert!(err.is_persist_failure());
        assert_eq!(store.last_error(), Some("Failed to delete card."));
        assert!(store.view().find_card(&CardId::new("x")).is_some());
        assert_eq!(remote.calls(RemoteOperation::FetchBoard), 0);
    }

    #[tokio::test]
    async fn test_create_card_in_unknown_column() {
        let remote = remote();
        let mut store = open(&remote).await;

        let result = store
            .create_card(&ColumnId::new("nope"), NewCard::titled("w"))
            .await;
        assert!(matches!(result, Err(BoardSyncError::ColumnNotFound(_))));
        assert_eq!(remote.calls(RemoteOperation::CreateCard), 0);
    }
}
