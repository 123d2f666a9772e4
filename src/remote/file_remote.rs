use crate::{
    config::SyncConfig,
    domain::{
        BoardId, BoardView, Card, CardId, CardPatch, Column, ColumnId, ColumnOrder, ColumnPatch,
        NewCard, NewColumn,
    },
    error::{BoardSyncError, Result},
    remote::{authority, MoveCardRequest, RemoteSync},
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Board service backed by one JSON file per board
///
/// Every call loads the affected board, applies the change and writes the
/// whole board back.
pub struct FileRemote {
    root_path: PathBuf,
}

impl FileRemote {
    const BOARDS_DIR: &'static str = "boards";

    /// Creates a FileRemote under the default data directory of `project_root`
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self::with_config(project_root, &SyncConfig::default())
    }

    pub fn with_config(project_root: impl AsRef<Path>, config: &SyncConfig) -> Self {
        Self {
            root_path: project_root.as_ref().join(&config.data_dir),
        }
    }

    fn boards_dir(&self) -> PathBuf {
        self.root_path.join(Self::BOARDS_DIR)
    }

    fn board_file(&self, id: &BoardId) -> PathBuf {
        self.boards_dir().join(format!("{}.json", id.as_str()))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    pub async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.boards_dir()).await
    }

    pub async fn is_initialized(&self) -> bool {
        self.boards_dir().exists()
    }

    /// Writes a board, normalizing it first
    pub async fn save_board(&self, view: &BoardView) -> Result<()> {
        self.ensure_directory_exists(&self.boards_dir()).await?;

        let mut view = view.clone();
        view.normalize();
        let json = serde_json::to_string_pretty(&view)?;
        fs::write(self.board_file(&view.board.id), json).await?;

        Ok(())
    }

    pub async fn load_board(&self, id: &BoardId) -> Result<BoardView> {
        let file_path = self.board_file(id);

        if !file_path.exists() {
            return Err(BoardSyncError::BoardNotFound(id.to_string()));
        }

        let contents = fs::read_to_string(&file_path).await?;
        let view: BoardView = serde_json::from_str(&contents)?;

        Ok(view)
    }

    pub async fn list_board_ids(&self) -> Result<Vec<BoardId>> {
        let boards_dir = self.boards_dir();

        if !boards_dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&boards_dir).await?;
        let mut ids: Vec<BoardId> = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(BoardId::new(stem));
                }
            }
        }

        ids.sort();
        Ok(ids)
    }

    /// Loads the first board matching `predicate`
    async fn find_board(&self, predicate: impl Fn(&BoardView) -> bool) -> Result<Option<BoardView>> {
        for id in self.list_board_ids().await? {
            let view = self.load_board(&id).await?;
            if predicate(&view) {
                return Ok(Some(view));
            }
        }
        Ok(None)
    }

    async fn board_with_column(&self, column_id: &ColumnId) -> Result<BoardView> {
        self.find_board(|view| view.find_column(column_id).is_some())
            .await?
            .ok_or_else(|| BoardSyncError::ColumnNotFound(column_id.to_string()))
    }

    async fn board_with_card(&self, card_id: &CardId) -> Result<BoardView> {
        self.find_board(|view| view.find_card(card_id).is_some())
            .await?
            .ok_or_else(|| BoardSyncError::CardNotFound(card_id.to_string()))
    }
}

#[async_trait]
impl RemoteSync for FileRemote {
    async fn fetch_board(&self, board_id: &BoardId) -> Result<BoardView> {
        self.load_board(board_id).await
    }

    async fn reorder_columns(&self, order: &[ColumnOrder]) -> Result<()> {
        let Some(first) = order.first() else {
            return Err(BoardSyncError::InvalidOrder("column order is empty".to_string()));
        };
        let mut view = self.board_with_column(&first.column_id).await?;
        authority::reorder_columns(&mut view, order)?;
        self.save_board(&view).await
    }

    async fn move_card(&self, card_id: &CardId, request: &MoveCardRequest) -> Result<Card> {
        let mut view = self.board_with_card(card_id).await?;
        let card = authority::move_card(&mut view, card_id, request)?;
        self.save_board(&view).await?;
        Ok(card)
    }

    async fn create_column(&self, board_id: &BoardId, column: &NewColumn) -> Result<Column> {
        let mut view = self.load_board(board_id).await?;
        let column = authority::create_column(&mut view, column)?;
        self.save_board(&view).await?;
        Ok(column)
    }

    async fn update_column(&self, column_id: &ColumnId, patch: &ColumnPatch) -> Result<Column> {
        let mut view = self.board_with_column(column_id).await?;
        let column = authority::update_column(&mut view, column_id, patch)?;
        self.save_board(&view).await?;
        Ok(column)
    }

    async fn delete_column(&self, column_id: &ColumnId) -> Result<()> {
        let mut view = self.board_with_column(column_id).await?;
        authority::delete_column(&mut view, column_id)?;
        self.save_board(&view).await
    }

    async fn create_card(&self, column_id: &ColumnId, card: &NewCard) -> Result<Card> {
        let mut view = self.board_with_column(column_id).await?;
        let card = authority::create_card(&mut view, column_id, card)?;
        self.save_board(&view).await?;
        Ok(card)
    }

    async fn update_card(&self, card_id: &CardId, patch: &CardPatch) -> Result<Card> {
        let mut view = self.board_with_card(card_id).await?;
        let card = authority::update_card(&mut view, card_id, patch)?;
        self.save_board(&view).await?;
        Ok(card)
    }

    async fn delete_card(&self, card_id: &CardId) -> Result<()> {
        let mut view = self.board_with_card(card_id).await?;
        authority::delete_card(&mut view, card_id)?;
        self.save_board(&view).await
    }
}
