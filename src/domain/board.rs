use crate::domain::{
    card::Card,
    id::{BoardId, CardId, ColumnId},
    ordering::{self, Destination},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A board's identity and metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Board {
    pub fn new(id: BoardId, name: String) -> Self {
        Self {
            id,
            name,
            project_id: None,
            created_at: Utc::now(),
        }
    }
}

/// A workflow stage holding an ordered list of cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub board_id: BoardId,
    pub name: String,
    pub order: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Column {
    pub fn new(id: ColumnId, board_id: BoardId, name: String, order: usize) -> Self {
        Self {
            id,
            board_id,
            name,
            order,
            color: None,
            cards: Vec::new(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Position of a card within this column
    pub fn card_index(&self, card_id: &CardId) -> Option<usize> {
        self.cards.iter().position(|card| &card.id == card_id)
    }
}

/// Fields for creating a column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewColumn {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl NewColumn {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
        }
    }

    pub fn validate(&self) -> Result<(), crate::error::BoardSyncError> {
        if self.name.trim().is_empty() {
            return Err(crate::error::BoardSyncError::Validation(
                "column name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial update of a column's non-ordering fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ColumnPatch {
    pub fn apply(&self, column: &mut Column) {
        if let Some(name) = &self.name {
            column.name = name.clone();
        }
        if let Some(color) = &self.color {
            column.color = Some(color.clone());
        }
    }
}

/// One entry of a persisted column order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOrder {
    pub column_id: ColumnId,
    pub order: usize,
}

/// Where a card currently sits, as indexes into the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardLocation {
    pub column: usize,
    pub index: usize,
}

/// A board with its ordered columns and cards
///
/// This is both the snapshot returned by the remote service and the live
/// model the drag engine mutates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardView {
    pub board: Board,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl BoardView {
    pub fn new(board: Board, columns: Vec<Column>) -> Self {
        Self { board, columns }
    }

    pub fn find_column(&self, column_id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|col| &col.id == column_id)
    }

    pub fn find_column_mut(&mut self, column_id: &ColumnId) -> Option<&mut Column> {
        self.columns.iter_mut().find(|col| &col.id == column_id)
    }

    pub fn column_index(&self, column_id: &ColumnId) -> Option<usize> {
        self.columns.iter().position(|col| &col.id == column_id)
    }

    /// Finds a card together with the column that currently owns it
    pub fn find_card(&self, card_id: &CardId) -> Option<(&Card, &Column)> {
        self.columns.iter().find_map(|column| {
            column
                .cards
                .iter()
                .find(|card| &card.id == card_id)
                .map(|card| (card, column))
        })
    }

    pub fn find_card_mut(&mut self, card_id: &CardId) -> Option<&mut Card> {
        self.columns
            .iter_mut()
            .flat_map(|column| column.cards.iter_mut())
            .find(|card| &card.id == card_id)
    }

    pub fn locate_card(&self, card_id: &CardId) -> Option<CardLocation> {
        self.columns
            .iter()
            .enumerate()
            .find_map(|(column, col)| {
                col.card_index(card_id)
                    .map(|index| CardLocation { column, index })
            })
    }

    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|col| col.cards.len()).sum()
    }

    /// Moves a card to `dest_index` of `dest_column`, reassigning its column
    /// and renumbering both columns. Returns the card's new location.
    pub fn move_card(
        &mut self,
        card_id: &CardId,
        dest_column: &ColumnId,
        dest_index: usize,
    ) -> Option<CardLocation> {
        let from = self.locate_card(card_id)?;
        let to_column = self.column_index(dest_column)?;

        let index = if from.column == to_column {
            let cards = &mut self.columns[from.column].cards;
            ordering::move_within_or_between(cards, from.index, Destination::Same, dest_index)?
        } else {
            let (source, dest) = pair_mut(&mut self.columns, from.column, to_column);
            ordering::move_within_or_between(
                &mut source.cards,
                from.index,
                Destination::Other(&mut dest.cards),
                dest_index,
            )?
        };

        self.columns[to_column].cards[index].column_id = dest_column.clone();

        Some(CardLocation {
            column: to_column,
            index,
        })
    }

    /// Array-moves a column and renumbers the column list
    pub fn move_column(&mut self, from: usize, to: usize) -> Option<usize> {
        ordering::move_within_or_between(&mut self.columns, from, Destination::Same, to)
    }

    /// Current column order in the shape the remote service expects
    pub fn column_order(&self) -> Vec<ColumnOrder> {
        self.columns
            .iter()
            .enumerate()
            .map(|(order, col)| ColumnOrder {
                column_id: col.id.clone(),
                order,
            })
            .collect()
    }

    /// Sorts columns and cards by their stored order, then renumbers so that
    /// every `order` equals its index and every card points at its column
    pub fn normalize(&mut self) {
        ordering::sort_by_order(&mut self.columns);
        ordering::renumber(&mut self.columns);

        for column in &mut self.columns {
            ordering::sort_by_order(&mut column.cards);
            ordering::renumber(&mut column.cards);
            for card in &mut column.cards {
                if card.column_id != column.id {
                    card.column_id = column.id.clone();
                }
            }
        }
    }

    /// Checks column density, card density and card ownership for the whole
    /// board
    pub fn is_normalized(&self) -> bool {
        ordering::is_renumbered(&self.columns)
            && self.columns.iter().all(|column| {
                ordering::is_renumbered(&column.cards)
                    && column.cards.iter().all(|card| card.column_id == column.id)
            })
    }
}

/// Borrows two distinct columns mutably
fn pair_mut(columns: &mut [Column], a: usize, b: usize) -> (&mut Column, &mut Column) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = columns.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = columns.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
