//! Drop resolution: where a dragged card or column lands.

use crate::{
    domain::{BoardView, CardId, ColumnId},
    drag::subject::DropTarget,
};
use serde::{Deserialize, Serialize};

/// Destination column and insertion index for a dragged card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropResolution {
    pub column_id: ColumnId,
    pub index: usize,
}

/// Resolves where `card_id` lands when dropped on `target`
///
/// - Over a column container: append to that column.
/// - Over a card in the dragged card's own column: take the hovered card's
///   index. The dragged card is removed before reinsertion, so this covers
///   both upward and downward moves.
/// - Over a card in another column: insert after the hovered card.
///
/// Returns `None` when the dragged card, the hovered card or the column is
/// unknown to `view`. That is a normal outcome while a drag races earlier
/// optimistic updates, not an error.
pub fn resolve_drop(view: &BoardView, card_id: &CardId, target: &DropTarget) -> Option<DropResolution> {
    let (_, current) = view.find_card(card_id)?;

    match target {
        DropTarget::Column(column_id) => {
            let column = view.find_column(column_id)?;
            Some(DropResolution {
                column_id: column.id.clone(),
                index: column.cards.len(),
            })
        }
        DropTarget::Card(over_id) => {
            let (_, column) = view.find_card(over_id)?;
            let over_index = column.card_index(over_id)?;
            let index = if column.id == current.id {
                over_index
            } else {
                over_index + 1
            };
            Some(DropResolution {
                column_id: column.id.clone(),
                index,
            })
        }
    }
}

/// Resolves the destination index of a dragged column. A card target stands
/// for the column that owns it.
pub fn resolve_column_drop(view: &BoardView, target: &DropTarget) -> Option<usize> {
    match target {
        DropTarget::Column(column_id) => view.column_index(column_id),
        DropTarget::Card(card_id) => view.locate_card(card_id).map(|location| location.column),
    }
}
