//! Server-side semantics shared by the bundled remote adapters.
//!
//! Each function validates its input against one board snapshot and leaves
//! that snapshot normalized.

use crate::{
    domain::{
        ordering, BoardView, Card, CardId, CardPatch, Column, ColumnId, ColumnOrder, ColumnPatch,
        NewCard, NewColumn,
    },
    error::{BoardSyncError, Result},
    remote::MoveCardRequest,
};
use chrono::Utc;
use std::collections::HashSet;

/// Rearranges the board's columns to match `order`
///
/// The order must name every column of the board exactly once, and each
/// entry's `order` must equal its list position.
pub fn reorder_columns(view: &mut BoardView, order: &[ColumnOrder]) -> Result<()> {
    if order.len() != view.columns.len() {
        return Err(BoardSyncError::InvalidOrder(format!(
            "expected {} columns, got {}",
            view.columns.len(),
            order.len()
        )));
    }

    let mut seen = HashSet::new();
    for (position, entry) in order.iter().enumerate() {
        if entry.order != position {
            return Err(BoardSyncError::InvalidOrder(format!(
                "column {} has order {} at position {}",
                entry.column_id, entry.order, position
            )));
        }
        if !seen.insert(&entry.column_id) {
            return Err(BoardSyncError::InvalidOrder(format!(
                "column {} listed twice",
                entry.column_id
            )));
        }
        if view.find_column(&entry.column_id).is_none() {
            return Err(BoardSyncError::ColumnNotFound(entry.column_id.to_string()));
        }
    }

    for column in &mut view.columns {
        if let Some(position) = order.iter().position(|entry| entry.column_id == column.id) {
            column.order = position;
        }
    }
    ordering::sort_by_order(&mut view.columns);
    Ok(())
}

/// Moves a card out of whatever column holds it into the requested position
pub fn move_card(view: &mut BoardView, card_id: &CardId, request: &MoveCardRequest) -> Result<Card> {
    if view.find_column(&request.column_id).is_none() {
        return Err(BoardSyncError::ColumnNotFound(request.column_id.to_string()));
    }

    let location = view
        .move_card(card_id, &request.column_id, request.index)
        .ok_or_else(|| BoardSyncError::CardNotFound(card_id.to_string()))?;

    let card = &mut view.columns[location.column].cards[location.index];
    card.updated_at = Utc::now();
    Ok(card.clone())
}

pub fn create_column(view: &mut BoardView, request: &NewColumn) -> Result<Column> {
    request.validate()?;

    let mut column = Column::new(
        ColumnId::generate(),
        view.board.id.clone(),
        request.name.trim().to_string(),
        view.columns.len(),
    );
    column.color = request.color.clone();

    view.columns.push(column.clone());
    Ok(column)
}

pub fn update_column(view: &mut BoardView, column_id: &ColumnId, patch: &ColumnPatch) -> Result<Column> {
    if matches!(&patch.name, Some(name) if name.trim().is_empty()) {
        return Err(BoardSyncError::Validation(
            "column name must not be empty".to_string(),
        ));
    }

    let column = view
        .find_column_mut(column_id)
        .ok_or_else(|| BoardSyncError::ColumnNotFound(column_id.to_string()))?;
    patch.apply(column);
    Ok(column.clone())
}

/// Removes a column with its cards and closes the gap in the column order
pub fn delete_column(view: &mut BoardView, column_id: &ColumnId) -> Result<()> {
    let index = view
        .column_index(column_id)
        .ok_or_else(|| BoardSyncError::ColumnNotFound(column_id.to_string()))?;

    view.columns.remove(index);
    ordering::renumber(&mut view.columns);
    Ok(())
}

pub fn create_card(view: &mut BoardView, column_id: &ColumnId, request: &NewCard) -> Result<Card> {
    request.validate()?;

    let column = view
        .find_column_mut(column_id)
        .ok_or_else(|| BoardSyncError::ColumnNotFound(column_id.to_string()))?;

    let mut card = Card::new(
        CardId::generate(),
        column_id.clone(),
        request.title.trim().to_string(),
        column.cards.len(),
    );
    card.description = request.description.clone();
    card.priority = request.priority;
    card.due_date = request.due_date;
    card.assignees = request.assignees.clone();

    column.cards.push(card.clone());
    Ok(card)
}

pub fn update_card(view: &mut BoardView, card_id: &CardId, patch: &CardPatch) -> Result<Card> {
    patch.validate()?;

    let card = view
        .find_card_mut(card_id)
        .ok_or_else(|| BoardSyncError::CardNotFound(card_id.to_string()))?;
    card.apply_patch(patch);
    Ok(card.clone())
}

/// Removes a card and closes the gap in its column
pub fn delete_card(view: &mut BoardView, card_id: &CardId) -> Result<()> {
    let location = view
        .locate_card(card_id)
        .ok_or_else(|| BoardSyncError::CardNotFound(card_id.to_string()))?;

    let cards = &mut view.columns[location.column].cards;
    cards.remove(location.index);
    ordering::renumber(cards);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::fixtures::{board, layout};

    fn order(ids: &[&str]) -> Vec<ColumnOrder> {
        ids.iter()
            .enumerate()
            .map(|(order, id)| ColumnOrder {
                column_id: ColumnId::new(*id),
                order,
            })
            .collect()
    }

    #[test]
    fn test_reorder_columns() {
        let mut view = board(&[("a", &[]), ("b", &[]), ("c", &[])]);

        reorder_columns(&mut view, &order(&["b", "c", "a"])).unwrap();

        let ids: Vec<_> = layout(&view).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
        assert!(view.is_normalized());
    }

    #[test]
    fn test_reorder_rejects_bad_orders() {
        let mut view = board(&[("a", &[]), ("b", &[])]);

        assert!(matches!(
            reorder_columns(&mut view, &order(&["a"])),
            Err(BoardSyncError::InvalidOrder(_))
        ));
        assert!(matches!(
            reorder_columns(&mut view, &order(&["a", "a"])),
            Err(BoardSyncError::InvalidOrder(_))
        ));
        assert!(matches!(
            reorder_columns(&mut view, &order(&["a", "z"])),
            Err(BoardSyncError::ColumnNotFound(_))
        ));

        let mut gapped = order(&["b", "a"]);
        gapped[1].order = 2;
        assert!(matches!(
            reorder_columns(&mut view, &gapped),
            Err(BoardSyncError::InvalidOrder(_))
        ));

        assert_eq!(layout(&view)[0].0, "a");
    }

    #[test]
    fn test_move_card_clamps_index() {
        let mut view = board(&[("a", &["x", "y"]), ("b", &["z"])]);

        let card = move_card(
            &mut view,
            &CardId::new("x"),
            &MoveCardRequest {
                column_id: ColumnId::new("b"),
                index: 9,
            },
        )
        .unwrap();

        assert_eq!(card.column_id.as_str(), "b");
        assert_eq!(card.order, 1);
        assert_eq!(layout(&view)[0].1, vec!["y"]);
        assert!(view.is_normalized());
    }

    #[test]
    fn test_move_card_unknown_ids() {
        let mut view = board(&[("a", &["x"])]);
        let request = MoveCardRequest {
            column_id: ColumnId::new("nope"),
            index: 0,
        };
        assert!(matches!(
            move_card(&mut view, &CardId::new("x"), &request),
            Err(BoardSyncError::ColumnNotFound(_))
        ));

        let request = MoveCardRequest {
            column_id: ColumnId::new("a"),
            index: 0,
        };
        assert!(matches!(
            move_card(&mut view, &CardId::new("ghost"), &request),
            Err(BoardSyncError::CardNotFound(_))
        ));
    }

    #[test]
    fn test_create_and_delete_keep_density() {
        let mut view = board(&[("a", &["x", "y", "z"]), ("b", &[])]);

        let column = create_column(&mut view, &NewColumn::named("Done")).unwrap();
        assert_eq!(column.order, 2);

        let card = create_card(&mut view, &ColumnId::new("a"), &NewCard::titled("w")).unwrap();
        assert_eq!(card.order, 3);

        delete_card(&mut view, &CardId::new("y")).unwrap();
        delete_column(&mut view, &ColumnId::new("b")).unwrap();

        assert!(view.is_normalized());
        assert_eq!(view.columns.len(), 2);
        assert_eq!(view.columns[1].id, column.id);
        assert_eq!(view.columns[0].cards.len(), 3);
    }

    #[test]
    fn test_updates_validate_input() {
        let mut view = board(&[("a", &["x"])]);

        let blank = ColumnPatch {
            name: Some(" ".to_string()),
            ..ColumnPatch::default()
        };
        assert!(update_column(&mut view, &ColumnId::new("a"), &blank).is_err());

        let rename = ColumnPatch {
            name: Some("Backlog".to_string()),
            color: Some("#e0f2fe".to_string()),
        };
        let column = update_column(&mut view, &ColumnId::new("a"), &rename).unwrap();
        assert_eq!(column.name, "Backlog");

        let patch = CardPatch {
            title: Some("renamed".to_string()),
            ..CardPatch::default()
        };
        let card = update_card(&mut view, &CardId::new("x"), &patch).unwrap();
        assert_eq!(card.title, "renamed");
        assert_eq!(card.order, 0);
    }
}
