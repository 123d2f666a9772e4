//! Two-phase optimistic mutations.
//!
//! `apply_optimistic` changes local state synchronously. `confirm_remote`
//! persists the result and reconciles from the authoritative response. When
//! the remote rejects a persist call, `handle_persist_failure` is the only
//! place that decides how to recover.

use crate::{
    domain::{Card, CardId, ColumnId, ColumnOrder},
    error::{BoardSyncError, Result},
    remote::{MoveCardRequest, RemoteOperation},
    store::BoardStore,
};

/// A local reordering that will be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Put a card at `index` of `column_id`
    MoveCard {
        card_id: CardId,
        column_id: ColumnId,
        index: usize,
    },
    /// Put a column at `index` of the board's column list
    MoveColumn { column_id: ColumnId, index: usize },
}

impl Mutation {
    pub fn operation(&self) -> RemoteOperation {
        match self {
            Self::MoveCard { .. } => RemoteOperation::MoveCard,
            Self::MoveColumn { .. } => RemoteOperation::ReorderColumns,
        }
    }
}

/// Whether `apply_optimistic` changed anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Changed,
    Unchanged,
}

/// Authoritative state returned by a successful persist
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmed {
    Card(Card),
    Columns(Vec<ColumnOrder>),
}

impl BoardStore {
    /// Applies a mutation to local state only. The board is dense again when
    /// this returns.
    pub fn apply_optimistic(&mut self, mutation: &Mutation) -> Result<Applied> {
        match mutation {
            Mutation::MoveCard {
                card_id,
                column_id,
                index,
            } => {
                let view = self.view_mut();
                let from = view
                    .locate_card(card_id)
                    .ok_or_else(|| BoardSyncError::CardNotFound(card_id.to_string()))?;
                let to_column = view
                    .column_index(column_id)
                    .ok_or_else(|| BoardSyncError::ColumnNotFound(column_id.to_string()))?;

                // The card itself is removed before reinsertion, so within one
                // column the last valid slot is len - 1.
                let len = view.columns[to_column].cards.len();
                let target = if from.column == to_column {
                    (*index).min(len.saturating_sub(1))
                } else {
                    (*index).min(len)
                };
                if from.column == to_column && from.index == target {
                    return Ok(Applied::Unchanged);
                }

                view.move_card(card_id, column_id, target)
                    .ok_or_else(|| BoardSyncError::CardNotFound(card_id.to_string()))?;
                tracing::debug!(
                    card_id = %card_id,
                    column_id = %column_id,
                    index = target,
                    "applied optimistic card move"
                );
                Ok(Applied::Changed)
            }
            Mutation::MoveColumn { column_id, index } => {
                let view = self.view_mut();
                let from = view
                    .column_index(column_id)
                    .ok_or_else(|| BoardSyncError::ColumnNotFound(column_id.to_string()))?;
                let target = (*index).min(view.columns.len().saturating_sub(1));
                if from == target {
                    return Ok(Applied::Unchanged);
                }

                view.move_column(from, target)
                    .ok_or_else(|| BoardSyncError::ColumnNotFound(column_id.to_string()))?;
                tracing::debug!(
                    column_id = %column_id,
                    from,
                    to = target,
                    "applied optimistic column move"
                );
                Ok(Applied::Changed)
            }
        }
    }

    /// Persists the current local result of `mutation`
    ///
    /// A card move sends the card's present column and index, which is where
    /// the optimistic phase left it. A column move sends the full column
    /// order. On rejection the centralized failure handler runs before the
    /// error is returned.
    pub async fn confirm_remote(&mut self, mutation: &Mutation) -> Result<Confirmed> {
        match mutation {
            Mutation::MoveCard {
                card_id,
                column_id,
                index,
            } => {
                let request = match self.view().locate_card(card_id) {
                    Some(location) => MoveCardRequest {
                        column_id: self.view().columns[location.column].id.clone(),
                        index: location.index,
                    },
                    None => MoveCardRequest {
                        column_id: column_id.clone(),
                        index: *index,
                    },
                };

                match self.remote().move_card(card_id, &request).await {
                    Ok(card) => {
                        tracing::info!(
                            card_id = %card_id,
                            column_id = %card.column_id,
                            order = card.order,
                            "card move persisted"
                        );
                        self.reconcile_card(&card);
                        Ok(Confirmed::Card(card))
                    }
                    Err(err) => Err(self.handle_persist_failure(mutation, err).await),
                }
            }
            Mutation::MoveColumn { .. } => {
                let order = self.view().column_order();

                match self.remote().reorder_columns(&order).await {
                    Ok(()) => {
                        tracing::info!(columns = order.len(), "column order persisted");
                        Ok(Confirmed::Columns(order))
                    }
                    Err(err) => Err(self.handle_persist_failure(mutation, err).await),
                }
            }
        }
    }

    /// Recovery policy for every rejected persist call
    ///
    /// Card moves always resync to discard speculative state. Column reorders
    /// keep the local order unless the configuration asks for a resync. The
    /// returned error is what the caller sees.
    async fn handle_persist_failure(
        &mut self,
        mutation: &Mutation,
        err: BoardSyncError,
    ) -> BoardSyncError {
        let operation = mutation.operation();
        tracing::warn!(%operation, error = %err, "persist failed");

        let resync = match mutation {
            Mutation::MoveCard { .. } => true,
            Mutation::MoveColumn { .. } => self.config().resync_on_column_reorder_failure,
        };
        if resync {
            if let Err(resync_err) = self.resync().await {
                tracing::warn!(error = %resync_err, "recovery resync failed; local state may be stale");
            }
        }

        let err = BoardSyncError::persist(operation, err);
        self.set_error(err.user_message());
        err
    }

    /// Adopts the server's view of a card, including its column and order
    fn reconcile_card(&mut self, card: &Card) {
        let view = self.view_mut();
        let Some(location) = view.locate_card(&card.id) else {
            tracing::debug!(card_id = %card.id, "confirmed card no longer present locally");
            return;
        };

        let misplaced = view.columns[location.column].id != card.column_id
            || location.index != card.order;
        if misplaced && view.move_card(&card.id, &card.column_id, card.order).is_none() {
            tracing::warn!(
                card_id = %card.id,
                column_id = %card.column_id,
                "confirmed column unknown locally; keeping local position"
            );
        }

        if let Some(local) = view.find_card_mut(&card.id) {
            let (column_id, order) = (local.column_id.clone(), local.order);
            *local = card.clone();
            local.column_id = column_id;
            local.order = order;
        }
    }
}
