use crate::{
    domain::{Card, CardId, ColumnId, ColumnOrder},
    drag::{
        resolve::{resolve_column_drop, resolve_drop, DropResolution},
        subject::{DragSubject, DropTarget},
    },
    error::{BoardSyncError, Result},
    remote::RemoteOperation,
    store::{Applied, BoardStore, Confirmed, Mutation},
};

/// State of one drag interaction, from drag start to drag end
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    subject: DragSubject,
    origin_column: Option<ColumnId>,
    provisional: Option<DropResolution>,
    optimistic_moves: usize,
    pending_resync: bool,
}

impl DragSession {
    fn new(subject: DragSubject, origin_column: Option<ColumnId>, pending_resync: bool) -> Self {
        Self {
            subject,
            origin_column,
            provisional: None,
            optimistic_moves: 0,
            pending_resync,
        }
    }

    pub fn subject(&self) -> &DragSubject {
        &self.subject
    }

    /// Column the dragged card started in
    pub fn origin_column(&self) -> Option<&ColumnId> {
        self.origin_column.as_ref()
    }

    /// Last destination resolved while hovering
    pub fn provisional(&self) -> Option<&DropResolution> {
        self.provisional.as_ref()
    }

    /// Number of optimistic moves applied during this session
    pub fn optimistic_moves(&self) -> usize {
        self.optimistic_moves
    }

    /// Whether a replaced session left optimistic moves behind. The board is
    /// resynced when this session ends.
    pub fn pending_resync(&self) -> bool {
        self.pending_resync
    }

    fn is_speculative(&self) -> bool {
        self.optimistic_moves > 0
    }

    fn leaves_speculative_state(&self) -> bool {
        self.is_speculative() || self.pending_resync
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// How a drag session ended
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// `drag_end` without a session
    NoSession,
    /// Dropped where it started; nothing was persisted
    Unchanged,
    /// The drop target no longer resolves; nothing was persisted
    Missed,
    /// Dropped outside any target, or the drop target vanished after
    /// speculative moves. `resynced` tells whether local state was refetched.
    Aborted { resynced: bool },
    /// The card move was persisted; this is the server's copy of the card
    CardMoved(Card),
    /// The column order was persisted
    ColumnsReordered(Vec<ColumnOrder>),
}

impl From<Confirmed> for DragOutcome {
    fn from(confirmed: Confirmed) -> Self {
        match confirmed {
            Confirmed::Card(card) => Self::CardMoved(card),
            Confirmed::Columns(order) => Self::ColumnsReordered(order),
        }
    }
}

/// Drives one drag interaction at a time: `Idle → Dragging → Idle`
///
/// Every handler takes the board store explicitly. Hovering applies card
/// moves optimistically. Column moves wait for the drop. The drop issues at
/// most one persist call.
#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Begins a session. A session still active is discarded; if it had
    /// moved anything, the new session resyncs the board when it ends.
    pub fn drag_start(&mut self, store: &BoardStore, subject: DragSubject) {
        let pending_resync = match &self.state {
            DragState::Dragging(stale) => {
                tracing::warn!(
                    subject = %stale.subject,
                    moves = stale.optimistic_moves,
                    "drag started while another session was active; discarding it"
                );
                stale.leaves_speculative_state()
            }
            DragState::Idle => false,
        };

        let origin_column = match &subject {
            DragSubject::Card(card_id) => store
                .view()
                .find_card(card_id)
                .map(|(_, column)| column.id.clone()),
            DragSubject::Column(_) => None,
        };

        tracing::debug!(subject = %subject, origin = ?origin_column, "drag started");
        self.state = DragState::Dragging(DragSession::new(subject, origin_column, pending_resync));
    }

    /// Applies the hovered destination of a dragged card immediately.
    /// Returns whether local state changed.
    pub fn drag_over(&mut self, store: &mut BoardStore, target: &DropTarget) -> bool {
        let DragState::Dragging(session) = &mut self.state else {
            return false;
        };
        let Some(card_id) = session.subject.card_id().cloned() else {
            return false;
        };

        let Some(resolution) = resolve_drop(store.view(), &card_id, target) else {
            tracing::trace!(card_id = %card_id, target = %target, "drag over unresolved target");
            return false;
        };

        let mutation = Mutation::MoveCard {
            card_id: card_id.clone(),
            column_id: resolution.column_id.clone(),
            index: resolution.index,
        };
        let applied = match store.apply_optimistic(&mutation) {
            Ok(applied) => applied,
            Err(err) => {
                tracing::trace!(card_id = %card_id, error = %err, "optimistic move skipped");
                return false;
            }
        };

        session.provisional = Some(resolution);
        if applied == Applied::Changed {
            session.optimistic_moves += 1;
            true
        } else {
            false
        }
    }

    /// Ends the session. `None` means the drag was dropped outside every
    /// target. The controller is idle when this returns, whatever the result.
    pub async fn drag_end(
        &mut self,
        store: &mut BoardStore,
        target: Option<&DropTarget>,
    ) -> Result<DragOutcome> {
        let session = match std::mem::take(&mut self.state) {
            DragState::Idle => return Ok(DragOutcome::NoSession),
            DragState::Dragging(session) => session,
        };

        let Some(target) = target else {
            return Self::abort(store, &session).await;
        };

        let result = match session.subject.clone() {
            DragSubject::Column(column_id) => Self::drop_column(store, column_id, target).await,
            DragSubject::Card(card_id) => Self::drop_card(store, &session, card_id, target).await,
        };
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                if session.pending_resync && !Self::resynced_on_failure(store, &err) {
                    if let Err(resync_err) = store.resync().await {
                        tracing::warn!(error = %resync_err, "resync for discarded session failed");
                    }
                }
                return Err(err);
            }
        };

        if session.pending_resync && outcome != (DragOutcome::Aborted { resynced: true }) {
            tracing::debug!(subject = %session.subject, "resyncing after discarded session");
            store.resync().await?;
        }
        tracing::debug!(subject = %session.subject, outcome = ?outcome, "drag ended");
        Ok(outcome)
    }

    /// Escape or any other external cancel
    pub async fn cancel(&mut self, store: &mut BoardStore) -> Result<DragOutcome> {
        self.drag_end(store, None).await
    }

    /// Whether the persist failure handler already resynced for `err`
    fn resynced_on_failure(store: &BoardStore, err: &BoardSyncError) -> bool {
        match err {
            BoardSyncError::PersistFailure { operation, .. } => match operation {
                RemoteOperation::MoveCard => true,
                RemoteOperation::ReorderColumns => store.config().resync_on_column_reorder_failure,
                _ => false,
            },
            _ => false,
        }
    }

    async fn abort(store: &mut BoardStore, session: &DragSession) -> Result<DragOutcome> {
        let resync = (session.subject.card_id().is_some() && session.is_speculative())
            || session.pending_resync;
        tracing::debug!(subject = %session.subject, resync, "drag aborted");

        if resync {
            store.resync().await?;
        }
        Ok(DragOutcome::Aborted { resynced: resync })
    }

    async fn drop_column(
        store: &mut BoardStore,
        column_id: ColumnId,
        target: &DropTarget,
    ) -> Result<DragOutcome> {
        let Some(index) = resolve_column_drop(store.view(), target) else {
            tracing::trace!(column_id = %column_id, target = %target, "column drop unresolved");
            return Ok(DragOutcome::Missed);
        };
        if store.view().column_index(&column_id).is_none() {
            return Ok(DragOutcome::Missed);
        }

        let mutation = Mutation::MoveColumn { column_id, index };
        if store.apply_optimistic(&mutation)? == Applied::Unchanged {
            return Ok(DragOutcome::Unchanged);
        }
        Ok(store.confirm_remote(&mutation).await?.into())
    }

    async fn drop_card(
        store: &mut BoardStore,
        session: &DragSession,
        card_id: CardId,
        target: &DropTarget,
    ) -> Result<DragOutcome> {
        let Some(resolution) = resolve_drop(store.view(), &card_id, target) else {
            if session.is_speculative() {
                tracing::debug!(card_id = %card_id, "drop target vanished after optimistic moves");
                store.resync().await?;
                return Ok(DragOutcome::Aborted { resynced: true });
            }
            return Ok(DragOutcome::Missed);
        };

        let mutation = Mutation::MoveCard {
            card_id,
            column_id: resolution.column_id,
            index: resolution.index,
        };
        let applied = store.apply_optimistic(&mutation)?;
        if applied == Applied::Unchanged && !session.is_speculative() {
            return Ok(DragOutcome::Unchanged);
        }
        Ok(store.confirm_remote(&mutation).await?.into())
    }
}
