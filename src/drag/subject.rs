use crate::{
    config::SyncConfig,
    domain::{CardId, ColumnId},
    error::Result,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// What is being dragged
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum DragSubject {
    Card(CardId),
    Column(ColumnId),
}

/// What the pointer is over
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum DropTarget {
    /// Another card
    Card(CardId),
    /// A column container: its empty space or its header
    Column(ColumnId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    Card,
    Column,
}

impl DragSubject {
    pub fn kind(&self) -> SubjectKind {
        match self {
            Self::Card(_) => SubjectKind::Card,
            Self::Column(_) => SubjectKind::Column,
        }
    }

    pub fn card_id(&self) -> Option<&CardId> {
        match self {
            Self::Card(id) => Some(id),
            Self::Column(_) => None,
        }
    }

    pub fn column_id(&self) -> Option<&ColumnId> {
        match self {
            Self::Column(id) => Some(id),
            Self::Card(_) => None,
        }
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Card => write!(f, "card"),
            Self::Column => write!(f, "column"),
        }
    }
}

impl fmt::Display for DragSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Card(id) => write!(f, "card:{}", id),
            Self::Column(id) => write!(f, "column:{}", id),
        }
    }
}

impl fmt::Display for DropTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Card(id) => write!(f, "card:{}", id),
            Self::Column(id) => write!(f, "column:{}", id),
        }
    }
}

/// Translates the flat string ids a drag-and-drop UI hands out into typed
/// subjects and targets
///
/// Column ids carry a configurable prefix (`column-` by default); any other
/// id names a card. This is only needed at the UI boundary, everything past
/// it works with `DragSubject` and `DropTarget`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragIdCodec {
    column_prefix: String,
}

impl DragIdCodec {
    pub fn new(column_prefix: impl Into<String>) -> Self {
        Self {
            column_prefix: column_prefix.into(),
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.column_id_prefix.clone())
    }

    pub fn subject(&self, raw: &str) -> Result<DragSubject> {
        Ok(match self.split(raw)? {
            Raw::Column(id) => DragSubject::Column(id),
            Raw::Card(id) => DragSubject::Card(id),
        })
    }

    pub fn target(&self, raw: &str) -> Result<DropTarget> {
        Ok(match self.split(raw)? {
            Raw::Column(id) => DropTarget::Column(id),
            Raw::Card(id) => DropTarget::Card(id),
        })
    }

    /// Raw UI id for a column container
    pub fn column_key(&self, id: &ColumnId) -> String {
        format!("{}{}", self.column_prefix, id)
    }

    /// Raw UI id for a card
    pub fn card_key(&self, id: &CardId) -> String {
        id.to_string()
    }

    fn split(&self, raw: &str) -> Result<Raw> {
        match raw.strip_prefix(self.column_prefix.as_str()) {
            Some(rest) => Ok(Raw::Column(ColumnId::from_str(rest)?)),
            None => Ok(Raw::Card(CardId::from_str(raw)?)),
        }
    }
}

impl Default for DragIdCodec {
    fn default() -> Self {
        Self::from_config(&SyncConfig::default())
    }
}

enum Raw {
    Card(CardId),
    Column(ColumnId),
}
