use crate::domain::id::{CardId, ColumnId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Priority of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
            Self::Urgent => write!(f, "Urgent"),
        }
    }
}

impl FromStr for Priority {
    type Err = crate::error::BoardSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(crate::error::BoardSyncError::Validation(format!(
                "Invalid priority '{}'. Valid priorities: low, medium, high, urgent",
                s
            ))),
        }
    }
}

/// A card on a kanban board
///
/// Only `column_id` and `order` take part in ordering. Everything else is
/// carried through unchanged by the drag engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub column_id: ColumnId,
    pub title: String,
    pub order: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Creates a card at the given position of a column
    pub fn new(id: CardId, column_id: ColumnId, title: String, order: usize) -> Self {
        let now = Utc::now();
        Self {
            id,
            column_id,
            title,
            order,
            description: None,
            priority: None,
            due_date: None,
            assignees: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_title(&mut self, title: String) {
        self.title = title;
        self.updated_at = Utc::now();
    }

    pub fn set_description(&mut self, description: String) {
        self.description = Some(description);
        self.updated_at = Utc::now();
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = Some(priority);
        self.updated_at = Utc::now();
    }

    pub fn set_due_date(&mut self, date: DateTime<Utc>) {
        self.due_date = Some(date);
        self.updated_at = Utc::now();
    }

    /// Adds an assignee unless already present
    pub fn assign(&mut self, assignee: impl Into<String>) {
        let assignee = assignee.into();
        if !self.assignees.contains(&assignee) {
            self.assignees.push(assignee);
            self.updated_at = Utc::now();
        }
    }

    /// Applies the non-ordering fields of a patch
    pub fn apply_patch(&mut self, patch: &CardPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(priority) = patch.priority {
            self.priority = Some(priority);
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(assignees) = &patch.assignees {
            self.assignees = assignees.clone();
        }
        self.updated_at = Utc::now();
    }
}

/// Fields for creating a card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewCard {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
}

impl NewCard {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), crate::error::BoardSyncError> {
        if self.title.trim().is_empty() {
            return Err(crate::error::BoardSyncError::Validation(
                "card title must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial update of a card's non-ordering fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
}

impl CardPatch {
    pub fn validate(&self) -> Result<(), crate::error::BoardSyncError> {
        if matches!(&self.title, Some(title) if title.trim().is_empty()) {
            return Err(crate::error::BoardSyncError::Validation(
                "card title must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> Card {
        Card::new(CardId::new("k1"), ColumnId::new("todo"), "Write docs".to_string(), 0)
    }

    #[test]
    fn test_priority_parsing_case_insensitive() {
        assert_eq!(Priority::from_str("HIGH").unwrap(), Priority::High);
        assert_eq!(Priority::from_str("Urgent").unwrap(), Priority::Urgent);
        assert!(Priority::from_str("someday").is_err());
        assert!(Priority::Urgent > Priority::Low);
    }

    #[test]
    fn test_assign_is_deduplicated() {
        let mut card = card();
        card.assign("ana");
        card.assign("ana");
        card.assign("ben");
        assert_eq!(card.assignees, vec!["ana".to_string(), "ben".to_string()]);
    }

    #[test]
    fn test_apply_patch_leaves_ordering_alone() {
        let mut card = card();
        card.order = 3;
        let before = card.updated_at;

        card.apply_patch(&CardPatch {
            title: Some("Write more docs".to_string()),
            priority: Some(Priority::High),
            ..CardPatch::default()
        });

        assert_eq!(card.title, "Write more docs");
        assert_eq!(card.priority, Some(Priority::High));
        assert_eq!(card.order, 3);
        assert_eq!(card.column_id.as_str(), "todo");
        assert!(card.updated_at >= before);
    }

    #[test]
    fn test_blank_titles_rejected() {
        assert!(NewCard::titled("   ").validate().is_err());
        assert!(NewCard::titled("ok").validate().is_ok());

        let patch = CardPatch {
            title: Some(String::new()),
            ..CardPatch::default()
        };
        assert!(patch.validate().is_err());
        assert!(CardPatch::default().validate().is_ok());
    }

    #[test]
    fn test_optional_metadata_skipped_in_json() {
        let json = serde_json::to_value(card()).unwrap();
        assert!(json.get("description").is_none());
        assert!(json.get("assignees").is_none());
        assert_eq!(json["column_id"], "todo");
    }
}
