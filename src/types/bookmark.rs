use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a saved bookmark as stored by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// An insert request. `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBookmark {
    pub title: String,
    pub url: String,
    pub user_id: String,
}

/// A row-level change delivered by the store's change feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChangeEvent {
    Inserted(Bookmark),
    Deleted { id: String },
}

impl ChangeEvent {
    /// Id of the row the event refers to.
    pub fn bookmark_id(&self) -> &str {
        match self {
            ChangeEvent::Inserted(bookmark) => &bookmark.id,
            ChangeEvent::Deleted { id } => id,
        }
    }
}
