//! SQLite-backed store for Smartmark.
//!
//! [`SqliteStore`] owns the database and the change feed and is shared by
//! every client. Each client talks to it through a [`StoreSession`], which
//! carries that client's signed-in user and implements [`RemoteStore`].
//! Rows are only visible to, and deletable by, their owner; a session may
//! only subscribe to its own user's changes.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use rusqlite::params;
use tracing::{debug, info};
use uuid::Uuid;

use super::feed::{ChangeFeed, Subscription};
use super::RemoteStore;
use crate::database::Database;
use crate::types::bookmark::{Bookmark, ChangeEvent, NewBookmark};
use crate::types::errors::StoreError;

const RLS_VIOLATION: &str = "new row violates row-level security policy for table \"bookmarks\"";

/// Shared bookmark storage with a change feed.
pub struct SqliteStore {
    db: Mutex<Database>,
    feed: ChangeFeed,
}

impl SqliteStore {
    /// Opens (or creates) the store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Arc<Self>, StoreError> {
        let db = Database::open(path)?;
        Ok(Arc::new(Self::from_database(db)))
    }

    /// Opens a throwaway in-memory store.
    pub fn open_in_memory() -> Result<Arc<Self>, StoreError> {
        let db = Database::open_in_memory()?;
        Ok(Arc::new(Self::from_database(db)))
    }

    fn from_database(db: Database) -> Self {
        Self {
            db: Mutex::new(db),
            feed: ChangeFeed::new(),
        }
    }

    /// Opens a new, signed-out client session.
    pub fn connect(self: &Arc<Self>) -> StoreSession {
        StoreSession {
            store: Arc::clone(self),
            user: Mutex::new(None),
        }
    }

    /// The change feed shared by all sessions.
    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    /// Total number of rows across all owners.
    pub fn row_count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .db()
            .connection()
            .query_row("SELECT COUNT(*) FROM bookmarks", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn db(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
        Ok(Bookmark {
            id: row.get(0)?,
            title: row.get(1)?,
            url: row.get(2)?,
            user_id: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    fn insert_row(&self, record: NewBookmark) -> Result<Bookmark, StoreError> {
        let bookmark = Bookmark {
            id: Uuid::new_v4().to_string(),
            title: record.title,
            url: record.url,
            user_id: record.user_id,
            created_at: Utc::now().trunc_subsecs(3),
        };

        self.db().connection().execute(
            "INSERT INTO bookmarks (id, title, url, user_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                bookmark.id,
                bookmark.title,
                bookmark.url,
                bookmark.user_id,
                bookmark.created_at
            ],
        )?;

        Ok(bookmark)
    }

    fn delete_row(&self, id: &str, owner: &str) -> Result<bool, StoreError> {
        let affected = self.db().connection().execute(
            "DELETE FROM bookmarks WHERE id = ?1 AND user_id = ?2",
            params![id, owner],
        )?;
        Ok(affected > 0)
    }

    fn rows_for(&self, owner: &str) -> Result<Vec<Bookmark>, StoreError> {
        let db = self.db();
        let mut stmt = db.connection().prepare(
            "SELECT id, title, url, user_id, created_at FROM bookmarks \
             WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt.query_map(params![owner], Self::row_to_bookmark)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }
}

/// One client's connection to a [`SqliteStore`].
pub struct StoreSession {
    store: Arc<SqliteStore>,
    user: Mutex<Option<String>>,
}

impl StoreSession {
    /// Signs this session in as `user_id`.
    pub fn sign_in(&self, user_id: &str) {
        info!(user = user_id, "signed in");
        *self.user_slot() = Some(user_id.to_string());
    }

    pub fn sign_out(&self) {
        if let Some(user) = self.user_slot().take() {
            info!(user = %user, "signed out");
        }
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<String> {
        self.user_slot().clone()
    }

    pub fn store(&self) -> &Arc<SqliteStore> {
        &self.store
    }

    fn user_slot(&self) -> MutexGuard<'_, Option<String>> {
        self.user.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn require_user(&self) -> Result<String, StoreError> {
        self.user().ok_or(StoreError::SignedOut)
    }
}

#[async_trait]
impl RemoteStore for StoreSession {
    async fn current_user(&self) -> Result<Option<String>, StoreError> {
        Ok(self.user())
    }

    async fn insert(&self, record: NewBookmark) -> Result<Bookmark, StoreError> {
        let user = self.require_user()?;
        if record.user_id != user {
            return Err(StoreError::Unauthorized(RLS_VIOLATION.to_string()));
        }

        let bookmark = self.store.insert_row(record)?;
        debug!(id = %bookmark.id, user = %bookmark.user_id, "bookmark inserted");
        self.store
            .feed
            .publish(&ChangeEvent::Inserted(bookmark.clone()));
        Ok(bookmark)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let user = self.require_user()?;
        if self.store.delete_row(id, &user)? {
            debug!(id, user = %user, "bookmark deleted");
            self.store.feed.publish(&ChangeEvent::Deleted { id: id.to_string() });
        }
        Ok(())
    }

    async fn query(&self, owner: &str) -> Result<Vec<Bookmark>, StoreError> {
        let user = self.require_user()?;
        if user != owner {
            return Ok(Vec::new());
        }
        self.store.rows_for(owner)
    }

    async fn subscribe_changes(&self, owner: &str) -> Result<Subscription, StoreError> {
        let user = self.require_user()?;
        if user != owner {
            return Err(StoreError::Subscription(format!(
                "cannot subscribe to changes for another user ({})",
                owner
            )));
        }
        Ok(self.store.feed.subscribe(owner))
    }
}
