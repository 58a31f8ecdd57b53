//! Remote store contract.
//!
//! The synchronization engine never talks to storage directly; it consumes a
//! [`RemoteStore`] passed in by the caller. `sqlite_store` provides a local
//! implementation with the same semantics as the hosted backend: per-client
//! sessions, owner-scoped rows and a change feed.

use async_trait::async_trait;

use crate::types::bookmark::{Bookmark, NewBookmark};
use crate::types::errors::StoreError;

pub mod feed;
pub mod sqlite_store;

pub use feed::{ChangeFeed, Subscription, SubscriptionGuard};
pub use sqlite_store::{SqliteStore, StoreSession};

/// Authentication, CRUD and change notification for the `bookmarks` table.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// The signed-in user, if any.
    async fn current_user(&self) -> Result<Option<String>, StoreError>;

    /// Inserts a row and returns it with its assigned `id` and `created_at`.
    async fn insert(&self, record: NewBookmark) -> Result<Bookmark, StoreError>;

    /// Deletes a row by id. Deleting an absent row succeeds.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// All rows owned by `owner`, newest first.
    async fn query(&self, owner: &str) -> Result<Vec<Bookmark>, StoreError>;

    /// Opens a change subscription: inserts filtered to `owner`, deletes unfiltered.
    async fn subscribe_changes(&self, owner: &str) -> Result<Subscription, StoreError>;
}
