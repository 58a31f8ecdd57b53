//! Synchronization engine for the bookmark view.
//!
//! Keeps one ordered, id-unique list consistent across three inputs:
//!
//! 1. authoritative snapshots (`reset` / `refresh`),
//! 2. local optimistic mutations (`submit_create` / `submit_delete`),
//! 3. change notifications pushed by the store (`on_remote_insert` /
//!    `on_remote_delete`, fed automatically while mounted).
//!
//! The same creation normally arrives twice, once as the insert result and
//! once as a notification echo; whichever lands second is dropped by the id
//! check. New entries always go to the head of the list.
//!
//! State sits behind a mutex that is never held across an `.await`, so
//! notifications are applied while a create or delete is in flight.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::managers::bookmark_list::BookmarkList;
use crate::services::formatting::{normalize_title, normalize_url};
use crate::store::{RemoteStore, SubscriptionGuard};
use crate::types::bookmark::{Bookmark, ChangeEvent, NewBookmark};
use crate::types::errors::SyncError;
use crate::types::settings::{DeletePolicy, SyncSettings};

/// Message reported when a title or URL is blank.
pub const VALIDATION_MESSAGE: &str = "Both title and URL are required.";

/// Presentation-facing status next to the list itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineStatus {
    /// Creates awaiting the store.
    pub pending_creates: usize,
    /// Last user-visible error, cleared when a new create starts.
    pub last_error: Option<String>,
}

impl EngineStatus {
    pub fn is_loading(&self) -> bool {
        self.pending_creates > 0
    }
}

#[derive(Default)]
struct ViewState {
    list: BookmarkList,
    status: EngineStatus,
    revision: u64,
}

/// State shared between the engine and its feed task.
struct Shared {
    owner: String,
    state: Mutex<ViewState>,
    revisions: watch::Sender<u64>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump(&self, state: &mut ViewState) {
        state.revision += 1;
        self.revisions.send_replace(state.revision);
    }

    fn insert_from_feed(&self, record: Bookmark) -> bool {
        if record.user_id != self.owner {
            debug!(id = %record.id, owner = %record.user_id, "ignoring insert for another owner");
            return false;
        }
        let id = record.id.clone();
        let mut state = self.state();
        if state.list.insert_head(record) {
            debug!(id = %id, "inserted from change feed");
            self.bump(&mut state);
            true
        } else {
            debug!(id = %id, "duplicate insert notification ignored");
            false
        }
    }

    fn delete_from_feed(&self, id: &str) -> bool {
        let mut state = self.state();
        if state.list.remove(id).is_some() {
            debug!(id, "removed by change feed");
            self.bump(&mut state);
            true
        } else {
            false
        }
    }

    fn apply(&self, event: ChangeEvent) -> bool {
        match event {
            ChangeEvent::Inserted(record) => self.insert_from_feed(record),
            ChangeEvent::Deleted { id } => self.delete_from_feed(&id),
        }
    }

    fn set_error(&self, message: Option<String>) {
        let mut state = self.state();
        if state.status.last_error != message {
            state.status.last_error = message;
            self.bump(&mut state);
        }
    }
}

/// Counts an in-flight create for as long as it lives, including when the
/// create future is dropped mid-flight.
struct PendingCreate<'a> {
    shared: &'a Shared,
}

impl<'a> PendingCreate<'a> {
    fn begin(shared: &'a Shared) -> Self {
        let mut state = shared.state();
        state.status.pending_creates += 1;
        state.status.last_error = None;
        shared.bump(&mut state);
        Self { shared }
    }
}

impl Drop for PendingCreate<'_> {
    fn drop(&mut self) {
        let mut state = self.shared.state();
        state.status.pending_creates = state.status.pending_creates.saturating_sub(1);
        self.shared.bump(&mut state);
    }
}

/// An active change subscription and the task pumping it into the view.
struct LiveFeed {
    guard: SubscriptionGuard,
    task: JoinHandle<()>,
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        self.task.abort();
        debug!(subscription = self.guard.id(), "live feed stopped");
    }
}

/// Doubles `backoff` without overflowing, capped at `max`.
fn next_backoff(backoff: Duration, max: Duration) -> Duration {
    backoff.saturating_mul(2).min(max)
}

/// Reconciles the local bookmark view with the remote store.
pub struct SyncEngine {
    store: Arc<dyn RemoteStore>,
    shared: Arc<Shared>,
    settings: SyncSettings,
    live: Mutex<Option<LiveFeed>>,
}

impl SyncEngine {
    /// Creates an engine with an empty view for `owner`.
    pub fn new(store: Arc<dyn RemoteStore>, owner: impl Into<String>, settings: SyncSettings) -> Self {
        let (revisions, _) = watch::channel(0);
        Self {
            store,
            shared: Arc::new(Shared {
                owner: owner.into(),
                state: Mutex::new(ViewState::default()),
                revisions,
            }),
            settings,
            live: Mutex::new(None),
        }
    }

    pub fn owner(&self) -> &str {
        &self.shared.owner
    }

    fn live_slot(&self) -> MutexGuard<'_, Option<LiveFeed>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ─── Snapshot ───

    /// Replaces the whole view with `snapshot`. Prior local state is discarded.
    pub fn reset(&self, snapshot: Vec<Bookmark>) {
        let mut state = self.shared.state();
        state.list.reset(snapshot);
        debug!(count = state.list.len(), "view reset from snapshot");
        self.shared.bump(&mut state);
    }

    /// Fetches a fresh snapshot from the store and resets to it.
    ///
    /// This is the only way to recover notifications missed while the feed
    /// was disconnected. Returns the number of entries loaded.
    pub async fn refresh(&self) -> Result<usize, SyncError> {
        let snapshot = self.store.query(&self.shared.owner).await?;
        let count = snapshot.len();
        self.reset(snapshot);
        Ok(count)
    }

    // ─── Subscription lifecycle ───

    /// Subscribes to the owner's change feed and starts applying notifications.
    ///
    /// Any previous subscription is released first, so at most one is active.
    pub async fn mount(&self) -> Result<(), SyncError> {
        self.unmount();

        let subscription = self.store.subscribe_changes(&self.shared.owner).await?;
        let (guard, mut events) = subscription.into_parts();
        let subscription_id = guard.id();
        let shared = Arc::clone(&self.shared);

        let task = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                shared.apply(event);
            }
            debug!(subscription = subscription_id, "change feed closed");
        });

        // Assigning drops any feed a concurrent mount installed meanwhile.
        *self.live_slot() = Some(LiveFeed { guard, task });
        info!(owner = %self.shared.owner, subscription = subscription_id, "view mounted");
        Ok(())
    }

    /// Releases the active subscription. Returns whether one was active.
    pub fn unmount(&self) -> bool {
        let previous = self.live_slot().take();
        match previous {
            Some(feed) => {
                info!(owner = %self.shared.owner, subscription = feed.guard.id(), "view unmounted");
                drop(feed);
                true
            }
            None => false,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.live_slot().is_some()
    }

    // ─── Local mutations ───

    /// Validates, normalizes and inserts a bookmark, then places the stored
    /// record at the head of the view unless the feed already delivered it.
    ///
    /// # Errors
    /// `SyncError::Validation` for a blank title or URL (no remote call is
    /// made); `SyncError::Remote` when the store rejects the insert. The view
    /// is unchanged on error.
    pub async fn submit_create(&self, title: &str, url: &str) -> Result<Bookmark, SyncError> {
        let title = normalize_title(title);
        if title.is_empty() || url.trim().is_empty() {
            self.shared.set_error(Some(VALIDATION_MESSAGE.to_string()));
            return Err(SyncError::Validation(VALIDATION_MESSAGE.to_string()));
        }

        let record = NewBookmark {
            title,
            url: normalize_url(url),
            user_id: self.shared.owner.clone(),
        };

        let pending = PendingCreate::begin(&self.shared);
        let result = self.store.insert(record).await;
        drop(pending);

        match result {
            Ok(bookmark) => {
                let mut state = self.shared.state();
                if state.list.insert_head(bookmark.clone()) {
                    debug!(id = %bookmark.id, "inserted from create result");
                    self.shared.bump(&mut state);
                } else {
                    debug!(id = %bookmark.id, "create result already delivered by feed");
                }
                Ok(bookmark)
            }
            Err(err) => {
                warn!(error = %err, "create failed");
                let err = SyncError::from(err);
                self.shared.set_error(Some(err.to_string()));
                Err(err)
            }
        }
    }

    /// Removes the entry locally at once, then asks the store to delete it.
    ///
    /// Under `DeletePolicy::FireAndForget` a failed remote delete is logged and
    /// otherwise ignored; the entry stays hidden. Under `DeletePolicy::Retry`
    /// the delete is retried with exponential backoff and, once attempts run
    /// out, the entry is put back where it was and an error is reported.
    pub async fn submit_delete(&self, id: &str) {
        let removed = {
            let mut state = self.shared.state();
            let removed = state.list.remove(id);
            if removed.is_some() {
                self.shared.bump(&mut state);
            }
            removed
        };

        match self.settings.delete_policy {
            DeletePolicy::FireAndForget => {
                if let Err(err) = self.store.delete(id).await {
                    warn!(id, error = %err, "remote delete failed; entry stays hidden");
                }
            }
            DeletePolicy::Retry {
                max_attempts,
                initial_backoff_ms,
                max_backoff_ms,
            } => {
                let attempts = max_attempts.max(1);
                let max_backoff = Duration::from_millis(max_backoff_ms);
                let mut backoff = Duration::from_millis(initial_backoff_ms).min(max_backoff);
                let mut last_error = None;

                for attempt in 1..=attempts {
                    match self.store.delete(id).await {
                        Ok(()) => return,
                        Err(err) => {
                            warn!(id, attempt, attempts, error = %err, "remote delete failed");
                            last_error = Some(err);
                        }
                    }
                    if attempt < attempts {
                        tokio::time::sleep(backoff).await;
                        backoff = next_backoff(backoff, max_backoff);
                    }
                }

                if let (Some((index, bookmark)), Some(err)) = (removed, last_error) {
                    self.restore(index, bookmark, err.message());
                }
            }
        }
    }

    fn restore(&self, index: usize, bookmark: Bookmark, reason: &str) {
        let message = format!("Could not delete \"{}\": {}", bookmark.title, reason);
        let id = bookmark.id.clone();
        let mut state = self.shared.state();
        if state.list.insert_at(index, bookmark) {
            info!(id = %id, index, "restored entry after failed delete");
        }
        state.status.last_error = Some(message);
        self.shared.bump(&mut state);
    }

    // ─── Change notifications ───

    /// Applies an insert notification. Returns whether the view changed.
    pub fn on_remote_insert(&self, record: Bookmark) -> bool {
        self.shared.insert_from_feed(record)
    }

    /// Applies a delete notification. Unknown ids are a no-op.
    pub fn on_remote_delete(&self, id: &str) -> bool {
        self.shared.delete_from_feed(id)
    }

    // ─── Read side ───

    /// The current view, head first.
    pub fn bookmarks(&self) -> Vec<Bookmark> {
        self.shared.state().list.to_vec()
    }

    pub fn len(&self) -> usize {
        self.shared.state().list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.state().list.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.shared.state().list.contains(id)
    }

    pub fn status(&self) -> EngineStatus {
        self.shared.state().status.clone()
    }

    pub fn clear_error(&self) {
        self.shared.set_error(None);
    }

    /// Monotonic counter bumped on every visible change.
    pub fn revision(&self) -> u64 {
        self.shared.state().revision
    }

    /// Receiver that wakes whenever the revision moves.
    pub fn watch_revisions(&self) -> watch::Receiver<u64> {
        self.shared.revisions.subscribe()
    }
}
