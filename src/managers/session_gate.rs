//! Session gate: decides whether a page renders or redirects.
//!
//! Signed-in visitors are sent from the landing page to the dashboard;
//! signed-out visitors are sent from the dashboard back to the landing page.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::RemoteStore;
use crate::types::errors::SyncError;

/// Pages the presentation layer can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Landing,
    Dashboard,
}

/// Outcome of a page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Render the landing page (no user).
    Landing,
    /// Render the dashboard for this user.
    Dashboard { user_id: String },
    /// Send the visitor elsewhere.
    Redirect(Page),
}

/// Resolves page requests against the store's current user.
pub struct SessionGate {
    store: Arc<dyn RemoteStore>,
}

impl SessionGate {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Decides what happens when `page` is requested.
    pub async fn resolve(&self, page: Page) -> Result<GateDecision, SyncError> {
        let user = self.store.current_user().await?;
        let decision = match (page, user) {
            (Page::Landing, None) => GateDecision::Landing,
            (Page::Landing, Some(_)) => GateDecision::Redirect(Page::Dashboard),
            (Page::Dashboard, Some(user_id)) => GateDecision::Dashboard { user_id },
            (Page::Dashboard, None) => GateDecision::Redirect(Page::Landing),
        };
        debug!(?page, ?decision, "page request resolved");
        Ok(decision)
    }
}
