//! App Core for Smartmark.
//!
//! Ties a client session on the store to the session gate and, while the
//! dashboard is open, to a mounted sync engine.

use std::sync::Arc;

use tracing::info;

use crate::managers::session_gate::{GateDecision, Page, SessionGate};
use crate::managers::sync_engine::SyncEngine;
use crate::services::settings_engine::resolve_database_path;
use crate::store::{RemoteStore, SqliteStore, StoreSession};
use crate::types::errors::SyncError;
use crate::types::settings::AppSettings;

/// One client: its store session, page gate and dashboard view.
pub struct App {
    pub settings: AppSettings,
    pub session: Arc<StoreSession>,
    gate: SessionGate,
    dashboard: Option<SyncEngine>,
}

impl App {
    /// Opens the database named by `settings` and connects a signed-out session.
    pub fn new(settings: AppSettings) -> Result<Self, Box<dyn std::error::Error>> {
        let db_path = resolve_database_path(&settings);
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let store = SqliteStore::open(&db_path)?;
        info!(path = %db_path.display(), "store opened");
        Ok(Self::with_store(&store, settings))
    }

    /// Connects a new client to an existing store.
    pub fn with_store(store: &Arc<SqliteStore>, settings: AppSettings) -> Self {
        let session = Arc::new(store.connect());
        let gate = SessionGate::new(Arc::clone(&session) as Arc<dyn RemoteStore>);
        Self {
            settings,
            session,
            gate,
            dashboard: None,
        }
    }

    /// Signs in. An open dashboard for a different user is closed.
    pub fn sign_in(&mut self, user_id: &str) {
        if self
            .dashboard
            .as_ref()
            .is_some_and(|engine| engine.owner() != user_id)
        {
            self.close_page();
        }
        self.session.sign_in(user_id);
    }

    /// Signs out and closes the dashboard.
    pub fn sign_out(&mut self) {
        self.close_page();
        self.session.sign_out();
    }

    /// Handles a page request.
    ///
    /// Opening the dashboard subscribes to the change feed and then loads a
    /// fresh snapshot; re-opening it resets the view to a new snapshot. Any
    /// other outcome closes the dashboard.
    pub async fn open_page(&mut self, page: Page) -> Result<GateDecision, SyncError> {
        let decision = self.gate.resolve(page).await?;

        match &decision {
            GateDecision::Dashboard { user_id } => {
                let reuse = self
                    .dashboard
                    .as_ref()
                    .is_some_and(|engine| engine.owner() == user_id);
                if !reuse {
                    let store = Arc::clone(&self.session) as Arc<dyn RemoteStore>;
                    self.dashboard = Some(SyncEngine::new(
                        store,
                        user_id.clone(),
                        self.settings.sync.clone(),
                    ));
                }
                if let Some(engine) = &self.dashboard {
                    engine.mount().await?;
                    engine.refresh().await?;
                }
            }
            _ => {
                self.close_page();
            }
        }

        Ok(decision)
    }

    /// Closes the dashboard, releasing its subscription. Returns whether one was open.
    pub fn close_page(&mut self) -> bool {
        match self.dashboard.take() {
            Some(engine) => {
                engine.unmount();
                true
            }
            None => false,
        }
    }

    /// The dashboard's engine while it is open.
    pub fn dashboard(&self) -> Option<&SyncEngine> {
        self.dashboard.as_ref()
    }
}
