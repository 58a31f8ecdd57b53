//! RPC method handler for the Smartmark JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` dispatches one call to the `App`.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::app::App;
use crate::managers::session_gate::{GateDecision, Page};
use crate::managers::sync_engine::SyncEngine;
use crate::services::formatting::{count_label, derive_domain, relative_age};
use crate::types::bookmark::Bookmark;

/// Renders a bookmark for the list view.
pub fn bookmark_json(bookmark: &Bookmark, now: DateTime<Utc>) -> Value {
    json!({
        "id": bookmark.id,
        "title": bookmark.title,
        "url": bookmark.url,
        "user_id": bookmark.user_id,
        "created_at": bookmark.created_at,
        "domain": derive_domain(&bookmark.url),
        "age": relative_age(bookmark.created_at, now),
    })
}

fn count_json(engine: &SyncEngine) -> Value {
    let count = engine.len();
    json!({"count": count, "label": count_label(count)})
}

fn str_param<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

fn dashboard(app: &App) -> Result<&SyncEngine, String> {
    app.dashboard()
        .ok_or_else(|| "dashboard is not open".to_string())
}

/// Dispatch a JSON-RPC method call.
///
/// Returns `Ok(Value)` on success or `Err(String)` with a user-facing message.
pub async fn handle_method(app: &mut App, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Auth ───
        "auth.sign_in" => {
            let user_id = str_param(params, "user_id").ok_or("missing user_id")?;
            if user_id.trim().is_empty() {
                return Err("invalid user_id".to_string());
            }
            app.sign_in(user_id);
            Ok(json!({"user_id": user_id}))
        }
        "auth.sign_out" => {
            app.sign_out();
            Ok(json!({"ok": true}))
        }
        "auth.user" => Ok(json!({"user_id": app.session.user()})),

        // ─── Pages ───
        "page.open" => {
            let page: Page = serde_json::from_value(params.get("page").cloned().unwrap_or(Value::Null))
                .map_err(|_| "invalid page: expected \"landing\" or \"dashboard\"".to_string())?;
            let decision = app.open_page(page).await.map_err(|e| e.to_string())?;
            match decision {
                GateDecision::Landing => Ok(json!({"render": "landing"})),
                GateDecision::Dashboard { user_id } => {
                    let engine = dashboard(app)?;
                    Ok(json!({
                        "render": "dashboard",
                        "user_id": user_id,
                        "count": engine.len(),
                    }))
                }
                GateDecision::Redirect(target) => Ok(json!({"redirect": target})),
            }
        }
        "page.close" => Ok(json!({"closed": app.close_page()})),

        // ─── Bookmarks ───
        "bookmark.list" => {
            let engine = dashboard(app)?;
            let now = Utc::now();
            let items: Vec<Value> = engine
                .bookmarks()
                .iter()
                .map(|b| bookmark_json(b, now))
                .collect();
            let count = items.len();
            Ok(json!({"items": items, "count": count, "label": count_label(count)}))
        }
        "bookmark.add" => {
            let title = str_param(params, "title").unwrap_or("");
            let url = str_param(params, "url").unwrap_or("");
            let engine = dashboard(app)?;
            let bookmark = engine
                .submit_create(title, url)
                .await
                .map_err(|e| e.to_string())?;
            Ok(bookmark_json(&bookmark, Utc::now()))
        }
        "bookmark.delete" => {
            let id = str_param(params, "id").ok_or("missing id")?;
            let engine = dashboard(app)?;
            engine.submit_delete(id).await;
            Ok(json!({"ok": true}))
        }
        "bookmark.count" => Ok(count_json(dashboard(app)?)),
        "bookmark.refresh" => {
            let engine = dashboard(app)?;
            let count = engine.refresh().await.map_err(|e| e.to_string())?;
            Ok(json!({"count": count}))
        }

        // ─── Status ───
        "status" => {
            let engine = dashboard(app)?;
            let status = engine.status();
            Ok(json!({
                "pending_creates": status.pending_creates,
                "loading": status.is_loading(),
                "last_error": status.last_error,
                "mounted": engine.is_mounted(),
                "revision": engine.revision(),
            }))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
