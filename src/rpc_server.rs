//! Smartmark RPC server: JSON-RPC over stdin/stdout for a UI shell.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"bookmark.add", "params":{"title":"...","url":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! Event:    {"event":"bookmarks.changed", "count":3, "revision":7}
//!
//! Events are pushed whenever the open dashboard changes between requests,
//! e.g. because another session added or deleted a bookmark.

use std::io::{self, Write};

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use smartmark::app::App;
use smartmark::rpc_handler::handle_method;
use smartmark::services::logging;
use smartmark::services::settings_engine::{SettingsEngine, SettingsEngineTrait};

fn emit(value: &Value) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", value)?;
    out.flush()
}

/// Resolves when the watched revision moves; `false` once the engine is gone.
async fn revision_changed(revisions: &mut Option<watch::Receiver<u64>>) -> bool {
    match revisions {
        Some(rx) => rx.changed().await.is_ok(),
        None => std::future::pending().await,
    }
}

/// Fresh receiver for the open dashboard, with the current revision marked seen.
fn watch_dashboard(app: &App) -> Option<watch::Receiver<u64>> {
    app.dashboard().map(|engine| {
        let mut rx = engine.watch_revisions();
        rx.borrow_and_update();
        rx
    })
}

async fn respond(app: &mut App, line: &str) -> Value {
    let req: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => return json!({"id": null, "error": format!("parse error: {}", e)}),
    };

    let id = req.get("id").cloned().unwrap_or(Value::Null);
    let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
    let params = req.get("params").cloned().unwrap_or(json!({}));
    debug!(method, "rpc request");

    match handle_method(app, method, &params).await {
        Ok(val) => json!({"id": id, "result": val}),
        Err(err) => json!({"id": id, "error": err}),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut settings_engine = SettingsEngine::new(None);
    let settings = settings_engine.load()?;
    let _log_guard = logging::init(&settings.logging);

    let mut app = App::new(settings)?;
    emit(&json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}))?;
    info!("rpc server ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut revisions: Option<watch::Receiver<u64>> = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(l)) => l,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "stdin read failed");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                let response = respond(&mut app, &line).await;
                emit(&response)?;
                revisions = watch_dashboard(&app);
            }
            changed = revision_changed(&mut revisions) => {
                if !changed {
                    revisions = None;
                    continue;
                }
                if let Some(engine) = app.dashboard() {
                    emit(&json!({
                        "event": "bookmarks.changed",
                        "count": engine.len(),
                        "revision": engine.revision(),
                    }))?;
                }
            }
        }
    }

    app.close_page();
    info!("rpc server stopped");
    Ok(())
}
