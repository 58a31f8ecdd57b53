//! Smartmark: a personal bookmark manager with live sync across sessions.
//!
//! Entry point: runs an interactive console demo against an in-memory store.
//! Two clients signed in as the same user open the dashboard; changes made in
//! one show up in the other through the change feed.

use std::error::Error;
use std::time::Duration;

use chrono::{Duration as Age, Utc};
use tokio::sync::watch;

use smartmark::app::App;
use smartmark::managers::session_gate::Page;
use smartmark::managers::sync_engine::SyncEngine;
use smartmark::services::formatting::{count_label, derive_domain, relative_age};
use smartmark::services::logging;
use smartmark::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use smartmark::store::SqliteStore;

fn section(title: &str) {
    println!("── {} ──", title);
}

fn print_view(label: &str, engine: &SyncEngine) {
    let now = Utc::now();
    println!("  [{}] {}", label, count_label(engine.len()));
    for bookmark in engine.bookmarks() {
        println!(
            "    • {:<20} {:<18} {}",
            bookmark.title,
            derive_domain(&bookmark.url),
            relative_age(bookmark.created_at, now)
        );
    }
}

/// Waits until the engine's revision moves, or gives up after a second.
async fn settle(rx: &mut watch::Receiver<u64>) {
    let _ = tokio::time::timeout(Duration::from_secs(1), rx.changed()).await;
    tokio::task::yield_now().await;
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut settings_engine = SettingsEngine::new(None);
    let settings = settings_engine.load().unwrap_or_default();
    let _log_guard = logging::init(&settings.logging);

    println!();
    println!("Smartmark v{} (demo mode)", env!("CARGO_PKG_VERSION"));
    println!();

    let store = SqliteStore::open_in_memory()?;
    let mut laptop = App::with_store(&store, settings.clone());
    let mut phone = App::with_store(&store, settings);

    section("Session Gate");
    println!("  signed out, /dashboard → {:?}", laptop.open_page(Page::Dashboard).await?);
    laptop.sign_in("demo-user");
    phone.sign_in("demo-user");
    println!("  signed in,  /          → {:?}", laptop.open_page(Page::Landing).await?);
    println!("  signed in,  /dashboard → {:?}", laptop.open_page(Page::Dashboard).await?);
    phone.open_page(Page::Dashboard).await?;
    println!();

    let (Some(laptop_view), Some(phone_view)) = (laptop.dashboard(), phone.dashboard()) else {
        return Err("dashboard did not open".into());
    };
    let mut phone_changes = phone_view.watch_revisions();

    section("Optimistic create + live echo");
    let created = laptop_view.submit_create("Rust Book", "doc.rust-lang.org/book").await?;
    println!("  laptop created {} → {}", created.id, created.url);
    settle(&mut phone_changes).await;
    laptop_view.submit_create("Tokio", "https://www.tokio.rs").await?;
    settle(&mut phone_changes).await;
    print_view("laptop", laptop_view);
    print_view("phone", phone_view);
    println!();

    section("Duplicate suppression");
    let echoed = laptop_view.on_remote_insert(created.clone());
    println!("  replaying insert notification for {} changed view: {}", created.id, echoed);
    println!();

    section("Validation");
    match laptop_view.submit_create("   ", "example.com").await {
        Ok(_) => println!("  unexpected success"),
        Err(e) => println!("  rejected: {}", e),
    }
    println!();

    section("Delete from phone");
    phone_view.submit_delete(&created.id).await;
    let mut laptop_changes = laptop_view.watch_revisions();
    settle(&mut laptop_changes).await;
    print_view("laptop", laptop_view);
    print_view("phone", phone_view);
    println!();

    section("Relative age");
    let now = Utc::now();
    for delta in [Age::seconds(5), Age::minutes(12), Age::hours(5), Age::days(3), Age::days(30)] {
        println!("  {:>12} → {}", format!("{}s", delta.num_seconds()), relative_age(now - delta, now));
    }
    println!();

    laptop.close_page();
    phone.close_page();
    println!("Subscriptions left open: {}", store.feed().subscriber_count());
    Ok(())
}
