//! Property-based tests for the sync engine's view under arbitrary
//! interleavings of local mutations and change notifications.
//!
//! These tests verify that ids never repeat, that deletes are idempotent,
//! and that a reset always yields exactly the snapshot it was given.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use proptest::prelude::*;

use smartmark::managers::sync_engine::SyncEngine;
use smartmark::store::{RemoteStore, SqliteStore};
use smartmark::types::bookmark::Bookmark;
use smartmark::types::settings::SyncSettings;

const USER: &str = "user-1";

#[derive(Debug, Clone)]
enum Op {
    /// Create through the store; the result lands in the view.
    Create(String),
    /// Replay the insert notification for the n-th known bookmark.
    Echo(usize),
    /// Notification for a bookmark created elsewhere.
    RemoteInsert(u8),
    /// Delete notification for the n-th known bookmark.
    RemoteDelete(usize),
    /// Local delete of the n-th known bookmark.
    SubmitDelete(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[A-Za-z][A-Za-z ]{0,11}".prop_map(Op::Create),
        (0usize..16).prop_map(Op::Echo),
        any::<u8>().prop_map(Op::RemoteInsert),
        (0usize..16).prop_map(Op::RemoteDelete),
        (0usize..16).prop_map(Op::SubmitDelete),
    ]
}

fn remote_bookmark(n: u8) -> Bookmark {
    Bookmark {
        id: format!("remote-{}", n),
        title: format!("Remote {}", n),
        url: format!("https://remote{}.example.com", n),
        user_id: USER.to_string(),
        created_at: Utc::now() - Duration::seconds(i64::from(n)),
    }
}

fn arb_snapshot() -> impl Strategy<Value = Vec<Bookmark>> {
    proptest::collection::btree_set(any::<u8>(), 0..8)
        .prop_map(|ns| ns.into_iter().rev().map(remote_bookmark).collect())
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
}

fn new_engine() -> (Arc<SqliteStore>, SyncEngine) {
    let store = SqliteStore::open_in_memory().expect("store");
    let session = Arc::new(store.connect());
    session.sign_in(USER);
    let engine = SyncEngine::new(session as Arc<dyn RemoteStore>, USER, SyncSettings::default());
    (store, engine)
}

/// Applies `ops`, returning every bookmark the run has seen.
async fn apply_ops(engine: &SyncEngine, ops: &[Op]) -> Vec<Bookmark> {
    let mut known: Vec<Bookmark> = Vec::new();
    for op in ops {
        match op {
            Op::Create(title) => {
                let url = format!("{}.example.com", title.trim().replace(' ', "-"));
                if let Ok(created) = engine.submit_create(title, &url).await {
                    known.push(created);
                }
            }
            Op::Echo(n) => {
                if let Some(b) = known.get(n % known.len().max(1)) {
                    engine.on_remote_insert(b.clone());
                }
            }
            Op::RemoteInsert(n) => {
                let b = remote_bookmark(*n);
                engine.on_remote_insert(b.clone());
                known.push(b);
            }
            Op::RemoteDelete(n) => {
                if let Some(b) = known.get(n % known.len().max(1)) {
                    engine.on_remote_delete(&b.id);
                }
            }
            Op::SubmitDelete(n) => {
                if let Some(b) = known.get(n % known.len().max(1)) {
                    engine.submit_delete(&b.id).await;
                }
            }
        }
    }
    known
}

fn has_unique_ids(view: &[Bookmark]) -> bool {
    let mut seen = HashSet::new();
    view.iter().all(|b| seen.insert(b.id.clone()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// No interleaving of creates, echoes and notifications produces a repeated id.
    #[test]
    fn prop_view_never_has_duplicate_ids(ops in proptest::collection::vec(arb_op(), 0..40)) {
        let rt = runtime();
        let (_store, engine) = new_engine();
        rt.block_on(apply_ops(&engine, &ops));
        prop_assert!(has_unique_ids(&engine.bookmarks()));
    }

    /// After a create succeeds, replaying its notification any number of times
    /// leaves exactly one entry with its id.
    #[test]
    fn prop_create_then_echoes_keep_one_entry(title in "[A-Za-z]{1,12}", echoes in 0usize..5) {
        let rt = runtime();
        let (_store, engine) = new_engine();
        let created = rt
            .block_on(engine.submit_create(&title, "example.com"))
            .expect("create");
        for _ in 0..echoes {
            engine.on_remote_insert(created.clone());
        }
        let view = engine.bookmarks();
        prop_assert_eq!(view.iter().filter(|b| b.id == created.id).count(), 1);
        prop_assert_eq!(&view[0].id, &created.id);
    }

    /// Deleting an id a second time changes nothing.
    #[test]
    fn prop_delete_is_idempotent(
        ops in proptest::collection::vec(arb_op(), 1..30),
        pick in any::<usize>(),
    ) {
        let rt = runtime();
        let (_store, engine) = new_engine();
        let known = rt.block_on(apply_ops(&engine, &ops));
        prop_assume!(!known.is_empty());
        let id = known[pick % known.len()].id.clone();

        rt.block_on(engine.submit_delete(&id));
        let once = engine.bookmarks();
        prop_assert!(!engine.on_remote_delete(&id));
        rt.block_on(engine.submit_delete(&id));
        prop_assert_eq!(engine.bookmarks(), once);
    }

    /// Whatever happened before, a reset yields exactly the snapshot.
    #[test]
    fn prop_reset_yields_snapshot(
        ops in proptest::collection::vec(arb_op(), 0..30),
        snapshot in arb_snapshot(),
    ) {
        let rt = runtime();
        let (_store, engine) = new_engine();
        rt.block_on(apply_ops(&engine, &ops));

        engine.reset(snapshot.clone());
        prop_assert_eq!(engine.bookmarks(), snapshot);
    }
}
