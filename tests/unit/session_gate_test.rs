//! Unit tests for page gating on the signed-in user.

use std::sync::Arc;

use rstest::rstest;
use smartmark::managers::session_gate::{GateDecision, Page, SessionGate};
use smartmark::store::{RemoteStore, SqliteStore, StoreSession};

fn gate_for(user: Option<&str>) -> SessionGate {
    let store = SqliteStore::open_in_memory().unwrap();
    let session: Arc<StoreSession> = Arc::new(store.connect());
    if let Some(user) = user {
        session.sign_in(user);
    }
    SessionGate::new(session as Arc<dyn RemoteStore>)
}

#[rstest]
#[case(None, Page::Landing, GateDecision::Landing)]
#[case(None, Page::Dashboard, GateDecision::Redirect(Page::Landing))]
#[case(Some("alice"), Page::Landing, GateDecision::Redirect(Page::Dashboard))]
#[case(Some("alice"), Page::Dashboard, GateDecision::Dashboard { user_id: "alice".to_string() })]
#[tokio::test]
async fn test_resolve(
    #[case] user: Option<&str>,
    #[case] page: Page,
    #[case] expected: GateDecision,
) {
    let gate = gate_for(user);
    assert_eq!(gate.resolve(page).await.unwrap(), expected);
}

#[tokio::test]
async fn test_gate_follows_session_changes() {
    let store = SqliteStore::open_in_memory().unwrap();
    let session = Arc::new(store.connect());
    let gate = SessionGate::new(Arc::clone(&session) as Arc<dyn RemoteStore>);

    assert_eq!(gate.resolve(Page::Dashboard).await.unwrap(), GateDecision::Redirect(Page::Landing));
    session.sign_in("alice");
    assert_eq!(
        gate.resolve(Page::Dashboard).await.unwrap(),
        GateDecision::Dashboard { user_id: "alice".to_string() }
    );
    session.sign_out();
    assert_eq!(gate.resolve(Page::Landing).await.unwrap(), GateDecision::Landing);
}

#[test]
fn test_page_serializes_lowercase() {
    assert_eq!(serde_json::to_value(Page::Dashboard).unwrap(), "dashboard");
    let page: Page = serde_json::from_str("\"landing\"").unwrap();
    assert_eq!(page, Page::Landing);
}
