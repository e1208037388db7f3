//! ApiClient against a local stub backend

mod common;

use std::sync::Arc;
use std::time::Duration;

use ccsync_lib::ApiClient;
use ccsync_lib::auth::AuthState;
use ccsync_lib::error::ApiError;
use ccsync_lib::session::SessionCoordinator;
use ccsync_lib::store::MemoryStore;
use common::{FakeProvider, http_client, init_logging, serve, token_for};
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Event {
    id: u32,
    name: String,
}

fn client(base_url: &str, provider: Arc<FakeProvider>) -> ApiClient {
    init_logging();
    let sessions = Arc::new(SessionCoordinator::new(provider, Arc::new(MemoryStore::new())));
    ApiClient::builder()
        .url(base_url)
        .session(sessions)
        .timeout(Duration::from_secs(5))
        .http_client(http_client())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_no_session_means_no_request() {
    // Nothing listens on the discard port; the request must never be attempted.
    let api = client("http://127.0.0.1:9/api", FakeProvider::new(AuthState::SignedOut));

    let err = api.get::<Vec<Event>>("events").await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_get_sends_bearer_token() {
    let (base_url, requests) =
        serve(vec![(200, r#"[{"id":7,"name":"Fall Social"}]"#.to_string())]).await;
    let api = client(&format!("{}/api/", base_url), FakeProvider::signed_in("u-1"));

    let events: Vec<Event> = api.get("/events").await.unwrap();
    assert_eq!(
        events,
        vec![Event {
            id: 7,
            name: "Fall Social".into()
        }]
    );

    let request = requests.await.unwrap().remove(0);
    assert!(request.starts_with("GET /api/events "));
    assert!(
        request
            .to_lowercase()
            .contains(&format!("authorization: bearer {}", token_for("u-1", 1)).to_lowercase())
    );
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let (base_url, requests) =
        serve(vec![(200, r#"{"id":8,"name":"Game Night"}"#.to_string())]).await;
    let api = client(&base_url, FakeProvider::signed_in("u-1"));

    let created: Event = api
        .post(
            "events",
            &Event {
                id: 0,
                name: "Game Night".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(created.id, 8);

    let request = requests.await.unwrap().remove(0);
    assert!(request.starts_with("POST /events "));
    assert!(request.contains(r#""name":"Game Night""#));
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let (base_url, _requests) = serve(vec![(404, r#"{"error":"no such event"}"#.to_string())]).await;
    let api = client(&base_url, FakeProvider::signed_in("u-1"));

    let err = api.get::<Event>("events/99").await.unwrap_err();
    assert_eq!(err.status_code(), Some(404));
    assert!(!err.is_unauthorized());
}

#[tokio::test]
async fn test_unreadable_body_keeps_text() {
    let (base_url, _requests) = serve(vec![(200, "<html>maintenance</html>".to_string())]).await;
    let api = client(&base_url, FakeProvider::signed_in("u-1"));

    match api.get::<Event>("events/1").await.unwrap_err() {
        ApiError::Parse { body, .. } => {
            assert_eq!(body.as_deref(), Some("<html>maintenance</html>"))
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_delete() {
    let (base_url, requests) = serve(vec![(200, String::new())]).await;
    let api = client(&base_url, FakeProvider::signed_in("u-1"));

    api.delete("members/3").await.unwrap();
    assert!(requests.await.unwrap()[0].starts_with("DELETE /members/3 "));
}

#[test]
fn test_build_rejects_bad_url() {
    let sessions = Arc::new(SessionCoordinator::new(
        FakeProvider::new(AuthState::SignedOut),
        Arc::new(MemoryStore::new()),
    ));
    let result = ApiClient::builder().url("not a url").session(sessions).build();
    assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
}
