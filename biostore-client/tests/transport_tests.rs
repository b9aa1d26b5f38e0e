//! Session transport tests against a local stand-in for the store

use axum::extract::State;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use biostore_client::transport::parameters;
use biostore_client::{BiostoreConnector, ConnectionProvider, HttpConnector, ResponseStatus};
use biostore_core::{BiostoreError, ConnectionConfig, ProtocolVersion, Token};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use url::form_urlencoded;

const ENDPOINT_PATH: &str = "/biostore/permission";

#[derive(Debug, Clone)]
struct SeenRequest {
    cookie: Option<String>,
    content_type: Option<String>,
    form: BTreeMap<String, String>,
}

#[derive(Clone, Default)]
struct StoreState {
    requests: Arc<Mutex<Vec<SeenRequest>>>,
}

impl StoreState {
    fn requests(&self) -> Vec<SeenRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn permission_endpoint(
    State(state): State<StoreState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let form: BTreeMap<String, String> = form_urlencoded::parse(body.as_bytes())
        .into_owned()
        .collect();
    let header = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    state.requests.lock().unwrap().push(SeenRequest {
        cookie: header(COOKIE),
        content_type: header(CONTENT_TYPE),
        form: form.clone(),
    });

    match form.get("action").map(String::as_str).unwrap_or_default() {
        "login" => (
            AppendHeaders([
                (SET_COOKIE, "JSESSIONID=s1; Path=/biostore; HttpOnly"),
                (SET_COOKIE, "route=n1"),
            ]),
            Json(json!({"type": "ok", "jwtoken": "t1"})),
        )
            .into_response(),
        "getProjectList" => Json(json!({
            "type": "ok",
            "projectList": [
                {"path": "data/Collaboration/Demo", "permissions": 3},
                {"path": "data/Projects/", "permissions": 3}
            ]
        }))
        .into_response(),
        "html" => "<html><body>Service unavailable</body></html>".into_response(),
        "array" => Json(json!([{"type": "ok"}])).into_response(),
        "untyped" => r#"{"zeta": 1, "alpha": 2}"#.into_response(),
        "crash" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"type": "error", "message": "Internal failure"})),
        )
            .into_response(),
        _ => Json(json!({"type": "error", "message": "Unknown action"})).into_response(),
    }
}

/// Serve the stand-in store on an ephemeral port
async fn spawn_store() -> (String, StoreState) {
    let state = StoreState::default();
    let app = Router::new()
        .route(ENDPOINT_PATH, post(permission_endpoint))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}{}", address, ENDPOINT_PATH), state)
}

fn config(endpoint: &str) -> ConnectionConfig {
    ConnectionConfig::default()
        .with_endpoint(endpoint)
        .with_timeout(10)
        .with_protocol(ProtocolVersion::V2)
}

#[tokio::test]
async fn session_cookie_is_captured_and_replayed_per_user() {
    let (endpoint, store) = spawn_store().await;
    let connector = HttpConnector::new(&config(&endpoint)).unwrap();
    let params = parameters([("username", "alice"), ("password", "secret")]);

    let envelope = connector
        .exchange(Some("alice"), "login", &params)
        .await
        .unwrap();
    assert_eq!(envelope.status(), &ResponseStatus::Ok);
    assert_eq!(
        connector.cookie_store().get("alice").await.as_deref(),
        Some("JSESSIONID=s1; route=n1")
    );

    connector
        .exchange(Some("alice"), "getProjectList", &parameters([("jwtoken", "t1")]))
        .await
        .unwrap();
    connector
        .exchange(Some("bob"), "getProjectList", &parameters([("jwtoken", "t2")]))
        .await
        .unwrap();

    let requests = store.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].cookie, None);
    assert_eq!(requests[1].cookie.as_deref(), Some("JSESSIONID=s1; route=n1"));
    assert_eq!(requests[2].cookie, None);
}

#[tokio::test]
async fn anonymous_exchanges_neither_send_nor_store_cookies() {
    let (endpoint, store) = spawn_store().await;
    let connector = HttpConnector::new(&config(&endpoint)).unwrap();
    let params = parameters([("username", ""), ("password", "")]);

    connector.exchange(None, "login", &params).await.unwrap();
    connector.exchange(Some(""), "login", &params).await.unwrap();
    connector.exchange(Some(""), "login", &params).await.unwrap();

    assert!(connector.cookie_store().is_empty().await);
    assert!(store.requests().iter().all(|request| request.cookie.is_none()));
}

#[tokio::test]
async fn request_is_form_encoded_with_server_name() {
    let (endpoint, store) = spawn_store().await;
    let connector =
        HttpConnector::new(&config(&endpoint).with_server_name("biblio.biouml.org")).unwrap();

    connector
        .exchange(
            Some("alice"),
            "createProject",
            &parameters([("projectName", "Démo & co"), ("permission", "3")]),
        )
        .await
        .unwrap();

    let request = store.requests().pop().unwrap();
    assert_eq!(
        request.content_type.as_deref(),
        Some("application/x-www-form-urlencoded; charset=UTF-8")
    );
    assert_eq!(request.form.get("action").map(String::as_str), Some("createProject"));
    assert_eq!(
        request.form.get("serverName").map(String::as_str),
        Some("biblio.biouml.org")
    );
    assert_eq!(
        request.form.get("projectName").map(String::as_str),
        Some("Démo & co")
    );
}

#[tokio::test]
async fn non_object_bodies_are_transport_failures() {
    let (endpoint, _store) = spawn_store().await;
    let connector = HttpConnector::new(&config(&endpoint)).unwrap();
    let params = parameters([]);

    for action in ["html", "array"] {
        let err = connector
            .exchange(Some("alice"), action, &params)
            .await
            .unwrap_err();
        assert!(
            matches!(err, BiostoreError::Transport { .. }),
            "{} should fail in transport, got {:?}",
            action,
            err
        );
    }
}

#[tokio::test]
async fn unreachable_store_is_a_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let connector =
        HttpConnector::new(&config(&format!("http://{}{}", address, ENDPOINT_PATH))).unwrap();
    let err = connector
        .exchange(Some("alice"), "login", &parameters([]))
        .await
        .unwrap_err();

    assert!(err.is_recoverable());
    assert!(err.to_string().starts_with("Error during connection to server"));
}

#[tokio::test]
async fn invalid_endpoint_is_rejected_before_any_request() {
    let result = HttpConnector::new(&ConnectionConfig::default().with_endpoint("ftp://example.org"));
    assert!(matches!(result, Err(BiostoreError::Config { .. })));
}

#[tokio::test]
async fn provider_round_trip_over_http() {
    let (endpoint, store) = spawn_store().await;
    let provider = ConnectionProvider::new(&config(&endpoint)).unwrap();

    let token = provider.issue_token("alice", "secret").await.unwrap();
    assert_eq!(token, Token::new("alice", "t1"));

    let projects = provider.project_list(&token).await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name(), "Demo");
    assert_eq!(projects[0].permission().render(), "Info/Read");

    let requests = store.requests();
    assert_eq!(requests[1].form.get("jwtoken").map(String::as_str), Some("t1"));
    assert_eq!(requests[1].cookie.as_deref(), Some("JSESSIONID=s1; route=n1"));
}

#[tokio::test]
async fn store_error_body_wins_over_http_status() {
    let (endpoint, _store) = spawn_store().await;
    let connector = HttpConnector::new(&config(&endpoint)).unwrap();

    let envelope = connector
        .exchange(Some("alice"), "crash", &parameters([]))
        .await
        .unwrap();
    assert_eq!(envelope.failure_message().as_deref(), Some("Internal failure"));
}

#[tokio::test]
async fn provider_from_loaded_configuration() {
    let (endpoint, _store) = spawn_store().await;
    let mut loaded = biostore_core::BiostoreConfig::default();
    loaded.connection = config(&endpoint);

    let provider = ConnectionProvider::from_config(&loaded).unwrap();
    assert_eq!(provider.protocol(), ProtocolVersion::V2);

    let err = provider
        .add_user_to_project(&Token::new("alice", "t1"), "bob", "Demo")
        .await
        .unwrap_err();
    assert!(err.is_security_failure());
    assert_eq!(err.message(), "Unknown action");
}

#[tokio::test]
async fn untyped_response_is_reported_verbatim() {
    let (endpoint, _store) = spawn_store().await;
    let connector = HttpConnector::new(&config(&endpoint)).unwrap();

    let envelope = connector
        .exchange(Some("alice"), "untyped", &parameters([]))
        .await
        .unwrap();

    assert_eq!(envelope.status(), &ResponseStatus::Missing);
    assert_eq!(
        envelope.failure_message().as_deref(),
        Some(r#"{"zeta": 1, "alpha": 2}"#)
    );
}
