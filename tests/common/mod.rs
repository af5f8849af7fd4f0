// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fake Thunderdome backend for integration tests.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thunderdome_client::config::Config;

/// Session id the fake server hands out on login.
#[allow(dead_code)]
pub const SESSION_ID: &str = "abc123";

/// Shared state of the fake backend.
#[derive(Default)]
pub struct ServerState {
    /// locale -> locale file contents
    pub locales: HashMap<String, Value>,
    /// Delay before answering locale requests
    pub lang_delay: Duration,
    /// locale file requests received, per file name
    pub lang_requests: dashmap::DashMap<String, usize>,
    pub auth_user_hits: AtomicUsize,
}

impl ServerState {
    #[allow(dead_code)]
    pub fn lang_hits(&self, file: &str) -> usize {
        self.lang_requests.get(file).map(|h| *h).unwrap_or(0)
    }
}

/// A running fake backend.
pub struct TestServer {
    pub base_url: String,
    pub state: Arc<ServerState>,
}

impl TestServer {
    #[allow(dead_code)]
    pub fn config(&self) -> Config {
        let mut config = Config::test_default();
        config.base_url = self.base_url.clone();
        config.supported_locales = vec!["en".into(), "fr".into(), "de".into()];
        config
    }
}

#[allow(dead_code)]
pub async fn start_server() -> TestServer {
    start_server_with(ServerState::default()).await
}

/// Start the fake backend on an ephemeral port.
pub async fn start_server_with(state: ServerState) -> TestServer {
    let state = Arc::new(state);

    let app = Router::new()
        .route("/api/auth", post(login))
        .route("/api/auth/user", get(auth_user))
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
        .route("/lang/{file}", get(lang))
        .route("/poker/lang/{file}", get(prefixed_lang))
        .route("/poker/api/auth", post(login))
        .route("/poker/api/auth/user", get(auth_user))
        .route("/poker/echo", any(echo))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });

    TestServer {
        base_url: format!("http://{}", addr),
        state,
    }
}

/// Locale files used by most tests.
#[allow(dead_code)]
pub fn default_locales() -> HashMap<String, Value> {
    HashMap::from([
        (
            "en".to_string(),
            json!({
                "default": {
                    "greeting": "Hello",
                    "createBattle": "Create Battle",
                    "welcomeBack": "Welcome back, {name}!",
                    "onlyInEnglish": "Fallback text"
                },
                "friendly": {
                    "greeting": "Hello",
                    "createBattle": "Create Game"
                }
            }),
        ),
        (
            "fr".to_string(),
            json!({ "default": { "greeting": "Bonjour" } }),
        ),
        (
            "de".to_string(),
            json!({ "default": { "greeting": "Hallo" } }),
        ),
        ("empty".to_string(), json!({ "default": {} })),
    ])
}

/// A session record as the server would issue it.
#[allow(dead_code)]
pub fn thor() -> Value {
    json!({
        "id": "u1",
        "name": "Thor",
        "email": "thor@asgard.example",
        "rank": "REGISTERED",
        "locale": "fr",
        "notificationsEnabled": true
    })
}

async fn login(jar: CookieJar) -> (CookieJar, Json<Value>) {
    let cookie = Cookie::build(("sessionId", SESSION_ID))
        .path("/")
        .http_only(true);
    (
        jar.add(cookie),
        Json(json!({ "success": true, "error": "", "data": thor(), "meta": {} })),
    )
}

async fn auth_user(State(state): State<Arc<ServerState>>, jar: CookieJar) -> Response {
    state.auth_user_hits.fetch_add(1, Ordering::SeqCst);

    match jar.get("sessionId") {
        Some(c) if c.value() == SESSION_ID => {
            Json(json!({ "success": true, "error": "", "data": thor(), "meta": {} }))
                .into_response()
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "error": "REQUIRES_AUTH", "data": null })),
        )
            .into_response(),
    }
}

/// Reflect the request back as JSON.
async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    Json(json!({
        "method": method.as_str(),
        "contentType": header("content-type"),
        "requestId": header("x-request-id"),
        "cookie": header("cookie"),
        "body": body,
    }))
}

async fn status(Path(code): Path<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(json!({ "success": false, "error": "STATUS" }))).into_response()
}

async fn lang(State(state): State<Arc<ServerState>>, Path(file): Path<String>) -> Response {
    serve_locale(&state, file.clone(), &file).await
}

/// Same files, served under the `/poker` path prefix.
async fn prefixed_lang(
    State(state): State<Arc<ServerState>>,
    Path(file): Path<String>,
) -> Response {
    serve_locale(&state, format!("poker/{}", file), &file).await
}

async fn serve_locale(state: &ServerState, hit_key: String, file: &str) -> Response {
    *state.lang_requests.entry(hit_key).or_insert(0) += 1;

    if !state.lang_delay.is_zero() {
        tokio::time::sleep(state.lang_delay).await;
    }

    let Some(locale) = file.strip_suffix(".json") else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if locale == "broken" {
        return "{ not json".into_response();
    }

    match state.locales.get(locale) {
        Some(contents) => Json(contents.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
