// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end tests of the wired-up client: API 401s clear the session.

use cookie::Cookie;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thunderdome_client::store::{CookieStore, FileCookieStore, MemoryCookieStore};
use thunderdome_client::Thunderdome;

mod common;
use common::{default_locales, ServerState};

fn cookies_with_session(session: serde_json::Value) -> Arc<MemoryCookieStore> {
    let cookies = Arc::new(MemoryCookieStore::new());
    let value = urlencoding::encode(&session.to_string()).into_owned();
    cookies.write(&Cookie::new("warrior", value)).unwrap();
    cookies
}

#[tokio::test]
async fn test_unauthorized_clears_session_and_navigates() {
    let server = common::start_server().await;
    let cookies = cookies_with_session(common::thor());
    let navigations = Arc::new(AtomicUsize::new(0));

    let nav = navigations.clone();
    let app = Thunderdome::with_navigator(server.config(), cookies.clone(), move || {
        nav.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();

    assert_eq!(app.session.get().unwrap().name, "Thor");

    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _sub = app
        .session
        .subscribe(move |s| sink.lock().unwrap().push(s.is_some()));

    // The server has no session for us
    let err = app.refresh_session().await.unwrap_err();
    assert!(err.is_unauthorized());

    assert!(app.session.get().is_none());
    assert!(!cookies.contains("warrior"));
    assert_eq!(navigations.load(Ordering::SeqCst), 1);
    assert_eq!(*seen.lock().unwrap(), vec![true, false]);
}

#[tokio::test]
async fn test_login_then_refresh_session() {
    let server = common::start_server().await;
    let cookies = Arc::new(MemoryCookieStore::new());
    let app = Thunderdome::new(server.config(), cookies.clone()).unwrap();

    assert!(!app.session.is_authenticated());

    app.api
        .post_json("/api/auth", &json!({ "email": "thor@asgard.example", "password": "mjolnir" }))
        .await
        .unwrap();

    let user = app.refresh_session().await.unwrap().unwrap();
    assert_eq!(user.name, "Thor");
    assert_eq!(app.session.get(), Some(user));
    assert!(cookies.contains("warrior"));
    assert_eq!(server.state.auth_user_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_session_locale_drives_translations() {
    let server = common::start_server_with(ServerState {
        locales: default_locales(),
        ..Default::default()
    })
    .await;

    // thor() prefers "fr"
    let app = Thunderdome::new(server.config(), cookies_with_session(common::thor())).unwrap();
    assert_eq!(app.preferred_locale(), "fr");

    app.setup_session_locale().await.unwrap();
    assert!(app.i18n.is_ready());
    assert_eq!(app.i18n.translate("greeting"), "Bonjour");
}

#[tokio::test]
async fn test_unsupported_or_missing_locale_uses_default() {
    let server = common::start_server_with(ServerState {
        locales: default_locales(),
        ..Default::default()
    })
    .await;

    let mut klingon = common::thor();
    klingon["locale"] = json!("tlh");
    let app = Thunderdome::new(server.config(), cookies_with_session(klingon)).unwrap();
    assert_eq!(app.preferred_locale(), "en");

    let anonymous = Thunderdome::new(server.config(), Arc::new(MemoryCookieStore::new())).unwrap();
    assert_eq!(anonymous.preferred_locale(), "en");
    anonymous.setup_session_locale().await.unwrap();
    assert_eq!(anonymous.i18n.translate("greeting"), "Hello");
}

#[tokio::test]
async fn test_login_survives_restart() {
    let server = common::start_server().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cookies.json");

    {
        let app =
            Thunderdome::new(server.config(), Arc::new(FileCookieStore::new(&path))).unwrap();
        app.api
            .post_json("/api/auth", &json!({ "email": "thor@asgard.example", "password": "mjolnir" }))
            .await
            .unwrap();
        app.refresh_session().await.unwrap().unwrap();
    }

    // Both the session and the server's login cookie were written to disk
    let stored = FileCookieStore::new(&path);
    assert_eq!(
        stored.read("sessionId").unwrap().unwrap().value(),
        common::SESSION_ID
    );

    let restarted = Thunderdome::new(server.config(), Arc::new(stored)).unwrap();
    assert!(restarted.session.is_authenticated());

    let user = restarted.refresh_session().await.unwrap().unwrap();
    assert_eq!(user.name, "Thor");
    assert!(restarted.session.is_authenticated());
    assert_eq!(server.state.auth_user_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_path_prefix_applies_to_session_refresh() {
    let server = common::start_server().await;
    let mut config = server.config();
    config.path_prefix = "/poker".to_string();
    let app = Thunderdome::new(config, Arc::new(MemoryCookieStore::new())).unwrap();

    app.api
        .post_json("/api/auth", &json!({ "email": "thor@asgard.example", "password": "mjolnir" }))
        .await
        .unwrap();
    let user = app.refresh_session().await.unwrap().unwrap();

    assert_eq!(user.name, "Thor");
    assert_eq!(server.state.auth_user_hits.load(Ordering::SeqCst), 1);
}
