// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Thunderdome client core.
//!
//! This crate provides the client-side session, API and locale plumbing
//! for a Thunderdome planning poker client: a cookie-backed session store,
//! a single API chokepoint that reacts to expired sessions, and a lazy
//! translation bundle loader.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

use config::Config;
use error::ApiError;
use models::{ApiEnvelope, Session};
use reqwest::Url;
use services::{ApiClient, LocaleError, LocaleLoader, RequestOptions};
use std::sync::Arc;
use store::{CookieStore, PersistentJar, SessionStore};

/// Endpoint returning the signed-in user.
pub const CURRENT_USER_ENDPOINT: &str = "/api/auth/user";

/// Shared client state.
pub struct Thunderdome {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
    pub i18n: LocaleLoader,
}

impl Thunderdome {
    /// Build the client; a 401 from any call clears the session.
    ///
    /// `cookies` holds both the session cookie and the cookies the server
    /// sets, so a durable store keeps the client signed in across restarts.
    pub fn new(config: Config, cookies: Arc<dyn CookieStore>) -> Result<Self, ApiError> {
        Self::with_navigator(config, cookies, || {})
    }

    /// Like [`Thunderdome::new`], also calling `navigator` after the session
    /// is cleared (e.g. to show a login page).
    pub fn with_navigator<N>(
        config: Config,
        cookies: Arc<dyn CookieStore>,
        navigator: N,
    ) -> Result<Self, ApiError>
    where
        N: Fn() + Send + Sync + 'static,
    {
        let base_url = Url::parse(&config.base_url).map_err(|e| ApiError::InvalidEndpoint {
            endpoint: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        let jar = Arc::new(PersistentJar::new(cookies.clone(), &base_url));

        let session = Arc::new(SessionStore::new(cookies));
        session.initialize();

        let on_unauthorized = {
            let session = session.clone();
            move || {
                session.delete();
                navigator();
            }
        };

        let api = ApiClient::with_cookie_provider(&config.base_url, jar, on_unauthorized)?
            .with_path_prefix(&config.path_prefix);
        let i18n = LocaleLoader::new(&config, api.clone());

        Ok(Self {
            config,
            session,
            api,
            i18n,
        })
    }

    /// The locale to show: the session's preference if supported, else the
    /// configured default.
    pub fn preferred_locale(&self) -> String {
        match self.session.get().and_then(|s| s.locale) {
            Some(locale) => self.i18n.resolve_locale(&locale),
            None => self.config.default_locale.clone(),
        }
    }

    /// Load translations for [`Thunderdome::preferred_locale`].
    pub async fn setup_session_locale(&self) -> Result<(), LocaleError> {
        let locale = self.preferred_locale();
        self.i18n.setup_locale(&locale).await
    }

    /// Ask the server who we are and store the answer as the session.
    ///
    /// A 401 clears the session through the unauthorized handler and is
    /// returned as an error.
    pub async fn refresh_session(&self) -> Result<Option<Session>, ApiError> {
        let envelope: ApiEnvelope<Session> = self
            .api
            .json(CURRENT_USER_ENDPOINT, RequestOptions::new())
            .await?;

        let session = envelope.into_data();
        if let Some(session) = &session {
            self.session.create(session.clone());
        }
        Ok(session)
    }
}
