// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Locale loader: lazily fetches and caches translation bundles.
//!
//! Each locale moves `Uninitialized → Loading → Ready` (or `Failed`).
//! A fetched bundle is cached for the lifetime of the loader and never
//! re-fetched. Every `setup_locale` call, cached or not, runs under one
//! lock so overlapping calls cannot race on the active locale.

use crate::config::Config;
use crate::error::ApiError;
use crate::models::locale::{interpolate, Bundle, Variant};
use crate::services::api::{ApiClient, RequestOptions};
use dashmap::DashMap;
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{watch, Mutex};

/// Where the loader is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleState {
    Uninitialized,
    Loading(String),
    Ready(String),
    /// The last fetch failed; the locale was not cached.
    Failed(String),
}

/// Snapshot published to subscribers on every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleStatus {
    pub state: LocaleState,
    /// True only while a bundle fetch is outstanding
    pub downloading: bool,
    /// Safe to render localized text
    pub ready: bool,
}

/// Locale loading errors
#[derive(Debug, thiserror::Error)]
pub enum LocaleError {
    #[error("Invalid locale identifier: {0:?}")]
    InvalidLocale(String),

    #[error("Failed to fetch locale bundle: {0}")]
    Fetch(#[from] ApiError),

    #[error("Locale bundle for {locale} is not valid JSON: {reason}")]
    Parse { locale: String, reason: String },

    #[error("Locale bundle for {locale} has no {variant} messages")]
    EmptyBundle { locale: String, variant: &'static str },
}

/// Lazily loading translation catalog.
pub struct LocaleLoader {
    api: ApiClient,
    variant: Variant,
    fallback_locale: String,
    supported_locales: Vec<String>,
    bundles: DashMap<String, Arc<Bundle>>,
    active: RwLock<Option<String>>,
    status: watch::Sender<LocaleStatus>,
    /// Serializes bundle fetches.
    fetch_lock: Mutex<()>,
}

impl LocaleLoader {
    pub fn new(config: &Config, api: ApiClient) -> Self {
        let (status, _) = watch::channel(LocaleStatus {
            state: LocaleState::Uninitialized,
            downloading: false,
            ready: false,
        });

        Self {
            api,
            variant: Variant::from_friendly_flag(config.friendly_ui_verbs),
            fallback_locale: config.default_locale.clone(),
            supported_locales: config.supported_locales.clone(),
            bundles: DashMap::new(),
            active: RwLock::new(None),
            status,
            fetch_lock: Mutex::new(()),
        }
    }

    /// Make `locale` the active locale, fetching its bundle if not cached.
    ///
    /// Calls are applied in the order they take the fetch lock, so switching
    /// to a cached locale waits for an outstanding fetch and then wins.
    pub async fn setup_locale(&self, locale: &str) -> Result<(), LocaleError> {
        if !is_valid_locale(locale) {
            return Err(LocaleError::InvalidLocale(locale.to_string()));
        }

        let _guard = self.fetch_lock.lock().await;

        // Cached, possibly by a call we waited behind.
        if self.bundles.contains_key(locale) {
            self.activate(locale);
            return Ok(());
        }

        self.publish(LocaleState::Loading(locale.to_string()), true);

        match self.fetch_bundle(locale).await {
            Ok(bundle) => {
                tracing::info!(
                    locale,
                    variant = self.variant.as_str(),
                    messages = bundle.len(),
                    "Locale bundle loaded"
                );
                self.bundles.insert(locale.to_string(), Arc::new(bundle));
                self.activate(locale);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(locale, error = %e, "Failed to load locale bundle");
                self.publish(LocaleState::Failed(locale.to_string()), false);
                Err(e)
            }
        }
    }

    async fn fetch_bundle(&self, locale: &str) -> Result<Bundle, LocaleError> {
        let url = format!("/lang/{}.json", locale);
        tracing::debug!(url = %url, "Fetching locale bundle");

        let file: Value = self
            .api
            .request(&url, RequestOptions::new())
            .await?
            .json()
            .await
            .map_err(|e| LocaleError::Parse {
                locale: locale.to_string(),
                reason: e.to_string(),
            })?;

        Bundle::from_locale_file(&file, self.variant)
            .filter(|bundle| !bundle.is_empty())
            .ok_or_else(|| LocaleError::EmptyBundle {
                locale: locale.to_string(),
                variant: self.variant.as_str(),
            })
    }

    fn activate(&self, locale: &str) {
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Some(locale.to_string());
        self.publish(LocaleState::Ready(locale.to_string()), false);
    }

    fn publish(&self, state: LocaleState, downloading: bool) {
        let ready = !downloading
            && matches!(&state, LocaleState::Ready(locale)
                if self.bundles.get(locale).is_some_and(|b| !b.is_empty()));

        self.status.send_replace(LocaleStatus {
            state,
            downloading,
            ready,
        });
    }

    /// Whether localized text can be rendered without flashing raw keys.
    ///
    /// True only in the `Ready` state. After a failed switch this is false
    /// even though [`LocaleLoader::translate`] keeps answering from the
    /// previously active bundle.
    pub fn is_ready(&self) -> bool {
        self.status.borrow().ready
    }

    pub fn is_downloading(&self) -> bool {
        self.status.borrow().downloading
    }

    pub fn status(&self) -> LocaleStatus {
        self.status.borrow().clone()
    }

    /// Watch status transitions.
    pub fn subscribe(&self) -> watch::Receiver<LocaleStatus> {
        self.status.subscribe()
    }

    pub fn active_locale(&self) -> Option<String> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn is_cached(&self, locale: &str) -> bool {
        self.bundles.contains_key(locale)
    }

    /// Look up `key` in the active locale, then the fallback locale.
    pub fn lookup(&self, key: &str) -> Option<String> {
        let active = self.active_locale();
        let found = [active.as_deref(), Some(self.fallback_locale.as_str())]
            .into_iter()
            .flatten()
            .find_map(|locale| {
                self.bundles
                    .get(locale)
                    .and_then(|bundle| bundle.get(key).map(str::to_string))
            });
        found
    }

    /// Translate `key`, returning the key itself when no bundle has it.
    pub fn translate(&self, key: &str) -> String {
        self.lookup(key).unwrap_or_else(|| key.to_string())
    }

    /// Translate `key` and fill `{name}` placeholders.
    pub fn translate_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        interpolate(&self.translate(key), args)
    }

    /// Map a requested language tag onto a supported locale.
    ///
    /// Exact (case-insensitive) matches win, then the primary subtag
    /// (`fr-CA` → `fr`), then the configured default.
    pub fn resolve_locale(&self, requested: &str) -> String {
        let requested = requested.trim();
        let primary = requested
            .split(['-', '_'])
            .next()
            .unwrap_or(requested);

        self.supported_locales
            .iter()
            .find(|l| l.eq_ignore_ascii_case(requested))
            .or_else(|| {
                self.supported_locales
                    .iter()
                    .find(|l| l.eq_ignore_ascii_case(primary))
            })
            .cloned()
            .unwrap_or_else(|| self.fallback_locale.clone())
    }
}

fn is_valid_locale(locale: &str) -> bool {
    !locale.is_empty()
        && locale.len() <= 35
        && locale
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
