// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistent cookie storage.
//!
//! Cookies are kept in their `Set-Cookie` form so attributes like
//! `Expires` and `SameSite` survive a restart. Expired cookies read as absent.

use cookie::Cookie;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use time::OffsetDateTime;

/// Durable home for cookies written by the client.
pub trait CookieStore: Send + Sync {
    /// Read a cookie by name. Expired cookies are reported as `None`.
    fn read(&self, name: &str) -> Result<Option<Cookie<'static>>, CookieStoreError>;

    /// Write (or replace) a cookie.
    fn write(&self, cookie: &Cookie<'_>) -> Result<(), CookieStoreError>;

    /// Remove a cookie. Removing a missing cookie is not an error.
    fn remove(&self, name: &str) -> Result<(), CookieStoreError>;

    /// Every unexpired cookie, in name order.
    fn list(&self) -> Result<Vec<Cookie<'static>>, CookieStoreError>;
}

/// Cookie storage errors
#[derive(Debug, thiserror::Error)]
pub enum CookieStoreError {
    #[error("Cookie file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cookie file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stored cookie {name} could not be parsed: {reason}")]
    Parse { name: String, reason: String },

    /// For [`CookieStore`] implementations outside this crate that refuse
    /// writes, e.g. when the user has disabled cookies. The bundled stores
    /// never return it; callers treat it like any other write failure.
    #[error("Cookie write rejected: {0}")]
    Rejected(String),
}

/// Whether the cookie has expired at `now`.
pub fn is_expired(cookie: &Cookie<'_>, now: OffsetDateTime) -> bool {
    if cookie
        .max_age()
        .is_some_and(|max_age| max_age <= time::Duration::ZERO)
    {
        return true;
    }

    cookie
        .expires_datetime()
        .is_some_and(|expires| expires <= now)
}

// ─────────────────────────────────────────────────────────────────────────────
// FileCookieStore
// ─────────────────────────────────────────────────────────────────────────────

/// Cookie store backed by a JSON file of `name -> Set-Cookie string`.
pub struct FileCookieStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles on the file.
    lock: Mutex<()>,
}

impl FileCookieStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, CookieStoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, cookies: &BTreeMap<String, String>) -> Result<(), CookieStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(cookies)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl CookieStore for FileCookieStore {
    fn read(&self, name: &str) -> Result<Option<Cookie<'static>>, CookieStoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(raw) = self.load()?.remove(name) else {
            return Ok(None);
        };

        let cookie = Cookie::parse(raw).map_err(|e| CookieStoreError::Parse {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        if is_expired(&cookie, OffsetDateTime::now_utc()) {
            tracing::debug!(cookie = name, "Stored cookie has expired");
            return Ok(None);
        }

        Ok(Some(cookie))
    }

    fn write(&self, cookie: &Cookie<'_>) -> Result<(), CookieStoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut cookies = self.load()?;
        cookies.insert(cookie.name().to_string(), cookie.to_string());
        self.save(&cookies)?;

        tracing::debug!(cookie = cookie.name(), path = %self.path.display(), "Cookie written");
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), CookieStoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut cookies = self.load()?;
        if cookies.remove(name).is_some() {
            self.save(&cookies)?;
            tracing::debug!(cookie = name, "Cookie removed");
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<Cookie<'static>>, CookieStoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let now = OffsetDateTime::now_utc();

        let mut live = Vec::new();
        for (name, raw) in self.load()? {
            match Cookie::parse(raw) {
                Ok(cookie) if !is_expired(&cookie, now) => live.push(cookie),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(cookie = %name, error = %e, "Skipping unparseable stored cookie")
                }
            }
        }
        Ok(live)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MemoryCookieStore
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory cookie store for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryCookieStore {
    cookies: DashMap<String, Cookie<'static>>,
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a raw `Set-Cookie` string.
    pub fn with_raw(self, raw: &str) -> Result<Self, CookieStoreError> {
        let cookie = Cookie::parse(raw.to_string()).map_err(|e| CookieStoreError::Parse {
            name: raw.split('=').next().unwrap_or_default().to_string(),
            reason: e.to_string(),
        })?;
        self.cookies.insert(cookie.name().to_string(), cookie);
        Ok(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }
}

impl CookieStore for MemoryCookieStore {
    fn read(&self, name: &str) -> Result<Option<Cookie<'static>>, CookieStoreError> {
        Ok(self
            .cookies
            .get(name)
            .map(|c| c.value().clone())
            .filter(|c| !is_expired(c, OffsetDateTime::now_utc())))
    }

    fn write(&self, cookie: &Cookie<'_>) -> Result<(), CookieStoreError> {
        let owned = cookie.clone().into_owned();
        self.cookies.insert(owned.name().to_string(), owned);
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), CookieStoreError> {
        self.cookies.remove(name);
        Ok(())
    }

    fn list(&self) -> Result<Vec<Cookie<'static>>, CookieStoreError> {
        let now = OffsetDateTime::now_utc();
        let mut live: Vec<Cookie<'static>> = self
            .cookies
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|c| !is_expired(c, now))
            .collect();
        live.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(live)
    }
}
