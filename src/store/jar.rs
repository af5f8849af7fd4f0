// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP cookie jar backed by a [`CookieStore`].
//!
//! Server-set credentials (the login cookie) land in the same durable store
//! as the session cookie, so a restarted client still authenticates.
//! Cookies are host-only: they are accepted from and sent to the client's
//! own host.

use crate::store::cookie::{is_expired, CookieStore};
use cookie::Cookie;
use reqwest::header::HeaderValue;
use reqwest::Url;
use std::sync::Arc;
use time::OffsetDateTime;

/// `reqwest` cookie provider that reads and writes through a [`CookieStore`].
pub struct PersistentJar {
    store: Arc<dyn CookieStore>,
    host: String,
}

impl PersistentJar {
    /// Jar for cookies of `base_url`'s host.
    pub fn new(store: Arc<dyn CookieStore>, base_url: &Url) -> Self {
        Self {
            store,
            host: base_url.host_str().unwrap_or_default().to_ascii_lowercase(),
        }
    }

    fn is_own_host(&self, url: &Url) -> bool {
        url.host_str()
            .is_some_and(|host| host.eq_ignore_ascii_case(&self.host))
    }
}

impl reqwest::cookie::CookieStore for PersistentJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        if !self.is_own_host(url) {
            tracing::debug!(url = %url, "Ignoring cookies from foreign host");
            return;
        }

        let now = OffsetDateTime::now_utc();
        for header in cookie_headers {
            let Ok(raw) = header.to_str() else {
                continue;
            };
            let cookie = match Cookie::parse(raw.to_string()) {
                Ok(cookie) => cookie,
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring malformed Set-Cookie header");
                    continue;
                }
            };

            let result = if is_expired(&cookie, now) {
                self.store.remove(cookie.name())
            } else {
                self.store.write(&cookie)
            };
            if let Err(e) = result {
                tracing::warn!(cookie = cookie.name(), error = %e, "Failed to store server cookie");
            }
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        if !self.is_own_host(url) {
            return None;
        }

        let stored = match self.store.list() {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read cookies, sending none");
                return None;
            }
        };

        let secure = url.scheme() == "https";
        let pairs: Vec<String> = stored
            .iter()
            .filter(|c| secure || !c.secure().unwrap_or(false))
            .filter(|c| path_matches(c.path().unwrap_or("/"), url.path()))
            .map(|c| format!("{}={}", c.name(), c.value()))
            .collect();

        if pairs.is_empty() {
            return None;
        }
        HeaderValue::from_str(&pairs.join("; ")).ok()
    }
}

/// RFC 6265 path-match.
fn path_matches(cookie_path: &str, request_path: &str) -> bool {
    if cookie_path == request_path {
        return true;
    }
    request_path.starts_with(cookie_path)
        && (cookie_path.ends_with('/')
            || request_path[cookie_path.len()..].starts_with('/'))
}
