// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session store: the single source of truth for "who is the current user".
//!
//! The store hydrates from the `warrior` cookie exactly once, then keeps the
//! session in memory. Every change is mirrored back into the cookie and
//! pushed to subscribed observers, synchronously and in registration order.

use crate::models::Session;
use crate::store::cookie::CookieStore;
use crate::store::cookies;
use cookie::{Cookie, SameSite};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock, RwLockWriteGuard, Weak};
use time::OffsetDateTime;
use validator::Validate;

/// Session cookie lifetime.
const SESSION_COOKIE_DAYS: i64 = 365;

type Observer = Arc<dyn Fn(Option<&Session>) + Send + Sync>;

#[derive(Default)]
struct Observers {
    next_id: u64,
    entries: Vec<(u64, Observer)>,
}

/// Process-wide session state, constructed explicitly so tests can build
/// fresh instances.
pub struct SessionStore {
    cookies: Arc<dyn CookieStore>,
    /// Initialized from the cookie on first access.
    current: OnceLock<RwLock<Option<Session>>>,
    observers: Arc<Mutex<Observers>>,
}

impl SessionStore {
    pub fn new(cookies: Arc<dyn CookieStore>) -> Self {
        Self {
            cookies,
            current: OnceLock::new(),
            observers: Arc::new(Mutex::new(Observers::default())),
        }
    }

    /// Hydrate from the persisted cookie. Runs at most once; later calls
    /// (and every other operation) reuse the hydrated state.
    pub fn initialize(&self) {
        self.state();
    }

    /// Snapshot of the current session.
    pub fn get(&self) -> Option<Session> {
        self.state()
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state()
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Register an observer.
    ///
    /// The observer is called immediately with the current session and then
    /// after every change. Observers run after the store's lock is released,
    /// so they may read or modify the store.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(Option<&Session>) + Send + Sync + 'static,
    {
        let observer: Observer = Arc::new(observer);
        let current = self.get();

        let id = {
            let mut observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
            let id = observers.next_id;
            observers.next_id += 1;
            observers.entries.push((id, observer.clone()));
            id
        };

        observer(current.as_ref());

        Subscription {
            id,
            observers: Arc::downgrade(&self.observers),
        }
    }

    /// Replace the current session and persist it to the cookie.
    ///
    /// A rejected cookie write is logged and otherwise ignored; the session
    /// then lives in memory only.
    pub fn create(&self, session: Session) {
        tracing::info!(user_id = %session.id, rank = ?session.rank, "Session created");
        {
            let mut current = self.write_state();
            self.persist(&session);
            *current = Some(session.clone());
        }
        self.notify(Some(&session));
    }

    /// Replace the session with `f(current)`. No-op without a session.
    ///
    /// `f` runs without the lock held. If the session changed meanwhile
    /// (for example a 401 deleted it), the update is dropped.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(Session) -> Session,
    {
        let Some(before) = self.get() else {
            return;
        };
        let next = f(before.clone());

        {
            let mut current = self.write_state();
            if current.as_ref() != Some(&before) {
                tracing::debug!("Session changed during update, dropping update");
                return;
            }
            self.persist(&next);
            *current = Some(next.clone());
        }
        self.notify(Some(&next));
    }

    /// Clear the cookie and reset to anonymous. Observers are notified even
    /// when there was no session.
    pub fn delete(&self) {
        {
            let mut current = self.write_state();
            if let Err(e) = self.cookies.remove(cookies::SESSION) {
                tracing::warn!(error = %e, "Failed to remove session cookie");
            }
            *current = None;
        }
        tracing::info!("Session deleted");
        self.notify(None);
    }

    fn state(&self) -> &RwLock<Option<Session>> {
        self.current.get_or_init(|| RwLock::new(self.hydrate()))
    }

    /// Cookie and memory change together under this guard.
    fn write_state(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.state().write().unwrap_or_else(PoisonError::into_inner)
    }

    fn hydrate(&self) -> Option<Session> {
        let cookie = match self.cookies.read(cookies::SESSION) {
            Ok(Some(cookie)) => cookie,
            Ok(None) => {
                tracing::debug!("No session cookie, starting anonymous");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not read session cookie, starting anonymous");
                return None;
            }
        };

        match decode_session(cookie.value()) {
            Ok(session) => {
                tracing::debug!(user_id = %session.id, "Session hydrated from cookie");
                Some(session)
            }
            Err(reason) => {
                tracing::warn!(reason = %reason, "Discarding malformed session cookie");
                None
            }
        }
    }

    fn persist(&self, session: &Session) {
        let value = match encode_session(session) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode session cookie");
                return;
            }
        };

        if let Err(e) = self.cookies.write(&session_cookie(value)) {
            tracing::warn!(error = %e, "Session cookie write rejected, keeping session in memory only");
        }
    }

    fn notify(&self, next: Option<&Session>) {
        let observers: Vec<Observer> = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();

        for observer in observers {
            observer(next);
        }
    }
}

/// Handle returned by [`SessionStore::subscribe`].
#[must_use = "dropping the handle keeps the observer registered; call unsubscribe() to remove it"]
pub struct Subscription {
    id: u64,
    observers: Weak<Mutex<Observers>>,
}

impl Subscription {
    /// Stop receiving session changes.
    pub fn unsubscribe(self) {
        if let Some(observers) = self.observers.upgrade() {
            observers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entries
                .retain(|(id, _)| *id != self.id);
        }
    }
}

/// Build the `warrior` cookie for an encoded session value.
pub fn session_cookie(value: String) -> Cookie<'static> {
    let lifetime = time::Duration::days(SESSION_COOKIE_DAYS);

    Cookie::build((cookies::SESSION, value))
        .path("/")
        .same_site(SameSite::Strict)
        .max_age(lifetime)
        .expires(OffsetDateTime::now_utc() + lifetime)
        .build()
}

/// Session → URL-encoded JSON cookie value.
pub fn encode_session(session: &Session) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(session)?;
    Ok(urlencoding::encode(&json).into_owned())
}

/// Cookie value → validated session. Accepts URL-encoded or raw JSON.
pub fn decode_session(value: &str) -> Result<Session, String> {
    let json = urlencoding::decode(value).map_err(|e| format!("bad encoding: {}", e))?;
    let session: Session =
        serde_json::from_str(&json).map_err(|e| format!("bad session JSON: {}", e))?;
    session
        .validate()
        .map_err(|e| format!("invalid session: {}", e))?;
    Ok(session)
}
