// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side persistent state (cookies and the session they mirror).

pub mod cookie;
pub mod jar;
pub mod session;

pub use self::cookie::{CookieStore, CookieStoreError, FileCookieStore, MemoryCookieStore};
pub use self::jar::PersistentJar;
pub use self::session::{SessionStore, Subscription};

/// Cookie names as constants.
pub mod cookies {
    /// JSON-encoded session record
    pub const SESSION: &str = "warrior";
}
