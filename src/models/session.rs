// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session ("warrior") model mirrored into the `warrior` cookie.

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// The currently authenticated (or guest) identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque user identifier issued by the server
    #[validate(length(min = 1))]
    pub id: String,
    /// Display name
    #[validate(length(min = 1))]
    pub name: String,
    /// Email address (None for guests)
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    pub rank: Rank,
    /// Avatar style or URL
    #[serde(default, deserialize_with = "empty_as_none")]
    pub avatar: Option<String>,
    /// Preferred locale, e.g. "en" or "fr"
    #[serde(default, deserialize_with = "empty_as_none")]
    pub locale: Option<String>,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub mfa_enabled: bool,
}

impl Session {
    /// Create a minimal session with default flags.
    pub fn new(id: impl Into<String>, name: impl Into<String>, rank: Rank) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
            rank,
            avatar: None,
            locale: None,
            notifications_enabled: true,
            verified: false,
            mfa_enabled: false,
        }
    }

    /// Whether this is a full account rather than a guest.
    pub fn is_registered(&self) -> bool {
        matches!(self.rank, Rank::Registered | Rank::Admin)
    }
}

/// Role tag of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Rank {
    #[default]
    Guest,
    Registered,
    Admin,
    /// A tag this client does not know about yet
    #[serde(other)]
    Unknown,
}

fn default_true() -> bool {
    true
}

/// Servers send `""` for unset optional strings.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
