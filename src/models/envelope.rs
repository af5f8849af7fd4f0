// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Standard JSON response wrapper used by the Thunderdome API.

use serde::Deserialize;
use serde_json::Value;

/// `{"success": bool, "error": string, "data": T, "meta": {...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub error: String,
    pub data: Option<T>,
    pub meta: Option<Value>,
}

impl<T> ApiEnvelope<T> {
    /// The payload of a successful response.
    pub fn into_data(self) -> Option<T> {
        if self.success {
            self.data
        } else {
            None
        }
    }
}
