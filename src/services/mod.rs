// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - network-facing logic.

pub mod api;
pub mod i18n;

pub use api::{ApiClient, PendingRequest, RequestOptions, UnauthorizedHandler};
pub use i18n::{LocaleError, LocaleLoader, LocaleState, LocaleStatus};
