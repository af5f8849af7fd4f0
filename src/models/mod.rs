// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the client.

pub mod envelope;
pub mod locale;
pub mod session;

pub use envelope::ApiEnvelope;
pub use locale::{Bundle, Variant};
pub use session::{Rank, Session};
