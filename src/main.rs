// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Thunderdome client
//!
//! Restores the saved session, loads translations for it and checks the
//! session against the server.

use anyhow::Context;
use std::sync::Arc;
use thunderdome_client::{config::Config, store::FileCookieStore, Thunderdome};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        base_url = %config.base_url,
        cookie_file = %config.cookie_file.display(),
        "Starting Thunderdome client"
    );

    let cookies = Arc::new(FileCookieStore::new(&config.cookie_file));
    let app = Thunderdome::with_navigator(config, cookies, || {
        tracing::warn!("Session expired, sign in again");
    })
    .map_err(|e| anyhow::anyhow!("Failed to build API client: {}", e))?;

    let _session_log = app.session.subscribe(|session| match session {
        Some(s) => tracing::info!(user_id = %s.id, name = %s.name, rank = ?s.rank, "Session"),
        None => tracing::info!("No active session"),
    });

    if let Err(e) = app.setup_session_locale().await {
        tracing::warn!(error = %e, "Translations unavailable, showing message keys");
    }

    if !app.session.is_authenticated() {
        tracing::info!("{}", app.i18n.translate("loginRequired"));
        return Ok(());
    }

    match app.refresh_session().await {
        Ok(Some(user)) => {
            tracing::info!(
                "{}",
                app.i18n.translate_with("welcomeBack", &[("name", &user.name)])
            );
        }
        Ok(None) => tracing::warn!("Server returned no user for the current session"),
        Err(e) if e.is_unauthorized() => {
            tracing::info!("Stored session was rejected by the server and has been cleared");
        }
        Err(e) => anyhow::bail!("Failed to fetch current user: {}", e),
    }

    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,thunderdome_client=debug")),
        )
        .with(format)
        .init();
}
