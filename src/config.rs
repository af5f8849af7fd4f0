// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Origin of the Thunderdome server, e.g. `https://thunderdome.dev`
    pub base_url: String,
    /// Sub-path the app is served under (empty for the root)
    pub path_prefix: String,
    /// Where the persistent cookie file lives
    pub cookie_file: PathBuf,
    /// Use the friendlier UI verb set for translations
    pub friendly_ui_verbs: bool,
    /// Locale used when nothing better is known
    pub default_locale: String,
    /// Locales the server ships bundles for
    pub supported_locales: Vec<String>,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            path_prefix: String::new(),
            cookie_file: PathBuf::from("thunderdome-cookies.json"),
            friendly_ui_verbs: false,
            default_locale: "en".to_string(),
            supported_locales: vec!["en".to_string()],
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let base_url =
            env::var("THUNDERDOME_URL").map_err(|_| ConfigError::Missing("THUNDERDOME_URL"))?;

        let friendly_ui_verbs = match env::var("THUNDERDOME_FRIENDLY_UI_VERBS") {
            Ok(v) => parse_bool(&v).ok_or(ConfigError::Invalid {
                name: "THUNDERDOME_FRIENDLY_UI_VERBS",
                value: v,
            })?,
            Err(_) => false,
        };

        let default_locale =
            env::var("THUNDERDOME_DEFAULT_LOCALE").unwrap_or_else(|_| "en".to_string());

        let mut supported_locales: Vec<String> = env::var("THUNDERDOME_SUPPORTED_LOCALES")
            .map(|v| parse_list(&v))
            .unwrap_or_default();
        if !supported_locales.contains(&default_locale) {
            supported_locales.push(default_locale.clone());
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            path_prefix: normalize_prefix(
                &env::var("THUNDERDOME_PATH_PREFIX").unwrap_or_default(),
            ),
            cookie_file: env::var("THUNDERDOME_COOKIE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("thunderdome-cookies.json")),
            friendly_ui_verbs,
            default_locale,
            supported_locales,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `"app/"` → `"/app"`, `"/"` → `""`
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}
