// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Translation bundle model.

use serde_json::{Map, Value};
use std::collections::HashMap;

/// Named phrasing set inside a locale file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    #[default]
    Default,
    /// Friendlier UI verbs
    Friendly,
}

impl Variant {
    /// Pick the variant from the `friendly_ui_verbs` configuration flag.
    pub fn from_friendly_flag(friendly: bool) -> Self {
        if friendly {
            Variant::Friendly
        } else {
            Variant::Default
        }
    }

    /// Partition key in the locale JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Default => "default",
            Variant::Friendly => "friendly",
        }
    }
}

/// One locale's messages for one variant, keyed by dotted translation key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    messages: HashMap<String, String>,
}

impl Bundle {
    /// Extract the `variant` partition of a locale file.
    ///
    /// Falls back to the `default` partition when the requested one is
    /// missing. Returns `None` when neither partition is an object.
    pub fn from_locale_file(file: &Value, variant: Variant) -> Option<Self> {
        let partition = file
            .get(variant.as_str())
            .and_then(Value::as_object)
            .or_else(|| {
                file.get(Variant::Default.as_str())
                    .and_then(Value::as_object)
            })?;

        let mut messages = HashMap::new();
        flatten_into(&mut messages, None, partition);
        Some(Self { messages })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Bundle {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            messages: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn flatten_into(out: &mut HashMap<String, String>, prefix: Option<&str>, obj: &Map<String, Value>) {
    for (key, value) in obj {
        let full_key = match prefix {
            Some(p) => format!("{}.{}", p, key),
            None => key.clone(),
        };

        match value {
            Value::String(s) => {
                out.insert(full_key, s.clone());
            }
            Value::Object(nested) => flatten_into(out, Some(&full_key), nested),
            // Arrays, numbers and nulls are not messages
            _ => {}
        }
    }
}

/// Replace `{name}` placeholders with the given values.
pub fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{}}}", name), value)
    })
}
