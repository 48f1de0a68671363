//! Localized chat text
//!
//! A catalog file maps `language -> key -> template`. Nested objects are
//! flattened with dots, so `{"status": {"inactive": ..}}` becomes the key
//! `status.inactive`. Templates use `{name}` placeholders.

use crate::config::{ConfigError, Settings};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Display;

/// English catalog shipped with the binary
pub const BUNDLED_CATALOG: &str = include_str!("../lang/en.json");

#[derive(Debug, Clone)]
pub struct TextCatalog {
    language: String,
    entries: HashMap<String, String>,
}

impl TextCatalog {
    /// Parse a catalog document and pick out one language
    pub fn from_json(json: &str, language: &str) -> Result<Self, ConfigError> {
        let document: Value = serde_json::from_str(json)?;
        let table = document
            .get(language)
            .and_then(Value::as_object)
            .ok_or_else(|| ConfigError::UnknownLanguage(language.to_string()))?;

        let mut entries = HashMap::new();
        flatten("", table, &mut entries);

        Ok(Self {
            language: language.to_string(),
            entries,
        })
    }

    /// The catalog the settings point at, or the bundled one
    pub fn for_settings(settings: &Settings) -> Result<Self, ConfigError> {
        match &settings.text_file {
            Some(path) => {
                let json =
                    std::fs::read_to_string(path).map_err(|source| ConfigError::CatalogIo {
                        path: path.clone(),
                        source,
                    })?;
                Self::from_json(&json, &settings.language)
            }
            None => Self::from_json(BUNDLED_CATALOG, &settings.language),
        }
    }

    /// Bundled English catalog
    pub fn english() -> Self {
        Self::from_json(BUNDLED_CATALOG, "en").unwrap_or_else(|e| {
            tracing::error!("Bundled text catalog is broken: {}", e);
            Self {
                language: "en".to_string(),
                entries: HashMap::new(),
            }
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Raw template for `key`; unknown keys come back as the key itself
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        match self.entries.get(key) {
            Some(template) => template,
            None => {
                tracing::warn!("Missing text for {:?} in language {}", key, self.language);
                key
            }
        }
    }

    /// Fill `{name}` placeholders in the template for `key`
    pub fn render(&self, key: &str, args: &[(&str, &dyn Display)]) -> String {
        let template = self.get(key);
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let name = &after[..close];
                    match args.iter().find(|(arg, _)| *arg == name) {
                        Some((_, value)) => out.push_str(&value.to_string()),
                        None => {
                            out.push('{');
                            out.push_str(name);
                            out.push('}');
                        }
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Singular or plural form of a word from the `words` group
    pub fn plural(&self, word: &str, count: usize) -> String {
        if count == 1 {
            self.get(&format!("words.{}", word)).to_string()
        } else {
            self.get(&format!("words.{}s", word)).to_string()
        }
    }

    /// "A", "A and B", "A, B and C"
    pub fn join_names<S: AsRef<str>>(&self, names: &[S]) -> String {
        let and = self.get("words.and");
        match names {
            [] => String::new(),
            [only] => only.as_ref().to_string(),
            [init @ .., last] => {
                let head: Vec<&str> = init.iter().map(|s| s.as_ref()).collect();
                format!("{} {} {}", head.join(", "), and, last.as_ref())
            }
        }
    }
}

fn flatten(prefix: &str, table: &serde_json::Map<String, Value>, out: &mut HashMap<String, String>) {
    for (key, value) in table {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::String(s) => {
                out.insert(full, s.clone());
            }
            Value::Object(nested) => flatten(&full, nested, out),
            other => {
                out.insert(full, other.to_string());
            }
        }
    }
}
