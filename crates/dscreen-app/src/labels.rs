//! Column header labels
//!
//! The registry resolves header text through [`LabelLookup`]. The bundled
//! [`LanguageTable`] reads the label tables shipped in `labels/*.toml`.

use std::collections::HashMap;

use dscreen_core::prelude::*;

/// Language used when none is configured or the configured one is unknown
pub const DEFAULT_LANGUAGE: &str = "english";

const BUILTIN_TABLES: &[(&str, &str)] = &[
    ("english", include_str!("../labels/english.toml")),
    ("swedish", include_str!("../labels/swedish.toml")),
    ("german", include_str!("../labels/german.toml")),
];

/// Resolves a label key to display text.
///
/// Lookups never fail: unknown keys resolve to an empty string.
pub trait LabelLookup: Send + Sync {
    fn lookup(&self, key: &str) -> String;
}

impl<F> LabelLookup for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn lookup(&self, key: &str) -> String {
        self(key)
    }
}

/// Names of the bundled languages
pub fn available_languages() -> impl Iterator<Item = &'static str> {
    BUILTIN_TABLES.iter().map(|(name, _)| *name)
}

/// Label table for one language
#[derive(Debug, Clone)]
pub struct LanguageTable {
    language: String,
    labels: HashMap<String, String>,
}

impl LanguageTable {
    /// Load a bundled table, falling back to English for unknown languages
    pub fn load(language: &str) -> Self {
        let wanted = language.trim().to_lowercase();
        let source = BUILTIN_TABLES
            .iter()
            .find(|(name, _)| *name == wanted)
            .or_else(|| {
                warn!(
                    "Unknown language '{}', falling back to {}",
                    language, DEFAULT_LANGUAGE
                );
                BUILTIN_TABLES.iter().find(|(name, _)| *name == DEFAULT_LANGUAGE)
            });

        match source {
            Some((name, content)) => Self::from_toml_str(name, content).unwrap_or_else(|e| {
                warn!("Bundled label table '{}' is invalid: {}", name, e);
                Self::empty(name)
            }),
            None => Self::empty(DEFAULT_LANGUAGE),
        }
    }

    /// Parse a table of `key = "label"` pairs
    pub fn from_toml_str(language: &str, content: &str) -> Result<Self> {
        let labels: HashMap<String, String> = toml::from_str(content)
            .map_err(|e| Error::config(format!("Invalid label table '{}': {}", language, e)))?;

        debug!("Loaded {} labels for '{}'", labels.len(), language);

        Ok(Self {
            language: language.to_string(),
            labels,
        })
    }

    fn empty(language: &str) -> Self {
        Self {
            language: language.to_string(),
            labels: HashMap::new(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self::load(DEFAULT_LANGUAGE)
    }
}

impl LabelLookup for LanguageTable {
    fn lookup(&self, key: &str) -> String {
        self.labels.get(key).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::Column;

    #[test]
    fn test_english_headers() {
        let table = LanguageTable::load("english");
        assert_eq!(table.lookup("name"), "Name");
        assert_eq!(table.lookup("serial_no"), "Ser.No");
        assert_eq!(table.lookup("visible"), "Show");
    }

    #[test]
    fn test_every_bundled_table_covers_columns() {
        for language in available_languages() {
            let table = LanguageTable::load(language);
            assert_eq!(table.language(), language);
            for column in Column::ALL {
                assert!(
                    !table.lookup(column.key()).is_empty(),
                    "{} is missing '{}'",
                    language,
                    column.key()
                );
            }
        }
    }

    #[test]
    fn test_language_name_is_case_insensitive() {
        let table = LanguageTable::load("Swedish");
        assert_eq!(table.language(), "swedish");
        assert_eq!(table.lookup("visible"), "Visa");
    }

    #[test]
    fn test_unknown_language_falls_back_to_english() {
        let table = LanguageTable::load("klingon");
        assert_eq!(table.language(), "english");
        assert_eq!(table.lookup("state"), "State");
    }

    #[test]
    fn test_unknown_key_is_empty() {
        let table = LanguageTable::default();
        assert_eq!(table.lookup("no_such_key"), "");
    }

    #[test]
    fn test_from_toml_str_rejects_invalid() {
        assert!(LanguageTable::from_toml_str("bad", "name = ").is_err());
    }

    #[test]
    fn test_closure_lookup() {
        let upper = |key: &str| key.to_uppercase();
        assert_eq!(upper.lookup("state"), "STATE");
    }
}
