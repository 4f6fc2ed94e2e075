//! # Bibliographic records
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

/// The fields of an entry, keyed by lower-case field name.
pub type Fields = BTreeMap<String, String>;

/// Mapping from citation key to entry.
pub type EntryDict = BTreeMap<String, Entry>;

/// One structured author name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Author {
    pub first: String,
    pub last: String,
}

/// One bibliographic record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Entry {
    /// The citation key, e.g. `knuth1984` in `@book{knuth1984, ...}`.
    pub citekey: String,
    /// The lower-case entry type, e.g. `article`.
    #[serde(rename = "type")]
    pub entry_type: String,
    /// The raw field values.
    pub fields: Fields,
    /// Structured authors, filled in by [`crate::format::assign_authors`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<Author>>,
}

impl Entry {
    pub fn new(citekey: impl Into<String>, entry_type: impl Into<String>) -> Self {
        Self {
            citekey: citekey.into(),
            entry_type: entry_type.into(),
            fields: Fields::new(),
            authors: None,
        }
    }

    /// Get a field by its lower-case name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}
