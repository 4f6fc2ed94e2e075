use std::collections::HashMap;

use unicase::UniCase;

/// The `@string` macros defined so far in a parse run.
///
/// Macro names are matched case-insensitively, following BibTeX.
#[derive(Debug, Default, Clone)]
pub struct Abbreviations {
    abbrevs: HashMap<UniCase<String>, String>,
}

impl Abbreviations {
    /// Define a macro. A later definition replaces an earlier one.
    pub fn insert(&mut self, name: &str, value: String) {
        self.abbrevs.insert(UniCase::new(name.to_owned()), value);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.abbrevs
            .get(&UniCase::new(name.to_owned()))
            .map(String::as_str)
    }

    /// Expand a bare token: a defined macro expands to its value, anything else is kept verbatim.
    pub fn resolve<'a>(&'a self, bare: &'a str) -> &'a str {
        self.get(bare).unwrap_or(bare)
    }

    pub fn len(&self) -> usize {
        self.abbrevs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abbrevs.is_empty()
    }
}
