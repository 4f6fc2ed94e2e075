//! Post-processing of parsed entries.
use crate::entry::{Entry, EntryDict};
use crate::parse::scan;

/// Normalize every entry of a successfully parsed bibliography.
///
/// See [`normalize_entry`].
pub fn normalize(dict: &mut EntryDict) {
    for entry in dict.values_mut() {
        normalize_entry(entry);
    }
}

/// Strip one layer of protective braces from the title, or give the entry an empty title if it
/// has none. No other field is changed.
pub fn normalize_entry(entry: &mut Entry) {
    match entry.fields.get_mut("title") {
        Some(title) => {
            if let Some(inner) = strip_outer_braces(title) {
                *title = inner.to_owned();
            }
        }
        None => {
            entry.fields.insert("title".to_owned(), String::new());
        }
    }
}

/// Remove the outer brackets of `s` if they are a single matching pair.
///
/// ```
/// use bibtex_import::normalize::strip_outer_braces;
///
/// assert_eq!(strip_outer_braces("{{Nested}}"), Some("{Nested}"));
/// assert_eq!(strip_outer_braces("{A} and {B}"), None);
/// ```
pub fn strip_outer_braces(s: &str) -> Option<&str> {
    if s.len() < 2 || !s.starts_with('{') || !s.ends_with('}') {
        return None;
    }
    // the bracket opened at 0 must close at the very end
    match scan::balanced(s, 1) {
        Ok(close) if close == s.len() - 1 => Some(&s[1..close]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with_title(title: Option<&str>) -> Entry {
        let mut entry = Entry::new("k", "article");
        entry.fields.insert("journal".into(), "{Nature}".into());
        if let Some(title) = title {
            entry.fields.insert("title".into(), title.into());
        }
        entry
    }

    #[test]
    fn test_strip_outer_braces() {
        assert_eq!(strip_outer_braces("{Title}"), Some("Title"));
        assert_eq!(strip_outer_braces("{}"), Some(""));
        assert_eq!(strip_outer_braces("{{A}}"), Some("{A}"));
        assert_eq!(strip_outer_braces("{A} and {B}"), None);
        assert_eq!(strip_outer_braces("{A}}"), None);
        assert_eq!(strip_outer_braces("Plain {B}"), None);
        assert_eq!(strip_outer_braces("{"), None);
        assert_eq!(strip_outer_braces("}"), None);
        assert_eq!(strip_outer_braces(""), None);
    }

    #[test]
    fn test_normalize() {
        let mut dict = EntryDict::new();
        dict.insert("a".into(), entry_with_title(Some("{Protected Title}")));
        dict.insert("b".into(), entry_with_title(Some("{A} and {B}")));
        dict.insert("c".into(), entry_with_title(None));
        dict.insert("d".into(), entry_with_title(Some("{{Twice}}")));

        normalize(&mut dict);
        assert_eq!(dict["a"].field("title"), Some("Protected Title"));
        assert_eq!(dict["b"].field("title"), Some("{A} and {B}"));
        assert_eq!(dict["c"].field("title"), Some(""));
        assert_eq!(dict["d"].field("title"), Some("{Twice}"));

        // other fields untouched
        assert!(dict.values().all(|e| e.field("journal") == Some("{Nature}")));
    }
}
