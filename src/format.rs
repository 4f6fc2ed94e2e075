//! # Presentation helpers for imported entries
//!
//! Splitting of the `author` field into structured names, and short citation strings built from
//! the fields of an [`Entry`].
use serde::{Deserialize, Serialize};

use crate::entry::{Author, Entry, EntryDict};

/// Split an `author` field into names.
///
/// Names are separated by the word `and` (in any case) outside of brackets. Each name is either
/// `Last, First Middle` or `First Middle Last`; first and middle names are reduced to initials.
///
/// ```
/// use bibtex_import::format::parse_authors;
///
/// let authors = parse_authors("Knuth, Donald Ervin AND {Barnes and Noble}");
/// assert_eq!(authors[0].first, "D. E.");
/// assert_eq!(authors[0].last, "Knuth");
/// assert_eq!(authors[1].last, "{Barnes and Noble}");
/// ```
pub fn parse_authors(field: &str) -> Vec<Author> {
    let mut names = Vec::new();
    let mut words: Vec<&str> = Vec::new();
    let mut depth: i32 = 0;

    for word in field.split_whitespace() {
        if depth == 0 && word.eq_ignore_ascii_case("and") {
            names.push(words.join(" "));
            words.clear();
            continue;
        }
        for b in word.bytes() {
            match b {
                b'{' => depth += 1,
                b'}' => depth -= 1,
                _ => {}
            }
        }
        words.push(word);
    }
    names.push(words.join(" "));

    names
        .iter()
        .map(String::as_str)
        .filter(|name| !name.is_empty())
        .map(parse_name)
        .collect()
}

fn parse_name(name: &str) -> Author {
    let (last, first) = match name.split_once(',') {
        Some((last, first)) => (last.trim(), first.trim()),
        None => match last_space(name) {
            Some(idx) => (&name[idx + 1..], name[..idx].trim_end()),
            None => (name, ""),
        },
    };

    Author {
        first: initials(first),
        last: last.to_owned(),
    }
}

/// Position of the last space outside of brackets.
fn last_space(name: &str) -> Option<usize> {
    let mut depth: i32 = 0;
    let mut found = None;
    for (idx, b) in name.bytes().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => depth -= 1,
            b' ' if depth == 0 => found = Some(idx),
            _ => {}
        }
    }
    found
}

/// `Donald Ervin` becomes `D. E.`
fn initials(names: &str) -> String {
    names
        .split_whitespace()
        .filter_map(|name| name.chars().find(|c| c.is_alphanumeric()))
        .map(|c| format!("{}.", c.to_uppercase()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fill in [`Entry::authors`] for every entry with an `author` field.
pub fn assign_authors(dict: &mut EntryDict) {
    for entry in dict.values_mut() {
        if let Some(field) = entry.fields.get("author") {
            entry.authors = Some(parse_authors(field));
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorOptions {
    /// Abbreviate more than two authors to `First et al.`
    pub short_list: bool,
    /// Omit the initials.
    pub only_last_name: bool,
}

/// Format the authors of an entry as `A`, `A and B`, or `A, B and C`.
///
/// Uses [`Entry::authors`] if present, and otherwise parses the `author` field.
pub fn format_authors(entry: &Entry, options: AuthorOptions) -> String {
    let parsed;
    let authors = match &entry.authors {
        Some(authors) => authors.as_slice(),
        None => {
            parsed = entry.field("author").map(parse_authors).unwrap_or_default();
            parsed.as_slice()
        }
    };

    let names: Vec<String> = authors
        .iter()
        .map(|author| {
            if options.only_last_name || author.first.is_empty() {
                author.last.clone()
            } else {
                format!("{} {}", author.first, author.last)
            }
        })
        .collect();

    match names.as_slice() {
        [] => String::new(),
        [first, ..] if options.short_list && names.len() > 2 => format!("{first} et al."),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

/// How to emphasize the volume of a journal reference.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Highlight {
    Html,
    Markdown,
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalReferenceOptions {
    pub including_year: bool,
    pub highlight_volume: Highlight,
}

impl Default for JournalReferenceOptions {
    fn default() -> Self {
        Self {
            including_year: true,
            highlight_volume: Highlight::None,
        }
    }
}

/// Format a journal reference such as `Phys. Rev. D 12,345 (1999)`.
///
/// Preprints with `journal = {arXiv}` and an `eprint` field give `arXiv:2101.00001`. Missing
/// fields are left out.
pub fn format_journal_reference(entry: &Entry, options: JournalReferenceOptions) -> String {
    let journal = entry.field("journal").unwrap_or_default();

    let mut reference = match entry.field("eprint") {
        Some(eprint) if journal.trim().eq_ignore_ascii_case("arxiv") => {
            format!("{journal}:{eprint}")
        }
        _ => {
            let volume = match entry.field("volume") {
                Some(volume) if !volume.is_empty() => match options.highlight_volume {
                    Highlight::Html => format!("<strong>{volume}</strong>"),
                    Highlight::Markdown => format!("**{volume}**"),
                    Highlight::None => volume.to_owned(),
                },
                _ => String::new(),
            };
            let pages = entry
                .field("pages")
                .or_else(|| entry.field("page"))
                .unwrap_or_default();

            let volume_pages = join_nonempty(&[volume.as_str(), pages], ",");
            join_nonempty(&[journal, volume_pages.as_str()], " ")
        }
    };

    if options.including_year {
        if let Some(year) = entry.field("year").filter(|year| !year.is_empty()) {
            if !reference.is_empty() {
                reference.push(' ');
            }
            reference.push_str(&format!("({year})"));
        }
    }
    reference
}

fn join_nonempty(parts: &[&str], sep: &str) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(sep)
}

pub fn format_title(entry: &Entry) -> &str {
    entry.field("title").unwrap_or("No title")
}

/// A Markdown link opening the entry in BibDesk.
pub fn bibdesk_link(entry: &Entry) -> String {
    format!("[{key}](x-bdsk://{key})", key = entry.citekey)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(fields: &[(&str, &str)]) -> Entry {
        let mut entry = Entry::new("key2020", "article");
        for (name, value) in fields {
            entry.fields.insert((*name).into(), (*value).into());
        }
        entry
    }

    fn author(first: &str, last: &str) -> Author {
        Author {
            first: first.into(),
            last: last.into(),
        }
    }

    #[test]
    fn test_parse_authors() {
        assert_eq!(
            parse_authors("Doe, John and Roe, Richard Paul"),
            vec![author("J.", "Doe"), author("R. P.", "Roe")]
        );
        assert_eq!(
            parse_authors("John  Doe\n AND jane q. public"),
            vec![author("J.", "Doe"), author("J. Q.", "public")]
        );
        assert_eq!(
            parse_authors("{\\\"O}zt{\\\"u}rk, {\\'E}mile"),
            vec![author("E.", "{\\\"O}zt{\\\"u}rk")]
        );
        assert_eq!(parse_authors("Plato"), vec![author("", "Plato")]);
        assert_eq!(parse_authors(""), Vec::<Author>::new());
        assert_eq!(parse_authors("Anderson, A."), vec![author("A.", "Anderson")]);
    }

    #[test]
    fn test_assign_authors() {
        let mut dict = EntryDict::new();
        dict.insert("a".into(), entry(&[("author", "Doe, J.")]));
        dict.insert("b".into(), entry(&[]));
        assign_authors(&mut dict);
        assert_eq!(dict["a"].authors, Some(vec![author("J.", "Doe")]));
        assert_eq!(dict["b"].authors, None);
    }

    #[test]
    fn test_format_authors() {
        let one = entry(&[("author", "Doe, John")]);
        let two = entry(&[("author", "Doe, John and Roe, Rich")]);
        let three = entry(&[("author", "Doe, John and Roe, Rich and Poe, Edgar Allan")]);

        let default = AuthorOptions::default();
        assert_eq!(format_authors(&one, default), "J. Doe");
        assert_eq!(format_authors(&two, default), "J. Doe and R. Roe");
        assert_eq!(
            format_authors(&three, default),
            "J. Doe, R. Roe and E. A. Poe"
        );

        let short = AuthorOptions {
            short_list: true,
            only_last_name: true,
        };
        assert_eq!(format_authors(&two, short), "Doe and Roe");
        assert_eq!(format_authors(&three, short), "Doe et al.");
        assert_eq!(format_authors(&entry(&[]), short), "");
    }

    #[test]
    fn test_format_authors_prefers_assigned() {
        let mut e = entry(&[("author", "Doe, John")]);
        e.authors = Some(vec![author("X.", "Other")]);
        assert_eq!(format_authors(&e, AuthorOptions::default()), "X. Other");
    }

    #[test]
    fn test_journal_reference() {
        let e = entry(&[
            ("journal", "Phys. Rev. D"),
            ("volume", "12"),
            ("pages", "345--350"),
            ("year", "1999"),
        ]);
        assert_eq!(
            format_journal_reference(&e, JournalReferenceOptions::default()),
            "Phys. Rev. D 12,345--350 (1999)"
        );
        assert_eq!(
            format_journal_reference(
                &e,
                JournalReferenceOptions {
                    including_year: false,
                    highlight_volume: Highlight::Html
                }
            ),
            "Phys. Rev. D <strong>12</strong>,345--350"
        );
        assert_eq!(
            format_journal_reference(
                &e,
                JournalReferenceOptions {
                    including_year: true,
                    highlight_volume: Highlight::Markdown
                }
            ),
            "Phys. Rev. D **12**,345--350 (1999)"
        );
    }

    #[test]
    fn test_journal_reference_arxiv() {
        let e = entry(&[
            ("journal", "arXiv"),
            ("eprint", "2101.00001"),
            ("volume", "1"),
            ("year", "2021"),
        ]);
        assert_eq!(
            format_journal_reference(&e, JournalReferenceOptions::default()),
            "arXiv:2101.00001 (2021)"
        );

        // no eprint: treated as a journal
        let e = entry(&[("journal", "arXiv"), ("volume", "1")]);
        assert_eq!(
            format_journal_reference(&e, JournalReferenceOptions::default()),
            "arXiv 1"
        );
    }

    #[test]
    fn test_journal_reference_missing_fields() {
        assert_eq!(
            format_journal_reference(&entry(&[]), JournalReferenceOptions::default()),
            ""
        );
        assert_eq!(
            format_journal_reference(
                &entry(&[("year", "2000"), ("page", "7")]),
                JournalReferenceOptions::default()
            ),
            "7 (2000)"
        );
    }

    #[test]
    fn test_title_and_link() {
        assert_eq!(format_title(&entry(&[])), "No title");
        assert_eq!(format_title(&entry(&[("title", "")])), "");
        assert_eq!(format_title(&entry(&[("title", "On Things")])), "On Things");
        assert_eq!(bibdesk_link(&entry(&[])), "[key2020](x-bdsk://key2020)");
    }
}
