//! # The BibTeX grammar
//!
//! A single pass of the parser: [`parse_pass`] consumes `@` blocks from the start of its input
//! until the input is exhausted, a syntax error is found, or the per-pass match cap is reached.
//! Parsed entries are written into a caller-owned [`ParseState`], so that a run can be split into
//! any number of passes over successive suffixes of the input.
//!
//! The accepted grammar is described formally in the [`crate::syntax`] module.
//!
//! Ignored characters are skipped by [`scan::comment`]. In general, all parsing functions take a
//! byte position at which the construct begins (possibly preceded by ignored characters) and
//! return the position immediately after the construct.
pub mod scan;

use std::borrow::Cow;

use crate::abbrev::Abbreviations;
use crate::entry::{Entry, EntryDict};
use crate::error::{SyntaxErrorKind, SyntaxFailure};
use crate::location::Range;
use scan::ScanError;

/// Maximum number of chars of offending text kept in a [`SyntaxFailure`].
const FOUND_MAX_CHARS: usize = 24;

/// The accumulator of a parse run.
///
/// The same state is threaded through every pass of a run, so that entries and `@string`
/// macros parsed in earlier passes survive into later ones. It only ever grows.
#[derive(Debug, Default, Clone)]
pub struct ParseState {
    entries: EntryDict,
    strings: Abbreviations,
    preambles: Vec<String>,
}

impl ParseState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The entries parsed so far.
    pub fn entries(&self) -> &EntryDict {
        &self.entries
    }

    /// The `@string` macros defined so far.
    pub fn strings(&self) -> &Abbreviations {
        &self.strings
    }

    /// The expanded contents of every `@preamble` parsed so far, in input order.
    pub fn preambles(&self) -> &[String] {
        &self.preambles
    }

    pub fn into_entries(self) -> EntryDict {
        self.entries
    }
}

/// The result of a single pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// The whole input was consumed.
    Done,
    /// The match cap was reached with input remaining. The range is relative to the start of the
    /// input of the pass, and the next pass should begin at `at.end.offset`.
    Overrun { at: Range },
    /// The input is malformed. The range is relative to the start of the input of the pass.
    Syntax(SyntaxFailure),
}

/// Run one pass of the grammar over `input`, parsing at most `max_matches` `@` blocks.
///
/// A cap of 0 is treated as 1, so every pass makes progress.
///
/// ```
/// use bibtex_import::parse::{parse_pass, ParseState, PassOutcome};
///
/// let input = "@article{a, year = 1999}\n@book{b, year = 2001}";
/// let mut state = ParseState::new();
///
/// let PassOutcome::Overrun { at } = parse_pass(input, &mut state, 1) else {
///     panic!("expected an overrun");
/// };
/// assert_eq!(state.entries().len(), 1);
///
/// let outcome = parse_pass(&input[at.end.offset..], &mut state, 1);
/// assert_eq!(outcome, PassOutcome::Done);
/// assert_eq!(state.entries().len(), 2);
/// ```
pub fn parse_pass(input: &str, state: &mut ParseState, max_matches: usize) -> PassOutcome {
    let max_matches = max_matches.max(1);
    let mut matches = 0;
    let mut pos = 0;

    while let Some(start) = scan::next_entry(input, pos) {
        if matches == max_matches {
            return PassOutcome::Overrun {
                at: Range::point(input, start),
            };
        }

        match block(input, start, state) {
            Ok(end) => {
                pos = end;
                matches += 1;
            }
            Err(failure) => return PassOutcome::Syntax(failure.locate(input)),
        }
    }

    PassOutcome::Done
}

/// A syntax failure with byte positions, converted into a [`SyntaxFailure`] once the pass ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Failure {
    kind: SyntaxErrorKind,
    start: usize,
    end: usize,
}

impl Failure {
    /// A failure covering the char at `pos`.
    fn at(input: &str, pos: usize, kind: SyntaxErrorKind) -> Self {
        let width = input[pos..].chars().next().map_or(0, char::len_utf8);
        Self {
            kind,
            start: pos,
            end: pos + width,
        }
    }

    /// A failure spanning from an opening delimiter to the end of the input.
    fn unterminated(input: &str, open: usize, kind: SyntaxErrorKind) -> Self {
        Self {
            kind,
            start: open,
            end: input.len(),
        }
    }

    fn locate(self, input: &str) -> SyntaxFailure {
        let rest = &input[self.start..];
        let line = rest.split(['\n', '\r']).next().unwrap_or_default();
        SyntaxFailure {
            at: Range::locate(input, self.start, self.end),
            kind: self.kind,
            found: line.chars().take(FOUND_MAX_CHARS).collect(),
        }
    }
}

type ParseResult<T> = Result<T, Failure>;

/// The body delimiters of an `@` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Body {
    /// Position of the opening delimiter.
    open: usize,
    /// The closing delimiter byte.
    close: u8,
}

impl Body {
    /// The failure for an unexpected byte at `pos` inside this body.
    ///
    /// Hitting the end of input means the body is never closed; this is reported from the
    /// opening delimiter.
    fn unexpected(&self, input: &str, pos: usize, kind: SyntaxErrorKind) -> Failure {
        if pos >= input.len() {
            Failure::unterminated(input, self.open, SyntaxErrorKind::UnterminatedEntry)
        } else {
            Failure::at(input, pos, kind)
        }
    }

    /// Consume the closing delimiter at `pos`.
    fn close(&self, input: &str, pos: usize, kind: SyntaxErrorKind) -> ParseResult<usize> {
        if input.as_bytes().get(pos) == Some(&self.close) {
            Ok(pos + 1)
        } else {
            Err(self.unexpected(input, pos, kind))
        }
    }
}

/// The kind of an `@` block, decided by its case-insensitive entry type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockType<'r> {
    Comment,
    Preamble,
    Macro,
    Regular(&'r str),
}

impl<'r> BlockType<'r> {
    fn from_identifier(ident: &'r str) -> Self {
        if ident.eq_ignore_ascii_case("comment") {
            Self::Comment
        } else if ident.eq_ignore_ascii_case("preamble") {
            Self::Preamble
        } else if ident.eq_ignore_ascii_case("string") {
            Self::Macro
        } else {
            Self::Regular(ident)
        }
    }
}

/// Parse the `@` block starting at `start` (the position of the `@`) and return the position
/// after its closing delimiter.
fn block(input: &str, start: usize, state: &mut ParseState) -> ParseResult<usize> {
    debug_assert_eq!(input.as_bytes().get(start), Some(&b'@'));

    let pos = scan::comment(input, start + 1);
    let end = scan::identifier(input, pos);
    if end == pos {
        return Err(Failure::at(input, pos, SyntaxErrorKind::ExpectedEntryType));
    }
    let block_type = BlockType::from_identifier(&input[pos..end]);

    let (pos, body) = opening(input, end)?;
    match block_type {
        BlockType::Comment => comment_body(input, pos, body),
        BlockType::Preamble => {
            let (pos, value) = value(input, scan::comment(input, pos), body, &state.strings)?;
            state.preambles.push(value);
            body.close(
                input,
                scan::comment(input, pos),
                SyntaxErrorKind::ExpectedClosingDelimiter,
            )
        }
        BlockType::Macro => macro_body(input, pos, body, state),
        BlockType::Regular(entry_type) => {
            let (pos, entry) = regular_body(input, pos, body, entry_type, &state.strings)?;
            state.entries.insert(entry.citekey.clone(), entry);
            Ok(pos)
        }
    }
}

/// Consume ignored characters and the opening delimiter `{` or `(`.
fn opening(input: &str, pos: usize) -> ParseResult<(usize, Body)> {
    let pos = scan::comment(input, pos);
    let close = match input.as_bytes().get(pos) {
        Some(b'{') => b'}',
        Some(b'(') => b')',
        _ => {
            return Err(Failure::at(
                input,
                pos,
                SyntaxErrorKind::ExpectedOpeningDelimiter,
            ));
        }
    };
    Ok((pos + 1, Body { open: pos, close }))
}

/// Skip the contents of an `@comment` block.
fn comment_body(input: &str, pos: usize, body: Body) -> ParseResult<usize> {
    let scanned = if body.close == b'}' {
        scan::balanced(input, pos)
    } else {
        scan::protected(body.close)(input, pos)
    };

    match scanned {
        Ok(end) => Ok(end + 1),
        Err(ScanError::Unterminated) => Err(Failure::unterminated(
            input,
            body.open,
            SyntaxErrorKind::UnterminatedEntry,
        )),
        Err(ScanError::UnexpectedClosingBracket(idx)) => Err(Failure::at(
            input,
            idx,
            SyntaxErrorKind::UnexpectedClosingBrace,
        )),
    }
}

/// Parse the contents of an `@string` block, which may be empty.
///
/// In the below block with the cursor at `<>`
/// ```bib
/// @string{<>jgr = {J. Geophys. Res.}}
/// ```
/// defines the macro `jgr` and consumes up to and including the final `}`.
fn macro_body(input: &str, pos: usize, body: Body, state: &mut ParseState) -> ParseResult<usize> {
    let pos = scan::comment(input, pos);
    if input.as_bytes().get(pos) == Some(&body.close) {
        return Ok(pos + 1);
    }

    let (pos, name) = field_name(input, pos, body)?;
    let (pos, value) = value(input, pos, body, &state.strings)?;
    state.strings.insert(name, value);

    let mut pos = scan::comment(input, pos);
    if input.as_bytes().get(pos) == Some(&b',') {
        pos = scan::comment(input, pos + 1);
    }
    body.close(input, pos, SyntaxErrorKind::ExpectedClosingDelimiter)
}

/// Parse the contents of a regular entry.
///
/// In the below entry with the cursor at `<>`
/// ```bib
/// @article{<>key,
///   title = {text} # macro,
/// }
/// ```
/// consumes everything up to and including the final `}`.
fn regular_body(
    input: &str,
    pos: usize,
    body: Body,
    entry_type: &str,
    strings: &Abbreviations,
) -> ParseResult<(usize, Entry)> {
    let pos = scan::comment(input, pos);
    let end = scan::citekey(input, pos, body.close);
    if end == pos {
        return Err(body.unexpected(input, pos, SyntaxErrorKind::ExpectedCitekey));
    }

    let mut entry = Entry::new(&input[pos..end], entry_type.to_lowercase());
    let mut pos = end;

    loop {
        pos = scan::comment(input, pos);
        match input.as_bytes().get(pos) {
            Some(&b) if b == body.close => return Ok((pos + 1, entry)),
            Some(b',') => {
                pos = scan::comment(input, pos + 1);
                // trailing comma
                if input.as_bytes().get(pos) == Some(&body.close) {
                    return Ok((pos + 1, entry));
                }
                let (after_name, name) = field_name(input, pos, body)?;
                let (after_value, value) = value(input, after_name, body, strings)?;
                // a repeated field replaces the earlier one
                entry.fields.insert(name.to_lowercase(), value);
                pos = after_value;
            }
            _ => return Err(body.unexpected(input, pos, SyntaxErrorKind::ExpectedComma)),
        }
    }
}

/// Parse a field name and the following `=`.
///
/// In the below entry with the cursor at `<>`
/// ```bib
/// @article{key,
///   <>title = {text}
/// }
/// ```
/// consumes `title =` and returns `title`.
fn field_name<'r>(input: &'r str, pos: usize, body: Body) -> ParseResult<(usize, &'r str)> {
    let end = scan::identifier(input, pos);
    if end == pos {
        return Err(body.unexpected(input, pos, SyntaxErrorKind::ExpectedFieldName));
    }
    let name = &input[pos..end];

    let pos = scan::comment(input, end);
    if input.as_bytes().get(pos) != Some(&b'=') {
        return Err(body.unexpected(input, pos, SyntaxErrorKind::ExpectedEquals));
    }
    Ok((pos + 1, name))
}

/// Parse a field value: one or more tokens joined by `#`, expanded and concatenated.
///
/// In the below entry with the cursor at `<>`
/// ```bib
/// @article{key,
///   title =<> {text} # macro
/// }
/// ```
/// consumes ` {text} # macro` and returns `text` followed by the expansion of `macro`.
fn value(
    input: &str,
    pos: usize,
    body: Body,
    strings: &Abbreviations,
) -> ParseResult<(usize, String)> {
    let (mut pos, first) = token(input, scan::comment(input, pos), body, strings)?;
    let mut value = first.into_owned();

    loop {
        let sep = scan::comment(input, pos);
        if input.as_bytes().get(sep) != Some(&b'#') {
            return Ok((pos, value));
        }
        let (next, token) = token(input, scan::comment(input, sep + 1), body, strings)?;
        value.push_str(&token);
        pos = next;
    }
}

/// Parse a single value token.
///
/// - `{braced}`: brackets must balance, the outer brackets are removed.
/// - `"quoted"`: brackets must balance, and a `"` inside brackets does not end the token.
/// - `bare`: a number or a macro name; defined macros are expanded.
fn token<'r>(
    input: &'r str,
    pos: usize,
    body: Body,
    strings: &'r Abbreviations,
) -> ParseResult<(usize, Cow<'r, str>)> {
    match input.as_bytes().get(pos) {
        Some(b'{') => match scan::balanced(input, pos + 1) {
            Ok(end) => Ok((end + 1, Cow::Borrowed(&input[pos + 1..end]))),
            Err(_) => Err(Failure::unterminated(
                input,
                pos,
                SyntaxErrorKind::UnbalancedBraces,
            )),
        },
        Some(b'"') => match scan::protected(b'"')(input, pos + 1) {
            Ok(end) => Ok((end + 1, Cow::Borrowed(&input[pos + 1..end]))),
            Err(ScanError::Unterminated) => Err(Failure::unterminated(
                input,
                pos,
                SyntaxErrorKind::UnterminatedQuote,
            )),
            Err(ScanError::UnexpectedClosingBracket(idx)) => Err(Failure::at(
                input,
                idx,
                SyntaxErrorKind::UnexpectedClosingBrace,
            )),
        },
        _ => {
            let end = scan::identifier(input, pos);
            if end == pos {
                return Err(body.unexpected(input, pos, SyntaxErrorKind::ExpectedValue));
            }
            Ok((end, Cow::Borrowed(strings.resolve(&input[pos..end]))))
        }
    }
}
