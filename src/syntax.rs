//! # Description of the bibliography syntax
//! The goal of this module is to give an explicit description of the grammar accepted by this
//! crate, as a [pest](https://pest.rs) grammar which can also be used to validate a file. The
//! parser in [`crate::parse`] accepts exactly the same language, but is written by hand so that
//! it can stop after a bounded number of entries, resume, and report the precise range of a
//! syntax error.
//!
//! ## Structure of a bibliography
//! ### Whitespace, comments, and junk characters.
//! 1. Whitespace is defined as any ASCII char accepted by the
//!    [`is_ascii_whitespace`](https://doc.rust-lang.org/std/primitive.u8.html#method.is_ascii_whitespace)
//!    method.
//!    ```ignore
//!    ws = _{ " " | "\t" | "\n" | "\r" | "\x0C" }
//!    ```
//! 2. A TeX Comment is started by a `%` symbol and terminated by a newline `\n`.
//!    ```ignore
//!    tex_comment = _{ "%" ~ (!"\n" ~ ANY)* ~ ("\n" | EOI) }
//!    ```
//! 3. Whitespace and TeX comments are ignored inside entries.
//!    ```ignore
//!    ign = _{ (tex_comment | ws)* }
//!    ```
//! 4. Junk characters are any characters which are either commented or are not `@`. In
//!    particular, a commented-out entry such as `% @article{...}` is junk.
//!    ```ignore
//!    junk = _{ (tex_comment | !("@" | "%") ~ ANY)* }
//!    ```
//!
//! ### Identifiers
//! 1. An identifier is any UTF-8 character which is not ASCII, or a printable ASCII character
//!    which is not one of the literal characters `{}(),=\#%"`. Entry types and field keys are
//!    identifiers. Both are stored lower-case.
//!    ```ignore
//!    ident_char = _{ !('\x00'..'\x20' | "{" | "}" | "(" | ")" | "," | "=" | "\\" | "#" | "%" | "\"" | "\x7f") ~ ANY }
//!    identifier = _{ ident_char+ }
//!    field_key = @{ identifier }
//!    ```
//!    The type of a regular entry is any identifier other than the special entry types.
//!    ```ignore
//!    keyword = _{ (^"comment" | ^"preamble" | ^"string") ~ !ident_char }
//!    entry_type = @{ !keyword ~ identifier }
//!    ```
//! 2. A citation key is more permissive: only `,`, whitespace, control characters, and the
//!    delimiters of the entry body are excluded. In a `{...}` body these are `{}`, and in a
//!    `(...)` body only `)`, so that `smith(2000)` is a valid key of `@article{smith(2000), ...}`.
//!    ```ignore
//!    citekey_curly = @{ (!('\x00'..'\x20' | "," | "{" | "}" | "\x7f") ~ ANY)+ }
//!    citekey_round = @{ (!('\x00'..'\x20' | "," | ")" | "\x7f") ~ ANY)+ }
//!    ```
//!
//! ### Field tokens and values.
//! 1. A braced token is a sequence of characters such that the brackets `{}` are balanced.
//!    ```ignore
//!    balanced = _{ "{" ~ balanced* ~ "}" | (!("{" | "}") ~ ANY) }
//!    token_curly = @{ balanced* }
//!    ```
//! 2. A quoted token is a sequence of characters delimited by `"` such that the brackets `{}`
//!    are balanced. The closing `"` must not be captured within any brackets `{}`.
//!    ```ignore
//!    quoted = _{ "{" ~ balanced* ~ "}" | (!("{" | "}" | "\"") ~ ANY) }
//!    token_quoted = @{ quoted* }
//!    ```
//! 3. A bare token is an identifier. This covers both numbers like `1999` and macro names.
//!    ```ignore
//!    token_bare = @{ identifier }
//!    token = _{ "{" ~ token_curly ~ "}" | "\"" ~ token_quoted ~ "\"" | token_bare }
//!    ```
//! 4. A value is a sequence of tokens delimited by `#` and separated possibly by ignored
//!    characters.
//!    ```ignore
//!    value = { token ~ (ign ~ "#" ~ ign ~ token)* }
//!    ```
//!
//! ### Special entries
//! 1. A comment entry is skipped. Its contents are a braced token, or delimited by round
//!    brackets and terminated by the first `)` which is not enclosed by curly brackets.
//!    ```ignore
//!    entry_comment = { ^"comment" ~ !ident_char ~ ign ~ ("{" ~ token_curly ~ "}" | "(" ~ token_round ~ ")") }
//!    ```
//! 2. A preamble entry contains only a value.
//!    ```ignore
//!    entry_preamble = { ^"preamble" ~ !ident_char ~ ign ~ ("{" ~ preamble_contents ~ "}" | "(" ~ preamble_contents ~ ")") }
//!    ```
//! 3. A macro entry consists of a name and a value, separated by a `=` character. It can be
//!    empty, and if it is not empty, it can have a trailing comma.
//!    ```ignore
//!    macro_contents = _{ (ign ~ field_key ~ ign ~ "=" ~ ign ~ value ~ ign ~ ","?)? ~ ign }
//!    entry_macro = { ^"string" ~ !ident_char ~ ign ~ ("{" ~ macro_contents ~ "}" | "(" ~ macro_contents ~ ")") }
//!    ```
//!
//! ### Regular entry
//! 1. A field consists of a field key and a value, separated by an `=`.
//!    ```ignore
//!    field = { field_key ~ ign ~ "=" ~ ign ~ value }
//!    ```
//! 2. The bracketed contents of a regular entry are a citation key, followed by a comma
//!    separated list of fields (possibly none), followed by an optional comma.
//!    ```ignore
//!    fields = _{ (ign ~ "," ~ ign ~ field)* ~ ign ~ ","? ~ ign }
//!    entry_regular = { entry_type ~ ign ~ ("{" ~ ign ~ citekey_curly ~ fields ~ "}" | "(" ~ ign ~ citekey_round ~ fields ~ ")") }
//!    ```
//!
//! ### Bibliography
//! 1. An entry is any one of the above cases preceded by an `@` symbol. The special entry types
//!    are matched ASCII case-insensitively. A special entry with malformed contents is an error,
//!    rather than a regular entry.
//!    ```ignore
//!    entry = { "@" ~ ign ~ (entry_comment | entry_preamble | entry_macro | entry_regular) }
//!    ```
//! 2. A bibliography is a possibly empty list of entries, separated by junk characters.
//!    ```ignore
//!    bibliography = { SOI ~ junk ~ (entry ~ junk)* ~ EOI }
//!    ```
use pest::Parser;
use pest_derive::Parser;

/// A simple automatically derived pest parser.
#[derive(Parser)]
#[grammar = "syntax/bibtex.pest"] // relative to src
pub struct BibtexParser;

/// A syntax error reported by the pest grammar.
pub type SyntaxError = pest::error::Error<Rule>;

/// Counts of the `@` blocks in a syntactically valid bibliography.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Every `@` block, including comments, preambles and macros.
    pub blocks: usize,
    /// Regular entries only.
    pub regular: usize,
}

/// Check `input` against the grammar.
pub fn validate(input: &str) -> Result<Summary, Box<SyntaxError>> {
    let bibliography = BibtexParser::parse(Rule::bibliography, input)?;

    let mut summary = Summary::default();
    for entry in bibliography.flatten().filter(|pair| pair.as_rule() == Rule::entry) {
        summary.blocks += 1;
        if entry
            .into_inner()
            .any(|pair| pair.as_rule() == Rule::entry_regular)
        {
            summary.regular += 1;
        }
    }
    Ok(summary)
}
