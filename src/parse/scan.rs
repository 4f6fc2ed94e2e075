//! Byte-level scanners used by the grammar.
//!
//! Every scanner takes the input and a byte position, and returns a new position. All of the cuts
//! are performed immediately before or after an ascii byte, so the positions are always valid char
//! boundaries of the input.
use memchr::{memchr, memchr2_iter, memchr3_iter};

/// Lookup table for bytes which could appear in an identifier, i.e. an entry type, field name,
/// macro name, or bare value token. This includes the ascii printable characters with
/// `{}(),=\#%"` removed, as well as bytes that could appear in non-ascii UTF-8.
pub(crate) static IDENTIFIER_ALLOWED: [bool; 256] = {
    const PR: bool = false; // disallowed printable bytes
    const CT: bool = false; // non-printable ascii
    const __: bool = true; // permitted bytes
    [
        //   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
        CT, CT, CT, CT, CT, CT, CT, CT, CT, CT, CT, CT, CT, CT, CT, CT, // 0
        CT, CT, CT, CT, CT, CT, CT, CT, CT, CT, CT, CT, CT, CT, CT, CT, // 1
        CT, __, PR, PR, __, PR, __, __, PR, PR, __, __, PR, __, __, __, // 2
        __, __, __, __, __, __, __, __, __, __, __, __, __, PR, __, __, // 3
        __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 4
        __, __, __, __, __, __, __, __, __, __, __, __, PR, __, __, __, // 5
        __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 6
        __, __, __, __, __, __, __, __, __, __, __, PR, __, PR, __, CT, // 7
        __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 8
        __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 9
        __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // A
        __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // B
        __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // C
        __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // D
        __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // E
        __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // F
    ]
};

/// Bytes which may appear in a citation key of an entry whose body is closed by `close`: anything
/// except `,`, ascii whitespace, ascii control characters, and the body delimiters. Inside a
/// `{...}` body both curly brackets are excluded; inside a `(...)` body only `)` is.
#[inline]
fn is_citekey_byte(b: u8, close: u8) -> bool {
    let delimiter = match close {
        b'}' => b == b'{' || b == b'}',
        _ => b == close,
    };
    b != b',' && !delimiter && !b.is_ascii_whitespace() && !b.is_ascii_control()
}

/// Errors from the delimited text scanners, with byte positions into the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    /// Hit the end of input before the closing delimiter.
    Unterminated,
    /// Found a closing bracket with no matching opening bracket.
    UnexpectedClosingBracket(usize),
}

/// Skip junk characters between entries.
///
/// Returns the position of the next `@` which starts an entry, or `None` if we hit EOF. A `%`
/// comments out the rest of its line, including any `@` in it.
pub fn next_entry(input: &str, mut pos: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    while pos < bytes.len() {
        match bytes[pos] {
            b'@' => return Some(pos),
            b'%' => match memchr(b'\n', &bytes[pos..]) {
                // skip the `\n`
                Some(offset) => pos += offset + 1,
                None => return None,
            },
            _ => pos += 1,
        }
    }
    None
}

/// Skip whitespace and `%` comments within entries.
///
/// Note that this follows the same convention as the built-in `u8::is_ascii_whitespace`
/// and in particular unlike biber does not consider U+000B VERTICAL TAB to be whitespace.
pub fn comment(input: &str, mut pos: usize) -> usize {
    let bytes = input.as_bytes();
    while pos < bytes.len() {
        match bytes[pos] {
            b'\t' | b'\n' | b'\x0C' | b'\r' | b' ' => pos += 1,
            b'%' => match memchr(b'\n', &bytes[pos..]) {
                Some(offset) => pos += offset + 1,
                None => return bytes.len(),
            },
            _ => return pos,
        }
    }
    bytes.len()
}

/// Consume identifier bytes. The returned position equals `start` if there are none.
pub fn identifier(input: &str, start: usize) -> usize {
    let bytes = input.as_bytes();
    let mut end = start;
    while end < bytes.len() && IDENTIFIER_ALLOWED[bytes[end] as usize] {
        end += 1;
    }
    end
}

/// Consume citation key bytes inside a body closed by `close`. The returned position equals
/// `start` if there are none.
pub fn citekey(input: &str, start: usize, close: u8) -> usize {
    let bytes = input.as_bytes();
    let mut end = start;
    while end < bytes.len() && is_citekey_byte(bytes[end], close) {
        end += 1;
    }
    end
}

/// Consume a string with balanced brackets, until the string becomes unbalanced.
///
/// Returns the position of the unbalanced closing `}`.
pub fn balanced(input: &str, start: usize) -> Result<usize, ScanError> {
    let mut bracket_depth = 0;

    for offset in memchr2_iter(b'{', b'}', &input.as_bytes()[start..]) {
        let end = start + offset;
        if input.as_bytes()[end] == b'{' {
            bracket_depth += 1;
        } else {
            // found the closing bracket
            if bracket_depth == 0 {
                return Ok(end);
            }
            bracket_depth -= 1;
        }
    }

    Err(ScanError::Unterminated)
}

/// Consume a string with balanced brackets, terminating when we hit a top-level byte `until`.
///
/// Returns the position of the terminating byte. `until` must be ascii.
pub fn protected(until: u8) -> impl Fn(&str, usize) -> Result<usize, ScanError> {
    debug_assert!(until.is_ascii());

    move |input: &str, start: usize| {
        let bytes = input.as_bytes();
        let mut bracket_depth = 0;

        for offset in memchr3_iter(until, b'{', b'}', &bytes[start..]) {
            let end = start + offset;
            match bytes[end] {
                b if b == until => {
                    if bracket_depth == 0 {
                        return Ok(end);
                    }
                }
                b'{' => bracket_depth += 1,
                _ => {
                    if bracket_depth == 0 {
                        return Err(ScanError::UnexpectedClosingBracket(end));
                    }
                    bracket_depth -= 1;
                }
            }
        }

        Err(ScanError::Unterminated)
    }
}
