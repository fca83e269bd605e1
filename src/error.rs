use std::fmt;

use crate::constants::SNIPPET_RADIUS;

/// What went wrong. The absence of an error is modelled as
/// `Option::<ParseError>::None`, not as a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Structural violation: a byte the grammar does not allow here.
    Unexpected,
    /// The stream ended inside a container, string, or literal.
    Incomplete,
    /// The node arena or the container stack would exceed its bound.
    Capacity,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Unexpected => "unexpected input",
            ErrorKind::Incomplete => "incomplete document",
            ErrorKind::Capacity => "capacity exceeded",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parse failure at an absolute position in the logical byte stream.
///
/// `pos` counts from the first byte ever fed, across all chunks. `line`
/// is zero-based and counts `\n`/`\r` bytes seen in whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub pos: u64,
    pub line: u32,
}

impl ParseError {
    pub(crate) fn new(kind: ErrorKind, pos: u64, line: u32) -> Self {
        Self { kind, pos, line }
    }

    /// Render a diagnostic window around the error position with a caret.
    ///
    /// `source` must be the same logical stream the parser consumed (or at
    /// least a prefix covering the error position). Positions past the end
    /// of `source` produce a caret after the last byte.
    ///
    /// ```
    /// let err = flatjson::parse(b"{\"a\":}").unwrap_err();
    /// let snippet = err.snippet(b"{\"a\":}");
    /// assert_eq!(snippet, "{\"a\":}\n     ^");
    /// ```
    pub fn snippet(&self, source: &[u8]) -> String {
        let pos = (self.pos as usize).min(source.len());
        let start = pos.saturating_sub(SNIPPET_RADIUS);
        let end = (pos + SNIPPET_RADIUS).min(source.len());
        let window = &source[start..end];

        let mut out = String::with_capacity(window.len() * 2 + 8);
        for &byte in window {
            // Keep the caret column aligned: control bytes print as '.'.
            if byte.is_ascii_graphic() || byte == b' ' {
                out.push(byte as char);
            } else {
                out.push('.');
            }
        }
        out.push('\n');
        for _ in 0..pos - start {
            out.push(' ');
        }
        out.push('^');
        out
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at byte {} (line {})",
            self.kind,
            self.pos,
            self.line + 1
        )
    }
}

impl std::error::Error for ParseError {}
