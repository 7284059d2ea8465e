//! Source location tracking for error reporting.
//!
//! Provides [`Span`] to track where unbound expressions and errors occur in
//! source code.

use std::fmt;

/// A span of source code, represented by its starting position.
///
/// `Span::default()` (line 0) means the position is unknown, which is what
/// synthesized nodes such as desugared operator calls carry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    /// Create a new span from a line, column, and length.
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    /// Whether this span points at a real source position.
    #[inline]
    pub fn is_known(&self) -> bool {
        self.line != 0
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "{}:{}", self.line, self.col)
        } else {
            f.write_str("<unknown>")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_display() {
        let span = Span::new(3, 15, 5);
        assert_eq!(format!("{}", span), "3:15");
    }

    #[test]
    fn default_span_is_unknown() {
        assert!(!Span::default().is_known());
        assert!(Span::point(1, 1).is_known());
        assert_eq!(Span::default().to_string(), "<unknown>");
    }
}
