use crate::span::Span;

/// Represents a single "word" inside a line of source code.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Token<'a> {
    // Text of the token, borrowed from the source
    pub val: &'a str,
    // Location of the token inside the source
    pub span: Span,
    // Line number inside the file
    pub line: usize,
}

impl<'a> Token<'a> {
    /// Token for `sub`, which must be a subslice of `line_text` starting at `line_offs`.
    pub fn within(line_text: &'a str, line_offs: usize, sub: &'a str, line: usize) -> Self {
        Token {
            val: sub,
            span: Span::within(line_text, line_offs, sub),
            line,
        }
    }
}
