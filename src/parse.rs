use crate::token::Token;

/// Single non-blank source line with its comment removed.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SourceLine<'a> {
    /// 1-based line number
    pub line: usize,
    pub label: Option<Token<'a>>,
    pub instr: Option<Token<'a>>,
}

/// Mnemonic and its comma separated operands.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Instr<'a> {
    /// Whole instruction text
    pub text: Token<'a>,
    pub mnemonic: Token<'a>,
    pub operands: Vec<Token<'a>>,
}

/// Split source into lines, strip comments and separate `label:` prefixes.
/// Lines with neither label nor instruction are dropped; line numbers are kept.
pub fn preprocess(src: &str) -> Vec<SourceLine<'_>> {
    let mut lines = Vec::new();
    let mut offs = 0;
    for (i, raw) in src.split('\n').enumerate() {
        let text = raw.strip_suffix('\r').unwrap_or(raw);
        let line = split_line(text, offs, i + 1);
        if line.label.is_some() || line.instr.is_some() {
            lines.push(line);
        }
        offs += raw.len() + 1;
    }
    lines
}

/// Split a single line of text located at `offs` within the source.
pub fn split_line(text: &str, offs: usize, line: usize) -> SourceLine<'_> {
    // Get line without comment
    let code = match text.find(';') {
        Some(idx) => &text[..idx],
        None => text,
    };
    let (label, instr) = match code.split_once(':') {
        Some((label, rest)) => (
            non_empty(text, offs, label, line),
            non_empty(text, offs, rest, line),
        ),
        None => (None, non_empty(text, offs, code, line)),
    };

    SourceLine {
        line,
        label,
        instr,
    }
}

fn non_empty<'a>(text: &'a str, offs: usize, sub: &'a str, line: usize) -> Option<Token<'a>> {
    let sub = sub.trim();
    (!sub.is_empty()).then(|| Token::within(text, offs, sub, line))
}

/// Separate the mnemonic from its operands. Operands are split on commas and trimmed, so
/// `LD A,` yields an empty second operand.
pub fn split_instr(instr: Token<'_>) -> Instr<'_> {
    let text = instr.val;
    let offs = instr.span.offs();

    let (mnemonic, rest) = match text.find(char::is_whitespace) {
        Some(idx) => (&text[..idx], text[idx..].trim()),
        None => (text, ""),
    };
    let operands = if rest.is_empty() {
        Vec::new()
    } else {
        rest.split(',')
            .map(|op| Token::within(text, offs, op.trim(), instr.line))
            .collect()
    };

    Instr {
        text: instr,
        mnemonic: Token::within(text, offs, mnemonic, instr.line),
        operands,
    }
}
