use lazy_static::lazy_static;
use regex::Regex;

use crate::symbol::Register;

lazy_static! {
    static ref HEX_IMM: Regex = Regex::new(r"^#\$([0-9A-Fa-f]{1,2})$").unwrap();
    static ref HEX_BYTE: Regex = Regex::new(r"^\$([0-9A-Fa-f]{1,2})$").unwrap();
    static ref SYMBOL: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    static ref CONST_DEF: Regex =
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s+(?i:CONST|EQU)\s+\$([0-9A-Fa-f]{1,2})$").unwrap();
}

/// Classified operand token.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OperandKind<'a> {
    Reg(Register),
    /// `#$hh`
    Imm(u8),
    /// `$hh`
    Addr(u8),
    /// Label or constant name
    Symbol(&'a str),
    /// `*`, the address of the current instruction
    Here,
    Unknown,
}

/// Classify a single trimmed operand. Register names take priority over symbols.
pub fn classify(tok: &str) -> OperandKind<'_> {
    if let Ok(reg) = tok.parse::<Register>() {
        return OperandKind::Reg(reg);
    }
    if let Some(caps) = HEX_IMM.captures(tok) {
        return OperandKind::Imm(hex_byte(&caps[1]));
    }
    if let Some(caps) = HEX_BYTE.captures(tok) {
        return OperandKind::Addr(hex_byte(&caps[1]));
    }
    if tok == "*" {
        return OperandKind::Here;
    }
    if is_symbol(tok) {
        return OperandKind::Symbol(tok);
    }
    OperandKind::Unknown
}

pub fn is_symbol(tok: &str) -> bool {
    SYMBOL.is_match(tok)
}

/// Match `NAME CONST $hh`, returning the name and its value.
pub fn const_def(instr: &str) -> Option<(&str, u8)> {
    let caps = CONST_DEF.captures(instr)?;
    let name = caps.get(1)?.as_str();
    Some((name, hex_byte(&caps[2])))
}

// Regex guarantees 1-2 hex digits
fn hex_byte(digits: &str) -> u8 {
    u8::from_str_radix(digits, 16).unwrap_or_default()
}
