use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::opcode::Mode;

/// Terminal assembly error. The first one encountered aborts the run.
#[derive(Error, Diagnostic, Clone, PartialEq, Eq, Debug)]
pub enum AsmError {
    #[error("Line {line}: duplicate symbol '{name}'")]
    #[diagnostic(
        code(asm::duplicate_symbol),
        help("labels and constants share one namespace, rename one of them")
    )]
    DuplicateSymbol {
        name: String,
        line: usize,
        #[label("already defined on line {first}")]
        span: SourceSpan,
        first: usize,
    },

    #[error("Line {line}: duplicate label '{name}'")]
    #[diagnostic(
        code(asm::duplicate_label),
        help("prefix labels are only allowed once per file")
    )]
    DuplicateLabel {
        name: String,
        line: usize,
        #[label("already defined on line {first}")]
        span: SourceSpan,
        first: usize,
    },

    #[error("Line {line}: unknown symbol '{name}'")]
    #[diagnostic(
        code(asm::unknown_symbol),
        help("only branch targets may be defined after they are used")
    )]
    UnknownSymbol {
        name: String,
        line: usize,
        #[label("not defined")]
        span: SourceSpan,
    },

    #[error("Line {line}: missing operand for {mnemonic}")]
    #[diagnostic(code(asm::missing_operand), help("check the operands for this instruction"))]
    MissingOperand {
        mnemonic: String,
        line: usize,
        #[label("expects an operand")]
        span: SourceSpan,
    },

    #[error("Line {line}: malformed operand '{token}'")]
    #[diagnostic(
        code(asm::malformed_operand),
        help("operands are registers A-P, immediates like #$3F, addresses like $80, or symbols")
    )]
    MalformedOperand {
        token: String,
        line: usize,
        #[label("malformed operand")]
        span: SourceSpan,
    },

    #[error("Line {line}: {mnemonic} does not support {mode} addressing")]
    #[diagnostic(
        code(asm::unsupported_mode),
        help("check the list of available instructions in the documentation")
    )]
    UnsupportedAddressingMode {
        mnemonic: String,
        mode: Mode,
        line: usize,
        #[label("unsupported addressing mode")]
        span: SourceSpan,
    },

    #[error("Line {line}: too many operands for {mnemonic}")]
    #[diagnostic(code(asm::too_many_operands), help("instructions take at most two operands"))]
    TooManyOperands {
        mnemonic: String,
        line: usize,
        #[label("unexpected operand")]
        span: SourceSpan,
    },

    #[error("Line {line}: branch target too far: {offset}")]
    #[diagnostic(
        code(asm::branch_range),
        help("branch offsets must lie between -128 and 127")
    )]
    BranchOutOfRange {
        target: String,
        offset: i32,
        line: usize,
        #[label("offset {offset} out of range")]
        span: SourceSpan,
    },

    #[error("Line {line}: label '{name}' at address {addr} does not fit in 8 bits")]
    #[diagnostic(
        code(asm::label_out_of_range),
        help("labels can only be defined within the first 256 bytes of the program")
    )]
    LabelOutOfRange {
        name: String,
        addr: usize,
        line: usize,
        #[label("defined past address $FF")]
        span: SourceSpan,
    },
}

impl AsmError {
    /// 1-based source line the error was raised on.
    pub fn line(&self) -> usize {
        match self {
            AsmError::DuplicateSymbol { line, .. }
            | AsmError::DuplicateLabel { line, .. }
            | AsmError::UnknownSymbol { line, .. }
            | AsmError::MissingOperand { line, .. }
            | AsmError::MalformedOperand { line, .. }
            | AsmError::UnsupportedAddressingMode { line, .. }
            | AsmError::TooManyOperands { line, .. }
            | AsmError::BranchOutOfRange { line, .. }
            | AsmError::LabelOutOfRange { line, .. } => *line,
        }
    }
}
