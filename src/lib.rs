// Parsing
mod parser;
pub use parser::AsmParser;
mod air;
pub use air::{Air, AirStmt, Operands, Target};
mod parse;
mod lexer;

// Shared data
mod opcode;
pub use opcode::{Mode, Opcode, OpcodeTable};
mod symbol;
pub use symbol::{Register, SymbolEntry, SymbolKind, SymbolTable};
mod span;
pub use span::{Idx, Span};
mod token;
pub use token::Token;

mod error;
pub use error::AsmError;

pub mod env;

/// Amount of lines to show as context, each side of focus line (line containing span).
pub const DIAGNOSTIC_CONTEXT_LINES: usize = 2;

/// Assemble source text into a raw ROM image.
pub fn assemble(src: &str) -> Result<Vec<u8>, AsmError> {
    let table = OpcodeTable::new();
    assemble_with(src, &table)
}

/// Assemble using a caller-owned opcode registry, for callers assembling many files.
pub fn assemble_with(src: &str, table: &OpcodeTable) -> Result<Vec<u8>, AsmError> {
    let air = AsmParser::new(src, table).parse()?;
    air.emit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_then_branch_back() {
        let rom = assemble("LOOP: LD A, #$05\nBRA LOOP").unwrap();
        assert_eq!(rom, [0x80, 0x00, 0x05, 0x20, 0xFC]);
    }

    #[test]
    fn add_registers() {
        assert_eq!(assemble("ADD A, B").unwrap(), [0x90, 0x00, 0x01]);
    }

    #[test]
    fn unknown_symbol_line() {
        let err = assemble("INC A\n\n; comment\nLD A, MISSING").unwrap_err();
        assert!(matches!(err, AsmError::UnknownSymbol { ref name, .. } if name == "MISSING"));
        assert_eq!(err.line(), 4);
    }

    #[test]
    fn deterministic() {
        let src = include_str!("../tests/files/count.asm");
        let first = assemble(src).unwrap();
        assert_eq!(first, assemble(src).unwrap());
        assert_eq!(first.len(), AsmParser::new(src, &OpcodeTable::new()).parse().unwrap().size());
    }

    #[test]
    fn forward_branch() {
        // BEQ at 0, INC at 2, DEC at 4
        let rom = assemble("BEQ skip\nINC A\nskip: DEC A").unwrap();
        assert_eq!(rom, [0x24, 0x03, 0xA0, 0x00, 0xA1, 0x00]);
    }

    #[test]
    fn self_branch_anywhere() {
        let rom = assemble("BRA *\nINC B\nBNE *\nADD C, D\nbeq *").unwrap();
        assert_eq!(rom[1], 0xFF);
        assert_eq!(rom[5], 0xFF);
        assert_eq!(rom[10], 0xFF);
    }

    #[test]
    fn store_to_constant() {
        let rom = assemble("OUT CONST $FE\nST B, OUT\nLD c, $7").unwrap();
        assert_eq!(rom, [0x82, 0x01, 0xFE, 0x81, 0x02, 0x07]);
    }

    #[test]
    fn branch_range_backwards() {
        // LD + 62 INC puts the branch opcode at 127: 0 - 128
        let fits = "top: LD A, #$00\n".to_string() + &"INC A\n".repeat(62) + "BRA top";
        let rom = assemble(&fits).unwrap();
        assert_eq!(rom.len(), 129);
        assert_eq!(rom[128], 0x80);

        // 64 INC puts it at 128: 0 - 129
        let too_far = "top: ".to_string() + &"INC A\n".repeat(64) + "BRA top";
        let err = assemble(&too_far).unwrap_err();
        assert!(matches!(err, AsmError::BranchOutOfRange { offset: -129, line: 65, .. }));
    }

    #[test]
    fn long_rom() {
        let rom = assemble(&"LD A, #$00\n".repeat(86)).unwrap();
        assert_eq!(rom.len(), 258);
        assert_eq!(rom[255..], [0x80, 0x00, 0x00]);
    }

    #[test]
    fn branch_range_forwards() {
        // Target 128 from a branch at 0: 128 - 1
        let fits = "BRA far\n".to_string() + &"LD A, #$00\n".repeat(42) + "far: INC A";
        let rom = assemble(&fits).unwrap();
        assert_eq!(rom[..2], [0x20, 0x7F]);

        // Target 129
        let too_far =
            "BRA far\n".to_string() + &"LD A, #$00\n".repeat(41) + "INC A\nINC A\nfar: INC A";
        let err = assemble(&too_far).unwrap_err();
        assert!(matches!(err, AsmError::BranchOutOfRange { offset: 128, line: 1, .. }));
    }
}
