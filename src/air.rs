use crate::{
    error::AsmError,
    opcode::{Mode, Opcode},
    symbol::{Register, SymbolTable},
    token::Token,
};

/// Assembly intermediate representation: classified statements and the completed symbol table.
#[derive(Debug)]
pub struct Air<'a> {
    stmts: Vec<AirStmt<'a>>,
    symbols: SymbolTable,
    /// Final program counter, equal to the length of the emitted ROM
    size: usize,
}

impl<'a> Air<'a> {
    pub(crate) fn new(stmts: Vec<AirStmt<'a>>, symbols: SymbolTable, size: usize) -> Self {
        Air { stmts, symbols, size }
    }

    pub fn get(&self, idx: usize) -> &AirStmt<'a> {
        &self.stmts[idx]
    }

    /// Number of statements.
    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    /// Size of the ROM image in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Second pass: emit the ROM image, resolving branch targets against the completed table.
    pub fn emit(&self) -> Result<Vec<u8>, AsmError> {
        let mut rom = Vec::with_capacity(self.size);
        for stmt in &self.stmts {
            // Program counter is the running output length
            let pc = rom.len();
            debug_assert_eq!(pc, stmt.addr, "passes out of step on line {}", stmt.line);

            rom.push(stmt.opcode.code);
            match stmt.operands {
                Operands::None => {}
                Operands::Reg(reg) => rom.push(reg.index()),
                Operands::RegPair(first, second) => rom.extend([first.index(), second.index()]),
                Operands::RegImm(reg, imm) => rom.extend([reg.index(), imm]),
                Operands::RegAddr(reg, addr) => rom.extend([reg.index(), addr]),
                Operands::Addr(addr) => rom.push(addr),
                Operands::Branch(target) => rom.push(self.branch_offset(pc, target)?),
            }
            debug_assert_eq!(rom.len(), pc + stmt.opcode.size as usize);
        }
        Ok(rom)
    }

    /// Offset is taken from the byte following the opcode, so `*` is always -1.
    fn branch_offset(&self, pc: usize, target: Target<'_>) -> Result<u8, AsmError> {
        let tok = match target {
            Target::Here => return Ok(-1i8 as u8),
            Target::Symbol(tok) => tok,
        };
        let Some(dest) = self.symbols.get(tok.val) else {
            return Err(AsmError::UnknownSymbol {
                name: tok.val.to_string(),
                line: tok.line,
                span: tok.span.into(),
            });
        };
        let offset = dest as i32 - (pc as i32 + 1);
        match i8::try_from(offset) {
            Ok(offset) => Ok(offset as u8),
            Err(_) => Err(AsmError::BranchOutOfRange {
                target: tok.val.to_string(),
                offset,
                line: tok.line,
                span: tok.span.into(),
            }),
        }
    }
}

/// Single classified instruction.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AirStmt<'a> {
    /// 1-based source line
    pub line: usize,
    /// Address of the opcode byte
    pub addr: usize,
    pub opcode: Opcode,
    pub operands: Operands<'a>,
}

impl AirStmt<'_> {
    pub fn mode(&self) -> Mode {
        self.opcode.mode
    }
}

/// Operand values as they will be encoded after the opcode byte.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Operands<'a> {
    None,
    /// `INC A`
    Reg(Register),
    /// `ADD A, B`
    RegPair(Register, Register),
    /// `LD A, #$05`
    RegImm(Register, u8),
    /// `LD A, $80` or `ST A, symbol`
    RegAddr(Register, u8),
    /// Address without a register
    Addr(u8),
    /// Relative branch, resolved during emission
    Branch(Target<'a>),
}

impl Operands<'_> {
    /// Number of bytes the operands occupy after the opcode byte.
    pub fn len(&self) -> usize {
        match self {
            Operands::None => 0,
            Operands::Reg(_) | Operands::Addr(_) | Operands::Branch(_) => 1,
            Operands::RegPair(..) | Operands::RegImm(..) | Operands::RegAddr(..) => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Target<'a> {
    /// `*`
    Here,
    Symbol(Token<'a>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        opcode::OpcodeTable,
        span::{Idx, Span},
        symbol::{SymbolEntry, SymbolKind},
    };

    fn tok(val: &str) -> Token<'_> {
        Token { val, span: Span::new(Idx(0), val.len()), line: 1 }
    }

    fn branch(addr: usize, target: Target<'_>) -> AirStmt<'_> {
        let opcode = OpcodeTable::new().get("BRA", Mode::Relative).unwrap();
        AirStmt { line: 1, addr, opcode, operands: Operands::Branch(target) }
    }

    fn with_label(name: &str, value: u8) -> SymbolTable {
        let mut symbols = SymbolTable::new();
        let entry = SymbolEntry { value, kind: SymbolKind::Label, line: 1 };
        symbols.insert(name, entry).unwrap();
        symbols
    }

    #[test]
    fn emit_register_forms() {
        let table = OpcodeTable::new();
        let stmts = vec![
            AirStmt {
                line: 1,
                addr: 0,
                opcode: table.get("ADD", Mode::RegisterPair).unwrap(),
                operands: Operands::RegPair(Register::A, Register::B),
            },
            AirStmt {
                line: 2,
                addr: 3,
                opcode: table.get("INC", Mode::Implied).unwrap(),
                operands: Operands::Reg(Register::P),
            },
        ];
        let air = Air::new(stmts, SymbolTable::new(), 5);
        assert_eq!(air.emit().unwrap(), [0x90, 0x00, 0x01, 0xA0, 0x0F]);
    }

    #[test]
    fn branch_to_self() {
        let air = Air::new(vec![branch(0, Target::Here)], SymbolTable::new(), 2);
        assert_eq!(air.emit().unwrap(), [0x20, 0xFF]);
    }

    #[test]
    fn branch_backwards_to_start() {
        // Target 0 from a branch at 0 is the same as `*`
        let air = Air::new(vec![branch(0, Target::Symbol(tok("top")))], with_label("top", 0), 2);
        assert_eq!(air.emit().unwrap(), [0x20, 0xFF]);
    }

    #[test]
    fn branch_unknown_target() {
        let air = Air::new(vec![branch(0, Target::Symbol(tok("nowhere")))], SymbolTable::new(), 2);
        assert!(matches!(
            air.emit(),
            Err(AsmError::UnknownSymbol { ref name, line: 1, .. }) if name == "nowhere"
        ));
    }

    #[test]
    fn operand_lengths() {
        assert_eq!(Operands::None.len(), 0);
        assert_eq!(Operands::Branch(Target::Here).len(), 1);
        assert_eq!(Operands::RegImm(Register::A, 5).len(), 2);
    }
}
