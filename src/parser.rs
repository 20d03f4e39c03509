use crate::{
    air::{Air, AirStmt, Operands, Target},
    error::AsmError,
    lexer::{self, OperandKind},
    opcode::{Mode, Opcode, OpcodeTable},
    parse::{self, Instr, SourceLine},
    symbol::{Register, SymbolEntry, SymbolKind, SymbolTable},
    token::Token,
};

/// Builds the symbol table and classifies every instruction (first pass).
pub struct AsmParser<'a, 't> {
    /// Preprocessed, non-blank source lines
    lines: Vec<SourceLine<'a>>,
    /// Opcode registry shared with the caller
    table: &'t OpcodeTable,
    symbols: SymbolTable,
    /// Address of the next instruction
    pc: usize,
}

impl<'a, 't> AsmParser<'a, 't> {
    pub fn new(src: &'a str, table: &'t OpcodeTable) -> Self {
        AsmParser {
            lines: parse::preprocess(src),
            table,
            symbols: SymbolTable::new(),
            pc: 0,
        }
    }

    /// Walk every line once, defining symbols and sizing instructions.
    /// Only branch targets may refer to symbols defined further down.
    pub fn parse(mut self) -> Result<Air<'a>, AsmError> {
        let lines = std::mem::take(&mut self.lines);
        let mut stmts = Vec::new();

        for line in lines {
            // Constants consume no space
            let konst = line.instr.and_then(|instr| {
                lexer::const_def(instr.val).map(|(name, value)| (instr, name, value))
            });
            if let Some((instr, name, value)) = konst {
                let name = Token::within(instr.val, instr.span.offs(), name, line.line);
                self.define(name, value, SymbolKind::Const)?;
            }

            if let Some(label) = line.label {
                // Label values must fit in a byte
                let Ok(addr) = u8::try_from(self.pc) else {
                    return Err(AsmError::LabelOutOfRange {
                        name: label.val.to_string(),
                        addr: self.pc,
                        line: line.line,
                        span: label.span.into(),
                    });
                };
                self.define(label, addr, SymbolKind::Label)?;
            }

            let Some(instr) = line.instr else { continue };
            if konst.is_some() {
                continue;
            }

            let instr = parse::split_instr(instr);
            let (opcode, operands) = self.classify(&instr)?;
            stmts.push(AirStmt {
                line: line.line,
                addr: self.pc,
                opcode,
                operands,
            });

            self.pc += opcode.size as usize;
        }

        Ok(Air::new(stmts, self.symbols, self.pc))
    }

    fn define(&mut self, name: Token<'a>, value: u8, kind: SymbolKind) -> Result<(), AsmError> {
        // A register name could never be referenced as a symbol
        if !lexer::is_symbol(name.val) || name.val.parse::<Register>().is_ok() {
            return Err(malformed(&name));
        }
        let entry = SymbolEntry {
            value,
            kind,
            line: name.line,
        };
        match self.symbols.insert(name.val, entry) {
            Ok(()) => Ok(()),
            Err(first) => {
                let (name, line, span, first) =
                    (name.val.to_string(), name.line, name.span.into(), first.line);
                Err(match kind {
                    SymbolKind::Const => AsmError::DuplicateSymbol { name, line, span, first },
                    SymbolKind::Label => AsmError::DuplicateLabel { name, line, span, first },
                })
            }
        }
    }

    /// Determine the addressing mode of an instruction and resolve its operands.
    fn classify(&self, instr: &Instr<'a>) -> Result<(Opcode, Operands<'a>), AsmError> {
        let mnem = instr.mnemonic.val.to_ascii_uppercase();
        match instr.operands.as_slice() {
            [] => match self.table.get(&mnem, Mode::Implied) {
                Some(opcode) if opcode.operand_len() == 0 => Ok((opcode, Operands::None)),
                _ => Err(AsmError::MissingOperand {
                    mnemonic: mnem,
                    line: instr.text.line,
                    span: instr.text.span.into(),
                }),
            },
            [op] => {
                let operands = match lexer::classify(op.val) {
                    // Only single register instructions like INC, DEC
                    OperandKind::Reg(reg) => Operands::Reg(reg),
                    OperandKind::Symbol(_) if self.table.is_branch(&mnem) => {
                        Operands::Branch(Target::Symbol(*op))
                    }
                    OperandKind::Here if self.table.is_branch(&mnem) => {
                        Operands::Branch(Target::Here)
                    }
                    OperandKind::Symbol(_) => Operands::Addr(self.resolve(op)?),
                    _ => return Err(malformed(op)),
                };
                self.expect(instr, &mnem, operands)
            }
            [first, second] => {
                // Register form: first operand is always the register
                let OperandKind::Reg(reg) = lexer::classify(first.val) else {
                    return Err(malformed(first));
                };
                let operands = match lexer::classify(second.val) {
                    OperandKind::Reg(src) => Operands::RegPair(reg, src),
                    OperandKind::Imm(imm) => Operands::RegImm(reg, imm),
                    OperandKind::Addr(addr) => Operands::RegAddr(reg, addr),
                    OperandKind::Symbol(_) => Operands::RegAddr(reg, self.resolve(second)?),
                    OperandKind::Here | OperandKind::Unknown => return Err(malformed(second)),
                };
                self.expect(instr, &mnem, operands)
            }
            [_, _, extra, ..] => Err(AsmError::TooManyOperands {
                mnemonic: mnem,
                line: extra.line,
                span: extra.span.into(),
            }),
        }
    }

    /// Look up the opcode for the operand shape. The registry entry must have room for exactly
    /// these operand bytes, so both passes agree on the instruction size.
    fn expect(
        &self,
        instr: &Instr<'a>,
        mnem: &str,
        operands: Operands<'a>,
    ) -> Result<(Opcode, Operands<'a>), AsmError> {
        let mode = mode_of(&operands);
        match self.table.get(mnem, mode) {
            Some(opcode) if opcode.operand_len() == operands.len() => Ok((opcode, operands)),
            _ => Err(AsmError::UnsupportedAddressingMode {
                mnemonic: mnem.to_string(),
                mode,
                line: instr.text.line,
                span: instr.text.span.into(),
            }),
        }
    }

    /// Value of a symbol that must already be defined.
    fn resolve(&self, tok: &Token<'a>) -> Result<u8, AsmError> {
        self.symbols.get(tok.val).ok_or_else(|| AsmError::UnknownSymbol {
            name: tok.val.to_string(),
            line: tok.line,
            span: tok.span.into(),
        })
    }
}

fn mode_of(operands: &Operands<'_>) -> Mode {
    match operands {
        Operands::None | Operands::Reg(_) => Mode::Implied,
        Operands::RegPair(..) => Mode::RegisterPair,
        Operands::RegImm(..) => Mode::Immediate,
        Operands::RegAddr(..) | Operands::Addr(_) => Mode::Direct,
        Operands::Branch(_) => Mode::Relative,
    }
}

fn malformed(tok: &Token<'_>) -> AsmError {
    AsmError::MalformedOperand {
        token: tok.val.to_string(),
        line: tok.line,
        span: tok.span.into(),
    }
}
