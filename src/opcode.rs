//! MightyController opcode registry.

use std::fmt;

use fxhash::FxHashMap;

/// Operand encoding shape of an instruction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Mode {
    /// Register operand only, e.g. `INC A`
    Implied,
    /// Register and literal byte, e.g. `LD A, #$50`
    Immediate,
    /// Register and resolved address, e.g. `LD A, $80`
    Direct,
    /// Two registers, e.g. `ADD A, B`
    RegisterPair,
    /// Signed offset from the branch, e.g. `BRA loop`
    Relative,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Implied => "implied",
            Mode::Immediate => "immediate",
            Mode::Direct => "direct",
            Mode::RegisterPair => "register-pair",
            Mode::Relative => "relative",
        };
        f.write_str(name)
    }
}

/// Single entry in the opcode registry.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Opcode {
    pub code: u8,
    /// Encoded size in bytes, opcode byte included.
    pub size: u8,
    pub mode: Mode,
}

impl Opcode {
    const fn new(code: u8, mode: Mode) -> Self {
        let size = match mode {
            Mode::Implied | Mode::Relative => 2,
            Mode::Immediate | Mode::Direct | Mode::RegisterPair => 3,
        };
        Opcode { code, size, mode }
    }

    /// Number of bytes following the opcode byte.
    pub fn operand_len(&self) -> usize {
        self.size as usize - 1
    }
}

/// Mnemonics that take a relative branch target. Not all of them are implemented by the CPU.
const BRANCHES: [&str; 9] = ["BRA", "BNE", "BEQ", "BCC", "BCS", "BPL", "BMI", "BVC", "BVS"];

const OPCODES: [(&str, Opcode); 13] = [
    // Load/store
    ("LD", Opcode::new(0x80, Mode::Immediate)),
    ("LD", Opcode::new(0x81, Mode::Direct)),
    ("ST", Opcode::new(0x82, Mode::Direct)),
    // Branches
    ("BRA", Opcode::new(0x20, Mode::Relative)),
    ("BNE", Opcode::new(0x23, Mode::Relative)),
    ("BEQ", Opcode::new(0x24, Mode::Relative)),
    // Single register ALU
    ("INC", Opcode::new(0xA0, Mode::Implied)),
    ("DEC", Opcode::new(0xA1, Mode::Implied)),
    // Two register ALU
    ("ADD", Opcode::new(0x90, Mode::RegisterPair)),
    ("SUB", Opcode::new(0x91, Mode::RegisterPair)),
    ("AND", Opcode::new(0x92, Mode::RegisterPair)),
    ("OR", Opcode::new(0x93, Mode::RegisterPair)),
    ("XOR", Opcode::new(0x94, Mode::RegisterPair)),
];

/// Read-only lookup of `(mnemonic, mode)` to opcode. Build once and share by reference.
#[derive(Debug)]
pub struct OpcodeTable {
    /// Mnemonic -> addressing mode -> opcode
    opcodes: FxHashMap<&'static str, FxHashMap<Mode, Opcode>>,
}

impl OpcodeTable {
    pub fn new() -> Self {
        let mut opcodes: FxHashMap<&'static str, FxHashMap<Mode, Opcode>> = FxHashMap::default();
        for (mnem, op) in OPCODES {
            opcodes.entry(mnem).or_default().insert(op.mode, op);
        }
        OpcodeTable { opcodes }
    }

    /// Mnemonic must already be uppercase.
    pub fn get(&self, mnem: &str, mode: Mode) -> Option<Opcode> {
        self.opcodes.get(mnem)?.get(&mode).copied()
    }

    pub fn is_branch(&self, mnem: &str) -> bool {
        BRANCHES.contains(&mnem)
    }

    /// Number of `(mnemonic, mode)` entries.
    pub fn len(&self) -> usize {
        self.opcodes.values().map(|modes| modes.len()).sum()
    }
}

impl Default for OpcodeTable {
    fn default() -> Self {
        Self::new()
    }
}
