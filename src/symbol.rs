use std::str::FromStr;

use fxhash::FxBuildHasher;
use indexmap::IndexMap;

// Symbol -> resolved 8-bit value, kept in definition order
type FxMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Whether a symbol came from a `label:` prefix or a constant definition.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SymbolKind {
    Label,
    Const,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SymbolEntry {
    pub value: u8,
    pub kind: SymbolKind,
    /// Line the symbol was defined on
    pub line: usize,
}

/// Labels and constants share a single namespace. Lives for one assembly run.
#[derive(Default, Debug)]
pub struct SymbolTable {
    symbols: FxMap<String, SymbolEntry>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            symbols: IndexMap::with_hasher(FxBuildHasher::default()),
        }
    }

    /// Insert a new symbol, returning the existing entry if the name is taken.
    pub fn insert(&mut self, name: &str, entry: SymbolEntry) -> Result<(), SymbolEntry> {
        if let Some(existing) = self.symbols.get(name) {
            return Err(*existing);
        }
        self.symbols.insert(name.to_string(), entry);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<u8> {
        self.symbols.get(name).map(|entry| entry.value)
    }

    pub fn entry(&self, name: &str) -> Option<&SymbolEntry> {
        self.symbols.get(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SymbolEntry)> {
        self.symbols.iter().map(|(name, entry)| (name.as_str(), entry))
    }
}

/// Represents the CPU register file.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Register {
    A = 0,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
}

impl Register {
    /// Index of the register, as emitted into the ROM.
    pub fn index(self) -> u8 {
        self as u8
    }
}

impl FromStr for Register {
    type Err = ();

    // Register names are case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let reg = match s.to_ascii_uppercase().as_str() {
            "A" => Register::A,
            "B" => Register::B,
            "C" => Register::C,
            "D" => Register::D,
            "E" => Register::E,
            "F" => Register::F,
            "G" => Register::G,
            "H" => Register::H,
            "I" => Register::I,
            "J" => Register::J,
            "K" => Register::K,
            "L" => Register::L,
            "M" => Register::M,
            "N" => Register::N,
            "O" => Register::O,
            "P" => Register::P,
            _ => return Err(()),
        };
        Ok(reg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(value: u8, line: usize) -> SymbolEntry {
        SymbolEntry { value, kind: SymbolKind::Label, line }
    }

    #[test]
    fn register_indices() {
        assert_eq!("A".parse::<Register>().unwrap().index(), 0);
        assert_eq!("b".parse::<Register>().unwrap().index(), 1);
        assert_eq!("P".parse::<Register>().unwrap().index(), 15);
        assert!("Q".parse::<Register>().is_err());
        assert!("AB".parse::<Register>().is_err());
    }

    #[test]
    fn shared_namespace() {
        let mut table = SymbolTable::new();
        table.insert("loop", label(4, 1)).unwrap();
        let konst = SymbolEntry { value: 0x10, kind: SymbolKind::Const, line: 2 };
        assert_eq!(table.insert("loop", konst), Err(label(4, 1)));
        assert_eq!(table.get("loop"), Some(4));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn case_sensitive_names() {
        let mut table = SymbolTable::new();
        table.insert("Loop", label(0, 1)).unwrap();
        assert!(table.insert("loop", label(2, 2)).is_ok());
        assert_eq!(table.get("LOOP"), None);
        assert_eq!(table.get("loop"), Some(2));
    }

    #[test]
    fn definition_order() {
        let mut table = SymbolTable::new();
        table.insert("z", label(0, 1)).unwrap();
        table.insert("a", label(3, 2)).unwrap();
        let names: Vec<&str> = table.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["z", "a"]);
    }
}
