//! Mapping from symbol names to 16-bit addresses.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::parsing::Span;

/// The first address handed out to variables.
pub const VARIABLE_BASE_ADDRESS: u16 = 0x10;

/// The highest address an addressing instruction can load.
pub const MAX_ADDRESS: u16 = 0x7FFF;

lazy_static! {
    /// Symbols every program can reference without defining them.
    pub static ref PREDEFINED_SYMBOLS: Vec<(String, u16)> = {
        let mut symbols: Vec<(String, u16)> = vec![
            ("SP".into(), 0x0000),
            ("LCL".into(), 0x0001),
            ("ARG".into(), 0x0002),
            ("THIS".into(), 0x0003),
            ("THAT".into(), 0x0004),
            ("SCREEN".into(), 0x4000),
            ("KBD".into(), 0x6000),
        ];

        for register in 0..16u16 {
            symbols.push((format!("R{}", register), register));
        }

        symbols
    };
}

/// Describes how a symbol got its address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Built-in symbol such as `SCREEN` or `R7`.
    Predefined,
    /// Declared with `(NAME)` and bound to an instruction address.
    Label,
    /// Allocated a data address on its first reference.
    Variable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolInfo {
    pub address: u16,
    pub kind: SymbolKind,
    /// Span of the label declaration, if the symbol is a label.
    pub defined: Option<Span>,
}

/// Symbol names are case-sensitive. A name is bound at most once for the lifetime of the table.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    inner: HashMap<String, SymbolInfo>,
    next_variable: u16,
}

impl Default for SymbolTable {
    fn default() -> SymbolTable {
        SymbolTable::new()
    }
}

impl SymbolTable {
    /// Creates a table preloaded with the [predefined symbols](PREDEFINED_SYMBOLS).
    pub fn new() -> SymbolTable {
        let inner = PREDEFINED_SYMBOLS
            .iter()
            .map(|(name, address)| {
                let info = SymbolInfo {
                    address: *address,
                    kind: SymbolKind::Predefined,
                    defined: None,
                };

                (name.clone(), info)
            })
            .collect();

        SymbolTable {
            inner,
            next_variable: VARIABLE_BASE_ADDRESS,
        }
    }

    /// Binds `label` to `address`.
    ///
    /// If the name is already bound the table is left untouched and the existing
    /// entry is returned as the error.
    pub fn define_label(&mut self, span: Span, label: &str, address: u16) -> Result<(), &SymbolInfo> {
        if self.inner.contains_key(label) {
            return Err(&self.inner[label]);
        }

        let info = SymbolInfo {
            address,
            kind: SymbolKind::Label,
            defined: Some(span),
        };

        self.inner.insert(label.to_string(), info);

        Ok(())
    }

    /// Returns the address bound to `name`, allocating the next free variable address for
    /// names that have not been seen yet.
    ///
    /// Returns `None` once every address up to [MAX_ADDRESS] has been handed out.
    pub fn get_or_allocate(&mut self, name: &str) -> Option<u16> {
        if let Some(info) = self.inner.get(name) {
            return Some(info.address);
        }

        let address = self.next_variable;

        if address > MAX_ADDRESS {
            return None;
        }

        self.next_variable = address.checked_add(1)?;

        let info = SymbolInfo {
            address,
            kind: SymbolKind::Variable,
            defined: None,
        };

        self.inner.insert(name.to_string(), info);

        Some(address)
    }

    pub fn get_symbol_by_label<S: AsRef<str>>(&self, label: S) -> Option<&SymbolInfo> {
        self.inner.get(label.as_ref())
    }

    /// Address of `label`, if it is bound.
    pub fn address_of<S: AsRef<str>>(&self, label: S) -> Option<u16> {
        self.get_symbol_by_label(label).map(|info| info.address)
    }

    pub fn contains<S: AsRef<str>>(&self, label: S) -> bool {
        self.inner.contains_key(label.as_ref())
    }

    /// The address the next variable will be allocated to.
    pub fn next_variable_address(&self) -> u16 {
        self.next_variable
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SymbolInfo)> {
        self.inner.iter().map(|(name, info)| (name.as_str(), info))
    }

    /// Copies every binding into a plain name to address map.
    pub fn to_map(&self) -> HashMap<String, u16> {
        self.inner
            .iter()
            .map(|(name, info)| (name.clone(), info.address))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predefined_symbols() {
        let table = SymbolTable::new();

        assert_eq!(table.address_of("SP"), Some(0));
        assert_eq!(table.address_of("THAT"), Some(4));
        assert_eq!(table.address_of("SCREEN"), Some(0x4000));
        assert_eq!(table.address_of("KBD"), Some(0x6000));
        assert_eq!(table.address_of("R0"), Some(0));
        assert_eq!(table.address_of("R15"), Some(15));
        assert_eq!(table.address_of("R16"), None);
        assert_eq!(table.address_of("sp"), None);
    }

    #[test]
    fn test_duplicate_label_keeps_first_binding() {
        let mut table = SymbolTable::new();

        assert_eq!(table.define_label(0..6, "LOOP", 0), Ok(()));

        let existing = table.define_label(10..16, "LOOP", 1).unwrap_err();
        assert_eq!(existing.address, 0);
        assert_eq!(existing.defined, Some(0..6));

        assert_eq!(table.address_of("LOOP"), Some(0));
    }

    #[test]
    fn test_label_cannot_shadow_predefined() {
        let mut table = SymbolTable::new();

        let existing = table.define_label(0..8, "SCREEN", 3).unwrap_err();
        assert_eq!(existing.kind, SymbolKind::Predefined);
        assert_eq!(table.address_of("SCREEN"), Some(0x4000));
    }

    #[test]
    fn test_variables_allocated_in_order() {
        let mut table = SymbolTable::new();

        assert_eq!(table.get_or_allocate("i"), Some(16));
        assert_eq!(table.get_or_allocate("sum"), Some(17));
        assert_eq!(table.get_or_allocate("i"), Some(16));
        assert_eq!(table.get_or_allocate("R3"), Some(3));
        assert_eq!(table.get_or_allocate("x"), Some(18));
        assert_eq!(table.next_variable_address(), 19);

        assert_eq!(
            table.get_symbol_by_label("sum").map(|info| info.kind),
            Some(SymbolKind::Variable)
        );
    }

    #[test]
    fn test_variables_exhausted() {
        let mut table = SymbolTable::new();

        for address in VARIABLE_BASE_ADDRESS..=MAX_ADDRESS {
            assert_eq!(table.get_or_allocate(&format!("v{}", address)), Some(address));
        }

        assert_eq!(table.get_or_allocate("overflow"), None);
        assert_eq!(table.get_or_allocate("overflow"), None);
        assert!(!table.contains("overflow"));

        assert_eq!(table.get_or_allocate("v16"), Some(16));
        assert_eq!(table.get_or_allocate("SCREEN"), Some(0x4000));
    }
}
