use std::collections::HashMap;
use std::convert::TryFrom;
use std::fmt;

use itertools::Itertools;

use crate::instruction::{DecodeError, ResolvedInstruction};

use super::parser::{parse_hack_file, ParseError};

/// An assembled program: one word per instruction, starting from address 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub words: Vec<u16>,

    /// Final address of every symbol, including variables. Empty for programs read from
    /// `.hack` files.
    pub symbol_table: HashMap<String, u16>,
}

impl Program {
    /// Reads a program from the textual `.hack` format, one 16 digit binary word per line.
    pub fn parse(input: &str) -> Result<Program, ParseError> {
        parse_hack_file(input)
    }

    /// Decodes every word back into an instruction.
    pub fn decode(&self) -> impl Iterator<Item = Result<ResolvedInstruction, DecodeError>> + '_ {
        self.words.iter().map(|word| ResolvedInstruction::try_from(*word))
    }

    /// Labels and variables sorted by address. Predefined symbols are left out.
    pub fn user_symbols(&self) -> Vec<(&str, u16)> {
        use crate::symbol_table::PREDEFINED_SYMBOLS;

        self.symbol_table
            .iter()
            .filter(|(name, _)| !PREDEFINED_SYMBOLS.iter().any(|(predefined, _)| predefined == *name))
            .map(|(name, address)| (name.as_str(), *address))
            .sorted_by_key(|(name, address)| (*address, *name))
            .collect()
    }
}

/// Renders the program in the `.hack` format.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = self.words.iter().map(|word| format!("{:016b}", word)).join("\n");

        write!(f, "{}", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let program = Program {
            words: vec![2, 0b1110110000010000],
            symbol_table: HashMap::new(),
        };

        assert_eq!(program.to_string(), "0000000000000010\n1110110000010000");
    }

    #[test]
    fn test_decode() {
        let program = Program {
            words: vec![16, 0b1111110111001000, 0b1000000000000000],
            symbol_table: HashMap::new(),
        };

        let decoded: Vec<_> = program
            .decode()
            .map(|result| result.map(|instruction| instruction.to_string()))
            .collect();

        assert_eq!(
            decoded,
            vec![
                Ok("@16".to_string()),
                Ok("M=M+1".to_string()),
                Err(DecodeError { word: 0b1000000000000000 }),
            ]
        );
    }

    #[test]
    fn test_user_symbols() {
        let program = crate::symbolic::Program::parse("@x\n(LOOP)\n@LOOP\n@R0\n@SCREEN")
            .unwrap()
            .compile()
            .unwrap();

        assert_eq!(program.user_symbols(), vec![("LOOP", 1), ("x", 16)]);
    }
}
