use std::fmt;

use itertools::Itertools;
use slog::Logger;

use crate::bytecode;
use crate::compiler::WithSourceMap;
use crate::error::Error;
use crate::instruction::Instruction;
use crate::parsing::Span;
use crate::symbol_table::SymbolTable;

use super::parser::Parser;

#[derive(Clone, Debug, PartialEq)]
pub struct InstructionEntry {
    /// Labels bound to the address of this instruction.
    pub labels: Vec<String>,
    pub instruction: Instruction,
    pub span: Span,
}

/// A parsed program whose symbols have not been resolved yet.
///
/// The symbol table contains the predefined symbols and every label. Variables are
/// allocated when the program is compiled.
#[derive(Debug, Default, Clone)]
pub struct Program {
    pub instructions: Vec<InstructionEntry>,
    pub symbol_table: SymbolTable,
}

impl Program {
    /// Parses a program from assembly source, returning every error found.
    pub fn parse(input: &str) -> Result<Program, Vec<Error>> {
        Parser::new(input).parse()
    }

    pub fn parse_with_logger<L>(input: &str, logger: L) -> Result<Program, Vec<Error>>
    where
        L: Into<Option<Logger>>,
    {
        Parser::with_logger(input, logger).parse()
    }

    /// Resolves the symbols and encodes every instruction.
    ///
    /// Fails if a variable can not be given an address.
    pub fn compile(self) -> Result<bytecode::Program, Vec<Error>> {
        crate::compiler::compile(self)
    }

    pub fn compile_sourcemap(self) -> Result<WithSourceMap<bytecode::Program>, Vec<Error>> {
        crate::compiler::compile(self)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut lines = self.instructions.iter().map(|entry| {
            let labels = entry
                .labels
                .iter()
                .map(|label| format!("({})\n", label))
                .join("");

            format!("{}{}", labels, entry.instruction)
        });

        write!(f, "{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_canonical() {
        let source = "(START)\n  @ 100 // limit\nD = D - A ; JGT\n(END)\n0;JMP";
        let program = Program::parse(source).unwrap();

        assert_eq!(program.to_string(), "(START)\n@100\nD=D-A;JGT\n(END)\n0;JMP");
    }
}
