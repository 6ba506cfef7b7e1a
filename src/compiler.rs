//! Compilation from a parsed assembly program to machine words.

use slog::{debug, o, trace, Discard, Logger};

use crate::bytecode::Program;
use crate::error::{Error, ErrorKind};
use crate::instruction::{Instruction, ResolvedInstruction, Target};
use crate::parsing::Span;
use crate::source_map::SourceMap;
use crate::symbol_table::{SymbolTable, MAX_ADDRESS};
use crate::symbolic;
use crate::symbolic::program::InstructionEntry;

/// An instruction with its symbols replaced by addresses.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEntry {
    pub instruction: ResolvedInstruction,
    pub span: Span,
}

/// Defines an interface for a data structure into which machine words can be compiled.
pub trait CompileTarget: Sized {
    /// Create an empty instance of itself.
    fn create(symbol_table: &SymbolTable) -> Self;

    /// Create an empty instance of itself with reserved capacity for `size` words.
    /// This is just a hint, so this doesn't need to be actually implemented if
    /// the data structure doesn't support this.
    fn with_capacity(symbol_table: &SymbolTable, _size: usize) -> Self {
        Self::create(symbol_table)
    }

    /// Appends a word and returns its address.
    ///
    /// # Parameters
    /// - `span`: Location of the instruction in the assembly source.
    /// - `word`: Value for the word.
    fn push_word(&mut self, span: Option<Span>, word: u16) -> u16;

    /// Finalize the compilation.
    /// The compiler will not modify the data structure after this.
    fn finish(self) -> Self {
        self
    }
}

impl CompileTarget for Program {
    fn create(symbol_table: &SymbolTable) -> Program {
        Program {
            words: Vec::new(),
            symbol_table: symbol_table.to_map(),
        }
    }

    fn with_capacity(symbol_table: &SymbolTable, size: usize) -> Program {
        Program {
            words: Vec::with_capacity(size),
            symbol_table: symbol_table.to_map(),
        }
    }

    fn push_word(&mut self, _span: Option<Span>, word: u16) -> u16 {
        self.words.push(word);
        (self.words.len() - 1) as u16
    }
}

/// Captures the source spans of the compiled words in addition to the words themselves.
#[derive(Debug, Clone)]
pub struct WithSourceMap<T> {
    /// The actual artifact of the compilation.
    pub compiled: T,

    /// Map from word addresses into source spans.
    pub source_map: SourceMap<Span>,
}

impl<T: CompileTarget> CompileTarget for WithSourceMap<T> {
    fn create(symbol_table: &SymbolTable) -> Self {
        WithSourceMap {
            compiled: T::create(symbol_table),
            source_map: SourceMap::default(),
        }
    }

    fn with_capacity(symbol_table: &SymbolTable, size: usize) -> Self {
        WithSourceMap {
            compiled: T::with_capacity(symbol_table, size),
            source_map: SourceMap::default(),
        }
    }

    fn push_word(&mut self, span: Option<Span>, word: u16) -> u16 {
        let address = self.compiled.push_word(span.clone(), word);

        if let Some(span) = span {
            self.source_map.insert(address, span);
        }

        address
    }

    fn finish(self) -> Self {
        WithSourceMap {
            compiled: self.compiled.finish(),
            source_map: self.source_map,
        }
    }
}

/// Replaces every symbolic address with a number.
///
/// Symbols missing from `symbol_table` are variables and get the next free address in the
/// order they are first referenced. Must run after the whole program has been parsed, so that
/// labels defined after their use are already in the table.
///
/// Every reference to a variable that no longer fits below [MAX_ADDRESS] is reported.
pub fn resolve_symbols(
    entries: Vec<InstructionEntry>,
    symbol_table: &mut SymbolTable,
    logger: &Logger,
) -> Result<Vec<ResolvedEntry>, Vec<Error>> {
    let mut resolved = Vec::with_capacity(entries.len());
    let mut errors = Vec::new();

    for entry in entries {
        let instruction = match entry.instruction {
            Instruction::Compute(compute) => ResolvedInstruction::Compute(compute),
            Instruction::Addressing(Target::Literal(value)) => ResolvedInstruction::Load(value),
            Instruction::Addressing(Target::Symbol(name)) => {
                let known = symbol_table.contains(&name);

                let address = match symbol_table.get_or_allocate(&name) {
                    Some(address) => address,
                    None => {
                        debug!(logger, "out of variable addresses"; "symbol" => %name);

                        let help = format!("every address up to {} is already in use", MAX_ADDRESS);
                        errors.push(Error::new(ErrorKind::AddressOutOfRange, entry.span).with_help(Some(help)));
                        continue;
                    }
                };

                if !known {
                    trace!(logger, "allocate variable"; "symbol" => %name, "address" => address);
                }

                ResolvedInstruction::Load(address)
            }
        };

        resolved.push(ResolvedEntry {
            instruction,
            span: entry.span,
        });
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(resolved)
}

/// Compiles the given assembly program into machine words.
/// Supports compilation into multiple data structures, but most often the compilation target is
/// [crate::bytecode::Program] possibly in combination with [WithSourceMap].
pub fn compile<T>(program: symbolic::Program) -> Result<T, Vec<Error>>
where
    T: CompileTarget,
{
    compile_with_logger(program, None)
}

pub fn compile_with_logger<T, L>(program: symbolic::Program, logger: L) -> Result<T, Vec<Error>>
where
    T: CompileTarget,
    L: Into<Option<Logger>>,
{
    let logger = logger
        .into()
        .unwrap_or(Logger::root(Discard, o!()))
        .new(o!("stage" => "compilation"));

    let symbolic::Program {
        instructions,
        mut symbol_table,
    } = program;

    let resolved = resolve_symbols(instructions, &mut symbol_table, &logger)?;

    let mut target = T::with_capacity(&symbol_table, resolved.len());

    for entry in resolved {
        let word = entry.instruction.as_word();
        let address = target.push_word(Some(entry.span), word);

        trace!(logger, "emit word";
            "address" => address,
            "word" => format!("{:016b}", word),
            "instruction" => %entry.instruction);
    }

    Ok(target.finish())
}
