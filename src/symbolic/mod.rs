//! Parsing and storing symbolic assembly programs.
//!
//! Parsing happens in four steps: the [Tokenizer](token::Tokenizer) splits the source into
//! tokens, [classify](semantic::classify) gives each token a meaning, the
//! [Parser](parser::Parser) groups the values into expressions and the [grammar] turns each
//! expression into an [Instruction](crate::instruction::Instruction).

pub mod grammar;
pub mod parser;
pub mod program;
pub mod semantic;
pub mod token;

pub use self::program::{InstructionEntry, Program};
