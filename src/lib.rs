//! An assembler for the Hack assembly language used with the 16-bit Hack computer.
//!
//! Currently this crate provides the functionality to:
//! - Tokenize and parse `.asm` files containing Hack assembly, reporting every error in a
//!   single pass.
//! - Resolve labels and allocate variables.
//! - Encode the program into 16-bit machine words and write them as `.hack` files.
//! - Read `.hack` files and disassemble machine words back into instructions.
//!
//! # Example
//! ```
//! use hackasm::symbolic::Program;
//!
//! // Computes R2 = max(R0, R1).
//! let source = r#"
//!     @R0
//!     D=M
//!     @R1
//!     D=D-M
//!     @FIRST
//!     D;JGT
//!     @R1
//!     D=M
//!     @SECOND
//!     0;JMP
//! (FIRST)
//!     @R0
//!     D=M
//! (SECOND)
//!     @R2
//!     M=D
//! "#;
//!
//! // Parse the assembly into instructions with unresolved symbols.
//! let program = Program::parse(source).expect("program has errors");
//!
//! // Resolve the symbols and encode the instructions.
//! let compiled = program.compile().expect("out of variable addresses");
//!
//! assert_eq!(compiled.words.len(), 14);
//! assert_eq!(compiled.symbol_table["FIRST"], 10);
//! assert_eq!(compiled.to_string().lines().nth(5), Some("1110001100000001"));
//! ```
//!
//! # Diagnostics
//!
//! Errors are reported as [Error](error::Error) values carrying byte spans. The
//! [Parser](symbolic::parser::Parser) also streams them to registered
//! [EventListeners](event::EventListener) as soon as they are found.
//!
//! ```
//! use hackasm::symbolic::Program;
//! use hackasm::error::ErrorKind;
//!
//! let errors = Program::parse("@2\nD=A+D-1\n").unwrap_err();
//! let error = errors[0].clone().verbose("@2\nD=A+D-1\n");
//!
//! assert_eq!(error.kind, ErrorKind::InvalidOperationOrder);
//! assert_eq!((error.line, error.column), (2, 4));
//! ```
//!
//! # Executables
//!
//! ## `hackasm`
//!
//! Built with the `hackasm` feature. Assembles a `.asm` file into a `.hack` file and can print
//! a listing, the symbol table or the disassembly of an existing `.hack` file.
//!
//! ```text
//! $ hackasm Max.asm --listing
//! 0000  0000000000000000  @0                line 3
//! 0001  1111110000010000  D=M               line 4
//! ...
//! ```
pub mod parsing;
pub mod symbol_table;
pub mod instruction;
pub mod bytecode;
pub mod symbolic;
pub mod compiler;
pub mod source_map;
pub mod error;
pub mod event;

/// Assembles `source` into machine words.
pub fn assemble(source: &str) -> Result<Vec<u16>, Vec<error::Error>> {
    let program = symbolic::Program::parse(source)?;
    Ok(program.compile()?.words)
}
