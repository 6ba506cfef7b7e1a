//! Reading, writing and storing assembled programs.

mod parser;
mod program;

pub use self::parser::ParseError;
pub use self::program::Program;
