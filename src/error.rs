//! Structured errors reported while assembling.
//!
//! Every error carries the byte span of the implicated token and of the whole instruction that
//! was being built when the error was detected. For line and column information see
//! [Error::verbose].

use std::fmt::{self, Display};

use crate::parsing::{line_bounds, line_location, Span};

/// Reason of an [Error].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A character that does not start any token.
    UnexpectedToken,
    /// A token that carries no meaning inside an instruction.
    InvalidTokenType,
    /// A token whose text does not have the shape its kind requires.
    InvalidTokenData,
    /// An integer literal greater than 65535.
    IntegerOutOfRange,

    /// A single value that cannot form an addressing instruction.
    InvalidSemanticTokenType,
    /// A compute instruction with too few or too many values.
    InvalidSemanticTokenCount,
    /// An operator in a position the grammar does not allow.
    InvalidOperationOrder,
    /// The value left of `=` is not a register set.
    InvalidDestination,
    /// A value that cannot be used as an operand.
    InvalidOperand,
    /// The value right of `;` is not a jump mnemonic.
    InvalidJump,
    /// A compute instruction without anything to compute.
    MissingOperand,
    /// Two register operands that the ALU cannot combine.
    InvalidRegisterOperands,
    /// An operation between two constants.
    InvalidNumericOperand,
    /// The constant `1` in a position the ALU does not support.
    InvalidOneOperand,
    /// The constant `0` in a position the ALU does not support.
    InvalidZeroOperand,
    /// An addressing literal, label or variable address that does not fit into 15 bits.
    AddressOutOfRange,

    /// A label that has already been defined.
    DuplicateLabel,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let message = match self {
            ErrorKind::UnexpectedToken => "unexpected character",
            ErrorKind::InvalidTokenType => "token can not be part of an instruction",
            ErrorKind::InvalidTokenData => "token is not valid",
            ErrorKind::IntegerOutOfRange => "integer is out of range for a 16 bit unsigned integer",
            ErrorKind::InvalidSemanticTokenType => {
                "expression could not be parsed as an addressing instruction"
            }
            ErrorKind::InvalidSemanticTokenCount => {
                "expression has an invalid number of values for a compute instruction"
            }
            ErrorKind::InvalidOperationOrder => "operation is not allowed here",
            ErrorKind::InvalidDestination => "destination must be a set of registers",
            ErrorKind::InvalidOperand => "operand must be 0, 1, A, D or M",
            ErrorKind::InvalidJump => "expected a jump mnemonic",
            ErrorKind::MissingOperand => "compute instruction has no operands",
            ErrorKind::InvalidRegisterOperands => "these registers can not be combined",
            ErrorKind::InvalidNumericOperand => "operation between two constants",
            ErrorKind::InvalidOneOperand => "constant 1 is not allowed here",
            ErrorKind::InvalidZeroOperand => "constant 0 is not allowed here",
            ErrorKind::AddressOutOfRange => "address does not fit into 15 bits",
            ErrorKind::DuplicateLabel => "label has already been defined",
        };

        write!(f, "{}", message)
    }
}

/// An error located in the assembly source.
#[derive(Clone, Debug, PartialEq)]
pub struct Error {
    pub kind: ErrorKind,
    /// Span of the token the error implicates.
    pub span: Span,
    /// Span of the whole expression the token belongs to.
    pub expression: Span,
    /// Optional suggestion for fixing the error.
    pub help: Option<String>,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, span: Span) -> Error {
        Error {
            kind,
            expression: span.clone(),
            span,
            help: None,
        }
    }

    pub(crate) fn with_expression(mut self, expression: Span) -> Error {
        self.expression = expression;
        self
    }

    pub(crate) fn with_help<S: Into<String>>(mut self, help: Option<S>) -> Error {
        self.help = help.map(Into::into);
        self
    }

    /// Calculates the error location information from the [Error] and the original input
    /// buffer.
    ///
    /// # Parameters
    /// - `input`: The original input buffer or an exact copy of it.
    pub fn verbose(self, input: &str) -> VerboseError {
        let location = line_location(input, self.span.start);
        let expression = line_location(input, self.expression.start);
        let bounds = line_bounds(input, self.span.start);

        let end = std::cmp::min(self.span.end, bounds.end);
        let length = input
            .get(self.span.start..end)
            .map(|s| s.chars().count())
            .unwrap_or(0);

        let expression_end = std::cmp::min(self.expression.end, bounds.end);
        let expression_length = match expression.line == location.line {
            true => input
                .get(self.expression.start..expression_end)
                .map(|s| s.chars().count())
                .unwrap_or(0),
            false => 0,
        };

        VerboseError {
            line: location.line,
            column: location.column,
            length,
            expression_column: expression.column,
            expression_length,
            source_line: &input[bounds],
            kind: self.kind,
            help: self.help,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at {}-{}", self.kind, self.span.start, self.span.end)?;

        if let Some(help) = &self.help {
            write!(f, " ({})", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

/// Error type containing location information in addition to the reason of the error.
///
/// Created from an [Error] with [Error::verbose].
#[derive(Clone, Debug, PartialEq)]
pub struct VerboseError<'a> {
    /// The line number of the error location.
    pub line: usize,
    /// The column number of the error location.
    pub column: usize,
    /// Number of characters the implicated token covers on its line.
    pub length: usize,
    /// The column where the surrounding expression starts.
    pub expression_column: usize,
    /// Number of characters the surrounding expression covers on the error's line.
    pub expression_length: usize,
    /// The complete source line containing the error.
    pub source_line: &'a str,
    pub kind: ErrorKind,
    pub help: Option<String>,
}

impl<'a> Display for VerboseError<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "at line {} col {}: {}, at '{}'", self.line, self.column, self.kind, self.source_line.trim())?;

        if let Some(help) = &self.help {
            write!(f, ": {}", help)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_location() {
        let source = "@2\nD=A+D-1\n";
        let error = Error::new(ErrorKind::InvalidOperationOrder, 7..8)
            .with_expression(3..10);

        let verbose = error.verbose(source);

        assert_eq!(verbose.line, 2);
        assert_eq!(verbose.column, 5);
        assert_eq!(verbose.length, 1);
        assert_eq!(verbose.expression_column, 1);
        assert_eq!(verbose.expression_length, 7);
        assert_eq!(verbose.source_line, "D=A+D-1");
    }

    #[test]
    fn test_display_includes_help() {
        let error = Error::new(ErrorKind::InvalidJump, 4..8)
            .with_help(Some("did you mean `JMP`?"));

        assert_eq!(error.to_string(), "expected a jump mnemonic at 4-8 (did you mean `JMP`?)");
    }
}
