//! Construction of instructions from expression stacks.
//!
//! A compute instruction has the shape
//!
//! ```text
//! [ destination '=' ] operand [ binary-operator operand ] [ ';' jump ]
//! ```
//!
//! where `!` and unary `-` apply to the single operand that follows them. The stack is read
//! from right to left in pairs of an operator and the value to its right. A register set at
//! the very start of a stack with an even number of values is the destination of an
//! assignment whose right hand side is a unary operation (`D=-1`, `M=!D`). That case has no
//! operator left of the register set and is recognized by its position alone.

use crate::error::ErrorKind;
use crate::instruction::{Comparison, ComputeInstruction, Operand, Operator, Target};
use crate::symbol_table::MAX_ADDRESS;

use super::semantic::{suggest_jump, suggest_registers, SemanticValue};

/// Longest possible compute instruction, `AM=D+M;JMP`.
pub const MAX_COMPUTE_VALUES: usize = 7;

/// An error found while building an instruction, pointing at the offending stack position.
#[derive(Debug, Clone, PartialEq)]
pub struct GrammarError {
    pub kind: ErrorKind,

    /// Index of the implicated value on the stack. `None` implicates the whole stack.
    pub index: Option<usize>,

    pub help: Option<String>,
}

impl GrammarError {
    fn new(kind: ErrorKind, index: usize) -> GrammarError {
        GrammarError {
            kind,
            index: Some(index),
            help: None,
        }
    }

    fn with_help(mut self, help: Option<String>) -> GrammarError {
        self.help = help;
        self
    }
}

/// Builds the target of an addressing instruction from a single value.
pub fn parse_addressing(value: &SemanticValue) -> Result<Target, GrammarError> {
    match value {
        SemanticValue::Integer(literal) if *literal > MAX_ADDRESS => {
            Err(GrammarError::new(ErrorKind::AddressOutOfRange, 0))
        }
        SemanticValue::Integer(literal) => Ok(Target::Literal(*literal)),
        SemanticValue::Identifier(name) => Ok(Target::Symbol(name.clone())),
        _ => Err(GrammarError::new(ErrorKind::InvalidSemanticTokenType, 0)),
    }
}

fn operand(value: &SemanticValue, index: usize) -> Result<Operand, GrammarError> {
    match value {
        SemanticValue::Integer(0) => Ok(Operand::Zero),
        SemanticValue::Integer(1) => Ok(Operand::One),
        SemanticValue::Registers(registers) if registers.count() == 1 => {
            if registers.a {
                Ok(Operand::A)
            } else if registers.d {
                Ok(Operand::D)
            } else {
                Ok(Operand::M)
            }
        }
        _ => Err(GrammarError::new(ErrorKind::InvalidOperand, index)),
    }
}

fn operator(value: &SemanticValue) -> Option<Operator> {
    match value {
        SemanticValue::Operator(operator) => Some(*operator),
        _ => None,
    }
}

/// Positions of the parts of a comparison on the stack.
#[derive(Default)]
struct Positions {
    left: Option<usize>,
    operator: Option<usize>,
    right: Option<usize>,
}

/// Builds a compute instruction from the values of one expression, in the order they were
/// written.
pub fn parse_compute(values: &[SemanticValue]) -> Result<ComputeInstruction, GrammarError> {
    if values.len() <= 1 || values.len() > MAX_COMPUTE_VALUES {
        return Err(GrammarError {
            kind: ErrorKind::InvalidSemanticTokenCount,
            index: None,
            help: None,
        });
    }

    let max_index = values.len() - 1;

    if values[max_index].is_operator(Operator::StartJump) {
        return Err(GrammarError::new(ErrorKind::InvalidJump, max_index));
    }

    let mut comparison = Comparison::default();
    let mut positions = Positions::default();
    let mut destination = Default::default();
    let mut jump = None;

    let mut index = max_index;

    while index > 0 {
        if index == 1 {
            if let SemanticValue::Registers(_) = values[0] {
                break;
            }
        }

        let op = operator(&values[index - 1])
            .ok_or_else(|| GrammarError::new(ErrorKind::InvalidOperationOrder, index - 1))?;

        match op {
            Operator::StartJump => {
                if index != max_index {
                    return Err(GrammarError::new(ErrorKind::InvalidOperationOrder, index - 1));
                }

                match &values[index] {
                    SemanticValue::Jump(mnemonic) => jump = Some(*mnemonic),
                    SemanticValue::Identifier(name) => {
                        return Err(GrammarError::new(ErrorKind::InvalidJump, index)
                            .with_help(suggest_jump(name)));
                    }
                    _ => return Err(GrammarError::new(ErrorKind::InvalidJump, index)),
                }
            }
            Operator::Assign => {
                if index != 2 {
                    return Err(GrammarError::new(ErrorKind::InvalidOperationOrder, index - 1));
                }

                let unary = operator(&values[index])
                    .map(|op| op.is_unary())
                    .unwrap_or(false);

                if !unary {
                    comparison.left = Some(operand(&values[index], index)?);
                    positions.left = Some(index);
                }

                break;
            }
            _ => {
                if comparison.operator.is_some() {
                    return Err(GrammarError::new(ErrorKind::InvalidOperationOrder, index - 1));
                }

                comparison.right = Some(operand(&values[index], index)?);
                comparison.operator = Some(op);
                positions.right = Some(index);
                positions.operator = Some(index - 1);
            }
        }

        if index < 2 {
            break;
        }

        index -= 2;
    }

    match operator(&values[1]) {
        Some(Operator::Assign) => match &values[0] {
            SemanticValue::Registers(registers) => destination = *registers,
            SemanticValue::Identifier(name) => {
                return Err(GrammarError::new(ErrorKind::InvalidDestination, 0)
                    .with_help(suggest_registers(name)));
            }
            _ => return Err(GrammarError::new(ErrorKind::InvalidDestination, 0)),
        },
        Some(Operator::StartJump) => {
            if jump.is_none() || positions.right.is_some() {
                return Err(GrammarError::new(ErrorKind::InvalidOperationOrder, 1));
            }

            comparison.right = Some(operand(&values[0], 0)?);
            positions.right = Some(0);
        }
        // A binary operation without an assignment, e.g. `D-1;JGT`.
        Some(_) if positions.operator == Some(1) => {
            comparison.left = Some(operand(&values[0], 0)?);
            positions.left = Some(0);
        }
        Some(_) => return Err(GrammarError::new(ErrorKind::InvalidOperationOrder, 1)),
        None => {}
    }

    match ComputeInstruction::new(destination, comparison, jump) {
        Some(instruction) => Ok(instruction),
        None => Err(unsupported_comparison(&comparison, &positions, max_index)),
    }
}

/// Explains why the ALU has no encoding for `comparison`.
fn unsupported_comparison(comparison: &Comparison, positions: &Positions, max_index: usize) -> GrammarError {
    let at = |position: Option<usize>| position.unwrap_or(max_index);

    let (left, right) = match (comparison.left, comparison.right) {
        (None, None) => return GrammarError::new(ErrorKind::MissingOperand, max_index),
        (left, right) => (left, right),
    };

    if comparison.operator == Some(Operator::Negate) && left.is_some() {
        return GrammarError::new(ErrorKind::InvalidOperationOrder, at(positions.operator));
    }

    let constant = |operand: Option<Operand>| operand.map(|o| o.is_constant()).unwrap_or(false);

    if constant(left) && constant(right) {
        return GrammarError::new(ErrorKind::InvalidNumericOperand, at(positions.right));
    }

    let misplaced = |operand: Option<Operand>, position: Option<usize>| match operand {
        Some(Operand::Zero) => Some(GrammarError::new(ErrorKind::InvalidZeroOperand, at(position))),
        Some(Operand::One) => Some(GrammarError::new(ErrorKind::InvalidOneOperand, at(position))),
        _ => None,
    };

    misplaced(right, positions.right)
        .or_else(|| misplaced(left, positions.left))
        .unwrap_or_else(|| {
            GrammarError::new(ErrorKind::InvalidRegisterOperands, at(positions.right.or(positions.left)))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::instruction::{Destination, Jump};
    use crate::symbolic::semantic::classify;
    use crate::symbolic::token::{TokenKind, Tokenizer};

    fn values(source: &str) -> Vec<SemanticValue> {
        Tokenizer::new(source)
            .filter(|token| token.kind != TokenKind::EndOfStream)
            .map(|token| classify(&token).unwrap())
            .collect()
    }

    fn compute(source: &str) -> Result<ComputeInstruction, GrammarError> {
        parse_compute(&values(source))
    }

    fn error(source: &str) -> (ErrorKind, Option<usize>) {
        let err = compute(source).unwrap_err();
        (err.kind, err.index)
    }

    #[test]
    fn test_assignment() {
        let instruction = compute("D=A").unwrap();

        assert_eq!(instruction.destination(), Destination { a: false, d: true, m: false });
        assert_eq!(instruction.comparison().left, Some(Operand::A));
        assert_eq!(instruction.comparison().operator, None);
        assert_eq!(instruction.jump(), None);
        assert_eq!(instruction.as_word(), 0b1110110000010000);
    }

    #[test]
    fn test_canonical_forms() {
        let cases = vec![
            "0", "1", "-1", "D", "A", "!D", "!A", "-D", "-A", "D+1", "A+1", "D-1", "A-1",
            "D+A", "D-A", "A-D", "D&A", "D|A", "M", "!M", "-M", "M+1", "M-1", "D+M", "D-M",
            "M-D", "D&M", "D|M",
        ];

        for comparison in cases {
            let source = format!("AM={};JNE", comparison);
            let instruction = compute(&source).unwrap();

            assert_eq!(instruction.to_string(), source);
        }
    }

    #[test]
    fn test_unary_assignment() {
        assert_eq!(compute("M=-1").unwrap().as_word(), 0b1110111010001000);
        assert_eq!(compute("D=!A").unwrap().as_word(), 0b1110110001010000);
    }

    #[test]
    fn test_jump_without_assignment() {
        let instruction = compute("0;JMP").unwrap();
        assert_eq!(instruction.as_word(), 0b1110101010000111);

        let instruction = compute("D-1;JGT").unwrap();
        assert_eq!(instruction.comparison().left, Some(Operand::D));
        assert_eq!(instruction.jump(), Some(Jump::Greater));
        assert_eq!(instruction.as_word(), 0b1110001110000001);
    }

    #[test]
    fn test_operand_order_normalized() {
        assert_eq!(compute("D=1+D").unwrap().as_word(), compute("D=D+1").unwrap().as_word());
        assert_eq!(compute("D=M&D").unwrap().as_word(), compute("D=D&M").unwrap().as_word());
    }

    #[test]
    fn test_count() {
        assert_eq!(
            parse_compute(&values("D")).unwrap_err().kind,
            ErrorKind::InvalidSemanticTokenCount
        );
        assert_eq!(
            error("AM=D+M;JMP+1"),
            (ErrorKind::InvalidSemanticTokenCount, None)
        );
    }

    #[test]
    fn test_operation_order() {
        assert_eq!(error("D=A=M"), (ErrorKind::InvalidOperationOrder, Some(3)));
        assert_eq!(error("D;JMP;JMP"), (ErrorKind::InvalidOperationOrder, Some(1)));
        assert_eq!(error("D=D+A-1"), (ErrorKind::InvalidOperationOrder, Some(3)));
        assert_eq!(error("D=D!A"), (ErrorKind::InvalidOperationOrder, Some(3)));
    }

    #[test]
    fn test_destination_and_jump() {
        assert_eq!(error("1=A"), (ErrorKind::InvalidDestination, Some(0)));
        assert_eq!(error("0;LOOP"), (ErrorKind::InvalidJump, Some(2)));
        assert_eq!(error("D;"), (ErrorKind::InvalidJump, Some(1)));

        let err = compute("0;jmp").unwrap_err();
        assert_eq!(err.help, Some("did you mean `JMP`?".to_string()));

        let err = compute("MD=1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidDestination);
        assert!(err.help.is_some());
    }

    #[test]
    fn test_operands() {
        assert_eq!(error("D=D+2"), (ErrorKind::InvalidOperand, Some(4)));
        assert_eq!(error("D=AD"), (ErrorKind::InvalidOperand, Some(2)));
        assert_eq!(error("D=A+M"), (ErrorKind::InvalidRegisterOperands, Some(4)));
        assert_eq!(error("D=D+D"), (ErrorKind::InvalidRegisterOperands, Some(4)));
        assert_eq!(error("D=1+1"), (ErrorKind::InvalidNumericOperand, Some(4)));
        assert_eq!(error("D=D&1"), (ErrorKind::InvalidOneOperand, Some(4)));
        assert_eq!(error("D=-0"), (ErrorKind::InvalidZeroOperand, Some(3)));
        assert_eq!(error("D=1-D"), (ErrorKind::InvalidOneOperand, Some(2)));
        assert_eq!(error("D=!"), (ErrorKind::MissingOperand, Some(2)));
    }

    #[test]
    fn test_addressing() {
        assert_eq!(
            parse_addressing(&SemanticValue::Integer(0x7FFF)),
            Ok(Target::Literal(0x7FFF))
        );
        assert_eq!(
            parse_addressing(&SemanticValue::Identifier("LOOP".into())),
            Ok(Target::Symbol("LOOP".into()))
        );
        assert_eq!(
            parse_addressing(&SemanticValue::Integer(0x8000)).unwrap_err().kind,
            ErrorKind::AddressOutOfRange
        );
        assert_eq!(
            parse_addressing(&SemanticValue::Operator(Operator::Negate)).unwrap_err().kind,
            ErrorKind::InvalidSemanticTokenType
        );
    }
}
