//! types for representing instructions and their parts

use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

/// Set of registers a compute instruction stores its result into.
///
/// Written in assembly as a subset of `ADM` in that order, e.g. `AM` or `D`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Destination {
    pub a: bool,
    pub d: bool,
    pub m: bool,
}

impl Destination {
    pub fn is_empty(&self) -> bool {
        !(self.a || self.d || self.m)
    }

    /// Number of registers in the set.
    pub fn count(&self) -> usize {
        self.a as usize + self.d as usize + self.m as usize
    }

    pub fn as_bits(&self) -> u16 {
        (self.a as u16) << 2 | (self.d as u16) << 1 | self.m as u16
    }

    pub fn from_bits(bits: u16) -> Destination {
        Destination {
            a: bits & 0b100 != 0,
            d: bits & 0b010 != 0,
            m: bits & 0b001 != 0,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.a {
            write!(f, "A")?;
        }

        if self.d {
            write!(f, "D")?;
        }

        if self.m {
            write!(f, "M")?;
        }

        Ok(())
    }
}

/// Describes the predicate for a conditional jump. The jump is taken when the computed value
/// satisfies the predicate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Jump {
    /// Jump if the value is greater than zero. (`JGT`)
    Greater,

    /// Jump if the value is zero. (`JEQ`)
    Equal,

    /// Jump if the value is greater than or equal to zero. (`JGE`)
    GreaterOrEqual,

    /// Jump if the value is less than zero. (`JLT`)
    Less,

    /// Jump if the value is not zero. (`JNE`)
    NotEqual,

    /// Jump if the value is less than or equal to zero. (`JLE`)
    LessOrEqual,

    /// Jump unconditionally. (`JMP`)
    Unconditional,
}

impl Jump {
    pub const ALL: [Jump; 7] = [
        Jump::Greater,
        Jump::Equal,
        Jump::GreaterOrEqual,
        Jump::Less,
        Jump::NotEqual,
        Jump::LessOrEqual,
        Jump::Unconditional,
    ];

    pub fn as_bits(&self) -> u16 {
        match self {
            Jump::Greater => 0b001,
            Jump::Equal => 0b010,
            Jump::GreaterOrEqual => 0b011,
            Jump::Less => 0b100,
            Jump::NotEqual => 0b101,
            Jump::LessOrEqual => 0b110,
            Jump::Unconditional => 0b111,
        }
    }

    /// Returns `None` for the "no jump" code `0b000`.
    pub fn from_bits(bits: u16) -> Option<Jump> {
        match bits & 0b111 {
            0b000 => None,
            0b001 => Some(Jump::Greater),
            0b010 => Some(Jump::Equal),
            0b011 => Some(Jump::GreaterOrEqual),
            0b100 => Some(Jump::Less),
            0b101 => Some(Jump::NotEqual),
            0b110 => Some(Jump::LessOrEqual),
            _ => Some(Jump::Unconditional),
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Jump::Greater => "JGT",
            Jump::Equal => "JEQ",
            Jump::GreaterOrEqual => "JGE",
            Jump::Less => "JLT",
            Jump::NotEqual => "JNE",
            Jump::LessOrEqual => "JLE",
            Jump::Unconditional => "JMP",
        }
    }
}

impl FromStr for Jump {
    type Err = ();

    fn from_str(input: &str) -> Result<Jump, ()> {
        Jump::ALL
            .iter()
            .find(|jump| jump.mnemonic() == input)
            .copied()
            .ok_or(())
    }
}

impl fmt::Display for Jump {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// Single character operators of the assembly language.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Assign,
    /// `!`
    Negate,
    /// `+`
    Add,
    /// `-`, both the binary and the unary form.
    Subtract,
    /// `&`
    BitwiseAnd,
    /// `|`
    BitwiseOr,
    /// `;`, introduces the jump mnemonic.
    StartJump,
}

impl Operator {
    /// Operators that can be applied to a single following operand.
    pub fn is_unary(&self) -> bool {
        match self {
            Operator::Negate | Operator::Subtract => true,
            _ => false,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Operator::Assign => '=',
            Operator::Negate => '!',
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::BitwiseAnd => '&',
            Operator::BitwiseOr => '|',
            Operator::StartJump => ';',
        }
    }
}

impl FromStr for Operator {
    type Err = ();

    fn from_str(input: &str) -> Result<Operator, ()> {
        match input {
            "=" => Ok(Operator::Assign),
            "!" => Ok(Operator::Negate),
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Subtract),
            "&" => Ok(Operator::BitwiseAnd),
            "|" => Ok(Operator::BitwiseOr),
            ";" => Ok(Operator::StartJump),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// An input of the ALU.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
    Zero,
    One,
    A,
    D,
    M,
}

impl Operand {
    pub fn is_constant(&self) -> bool {
        match self {
            Operand::Zero | Operand::One => true,
            _ => false,
        }
    }

    pub fn is_register(&self) -> bool {
        !self.is_constant()
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            Operand::Zero => "0",
            Operand::One => "1",
            Operand::A => "A",
            Operand::D => "D",
            Operand::M => "M",
        })
    }
}

/// The computation part of a compute instruction.
///
/// A single operand is stored on the left, a unary operation has only the right operand and a
/// binary operation has both.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Comparison {
    pub left: Option<Operand>,
    pub operator: Option<Operator>,
    pub right: Option<Operand>,
}

type ComparisonEntry = (Option<Operand>, Option<Operator>, Option<Operand>, u16);

/// Every computation the ALU supports in its canonical form, with its 7-bit code.
/// Bit 6 selects M instead of A as the second ALU input.
const COMPARISON_TABLE: [ComparisonEntry; 28] = {
    use self::Operand::*;
    use self::Operator::*;

    [
        (Some(Zero), None, None, 0b0101010),
        (Some(One), None, None, 0b0111111),
        (None, Some(Subtract), Some(One), 0b0111010),
        (Some(D), None, None, 0b0001100),
        (Some(A), None, None, 0b0110000),
        (Some(M), None, None, 0b1110000),
        (None, Some(Negate), Some(D), 0b0001101),
        (None, Some(Negate), Some(A), 0b0110001),
        (None, Some(Negate), Some(M), 0b1110001),
        (None, Some(Subtract), Some(D), 0b0001111),
        (None, Some(Subtract), Some(A), 0b0110011),
        (None, Some(Subtract), Some(M), 0b1110011),
        (Some(D), Some(Add), Some(One), 0b0011111),
        (Some(A), Some(Add), Some(One), 0b0110111),
        (Some(M), Some(Add), Some(One), 0b1110111),
        (Some(D), Some(Subtract), Some(One), 0b0001110),
        (Some(A), Some(Subtract), Some(One), 0b0110010),
        (Some(M), Some(Subtract), Some(One), 0b1110010),
        (Some(D), Some(Add), Some(A), 0b0000010),
        (Some(D), Some(Add), Some(M), 0b1000010),
        (Some(D), Some(Subtract), Some(A), 0b0010011),
        (Some(D), Some(Subtract), Some(M), 0b1010011),
        (Some(A), Some(Subtract), Some(D), 0b0000111),
        (Some(M), Some(Subtract), Some(D), 0b1000111),
        (Some(D), Some(BitwiseAnd), Some(A), 0b0000000),
        (Some(D), Some(BitwiseAnd), Some(M), 0b1000000),
        (Some(D), Some(BitwiseOr), Some(A), 0b0010101),
        (Some(D), Some(BitwiseOr), Some(M), 0b1010101),
    ]
};

impl Comparison {
    /// Rewrites equivalent spellings into the canonical form used by the encoding table:
    /// a lone operand moves to the left, `1+X` becomes `X+1` and commutative operations on
    /// `D` and `A`/`M` put `D` first.
    pub fn normalized(&self) -> Comparison {
        use self::Operand::*;
        use self::Operator::*;

        match (self.left, self.operator, self.right) {
            (None, None, Some(operand)) => Comparison {
                left: Some(operand),
                operator: None,
                right: None,
            },
            (Some(One), Some(Add), Some(register)) if register.is_register() => Comparison {
                left: Some(register),
                operator: Some(Add),
                right: Some(One),
            },
            (Some(register @ A), Some(operator), Some(D))
            | (Some(register @ M), Some(operator), Some(D))
                if operator == Add || operator == BitwiseAnd || operator == BitwiseOr =>
            {
                Comparison {
                    left: Some(D),
                    operator: Some(operator),
                    right: Some(register),
                }
            }
            _ => *self,
        }
    }

    /// Returns the 7-bit code of the computation or `None` if the ALU can not perform it.
    pub fn code(&self) -> Option<u16> {
        let canonical = self.normalized();

        COMPARISON_TABLE
            .iter()
            .find(|(left, operator, right, _)| {
                *left == canonical.left && *operator == canonical.operator && *right == canonical.right
            })
            .map(|entry| entry.3)
    }

    /// Looks up the canonical computation for a 7-bit code.
    pub fn from_code(code: u16) -> Option<Comparison> {
        COMPARISON_TABLE
            .iter()
            .find(|entry| entry.3 == code & 0x7F)
            .map(|(left, operator, right, _)| Comparison {
                left: *left,
                operator: *operator,
                right: *right,
            })
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(left) = self.left {
            write!(f, "{}", left)?;
        }

        if let Some(operator) = self.operator {
            write!(f, "{}", operator)?;
        }

        if let Some(right) = self.right {
            write!(f, "{}", right)?;
        }

        Ok(())
    }
}

/// Performs a computation, optionally stores the result and optionally jumps.
///
/// Can only be created with a computation the ALU supports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComputeInstruction {
    destination: Destination,
    comparison: Comparison,
    jump: Option<Jump>,
    code: u16,
}

impl ComputeInstruction {
    /// Returns `None` if the ALU has no encoding for `comparison`.
    pub fn new(destination: Destination, comparison: Comparison, jump: Option<Jump>) -> Option<ComputeInstruction> {
        let code = comparison.code()?;

        Some(ComputeInstruction {
            destination,
            comparison,
            jump,
            code,
        })
    }

    pub fn destination(&self) -> Destination {
        self.destination
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    pub fn jump(&self) -> Option<Jump> {
        self.jump
    }

    /// Encodes the instruction as `111` followed by the computation, destination and jump
    /// fields.
    pub fn as_word(&self) -> u16 {
        0b111 << 13
            | self.code << 6
            | self.destination.as_bits() << 3
            | self.jump.map(|jump| jump.as_bits()).unwrap_or(0)
    }
}

impl fmt::Display for ComputeInstruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.destination.is_empty() {
            write!(f, "{}=", self.destination)?;
        }

        write!(f, "{}", self.comparison)?;

        if let Some(jump) = self.jump {
            write!(f, ";{}", jump)?;
        }

        Ok(())
    }
}

/// Value loaded by an addressing instruction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    Literal(u16),
    /// A label or variable, resolved after parsing.
    Symbol(String),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Target::Literal(value) => write!(f, "{}", value),
            Target::Symbol(symbol) => write!(f, "{}", symbol),
        }
    }
}

/// An instruction as written in the source, before symbols are resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Addressing(Target),
    Compute(ComputeInstruction),
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Instruction::Addressing(target) => write!(f, "@{}", target),
            Instruction::Compute(compute) => write!(f, "{}", compute),
        }
    }
}

/// An instruction with every symbol replaced by its address.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResolvedInstruction {
    Load(u16),
    Compute(ComputeInstruction),
}

impl ResolvedInstruction {
    pub fn as_word(&self) -> u16 {
        match self {
            ResolvedInstruction::Load(value) => *value,
            ResolvedInstruction::Compute(compute) => compute.as_word(),
        }
    }
}

impl fmt::Display for ResolvedInstruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResolvedInstruction::Load(value) => write!(f, "@{}", value),
            ResolvedInstruction::Compute(compute) => write!(f, "{}", compute),
        }
    }
}

/// A word that does not encode any instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DecodeError {
    pub word: u16,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid instruction word {:016b}", self.word)
    }
}

impl std::error::Error for DecodeError {}

impl TryFrom<u16> for ResolvedInstruction {
    type Error = DecodeError;

    fn try_from(word: u16) -> Result<ResolvedInstruction, DecodeError> {
        if word & 0x8000 == 0 {
            return Ok(ResolvedInstruction::Load(word));
        }

        if word >> 13 != 0b111 {
            return Err(DecodeError { word });
        }

        let comparison = Comparison::from_code(word >> 6).ok_or(DecodeError { word })?;
        let destination = Destination::from_bits(word >> 3);
        let jump = Jump::from_bits(word);

        ComputeInstruction::new(destination, comparison, jump)
            .map(ResolvedInstruction::Compute)
            .ok_or(DecodeError { word })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparison(left: Option<Operand>, operator: Option<Operator>, right: Option<Operand>) -> Comparison {
        Comparison { left, operator, right }
    }

    #[test]
    fn test_comparison_table_has_unique_codes() {
        for (i, a) in COMPARISON_TABLE.iter().enumerate() {
            for b in &COMPARISON_TABLE[i + 1..] {
                assert_ne!(a.3, b.3, "{:?} and {:?} share a code", a, b);
            }
        }
    }

    #[test]
    fn test_comparison_codes() {
        use crate::instruction::Operand::*;
        use crate::instruction::Operator::*;

        let cases = vec![
            (comparison(Some(Zero), None, None), 0b0101010),
            (comparison(None, None, Some(Zero)), 0b0101010),
            (comparison(None, None, Some(One)), 0b0111111),
            (comparison(None, Some(Subtract), Some(One)), 0b0111010),
            (comparison(Some(A), None, None), 0b0110000),
            (comparison(Some(M), None, None), 0b1110000),
            (comparison(None, Some(Negate), Some(M)), 0b1110001),
            (comparison(Some(M), Some(Add), Some(One)), 0b1110111),
            (comparison(Some(One), Some(Add), Some(D)), 0b0011111),
            (comparison(Some(A), Some(Add), Some(D)), 0b0000010),
            (comparison(Some(M), Some(BitwiseOr), Some(D)), 0b1010101),
            (comparison(Some(A), Some(Subtract), Some(D)), 0b0000111),
            (comparison(Some(D), Some(Subtract), Some(M)), 0b1010011),
        ];

        for (comparison, code) in cases {
            assert_eq!(comparison.code(), Some(code), "{:?}", comparison);
        }
    }

    #[test]
    fn test_unsupported_comparisons() {
        use crate::instruction::Operand::*;
        use crate::instruction::Operator::*;

        assert_eq!(comparison(Some(D), Some(Add), Some(D)).code(), None);
        assert_eq!(comparison(Some(A), Some(Subtract), Some(M)).code(), None);
        assert_eq!(comparison(Some(D), Some(BitwiseAnd), Some(One)).code(), None);
        assert_eq!(comparison(None, Some(Negate), Some(One)).code(), None);
        assert_eq!(comparison(Some(One), Some(Subtract), Some(D)).code(), None);
        assert_eq!(comparison(None, None, None).code(), None);
    }

    #[test]
    fn test_compute_word_layout() {
        let destination = Destination { a: false, d: true, m: false };
        let compute = ComputeInstruction::new(
            destination,
            comparison(Some(Operand::A), None, None),
            None,
        ).unwrap();

        assert_eq!(compute.as_word(), 0b1110110000010000);

        let compute = ComputeInstruction::new(
            Destination::default(),
            comparison(None, None, Some(Operand::Zero)),
            Some(Jump::Unconditional),
        ).unwrap();

        assert_eq!(compute.as_word(), 0b1110101010000111);
        assert_eq!(compute.to_string(), "0;JMP");
    }

    #[test]
    fn test_jump_codes() {
        let codes: Vec<u16> = Jump::ALL.iter().map(Jump::as_bits).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5, 6, 7]);

        for jump in Jump::ALL.iter() {
            assert_eq!(Jump::from_bits(jump.as_bits()), Some(*jump));
            assert_eq!(jump.mnemonic().parse::<Jump>(), Ok(*jump));
        }

        assert_eq!(Jump::from_bits(0), None);
    }

    #[test]
    fn test_decode() {
        assert_eq!(
            ResolvedInstruction::try_from(0b0000000000010000),
            Ok(ResolvedInstruction::Load(16))
        );

        let decoded = ResolvedInstruction::try_from(0b1111110111001000).unwrap();
        assert_eq!(decoded.to_string(), "M=M+1");
        assert_eq!(decoded.as_word(), 0b1111110111001000);

        let decoded = ResolvedInstruction::try_from(0b1110001100000001).unwrap();
        assert_eq!(decoded.to_string(), "D;JGT");

        assert_eq!(
            ResolvedInstruction::try_from(0b1010110000010000),
            Err(DecodeError { word: 0b1010110000010000 })
        );
        assert_eq!(
            ResolvedInstruction::try_from(0b1111111111000000),
            Err(DecodeError { word: 0b1111111111000000 })
        );
    }
}
