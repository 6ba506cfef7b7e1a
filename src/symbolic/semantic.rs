//! Classification of lexical tokens into typed values.

use std::fmt;

use nom::{
    IResult,
    character::complete::{char, digit1},
    combinator::{all_consuming, map, opt},
    sequence::tuple,
};

use edit_distance::edit_distance;

use crate::error::ErrorKind;
use crate::instruction::{Destination, Jump, Operator};

use super::token::{Token, TokenKind};

/// The meaning of a single token inside an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticValue {
    /// A set of registers, written as a subset of `ADM` in that order.
    Registers(Destination),
    Integer(u16),
    /// A variable or label reference.
    Identifier(String),
    Jump(Jump),
    Operator(Operator),
}

impl SemanticValue {
    /// Decides whether `self` can continue the instruction that ended with `previous` when
    /// the two are separated by whitespace. Values that are written next to each other always
    /// belong to the same instruction.
    ///
    /// Nothing may follow a jump mnemonic. After an operator anything but another binary
    /// operator may follow. Two non-operator values never belong together.
    pub fn valid_after(&self, previous: &SemanticValue) -> bool {
        match (previous, self) {
            (SemanticValue::Jump(_), _) => false,
            (SemanticValue::Operator(_), SemanticValue::Operator(operator)) => operator.is_unary(),
            (SemanticValue::Operator(_), _) => true,
            (_, SemanticValue::Operator(_)) => true,
            (_, _) => false,
        }
    }

    pub fn is_operator(&self, operator: Operator) -> bool {
        *self == SemanticValue::Operator(operator)
    }
}

impl fmt::Display for SemanticValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SemanticValue::Registers(registers) => write!(f, "{}", registers),
            SemanticValue::Integer(value) => write!(f, "{}", value),
            SemanticValue::Identifier(name) => write!(f, "{}", name),
            SemanticValue::Jump(jump) => write!(f, "{}", jump),
            SemanticValue::Operator(operator) => write!(f, "{}", operator),
        }
    }
}

fn integer(input: &str) -> IResult<&str, &str> {
    all_consuming(digit1)(input)
}

fn register_set(input: &str) -> IResult<&str, Destination> {
    all_consuming(map(
        tuple((opt(char('A')), opt(char('D')), opt(char('M')))),
        |(a, d, m)| Destination {
            a: a.is_some(),
            d: d.is_some(),
            m: m.is_some(),
        },
    ))(input)
}

/// Converts a token into its [SemanticValue].
///
/// Only operators, integers, identifiers and labels carry a meaning. An identifier is a
/// register set if it can be one, then a jump mnemonic, and otherwise a plain identifier.
pub fn classify(token: &Token) -> Result<SemanticValue, ErrorKind> {
    match token.kind {
        TokenKind::Invalid => Err(ErrorKind::UnexpectedToken),
        TokenKind::Comment | TokenKind::Newline | TokenKind::EndOfStream => {
            Err(ErrorKind::InvalidTokenType)
        }
        TokenKind::Operator => token
            .text
            .parse()
            .map(SemanticValue::Operator)
            .map_err(|_| ErrorKind::InvalidTokenData),
        TokenKind::Integer => {
            let (_, digits) = integer(token.text).map_err(|_| ErrorKind::InvalidTokenData)?;

            digits
                .parse()
                .map(SemanticValue::Integer)
                .map_err(|_| ErrorKind::IntegerOutOfRange)
        }
        TokenKind::Identifier | TokenKind::Label => classify_symbol(token.text),
    }
}

fn classify_symbol(text: &str) -> Result<SemanticValue, ErrorKind> {
    match text.chars().next() {
        None => return Err(ErrorKind::InvalidTokenData),
        Some(first) if first.is_ascii_digit() => return Err(ErrorKind::InvalidTokenData),
        Some(_) => {}
    }

    if let Ok((_, registers)) = register_set(text) {
        return Ok(SemanticValue::Registers(registers));
    }

    if let Ok(jump) = text.parse() {
        return Ok(SemanticValue::Jump(jump));
    }

    Ok(SemanticValue::Identifier(text.to_string()))
}

/// Suggests the jump mnemonic closest to `text`, if there is one close enough.
pub fn suggest_jump(text: &str) -> Option<String> {
    let upper = text.to_uppercase();

    Jump::ALL
        .iter()
        .map(|jump| (edit_distance(&upper, jump.mnemonic()), jump))
        .filter(|(distance, _)| *distance <= 1)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, jump)| format!("did you mean `{}`?", jump))
}

/// Suggests the canonical spelling of a register set written in the wrong order or case,
/// e.g. `MD` or `ad`.
pub fn suggest_registers(text: &str) -> Option<String> {
    let upper = text.to_uppercase();

    let mut registers = Destination::default();

    for ch in upper.chars() {
        let slot = match ch {
            'A' => &mut registers.a,
            'D' => &mut registers.d,
            'M' => &mut registers.m,
            _ => return None,
        };

        if *slot {
            return None;
        }

        *slot = true;
    }

    if registers.is_empty() {
        return None;
    }

    Some(format!("registers are written in the order `ADM`, try `{}`", registers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::token::Tokenizer;

    fn classify_first(source: &str) -> Result<SemanticValue, ErrorKind> {
        let token = Tokenizer::new(source).next().unwrap();
        classify(&token)
    }

    fn registers(a: bool, d: bool, m: bool) -> SemanticValue {
        SemanticValue::Registers(Destination { a, d, m })
    }

    #[test]
    fn test_register_sets() {
        assert_eq!(classify_first("AD"), Ok(registers(true, true, false)));
        assert_eq!(classify_first("M"), Ok(registers(false, false, true)));
        assert_eq!(classify_first("ADM"), Ok(registers(true, true, true)));
        assert_eq!(classify_first("AA"), Ok(SemanticValue::Identifier("AA".into())));
        assert_eq!(classify_first("MD"), Ok(SemanticValue::Identifier("MD".into())));
        assert_eq!(classify_first("X"), Ok(SemanticValue::Identifier("X".into())));
    }

    #[test]
    fn test_jumps_and_operators() {
        assert_eq!(classify_first("JLE"), Ok(SemanticValue::Jump(Jump::LessOrEqual)));
        assert_eq!(classify_first("jle"), Ok(SemanticValue::Identifier("jle".into())));
        assert_eq!(classify_first("|"), Ok(SemanticValue::Operator(Operator::BitwiseOr)));
        assert_eq!(classify_first(";"), Ok(SemanticValue::Operator(Operator::StartJump)));
    }

    #[test]
    fn test_integer_range() {
        assert_eq!(classify_first("65535"), Ok(SemanticValue::Integer(65535)));
        assert_eq!(classify_first("65536"), Err(ErrorKind::IntegerOutOfRange));
        assert_eq!(classify_first("007"), Ok(SemanticValue::Integer(7)));
    }

    #[test]
    fn test_tokens_without_meaning() {
        assert_eq!(classify_first("\n"), Err(ErrorKind::InvalidTokenType));
        assert_eq!(classify_first("// x"), Err(ErrorKind::InvalidTokenType));
        assert_eq!(classify_first(""), Err(ErrorKind::InvalidTokenType));
        assert_eq!(classify_first("#"), Err(ErrorKind::UnexpectedToken));
        assert_eq!(classify_first("()"), Err(ErrorKind::InvalidTokenData));
        assert_eq!(classify_first("(1ABC)"), Err(ErrorKind::InvalidTokenData));
    }

    #[test]
    fn test_valid_after() {
        let d = registers(false, true, false);
        let assign = SemanticValue::Operator(Operator::Assign);
        let add = SemanticValue::Operator(Operator::Add);
        let minus = SemanticValue::Operator(Operator::Subtract);
        let jump = SemanticValue::Jump(Jump::Unconditional);

        assert!(assign.valid_after(&d));
        assert!(d.valid_after(&assign));
        assert!(minus.valid_after(&assign));
        assert!(!add.valid_after(&assign));
        assert!(!d.valid_after(&d));
        assert!(!SemanticValue::Integer(1).valid_after(&d));
        assert!(!assign.valid_after(&jump));
        assert!(!d.valid_after(&jump));
    }

    #[test]
    fn test_suggestions() {
        assert_eq!(suggest_jump("jmp"), Some("did you mean `JMP`?".to_string()));
        assert_eq!(suggest_jump("JGTE"), Some("did you mean `JGT`?".to_string()));
        assert_eq!(suggest_jump("LOOP"), None);

        assert_eq!(
            suggest_registers("MD"),
            Some("registers are written in the order `ADM`, try `DM`".to_string())
        );
        assert_eq!(suggest_registers("DD"), None);
        assert_eq!(suggest_registers("foo"), None);
    }
}
