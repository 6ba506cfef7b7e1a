use std::fmt;

use nom::{
    IResult,
    bytes::complete::take_while_m_n,
    character::complete::space0,
    combinator::{all_consuming, map_res},
    sequence::delimited,
};

use super::program::Program;

/// A line of a `.hack` file that is not a 16 digit binary word.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    pub content: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}: expected 16 binary digits, found '{}'", self.line, self.content)
    }
}

impl std::error::Error for ParseError {}

fn is_bit(c: char) -> bool {
    c == '0' || c == '1'
}

fn take_word(input: &str) -> IResult<&str, u16> {
    all_consuming(delimited(
        space0,
        map_res(take_while_m_n(16, 16, is_bit), |bits| u16::from_str_radix(bits, 2)),
        space0,
    ))(input)
}

pub(crate) fn parse_hack_file(input: &str) -> Result<Program, ParseError> {
    let mut words = Vec::new();

    for (index, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        match take_word(line) {
            Ok((_, word)) => words.push(word),
            Err(_) => {
                return Err(ParseError {
                    line: index + 1,
                    content: line.to_string(),
                })
            }
        }
    }

    Ok(Program {
        words,
        ..Program::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hack_file() {
        let program = parse_hack_file("0000000000000010\r\n1110110000010000\n\n").unwrap();
        assert_eq!(program.words, vec![2, 0b1110110000010000]);
    }

    #[test]
    fn test_invalid_lines() {
        assert_eq!(
            parse_hack_file("0000000000000010\n111011000001000\n").unwrap_err(),
            ParseError { line: 2, content: "111011000001000".to_string() }
        );
        assert_eq!(
            parse_hack_file("00000000000000100\n").unwrap_err().line,
            1
        );
        assert!(parse_hack_file("000000000000002\n").is_err());
    }
}
