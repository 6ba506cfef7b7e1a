//! Tokens and a tokenizer for the symbolic assembly format.

use logos::{Lexer, Logos};

use std::fmt;

use crate::parsing::Span;

/// Raw lexemes recognized by the lexer. Separators are skipped here, everything else
/// is turned into a [Token] by the [Tokenizer].
#[derive(Logos, Debug, PartialEq, Clone, Copy)]
enum RawToken {
    /// A character that does not start any token.
    #[error]
    #[regex(r"[ \t\r\f@]+", logos::skip)]
    Error,

    #[token("\n")]
    Newline,

    /// A comment runs until the end of the line. The newline is not part of the comment.
    #[regex("//[^\n]*")]
    Comment,

    #[regex(r"[=;!+\-&|]")]
    Operator,

    /// A label declaration, `(NAME)`.
    #[regex(r"\([A-Za-z0-9_.$:]*\)")]
    Label,

    #[regex("[0-9]+")]
    Integer,

    #[regex("[A-Za-z_.$:][A-Za-z0-9_.$:]*")]
    Identifier,
}

/// The lexical category of a [Token].
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    /// Errorneous token that could not be interpreted as any of the other variants.
    Invalid,
    Comment,
    /// A single operator character: one of `=;!+-&|`.
    Operator,
    /// A label declaration. The text of the token excludes the parentheses.
    Label,
    /// A run of decimal digits.
    Integer,
    /// A symbol which begins with a letter or one of `_.$:` and can contain the characters
    /// `A-Za-z0-9_.$:`.
    Identifier,
    Newline,
    /// Produced exactly once after all other tokens.
    EndOfStream,
}

impl From<RawToken> for TokenKind {
    fn from(raw: RawToken) -> TokenKind {
        match raw {
            RawToken::Error => TokenKind::Invalid,
            RawToken::Newline => TokenKind::Newline,
            RawToken::Comment => TokenKind::Comment,
            RawToken::Operator => TokenKind::Operator,
            RawToken::Label => TokenKind::Label,
            RawToken::Integer => TokenKind::Integer,
            RawToken::Identifier => TokenKind::Identifier,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TokenKind::Invalid => "<error>",
            TokenKind::Comment => "comment",
            TokenKind::Operator => "operator",
            TokenKind::Label => "label",
            TokenKind::Integer => "integer",
            TokenKind::Identifier => "identifier",
            TokenKind::Newline => "newline",
            TokenKind::EndOfStream => "end of stream",
        };

        write!(f, "{}", name)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Token<'a> {
    pub kind: TokenKind,

    /// Meaningful text of the token. For labels this is the name without the parentheses.
    pub text: &'a str,

    /// Location of the whole token in the source, delimiters included.
    pub span: Span,

    /// Number of bytes advanced in the source since the end of the previous token, including
    /// any skipped separators.
    pub consumed: usize,
}

impl<'a> Token<'a> {
    /// Returns `true` if separators were skipped between the previous token and this one.
    pub fn is_separated(&self) -> bool {
        self.consumed > self.span.len()
    }
}

impl<'a> fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            TokenKind::Label => write!(f, "({})", self.text),
            TokenKind::Newline => write!(f, "\\n"),
            TokenKind::EndOfStream => write!(f, "<eof>"),
            _ => write!(f, "{}", self.text),
        }
    }
}

/// Lazily splits the source into [Tokens](Token).
///
/// The iterator ends with a single [TokenKind::EndOfStream] token.
pub struct Tokenizer<'a> {
    lexer: Lexer<'a, RawToken>,
    source: &'a str,
    offset: usize,
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Tokenizer<'a> {
        Tokenizer {
            lexer: RawToken::lexer(source),
            source,
            offset: 0,
            finished: false,
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.finished {
            return None;
        }

        let (kind, span) = match self.lexer.next() {
            Some(raw) => (TokenKind::from(raw), self.lexer.span()),
            None => {
                self.finished = true;
                let end = self.source.len();
                (TokenKind::EndOfStream, end..end)
            }
        };

        let text = match kind {
            TokenKind::Label => &self.source[span.start + 1..span.end - 1],
            _ => &self.source[span.clone()],
        };

        let consumed = span.end - self.offset;
        self.offset = span.end;

        Some(Token {
            kind,
            text,
            span,
            consumed,
        })
    }
}
