//! The instruction parser.
//!
//! Tokens are classified one by one and pushed onto an expression stack. The stack is reduced
//! into an instruction on every newline, label and at the end of the input, and whenever a
//! whitespace separated value can not continue the instruction on the stack. Errors do not stop
//! the parser: the offending token or instruction is dropped and parsing continues, so that a
//! single pass reports every independent error.

use std::convert::TryFrom;
use std::mem;

use slog::{debug, o, trace, Discard, Logger};

use crate::error::{Error, ErrorKind};
use crate::event::{Event, EventDispatcher, EventListener};
use crate::instruction::Instruction;
use crate::parsing::{line_location, Span};
use crate::symbol_table::{SymbolKind, SymbolTable, MAX_ADDRESS};

use super::grammar::{parse_addressing, parse_compute};
use super::program::{InstructionEntry, Program};
use super::semantic::{classify, SemanticValue};
use super::token::{Token, TokenKind, Tokenizer};

/// Values of the instruction being parsed, together with their source spans.
#[derive(Debug, Default)]
struct ExpressionStack {
    values: Vec<SemanticValue>,
    spans: Vec<Span>,
}

impl ExpressionStack {
    fn push(&mut self, value: SemanticValue, span: Span) {
        self.values.push(value);
        self.spans.push(span);
    }

    fn last(&self) -> Option<&SemanticValue> {
        self.values.last()
    }

    fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Span from the start of the first value to the end of the last one.
    fn span(&self) -> Span {
        match (self.spans.first(), self.spans.last()) {
            (Some(first), Some(last)) => first.start..last.end,
            _ => 0..0,
        }
    }
}

pub struct Parser<'a> {
    source: &'a str,
    tokens: Tokenizer<'a>,
    stack: ExpressionStack,
    symbol_table: SymbolTable,
    instructions: Vec<InstructionEntry>,
    pending_labels: Vec<String>,
    /// Set when a token was dropped since the last pushed value. A dropped token separates
    /// the values around it.
    dropped: bool,
    errors: Vec<Error>,
    logger: Logger,
    dispatcher: EventDispatcher<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Parser<'a> {
        Parser::with_logger(source, None)
    }

    pub fn with_logger<L>(source: &'a str, logger: L) -> Parser<'a>
    where
        L: Into<Option<Logger>>,
    {
        let logger = logger
            .into()
            .unwrap_or(Logger::root(Discard, o!()))
            .new(o!("stage" => "parsing"));

        Parser {
            source,
            tokens: Tokenizer::new(source),
            stack: ExpressionStack::default(),
            symbol_table: SymbolTable::new(),
            instructions: Vec::new(),
            pending_labels: Vec::new(),
            dropped: false,
            errors: Vec::new(),
            logger,
            dispatcher: EventDispatcher::new(),
        }
    }

    /// Registers a listener that receives every [Event] as soon as it happens.
    pub fn add_listener<L: EventListener + 'a>(&mut self, listener: L) {
        self.dispatcher.add_listener(listener);
    }

    /// Parses the whole input.
    ///
    /// Returns every error found if there was at least one.
    pub fn parse(mut self) -> Result<Program, Vec<Error>> {
        while let Some(token) = self.tokens.next() {
            self.handle_token(token);
        }

        debug!(self.logger, "parsing finished";
            "instructions" => self.instructions.len(),
            "errors" => self.errors.len());

        if !self.errors.is_empty() {
            return Err(self.errors);
        }

        Ok(Program {
            instructions: self.instructions,
            symbol_table: self.symbol_table,
        })
    }

    fn handle_token(&mut self, token: Token<'a>) {
        match token.kind {
            TokenKind::Comment => {}
            TokenKind::Newline | TokenKind::EndOfStream => self.collapse_stack(),
            TokenKind::Label => {
                self.collapse_stack();
                self.define_label(&token);
            }
            _ => self.push_token(&token),
        }
    }

    fn push_token(&mut self, token: &Token<'a>) {
        let value = match classify(token) {
            Ok(value) => value,
            Err(kind) => {
                self.report(Error::new(kind, token.span.clone()));
                self.dropped = true;
                return;
            }
        };

        let dropped = mem::replace(&mut self.dropped, false);
        let separated = dropped || token.is_separated();

        let splits = match self.stack.last() {
            Some(last) => separated && !value.valid_after(last),
            None => false,
        };

        if splits {
            self.collapse_stack();
        }

        trace!(self.logger, "push value"; "value" => %value, "start" => token.span.start);

        self.stack.push(value, token.span.clone());
    }

    fn define_label(&mut self, token: &Token<'a>) {
        let name = match classify(token) {
            Ok(SemanticValue::Identifier(name)) => name,
            Ok(_) => {
                self.report(Error::new(ErrorKind::InvalidTokenData, token.span.clone()));
                return;
            }
            Err(kind) => {
                self.report(Error::new(kind, token.span.clone()));
                return;
            }
        };

        let address = match u16::try_from(self.instructions.len()) {
            Ok(address) if address <= MAX_ADDRESS => address,
            _ => {
                let help = format!("labels can only be bound up to address {}", MAX_ADDRESS);
                let error = Error::new(ErrorKind::AddressOutOfRange, token.span.clone()).with_help(Some(help));
                self.report(error);
                return;
            }
        };

        let duplicate = match self.symbol_table.define_label(token.span.clone(), &name, address) {
            Ok(()) => None,
            Err(existing) => Some(match (&existing.kind, &existing.defined) {
                (SymbolKind::Label, Some(span)) => Some(format!(
                    "first defined at {}",
                    line_location(self.source, span.start)
                )),
                (SymbolKind::Predefined, _) => Some(format!("`{}` is a predefined symbol", name)),
                _ => None,
            }),
        };

        if let Some(help) = duplicate {
            let error = Error::new(ErrorKind::DuplicateLabel, token.span.clone()).with_help(help);
            self.report(error);
            return;
        }

        trace!(self.logger, "define label"; "label" => %name, "address" => address);

        self.dispatcher.dispatch(Event::LabelDefined {
            label: name.clone(),
            address,
        });

        self.pending_labels.push(name);
    }

    /// Reduces the expression stack into an instruction.
    fn collapse_stack(&mut self) {
        if self.stack.is_empty() {
            return;
        }

        let stack = mem::take(&mut self.stack);
        let expression = stack.span();

        let result = match stack.values.len() {
            1 => parse_addressing(&stack.values[0]).map(Instruction::Addressing),
            _ => parse_compute(&stack.values).map(Instruction::Compute),
        };

        let instruction = match result {
            Ok(instruction) => instruction,
            Err(err) => {
                let span = err
                    .index
                    .and_then(|index| stack.spans.get(index))
                    .cloned()
                    .unwrap_or_else(|| expression.clone());

                let error = Error::new(err.kind, span)
                    .with_expression(expression)
                    .with_help(err.help);

                self.report(error);
                return;
            }
        };

        let index = self.instructions.len();

        trace!(self.logger, "collapse stack";
            "index" => index,
            "instruction" => %instruction,
            "values" => stack.values.len());

        self.dispatcher.dispatch(Event::InstructionEmitted {
            index,
            span: expression.clone(),
        });

        self.instructions.push(InstructionEntry {
            instruction,
            span: expression,
            labels: mem::take(&mut self.pending_labels),
        });
    }

    fn report(&mut self, error: Error) {
        debug!(self.logger, "error"; "kind" => ?error.kind, "start" => error.span.start, "end" => error.span.end);

        self.dispatcher.dispatch(Event::Diagnostic(error.clone()));
        self.errors.push(error);
    }
}
