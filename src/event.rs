//! Event handling.
//!
//! The parser exposes an event-based interface for reacting to its progress in real-time.
//! [EventListeners](EventListener) can be registered on the
//! [Parser](crate::symbolic::parser::Parser) with the
//! [add_listener](crate::symbolic::parser::Parser::add_listener) method. Diagnostics are delivered
//! this way as soon as they are detected, so a front-end can print them without waiting for the
//! whole input to be parsed.
//!
//! A blanket implementation of [EventListener] for all `FnMut(&Event)` is provided.

use crate::error::Error;
use crate::parsing::Span;

/// Represents an event that occurred while parsing a program.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// An error was detected. Parsing continues after the error.
    Diagnostic(Error),

    /// A label was bound to an instruction address.
    LabelDefined {
        /// Name of the label.
        label: String,

        /// Index of the instruction following the label.
        address: u16,
    },

    /// An instruction was appended to the program.
    InstructionEmitted {
        /// Index of the instruction in the program.
        index: usize,

        /// Source span of the instruction.
        span: Span,
    },
}

/// Trait for consuming events.
pub trait EventListener {
    /// Called whenever a new event has been created.
    fn event(&mut self, event: &Event);
}

impl<F> EventListener for F where F: FnMut(&Event) {
    fn event(&mut self, event: &Event) {
        self(event)
    }
}

pub(crate) struct EventDispatcher<'l> {
    listeners: Vec<Box<dyn EventListener + 'l>>,
}

impl<'l> EventDispatcher<'l> {
    pub fn new() -> EventDispatcher<'l> {
        EventDispatcher {
            listeners: Vec::new(),
        }
    }

    pub fn add_listener<L: EventListener + 'l>(&mut self, listener: L) {
        self.listeners.push(Box::new(listener) as Box<dyn EventListener + 'l>)
    }

    pub fn dispatch(&mut self, event: Event) {
        for listener in &mut self.listeners {
            listener.event(&event);
        }
    }
}
