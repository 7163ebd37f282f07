//! Output handling for VM execution
//!
//! The VM reports three things while running: trace events, text decoded by
//! `printBuf`, and a completion marker once it halts. They all go through the
//! `EventHandler` trait so the same engine can buffer results (tests, library
//! use) or stream them to a terminal.

use std::io::{self, Write};

use colored::Colorize;

use crate::vm::types::VMEvent;

/// Completion marker printed after the machine halts
pub const DONE_MARKER: &str = "done";

/// Defines operations for handling VM events and output
pub trait EventHandler {
    /// Emit text decoded by `printBuf`
    fn emit(&mut self, text: &str);

    /// Emit a trace event
    fn emit_event(&mut self, event: &VMEvent);

    /// Whether trace events are used at all; the VM skips building them
    /// when this is false
    fn wants_events(&self) -> bool {
        true
    }

    /// Called once when the machine halts, with the number of dispatches
    fn halted(&mut self, steps: u64);
}

/// Buffers everything the VM reports
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VMOutput {
    /// One entry per `printBuf`
    output: Vec<String>,

    /// Trace events in emission order
    events: Vec<VMEvent>,

    /// Dispatch count reported at halt
    halted_after: Option<u64>,

    /// Whether trace events are kept
    record_events: bool,
}

impl VMOutput {
    pub fn new() -> Self {
        Self {
            record_events: true,
            ..Self::default()
        }
    }

    /// A buffer that drops trace events, for long programs
    pub fn without_events() -> Self {
        Self::default()
    }

    /// Get the decoded output lines
    pub fn get_output(&self) -> &[String] {
        &self.output
    }

    /// Get the trace events
    pub fn get_events(&self) -> &[VMEvent] {
        &self.events
    }

    /// Dispatch count if the machine has halted
    pub fn halted_after(&self) -> Option<u64> {
        self.halted_after
    }

    /// Clear the output buffer
    pub fn clear_output(&mut self) {
        self.output.clear();
        self.events.clear();
        self.halted_after = None;
    }
}

impl EventHandler for VMOutput {
    fn emit(&mut self, text: &str) {
        self.output.push(text.to_string());
    }

    fn emit_event(&mut self, event: &VMEvent) {
        if self.record_events {
            self.events.push(event.clone());
        }
    }

    fn wants_events(&self) -> bool {
        self.record_events
    }

    fn halted(&mut self, steps: u64) {
        self.halted_after = Some(steps);
    }
}

/// Streams output to a writer (stdout by default): trace lines dimmed,
/// decoded text and the completion marker as plain lines
pub struct ConsoleOutput<W: Write = io::Stdout> {
    writer: W,
    show_trace: bool,
}

impl ConsoleOutput {
    pub fn stdout(show_trace: bool) -> Self {
        Self::new(io::stdout(), show_trace)
    }
}

impl<W: Write> ConsoleOutput<W> {
    pub fn new(writer: W, show_trace: bool) -> Self {
        Self { writer, show_trace }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, line: &str) {
        // The run itself must not fail because stdout went away
        if let Err(err) = writeln!(self.writer, "{}", line) {
            log::warn!("Failed to write output: {}", err);
        }
    }
}

impl<W: Write> EventHandler for ConsoleOutput<W> {
    fn emit(&mut self, text: &str) {
        self.write_line(text);
    }

    fn emit_event(&mut self, event: &VMEvent) {
        if self.show_trace {
            let line = event.to_string();
            self.write_line(&line.dimmed().to_string());
        }
    }

    fn wants_events(&self) -> bool {
        self.show_trace
    }

    fn halted(&mut self, _steps: u64) {
        self.write_line(DONE_MARKER);
        if let Err(err) = self.writer.flush() {
            log::warn!("Failed to flush output: {}", err);
        }
    }
}
