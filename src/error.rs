use std::cell::Cell;
use std::fmt;

use crate::token::{Token, Type};

/// Owns the "had error" / "had runtime error" flags the driver checks
/// between pipeline stages (spec: parsing only proceeds if scanning had no
/// errors, resolving only if parsing had none, interpreting only if
/// resolving had none). Threaded by reference into the scanner, parser,
/// resolver, and interpreter instead of living behind a process-global
/// `static mut`, so a test harness can run many independent interpreters
/// in one process.
#[derive(Default)]
pub struct Reporter {
    had_error: Cell<bool>,
    had_runtime_error: Cell<bool>,
}

impl Reporter {
    pub fn new() -> Self {
        Reporter::default()
    }

    pub fn had_error(&self) -> bool {
        self.had_error.get()
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error.get()
    }

    pub fn reset(&self) {
        self.had_error.set(false);
        self.had_runtime_error.set(false);
    }

    /// A scanner error: no token context, just a line.
    pub fn scan_error(&self, line: usize, message: impl Into<String>) {
        self.report(line, "", &message.into());
    }

    /// A parse or resolve error: anchored to a token, which supplies
    /// both the line and the `at '<lexeme>'` / `at end` context.
    pub fn compile_error(&self, token: &Token, message: impl Into<String>) {
        let message = message.into();
        if token.kind == Type::EOF {
            self.report(token.line, " at end", &message);
        } else {
            self.report(token.line, &format!(" at '{}'", token.lexeme), &message);
        }
    }

    fn report(&self, line: usize, location: &str, message: &str) {
        eprintln!("[line {line}] Error{location}: {message}");
        self.had_error.set(true);
    }

    pub fn runtime_error(&self, error: &RuntimeError) {
        eprintln!("{}\n[line {}]", error.message, error.token.line);
        self.had_runtime_error.set(true);
    }
}

/// A runtime error, carrying the token at which it occurred so the host
/// can report a line number. Propagated with `?` through evaluation and
/// execution; caught only at the top-level `interpret` boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    pub fn new(token: Token, message: impl Into<String>) -> Self {
        RuntimeError { token, message: message.into() }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [line {}]", self.message, self.token.line)
    }
}

impl std::error::Error for RuntimeError {}
