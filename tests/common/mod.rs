use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use lox::error::{Reporter, RuntimeError};
use lox::interpreter::Interpreter;
use lox::parser::Parser;
use lox::resolver::Resolver;
use lox::scanner::Scanner;

/// A `Write` sink backed by a shared buffer, so the buffer can still be
/// read after the `Box<dyn Write>` it's wrapped in is handed to and
/// consumed by an `Interpreter`.
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs a complete program through scan -> parse -> resolve -> interpret,
/// capturing everything written via `print`. Panics on a compile error or
/// a runtime error: use [`run_allowing_runtime_error`] for tests that
/// expect one.
pub fn run(source: &str) -> String {
    let (output, result) = run_capturing(source);
    result.expect("unexpected runtime error");
    output
}

/// Like [`run`], but returns the runtime error instead of panicking on one.
pub fn run_allowing_runtime_error(source: &str) -> (String, Result<(), RuntimeError>) {
    run_capturing(source)
}

fn run_capturing(source: &str) -> (String, Result<(), RuntimeError>) {
    let reporter = Reporter::new();
    let tokens = Scanner::new(source, &reporter).scan_tokens();
    assert!(!reporter.had_error(), "unexpected scan error in: {source}");

    let statements = Parser::new(tokens, &reporter).parse();
    assert!(!reporter.had_error(), "unexpected parse error in: {source}");

    let buffer = Rc::new(RefCell::new(Vec::new()));
    let mut interpreter = Interpreter::with_output(Box::new(SharedBuffer(Rc::clone(&buffer))));

    Resolver::new(&mut interpreter, &reporter).resolve(&statements);
    assert!(!reporter.had_error(), "unexpected resolve error in: {source}");

    let result = interpreter.interpret(&statements);
    let output = String::from_utf8(buffer.borrow().clone()).expect("print output is valid utf-8");
    (output, result)
}

/// Returns whether scanning, parsing, or resolving `source` reports a
/// compile error, without running it. Used by tests for parser/resolver
/// error cases that never reach the interpreter.
pub fn has_compile_error(source: &str) -> bool {
    let reporter = Reporter::new();
    let tokens = Scanner::new(source, &reporter).scan_tokens();
    if reporter.had_error() {
        return true;
    }

    let statements = Parser::new(tokens, &reporter).parse();
    if reporter.had_error() {
        return true;
    }

    let mut interpreter = Interpreter::new();
    Resolver::new(&mut interpreter, &reporter).resolve(&statements);
    reporter.had_error()
}
