//! Lox is a tree-walking interpreter for the Lox programming language. It
//! is dynamically typed, with lexical scoping, first-class functions,
//! closures, and single-inheritance classes.
//!
//! ## Pipeline
//! Source text passes through four stages, each gated on the previous one
//! finishing without error:
//!
//! 1. [`scanner`] turns source text into a token stream.
//! 2. [`parser`] turns tokens into an AST ([`expr`], [`stmt`]).
//! 3. [`resolver`] walks the AST once, recording the lexical distance from
//!    every variable reference to its binding scope.
//! 4. [`interpreter`] walks the AST again, this time executing it against
//!    a chain of [`environment`]s.
//!
//! Errors at any stage are reported through [`error::Reporter`] rather
//! than aborting the run; the driver below checks `had_error()` between
//! stages to decide whether to proceed.

pub mod ast;
pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod literal;
pub mod object;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;

use std::fs;
use std::path::PathBuf;
use std::process;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use error::Reporter;
use interpreter::Interpreter;
use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;

const HISTORY_FILE: &str = ".lox_history";

/// Owns the interpreter across a REPL session (so closures and classes
/// defined on one line stay alive for the next) or a single script run.
pub struct Lox {
    interpreter: Interpreter,
}

impl Lox {
    pub fn new() -> Self {
        Lox { interpreter: Interpreter::new() }
    }

    /// Reads and runs a script file, then exits with the code spec.md §6
    /// prescribes: 65 on a compile error, 70 on a runtime error, 0 otherwise.
    pub fn run_file(&mut self, path: &str) {
        let source = fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Could not read file '{path}': {e}");
            process::exit(74);
        });

        let reporter = Reporter::new();
        self.run(&source, &reporter);

        if reporter.had_error() {
            process::exit(65);
        }
        if reporter.had_runtime_error() {
            process::exit(70);
        }
    }

    /// Runs an interactive prompt: one line at a time, with history
    /// recall and editing via `rustyline`. A compile error on one line
    /// does not end the session; it just resets for the next line.
    pub fn run_prompt(&mut self) {
        let mut editor = DefaultEditor::new().expect("failed to initialize the line editor");
        let history_path = history_path();
        if let Some(path) = &history_path {
            let _ = editor.load_history(path);
        }

        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    let reporter = Reporter::new();
                    self.run(&line, &reporter);
                }
                Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => break,
                Err(err) => {
                    eprintln!("Readline error: {err}");
                    break;
                }
            }
        }

        if let Some(path) = &history_path {
            let _ = editor.save_history(path);
        }
    }

    fn run(&mut self, source: &str, reporter: &Reporter) {
        let tokens = Scanner::new(source, reporter).scan_tokens();
        if reporter.had_error() {
            return;
        }

        let statements = Parser::new(tokens, reporter).parse();
        if reporter.had_error() {
            return;
        }

        Resolver::new(&mut self.interpreter, reporter).resolve(&statements);
        if reporter.had_error() {
            return;
        }

        if let Err(runtime_error) = self.interpreter.interpret(&statements) {
            reporter.runtime_error(&runtime_error);
        }
    }
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

fn history_path() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join(HISTORY_FILE))
}
