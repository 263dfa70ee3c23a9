use std::str::Chars;

use peekmore::{PeekMore, PeekMoreIterator};

use crate::error::Reporter;
use crate::literal::Literal;
use crate::token::{Token, Type};

/// Converts source text into a token stream. Built over a `PeekMore`
/// iterator rather than byte indices so the implementation stays correct
/// for multi-byte UTF-8 source.
pub struct Scanner<'a> {
    source: PeekMoreIterator<Chars<'a>>,
    tokens: Vec<Token>,
    lexeme: String,
    line: usize,
    reporter: &'a Reporter,
}

const KEYWORDS: &[(&str, Type)] = &[
    ("and", Type::And),
    ("class", Type::Class),
    ("else", Type::Else),
    ("false", Type::False),
    ("for", Type::For),
    ("fun", Type::Fun),
    ("if", Type::If),
    ("nil", Type::Nil),
    ("or", Type::Or),
    ("print", Type::Print),
    ("return", Type::Return),
    ("super", Type::Super),
    ("this", Type::This),
    ("true", Type::True),
    ("var", Type::Var),
    ("while", Type::While),
];

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str, reporter: &'a Reporter) -> Scanner<'a> {
        Scanner {
            source: source.chars().peekmore(),
            tokens: Vec::new(),
            lexeme: String::new(),
            line: 1,
            reporter,
        }
    }

    /// Scans the whole source and returns its tokens, always terminated
    /// by exactly one `EOF`.
    pub fn scan_tokens(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.lexeme.clear();
            self.scan_token();
        }

        self.tokens.push(Token::new(Type::EOF, String::new(), None, self.line));
        self.tokens
    }

    fn is_at_end(&mut self) -> bool {
        self.source.peek().is_none()
    }

    fn advance(&mut self) -> char {
        let c = self.source.next().expect("advance past end of source");
        self.lexeme.push(c);
        c
    }

    fn peek(&mut self) -> char {
        self.source.peek().copied().unwrap_or('\0')
    }

    fn peek_next(&mut self) -> char {
        self.source.peek_next().copied().unwrap_or('\0')
    }

    /// Consumes the next character if it matches `expected`.
    fn matches(&mut self, expected: char) -> bool {
        if self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn add_token(&mut self, kind: Type, literal: Option<Literal>) {
        self.tokens.push(Token::new(kind, self.lexeme.clone(), literal, self.line));
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            '(' => self.add_token(Type::LeftParen, None),
            ')' => self.add_token(Type::RightParen, None),
            '{' => self.add_token(Type::LeftBrace, None),
            '}' => self.add_token(Type::RightBrace, None),
            ',' => self.add_token(Type::Comma, None),
            '.' => self.add_token(Type::Dot, None),
            '-' => self.add_token(Type::Minus, None),
            '+' => self.add_token(Type::Plus, None),
            ';' => self.add_token(Type::Semicolon, None),
            '*' => self.add_token(Type::Star, None),

            '!' => {
                let kind = if self.matches('=') { Type::BangEqual } else { Type::Bang };
                self.add_token(kind, None);
            }
            '=' => {
                let kind = if self.matches('=') { Type::EqualEqual } else { Type::Equal };
                self.add_token(kind, None);
            }
            '<' => {
                let kind = if self.matches('=') { Type::LessEqual } else { Type::Less };
                self.add_token(kind, None);
            }
            '>' => {
                let kind = if self.matches('=') { Type::GreaterEqual } else { Type::Greater };
                self.add_token(kind, None);
            }
            '/' => {
                if self.matches('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(Type::Slash, None);
                }
            }

            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,

            '"' => self.string(),

            c if c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() || c == '_' => self.identifier(),

            _ => self.reporter.scan_error(self.line, format!("Unexpected character '{c}'.")),
        }
    }

    fn string(&mut self) {
        let start_line = self.line;

        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            self.reporter.scan_error(start_line, "Unterminated string.");
            return;
        }

        self.advance(); // closing quote

        // Literal excludes the surrounding quotes; the lexeme includes them.
        let value = self.lexeme[1..self.lexeme.len() - 1].to_string();
        self.add_token(Type::String, Some(Literal::String(value)));
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance(); // consume the '.'
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let value: f64 = self.lexeme.parse().expect("scanned digits to parse as f64");
        self.add_token(Type::Number, Some(Literal::Number(value)));
    }

    fn identifier(&mut self) {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let kind = KEYWORDS
            .iter()
            .find(|(keyword, _)| *keyword == self.lexeme)
            .map(|(_, kind)| *kind)
            .unwrap_or(Type::Identifier);

        self.add_token(kind, None);
    }
}
