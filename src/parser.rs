use crate::error::Reporter;
use crate::expr::*;
use crate::literal::Literal;
use crate::stmt::*;
use crate::token::{Token, Type};

use std::rc::Rc;

const MAX_ARGS: usize = 255;

/// Recursive-descent parser.
///
/// ```text
/// program     -> declaration* EOF
/// declaration -> classDecl | funDecl | varDecl | statement
/// classDecl   -> "class" IDENTIFIER ("<" IDENTIFIER)? "{" (function | "class" function)* "}"
/// funDecl     -> "fun" function
/// function    -> IDENTIFIER "(" parameters? ")" block
/// varDecl     -> "var" IDENTIFIER ("=" expression)? ";"
/// statement   -> exprStmt | forStmt | ifStmt | printStmt | returnStmt | whileStmt | block
/// block       -> "{" declaration* "}"
/// expression  -> assignment
/// assignment  -> (call ".")? IDENTIFIER "=" assignment | logic_or
/// logic_or    -> logic_and ("or" logic_and)*
/// logic_and   -> equality ("and" equality)*
/// equality    -> comparison (("!=" | "==") comparison)*
/// comparison  -> term ((">" | ">=" | "<" | "<=") term)*
/// term        -> factor (("-" | "+") factor)*
/// factor      -> unary (("/" | "*") unary)*
/// unary       -> ("!" | "-") unary | call
/// call        -> primary ( "(" arguments? ")" | "." IDENTIFIER )*
/// primary     -> "true" | "false" | "nil" | "this" | NUMBER | STRING
///              | IDENTIFIER | "(" expression ")" | "super" "." IDENTIFIER
///              | "fun" "(" parameters? ")" block
/// ```
pub struct Parser<'a> {
    tokens: Vec<Token>,
    current: usize,
    next_id: ExprId,
    reporter: &'a Reporter,
}

/// Raised on an unrecoverable grammar mismatch; the caller synchronizes
/// and resumes at the next declaration. Non-fatal issues (too many
/// arguments, an invalid assignment target) are reported directly and do
/// not interrupt parsing.
struct ParseError;

type ParseResult<T> = Result<T, ParseError>;

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, reporter: &'a Reporter) -> Self {
        Parser { tokens, current: 0, next_id: 0, reporter }
    }

    pub fn parse(mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        statements
    }

    fn fresh_id(&mut self) -> ExprId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == Type::EOF
    }

    fn check(&self, kind: Type) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn matches(&mut self, kinds: &[Type]) -> bool {
        if kinds.iter().any(|kind| self.check(*kind)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: Type, message: &str) -> ParseResult<Token> {
        if self.check(kind) {
            return Ok(self.advance().clone());
        }
        Err(self.error(self.peek().clone(), message))
    }

    fn error(&self, token: Token, message: &str) -> ParseError {
        self.reporter.compile_error(&token, message);
        ParseError
    }

    /// Reports a non-fatal problem without unwinding the current
    /// production (too many args/params, bad assignment target).
    fn warn(&self, token: &Token, message: &str) {
        self.reporter.compile_error(token, message);
    }

    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == Type::Semicolon {
                return;
            }

            match self.peek().kind {
                Type::Class | Type::Fun | Type::Var | Type::For | Type::If | Type::While | Type::Print | Type::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.matches(&[Type::Class]) {
            self.class_declaration()
        } else if self.matches(&[Type::Fun]) {
            self.function_declaration("function").map(|f| Stmt::Function(Rc::new(f)))
        } else if self.matches(&[Type::Var]) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(ParseError) => {
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, "Expect class name.")?;

        let superclass = if self.matches(&[Type::Less]) {
            self.consume(Type::Identifier, "Expect superclass name.")?;
            let id = self.fresh_id();
            Some(Expr::Variable(VariableExpr { id, name: self.previous().clone() }))
        } else {
            None
        };

        self.consume(Type::LeftBrace, "Expect '{' before class body.")?;

        let mut methods = Vec::new();
        let mut static_methods = Vec::new();
        while !self.check(Type::RightBrace) && !self.is_at_end() {
            if self.matches(&[Type::Class]) {
                static_methods.push(Rc::new(self.function_declaration("method")?));
            } else {
                methods.push(Rc::new(self.function_declaration("method")?));
            }
        }

        self.consume(Type::RightBrace, "Expect '}' after class body.")?;

        Ok(Stmt::Class(ClassStmt { name, superclass, methods, static_methods }))
    }

    fn function_declaration(&mut self, kind: &str) -> ParseResult<FunctionStmt> {
        let name = self.consume(Type::Identifier, &format!("Expect {kind} name."))?;
        let (params, body) = self.function_tail(kind)?;
        Ok(FunctionStmt { name, params, body })
    }

    /// Parses `"(" parameters? ")" block`, shared by named functions,
    /// methods, and anonymous lambdas.
    fn function_tail(&mut self, kind: &str) -> ParseResult<(Vec<Token>, Rc<Vec<Stmt>>)> {
        self.consume(Type::LeftParen, &format!("Expect '(' after {kind} name."))?;

        let mut params = Vec::new();
        if !self.check(Type::RightParen) {
            loop {
                if params.len() >= MAX_ARGS {
                    self.warn(self.peek(), "Cannot have more than 255 parameters.");
                }
                params.push(self.consume(Type::Identifier, "Expect parameter name.")?);
                if !self.matches(&[Type::Comma]) {
                    break;
                }
            }
        }
        self.consume(Type::RightParen, "Expect ')' after parameters.")?;

        self.consume(Type::LeftBrace, &format!("Expect '{{' before {kind} body."))?;
        let body = Rc::new(self.block()?);

        Ok((params, body))
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, "Expect variable name.")?;

        let initializer = if self.matches(&[Type::Equal]) { Some(self.expression()?) } else { None };

        self.consume(Type::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var(VarStmt { name, initializer }))
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        if self.matches(&[Type::For]) {
            return self.for_statement();
        }
        if self.matches(&[Type::If]) {
            return self.if_statement();
        }
        if self.matches(&[Type::Print]) {
            return self.print_statement();
        }
        if self.matches(&[Type::Return]) {
            return self.return_statement();
        }
        if self.matches(&[Type::While]) {
            return self.while_statement();
        }
        if self.matches(&[Type::LeftBrace]) {
            return Ok(Stmt::Block(BlockStmt { statements: self.block()? }));
        }

        self.expression_statement()
    }

    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.matches(&[Type::Semicolon]) {
            None
        } else if self.matches(&[Type::Var]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if !self.check(Type::Semicolon) { Some(self.expression()?) } else { None };
        self.consume(Type::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if !self.check(Type::RightParen) { Some(self.expression()?) } else { None };
        self.consume(Type::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(BlockStmt { statements: vec![body, Stmt::Expression(ExpressionStmt { expr: increment })] });
        }

        body = Stmt::While(WhileStmt {
            condition: condition.unwrap_or(Expr::Literal(Literal::Bool(true))),
            body: Box::new(body),
        });

        if let Some(initializer) = initializer {
            body = Stmt::Block(BlockStmt { statements: vec![initializer, body] });
        }

        Ok(body)
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(Type::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.matches(&[Type::Else]) { Some(Box::new(self.statement()?)) } else { None };

        Ok(Stmt::If(IfStmt { condition, then_branch, else_branch }))
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(Type::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print(PrintStmt { expr }))
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();

        let value = if !self.check(Type::Semicolon) { Some(self.expression()?) } else { None };

        self.consume(Type::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return(ReturnStmt { keyword, value }))
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(Type::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);

        Ok(Stmt::While(WhileStmt { condition, body }))
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(Type::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(ExpressionStmt { expr }))
    }

    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        while !self.check(Type::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        self.consume(Type::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if self.matches(&[Type::Equal]) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            return match expr {
                Expr::Variable(variable) => {
                    let id = self.fresh_id();
                    Ok(Expr::Assign(AssignExpr { id, name: variable.name, value: Box::new(value) }))
                }
                Expr::Get(get) => Ok(Expr::Set(SetExpr { object: get.object, name: get.name, value: Box::new(value) })),
                other => {
                    self.warn(&equals, "Invalid assignment target.");
                    Ok(other)
                }
            };
        }

        Ok(expr)
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;

        while self.matches(&[Type::Or]) {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = Expr::Logical(LogicalExpr { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;

        while self.matches(&[Type::And]) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical(LogicalExpr { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;

        while self.matches(&[Type::BangEqual, Type::EqualEqual]) {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::Binary(BinaryExpr { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.term()?;

        while self.matches(&[Type::Greater, Type::GreaterEqual, Type::Less, Type::LessEqual]) {
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = Expr::Binary(BinaryExpr { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.factor()?;

        while self.matches(&[Type::Minus, Type::Plus]) {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::Binary(BinaryExpr { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;

        while self.matches(&[Type::Slash, Type::Star]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::Binary(BinaryExpr { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[Type::Bang, Type::Minus]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            return Ok(Expr::Unary(UnaryExpr { operator, right: Box::new(right) }));
        }

        self.call()
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = Vec::new();

        if !self.check(Type::RightParen) {
            loop {
                if arguments.len() >= MAX_ARGS {
                    self.warn(self.peek(), "Cannot have more than 255 arguments.");
                }
                arguments.push(self.expression()?);
                if !self.matches(&[Type::Comma]) {
                    break;
                }
            }
        }

        let paren = self.consume(Type::RightParen, "Expect ')' after arguments.")?;

        Ok(Expr::Call(CallExpr { callee: Box::new(callee), paren, arguments }))
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            if self.matches(&[Type::LeftParen]) {
                expr = self.finish_call(expr)?;
            } else if self.matches(&[Type::Dot]) {
                let name = self.consume(Type::Identifier, "Expect property name after '.'.")?;
                expr = Expr::Get(GetExpr { object: Box::new(expr), name });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[Type::False]) {
            return Ok(Expr::Literal(Literal::Bool(false)));
        }
        if self.matches(&[Type::True]) {
            return Ok(Expr::Literal(Literal::Bool(true)));
        }
        if self.matches(&[Type::Nil]) {
            return Ok(Expr::Literal(Literal::Nil));
        }
        if self.matches(&[Type::Number, Type::String]) {
            let literal = self.previous().literal.clone().expect("number or string token carries a literal");
            return Ok(Expr::Literal(literal));
        }
        if self.matches(&[Type::Super]) {
            let keyword = self.previous().clone();
            self.consume(Type::Dot, "Expect '.' after 'super'.")?;
            let method = self.consume(Type::Identifier, "Expect superclass method name.")?;
            let id = self.fresh_id();
            return Ok(Expr::Super(SuperExpr { id, keyword, method }));
        }
        if self.matches(&[Type::This]) {
            let id = self.fresh_id();
            return Ok(Expr::This(ThisExpr { id, keyword: self.previous().clone() }));
        }
        if self.matches(&[Type::Identifier]) {
            let id = self.fresh_id();
            return Ok(Expr::Variable(VariableExpr { id, name: self.previous().clone() }));
        }
        if self.matches(&[Type::Fun]) {
            let (params, body) = self.function_tail("lambda")?;
            return Ok(Expr::Function(FunctionExpr { params, body }));
        }
        if self.matches(&[Type::LeftParen]) {
            let expr = self.expression()?;
            self.consume(Type::RightParen, "Expect ')' after expression.")?;
            return Ok(Expr::Grouping(GroupingExpr { expression: Box::new(expr) }));
        }

        Err(self.error(self.peek().clone(), "Expect expression."))
    }
}
