use std::collections::HashMap;
use std::mem;

use crate::error::Reporter;
use crate::expr::{AssignExpr, Expr, SuperExpr, ThisExpr, VariableExpr};
use crate::interpreter::Interpreter;
use crate::stmt::{ClassStmt, FunctionStmt, Stmt};
use crate::token::Token;

#[derive(Clone, Copy, PartialEq)]
enum FunctionType {
    None,
    Function,
    Initializer,
    Method,
}

#[derive(Clone, Copy, PartialEq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

/// Static resolution pass, run after parsing and before interpretation.
/// Walks the AST once, recording in the interpreter how many scopes out
/// each variable reference resolves to, and catches the handful of
/// errors that can only be seen statically (returning from top level,
/// `this`/`super` outside a class, self-inheritance).
pub struct Resolver<'a> {
    interpreter: &'a mut Interpreter,
    reporter: &'a Reporter,
    scopes: Vec<HashMap<String, bool>>,
    current_function: FunctionType,
    current_class: ClassType,
}

impl<'a> Resolver<'a> {
    pub fn new(interpreter: &'a mut Interpreter, reporter: &'a Reporter) -> Self {
        Resolver {
            interpreter,
            reporter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
        }
    }

    pub fn resolve(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.resolve_stmt(statement);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(block) => {
                self.begin_scope();
                self.resolve(&block.statements);
                self.end_scope();
            }
            Stmt::Class(class_stmt) => self.resolve_class(class_stmt),
            Stmt::Expression(expression_stmt) => self.resolve_expr(&expression_stmt.expr),
            Stmt::Function(function) => {
                self.declare(&function.name);
                self.define(&function.name);
                self.resolve_function(function, FunctionType::Function);
            }
            Stmt::If(if_stmt) => {
                self.resolve_expr(&if_stmt.condition);
                self.resolve_stmt(&if_stmt.then_branch);
                if let Some(else_branch) = &if_stmt.else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::Print(print_stmt) => self.resolve_expr(&print_stmt.expr),
            Stmt::Return(return_stmt) => {
                if self.current_function == FunctionType::None {
                    self.reporter.compile_error(&return_stmt.keyword, "Cannot return from top-level code.");
                }

                if let Some(value) = &return_stmt.value {
                    if self.current_function == FunctionType::Initializer {
                        self.reporter.compile_error(&return_stmt.keyword, "Cannot return a value from an initializer.");
                    } else {
                        self.resolve_expr(value);
                    }
                }
            }
            Stmt::Var(var_stmt) => {
                self.declare(&var_stmt.name);
                if let Some(initializer) = &var_stmt.initializer {
                    self.resolve_expr(initializer);
                }
                self.define(&var_stmt.name);
            }
            Stmt::While(while_stmt) => {
                self.resolve_expr(&while_stmt.condition);
                self.resolve_stmt(&while_stmt.body);
            }
        }
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Assign(assign) => self.resolve_assign(assign),
            Expr::Binary(binary) => {
                self.resolve_expr(&binary.left);
                self.resolve_expr(&binary.right);
            }
            Expr::Call(call) => {
                self.resolve_expr(&call.callee);
                for argument in &call.arguments {
                    self.resolve_expr(argument);
                }
            }
            Expr::Function(function_expr) => {
                let enclosing_function = mem::replace(&mut self.current_function, FunctionType::Function);
                self.begin_scope();
                for param in &function_expr.params {
                    self.declare(param);
                    self.define(param);
                }
                self.resolve(&function_expr.body);
                self.end_scope();
                self.current_function = enclosing_function;
            }
            Expr::Get(get) => self.resolve_expr(&get.object),
            Expr::Grouping(grouping) => self.resolve_expr(&grouping.expression),
            Expr::Literal(_) => {}
            Expr::Logical(logical) => {
                self.resolve_expr(&logical.left);
                self.resolve_expr(&logical.right);
            }
            Expr::Set(set) => {
                self.resolve_expr(&set.value);
                self.resolve_expr(&set.object);
            }
            Expr::Super(super_expr) => self.resolve_super(super_expr),
            Expr::This(this) => self.resolve_this(this),
            Expr::Unary(unary) => self.resolve_expr(&unary.right),
            Expr::Variable(variable) => self.resolve_variable(variable),
        }
    }

    fn resolve_variable(&mut self, variable: &VariableExpr) {
        if let Some(scope) = self.scopes.last() {
            if scope.get(&variable.name.lexeme) == Some(&false) {
                self.reporter.compile_error(&variable.name, "Cannot read local variable in its own initializer.");
            }
        }

        self.resolve_local(variable.id, &variable.name);
    }

    fn resolve_assign(&mut self, assign: &AssignExpr) {
        self.resolve_expr(&assign.value);
        self.resolve_local(assign.id, &assign.name);
    }

    fn resolve_this(&mut self, this: &ThisExpr) {
        if self.current_class == ClassType::None {
            self.reporter.compile_error(&this.keyword, "Cannot use 'this' outside of a class.");
            return;
        }

        self.resolve_local(this.id, &this.keyword);
    }

    fn resolve_super(&mut self, super_expr: &SuperExpr) {
        match self.current_class {
            ClassType::Subclass => {}
            ClassType::None => self.reporter.compile_error(&super_expr.keyword, "Cannot use 'super' outside of a class."),
            ClassType::Class => self.reporter.compile_error(&super_expr.keyword, "Cannot use 'super' in a class with no superclass."),
        }

        self.resolve_local(super_expr.id, &super_expr.keyword);
    }

    fn resolve_function(&mut self, function: &FunctionStmt, kind: FunctionType) {
        let enclosing_function = mem::replace(&mut self.current_function, kind);

        self.begin_scope();
        for param in &function.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve(&function.body);
        self.end_scope();

        self.current_function = enclosing_function;
    }

    fn resolve_class(&mut self, class_stmt: &ClassStmt) {
        let enclosing_class = mem::replace(&mut self.current_class, ClassType::Class);

        self.declare(&class_stmt.name);
        self.define(&class_stmt.name);

        if let Some(superclass) = &class_stmt.superclass {
            let Expr::Variable(variable) = superclass else {
                unreachable!("classDecl only parses a superclass as a variable reference")
            };
            if class_stmt.name.lexeme == variable.name.lexeme {
                self.reporter.compile_error(&variable.name, "A class cannot inherit from itself.");
            }

            self.current_class = ClassType::Subclass;
            self.resolve_expr(superclass);

            self.begin_scope();
            self.scopes.last_mut().expect("scope just pushed").insert("super".to_string(), true);
        }

        // Static methods never see `this`, so they resolve outside the
        // scope that defines it.
        for method in &class_stmt.static_methods {
            self.resolve_function(method, FunctionType::Function);
        }

        self.begin_scope();
        self.scopes.last_mut().expect("scope just pushed").insert("this".to_string(), true);

        for method in &class_stmt.methods {
            let kind = if method.name.lexeme == "init" { FunctionType::Initializer } else { FunctionType::Method };
            self.resolve_function(method, kind);
        }

        self.end_scope();

        if class_stmt.superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else { return };

        if scope.contains_key(&name.lexeme) {
            self.reporter.compile_error(name, format!("Already a variable with this name in this scope: '{}'.", name.lexeme));
        }
        scope.insert(name.lexeme.clone(), false);
    }

    fn define(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else { return };
        scope.insert(name.lexeme.clone(), true);
    }

    fn resolve_local(&mut self, id: crate::expr::ExprId, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                self.interpreter.resolve(id, depth);
                return;
            }
        }
        // Not found in any scope: treated as global, left unresolved.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Reporter;
    use crate::parser::Parser;
    use crate::scanner::Scanner;

    fn resolve(source: &str) -> (Interpreter, Reporter) {
        let reporter = Reporter::new();
        let tokens = Scanner::new(source, &reporter).scan_tokens();
        let statements = Parser::new(tokens, &reporter).parse();
        let mut interpreter = Interpreter::new();
        Resolver::new(&mut interpreter, &reporter).resolve(&statements);
        (interpreter, reporter)
    }

    #[test]
    fn shadowed_local_read_in_its_own_initializer_is_an_error() {
        let (_, reporter) = resolve("{ var a = a; }");
        assert!(reporter.had_error());
    }

    #[test]
    fn return_at_top_level_is_an_error() {
        let (_, reporter) = resolve("return 1;");
        assert!(reporter.had_error());
    }

    #[test]
    fn return_value_from_initializer_is_an_error() {
        let (_, reporter) = resolve("class A { init() { return 1; } }");
        assert!(reporter.had_error());
    }

    #[test]
    fn this_outside_a_class_is_an_error() {
        let (_, reporter) = resolve("print this;");
        assert!(reporter.had_error());
    }

    #[test]
    fn super_without_a_superclass_is_an_error() {
        let (_, reporter) = resolve("class A { method() { super.method(); } }");
        assert!(reporter.had_error());
    }

    #[test]
    fn class_inheriting_from_itself_is_an_error() {
        let (_, reporter) = resolve("class A < A {}");
        assert!(reporter.had_error());
    }

    #[test]
    fn well_formed_class_hierarchy_resolves_cleanly() {
        let (_, reporter) = resolve(
            "class A { method() { return this; } } \
             class B < A { method() { return super.method(); } }",
        );
        assert!(!reporter.had_error());
    }

    #[test]
    fn static_method_this_reference_resolves_as_an_unbound_global() {
        // Static methods resolve with no `this` scope, so a reference to
        // `this` inside one is left unresolved here; it only fails at
        // runtime, as an undefined variable, not as a resolve error.
        let (_, reporter) = resolve("class A { class make() { return this; } }");
        assert!(!reporter.had_error());
    }
}
