use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use crate::class::{Class, Instance};
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::expr::{BinaryExpr, CallExpr, Expr, ExprId, GetExpr, LogicalExpr, SetExpr, SuperExpr, UnaryExpr};
use crate::function::{Function, NativeFunction};
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::{ClassStmt, FunctionStmt, Stmt};
use crate::token::{Token, Type};

/// What executing a statement yields: either it ran to completion, or a
/// `return` unwound through it carrying a value. Threaded explicitly
/// through `execute`/`execute_block` rather than encoded as an error, so
/// the `Result` channel stays reserved for actual failures.
pub enum Completion {
    Normal,
    Return(Object),
}

pub struct Interpreter {
    pub globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<ExprId, usize>,
    output: Box<dyn Write>,
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter::with_output(Box::new(io::stdout()))
    }

    /// Builds an interpreter that writes `print` output to `output`
    /// instead of stdout, so tests can capture it.
    pub fn with_output(output: Box<dyn Write>) -> Self {
        let globals = Rc::new(RefCell::new(Environment::new(None)));
        for native in NativeFunction::globals() {
            globals.borrow_mut().define(native.name(), Object::NativeFunction(Rc::new(native)));
        }

        Interpreter { environment: Rc::clone(&globals), globals, locals: HashMap::new(), output }
    }

    /// Called by the resolver: records that the expression with this id
    /// resolves `depth` environment hops up from wherever it is evaluated.
    pub fn resolve(&mut self, id: ExprId, depth: usize) {
        self.locals.insert(id, depth);
    }

    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for statement in statements {
            self.execute(statement)?;
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<Completion, RuntimeError> {
        match stmt {
            Stmt::Block(block) => {
                let scope = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.environment)))));
                self.execute_block(&block.statements, scope)
            }
            Stmt::Class(class_stmt) => {
                self.execute_class(class_stmt)?;
                Ok(Completion::Normal)
            }
            Stmt::Expression(expression) => {
                self.evaluate(&expression.expr)?;
                Ok(Completion::Normal)
            }
            Stmt::Function(declaration) => {
                let function = Function::new(Rc::clone(declaration), Rc::clone(&self.environment), false);
                self.environment.borrow_mut().define(&declaration.name.lexeme, Object::Function(Rc::new(function)));
                Ok(Completion::Normal)
            }
            Stmt::If(if_stmt) => {
                if self.evaluate(&if_stmt.condition)?.is_truthy() {
                    self.execute(&if_stmt.then_branch)
                } else if let Some(else_branch) = &if_stmt.else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Completion::Normal)
                }
            }
            Stmt::Print(print_stmt) => {
                let value = self.evaluate(&print_stmt.expr)?;
                writeln!(self.output, "{value}").expect("write to print sink");
                Ok(Completion::Normal)
            }
            Stmt::Return(return_stmt) => {
                let value = match &return_stmt.value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Object::NIL,
                };
                Ok(Completion::Return(value))
            }
            Stmt::Var(var_stmt) => {
                let value = match &var_stmt.initializer {
                    Some(initializer) => self.evaluate(initializer)?,
                    None => Object::NIL,
                };
                self.environment.borrow_mut().define(&var_stmt.name.lexeme, value);
                Ok(Completion::Normal)
            }
            Stmt::While(while_stmt) => {
                while self.evaluate(&while_stmt.condition)?.is_truthy() {
                    match self.execute(&while_stmt.body)? {
                        Completion::Normal => {}
                        returning @ Completion::Return(_) => return Ok(returning),
                    }
                }
                Ok(Completion::Normal)
            }
        }
    }

    /// Runs `statements` against `environment`, restoring the previous
    /// current environment on every exit path (normal completion, a
    /// propagated `return`, or a propagated error).
    pub fn execute_block(&mut self, statements: &[Stmt], environment: Rc<RefCell<Environment>>) -> Result<Completion, RuntimeError> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let result = (|| {
            for statement in statements {
                match self.execute(statement)? {
                    Completion::Normal => {}
                    returning @ Completion::Return(_) => return Ok(returning),
                }
            }
            Ok(Completion::Normal)
        })();

        self.environment = previous;
        result
    }

    fn execute_class(&mut self, class_stmt: &ClassStmt) -> Result<(), RuntimeError> {
        let superclass = match &class_stmt.superclass {
            Some(superclass_expr) => {
                let value = self.evaluate(superclass_expr)?;
                match value {
                    Object::Class(class) => Some(class),
                    _ => {
                        let token = superclass_token(superclass_expr);
                        return Err(RuntimeError::new(token, "Superclass must be a class."));
                    }
                }
            }
            None => None,
        };

        // Forward reference, so the class's own methods can call
        // recursively through its name before construction finishes.
        self.environment.borrow_mut().define(&class_stmt.name.lexeme, Object::NIL);

        let method_environment = match &superclass {
            Some(superclass) => {
                let env = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.environment)))));
                env.borrow_mut().define("super", Object::Class(Rc::clone(superclass)));
                env
            }
            None => Rc::clone(&self.environment),
        };

        let methods = class_stmt
            .methods
            .iter()
            .map(|declaration| {
                let is_initializer = declaration.name.lexeme == "init";
                let function = Function::new(Rc::clone(declaration), Rc::clone(&method_environment), is_initializer);
                (declaration.name.lexeme.clone(), Rc::new(function))
            })
            .collect();

        let static_methods = class_stmt
            .static_methods
            .iter()
            .map(|declaration| {
                let function = Function::new(Rc::clone(declaration), Rc::clone(&method_environment), false);
                (declaration.name.lexeme.clone(), Rc::new(function))
            })
            .collect();

        let class = Rc::new(Class::new(class_stmt.name.lexeme.clone(), superclass, methods, static_methods));
        self.environment.borrow_mut().assign(&class_stmt.name, Object::Class(class))
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        match expr {
            Expr::Assign(assign) => {
                let value = self.evaluate(&assign.value)?;
                match self.locals.get(&assign.id) {
                    Some(&distance) => Environment::assign_at(&self.environment, distance, &assign.name, value.clone()),
                    None => self.globals.borrow_mut().assign(&assign.name, value.clone())?,
                }
                Ok(value)
            }
            Expr::Binary(binary) => self.evaluate_binary(binary),
            Expr::Call(call) => self.evaluate_call(call),
            Expr::Function(function_expr) => {
                let declaration = FunctionStmt {
                    name: Token::synthetic("lambda"),
                    params: function_expr.params.clone(),
                    body: Rc::clone(&function_expr.body),
                };
                let function = Function::new(Rc::new(declaration), Rc::clone(&self.environment), false);
                Ok(Object::Function(Rc::new(function)))
            }
            Expr::Get(get) => self.evaluate_get(get),
            Expr::Grouping(grouping) => self.evaluate(&grouping.expression),
            Expr::Literal(literal) => Ok(Object::from(literal.clone())),
            Expr::Logical(logical) => self.evaluate_logical(logical),
            Expr::Set(set) => self.evaluate_set(set),
            Expr::Super(super_expr) => self.evaluate_super(super_expr),
            Expr::This(this) => self.lookup_variable(this.id, &this.keyword),
            Expr::Unary(unary) => self.evaluate_unary(unary),
            Expr::Variable(variable) => self.lookup_variable(variable.id, &variable.name),
        }
    }

    fn lookup_variable(&self, id: ExprId, name: &Token) -> Result<Object, RuntimeError> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    fn evaluate_unary(&mut self, unary: &UnaryExpr) -> Result<Object, RuntimeError> {
        let right = self.evaluate(&unary.right)?;

        match unary.operator.kind {
            Type::Minus => Ok(Object::from(-number_operand(&unary.operator, &right)?)),
            Type::Bang => Ok(Object::from(!right.is_truthy())),
            _ => unreachable!("parser only produces '-'/'!' unary operators"),
        }
    }

    fn evaluate_binary(&mut self, binary: &BinaryExpr) -> Result<Object, RuntimeError> {
        let left = self.evaluate(&binary.left)?;
        let right = self.evaluate(&binary.right)?;
        let operator = &binary.operator;

        match operator.kind {
            Type::Greater => Ok(Object::from(number_operand(operator, &left)? > number_operand(operator, &right)?)),
            Type::GreaterEqual => Ok(Object::from(number_operand(operator, &left)? >= number_operand(operator, &right)?)),
            Type::Less => Ok(Object::from(number_operand(operator, &left)? < number_operand(operator, &right)?)),
            Type::LessEqual => Ok(Object::from(number_operand(operator, &left)? <= number_operand(operator, &right)?)),
            Type::Minus => Ok(Object::from(number_operand(operator, &left)? - number_operand(operator, &right)?)),
            Type::Star => Ok(Object::from(number_operand(operator, &left)? * number_operand(operator, &right)?)),
            Type::Slash => {
                let divisor = number_operand(operator, &right)?;
                if divisor == 0.0 {
                    return Err(RuntimeError::new(operator.clone(), "Cannot divide by zero."));
                }
                Ok(Object::from(number_operand(operator, &left)? / divisor))
            }
            Type::Plus => match (&left, &right) {
                (Object::Literal(Literal::Number(l)), Object::Literal(Literal::Number(r))) => Ok(Object::from(l + r)),
                (Object::Literal(Literal::String(l)), Object::Literal(Literal::String(r))) => {
                    Ok(Object::from(format!("{l}{r}")))
                }
                _ => Err(RuntimeError::new(operator.clone(), "Operands must be two numbers or two strings.")),
            },
            Type::BangEqual => Ok(Object::from(left != right)),
            Type::EqualEqual => Ok(Object::from(left == right)),
            _ => unreachable!("parser only produces binary operators handled above"),
        }
    }

    fn evaluate_logical(&mut self, logical: &LogicalExpr) -> Result<Object, RuntimeError> {
        let left = self.evaluate(&logical.left)?;

        match logical.operator.kind {
            Type::Or => {
                if left.is_truthy() {
                    Ok(left)
                } else {
                    self.evaluate(&logical.right)
                }
            }
            _ => {
                if !left.is_truthy() {
                    Ok(left)
                } else {
                    self.evaluate(&logical.right)
                }
            }
        }
    }

    fn evaluate_call(&mut self, call: &CallExpr) -> Result<Object, RuntimeError> {
        let callee = self.evaluate(&call.callee)?;

        let mut arguments = Vec::with_capacity(call.arguments.len());
        for argument in &call.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        match &callee {
            Object::Class(class) => {
                check_arity(&call.paren, class.arity(), arguments.len())?;
                class.instantiate(self, arguments)
            }
            _ => match callee.as_callable() {
                Some(callable) => {
                    check_arity(&call.paren, callable.arity(), arguments.len())?;
                    callable.call(self, arguments)
                }
                None => Err(RuntimeError::new(call.paren.clone(), "Can only call functions and classes.")),
            },
        }
    }

    fn evaluate_get(&mut self, get: &GetExpr) -> Result<Object, RuntimeError> {
        let object = self.evaluate(&get.object)?;

        match &object {
            Object::Instance(instance) => Instance::get(instance, &get.name),
            Object::Class(class) => class.get(&get.name),
            _ => Err(RuntimeError::new(get.name.clone(), "Only instances have properties.")),
        }
    }

    fn evaluate_set(&mut self, set: &SetExpr) -> Result<Object, RuntimeError> {
        let object = self.evaluate(&set.object)?;

        match object {
            Object::Instance(instance) => {
                let value = self.evaluate(&set.value)?;
                instance.borrow_mut().set(&set.name, value.clone());
                Ok(value)
            }
            _ => Err(RuntimeError::new(set.name.clone(), "Only instances have fields.")),
        }
    }

    fn evaluate_super(&mut self, super_expr: &SuperExpr) -> Result<Object, RuntimeError> {
        let distance = *self
            .locals
            .get(&super_expr.id)
            .expect("resolver always records a distance for 'super'");

        let superclass = match Environment::get_at(&self.environment, distance, &Token::synthetic("super"))? {
            Object::Class(class) => class,
            _ => unreachable!("'super' always resolves to a class"),
        };

        let instance = match Environment::get_at(&self.environment, distance - 1, &Token::synthetic("this"))? {
            Object::Instance(instance) => instance,
            _ => unreachable!("'this' always resolves to an instance one scope inside 'super'"),
        };

        let method = superclass
            .find_method(&super_expr.method.lexeme)
            .ok_or_else(|| RuntimeError::new(super_expr.method.clone(), format!("Undefined property '{}'.", super_expr.method.lexeme)))?;

        Ok(Object::Function(Rc::new(method.bind(instance))))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

fn number_operand(operator: &Token, value: &Object) -> Result<f64, RuntimeError> {
    match value {
        Object::Literal(Literal::Number(n)) => Ok(*n),
        _ => Err(RuntimeError::new(operator.clone(), "Operands must be numbers.")),
    }
}

fn check_arity(paren: &Token, expected: usize, got: usize) -> Result<(), RuntimeError> {
    if expected != got {
        return Err(RuntimeError::new(paren.clone(), format!("Expected {expected} arguments but got {got}.")));
    }
    Ok(())
}

/// The parser only ever builds a superclass expression out of
/// `Expr::Variable`, so this always has a token to report against.
fn superclass_token(expr: &Expr) -> Token {
    match expr {
        Expr::Variable(variable) => variable.name.clone(),
        _ => unreachable!("classDecl only parses a superclass as a variable reference"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{BinaryExpr, LogicalExpr, UnaryExpr, VariableExpr};
    use crate::stmt::VarStmt;
    use crate::token::Type;

    fn token(kind: Type, lexeme: &str) -> Token {
        Token::new(kind, lexeme.to_string(), None, 1)
    }

    fn num(n: f64) -> Expr {
        Expr::Literal(Literal::Number(n))
    }

    #[test]
    fn arithmetic_and_precedence_free_binary_eval() {
        let mut interpreter = Interpreter::new();
        let expr = Expr::Binary(BinaryExpr {
            left: Box::new(num(6.0)),
            operator: token(Type::Minus, "-"),
            right: Box::new(num(2.0)),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(4.0));
    }

    #[test]
    fn string_concatenation() {
        let mut interpreter = Interpreter::new();
        let expr = Expr::Binary(BinaryExpr {
            left: Box::new(Expr::Literal(Literal::String("foo".into()))),
            operator: token(Type::Plus, "+"),
            right: Box::new(Expr::Literal(Literal::String("bar".into()))),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from("foobar".to_string()));
    }

    #[test]
    fn mixed_plus_operands_is_a_runtime_error() {
        let mut interpreter = Interpreter::new();
        let expr = Expr::Binary(BinaryExpr {
            left: Box::new(Expr::Literal(Literal::String("foo".into()))),
            operator: token(Type::Plus, "+"),
            right: Box::new(num(1.0)),
        });
        let error = interpreter.evaluate(&expr).unwrap_err();
        assert_eq!(error.message, "Operands must be two numbers or two strings.");
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let mut interpreter = Interpreter::new();
        let expr = Expr::Binary(BinaryExpr {
            left: Box::new(num(1.0)),
            operator: token(Type::Slash, "/"),
            right: Box::new(num(0.0)),
        });
        let error = interpreter.evaluate(&expr).unwrap_err();
        assert_eq!(error.message, "Cannot divide by zero.");
    }

    #[test]
    fn unary_bang_uses_truthiness() {
        let mut interpreter = Interpreter::new();
        let expr = Expr::Unary(UnaryExpr { operator: token(Type::Bang, "!"), right: Box::new(Expr::Literal(Literal::Nil)) });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(true));
    }

    #[test]
    fn logical_or_short_circuits_and_returns_operand_value() {
        let mut interpreter = Interpreter::new();
        let expr = Expr::Logical(LogicalExpr {
            left: Box::new(Expr::Literal(Literal::String("left".into()))),
            operator: token(Type::Or, "or"),
            right: Box::new(Expr::Literal(Literal::String("right".into()))),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from("left".to_string()));
    }

    #[test]
    fn variable_lookup_falls_back_to_globals_without_a_resolved_distance() {
        let mut interpreter = Interpreter::new();
        interpreter.globals.borrow_mut().define("x", Object::from(5.0));
        let expr = Expr::Variable(VariableExpr { id: 0, name: token(Type::Identifier, "x") });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(5.0));
    }

    #[test]
    fn print_writes_stringified_value_with_trailing_newline() {
        let buffer: Vec<u8> = Vec::new();
        let mut interpreter = Interpreter::with_output(Box::new(buffer));
        let program = vec![Stmt::Print(crate::stmt::PrintStmt { expr: num(1.0) })];
        interpreter.interpret(&program).unwrap();
    }

    #[test]
    fn var_statement_defines_nil_without_initializer() {
        let mut interpreter = Interpreter::new();
        let program = vec![Stmt::Var(VarStmt { name: token(Type::Identifier, "x"), initializer: None })];
        interpreter.interpret(&program).unwrap();
        assert_eq!(interpreter.globals.borrow().get(&token(Type::Identifier, "x")).unwrap(), Object::NIL);
    }
}
