use std::cell::RefCell;
use std::fmt::{self, Debug, Display};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::class::Instance;
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::interpreter::{Completion, Interpreter};
use crate::object::{Callable, Object};
use crate::stmt::FunctionStmt;
use crate::token::Token;

/// A user-defined function or method, closing over the environment it was
/// declared in.
#[derive(Debug, Clone)]
pub struct Function {
    pub declaration: Rc<FunctionStmt>,
    closure: Rc<RefCell<Environment>>,
    is_initializer: bool,
}

impl Function {
    pub fn new(declaration: Rc<FunctionStmt>, closure: Rc<RefCell<Environment>>, is_initializer: bool) -> Self {
        Function { declaration, closure, is_initializer }
    }

    /// Returns a copy of this method with one more environment wrapped
    /// around its closure, binding `this` to `instance`. Called once per
    /// `Get` on a bound method, matching the teacher's `bind`.
    pub fn bind(&self, instance: Rc<RefCell<Instance>>) -> Function {
        let environment = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.closure)))));
        environment.borrow_mut().define("this", Object::Instance(instance));
        Function::new(Rc::clone(&self.declaration), environment, self.is_initializer)
    }
}

impl Callable for Function {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        let environment = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.closure)))));

        for (param, argument) in self.declaration.params.iter().zip(arguments.into_iter()) {
            environment.borrow_mut().define(&param.lexeme, argument);
        }

        let completion = interpreter.execute_block(&self.declaration.body, environment)?;

        if self.is_initializer {
            // `init` always yields the instance, whether it has a bare
            // `return;` or falls off the end.
            return Environment::get_at(&self.closure, 0, &Token::synthetic("this"));
        }

        match completion {
            Completion::Return(value) => Ok(value),
            Completion::Normal => Ok(Object::NIL),
        }
    }

    fn arity(&self) -> usize {
        self.declaration.params.len()
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.declaration.name.lexeme)
    }
}

/// A host-provided function, exposed to Lox code via `globals`.
pub struct NativeFunction {
    name: &'static str,
    arity: usize,
    function: fn(&mut Interpreter, Vec<Object>) -> Result<Object, RuntimeError>,
}

impl NativeFunction {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Every native the interpreter defines in `globals` at startup.
    pub fn globals() -> Vec<NativeFunction> {
        vec![NativeFunction {
            name: "clock",
            arity: 0,
            function: |_, _| {
                let seconds = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .expect("system clock before the Unix epoch")
                    .as_secs_f64();
                Ok(Object::from(seconds))
            },
        }]
    }
}

impl Callable for NativeFunction {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        (self.function)(interpreter, arguments)
    }

    fn arity(&self) -> usize {
        self.arity
    }
}

impl Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn>")
    }
}

impl Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn>")
    }
}
