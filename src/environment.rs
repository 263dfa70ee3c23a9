use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::object::Object;
use crate::token::Token;

/// A lexical scope. Scopes chain through `enclosing` to form the
/// environment a closure captures; `Rc<RefCell<_>>` lets a `Function`
/// keep its defining scope alive after the block that created it returns.
#[derive(Debug)]
pub struct Environment {
    pub enclosing: Option<Rc<RefCell<Environment>>>,
    values: HashMap<String, Object>,
}

impl Environment {
    pub fn new(enclosing: Option<Rc<RefCell<Environment>>>) -> Self {
        Environment { enclosing, values: HashMap::new() }
    }

    /// A `var` declaration. Redeclaring a name in the same scope silently
    /// shadows the old slot (the resolver, not this type, rejects that at
    /// the top level of a block).
    pub fn define(&mut self, name: &str, value: Object) {
        self.values.insert(name.to_string(), value);
    }

    fn ancestor(environment: Rc<RefCell<Environment>>, distance: usize) -> Rc<RefCell<Environment>> {
        let mut current = environment;
        for _ in 0..distance {
            let parent = current
                .borrow()
                .enclosing
                .clone()
                .expect("resolver-reported distance exceeds the environment chain");
            current = parent;
        }
        current
    }

    pub fn assign(&mut self, name: &Token, value: Object) -> Result<(), RuntimeError> {
        if self.values.contains_key(&name.lexeme) {
            self.values.insert(name.lexeme.clone(), value);
            return Ok(());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow_mut().assign(name, value);
        }

        Err(RuntimeError::new(name.clone(), format!("Undefined variable '{}'.", name.lexeme)))
    }

    /// Assigns directly into the scope the resolver determined holds
    /// `name`, skipping the walk-and-miss that a global `assign` would do.
    pub fn assign_at(this: &Rc<RefCell<Environment>>, distance: usize, name: &Token, value: Object) {
        Environment::ancestor(Rc::clone(this), distance)
            .borrow_mut()
            .values
            .insert(name.lexeme.clone(), value);
    }

    pub fn get(&self, name: &Token) -> Result<Object, RuntimeError> {
        if let Some(value) = self.values.get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow().get(name);
        }

        Err(RuntimeError::new(name.clone(), format!("Undefined variable '{}'.", name.lexeme)))
    }

    pub fn get_at(this: &Rc<RefCell<Environment>>, distance: usize, name: &Token) -> Result<Object, RuntimeError> {
        Environment::ancestor(Rc::clone(this), distance)
            .borrow()
            .values
            .get(&name.lexeme)
            .cloned()
            .ok_or_else(|| RuntimeError::new(name.clone(), format!("Undefined variable '{}'.", name.lexeme)))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new(None)
    }
}
