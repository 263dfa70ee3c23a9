use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::function::Function;
use crate::interpreter::Interpreter;
use crate::object::{Callable, Object};
use crate::token::Token;

/// A class: its own methods and (unbound) static methods, plus a link to
/// the class it extends. Immutable once the `class` statement that built
/// it finishes evaluating, so unlike `Instance` it needs no `RefCell`.
#[derive(Debug)]
pub struct Class {
    pub name: String,
    pub superclass: Option<Rc<Class>>,
    methods: HashMap<String, Rc<Function>>,
    static_methods: HashMap<String, Rc<Function>>,
}

impl Class {
    pub fn new(
        name: String,
        superclass: Option<Rc<Class>>,
        methods: HashMap<String, Rc<Function>>,
        static_methods: HashMap<String, Rc<Function>>,
    ) -> Self {
        Class { name, superclass, methods, static_methods }
    }

    /// Looks up an instance method, walking the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        self.methods
            .get(name)
            .cloned()
            .or_else(|| self.superclass.as_ref().and_then(|superclass| superclass.find_method(name)))
    }

    /// Looks up a static method, walking the superclass chain. Static
    /// methods are never bound to an instance.
    pub fn find_static_method(&self, name: &str) -> Option<Rc<Function>> {
        self.static_methods
            .get(name)
            .cloned()
            .or_else(|| self.superclass.as_ref().and_then(|superclass| superclass.find_static_method(name)))
    }

    /// A `Get` on the class value itself (`SomeClass.staticMethod`).
    pub fn get(&self, name: &Token) -> Result<Object, RuntimeError> {
        self.find_static_method(&name.lexeme)
            .map(Object::Function)
            .ok_or_else(|| RuntimeError::new(name.clone(), format!("Undefined property '{}'.", name.lexeme)))
    }

    /// A class is called to construct an instance. Not expressed through
    /// the `Callable` trait since constructing an `Instance` needs the
    /// `Rc<Class>` handle the interpreter holds, not just `&Class`; the
    /// interpreter special-cases `Object::Class` in its call expression
    /// the same way it would any other callable.
    pub fn arity(&self) -> usize {
        self.find_method("init").map(|init| init.arity()).unwrap_or(0)
    }

    pub fn instantiate(self: &Rc<Self>, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        let instance = Rc::new(RefCell::new(Instance::new(Rc::clone(self))));

        if let Some(init) = self.find_method("init") {
            init.bind(Rc::clone(&instance)).call(interpreter, arguments)?;
        }

        Ok(Object::Instance(instance))
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A runtime object: an instantiated `Class` plus its own field values.
#[derive(Debug)]
pub struct Instance {
    pub class: Rc<Class>,
    fields: HashMap<String, Object>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Instance { class, fields: HashMap::new() }
    }

    pub fn get(instance: &Rc<RefCell<Instance>>, name: &Token) -> Result<Object, RuntimeError> {
        let borrowed = instance.borrow();

        if let Some(value) = borrowed.fields.get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(method) = borrowed.class.find_method(&name.lexeme) {
            return Ok(Object::Function(Rc::new(method.bind(Rc::clone(instance)))));
        }

        Err(RuntimeError::new(name.clone(), format!("Undefined property '{}'.", name.lexeme)))
    }

    pub fn set(&mut self, name: &Token, value: Object) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

impl Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} instance>", self.class.name)
    }
}
