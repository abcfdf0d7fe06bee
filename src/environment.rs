//! Scope chain for the tree‑walk interpreter.
//!
//! Environments are shared (`Rc<RefCell<_>>`): a closure keeps the
//! environment it was defined in alive for as long as the closure lives,
//! independently of the block that created it.

use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;
use log::trace;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to an environment.
pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    /// A root (global) environment.
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap into a shared handle.
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Bind `name` in this scope, replacing any previous binding here.
    pub fn define(&mut self, name: &str, value: Value) {
        trace!("define '{}' = {}", name, value);
        self.values.insert(name.to_string(), value);
    }

    /// Look `name` up in this scope only, then outward through the chain.
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// Read `name` from the environment exactly `distance` links out.
    pub fn get_at(&self, distance: usize, name: &Token) -> Result<Value> {
        if distance == 0 {
            return self
                .values
                .get(&name.lexeme)
                .cloned()
                .ok_or_else(|| undefined(name));
        }

        match &self.enclosing {
            Some(enclosing) => enclosing.borrow().get_at(distance - 1, name),
            None => Err(undefined(name)),
        }
    }

    /// Overwrite `name` in the environment exactly `distance` links out.
    pub fn assign_at(&mut self, distance: usize, name: &Token, value: Value) -> Result<()> {
        if distance == 0 {
            return match self.values.get_mut(&name.lexeme) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(undefined(name)),
            };
        }

        match &self.enclosing {
            Some(enclosing) => enclosing.borrow_mut().assign_at(distance - 1, name, value),
            None => Err(undefined(name)),
        }
    }
}

fn undefined(name: &Token) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;

    fn name(s: &str) -> Token {
        Token::synthetic(s, 1)
    }

    #[test]
    fn get_at_walks_exact_distance() {
        let global = Environment::new().into_ref();
        let local = Environment::with_enclosing(global.clone()).into_ref();

        global.borrow_mut().define("a", Value::Number(1.0));
        local.borrow_mut().define("a", Value::Number(2.0));

        assert_eq!(local.borrow().get_at(0, &name("a")).unwrap(), Value::Number(2.0));
        assert_eq!(local.borrow().get_at(1, &name("a")).unwrap(), Value::Number(1.0));
        assert!(local.borrow().get_at(2, &name("a")).is_err());
    }

    #[test]
    fn assign_updates_nearest_binding() {
        let global = Environment::new().into_ref();
        let local = Environment::with_enclosing(global.clone()).into_ref();

        global.borrow_mut().define("count", Value::Number(0.0));
        local
            .borrow_mut()
            .assign(&name("count"), Value::Number(5.0))
            .unwrap();

        assert_eq!(global.borrow().get(&name("count")).unwrap(), Value::Number(5.0));
    }

    #[test]
    fn assign_to_undeclared_is_an_error() {
        let mut env = Environment::new();

        let err = env.assign(&name("ghost"), Value::Nil).unwrap_err();
        assert_eq!(err.to_string(), "Undefined variable 'ghost'.\n[line 1]");
    }

    #[test]
    fn assign_at_does_not_fall_through() {
        let global = Environment::new().into_ref();
        let local = Environment::with_enclosing(global.clone()).into_ref();

        global.borrow_mut().define("x", Value::Nil);

        assert!(local
            .borrow_mut()
            .assign_at(0, &name("x"), Value::Bool(true))
            .is_err());
        assert_eq!(global.borrow().get(&name("x")).unwrap(), Value::Nil);
    }
}
