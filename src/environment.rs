use crate::object::Object;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a scope. Closures and child scopes hold one, which keeps
/// the scope alive after the call that created it has returned.
pub type Env = Rc<RefCell<Environment>>;

/// One lexical scope. A name is bound in at most one of `variables` and
/// `constants` per scope.
#[derive(Default)]
pub struct Environment {
    variables: FxHashMap<String, Object>,
    constants: FxHashMap<String, Object>,
    outer: Option<Env>,
}

impl Environment {
    pub fn new() -> Env {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn new_enclosed(outer: &Env) -> Env {
        Rc::new(RefCell::new(Self {
            outer: Some(Rc::clone(outer)),
            ..Self::default()
        }))
    }

    /// Looks `name` up from this scope outward.
    pub fn get(&self, name: &str) -> Option<Object> {
        if let Some(value) = self.variables.get(name).or_else(|| self.constants.get(name)) {
            Some(value.clone())
        } else if let Some(ref outer) = self.outer {
            outer.borrow().get(name)
        } else {
            None
        }
    }

    pub fn exists_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
            || self
                .outer
                .as_ref()
                .is_some_and(|outer| outer.borrow().exists_variable(name))
    }

    pub fn exists_constant(&self, name: &str) -> bool {
        self.constants.contains_key(name)
            || self
                .outer
                .as_ref()
                .is_some_and(|outer| outer.borrow().exists_constant(name))
    }

    /// Declares or overwrites a variable in this scope.
    pub fn set_variable(&mut self, name: &str, value: Object) -> Result<Object, String> {
        if self.constants.contains_key(name) {
            return Err(format!("identifier already declared as constant: {}", name));
        }
        self.variables.insert(name.to_string(), value.clone());
        Ok(value)
    }

    /// Declares a constant in this scope.
    pub fn set_constant(&mut self, name: &str, value: Object) -> Result<Object, String> {
        if self.variables.contains_key(name) {
            return Err(format!("identifier already declared as variable: {}", name));
        }
        if self.constants.contains_key(name) {
            return Err(format!("cannot assign to constant: {}", name));
        }
        self.constants.insert(name.to_string(), value.clone());
        Ok(value)
    }

    /// Rebinds an existing name in the nearest scope that defines it.
    pub fn assign(&mut self, name: &str, value: Object) -> Result<Object, String> {
        if self.variables.contains_key(name) {
            self.variables.insert(name.to_string(), value.clone());
            Ok(value)
        } else if self.constants.contains_key(name) {
            Err(format!("cannot assign to constant: {}", name))
        } else if let Some(ref outer) = self.outer {
            outer.borrow_mut().assign(name, value)
        } else {
            Err(format!("cannot resolve identifier: {}", name))
        }
    }
}

// Closures point back at the scope that holds them, so a derived Debug would
// recurse forever. Only the names are printed.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Environment")
            .field("variables", &self.variables.keys().collect::<Vec<_>>())
            .field("constants", &self.constants.keys().collect::<Vec<_>>())
            .field("has_outer", &self.outer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_outward() {
        let global = Environment::new();
        global.borrow_mut().set_variable("x", Object::Integer(1)).unwrap();
        let inner = Environment::new_enclosed(&global);

        assert!(matches!(inner.borrow().get("x"), Some(Object::Integer(1))));
        assert!(inner.borrow().get("y").is_none());
    }

    #[test]
    fn inner_scope_shadows_outer() {
        let global = Environment::new();
        global.borrow_mut().set_variable("x", Object::Integer(1)).unwrap();
        let inner = Environment::new_enclosed(&global);
        inner.borrow_mut().set_variable("x", Object::Integer(2)).unwrap();

        assert!(matches!(inner.borrow().get("x"), Some(Object::Integer(2))));
        assert!(matches!(global.borrow().get("x"), Some(Object::Integer(1))));
    }

    #[test]
    fn assign_writes_through_to_defining_scope() {
        let global = Environment::new();
        global.borrow_mut().set_variable("x", Object::Integer(1)).unwrap();
        let inner = Environment::new_enclosed(&global);
        inner.borrow_mut().assign("x", Object::Integer(5)).unwrap();

        assert!(matches!(global.borrow().get("x"), Some(Object::Integer(5))));
    }

    #[test]
    fn constants_reject_reassignment() {
        let env = Environment::new();
        env.borrow_mut().set_constant("x", Object::Integer(1)).unwrap();

        let err = env.borrow_mut().assign("x", Object::Integer(2)).unwrap_err();
        assert!(err.contains("constant"));
        assert!(env.borrow_mut().set_variable("x", Object::Integer(2)).is_err());
        assert!(env.borrow_mut().set_constant("x", Object::Integer(2)).is_err());
    }

    #[test]
    fn variable_cannot_become_constant() {
        let env = Environment::new();
        env.borrow_mut().set_variable("x", Object::Integer(1)).unwrap();

        assert!(env.borrow_mut().set_constant("x", Object::Integer(2)).is_err());
        assert!(env.borrow().exists_variable("x"));
        assert!(!env.borrow().exists_constant("x"));
    }

    #[test]
    fn assign_to_unknown_name_fails() {
        let env = Environment::new();
        let err = env.borrow_mut().assign("nope", Object::NULL).unwrap_err();
        assert_eq!(err, "cannot resolve identifier: nope");
    }
}
