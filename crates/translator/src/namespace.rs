//! Global and per-function namespaces.
//!
//! The namespace is shared by the two translation passes but only
//! pass 1 may create entries: `define` allocates in pass 1 and raises a
//! duplicate-definition error on collision, while in pass 2 it becomes
//! a lookup that returns the pass-1 entry. That rule is what makes the
//! `_initmp` array temporaries come out deterministic in pass 2.
//!
//! Exactly one local scope is "current" between `func` and `endfunc`;
//! lookups consult it before the global scope. Declaration emission
//! preserves insertion order so repeated translations render the same
//! text.

use std::collections::HashMap;

use crate::error::{Result, TranslateError};
use crate::variable::Variable;

/// Current pass of the two-pass translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Pass 1 builds the namespace and the label/subroutine sets.
    One,
    /// Pass 2 re-reads the token stream and emits C.
    Two,
}

/// One scope's variables, in insertion order.
#[derive(Debug, Default)]
struct Scope {
    order: Vec<String>,
    vars: HashMap<String, Variable>,
}

impl Scope {
    fn get(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    fn insert(&mut self, var: Variable) {
        self.order.push(var.name.clone());
        self.vars.insert(var.name.clone(), var);
    }

    fn definitions(&self, global: bool) -> String {
        let mut r = String::new();
        for name in &self.order {
            r.push_str(&self.vars[name].definition(global));
        }
        r
    }
}

/// The symbol table: one global scope plus named local scopes.
#[derive(Debug)]
pub struct NameSpace {
    globals: Scope,
    locals: HashMap<String, Scope>,
    current: Option<String>,
    pass: Pass,
}

impl Default for NameSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl NameSpace {
    pub fn new() -> Self {
        NameSpace {
            globals: Scope::default(),
            locals: HashMap::new(),
            current: None,
            pass: Pass::One,
        }
    }

    /// Switch passes. Clears the current-local selector.
    pub fn set_pass(&mut self, pass: Pass) {
        self.pass = pass;
        self.current = None;
    }

    /// Enter the local scope of function `name`. Pass 1 starts the
    /// scope fresh; pass 2 re-selects the scope built in pass 1.
    pub fn enter_local(&mut self, name: &str) {
        if self.pass == Pass::One {
            self.locals.insert(name.to_string(), Scope::default());
        } else {
            self.locals.entry(name.to_string()).or_default();
        }
        self.current = Some(name.to_string());
    }

    /// Leave the current local scope.
    pub fn leave_local(&mut self) {
        self.current = None;
    }

    /// Look up `name`, local scope first, then global unless
    /// `localonly`.
    pub fn find(&self, name: &str, localonly: bool) -> Option<Variable> {
        if let Some(cur) = &self.current {
            if let Some(v) = self.locals[cur].get(name) {
                return Some(v.clone());
            }
        }
        if localonly {
            None
        } else {
            self.globals.get(name).cloned()
        }
    }

    /// Define `var` in the current scope (or globally with
    /// `force_global`). In pass 1 a collision is a definition error; in
    /// pass 2 this returns the entry pass 1 created.
    pub fn define(&mut self, var: Variable, force_global: bool) -> Result<Variable> {
        let scope = if force_global || self.current.is_none() {
            &mut self.globals
        } else {
            self.locals.get_mut(self.current.as_ref().unwrap()).unwrap()
        };
        if self.pass == Pass::One {
            if scope.get(&var.name).is_some() {
                return Err(TranslateError::Definition(format!(
                    "variable {} is defined more than once",
                    var.name
                )));
            }
            let r = var.clone();
            scope.insert(var);
            Ok(r)
        } else {
            scope.get(&var.name).cloned().ok_or_else(|| {
                TranslateError::Syntax(format!("variable {} is not defined", var.name))
            })
        }
    }

    /// Render the declarations of the global scope (`scope` = None) or
    /// of a function's local scope, in insertion order.
    pub fn definitions(&self, scope: Option<&str>) -> String {
        match scope {
            None => self.globals.definitions(true),
            Some(name) => self
                .locals
                .get(name)
                .map(|s| s.definitions(false))
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::BasType;

    #[test]
    fn test_pass1_defines_and_detects_duplicates() {
        let mut nsp = NameSpace::new();
        nsp.define(Variable::new("a", BasType::Int), false).unwrap();
        let err = nsp
            .define(Variable::new("a", BasType::Float), false)
            .unwrap_err();
        assert!(err.is_definition());
    }

    #[test]
    fn test_pass2_returns_pass1_entry() {
        let mut nsp = NameSpace::new();
        let mut v = Variable::new("a", BasType::Float);
        v.init = "1.5".to_string();
        nsp.define(v, false).unwrap();

        nsp.set_pass(Pass::Two);
        let got = nsp.define(Variable::new("a", BasType::Int), false).unwrap();
        assert_eq!(got.ty, BasType::Float);
        assert_eq!(got.init, "1.5");

        assert!(nsp.define(Variable::new("b", BasType::Int), false).is_err());
    }

    #[test]
    fn test_local_scope_shadows_global() {
        let mut nsp = NameSpace::new();
        nsp.define(Variable::new("x", BasType::Int), false).unwrap();
        nsp.enter_local("f");
        nsp.define(Variable::new("x", BasType::Str), false).unwrap();

        assert_eq!(nsp.find("x", false).unwrap().ty, BasType::Str);
        assert_eq!(nsp.find("x", true).unwrap().ty, BasType::Str);
        nsp.leave_local();
        assert_eq!(nsp.find("x", false).unwrap().ty, BasType::Int);
        assert!(nsp.find("x", true).is_none());
    }

    #[test]
    fn test_force_global_from_local_scope() {
        let mut nsp = NameSpace::new();
        nsp.enter_local("f");
        nsp.define(Variable::new("g", BasType::Int), true).unwrap();
        nsp.leave_local();
        assert!(nsp.find("g", false).is_some());
    }

    #[test]
    fn test_definitions_preserve_insertion_order() {
        let mut nsp = NameSpace::new();
        nsp.define(Variable::new("b", BasType::Int), false).unwrap();
        nsp.define(Variable::new("a", BasType::Int), false).unwrap();
        assert_eq!(nsp.definitions(None), "static int b;\nstatic int a;\n");
    }
}
