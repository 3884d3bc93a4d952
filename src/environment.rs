use std::{cell::RefCell, rc::Rc};

use indexmap::IndexMap;

use crate::{
    diagnostics::{Diagnostic, DiagnosticKind, Result, SourceSpan},
    value::Value,
};

pub type EnvironmentRef = Rc<RefCell<Environment>>;

/// Flat name-to-value registry. Sub-namespaces are nested environments held
/// as `Value::namespace`; there is no parent chain.
#[derive(Debug, Default)]
pub struct Environment {
    bindings: IndexMap<String, Value>,
}

impl Environment {
    pub fn new() -> EnvironmentRef {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn from_bindings(bindings: IndexMap<String, Value>) -> EnvironmentRef {
        Rc::new(RefCell::new(Self { bindings }))
    }

    /// Binds `name`, replacing any previous binding.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn extend(&mut self, bindings: IndexMap<String, Value>) {
        self.bindings.extend(bindings);
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.bindings.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Sorted binding names, skipping those that start with `hidden`.
    pub fn names(&self, hidden: char) -> Vec<String> {
        let mut names: Vec<String> = self
            .bindings
            .keys()
            .filter(|name| !name.starts_with(hidden))
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn get(env: &EnvironmentRef, name: &str, span: SourceSpan) -> Result<Value> {
        env.borrow().lookup(name).ok_or_else(|| {
            Diagnostic::new(DiagnosticKind::Runtime, format!("undefined name `{name}`"))
                .with_span(span)
                .into()
        })
    }
}
