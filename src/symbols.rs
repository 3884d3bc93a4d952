//! The symbol-table seam and an in-memory implementation of it.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::{
    diagnostics::{Diagnostic, Result},
    value::{TypeDescriptor, Value, ValueType},
};

/// Source of truth for what a process exposes: enumeration of its globals,
/// functions and declared types, plus resolution and invocation by
/// qualified name. Errors are passed on by the binder unchanged.
pub trait SymbolTable {
    fn globals(&self) -> Result<Vec<String>>;
    fn functions(&self) -> Result<Vec<String>>;
    fn types(&self) -> Result<Vec<Rc<TypeDescriptor>>>;
    fn global(&self, qualified: &str) -> Result<Value>;
    fn call(&self, qualified: &str, args: &[Value]) -> Result<Vec<Value>>;
    fn resolve_type(&self, namespace: &str, name: &str) -> Result<Rc<TypeDescriptor>>;
}

type Getter = Rc<dyn Fn() -> Value>;
type Callback = Rc<dyn Fn(&[Value]) -> Result<Vec<Value>>>;

/// Parameter list a registered function is checked against before its
/// callback runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    params: Vec<ValueType>,
    rest: Option<ValueType>,
}

impl Signature {
    pub fn new(params: Vec<ValueType>) -> Self {
        Self {
            params,
            rest: None,
        }
    }

    /// Fixed leading parameters followed by any number of `rest`.
    pub fn variadic(params: Vec<ValueType>, rest: ValueType) -> Self {
        Self {
            params,
            rest: Some(rest),
        }
    }

    pub fn check(&self, name: &str, args: &[Value]) -> Result<()> {
        let arity_ok = match self.rest {
            Some(_) => args.len() >= self.params.len(),
            None => args.len() == self.params.len(),
        };
        if !arity_ok {
            let qualifier = if self.rest.is_some() { "at least " } else { "" };
            return Err(Diagnostic::argument(format!(
                "`{name}` expected {qualifier}{} arguments but received {}",
                self.params.len(),
                args.len()
            ))
            .into());
        }
        for (idx, arg) in args.iter().enumerate() {
            let expected = self
                .params
                .get(idx)
                .copied()
                .or(self.rest)
                .unwrap_or(ValueType::Any);
            if !expected.accepts(arg) {
                return Err(Diagnostic::argument(format!(
                    "`{name}` argument {} expected {expected} but found {}",
                    idx + 1,
                    arg.type_name()
                ))
                .into());
            }
        }
        Ok(())
    }
}

struct FunctionSymbol {
    signature: Signature,
    callback: Callback,
}

/// Symbol table populated by the host at startup.
///
/// Globals are registered as getters so each resolution observes the value
/// current at that moment.
#[derive(Default)]
pub struct SymbolRegistry {
    globals: IndexMap<String, Getter>,
    functions: IndexMap<String, FunctionSymbol>,
    types: IndexMap<String, Rc<TypeDescriptor>>,
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_global<F>(&mut self, qualified: impl Into<String>, getter: F) -> &mut Self
    where
        F: Fn() -> Value + 'static,
    {
        self.globals.insert(qualified.into(), Rc::new(getter));
        self
    }

    pub fn register_function<F>(
        &mut self,
        qualified: impl Into<String>,
        signature: Signature,
        callback: F,
    ) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<Vec<Value>> + 'static,
    {
        self.functions.insert(
            qualified.into(),
            FunctionSymbol {
                signature,
                callback: Rc::new(callback),
            },
        );
        self
    }

    pub fn register_type(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        self.types
            .insert(descriptor.qualified_name(), Rc::new(descriptor));
        self
    }
}

impl SymbolTable for SymbolRegistry {
    fn globals(&self) -> Result<Vec<String>> {
        Ok(self.globals.keys().cloned().collect())
    }

    fn functions(&self) -> Result<Vec<String>> {
        Ok(self.functions.keys().cloned().collect())
    }

    fn types(&self) -> Result<Vec<Rc<TypeDescriptor>>> {
        Ok(self.types.values().cloned().collect())
    }

    fn global(&self, qualified: &str) -> Result<Value> {
        let getter = self
            .globals
            .get(qualified)
            .ok_or_else(|| Diagnostic::resolution(format!("global `{qualified}` not found")))?;
        Ok(getter())
    }

    fn call(&self, qualified: &str, args: &[Value]) -> Result<Vec<Value>> {
        let function = self
            .functions
            .get(qualified)
            .ok_or_else(|| Diagnostic::resolution(format!("function `{qualified}` not found")))?;
        function.signature.check(qualified, args)?;
        (function.callback)(args)
    }

    fn resolve_type(&self, namespace: &str, name: &str) -> Result<Rc<TypeDescriptor>> {
        self.types
            .values()
            .find(|ty| ty.namespace == namespace && ty.name == name)
            .cloned()
            .ok_or_else(|| {
                Diagnostic::resolution(format!("type `{namespace}.{name}` not found")).into()
            })
    }
}
