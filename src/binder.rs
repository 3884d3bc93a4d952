//! The session: a root environment bound to one symbol table.

use std::{
    cell::Cell,
    collections::BTreeSet,
    rc::{Rc, Weak},
};

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::{
    builtins,
    bypass::{self, PrivilegeBypass, Unlock},
    config::BinderConfig,
    diagnostics::{Diagnostic, Result},
    environment::{Environment, EnvironmentRef},
    names,
    raw::TypedReference,
    symbols::SymbolTable,
    value::{Value, ValueKind},
};

pub(crate) struct SessionState {
    root: EnvironmentRef,
    symbols: Rc<dyn SymbolTable>,
    config: BinderConfig,
    bypass: Box<dyn PrivilegeBypass>,
    raw_reads: Cell<bool>,
}

/// Owns the root environment and every operation that derives bindings from
/// the symbol table. Cloning yields another handle onto the same session.
///
/// Sessions are single-threaded. Functions invoked through the symbol table
/// run on the caller's thread with no synchronization around them.
#[derive(Clone)]
pub struct Session(Rc<SessionState>);

enum Destination {
    Discard,
    Root,
    Child(String),
}

impl Session {
    pub fn new(symbols: Rc<dyn SymbolTable>) -> Self {
        Self::with_config(symbols, BinderConfig::default())
    }

    pub fn with_config(symbols: Rc<dyn SymbolTable>, config: BinderConfig) -> Self {
        Self::with_bypass(symbols, config, Box::new(Unlock))
    }

    pub fn with_bypass(
        symbols: Rc<dyn SymbolTable>,
        config: BinderConfig,
        bypass: Box<dyn PrivilegeBypass>,
    ) -> Self {
        let session = Self(Rc::new(SessionState {
            root: Environment::new(),
            symbols,
            config,
            bypass,
            raw_reads: Cell::new(false),
        }));
        builtins::install(&session);
        session
    }

    pub(crate) fn downgrade(&self) -> Weak<SessionState> {
        Rc::downgrade(&self.0)
    }

    pub(crate) fn upgrade(state: &Weak<SessionState>) -> Option<Self> {
        state.upgrade().map(Self)
    }

    pub fn root(&self) -> &EnvironmentRef {
        &self.0.root
    }

    pub fn config(&self) -> &BinderConfig {
        &self.0.config
    }

    pub fn symbols(&self) -> &Rc<dyn SymbolTable> {
        &self.0.symbols
    }

    /// Every namespace the symbol table mentions, sorted and deduplicated.
    ///
    /// The empty namespace (builtin types, names without a scope) is never
    /// reported since nothing can be imported from it.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn packages(&self) -> Result<Vec<String>> {
        let symbols = &self.0.symbols;
        let globals = symbols.globals()?;
        let functions = symbols.functions()?;
        let types = symbols.types()?;

        let mut namespaces = BTreeSet::new();
        for name in globals.iter().chain(functions.iter()) {
            match names::normalize(name, &self.0.config) {
                Some(path) if !path.namespace.is_empty() => {
                    namespaces.insert(path.namespace.to_string());
                }
                Some(_) => {}
                None => trace!(%name, "skipping synthetic symbol"),
            }
        }
        for ty in types.iter().filter(|ty| !ty.namespace.is_empty()) {
            namespaces.insert(ty.namespace.clone());
        }
        debug!(count = namespaces.len(), "namespaces extracted");
        Ok(namespaces.into_iter().collect())
    }

    pub fn globals(&self, namespace: &str) -> Result<Vec<String>> {
        let names = self.0.symbols.globals()?;
        Ok(names::members_of(namespace, &names, &self.0.config))
    }

    pub fn functions(&self, namespace: &str) -> Result<Vec<String>> {
        let names = self.0.symbols.functions()?;
        Ok(names::members_of(namespace, &names, &self.0.config))
    }

    pub fn types(&self, namespace: &str) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .0
            .symbols
            .types()?
            .iter()
            .filter(|ty| ty.namespace == namespace)
            .map(|ty| ty.name.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn global(&self, namespace: &str, name: &str) -> Result<Value> {
        let qualified = names::qualify(namespace, name, &self.0.config);
        self.0.symbols.global(&qualified)
    }

    /// Invokes `namespace.member` with `args`, returning all of its results.
    #[tracing::instrument(level = "debug", skip(self, args), fields(argc = args.len()))]
    pub fn call(&self, namespace: &str, member: &str, args: &[Value]) -> Result<Vec<Value>> {
        let qualified = names::qualify(namespace, member, &self.0.config);
        self.0.symbols.call(&qualified, args)
    }

    /// Pairs the declared type `namespace.name` with `address`. Memory is not
    /// touched and the address is not validated.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn new_at(&self, namespace: &str, name: &str, address: usize) -> Result<TypedReference> {
        let ty = self.0.symbols.resolve_type(namespace, name)?;
        Ok(TypedReference::new(ty, address))
    }

    /// Allows `load` to dereference typed references built by this session.
    ///
    /// # Safety
    ///
    /// Every reference later passed to [`Session::load`], including those
    /// built from script-supplied addresses, must satisfy the contract of
    /// [`TypedReference::read`].
    pub unsafe fn enable_raw_reads(&self) {
        self.0.raw_reads.set(true);
    }

    pub fn raw_reads_enabled(&self) -> bool {
        self.0.raw_reads.get()
    }

    pub fn load(&self, reference: &TypedReference) -> Result<Value> {
        self.ensure_raw_reads()?;
        // SAFETY: the host accepted the read contract in `enable_raw_reads`.
        Ok(unsafe { reference.read() })
    }

    /// Reads one field through `reference`, honoring field visibility.
    pub fn load_field(&self, reference: &TypedReference, name: &str) -> Result<Value> {
        self.ensure_raw_reads()?;
        // SAFETY: the host accepted the read contract in `enable_raw_reads`.
        unsafe { reference.read_field(name) }
    }

    fn ensure_raw_reads(&self) -> Result<()> {
        if !self.raw_reads_enabled() {
            return Err(Diagnostic::argument("raw reads are disabled for this session")
                .with_note("the host must opt in with `Session::enable_raw_reads`")
                .into());
        }
        Ok(())
    }

    /// Binds the members of `namespace` according to `target`: the discard
    /// sentinel only validates, the merge sentinel writes into the root, any
    /// other name (or the namespace's last path segment when empty) becomes a
    /// child namespace in the root.
    ///
    /// Bindings are staged first, so a failing resolution leaves the
    /// environment untouched.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn import(&self, target: &str, namespace: &str) -> Result<()> {
        let config = &self.0.config;
        let destination = if target == config.discard_target {
            Destination::Discard
        } else if target == config.merge_target {
            Destination::Root
        } else {
            let name = if target.is_empty() {
                names::default_binding_name(namespace, config)
            } else {
                target
            };
            if !names::is_identifier(name) {
                return Err(Diagnostic::argument(format!(
                    "cannot bind namespace `{namespace}` as `{name}`"
                ))
                .into());
            }
            Destination::Child(name.to_string())
        };

        let staged = self.stage(namespace)?;
        debug!(members = staged.len(), "namespace staged");
        match destination {
            Destination::Discard => {}
            Destination::Root => self.0.root.borrow_mut().extend(staged),
            Destination::Child(name) => {
                let child = Environment::from_bindings(staged);
                self.0
                    .root
                    .borrow_mut()
                    .define(name, Value::namespace(child));
            }
        }
        Ok(())
    }

    fn stage(&self, namespace: &str) -> Result<IndexMap<String, Value>> {
        let symbols = &self.0.symbols;
        let prefix = names::qualify(namespace, "", &self.0.config);
        let local = |qualified: &str| {
            qualified
                .strip_prefix(prefix.as_str())
                .filter(|name| names::is_identifier(name))
                .map(str::to_string)
        };

        let mut staged = IndexMap::new();
        for qualified in symbols.globals()? {
            if let Some(name) = local(&qualified) {
                staged.insert(name, symbols.global(&qualified)?);
            }
        }
        for qualified in symbols.functions()? {
            if let Some(name) = local(&qualified) {
                staged.insert(name, forward(Rc::clone(symbols), qualified));
            }
        }
        Ok(staged)
    }

    /// Lists root bindings, the bindings of a namespace, or the members of a
    /// record type. Callables have no members.
    pub fn dir(&self, target: Option<&Value>) -> Vec<String> {
        let hidden = self.0.config.directive_prefix;
        let Some(value) = target else {
            return self.0.root.borrow().names(hidden);
        };
        match value.kind() {
            ValueKind::Namespace(env) => env.borrow().names(hidden),
            ValueKind::Callable(_) => Vec::new(),
            ValueKind::Record(record) => record.ty.member_names(),
            ValueKind::Reference(reference) => reference.descriptor().member_names(),
            _ => Vec::new(),
        }
    }

    pub fn sudo(&self, values: &[Value]) -> Vec<Value> {
        bypass::forward_all(self.0.bypass.as_ref(), values)
    }
}

/// A callable that re-enters the symbol table under `qualified` on each call.
fn forward(symbols: Rc<dyn SymbolTable>, qualified: String) -> Value {
    Value::callable(qualified.clone(), move |args| symbols.call(&qualified, args))
}
