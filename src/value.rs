use std::{fmt, rc::Rc};

use indexmap::IndexMap;

use crate::{
    diagnostics::{Diagnostic, Result},
    environment::EnvironmentRef,
    raw::TypedReference,
};

#[derive(Clone)]
pub struct Value(pub Rc<ValueKind>);

impl Value {
    pub fn new(kind: ValueKind) -> Self {
        Self(Rc::new(kind))
    }

    pub fn unit() -> Self {
        Self::new(ValueKind::Unit)
    }

    pub fn bool(value: bool) -> Self {
        Self::new(ValueKind::Bool(value))
    }

    pub fn int(value: i64) -> Self {
        Self::new(ValueKind::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Self::new(ValueKind::Float(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ValueKind::String(value.into()))
    }

    pub fn list(values: Vec<Value>) -> Self {
        Self::new(ValueKind::List(values))
    }

    pub fn strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::list(values.into_iter().map(Value::string).collect())
    }

    pub fn record(ty: Rc<TypeDescriptor>, fields: IndexMap<String, Value>) -> Self {
        Self::new(ValueKind::Record(RecordValue {
            ty,
            fields,
            unlocked: false,
        }))
    }

    pub fn namespace(env: EnvironmentRef) -> Self {
        Self::new(ValueKind::Namespace(env))
    }

    pub fn callable<F>(name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Vec<Value>> + 'static,
    {
        Self::new(ValueKind::Callable(Callable {
            name: name.into(),
            callback: Rc::new(callback),
        }))
    }

    pub fn reference(reference: TypedReference) -> Self {
        Self::new(ValueKind::Reference(reference))
    }

    pub fn kind(&self) -> &ValueKind {
        &self.0
    }

    pub fn type_name(&self) -> &'static str {
        match &*self.0 {
            ValueKind::Unit => "Unit",
            ValueKind::Bool(_) => "Bool",
            ValueKind::Int(_) => "Int",
            ValueKind::Float(_) => "Float",
            ValueKind::String(_) => "String",
            ValueKind::List(_) => "List",
            ValueKind::Record(_) => "Record",
            ValueKind::Namespace(_) => "Namespace",
            ValueKind::Callable(_) => "Function",
            ValueKind::Reference(_) => "Reference",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &*self.0 {
            ValueKind::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match &*self.0 {
            ValueKind::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match &*self.0 {
            ValueKind::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match &*self.0 {
            ValueKind::Callable(callable) => Some(callable),
            _ => None,
        }
    }

    /// Collapses a result sequence the way the evaluator presents it:
    /// nothing becomes unit, one result stands alone, more become a list.
    pub fn from_results(mut results: Vec<Value>) -> Self {
        match results.len() {
            0 => Value::unit(),
            1 => results.remove(0),
            _ => Value::list(results),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (&*self.0, &*other.0) {
            (ValueKind::Unit, ValueKind::Unit) => true,
            (ValueKind::Bool(a), ValueKind::Bool(b)) => a == b,
            (ValueKind::Int(a), ValueKind::Int(b)) => a == b,
            (ValueKind::Float(a), ValueKind::Float(b)) => a == b,
            (ValueKind::String(a), ValueKind::String(b)) => a == b,
            (ValueKind::List(a), ValueKind::List(b)) => a == b,
            (ValueKind::Record(a), ValueKind::Record(b)) => {
                Rc::ptr_eq(&a.ty, &b.ty) && a.fields == b.fields
            }
            (ValueKind::Namespace(a), ValueKind::Namespace(b)) => Rc::ptr_eq(a, b),
            (ValueKind::Callable(a), ValueKind::Callable(b)) => {
                Rc::ptr_eq(&a.callback, &b.callback)
            }
            (ValueKind::Reference(a), ValueKind::Reference(b)) => {
                a.address() == b.address() && Rc::ptr_eq(a.descriptor(), b.descriptor())
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            ValueKind::Unit => write!(f, "Unit"),
            ValueKind::Bool(b) => write!(f, "{b}"),
            ValueKind::Int(n) => write!(f, "{n}"),
            ValueKind::Float(n) => write!(f, "{n}"),
            ValueKind::String(s) => write!(f, "\"{s}\""),
            ValueKind::List(values) => f.debug_list().entries(values.iter()).finish(),
            ValueKind::Record(record) => {
                let mut out = f.debug_struct(&record.ty.qualified_name());
                for (name, value) in record.visible_fields() {
                    out.field(name, value);
                }
                out.finish()
            }
            ValueKind::Namespace(env) => write!(f, "<namespace {} entries>", env.borrow().len()),
            ValueKind::Callable(callable) => write!(f, "<fn {}>", callable.name),
            ValueKind::Reference(reference) => write!(
                f,
                "<*{} @ {:#x}>",
                reference.descriptor().qualified_name(),
                reference.address()
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            ValueKind::Unit => write!(f, "nil"),
            ValueKind::String(s) => write!(f, "{s}"),
            ValueKind::List(values) => {
                write!(f, "[")?;
                for (idx, value) in values.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            ValueKind::Record(record) => {
                write!(f, "{}{{", record.ty.qualified_name())?;
                for (idx, (name, value)) in record.visible_fields().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, "}}")
            }
            _ => write!(f, "{self:?}"),
        }
    }
}

#[derive(Clone)]
pub enum ValueKind {
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Record(RecordValue),
    Namespace(EnvironmentRef),
    Callable(Callable),
    Reference(TypedReference),
}

/// A function value: either a root entry or a call forwarded to the symbol
/// table under a qualified name captured at bind time.
#[derive(Clone)]
pub struct Callable {
    pub name: String,
    callback: Rc<dyn Fn(&[Value]) -> Result<Vec<Value>>>,
}

impl Callable {
    pub fn call(&self, args: &[Value]) -> Result<Vec<Value>> {
        (self.callback)(args)
    }
}

#[derive(Clone)]
pub struct RecordValue {
    pub ty: Rc<TypeDescriptor>,
    pub fields: IndexMap<String, Value>,
    pub unlocked: bool,
}

impl RecordValue {
    /// Fields shown when printing: every field once unlocked, otherwise only
    /// exported ones. Declaration order is kept.
    pub fn visible_fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter().filter(|(name, _)| {
            self.unlocked || self.ty.field(name).map_or(true, |layout| layout.exported)
        })
    }

    /// Reads a field, refusing unexported ones unless the record was unlocked.
    pub fn field(&self, name: &str) -> Result<Value> {
        let layout = self.ty.field(name).ok_or_else(|| {
            Diagnostic::resolution(format!(
                "type `{}` has no field `{name}`",
                self.ty.qualified_name()
            ))
        })?;
        if !layout.exported && !self.unlocked {
            return Err(Diagnostic::argument(format!(
                "field `{name}` of `{}` is not exported",
                self.ty.qualified_name()
            ))
            .with_note("pass the value through `sudo` to read it")
            .into());
        }
        self.fields.get(name).cloned().ok_or_else(|| {
            Diagnostic::resolution(format!(
                "record of type `{}` carries no value for `{name}`",
                self.ty.qualified_name()
            ))
            .into()
        })
    }
}

/// Declared type as reported by the symbol table.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub namespace: String,
    pub name: String,
    pub size: usize,
    pub fields: Vec<FieldLayout>,
    pub methods: Vec<String>,
}

impl TypeDescriptor {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, size: usize) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            size,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_field(
        mut self,
        name: impl Into<String>,
        offset: usize,
        scalar: ScalarType,
        exported: bool,
    ) -> Self {
        self.fields.push(FieldLayout {
            name: name.into(),
            offset,
            scalar,
            exported,
        });
        self
    }

    pub fn with_method(mut self, name: impl Into<String>) -> Self {
        self.methods.push(name.into());
        self
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldLayout> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Method names followed by field names, sorted together.
    pub fn member_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .methods
            .iter()
            .chain(self.fields.iter().map(|field| &field.name))
            .cloned()
            .collect();
        names.sort();
        names
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldLayout {
    pub name: String,
    pub offset: usize,
    pub scalar: ScalarType,
    pub exported: bool,
}

/// In-memory representation of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    F32,
    F64,
}

impl ScalarType {
    pub fn size(self) -> usize {
        match self {
            ScalarType::Bool | ScalarType::I8 | ScalarType::U8 => 1,
            ScalarType::I16 | ScalarType::U16 => 2,
            ScalarType::I32 | ScalarType::U32 | ScalarType::F32 => 4,
            ScalarType::I64 | ScalarType::F64 => 8,
        }
    }
}

/// Parameter types a registered function signature can demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Any,
    Bool,
    Int,
    Float,
    String,
    List,
    Record,
}

impl ValueType {
    pub fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value.kind()),
            (ValueType::Any, _)
                | (ValueType::Bool, ValueKind::Bool(_))
                | (ValueType::Int, ValueKind::Int(_))
                | (ValueType::Float, ValueKind::Float(_))
                | (ValueType::String, ValueKind::String(_))
                | (ValueType::List, ValueKind::List(_))
                | (ValueType::Record, ValueKind::Record(_))
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
