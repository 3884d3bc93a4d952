#![allow(dead_code)]

use std::{
    cell::Cell,
    mem::{offset_of, size_of},
    rc::Rc,
};

use burrow::{
    diagnostics::{Diagnostic, Result},
    value::{ScalarType, TypeDescriptor, Value, ValueType},
    Signature, SymbolRegistry, SymbolTable,
};
use indexmap::IndexMap;

pub const CART: &str = "example.com/shop/cart";
pub const CATALOG: &str = "example.com/shop/catalog";
pub const ITEMS: &str = "example.com/shop/items";

#[repr(C)]
pub struct Cart {
    pub items: i64,
    pub total: f64,
    pub open: bool,
    pub owner_id: u32,
}

pub fn cart_type() -> TypeDescriptor {
    TypeDescriptor::new(CART, "Cart", size_of::<Cart>())
        .with_field("items", offset_of!(Cart, items), ScalarType::I64, true)
        .with_field("total", offset_of!(Cart, total), ScalarType::F64, true)
        .with_field("open", offset_of!(Cart, open), ScalarType::Bool, true)
        .with_field("owner_id", offset_of!(Cart, owner_id), ScalarType::U32, false)
        .with_method("Checkout")
        .with_method("Add")
}

pub struct Fixture {
    pub registry: SymbolRegistry,
    pub count: Rc<Cell<i64>>,
    pub cart_type: Rc<TypeDescriptor>,
}

fn q(namespace: &str, name: &str) -> String {
    format!("{namespace}.{name}")
}

/// A small shop: two namespaces with members, one known only through a
/// declared type, and a handful of linker-generated names.
pub fn fixture() -> Fixture {
    let count = Rc::new(Cell::new(3));
    let mut registry = SymbolRegistry::new();
    registry.register_type(cart_type());
    let cart_type = registry
        .resolve_type(CART, "Cart")
        .expect("cart type registered");

    let counter = Rc::clone(&count);
    let current_type = Rc::clone(&cart_type);
    registry
        .register_global(q(CART, "Count"), move || Value::int(counter.get()))
        .register_global(q(CART, "Owner"), || Value::string("ada"))
        .register_global(q(CART, "init.0"), Value::unit)
        .register_global(q(CART, "Current"), move || {
            let mut fields = IndexMap::new();
            fields.insert("items".to_string(), Value::int(2));
            fields.insert("total".to_string(), Value::float(9.5));
            fields.insert("open".to_string(), Value::bool(true));
            fields.insert("owner_id".to_string(), Value::int(77));
            Value::record(Rc::clone(&current_type), fields)
        })
        .register_global("main.verbose", || Value::bool(false))
        .register_global("struct { a int }.x", Value::unit)
        .register_global("go:buildid", || Value::string("abc"))
        .register_function(
            q(CART, "Add"),
            Signature::new(vec![ValueType::Int, ValueType::Int]),
            |args| {
                let sum = args[0].as_int().unwrap_or_default() + args[1].as_int().unwrap_or_default();
                Ok(vec![Value::int(sum)])
            },
        )
        .register_function(q(CART, "Total"), Signature::new(vec![]), |_| {
            Ok(vec![Value::float(9.5), Value::string("EUR")])
        })
        .register_function(q(CART, "Boom"), Signature::new(vec![]), |_| {
            Err(Diagnostic::invocation("checkout service unavailable").into())
        })
        .register_function(q(CART, "Cart.Checkout"), Signature::new(vec![]), |_| {
            Ok(Vec::new())
        })
        .register_function(q(CART, "(*Cart).Close"), Signature::new(vec![]), |_| {
            Ok(Vec::new())
        })
        .register_function(
            q(CATALOG, "Lookup"),
            Signature::new(vec![ValueType::String]),
            |args| Ok(vec![Value::string(format!("sku:{}", args[0]))]),
        )
        .register_function(
            format!("type:.eq.{CART}.Cart"),
            Signature::new(vec![ValueType::Any, ValueType::Any]),
            |_| Ok(vec![Value::bool(true)]),
        )
        .register_type(TypeDescriptor::new(ITEMS, "Item", 16));

    Fixture {
        registry,
        count,
        cart_type,
    }
}

/// Delegates to a registry but fails resolving one global.
pub struct Flaky {
    pub inner: SymbolRegistry,
    pub poisoned: String,
}

impl SymbolTable for Flaky {
    fn globals(&self) -> Result<Vec<String>> {
        self.inner.globals()
    }

    fn functions(&self) -> Result<Vec<String>> {
        self.inner.functions()
    }

    fn types(&self) -> Result<Vec<Rc<TypeDescriptor>>> {
        self.inner.types()
    }

    fn global(&self, qualified: &str) -> Result<Value> {
        if qualified == self.poisoned {
            return Err(Diagnostic::resolution(format!("global `{qualified}` was unmapped")).into());
        }
        self.inner.global(qualified)
    }

    fn call(&self, qualified: &str, args: &[Value]) -> Result<Vec<Value>> {
        self.inner.call(qualified, args)
    }

    fn resolve_type(&self, namespace: &str, name: &str) -> Result<Rc<TypeDescriptor>> {
        self.inner.resolve_type(namespace, name)
    }
}

/// Fails every enumeration.
pub struct Unreadable;

impl SymbolTable for Unreadable {
    fn globals(&self) -> Result<Vec<String>> {
        Err(Diagnostic::resolution("symbol table is stripped").into())
    }

    fn functions(&self) -> Result<Vec<String>> {
        Err(Diagnostic::resolution("symbol table is stripped").into())
    }

    fn types(&self) -> Result<Vec<Rc<TypeDescriptor>>> {
        Err(Diagnostic::resolution("symbol table is stripped").into())
    }

    fn global(&self, qualified: &str) -> Result<Value> {
        Err(Diagnostic::resolution(format!("global `{qualified}` not found")).into())
    }

    fn call(&self, qualified: &str, _args: &[Value]) -> Result<Vec<Value>> {
        Err(Diagnostic::resolution(format!("function `{qualified}` not found")).into())
    }

    fn resolve_type(&self, namespace: &str, name: &str) -> Result<Rc<TypeDescriptor>> {
        Err(Diagnostic::resolution(format!("type `{namespace}.{name}` not found")).into())
    }
}
