mod common;

use std::rc::Rc;

use burrow::{value::Value, BurrowError, DiagnosticKind, Interpreter, Session, SymbolRegistry};
use common::{fixture, Cart, CART};
use pretty_assertions::assert_eq;

fn interpreter() -> Interpreter {
    Interpreter::new(Session::new(Rc::new(fixture().registry)))
}

fn eval(source: &str) -> Value {
    interpreter()
        .eval_source(source)
        .unwrap_or_else(|err| panic!("`{source}` failed: {err}"))
}

fn eval_error(source: &str) -> BurrowError {
    match interpreter().eval_source(source) {
        Ok(value) => panic!("`{source}` should fail but produced {value}"),
        Err(err) => err,
    }
}

fn expect_strings(value: &Value) -> Vec<String> {
    value
        .as_list()
        .expect("a list")
        .iter()
        .map(|item| item.as_str().expect("a string").to_string())
        .collect()
}

#[test]
fn evaluates_literals() {
    assert_eq!(eval("42"), Value::int(42));
    assert_eq!(eval("-7"), Value::int(-7));
    assert_eq!(eval("0x10"), Value::int(16));
    assert_eq!(eval("2.5"), Value::float(2.5));
    assert_eq!(eval("\"hi\""), Value::string("hi"));
    assert_eq!(eval("nil"), Value::unit());
    assert_eq!(
        eval("[1, true]"),
        Value::list(vec![Value::int(1), Value::bool(true)])
    );
}

#[test]
fn lists_packages_from_scripts() {
    let packages = expect_strings(&eval("packages()"));
    assert_eq!(packages[0], CART);
    assert_eq!(
        expect_strings(&eval(r#"filter(packages(), "shop/ca")"#)),
        vec![CART, "example.com/shop/catalog"]
    );
}

#[test]
fn default_import_then_call() {
    let source = format!("import \"{CART}\"\ncart.Add(2, 3)");
    assert_eq!(eval(&source), Value::int(5));
}

#[test]
fn named_and_merged_imports() {
    let named = format!("import c \"{CART}\"; c.Owner");
    assert_eq!(eval(&named), Value::string("ada"));

    let merged = format!("import . \"{CART}\"; Add(Count, 1)");
    assert_eq!(eval(&merged), Value::int(4));
}

#[test]
fn discard_import_only_validates() {
    let source = format!("import _ \"{CART}\"; dir()");
    let names = expect_strings(&eval(&source));
    assert!(!names.contains(&"cart".to_string()));
    assert!(!names.contains(&"_".to_string()));
}

#[test]
fn multi_result_calls_become_lists() {
    let source = format!(r#"call("{CART}", "Total")"#);
    assert_eq!(
        eval(&source),
        Value::list(vec![Value::float(9.5), Value::string("EUR")])
    );
    let source = format!(r#"call("{CART}", "Add", 20, 22)"#);
    assert_eq!(eval(&source), Value::int(42));
}

#[test]
fn bindings_persist_between_statements() {
    let mut interpreter = interpreter();
    interpreter
        .eval_source(&format!("total = call(\"{CART}\", \"Add\", 1, 2)"))
        .unwrap();
    assert_eq!(interpreter.eval_source("total").unwrap(), Value::int(3));
}

#[test]
fn dir_lists_entries_but_not_directives() {
    let names = expect_strings(&eval("dir()"));
    for entry in ["call", "dir", "filter", "global", "load", "newAt", "packages", "sudo"] {
        assert!(names.contains(&entry.to_string()), "missing {entry}");
    }
    assert!(names.iter().all(|name| !name.starts_with('$')));

    let source = format!("import \"{CART}\"; dir(cart)");
    assert_eq!(
        expect_strings(&eval(&source)),
        vec!["Add", "Boom", "Count", "Current", "Owner", "Total"]
    );
    assert!(expect_strings(&eval("dir(dir)")).is_empty());
}

#[test]
fn reads_record_fields_with_sudo() {
    let source = format!("import \"{CART}\"; cart.Current.items");
    assert_eq!(eval(&source), Value::int(2));

    let err = eval_error(&format!("import \"{CART}\"; cart.Current.owner_id"));
    assert_eq!(err.kind(), Some(&DiagnosticKind::Argument));

    let source = format!("import \"{CART}\"; sudo(cart.Current).owner_id");
    assert_eq!(eval(&source), Value::int(77));
}

#[test]
fn locked_records_print_only_exported_fields() {
    let mut interpreter = interpreter();
    interpreter
        .eval_source(&format!("import \"{CART}\""))
        .unwrap();

    let locked = interpreter.eval_source("cart.Current").unwrap();
    let text = locked.to_string();
    assert_eq!(
        text,
        format!("{CART}.Cart{{items: 2, total: 9.5, open: true}}")
    );
    assert!(!format!("{locked:?}").contains("owner_id"));

    let unlocked = interpreter.eval_source("sudo(cart.Current)").unwrap();
    assert!(unlocked.to_string().ends_with("owner_id: 77}"));
    assert!(format!("{unlocked:?}").contains("owner_id: 77"));
}

#[test]
fn imports_bind_names_scripts_can_reference() {
    let mut registry = SymbolRegistry::new();
    registry
        .register_global("example.com/umlaut.Ärger", || Value::int(1))
        .register_global("example.com/umlaut.naïve", || Value::int(2))
        .register_global("example.com/umlaut.1st", || Value::int(3));
    let mut interpreter = Interpreter::new(Session::new(Rc::new(registry)));

    interpreter
        .eval_source(r#"import "example.com/umlaut""#)
        .unwrap();
    assert_eq!(
        expect_strings(&interpreter.eval_source("dir(umlaut)").unwrap()),
        vec!["naïve", "Ärger"]
    );
    for name in ["naïve", "Ärger"] {
        assert!(interpreter.eval_source(&format!("umlaut.{name}")).is_ok(), "{name}");
    }
    assert_eq!(interpreter.eval_source("umlaut.Ärger").unwrap(), Value::int(1));
}

#[test]
fn loads_typed_references_when_enabled() {
    let cart = Cart {
        items: 11,
        total: 3.0,
        open: false,
        owner_id: 5,
    };
    let address = &cart as *const Cart as usize;
    let mut interpreter = interpreter();
    interpreter
        .eval_source(&format!(r#"r = newAt("{CART}", "Cart", {address})"#))
        .unwrap();

    let err = interpreter.eval_source("load(r)").unwrap_err();
    assert_eq!(err.kind(), Some(&DiagnosticKind::Argument));
    let err = interpreter.eval_source("r.items").unwrap_err();
    assert_eq!(err.kind(), Some(&DiagnosticKind::Argument));

    // SAFETY: `r` is the only reference loaded and it points at `cart`.
    unsafe { interpreter.session().enable_raw_reads() };
    assert_eq!(interpreter.eval_source("load(r).items").unwrap(), Value::int(11));
    assert_eq!(interpreter.eval_source("r.items").unwrap(), Value::int(11));
    let err = interpreter.eval_source("r.owner_id").unwrap_err();
    assert_eq!(err.kind(), Some(&DiagnosticKind::Argument));
    assert_eq!(interpreter.eval_source("sudo(r).owner_id").unwrap(), Value::int(5));
    let err = interpreter.eval_source("r.missing").unwrap_err();
    assert_eq!(err.kind(), Some(&DiagnosticKind::Resolution));

    let text = interpreter.eval_source("load(r)").unwrap().to_string();
    assert!(text.contains("items: 11"), "{text}");
    assert!(!text.contains("owner_id"), "{text}");
    assert_eq!(
        interpreter.eval_source("load(sudo(r)).owner_id").unwrap(),
        Value::int(5)
    );
    assert_eq!(
        expect_strings(&interpreter.eval_source("dir(r)").unwrap()),
        vec!["Add", "Checkout", "items", "open", "owner_id", "total"]
    );
}

#[test]
fn root_entries_check_argument_shapes() {
    for source in [
        "packages(1)",
        r#"global("a")"#,
        r#"globals(1)"#,
        r#"filter("a", "b")"#,
        r#"filter(["a", 1], "b")"#,
        r#"call("a")"#,
        r#"newAt("a", "b", "c")"#,
        r#"newAt("a", "b", -1)"#,
        "load(1)",
        "dir(1, 2)",
    ] {
        let err = eval_error(source);
        assert_eq!(err.kind(), Some(&DiagnosticKind::Argument), "{source}");
    }
}

#[test]
fn symbol_failures_surface_unchanged() {
    let err = eval_error(&format!(r#"call("{CART}", "Boom")"#));
    assert_eq!(err.kind(), Some(&DiagnosticKind::Invocation));

    let err = eval_error(r#"import "example.com/none"; none.X"#);
    assert_eq!(err.kind(), Some(&DiagnosticKind::Runtime));

    let err = eval_error(r#"global("example.com/none", "X")"#);
    assert_eq!(err.kind(), Some(&DiagnosticKind::Resolution));
}

#[test]
fn runtime_errors() {
    assert_eq!(eval_error("missing").kind(), Some(&DiagnosticKind::Runtime));
    assert_eq!(eval_error("1(2)").kind(), Some(&DiagnosticKind::Runtime));
    assert_eq!(eval_error("dir.name").kind(), Some(&DiagnosticKind::Runtime));
    assert_eq!(eval_error("(1").kind(), Some(&DiagnosticKind::Parser));
    assert_eq!(eval_error("\"open").kind(), Some(&DiagnosticKind::Lexer));
}

#[test]
fn host_registry_exposes_itself() {
    let mut interpreter = Interpreter::for_host();
    let version = interpreter
        .eval_source(r#"import . "burrow/host"; Version"#)
        .unwrap();
    assert_eq!(version, Value::string(env!("CARGO_PKG_VERSION")));

    let found = interpreter
        .eval_source(r#"Getenv("BURROW_SURELY_UNSET_VARIABLE")"#)
        .unwrap();
    assert_eq!(
        found,
        Value::list(vec![Value::string(""), Value::bool(false)])
    );
}
