//! Root environment entries exposing the session to scripts.
//!
//! Each entry checks its argument shape before it reaches the symbol table.

use crate::{
    binder::Session,
    diagnostics::{BurrowError, Diagnostic, DiagnosticKind, Result},
    names,
    value::{Value, ValueKind},
};

pub(crate) fn install(session: &Session) {
    let entries = [
        entry(session, "packages", |session, args| {
            ensure_exact(args, 0, "packages")?;
            Ok(vec![Value::strings(session.packages()?)])
        }),
        entry(session, "globals", |session, args| {
            ensure_exact(args, 1, "globals")?;
            let namespace = expect_string(args, 0, "globals")?;
            Ok(vec![Value::strings(session.globals(namespace)?)])
        }),
        entry(session, "functions", |session, args| {
            ensure_exact(args, 1, "functions")?;
            let namespace = expect_string(args, 0, "functions")?;
            Ok(vec![Value::strings(session.functions(namespace)?)])
        }),
        entry(session, "types", |session, args| {
            ensure_exact(args, 1, "types")?;
            let namespace = expect_string(args, 0, "types")?;
            Ok(vec![Value::strings(session.types(namespace)?)])
        }),
        entry(session, "global", |session, args| {
            ensure_exact(args, 2, "global")?;
            let namespace = expect_string(args, 0, "global")?;
            let name = expect_string(args, 1, "global")?;
            Ok(vec![session.global(namespace, name)?])
        }),
        entry(session, "filter", |_, args| {
            ensure_exact(args, 2, "filter")?;
            let haystack = expect_strings(args, 0, "filter")?;
            let needle = expect_string(args, 1, "filter")?;
            Ok(vec![Value::strings(names::filter_containing(
                &haystack, needle,
            ))])
        }),
        entry(session, "call", |session, args| {
            ensure_min(args, 2, "call")?;
            let namespace = expect_string(args, 0, "call")?;
            let member = expect_string(args, 1, "call")?;
            session.call(namespace, member, &args[2..])
        }),
        entry(session, "newAt", |session, args| {
            ensure_exact(args, 3, "newAt")?;
            let namespace = expect_string(args, 0, "newAt")?;
            let name = expect_string(args, 1, "newAt")?;
            let address = expect_address(args, 2, "newAt")?;
            let reference = session.new_at(namespace, name, address)?;
            Ok(vec![Value::reference(reference)])
        }),
        entry(session, "load", |session, args| {
            ensure_exact(args, 1, "load")?;
            match args[0].kind() {
                ValueKind::Reference(reference) => Ok(vec![session.load(reference)?]),
                _ => Err(mismatch("load", 0, "Reference", &args[0])),
            }
        }),
        entry(session, "dir", |session, args| {
            if args.len() > 1 {
                return Err(Diagnostic::argument(format!(
                    "`dir` expected at most 1 argument but received {}",
                    args.len()
                ))
                .into());
            }
            Ok(vec![Value::strings(session.dir(args.first()))])
        }),
        entry(session, "sudo", |session, args| Ok(session.sudo(args))),
    ];

    let import = session.config().directive("import");
    let mut root = session.root().borrow_mut();
    for value in entries {
        if let Some(name) = value.as_callable().map(|callable| callable.name.clone()) {
            root.define(name, value);
        }
    }
    root.define(
        import,
        entry(session, "import", |session, args| {
            ensure_exact(args, 2, "import")?;
            let target = expect_string(args, 0, "import")?;
            let namespace = expect_string(args, 1, "import")?;
            session.import(target, namespace)?;
            Ok(Vec::new())
        }),
    );
}

/// Wraps `body` as a root entry holding only a weak handle on the session,
/// so the root environment does not keep its own session alive.
fn entry<F>(session: &Session, name: &'static str, body: F) -> Value
where
    F: Fn(&Session, &[Value]) -> Result<Vec<Value>> + 'static,
{
    let state = session.downgrade();
    Value::callable(name, move |args| {
        let session = Session::upgrade(&state).ok_or_else(|| {
            Diagnostic::new(
                DiagnosticKind::Runtime,
                format!("`{name}` outlived its session"),
            )
        })?;
        body(&session, args)
    })
}

fn ensure_exact(args: &[Value], expected: usize, name: &str) -> Result<()> {
    if args.len() != expected {
        return Err(Diagnostic::argument(format!(
            "`{name}` expected {expected} arguments but received {}",
            args.len()
        ))
        .into());
    }
    Ok(())
}

fn ensure_min(args: &[Value], min: usize, name: &str) -> Result<()> {
    if args.len() < min {
        return Err(Diagnostic::argument(format!(
            "`{name}` expected at least {min} arguments but received {}",
            args.len()
        ))
        .into());
    }
    Ok(())
}

fn mismatch(name: &str, idx: usize, expected: &str, found: &Value) -> BurrowError {
    Diagnostic::argument(format!(
        "`{name}` expected argument {} to be {expected} but found {}",
        idx + 1,
        found.type_name()
    ))
    .into()
}

fn expect_string<'a>(args: &'a [Value], idx: usize, name: &str) -> Result<&'a str> {
    args[idx]
        .as_str()
        .ok_or_else(|| mismatch(name, idx, "String", &args[idx]))
}

fn expect_strings(args: &[Value], idx: usize, name: &str) -> Result<Vec<String>> {
    let values = args[idx]
        .as_list()
        .ok_or_else(|| mismatch(name, idx, "List", &args[idx]))?;
    values
        .iter()
        .map(|value| {
            value
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| mismatch(name, idx, "List of String", value))
        })
        .collect()
}

fn expect_address(args: &[Value], idx: usize, name: &str) -> Result<usize> {
    let raw = args[idx]
        .as_int()
        .ok_or_else(|| mismatch(name, idx, "Int", &args[idx]))?;
    usize::try_from(raw).map_err(|_| {
        Diagnostic::argument(format!(
            "`{name}` expected argument {} to be a non-negative address but found {raw}",
            idx + 1
        ))
        .into()
    })
}
