//! Reflective namespace binder.
//!
//! Turns the globals, functions and declared types a process exposes through
//! a [`SymbolTable`] into a browsable, callable environment, and ships a small
//! evaluator and REPL for working with it interactively.

pub mod ast;
pub mod binder;
mod builtins;
pub mod bypass;
pub mod config;
pub mod diagnostics;
pub mod environment;
pub mod host;
pub mod lexer;
pub mod names;
pub mod parser;
pub mod raw;
pub mod repl;
pub mod runtime;
pub mod symbols;
pub mod value;

pub use binder::Session;
pub use config::BinderConfig;
pub use diagnostics::{BurrowError, Diagnostic, DiagnosticKind, SourceSpan};
pub use repl::Repl;
pub use runtime::Interpreter;
pub use symbols::{Signature, SymbolRegistry, SymbolTable};
