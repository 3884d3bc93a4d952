use std::rc::Rc;

use tracing::trace;

use crate::{
    ast::{Expr, ExprKind, ImportTarget, Literal, Script, Stmt, StmtKind},
    binder::Session,
    diagnostics::{Diagnostic, DiagnosticKind, Result, SourceSpan},
    environment::Environment,
    host,
    parser,
    symbols::SymbolTable,
    value::{Value, ValueKind},
};

/// Evaluates scripts against a session's root environment.
pub struct Interpreter {
    session: Session,
}

impl Interpreter {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Interpreter over the symbols this binary registers about itself.
    pub fn for_host() -> Self {
        let symbols: Rc<dyn SymbolTable> = Rc::new(host::registry());
        Self::new(Session::new(symbols))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn eval_source(&mut self, source: &str) -> Result<Value> {
        let script = parser::parse_script(source)?;
        self.eval_script(script)
    }

    pub fn eval_script(&mut self, script: Script) -> Result<Value> {
        let mut last_value = Value::unit();
        for stmt in &script.items {
            last_value = self.execute_statement(stmt)?;
        }
        Ok(last_value)
    }

    fn execute_statement(&mut self, stmt: &Stmt) -> Result<Value> {
        match &stmt.kind {
            StmtKind::Import { target, path } => {
                let config = self.session.config();
                let target = match target {
                    ImportTarget::Default => String::new(),
                    ImportTarget::Merge => config.merge_target.clone(),
                    ImportTarget::Named(name) => name.clone(),
                };
                let directive = config.directive("import");
                trace!(%directive, %target, %path, "lowering import");
                let callee = Environment::get(self.session.root(), &directive, stmt.span)?;
                self.call(
                    callee,
                    vec![Value::string(target), Value::string(path.clone())],
                    stmt.span,
                )?;
                Ok(Value::unit())
            }
            StmtKind::Bind { name, value } => {
                let value = self.evaluate(value)?;
                self.session.root().borrow_mut().define(name.clone(), value);
                Ok(Value::unit())
            }
            StmtKind::Expr(expr) => self.evaluate(expr),
        }
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match &expr.kind {
            ExprKind::Literal(lit) => Ok(self.literal(lit)),
            ExprKind::Variable(name) => Environment::get(self.session.root(), name, expr.span),
            ExprKind::Call { callee, args } => {
                let callee_value = self.evaluate(callee)?;
                let mut eval_args = Vec::with_capacity(args.len());
                for arg in args {
                    eval_args.push(self.evaluate(arg)?);
                }
                self.call(callee_value, eval_args, expr.span)
            }
            ExprKind::ListLiteral(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate(element)?);
                }
                Ok(Value::list(values))
            }
            ExprKind::Group(inner) => self.evaluate(inner),
            ExprKind::Field { target, field } => {
                let target_value = self.evaluate(target)?;
                self.field(target_value, field, expr.span)
            }
        }
    }

    fn literal(&self, literal: &Literal) -> Value {
        match literal {
            Literal::Int(n) => Value::int(*n),
            Literal::Float(n) => Value::float(*n),
            Literal::Bool(b) => Value::bool(*b),
            Literal::String(s) => Value::string(s.clone()),
            Literal::Nil => Value::unit(),
        }
    }

    fn call(&mut self, callee: Value, args: Vec<Value>, span: SourceSpan) -> Result<Value> {
        match callee.kind() {
            ValueKind::Callable(callable) => {
                let results = callable.call(&args)?;
                Ok(Value::from_results(results))
            }
            _ => Err(Diagnostic::new(
                DiagnosticKind::Runtime,
                format!("{} value is not callable", callee.type_name()),
            )
            .with_span(span)
            .into()),
        }
    }

    fn field(&self, target: Value, field: &str, span: SourceSpan) -> Result<Value> {
        match target.kind() {
            ValueKind::Namespace(env) => Environment::get(env, field, span),
            ValueKind::Record(record) => record.field(field),
            ValueKind::Reference(reference) => self.session.load_field(reference, field),
            _ => Err(Diagnostic::new(
                DiagnosticKind::Runtime,
                format!("{} value has no member `{field}`", target.type_name()),
            )
            .with_span(span)
            .into()),
        }
    }
}
