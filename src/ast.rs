use crate::diagnostics::SourceSpan;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Nil,
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: SourceSpan,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(Literal),
    Variable(String),
    Call { callee: Box<Expr>, args: Vec<Expr> },
    ListLiteral(Vec<Expr>),
    Field { target: Box<Expr>, field: String },
    Group(Box<Expr>),
}

/// Where an `import` statement binds its namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportTarget {
    /// `import "path"`: child namespace named after the last path segment.
    Default,
    /// `import . "path"`
    Merge,
    /// `import name "path"`, including the `_` sentinel.
    Named(String),
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: SourceSpan,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Import { target: ImportTarget, path: String },
    Bind { name: String, value: Expr },
    Expr(Expr),
}

#[derive(Debug, Clone, Default)]
pub struct Script {
    pub items: Vec<Stmt>,
}
