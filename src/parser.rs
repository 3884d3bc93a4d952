use crate::{
    ast::{Expr, ExprKind, ImportTarget, Literal, Script, Stmt, StmtKind},
    diagnostics::{Diagnostic, DiagnosticKind, SourceSpan},
    lexer::{Keyword, Lexer, Token, TokenKind},
};

pub fn parse_script(source: &str) -> Result<Script, Diagnostic> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser::new(tokens).parse_script()
}

struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    fn parse_script(&mut self) -> Result<Script, Diagnostic> {
        let mut items = Vec::new();
        while !self.is_at_end() {
            if self.matches(TokenKind::Semicolon) {
                continue;
            }
            items.push(self.parse_statement()?);
        }
        Ok(Script { items })
    }

    fn parse_statement(&mut self) -> Result<Stmt, Diagnostic> {
        if self.check(TokenKind::Keyword(Keyword::Import)) {
            return self.parse_import();
        }
        if self.check(TokenKind::Identifier) && self.check_next(TokenKind::Assign) {
            let name = self.advance();
            self.advance();
            let value = self.parse_expression()?;
            self.consume_optional_semicolon();
            return Ok(Stmt {
                span: SourceSpan::new(name.span.start, value.span.end),
                kind: StmtKind::Bind {
                    name: name.lexeme,
                    value,
                },
            });
        }
        let expr = self.parse_expression()?;
        self.consume_optional_semicolon();
        Ok(Stmt {
            span: expr.span,
            kind: StmtKind::Expr(expr),
        })
    }

    fn parse_import(&mut self) -> Result<Stmt, Diagnostic> {
        let import = self.advance();
        let target = if self.matches(TokenKind::Dot) {
            ImportTarget::Merge
        } else if self.check(TokenKind::Identifier) {
            ImportTarget::Named(self.advance().lexeme)
        } else {
            ImportTarget::Default
        };
        let path = self.consume(TokenKind::String, "expected namespace path string after `import`")?;
        self.consume_optional_semicolon();
        Ok(Stmt {
            span: SourceSpan::new(import.span.start, path.span.end),
            kind: StmtKind::Import {
                target,
                path: path.lexeme,
            },
        })
    }

    fn parse_expression(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.matches(TokenKind::LParen) {
                let args = self.parse_list(TokenKind::RParen)?;
                let paren = self.consume(TokenKind::RParen, "expected `)` after arguments")?;
                expr = Expr {
                    span: SourceSpan::new(expr.span.start, paren.span.end),
                    kind: ExprKind::Call {
                        callee: Box::new(expr),
                        args,
                    },
                };
            } else if self.matches(TokenKind::Dot) {
                let ident = self.consume(TokenKind::Identifier, "expected member name after `.`")?;
                expr = Expr {
                    span: SourceSpan::new(expr.span.start, ident.span.end),
                    kind: ExprKind::Field {
                        target: Box::new(expr),
                        field: ident.lexeme,
                    },
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_list(&mut self, terminator: TokenKind) -> Result<Vec<Expr>, Diagnostic> {
        let mut items = Vec::new();
        if !self.check(terminator) {
            loop {
                items.push(self.parse_expression()?);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        Ok(items)
    }

    fn parse_primary(&mut self) -> Result<Expr, Diagnostic> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.error_eof("unexpected end of expression"));
        };
        let literal = |kind| Expr {
            span: token.span,
            kind: ExprKind::Literal(kind),
        };
        match &token.kind {
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Ok(literal(Literal::Bool(true)))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Ok(literal(Literal::Bool(false)))
            }
            TokenKind::Keyword(Keyword::Nil) => {
                self.advance();
                Ok(literal(Literal::Nil))
            }
            TokenKind::Number => {
                self.advance();
                Ok(literal(self.number(&token, false)?))
            }
            TokenKind::Minus => {
                self.advance();
                let number = self.consume(TokenKind::Number, "expected number after `-`")?;
                Ok(Expr {
                    span: SourceSpan::new(token.span.start, number.span.end),
                    kind: ExprKind::Literal(self.number(&number, true)?),
                })
            }
            TokenKind::String => {
                self.advance();
                Ok(literal(Literal::String(token.lexeme.clone())))
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Expr {
                    span: token.span,
                    kind: ExprKind::Variable(token.lexeme.clone()),
                })
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                let rparen = self.consume(TokenKind::RParen, "expected `)` after expression")?;
                Ok(Expr {
                    span: SourceSpan::new(token.span.start, rparen.span.end),
                    kind: ExprKind::Group(Box::new(inner)),
                })
            }
            TokenKind::LBracket => {
                self.advance();
                let elements = self.parse_list(TokenKind::RBracket)?;
                let rbracket =
                    self.consume(TokenKind::RBracket, "expected `]` after list literal")?;
                Ok(Expr {
                    span: SourceSpan::new(token.span.start, rbracket.span.end),
                    kind: ExprKind::ListLiteral(elements),
                })
            }
            _ => Err(self.error(&token, "unexpected token in expression")),
        }
    }

    fn number(&self, token: &Token, negative: bool) -> Result<Literal, Diagnostic> {
        let digits = token.lexeme.replace('_', "");
        let sign = if negative { "-" } else { "" };
        let parsed = if let Some(hex) = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
        {
            i64::from_str_radix(&format!("{sign}{hex}"), 16).map(Literal::Int).ok()
        } else if digits.contains('.') {
            format!("{sign}{digits}").parse().map(Literal::Float).ok()
        } else {
            format!("{sign}{digits}").parse().map(Literal::Int).ok()
        };
        parsed.ok_or_else(|| self.error(token, "invalid numeric literal"))
    }

    fn consume_optional_semicolon(&mut self) {
        let _ = self.matches(TokenKind::Semicolon);
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token, Diagnostic> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self
                .peek()
                .map(|tok| self.error(tok, message))
                .unwrap_or_else(|| self.error_eof(message)))
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().map_or(false, |token| token.kind == kind)
    }

    fn check_next(&self, kind: TokenKind) -> bool {
        self.tokens
            .get(self.current + 1)
            .map_or(false, |token| token.kind == kind)
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous().clone()
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().map(|t| &t.kind), Some(TokenKind::Eof) | None)
    }

    fn error(&self, token: &Token, message: &str) -> Diagnostic {
        Diagnostic::new(DiagnosticKind::Parser, message.to_string()).with_span(token.span)
    }

    fn error_eof(&self, message: &str) -> Diagnostic {
        Diagnostic::new(DiagnosticKind::Parser, message.to_string())
    }
}
