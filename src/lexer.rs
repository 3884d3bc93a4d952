use crate::diagnostics::{Diagnostic, DiagnosticKind, SourceSpan};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyword {
    Import,
    True,
    False,
    Nil,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Number,
    String,
    Keyword(Keyword),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Semicolon,
    Assign,
    Minus,
    Unknown,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: SourceSpan,
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    current: usize,
    peeked: Option<(usize, char)>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices(),
            current: 0,
            peeked: None,
        }
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let next = match self.peeked.take() {
            Some(pair) => Some(pair),
            None => self.chars.next(),
        };
        if let Some((idx, ch)) = next {
            self.current = idx + ch.len_utf8();
        }
        next
    }

    fn peek(&mut self) -> Option<(usize, char)> {
        if self.peeked.is_none() {
            self.peeked = self.chars.next();
        }
        self.peeked
    }

    fn eat_while<F>(&mut self, mut predicate: F)
    where
        F: FnMut(char) -> bool,
    {
        while let Some((_, ch)) = self.peek() {
            if !predicate(ch) {
                break;
            }
            self.bump();
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            self.eat_while(char::is_whitespace);
            match self.peek() {
                Some((_, '#')) => self.eat_while(|ch| ch != '\n'),
                _ => break,
            }
        }
    }

    fn identifier_or_keyword(&mut self, start: usize) -> Token {
        self.eat_while(|ch| ch.is_alphanumeric() || ch == '_');
        let lexeme = self.source[start..self.current].to_string();
        let kind = keyword_for(&lexeme).unwrap_or(TokenKind::Identifier);
        Token {
            kind,
            lexeme,
            span: SourceSpan::new(start, self.current),
        }
    }

    fn number_literal(&mut self, start: usize, first: char) -> Token {
        let hex = first == '0' && matches!(self.peek(), Some((_, 'x' | 'X')));
        if hex {
            self.bump();
            self.eat_while(|ch| ch.is_ascii_hexdigit() || ch == '_');
        } else {
            let mut seen_dot = false;
            while let Some((_, ch)) = self.peek() {
                match ch {
                    '0'..='9' | '_' => {
                        self.bump();
                    }
                    '.' if !seen_dot && self.digit_follows_dot() => {
                        seen_dot = true;
                        self.bump();
                    }
                    _ => break,
                }
            }
        }
        Token {
            kind: TokenKind::Number,
            lexeme: self.source[start..self.current].to_string(),
            span: SourceSpan::new(start, self.current),
        }
    }

    /// A dot only continues a number when a digit follows it.
    fn digit_follows_dot(&self) -> bool {
        self.chars
            .clone()
            .next()
            .map_or(false, |(_, ch)| ch.is_ascii_digit())
    }

    fn string_literal(&mut self, start: usize) -> Result<Token, Diagnostic> {
        let mut value = String::new();
        while let Some((_, ch)) = self.bump() {
            match ch {
                '"' => {
                    return Ok(Token {
                        kind: TokenKind::String,
                        lexeme: value,
                        span: SourceSpan::new(start, self.current),
                    });
                }
                '\\' => match self.bump() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 'r')) => value.push('\r'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, other)) => value.push(other),
                    None => break,
                },
                _ => value.push(ch),
            }
        }
        Err(
            Diagnostic::new(DiagnosticKind::Lexer, "unterminated string literal")
                .with_span(SourceSpan::new(start, self.current)),
        )
    }

    fn simple_token(&mut self, start: usize, kind: TokenKind) -> Token {
        Token {
            kind,
            lexeme: self.source[start..self.current].to_string(),
            span: SourceSpan::new(start, self.current),
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, Diagnostic> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            let Some((start, ch)) = self.bump() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    lexeme: String::new(),
                    span: SourceSpan::new(self.current, self.current),
                });
                break;
            };

            let token = match ch {
                c if c.is_alphabetic() || c == '_' => self.identifier_or_keyword(start),
                '0'..='9' => self.number_literal(start, ch),
                '"' => self.string_literal(start)?,
                '(' => self.simple_token(start, TokenKind::LParen),
                ')' => self.simple_token(start, TokenKind::RParen),
                '[' => self.simple_token(start, TokenKind::LBracket),
                ']' => self.simple_token(start, TokenKind::RBracket),
                ',' => self.simple_token(start, TokenKind::Comma),
                '.' => self.simple_token(start, TokenKind::Dot),
                ';' => self.simple_token(start, TokenKind::Semicolon),
                '=' => self.simple_token(start, TokenKind::Assign),
                '-' => self.simple_token(start, TokenKind::Minus),
                _ => self.simple_token(start, TokenKind::Unknown),
            };
            tokens.push(token);
        }
        Ok(tokens)
    }
}

fn keyword_for(ident: &str) -> Option<TokenKind> {
    let keyword = match ident {
        "import" => Keyword::Import,
        "true" => Keyword::True,
        "false" => Keyword::False,
        "nil" => Keyword::Nil,
        _ => return None,
    };
    Some(TokenKind::Keyword(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn import_statement() {
        assert_eq!(
            kinds(r#"import . "net/http""#),
            vec![
                TokenKind::Keyword(Keyword::Import),
                TokenKind::Dot,
                TokenKind::String,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn numbers_and_member_access() {
        let tokens = Lexer::new("f(0x1f, 2.5).x # trailing").tokenize().unwrap();
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["f", "(", "0x1f", ",", "2.5", ")", ".", "x", ""]);
    }

    #[test]
    fn identifiers_may_start_with_any_letter() {
        let tokens = Lexer::new("pkg.Ärger _x").tokenize().unwrap();
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["pkg", ".", "Ärger", "_x", ""]);
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = Lexer::new("\"open").tokenize().unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::Lexer);
    }
}
