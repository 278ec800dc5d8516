//! C Source Lexer
//!
//! Splits C source text into the handful of token kinds the signature
//! scanner cares about. Comments, preprocessor lines and string/char
//! literals never produce identifiers, so text inside them cannot be
//! mistaken for a definition.

use std::iter::Peekable;
use std::str::CharIndices;

/// Token kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Number,
    Literal,
    Star,
    Comma,
    Semicolon,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Other(char),
}

/// A token with its byte span in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    pub fn is(&self, kind: &TokenKind) -> bool {
        &self.kind == kind
    }
}

/// Lexer over a single translation unit.
pub struct Lexer<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
    at_line_start: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().peekable(),
            at_line_start: true,
        }
    }

    /// Lex the whole input.
    pub fn tokenize(src: &'a str) -> Vec<Token> {
        Lexer::new(src).collect()
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.src.len(), |&(i, _)| i)
    }

    fn skip_line(&mut self) {
        let mut escaped = false;
        while let Some((_, c)) = self.chars.next() {
            match c {
                '\n' if escaped => escaped = false,
                '\n' => break,
                '\\' => escaped = true,
                c if !c.is_whitespace() => escaped = false,
                _ => {}
            }
        }
        self.at_line_start = true;
    }

    fn skip_block_comment(&mut self) {
        let mut prev = '\0';
        for (_, c) in self.chars.by_ref() {
            if prev == '*' && c == '/' {
                return;
            }
            prev = c;
        }
    }

    fn skip_literal(&mut self, quote: char) {
        let mut escaped = false;
        for (_, c) in self.chars.by_ref() {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote || c == '\n' {
                return;
            }
        }
    }

    fn take_word(&mut self) -> usize {
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.chars.next();
            } else {
                break;
            }
        }
        self.offset()
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            let (start, c) = self.chars.next()?;

            if c == '\n' {
                self.at_line_start = true;
                continue;
            }
            if c.is_whitespace() {
                continue;
            }
            if c == '#' && self.at_line_start {
                self.skip_line();
                continue;
            }
            self.at_line_start = false;

            if c == '/' {
                match self.peek_char() {
                    Some('/') => {
                        self.skip_line();
                        continue;
                    }
                    Some('*') => {
                        self.chars.next();
                        self.skip_block_comment();
                        continue;
                    }
                    _ => {}
                }
            }

            let kind = match c {
                '"' | '\'' => {
                    self.skip_literal(c);
                    TokenKind::Literal
                }
                c if c.is_ascii_alphabetic() || c == '_' => {
                    let end = self.take_word();
                    return Some(Token {
                        kind: TokenKind::Ident(self.src[start..end].to_string()),
                        start,
                        end,
                    });
                }
                c if c.is_ascii_digit() => {
                    while let Some(c) = self.peek_char() {
                        if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                            self.chars.next();
                        } else {
                            break;
                        }
                    }
                    TokenKind::Number
                }
                '*' => TokenKind::Star,
                ',' => TokenKind::Comma,
                ';' => TokenKind::Semicolon,
                '(' => TokenKind::OpenParen,
                ')' => TokenKind::CloseParen,
                '{' => TokenKind::OpenBrace,
                '}' => TokenKind::CloseBrace,
                '[' => TokenKind::OpenBracket,
                ']' => TokenKind::CloseBracket,
                other => TokenKind::Other(other),
            };

            let end = self.offset();
            return Some(Token { kind, start, end });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::tokenize(src).into_iter().map(|t| t.kind).collect()
    }

    fn ident(s: &str) -> TokenKind {
        TokenKind::Ident(s.to_string())
    }

    #[test]
    fn test_signature_tokens() {
        assert_eq!(
            kinds("double sum(const double *arr, int N_arr) {"),
            vec![
                ident("double"),
                ident("sum"),
                TokenKind::OpenParen,
                ident("const"),
                ident("double"),
                TokenKind::Star,
                ident("arr"),
                TokenKind::Comma,
                ident("int"),
                ident("N_arr"),
                TokenKind::CloseParen,
                TokenKind::OpenBrace,
            ]
        );
    }

    #[test]
    fn test_skips_comments_and_preprocessor() {
        let src = "#include \"mean.h\"\n#define X(a) \\\n  a\n// int f(int x) {\n/* double g(double y) { */ void h() {}";
        assert_eq!(
            kinds(src),
            vec![
                ident("void"),
                ident("h"),
                TokenKind::OpenParen,
                TokenKind::CloseParen,
                TokenKind::OpenBrace,
                TokenKind::CloseBrace,
            ]
        );
    }

    #[test]
    fn test_literals_hide_contents() {
        assert_eq!(
            kinds("x = \"int f(int a) {\"; c = '{';"),
            vec![
                ident("x"),
                TokenKind::Other('='),
                TokenKind::Literal,
                TokenKind::Semicolon,
                ident("c"),
                TokenKind::Other('='),
                TokenKind::Literal,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn test_spans() {
        let src = "int  foo";
        let tokens = Lexer::tokenize(src);
        assert_eq!(&src[tokens[1].start..tokens[1].end], "foo");
        assert_eq!(tokens[0].end, 3);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("0.5f + 10"),
            vec![TokenKind::Number, TokenKind::Other('+'), TokenKind::Number]
        );
    }
}
