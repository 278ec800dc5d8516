//! Signature Parser
//!
//! Recursive-descent recognizer for the narrow grammar the extractor accepts:
//!
//! ```text
//! definition := ident:ret ident:name '(' params ')' '{'
//! params     := ε | 'void' | param (',' param)*
//! param      := ('const' | ident)+ ('*' | 'const')* ident:name
//! ```
//!
//! Only tokens at brace depth zero are considered, so function bodies and
//! struct bodies are skipped wholesale. Type resolution happens later in the
//! extractor; this stage produces raw syntax only.

use super::lexer::{Token, TokenKind};

/// A parameter fragment that matched the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParameter {
    /// Base type words with `const` removed, joined by one space
    pub base_type: String,
    pub pointer_depth: usize,
    pub name: String,
}

/// Outcome of parsing one comma-separated parameter fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawFragment {
    Parameter(RawParameter),
    /// Source text of a fragment that does not match the grammar
    Malformed(String),
}

/// A definition recognized at the top level of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDefinition {
    pub return_type: String,
    pub name: String,
    pub params: Vec<RawFragment>,
}

/// Scans a token stream for function definitions.
pub struct SignatureParser<'a> {
    src: &'a str,
    tokens: &'a [Token],
}

impl<'a> SignatureParser<'a> {
    pub fn new(src: &'a str, tokens: &'a [Token]) -> Self {
        Self { src, tokens }
    }

    /// Every top-level definition, in source order.
    pub fn definitions(&self) -> Vec<RawDefinition> {
        let mut found = Vec::new();
        let mut depth = 0usize;
        let mut pos = 0;

        while pos < self.tokens.len() {
            match self.tokens[pos].kind {
                TokenKind::OpenBrace => {
                    depth += 1;
                    pos += 1;
                }
                TokenKind::CloseBrace => {
                    depth = depth.saturating_sub(1);
                    pos += 1;
                }
                _ if depth == 0 => match self.definition_at(pos) {
                    Some((def, body)) => {
                        found.push(def);
                        pos = body;
                    }
                    None => pos += 1,
                },
                _ => pos += 1,
            }
        }

        found
    }

    /// Try to recognize `ret name ( ... ) {` starting at `pos`. Returns the
    /// definition and the index of its opening body brace.
    fn definition_at(&self, pos: usize) -> Option<(RawDefinition, usize)> {
        let return_type = self.tokens.get(pos)?.ident()?;
        let name = self.tokens.get(pos + 1)?.ident()?;
        if !self.tokens.get(pos + 2)?.is(&TokenKind::OpenParen) {
            return None;
        }

        let close = self.matching_paren(pos + 2)?;
        if !self.tokens.get(close + 1)?.is(&TokenKind::OpenBrace) {
            return None;
        }

        let def = RawDefinition {
            return_type: return_type.to_string(),
            name: name.to_string(),
            params: self.parameters(&self.tokens[pos + 3..close]),
        };
        Some((def, close + 1))
    }

    fn matching_paren(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (i, token) in self.tokens.iter().enumerate().skip(open) {
            match token.kind {
                TokenKind::OpenParen => depth += 1,
                TokenKind::CloseParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                // a brace before the closing paren means this is not a signature
                TokenKind::OpenBrace | TokenKind::CloseBrace | TokenKind::Semicolon => {
                    return None;
                }
                _ => {}
            }
        }
        None
    }

    fn parameters(&self, list: &[Token]) -> Vec<RawFragment> {
        if list.is_empty() {
            return Vec::new();
        }
        if let [only] = list {
            if only.ident() == Some("void") {
                return Vec::new();
            }
        }

        split_top_level(list)
            .into_iter()
            .map(|fragment| self.parameter(fragment))
            .collect()
    }

    fn parameter(&self, fragment: &[Token]) -> RawFragment {
        parse_parameter(fragment).unwrap_or_else(|| RawFragment::Malformed(self.text(fragment)))
    }

    fn text(&self, fragment: &[Token]) -> String {
        match (fragment.first(), fragment.last()) {
            (Some(first), Some(last)) => self.src[first.start..last.end].to_string(),
            _ => String::new(),
        }
    }
}

/// Split a parameter list on commas that are not nested in parentheses.
fn split_top_level(list: &[Token]) -> Vec<&[Token]> {
    let mut fragments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, token) in list.iter().enumerate() {
        match token.kind {
            TokenKind::OpenParen | TokenKind::OpenBracket => depth += 1,
            TokenKind::CloseParen | TokenKind::CloseBracket => depth = depth.saturating_sub(1),
            TokenKind::Comma if depth == 0 => {
                fragments.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    fragments.push(&list[start..]);
    fragments
}

fn parse_parameter(fragment: &[Token]) -> Option<RawFragment> {
    let (last, rest) = fragment.split_last()?;
    let name = last.ident().filter(|name| *name != "const")?;

    let mut base = Vec::new();
    let mut pointer_depth = 0;
    for token in rest {
        match &token.kind {
            TokenKind::Ident(word) if word == "const" => {}
            TokenKind::Ident(word) if pointer_depth == 0 => base.push(word.as_str()),
            TokenKind::Star => pointer_depth += 1,
            _ => return None,
        }
    }

    if base.is_empty() {
        return None;
    }

    Some(RawFragment::Parameter(RawParameter {
        base_type: base.join(" "),
        pointer_depth,
        name: name.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::lexer::Lexer;

    fn parse(src: &str) -> Vec<RawDefinition> {
        let tokens = Lexer::tokenize(src);
        SignatureParser::new(src, &tokens).definitions()
    }

    fn param(base: &str, depth: usize, name: &str) -> RawFragment {
        RawFragment::Parameter(RawParameter {
            base_type: base.to_string(),
            pointer_depth: depth,
            name: name.to_string(),
        })
    }

    #[test]
    fn test_parse_simple_definition() {
        let defs = parse("int add(int x, int y) { return x + y; }");
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].return_type, "int");
        assert_eq!(defs[0].name, "add");
        assert_eq!(defs[0].params, vec![param("int", 0, "x"), param("int", 0, "y")]);
    }

    #[test]
    fn test_parse_pointer_spellings() {
        let defs = parse("void f(const double *a, double* b, double * const c, int **d) {}");
        assert_eq!(
            defs[0].params,
            vec![
                param("double", 1, "a"),
                param("double", 1, "b"),
                param("double", 1, "c"),
                param("int", 2, "d"),
            ]
        );
    }

    #[test]
    fn test_parse_multiword_base() {
        let defs = parse("void f(unsigned int n) {}");
        assert_eq!(defs[0].params, vec![param("unsigned int", 0, "n")]);
    }

    #[test]
    fn test_empty_and_void_parameter_lists() {
        assert!(parse("void f() {}")[0].params.is_empty());
        assert!(parse("void f(void) {}")[0].params.is_empty());
    }

    #[test]
    fn test_malformed_fragments() {
        let defs = parse("void f(double x[], double*, int, double y) {}");
        assert_eq!(
            defs[0].params,
            vec![
                RawFragment::Malformed("double x[]".to_string()),
                RawFragment::Malformed("double*".to_string()),
                RawFragment::Malformed("int".to_string()),
                param("double", 0, "y"),
            ]
        );
    }

    #[test]
    fn test_skips_bodies_and_prototypes() {
        let src = r#"
            #include "mean.h"
            double mean(int N_x, double *x);

            double mean(int N_x, double *x) {
                double sum = 0.0;
                for (int i = 0; i < N_x; i++) {
                    if (x[i] > 0) { sum += x[i]; }
                }
                return sum / N_x;
            }
        "#;
        let defs = parse(src);
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "mean");
        assert_eq!(defs[0].params, vec![param("int", 0, "N_x"), param("double", 1, "x")]);
    }

    #[test]
    fn test_multiple_definitions_in_order() {
        let src = "static int helper(int a) { return a; }\nint add(int x, int y) { return helper(x) + y; }";
        let names: Vec<_> = parse(src).into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["helper", "add"]);
    }

    #[test]
    fn test_struct_bodies_are_skipped() {
        let src = "struct point { double x; double y; };\nvoid g(double z) {}";
        let defs = parse(src);
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "g");
    }
}
