// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Tokenizer for the textual operand encoding.

use crate::core::error::ParseError;
use crate::core::expr::parse_number;

/// Column range of a token within the operand text (0-based, end exclusive).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub col_start: usize,
    pub col_end: usize,
}

impl Span {
    pub const fn new(col_start: usize, col_end: usize) -> Self {
        Self { col_start, col_end }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatorKind {
    Plus,
    Minus,
    Multiply,
    Divide,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LogicAnd,
    LogicOr,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// Unsigned literal; the parser applies a leading minus and narrows.
    Number(i64),
    String(String),
    Identifier(String),
    Operator(OperatorKind),
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    Comma,
    At,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

const TWO_CHAR_OPERATORS: &[(&str, OperatorKind)] = &[
    ("<<", OperatorKind::Shl),
    (">>", OperatorKind::Shr),
    ("==", OperatorKind::Eq),
    ("!=", OperatorKind::Ne),
    ("<=", OperatorKind::Le),
    (">=", OperatorKind::Ge),
    ("&&", OperatorKind::LogicAnd),
    ("||", OperatorKind::LogicOr),
];

fn single_char_operator(c: char) -> Option<OperatorKind> {
    Some(match c {
        '+' => OperatorKind::Plus,
        '-' => OperatorKind::Minus,
        '*' => OperatorKind::Multiply,
        '/' => OperatorKind::Divide,
        '%' => OperatorKind::Mod,
        '&' => OperatorKind::BitAnd,
        '|' => OperatorKind::BitOr,
        '^' => OperatorKind::BitXor,
        '<' => OperatorKind::Lt,
        '>' => OperatorKind::Gt,
        _ => return None,
    })
}

fn punctuation(c: char) -> Option<TokenKind> {
    Some(match c {
        '(' => TokenKind::OpenParen,
        ')' => TokenKind::CloseParen,
        '[' => TokenKind::OpenBracket,
        ']' => TokenKind::CloseBracket,
        '{' => TokenKind::OpenBrace,
        '}' => TokenKind::CloseBrace,
        ',' => TokenKind::Comma,
        '@' => TokenKind::At,
        _ => return None,
    })
}

/// Split operand text into tokens.
pub fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut idx = 0usize;

    while idx < chars.len() {
        let c = chars[idx];
        if c.is_whitespace() {
            idx += 1;
            continue;
        }
        let start = idx;

        if c.is_ascii_digit() {
            while idx < chars.len() && chars[idx].is_ascii_alphanumeric() {
                idx += 1;
            }
            let literal: String = chars[start..idx].iter().collect();
            let value = parse_number(&literal).ok_or_else(|| {
                ParseError::new(format!("invalid number `{literal}`"), Span::new(start, idx))
            })?;
            tokens.push(Token {
                kind: TokenKind::Number(value),
                span: Span::new(start, idx),
            });
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            while idx < chars.len() && (chars[idx].is_ascii_alphanumeric() || chars[idx] == '_') {
                idx += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Identifier(chars[start..idx].iter().collect()),
                span: Span::new(start, idx),
            });
            continue;
        }

        if c == '"' {
            idx += 1;
            let mut value = String::new();
            loop {
                let Some(&ch) = chars.get(idx) else {
                    return Err(ParseError::new(
                        "unterminated string literal",
                        Span::new(start, idx),
                    ));
                };
                idx += 1;
                match ch {
                    '"' => break,
                    '\\' => {
                        let escaped = chars.get(idx).copied().ok_or_else(|| {
                            ParseError::new("unterminated escape", Span::new(start, idx))
                        })?;
                        idx += 1;
                        value.push(match escaped {
                            'n' => '\n',
                            other => other,
                        });
                    }
                    other => value.push(other),
                }
            }
            tokens.push(Token {
                kind: TokenKind::String(value),
                span: Span::new(start, idx),
            });
            continue;
        }

        if let Some(next) = chars.get(idx + 1) {
            let pair: String = [c, *next].iter().collect();
            if let Some((_, op)) = TWO_CHAR_OPERATORS.iter().find(|(text, _)| *text == pair) {
                idx += 2;
                tokens.push(Token {
                    kind: TokenKind::Operator(*op),
                    span: Span::new(start, idx),
                });
                continue;
            }
        }

        let kind = single_char_operator(c)
            .map(TokenKind::Operator)
            .or_else(|| punctuation(c))
            .ok_or_else(|| {
                ParseError::new(format!("unexpected character `{c}`"), Span::new(start, start + 1))
            })?;
        idx += 1;
        tokens.push(Token {
            kind,
            span: Span::new(start, idx),
        });
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn tokenizes_memory_reference_expression() {
        assert_eq!(
            kinds("intA[0x10] << 2"),
            vec![
                TokenKind::Identifier("intA".into()),
                TokenKind::OpenBracket,
                TokenKind::Number(16),
                TokenKind::CloseBracket,
                TokenKind::Operator(OperatorKind::Shl),
                TokenKind::Number(2),
            ]
        );
    }

    #[test]
    fn tokenizes_special_and_strings() {
        assert_eq!(
            kinds(r#"@1{"a\"b", -3}"#),
            vec![
                TokenKind::At,
                TokenKind::Number(1),
                TokenKind::OpenBrace,
                TokenKind::String("a\"b".into()),
                TokenKind::Comma,
                TokenKind::Operator(OperatorKind::Minus),
                TokenKind::Number(3),
                TokenKind::CloseBrace,
            ]
        );
    }

    #[test]
    fn spans_track_columns() {
        let tokens = tokenize("  12 >= x").unwrap();
        assert_eq!(tokens[0].span, Span::new(2, 4));
        assert_eq!(tokens[1].span, Span::new(5, 7));
    }

    #[test]
    fn rejects_unterminated_string() {
        let err = tokenize("\"abc").unwrap_err();
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn rejects_bad_number_and_stray_character() {
        assert!(tokenize("12zz").is_err());
        let err = tokenize("1 ? 2").unwrap_err();
        assert_eq!(err.span, Span::new(2, 3));
    }
}
