// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Textual operand parser.
//!
//! Turns one operand of the textual encoding into one [`ExpressionPiece`].
//! This is the token-level path that builds special pieces directly: the
//! overload tag is read from the text itself (`@tag{...}`), so no parameter
//! descriptor is consulted.

use crate::core::error::ParseError;
use crate::core::expr::{BinaryOp, ExpressionPiece};
use crate::core::memory::{IntBank, StrBank};
use crate::core::tokenizer::{tokenize, OperatorKind, Span, Token, TokenKind};

/// Parse a single operand.
pub fn parse_operand(text: &str) -> Result<ExpressionPiece, ParseError> {
    let tokens = tokenize(text)?;
    let end = text.chars().count();
    OperandParser::new(tokens, Span::new(end, end)).parse_all()
}

/// Split an argument list at top-level commas.
///
/// Commas nested in `()`, `[]`, `{}` or string literals do not split.
pub fn split_operands(text: &str) -> Result<Vec<String>, ParseError> {
    let mut operands = Vec::new();
    let mut depth: Vec<(char, usize)> = Vec::new();
    let mut current = String::new();
    let mut current_start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (col, c) in text.chars().enumerate() {
        if in_string {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                current.push(c);
            }
            '(' | '[' | '{' => {
                depth.push((c, col));
                current.push(c);
            }
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match depth.pop() {
                    Some((open, _)) if open == expected => current.push(c),
                    _ => {
                        return Err(ParseError::new(
                            format!("unbalanced `{c}`"),
                            Span::new(col, col + 1),
                        ))
                    }
                }
            }
            ',' if depth.is_empty() => {
                push_operand(&mut operands, &current, current_start, col)?;
                current.clear();
                current_start = col + 1;
            }
            _ => current.push(c),
        }
    }

    if in_string {
        return Err(ParseError::new(
            "unterminated string literal",
            Span::new(current_start, text.chars().count()),
        ));
    }
    if let Some((open, col)) = depth.pop() {
        return Err(ParseError::new(
            format!("unclosed `{open}`"),
            Span::new(col, col + 1),
        ));
    }
    if !current.trim().is_empty() || !operands.is_empty() {
        push_operand(&mut operands, &current, current_start, text.chars().count())?;
    }
    Ok(operands)
}

fn push_operand(
    operands: &mut Vec<String>,
    text: &str,
    start: usize,
    end: usize,
) -> Result<(), ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::new("empty operand", Span::new(start, end)));
    }
    operands.push(trimmed.to_string());
    Ok(())
}

struct OperandParser {
    tokens: Vec<Token>,
    index: usize,
    end_span: Span,
}

impl OperandParser {
    fn new(tokens: Vec<Token>, end_span: Span) -> Self {
        Self {
            tokens,
            index: 0,
            end_span,
        }
    }

    fn parse_all(mut self) -> Result<ExpressionPiece, ParseError> {
        if self.tokens.is_empty() {
            return Err(ParseError::new("empty operand", self.end_span));
        }
        let piece = self.parse_operand()?;
        if let Some(token) = self.peek() {
            return Err(ParseError::new("unexpected trailing tokens", token.span));
        }
        Ok(piece)
    }

    fn parse_operand(&mut self) -> Result<ExpressionPiece, ParseError> {
        match self.peek().map(|token| &token.kind) {
            Some(TokenKind::At) => {
                self.index += 1;
                let tag_span = self.current_span();
                let tag = match self.next_kind() {
                    Some(TokenKind::Number(value)) => u8::try_from(value).map_err(|_| {
                        ParseError::new(format!("overload tag {value} out of range"), tag_span)
                    })?,
                    _ => return Err(ParseError::new("expected overload tag after `@`", tag_span)),
                };
                let pieces = self.parse_braced_list()?;
                Ok(ExpressionPiece::Special { tag, pieces })
            }
            Some(TokenKind::OpenBrace) => Ok(ExpressionPiece::Complex(self.parse_braced_list()?)),
            _ => self.parse_expr(),
        }
    }

    fn parse_braced_list(&mut self) -> Result<Vec<ExpressionPiece>, ParseError> {
        if !self.consume_kind(&TokenKind::OpenBrace) {
            return Err(ParseError::new("expected `{`", self.current_span()));
        }
        let mut pieces = Vec::new();
        if self.consume_kind(&TokenKind::CloseBrace) {
            return Ok(pieces);
        }
        loop {
            pieces.push(self.parse_operand()?);
            if self.consume_kind(&TokenKind::Comma) {
                continue;
            }
            if self.consume_kind(&TokenKind::CloseBrace) {
                return Ok(pieces);
            }
            return Err(ParseError::new("expected `,` or `}`", self.current_span()));
        }
    }

    fn parse_expr(&mut self) -> Result<ExpressionPiece, ParseError> {
        self.parse_binary_level(0)
    }

    /// Precedence climbing over [`BINARY_LEVELS`], loosest level first.
    fn parse_binary_level(&mut self, level: usize) -> Result<ExpressionPiece, ParseError> {
        let Some(ops) = BINARY_LEVELS.get(level) else {
            return self.parse_unary();
        };
        let mut node = self.parse_binary_level(level + 1)?;
        loop {
            let Some(op) = self
                .peek_operator_kind()
                .and_then(|kind| ops.iter().find(|(k, _)| *k == kind).map(|(_, op)| *op))
            else {
                break;
            };
            self.index += 1;
            let right = self.parse_binary_level(level + 1)?;
            node = ExpressionPiece::binary(op, node, right);
        }
        Ok(node)
    }

    fn parse_unary(&mut self) -> Result<ExpressionPiece, ParseError> {
        if self.match_operator(OperatorKind::Minus) {
            let span = self.prev_span();
            if let Some(TokenKind::Number(value)) = self.peek().map(|token| &token.kind) {
                let value = -*value;
                self.index += 1;
                return i32::try_from(value)
                    .map(ExpressionPiece::IntConst)
                    .map_err(|_| ParseError::new(format!("integer {value} out of range"), span));
            }
            let operand = self.parse_unary()?;
            return Ok(ExpressionPiece::Negate(Box::new(operand)));
        }
        if self.match_operator(OperatorKind::Plus) {
            return self.parse_unary();
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<ExpressionPiece, ParseError> {
        let span = self.current_span();
        match self.next_kind() {
            Some(TokenKind::Number(value)) => i32::try_from(value)
                .map(ExpressionPiece::IntConst)
                .map_err(|_| ParseError::new(format!("integer {value} out of range"), span)),
            Some(TokenKind::String(text)) => Ok(ExpressionPiece::StrConst(text)),
            Some(TokenKind::OpenParen) => {
                let expr = self.parse_expr()?;
                if !self.consume_kind(&TokenKind::CloseParen) {
                    return Err(ParseError::new("missing `)`", self.current_span()));
                }
                Ok(expr)
            }
            Some(TokenKind::Identifier(name)) => {
                if name == "store" {
                    return Ok(ExpressionPiece::StoreRegister);
                }
                if let Some(bank) = IntBank::from_name(&name) {
                    let index = self.parse_index()?;
                    return Ok(ExpressionPiece::IntMemRef {
                        bank,
                        index: Box::new(index),
                    });
                }
                if let Some(bank) = StrBank::from_name(&name) {
                    let index = self.parse_index()?;
                    return Ok(ExpressionPiece::StrMemRef {
                        bank,
                        index: Box::new(index),
                    });
                }
                Err(ParseError::new(format!("unknown identifier `{name}`"), span))
            }
            Some(_) => Err(ParseError::new("expected an expression", span)),
            None => Err(ParseError::new("unexpected end of operand", span)),
        }
    }

    fn parse_index(&mut self) -> Result<ExpressionPiece, ParseError> {
        if !self.consume_kind(&TokenKind::OpenBracket) {
            return Err(ParseError::new(
                "expected `[` after memory bank",
                self.current_span(),
            ));
        }
        let index = self.parse_expr()?;
        if !self.consume_kind(&TokenKind::CloseBracket) {
            return Err(ParseError::new("missing `]`", self.current_span()));
        }
        Ok(index)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn next_kind(&mut self) -> Option<TokenKind> {
        let kind = self.tokens.get(self.index).map(|token| token.kind.clone());
        if kind.is_some() {
            self.index += 1;
        }
        kind
    }

    fn peek_operator_kind(&self) -> Option<OperatorKind> {
        match self.peek().map(|token| &token.kind) {
            Some(TokenKind::Operator(kind)) => Some(*kind),
            _ => None,
        }
    }

    fn match_operator(&mut self, kind: OperatorKind) -> bool {
        if self.peek_operator_kind() == Some(kind) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn consume_kind(&mut self, kind: &TokenKind) -> bool {
        if self.peek().map(|token| &token.kind) == Some(kind) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn current_span(&self) -> Span {
        self.peek().map(|token| token.span).unwrap_or(self.end_span)
    }

    fn prev_span(&self) -> Span {
        self.index
            .checked_sub(1)
            .and_then(|idx| self.tokens.get(idx))
            .map(|token| token.span)
            .unwrap_or(self.end_span)
    }
}

const BINARY_LEVELS: &[&[(OperatorKind, BinaryOp)]] = &[
    &[(OperatorKind::LogicOr, BinaryOp::LogicOr)],
    &[(OperatorKind::LogicAnd, BinaryOp::LogicAnd)],
    &[(OperatorKind::BitOr, BinaryOp::BitOr)],
    &[(OperatorKind::BitXor, BinaryOp::BitXor)],
    &[(OperatorKind::BitAnd, BinaryOp::BitAnd)],
    &[
        (OperatorKind::Eq, BinaryOp::Eq),
        (OperatorKind::Ne, BinaryOp::Ne),
    ],
    &[
        (OperatorKind::Lt, BinaryOp::Lt),
        (OperatorKind::Le, BinaryOp::Le),
        (OperatorKind::Gt, BinaryOp::Gt),
        (OperatorKind::Ge, BinaryOp::Ge),
    ],
    &[
        (OperatorKind::Shl, BinaryOp::Shl),
        (OperatorKind::Shr, BinaryOp::Shr),
    ],
    &[
        (OperatorKind::Plus, BinaryOp::Add),
        (OperatorKind::Minus, BinaryOp::Subtract),
    ],
    &[
        (OperatorKind::Multiply, BinaryOp::Multiply),
        (OperatorKind::Divide, BinaryOp::Divide),
        (OperatorKind::Mod, BinaryOp::Mod),
    ],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_literal_integer() {
        assert_eq!(parse_operand("42").unwrap(), ExpressionPiece::IntConst(42));
        assert_eq!(parse_operand("-42").unwrap(), ExpressionPiece::IntConst(-42));
        assert_eq!(
            parse_operand("-2147483648").unwrap(),
            ExpressionPiece::IntConst(i32::MIN)
        );
        assert!(parse_operand("2147483648").is_err());
    }

    #[test]
    fn respects_precedence() {
        let piece = parse_operand("1 + 2 * 3").unwrap();
        assert_eq!(
            piece,
            ExpressionPiece::binary(
                BinaryOp::Add,
                ExpressionPiece::IntConst(1),
                ExpressionPiece::binary(
                    BinaryOp::Multiply,
                    ExpressionPiece::IntConst(2),
                    ExpressionPiece::IntConst(3),
                ),
            )
        );
        let grouped = parse_operand("(1 + 2) * 3").unwrap();
        assert_eq!(grouped.to_string(), "(1 + 2) * 3");
    }

    #[test]
    fn parses_memory_references() {
        let piece = parse_operand("intB[intA[1] + 1]").unwrap();
        assert_eq!(piece.to_string(), "intB[intA[1] + 1]");
        assert_eq!(
            parse_operand("strS[3]").unwrap(),
            ExpressionPiece::str_ref(StrBank::S, 3)
        );
        assert!(parse_operand("intQ[1]").is_err());
        assert!(parse_operand("intA").is_err());
    }

    #[test]
    fn parses_special_with_nested_complex() {
        let piece = parse_operand(r#"@1{{intA[0], "yes"}}"#).unwrap();
        assert_eq!(piece.overload_tag(), Some(1));
        let children = piece.contained_pieces().unwrap();
        assert_eq!(children.len(), 1);
        assert!(matches!(children[0], ExpressionPiece::Complex(ref inner) if inner.len() == 2));
    }

    #[test]
    fn parses_empty_special() {
        let piece = parse_operand("@0{}").unwrap();
        assert_eq!(
            piece,
            ExpressionPiece::Special {
                tag: 0,
                pieces: Vec::new()
            }
        );
    }

    #[test]
    fn rejects_oversized_tag_and_trailing_tokens() {
        assert!(parse_operand("@256{1}").is_err());
        let err = parse_operand("1 2").unwrap_err();
        assert_eq!(err.span, Span::new(2, 3));
    }

    #[test]
    fn store_register_keyword() {
        assert_eq!(
            parse_operand("store").unwrap(),
            ExpressionPiece::StoreRegister
        );
    }

    #[test]
    fn split_operands_respects_nesting() {
        let parts = split_operands(r#"intA[0], @1{2, "a,b"}, {1, 2}, (3, 4"#);
        assert!(parts.is_err());
        let parts = split_operands(r#"intA[0], @1{2, "a,b"}, {1, 2}"#).unwrap();
        assert_eq!(parts, vec!["intA[0]", r#"@1{2, "a,b"}"#, "{1, 2}"]);
    }

    #[test]
    fn split_operands_handles_empty_and_blank() {
        assert!(split_operands("").unwrap().is_empty());
        assert!(split_operands("   ").unwrap().is_empty());
        assert!(split_operands("1,,2").is_err());
        assert!(split_operands("1,").is_err());
    }
}
