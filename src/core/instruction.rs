// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Instructions fed to the execution driver, and the textual script format.
//!
//! A script line looks like `op<1:11:0, 0>(intA[0], 5, 6)`: module type,
//! module number, opcode, overload, then the operand list. Blank lines and
//! lines starting with `#` or `//` are skipped.

use crate::core::error::{ParseError, ScriptError};
use crate::core::expr::{parse_number, ExpressionPiece};
use crate::core::operation::{ModuleId, OpKey};
use crate::core::parser::split_operands;
use crate::core::tokenizer::Span;

/// Operands of one instruction, either already decoded or still textual.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operands {
    Pieces(Vec<ExpressionPiece>),
    /// Decoded through the operation's signature at dispatch time.
    Tokens(Vec<String>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub key: OpKey,
    pub operands: Operands,
    /// 1-based source line, when read from a script.
    pub line: Option<usize>,
}

impl Instruction {
    pub fn with_pieces(key: OpKey, pieces: Vec<ExpressionPiece>) -> Self {
        Self {
            key,
            operands: Operands::Pieces(pieces),
            line: None,
        }
    }

    pub fn with_tokens(key: OpKey, tokens: Vec<String>) -> Self {
        Self {
            key,
            operands: Operands::Tokens(tokens),
            line: None,
        }
    }
}

fn header_field<T: TryFrom<i64>>(text: &str, offset: usize, what: &str) -> Result<T, ParseError> {
    let trimmed = text.trim();
    let start = offset + (text.len() - text.trim_start().len());
    let span = Span::new(start, start + trimmed.len());
    let value = parse_number(trimmed)
        .ok_or_else(|| ParseError::new(format!("invalid {what} `{trimmed}`"), span))?;
    T::try_from(value).map_err(|_| ParseError::new(format!("{what} {value} is out of range"), span))
}

/// Parse one instruction line.
pub fn parse_instruction(text: &str) -> Result<Instruction, ParseError> {
    let indent = text.len() - text.trim_start().len();
    let body = text.trim();
    let Some(rest) = body.strip_prefix("op<") else {
        return Err(ParseError::new(
            "expected `op<type:module:opcode, overload>`",
            Span::new(indent, indent + body.len().min(3)),
        ));
    };
    let header_start = indent + 3;
    let close = rest
        .find('>')
        .ok_or_else(|| ParseError::new("missing `>`", Span::new(indent, indent + body.len())))?;
    let header = &rest[..close];

    let (ids, overload) = header.split_once(',').ok_or_else(|| {
        ParseError::new(
            "missing overload after `,`",
            Span::new(header_start, header_start + header.len()),
        )
    })?;
    let fields: Vec<&str> = ids.split(':').collect();
    let [module_type, module, opcode] = fields.as_slice() else {
        return Err(ParseError::new(
            "expected `type:module:opcode`",
            Span::new(header_start, header_start + ids.len()),
        ));
    };
    let mut offset = header_start;
    let module_type = header_field::<u8>(module_type, offset, "module type")?;
    offset += fields[0].len() + 1;
    let module = header_field::<u8>(module, offset, "module")?;
    offset += fields[1].len() + 1;
    let opcode = header_field::<u16>(opcode, offset, "opcode")?;
    let overload = header_field::<u8>(overload, header_start + ids.len() + 1, "overload")?;

    let args_start = header_start + close + 1;
    let args = rest[close + 1..].trim();
    let tokens = if args.is_empty() {
        Vec::new()
    } else {
        let inner = args
            .strip_prefix('(')
            .and_then(|inner| inner.strip_suffix(')'))
            .ok_or_else(|| {
                ParseError::new(
                    "operands must be wrapped in `(...)`",
                    Span::new(args_start, indent + body.len()),
                )
            })?;
        let inner_start = indent + body.len() - args.len() + 1;
        split_operands(inner).map_err(|err| {
            ParseError::new(
                err.message,
                Span::new(
                    err.span.col_start + inner_start,
                    err.span.col_end + inner_start,
                ),
            )
        })?
    };

    Ok(Instruction::with_tokens(
        OpKey::new(ModuleId::new(module_type, module), opcode, overload),
        tokens,
    ))
}

fn is_skipped(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//")
}

/// Parse a whole script, one instruction per non-comment line.
pub fn parse_script(source: &str) -> Result<Vec<Instruction>, ScriptError> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| !is_skipped(line))
        .map(|(idx, line)| -> Result<Instruction, ScriptError> {
            let mut instruction =
                parse_instruction(line).map_err(|source| ScriptError {
                    line: idx + 1,
                    source,
                })?;
            instruction.line = Some(idx + 1);
            Ok(instruction)
        })
        .collect()
}
