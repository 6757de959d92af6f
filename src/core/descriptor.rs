// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Parameter descriptors: how an operation consumes its operand pieces.
//!
//! Every descriptor kind supports the same two operations:
//!
//! - [`Descriptor::extract`] reads already-decoded pieces starting at a
//!   position and produces one [`Value`], evaluating integer expressions
//!   against the machine.
//! - [`Descriptor::decode_tokens`] turns textual operands into pieces.
//!
//! Consumption rules:
//!
//! | kind      | pieces consumed                            |
//! |-----------|--------------------------------------------|
//! | `Scalar`  | exactly one                                |
//! | `Argc`    | every remaining piece (may be zero)        |
//! | `Special` | one special piece; alternative reads its children from 0 |
//! | `Complex` | one complex piece; elements read its children from 0     |
//!
//! A parameter list is a [`Signature`]; an argc parameter may only appear
//! last in any list, which is checked when the signature is built.

use std::fmt;

use crate::core::error::{DecodeError, RegistrationError};
use crate::core::expr::{EvalContext, ExpressionPiece};
use crate::core::memory::{IntMemRef, StrMemRef};
use crate::core::parser::parse_operand;

pub const MAX_SPECIAL_ALTERNATIVES: usize = 5;

/// Single-piece parameter kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Integer expression, evaluated to its current value.
    IntConstant,
    /// String constant or string memory cell, evaluated to its text.
    StrConstant,
    /// Integer memory cell, resolved to its location.
    IntReference,
    /// String memory cell, resolved to its location.
    StrReference,
}

impl ScalarKind {
    fn expected(self) -> &'static str {
        match self {
            ScalarKind::IntConstant => "integer expression",
            ScalarKind::StrConstant => "string expression",
            ScalarKind::IntReference => "integer reference",
            ScalarKind::StrReference => "string reference",
        }
    }

    fn short_name(self) -> &'static str {
        match self {
            ScalarKind::IntConstant => "int",
            ScalarKind::StrConstant => "str",
            ScalarKind::IntReference => "intref",
            ScalarKind::StrReference => "strref",
        }
    }

    fn accepts(self, piece: &ExpressionPiece) -> bool {
        match self {
            ScalarKind::IntConstant => matches!(
                piece,
                ExpressionPiece::IntConst(_)
                    | ExpressionPiece::StoreRegister
                    | ExpressionPiece::IntMemRef { .. }
                    | ExpressionPiece::Negate(_)
                    | ExpressionPiece::Binary { .. }
            ),
            ScalarKind::StrConstant => piece.is_string_valued(),
            ScalarKind::IntReference => matches!(piece, ExpressionPiece::IntMemRef { .. }),
            ScalarKind::StrReference => matches!(piece, ExpressionPiece::StrMemRef { .. }),
        }
    }
}

/// Runtime description of one parameter slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Descriptor {
    Scalar(ScalarKind),
    /// Variable-length trailing list of the inner kind.
    Argc(Box<Descriptor>),
    /// Up to five alternatives selected by the piece's overload tag.
    Special(Vec<Descriptor>),
    /// Fixed tuple of heterogeneous elements.
    Complex(Vec<Descriptor>),
}

/// Native value produced by extraction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Int(i32),
    Str(String),
    IntRef(IntMemRef),
    StrRef(StrMemRef),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    /// The one populated alternative of a special parameter.
    Overload { tag: u8, value: Box<Value> },
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Str(_) => "string",
            Value::IntRef(_) => "integer reference",
            Value::StrRef(_) => "string reference",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Overload { .. } => "overload",
        }
    }
}

fn piece_at(pieces: &[ExpressionPiece], position: usize) -> Result<&ExpressionPiece, DecodeError> {
    pieces.get(position).ok_or(DecodeError::PositionOutOfBounds {
        position,
        len: pieces.len(),
    })
}

fn token_at(input: &[String], position: usize) -> Result<&str, DecodeError> {
    input
        .get(position)
        .map(String::as_str)
        .ok_or(DecodeError::PositionOutOfBounds {
            position,
            len: input.len(),
        })
}

fn parse_token(text: &str) -> Result<ExpressionPiece, DecodeError> {
    parse_operand(text).map_err(|err| DecodeError::MalformedOperand {
        text: text.to_string(),
        message: err.to_string(),
    })
}

fn mismatch(position: usize, expected: &'static str, piece: &ExpressionPiece) -> DecodeError {
    DecodeError::TypeMismatch {
        position,
        expected,
        found: format!("{} `{piece}`", piece.kind_name()),
    }
}

impl Descriptor {
    pub const INT: Descriptor = Descriptor::Scalar(ScalarKind::IntConstant);
    pub const STR: Descriptor = Descriptor::Scalar(ScalarKind::StrConstant);
    pub const INT_REF: Descriptor = Descriptor::Scalar(ScalarKind::IntReference);
    pub const STR_REF: Descriptor = Descriptor::Scalar(ScalarKind::StrReference);

    pub fn argc(inner: Descriptor) -> Self {
        Descriptor::Argc(Box::new(inner))
    }

    pub fn is_argc(&self) -> bool {
        matches!(self, Descriptor::Argc(_))
    }

    /// Structural checks applied when a signature containing this slot is built.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        match self {
            Descriptor::Scalar(_) => Ok(()),
            Descriptor::Argc(inner) => {
                if inner.is_argc() {
                    return Err(RegistrationError::NestedArgc);
                }
                inner.validate()
            }
            Descriptor::Special(alternatives) => {
                if alternatives.is_empty() || alternatives.len() > MAX_SPECIAL_ALTERNATIVES {
                    return Err(RegistrationError::SpecialArity {
                        count: alternatives.len(),
                    });
                }
                alternatives.iter().try_for_each(Descriptor::validate)
            }
            Descriptor::Complex(elements) => validate_sequence(elements),
        }
    }

    /// Produce the native value for this slot from `pieces[position..]`.
    pub fn extract(
        &self,
        ctx: &dyn EvalContext,
        pieces: &[ExpressionPiece],
        position: usize,
    ) -> Result<Value, DecodeError> {
        match self {
            Descriptor::Scalar(kind) => {
                let piece = piece_at(pieces, position)?;
                if !kind.accepts(piece) {
                    return Err(mismatch(position, kind.expected(), piece));
                }
                Ok(match kind {
                    ScalarKind::IntConstant => Value::Int(piece.eval_int(ctx)?),
                    ScalarKind::StrConstant => Value::Str(piece.eval_str(ctx)?),
                    ScalarKind::IntReference => Value::IntRef(piece.int_reference(ctx)?),
                    ScalarKind::StrReference => Value::StrRef(piece.str_reference(ctx)?),
                })
            }
            Descriptor::Argc(inner) => (position..pieces.len())
                .map(|idx| inner.extract(ctx, pieces, idx))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Descriptor::Special(alternatives) => {
                let piece = piece_at(pieces, position)?;
                let ExpressionPiece::Special {
                    tag,
                    pieces: children,
                } = piece
                else {
                    return Err(mismatch(position, "special expression", piece));
                };
                let alternative = alternatives.get(usize::from(*tag)).ok_or(
                    DecodeError::OverloadTagOutOfRange {
                        tag: *tag,
                        alternatives: alternatives.len(),
                    },
                )?;
                // A complex alternative is spread over the special's own children.
                let value = match alternative {
                    Descriptor::Complex(elements) => {
                        Value::Tuple(extract_sequence(elements, ctx, children, 0)?)
                    }
                    other => other.extract(ctx, children, 0)?,
                };
                Ok(Value::Overload {
                    tag: *tag,
                    value: Box::new(value),
                })
            }
            Descriptor::Complex(elements) => {
                let piece = piece_at(pieces, position)?;
                let ExpressionPiece::Complex(children) = piece else {
                    return Err(mismatch(position, "complex expression", piece));
                };
                extract_sequence(elements, ctx, children, 0).map(Value::Tuple)
            }
        }
    }

    /// Parse `input[position]` (or, for argc, `input[position..]`) into pieces.
    pub fn decode_tokens(
        &self,
        position: usize,
        input: &[String],
        output: &mut Vec<ExpressionPiece>,
    ) -> Result<(), DecodeError> {
        match self {
            Descriptor::Scalar(_) => {
                let text = token_at(input, position)?;
                output.push(parse_token(text)?);
            }
            Descriptor::Argc(inner) => {
                for idx in position..input.len() {
                    inner.decode_tokens(idx, input, output)?;
                }
            }
            Descriptor::Special(_) => {
                let text = token_at(input, position)?;
                let piece = parse_token(text)?;
                if !piece.is_special() {
                    return Err(DecodeError::MalformedOperand {
                        text: text.to_string(),
                        message: "expected a special operand `@tag{...}`".to_string(),
                    });
                }
                output.push(piece);
            }
            Descriptor::Complex(_) => {
                let text = token_at(input, position)?;
                let piece = parse_token(text)?;
                if !matches!(piece, ExpressionPiece::Complex(_)) {
                    return Err(DecodeError::MalformedOperand {
                        text: text.to_string(),
                        message: "expected a complex operand `{...}`".to_string(),
                    });
                }
                output.push(piece);
            }
        }
        Ok(())
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Scalar(kind) => f.write_str(kind.short_name()),
            Descriptor::Argc(inner) => write!(f, "argc<{inner}>"),
            Descriptor::Special(alternatives) => {
                f.write_str("special<")?;
                for (idx, alt) in alternatives.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{alt}")?;
                }
                f.write_str(">")
            }
            Descriptor::Complex(elements) => {
                f.write_str("{")?;
                write_joined(f, elements)?;
                f.write_str("}")
            }
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Descriptor]) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn validate_sequence(params: &[Descriptor]) -> Result<(), RegistrationError> {
    for (position, param) in params.iter().enumerate() {
        if param.is_argc() && position + 1 < params.len() {
            return Err(RegistrationError::ArgcNotLast {
                position,
                trailing: params.len() - position - 1,
            });
        }
        param.validate()?;
    }
    Ok(())
}

fn extract_sequence(
    params: &[Descriptor],
    ctx: &dyn EvalContext,
    pieces: &[ExpressionPiece],
    start: usize,
) -> Result<Vec<Value>, DecodeError> {
    params
        .iter()
        .enumerate()
        .map(|(offset, param)| param.extract(ctx, pieces, start + offset))
        .collect()
}

/// The composite parameter list of one operation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Signature {
    params: Vec<Descriptor>,
}

impl Signature {
    pub fn new(params: Vec<Descriptor>) -> Result<Self, RegistrationError> {
        validate_sequence(&params)?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &[Descriptor] {
        &self.params
    }

    pub fn is_variadic(&self) -> bool {
        self.params.last().is_some_and(Descriptor::is_argc)
    }

    /// Extract every parameter, starting with the first piece.
    ///
    /// Pieces beyond a fixed-arity signature are ignored.
    pub fn extract(
        &self,
        ctx: &dyn EvalContext,
        pieces: &[ExpressionPiece],
    ) -> Result<Vec<Value>, DecodeError> {
        extract_sequence(&self.params, ctx, pieces, 0)
    }

    /// Decode textual operands into pieces for this parameter list.
    pub fn decode_tokens(&self, input: &[String]) -> Result<Vec<ExpressionPiece>, DecodeError> {
        let mut output = Vec::with_capacity(input.len());
        for (position, param) in self.params.iter().enumerate() {
            param.decode_tokens(position, input, &mut output)?;
        }
        Ok(output)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        write_joined(f, &self.params)?;
        f.write_str(")")
    }
}
