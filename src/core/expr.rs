// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Expression pieces: the decoded form of one instruction operand.
//!
//! A piece is built once per instruction (by the bytecode decoder or by the
//! textual parser in [`crate::core::parser`]) and is read-only afterwards.
//! Integer sub-expressions may reference machine memory, so evaluation goes
//! through an [`EvalContext`] at extraction time rather than at decode time.

use std::fmt;

use crate::core::error::EvalError;
use crate::core::memory::{IntBank, IntMemRef, Memory, StrBank, StrMemRef};

/// Binary operators available in integer expressions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
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

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Mod => "%",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::LogicAnd => "&&",
            BinaryOp::LogicOr => "||",
        }
    }
}

/// One decoded operand node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionPiece {
    /// Resolved integer constant.
    IntConst(i32),
    /// Text literal.
    StrConst(String),
    /// The machine's store register.
    StoreRegister,
    /// `intX[index]`.
    IntMemRef {
        bank: IntBank,
        index: Box<ExpressionPiece>,
    },
    /// `strX[index]`.
    StrMemRef {
        bank: StrBank,
        index: Box<ExpressionPiece>,
    },
    Negate(Box<ExpressionPiece>),
    Binary {
        op: BinaryOp,
        left: Box<ExpressionPiece>,
        right: Box<ExpressionPiece>,
    },
    /// Fixed tuple of operands, consumed as a unit by a complex parameter.
    Complex(Vec<ExpressionPiece>),
    /// Overloaded operand: `tag` selects which declared shape `pieces` holds.
    Special {
        tag: u8,
        pieces: Vec<ExpressionPiece>,
    },
}

impl ExpressionPiece {
    pub fn int_ref(bank: IntBank, index: i32) -> Self {
        Self::IntMemRef {
            bank,
            index: Box::new(Self::IntConst(index)),
        }
    }

    pub fn str_ref(bank: StrBank, index: i32) -> Self {
        Self::StrMemRef {
            bank,
            index: Box::new(Self::IntConst(index)),
        }
    }

    pub fn binary(op: BinaryOp, left: ExpressionPiece, right: ExpressionPiece) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Short name of the piece's shape for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::IntConst(_) | Self::Negate(_) | Self::Binary { .. } => "integer expression",
            Self::StoreRegister => "store register",
            Self::StrConst(_) => "string constant",
            Self::IntMemRef { .. } => "integer reference",
            Self::StrMemRef { .. } => "string reference",
            Self::Complex(_) => "complex expression",
            Self::Special { .. } => "special expression",
        }
    }

    pub fn is_string_valued(&self) -> bool {
        matches!(self, Self::StrConst(_) | Self::StrMemRef { .. })
    }

    pub fn is_special(&self) -> bool {
        matches!(self, Self::Special { .. })
    }

    /// Overload tag of a special piece.
    pub fn overload_tag(&self) -> Option<u8> {
        match self {
            Self::Special { tag, .. } => Some(*tag),
            _ => None,
        }
    }

    /// Children of a special or complex piece.
    pub fn contained_pieces(&self) -> Option<&[ExpressionPiece]> {
        match self {
            Self::Special { pieces, .. } | Self::Complex(pieces) => Some(pieces),
            _ => None,
        }
    }

    /// Evaluate as an integer, reading memory through `ctx`.
    pub fn eval_int(&self, ctx: &dyn EvalContext) -> Result<i32, EvalError> {
        match self {
            Self::IntConst(value) => Ok(*value),
            Self::StoreRegister => Ok(ctx.store_register()),
            Self::IntMemRef { bank, index } => {
                let index = index.eval_int(ctx)?;
                ctx.int_value(IntMemRef::new(*bank, index))
            }
            Self::Negate(inner) => Ok(inner.eval_int(ctx)?.wrapping_neg()),
            Self::Binary { op, left, right } => {
                let l = left.eval_int(ctx)?;
                match op {
                    BinaryOp::LogicAnd if l == 0 => Ok(0),
                    BinaryOp::LogicOr if l != 0 => Ok(1),
                    _ => Ok(apply_binary(*op, l, right.eval_int(ctx)?)),
                }
            }
            Self::StrConst(_) | Self::StrMemRef { .. } | Self::Complex(_) | Self::Special { .. } => {
                Err(EvalError::NotAnInteger(self.to_string()))
            }
        }
    }

    /// Evaluate as a string.
    pub fn eval_str(&self, ctx: &dyn EvalContext) -> Result<String, EvalError> {
        match self {
            Self::StrConst(text) => Ok(text.clone()),
            Self::StrMemRef { bank, index } => {
                let index = index.eval_int(ctx)?;
                ctx.str_value(StrMemRef::new(*bank, index))
            }
            _ => Err(EvalError::NotAString(self.to_string())),
        }
    }

    /// Resolve an integer memory reference to its location without reading it.
    pub fn int_reference(&self, ctx: &dyn EvalContext) -> Result<IntMemRef, EvalError> {
        match self {
            Self::IntMemRef { bank, index } => Ok(IntMemRef::new(*bank, index.eval_int(ctx)?)),
            _ => Err(EvalError::NotAReference {
                expected: "integer",
                found: self.to_string(),
            }),
        }
    }

    pub fn str_reference(&self, ctx: &dyn EvalContext) -> Result<StrMemRef, EvalError> {
        match self {
            Self::StrMemRef { bank, index } => Ok(StrMemRef::new(*bank, index.eval_int(ctx)?)),
            _ => Err(EvalError::NotAReference {
                expected: "string",
                found: self.to_string(),
            }),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, pieces: &[ExpressionPiece]) -> fmt::Result {
    f.write_str("{")?;
    for (idx, piece) in pieces.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{piece}")?;
    }
    f.write_str("}")
}

fn write_operand(f: &mut fmt::Formatter<'_>, piece: &ExpressionPiece) -> fmt::Result {
    if matches!(piece, ExpressionPiece::Binary { .. }) {
        write!(f, "({piece})")
    } else {
        write!(f, "{piece}")
    }
}

/// Renders the textual operand encoding accepted by the parser.
impl fmt::Display for ExpressionPiece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IntConst(value) => write!(f, "{value}"),
            Self::StrConst(text) => {
                f.write_str("\"")?;
                for ch in text.chars() {
                    match ch {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        _ => write!(f, "{ch}")?,
                    }
                }
                f.write_str("\"")
            }
            Self::StoreRegister => f.write_str("store"),
            Self::IntMemRef { bank, index } => write!(f, "{}[{index}]", bank.name()),
            Self::StrMemRef { bank, index } => write!(f, "{}[{index}]", bank.name()),
            Self::Negate(inner) => {
                f.write_str("-")?;
                write_operand(f, inner)
            }
            Self::Binary { op, left, right } => {
                write_operand(f, left)?;
                write!(f, " {} ", op.symbol())?;
                write_operand(f, right)
            }
            Self::Complex(pieces) => write_list(f, pieces),
            Self::Special { tag, pieces } => {
                write!(f, "@{tag}")?;
                write_list(f, pieces)
            }
        }
    }
}

/// Context for expression evaluation.
///
/// This trait is the machine-facing side of the evaluator: it resolves
/// memory cells and the store register while pieces are extracted.
pub trait EvalContext {
    fn int_value(&self, loc: IntMemRef) -> Result<i32, EvalError>;

    fn str_value(&self, loc: StrMemRef) -> Result<String, EvalError>;

    fn store_register(&self) -> i32;
}

/// Apply a binary operator to two values.
///
/// Division and modulo by zero leave the left operand unchanged.
pub fn apply_binary(op: BinaryOp, l: i32, r: i32) -> i32 {
    match op {
        BinaryOp::Add => l.wrapping_add(r),
        BinaryOp::Subtract => l.wrapping_sub(r),
        BinaryOp::Multiply => l.wrapping_mul(r),
        BinaryOp::Divide => {
            if r == 0 {
                l
            } else {
                l.wrapping_div(r)
            }
        }
        BinaryOp::Mod => {
            if r == 0 {
                l
            } else {
                l.wrapping_rem(r)
            }
        }
        BinaryOp::BitAnd => l & r,
        BinaryOp::BitOr => l | r,
        BinaryOp::BitXor => l ^ r,
        BinaryOp::Shl => l.wrapping_shl((r & 0x1f) as u32),
        BinaryOp::Shr => l.wrapping_shr((r & 0x1f) as u32),
        BinaryOp::Eq => (l == r) as i32,
        BinaryOp::Ne => (l != r) as i32,
        BinaryOp::Lt => (l < r) as i32,
        BinaryOp::Le => (l <= r) as i32,
        BinaryOp::Gt => (l > r) as i32,
        BinaryOp::Ge => (l >= r) as i32,
        BinaryOp::LogicAnd => ((l != 0) && (r != 0)) as i32,
        BinaryOp::LogicOr => ((l != 0) || (r != 0)) as i32,
    }
}

/// Parse an integer literal (decimal, `0x` hex, `0b` binary).
///
/// The result is not range-checked against `i32`; callers apply the sign
/// and narrow.
pub fn parse_number(text: &str) -> Option<i64> {
    let text = text.trim();
    let (is_neg, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    if text.is_empty() {
        return None;
    }

    let val = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else if let Some(bin) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        i64::from_str_radix(bin, 2).ok()?
    } else {
        text.parse::<i64>().ok()?
    };

    Some(if is_neg { -val } else { val })
}

/// Evaluation context over a bare [`Memory`] and a fixed store register.
pub struct MemoryContext<'a> {
    memory: &'a Memory,
    store: i32,
}

impl<'a> MemoryContext<'a> {
    pub fn new(memory: &'a Memory) -> Self {
        Self { memory, store: 0 }
    }

    pub fn with_store(memory: &'a Memory, store: i32) -> Self {
        Self { memory, store }
    }
}

impl EvalContext for MemoryContext<'_> {
    fn int_value(&self, loc: IntMemRef) -> Result<i32, EvalError> {
        self.memory.get_int(loc)
    }

    fn str_value(&self, loc: StrMemRef) -> Result<String, EvalError> {
        self.memory.get_str(loc).map(str::to_string)
    }

    fn store_register(&self) -> i32 {
        self.store
    }
}
