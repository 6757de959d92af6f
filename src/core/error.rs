// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Error types shared by the expression, descriptor, and dispatch layers.
//!
//! The split mirrors where a failure is detected:
//! - [`ParseError`]: textual operand or instruction syntax ([`ScriptError`]
//!   adds the script line).
//! - [`EvalError`]: reading the machine while evaluating a piece.
//! - [`DecodeError`]: consuming pieces (or textual tokens) through a descriptor.
//! - [`RegistrationError`]: building an operation signature.
//! - [`HandlerError`]: inside an operation body.
//! - [`DispatchError`]: what the execution driver sees for one instruction.

use thiserror::Error;

use crate::core::operation::OpKey;
use crate::core::tokenizer::Span;

/// Error returned from expression evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("index {index} is outside {bank} (size {size})")]
    IndexOutOfRange {
        bank: &'static str,
        index: i32,
        size: usize,
    },

    #[error("expected an integer expression, found {0}")]
    NotAnInteger(String),

    #[error("expected a string expression, found {0}")]
    NotAString(String),

    #[error("expected a {expected} memory reference, found {found}")]
    NotAReference {
        expected: &'static str,
        found: String,
    },
}

/// Error returned by the textual operand and instruction parsers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (column {})", .span.col_start + 1)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// A [`ParseError`] located on one line of an instruction script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {source}")]
pub struct ScriptError {
    pub line: usize,
    #[source]
    pub source: ParseError,
}

/// Error returned while consuming pieces or tokens through a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("operand position {position} is past the end of {len} operands")]
    PositionOutOfBounds { position: usize, len: usize },

    #[error("overload tag {tag} is out of range for {alternatives} alternatives")]
    OverloadTagOutOfRange { tag: u8, alternatives: usize },

    #[error("operand {position}: expected {expected}, found {found}")]
    TypeMismatch {
        position: usize,
        expected: &'static str,
        found: String,
    },

    #[error("malformed operand `{text}`: {message}")]
    MalformedOperand { text: String, message: String },

    #[error("extracted {found}, expected {expected}")]
    ValueShape {
        expected: &'static str,
        found: &'static str,
    },

    #[error("extracted {found} values, expected {expected}")]
    ValueCount { expected: usize, found: usize },

    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Error returned when an operation signature is rejected at registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("argc parameter at position {position} is followed by {trailing} more parameter(s)")]
    ArgcNotLast { position: usize, trailing: usize },

    #[error("argc parameter cannot directly repeat another argc parameter")]
    NestedArgc,

    #[error("special parameter declares {count} alternatives (expected 1 to 5)")]
    SpecialArity { count: usize },

    #[error("special parameter has an empty slot before alternative {index}")]
    EmptySpecialAlternative { index: usize },
}

/// Error raised by an operation body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// Extracted values did not convert into the handler's parameter types.
    #[error(transparent)]
    Arguments(#[from] DecodeError),

    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Outcome of dispatching one instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("unknown operation {0}")]
    UnknownOperation(OpKey),

    #[error("{name} {key}: {source}")]
    Decode {
        key: OpKey,
        name: String,
        #[source]
        source: DecodeError,
    },

    #[error("{name} {key}: {source}")]
    Handler {
        key: OpKey,
        name: String,
        #[source]
        source: HandlerError,
    },
}

impl DispatchError {
    /// Unknown operations are recoverable; everything else stops the instruction
    /// on corrupted input or a failing handler.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::UnknownOperation(_))
    }

    pub fn key(&self) -> OpKey {
        match self {
            Self::UnknownOperation(key) => *key,
            Self::Decode { key, .. } | Self::Handler { key, .. } => *key,
        }
    }

    pub fn decode_error(&self) -> Option<&DecodeError> {
        match self {
            Self::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::operation::ModuleId;

    #[test]
    fn unknown_operation_is_not_fatal() {
        let key = OpKey::new(ModuleId::new(1, 99), 99, 0);
        let err = DispatchError::UnknownOperation(key);
        assert!(!err.is_fatal());
        assert_eq!(err.key(), key);
        assert!(err.to_string().contains("unknown operation"));
    }

    #[test]
    fn decode_error_is_fatal_and_reports_source() {
        let key = OpKey::new(ModuleId::new(0, 2), 1, 0);
        let err = DispatchError::Decode {
            key,
            name: "select".to_string(),
            source: DecodeError::OverloadTagOutOfRange {
                tag: 5,
                alternatives: 3,
            },
        };
        assert!(err.is_fatal());
        assert!(matches!(
            err.decode_error(),
            Some(DecodeError::OverloadTagOutOfRange { tag: 5, .. })
        ));
        let text = err.to_string();
        assert!(text.contains("select"));
        assert!(text.contains("overload tag 5"));
    }
}
