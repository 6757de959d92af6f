// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Operation records: one key bound to one typed handler.
//!
//! Handlers are type-erased behind [`OpHandler`] so the dispatch table can
//! hold operations with arbitrary parameter lists. The [`void_op`] and
//! [`store_op`] constructors build handlers from closures over native
//! parameter types declared with [`ParamList`].

use std::fmt;
use std::marker::PhantomData;

use crate::core::descriptor::{Signature, Value};
use crate::core::error::{DecodeError, DispatchError, HandlerError, RegistrationError};
use crate::core::expr::ExpressionPiece;
use crate::core::machine::RLMachine;
use crate::core::param::ParamList;

/// RealLive module identity: (module type, module number).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId {
    pub module_type: u8,
    pub module: u8,
}

impl ModuleId {
    pub const fn new(module_type: u8, module: u8) -> Self {
        Self {
            module_type,
            module,
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:03}", self.module_type, self.module)
    }
}

/// Dispatch key of one operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpKey {
    pub module: ModuleId,
    pub opcode: u16,
    pub overload: u8,
}

impl OpKey {
    pub const fn new(module: ModuleId, opcode: u16, overload: u8) -> Self {
        Self {
            module,
            opcode,
            overload,
        }
    }
}

impl fmt::Display for OpKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "op<{}:{:05}, {}>",
            self.module, self.opcode, self.overload
        )
    }
}

/// Type-erased operation body.
pub trait OpHandler: Send + Sync {
    fn signature(&self) -> &Signature;

    /// Run the body with values already extracted through [`Self::signature`].
    fn call(&self, machine: &mut RLMachine, args: Vec<Value>) -> Result<(), HandlerError>;
}

struct VoidOp<L, F> {
    signature: Signature,
    body: F,
    params: PhantomData<fn() -> L>,
}

impl<L, F> OpHandler for VoidOp<L, F>
where
    L: ParamList,
    F: Fn(&mut RLMachine, L::Output) -> Result<(), HandlerError> + Send + Sync,
{
    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn call(&self, machine: &mut RLMachine, args: Vec<Value>) -> Result<(), HandlerError> {
        let params = L::from_values(args)?;
        (self.body)(machine, params)
    }
}

struct StoreOp<L, F> {
    signature: Signature,
    body: F,
    params: PhantomData<fn() -> L>,
}

impl<L, F> OpHandler for StoreOp<L, F>
where
    L: ParamList,
    F: Fn(&mut RLMachine, L::Output) -> Result<i32, HandlerError> + Send + Sync,
{
    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn call(&self, machine: &mut RLMachine, args: Vec<Value>) -> Result<(), HandlerError> {
        let params = L::from_values(args)?;
        let value = (self.body)(machine, params)?;
        machine.set_store_register(value);
        Ok(())
    }
}

/// Handler whose body returns nothing.
pub fn void_op<L, F>(body: F) -> Result<Box<dyn OpHandler>, RegistrationError>
where
    L: ParamList + 'static,
    F: Fn(&mut RLMachine, L::Output) -> Result<(), HandlerError> + Send + Sync + 'static,
{
    Ok(Box::new(VoidOp {
        signature: L::signature()?,
        body,
        params: PhantomData::<fn() -> L>,
    }))
}

/// Handler whose body's result is written to the store register.
pub fn store_op<L, F>(body: F) -> Result<Box<dyn OpHandler>, RegistrationError>
where
    L: ParamList + 'static,
    F: Fn(&mut RLMachine, L::Output) -> Result<i32, HandlerError> + Send + Sync + 'static,
{
    Ok(Box::new(StoreOp {
        signature: L::signature()?,
        body,
        params: PhantomData::<fn() -> L>,
    }))
}

/// A registered operation.
pub struct Operation {
    key: OpKey,
    name: String,
    handler: Box<dyn OpHandler>,
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("signature", self.handler.signature())
            .finish()
    }
}

impl Operation {
    pub fn new(key: OpKey, name: impl Into<String>, handler: Box<dyn OpHandler>) -> Self {
        Self {
            key,
            name: name.into(),
            handler,
        }
    }

    pub fn key(&self) -> OpKey {
        self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        self.handler.signature()
    }

    /// Extract every declared argument, then run the body.
    ///
    /// A decode failure returns before the body sees the machine.
    pub fn invoke(
        &self,
        machine: &mut RLMachine,
        pieces: &[ExpressionPiece],
    ) -> Result<(), DispatchError> {
        let args = self
            .handler
            .signature()
            .extract(&*machine, pieces)
            .map_err(|source| self.decode_error(source))?;
        match self.handler.call(machine, args) {
            Ok(()) => Ok(()),
            Err(HandlerError::Arguments(source)) => Err(self.decode_error(source)),
            Err(source) => Err(DispatchError::Handler {
                key: self.key,
                name: self.name.clone(),
                source,
            }),
        }
    }

    /// Decode textual operands through this operation's signature.
    pub fn parse_parameters(&self, input: &[String]) -> Result<Vec<ExpressionPiece>, DispatchError> {
        self.handler
            .signature()
            .decode_tokens(input)
            .map_err(|source| self.decode_error(source))
    }

    fn decode_error(&self, source: DecodeError) -> DispatchError {
        DispatchError::Decode {
            key: self.key,
            name: self.name.clone(),
            source,
        }
    }
}
