// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Dispatch table mapping operation keys to registered operations.
//!
//! The table has no knowledge of concrete modules. Modules hand over their
//! type-erased operations at registration; afterwards the table is only read.
//! Registering an existing key replaces the operation in place, so the
//! enumeration order stays the order in which keys were first seen.

use indexmap::IndexMap;
use tracing::debug;

use crate::core::error::DispatchError;
use crate::core::expr::ExpressionPiece;
use crate::core::machine::RLMachine;
use crate::core::module::OpModule;
use crate::core::operation::{ModuleId, OpHandler, OpKey, Operation};

/// Registry of every known operation.
#[derive(Debug, Default)]
pub struct DispatchTable {
    operations: IndexMap<OpKey, Operation>,
    module_names: IndexMap<ModuleId, String>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge all operations of `module`, replacing any existing keys.
    pub fn register_module(&mut self, module: OpModule) {
        let (name, id, operations) = module.into_parts();
        debug!(module = %name, id = %id, operations = operations.len(), "registering module");
        self.module_names.insert(id, name);
        for (key, operation) in operations {
            self.operations.insert(key, operation);
        }
    }

    /// Register a single operation; last registration for a key wins.
    pub fn add_opcode(&mut self, key: OpKey, name: impl Into<String>, handler: Box<dyn OpHandler>) {
        self.operations
            .insert(key, Operation::new(key, name, handler));
    }

    pub fn lookup(&self, key: OpKey) -> Option<&Operation> {
        self.operations.get(&key)
    }

    pub fn module_name(&self, id: ModuleId) -> Option<&str> {
        self.module_names.get(&id).map(String::as_str)
    }

    /// Resolve `key` and invoke the operation against `machine`.
    pub fn dispatch(
        &self,
        key: OpKey,
        pieces: &[ExpressionPiece],
        machine: &mut RLMachine,
    ) -> Result<(), DispatchError> {
        let operation = self
            .lookup(key)
            .ok_or(DispatchError::UnknownOperation(key))?;
        debug!(op = %key, name = operation.name(), operands = pieces.len(), "dispatch");
        operation.invoke(machine, pieces)
    }

    /// Decode textual operands for `key` through its signature.
    pub fn parse_parameters(
        &self,
        key: OpKey,
        input: &[String],
    ) -> Result<Vec<ExpressionPiece>, DispatchError> {
        self.lookup(key)
            .ok_or(DispatchError::UnknownOperation(key))?
            .parse_parameters(input)
    }

    /// Registered operations in registration order.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
