// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Named groups of operations sharing a module id.

use indexmap::IndexMap;

use crate::core::operation::{ModuleId, OpHandler, OpKey, Operation};

/// A module under construction: its identity plus the operations added to it.
pub struct OpModule {
    name: String,
    id: ModuleId,
    operations: IndexMap<OpKey, Operation>,
}

impl OpModule {
    pub fn new(name: impl Into<String>, module_type: u8, module: u8) -> Self {
        Self {
            name: name.into(),
            id: ModuleId::new(module_type, module),
            operations: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> ModuleId {
        self.id
    }

    /// Add an operation; an existing (opcode, overload) is replaced.
    pub fn add_opcode(
        &mut self,
        opcode: u16,
        overload: u8,
        name: impl Into<String>,
        handler: Box<dyn OpHandler>,
    ) {
        let key = OpKey::new(self.id, opcode, overload);
        self.operations
            .insert(key, Operation::new(key, name, handler));
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub(crate) fn into_parts(self) -> (String, ModuleId, IndexMap<OpKey, Operation>) {
        (self.name, self.id, self.operations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::operation::void_op;

    #[test]
    fn opcodes_are_keyed_by_module_id() {
        let mut module = OpModule::new("Test", 1, 40);
        module.add_opcode(3, 1, "first", void_op::<(), _>(|_, ()| Ok(())).unwrap());
        module.add_opcode(3, 1, "second", void_op::<(), _>(|_, ()| Ok(())).unwrap());
        assert_eq!(module.len(), 1);
        let (name, id, operations) = module.into_parts();
        assert_eq!(name, "Test");
        assert_eq!(id, ModuleId::new(1, 40));
        let op = &operations[&OpKey::new(id, 3, 1)];
        assert_eq!(op.name(), "second");
    }
}
