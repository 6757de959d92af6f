// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Default dispatch table construction shared by the CLI and tests.

use crate::core::error::RegistrationError;
use crate::core::registry::DispatchTable;
use crate::modules::{mem, obj_management, sel, strings};

/// Build the dispatch table holding every bundled module.
///
/// Registration order is centralized here so every caller enumerates
/// operations identically.
pub fn build_default_registry() -> Result<DispatchTable, RegistrationError> {
    let mut table = DispatchTable::new();
    table.register_module(sel::module()?);
    table.register_module(strings::module()?);
    table.register_module(mem::module()?);
    table.register_module(obj_management::copy_fg_to_bg_module()?);
    table.register_module(obj_management::fg_management_module()?);
    table.register_module(obj_management::bg_management_module()?);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::operation::{ModuleId, OpKey};

    #[test]
    fn default_registry_contains_every_module() {
        let table = build_default_registry().unwrap();
        for (id, name) in [
            (ModuleId::new(0, 2), "Sel"),
            (ModuleId::new(1, 10), "Str"),
            (ModuleId::new(1, 11), "Mem"),
            (ModuleId::new(1, 60), "ObjCopyFgToBg"),
            (ModuleId::new(1, 61), "ObjFgManagement"),
            (ModuleId::new(1, 62), "ObjBgManagement"),
        ] {
            assert_eq!(table.module_name(id), Some(name));
        }
        let sums = table
            .lookup(OpKey::new(ModuleId::new(1, 11), 101, 0))
            .expect("sums registered");
        assert_eq!(sums.signature().to_string(), "(argc<{intref, intref}>)");
        let select = table
            .lookup(OpKey::new(ModuleId::new(0, 2), 1, 0))
            .expect("select registered");
        assert_eq!(
            select.signature().to_string(),
            "(argc<special<str | {int, str}>>)"
        );
    }

    #[test]
    fn enumeration_starts_with_selection_module() {
        let table = build_default_registry().unwrap();
        let first = table.operations().next().expect("non-empty table");
        assert_eq!(first.name(), "select_w");
        assert!(table.len() > 40);
    }
}
