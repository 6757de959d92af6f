// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Module `Sel` (0:2): player selections.
//!
//! Every option is a special operand:
//! - tag 0: `@0{"text"}`, always shown;
//! - tag 1: `@1{condition, "text"}`, shown only when `condition` is non-zero.
//!
//! The stored result indexes the full declared option list, hidden options
//! included. With nothing to show the store register is set to -1.

use tracing::debug;

use crate::core::error::{HandlerError, RegistrationError};
use crate::core::machine::RLMachine;
use crate::core::module::OpModule;
use crate::core::operation::store_op;
use crate::core::param::{Argc, Complex, IntConstant, Overload, Special, StrConstant};

type SelectOption = Special<StrConstant, Complex<(IntConstant, StrConstant)>>;
type SelectParams = (Argc<SelectOption>,);

type OptionValue = Overload<String, (i32, String)>;

fn select(machine: &mut RLMachine, options: Vec<OptionValue>) -> Result<i32, HandlerError> {
    let (declared, texts): (Vec<usize>, Vec<String>) = options
        .into_iter()
        .enumerate()
        .filter_map(|(index, option)| match option {
            Overload::First(text) => Some((index, text)),
            Overload::Second((condition, text)) if condition != 0 => Some((index, text)),
            _ => None,
        })
        .unzip();
    if texts.is_empty() {
        debug!("selection has no visible options");
        return Ok(-1);
    }

    let choice = machine.system_mut().select(&texts);
    let index = declared.get(choice).copied().ok_or_else(|| {
        HandlerError::failed(format!(
            "selection {choice} is outside {} visible options",
            texts.len()
        ))
    })?;
    debug!(choice, index, "selection made");
    i32::try_from(index).map_err(|_| HandlerError::failed(format!("option index {index} overflows")))
}

pub fn module() -> Result<OpModule, RegistrationError> {
    let mut module = OpModule::new("Sel", 0, 2);
    module.add_opcode(
        0,
        0,
        "select_w",
        store_op::<SelectParams, _>(|machine, (options,)| select(machine, options))?,
    );
    module.add_opcode(
        1,
        0,
        "select",
        store_op::<SelectParams, _>(|machine, (options,)| select(machine, options))?,
    );
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::machine::{ScriptedSystem, System};
    use crate::core::operation::{ModuleId, OpKey};
    use crate::core::registry::DispatchTable;
    use std::sync::{Arc, Mutex};

    const SELECT: OpKey = OpKey::new(ModuleId::new(0, 2), 1, 0);

    /// Shares the scripted system so tests can inspect what was shown.
    struct Shared(Arc<Mutex<ScriptedSystem>>);

    impl System for Shared {
        fn select(&mut self, options: &[String]) -> usize {
            self.0.lock().unwrap().select(options)
        }
    }

    fn run(choices: &[usize], args: &[&str]) -> (Result<(), crate::core::error::DispatchError>, RLMachine, Vec<Vec<String>>) {
        let system = Arc::new(Mutex::new(ScriptedSystem::new(choices.iter().copied())));
        let mut machine = RLMachine::new(Box::new(Shared(Arc::clone(&system))));
        let mut table = DispatchTable::new();
        table.register_module(module().unwrap());
        let tokens: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        let pieces = table.parse_parameters(SELECT, &tokens).unwrap();
        let result = table.dispatch(SELECT, &pieces, &mut machine);
        let shown = system.lock().unwrap().shown().to_vec();
        (result, machine, shown)
    }

    #[test]
    fn stored_index_counts_hidden_options() {
        let (result, machine, shown) = run(
            &[1],
            &[r#"@0{"Stay"}"#, r#"@1{0, "Secret"}"#, r#"@1{1, "Leave"}"#],
        );
        result.unwrap();
        assert_eq!(shown, vec![vec!["Stay".to_string(), "Leave".to_string()]]);
        assert_eq!(machine.store_register(), 2);
    }

    #[test]
    fn conditions_read_memory() {
        let (result, machine, shown) = run(&[0], &[r#"@1{intA[0] == 0, "Only"}"#]);
        result.unwrap();
        assert_eq!(shown[0], vec!["Only".to_string()]);
        assert_eq!(machine.store_register(), 0);
    }

    #[test]
    fn no_visible_options_stores_minus_one() {
        let (result, machine, shown) = run(&[], &[r#"@1{0, "Hidden"}"#]);
        result.unwrap();
        assert!(shown.is_empty());
        assert_eq!(machine.store_register(), -1);
    }

    #[test]
    fn bad_tag_aborts_before_selection() {
        let (result, machine, shown) = run(&[0], &[r#"@0{"A"}"#, r#"@3{"B"}"#]);
        let err = result.unwrap_err();
        assert!(err.is_fatal());
        assert!(err.decode_error().is_some());
        assert!(shown.is_empty());
        assert_eq!(machine.store_register(), 0);
    }

    #[test]
    fn out_of_range_choice_is_a_handler_error() {
        let (result, _, _) = run(&[5], &[r#"@0{"A"}"#]);
        assert!(matches!(
            result,
            Err(crate::core::error::DispatchError::Handler { .. })
        ));
    }
}
