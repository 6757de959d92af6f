// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Execution driver: feeds instructions to the dispatch table one at a time.

use std::borrow::Cow;

use tracing::{debug, error, warn};

use crate::core::config::{FatalErrorPolicy, MachineConfig, UnknownOpcodePolicy};
use crate::core::error::DispatchError;
use crate::core::instruction::{Instruction, Operands};
use crate::core::machine::RLMachine;
use crate::core::operation::OpKey;
use crate::core::registry::DispatchTable;

/// Why a run stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Every instruction was processed.
    Completed,
    /// The step limit was reached.
    StepLimit,
    /// The machine was already halted or halted during the run.
    Halted,
}

/// Summary of one [`ScriptRunner::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Instructions whose operation ran to completion.
    pub executed: usize,
    /// Keys skipped because no operation was registered.
    pub skipped_unknown: Vec<OpKey>,
    /// Fatal errors skipped under [`FatalErrorPolicy::Skip`].
    pub skipped_errors: Vec<DispatchError>,
    pub stop: StopReason,
}

pub struct ScriptRunner<'a> {
    table: &'a DispatchTable,
    config: MachineConfig,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(table: &'a DispatchTable, config: MachineConfig) -> Self {
        Self { table, config }
    }

    /// Run `instructions` in order against `machine`.
    ///
    /// Returns `Err` only when the policy halts the machine; the error is the
    /// one that stopped it.
    pub fn run(
        &self,
        machine: &mut RLMachine,
        instructions: &[Instruction],
    ) -> Result<RunReport, DispatchError> {
        let mut report = RunReport {
            executed: 0,
            skipped_unknown: Vec::new(),
            skipped_errors: Vec::new(),
            stop: StopReason::Completed,
        };

        for (step, instruction) in instructions.iter().enumerate() {
            if machine.is_halted() {
                report.stop = StopReason::Halted;
                break;
            }
            if self
                .config
                .max_steps
                .is_some_and(|limit| step as u64 >= limit)
            {
                debug!(step, "step limit reached");
                report.stop = StopReason::StepLimit;
                break;
            }

            match self.step(machine, instruction) {
                Ok(()) => report.executed += 1,
                Err(DispatchError::UnknownOperation(key)) => match self.config.unknown_opcode {
                    UnknownOpcodePolicy::Skip => {
                        warn!(op = %key, line = instruction.line, "skipping unknown operation");
                        report.skipped_unknown.push(key);
                    }
                    UnknownOpcodePolicy::Halt => {
                        error!(op = %key, line = instruction.line, "unknown operation, halting");
                        machine.halt();
                        return Err(DispatchError::UnknownOperation(key));
                    }
                },
                Err(err) => match self.config.fatal_error {
                    FatalErrorPolicy::Halt => {
                        error!(error = %err, line = instruction.line, "halting");
                        machine.halt();
                        return Err(err);
                    }
                    FatalErrorPolicy::Skip => {
                        warn!(error = %err, line = instruction.line, "skipping failed instruction");
                        report.skipped_errors.push(err);
                    }
                },
            }
        }

        if machine.is_halted() && report.stop == StopReason::Completed {
            report.stop = StopReason::Halted;
        }
        Ok(report)
    }

    fn step(&self, machine: &mut RLMachine, instruction: &Instruction) -> Result<(), DispatchError> {
        let pieces = match &instruction.operands {
            Operands::Pieces(pieces) => Cow::Borrowed(pieces.as_slice()),
            Operands::Tokens(tokens) => {
                Cow::Owned(self.table.parse_parameters(instruction.key, tokens)?)
            }
        };
        self.table.dispatch(instruction.key, &pieces, machine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::expr::ExpressionPiece;
    use crate::core::memory::{IntBank, IntMemRef};
    use crate::core::operation::{void_op, ModuleId};
    use crate::core::param::{IntConstant, IntReference};

    const SET: OpKey = OpKey::new(ModuleId::new(1, 11), 0, 0);
    const MISSING: OpKey = OpKey::new(ModuleId::new(1, 99), 1, 0);

    fn table() -> DispatchTable {
        let mut table = DispatchTable::new();
        table.add_opcode(
            SET,
            "set",
            void_op::<(IntReference, IntConstant), _>(|machine, (dest, value)| {
                machine.set_int(dest, value)?;
                Ok(())
            })
            .unwrap(),
        );
        table
    }

    fn set(index: i32, value: i32) -> Instruction {
        Instruction::with_pieces(
            SET,
            vec![
                ExpressionPiece::int_ref(IntBank::A, index),
                ExpressionPiece::IntConst(value),
            ],
        )
    }

    fn int_a(machine: &RLMachine, index: i32) -> i32 {
        machine.get_int(IntMemRef::new(IntBank::A, index)).unwrap()
    }

    #[test]
    fn unknown_operations_are_skipped_by_default() {
        let table = table();
        let runner = ScriptRunner::new(&table, MachineConfig::default());
        let mut machine = RLMachine::default();
        let program = vec![
            set(0, 1),
            Instruction::with_pieces(MISSING, Vec::new()),
            set(1, 2),
        ];
        let report = runner.run(&mut machine, &program).unwrap();
        assert_eq!(report.executed, 2);
        assert_eq!(report.skipped_unknown, vec![MISSING]);
        assert_eq!(report.stop, StopReason::Completed);
        assert_eq!(int_a(&machine, 1), 2);
    }

    #[test]
    fn fatal_errors_halt_by_default() {
        let table = table();
        let runner = ScriptRunner::new(&table, MachineConfig::default());
        let mut machine = RLMachine::default();
        let program = vec![set(9999, 1), set(1, 2)];
        let err = runner.run(&mut machine, &program).unwrap_err();
        assert!(matches!(err, DispatchError::Handler { .. }));
        assert!(machine.is_halted());
        assert_eq!(int_a(&machine, 1), 0);

        let report = runner.run(&mut machine, &program).unwrap();
        assert_eq!(report.executed, 0);
        assert_eq!(report.stop, StopReason::Halted);
    }

    #[test]
    fn skip_policies_keep_running() {
        let table = table();
        let config = MachineConfig {
            unknown_opcode: UnknownOpcodePolicy::Halt,
            fatal_error: FatalErrorPolicy::Skip,
            max_steps: None,
        };
        let runner = ScriptRunner::new(&table, config);
        let mut machine = RLMachine::default();
        let bad_operands = Instruction::with_tokens(SET, vec!["intA[0]".to_string()]);
        let report = runner
            .run(&mut machine, &[bad_operands, set(3, 4)])
            .unwrap();
        assert_eq!(report.executed, 1);
        assert_eq!(report.skipped_errors.len(), 1);
        assert!(report.skipped_errors[0].decode_error().is_some());

        let err = runner
            .run(&mut machine, &[Instruction::with_pieces(MISSING, Vec::new())])
            .unwrap_err();
        assert_eq!(err, DispatchError::UnknownOperation(MISSING));
        assert!(machine.is_halted());
    }

    #[test]
    fn step_limit_stops_early() {
        let table = table();
        let config = MachineConfig {
            max_steps: Some(1),
            ..MachineConfig::default()
        };
        let runner = ScriptRunner::new(&table, config);
        let mut machine = RLMachine::default();
        let report = runner.run(&mut machine, &[set(0, 5), set(1, 6)]).unwrap();
        assert_eq!(report.executed, 1);
        assert_eq!(report.stop, StopReason::StepLimit);
        assert_eq!(int_a(&machine, 1), 0);
    }
}
