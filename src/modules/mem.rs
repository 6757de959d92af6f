// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Module `Mem` (1:11): bulk operations on integer memory.

use crate::core::error::{HandlerError, RegistrationError};
use crate::core::machine::RLMachine;
use crate::core::memory::IntMemRef;
use crate::core::module::OpModule;
use crate::core::operation::{store_op, void_op};
use crate::core::param::{Argc, Complex, IntConstant, IntReference};

/// Inclusive range `first..=last` within one bank.
fn int_range(
    first: IntMemRef,
    last: IntMemRef,
) -> Result<impl Iterator<Item = IntMemRef>, HandlerError> {
    if first.bank != last.bank {
        return Err(HandlerError::failed(format!(
            "range {first}..{last} spans two banks"
        )));
    }
    Ok((first.index..=last.index).map(move |index| IntMemRef::new(first.bank, index)))
}

/// Fail unless every cell of `origin + i * step` for `i in 0..count` exists.
///
/// The cells form an arithmetic progression, so checking both ends covers
/// the whole span.
fn check_span(
    machine: &RLMachine,
    origin: IntMemRef,
    step: i32,
    count: i64,
) -> Result<(), HandlerError> {
    if count <= 0 {
        return Ok(());
    }
    let last = i64::from(origin.index) + (count - 1) * i64::from(step);
    let last = i32::try_from(last).map_err(|_| {
        HandlerError::failed(format!("{count} cells from {origin} leave the bank"))
    })?;
    machine.get_int(origin)?;
    machine.get_int(IntMemRef::new(origin.bank, last))?;
    Ok(())
}

fn fill(machine: &mut RLMachine, first: IntMemRef, last: IntMemRef, value: i32) -> Result<(), HandlerError> {
    let cells = int_range(first, last)?;
    check_span(machine, first, 1, i64::from(last.index) - i64::from(first.index) + 1)?;
    for loc in cells {
        machine.set_int(loc, value)?;
    }
    Ok(())
}

fn write_stepped(
    machine: &mut RLMachine,
    origin: IntMemRef,
    step: i32,
    values: &[i32],
) -> Result<(), HandlerError> {
    check_span(machine, origin, step, values.len() as i64)?;
    for (i, value) in (0i32..).zip(values) {
        machine.set_int(origin.offset(i.wrapping_mul(step)), *value)?;
    }
    Ok(())
}

fn fill_stepped(
    machine: &mut RLMachine,
    origin: IntMemRef,
    step: i32,
    count: i32,
    value: i32,
) -> Result<(), HandlerError> {
    // With a zero step every write lands on `origin`.
    let count = if step == 0 { count.min(1) } else { count };
    check_span(machine, origin, step, i64::from(count))?;
    for i in 0..count {
        machine.set_int(origin.offset(i.wrapping_mul(step)), value)?;
    }
    Ok(())
}

fn sum_range(machine: &RLMachine, first: IntMemRef, last: IntMemRef) -> Result<i32, HandlerError> {
    let mut total = 0i32;
    for loc in int_range(first, last)? {
        total = total.wrapping_add(machine.get_int(loc)?);
    }
    Ok(total)
}

pub fn module() -> Result<OpModule, RegistrationError> {
    let mut module = OpModule::new("Mem", 1, 11);

    module.add_opcode(
        0,
        0,
        "setarray",
        void_op::<(IntReference, Argc<IntConstant>), _>(|machine, (origin, values)| {
            write_stepped(machine, origin, 1, &values)
        })?,
    );
    module.add_opcode(
        1,
        0,
        "setrng",
        void_op::<(IntReference, IntReference), _>(|machine, (first, last)| {
            fill(machine, first, last, 0)
        })?,
    );
    module.add_opcode(
        1,
        1,
        "setrng",
        void_op::<(IntReference, IntReference, IntConstant), _>(|machine, (first, last, value)| {
            fill(machine, first, last, value)
        })?,
    );
    module.add_opcode(
        2,
        0,
        "cpyrng",
        void_op::<(IntReference, IntReference, IntConstant), _>(|machine, (source, dest, count)| {
            check_span(machine, source, 1, i64::from(count))?;
            let values = (0..count)
                .map(|i| machine.get_int(source.offset(i)))
                .collect::<Result<Vec<_>, _>>()?;
            write_stepped(machine, dest, 1, &values)
        })?,
    );
    module.add_opcode(
        3,
        0,
        "setarray_stepped",
        void_op::<(IntReference, IntConstant, Argc<IntConstant>), _>(
            |machine, (origin, step, values)| write_stepped(machine, origin, step, &values),
        )?,
    );
    module.add_opcode(
        4,
        0,
        "setrng_stepped",
        void_op::<(IntReference, IntConstant, IntConstant), _>(|machine, (origin, step, count)| {
            fill_stepped(machine, origin, step, count, 0)
        })?,
    );
    module.add_opcode(
        4,
        1,
        "setrng_stepped",
        void_op::<(IntReference, IntConstant, IntConstant, IntConstant), _>(
            |machine, (origin, step, count, value)| fill_stepped(machine, origin, step, count, value),
        )?,
    );
    module.add_opcode(
        100,
        0,
        "sum",
        store_op::<(IntReference, IntReference), _>(|machine, (first, last)| {
            sum_range(machine, first, last)
        })?,
    );
    module.add_opcode(
        101,
        0,
        "sums",
        store_op::<(Argc<Complex<(IntReference, IntReference)>>,), _>(|machine, (ranges,)| {
            let mut total = 0i32;
            for (first, last) in ranges {
                total = total.wrapping_add(sum_range(machine, first, last)?);
            }
            Ok(total)
        })?,
    );

    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::DispatchError;
    use crate::core::memory::{IntBank, INT_BANK_SIZE};
    use crate::core::registry::DispatchTable;
    use crate::core::operation::{ModuleId, OpKey};

    const MEM: ModuleId = ModuleId::new(1, 11);

    fn run(table: &DispatchTable, machine: &mut RLMachine, opcode: u16, overload: u8, args: &[&str]) {
        let key = OpKey::new(MEM, opcode, overload);
        let tokens: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        let pieces = table.parse_parameters(key, &tokens).unwrap();
        table.dispatch(key, &pieces, machine).unwrap();
    }

    fn setup() -> (DispatchTable, RLMachine) {
        let mut table = DispatchTable::new();
        table.register_module(module().unwrap());
        (table, RLMachine::default())
    }

    fn bank(machine: &RLMachine, bank: IntBank, range: std::ops::Range<usize>) -> Vec<i32> {
        machine.memory().int_bank(bank)[range].to_vec()
    }

    #[test]
    fn setarray_writes_consecutive_cells() {
        let (table, mut machine) = setup();
        run(&table, &mut machine, 0, 0, &["intA[2]", "7", "8", "9"]);
        assert_eq!(bank(&machine, IntBank::A, 0..6), vec![0, 0, 7, 8, 9, 0]);
    }

    #[test]
    fn setrng_fills_inclusive_range() {
        let (table, mut machine) = setup();
        run(&table, &mut machine, 1, 1, &["intB[1]", "intB[3]", "5"]);
        assert_eq!(bank(&machine, IntBank::B, 0..5), vec![0, 5, 5, 5, 0]);
        run(&table, &mut machine, 1, 0, &["intB[2]", "intB[3]"]);
        assert_eq!(bank(&machine, IntBank::B, 0..5), vec![0, 5, 0, 0, 0]);
    }

    #[test]
    fn setrng_across_banks_fails() {
        let (table, mut machine) = setup();
        let key = OpKey::new(MEM, 1, 0);
        let pieces = table
            .parse_parameters(key, &["intA[0]".to_string(), "intB[3]".to_string()])
            .unwrap();
        assert!(table.dispatch(key, &pieces, &mut machine).is_err());
    }

    fn failing(table: &DispatchTable, machine: &mut RLMachine, opcode: u16, overload: u8, args: &[&str]) {
        let key = OpKey::new(MEM, opcode, overload);
        let tokens: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        let pieces = table.parse_parameters(key, &tokens).unwrap();
        let err = table.dispatch(key, &pieces, machine).unwrap_err();
        assert!(matches!(err, DispatchError::Handler { .. }), "{err}");
    }

    #[test]
    fn out_of_bank_ranges_write_nothing() {
        let (table, mut machine) = setup();
        failing(&table, &mut machine, 1, 1, &["intA[1998]", "intA[2001]", "5"]);
        failing(&table, &mut machine, 0, 0, &["intA[1998]", "1", "2", "3"]);
        failing(&table, &mut machine, 3, 0, &["intA[1990]", "4", "1", "2", "3", "4"]);
        failing(&table, &mut machine, 4, 1, &["intA[1996]", "2", "3", "7"]);
        failing(&table, &mut machine, 4, 1, &["intA[1]", "1000", "2000000000", "7"]);
        assert!(bank(&machine, IntBank::A, 0..INT_BANK_SIZE).iter().all(|v| *v == 0));

        run(&table, &mut machine, 0, 0, &["intB[0]", "1", "2", "3"]);
        failing(&table, &mut machine, 2, 0, &["intB[0]", "intC[1998]", "3"]);
        assert!(bank(&machine, IntBank::C, 0..INT_BANK_SIZE).iter().all(|v| *v == 0));
    }

    #[test]
    fn zero_step_fill_touches_one_cell() {
        let (table, mut machine) = setup();
        run(&table, &mut machine, 4, 1, &["intG[4]", "0", "2000000000", "3"]);
        assert_eq!(bank(&machine, IntBank::G, 3..6), vec![0, 3, 0]);
    }

    #[test]
    fn cpyrng_copies_count_cells() {
        let (table, mut machine) = setup();
        run(&table, &mut machine, 0, 0, &["intC[0]", "1", "2", "3"]);
        run(&table, &mut machine, 2, 0, &["intC[0]", "intD[10]", "3"]);
        assert_eq!(bank(&machine, IntBank::D, 10..13), vec![1, 2, 3]);
    }

    #[test]
    fn stepped_operations_skip_cells() {
        let (table, mut machine) = setup();
        run(&table, &mut machine, 3, 0, &["intE[0]", "2", "1", "2", "3"]);
        assert_eq!(bank(&machine, IntBank::E, 0..6), vec![1, 0, 2, 0, 3, 0]);
        run(&table, &mut machine, 4, 1, &["intE[1]", "2", "3", "9"]);
        assert_eq!(bank(&machine, IntBank::E, 0..6), vec![1, 9, 2, 9, 3, 9]);
        run(&table, &mut machine, 4, 0, &["intE[0]", "4", "2"]);
        assert_eq!(bank(&machine, IntBank::E, 0..6), vec![0, 9, 2, 9, 0, 9]);
    }

    #[test]
    fn sum_and_sums_store_totals() {
        let (table, mut machine) = setup();
        run(&table, &mut machine, 0, 0, &["intF[0]", "1", "2", "3", "4"]);
        run(&table, &mut machine, 100, 0, &["intF[1]", "intF[3]"]);
        assert_eq!(machine.store_register(), 9);
        run(
            &table,
            &mut machine,
            101,
            0,
            &["{intF[0], intF[1]}", "{intF[3], intF[3]}"],
        );
        assert_eq!(machine.store_register(), 7);
    }
}
