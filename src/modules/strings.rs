// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Module `Str` (1:10): string memory manipulation.
//!
//! Offsets and lengths count characters, except `strlen`, which reports the
//! RealLive width where every non-ASCII character counts as two.

use std::cmp::Ordering;

use crate::core::error::{HandlerError, RegistrationError};
use crate::core::machine::RLMachine;
use crate::core::memory::StrMemRef;
use crate::core::module::OpModule;
use crate::core::operation::{store_op, void_op};
use crate::core::param::{IntConstant, StrConstant, StrReference};

fn take_chars(text: &str, count: i32) -> String {
    text.chars().take(usize::try_from(count).unwrap_or(0)).collect()
}

fn substring(text: &str, offset: i32, length: Option<i32>) -> String {
    let skipped = text.chars().skip(usize::try_from(offset).unwrap_or(0));
    match length {
        Some(length) => skipped.take(usize::try_from(length).unwrap_or(0)).collect(),
        None => skipped.collect(),
    }
}

/// Width in RealLive units: ASCII counts one, everything else two.
pub fn display_width(text: &str) -> i32 {
    text.chars()
        .map(|c| if c.is_ascii() { 1 } else { 2 })
        .fold(0i32, i32::wrapping_add)
}

/// Leading decimal integer of `text`, or 0 when there is none.
pub fn leading_integer(text: &str) -> i32 {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let value = digits
        .chars()
        .map_while(|c| c.to_digit(10))
        .fold(0i32, |acc, digit| acc.wrapping_mul(10).wrapping_add(digit as i32));
    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}

/// Widest field `itoa` pads to.
const MAX_PAD_WIDTH: usize = 255;

fn zero_padded(value: i32, width: i32) -> String {
    let width = usize::try_from(width).unwrap_or(0).min(MAX_PAD_WIDTH);
    if value < 0 {
        format!("-{:0>pad$}", value.unsigned_abs(), pad = width.saturating_sub(1))
    } else {
        format!("{value:0>width$}")
    }
}

/// Inclusive range within one bank; both ends must exist when it is non-empty.
fn str_range(
    machine: &RLMachine,
    first: StrMemRef,
    last: StrMemRef,
) -> Result<impl Iterator<Item = StrMemRef>, HandlerError> {
    if first.bank != last.bank {
        return Err(HandlerError::failed(format!(
            "range {first}..{last} spans two banks"
        )));
    }
    if first.index <= last.index {
        machine.get_str(first)?;
        machine.get_str(last)?;
    }
    Ok((first.index..=last.index).map(move |index| StrMemRef::new(first.bank, index)))
}

fn set(machine: &mut RLMachine, dest: StrMemRef, value: String) -> Result<(), HandlerError> {
    machine.set_str(dest, value)?;
    Ok(())
}

pub fn module() -> Result<OpModule, RegistrationError> {
    let mut module = OpModule::new("Str", 1, 10);

    module.add_opcode(
        0,
        0,
        "strcpy",
        void_op::<(StrReference, StrConstant), _>(|machine, (dest, value)| set(machine, dest, value))?,
    );
    module.add_opcode(
        0,
        1,
        "strcpy",
        void_op::<(StrReference, StrConstant, IntConstant), _>(|machine, (dest, value, count)| {
            set(machine, dest, take_chars(&value, count))
        })?,
    );
    module.add_opcode(
        1,
        0,
        "strclear",
        void_op::<(StrReference,), _>(|machine, (dest,)| set(machine, dest, String::new()))?,
    );
    module.add_opcode(
        1,
        1,
        "strclear",
        void_op::<(StrReference, StrReference), _>(|machine, (first, last)| {
            for loc in str_range(machine, first, last)? {
                set(machine, loc, String::new())?;
            }
            Ok(())
        })?,
    );
    module.add_opcode(
        2,
        0,
        "strcat",
        void_op::<(StrReference, StrConstant), _>(|machine, (dest, suffix)| {
            let joined = format!("{}{suffix}", machine.get_str(dest)?);
            set(machine, dest, joined)
        })?,
    );
    module.add_opcode(
        3,
        0,
        "strlen",
        store_op::<(StrConstant,), _>(|_, (text,)| Ok(display_width(&text)))?,
    );
    module.add_opcode(
        4,
        0,
        "strcmp",
        store_op::<(StrConstant, StrConstant), _>(|_, (a, b)| {
            Ok(match a.cmp(&b) {
                Ordering::Less => -1,
                Ordering::Equal => 0,
                Ordering::Greater => 1,
            })
        })?,
    );
    module.add_opcode(
        5,
        0,
        "strsub",
        void_op::<(StrReference, StrConstant, IntConstant), _>(|machine, (dest, source, offset)| {
            set(machine, dest, substring(&source, offset, None))
        })?,
    );
    module.add_opcode(
        5,
        1,
        "strsub",
        void_op::<(StrReference, StrConstant, IntConstant, IntConstant), _>(
            |machine, (dest, source, offset, length)| {
                set(machine, dest, substring(&source, offset, Some(length)))
            },
        )?,
    );
    module.add_opcode(
        8,
        0,
        "strtrunc",
        void_op::<(StrReference, IntConstant), _>(|machine, (dest, length)| {
            let truncated = take_chars(machine.get_str(dest)?, length);
            set(machine, dest, truncated)
        })?,
    );
    module.add_opcode(
        12,
        0,
        "itoa",
        void_op::<(IntConstant, StrReference), _>(|machine, (value, dest)| {
            set(machine, dest, value.to_string())
        })?,
    );
    module.add_opcode(
        12,
        1,
        "itoa",
        void_op::<(IntConstant, StrReference, IntConstant), _>(|machine, (value, dest, width)| {
            set(machine, dest, zero_padded(value, width))
        })?,
    );
    module.add_opcode(
        15,
        0,
        "atoi",
        store_op::<(StrConstant,), _>(|_, (text,)| Ok(leading_integer(&text)))?,
    );

    Ok(module)
}
