// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! RealLive integer and string memory banks.
//!
//! Integer banks `intA`..`intG`, `intZ` and `intL` and string banks `strK`,
//! `strM` and `strS`. References carry a signed index so that an operand
//! such as `intA[-1]` survives decoding and is rejected when the cell is
//! actually touched.

use std::fmt;

use crate::core::error::EvalError;

pub const INT_BANK_SIZE: usize = 2000;
pub const STR_BANK_SIZE: usize = 2000;
pub const STRK_SIZE: usize = 3;

/// Identifier for an integer memory bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntBank {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    Z,
    L,
}

impl IntBank {
    pub const ALL: [IntBank; 9] = [
        IntBank::A,
        IntBank::B,
        IntBank::C,
        IntBank::D,
        IntBank::E,
        IntBank::F,
        IntBank::G,
        IntBank::Z,
        IntBank::L,
    ];

    pub fn name(self) -> &'static str {
        match self {
            IntBank::A => "intA",
            IntBank::B => "intB",
            IntBank::C => "intC",
            IntBank::D => "intD",
            IntBank::E => "intE",
            IntBank::F => "intF",
            IntBank::G => "intG",
            IntBank::Z => "intZ",
            IntBank::L => "intL",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bank| bank.name() == name)
    }

    fn slot(self) -> usize {
        match self {
            IntBank::A => 0,
            IntBank::B => 1,
            IntBank::C => 2,
            IntBank::D => 3,
            IntBank::E => 4,
            IntBank::F => 5,
            IntBank::G => 6,
            IntBank::Z => 7,
            IntBank::L => 8,
        }
    }
}

/// Identifier for a string memory bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StrBank {
    K,
    M,
    S,
}

impl StrBank {
    pub const ALL: [StrBank; 3] = [StrBank::K, StrBank::M, StrBank::S];

    pub fn name(self) -> &'static str {
        match self {
            StrBank::K => "strK",
            StrBank::M => "strM",
            StrBank::S => "strS",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bank| bank.name() == name)
    }

    pub fn size(self) -> usize {
        match self {
            StrBank::K => STRK_SIZE,
            StrBank::M | StrBank::S => STR_BANK_SIZE,
        }
    }

    fn slot(self) -> usize {
        match self {
            StrBank::K => 0,
            StrBank::M => 1,
            StrBank::S => 2,
        }
    }
}

/// A resolved integer cell location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IntMemRef {
    pub bank: IntBank,
    pub index: i32,
}

impl IntMemRef {
    pub const fn new(bank: IntBank, index: i32) -> Self {
        Self { bank, index }
    }

    /// The location `delta` cells further along the same bank.
    pub fn offset(self, delta: i32) -> Self {
        Self {
            bank: self.bank,
            index: self.index.wrapping_add(delta),
        }
    }
}

impl fmt::Display for IntMemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.bank.name(), self.index)
    }
}

/// A resolved string cell location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StrMemRef {
    pub bank: StrBank,
    pub index: i32,
}

impl StrMemRef {
    pub const fn new(bank: StrBank, index: i32) -> Self {
        Self { bank, index }
    }

    pub fn offset(self, delta: i32) -> Self {
        Self {
            bank: self.bank,
            index: self.index.wrapping_add(delta),
        }
    }
}

impl fmt::Display for StrMemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.bank.name(), self.index)
    }
}

fn cell_index(bank: &'static str, index: i32, size: usize) -> Result<usize, EvalError> {
    usize::try_from(index)
        .ok()
        .filter(|idx| *idx < size)
        .ok_or(EvalError::IndexOutOfRange { bank, index, size })
}

/// Backing store for all memory banks.
#[derive(Debug, Clone)]
pub struct Memory {
    ints: Vec<Vec<i32>>,
    strs: Vec<Vec<String>>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    pub fn new() -> Self {
        Self {
            ints: IntBank::ALL
                .iter()
                .map(|_| vec![0; INT_BANK_SIZE])
                .collect(),
            strs: StrBank::ALL
                .iter()
                .map(|bank| vec![String::new(); bank.size()])
                .collect(),
        }
    }

    pub fn get_int(&self, loc: IntMemRef) -> Result<i32, EvalError> {
        let idx = cell_index(loc.bank.name(), loc.index, INT_BANK_SIZE)?;
        Ok(self.ints[loc.bank.slot()][idx])
    }

    pub fn set_int(&mut self, loc: IntMemRef, value: i32) -> Result<(), EvalError> {
        let idx = cell_index(loc.bank.name(), loc.index, INT_BANK_SIZE)?;
        self.ints[loc.bank.slot()][idx] = value;
        Ok(())
    }

    pub fn get_str(&self, loc: StrMemRef) -> Result<&str, EvalError> {
        let idx = cell_index(loc.bank.name(), loc.index, loc.bank.size())?;
        Ok(&self.strs[loc.bank.slot()][idx])
    }

    pub fn set_str(&mut self, loc: StrMemRef, value: impl Into<String>) -> Result<(), EvalError> {
        let idx = cell_index(loc.bank.name(), loc.index, loc.bank.size())?;
        self.strs[loc.bank.slot()][idx] = value.into();
        Ok(())
    }

    /// Whole-bank view, used for dumps.
    pub fn int_bank(&self, bank: IntBank) -> &[i32] {
        &self.ints[bank.slot()]
    }

    pub fn str_bank(&self, bank: StrBank) -> &[String] {
        &self.strs[bank.slot()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_names_round_trip() {
        for bank in IntBank::ALL {
            assert_eq!(IntBank::from_name(bank.name()), Some(bank));
        }
        for bank in StrBank::ALL {
            assert_eq!(StrBank::from_name(bank.name()), Some(bank));
        }
        assert_eq!(IntBank::from_name("intQ"), None);
    }

    #[test]
    fn int_cells_read_back() {
        let mut mem = Memory::new();
        let loc = IntMemRef::new(IntBank::G, 1999);
        mem.set_int(loc, -7).unwrap();
        assert_eq!(mem.get_int(loc).unwrap(), -7);
        assert_eq!(mem.get_int(IntMemRef::new(IntBank::A, 1999)).unwrap(), 0);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut mem = Memory::new();
        let err = mem
            .set_int(IntMemRef::new(IntBank::A, 2000), 1)
            .unwrap_err();
        assert_eq!(
            err,
            EvalError::IndexOutOfRange {
                bank: "intA",
                index: 2000,
                size: INT_BANK_SIZE
            }
        );
        assert!(mem.get_int(IntMemRef::new(IntBank::A, -1)).is_err());
    }

    #[test]
    fn strk_is_three_cells() {
        let mut mem = Memory::new();
        mem.set_str(StrMemRef::new(StrBank::K, 2), "last").unwrap();
        assert_eq!(mem.get_str(StrMemRef::new(StrBank::K, 2)).unwrap(), "last");
        assert!(mem.set_str(StrMemRef::new(StrBank::K, 3), "x").is_err());
    }

    #[test]
    fn references_display_like_source_text() {
        assert_eq!(IntMemRef::new(IntBank::Z, 4).to_string(), "intZ[4]");
        assert_eq!(StrMemRef::new(StrBank::S, 0).offset(3).to_string(), "strS[3]");
    }
}
