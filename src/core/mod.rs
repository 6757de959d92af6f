// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Operand model, parameter typing, and dispatch.

pub mod config;
pub mod descriptor;
pub mod driver;
pub mod error;
pub mod expr;
pub mod instruction;
pub mod machine;
pub mod memory;
pub mod module;
pub mod operation;
pub mod param;
pub mod parser;
pub mod registry;
pub mod tokenizer;
