// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

use rlop::core::error::DispatchError;
use rlop::core::machine::RLMachine;
use rlop::core::operation::OpKey;
use rlop::core::registry::DispatchTable;

/// Scratch directory removed when the returned guard drops.
pub fn temp_dir() -> TempDir {
    TempDir::with_prefix("rlop-it-").expect("create temp dir")
}

pub fn write_text(path: &Path, text: &str) {
    fs::write(path, text).expect("write file");
}

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_rlop"))
}

/// Run the `rlop` binary with `args`, logging disabled.
pub fn run_rlop(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("spawn rlop")
}

pub fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Decode textual operands for `key`, then dispatch them.
pub fn dispatch_text(
    table: &DispatchTable,
    machine: &mut RLMachine,
    key: OpKey,
    args: &[&str],
) -> Result<(), DispatchError> {
    let tokens: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
    let pieces = table.parse_parameters(key, &tokens)?;
    table.dispatch(key, &pieces, machine)
}
