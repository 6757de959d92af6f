// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Command-line interface parsing and report rendering.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::info;

use crate::core::config::MachineConfig;
use crate::core::driver::{RunReport, ScriptRunner, StopReason};
use crate::core::error::{DispatchError, RegistrationError, ScriptError};
use crate::core::instruction::parse_script;
use crate::core::machine::{RLMachine, ScriptedSystem};
use crate::core::memory::{IntBank, StrBank};
use crate::core::registry::DispatchTable;
use crate::registry_defaults::build_default_registry;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const LONG_ABOUT: &str = "Inspect and exercise the RealLive operation dispatch table.

`ops` lists every registered operation with its parameter signature.
`run` executes a textual script, one instruction per line:

    op<1:11:0, 0>(intA[0], 1, 2, 3)
    op<0:2:1, 0>(@0{\"Yes\"}, @1{intA[0], \"Maybe\"})

Lines starting with # or // are comments. Set RUST_LOG=rlop=debug to trace
every dispatch.";

#[derive(Parser, Debug)]
#[command(
    name = "rlop",
    version = VERSION,
    about = "RealLive operation dispatch inspector",
    long_about = LONG_ABOUT
)]
pub struct Cli {
    #[arg(
        long = "format",
        value_enum,
        global = true,
        default_value_t = OutputFormat::Text,
        long_help = "Select output format. text is default; json emits one machine-readable document."
    )]
    pub format: OutputFormat,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every registered operation.
    Ops,
    /// Run a textual instruction script.
    Run {
        #[arg(value_name = "FILE")]
        script: PathBuf,
        #[arg(
            long = "config",
            value_name = "FILE",
            long_help = "JSON machine configuration (unknownOpcode, fatalError, maxSteps)."
        )]
        config: Option<PathBuf>,
        #[arg(
            long = "choice",
            value_name = "N",
            long_help = "Answer the next selection with visible option N. Repeatable."
        )]
        choices: Vec<usize>,
        #[arg(
            long = "dump",
            value_name = "BANK",
            long_help = "Print the non-empty cells of BANK (intA..intL, strK, strM, strS) after the run. Repeatable."
        )]
        dump: Vec<String>,
        #[arg(long = "max-steps", value_name = "N")]
        max_steps: Option<u64>,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path}: {source}")]
    Script {
        path: PathBuf,
        #[source]
        source: ScriptError,
    },
    #[error("failed to build dispatch table: {0}")]
    Registration(#[from] RegistrationError),
    #[error("unknown memory bank `{0}`")]
    UnknownBank(String),
}

/// A memory bank named on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BankSelector {
    Int(IntBank),
    Str(StrBank),
}

impl BankSelector {
    pub fn parse(name: &str) -> Result<Self, CliError> {
        IntBank::from_name(name)
            .map(BankSelector::Int)
            .or_else(|| StrBank::from_name(name).map(BankSelector::Str))
            .ok_or_else(|| CliError::UnknownBank(name.to_string()))
    }

    pub fn name(self) -> &'static str {
        match self {
            BankSelector::Int(bank) => bank.name(),
            BankSelector::Str(bank) => bank.name(),
        }
    }

    /// Non-empty cells as (index, rendered value).
    fn cells(self, machine: &RLMachine) -> Vec<(usize, Value)> {
        match self {
            BankSelector::Int(bank) => machine
                .memory()
                .int_bank(bank)
                .iter()
                .enumerate()
                .filter(|(_, value)| **value != 0)
                .map(|(index, value)| (index, json!(value)))
                .collect(),
            BankSelector::Str(bank) => machine
                .memory()
                .str_bank(bank)
                .iter()
                .enumerate()
                .filter(|(_, value)| !value.is_empty())
                .map(|(index, value)| (index, json!(value)))
                .collect(),
        }
    }
}

pub fn render_operations(table: &DispatchTable, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let ops: Vec<Value> = table
                .operations()
                .map(|op| {
                    let key = op.key();
                    json!({
                        "moduleType": key.module.module_type,
                        "module": key.module.module,
                        "moduleName": table.module_name(key.module),
                        "opcode": key.opcode,
                        "overload": key.overload,
                        "name": op.name(),
                        "signature": op.signature().to_string(),
                    })
                })
                .collect();
            Value::Array(ops).to_string()
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for op in table.operations() {
                let module = table.module_name(op.key().module).unwrap_or("?");
                let _ = writeln!(
                    out,
                    "{:<20} {:<16} {:<18}{}",
                    op.key().to_string(),
                    module,
                    op.name(),
                    op.signature()
                );
            }
            out
        }
    }
}

fn stop_name(stop: &StopReason) -> &'static str {
    match stop {
        StopReason::Completed => "completed",
        StopReason::StepLimit => "step-limit",
        StopReason::Halted => "halted",
    }
}

/// Render the outcome of a run plus the requested bank dumps.
pub fn render_run(
    outcome: &Result<RunReport, DispatchError>,
    machine: &RLMachine,
    dumps: &[BankSelector],
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Json => {
            let mut banks = Map::new();
            for bank in dumps {
                let cells: Map<String, Value> = bank
                    .cells(machine)
                    .into_iter()
                    .map(|(index, value)| (index.to_string(), value))
                    .collect();
                banks.insert(bank.name().to_string(), Value::Object(cells));
            }
            let mut doc = json!({
                "store": machine.store_register(),
                "halted": machine.is_halted(),
                "banks": banks,
            });
            match outcome {
                Ok(report) => {
                    doc["executed"] = json!(report.executed);
                    doc["stop"] = json!(stop_name(&report.stop));
                    doc["skippedUnknown"] = json!(report
                        .skipped_unknown
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>());
                    doc["skippedErrors"] = json!(report
                        .skipped_errors
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>());
                    doc["error"] = Value::Null;
                }
                Err(err) => {
                    doc["stop"] = json!("halted");
                    doc["error"] = json!(err.to_string());
                }
            }
            doc.to_string()
        }
        OutputFormat::Text => {
            let mut out = String::new();
            match outcome {
                Ok(report) => {
                    let _ = writeln!(
                        out,
                        "executed {} instruction(s), {}",
                        report.executed,
                        stop_name(&report.stop)
                    );
                    for key in &report.skipped_unknown {
                        let _ = writeln!(out, "skipped unknown {key}");
                    }
                    for err in &report.skipped_errors {
                        let _ = writeln!(out, "skipped error: {err}");
                    }
                }
                Err(err) => {
                    let _ = writeln!(out, "halted: {err}");
                }
            }
            let _ = writeln!(out, "store = {}", machine.store_register());
            for bank in dumps {
                for (index, value) in bank.cells(machine) {
                    let _ = writeln!(out, "{}[{index}] = {value}", bank.name());
                }
            }
            out
        }
    }
}

/// Rendered command output and whether the run finished cleanly.
#[derive(Debug)]
pub struct CliOutput {
    pub text: String,
    pub success: bool,
}

pub fn run_with_cli(cli: &Cli) -> Result<CliOutput, CliError> {
    let table = build_default_registry()?;
    match &cli.command {
        Command::Ops => Ok(CliOutput {
            text: render_operations(&table, cli.format),
            success: true,
        }),
        Command::Run {
            script,
            config,
            choices,
            dump,
            max_steps,
        } => {
            let dumps = dump
                .iter()
                .map(|name| BankSelector::parse(name))
                .collect::<Result<Vec<_>, _>>()?;
            let mut machine_config = match config {
                Some(path) => {
                    let text = read_file(path)?;
                    let settings: Value =
                        serde_json::from_str(&text).map_err(|source| CliError::Config {
                            path: path.clone(),
                            source,
                        })?;
                    MachineConfig::from_json(&settings)
                }
                None => MachineConfig::default(),
            };
            if max_steps.is_some() {
                machine_config.max_steps = *max_steps;
            }

            let source = read_file(script)?;
            let instructions = parse_script(&source).map_err(|source| CliError::Script {
                path: script.clone(),
                source,
            })?;
            info!(
                script = %script.display(),
                instructions = instructions.len(),
                "running script"
            );

            let mut machine = RLMachine::new(Box::new(ScriptedSystem::new(choices.iter().copied())));
            let outcome = ScriptRunner::new(&table, machine_config).run(&mut machine, &instructions);
            let success = matches!(&outcome, Ok(report) if report.stop != StopReason::Halted);
            Ok(CliOutput {
                text: render_run(&outcome, &machine, &dumps, cli.format),
                success,
            })
        }
    }
}

fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
