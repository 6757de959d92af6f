// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Machine configuration read from a JSON document.
//!
//! Keys are camelCase (`unknownOpcode`, `fatalError`, `maxSteps`); anything
//! missing or malformed keeps its default.

use serde_json::Value;

/// What the driver does when an instruction names no registered operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownOpcodePolicy {
    #[default]
    Skip,
    Halt,
}

/// What the driver does when a known operation fails to decode or run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FatalErrorPolicy {
    #[default]
    Halt,
    Skip,
}

impl UnknownOpcodePolicy {
    fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "skip" => Some(Self::Skip),
            "halt" => Some(Self::Halt),
            _ => None,
        }
    }
}

impl FatalErrorPolicy {
    fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "halt" => Some(Self::Halt),
            "skip" => Some(Self::Skip),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MachineConfig {
    pub unknown_opcode: UnknownOpcodePolicy,
    pub fatal_error: FatalErrorPolicy,
    /// Stop after this many instructions; `None` runs to the end.
    pub max_steps: Option<u64>,
}

impl MachineConfig {
    /// Apply the keys present in `settings`; missing or invalid keys keep
    /// their current value.
    pub fn update_from_json(&mut self, settings: &Value) {
        if let Some(policy) = read_str(settings, "unknownOpcode").and_then(UnknownOpcodePolicy::parse) {
            self.unknown_opcode = policy;
        }
        if let Some(policy) = read_str(settings, "fatalError").and_then(FatalErrorPolicy::parse) {
            self.fatal_error = policy;
        }
        match settings.get("maxSteps") {
            Some(Value::Null) => self.max_steps = None,
            Some(value) => {
                if let Some(steps) = value.as_u64() {
                    self.max_steps = Some(steps);
                }
            }
            None => {}
        }
    }

    pub fn from_json(settings: &Value) -> Self {
        let mut config = Self::default();
        config.update_from_json(settings);
        config
    }
}

fn read_str<'a>(settings: &'a Value, key: &str) -> Option<&'a str> {
    settings.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_skip_unknown_and_halt_on_fatal() {
        let config = MachineConfig::default();
        assert_eq!(config.unknown_opcode, UnknownOpcodePolicy::Skip);
        assert_eq!(config.fatal_error, FatalErrorPolicy::Halt);
        assert_eq!(config.max_steps, None);
    }

    #[test]
    fn reads_known_keys_and_ignores_invalid_ones() {
        let config = MachineConfig::from_json(&json!({
            "unknownOpcode": "HALT",
            "fatalError": "explode",
            "maxSteps": 20,
        }));
        assert_eq!(config.unknown_opcode, UnknownOpcodePolicy::Halt);
        assert_eq!(config.fatal_error, FatalErrorPolicy::Halt);
        assert_eq!(config.max_steps, Some(20));

        let mut config = config;
        config.update_from_json(&json!({ "fatalError": "skip", "maxSteps": null }));
        assert_eq!(config.fatal_error, FatalErrorPolicy::Skip);
        assert_eq!(config.max_steps, None);
        assert_eq!(config.unknown_opcode, UnknownOpcodePolicy::Halt);
    }
}
