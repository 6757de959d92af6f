// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

mod common;

use serde_json::Value;

use common::{run_rlop, stdout_text, temp_dir, write_text};

#[test]
fn ops_lists_signatures_as_json() {
    let output = run_rlop(&["--format", "json", "ops"]);
    assert!(output.status.success());
    let ops: Value = serde_json::from_str(&stdout_text(&output)).expect("json listing");
    let names: Vec<&str> = ops
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|op| op["name"].as_str())
        .collect();
    assert_eq!(names.first(), Some(&"select_w"));
    assert!(names.contains(&"strcpy"));
    assert!(names.contains(&"objBgDelete"));
}

#[test]
fn run_reports_memory_and_choices() {
    let dir = temp_dir();
    let script = dir.path().join("pick.rls");
    write_text(
        &script,
        "op<1:11:0, 0>(intC[0], 3, 1, 4)\nop<0:2:0, 0>(@0{\"one\"}, @0{\"two\"})\n",
    );

    let output = run_rlop(&[
        "run",
        script.to_str().expect("utf-8 path"),
        "--choice",
        "1",
        "--dump",
        "intC",
        "--format",
        "json",
    ]);
    assert!(output.status.success());
    let doc: Value = serde_json::from_str(&stdout_text(&output)).expect("json report");
    assert_eq!(doc["executed"], 2);
    assert_eq!(doc["stop"], "completed");
    assert_eq!(doc["store"], 1);
    assert_eq!(doc["banks"]["intC"]["2"], 4);
}

#[test]
fn halting_error_exits_non_zero() {
    let dir = temp_dir();
    let script = dir.path().join("bad.rls");
    write_text(&script, "op<1:10:3, 0>(intA[0])\n");

    let output = run_rlop(&["run", script.to_str().expect("utf-8 path")]);
    assert!(!output.status.success());
    assert!(stdout_text(&output).starts_with("halted:"));
}

#[test]
fn config_file_can_skip_failures() {
    let dir = temp_dir();
    let script = dir.path().join("bad.rls");
    let config = dir.path().join("machine.json");
    write_text(
        &script,
        "op<1:10:3, 0>(intA[0])\nop<1:10:0, 0>(strK[0], \"kept\")\n",
    );
    write_text(&config, r#"{"fatalError": "skip"}"#);

    let output = run_rlop(&[
        "run",
        script.to_str().expect("utf-8 path"),
        "--config",
        config.to_str().expect("utf-8 path"),
        "--dump",
        "strK",
    ]);
    assert!(output.status.success());
    let text = stdout_text(&output);
    assert!(text.contains("executed 1 instruction(s), completed"));
    assert!(text.contains("skipped error:"));
    assert!(text.contains("strK[0] = \"kept\""));
}

#[test]
fn unknown_bank_is_rejected() {
    let dir = temp_dir();
    let script = dir.path().join("empty.rls");
    write_text(&script, "# nothing\n");
    let output = run_rlop(&["run", script.to_str().expect("utf-8 path"), "--dump", "intQ"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown memory bank `intQ`"));
}
