//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the tabcmd project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

#![allow(dead_code)]

use std::io::Write;
use std::process::{Command, Output, Stdio};

pub struct TestPlan {
    pub args: Vec<String>,
    pub stdin_data: String,
    pub expected_out: String,
    pub expected_err: String,
    pub expected_exit_code: i32,
}

/// Run the tabcmd binary with logging disabled.
pub fn run_test_base(args: &[String], stdin_data: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_tabcmd"))
        .args(args)
        .env("TABCMD_LOG", "off")
        .env("SHELL", "sh")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn tabcmd");

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(stdin_data).expect("failed to write stdin");
    }

    child.wait_with_output().expect("failed to wait for child")
}

pub fn run_test(plan: TestPlan) {
    let output = run_test_base(&plan.args, plan.stdin_data.as_bytes());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, plan.expected_out);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr, plan.expected_err);

    assert_eq!(output.status.code(), Some(plan.expected_exit_code));
}

pub fn run_test_with_checker<F: FnMut(&TestPlan, &Output)>(plan: TestPlan, mut checker: F) {
    let output = run_test_base(&plan.args, plan.stdin_data.as_bytes());
    checker(&plan, &output);
}
