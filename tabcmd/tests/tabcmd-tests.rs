//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the tabcmd project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

mod common;

use common::{run_test, run_test_with_checker, TestPlan};
use std::fs;
use tempfile::tempdir;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn tabcmd_test(extra: &[&str], stdin: &str, expected_out: &str) {
    let data = tempdir().unwrap();
    let mut all = args(&["-N", "--data-dir"]);
    all.push(data.path().display().to_string());
    all.extend(args(extra));
    run_test(TestPlan {
        args: all,
        stdin_data: stdin.to_string(),
        expected_out: expected_out.to_string(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });
}

#[test]
fn test_query_setting() {
    tabcmd_test(
        &["-c", "set fontsize?"],
        "",
        "The setting 'fontsize' has the value '14'\n",
    );
}

#[test]
fn test_commands_from_stdin() {
    tabcmd_test(
        &[],
        ":set nomouse\n\nset\n",
        "--- Options ---\nnomouse\n",
    );
}

#[test]
fn test_quit_stops_reading() {
    tabcmd_test(&[], "qa\nset fontsize?\n", "");
}

#[test]
fn test_user_command_output_order() {
    tabcmd_test(
        &[
            "-c",
            "command show set fontsize?",
            "-c",
            "show",
            "-c",
            "set fontsize=20 fontsize?",
        ],
        "",
        "The setting 'fontsize' has the value '14'\nThe setting 'fontsize' has the value '20'\n",
    );
}

#[test]
fn test_shell_output_level() {
    tabcmd_test(
        &[
            "-c",
            "!echo quiet",
            "-c",
            "set notificationforsystemcommands=all",
            "-c",
            "!echo hello",
        ],
        "",
        "hello\n",
    );
}

#[test]
fn test_errors_on_stderr() {
    let data = tempdir().unwrap();
    let mut all = args(&["-N", "--data-dir"]);
    all.push(data.path().display().to_string());
    all.extend(args(&["-c", "qu", "-c", "set fontsize=99"]));
    run_test(TestPlan {
        args: all,
        stdin_data: String::new(),
        expected_out: String::new(),
        expected_err: "warn: Command is ambiguous, please be more specific: qu\n\
                       warn: The value of setting 'fontsize' must be between 8 and 30\n"
            .to_string(),
        expected_exit_code: 0,
    });
}

#[test]
fn test_config_file_and_history() {
    let dir = tempdir().unwrap();
    let rc = dir.path().join("tabcmdrc");
    let data = dir.path().join("data");
    fs::write(&rc, "\" test config\nset fontsize=22\n").unwrap();

    run_test_with_checker(
        TestPlan {
            args: vec![
                "-u".to_string(),
                rc.display().to_string(),
                "--data-dir".to_string(),
                data.display().to_string(),
                "-c".to_string(),
                "set fontsize?".to_string(),
            ],
            stdin_data: String::new(),
            expected_out: "The setting 'fontsize' has the value '22'\n".to_string(),
            expected_err: String::new(),
            expected_exit_code: 0,
        },
        |plan, output| {
            assert_eq!(String::from_utf8_lossy(&output.stdout), plan.expected_out);
            assert_eq!(String::from_utf8_lossy(&output.stderr), plan.expected_err);
            assert!(output.status.success());
        },
    );

    assert_eq!(
        fs::read_to_string(data.join("commandhist")).unwrap(),
        "set fontsize?\n"
    );
}

#[test]
fn test_mkrc_writes_config() {
    let dir = tempdir().unwrap();
    let rc = dir.path().join("tabcmdrc");

    run_test(TestPlan {
        args: vec![
            "-u".to_string(),
            rc.display().to_string(),
            "--data-dir".to_string(),
            dir.path().join("data").display().to_string(),
            "-c".to_string(),
            "set nomouse".to_string(),
            "-c".to_string(),
            "mkrc".to_string(),
        ],
        stdin_data: String::new(),
        expected_out: format!("Config saved to '{}'\n", rc.display()),
        expected_err: String::new(),
        expected_exit_code: 0,
    });

    let written = fs::read_to_string(&rc).unwrap();
    assert!(written.starts_with("\" Options\nset nomouse\n"));
    assert!(written.ends_with("\" vim: ft=vim\n"));
}
