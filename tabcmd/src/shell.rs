//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the tabcmd project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! System command execution for `!command` lines and `scriptnames!`.
//!
//! Commands run through the shell named by `$SHELL`, invoked with `-c`
//! and the command as a single argument. Output is captured so the caller
//! can decide what to report.

use std::io;
use std::process::{Command, Stdio};

/// Maximum allowed command length.
const MAX_COMMAND_LEN: usize = 8192;

/// Captured result of a system command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellOutput {
    pub success: bool,
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs commands through a POSIX shell.
#[derive(Debug, Clone)]
pub struct SystemShell {
    shell: String,
}

impl Default for SystemShell {
    fn default() -> Self {
        Self::from_env()
    }
}

impl SystemShell {
    pub fn new(shell: &str) -> Self {
        Self {
            shell: shell.to_string(),
        }
    }

    /// Use `$SHELL`, falling back to `sh`.
    pub fn from_env() -> Self {
        let shell = std::env::var("SHELL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "sh".to_string());
        Self::new(&shell)
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    fn validate_command(command: &str) -> io::Result<()> {
        if command.trim().is_empty() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty command"));
        }
        if command.len() > MAX_COMMAND_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("command too long (max {} characters)", MAX_COMMAND_LEN),
            ));
        }
        Ok(())
    }

    /// Run a command to completion, capturing stdout and stderr.
    pub fn run(&self, command: &str) -> io::Result<ShellOutput> {
        Self::validate_command(command)?;
        tracing::debug!(shell = %self.shell, command, "running system command");

        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        Ok(ShellOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_command() {
        assert!(SystemShell::validate_command("ls").is_ok());
        assert!(SystemShell::validate_command("  ").is_err());
        let long = "x".repeat(MAX_COMMAND_LEN + 1);
        assert!(SystemShell::validate_command(&long).is_err());
    }

    #[test]
    fn test_run_captures_output() {
        let shell = SystemShell::new("sh");
        let out = shell.run("echo hello").unwrap();
        assert!(out.success);
        assert_eq!(out.exit_code, Some(0));
        assert_eq!(out.stdout, "hello\n");
        assert_eq!(out.stderr, "");
    }

    #[test]
    fn test_run_failure() {
        let shell = SystemShell::new("sh");
        let out = shell.run("echo oops >&2; exit 3").unwrap();
        assert!(!out.success);
        assert_eq!(out.exit_code, Some(3));
        assert_eq!(out.stderr, "oops\n");
    }

    #[test]
    fn test_missing_shell() {
        let shell = SystemShell::new("/nonexistent/shell");
        assert!(shell.run("true").is_err());
    }
}
