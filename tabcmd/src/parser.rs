//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the tabcmd project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Command-line tokenizer.
//!
//! Splits a line into its range prefix, command name and arguments.
//! Three tokenization modes exist:
//!
//! - normal: single and double quotes group words and are consumed
//! - no-escape: quotes are literal, used by definition commands whose
//!   payload is replayed later
//! - set-like: for any prefix of `set`; braces, brackets, backticks and
//!   double quotes group words and are retained so JSON values survive

use crate::error::ParseError;
use crate::registry::MAP_MODES;

/// A tokenized command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCommand {
    pub range: String,
    pub command: String,
    pub args: Vec<String>,
    pub confirm: bool,
    pub valid: bool,
    pub error: Option<ParseError>,
}

impl ParsedCommand {
    fn invalid(error: ParseError) -> Self {
        ParsedCommand {
            valid: false,
            error: Some(error),
            ..Default::default()
        }
    }
}

/// Whether quotes in this command's arguments are passed through untouched.
pub fn is_no_escape(name: &str) -> bool {
    if name == "command" || name == "delcommand" {
        return true;
    }
    MAP_MODES.iter().any(|mode| {
        matches!(
            name.strip_prefix(mode),
            Some("map") | Some("noremap") | Some("unmap")
        )
    })
}

/// Whether the name abbreviates `set`.
pub fn is_set_like(name: &str) -> bool {
    !name.is_empty() && "set".starts_with(name)
}

fn is_range_byte(b: u8) -> bool {
    b.is_ascii_digit() || matches!(b, b'%' | b'.' | b'$' | b'^' | b',' | b'+' | b'-')
}

/// Split the first word of a line into range prefix and command name.
///
/// With a `/` present the prefix runs through the last slash, plus any
/// offset characters after it. A lone opening slash is unterminated.
pub fn split_range(word: &str) -> Result<(&str, &str), ParseError> {
    let end = match (word.find('/'), word.rfind('/')) {
        (Some(first), Some(last)) => {
            if first == last {
                return Err(ParseError::UnterminatedSearch(word.to_string()));
            }
            let tail = &word.as_bytes()[last + 1..];
            last + 1 + tail.iter().take_while(|b| is_range_byte(**b)).count()
        }
        _ => word.bytes().take_while(|b| is_range_byte(*b)).count(),
    };
    Ok(word.split_at(end))
}

/// Tokenize a command line using the built-in no-escape list.
pub fn parse(line: &str) -> ParsedCommand {
    parse_with(line, is_no_escape)
}

/// Tokenize a command line; `no_escape` decides which names keep quotes.
pub fn parse_with<F>(line: &str, no_escape: F) -> ParsedCommand
where
    F: Fn(&str) -> bool,
{
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));

    let (range, name) = match split_range(word) {
        Ok(parts) => parts,
        Err(e) => return ParsedCommand::invalid(e),
    };

    let mut command = name.to_string();
    let mut confirm = false;
    if command.ends_with('!') && !command.ends_with("!!") {
        confirm = true;
        command.pop();
    }

    let tokens = if is_set_like(&command) {
        split_set_args(rest, line)
    } else {
        split_args(rest, line, no_escape(&command))
    };

    let parsed = match tokens {
        Ok(args) => ParsedCommand {
            range: range.to_string(),
            command,
            args,
            confirm,
            valid: true,
            error: None,
        },
        Err(e) => ParsedCommand {
            range: range.to_string(),
            command,
            confirm,
            ..ParsedCommand::invalid(e)
        },
    };
    tracing::trace!(
        range = %parsed.range,
        command = %parsed.command,
        args = ?parsed.args,
        valid = parsed.valid,
        "parsed command line"
    );
    parsed
}

fn split_args(input: &str, line: &str, no_escape: bool) -> Result<Vec<String>, ParseError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut in_single = false;
    let mut in_double = false;

    for c in input.chars() {
        match c {
            '\'' if !in_double && !no_escape => {
                in_single = !in_single;
                quoted = true;
            }
            '"' if !in_single && !no_escape => {
                in_double = !in_double;
                quoted = true;
            }
            ' ' if !in_single && !in_double => {
                if !current.is_empty() || quoted {
                    args.push(std::mem::take(&mut current));
                }
                quoted = false;
            }
            _ => current.push(c),
        }
    }
    if in_single || in_double {
        return Err(ParseError::UnmatchedQuotes(line.to_string()));
    }
    if !current.is_empty() || quoted {
        args.push(current);
    }
    Ok(args)
}

fn split_set_args(input: &str, line: &str) -> Result<Vec<String>, ParseError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;
    let mut in_backtick = false;
    let mut in_double = false;

    for c in input.chars() {
        let quoted = in_backtick || in_double;
        match c {
            '`' if !in_double => in_backtick = !in_backtick,
            '"' if !in_backtick => in_double = !in_double,
            '{' | '[' if !quoted => depth += 1,
            '}' | ']' if !quoted => {
                depth -= 1;
                if depth < 0 {
                    return Err(ParseError::UnmatchedBrackets(line.to_string()));
                }
            }
            ' ' if !quoted && depth == 0 => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    if in_backtick || in_double {
        return Err(ParseError::UnmatchedQuotes(line.to_string()));
    }
    if depth != 0 {
        return Err(ParseError::UnmatchedBrackets(line.to_string()));
    }
    if !current.is_empty() {
        args.push(current);
    }

    for arg in &args {
        if let Some(value) = assigned_value(arg) {
            let json_shaped = (value.starts_with('{') && value.ends_with('}'))
                || (value.starts_with('[') && value.ends_with(']'));
            if json_shaped {
                if let Err(e) = serde_json::from_str::<serde_json::Value>(value) {
                    return Err(ParseError::InvalidJson(value.to_string(), e.to_string()));
                }
            }
        }
    }
    Ok(args)
}

/// The value part of `name=value`, `name+=value`, `name:value` and friends.
fn assigned_value(arg: &str) -> Option<&str> {
    let name_len = arg
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    let rest = &arg[name_len..];
    ["+=", "-=", "^=", "=", ":"]
        .iter()
        .find_map(|op| rest.strip_prefix(op))
}
