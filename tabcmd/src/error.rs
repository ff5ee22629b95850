//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the tabcmd project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Error types for the command engine.
//!
//! Each family maps to one stage of execution. Every variant carries a
//! stable message id and positional fields so that the executor can turn
//! it into a localized notification; the English `Display` text and the
//! catalog template for that id are the same string.

use crate::notify::{self, NotifyKind};
use thiserror::Error;

/// Result type alias for command execution.
pub type Result<T> = std::result::Result<T, CmdError>;

/// Tokenizer failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A single or double quote was never closed.
    #[error("Command could not be executed, unmatched escape quotes: {0}")]
    UnmatchedQuotes(String),

    /// Braces or brackets in a settings value are unbalanced.
    #[error("Command could not be executed, unmatched brackets or braces: {0}")]
    UnmatchedBrackets(String),

    /// A `/pattern` in the range prefix has no closing slash.
    #[error("Search pattern in range is not terminated: {0}")]
    UnterminatedSearch(String),

    /// A `{...}` or `[...]` shaped settings value is not valid JSON.
    #[error("Invalid JSON in value '{0}': {1}")]
    InvalidJson(String, String),
}

impl ParseError {
    pub fn message_id(&self) -> &'static str {
        match self {
            ParseError::UnmatchedQuotes(_) => "parse.unmatched-quotes",
            ParseError::UnmatchedBrackets(_) => "parse.unmatched-brackets",
            ParseError::UnterminatedSearch(_) => "parse.unterminated-search",
            ParseError::InvalidJson(..) => "parse.invalid-json",
        }
    }

    pub fn fields(&self) -> Vec<String> {
        match self {
            ParseError::UnmatchedQuotes(s)
            | ParseError::UnmatchedBrackets(s)
            | ParseError::UnterminatedSearch(s) => vec![s.clone()],
            ParseError::InvalidJson(value, reason) => vec![value.clone(), reason.clone()],
        }
    }
}

/// Range resolution failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// Unknown or contradictory search flags.
    #[error("Invalid range flags: {0}")]
    BadFlags(String),

    #[error("Too many commas in range: {0}")]
    TooManyCommas(String),

    /// A search clause inside a `start,end` range.
    #[error("Search ranges can't be combined with a comma: {0}")]
    SearchWithComma(String),

    /// A position that is malformed or points into an empty list.
    #[error("Could not resolve range position: {0}")]
    Unresolvable(String),

    #[error("No tabs match the range search: {0}")]
    NoMatch(String),
}

impl RangeError {
    pub fn message_id(&self) -> &'static str {
        match self {
            RangeError::BadFlags(_) => "range.bad-flags",
            RangeError::TooManyCommas(_) => "range.too-many-commas",
            RangeError::SearchWithComma(_) => "range.search-with-comma",
            RangeError::Unresolvable(_) => "range.unresolvable",
            RangeError::NoMatch(_) => "range.no-match",
        }
    }

    pub fn fields(&self) -> Vec<String> {
        match self {
            RangeError::BadFlags(s)
            | RangeError::TooManyCommas(s)
            | RangeError::SearchWithComma(s)
            | RangeError::Unresolvable(s)
            | RangeError::NoMatch(s) => vec![s.clone()],
        }
    }
}

/// Command lookup and dispatch policy failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Not an editor command: {0}")]
    NotFound(String),

    /// The typed prefix matches more than one command.
    #[error("Command is ambiguous, please be more specific: {0}")]
    Ambiguous(String),

    #[error("Command takes no arguments: {0}")]
    NoArguments(String),

    #[error("Command does not accept a range: {0}")]
    RangeNotSupported(String),

    /// `name!` was typed but only `name` is registered.
    #[error("No ! allowed for command: {0}")]
    NoConfirmForm(String),

    /// User command expansion nested deeper than `maxmapdepth`.
    #[error("Recursion limit of {0} reached for user commands")]
    MaxDepth(String),
}

impl DispatchError {
    pub fn message_id(&self) -> &'static str {
        match self {
            DispatchError::NotFound(_) => "dispatch.not-found",
            DispatchError::Ambiguous(_) => "dispatch.ambiguous",
            DispatchError::NoArguments(_) => "dispatch.no-arguments",
            DispatchError::RangeNotSupported(_) => "dispatch.range-not-supported",
            DispatchError::NoConfirmForm(_) => "dispatch.no-confirm-form",
            DispatchError::MaxDepth(_) => "dispatch.max-depth",
        }
    }

    pub fn fields(&self) -> Vec<String> {
        match self {
            DispatchError::NotFound(s)
            | DispatchError::Ambiguous(s)
            | DispatchError::NoArguments(s)
            | DispatchError::RangeNotSupported(s)
            | DispatchError::NoConfirmForm(s)
            | DispatchError::MaxDepth(s) => vec![s.clone()],
        }
    }
}

/// Settings lookup and validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingError {
    #[error("The setting '{0}' doesn't exist")]
    Unknown(String),

    /// Name, expected kind, supplied kind.
    #[error(
        "The value of setting '{0}' is of an incorrect type, expected '{1}' \
         but got '{2}' instead."
    )]
    WrongType(String, String, String),

    /// Name, minimum, maximum.
    #[error("The value of setting '{0}' must be between {1} and {2}")]
    OutOfRange(String, String, String),

    /// Name, rendered list of allowed options.
    #[error("The value of setting '{0}' can only be one of: {1}")]
    InvalidOption(String, String),

    /// Name, reason reported by a structural validator.
    #[error("Invalid value for setting '{0}': {1}")]
    Invalid(String, String),

    /// Name, operator.
    #[error("The operator '{1}' can't be used with setting '{0}'")]
    Unsupported(String, String),

    #[error("The setting '{0}' can not be flipped")]
    NotFlippable(String),

    #[error("The setting '{0}' contains invalid characters")]
    InvalidCharacters(String),

    /// `all` combined with an assignment operator.
    #[error("The pseudo-setting 'all' can't be used with '{0}'")]
    ReservedAll(String),

    #[error("Invalid JSON for setting '{0}': {1}")]
    InvalidJson(String, String),
}

impl SettingError {
    pub fn message_id(&self) -> &'static str {
        match self {
            SettingError::Unknown(_) => "setting.unknown",
            SettingError::WrongType(..) => "setting.wrong-type",
            SettingError::OutOfRange(..) => "setting.out-of-range",
            SettingError::InvalidOption(..) => "setting.invalid-option",
            SettingError::Invalid(..) => "setting.invalid",
            SettingError::Unsupported(..) => "setting.unsupported",
            SettingError::NotFlippable(_) => "setting.not-flippable",
            SettingError::InvalidCharacters(_) => "setting.invalid-characters",
            SettingError::ReservedAll(_) => "setting.reserved-all",
            SettingError::InvalidJson(..) => "setting.invalid-json",
        }
    }

    pub fn fields(&self) -> Vec<String> {
        match self {
            SettingError::Unknown(a)
            | SettingError::NotFlippable(a)
            | SettingError::InvalidCharacters(a)
            | SettingError::ReservedAll(a) => vec![a.clone()],
            SettingError::InvalidOption(a, b)
            | SettingError::Invalid(a, b)
            | SettingError::Unsupported(a, b)
            | SettingError::InvalidJson(a, b) => vec![a.clone(), b.clone()],
            SettingError::WrongType(a, b, c) | SettingError::OutOfRange(a, b, c) => {
                vec![a.clone(), b.clone(), c.clone()]
            }
        }
    }
}

/// Any failure raised while executing a command line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CmdError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Setting(#[from] SettingError),

    /// A handler refused its input; rendered from the message catalog.
    #[error("{}", notify::render(.id, .fields))]
    Handler {
        id: &'static str,
        fields: Vec<String>,
        kind: NotifyKind,
    },
}

impl CmdError {
    /// A handler-level warning.
    pub fn warn(id: &'static str, fields: Vec<String>) -> Self {
        CmdError::Handler {
            id,
            fields,
            kind: NotifyKind::Warn,
        }
    }

    /// A handler-level error, used for I/O and process failures.
    pub fn err(id: &'static str, fields: Vec<String>) -> Self {
        CmdError::Handler {
            id,
            fields,
            kind: NotifyKind::Err,
        }
    }

    pub fn message_id(&self) -> &'static str {
        match self {
            CmdError::Parse(e) => e.message_id(),
            CmdError::Range(e) => e.message_id(),
            CmdError::Dispatch(e) => e.message_id(),
            CmdError::Setting(e) => e.message_id(),
            CmdError::Handler { id, .. } => *id,
        }
    }

    pub fn fields(&self) -> Vec<String> {
        match self {
            CmdError::Parse(e) => e.fields(),
            CmdError::Range(e) => e.fields(),
            CmdError::Dispatch(e) => e.fields(),
            CmdError::Setting(e) => e.fields(),
            CmdError::Handler { fields, .. } => fields.clone(),
        }
    }

    /// Severity of the notification this error turns into.
    pub fn kind(&self) -> NotifyKind {
        match self {
            CmdError::Handler { kind, .. } => *kind,
            _ => NotifyKind::Warn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_catalog_matches(err: CmdError) {
        assert_eq!(
            notify::render(err.message_id(), &err.fields()),
            err.to_string(),
            "catalog drifted for {}",
            err.message_id()
        );
    }

    #[test]
    fn test_catalog_matches_display() {
        assert_catalog_matches(ParseError::UnmatchedQuotes("o 'x".into()).into());
        assert_catalog_matches(ParseError::InvalidJson("{".into(), "EOF".into()).into());
        assert_catalog_matches(RangeError::TooManyCommas("1,2,3".into()).into());
        assert_catalog_matches(RangeError::BadFlags("q".into()).into());
        assert_catalog_matches(DispatchError::Ambiguous("qu".into()).into());
        assert_catalog_matches(DispatchError::NoConfirmForm("pin".into()).into());
        assert_catalog_matches(
            SettingError::WrongType("fontsize".into(), "number".into(), "string".into()).into(),
        );
        assert_catalog_matches(
            SettingError::OutOfRange("fontsize".into(), "8".into(), "30".into()).into(),
        );
        assert_catalog_matches(SettingError::Unknown("nope".into()).into());
        assert_catalog_matches(CmdError::warn("tab.no-match", vec!["closed".into()]));
    }

    #[test]
    fn test_kind() {
        assert_eq!(CmdError::from(DispatchError::NotFound("x".into())).kind(), NotifyKind::Warn);
        assert_eq!(
            CmdError::err("io.read", vec!["/x".into(), "gone".into()]).kind(),
            NotifyKind::Err
        );
    }
}
