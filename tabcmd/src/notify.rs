//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the tabcmd project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! User notifications and the message catalog.
//!
//! Notifications are keyed by a message id. The English template for an
//! id is looked up in the catalog, passed through gettext and then has
//! its `{0}`, `{1}` placeholders replaced by the notification fields.

use crate::error::CmdError;
use gettextrs::gettext;
use std::fmt;
use std::path::PathBuf;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    Info,
    Warn,
    Err,
}

impl fmt::Display for NotifyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyKind::Info => write!(f, "info"),
            NotifyKind::Warn => write!(f, "warn"),
            NotifyKind::Err => write!(f, "err"),
        }
    }
}

/// Where a command line came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Typed by the user.
    User,
    /// Read from a config file.
    Config(PathBuf),
    /// Replayed from the named user command.
    UserCommand(String),
    /// Issued internally, e.g. while reloading.
    Internal,
}

impl Source {
    pub fn is_user(&self) -> bool {
        matches!(self, Source::User)
    }

    /// The config file this line was read from, if any.
    pub fn config_file(&self) -> Option<&PathBuf> {
        match self {
            Source::Config(path) => Some(path),
            _ => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::User => write!(f, "user"),
            Source::Config(path) => write!(f, "{}", path.display()),
            Source::UserCommand(name) => write!(f, "command:{}", name),
            Source::Internal => write!(f, "internal"),
        }
    }
}

/// A user-facing message handed to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: &'static str,
    pub fields: Vec<String>,
    pub kind: NotifyKind,
    pub src: Source,
}

impl Notification {
    pub fn new(id: &'static str, fields: Vec<String>, kind: NotifyKind, src: Source) -> Self {
        Notification {
            id,
            fields,
            kind,
            src,
        }
    }

    pub fn info(id: &'static str, fields: Vec<String>, src: Source) -> Self {
        Self::new(id, fields, NotifyKind::Info, src)
    }

    pub fn from_error(err: &CmdError, src: Source) -> Self {
        Self::new(err.message_id(), err.fields(), err.kind(), src)
    }

    /// Localized text of this notification.
    pub fn text(&self) -> String {
        render(self.id, &self.fields)
    }
}

const CATALOG: &[(&str, &str)] = &[
    // errors
    ("parse.unmatched-quotes", "Command could not be executed, unmatched escape quotes: {0}"),
    (
        "parse.unmatched-brackets",
        "Command could not be executed, unmatched brackets or braces: {0}",
    ),
    ("parse.unterminated-search", "Search pattern in range is not terminated: {0}"),
    ("parse.invalid-json", "Invalid JSON in value '{0}': {1}"),
    ("range.bad-flags", "Invalid range flags: {0}"),
    ("range.too-many-commas", "Too many commas in range: {0}"),
    ("range.search-with-comma", "Search ranges can't be combined with a comma: {0}"),
    ("range.unresolvable", "Could not resolve range position: {0}"),
    ("range.no-match", "No tabs match the range search: {0}"),
    ("dispatch.not-found", "Not an editor command: {0}"),
    ("dispatch.ambiguous", "Command is ambiguous, please be more specific: {0}"),
    ("dispatch.no-arguments", "Command takes no arguments: {0}"),
    ("dispatch.range-not-supported", "Command does not accept a range: {0}"),
    ("dispatch.no-confirm-form", "No ! allowed for command: {0}"),
    ("dispatch.max-depth", "Recursion limit of {0} reached for user commands"),
    ("setting.unknown", "The setting '{0}' doesn't exist"),
    (
        "setting.wrong-type",
        "The value of setting '{0}' is of an incorrect type, expected '{1}' but got '{2}' instead.",
    ),
    ("setting.out-of-range", "The value of setting '{0}' must be between {1} and {2}"),
    ("setting.invalid-option", "The value of setting '{0}' can only be one of: {1}"),
    ("setting.invalid", "Invalid value for setting '{0}': {1}"),
    ("setting.unsupported", "The operator '{1}' can't be used with setting '{0}'"),
    ("setting.not-flippable", "The setting '{0}' can not be flipped"),
    ("setting.invalid-characters", "The setting '{0}' contains invalid characters"),
    ("setting.reserved-all", "The pseudo-setting 'all' can't be used with '{0}'"),
    ("setting.invalid-json", "Invalid JSON for setting '{0}': {1}"),
    // settings output
    ("setting.value", "The setting '{0}' has the value '{1}'"),
    ("setting.list", "--- Options ---\n{0}"),
    ("setting.unchanged", "No settings have been changed compared to the default"),
    // user commands
    ("command.list", "--- User defined commands ---\n{0}"),
    ("command.none", "There are no user defined commands"),
    ("command.show", "{0} => {1}"),
    ("command.builtin", "Command can not be a built-in command: {0}"),
    ("command.invalid-name", "Invalid name for a user command: {0}"),
    ("command.duplicate", "Duplicate custom command definition (add ! to overwrite)"),
    ("command.confirm-read", "Can't combine ! with reading a value"),
    ("delcommand.args", "Exactly one command name is required for delcommand"),
    ("delcommand.missing", "No such user defined command: {0}"),
    // config files
    ("source.args", "Source requires exactly one argument representing the filename"),
    ("source.absolute", "Filename must be absolute when sourcing files at runtime"),
    ("source.recursive", "Recursive sourcing of files is not supported"),
    ("source.startup", "It's not possible to source a file that is loaded on startup"),
    ("source.missing", "Specified file could not be found: {0}"),
    ("scriptnames.number", "Scriptnames argument must be a number for a script"),
    ("scriptnames.index", "No script found with that index, see ':scriptnames!'"),
    ("scriptnames.args", "Scriptnames with the ! added takes one optional argument"),
    (
        "scriptnames.vim",
        "Command to edit files with vim failed, please update the 'vimcommand' setting",
    ),
    ("mkrc.full", "The only optional argument supported is: 'full'"),
    ("mkrc.nowhere", "No config file location is known, no config written"),
    (
        "rc.empty",
        "There are no options set, no mappings changed and no custom commands \
         that have been added, no config written",
    ),
    ("rc.saved", "Config saved to '{0}'"),
    ("colorscheme.missing", "Cannot find colorscheme '{0}'"),
    ("single-optional", "The {0} command takes a single optional argument"),
    // tabs and pages
    ("tab.no-match", "Can't find matching page, no tabs {0}"),
    ("tab.suspend-visible", "Only tabs not currently visible can be suspended"),
    ("tab.hide-hidden", "Only visible pages can be hidden"),
    ("tab.pinned", "Pinned tabs can't be closed unless 'closablepinnedtabs' is set"),
    ("split.visible", "Page is already visible"),
    ("write.folder", "The folder '{0}' does not exist"),
    ("write.saved", "Page saved at '{0}'"),
    ("write.failed", "Could not save the page: {0}"),
    ("map.missing", "No mapping found for '{0}'"),
    ("unmap.args", "The unmap command requires exactly one mapping"),
    // processes and files
    ("shell.output", "{0}"),
    ("shell.failed", "System command '{0}' failed with exit code {1}\n{2}"),
    ("shell.spawn", "Could not start system command '{0}': {1}"),
    ("io.read", "Read error for file located at '{0}': {1}"),
    ("io.write", "Could not write to '{0}': {1}"),
    ("text", "{0}"),
];

/// English template for a message id; unknown ids render as themselves.
pub fn template(id: &str) -> &str {
    CATALOG
        .iter()
        .find(|(key, _)| *key == id)
        .map(|(_, text)| *text)
        .unwrap_or(id)
}

/// Translate the template for `id` and substitute its positional fields.
pub fn render(id: &str, fields: &[String]) -> String {
    substitute(&gettext(template(id)), fields)
}

/// Replace `{N}` placeholders with `fields[N]`; anything else is literal.
fn substitute(template: &str, fields: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let digits = after.bytes().take_while(|b| b.is_ascii_digit()).count();
        if digits > 0 && after[digits..].starts_with('}') {
            if let Some(field) = after[..digits].parse::<usize>().ok().and_then(|n| fields.get(n)) {
                out.push_str(field);
            }
            rest = &after[digits + 1..];
        } else {
            out.push('{');
            rest = after;
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute() {
        let fields = vec!["a".to_string(), "b".to_string()];
        assert_eq!(substitute("{1}-{0}", &fields), "b-a");
        assert_eq!(substitute("{x} {0}", &fields), "{x} a");
        assert_eq!(substitute("{9}", &fields), "");
        assert_eq!(substitute("plain", &fields), "plain");
        assert_eq!(substitute("{", &fields), "{");
    }

    #[test]
    fn test_render_unknown_id() {
        assert_eq!(render("no.such.id", &[]), "no.such.id");
    }

    #[test]
    fn test_notification_text() {
        let n = Notification::info(
            "setting.value",
            vec!["fontsize".into(), "14".into()],
            Source::User,
        );
        assert_eq!(n.text(), "The setting 'fontsize' has the value '14'");
        assert_eq!(n.kind, NotifyKind::Info);
    }

    #[test]
    fn test_source() {
        assert!(Source::User.is_user());
        assert!(!Source::Internal.is_user());
        let src = Source::Config(PathBuf::from("/etc/rc"));
        assert_eq!(src.config_file(), Some(&PathBuf::from("/etc/rc")));
        assert_eq!(src.to_string(), "/etc/rc");
    }
}
