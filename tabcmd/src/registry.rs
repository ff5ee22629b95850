//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the tabcmd project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! The command table: built-in handlers and user defined commands.

use crate::error::{CmdError, DispatchError, Result};
use crate::executor::{Executor, Invocation};
use crate::host::Host;
use std::collections::BTreeMap;

/// Key mode prefixes that get their own map family.
pub const MAP_MODES: &[&str] = &["", "n", "i", "c", "s", "e", "f", "p", "v", "m"];

pub type Handler<H> = fn(&mut Executor<H>, &Invocation) -> Result<()>;

/// Dispatch policy of a table entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandFlags {
    /// Reject any arguments.
    pub no_args: bool,
    /// Accept a range prefix.
    pub ranged: bool,
    /// Keep quote characters in arguments.
    pub no_escape: bool,
    /// Keep `<useCurrent...>` templates for expansion at replay time.
    pub hold_use: bool,
}

pub struct CommandEntry<H: Host> {
    pub name: String,
    pub flags: CommandFlags,
    pub handler: Handler<H>,
}

/// Outcome of name resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Builtin(String),
    User(String),
}

pub struct Registry<H: Host> {
    builtins: BTreeMap<String, CommandEntry<H>>,
    user: BTreeMap<String, String>,
}

impl<H: Host> Default for Registry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> Registry<H> {
    /// An empty table.
    pub fn new() -> Self {
        Registry {
            builtins: BTreeMap::new(),
            user: BTreeMap::new(),
        }
    }

    /// A table holding every built-in command.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtins::register(&mut registry);
        registry
    }

    pub fn register(&mut self, name: &str, flags: CommandFlags, handler: Handler<H>) {
        self.builtins.insert(
            name.to_string(),
            CommandEntry {
                name: name.to_string(),
                flags,
                handler,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry<H>> {
        self.builtins.get(name)
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtins.contains_key(name)
    }

    pub fn is_no_escape(&self, name: &str) -> bool {
        self.get(name).is_some_and(|e| e.flags.no_escape)
    }

    pub fn is_hold_use(&self, name: &str) -> bool {
        self.get(name).is_some_and(|e| e.flags.hold_use)
    }

    pub fn user_command(&self, name: &str) -> Option<&str> {
        self.user.get(name).map(String::as_str)
    }

    pub fn user_commands(&self) -> impl Iterator<Item = (&str, &str)> {
        self.user.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn exact(&self, name: &str) -> Option<Resolved> {
        if self.builtins.contains_key(name) {
            Some(Resolved::Builtin(name.to_string()))
        } else if self.user.contains_key(name) {
            Some(Resolved::User(name.to_string()))
        } else {
            None
        }
    }

    /// Resolve a typed name by exact hit or unique prefix.
    ///
    /// Confirm variants never take part in prefix matching.
    pub fn resolve(&self, name: &str) -> std::result::Result<Resolved, DispatchError> {
        if let Some(hit) = self.exact(name) {
            return Ok(hit);
        }
        let matches: Vec<&String> = self
            .builtins
            .keys()
            .chain(self.user.keys())
            .filter(|c| c.starts_with(name) && !c.ends_with('!'))
            .collect();
        match matches.as_slice() {
            [one] => self
                .exact(one)
                .ok_or_else(|| DispatchError::NotFound(name.to_string())),
            [] => Err(DispatchError::NotFound(name.to_string())),
            _ => Err(DispatchError::Ambiguous(name.to_string())),
        }
    }

    /// Define a user command; an existing one is replaced only with `overwrite`.
    pub fn add_user_command(
        &mut self,
        name: &str,
        replacement: &str,
        overwrite: bool,
    ) -> Result<()> {
        if self.builtins.contains_key(name) {
            return Err(CmdError::warn("command.builtin", vec![name.to_string()]));
        }
        let valid = name.starts_with(|c: char| c.is_ascii_alphabetic())
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(CmdError::warn("command.invalid-name", vec![name.to_string()]));
        }
        if !overwrite && self.user.contains_key(name) {
            return Err(CmdError::warn("command.duplicate", vec![]));
        }
        tracing::debug!(name, replacement, "user command defined");
        self.user.insert(name.to_string(), replacement.to_string());
        Ok(())
    }

    pub fn remove_user_command(&mut self, name: &str) -> bool {
        self.user.remove(name).is_some()
    }

    pub fn clear_user_commands(&mut self) {
        self.user.clear();
    }

    /// Command names for completion; built-ins shorter than three
    /// characters are left out.
    pub fn command_list(&self, include_custom: bool) -> Vec<String> {
        let mut list: Vec<String> = self
            .builtins
            .keys()
            .filter(|c| c.chars().count() > 2)
            .cloned()
            .collect();
        if include_custom {
            list.extend(self.user.keys().cloned());
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::LocalHost;

    fn registry() -> Registry<LocalHost> {
        Registry::with_builtins()
    }

    #[test]
    fn test_prefix_resolution() {
        let r = registry();
        assert_eq!(r.resolve("qu"), Err(DispatchError::Ambiguous("qu".into())));
        assert_eq!(r.resolve("quita"), Ok(Resolved::Builtin("quitall".into())));
        assert_eq!(r.resolve("q"), Ok(Resolved::Builtin("q".into())));
        assert_eq!(r.resolve("se"), Ok(Resolved::Builtin("set".into())));
        assert_eq!(r.resolve("zzz"), Err(DispatchError::NotFound("zzz".into())));
    }

    #[test]
    fn test_confirm_variants_not_prefix_candidates() {
        let r = registry();
        assert!(r.is_builtin("scriptnames!"));
        assert_eq!(r.resolve("scriptn"), Ok(Resolved::Builtin("scriptnames".into())));
    }

    #[test]
    fn test_user_commands_join_resolution() {
        let mut r = registry();
        r.add_user_command("quiet", "set nomouse", false).unwrap();
        assert_eq!(r.resolve("quie"), Ok(Resolved::User("quiet".into())));
        assert_eq!(r.resolve("qui"), Err(DispatchError::Ambiguous("qui".into())));
        assert_eq!(r.resolve("quiet"), Ok(Resolved::User("quiet".into())));
    }

    #[test]
    fn test_add_user_command_rules() {
        let mut r = registry();
        assert_eq!(
            r.add_user_command("close", "x", false).unwrap_err().message_id(),
            "command.builtin"
        );
        assert_eq!(
            r.add_user_command("1st", "x", false).unwrap_err().message_id(),
            "command.invalid-name"
        );
        r.add_user_command("foo", "x", false).unwrap();
        assert_eq!(
            r.add_user_command("foo", "y", false).unwrap_err().message_id(),
            "command.duplicate"
        );
        r.add_user_command("foo", "y", true).unwrap();
        assert_eq!(r.user_command("foo"), Some("y"));
        assert!(r.remove_user_command("foo"));
        assert!(!r.remove_user_command("foo"));
    }

    #[test]
    fn test_map_family_generated() {
        let r = registry();
        for mode in MAP_MODES {
            for verb in ["map", "map!", "noremap", "noremap!", "unmap", "mapclear", "mapclear!"] {
                assert!(r.is_builtin(&format!("{}{}", mode, verb)), "{}{}", mode, verb);
            }
        }
        assert!(r.is_no_escape("nmap"));
        assert!(r.is_no_escape("command"));
        assert!(!r.is_no_escape("set"));
        assert!(r.is_hold_use("inoremap"));
        assert!(r.get("vmapclear").unwrap().flags.no_args);
    }

    #[test]
    fn test_command_list() {
        let mut r = registry();
        r.add_user_command("go", "open example.com", false).unwrap();
        let builtin_only = r.command_list(false);
        assert!(builtin_only.contains(&"quitall".to_string()));
        assert!(!builtin_only.contains(&"qa".to_string()));
        assert!(!builtin_only.contains(&"go".to_string()));
        assert!(r.command_list(true).contains(&"go".to_string()));
    }
}
