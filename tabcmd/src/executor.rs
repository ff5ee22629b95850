//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the tabcmd project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! The command executor.
//!
//! A line goes through these stages:
//!
//! 1. normalization: leading `:` and blanks removed, spaces collapsed
//! 2. history
//! 3. shell escape for lines starting with `!`
//! 4. `<useCurrent...>` template expansion
//! 5. tokenizing, name resolution and dispatch checks
//! 6. the handler, or a queued replay for user commands
//!
//! User command replays never run inside the dispatch that triggered
//! them. They wait in a FIFO queue drained by [`Executor::run_pending`].

use crate::error::{CmdError, DispatchError, Result};
use crate::history::{CommandHistory, Debounce, HistoryMode};
use crate::host::{Host, Target};
use crate::notify::{Notification, Source};
use crate::parser::{self, ParsedCommand};
use crate::range::{self, RangeResult};
use crate::registry::{Registry, Resolved};
use crate::settings::{HookScope, Settings};
use std::cell::Cell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;
use url::Url;

/// What a built-in handler receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Table entry name, with `!` for confirm variants.
    pub name: String,
    pub args: Vec<String>,
    pub range: String,
    /// The normalized line.
    pub raw: String,
    pub src: Source,
    pub confirm: bool,
}

/// How a line was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    Nothing,
    Shell,
    Builtin(String),
    /// Queued for replay.
    UserCommand(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Task {
    Replay {
        name: String,
        text: String,
        depth: usize,
    },
    Keys(String),
}

/// Remove leading blanks and colons, trim, and collapse runs of spaces.
pub fn normalize(line: &str) -> String {
    let line = line.trim_start_matches(|c: char| c.is_whitespace() || c == ':');
    let mut out = String::with_capacity(line.len());
    for word in line.trim().split(' ').filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

pub struct Executor<H: Host> {
    pub registry: Registry<H>,
    pub settings: Settings,
    pub history: CommandHistory,
    pub host: H,
    pub(crate) colorscheme: String,
    queue: VecDeque<Task>,
    /// Files sourced from config files, for `scriptnames!`.
    sourced: Vec<PathBuf>,
    /// Files currently being read, innermost last.
    sourcing: Vec<PathBuf>,
    settings_flush: Debounce,
    settings_dirty: Rc<Cell<bool>>,
    depth: usize,
}

impl<H: Host> Executor<H> {
    pub fn new(host: H) -> Self {
        let mut settings = Settings::new();
        let dirty = Rc::new(Cell::new(false));
        let flag = Rc::clone(&dirty);
        settings.on_change(HookScope::All, move |_, _| flag.set(true));

        Executor {
            registry: Registry::with_builtins(),
            settings,
            history: CommandHistory::new(),
            host,
            colorscheme: "default".to_string(),
            queue: VecDeque::new(),
            sourced: Vec::new(),
            sourcing: Vec::new(),
            settings_flush: Debounce::default(),
            settings_dirty: dirty,
            depth: 0,
        }
    }

    /// Execute a line, reporting any failure as a notification.
    pub fn execute(&mut self, line: &str, src: Source) {
        if let Err(err) = self.try_execute(line, src.clone()) {
            self.notify_error(&err, &src);
        }
    }

    /// Execute a line, returning failures to the caller.
    pub fn try_execute(&mut self, line: &str, src: Source) -> Result<Dispatched> {
        let line = normalize(line);
        if line.is_empty() {
            return Ok(Dispatched::Nothing);
        }
        tracing::debug!(line = %line, src = %src, "executing");

        let mode = HistoryMode::from_setting(self.settings.get_str("commandhist"));
        self.history.push(&line, src.is_user(), mode, Instant::now());

        let result = self.dispatch(&line, src);
        if self.settings_dirty.replace(false) {
            self.settings_flush.schedule(Instant::now());
        }
        result
    }

    fn dispatch(&mut self, line: &str, src: Source) -> Result<Dispatched> {
        if let Some(command) = line.strip_prefix('!') {
            if command.trim().is_empty() {
                return Ok(Dispatched::Nothing);
            }
            self.run_system_command(command.trim(), &src);
            return Ok(Dispatched::Shell);
        }

        let line = self.expand_templates(line);
        let parsed = self.parse_and_validate_args(&line);
        if let Some(err) = parsed.error {
            return Err(err.into());
        }

        let name = if parsed.command.is_empty() {
            "buffer".to_string()
        } else {
            parsed.command
        };

        match self.registry.resolve(&name)? {
            Resolved::User(name) => {
                if parsed.confirm {
                    return Err(DispatchError::NoConfirmForm(name).into());
                }
                if !parsed.range.is_empty() {
                    return Err(DispatchError::RangeNotSupported(name).into());
                }
                if !parsed.args.is_empty() {
                    tracing::debug!(
                        command = %name,
                        args = ?parsed.args,
                        "ignoring arguments to user command"
                    );
                }
                let text = self
                    .registry
                    .user_command(&name)
                    .unwrap_or_default()
                    .to_string();
                let depth = match src {
                    Source::UserCommand(_) => self.depth + 1,
                    _ => 1,
                };
                tracing::debug!(command = %name, depth, "queueing user command");
                self.queue.push_back(Task::Replay {
                    name: name.clone(),
                    text,
                    depth,
                });
                Ok(Dispatched::UserCommand(name))
            }
            Resolved::Builtin(name) => {
                let target = if parsed.confirm {
                    format!("{}!", name)
                } else {
                    name.clone()
                };
                let entry = self
                    .registry
                    .get(&target)
                    .ok_or_else(|| DispatchError::NoConfirmForm(name.clone()))?;
                if entry.flags.no_args && !parsed.args.is_empty() {
                    return Err(DispatchError::NoArguments(name).into());
                }
                if !entry.flags.ranged && !parsed.range.is_empty() {
                    return Err(DispatchError::RangeNotSupported(name).into());
                }
                let handler = entry.handler;
                let invocation = Invocation {
                    name: target.clone(),
                    args: parsed.args,
                    range: parsed.range,
                    raw: line,
                    src,
                    confirm: parsed.confirm,
                };
                tracing::debug!(command = %target, args = ?invocation.args, "dispatching");
                handler(self, &invocation)?;
                Ok(Dispatched::Builtin(target))
            }
        }
    }

    /// Tokenize a line with this registry's no-escape commands.
    pub fn parse_and_validate_args(&self, line: &str) -> ParsedCommand {
        parser::parse_with(line, |name| self.registry.is_no_escape(name))
    }

    fn holds_templates(&self, line: &str) -> bool {
        let word = line.split(' ').next().unwrap_or_default();
        let Ok((_, name)) = parser::split_range(word) else {
            return false;
        };
        let name = name.strip_suffix('!').unwrap_or(name);
        match self.registry.resolve(name) {
            Ok(Resolved::Builtin(name)) => self.registry.is_hold_use(&name),
            _ => false,
        }
    }

    fn expand_templates(&self, line: &str) -> String {
        if !line.contains("<useCurrent") || self.holds_templates(line) {
            return line.to_string();
        }
        let tab = self.current_target().unwrap_or_default();
        let parsed = Url::parse(&tab.url).ok();
        let origin = parsed
            .as_ref()
            .map(Url::origin)
            .filter(|o| o.is_tuple())
            .map(|o| o.ascii_serialization())
            .unwrap_or_default();
        let domain = parsed
            .as_ref()
            .and_then(Url::host_str)
            .unwrap_or_default()
            .to_string();
        line.replace("<useCurrentUrl>", &tab.url)
            .replace("<useCurrentOrigin>", &origin)
            .replace("<useCurrentTitle>", &tab.name)
            .replace("<useCurrentDomain>", &domain)
    }

    pub fn current_target(&self) -> Option<Target> {
        self.host.tabs().get(self.host.current_tab()).cloned()
    }

    fn run_system_command(&mut self, command: &str, src: &Source) {
        let level = self.settings.get_str("notificationforsystemcommands").to_string();
        match self.host.run_shell(command) {
            Ok(out) if out.success => {
                let text = out.stdout.trim_end();
                if level == "all" && !text.is_empty() {
                    self.notify_info("shell.output", vec![text.to_string()], src);
                }
            }
            Ok(out) => {
                if level != "none" {
                    let code = out
                        .exit_code
                        .map_or_else(|| "?".to_string(), |c| c.to_string());
                    let err = CmdError::err(
                        "shell.failed",
                        vec![command.to_string(), code, out.stderr.trim_end().to_string()],
                    );
                    self.notify_error(&err, src);
                }
            }
            Err(e) => {
                if level != "none" {
                    let err = CmdError::err(
                        "shell.spawn",
                        vec![command.to_string(), e.to_string()],
                    );
                    self.notify_error(&err, src);
                }
            }
        }
    }

    /// Drain queued replays and keys in FIFO order.
    pub fn run_pending(&mut self) {
        while let Some(task) = self.queue.pop_front() {
            match task {
                Task::Keys(keys) => self.host.feed_keys(&keys),
                Task::Replay { name, text, depth } => self.replay(&name, &text, depth),
            }
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Queue keys for the host's input handler.
    pub fn queue_keys(&mut self, keys: &str) {
        self.queue.push_back(Task::Keys(keys.to_string()));
    }

    fn replay(&mut self, name: &str, text: &str, depth: usize) {
        let src = Source::UserCommand(name.to_string());
        let limit = usize::try_from(self.settings.get_number("maxmapdepth")).unwrap_or(1);
        if depth > limit {
            let err = DispatchError::MaxDepth(limit.to_string()).into();
            self.notify_error(&err, &src);
            return;
        }

        let outer = std::mem::replace(&mut self.depth, depth);
        if text.contains("<CR>") || text.contains('\n') {
            for segment in text.split("<CR>").flat_map(|s| s.split('\n')) {
                if segment.starts_with(':') {
                    self.execute(segment, src.clone());
                } else if !segment.is_empty() {
                    self.host.feed_keys(segment);
                }
            }
        } else {
            self.execute(text, src);
        }
        self.depth = outer;
    }

    /// Resolve a range against the host's tabs, warning unless `silent`.
    pub fn range_to_tab_idxs(&mut self, src: &Source, range: &str, silent: bool) -> RangeResult {
        let res = range::resolve(range, &self.host.tabs(), self.host.current_tab());
        if let Err(err) = &res {
            if !silent {
                self.notify_error(&err.clone().into(), src);
            }
        }
        res.into()
    }

    pub fn command_list(&self, include_custom: bool) -> Vec<String> {
        self.registry.command_list(include_custom)
    }

    pub fn notify_info(&mut self, id: &'static str, fields: Vec<String>, src: &Source) {
        self.host.notify(Notification::info(id, fields, src.clone()));
    }

    pub fn notify_error(&mut self, err: &CmdError, src: &Source) {
        tracing::warn!(id = err.message_id(), src = %src, "{}", err);
        self.host.notify(Notification::from_error(err, src.clone()));
    }

    /// Load the history file and run the startup config files.
    pub fn startup(&mut self) {
        if let Some(path) = self.host.data_dir().map(|d| d.join("commandhist")) {
            if self.host.is_file(&path) {
                match self.host.read_file(&path) {
                    Ok(text) => self.history.load(&text),
                    Err(e) => {
                        let err = CmdError::err(
                            "io.read",
                            vec![path.display().to_string(), e.to_string()],
                        );
                        self.notify_error(&err, &Source::Internal);
                    }
                }
            }
        }
        self.load_config_files();
    }

    /// Run every startup file that exists, with history paused.
    pub fn load_config_files(&mut self) {
        let was_paused = self.history.is_paused();
        self.history.pause();
        for path in self.host.config_files() {
            if !self.host.is_file(&path) {
                continue;
            }
            match self.host.read_file(&path) {
                Ok(text) => self.run_script(&path, &text),
                Err(e) => {
                    let err = CmdError::err(
                        "io.read",
                        vec![path.display().to_string(), e.to_string()],
                    );
                    self.notify_error(&err, &Source::Internal);
                }
            }
        }
        if !was_paused {
            self.history.resume();
        }
    }

    /// Restore defaults and run the startup files again.
    pub fn reload(&mut self) {
        self.settings.reset_all();
        self.registry.clear_user_commands();
        self.load_config_files();
    }

    /// Execute the lines of a config file; blank and `"` lines are skipped.
    pub fn run_script(&mut self, path: &Path, text: &str) {
        tracing::debug!(path = %path.display(), "running config file");
        self.sourcing.push(path.to_path_buf());
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('"') {
                continue;
            }
            self.execute(line, Source::Config(path.to_path_buf()));
        }
        self.sourcing.pop();
    }

    pub fn is_sourcing(&self, path: &Path) -> bool {
        self.sourcing.iter().any(|p| p == path)
    }

    pub fn record_sourced(&mut self, path: PathBuf) {
        if !self.sourced.contains(&path) {
            self.sourced.push(path);
        }
    }

    pub fn sourced_files(&self) -> &[PathBuf] {
        &self.sourced
    }

    /// Options, mappings and user commands as an rc file, or `None`
    /// when there is nothing to write.
    pub fn rc_contents(&self, full: bool) -> Option<String> {
        let options = self
            .settings
            .list_current(full)
            .lines()
            .map(|line| format!("set {}", line))
            .collect::<Vec<_>>()
            .join("\n");
        let mappings = self.host.mapping_commands().join("\n");
        let mut commands: Vec<String> = self
            .registry
            .user_commands()
            .map(|(name, replacement)| format!("command {} {}", name, replacement))
            .collect();
        if full || self.colorscheme != "default" {
            commands.push(format!("colorscheme {}", self.colorscheme));
        }
        if options.is_empty() && mappings.is_empty() && commands.is_empty() {
            return None;
        }
        Some(format!(
            "\" Options\n{}\n\n\" Mappings\n{}\n\n\" Commands\n{}\n\n\
             \" tabcmdrc generated by tabcmd\n\" vim: ft=vim\n",
            options,
            mappings,
            commands.join("\n")
        ))
    }

    /// Write persisted state whose debounce timer has expired.
    pub fn tick(&mut self, now: Instant) {
        if let Some(text) = self.history.take_due(now) {
            self.write_history(&text);
        }
        if self.settings_flush.is_due(now) {
            self.settings_flush.cancel();
            self.write_settings();
        }
    }

    /// Write all pending persisted state now.
    pub fn flush(&mut self) {
        if let Some(text) = self.history.take_pending() {
            self.write_history(&text);
        }
        if self.settings_flush.is_pending() {
            self.settings_flush.cancel();
            self.write_settings();
        }
    }

    fn write_history(&mut self, text: &str) {
        let Some(path) = self.host.data_dir().map(|d| d.join("commandhist")) else {
            return;
        };
        match self.host.append_file(&path, text) {
            Ok(()) => tracing::info!(path = %path.display(), "command history flushed"),
            Err(e) => {
                let err = CmdError::err(
                    "io.write",
                    vec![path.display().to_string(), e.to_string()],
                );
                self.notify_error(&err, &Source::Internal);
            }
        }
    }

    fn write_settings(&mut self) {
        let Some(path) = self.host.data_dir().map(|d| d.join("settings.json")) else {
            return;
        };
        let written = self
            .settings
            .snapshot_json()
            .map_err(|e| e.to_string())
            .and_then(|json| self.host.write_file(&path, &json).map_err(|e| e.to_string()));
        match written {
            Ok(()) => tracing::info!(path = %path.display(), "settings snapshot flushed"),
            Err(e) => {
                let err = CmdError::err("io.write", vec![path.display().to_string(), e]);
                self.notify_error(&err, &Source::Internal);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::LocalHost;
    use crate::notify::NotifyKind;
    use crate::shell::SystemShell;
    use std::time::Duration;

    fn executor(urls: &[&str]) -> Executor<LocalHost> {
        Executor::new(LocalHost::with_tabs(urls))
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  ::  set   mouse  "), "set mouse");
        assert_eq!(normalize(": :"), "");
        assert_eq!(normalize("\t:pin"), "pin");
    }

    #[test]
    fn test_empty_line_is_nothing() {
        let mut ex = executor(&[]);
        assert_eq!(ex.try_execute(" : ", Source::User), Ok(Dispatched::Nothing));
        assert!(ex.history.entries().is_empty());
    }

    #[test]
    fn test_history_recorded_before_dispatch() {
        let mut ex = executor(&[]);
        let err = ex.try_execute(":nosuchcommand", Source::User).unwrap_err();
        assert_eq!(err.message_id(), "dispatch.not-found");
        assert_eq!(ex.history.entries(), ["nosuchcommand"]);
        ex.execute("set nomouse", Source::Config(PathBuf::from("/rc")));
        assert_eq!(ex.history.entries().len(), 1);
    }

    #[test]
    fn test_execute_reports() {
        let mut ex = executor(&[]);
        ex.execute("qu", Source::User);
        let note = ex.host.notifications.last().unwrap();
        assert_eq!(note.id, "dispatch.ambiguous");
        assert_eq!(note.kind, NotifyKind::Warn);
        assert_eq!(note.src, Source::User);
    }

    #[test]
    fn test_templates_expand() {
        let mut ex = executor(&["https://example.com/a/b?c=1"]);
        ex.try_execute("open <useCurrentOrigin>/x", Source::User).unwrap();
        assert_eq!(ex.host.urls(), vec!["https://example.com/x"]);
        ex.try_execute("open <useCurrentDomain>", Source::User).unwrap();
        assert_eq!(ex.host.urls(), vec!["example.com"]);
    }

    #[test]
    fn test_templates_held_for_definitions() {
        let mut ex = executor(&["https://example.com/"]);
        ex.try_execute("command home open <useCurrentUrl>", Source::User)
            .unwrap();
        assert_eq!(ex.registry.user_command("home"), Some("open <useCurrentUrl>"));
    }

    #[test]
    fn test_range_only_switches_tab() {
        let mut ex = executor(&["a.com", "b.com", "c.com"]);
        assert_eq!(
            ex.try_execute("3", Source::User),
            Ok(Dispatched::Builtin("buffer".into()))
        );
        assert_eq!(ex.host.current, 2);
    }

    #[test]
    fn test_range_to_tab_idxs() {
        let mut ex = executor(&["a", "b", "c", "d", "e"]);
        let res = ex.range_to_tab_idxs(&Source::User, "2,4", false);
        assert_eq!(res, RangeResult { tabs: vec![2, 3, 4], valid: true });
        let res = ex.range_to_tab_idxs(&Source::User, "1,2,3", true);
        assert!(!res.valid);
        assert!(ex.host.notifications.is_empty());
        ex.range_to_tab_idxs(&Source::User, "1,2,3", false);
        assert_eq!(ex.host.notifications[0].id, "range.too-many-commas");
    }

    #[test]
    fn test_lone_bang_does_nothing() {
        let mut ex = executor(&[]);
        assert_eq!(ex.try_execute("!", Source::User), Ok(Dispatched::Nothing));
        assert!(ex.host.notifications.is_empty());
    }

    #[test]
    fn test_shell_reporting_levels() {
        let mut ex = executor(&[]);
        ex.host.set_shell(SystemShell::new("sh"));

        ex.try_execute("!echo hi", Source::User).unwrap();
        assert!(ex.host.notifications.is_empty());
        ex.try_execute("!echo bad >&2; exit 2", Source::User).unwrap();
        assert_eq!(
            ex.host.last_message().unwrap(),
            "System command 'echo bad >&2; exit 2' failed with exit code 2\nbad"
        );

        ex.execute("set notificationforsystemcommands=all", Source::User);
        ex.try_execute("!echo hi", Source::User).unwrap();
        assert_eq!(ex.host.last_message().unwrap(), "hi");

        ex.execute("set notificationforsystemcommands=none", Source::User);
        let before = ex.host.notifications.len();
        ex.try_execute("!exit 1", Source::User).unwrap();
        assert_eq!(ex.host.notifications.len(), before);
    }

    #[test]
    fn test_settings_snapshot_debounced() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = LocalHost::new();
        host.data_dir = Some(dir.path().to_path_buf());
        let mut ex = Executor::new(host);

        ex.try_execute("set fontsize=20", Source::User).unwrap();
        let path = dir.path().join("settings.json");
        ex.tick(Instant::now());
        assert!(!path.exists());
        ex.tick(Instant::now() + Duration::from_secs(5));
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["fontsize"], 20);
    }

    #[test]
    fn test_rc_contents() {
        let mut ex = executor(&[]);
        assert_eq!(ex.rc_contents(false), None);
        ex.execute("set nomouse", Source::User);
        ex.execute("command go open example.com", Source::User);
        ex.execute("nmap x <closeTab>", Source::User);
        assert_eq!(
            ex.rc_contents(false).unwrap(),
            "\" Options\nset nomouse\n\n\
             \" Mappings\nnmap x <closeTab>\n\n\
             \" Commands\ncommand go open example.com\n\n\
             \" tabcmdrc generated by tabcmd\n\" vim: ft=vim\n"
        );
    }
}
