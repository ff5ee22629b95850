//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the tabcmd project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Command history and the debounce timer shared by persisted state.

use std::time::{Duration, Instant};

/// Delay between the last change and a persisted write.
pub const FLUSH_DELAY: Duration = Duration::from_millis(500);

/// A coalescing timer: each schedule supersedes the previous deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Default for Debounce {
    fn default() -> Self {
        Self::new(FLUSH_DELAY)
    }
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Debounce {
            delay,
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

/// Value of the `commandhist` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    All,
    PersistAll,
    UserOnly,
    PersistUserOnly,
    None,
}

impl HistoryMode {
    pub fn from_setting(value: &str) -> Self {
        match value {
            "all" => HistoryMode::All,
            "persistall" => HistoryMode::PersistAll,
            "useronly" => HistoryMode::UserOnly,
            "none" => HistoryMode::None,
            _ => HistoryMode::PersistUserOnly,
        }
    }

    fn persists(&self) -> bool {
        matches!(self, HistoryMode::PersistAll | HistoryMode::PersistUserOnly)
    }

    fn user_only(&self) -> bool {
        matches!(self, HistoryMode::UserOnly | HistoryMode::PersistUserOnly)
    }
}

/// Executed command lines, navigable like a shell history.
#[derive(Debug, Default)]
pub struct CommandHistory {
    entries: Vec<String>,
    /// Position while navigating; `None` means at the typed text.
    index: Option<usize>,
    original: String,
    paused: bool,
    pending: Vec<String>,
    flush: Debounce,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entries with the lines of a history file.
    pub fn load(&mut self, text: &str) {
        self.entries = text
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        self.reset_position();
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Record a line; returns whether it was stored.
    pub fn push(&mut self, line: &str, user: bool, mode: HistoryMode, now: Instant) -> bool {
        if self.paused || mode == HistoryMode::None {
            return false;
        }
        if !user && mode.user_only() {
            return false;
        }
        if self.entries.last().is_some_and(|last| last == line) {
            return false;
        }
        self.entries.push(line.to_string());
        if mode.persists() {
            self.pending.push(line.to_string());
            self.flush.schedule(now);
        }
        true
    }

    fn shown(&self) -> &str {
        match self.index {
            Some(i) => self.entries.get(i).map_or("", String::as_str),
            None => &self.original,
        }
    }

    /// Step back, remembering `typed` when leaving the input line.
    pub fn previous(&mut self, typed: &str) -> Option<&str> {
        match self.index {
            None if self.entries.is_empty() => return None,
            None => {
                self.original = typed.to_string();
                self.index = Some(self.entries.len() - 1);
            }
            Some(i) if i > 0 => self.index = Some(i - 1),
            Some(_) => {}
        }
        Some(self.shown())
    }

    /// Step forward; past the newest entry the typed text comes back.
    pub fn next(&mut self) -> Option<&str> {
        let i = self.index?;
        self.index = if i + 1 < self.entries.len() {
            Some(i + 1)
        } else {
            None
        };
        Some(self.shown())
    }

    pub fn reset_position(&mut self) {
        self.index = None;
        self.original.clear();
    }

    /// Buffered lines once the flush timer has expired.
    pub fn take_due(&mut self, now: Instant) -> Option<String> {
        if self.flush.is_due(now) {
            self.take_pending()
        } else {
            None
        }
    }

    /// Buffered lines regardless of the timer.
    pub fn take_pending(&mut self) -> Option<String> {
        self.flush.cancel();
        if self.pending.is_empty() {
            return None;
        }
        let mut text = String::new();
        for line in self.pending.drain(..) {
            text.push_str(&line);
            text.push('\n');
        }
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debounce() {
        let start = Instant::now();
        let mut timer = Debounce::new(Duration::from_millis(100));
        assert!(!timer.is_due(start));
        timer.schedule(start);
        assert!(!timer.is_due(start + Duration::from_millis(50)));
        timer.schedule(start + Duration::from_millis(50));
        assert!(!timer.is_due(start + Duration::from_millis(120)));
        assert!(timer.is_due(start + Duration::from_millis(150)));
        timer.cancel();
        assert!(!timer.is_pending());
    }

    #[test]
    fn test_modes() {
        let now = Instant::now();
        let mut hist = CommandHistory::new();
        assert!(!hist.push("set", false, HistoryMode::UserOnly, now));
        assert!(hist.push("set", true, HistoryMode::UserOnly, now));
        assert!(hist.push("pin", false, HistoryMode::All, now));
        assert!(!hist.push("close", true, HistoryMode::None, now));
        assert_eq!(hist.entries(), ["set", "pin"]);
        assert_eq!(hist.take_pending(), None);
        assert_eq!(HistoryMode::from_setting("bogus"), HistoryMode::PersistUserOnly);
    }

    #[test]
    fn test_dedupe_and_pause() {
        let now = Instant::now();
        let mut hist = CommandHistory::new();
        hist.push("a", true, HistoryMode::All, now);
        assert!(!hist.push("a", true, HistoryMode::All, now));
        hist.pause();
        assert!(!hist.push("b", true, HistoryMode::All, now));
        hist.resume();
        assert!(hist.push("b", true, HistoryMode::All, now));
        assert!(hist.push("a", true, HistoryMode::All, now));
        assert_eq!(hist.entries(), ["a", "b", "a"]);
    }

    #[test]
    fn test_persisted_flush() {
        let now = Instant::now();
        let mut hist = CommandHistory::new();
        hist.push("one", true, HistoryMode::PersistAll, now);
        hist.push("two", false, HistoryMode::PersistAll, now);
        assert_eq!(hist.take_due(now), None);
        assert_eq!(hist.take_due(now + FLUSH_DELAY), Some("one\ntwo\n".to_string()));
        assert_eq!(hist.take_due(now + FLUSH_DELAY * 2), None);
    }

    #[test]
    fn test_navigation() {
        let mut hist = CommandHistory::new();
        assert_eq!(hist.previous("typed"), None);
        hist.load("first\n\nsecond\nthird\n");
        assert_eq!(hist.next(), None);
        assert_eq!(hist.previous("typed"), Some("third"));
        assert_eq!(hist.previous(""), Some("second"));
        assert_eq!(hist.previous(""), Some("first"));
        assert_eq!(hist.previous(""), Some("first"));
        assert_eq!(hist.next(), Some("second"));
        assert_eq!(hist.next(), Some("third"));
        assert_eq!(hist.next(), Some("typed"));
        assert_eq!(hist.next(), None);
        hist.previous("again");
        hist.reset_position();
        assert_eq!(hist.next(), None);
    }
}
