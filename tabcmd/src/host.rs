//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the tabcmd project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! The boundary between the command engine and the browser.
//!
//! Everything the engine cannot do by itself goes through [`Host`]:
//! listing and manipulating tabs, showing notifications, key mappings,
//! file access and running processes. [`LocalHost`] keeps the tab list
//! in memory and is used by the `tabcmd` binary and by tests.

use crate::notify::{Notification, NotifyKind};
use crate::shell::{ShellOutput, SystemShell};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// One addressable tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Target {
    /// Display name (page title).
    pub name: String,
    pub url: String,
    pub pinned: bool,
    pub suspended: bool,
    /// Currently playing audio.
    pub audio: bool,
    pub muted: bool,
    /// Shown in the page layout.
    pub visible: bool,
}

impl Target {
    pub fn new(url: &str) -> Self {
        Target {
            name: url.to_string(),
            url: url.to_string(),
            ..Default::default()
        }
    }
}

/// Services the command engine consumes.
pub trait Host {
    /// Ordered list of tabs.
    fn tabs(&self) -> Vec<Target>;
    /// Index of the current tab; meaningless when there are no tabs.
    fn current_tab(&self) -> usize;
    fn switch_to_tab(&mut self, index: usize);
    fn close_tab(&mut self, index: usize);
    fn set_pinned(&mut self, index: usize, pinned: bool);
    fn set_muted(&mut self, index: usize, muted: bool);
    fn suspend_tab(&mut self, index: usize);
    fn hide_page(&mut self, index: usize);
    /// Show an existing tab, or a new one for `url`, next to the current page.
    fn add_split(&mut self, index: Option<usize>, url: Option<&str>, vertical: bool);
    /// Collapse the layout to the current page.
    fn only(&mut self);
    /// Navigate the current tab, opening one if there is none.
    fn navigate(&mut self, url: &str);
    fn open_special_page(&mut self, name: &str, section: Option<&str>);
    fn save_page(&mut self, index: usize, location: &Path) -> io::Result<()>;
    fn print_page(&mut self, index: usize);
    /// Apply a colour scheme, returning false when it cannot be found.
    fn load_colorscheme(&mut self, name: &str) -> bool;

    /// Replay keys through the input handler.
    fn feed_keys(&mut self, keys: &str);
    fn map_keys(&mut self, mode: &str, lhs: &str, rhs: &str, noremap: bool);
    fn unmap_keys(&mut self, mode: &str, lhs: &str) -> bool;
    fn clear_mappings(&mut self, mode: &str, defaults: bool);
    /// Mappings of a mode as command lines, optionally for a single key.
    fn list_mappings(&self, mode: &str, lhs: Option<&str>, defaults: bool) -> Vec<String>;
    /// Changed mappings of every mode as command lines, for rc files.
    fn mapping_commands(&self) -> Vec<String>;

    fn notify(&mut self, notification: Notification);

    fn read_file(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write_file(&mut self, path: &Path, contents: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    }

    fn append_file(&mut self, path: &Path, contents: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(contents.as_bytes())
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn run_shell(&mut self, command: &str) -> io::Result<ShellOutput>;

    /// Config files loaded at startup, in order.
    fn config_files(&self) -> Vec<PathBuf>;
    /// Where history and the settings snapshot live.
    fn data_dir(&self) -> Option<PathBuf>;
    fn quit(&mut self);
    fn restart(&mut self);
}

type MapKey = (String, String);

/// In-memory host.
#[derive(Debug, Default)]
pub struct LocalHost {
    pub tabs: Vec<Target>,
    pub current: usize,
    /// Indices shown in the page layout.
    pub layout: Vec<usize>,
    pub notifications: Vec<Notification>,
    pub fed_keys: Vec<String>,
    pub special_pages: Vec<String>,
    pub printed: Vec<usize>,
    pub saved: Vec<(usize, PathBuf)>,
    pub mappings: BTreeMap<MapKey, (String, bool)>,
    pub default_mappings: BTreeMap<MapKey, (String, bool)>,
    pub colorschemes: Vec<String>,
    pub colorscheme: Option<String>,
    pub config_files: Vec<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub quit: bool,
    pub restarted: bool,
    /// Print notifications as they arrive.
    pub echo: bool,
    shell: SystemShell,
}

impl LocalHost {
    pub fn new() -> Self {
        LocalHost {
            colorschemes: vec!["default".to_string()],
            ..Default::default()
        }
    }

    /// A host with one tab per url, the first one current.
    pub fn with_tabs(urls: &[&str]) -> Self {
        let mut host = Self::new();
        for url in urls {
            host.tabs.push(Target::new(url));
        }
        if !host.tabs.is_empty() {
            host.layout.push(0);
        }
        host
    }

    pub fn set_shell(&mut self, shell: SystemShell) {
        self.shell = shell;
    }

    /// Text of every notification so far.
    pub fn messages(&self) -> Vec<String> {
        self.notifications.iter().map(|n| n.text()).collect()
    }

    /// Text of the last notification.
    pub fn last_message(&self) -> Option<String> {
        self.notifications.last().map(|n| n.text())
    }

    pub fn urls(&self) -> Vec<&str> {
        self.tabs.iter().map(|t| t.url.as_str()).collect()
    }

    fn add_tab(&mut self, url: &str) -> usize {
        let index = if self.tabs.is_empty() {
            0
        } else {
            self.current + 1
        };
        self.tabs.insert(index, Target::new(url));
        for slot in self.layout.iter_mut() {
            if *slot >= index {
                *slot += 1;
            }
        }
        index
    }

    fn move_tab(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        let tab = self.tabs.remove(from);
        self.tabs.insert(to, tab);
        let remap = |i: usize| {
            if i == from {
                return to;
            }
            let j = if i > from { i - 1 } else { i };
            if j >= to {
                j + 1
            } else {
                j
            }
        };
        self.current = remap(self.current);
        for slot in self.layout.iter_mut() {
            *slot = remap(*slot);
        }
    }

    fn map_key(mode: &str, lhs: &str) -> MapKey {
        (mode.to_string(), lhs.to_string())
    }

    fn mapping_line(key: &MapKey, rhs: &str, noremap: bool) -> String {
        let verb = if noremap { "noremap" } else { "map" };
        format!("{}{} {} {}", key.0, verb, key.1, rhs)
    }
}

impl Host for LocalHost {
    fn tabs(&self) -> Vec<Target> {
        self.tabs
            .iter()
            .enumerate()
            .map(|(i, t)| Target {
                visible: self.layout.contains(&i),
                ..t.clone()
            })
            .collect()
    }

    fn current_tab(&self) -> usize {
        self.current
    }

    fn switch_to_tab(&mut self, index: usize) {
        if index >= self.tabs.len() {
            return;
        }
        if !self.layout.contains(&index) {
            match self.layout.iter().position(|&i| i == self.current) {
                Some(pos) => self.layout[pos] = index,
                None => self.layout.push(index),
            }
        }
        self.tabs[index].suspended = false;
        self.current = index;
    }

    fn close_tab(&mut self, index: usize) {
        if index >= self.tabs.len() {
            return;
        }
        self.tabs.remove(index);
        self.layout.retain(|&i| i != index);
        for slot in self.layout.iter_mut() {
            if *slot > index {
                *slot -= 1;
            }
        }
        if self.tabs.is_empty() {
            self.current = 0;
            self.layout.clear();
            return;
        }
        if self.current > index || self.current >= self.tabs.len() {
            self.current -= 1;
        }
        if self.layout.is_empty() {
            self.layout.push(self.current);
        }
    }

    fn set_pinned(&mut self, index: usize, pinned: bool) {
        if index >= self.tabs.len() {
            return;
        }
        self.tabs[index].pinned = pinned;
        let pinned_before = self
            .tabs
            .iter()
            .enumerate()
            .filter(|(i, t)| *i != index && t.pinned)
            .count();
        self.move_tab(index, pinned_before);
    }

    fn set_muted(&mut self, index: usize, muted: bool) {
        if let Some(tab) = self.tabs.get_mut(index) {
            tab.muted = muted;
        }
    }

    fn suspend_tab(&mut self, index: usize) {
        if let Some(tab) = self.tabs.get_mut(index) {
            tab.suspended = true;
            tab.audio = false;
        }
    }

    fn hide_page(&mut self, index: usize) {
        if self.layout.len() > 1 {
            self.layout.retain(|&i| i != index);
            if index == self.current {
                self.current = self.layout[0];
            }
        }
    }

    fn add_split(&mut self, index: Option<usize>, url: Option<&str>, _vertical: bool) {
        let index = match index {
            Some(index) if index < self.tabs.len() => index,
            Some(_) => return,
            None => self.add_tab(url.unwrap_or("about:blank")),
        };
        if !self.layout.contains(&index) {
            self.layout.push(index);
        }
        self.current = index;
    }

    fn only(&mut self) {
        self.layout = vec![self.current];
    }

    fn navigate(&mut self, url: &str) {
        if self.tabs.is_empty() {
            self.tabs.push(Target::new(url));
            self.layout = vec![0];
            self.current = 0;
            return;
        }
        let tab = &mut self.tabs[self.current];
        tab.url = url.to_string();
        tab.name = url.to_string();
    }

    fn open_special_page(&mut self, name: &str, section: Option<&str>) {
        let url = match section {
            Some(section) => format!("tabcmd://{}#{}", name, section),
            None => format!("tabcmd://{}", name),
        };
        self.special_pages.push(url.clone());
        let on_newtab = self
            .tabs
            .get(self.current)
            .is_some_and(|t| t.url == "tabcmd://newtab");
        if on_newtab {
            self.navigate(&url);
        } else {
            let index = self.add_tab(&url);
            self.switch_to_tab(index);
        }
    }

    fn save_page(&mut self, index: usize, location: &Path) -> io::Result<()> {
        if index >= self.tabs.len() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such tab"));
        }
        self.saved.push((index, location.to_path_buf()));
        Ok(())
    }

    fn print_page(&mut self, index: usize) {
        self.printed.push(index);
    }

    fn load_colorscheme(&mut self, name: &str) -> bool {
        if self.colorschemes.iter().any(|c| c == name) {
            self.colorscheme = Some(name.to_string());
            return true;
        }
        false
    }

    fn feed_keys(&mut self, keys: &str) {
        self.fed_keys.push(keys.to_string());
    }

    fn map_keys(&mut self, mode: &str, lhs: &str, rhs: &str, noremap: bool) {
        self.mappings
            .insert(Self::map_key(mode, lhs), (rhs.to_string(), noremap));
    }

    fn unmap_keys(&mut self, mode: &str, lhs: &str) -> bool {
        let key = Self::map_key(mode, lhs);
        let user = self.mappings.remove(&key).is_some();
        let default = self.default_mappings.remove(&key).is_some();
        user || default
    }

    fn clear_mappings(&mut self, mode: &str, defaults: bool) {
        self.mappings.retain(|(m, _), _| m != mode);
        if defaults {
            self.default_mappings.retain(|(m, _), _| m != mode);
        }
    }

    fn list_mappings(&self, mode: &str, lhs: Option<&str>, defaults: bool) -> Vec<String> {
        let mut merged: BTreeMap<&MapKey, &(String, bool)> = BTreeMap::new();
        if defaults {
            merged.extend(self.default_mappings.iter());
        }
        merged.extend(self.mappings.iter());
        merged
            .into_iter()
            .filter(|(key, _)| key.0 == mode && lhs.is_none_or(|l| key.1 == l))
            .map(|(key, (rhs, noremap))| Self::mapping_line(key, rhs, *noremap))
            .collect()
    }

    fn mapping_commands(&self) -> Vec<String> {
        self.mappings
            .iter()
            .map(|(key, (rhs, noremap))| Self::mapping_line(key, rhs, *noremap))
            .collect()
    }

    fn notify(&mut self, notification: Notification) {
        if self.echo {
            match notification.kind {
                NotifyKind::Info => println!("{}", notification.text()),
                kind => eprintln!("{}: {}", kind, notification.text()),
            }
        }
        self.notifications.push(notification);
    }

    fn run_shell(&mut self, command: &str) -> io::Result<ShellOutput> {
        self.shell.run(command)
    }

    fn config_files(&self) -> Vec<PathBuf> {
        self.config_files.clone()
    }

    fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone()
    }

    fn quit(&mut self) {
        self.quit = true;
    }

    fn restart(&mut self) {
        self.restarted = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_adjusts_current() {
        let mut host = LocalHost::with_tabs(&["a", "b", "c"]);
        host.switch_to_tab(2);
        host.close_tab(0);
        assert_eq!(host.urls(), vec!["b", "c"]);
        assert_eq!(host.current, 1);
        host.close_tab(1);
        assert_eq!(host.current, 0);
        assert_eq!(host.layout, vec![0]);
        host.close_tab(0);
        assert!(host.tabs.is_empty());
        assert!(host.layout.is_empty());
    }

    #[test]
    fn test_pin_moves_to_front() {
        let mut host = LocalHost::with_tabs(&["a", "b", "c"]);
        host.switch_to_tab(2);
        host.set_pinned(2, true);
        assert_eq!(host.urls(), vec!["c", "a", "b"]);
        assert_eq!(host.current, 0);
        host.set_pinned(0, false);
        assert_eq!(host.urls(), vec!["c", "a", "b"]);
        assert!(!host.tabs[0].pinned);
    }

    #[test]
    fn test_visibility_follows_layout() {
        let mut host = LocalHost::with_tabs(&["a", "b"]);
        assert!(host.tabs()[0].visible);
        assert!(!host.tabs()[1].visible);
        host.add_split(Some(1), None, true);
        assert!(host.tabs().iter().all(|t| t.visible));
        host.only();
        assert_eq!(host.layout, vec![1]);
    }

    #[test]
    fn test_mappings() {
        let mut host = LocalHost::new();
        host.default_mappings
            .insert(("n".into(), "j".into()), ("<scrollDown>".into(), true));
        host.map_keys("n", "x", "<closeTab>", false);
        assert_eq!(host.list_mappings("n", None, false), vec!["nmap x <closeTab>"]);
        assert_eq!(host.list_mappings("n", None, true).len(), 2);
        assert_eq!(host.mapping_commands(), vec!["nmap x <closeTab>"]);
        host.clear_mappings("n", false);
        assert!(host.list_mappings("n", None, false).is_empty());
        assert!(host.unmap_keys("n", "j"));
        assert!(!host.unmap_keys("n", "j"));
    }
}
