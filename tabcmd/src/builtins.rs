//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the tabcmd project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Built-in command handlers.

use crate::error::{CmdError, DispatchError, Result};
use crate::executor::{Executor, Invocation};
use crate::host::{Host, Target};
use crate::range;
use crate::registry::{CommandFlags, Handler, Registry, MAP_MODES};
use crate::settings::validate::expand_path;
use crate::settings::SetOutput;
use std::path::{Path, PathBuf};
use url::Url;

const PLAIN: CommandFlags = CommandFlags {
    no_args: false,
    ranged: false,
    no_escape: false,
    hold_use: false,
};
const NO_ARGS: CommandFlags = CommandFlags {
    no_args: true,
    ..PLAIN
};
const RANGED: CommandFlags = CommandFlags {
    ranged: true,
    ..PLAIN
};
const NO_ESCAPE: CommandFlags = CommandFlags {
    no_escape: true,
    ..PLAIN
};
const DEFINITION: CommandFlags = CommandFlags {
    no_escape: true,
    hold_use: true,
    ..PLAIN
};
const HOLD_USE: CommandFlags = CommandFlags {
    hold_use: true,
    ..PLAIN
};

/// Fill a registry with every built-in command.
pub fn register<H: Host>(registry: &mut Registry<H>) {
    let table: &[(&str, CommandFlags, Handler<H>)] = &[
        ("Sexplore", PLAIN, split),
        ("Vexplore", PLAIN, vsplit),
        ("b", RANGED, buffer),
        ("buffer", RANGED, buffer),
        ("call", PLAIN, call),
        ("close", RANGED, close),
        ("colorscheme", PLAIN, colorscheme),
        ("comclear", NO_ARGS, comclear),
        ("command", DEFINITION, command),
        ("command!", DEFINITION, command),
        ("cookies", NO_ARGS, special_page),
        ("d", NO_ARGS, special_page),
        ("delcommand", NO_ESCAPE, delcommand),
        ("downloads", NO_ARGS, special_page),
        ("h", PLAIN, help),
        ("hardcopy", RANGED, hardcopy),
        ("help", PLAIN, help),
        ("hide", RANGED, hide),
        ("history", NO_ARGS, special_page),
        ("lclose", NO_ARGS, lclose),
        ("mkrc", PLAIN, mkrc),
        ("mute", RANGED, mute),
        ("notifications", NO_ARGS, special_page),
        ("o", PLAIN, open),
        ("only", NO_ARGS, only),
        ("open", PLAIN, open),
        ("pin", RANGED, pin),
        ("print", RANGED, hardcopy),
        ("q", NO_ARGS, quit),
        ("qa", NO_ARGS, quitall),
        ("quit", NO_ARGS, quit),
        ("quitall", NO_ARGS, quitall),
        ("rclose", NO_ARGS, rclose),
        ("reload", NO_ARGS, reload),
        ("restart", NO_ARGS, restart),
        ("s", PLAIN, set),
        ("scriptnames", NO_ARGS, scriptnames),
        ("scriptnames!", PLAIN, scriptnames),
        ("set", PLAIN, set),
        ("source", PLAIN, source),
        ("split", PLAIN, split),
        ("suspend", RANGED, suspend),
        ("v", NO_ARGS, special_page),
        ("version", NO_ARGS, special_page),
        ("vsplit", PLAIN, vsplit),
        ("w", RANGED, write),
        ("write", RANGED, write),
    ];
    for (name, flags, handler) in table {
        registry.register(name, *flags, *handler);
    }

    for mode in MAP_MODES {
        let family: [(&str, CommandFlags, Handler<H>); 7] = [
            ("map", DEFINITION, map_or_list),
            ("map!", HOLD_USE, map_or_list),
            ("noremap", DEFINITION, map_or_list),
            ("noremap!", HOLD_USE, map_or_list),
            ("unmap", NO_ESCAPE, unmap),
            ("mapclear", NO_ARGS, mapclear),
            ("mapclear!", NO_ARGS, mapclear),
        ];
        for (verb, flags, handler) in family {
            registry.register(&format!("{}{}", mode, verb), flags, handler);
        }
    }
}

fn single_optional(name: &str) -> CmdError {
    let name = name.trim_end_matches('!');
    CmdError::warn("single-optional", vec![name.to_string()])
}

/// Index of the tab a buffer argument names: a number, or the first tab
/// whose url or title contains the words, ignoring case and punctuation.
pub fn buffer_match(tabs: &[Target], args: &[String]) -> Option<usize> {
    let last = tabs.len().checked_sub(1)?;
    if let [arg] = args {
        if let Ok(n) = arg.parse::<i64>() {
            return Some(n.clamp(0, last as i64) as usize);
        }
    }
    let simplify = |s: &str| -> String {
        s.chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect()
    };
    let needle = simplify(&args.concat());
    if needle.is_empty() {
        return None;
    }
    tabs.iter().position(|t| {
        simplify(&t.url).contains(&needle) || simplify(&t.name).contains(&needle)
    })
}

/// Tabs addressed by the range, the buffer argument, or else the current tab.
fn tabs_for<H: Host>(
    ex: &mut Executor<H>,
    inv: &Invocation,
    verb: &str,
) -> Result<Vec<usize>> {
    let tabs = ex.host.tabs();
    if !inv.range.is_empty() {
        return Ok(range::resolve(&inv.range, &tabs, ex.host.current_tab())?);
    }
    if inv.args.is_empty() {
        return Ok(if tabs.is_empty() {
            vec![]
        } else {
            vec![ex.host.current_tab()]
        });
    }
    buffer_match(&tabs, &inv.args)
        .map(|i| vec![i])
        .ok_or_else(|| CmdError::warn("tab.no-match", vec![verb.to_string()]))
}

fn set<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    if inv.args.is_empty() {
        let changes = ex.settings.list_current(false);
        if changes.is_empty() {
            ex.notify_info("setting.unchanged", vec![], &inv.src);
        } else {
            ex.notify_info("setting.list", vec![changes], &inv.src);
        }
        return Ok(());
    }
    for arg in &inv.args {
        match ex.settings.set_arg(arg) {
            Ok(Some(SetOutput::Value(name, value))) => {
                ex.notify_info("setting.value", vec![name, value], &inv.src)
            }
            Ok(Some(SetOutput::Listing(text))) => {
                ex.notify_info("setting.list", vec![text], &inv.src)
            }
            Ok(None) => {}
            Err(e) => ex.notify_error(&e.into(), &inv.src),
        }
    }
    Ok(())
}

fn user_command_name(arg: &str) -> &str {
    arg.trim_start_matches([':', '\'', '"', ' '])
}

fn command<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    if inv.confirm && inv.args.len() < 2 {
        return Err(CmdError::warn("command.confirm-read", vec![]));
    }
    let Some((first, rest)) = inv.args.split_first() else {
        let listing: Vec<String> = ex
            .registry
            .user_commands()
            .map(|(name, replacement)| format!("{} => {}", name, replacement))
            .collect();
        if listing.is_empty() {
            ex.notify_info("command.none", vec![], &inv.src);
        } else {
            ex.notify_info("command.list", vec![listing.join("\n")], &inv.src);
        }
        return Ok(());
    };

    let name = user_command_name(first);
    if rest.is_empty() {
        if ex.registry.is_builtin(name) {
            return Err(CmdError::warn("command.builtin", vec![name.to_string()]));
        }
        let replacement = ex
            .registry
            .user_command(name)
            .ok_or_else(|| DispatchError::NotFound(name.to_string()))?
            .to_string();
        ex.notify_info("command.show", vec![name.to_string(), replacement], &inv.src);
        return Ok(());
    }
    ex.registry.add_user_command(name, &rest.join(" "), inv.confirm)
}

fn delcommand<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    let [arg] = inv.args.as_slice() else {
        return Err(CmdError::warn("delcommand.args", vec![]));
    };
    let name = user_command_name(arg);
    if !ex.registry.remove_user_command(name) {
        return Err(CmdError::warn("delcommand.missing", vec![name.to_string()]));
    }
    Ok(())
}

fn comclear<H: Host>(ex: &mut Executor<H>, _: &Invocation) -> Result<()> {
    ex.registry.clear_user_commands();
    Ok(())
}

fn call<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    if !inv.args.is_empty() {
        ex.queue_keys(&inv.args.join(" "));
    }
    Ok(())
}

fn close<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    let targets = tabs_for(ex, inv, "closed")?;
    let tabs = ex.host.tabs();
    let closable_pinned = ex.settings.get_bool("closablepinnedtabs");
    let mut refused = false;
    for &i in targets.iter().rev() {
        if tabs.get(i).is_some_and(|t| t.pinned) && !closable_pinned {
            refused = true;
            continue;
        }
        ex.host.close_tab(i);
    }
    if refused {
        return Err(CmdError::warn("tab.pinned", vec![]));
    }
    Ok(())
}

/// Pins every target unless all are pinned already, then unpins them.
fn pin<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    let targets = tabs_for(ex, inv, "(un)pinned")?;
    let tabs = ex.host.tabs();
    let all_pinned = targets.iter().all(|&i| tabs.get(i).is_some_and(|t| t.pinned));
    if all_pinned {
        // Unpinning moves a tab right, so walk right to left.
        for &i in targets.iter().rev() {
            ex.host.set_pinned(i, false);
        }
    } else {
        // Pinning moves a tab left, so walk left to right.
        for &i in &targets {
            if tabs.get(i).is_some_and(|t| !t.pinned) {
                ex.host.set_pinned(i, true);
            }
        }
    }
    Ok(())
}

fn mute<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    let targets = tabs_for(ex, inv, "(un)muted")?;
    let tabs = ex.host.tabs();
    for i in targets {
        if let Some(tab) = tabs.get(i) {
            ex.host.set_muted(i, !tab.muted);
        }
    }
    Ok(())
}

fn suspend<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    let targets = tabs_for(ex, inv, "suspended")?;
    let tabs = ex.host.tabs();
    let mut refused = false;
    for i in targets {
        match tabs.get(i) {
            Some(tab) if tab.visible => refused = true,
            Some(_) => ex.host.suspend_tab(i),
            None => {}
        }
    }
    if refused {
        return Err(CmdError::warn("tab.suspend-visible", vec![]));
    }
    Ok(())
}

fn hide<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    let targets = tabs_for(ex, inv, "hidden")?;
    let tabs = ex.host.tabs();
    let mut refused = false;
    for i in targets {
        match tabs.get(i) {
            Some(tab) if !tab.visible => refused = true,
            Some(_) => ex.host.hide_page(i),
            None => {}
        }
    }
    if refused {
        return Err(CmdError::warn("tab.hide-hidden", vec![]));
    }
    Ok(())
}

fn buffer<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    if !inv.range.is_empty() {
        let targets = range::resolve(&inv.range, &ex.host.tabs(), ex.host.current_tab())?;
        if let Some(&i) = targets.first() {
            ex.host.switch_to_tab(i);
        }
        return Ok(());
    }
    if inv.args.is_empty() {
        return Ok(());
    }
    match buffer_match(&ex.host.tabs(), &inv.args) {
        Some(i) => ex.host.switch_to_tab(i),
        None => ex.host.navigate(&inv.args.join(" ")),
    }
    Ok(())
}

fn open<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    if !inv.args.is_empty() {
        ex.host.navigate(&inv.args.join(" "));
    }
    Ok(())
}

fn lclose<H: Host>(ex: &mut Executor<H>, _: &Invocation) -> Result<()> {
    let tabs = ex.host.tabs();
    let closable_pinned = ex.settings.get_bool("closablepinnedtabs");
    for i in (0..ex.host.current_tab().min(tabs.len())).rev() {
        if closable_pinned || !tabs[i].pinned {
            ex.host.close_tab(i);
        }
    }
    Ok(())
}

fn rclose<H: Host>(ex: &mut Executor<H>, _: &Invocation) -> Result<()> {
    let tabs = ex.host.tabs();
    let closable_pinned = ex.settings.get_bool("closablepinnedtabs");
    for i in (ex.host.current_tab() + 1..tabs.len()).rev() {
        if closable_pinned || !tabs[i].pinned {
            ex.host.close_tab(i);
        }
    }
    Ok(())
}

fn only<H: Host>(ex: &mut Executor<H>, _: &Invocation) -> Result<()> {
    ex.host.only();
    Ok(())
}

fn add_split<H: Host>(ex: &mut Executor<H>, inv: &Invocation, vertical: bool) -> Result<()> {
    if inv.args.is_empty() {
        ex.host.add_split(None, None, vertical);
        return Ok(());
    }
    let tabs = ex.host.tabs();
    match buffer_match(&tabs, &inv.args) {
        Some(i) if tabs[i].visible => Err(CmdError::warn("split.visible", vec![])),
        Some(i) => {
            ex.host.add_split(Some(i), None, vertical);
            Ok(())
        }
        None => {
            ex.host.add_split(None, Some(&inv.args.join(" ")), vertical);
            Ok(())
        }
    }
}

fn split<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    add_split(ex, inv, false)
}

fn vsplit<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    add_split(ex, inv, true)
}

/// File name for a saved page: host and last path segment, `.html` added
/// when the segment has no extension.
pub fn page_file_name(url: &str) -> String {
    let parsed = Url::parse(url).ok();
    let host = parsed.as_ref().and_then(Url::host_str).unwrap_or_default();
    let mut base = parsed
        .as_ref()
        .and_then(|u| u.path_segments())
        .and_then(|mut s| s.next_back())
        .filter(|s| !s.is_empty())
        .unwrap_or("index")
        .to_string();
    if !base.contains('.') {
        base.push_str(".html");
    }
    format!("{} {}", host, base).trim().to_string()
}

fn save_location<H: Host>(
    ex: &Executor<H>,
    download: &Path,
    arg: &str,
    name: &str,
) -> Result<PathBuf> {
    let mut file = expand_path(arg);
    if !file.is_absolute() {
        file = download.join(file);
    }
    let folder = file.parent().map(Path::to_path_buf).unwrap_or_default();
    if !ex.host.is_dir(&folder) {
        return Err(CmdError::warn("write.folder", vec![folder.display().to_string()]));
    }
    if ex.host.is_dir(&file) {
        return Ok(file.join(name));
    }
    if arg.ends_with('/') {
        return Err(CmdError::warn("write.folder", vec![file.display().to_string()]));
    }
    Ok(file)
}

fn write<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    if inv.args.len() > 1 {
        return Err(single_optional(&inv.name));
    }
    let tabs = ex.host.tabs();
    let targets = if inv.range.is_empty() {
        if tabs.is_empty() {
            vec![]
        } else {
            vec![ex.host.current_tab()]
        }
    } else {
        range::resolve(&inv.range, &tabs, ex.host.current_tab())?
    };
    let download = expand_path(ex.settings.get_str("downloadpath"));

    for i in targets {
        let Some(tab) = tabs.get(i) else { continue };
        let name = page_file_name(&tab.url);
        let location = match inv.args.first() {
            Some(arg) => save_location(ex, &download, arg, &name)?,
            None => download.join(&name),
        };
        ex.host
            .save_page(i, &location)
            .map_err(|e| CmdError::err("write.failed", vec![e.to_string()]))?;
        ex.notify_info("write.saved", vec![location.display().to_string()], &inv.src);
    }
    Ok(())
}

fn hardcopy<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    for i in tabs_for(ex, inv, "printed")? {
        ex.host.print_page(i);
    }
    Ok(())
}

fn special_page<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    let page = match inv.name.as_str() {
        "v" => "version",
        "d" => "downloads",
        other => other,
    };
    ex.host.open_special_page(page, None);
    Ok(())
}

fn help<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    if inv.args.len() > 1 {
        return Err(single_optional("help"));
    }
    ex.host
        .open_special_page("help", inv.args.first().map(String::as_str));
    Ok(())
}

fn quit<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    if ex.host.tabs().len() > 1 {
        let current = ex.host.current_tab();
        ex.host.close_tab(current);
        return Ok(());
    }
    quitall(ex, inv)
}

fn quitall<H: Host>(ex: &mut Executor<H>, _: &Invocation) -> Result<()> {
    ex.flush();
    ex.host.quit();
    Ok(())
}

fn restart<H: Host>(ex: &mut Executor<H>, _: &Invocation) -> Result<()> {
    ex.flush();
    ex.host.restart();
    ex.host.quit();
    Ok(())
}

fn reload<H: Host>(ex: &mut Executor<H>, _: &Invocation) -> Result<()> {
    ex.reload();
    Ok(())
}

fn source<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    let [file] = inv.args.as_slice() else {
        return Err(CmdError::warn("source.args", vec![]));
    };
    let origin = inv.src.config_file().cloned();
    let mut path = expand_path(file);
    if !path.is_absolute() {
        match origin.as_ref().and_then(|o| o.parent()) {
            Some(dir) => path = dir.join(path),
            None => return Err(CmdError::err("source.absolute", vec![])),
        }
    }
    if origin.as_ref() == Some(&path) || ex.is_sourcing(&path) {
        return Err(CmdError::err("source.recursive", vec![]));
    }
    if ex.host.config_files().contains(&path) {
        return Err(CmdError::err("source.startup", vec![]));
    }
    if !ex.host.is_file(&path) {
        return Err(CmdError::err("source.missing", vec![path.display().to_string()]));
    }
    let text = ex
        .host
        .read_file(&path)
        .map_err(|e| CmdError::err("io.read", vec![path.display().to_string(), e.to_string()]))?;
    if origin.is_some() {
        ex.record_sourced(path.clone());
    }
    ex.run_script(&path, &text);
    Ok(())
}

fn scriptnames<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    let mut scripts = ex.host.config_files();
    if !inv.confirm {
        let listing = display_paths(&scripts);
        ex.notify_info("text", vec![listing], &inv.src);
        return Ok(());
    }
    scripts.extend(ex.sourced_files().iter().cloned());
    match inv.args.as_slice() {
        [] => {
            let listing = display_paths(&scripts);
            ex.notify_info("text", vec![listing], &inv.src);
            Ok(())
        }
        [index] => {
            let number: usize = index
                .parse()
                .map_err(|_| CmdError::warn("scriptnames.number", vec![]))?;
            let script = number
                .checked_sub(1)
                .and_then(|i| scripts.get(i))
                .ok_or_else(|| CmdError::warn("scriptnames.index", vec![]))?;
            let command = format!("{} \"{}\"", ex.settings.get_str("vimcommand"), script.display());
            match ex.host.run_shell(&command) {
                Ok(out) if out.success => Ok(()),
                _ => Err(CmdError::err("scriptnames.vim", vec![])),
            }
        }
        _ => Err(CmdError::warn("scriptnames.args", vec![])),
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn mkrc<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    let full = match inv.args.as_slice() {
        [] => false,
        [arg] if arg == "full" => true,
        [_] => return Err(CmdError::warn("mkrc.full", vec![])),
        _ => return Err(single_optional("mkrc")),
    };
    let Some(path) = ex.host.config_files().into_iter().next() else {
        return Err(CmdError::warn("mkrc.nowhere", vec![]));
    };
    let Some(contents) = ex.rc_contents(full) else {
        return Err(CmdError::warn("rc.empty", vec![]));
    };
    ex.host
        .write_file(&path, &contents)
        .map_err(|e| CmdError::err("io.write", vec![path.display().to_string(), e.to_string()]))?;
    tracing::info!(path = %path.display(), full, "config written");
    ex.notify_info("rc.saved", vec![path.display().to_string()], &inv.src);
    Ok(())
}

fn colorscheme<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    match inv.args.as_slice() {
        [] => {
            let current = ex.colorscheme.clone();
            ex.notify_info("text", vec![current], &inv.src);
            Ok(())
        }
        [name] => {
            if !ex.host.load_colorscheme(name) {
                return Err(CmdError::warn("colorscheme.missing", vec![name.clone()]));
            }
            ex.colorscheme = name.clone();
            Ok(())
        }
        _ => Err(single_optional("colorscheme")),
    }
}

/// Mode prefix of a map family command name.
fn map_mode(name: &str) -> &str {
    let base = name.trim_end_matches('!');
    ["noremap", "mapclear", "unmap", "map"]
        .iter()
        .find_map(|verb| base.strip_suffix(verb))
        .unwrap_or_default()
}

fn map_or_list<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    let mode = map_mode(&inv.name);
    let noremap = inv.name.trim_end_matches('!').ends_with("noremap");
    match inv.args.as_slice() {
        [] => {
            let lines = ex.host.list_mappings(mode, None, inv.confirm);
            if !lines.is_empty() {
                ex.notify_info("text", vec![lines.join("\n")], &inv.src);
            }
            Ok(())
        }
        [lhs] => {
            let lines = ex.host.list_mappings(mode, Some(lhs), inv.confirm);
            if lines.is_empty() {
                return Err(CmdError::warn("map.missing", vec![lhs.clone()]));
            }
            ex.notify_info("text", vec![lines.join("\n")], &inv.src);
            Ok(())
        }
        [lhs, rhs @ ..] => {
            ex.host.map_keys(mode, lhs, &rhs.join(" "), noremap);
            Ok(())
        }
    }
}

fn unmap<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    let [lhs] = inv.args.as_slice() else {
        return Err(CmdError::warn("unmap.args", vec![]));
    };
    if !ex.host.unmap_keys(map_mode(&inv.name), lhs) {
        return Err(CmdError::warn("map.missing", vec![lhs.clone()]));
    }
    Ok(())
}

fn mapclear<H: Host>(ex: &mut Executor<H>, inv: &Invocation) -> Result<()> {
    ex.host.clear_mappings(map_mode(&inv.name), inv.confirm);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tabs(urls: &[&str]) -> Vec<Target> {
        urls.iter().map(|u| Target::new(u)).collect()
    }

    #[test]
    fn test_buffer_match() {
        let list = tabs(&[
            "https://example.com/",
            "https://news.ycombinator.com/",
            "https://docs.rs/",
        ]);
        let args = |a: &[&str]| a.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(buffer_match(&list, &args(&["1"])), Some(1));
        assert_eq!(buffer_match(&list, &args(&["-4"])), Some(0));
        assert_eq!(buffer_match(&list, &args(&["99"])), Some(2));
        assert_eq!(buffer_match(&list, &args(&["Y", "Combinator"])), Some(1));
        assert_eq!(buffer_match(&list, &args(&["docs.rs"])), Some(2));
        assert_eq!(buffer_match(&list, &args(&["nothing"])), None);
        assert_eq!(buffer_match(&[], &args(&["1"])), None);
        assert_eq!(buffer_match(&list, &args(&["--"])), None);
        assert_eq!(buffer_match(&list, &args(&[""])), None);
    }

    #[test]
    fn test_page_file_name() {
        assert_eq!(page_file_name("https://example.com/a/page"), "example.com page.html");
        assert_eq!(page_file_name("https://example.com/file.pdf?x=1"), "example.com file.pdf");
        assert_eq!(page_file_name("https://example.com/"), "example.com index.html");
        assert_eq!(page_file_name("not a url"), "index.html");
    }

    #[test]
    fn test_map_mode() {
        assert_eq!(map_mode("nmap"), "n");
        assert_eq!(map_mode("map!"), "");
        assert_eq!(map_mode("inoremap"), "i");
        assert_eq!(map_mode("noremap!"), "");
        assert_eq!(map_mode("vunmap"), "v");
        assert_eq!(map_mode("unmap"), "");
        assert_eq!(map_mode("cmapclear!"), "c");
    }
}
