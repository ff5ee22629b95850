//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the tabcmd project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Structural validators for settings whose values carry their own syntax.
//!
//! A validator sees the table before the change and the candidate value,
//! and returns a human readable reason on rejection.

use super::value::{SettingKind, SettingValue};
use super::Settings;
use gettextrs::gettext;
use regex::Regex;
use std::path::PathBuf;
use url::Url;

/// Signature shared by all validators.
pub type Validator = fn(&Settings, &str, &SettingValue) -> Result<(), String>;

/// The three per-site permission override maps.
pub const PERMISSION_LISTS: [&str; 3] = [
    "permissionsallowed",
    "permissionsasked",
    "permissionsblocked",
];

const CSS_COLORS: &[&str] = &[
    "aqua", "black", "blue", "brown", "crimson", "cyan", "fuchsia", "gold", "gray", "green",
    "grey", "indigo", "lime", "magenta", "maroon", "navy", "olive", "orange", "pink", "purple",
    "red", "silver", "teal", "transparent", "violet", "white", "yellow",
];

fn list(value: &SettingValue) -> &[String] {
    value.as_list().unwrap_or(&[])
}

fn check_regex(pattern: &str, what: &str) -> Result<(), String> {
    Regex::new(pattern)
        .map(|_| ())
        .map_err(|_| format!("{} {}: {}", gettext("Invalid regular expression in"), what, pattern))
}

/// Loose URL check: a scheme with a host, or something that parses as a
/// host name with a dot, `localhost` or an IP address.
pub fn is_url(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() || text.contains(char::is_whitespace) {
        return false;
    }
    let candidate = if text.contains("://") {
        text.to_string()
    } else {
        format!("https://{}", text)
    };
    let Ok(url) = Url::parse(&candidate) else {
        return false;
    };
    match url.host() {
        Some(url::Host::Domain(domain)) => {
            domain == "localhost"
                || (domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'))
        }
        Some(_) => true,
        None => url.scheme() == "file",
    }
}

/// Hex colour or a common colour name.
pub fn is_color(text: &str) -> bool {
    if let Some(hex) = text.strip_prefix('#') {
        return matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    CSS_COLORS.contains(&text.to_ascii_lowercase().as_str())
}

/// Word characters only: letters, digits and underscores.
fn is_plain_word(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_alphanumeric() || c == '_')
}

pub fn search(_: &Settings, _: &str, value: &SettingValue) -> Result<(), String> {
    let url = value.as_str().unwrap_or_default();
    if !url.contains("%s") {
        return Err(gettext(
            "URL must contain a %s parameter, which will be replaced by the search string",
        ));
    }
    if !is_url(&url.replace("%s", "query")) {
        return Err(gettext("The value of the search setting must be a valid url"));
    }
    Ok(())
}

pub fn url_list(_: &Settings, _: &str, value: &SettingValue) -> Result<(), String> {
    match list(value).iter().find(|page| !is_url(page)) {
        Some(page) => Err(format!("{}: {}", gettext("Invalid URL"), page)),
        None => Ok(()),
    }
}

pub fn redirects(_: &Settings, _: &str, value: &SettingValue) -> Result<(), String> {
    for redirect in list(value) {
        if redirect.matches('~').count() != 1 {
            return Err(format!(
                "{}: {}",
                gettext(
                    "Entries must have exactly one ~ to separate the regular expression \
                     from the replacement"
                ),
                redirect
            ));
        }
        let (pattern, _) = redirect.split_once('~').unwrap_or_default();
        check_regex(pattern, "redirect")?;
    }
    Ok(())
}

pub fn container_colors(_: &Settings, _: &str, value: &SettingValue) -> Result<(), String> {
    for (pattern, color) in value.as_map().into_iter().flatten() {
        check_regex(pattern, "containercolors")?;
        if !is_color(color) {
            return Err(format!(
                "{}: {}",
                gettext("Invalid color, must be a valid color name or hex"),
                color
            ));
        }
    }
    Ok(())
}

/// Container names: an `s:` special name allowed for this setting, or a
/// name of word characters where `%n` stands for a number.
pub fn container_name(_: &Settings, name: &str, value: &SettingValue) -> Result<(), String> {
    let container = value.as_str().unwrap_or_default();
    if container.starts_with("s:") {
        let mut specials = vec!["s:usematching", "s:usecurrent"];
        if name != "containersplitpage" {
            specials.extend(["s:replacematching", "s:replacecurrent"]);
        }
        if name == "containernewtab" {
            specials.push("s:external");
        }
        if specials.contains(&container) {
            return Ok(());
        }
        return Err(format!(
            "{}: {}",
            gettext("Special container name can only be one of"),
            specials.join(", ")
        ));
    }
    if !is_plain_word(&container.replace("%n", "n")) {
        return Err(format!(
            "{}: {}",
            gettext(
                "No special characters besides underscores are allowed in the name \
                 of a container"
            ),
            container
        ));
    }
    Ok(())
}

/// Expand a leading `~` to the home directory.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest.trim_start_matches('/'));
        }
    }
    PathBuf::from(path)
}

pub fn download_path(_: &Settings, _: &str, value: &SettingValue) -> Result<(), String> {
    let path = expand_path(value.as_str().unwrap_or_default());
    if !path.exists() {
        return Err(gettext("The download path does not exist"));
    }
    if !path.is_dir() {
        return Err(gettext("The download path is not a directory"));
    }
    Ok(())
}

pub fn permissions(settings: &Settings, name: &str, value: &SettingValue) -> Result<(), String> {
    for (pattern, names) in value.as_map().into_iter().flatten() {
        check_regex(pattern, "permission")?;
        for permission in names.split('~') {
            let full = if permission.starts_with("permission") {
                permission.to_string()
            } else {
                format!("permission{}", permission)
            };
            let known = settings.def(&full).is_some_and(|d| d.kind == SettingKind::Enum);
            if PERMISSION_LISTS.contains(&full.as_str()) || !known {
                return Err(format!("{}: {}", gettext("Invalid name for a permission"), full));
            }
            if name.ends_with("allowed") && full.ends_with("capture") {
                return Err(gettext(
                    "Display capture permission can't be allowed, only asked or blocked",
                ));
            }
        }
        for other in PERMISSION_LISTS.iter().filter(|other| **other != name) {
            let taken = settings
                .get(other)
                .and_then(SettingValue::as_map)
                .is_some_and(|m| m.contains_key(pattern));
            if taken {
                return Err(format!(
                    "{} '{}': {}",
                    gettext("The site pattern is already configured in"),
                    other,
                    pattern
                ));
            }
        }
    }
    Ok(())
}

pub fn search_words(_: &Settings, _: &str, value: &SettingValue) -> Result<(), String> {
    for (keyword, url) in value.as_map().into_iter().flatten() {
        if !is_plain_word(keyword) {
            return Err(format!(
                "{}: {}",
                gettext("Searchwords must not contain any special characters besides underscores"),
                keyword
            ));
        }
        if !url.contains("%s") {
            return Err(format!(
                "{}: {}",
                gettext("URLs for searchwords must contain a %s parameter"),
                keyword
            ));
        }
    }
    Ok(())
}

pub fn store_new_visits(_: &Settings, _: &str, value: &SettingValue) -> Result<(), String> {
    match list(value)
        .iter()
        .find(|v| !["pages", "files", "builtin"].contains(&v.as_str()))
    {
        Some(kind) => Err(format!(
            "{}: {}, {}",
            gettext("Invalid type of history passed"),
            kind,
            gettext("must be one of: pages, files or builtin")
        )),
        None => Ok(()),
    }
}

/// Entries of the form `type[~count][~order]`, each part at most once.
pub fn suggest_order(_: &Settings, _: &str, value: &SettingValue) -> Result<(), String> {
    for entry in list(value) {
        let mut parts = entry.split('~');
        let kind = parts.next().unwrap_or_default();
        let orders: &[&str] = match kind {
            "history" => &["alpha", "relevance", "date"],
            "file" => &["alpha"],
            "searchword" => &["alpha", "setting"],
            _ => {
                return Err(format!(
                    "{}: {}",
                    gettext("Suggestion type must be one of: history, file or searchword"),
                    kind
                ))
            }
        };
        let rest: Vec<&str> = parts.collect();
        if rest.len() > 2 {
            return Err(format!(
                "{}: {}",
                gettext(
                    "Entries must have at most two ~ to separate the type from the count \
                     and the order"
                ),
                entry
            ));
        }
        let mut had_count = false;
        let mut had_order = false;
        for part in rest {
            if part.is_empty() {
                return Err(gettext(
                    "Configuration for suggestorder after the type can not be empty",
                ));
            }
            if part.parse::<u64>().is_ok_and(|n| n > 0) {
                if had_count {
                    return Err(gettext("Count can only be set once per entry"));
                }
                had_count = true;
            } else if orders.contains(&part) {
                if had_order {
                    return Err(gettext("Order can only be set once per entry"));
                }
                had_order = true;
            } else {
                return Err(format!(
                    "{} {}: {}",
                    gettext("Supported orders for"),
                    kind,
                    orders.join(", ")
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(items: &[&str]) -> SettingValue {
        SettingValue::List(items.iter().map(|s| s.to_string()).collect())
    }

    fn map_of(items: &[(&str, &str)]) -> SettingValue {
        SettingValue::Map(
            items
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com"));
        assert!(is_url("example.com/path?q=1"));
        assert!(is_url("localhost:8080"));
        assert!(is_url("127.0.0.1"));
        assert!(is_url("file:///tmp/x.html"));
        assert!(!is_url("not a url"));
        assert!(!is_url("nodot"));
        assert!(!is_url(""));
    }

    #[test]
    fn test_is_color() {
        assert!(is_color("#ff0"));
        assert!(is_color("#A0B1C2"));
        assert!(is_color("Red"));
        assert!(!is_color("#ggg"));
        assert!(!is_color("#12345"));
        assert!(!is_color("notacolor"));
    }

    #[test]
    fn test_search() {
        let s = Settings::new();
        let ok = SettingValue::String("https://ddg.gg/?q=%s".into());
        assert!(search(&s, "search", &ok).is_ok());
        let missing = SettingValue::String("https://ddg.gg/".into());
        assert!(search(&s, "search", &missing).is_err());
    }

    #[test]
    fn test_redirects() {
        let s = Settings::new();
        assert!(redirects(&s, "redirects", &list_of(&["a.com~b.com"])).is_ok());
        assert!(redirects(&s, "redirects", &list_of(&["a.com"])).is_err());
        assert!(redirects(&s, "redirects", &list_of(&["a~b~c"])).is_err());
        assert!(redirects(&s, "redirects", &list_of(&["(~b"])).is_err());
    }

    #[test]
    fn test_container_name() {
        let s = Settings::new();
        let v = |t: &str| SettingValue::String(t.to_string());
        assert!(container_name(&s, "containernewtab", &v("s:external")).is_ok());
        assert!(container_name(&s, "containersplitpage", &v("s:external")).is_err());
        assert!(container_name(&s, "containersplitpage", &v("s:replacecurrent")).is_err());
        assert!(container_name(&s, "containernewtab", &v("temp%n")).is_ok());
        assert!(container_name(&s, "containernewtab", &v("bad name")).is_err());
    }

    #[test]
    fn test_permissions() {
        let s = Settings::new();
        let good = map_of(&[("example\\.com", "camera~microphone")]);
        assert!(permissions(&s, "permissionsallowed", &good).is_ok());
        let unknown = map_of(&[("example\\.com", "teleport")]);
        assert!(permissions(&s, "permissionsallowed", &unknown).is_err());
        let reserved = map_of(&[("x", "sallowed")]);
        assert!(permissions(&s, "permissionsasked", &reserved).is_err());
        let capture = map_of(&[("x", "displaycapture")]);
        assert!(permissions(&s, "permissionsallowed", &capture).is_err());
        assert!(permissions(&s, "permissionsasked", &capture).is_ok());
    }

    #[test]
    fn test_search_words() {
        let s = Settings::new();
        let check = |key: &str, url: &str| search_words(&s, "searchwords", &map_of(&[(key, url)]));
        assert!(check("ddg", "https://d.gg/?q=%s").is_ok());
        assert!(check("d-g", "https://d.gg/?q=%s").is_err());
        assert!(check("ddg", "https://d.gg/").is_err());
    }

    #[test]
    fn test_suggest_order() {
        let s = Settings::new();
        let check = |items: &[&str]| suggest_order(&s, "suggestorder", &list_of(items));
        assert!(check(&["history", "searchword", "file"]).is_ok());
        assert!(check(&["history~5~date"]).is_ok());
        assert!(check(&["file~alpha~3"]).is_ok());
        assert!(check(&["bookmarks"]).is_err());
        assert!(check(&["history~5~6"]).is_err());
        assert!(check(&["file~date"]).is_err());
        assert!(check(&["history~"]).is_err());
        assert!(check(&["history~1~alpha~date"]).is_err());
    }

    #[test]
    fn test_store_new_visits() {
        let s = Settings::new();
        assert!(store_new_visits(&s, "storenewvisits", &list_of(&["pages", "files"])).is_ok());
        assert!(store_new_visits(&s, "storenewvisits", &list_of(&["cookies"])).is_err());
    }
}
