//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the tabcmd project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! The settings table.

use super::validate::{self, Validator};
use super::value::SettingKind;

const MAX: i64 = 9_000_000_000_000_000;

const PERMISSION: &[&str] = &["block", "ask", "allow"];
const CORNERS: &[&str] = &["bottomright", "bottomleft", "topright", "topleft"];

/// Static description of one setting.
#[derive(Debug, Clone, Copy)]
pub struct SettingDef {
    pub name: &'static str,
    pub kind: SettingKind,
    /// Textual default, parsed according to `kind`.
    pub default: &'static str,
    /// Allowed values for enums.
    pub options: &'static [&'static str],
    /// Inclusive bounds for numbers.
    pub range: Option<(i64, i64)>,
    pub validator: Option<Validator>,
}

const fn def(name: &'static str, kind: SettingKind, default: &'static str) -> SettingDef {
    SettingDef {
        name,
        kind,
        default,
        options: &[],
        range: None,
        validator: None,
    }
}

const fn flag(name: &'static str, default: bool) -> SettingDef {
    def(name, SettingKind::Bool, if default { "true" } else { "false" })
}

const fn number(name: &'static str, default: &'static str, min: i64, max: i64) -> SettingDef {
    SettingDef {
        range: Some((min, max)),
        ..def(name, SettingKind::Number, default)
    }
}

const fn choice(
    name: &'static str,
    default: &'static str,
    options: &'static [&'static str],
) -> SettingDef {
    SettingDef {
        options,
        ..def(name, SettingKind::Enum, default)
    }
}

const fn checked(
    name: &'static str,
    kind: SettingKind,
    default: &'static str,
    validator: Validator,
) -> SettingDef {
    SettingDef {
        validator: Some(validator),
        ..def(name, kind, default)
    }
}

/// Every setting, sorted by name.
pub static SETTINGS: &[SettingDef] = &[
    choice("adblocker", "static", &["off", "static", "update", "custom"]),
    choice("cache", "clearonquit", &["none", "clearonquit", "full"]),
    flag("clearcookiesonquit", false),
    flag("cleardownloadsoncompleted", false),
    flag("cleardownloadsonquit", false),
    flag("clearhistoryonquit", false),
    flag("clearlocalstorageonquit", false),
    flag("closablepinnedtabs", false),
    choice(
        "commandhist",
        "persistuseronly",
        &["all", "persistall", "useronly", "persistuseronly", "none"],
    ),
    checked("containercolors", SettingKind::Map, "temp\\d+~#ff0", validate::container_colors),
    flag("containerkeeponreopen", true),
    checked("containernewtab", SettingKind::String, "s:usecurrent", validate::container_name),
    choice("containershowname", "automatic", &["automatic", "always", "never"]),
    checked("containersplitpage", SettingKind::String, "s:usecurrent", validate::container_name),
    checked("containerstartuppage", SettingKind::String, "main", validate::container_name),
    number("countlimit", "100", 0, 10000),
    choice("devtoolsposition", "window", &["window", "split", "vsplit", "tab"]),
    choice("downloadmethod", "automatic", &["automatic", "confirm", "ask", "block"]),
    checked("downloadpath", SettingKind::String, "~/Downloads/", validate::download_path),
    flag("explorehist", true),
    def("externalcommand", SettingKind::String, ""),
    choice(
        "favicons",
        "session",
        &["disabled", "nocache", "session", "1day", "5day", "30day", "forever"],
    ),
    checked("favoritepages", SettingKind::List, "", validate::url_list),
    choice("firefoxmode", "never", &["always", "google", "never"]),
    flag("follownewtabswitch", true),
    number("fontsize", "14", 8, 30),
    choice("guifullscreennavbar", "oninput", &["always", "onupdate", "oninput", "never"]),
    choice("guifullscreentabbar", "onupdate", &["always", "onupdate", "never"]),
    number("guihidetimeout", "2000", 0, MAX),
    choice("guinavbar", "always", &["always", "onupdate", "oninput", "never"]),
    choice("guitabbar", "always", &["always", "onupdate", "never"]),
    flag("ignorecase", true),
    flag("incsearch", true),
    flag("keeprecentlyclosed", true),
    number("mapsuggest", "50", 0, MAX),
    choice("mapsuggestposition", "topright", CORNERS),
    number("maxmapdepth", "10", 1, 40),
    choice("menuapp", "both", &["both", "navbar", "tabbar", "never"]),
    choice(
        "menupage",
        "elementasneeded",
        &["always", "globalasneeded", "elementasneeded", "never"],
    ),
    number("mintabwidth", "28", 0, MAX),
    flag("mouse", true),
    flag("mousefocus", false),
    flag("mousenewtabswitch", true),
    choice("nativenotification", "never", &["always", "smallonly", "never"]),
    number("notificationduration", "6000", 0, MAX),
    flag("notificationforpermissions", false),
    choice("notificationforsystemcommands", "errors", &["all", "errors", "none"]),
    choice("notificationposition", "bottomright", CORNERS),
    choice("permissioncamera", "block", PERMISSION),
    choice("permissionclipboardread", "block", PERMISSION),
    choice("permissionclosepage", "allow", &["block", "allow"]),
    choice("permissiondisplaycapture", "block", &["block", "ask"]),
    choice("permissionfullscreen", "allow", PERMISSION),
    choice("permissiongeolocation", "block", PERMISSION),
    choice("permissionmediadevices", "block", &["block", "ask", "allow", "allowfull"]),
    choice("permissionmicrophone", "block", PERMISSION),
    choice("permissionmidi", "block", PERMISSION),
    choice("permissionmidisysex", "block", PERMISSION),
    choice("permissionnotifications", "block", PERMISSION),
    choice("permissionopenexternal", "ask", PERMISSION),
    choice("permissionpersistentstorage", "block", PERMISSION),
    choice("permissionpointerlock", "block", PERMISSION),
    checked("permissionsallowed", SettingKind::Map, "", validate::permissions),
    checked("permissionsasked", SettingKind::Map, "", validate::permissions),
    checked("permissionsblocked", SettingKind::Map, "", validate::permissions),
    choice("permissionsensors", "block", PERMISSION),
    choice("permissionunknown", "block", PERMISSION),
    flag("quitonlasttabclose", false),
    checked(
        "redirects",
        SettingKind::List,
        "https?://(www\\.)?google\\.com(\\.\\w+)?/amp/s/amp\\.(.*)~https://$3",
        validate::redirects,
    ),
    flag("redirecttohttp", false),
    number("requesttimeout", "20000", 0, MAX),
    flag("restoretabs", true),
    flag("restorewindowmaximize", true),
    flag("restorewindowposition", true),
    flag("restorewindowsize", true),
    checked(
        "search",
        SettingKind::String,
        "https://duckduckgo.com/?kae=d&kav=1&ko=1&q=%s&ia=web",
        validate::search,
    ),
    checked("searchwords", SettingKind::Map, "", validate::search_words),
    flag("showcmd", true),
    flag("spell", true),
    def("spelllang", SettingKind::List, "system"),
    flag("splitbelow", false),
    flag("splitright", false),
    checked("startuppages", SettingKind::List, "", validate::url_list),
    checked("storenewvisits", SettingKind::List, "pages", validate::store_new_visits),
    number("suggestcommands", "9000000000000000", 0, MAX),
    checked(
        "suggestorder",
        SettingKind::List,
        "history,searchword,file",
        validate::suggest_order,
    ),
    number("suggesttopsites", "10", 0, MAX),
    choice("suspendonrestore", "regular", &["all", "regular", "none"]),
    number("suspendtimeout", "0", 0, MAX),
    flag("tabclosefocusright", false),
    flag("tabcycle", true),
    flag("tabnexttocurrent", true),
    choice("taboverflow", "scroll", &["hidden", "scroll", "wrap"]),
    choice("tabreopenposition", "right", &["left", "right", "previous"]),
    flag("timeout", true),
    number("timeoutlen", "1000", 0, MAX),
    def("vimcommand", SettingKind::String, "gvim"),
    choice("windowtitle", "simple", &["simple", "title", "url", "full"]),
];

/// Look up a definition by exact name.
pub fn find(name: &str) -> Option<&'static SettingDef> {
    SETTINGS.iter().find(|d| d.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::value::SettingValue;

    #[test]
    fn test_sorted_and_unique() {
        for pair in SETTINGS.windows(2) {
            assert!(pair[0].name < pair[1].name, "{} >= {}", pair[0].name, pair[1].name);
        }
    }

    #[test]
    fn test_defaults_fit_declarations() {
        for def in SETTINGS {
            let value = SettingValue::from_default(def.kind, def.default);
            if def.kind == crate::settings::value::SettingKind::Enum {
                assert!(def.options.contains(&def.default), "{}", def.name);
            }
            if let (Some((min, max)), Some(n)) = (def.range, value.as_number()) {
                assert!(min <= n && n <= max, "{}", def.name);
            }
        }
    }

    #[test]
    fn test_find() {
        assert_eq!(find("fontsize").map(|d| d.range), Some(Some((8, 30))));
        assert!(find("nosuchsetting").is_none());
    }
}
