//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the tabcmd project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Settings table and the `set` mini-language.
//!
//! Arguments to `set` take one of these forms:
//!
//! - `name=value`, `name:value` - replace
//! - `name+=value` - append (list union, map merge, add, concatenate)
//! - `name-=value` - remove (list entry or key prefix, map key, subtract,
//!   first substring)
//! - `name^=value` - prepend (lists, strings) or multiply (numbers)
//! - `name!` - flip a boolean or step an enum
//! - `name&` - reset to the default
//! - `name?` - show the value
//! - `name` - enable a boolean or show the value
//! - `noname`, `invname` - clear or toggle
//! - `all`, `all?`, `all&` - list or reset everything
//!
//! Every change is validated before it is stored. Hooks registered with
//! [`Settings::on_change`] run after each successful change.

pub mod defs;
pub mod validate;
pub mod value;

pub use defs::{SettingDef, SETTINGS};
pub use value::{SettingInput, SettingKind, SettingValue};

use crate::error::SettingError;
use gettextrs::gettext;
use std::collections::BTreeMap;
use std::fmt;

/// Operator of a `set` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    Assign,
    Append,
    Remove,
    Prepend,
    Flip,
    Reset,
    Query,
    /// Bare boolean name.
    Enable,
    /// `no` prefix.
    Disable,
    /// `inv` prefix.
    Invert,
}

impl SetOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            SetOp::Assign => "=",
            SetOp::Append => "+=",
            SetOp::Remove => "-=",
            SetOp::Prepend => "^=",
            SetOp::Flip => "!",
            SetOp::Reset => "&",
            SetOp::Query => "?",
            SetOp::Enable => "",
            SetOp::Disable => "no",
            SetOp::Invert => "inv",
        }
    }
}

/// Text a `set` argument produced instead of a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetOutput {
    /// Name and rendered value of one setting.
    Value(String, String),
    /// A multi-line listing of settings.
    Listing(String),
}

/// Which setting names a change hook listens to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookScope {
    Exact(String),
    Prefix(String),
    All,
}

impl HookScope {
    fn covers(&self, name: &str) -> bool {
        match self {
            HookScope::Exact(n) => n == name,
            HookScope::Prefix(p) => name.starts_with(p.as_str()),
            HookScope::All => true,
        }
    }
}

type Hook = Box<dyn FnMut(&str, &SettingValue)>;

/// Split a `set` argument into name, operator and value.
///
/// A bare name yields no operator.
pub fn parse_arg(arg: &str) -> Result<(&str, Option<SetOp>, &str), SettingError> {
    const ASSIGN: [(&str, SetOp); 5] = [
        ("+=", SetOp::Append),
        ("-=", SetOp::Remove),
        ("^=", SetOp::Prepend),
        ("=", SetOp::Assign),
        (":", SetOp::Assign),
    ];

    let name_len = arg
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    let (name, rest) = arg.split_at(name_len);
    if name.is_empty() {
        return Err(SettingError::InvalidCharacters(arg.to_string()));
    }
    for (symbol, op) in ASSIGN {
        if let Some(value) = rest.strip_prefix(symbol) {
            return Ok((name, Some(op), value));
        }
    }
    match rest {
        "" => Ok((name, None, "")),
        "!" => Ok((name, Some(SetOp::Flip), "")),
        "&" => Ok((name, Some(SetOp::Reset), "")),
        "?" => Ok((name, Some(SetOp::Query), "")),
        _ => Err(SettingError::InvalidCharacters(name.to_string())),
    }
}

fn quote_options(options: &[&str]) -> String {
    match options.split_last() {
        Some((last, [])) => format!("'{}'", last),
        Some((last, rest)) => format!("'{}' {} '{}'", rest.join("', '"), gettext("or"), last),
        None => String::new(),
    }
}

fn needs_escape(value: &str) -> bool {
    value.contains([' ', '\'', '"', '{', '}', '[', ']'])
}

/// Quote a value so that the set-mode tokenizer reads it back verbatim.
fn escape_value(value: &str) -> String {
    if value.contains('"') {
        format!("`{}`", value)
    } else if needs_escape(value) {
        format!("\"{}\"", value)
    } else {
        value.to_string()
    }
}

/// Render one setting the way `set` would accept it back.
fn render(name: &str, value: &SettingValue) -> Vec<String> {
    match value {
        SettingValue::Bool(true) => vec![name.to_string()],
        SettingValue::Bool(false) => vec![format!("no{}", name)],
        SettingValue::List(_) | SettingValue::Map(_) => {
            let entries = value.entries();
            if entries.len() > 1 || entries.iter().any(|e| needs_escape(e)) {
                let mut lines = vec![format!("{}=", name)];
                lines.extend(
                    entries
                        .iter()
                        .map(|e| format!("{}+={}", name, escape_value(e))),
                );
                lines
            } else {
                vec![format!("{}={}", name, entries.concat())]
            }
        }
        other => vec![format!("{}={}", name, escape_value(&other.to_string()))],
    }
}

/// The mutable settings table.
pub struct Settings {
    values: BTreeMap<&'static str, SettingValue>,
    hooks: Vec<(HookScope, Hook)>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("values", &self.values)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl Settings {
    /// A table holding every default.
    pub fn new() -> Self {
        let values = SETTINGS
            .iter()
            .map(|d| (d.name, SettingValue::from_default(d.kind, d.default)))
            .collect();
        Settings {
            values,
            hooks: Vec::new(),
        }
    }

    pub fn def(&self, name: &str) -> Option<&'static SettingDef> {
        defs::find(name)
    }

    pub fn get(&self, name: &str) -> Option<&SettingValue> {
        self.values.get(name)
    }

    pub fn get_bool(&self, name: &str) -> bool {
        self.get(name).and_then(SettingValue::as_bool).unwrap_or(false)
    }

    pub fn get_number(&self, name: &str) -> i64 {
        self.get(name).and_then(SettingValue::as_number).unwrap_or(0)
    }

    pub fn get_str(&self, name: &str) -> &str {
        self.get(name).and_then(SettingValue::as_str).unwrap_or("")
    }

    pub fn default_of(&self, name: &str) -> Option<SettingValue> {
        self.def(name)
            .map(|d| SettingValue::from_default(d.kind, d.default))
    }

    /// Register a hook run after every successful change in `scope`.
    pub fn on_change<F>(&mut self, scope: HookScope, hook: F)
    where
        F: FnMut(&str, &SettingValue) + 'static,
    {
        self.hooks.push((scope, Box::new(hook)));
    }

    /// Validate and store a typed value.
    pub fn set(&mut self, name: &str, value: SettingValue) -> Result<(), SettingError> {
        let def = self
            .def(name)
            .ok_or_else(|| SettingError::Unknown(name.to_string()))?;
        let value = self.check(def, value)?;
        tracing::info!(setting = def.name, value = %value, "setting changed");
        self.values.insert(def.name, value.clone());
        for (scope, hook) in self.hooks.iter_mut() {
            if scope.covers(def.name) {
                hook(def.name, &value);
            }
        }
        Ok(())
    }

    fn check(&self, def: &SettingDef, value: SettingValue) -> Result<SettingValue, SettingError> {
        let name = def.name.to_string();
        let expected = match def.kind {
            SettingKind::Bool => "boolean",
            SettingKind::Number => "number",
            SettingKind::String | SettingKind::Enum => "string",
            SettingKind::List => "list",
            SettingKind::Map => "map",
        };
        if value.type_name() != expected {
            return Err(SettingError::WrongType(
                name,
                expected.to_string(),
                value.type_name().to_string(),
            ));
        }

        let value = match value {
            SettingValue::String(s) if def.kind == SettingKind::Enum => {
                if !def.options.contains(&s.as_str()) {
                    return Err(SettingError::InvalidOption(name, quote_options(def.options)));
                }
                SettingValue::String(s)
            }
            SettingValue::String(s)
                if def.name == "search"
                    && !s.starts_with("http://")
                    && !s.starts_with("https://") =>
            {
                SettingValue::String(format!("https://{}", s))
            }
            SettingValue::Number(n) => {
                if let Some((min, max)) = def.range {
                    if n < min || n > max {
                        return Err(SettingError::OutOfRange(
                            name,
                            min.to_string(),
                            max.to_string(),
                        ));
                    }
                }
                SettingValue::Number(n)
            }
            SettingValue::List(entries) => {
                let mut kept: Vec<String> = Vec::with_capacity(entries.len());
                for entry in entries {
                    let entry = entry.trim();
                    if entry.contains(',') {
                        return Err(SettingError::Invalid(
                            name,
                            format!("{}: {}", gettext("Entries can't contain a comma"), entry),
                        ));
                    }
                    if !entry.is_empty() && !kept.iter().any(|k| k == entry) {
                        kept.push(entry.to_string());
                    }
                }
                SettingValue::List(kept)
            }
            SettingValue::Map(map) => {
                for (key, val) in &map {
                    if key.is_empty() || key.contains([',', '~']) || val.contains(',') {
                        return Err(SettingError::Invalid(
                            name,
                            format!(
                                "{}: {}~{}",
                                gettext(
                                    "Keys can't be empty or contain ',' or '~', \
                                     values can't contain ','"
                                ),
                                key,
                                val
                            ),
                        ));
                    }
                }
                SettingValue::Map(map)
            }
            other => other,
        };

        if let Some(validator) = def.validator {
            validator(self, def.name, &value)
                .map_err(|reason| SettingError::Invalid(name, reason))?;
        }
        Ok(value)
    }

    /// Apply one operator to a named setting.
    pub fn apply(
        &mut self,
        name: &str,
        raw: &str,
        op: SetOp,
    ) -> Result<Option<SetOutput>, SettingError> {
        let def = self
            .def(name)
            .ok_or_else(|| SettingError::Unknown(name.to_string()))?;
        let current = self
            .get(def.name)
            .cloned()
            .unwrap_or_else(|| SettingValue::from_default(def.kind, def.default));
        let default = SettingValue::from_default(def.kind, def.default);
        let unsupported =
            || SettingError::Unsupported(def.name.to_string(), op.symbol().to_string());

        let next = match op {
            SetOp::Query => {
                return Ok(Some(SetOutput::Value(
                    def.name.to_string(),
                    current.to_string(),
                )))
            }
            SetOp::Reset => default,
            SetOp::Flip => match &current {
                SettingValue::Bool(b) => SettingValue::Bool(!b),
                SettingValue::String(s) if def.kind == SettingKind::Enum => {
                    let next = def
                        .options
                        .iter()
                        .position(|o| o == s)
                        .and_then(|i| def.options.get(i + 1))
                        .or_else(|| def.options.first())
                        .ok_or_else(unsupported)?;
                    SettingValue::String(next.to_string())
                }
                _ => return Err(SettingError::NotFlippable(def.name.to_string())),
            },
            SetOp::Enable => match current {
                SettingValue::Bool(_) => SettingValue::Bool(true),
                _ => return Err(unsupported()),
            },
            SetOp::Disable => SettingValue::empty_of(def.kind).ok_or_else(unsupported)?,
            SetOp::Invert => match &current {
                SettingValue::Bool(b) => SettingValue::Bool(!b),
                _ => {
                    let empty = SettingValue::empty_of(def.kind).ok_or_else(unsupported)?;
                    if current == empty {
                        default
                    } else {
                        empty
                    }
                }
            },
            SetOp::Assign | SetOp::Append | SetOp::Remove | SetOp::Prepend => {
                let input = SettingInput::parse(raw)
                    .map_err(|e| SettingError::InvalidJson(def.name.to_string(), e))?;
                if op == SetOp::Assign {
                    convert(def, &input)?
                } else {
                    combine(def, current, &input, op)?
                }
            }
        };

        self.set(def.name, next)?;
        Ok(None)
    }

    /// Run one argument of the `set` command.
    pub fn set_arg(&mut self, arg: &str) -> Result<Option<SetOutput>, SettingError> {
        let (name, op, value) = parse_arg(arg)?;

        if name == "all" {
            return match op {
                None | Some(SetOp::Query) => Ok(Some(SetOutput::Listing(self.list_current(true)))),
                Some(SetOp::Reset) => {
                    self.reset_all();
                    Ok(None)
                }
                Some(_) => Err(SettingError::ReservedAll(arg.to_string())),
            };
        }

        match op {
            Some(op) => self.apply(name, value, op),
            None => self.bare(name),
        }
    }

    fn bare(&mut self, name: &str) -> Result<Option<SetOutput>, SettingError> {
        if let Some(def) = self.def(name) {
            let op = if def.kind == SettingKind::Bool {
                SetOp::Enable
            } else {
                SetOp::Query
            };
            return self.apply(name, "", op);
        }
        for (prefix, op) in [("inv", SetOp::Invert), ("no", SetOp::Disable)] {
            if let Some(base) = name.strip_prefix(prefix) {
                if self.def(base).is_some() {
                    return self.apply(base, "", op);
                }
            }
        }
        Err(SettingError::Unknown(name.to_string()))
    }

    pub fn reset(&mut self, name: &str) -> Result<(), SettingError> {
        self.apply(name, "", SetOp::Reset).map(|_| ())
    }

    /// Restore every default, running hooks for the ones that change.
    pub fn reset_all(&mut self) {
        for def in SETTINGS {
            let default = SettingValue::from_default(def.kind, def.default);
            if self.values.get(def.name) != Some(&default) {
                self.values.insert(def.name, default.clone());
                for (scope, hook) in self.hooks.iter_mut() {
                    if scope.covers(def.name) {
                        hook(def.name, &default);
                    }
                }
            }
        }
    }

    /// Names of the settings that differ from their default.
    pub fn changed(&self) -> Vec<&'static str> {
        SETTINGS
            .iter()
            .filter(|d| {
                self.values.get(d.name) != Some(&SettingValue::from_default(d.kind, d.default))
            })
            .map(|d| d.name)
            .collect()
    }

    /// Settings as `set` arguments, one per line; `full` includes defaults.
    pub fn list_current(&self, full: bool) -> String {
        let names: Vec<&'static str> = if full {
            SETTINGS.iter().map(|d| d.name).collect()
        } else {
            self.changed()
        };
        names
            .iter()
            .filter_map(|name| self.values.get(name).map(|v| render(name, v)))
            .flatten()
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// JSON object of every current value.
    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.values)
    }

    /// Completion candidates for `set` arguments.
    pub fn suggestion_list(&self) -> Vec<String> {
        let mut list = vec!["all".to_string(), "all&".to_string(), "all?".to_string()];
        for def in SETTINGS {
            let name = def.name;
            list.push(name.to_string());
            match def.kind {
                SettingKind::Bool => {
                    list.extend([
                        format!("{}!", name),
                        format!("no{}", name),
                        format!("inv{}", name),
                    ])
                }
                SettingKind::Enum => {
                    list.push(format!("{}!", name));
                    list.extend(def.options.iter().map(|o| format!("{}={}", name, o)));
                }
                _ => {
                    list.push(format!("{}={}", name, def.default));
                    list.extend([format!("{}+=", name), format!("{}-=", name)]);
                    if def.kind != SettingKind::Map {
                        list.push(format!("{}^=", name));
                    }
                }
            }
            list.extend([format!("{}&", name), format!("{}?", name)]);
        }
        list
    }
}

fn map_from(
    def: &SettingDef,
    input: &SettingInput,
) -> Result<BTreeMap<String, String>, SettingError> {
    let mut map = BTreeMap::new();
    for (key, value) in input.pairs() {
        let value = value.ok_or_else(|| {
            SettingError::Invalid(
                def.name.to_string(),
                format!(
                    "{}: {}",
                    gettext("Entries must have a ~ to separate the key from the value"),
                    key
                ),
            )
        })?;
        if map.insert(key.clone(), value).is_some() {
            return Err(SettingError::Invalid(
                def.name.to_string(),
                format!("{}: {}", gettext("A key must be defined only once"), key),
            ));
        }
    }
    Ok(map)
}

/// Build the replacement value for `=`.
fn convert(def: &SettingDef, input: &SettingInput) -> Result<SettingValue, SettingError> {
    let wrong = |expected: &str| {
        SettingError::WrongType(
            def.name.to_string(),
            expected.to_string(),
            input.type_name().to_string(),
        )
    };
    match def.kind {
        SettingKind::Bool => match input.text() {
            Some("true") => Ok(SettingValue::Bool(true)),
            Some("false") => Ok(SettingValue::Bool(false)),
            _ => Err(wrong("boolean")),
        },
        SettingKind::Number => input
            .text()
            .and_then(|t| t.trim().parse().ok())
            .map(SettingValue::Number)
            .ok_or_else(|| wrong("number")),
        SettingKind::String | SettingKind::Enum => input
            .text()
            .map(|t| SettingValue::String(t.to_string()))
            .ok_or_else(|| wrong("string")),
        SettingKind::List => Ok(SettingValue::List(input.entries())),
        SettingKind::Map => map_from(def, input).map(SettingValue::Map),
    }
}

/// Build the new value for `+=`, `-=` and `^=`.
fn combine(
    def: &SettingDef,
    current: SettingValue,
    input: &SettingInput,
    op: SetOp,
) -> Result<SettingValue, SettingError> {
    let number = || {
        input
            .text()
            .and_then(|t| t.trim().parse::<i64>().ok())
            .ok_or_else(|| {
                SettingError::WrongType(
                    def.name.to_string(),
                    "number".to_string(),
                    input.type_name().to_string(),
                )
            })
    };

    let value = match (current, op) {
        (SettingValue::List(mut list), SetOp::Append) => {
            for entry in input.entries() {
                if !list.contains(&entry) {
                    list.push(entry);
                }
            }
            SettingValue::List(list)
        }
        (SettingValue::List(mut list), SetOp::Remove) => {
            for entry in input.entries() {
                if list.contains(&entry) {
                    list.retain(|e| *e != entry);
                } else {
                    list.retain(|e| e.split('~').next() != Some(entry.as_str()));
                }
            }
            SettingValue::List(list)
        }
        (SettingValue::List(list), SetOp::Prepend) => {
            let mut front: Vec<String> = Vec::new();
            for entry in input.entries() {
                if !front.contains(&entry) {
                    front.push(entry);
                }
            }
            let rest: Vec<String> = list.into_iter().filter(|e| !front.contains(e)).collect();
            front.extend(rest);
            SettingValue::List(front)
        }
        (SettingValue::Map(mut map), SetOp::Append) => {
            map.extend(map_from(def, input)?);
            SettingValue::Map(map)
        }
        (SettingValue::Map(mut map), SetOp::Remove) => {
            for entry in input.entries() {
                let key = entry.split('~').next().unwrap_or_default();
                map.remove(key);
            }
            SettingValue::Map(map)
        }
        (SettingValue::Number(n), SetOp::Append) => {
            SettingValue::Number(n.saturating_add(number()?))
        }
        (SettingValue::Number(n), SetOp::Remove) => {
            SettingValue::Number(n.saturating_sub(number()?))
        }
        (SettingValue::Number(n), SetOp::Prepend) => {
            SettingValue::Number(n.saturating_mul(number()?))
        }
        (SettingValue::String(s), op) if def.kind == SettingKind::String => {
            let text = input.text().ok_or_else(|| {
                SettingError::WrongType(
                    def.name.to_string(),
                    "string".to_string(),
                    input.type_name().to_string(),
                )
            })?;
            match op {
                SetOp::Append => SettingValue::String(s + text),
                SetOp::Remove => SettingValue::String(s.replacen(text, "", 1)),
                _ => SettingValue::String(format!("{}{}", text, s)),
            }
        }
        _ => {
            return Err(SettingError::Unsupported(
                def.name.to_string(),
                op.symbol().to_string(),
            ))
        }
    };
    Ok(value)
}
