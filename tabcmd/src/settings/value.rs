//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the tabcmd project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Typed setting values and the input forms that produce them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Declared kind of a setting, fixed by the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Bool,
    Number,
    String,
    List,
    Map,
    /// A string restricted to an allow-list.
    Enum,
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SettingKind::Bool => "boolean",
            SettingKind::Number => "number",
            SettingKind::String => "string",
            SettingKind::List => "list",
            SettingKind::Map => "map",
            SettingKind::Enum => "enum",
        };
        write!(f, "{}", s)
    }
}

/// Stored value of a setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Number(i64),
    String(String),
    List(Vec<String>),
    Map(BTreeMap<String, String>),
}

impl SettingValue {
    /// Build a default from its textual form. Defaults are trusted and
    /// never validated.
    pub fn from_default(kind: SettingKind, raw: &str) -> Self {
        match kind {
            SettingKind::Bool => SettingValue::Bool(raw == "true"),
            SettingKind::Number => SettingValue::Number(raw.parse().unwrap_or(0)),
            SettingKind::String | SettingKind::Enum => SettingValue::String(raw.to_string()),
            SettingKind::List => SettingValue::List(split_entries(raw)),
            SettingKind::Map => SettingValue::Map(
                split_entries(raw)
                    .iter()
                    .map(|e| match e.split_once('~') {
                        Some((k, v)) => (k.to_string(), v.to_string()),
                        None => (e.clone(), String::new()),
                    })
                    .collect(),
            ),
        }
    }

    /// The empty value of a kind, used by `no` and `inv`.
    pub fn empty_of(kind: SettingKind) -> Option<Self> {
        match kind {
            SettingKind::Bool => Some(SettingValue::Bool(false)),
            SettingKind::Number => Some(SettingValue::Number(0)),
            SettingKind::List => Some(SettingValue::List(Vec::new())),
            SettingKind::Map => Some(SettingValue::Map(BTreeMap::new())),
            SettingKind::String | SettingKind::Enum => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            SettingValue::Bool(_) => "boolean",
            SettingValue::Number(_) => "number",
            SettingValue::String(_) => "string",
            SettingValue::List(_) => "list",
            SettingValue::Map(_) => "map",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            SettingValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            SettingValue::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            SettingValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Entries as they appear in comma separated form.
    pub fn entries(&self) -> Vec<String> {
        match self {
            SettingValue::List(l) => l.clone(),
            SettingValue::Map(m) => m.iter().map(|(k, v)| format!("{}~{}", k, v)).collect(),
            other => vec![other.to_string()],
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(b) => write!(f, "{}", b),
            SettingValue::Number(n) => write!(f, "{}", n),
            SettingValue::String(s) => write!(f, "{}", s),
            SettingValue::List(_) | SettingValue::Map(_) => {
                write!(f, "{}", self.entries().join(","))
            }
        }
    }
}

fn split_entries(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}

/// A value as typed after a settings operator.
///
/// The raw text is classified once, here, so that later stages never
/// inspect its shape again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingInput {
    /// Plain or quoted text; for lists and maps a comma separated string.
    Text(String),
    /// JSON array of strings.
    Strings(Vec<String>),
    /// JSON array of one or two element string arrays.
    Pairs(Vec<(String, Option<String>)>),
    /// JSON object with string values.
    Object(Vec<(String, String)>),
}

impl SettingInput {
    /// Classify raw text. Errors carry the JSON problem description.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        for quote in ['"', '`'] {
            if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
                return Ok(SettingInput::Text(raw[1..raw.len() - 1].to_string()));
            }
        }

        let json_shaped = (raw.starts_with('{') && raw.ends_with('}'))
            || (raw.starts_with('[') && raw.ends_with(']'));
        if !json_shaped {
            return Ok(SettingInput::Text(raw.to_string()));
        }

        match serde_json::from_str::<serde_json::Value>(raw).map_err(|e| e.to_string())? {
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| match v {
                    serde_json::Value::String(s) => Ok((k, s)),
                    _ => Err(format!("value of '{}' must be a string", k)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(SettingInput::Object),
            serde_json::Value::Array(items) => Self::from_array(items),
            _ => Err("expected an array or an object".to_string()),
        }
    }

    fn from_array(items: Vec<serde_json::Value>) -> Result<Self, String> {
        use serde_json::Value;

        if items.iter().all(Value::is_string) {
            return Ok(SettingInput::Strings(
                items
                    .into_iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ));
        }

        let mut pairs = Vec::with_capacity(items.len());
        for item in &items {
            let parts: Option<Vec<&str>> = item
                .as_array()
                .and_then(|a| a.iter().map(Value::as_str).collect());
            match parts.as_deref() {
                Some([key]) => pairs.push((key.to_string(), None)),
                Some([key, value]) => pairs.push((key.to_string(), Some(value.to_string()))),
                _ => {
                    return Err(
                        "arrays must hold strings or [key, value] string pairs".to_string()
                    )
                }
            }
        }
        Ok(SettingInput::Pairs(pairs))
    }

    /// Name of the form, used in type errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            SettingInput::Text(_) => "string",
            SettingInput::Strings(_) | SettingInput::Pairs(_) => "list",
            SettingInput::Object(_) => "map",
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            SettingInput::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Normalize to list entries, joining pairs with `~`.
    pub fn entries(&self) -> Vec<String> {
        match self {
            SettingInput::Text(t) => split_entries(t),
            SettingInput::Strings(v) => v
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            SettingInput::Pairs(v) => v
                .iter()
                .map(|(k, val)| match val {
                    Some(val) => format!("{}~{}", k, val),
                    None => k.clone(),
                })
                .collect(),
            SettingInput::Object(v) => v.iter().map(|(k, val)| format!("{}~{}", k, val)).collect(),
        }
    }

    /// Normalize to key/value pairs; a missing value means no `~` was given.
    pub fn pairs(&self) -> Vec<(String, Option<String>)> {
        match self {
            SettingInput::Pairs(v) => v.clone(),
            SettingInput::Object(v) => v
                .iter()
                .map(|(k, val)| (k.clone(), Some(val.clone())))
                .collect(),
            _ => self
                .entries()
                .into_iter()
                .map(|e| match e.split_once('~') {
                    Some((k, v)) => (k.to_string(), Some(v.to_string())),
                    None => (e, None),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(
            SettingValue::from_default(SettingKind::Bool, "true"),
            SettingValue::Bool(true)
        );
        assert_eq!(
            SettingValue::from_default(SettingKind::Number, "14"),
            SettingValue::Number(14)
        );
        assert_eq!(
            SettingValue::from_default(SettingKind::List, "a, b,,c"),
            SettingValue::List(vec!["a".into(), "b".into(), "c".into()])
        );
        let map = SettingValue::from_default(SettingKind::Map, "temp\\d+~#ff0");
        assert_eq!(map.as_map().unwrap().get("temp\\d+").unwrap(), "#ff0");
    }

    #[test]
    fn test_display() {
        let map = SettingValue::from_default(SettingKind::Map, "b~2,a~1");
        assert_eq!(map.to_string(), "a~1,b~2");
        let list = SettingValue::List(vec!["x".into(), "y".into()]);
        assert_eq!(list.to_string(), "x,y");
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(
            SettingInput::parse("plain").unwrap(),
            SettingInput::Text("plain".into())
        );
        assert_eq!(
            SettingInput::parse("\"a b\"").unwrap(),
            SettingInput::Text("a b".into())
        );
        assert_eq!(
            SettingInput::parse("`say \"hi\"`").unwrap(),
            SettingInput::Text("say \"hi\"".into())
        );
        assert_eq!(
            SettingInput::parse(r#"["a","b"]"#).unwrap(),
            SettingInput::Strings(vec!["a".into(), "b".into()])
        );
        assert_eq!(
            SettingInput::parse(r#"[["a","1"],["b"]]"#).unwrap(),
            SettingInput::Pairs(vec![("a".into(), Some("1".into())), ("b".into(), None)])
        );
        assert_eq!(
            SettingInput::parse(r#"{"a":"1"}"#).unwrap(),
            SettingInput::Object(vec![("a".into(), "1".into())])
        );
        assert_eq!(SettingInput::parse("[]").unwrap(), SettingInput::Strings(vec![]));
    }

    #[test]
    fn test_parse_rejects() {
        assert!(SettingInput::parse("{bad}").is_err());
        assert!(SettingInput::parse(r#"{"a":1}"#).is_err());
        assert!(SettingInput::parse(r#"["a",["b"]]"#).is_err());
        assert!(SettingInput::parse(r#"[["a","b","c"]]"#).is_err());
    }

    #[test]
    fn test_forms_normalize_alike() {
        let forms = [
            "a~1,b~2",
            r#"["a~1","b~2"]"#,
            r#"[["a","1"],["b","2"]]"#,
            r#"{"a":"1","b":"2"}"#,
        ];
        let expected = vec!["a~1".to_string(), "b~2".to_string()];
        for form in forms {
            let input = SettingInput::parse(form).unwrap();
            assert_eq!(input.entries(), expected, "entries of {}", form);
            assert_eq!(
                input.pairs(),
                vec![
                    ("a".to_string(), Some("1".to_string())),
                    ("b".to_string(), Some("2".to_string()))
                ],
                "pairs of {}",
                form
            );
        }
    }
}
