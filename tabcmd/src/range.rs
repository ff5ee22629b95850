//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the tabcmd project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Range resolution.
//!
//! A range selects tabs by position (`.`, `$`, `^`, `N`, with `+N`/`-N`
//! offsets), by span (`start,end`), by wildcard (`%`) or by search
//! (`flags/pattern/`). Indices are zero based positions in the target
//! list at resolution time.

use crate::error::RangeError;
use crate::host::Target;

/// Outcome of resolving a range against the current target list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeResult {
    pub tabs: Vec<usize>,
    pub valid: bool,
}

impl From<Result<Vec<usize>, RangeError>> for RangeResult {
    fn from(res: Result<Vec<usize>, RangeError>) -> Self {
        match res {
            Ok(tabs) => RangeResult { tabs, valid: true },
            Err(_) => RangeResult::default(),
        }
    }
}

/// Filters parsed from the letters before a search clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchFlags {
    pub ignore_case: bool,
    pub global: bool,
    pub audible: bool,
    pub silent: bool,
    pub suspended: bool,
    pub active: bool,
    pub pinned: bool,
    pub unpinned: bool,
    pub title_only: bool,
    pub url_only: bool,
}

impl SearchFlags {
    pub fn parse(flags: &str) -> Result<Self, RangeError> {
        let bad = || RangeError::BadFlags(flags.to_string());
        let mut f = SearchFlags::default();
        for c in flags.chars() {
            let slot = match c {
                'i' => &mut f.ignore_case,
                'g' => &mut f.global,
                'a' => &mut f.audible,
                's' => &mut f.silent,
                'z' => &mut f.suspended,
                'r' => &mut f.active,
                'p' => &mut f.pinned,
                'n' => &mut f.unpinned,
                't' => &mut f.title_only,
                'u' => &mut f.url_only,
                _ => return Err(bad()),
            };
            *slot = true;
        }
        if (f.pinned && f.unpinned)
            || (f.audible && f.silent)
            || (f.suspended && f.active)
            || (f.title_only && f.url_only)
        {
            return Err(bad());
        }
        Ok(f)
    }

    fn admits(&self, target: &Target) -> bool {
        !(self.audible && !target.audio
            || self.silent && target.audio
            || self.suspended && !target.suspended
            || self.active && target.suspended
            || self.pinned && !target.pinned
            || self.unpinned && target.pinned)
    }
}

/// `flags/pattern/` plus whatever follows the closing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SearchClause<'a> {
    flags: SearchFlags,
    pattern: &'a str,
    suffix: &'a str,
}

impl<'a> SearchClause<'a> {
    fn parse(text: &'a str) -> Result<Self, RangeError> {
        let (first, last) = match (text.find('/'), text.rfind('/')) {
            (Some(first), Some(last)) if first != last => (first, last),
            _ => return Err(RangeError::Unresolvable(text.to_string())),
        };
        Ok(SearchClause {
            flags: SearchFlags::parse(&text[..first])?,
            pattern: &text[first + 1..last],
            suffix: &text[last + 1..],
        })
    }

    fn matches(&self, target: &Target) -> bool {
        if !self.flags.admits(target) {
            return false;
        }
        let hit = |hay: &str| {
            if self.flags.ignore_case {
                hay.to_lowercase().contains(&self.pattern.to_lowercase())
            } else {
                hay.contains(self.pattern)
            }
        };
        if self.flags.title_only {
            hit(&target.name)
        } else if self.flags.url_only {
            hit(&target.url)
        } else {
            hit(&target.name) || hit(&target.url)
        }
    }

    /// All matching indices, in list order.
    fn all(&self, targets: &[Target]) -> Vec<usize> {
        (0..targets.len())
            .filter(|&i| self.matches(&targets[i]))
            .collect()
    }

    fn first(&self, targets: &[Target]) -> Option<usize> {
        targets.iter().position(|t| self.matches(t))
    }
}

/// Parse `(+|-)N` offsets; a bare sign means one.
fn parse_offsets(input: &str, token: &str) -> Result<i64, RangeError> {
    let bad = || RangeError::Unresolvable(token.to_string());
    let mut total: i64 = 0;
    let mut rest = input;
    while !rest.is_empty() {
        let sign = match rest.as_bytes()[0] {
            b'+' => 1,
            b'-' => -1,
            _ => return Err(bad()),
        };
        rest = &rest[1..];
        let digits = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
        let amount = if digits == 0 {
            1
        } else {
            rest[..digits].parse::<i64>().map_err(|_| bad())?
        };
        total = total.saturating_add(sign * amount);
        rest = &rest[digits..];
    }
    Ok(total)
}

/// Resolve one position token to an index.
///
/// A search token yields its first match.
fn resolve_position(
    token: &str,
    targets: &[Target],
    current: usize,
) -> Result<usize, RangeError> {
    if targets.is_empty() {
        return Err(RangeError::Unresolvable(token.to_string()));
    }
    let last = targets.len() - 1;

    let (base, offsets) = if token.contains('/') {
        let clause = SearchClause::parse(token)?;
        let found = clause
            .first(targets)
            .ok_or_else(|| RangeError::NoMatch(token.to_string()))?;
        (found as i64, clause.suffix)
    } else if let Some(rest) = token.strip_prefix('.') {
        (current as i64, rest)
    } else if let Some(rest) = token.strip_prefix('$') {
        (last as i64, rest)
    } else if let Some(rest) = token.strip_prefix('^') {
        (0, rest)
    } else {
        let digits = token.bytes().take_while(|b| b.is_ascii_digit()).count();
        if digits > 0 {
            let n = token[..digits]
                .parse::<i64>()
                .map_err(|_| RangeError::Unresolvable(token.to_string()))?;
            (n, &token[digits..])
        } else if token.is_empty() {
            (0, token)
        } else {
            (current as i64, token)
        }
    };

    let index = base.saturating_add(parse_offsets(offsets, token)?);
    Ok(index.clamp(0, last as i64) as usize)
}

/// Resolve a range string to target indices.
pub fn resolve(
    range: &str,
    targets: &[Target],
    current: usize,
) -> Result<Vec<usize>, RangeError> {
    tracing::trace!(range, count = targets.len(), current, "resolving range");

    if range == "%" {
        return Ok((0..targets.len()).collect());
    }

    if range.contains(',') {
        let parts: Vec<&str> = range.split(',').collect();
        if parts.len() > 2 {
            return Err(RangeError::TooManyCommas(range.to_string()));
        }
        if parts.iter().any(|part| part.contains('/')) {
            return Err(RangeError::SearchWithComma(range.to_string()));
        }
        let start = resolve_position(parts[0], targets, current)?;
        let end = resolve_position(parts[1], targets, current)?;
        return Ok((start..=end).collect());
    }

    if range.contains('/') {
        let clause = SearchClause::parse(range)?;
        if clause.flags.global {
            if !clause.suffix.is_empty() {
                return Err(RangeError::Unresolvable(range.to_string()));
            }
            let found = clause.all(targets);
            if found.is_empty() {
                return Err(RangeError::NoMatch(range.to_string()));
            }
            return Ok(found);
        }
    }

    Ok(vec![resolve_position(range, targets, current)?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tab(name: &str, url: &str) -> Target {
        Target {
            name: name.to_string(),
            url: url.to_string(),
            ..Default::default()
        }
    }

    fn five() -> Vec<Target> {
        vec![
            tab("Home", "https://example.com/"),
            tab("News", "https://news.example.org/"),
            tab("Mail", "https://mail.example.com/inbox"),
            tab("news archive", "https://archive.example.org/"),
            tab("Docs", "https://docs.rs/"),
        ]
    }

    #[test]
    fn test_wildcard() {
        assert_eq!(resolve("%", &five(), 2), Ok(vec![0, 1, 2, 3, 4]));
        assert_eq!(resolve("%", &[], 0), Ok(vec![]));
    }

    #[test]
    fn test_span() {
        assert_eq!(resolve("2,4", &five(), 0), Ok(vec![2, 3, 4]));
        assert_eq!(resolve(".,$", &five(), 3), Ok(vec![3, 4]));
        assert_eq!(resolve(",2", &five(), 3), Ok(vec![0, 1, 2]));
        assert_eq!(resolve("4,1", &five(), 0), Ok(vec![]));
    }

    #[test]
    fn test_too_many_commas() {
        assert_eq!(
            resolve("1,2,3", &five(), 0),
            Err(RangeError::TooManyCommas("1,2,3".into()))
        );
        let res: RangeResult = resolve("1,2,3", &five(), 0).into();
        assert_eq!(res, RangeResult { tabs: vec![], valid: false });
    }

    #[test]
    fn test_positions() {
        let t = five();
        assert_eq!(resolve(".", &t, 2), Ok(vec![2]));
        assert_eq!(resolve("$", &t, 2), Ok(vec![4]));
        assert_eq!(resolve("^", &t, 2), Ok(vec![0]));
        assert_eq!(resolve("", &t, 2), Ok(vec![0]));
        assert_eq!(resolve("3", &t, 0), Ok(vec![3]));
        assert_eq!(resolve("1+2", &t, 0), Ok(vec![3]));
        assert_eq!(resolve("3-1", &t, 0), Ok(vec![2]));
        assert_eq!(resolve(".+", &t, 1), Ok(vec![2]));
        assert_eq!(resolve("+2", &t, 1), Ok(vec![3]));
        assert_eq!(resolve("-", &t, 1), Ok(vec![0]));
        assert_eq!(resolve("$-1-1", &t, 0), Ok(vec![2]));
    }

    #[test]
    fn test_positions_clamp() {
        let t = five();
        assert_eq!(resolve("99", &t, 0), Ok(vec![4]));
        assert_eq!(resolve("0-9", &t, 0), Ok(vec![0]));
        assert_eq!(resolve("2,99", &t, 0), Ok(vec![2, 3, 4]));
    }

    #[test]
    fn test_unresolvable() {
        assert!(matches!(resolve("x", &five(), 0), Err(RangeError::Unresolvable(_))));
        assert!(matches!(resolve("1+x", &five(), 0), Err(RangeError::Unresolvable(_))));
        assert!(matches!(resolve(".", &[], 0), Err(RangeError::Unresolvable(_))));
    }

    #[test]
    fn test_search() {
        let t = five();
        assert_eq!(resolve("/news/", &t, 0), Ok(vec![1]));
        assert_eq!(resolve("g/news/", &t, 0), Ok(vec![1, 3]));
        assert_eq!(resolve("gi/NEWS/", &t, 0), Ok(vec![1, 3]));
        assert_eq!(resolve("gt/news/", &t, 0), Ok(vec![3]));
        assert_eq!(resolve("gu/example.com/", &t, 0), Ok(vec![0, 2]));
        assert_eq!(resolve("/Mail/+1", &t, 0), Ok(vec![3]));
        assert!(matches!(resolve("g/nothing/", &t, 0), Err(RangeError::NoMatch(_))));
    }

    #[test]
    fn test_search_flags() {
        let mut t = five();
        t[1].pinned = true;
        t[2].audio = true;
        t[3].suspended = true;
        assert_eq!(resolve("gp//", &t, 0), Ok(vec![1]));
        assert_eq!(resolve("gn//", &t, 0), Ok(vec![0, 2, 3, 4]));
        assert_eq!(resolve("ga//", &t, 0), Ok(vec![2]));
        assert_eq!(resolve("gz//", &t, 0), Ok(vec![3]));
        assert_eq!(resolve("gr/news/", &t, 0), Ok(vec![1]));
        assert!(matches!(resolve("gx/a/", &t, 0), Err(RangeError::BadFlags(_))));
        assert!(matches!(resolve("pn/a/", &t, 0), Err(RangeError::BadFlags(_))));
        assert!(matches!(resolve("tu/a/", &t, 0), Err(RangeError::BadFlags(_))));
    }

    #[test]
    fn test_search_with_comma() {
        let t = five();
        assert_eq!(
            resolve("1,g/news/", &t, 0),
            Err(RangeError::SearchWithComma("1,g/news/".into()))
        );
        for range in ["2,/news/", "/news/,$", "4,/x/", "/a/,/b/"] {
            assert_eq!(
                resolve(range, &t, 0),
                Err(RangeError::SearchWithComma(range.into())),
                "{}",
                range
            );
        }
        // a lone search still resolves, and its suffix offsets apply
        assert_eq!(resolve("/news/", &t, 0), Ok(vec![1]));
        assert_eq!(resolve("/news/+1", &t, 0), Ok(vec![2]));
    }

    fn position_token() -> impl Strategy<Value = String> {
        let base = prop_oneof![
            Just(String::new()),
            Just(".".to_string()),
            Just("$".to_string()),
            Just("^".to_string()),
            (0u32..40).prop_map(|n| n.to_string()),
        ];
        let offset = prop_oneof![
            Just(String::new()),
            (0u32..40).prop_map(|n| format!("+{}", n)),
            (0u32..40).prop_map(|n| format!("-{}", n)),
            Just("+".to_string()),
            Just("-".to_string()),
        ];
        (base, offset).prop_map(|(b, o)| format!("{}{}", b, o))
    }

    proptest! {
        #[test]
        fn prop_indices_in_bounds(
            count in 1usize..20,
            current in 0usize..20,
            start in position_token(),
            end in proptest::option::of(position_token()),
        ) {
            let targets: Vec<Target> = (0..count).map(|i| tab(&i.to_string(), "")).collect();
            let current = current % count;
            let range = match &end {
                Some(end) => format!("{},{}", start, end),
                None => start.clone(),
            };
            let first = resolve(&range, &targets, current);
            prop_assert_eq!(&first, &resolve(&range, &targets, current));
            if let Ok(tabs) = first {
                prop_assert!(tabs.iter().all(|&i| i < count));
            }
        }
    }
}
