//! Upspin path names
//!
//! A path name is a user name followed by slash-separated elements, as in
//! `ann@example.com/dir/file`. Parsing cleans the element list so that
//! prefix relationships are decided on elements rather than on text.

use crate::error::NamespaceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Glob metacharacters recognised in a single path element.
const GLOB_META: [char; 4] = ['*', '?', '[', '\\'];

/// A path name as text. Not necessarily clean; see [`PathName::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathName(String);

impl PathName {
    pub fn new(name: impl Into<String>) -> Self {
        PathName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn parse(&self) -> Result<ParsedPath, NamespaceError> {
        ParsedPath::parse(self)
    }

    /// Final element of the textual name, or "" for a root.
    pub fn base(&self) -> &str {
        match self.0.split_once('/') {
            Some((_, rest)) => rest.rsplit('/').next().unwrap_or(""),
            None => "",
        }
    }

    /// Join an element onto this name. The result is cleaned when the name
    /// parses; otherwise the texts are joined as they are.
    pub fn join(&self, elem: &str) -> PathName {
        match self.parse() {
            Ok(parsed) => parsed.join(elem).path(),
            Err(_) => PathName(format!("{}/{}", self.0.trim_end_matches('/'), elem)),
        }
    }
}

impl fmt::Display for PathName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PathName {
    fn from(s: &str) -> Self {
        PathName(s.to_string())
    }
}

impl From<String> for PathName {
    fn from(s: String) -> Self {
        PathName(s)
    }
}

impl AsRef<str> for PathName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A user name of the form `local@domain`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    pub fn new(name: impl Into<String>) -> Self {
        UserName(name.into())
    }

    /// Validate and wrap a user name.
    pub fn parse(name: &str) -> Result<Self, NamespaceError> {
        let mut parts = name.split('@');
        let valid = match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(domain), None) => {
                !local.is_empty() && !domain.is_empty() && !name.contains(char::is_whitespace)
            }
            _ => false,
        };
        if !valid {
            return Err(NamespaceError::invalid(
                &PathName::from(name),
                "invalid user name",
            ));
        }
        Ok(UserName(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Root of this user's tree, `user@domain/`.
    pub fn root(&self) -> PathName {
        PathName(format!("{}/", self.0))
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A cleaned path: a user name and an ordered list of elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedPath {
    user: UserName,
    elems: Vec<String>,
}

impl ParsedPath {
    /// Parse and clean a path name. Empty and `.` elements are dropped and
    /// `..` removes the preceding element; it never climbs above the root.
    pub fn parse(name: &PathName) -> Result<Self, NamespaceError> {
        let (user, rest) = match name.as_str().split_once('/') {
            Some((user, rest)) => (user, rest),
            None => (name.as_str(), ""),
        };
        let user = UserName::parse(user)
            .map_err(|_| NamespaceError::invalid(name, "invalid user name"))?;
        let mut elems: Vec<String> = Vec::new();
        push_cleaned(&mut elems, rest);
        Ok(ParsedPath { user, elems })
    }

    pub fn root(user: UserName) -> Self {
        ParsedPath {
            user,
            elems: Vec::new(),
        }
    }

    pub fn user(&self) -> &UserName {
        &self.user
    }

    pub fn n_elem(&self) -> usize {
        self.elems.len()
    }

    pub fn elem(&self, i: usize) -> &str {
        &self.elems[i]
    }

    pub fn elems(&self) -> &[String] {
        &self.elems
    }

    pub fn is_root(&self) -> bool {
        self.elems.is_empty()
    }

    /// The path made of the user and the first `n` elements.
    pub fn first(&self, n: usize) -> ParsedPath {
        ParsedPath {
            user: self.user.clone(),
            elems: self.elems[..n.min(self.elems.len())].to_vec(),
        }
    }

    /// Reports whether `prefix` names this path or one of its ancestors.
    pub fn has_prefix(&self, prefix: &ParsedPath) -> bool {
        self.user == prefix.user
            && prefix.elems.len() <= self.elems.len()
            && self.elems[..prefix.elems.len()] == prefix.elems[..]
    }

    pub fn parent(&self) -> Option<ParsedPath> {
        if self.is_root() {
            return None;
        }
        Some(self.first(self.elems.len() - 1))
    }

    pub fn last_element(&self) -> Option<&str> {
        self.elems.last().map(String::as_str)
    }

    /// Append `elem`, which may itself contain slashes; the result is clean.
    pub fn join(&self, elem: &str) -> ParsedPath {
        let mut elems = self.elems.clone();
        push_cleaned(&mut elems, elem);
        ParsedPath {
            user: self.user.clone(),
            elems,
        }
    }

    pub fn path(&self) -> PathName {
        PathName(self.to_string())
    }
}

impl fmt::Display for ParsedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user, self.elems.join("/"))
    }
}

fn push_cleaned(elems: &mut Vec<String>, rest: &str) {
    for elem in rest.split('/') {
        match elem {
            "" | "." => {}
            ".." => {
                elems.pop();
            }
            other => elems.push(other.to_string()),
        }
    }
}

/// Escape glob metacharacters so that `name` matches only itself.
pub fn quote_glob(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if GLOB_META.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Remove the escapes added by [`quote_glob`].
pub fn unquote_glob(elem: &str) -> String {
    let mut out = String::with_capacity(elem.len());
    let mut chars = elem.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Reports whether `elem` contains an unescaped glob metacharacter.
pub fn has_glob_meta(elem: &str) -> bool {
    let mut chars = elem.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '*' | '?' | '[' => return true,
            _ => {}
        }
    }
    false
}

/// Pattern matching every entry directly inside `dir`.
pub fn all_files_glob(dir: &PathName) -> String {
    format!("{}/*", quote_glob(dir.as_str()).trim_end_matches('/'))
}

/// Match a single path element against a glob pattern element.
///
/// `*` matches any run of characters, `?` a single character, and
/// `[...]` a character class (`^` or `!` negates, `a-z` ranges). A backslash
/// escapes the next character.
pub fn match_element(pattern: &str, name: &str) -> Result<bool, NamespaceError> {
    let p: Vec<char> = pattern.chars().collect();
    let n: Vec<char> = name.chars().collect();
    match_chars(&p, &n).ok_or_else(|| {
        NamespaceError::invalid(&PathName::from(pattern), "syntax error in pattern")
    })
}

fn match_chars(p: &[char], n: &[char]) -> Option<bool> {
    let (mut pi, mut ni) = (0, 0);
    // Position of the most recent star and the name index it currently covers.
    let mut star: Option<(usize, usize)> = None;
    while ni < n.len() {
        let advanced = if pi < p.len() {
            match p[pi] {
                '*' => {
                    star = Some((pi, ni));
                    pi += 1;
                    continue;
                }
                '?' => {
                    pi += 1;
                    true
                }
                '[' => {
                    let (matched, next) = match_class(p, pi, n[ni])?;
                    if matched {
                        pi = next;
                    }
                    matched
                }
                '\\' => {
                    let escaped = *p.get(pi + 1)?;
                    if escaped == n[ni] {
                        pi += 2;
                    }
                    escaped == n[ni]
                }
                c => {
                    if c == n[ni] {
                        pi += 1;
                    }
                    c == n[ni]
                }
            }
        } else {
            false
        };
        if advanced {
            ni += 1;
            continue;
        }
        match star {
            Some((sp, sn)) => {
                pi = sp + 1;
                ni = sn + 1;
                star = Some((sp, sn + 1));
            }
            None => return Some(false),
        }
    }
    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    Some(pi == p.len())
}

/// Match `c` against the class starting at `p[start] == '['`. Returns the
/// outcome and the index just past the closing bracket, or None when the
/// class is not terminated.
fn match_class(p: &[char], start: usize, c: char) -> Option<(bool, usize)> {
    let mut i = start + 1;
    let negate = matches!(p.get(i), Some('^') | Some('!'));
    if negate {
        i += 1;
    }
    let mut matched = false;
    let mut first = true;
    loop {
        let mut lo = *p.get(i)?;
        if lo == ']' && !first {
            return Some((matched != negate, i + 1));
        }
        first = false;
        if lo == '\\' {
            i += 1;
            lo = *p.get(i)?;
        }
        i += 1;
        let mut hi = lo;
        if p.get(i) == Some(&'-') && p.get(i + 1).is_some_and(|&ch| ch != ']') {
            hi = p[i + 1];
            i += 2;
            if hi == '\\' {
                hi = *p.get(i)?;
                i += 1;
            }
        }
        if lo <= c && c <= hi {
            matched = true;
        }
    }
}
