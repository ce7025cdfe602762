//! Job option map.
//!
//! Options are lowercase-hyphenated names mapped to string values. They are
//! merged from the `IPP_*` process environment and from `-o "name=value ..."`
//! command-line clauses, later sources overriding earlier ones. Collection
//! values (`media-col`, `media-size`) carry a nested `{name=value ...}`
//! clause that re-parses into a sub-map.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct Options {
    map: BTreeMap<String, String>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate `IPP_*` environment pairs into options.
    ///
    /// `IPP_FOO_BAR=baz` becomes `foo-bar=baz`; everything else is ignored.
    pub fn from_env_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut options = Self::new();
        for (key, value) in pairs {
            if let Some(rest) = key.strip_prefix("IPP_") {
                if rest.is_empty() {
                    continue;
                }
                let name = rest.to_ascii_lowercase().replace('_', "-");
                options.set(&name, &value);
            }
        }
        options
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.map.insert(name.to_string(), value.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Merge a `name=value name=value ...` clause into the map.
    ///
    /// Values may be brace-delimited collections containing spaces. A token
    /// without `=` is malformed; it and everything after it in the clause is
    /// dropped silently.
    pub fn parse_clause(&mut self, clause: &str) {
        for token in split_clause(clause) {
            let Some((name, value)) = token.split_once('=') else {
                return;
            };
            if name.is_empty() {
                return;
            }
            self.set(name, value);
        }
    }

    /// Re-parse a collection-valued option (`{name=value ...}`) as a sub-map.
    ///
    /// Returns `None` when the option is absent. A value without the outer
    /// braces is parsed as a bare clause.
    pub fn collection(&self, name: &str) -> Option<Options> {
        let value = self.get(name)?;
        let inner = value
            .strip_prefix('{')
            .and_then(|v| v.strip_suffix('}'))
            .unwrap_or(value);
        let mut sub = Options::new();
        sub.parse_clause(inner);
        Some(sub)
    }
}

/// Split a clause on whitespace, keeping brace-delimited collection values
/// intact.
fn split_clause(clause: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let bytes = clause.as_bytes();
    let mut depth = 0usize;
    let mut start = None;

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'{' => {
                depth += 1;
                start.get_or_insert(i);
            }
            b'}' => {
                depth = depth.saturating_sub(1);
            }
            b' ' | b'\t' if depth == 0 => {
                if let Some(s) = start.take() {
                    tokens.push(&clause[s..i]);
                }
            }
            _ => {
                start.get_or_insert(i);
            }
        }
    }
    if let Some(s) = start {
        tokens.push(&clause[s..]);
    }
    tokens
}
