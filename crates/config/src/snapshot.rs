//! Point-in-time copy of the process environment.
//!
//! Every resolver in this crate reads from an [`EnvSnapshot`] instead of the
//! live environment, so a test can inject exactly the variables it needs.

use std::collections::BTreeMap;
use std::collections::btree_map;

/// Immutable environment variable map, captured once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the current process environment.
    ///
    /// Entries whose name or value is not valid UTF-8 are skipped.
    pub fn capture() -> Self {
        let mut vars = BTreeMap::new();
        for (name, value) in std::env::vars_os() {
            match (name.into_string(), value.into_string()) {
                (Ok(name), Ok(value)) => {
                    vars.insert(name, value);
                },
                (name, _) => {
                    tracing::debug!(
                        name = ?name.as_ref().map_or("<non-utf8>", String::as_str),
                        "skipping non-UTF-8 environment entry"
                    );
                },
            }
        }
        Self { vars }
    }

    /// Build a snapshot from raw `KEY=VALUE` entries.
    ///
    /// The split happens at the first `=` (values may contain `=`); entries
    /// without any `=` are discarded.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let vars = entries
            .into_iter()
            .filter_map(|entry| {
                let (name, value) = entry.as_ref().split_once('=')?;
                Some((name.to_owned(), value.to_owned()))
            })
            .collect();
        Self { vars }
    }

    /// Build a snapshot from an explicit map (useful for tests and fixtures).
    pub const fn from_map(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }

    /// Raw value of `name`, including empty values.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Value of `name` when present and non-empty.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|value| !value.is_empty())
    }

    /// First non-empty value among `names`, paired with the name that
    /// supplied it. Used for canonical-then-legacy lookups.
    pub fn first_value<'k>(&self, names: &[&'k str]) -> Option<(&'k str, &str)> {
        names
            .iter()
            .find_map(|name| self.value(name).map(|value| (*name, value)))
    }

    /// True when `name` is present, even with an empty value.
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Iterate entries in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.vars.iter()
    }

    /// Number of captured variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// True when the snapshot holds no variables.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for EnvSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a EnvSnapshot {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
