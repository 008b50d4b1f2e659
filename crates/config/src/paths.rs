//! Leaf path enumeration and environment-name matching.

use crate::tree::{ConfigTree, join_path};
use std::collections::BTreeMap;

/// Separator used in environment variable names in place of `.`.
pub const ENV_NAME_SEPARATOR: char = '_';

/// Every leaf path of `tree`, sorted.
///
/// Lists count as leaves; tables are walked. An empty table yields no path.
pub fn enumerate_paths(tree: &ConfigTree) -> Vec<String> {
    let mut paths = Vec::new();
    collect(tree, "", &mut paths);
    paths.sort();
    paths
}

fn collect(node: &ConfigTree, prefix: &str, out: &mut Vec<String>) {
    match node {
        ConfigTree::Table(entries) => {
            for (key, child) in entries {
                collect(child, &join_path(prefix, key), out);
            }
        },
        ConfigTree::List(_) | ConfigTree::Scalar(_) => {
            if !prefix.is_empty() {
                out.push(prefix.to_owned());
            }
        },
    }
}

/// Candidate dotted path for an environment variable name.
pub fn env_name_to_path(name: &str) -> String {
    name.replace(ENV_NAME_SEPARATOR, ".")
}

/// True when no alphabetic character of `key` is lowercase.
///
/// Digits, separators and punctuation do not affect the result, so `"123"`
/// counts as all-upper.
pub fn is_all_upper_case(key: &str) -> bool {
    key.chars()
        .filter(|ch| ch.is_alphabetic())
        .all(char::is_uppercase)
}

/// Two canonical paths that fold to the same upper-cased key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathCollision {
    /// Upper-cased key both paths share.
    pub upper: String,
    /// Path that lost (earlier in sorted order).
    pub shadowed: String,
    /// Path the key now resolves to.
    pub winner: String,
}

/// Case-insensitive lookup from environment-derived paths to canonical paths.
#[derive(Debug, Clone, Default)]
pub struct PathIndex {
    canonical: Vec<String>,
    by_upper: BTreeMap<String, String>,
    collisions: Vec<PathCollision>,
}

impl PathIndex {
    /// Index the given canonical paths.
    ///
    /// When two paths fold to the same upper-cased key, the later one in the
    /// input order wins and the collision is recorded.
    pub fn build(paths: &[String]) -> Self {
        let mut by_upper: BTreeMap<String, String> = BTreeMap::new();
        let mut collisions = Vec::new();
        for path in paths {
            let upper = path.to_uppercase();
            if let Some(shadowed) = by_upper.insert(upper.clone(), path.clone()) {
                if shadowed != *path {
                    tracing::warn!(
                        key = %upper,
                        shadowed = %shadowed,
                        winner = %path,
                        "configuration paths differ only by case"
                    );
                    collisions.push(PathCollision {
                        upper,
                        shadowed,
                        winner: path.clone(),
                    });
                }
            }
        }
        Self {
            canonical: paths.to_vec(),
            by_upper,
            collisions,
        }
    }

    /// Canonical path for a candidate derived from an environment name.
    ///
    /// All-upper candidates match case-insensitively; anything else must
    /// match a canonical path exactly.
    pub fn resolve(&self, candidate: &str) -> Option<&str> {
        if is_all_upper_case(candidate) {
            self.by_upper.get(candidate).map(String::as_str)
        } else {
            self.canonical
                .iter()
                .find(|path| path.as_str() == candidate)
                .map(String::as_str)
        }
    }

    /// Case collisions found while building.
    pub fn collisions(&self) -> &[PathCollision] {
        &self.collisions
    }

    /// Number of indexed canonical paths.
    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    /// True when nothing was indexed.
    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Scalar;
    use std::collections::BTreeMap;

    fn leaf() -> ConfigTree {
        ConfigTree::Scalar(Scalar::Bool(true))
    }

    fn table(entries: Vec<(&str, ConfigTree)>) -> ConfigTree {
        ConfigTree::Table(
            entries
                .into_iter()
                .map(|(key, value)| (key.to_owned(), value))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    fn owned(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|path| (*path).to_owned()).collect()
    }

    #[test]
    fn enumerates_leaves_and_lists_only() {
        let tree = table(vec![
            ("Service", table(vec![("Host", leaf()), ("Port", leaf())])),
            ("Tags", ConfigTree::List(vec![leaf()])),
            ("Empty", table(vec![])),
            ("Writable", table(vec![("LogLevel", leaf())])),
        ]);
        assert_eq!(
            enumerate_paths(&tree),
            owned(&["Service.Host", "Service.Port", "Tags", "Writable.LogLevel"])
        );
    }

    #[test]
    fn upper_case_detection_ignores_non_letters() {
        assert!(is_all_upper_case("SERVICE.PORT"));
        assert!(is_all_upper_case("123"));
        assert!(is_all_upper_case(""));
        assert!(!is_all_upper_case("Service.Port"));
        assert!(!is_all_upper_case("SERVICE.port"));
    }

    #[test]
    fn underscores_become_dots() {
        assert_eq!(env_name_to_path("SERVICE_PORT"), "SERVICE.PORT");
        assert_eq!(env_name_to_path("Service_Port"), "Service.Port");
        assert_eq!(env_name_to_path("__"), "..");
    }

    #[test]
    fn upper_candidates_match_case_insensitively() {
        let index = PathIndex::build(&owned(&["Service.Host", "Service.Port"]));
        assert_eq!(index.resolve("SERVICE.PORT"), Some("Service.Port"));
        assert_eq!(index.resolve("SERVICE.TIMEOUT"), None);
    }

    #[test]
    fn mixed_case_candidates_need_exact_match() {
        let index = PathIndex::build(&owned(&["Service.Port"]));
        assert_eq!(index.resolve("Service.Port"), Some("Service.Port"));
        assert_eq!(index.resolve("service.Port"), None);
        assert_eq!(index.resolve("service.port"), None);
    }

    #[test]
    fn collisions_resolve_to_the_later_path() {
        let index = PathIndex::build(&owned(&["Service.PORT", "Service.Port"]));
        assert_eq!(index.resolve("SERVICE.PORT"), Some("Service.Port"));
        assert_eq!(index.len(), 2);
        assert_eq!(
            index.collisions(),
            &[PathCollision {
                upper: "SERVICE.PORT".to_owned(),
                shadowed: "Service.PORT".to_owned(),
                winner: "Service.Port".to_owned(),
            }]
        );
    }
}
