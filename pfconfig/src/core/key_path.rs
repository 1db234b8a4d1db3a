//! Colon-delimited key paths into a [`ConfigTree`].

use std::fmt;

use serde_json::Value;

use crate::core::types::ConfigTree;

/// Separator between path segments.
pub const SEPARATOR: char = ':';

/// An ordered list of lookup keys, e.g. `interfaces:wan:ipaddr`.
///
/// The empty path has no segments and resolves to the whole tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::default();
        }
        Self {
            segments: raw.split(SEPARATOR).map(str::to_string).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Walk `tree` one segment at a time.
    ///
    /// Objects are indexed by key and arrays by decimal index. The first
    /// segment that does not match yields `None`; partial matches are never
    /// returned.
    pub fn resolve<'a>(&self, tree: &'a ConfigTree) -> Option<&'a ConfigTree> {
        self.segments
            .iter()
            .try_fold(tree, |node, segment| descend(node, segment))
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join(":"))
    }
}

fn descend<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get(index)),
        _ => None,
    }
}

/// Resolve an optional raw path against `tree`, cloning the matched subtree.
pub fn resolve_path(tree: ConfigTree, raw: Option<&str>) -> Option<ConfigTree> {
    let path = match raw {
        Some(raw) => KeyPath::parse(raw),
        None => return Some(tree),
    };
    if path.is_empty() {
        return Some(tree);
    }
    path.resolve(&tree).cloned()
}
