//! Ordered config tree nodes.
//!
//! A [`Node`] owns its children outright: every nested node has exactly one
//! container. Navigation towards the root is done with a [`Scope`], a key
//! path from the root that borrows nothing and owns nothing.

mod merge;
mod scope;

pub use merge::MergeOutcome;
pub use scope::Scope;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::value::Value;

/// An insertion-ordered mapping of keys to [`Value`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    entries: IndexMap<String, Value>,
}

impl Node {
    /// Create an empty node.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a direct child value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Look up a direct child value, falling back to `default`.
    #[must_use]
    pub fn get_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.entries.get(key).unwrap_or(default)
    }

    /// Mutably borrow a direct child value.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// Borrow a direct child node.
    #[must_use]
    pub fn child(&self, key: &str) -> Option<&Node> {
        self.get(key).and_then(Value::as_node)
    }

    /// Set `key` to `value`, returning the previous value.
    ///
    /// The value is moved in, so the node becomes its only owner. Passing a
    /// `&Node` goes through `From<&Node>` and attaches a deep copy, leaving
    /// the tree it was borrowed from untouched. Replacing an existing key
    /// keeps its position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Remove `key`, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Mutable values in order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.entries.values_mut()
    }

    /// Number of direct entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the node has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Navigate to the node addressed by `scope`.
    #[must_use]
    pub fn at(&self, scope: &Scope) -> Option<&Node> {
        let mut current = self;
        for key in scope.keys() {
            current = current.child(key)?;
        }
        Some(current)
    }

    /// Mutably navigate to the node addressed by `scope`.
    pub fn at_mut(&mut self, scope: &Scope) -> Option<&mut Node> {
        let mut current = self;
        for key in scope.keys() {
            current = current.get_mut(key).and_then(Value::as_node_mut)?;
        }
        Some(current)
    }

    /// A copy with keys ordered alphabetically (byte-wise) at every level,
    /// descending when `reverse` is set. Nodes nested in lists are sorted
    /// too; list order itself is kept.
    #[must_use]
    pub fn sorted(&self, reverse: bool) -> Node {
        let mut entries: Vec<(&String, &Value)> = self.entries.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        if reverse {
            entries.reverse();
        }
        entries
            .into_iter()
            .map(|(key, value)| (key.clone(), sorted_value(value, reverse)))
            .collect()
    }

    /// Slash paths of every non-node leaf, depth first.
    #[must_use]
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        collect_leaf_paths(self, "", &mut paths);
        paths
    }
}

fn sorted_value(value: &Value, reverse: bool) -> Value {
    match value {
        Value::Node(node) => Value::Node(node.sorted(reverse)),
        Value::List(items) => Value::List(items.iter().map(|v| sorted_value(v, reverse)).collect()),
        other => other.clone(),
    }
}

fn collect_leaf_paths(node: &Node, prefix: &str, paths: &mut Vec<String>) {
    for (key, value) in node.iter() {
        let path = join_path(prefix, key);
        if let Value::Node(child) = value {
            collect_leaf_paths(child, &path, paths);
        } else {
            paths.push(path);
        }
    }
}

/// Join a relative slash path prefix and a key.
pub(crate) fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}/{key}")
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Node {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests;
