use std::fmt;

use crate::path::{self, Component, PathSyntax, serialize_with};

/// A position in a config tree, expressed as the key path from the root.
///
/// A scope is the tree's parent link: its parent is the same path with the
/// last key dropped, and the root is the empty path. It holds no reference
/// into the tree, so it stays valid across clones and merges of the tree
/// it was taken from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Scope {
    keys: Vec<String>,
}

impl Scope {
    /// The root scope.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a scope from keys, outermost first.
    #[must_use]
    pub fn from_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether this is the root scope.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys from the root, outermost first.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Number of keys below the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.keys.len()
    }

    /// The enclosing scope, or `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Scope> {
        let (_, rest) = self.keys.split_last()?;
        Some(Self {
            keys: rest.to_vec(),
        })
    }

    /// The scope of the child `key`.
    #[must_use]
    pub fn child(&self, key: &str) -> Scope {
        let mut keys = self.keys.clone();
        keys.push(key.to_owned());
        Self { keys }
    }

    /// Parse a slash path into a scope from the root.
    #[must_use]
    pub fn from_path(path: &str) -> Scope {
        Self::root().join(path)
    }

    /// The scope `path` addresses relative to this one. A leading `/`
    /// starts from the root and `..` above the root stays at the root.
    #[must_use]
    pub fn join(&self, path: &str) -> Scope {
        let mut scope = self.clone();
        for component in path::parse(path) {
            match component {
                Component::Root => scope = Self::root(),
                Component::Parent => {
                    scope.keys.pop();
                },
                Component::Name(name) => scope.keys.push(name),
            }
        }
        scope
    }

    /// This scope followed by each of its ancestors up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = Scope> {
        std::iter::successors(Some(self.clone()), Scope::parent)
    }

    /// Relative slash path (`a/b`, empty at the root).
    #[must_use]
    pub fn path(&self) -> String {
        self.path_with("/", false)
    }

    /// The path from the root using `separator`, with a leading separator
    /// when `rooted` is set.
    #[must_use]
    pub fn path_with(&self, separator: &str, rooted: bool) -> String {
        let syntax = PathSyntax {
            separator,
            ..PathSyntax::SLASH
        };
        let components: Vec<Component> = self
            .keys
            .iter()
            .map(|k| Component::Name(k.clone()))
            .collect();
        serialize_with(&components, rooted, &syntax)
    }
}

/// Rooted slash path, `/` for the root.
impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path_with("/", true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_has_no_parent() {
        assert!(Scope::root().parent().is_none());
        assert!(Scope::root().is_root());
    }

    #[test]
    fn test_child_and_parent() {
        let scope = Scope::root().child("a").child("b");
        assert_eq!(scope.depth(), 2);
        assert_eq!(scope.parent(), Some(Scope::from_keys(["a"])));
    }

    #[test]
    fn test_paths() {
        let scope = Scope::from_keys(["a", "b"]);
        assert_eq!(scope.path(), "a/b");
        assert_eq!(scope.path_with(".", false), "a.b");
        assert_eq!(scope.path_with("/", true), "/a/b");
        assert_eq!(scope.to_string(), "/a/b");
        assert_eq!(Scope::root().to_string(), "/");
    }

    #[test]
    fn test_from_path_and_join() {
        assert_eq!(Scope::from_path("/a/b/"), Scope::from_keys(["a", "b"]));
        assert_eq!(Scope::from_path(""), Scope::root());

        let scope = Scope::from_keys(["a", "b"]);
        assert_eq!(scope.join("../c"), Scope::from_keys(["a", "c"]));
        assert_eq!(scope.join("/x"), Scope::from_keys(["x"]));
        assert_eq!(scope.join("../../.."), Scope::root());
    }

    #[test]
    fn test_ancestors_end_at_root() {
        let chain: Vec<String> = Scope::from_keys(["a", "b"])
            .ancestors()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(chain, vec!["/a/b", "/a", "/"]);
    }
}
