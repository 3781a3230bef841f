//! Slash-delimited path parsing and serialization.
//!
//! Paths address entries in a config tree: `a/b/c` is relative to the
//! current scope, `/a/b` is relative to the root, `.` is a no-op and `..`
//! moves up one level.

/// One parsed path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Component {
    /// Leading root marker (the path began with a separator).
    Root,
    /// A `..` that had nothing left to pop. Only appears at the front of a
    /// relative path; resolvers treat it as "move to the parent scope".
    Parent,
    /// A key name.
    Name(String),
}

impl Component {
    /// The key name, if this component is one.
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Root | Self::Parent => None,
        }
    }
}

/// Separator and special component spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSyntax<'a> {
    /// Component separator.
    pub separator: &'a str,
    /// Component meaning "this level" (dropped while parsing).
    pub current: &'a str,
    /// Component meaning "one level up".
    pub parent: &'a str,
}

impl PathSyntax<'static> {
    /// `/`, `.` and `..`.
    pub const SLASH: Self = Self {
        separator: "/",
        current: ".",
        parent: "..",
    };
}

impl Default for PathSyntax<'static> {
    fn default() -> Self {
        Self::SLASH
    }
}

/// Parse a path using the default slash syntax.
#[must_use]
pub fn parse(path: &str) -> Vec<Component> {
    parse_with(path, &PathSyntax::SLASH)
}

/// Parse a path into components.
///
/// - a leading separator yields a leading [`Component::Root`];
/// - repeated separators collapse;
/// - `current` components are dropped;
/// - `parent` components pop the previous name (no-op directly after root).
///
/// An empty path yields no components; a path made only of separators
/// yields just the root marker.
#[must_use]
pub fn parse_with(path: &str, syntax: &PathSyntax<'_>) -> Vec<Component> {
    let mut components = Vec::new();
    if path.is_empty() {
        return components;
    }
    if syntax.separator.is_empty() {
        components.push(Component::Name(path.to_owned()));
        return components;
    }

    if path.starts_with(syntax.separator) {
        components.push(Component::Root);
    }

    for part in path.split(syntax.separator) {
        if part.is_empty() || part == syntax.current {
            continue;
        }
        if part == syntax.parent {
            match components.last() {
                Some(Component::Name(_)) => {
                    components.pop();
                },
                Some(Component::Root) => {},
                Some(Component::Parent) | None => components.push(Component::Parent),
            }
            continue;
        }
        components.push(Component::Name(part.to_owned()));
    }

    components
}

/// Serialize components back into a slash path.
#[must_use]
pub fn serialize(components: &[Component], rooted: bool) -> String {
    serialize_with(components, rooted, &PathSyntax::SLASH)
}

/// Serialize components back into a path.
///
/// The result starts with a separator when `rooted` is set or when the
/// components begin with [`Component::Root`].
#[must_use]
pub fn serialize_with(components: &[Component], rooted: bool, syntax: &PathSyntax<'_>) -> String {
    let mut has_root = rooted;
    let mut parts: Vec<&str> = Vec::with_capacity(components.len());
    for component in components {
        match component {
            Component::Root => has_root = true,
            Component::Parent => parts.push(syntax.parent),
            Component::Name(name) => parts.push(name),
        }
    }

    let body = parts.join(syntax.separator);
    if has_root {
        format!("{}{body}", syntax.separator)
    } else {
        body
    }
}

/// Whether the parsed path is anchored at the root.
#[must_use]
pub fn is_rooted(components: &[Component]) -> bool {
    matches!(components.first(), Some(Component::Root))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<Component> {
        items
            .iter()
            .map(|s| Component::Name((*s).to_owned()))
            .collect()
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_parse_all_separators_is_root() {
        assert_eq!(parse("/"), vec![Component::Root]);
        assert_eq!(parse("///"), vec![Component::Root]);
    }

    #[test]
    fn test_parse_relative() {
        assert_eq!(parse("a/b/c"), names(&["a", "b", "c"]));
    }

    #[test]
    fn test_parse_rooted() {
        let mut expected = vec![Component::Root];
        expected.extend(names(&["a", "b"]));
        assert_eq!(parse("/a/b"), expected);
    }

    #[test]
    fn test_parse_collapses_and_drops_current() {
        assert_eq!(parse("a//b/./c/"), names(&["a", "b", "c"]));
    }

    #[test]
    fn test_parse_parent_pops() {
        assert_eq!(parse("a/b/../c"), names(&["a", "c"]));
        assert_eq!(parse("a/.."), Vec::<Component>::new());
    }

    #[test]
    fn test_parse_parent_at_root_is_noop() {
        let mut expected = vec![Component::Root];
        expected.extend(names(&["x"]));
        assert_eq!(parse("/../x"), expected);
    }

    #[test]
    fn test_parse_leading_parent_is_kept_for_relative_paths() {
        let mut expected = vec![Component::Parent, Component::Parent];
        expected.extend(names(&["x"]));
        assert_eq!(parse("../../x"), expected);
    }

    #[test]
    fn test_parse_custom_syntax() {
        let syntax = PathSyntax {
            separator: ".",
            current: "@",
            parent: "^",
        };
        assert_eq!(parse_with("a.@.b.^.c", &syntax), names(&["a", "c"]));
        assert_eq!(parse_with(".a", &syntax)[0], Component::Root);
    }

    #[test]
    fn test_serialize() {
        assert_eq!(serialize(&names(&["a", "b"]), false), "a/b");
        assert_eq!(serialize(&names(&["a", "b"]), true), "/a/b");
        assert_eq!(serialize(&[Component::Root], false), "/");
        assert_eq!(serialize(&[], false), "");
    }

    #[test]
    fn test_serialize_normalises() {
        let parsed = parse("a//b/./c/../d");
        assert_eq!(serialize(&parsed, false), "a/b/d");

        let parsed = parse("/a/../../b");
        assert_eq!(serialize(&parsed, false), "/b");

        let parsed = parse("../x");
        assert_eq!(serialize(&parsed, false), "../x");
    }

    #[test]
    fn test_is_rooted() {
        assert!(is_rooted(&parse("/a")));
        assert!(!is_rooted(&parse("a")));
    }
}
