//! Values stored in a config tree.

use std::fmt;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::node::Node;

/// A config value: a primitive, a nested node, or a sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// UTF-8 string. May embed `${...}` macros or secret markers.
    String(String),
    /// Signed 64-bit integer.
    Integer(i64),
    /// 64-bit float.
    Float(f64),
    /// Boolean.
    Boolean(bool),
    /// Nested mapping.
    Node(Node),
    /// Sequence of primitives and nodes.
    List(Vec<Value>),
}

impl Value {
    /// Whether this is a string, integer, float or boolean.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Self::Node(_) | Self::List(_))
    }

    /// Short type name used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Boolean(_) => "boolean",
            Self::Node(_) => "node",
            Self::List(_) => "list",
        }
    }

    /// Borrow the string contents.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The integer, if this is one.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// The float, if this is one.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// The boolean, if this is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow the nested node.
    #[must_use]
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Mutably borrow the nested node.
    pub fn as_node_mut(&mut self) -> Option<&mut Node> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Borrow the sequence.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Canonical float text: shortest round-trip form, always distinguishable
/// from an integer (`1.0`, `0.25`, `1e20`).
pub(crate) fn canonical_float(f: f64) -> String {
    format!("{f:?}")
}

/// Canonical stringification. Primitives render the way they are
/// substituted into macros; containers render as compact JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => f.write_str(&canonical_float(*x)),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Node(_) | Self::List(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::String(s) => serializer.serialize_str(s),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Node(node) => node.serialize(serializer),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            },
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Self::Node(node)
    }
}

/// Attaching a borrowed node always deep-copies it, so a node owned by
/// another tree is never shared.
impl From<&Node> for Value {
    fn from(node: &Node) -> Self {
        Self::Node(node.clone())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_stringification() {
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::from(-7_i64).to_string(), "-7");
        assert_eq!(Value::from(1.0).to_string(), "1.0");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from("abc").to_string(), "abc");
    }

    #[test]
    fn test_canonical_float_round_trips() {
        for f in [0.1, 1.0, 1e20, -3.75, 1e-7] {
            let text = canonical_float(f);
            assert_eq!(text.parse::<f64>().unwrap(), f);
        }
    }

    #[test]
    fn test_is_primitive() {
        assert!(Value::from("x").is_primitive());
        assert!(Value::from(1).is_primitive());
        assert!(!Value::from(Node::new()).is_primitive());
        assert!(!Value::List(vec![]).is_primitive());
    }

    #[test]
    fn test_container_display_is_json() {
        let mut node = Node::new();
        node.set("a", 1);
        assert_eq!(Value::from(node).to_string(), r#"{"a":1}"#);
    }
}
