//! Secret tagging and rendering.
//!
//! Every primitive leaf loaded from a secrets source is stored as a tagged
//! marker string:
//!
//! ```text
//! U+2063 U+27EA <type>:<literal> U+27EB U+2063      e.g.  ⁣⟪int:5432⟫⁣
//! ```
//!
//! `type` is one of `str`, `int`, `float`, `bool`. The delimiters pair an
//! invisible separator with mathematical angle brackets, which do not occur
//! in ordinary config data. Markers travel through merges, clones and macro
//! expansion untouched, so a secret concatenated into a larger string stays
//! identifiable. They are only converted at the read boundary by
//! [`render`], which can reveal, obfuscate, or keep them.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::node::Node;
use crate::value::{Value, canonical_float};

/// Opening delimiter of a secret marker.
pub const SECRET_START: &str = "\u{2063}\u{27EA}";

/// Closing delimiter of a secret marker.
pub const SECRET_END: &str = "\u{27EB}\u{2063}";

/// Replacement text for an obfuscated secret.
pub const OBFUSCATED: &str = "********";

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "(?s){}(str|int|float|bool):(.*?){}",
        regex::escape(SECRET_START),
        regex::escape(SECRET_END)
    ))
    .expect("invalid regex")
});

/// How secret markers are rendered at the read boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShowMode {
    /// Leave markers in place.
    Raw,
    /// Reveal the original value, restoring its type where possible.
    Plaintext,
    /// Replace each secret with [`OBFUSCATED`].
    #[default]
    Obfuscated,
}

impl ShowMode {
    /// `Plaintext` when `show` is set, `Obfuscated` otherwise.
    #[must_use]
    pub fn from_show(show: bool) -> Self {
        if show { Self::Plaintext } else { Self::Obfuscated }
    }
}

/// Original type of a tagged primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    /// String.
    Str,
    /// Integer.
    Int,
    /// Float.
    Float,
    /// Boolean.
    Bool,
}

impl SecretKind {
    /// Tag text used inside the marker.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "str" => Some(Self::Str),
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "bool" => Some(Self::Bool),
            _ => None,
        }
    }
}

/// Wrap a literal in a marker.
#[must_use]
pub fn marker(kind: SecretKind, literal: &str) -> String {
    format!("{SECRET_START}{}:{literal}{SECRET_END}", kind.tag())
}

/// Whether `text` contains at least one marker.
#[must_use]
pub fn contains_secret(text: &str) -> bool {
    MARKER.is_match(text)
}

/// Tag a value as secret.
///
/// Primitives become marker strings; nodes and lists are tagged leaf by
/// leaf. Strings that already carry a marker are left alone, so tagging is
/// idempotent.
#[must_use]
pub fn encode(value: &Value) -> Value {
    match value {
        Value::String(s) if contains_secret(s) => value.clone(),
        Value::String(s) => Value::String(marker(SecretKind::Str, s)),
        Value::Integer(i) => Value::String(marker(SecretKind::Int, &i.to_string())),
        Value::Float(f) => Value::String(marker(SecretKind::Float, &canonical_float(*f))),
        Value::Boolean(b) => Value::String(marker(SecretKind::Bool, &b.to_string())),
        Value::Node(node) => {
            let mut node = node.clone();
            tag_node(&mut node);
            Value::Node(node)
        },
        Value::List(items) => Value::List(items.iter().map(encode).collect()),
    }
}

/// Tag every primitive leaf of `node` in place.
pub fn tag_node(node: &mut Node) {
    for value in node.values_mut() {
        match value {
            Value::Node(child) => tag_node(child),
            other => *other = encode(other),
        }
    }
}

/// Render a value for output.
#[must_use]
pub fn render(value: &Value, mode: ShowMode) -> Value {
    match (value, mode) {
        (_, ShowMode::Raw) => value.clone(),
        (Value::String(s), _) => render_str(s, mode),
        (Value::Node(node), _) => Value::Node(render_node(node, mode)),
        (Value::List(items), _) => Value::List(items.iter().map(|v| render(v, mode)).collect()),
        (other, _) => other.clone(),
    }
}

/// Render every leaf of a node for output.
#[must_use]
pub fn render_node(node: &Node, mode: ShowMode) -> Node {
    node.iter()
        .map(|(key, value)| (key, render(value, mode)))
        .collect()
}

/// Render one string.
///
/// In plaintext mode a string that is exactly one marker is converted back
/// to its tagged type, provided the literal round-trips through that type
/// unchanged (`int:007` stays the string `"007"`). Anything else renders as
/// a string with markers stripped or obfuscated in place.
#[must_use]
pub fn render_str(text: &str, mode: ShowMode) -> Value {
    if !contains_secret(text) {
        return Value::String(text.to_owned());
    }

    match mode {
        ShowMode::Raw => Value::String(text.to_owned()),
        ShowMode::Obfuscated => Value::String(MARKER.replace_all(text, OBFUSCATED).into_owned()),
        ShowMode::Plaintext => {
            if let Some(captures) = MARKER.captures(text)
                && captures.get(0).is_some_and(|m| m.len() == text.len())
            {
                return typed_literal(&captures);
            }
            Value::String(
                MARKER
                    .replace_all(text, |caps: &Captures<'_>| literal(caps).to_owned())
                    .into_owned(),
            )
        },
    }
}

fn literal<'t>(captures: &Captures<'t>) -> &'t str {
    captures.get(2).map_or("", |m| m.as_str())
}

fn typed_literal(captures: &Captures<'_>) -> Value {
    let literal = literal(captures);
    let kind = captures
        .get(1)
        .and_then(|m| SecretKind::from_tag(m.as_str()))
        .unwrap_or(SecretKind::Str);

    let typed = match kind {
        SecretKind::Str => None,
        SecretKind::Int => literal
            .parse::<i64>()
            .ok()
            .filter(|i| i.to_string() == literal)
            .map(Value::Integer),
        SecretKind::Float => literal
            .parse::<f64>()
            .ok()
            .filter(|f| canonical_float(*f) == literal)
            .map(Value::Float),
        SecretKind::Bool => match literal {
            "true" => Some(Value::Boolean(true)),
            "false" => Some(Value::Boolean(false)),
            _ => None,
        },
    };

    typed.unwrap_or_else(|| Value::String(literal.to_owned()))
}
