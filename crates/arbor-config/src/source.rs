//! Building trees from JSON, YAML and TOML sources, and back to JSON.
//!
//! Every source must be a mapping at the root. Leaves must be strings,
//! numbers or booleans; sequences may hold leaves and mappings. `null` has
//! no counterpart in the tree and is rejected, as are integers outside the
//! `i64` range. YAML mapping keys that are numbers or booleans are used in
//! their textual form.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::node::{Node, join_path};
use crate::value::Value;

/// Maximum accepted source file size (1 MiB).
pub const MAX_SOURCE_FILE_SIZE: usize = 1024 * 1024;

const STRING_SOURCE: &str = "<string>";

/// Source file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// JSON.
    Json,
    /// YAML 1.2.
    Yaml,
    /// TOML.
    Toml,
}

impl SourceFormat {
    /// Format implied by a file extension, if any.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Read at most one byte past the limit, so an oversized file is rejected
/// without being read in full.
fn read_limited(path: &Path, label: &str) -> ConfigResult<String> {
    let read_error = |source: io::Error| ConfigError::ReadError {
        path: label.to_owned(),
        source,
    };

    let limit = u64::try_from(MAX_SOURCE_FILE_SIZE)
        .unwrap_or(u64::MAX)
        .saturating_add(1);
    let mut bytes = Vec::new();
    File::open(path)
        .and_then(|file| file.take(limit).read_to_end(&mut bytes))
        .map_err(read_error)?;

    if bytes.len() > MAX_SOURCE_FILE_SIZE {
        return Err(ConfigError::InvalidSource {
            location: String::new(),
            message: format!("{label} exceeds the {MAX_SOURCE_FILE_SIZE} byte limit"),
        });
    }

    String::from_utf8(bytes).map_err(|e| read_error(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Load a tree from a file.
///
/// The format follows the extension; files with any other extension are
/// parsed as JSON, then as YAML.
///
/// # Errors
///
/// Returns [`ConfigError::ReadError`] if the file cannot be read,
/// [`ConfigError::ParseError`] if it is not valid in its format, and
/// [`ConfigError::InvalidSource`] if it is larger than
/// [`MAX_SOURCE_FILE_SIZE`] or its content cannot form a tree.
pub fn load_file(path: impl AsRef<Path>) -> ConfigResult<Node> {
    let path = path.as_ref();
    let label = path.display().to_string();

    let content = read_limited(path, &label)?;

    let node = match SourceFormat::from_path(path) {
        Some(format) => parse(&content, format, &label)?,
        None => match parse(&content, SourceFormat::Json, &label) {
            Ok(node) => node,
            Err(ConfigError::ParseError { .. }) => parse(&content, SourceFormat::Yaml, &label)?,
            Err(e) => return Err(e),
        },
    };

    debug!(path = %label, keys = node.len(), "Loaded config source");
    Ok(node)
}

fn parse(content: &str, format: SourceFormat, label: &str) -> ConfigResult<Node> {
    let parse_error = |message: String| ConfigError::ParseError {
        path: label.to_owned(),
        message,
    };

    match format {
        SourceFormat::Json => {
            let value = serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?;
            Node::from_json(value)
        },
        SourceFormat::Yaml => {
            let value = serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
            node_from_yaml(value)
        },
        SourceFormat::Toml => {
            let table: toml::Table = toml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
            toml_table(table, "")
        },
    }
}

impl Node {
    /// Build a tree from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSource`] if `json` is not an object or
    /// contains `null` or an out-of-range integer.
    pub fn from_json(json: serde_json::Value) -> ConfigResult<Self> {
        match json {
            serde_json::Value::Object(map) => json_object(map, ""),
            other => Err(invalid("", format!("root must be a mapping, found {}", json_type(&other)))),
        }
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] for malformed JSON, otherwise as
    /// [`Node::from_json`].
    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        parse(text, SourceFormat::Json, STRING_SOURCE)
    }

    /// Parse a YAML document. An empty document is an empty tree.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] for malformed YAML and
    /// [`ConfigError::InvalidSource`] for content that cannot form a tree.
    pub fn from_yaml_str(text: &str) -> ConfigResult<Self> {
        parse(text, SourceFormat::Yaml, STRING_SOURCE)
    }

    /// Parse a TOML document. Datetimes become strings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] for malformed TOML.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        parse(text, SourceFormat::Toml, STRING_SOURCE)
    }

    /// The tree as a JSON object, in key order.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.iter()
                .map(|(key, value)| (key.to_owned(), value.to_json()))
                .collect(),
        )
    }
}

impl Value {
    /// The value as JSON. Non-finite floats become `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Integer(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Boolean(b) => serde_json::Value::Bool(*b),
            Self::Node(node) => node.to_json(),
            Self::List(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }
}

fn invalid(location: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidSource {
        location: location.to_owned(),
        message: message.into(),
    }
}

fn null_error(location: &str) -> ConfigError {
    invalid(location, "null values are not supported")
}

fn int_range_error(location: &str, n: impl std::fmt::Display) -> ConfigError {
    invalid(location, format!("integer {n} does not fit in 64 signed bits"))
}

// JSON

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "sequence",
        serde_json::Value::Object(_) => "mapping",
    }
}

fn json_object(map: serde_json::Map<String, serde_json::Value>, location: &str) -> ConfigResult<Node> {
    let mut node = Node::new();
    for (key, value) in map {
        let path = join_path(location, &key);
        let value = json_value(value, &path)?;
        node.set(key, value);
    }
    Ok(node)
}

fn json_value(json: serde_json::Value, location: &str) -> ConfigResult<Value> {
    Ok(match json {
        serde_json::Value::Null => return Err(null_error(location)),
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if n.is_u64() {
                return Err(int_range_error(location, n));
            } else {
                match n.as_f64() {
                    Some(f) => Value::Float(f),
                    None => return Err(invalid(location, format!("unsupported number {n}"))),
                }
            }
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => Value::List(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| json_value(item, &join_path(location, &i.to_string())))
                .collect::<ConfigResult<_>>()?,
        ),
        serde_json::Value::Object(map) => Value::Node(json_object(map, location)?),
    })
}

// YAML

fn node_from_yaml(yaml: serde_yaml::Value) -> ConfigResult<Node> {
    match yaml {
        serde_yaml::Value::Null => Ok(Node::new()),
        serde_yaml::Value::Mapping(map) => yaml_mapping(map, ""),
        serde_yaml::Value::Tagged(tagged) => node_from_yaml(tagged.value),
        _ => Err(invalid("", "root must be a mapping")),
    }
}

fn yaml_key(key: serde_yaml::Value, location: &str) -> ConfigResult<String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        _ => Err(invalid(location, "mapping keys must be strings, numbers or booleans")),
    }
}

fn yaml_mapping(map: serde_yaml::Mapping, location: &str) -> ConfigResult<Node> {
    let mut node = Node::new();
    for (key, value) in map {
        let key = yaml_key(key, location)?;
        let path = join_path(location, &key);
        let value = yaml_value(value, &path)?;
        node.set(key, value);
    }
    Ok(node)
}

fn yaml_value(yaml: serde_yaml::Value, location: &str) -> ConfigResult<Value> {
    Ok(match yaml {
        serde_yaml::Value::Null => return Err(null_error(location)),
        serde_yaml::Value::Bool(b) => Value::Boolean(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if n.is_u64() {
                return Err(int_range_error(location, n));
            } else {
                match n.as_f64() {
                    Some(f) => Value::Float(f),
                    None => return Err(invalid(location, format!("unsupported number {n}"))),
                }
            }
        },
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::List(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| yaml_value(item, &join_path(location, &i.to_string())))
                .collect::<ConfigResult<_>>()?,
        ),
        serde_yaml::Value::Mapping(map) => Value::Node(yaml_mapping(map, location)?),
        serde_yaml::Value::Tagged(tagged) => yaml_value(tagged.value, location)?,
    })
}

// TOML

fn toml_table(table: toml::Table, location: &str) -> ConfigResult<Node> {
    let mut node = Node::new();
    for (key, value) in table {
        let path = join_path(location, &key);
        let value = toml_value(value, &path)?;
        node.set(key, value);
    }
    Ok(node)
}

fn toml_value(value: toml::Value, location: &str) -> ConfigResult<Value> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Integer(i),
        toml::Value::Float(f) => Value::Float(f),
        toml::Value::Boolean(b) => Value::Boolean(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::List(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| toml_value(item, &join_path(location, &i.to_string())))
                .collect::<ConfigResult<_>>()?,
        ),
        toml::Value::Table(table) => Value::Node(toml_table(table, location)?),
    })
}
