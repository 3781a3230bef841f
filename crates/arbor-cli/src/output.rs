//! Printing values and trees.

use anyhow::Result;
use arbor_config::Value;
use clap::ValueEnum;
use serde::Serialize;

/// Output format for structured data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}

/// Render any serializable value.
pub(crate) fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?.trim_end().to_owned(),
    })
}

/// Render a looked-up value: primitives as plain text, containers in
/// `format`.
pub(crate) fn render_value(value: &Value, format: OutputFormat) -> Result<String> {
    if value.is_primitive() {
        Ok(value.to_string())
    } else {
        render(value, format)
    }
}
