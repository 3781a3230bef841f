use std::io;
use thiserror::Error;

/// Configuration error type.
///
/// Absence of a value is not an error; lookups return `Ok(None)` for that.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration source file.
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A source file could not be parsed as JSON, YAML or TOML.
    #[error("Failed to parse config file at {path}: {message}")]
    ParseError {
        /// Path (or pseudo-path such as `<string>`) of the source.
        path: String,
        /// Parser error description.
        message: String,
    },

    /// Source data parsed but cannot be represented as a config tree.
    #[error("Invalid config source at '{location}': {message}")]
    InvalidSource {
        /// Slash path of the offending entry (empty for the root).
        location: String,
        /// What was wrong with it.
        message: String,
    },

    /// A `${name}` macro referenced something that does not exist.
    #[error("Macro '${{{name}}}' could not be resolved in '{text}'")]
    MacroMissing {
        /// Macro name between the braces.
        name: String,
        /// The string being expanded.
        text: String,
    },

    /// A `${name}` macro refers back to itself, directly or indirectly.
    #[error("Circular macro reference '${{{name}}}' in '{text}'")]
    MacroCircular {
        /// Macro name between the braces.
        name: String,
        /// The string being expanded.
        text: String,
    },

    /// A `${name}` macro resolved to a node or list.
    #[error("Macro '${{{name}}}' resolved to a non-primitive value in '{text}'")]
    MacroNonPrimitive {
        /// Macro name between the braces.
        name: String,
        /// The string being expanded.
        text: String,
    },

    /// The external secret store could not be queried.
    #[error("Secret store '{store}' unavailable: {message}")]
    SecretStoreUnavailable {
        /// Store (bundle) name that was requested.
        store: String,
        /// Failure description. Never contains secret material.
        message: String,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
