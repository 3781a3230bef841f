use std::fmt;

use tracing::warn;

use crate::error::{ConfigError, ConfigResult};

/// A recoverable problem met while expanding macros.
///
/// `text` is the string being expanded with any secrets obfuscated, so an
/// issue is always safe to log or display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacroIssue {
    /// The macro name did not resolve to anything.
    Missing {
        /// Macro name.
        name: String,
        /// String being expanded.
        text: String,
    },
    /// The macro name is already being expanded further up.
    Circular {
        /// Macro name.
        name: String,
        /// String being expanded.
        text: String,
    },
    /// The macro resolved to a node or list.
    NonPrimitive {
        /// Macro name.
        name: String,
        /// String being expanded.
        text: String,
    },
}

impl MacroIssue {
    /// The offending macro name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Missing { name, .. }
            | Self::Circular { name, .. }
            | Self::NonPrimitive { name, .. } => name,
        }
    }

    /// The string that was being expanded.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Missing { text, .. }
            | Self::Circular { text, .. }
            | Self::NonPrimitive { text, .. } => text,
        }
    }

    /// The error strict mode raises for this issue.
    #[must_use]
    pub fn into_error(self) -> ConfigError {
        match self {
            Self::Missing { name, text } => ConfigError::MacroMissing { name, text },
            Self::Circular { name, text } => ConfigError::MacroCircular { name, text },
            Self::NonPrimitive { name, text } => ConfigError::MacroNonPrimitive { name, text },
        }
    }
}

impl fmt::Display for MacroIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { name, text } => {
                write!(f, "macro '${{{name}}}' not found in '{text}'")
            },
            Self::Circular { name, text } => {
                write!(f, "circular macro '${{{name}}}' in '{text}'")
            },
            Self::NonPrimitive { name, text } => {
                write!(f, "macro '${{{name}}}' is not a primitive value in '{text}'")
            },
        }
    }
}

/// Where macro issues go. Every issue raised during expansion passes
/// through exactly one sink, which either lets expansion continue
/// (`Ok`) or aborts it (`Err`).
pub trait WarningSink: Send + Sync {
    /// Handle one issue.
    ///
    /// # Errors
    ///
    /// Returning an error aborts the lookup that raised the issue.
    fn report(&self, issue: &MacroIssue) -> ConfigResult<()>;
}

/// Logs each issue at `warn` and carries on. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientSink;

impl WarningSink for LenientSink {
    fn report(&self, issue: &MacroIssue) -> ConfigResult<()> {
        warn!(name = issue.name(), "{issue}");
        Ok(())
    }
}

/// Turns the first issue into an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictSink;

impl WarningSink for StrictSink {
    fn report(&self, issue: &MacroIssue) -> ConfigResult<()> {
        Err(issue.clone().into_error())
    }
}

/// Ignores issues entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl WarningSink for NoopSink {
    fn report(&self, _issue: &MacroIssue) -> ConfigResult<()> {
        Ok(())
    }
}
