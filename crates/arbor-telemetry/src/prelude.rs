//! Commonly used types.
//!
//! ```rust,no_run
//! use arbor_telemetry::prelude::*;
//!
//! # fn main() -> TelemetryResult<()> {
//! setup_logging(&LogConfig::new("info").with_format(LogFormat::Pretty))?;
//! # Ok(())
//! # }
//! ```

pub use crate::{TelemetryError, TelemetryResult};

pub use crate::{FileRotation, LogConfig, LogFormat, LogTarget};

pub use crate::{setup_default_logging, setup_logging};
