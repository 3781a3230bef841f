//! Logging setup shared by Arbor binaries.
//!
//! The engine crates only emit `tracing` events; this crate installs the
//! subscriber that formats and routes them.
//!
//! # Example
//!
//! ```rust,no_run
//! use arbor_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), arbor_telemetry::TelemetryError> {
//! let config = LogConfig::from_verbosity(2)
//!     .with_format(LogFormat::Json)
//!     .with_directive("arbor_config::provider=trace");
//! setup_logging(&config)?;
//! tracing::info!("logging ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    FileLogConfig, FileRotation, LogConfig, LogFormat, LogTarget, setup_default_logging,
    setup_logging,
};
