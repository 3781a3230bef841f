#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Hierarchical configuration resolution for Arbor.
//!
//! A config is an ordered tree of keys. Lookups address it with slash paths
//! from a scope; a key missing at one level is inherited from the nearest
//! ancestor that defines it. String values may embed `${name}` macros that
//! are expanded at read time, and values loaded from a secrets source are
//! carried in tagged form so they can be shown, hidden or kept raw when
//! read.
//!
//! # Usage
//!
//! ```rust
//! use arbor_config::{Config, LookupOptions, Node, ShowMode, Value};
//!
//! let main = Node::from_json_str(r#"{"db": {"host": "db1", "url": "pg://app:${password}@${host}"}}"#)?;
//! let secrets = Node::from_json_str(r#"{"password": "hunter2"}"#)?;
//! let config = Config::new(main).with_secrets(secrets);
//!
//! let url = config.lookup("db/url", &LookupOptions::new())?;
//! assert_eq!(url, Some(Value::from("pg://app:********@db1")));
//!
//! let url = config.lookup("db/url", &LookupOptions::new().with_show(ShowMode::Plaintext))?;
//! assert_eq!(url, Some(Value::from("pg://app:hunter2@db1")));
//! # Ok::<(), arbor_config::ConfigError>(())
//! ```
//!
//! # Layout
//!
//! - [`path`]: path parsing and serialization.
//! - [`Node`], [`Value`], [`Scope`]: the tree and positions within it.
//! - [`Resolver`]: scoped lookup with inheritance and macro expansion.
//! - [`secret`]: secret tagging and rendering.
//! - [`provider`]: macro handlers, including the AWS secret adapter.
//! - [`source`]: JSON, YAML and TOML loading.
//! - [`Config`]: an owned tree plus resolver settings.

/// Configuration error types.
pub mod error;
/// Slash path parsing and serialization.
pub mod path;
/// Pluggable macro handlers and external secret stores.
pub mod provider;
/// Scoped lookup and macro expansion.
pub mod resolve;
/// Secret tagging and rendering.
pub mod secret;
/// Loading trees from files and strings.
pub mod source;

mod config;
mod node;
mod value;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use config::Config;
pub use error::{ConfigError, ConfigResult};
pub use node::{MergeOutcome, Node, Scope};
pub use resolve::{
    ExpandScope, Found, LenientSink, LookupOptions, MacroIssue, NoopSink, Resolved, Resolver,
    ResolverOptions, StrictSink, WarningSink,
};
pub use secret::ShowMode;
pub use source::load_file;
pub use value::Value;
