//! Pluggable macro handlers for names the tree cannot resolve.
//!
//! The resolver consults a [`MacroHandler`] only after a macro name failed
//! to resolve against the tree. [`AwsSecretHandler`] resolves
//! `aws-secret:[store/]key` names through a [`SecretStoreClient`].

mod aws;
mod cache;
mod client;

pub use aws::{AWS_SECRET_PREFIX, AwsSecretHandler, AwsSecretOptions};
pub use cache::{SecretCache, SecretCacheKey};
pub use client::{
    AwsCliSecretStore, SecretBundle, SecretStoreClient, SecretStoreError, parse_get_secret_value,
};

use std::collections::HashMap;

use crate::error::ConfigResult;
use crate::node::Scope;
use crate::resolve::Resolver;
use crate::value::Value;

/// Resolves macro names the tree does not define.
pub trait MacroHandler: Send + Sync {
    /// Resolve `name` as referenced from `scope`.
    ///
    /// `Ok(None)` means the handler does not know the name (or chose to
    /// treat a failure as absence); the macro is then reported missing.
    ///
    /// # Errors
    ///
    /// Returns an error to abort the lookup entirely.
    fn resolve(&self, name: &str, scope: &Scope, resolver: &Resolver<'_>)
    -> ConfigResult<Option<Value>>;
}

/// Source of ambient settings such as the active credential profile.
pub trait Environment: Send + Sync {
    /// The value of `name`, if set.
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }
}

/// A fixed set of variables.
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    vars: HashMap<String, String>,
}

impl StaticEnvironment {
    /// No variables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    #[must_use]
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl Environment for StaticEnvironment {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticEnvironment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_environment() {
        let env: StaticEnvironment = [("A", "1")].into_iter().collect();
        assert_eq!(env.get("A").as_deref(), Some("1"));
        assert!(env.get("B").is_none());

        let env = StaticEnvironment::new().with_var("B", "2");
        assert_eq!(env.get("B").as_deref(), Some("2"));
    }
}
