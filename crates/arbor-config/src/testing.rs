//! Test doubles for code that embeds the engine.
//!
//! Enabled for this crate's own tests and, through the `test-support`
//! feature, for downstream test crates.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::ConfigResult;
use crate::node::Node;
use crate::provider::{SecretBundle, SecretStoreClient, SecretStoreError};
use crate::resolve::{MacroIssue, WarningSink};

/// Build a tree from a JSON literal.
///
/// # Panics
///
/// Panics if the JSON is not a valid config source.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn tree(json: serde_json::Value) -> Node {
    Node::from_json(json).unwrap()
}

#[derive(Debug, Default)]
struct MockState {
    bundles: HashMap<String, SecretBundle>,
    failing: Vec<String>,
    calls: Vec<(String, Option<String>)>,
}

/// In-memory secret store that records every fetch.
///
/// Clones share state, so a test can keep one handle while the resolver
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct MockSecretStore {
    state: Arc<Mutex<MockState>>,
}

impl MockSecretStore {
    /// An empty store. Fetching an unknown store yields an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `key` to bundle `store`.
    #[must_use]
    pub fn with_secret(self, store: &str, key: &str, value: serde_json::Value) -> Self {
        self.lock()
            .bundles
            .entry(store.to_owned())
            .or_default()
            .insert(key.to_owned(), value);
        self
    }

    /// Make every fetch of `store` fail.
    #[must_use]
    pub fn with_failure(self, store: &str) -> Self {
        self.lock().failing.push(store.to_owned());
        self
    }

    /// Every fetch so far, as `(store, profile)`.
    #[must_use]
    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.lock().calls.clone()
    }

    /// Number of fetches of `store`.
    #[must_use]
    pub fn calls_for(&self, store: &str) -> usize {
        self.lock().calls.iter().filter(|(s, _)| s == store).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SecretStoreClient for MockSecretStore {
    fn fetch(&self, store: &str, profile: Option<&str>) -> Result<SecretBundle, SecretStoreError> {
        let mut state = self.lock();
        state
            .calls
            .push((store.to_owned(), profile.map(str::to_owned)));

        if state.failing.iter().any(|s| s == store) {
            return Err(SecretStoreError::CommandFailed {
                code: Some(254),
                stderr: format!("An error occurred (ResourceNotFoundException): {store}"),
            });
        }
        Ok(state.bundles.get(store).cloned().unwrap_or_default())
    }
}

/// Collects macro issues instead of logging them.
#[derive(Debug, Default)]
pub struct RecordingSink {
    issues: Mutex<Vec<MacroIssue>>,
}

impl RecordingSink {
    /// An empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues reported so far, in order.
    #[must_use]
    pub fn issues(&self) -> Vec<MacroIssue> {
        self.issues
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl WarningSink for RecordingSink {
    fn report(&self, issue: &MacroIssue) -> ConfigResult<()> {
        self.issues
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(issue.clone());
        Ok(())
    }
}
