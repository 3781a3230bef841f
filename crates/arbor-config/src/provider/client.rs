//! Secret store clients.
//!
//! A client fetches one whole bundle (a JSON object of key/value pairs) per
//! store name. The AWS client shells out to the `aws` CLI so it inherits
//! the caller's credential chain, profiles and SSO sessions unchanged.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Key/value pairs held by one store.
pub type SecretBundle = serde_json::Map<String, serde_json::Value>;

/// Why a bundle could not be fetched.
#[derive(Debug, Error)]
pub enum SecretStoreError {
    /// The client program is not installed.
    #[error("secret store client not found: {program}")]
    ClientMissing {
        /// Program that was searched for.
        program: String,
    },

    /// The client program could not be started.
    #[error("failed to run secret store client: {0}")]
    Io(#[from] std::io::Error),

    /// The client ran but reported failure.
    #[error("secret store client exited with {code:?}: {stderr}")]
    CommandFailed {
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Trimmed standard error.
        stderr: String,
    },

    /// The response was not a JSON object of secrets.
    #[error("malformed secret store response: {0}")]
    Malformed(String),
}

/// Fetches secret bundles by store name.
///
/// Calls block the current thread.
pub trait SecretStoreClient: Send + Sync {
    /// Fetch every key held by `store`, using `profile` for credentials when
    /// given.
    ///
    /// # Errors
    ///
    /// Returns [`SecretStoreError`] when the store cannot be reached or the
    /// response cannot be parsed.
    fn fetch(&self, store: &str, profile: Option<&str>) -> Result<SecretBundle, SecretStoreError>;
}

/// AWS Secrets Manager through the `aws` command line client.
#[derive(Debug, Clone, Default)]
pub struct AwsCliSecretStore {
    program: Option<PathBuf>,
    region: Option<String>,
}

impl AwsCliSecretStore {
    /// Use `aws` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific client binary.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = Some(program.into());
        self
    }

    /// Pin the region instead of taking it from the profile.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    fn program(&self) -> Result<PathBuf, SecretStoreError> {
        match &self.program {
            Some(program) => Ok(program.clone()),
            None => which::which("aws").map_err(|_| SecretStoreError::ClientMissing {
                program: "aws".to_owned(),
            }),
        }
    }
}

impl SecretStoreClient for AwsCliSecretStore {
    fn fetch(&self, store: &str, profile: Option<&str>) -> Result<SecretBundle, SecretStoreError> {
        let program = self.program()?;

        let mut cmd = Command::new(&program);
        cmd.args(["secretsmanager", "get-secret-value", "--secret-id", store])
            .args(["--output", "json"]);
        if let Some(profile) = profile {
            cmd.args(["--profile", profile]);
        }
        if let Some(region) = &self.region {
            cmd.args(["--region", region]);
        }

        debug!(store, profile, "fetching secret bundle");
        let output = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        if !output.status.success() {
            return Err(SecretStoreError::CommandFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        parse_get_secret_value(&output.stdout)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetSecretValueOutput {
    secret_string: Option<String>,
}

/// Extract the bundle from a `get-secret-value` JSON response.
///
/// # Errors
///
/// Returns [`SecretStoreError::Malformed`] when the response has no
/// `SecretString` or it is not a JSON object.
pub fn parse_get_secret_value(response: &[u8]) -> Result<SecretBundle, SecretStoreError> {
    let output: GetSecretValueOutput = serde_json::from_slice(response)
        .map_err(|e| SecretStoreError::Malformed(format!("invalid response: {e}")))?;
    let secret = output
        .secret_string
        .ok_or_else(|| SecretStoreError::Malformed("no SecretString in response".to_owned()))?;

    match serde_json::from_str(&secret) {
        Ok(serde_json::Value::Object(bundle)) => Ok(bundle),
        Ok(other) => Err(SecretStoreError::Malformed(format!(
            "SecretString is not an object (found {})",
            json_kind(&other)
        ))),
        Err(e) => Err(SecretStoreError::Malformed(format!(
            "SecretString is not JSON: {e}"
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
