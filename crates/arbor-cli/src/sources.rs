//! Loading a [`Config`] from command-line source flags.

use std::sync::Arc;

use anyhow::{Context, Result};
use arbor_config::provider::{AwsCliSecretStore, AwsSecretHandler, ProcessEnvironment};
use arbor_config::{Config, ExpandScope, ResolverOptions, ShowMode};
use clap::{Args, ValueEnum};
use tracing::info;

/// Scope used to expand macros in inherited values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ExpandIn {
    /// Where the value is defined
    Defining,
    /// Where the lookup started
    Requesting,
}

impl From<ExpandIn> for ExpandScope {
    fn from(value: ExpandIn) -> Self {
        match value {
            ExpandIn::Defining => Self::Defining,
            ExpandIn::Requesting => Self::Requesting,
        }
    }
}

/// Flags shared by commands that read a config.
#[derive(Debug, Args)]
pub(crate) struct SourceArgs {
    /// Config file (JSON, YAML or TOML). Repeat to include more files;
    /// earlier files win.
    #[arg(short, long = "config", required = true, value_name = "FILE")]
    pub(crate) config: Vec<String>,

    /// Secrets file merged underneath the config. Repeatable.
    #[arg(short, long = "secrets", value_name = "FILE")]
    pub(crate) secrets: Vec<String>,

    /// Reveal secrets instead of obfuscating them
    #[arg(long)]
    pub(crate) show: bool,

    /// Fail on unresolved, circular or non-primitive macros
    #[arg(long)]
    pub(crate) strict: bool,

    /// Resolve `${aws-secret:...}` macros with the aws CLI
    #[arg(long)]
    pub(crate) aws_secrets: bool,

    /// Region for AWS secret lookups
    #[arg(long, env = "ARBOR_AWS_REGION")]
    pub(crate) aws_region: Option<String>,

    /// Fail when the secret store is unreachable
    #[arg(long, requires = "aws_secrets")]
    pub(crate) aws_fail_fast: bool,

    /// Scope for macros inside inherited values
    #[arg(long, value_enum, env = "ARBOR_EXPAND_IN", default_value_t = ExpandIn::Defining)]
    pub(crate) expand_in: ExpandIn,
}

impl SourceArgs {
    /// How secrets are rendered.
    pub(crate) fn show_mode(&self) -> ShowMode {
        ShowMode::from_show(self.show)
    }

    /// Load every file and apply the resolver flags.
    pub(crate) fn load(&self) -> Result<Config> {
        let (first, includes) = self
            .config
            .split_first()
            .context("at least one --config file is required")?;

        let mut config = Config::new(load(first)?);
        for path in includes {
            let outcome = config.include(&load(path)?);
            info!(
                path = %path,
                added = outcome.added.len(),
                skipped = outcome.skipped.len(),
                "Included config file"
            );
        }
        for path in &self.secrets {
            config = config.with_secrets(load(path)?);
        }

        config = config.with_options(ResolverOptions {
            expand_in: self.expand_in.into(),
        });
        if self.strict {
            config = config.strict();
        }
        if self.aws_secrets {
            let mut client = AwsCliSecretStore::new();
            if let Some(region) = &self.aws_region {
                client = client.with_region(region);
            }
            let mut handler = AwsSecretHandler::new(client, ProcessEnvironment);
            if self.aws_fail_fast {
                handler = handler.fail_fast();
            }
            config = config.with_handler(Arc::new(handler));
        }
        Ok(config)
    }
}

/// Load one source file.
pub(crate) fn load(path: &str) -> Result<arbor_config::Node> {
    arbor_config::load_file(path).with_context(|| format!("failed to load {path}"))
}
