//! `arbor merge`.

use std::process::ExitCode;

use anyhow::Result;
use arbor_config::{MergeOutcome, Node};
use serde::Serialize;

use crate::output::{self, OutputFormat};
use crate::sources;

#[derive(Serialize)]
struct MergeReport<'a> {
    merged: &'a Node,
    added: &'a [String],
    skipped: &'a [String],
}

impl<'a> From<&'a MergeOutcome> for MergeReport<'a> {
    fn from(outcome: &'a MergeOutcome) -> Self {
        Self {
            merged: &outcome.merged,
            added: &outcome.added,
            skipped: &outcome.skipped,
        }
    }
}

/// Print the result of merging `other` underneath `base`.
pub(crate) fn run(base: &str, other: &str, format: OutputFormat) -> Result<ExitCode> {
    let base = sources::load(base)?;
    let other = sources::load(other)?;
    let outcome = base.merge(&other);
    println!("{}", output::render(&MergeReport::from(&outcome), format)?);
    Ok(ExitCode::SUCCESS)
}
