//! `arbor show`.

use std::process::ExitCode;

use anyhow::Result;
use arbor_config::{Config, Node};

use crate::output::{self, OutputFormat};
use crate::sources::SourceArgs;

pub(crate) struct ShowRequest<'a> {
    pub(crate) sources: &'a SourceArgs,
    pub(crate) expand: bool,
    pub(crate) sorted: bool,
    pub(crate) reverse: bool,
    pub(crate) paths: bool,
    pub(crate) format: OutputFormat,
}

/// Print the rendered tree, or its leaf paths.
pub(crate) fn run(request: &ShowRequest<'_>) -> Result<ExitCode> {
    let config = request.sources.load()?;
    let tree = build(&config, request)?;

    if request.paths {
        for path in tree.leaf_paths() {
            println!("{path}");
        }
    } else {
        println!("{}", output::render(&tree, request.format)?);
    }
    Ok(ExitCode::SUCCESS)
}

fn build(config: &Config, request: &ShowRequest<'_>) -> Result<Node> {
    let show = request.sources.show_mode();
    let tree = if request.expand {
        config.resolved_data(show)?
    } else {
        config.data(show)
    };
    Ok(if request.sorted {
        tree.sorted(request.reverse)
    } else {
        tree
    })
}
