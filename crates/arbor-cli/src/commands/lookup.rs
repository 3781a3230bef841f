//! `arbor lookup`.

use std::process::ExitCode;

use anyhow::Result;
use arbor_config::{Config, LookupOptions, Scope, Value};

use crate::output::{self, OutputFormat};
use crate::sources::SourceArgs;

pub(crate) struct LookupRequest<'a> {
    pub(crate) path: &'a str,
    pub(crate) scope: &'a str,
    pub(crate) sources: &'a SourceArgs,
    pub(crate) simple: bool,
    pub(crate) no_inherit: bool,
    pub(crate) format: OutputFormat,
}

/// Print the value at the requested path. Exits with 1 when it is absent.
pub(crate) fn run(request: &LookupRequest<'_>) -> Result<ExitCode> {
    let config = request.sources.load()?;
    match find(&config, request)? {
        Some(value) => {
            println!("{}", output::render_value(&value, request.format)?);
            Ok(ExitCode::SUCCESS)
        },
        None => {
            eprintln!("{}: not found", request.path);
            Ok(ExitCode::from(1))
        },
    }
}

fn find(config: &Config, request: &LookupRequest<'_>) -> Result<Option<Value>> {
    let mut options = LookupOptions::new().with_show(request.sources.show_mode());
    options.simple = request.simple;
    options.no_inherit = request.no_inherit;

    let scope = Scope::from_path(request.scope);
    Ok(config.lookup_in(request.path, &scope, &options)?)
}
