//! Subcommand implementations.

pub(crate) mod lookup;
pub(crate) mod merge;
pub(crate) mod show;
