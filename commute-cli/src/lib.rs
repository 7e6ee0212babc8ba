//! Standard command line tools, used by the `commute` binary.

use clap::Parser;
use smol_str::SmolStr;
use std::ffi::OsString;
use thiserror::Error;

use commute_core::SerialError;

pub mod check;
pub mod deps;
pub mod patch_io;

/// CLI arguments.
#[derive(Parser, Debug)]
#[clap(version, long_about = None)]
#[clap(about = "Patch commutation and dependency tools.")]
#[group(id = "commute")]
#[non_exhaustive]
pub enum CliArgs {
    /// Compute the dependency graph of a patch history.
    Deps(deps::DepsArgs),
    /// Check whether two patches of a history commute.
    Check(check::CheckArgs),
    /// External commands
    #[command(external_subcommand)]
    External(Vec<OsString>),
}

/// Error type for the CLI.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CliError {
    /// Error reading input.
    #[error("Error reading from path: {0}")]
    InputFile(#[from] std::io::Error),
    /// Error parsing input.
    #[error("Error parsing input: {0}")]
    Parse(#[from] serde_json::Error),
    /// The input does not describe a valid history.
    #[error("Invalid patch history: {0}")]
    Sequence(#[from] SerialError),
    /// A patch named on the command line is not part of the history.
    #[error("No patch named {0} in the history")]
    UnknownPatch(SmolStr),
}
