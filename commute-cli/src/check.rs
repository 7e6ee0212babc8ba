//! The `check` subcommand.

use std::io::{Read, Write};

use anyhow::Result;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use clio::Output;
use commute_core::{Commute, Named, Prim, RL};
use serde::Serialize;
use tracing::info;

use crate::CliError;
use crate::patch_io::PatchInputArgs;

/// Check whether two patches of a history commute.
#[derive(Parser, Debug)]
#[clap(version, long_about = None)]
#[clap(about = "Check whether two patches of a history commute.")]
#[group(id = "commute")]
#[non_exhaustive]
pub struct CheckArgs {
    /// Name of the patch applied first.
    pub first: String,
    /// Name of the patch applied second.
    pub second: String,
    /// Patch history input.
    #[command(flatten)]
    pub input_args: PatchInputArgs,
    /// Output file '-' for stdout
    #[clap(long, short, value_parser, default_value = "-")]
    output: Output,
    /// Verbosity.
    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

/// Outcome of commuting two named patches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// Whether the patches commute.
    pub commutes: bool,
    /// The commuted patches, second one first.
    pub result: Option<(Named<Prim>, Named<Prim>)>,
}

impl CheckReport {
    /// Try to commute `first` followed by `second`.
    pub fn new(first: &Named<Prim>, second: &Named<Prim>) -> Self {
        let result = first.commute(second);
        Self {
            commutes: result.is_some(),
            result,
        }
    }
}

fn find(sequence: &RL<Named<Prim>>, name: &str) -> Result<Named<Prim>, CliError> {
    sequence
        .iter()
        .find(|named| named.info().name() == name)
        .cloned()
        .ok_or_else(|| CliError::UnknownPatch(name.into()))
}

impl CheckArgs {
    /// Check commutation with optional input/output overrides.
    ///
    /// # Arguments
    ///
    /// * `input_override` - Optional reader to use instead of the CLI input argument.
    /// * `output_override` - Optional writer to use instead of the CLI output argument.
    pub fn run_with_io<R: Read, W: Write>(
        &mut self,
        input_override: Option<R>,
        mut output_override: Option<W>,
    ) -> Result<CheckReport> {
        let sequence = if let Some(reader) = input_override {
            self.input_args.get_sequence_from_reader(reader)?
        } else {
            self.input_args.get_sequence()?
        };
        let first = find(&sequence, &self.first)?;
        let second = find(&sequence, &self.second)?;

        let report = CheckReport::new(&first, &second);
        info!(
            first = %first.info(),
            second = %second.info(),
            commutes = report.commutes,
            "Checked commutation"
        );

        let json = serde_json::to_string_pretty(&report)?;
        if let Some(ref mut writer) = output_override {
            writeln!(writer, "{json}")?;
        } else {
            writeln!(self.output, "{json}")?;
        }
        Ok(report)
    }

    /// Check commutation of the two patches.
    pub fn run(&mut self) -> Result<CheckReport> {
        self.run_with_io(None::<&[u8]>, None::<Vec<u8>>)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use commute_core::Patch;
    use rstest::rstest;

    const HISTORY: &str = r#"{"patches": [
        {"name": "p1", "path": ["a.txt"], "patch": {"type": "add_file"}},
        {"name": "p2", "path": ["a.txt"], "patch": {"type": "hunk", "line": 1, "new": "a\nb\nc"}},
        {"name": "p3", "path": ["a.txt"], "patch": {"type": "hunk", "line": 5, "new": "d"}},
        {"name": "p4", "path": ["b.txt"], "patch": {"type": "add_file"}}
    ]}"#;

    fn check(first: &str, second: &str) -> Result<CheckReport> {
        let mut args = CheckArgs::parse_from(["check", first, second]);
        args.run_with_io(Some(HISTORY.as_bytes()), Some(Vec::new()))
    }

    #[rstest]
    #[case("p1", "p2", false)]
    #[case("p2", "p3", true)]
    #[case("p1", "p4", true)]
    fn commutes(#[case] first: &str, #[case] second: &str, #[case] expected: bool) {
        assert_eq!(check(first, second).unwrap().commutes, expected);
    }

    #[test]
    fn shifted_hunk() {
        let report = check("p2", "p3").unwrap();
        let (p3, p2) = report.result.unwrap();
        assert_eq!(p3.info().name(), "p3");
        assert_eq!(p3.payload()[0].patch(), &Patch::hunk(2, "", "d"));
        assert_eq!(p2.payload()[0].patch(), &Patch::hunk(1, "", "a\nb\nc"));
    }

    #[test]
    fn unknown_patch() {
        let err = check("p1", "p9").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::UnknownPatch(name)) if name == "p9"
        ));
    }
}
