//! The `deps` subcommand.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use clio::Output;
use commute_core::{DepsGraph, PatchInfo, RenderConfig, deps_graph};
use serde::Serialize;
use tracing::info;

use crate::patch_io::PatchInputArgs;

/// Format of the dependency graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DepsFormat {
    /// A graphviz digraph.
    #[default]
    Dot,
    /// A JSON object mapping each patch name to its dependencies.
    Json,
}

/// Compute the dependency graph of a patch history.
#[derive(Parser, Debug)]
#[clap(version, long_about = None)]
#[clap(about = "Compute the dependency graph of a patch history.")]
#[group(id = "commute")]
#[non_exhaustive]
pub struct DepsArgs {
    /// Patch history input.
    #[command(flatten)]
    pub input_args: PatchInputArgs,
    /// Output file '-' for stdout
    #[clap(long, short, value_parser, default_value = "-")]
    output: Output,
    /// Output format.
    #[arg(long, value_enum, default_value_t = DepsFormat::Dot)]
    pub format: DepsFormat,
    /// Draw indirect dependencies as dashed edges.
    #[arg(long, help = "Also draw indirect dependencies. Only affects dot output.")]
    pub indirect: bool,
    /// Identify nodes by name.
    #[arg(
        long,
        help = "Use patch names as node identifiers instead of hashes. Only affects dot output."
    )]
    pub name_ids: bool,
    /// Verbosity.
    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

#[derive(Debug, Serialize)]
struct NamedDeps<'a> {
    direct: Vec<&'a str>,
    indirect: Vec<&'a str>,
}

fn names<'a>(infos: impl IntoIterator<Item = &'a PatchInfo>) -> Vec<&'a str> {
    infos.into_iter().map(PatchInfo::name).collect()
}

/// The dependencies of every patch, keyed by patch name.
fn json_deps(graph: &DepsGraph) -> BTreeMap<&str, NamedDeps<'_>> {
    graph
        .iter()
        .map(|(info, deps)| {
            let named = NamedDeps {
                direct: names(deps.direct()),
                indirect: names(deps.indirect()),
            };
            (info.name(), named)
        })
        .collect()
}

impl DepsArgs {
    /// The rendering configuration selected on the command line.
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig::default()
            .with_hashed_ids(!self.name_ids)
            .with_indirect_edges(self.indirect)
    }

    /// Compute and write the dependency graph with optional input/output
    /// overrides.
    ///
    /// # Arguments
    ///
    /// * `input_override` - Optional reader to use instead of the CLI input argument.
    /// * `output_override` - Optional writer to use instead of the CLI output argument.
    pub fn run_with_io<R: Read, W: Write>(
        &mut self,
        input_override: Option<R>,
        mut output_override: Option<W>,
    ) -> Result<()> {
        let sequence = if let Some(reader) = input_override {
            self.input_args.get_sequence_from_reader(reader)?
        } else {
            self.input_args.get_sequence()?
        };

        let graph = deps_graph(&sequence);
        info!(patches = graph.len(), "Computed dependency graph");

        let rendered = match self.format {
            DepsFormat::Dot => graph.dot_string_with_config(self.render_config()),
            DepsFormat::Json => serde_json::to_string_pretty(&json_deps(&graph))? + "\n",
        };
        if let Some(ref mut writer) = output_override {
            writer.write_all(rendered.as_bytes())?;
        } else {
            self.output.write_all(rendered.as_bytes())?;
        }
        Ok(())
    }

    /// Compute and write the dependency graph.
    pub fn run(&mut self) -> Result<()> {
        self.run_with_io(None::<&[u8]>, None::<Vec<u8>>)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    const HISTORY: &str = r#"{"patches": [
        {"name": "p1", "patch": {"type": "add_file"}},
        {"name": "p2", "patch": {"type": "hunk", "line": 1, "new": "hello"}},
        {"name": "p3", "patch": {"type": "hunk", "line": 1, "new": "world"}}
    ]}"#;

    fn run(args: &[&str]) -> String {
        let mut args = DepsArgs::parse_from(["deps"].iter().chain(args).copied());
        let mut out = Vec::new();
        args.run_with_io(Some(HISTORY.as_bytes()), Some(&mut out))
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn json_output() {
        let out: serde_json::Value = serde_json::from_str(&run(&["--format", "json"])).unwrap();
        assert_eq!(
            out,
            serde_json::json!({
                "p1": {"direct": [], "indirect": []},
                "p2": {"direct": ["p1"], "indirect": []},
                "p3": {"direct": ["p2"], "indirect": ["p1"]},
            })
        );
    }

    #[rstest]
    #[case(&[], "\"p1\" [label=\"p1\"]", false)]
    #[case(&["--name-ids"], "\"p3\" -> {\"p2\"}", true)]
    #[case(&["--name-ids", "--indirect"], "\"p3\" -> {\"p1\"} [style=dashed]", true)]
    fn dot_output(#[case] args: &[&str], #[case] snippet: &str, #[case] present: bool) {
        let out = run(args);
        assert!(out.starts_with("digraph {"));
        assert_eq!(out.contains(snippet), present);
    }
}
