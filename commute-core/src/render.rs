//! Rendering of dependency graphs.

use std::collections::BTreeMap;

use itertools::Itertools;
use petgraph::graph::{DiGraph, NodeIndex};
use wyhash::wyhash;

use crate::deps::DepsGraph;
use crate::info::PatchInfo;

const SEED: u64 = 0;
const INDENT: &str = "   ";

/// Configuration for rendering a dependency graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct RenderConfig {
    /// Identify nodes by a hash of the patch name rather than the name
    /// itself.
    pub hashed_ids: bool,
    /// Lay the graph out left to right.
    pub rankdir_lr: bool,
    /// Also draw edges to indirect dependencies, dashed.
    pub indirect_edges: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            hashed_ids: true,
            rankdir_lr: true,
            indirect_edges: false,
        }
    }
}

impl RenderConfig {
    /// Set whether nodes are identified by a hash of the patch name.
    #[must_use]
    pub fn with_hashed_ids(mut self, hashed_ids: bool) -> Self {
        self.hashed_ids = hashed_ids;
        self
    }

    /// Set whether the graph is laid out left to right.
    #[must_use]
    pub fn with_rankdir_lr(mut self, rankdir_lr: bool) -> Self {
        self.rankdir_lr = rankdir_lr;
        self
    }

    /// Set whether indirect dependencies are drawn.
    #[must_use]
    pub fn with_indirect_edges(mut self, indirect_edges: bool) -> Self {
        self.indirect_edges = indirect_edges;
        self
    }
}

/// A stable node identifier for a patch, derived from its name.
pub fn node_id(info: &PatchInfo) -> String {
    format!("{:016x}", wyhash(info.name().as_bytes(), SEED))
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

impl DepsGraph {
    /// Render the graph in the dot language, with the default
    /// configuration.
    pub fn dot_string(&self) -> String {
        self.dot_string_with_config(RenderConfig::default())
    }

    /// Render the graph in the dot language.
    ///
    /// There is one node per patch, labelled with the patch name, and one
    /// edge from each patch to its direct dependencies.
    pub fn dot_string_with_config(&self, config: RenderConfig) -> String {
        let id = |info: &PatchInfo| {
            if config.hashed_ids {
                quoted(&node_id(info))
            } else {
                quoted(info.name())
            }
        };
        let mut lines = vec!["digraph {".to_string()];
        if config.rankdir_lr {
            lines.push(format!("{INDENT}graph [rankdir=LR];"));
        }
        lines.push(format!("{INDENT}node [imagescale=true];"));
        for (info, _) in self.iter() {
            lines.push(format!("{INDENT}{} [label={}]", id(info), quoted(info.name())));
        }
        for (info, deps) in self.iter() {
            if !deps.direct().is_empty() {
                let targets = deps.direct().iter().map(id).join(" ");
                lines.push(format!("{INDENT}{} -> {{{targets}}}", id(info)));
            }
            if config.indirect_edges && !deps.indirect().is_empty() {
                let targets = deps.indirect().iter().map(id).join(" ");
                lines.push(format!("{INDENT}{} -> {{{targets}}} [style=dashed]", id(info)));
            }
        }
        lines.push("}\n".to_string());
        lines.join("\n")
    }

    /// The direct dependencies as a petgraph graph, with an edge from each
    /// patch to each of its direct dependencies.
    pub fn to_petgraph(&self) -> DiGraph<PatchInfo, ()> {
        let mut graph = DiGraph::with_capacity(self.len(), 0);
        let nodes: BTreeMap<&PatchInfo, NodeIndex> = self
            .iter()
            .map(|(info, _)| (info, graph.add_node(info.clone())))
            .collect();
        for (info, deps) in self.iter() {
            for dep in deps.direct() {
                if let Some(&target) = nodes.get(dep) {
                    graph.add_edge(nodes[info], target, ());
                }
            }
        }
        graph
    }
}
