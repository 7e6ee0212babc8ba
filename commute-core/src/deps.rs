//! Dependency analysis of a patch history.
//!
//! Every patch of a history is checked against the patches recorded before
//! it, newest first. An earlier patch that the patch (together with
//! everything already found to depend on) cannot be commuted past is a
//! *direct* dependency; the dependencies of a direct dependency are
//! *indirect* dependencies and need not be checked again.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use tracing::{debug, instrument, trace};

use crate::commute::{Commute, commute_fl};
use crate::info::PatchInfo;
use crate::named::Named;
use crate::seq::{FL, RL};

/// The dependencies of a single patch.
///
/// The direct and indirect sets are disjoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deps {
    direct: BTreeSet<PatchInfo>,
    indirect: BTreeSet<PatchInfo>,
}

impl Deps {
    /// Patches that could not be commuted past.
    pub fn direct(&self) -> &BTreeSet<PatchInfo> {
        &self.direct
    }

    /// Patches implied by the direct dependencies.
    pub fn indirect(&self) -> &BTreeSet<PatchInfo> {
        &self.indirect
    }

    /// Union of the direct and indirect dependencies.
    pub fn all(&self) -> BTreeSet<PatchInfo> {
        self.direct.union(&self.indirect).cloned().collect()
    }

    /// Record `j` as a direct dependency, inheriting all of its own
    /// dependencies as indirect ones.
    pub fn add_deps(&mut self, j: &PatchInfo, graph: &DepsGraph) {
        self.direct.insert(j.clone());
        self.indirect.extend(graph.all_deps(j));
    }
}

/// Dependencies of every patch of a history.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepsGraph {
    #[serde_as(as = "Vec<(_, _)>")]
    deps: BTreeMap<PatchInfo, Deps>,
}

impl DepsGraph {
    /// The dependencies of `info`, if it is part of the graph.
    pub fn get(&self, info: &PatchInfo) -> Option<&Deps> {
        self.deps.get(info)
    }

    /// All dependencies, direct or indirect, of `info`.
    ///
    /// # Panics
    ///
    /// If `info` is not part of the graph.
    pub fn all_deps(&self, info: &PatchInfo) -> BTreeSet<PatchInfo> {
        self.get(info)
            .unwrap_or_else(|| panic!("patch {info} is missing from the dependency graph"))
            .all()
    }

    /// Iterate over the patches and their dependencies, ordered by patch.
    pub fn iter(&self) -> impl Iterator<Item = (&PatchInfo, &Deps)> {
        self.deps.iter()
    }

    /// Number of patches in the graph.
    pub fn len(&self) -> usize {
        self.deps.len()
    }

    /// Whether the graph has no patches.
    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }

    /// Whether `info` is part of the graph.
    pub fn contains(&self, info: &PatchInfo) -> bool {
        self.deps.contains_key(info)
    }

    fn insert(&mut self, info: PatchInfo, deps: Deps) {
        self.deps.insert(info, deps);
    }
}

/// Find the dependencies of the patch heading `kept` among `remaining`.
///
/// `remaining` holds the patches preceding `kept`, and is processed from
/// its last element backwards. A patch commuting past the whole of `kept`
/// is moved out of the way and added to `commuted_out`; any other patch is
/// a direct dependency and is added to the front of `kept`. Patches already
/// known to be indirect dependencies are added to `kept` without trying.
///
/// The dependencies of every patch of `remaining` must already be in
/// `graph`. Returns the dependencies found, added to `deps`, together with
/// the patches that were commuted out.
pub fn fold_deps<P: Commute>(
    remaining: &RL<Named<P>>,
    mut kept: FL<Named<P>>,
    mut commuted_out: FL<Named<P>>,
    mut deps: Deps,
    graph: &DepsGraph,
) -> (Deps, FL<Named<P>>) {
    let mut remaining = remaining.clone();
    while let Some((q, qs)) = remaining.view() {
        let j = q.info();
        if deps.indirect.contains(j) {
            trace!(patch = %j, "already an indirect dependency");
            kept = kept.push(q.clone());
        } else if let Some((kept2, q2)) = commute_fl(q, &kept) {
            trace!(patch = %j, "commutes");
            kept = kept2;
            commuted_out = commuted_out.push(q2);
        } else {
            trace!(patch = %j, "direct dependency");
            deps.add_deps(j, graph);
            kept = kept.push(q.clone());
        }
        remaining = qs;
    }
    (deps, commuted_out)
}

/// Compute the dependency graph of a history, oldest patch first.
///
/// Each patch only depends on patches before it in `sequence`.
#[instrument(skip_all, fields(patches = sequence.len()))]
pub fn deps_graph<P: Commute>(sequence: &RL<Named<P>>) -> DepsGraph {
    // Each patch paired with the history preceding it, newest first.
    let mut pending = Vec::with_capacity(sequence.len());
    let mut rest = sequence.clone();
    while let Some((p, earlier)) = rest.view() {
        pending.push((p.clone(), earlier.clone()));
        rest = earlier;
    }

    let mut graph = DepsGraph::default();
    for (p, earlier) in pending.into_iter().rev() {
        let (deps, _) = fold_deps(
            &earlier,
            FL::new().push(p.clone()),
            FL::new(),
            Deps::default(),
            &graph,
        );
        debug!(
            patch = %p.info(),
            direct = deps.direct.len(),
            indirect = deps.indirect.len(),
            "computed dependencies"
        );
        graph.insert(p.info().clone(), deps);
    }
    graph
}

/// All dependencies, direct or indirect, of `j` in `graph`.
///
/// # Panics
///
/// If `j` is not part of the graph.
pub fn all_deps(j: &PatchInfo, graph: &DepsGraph) -> BTreeSet<PatchInfo> {
    graph.all_deps(j)
}
