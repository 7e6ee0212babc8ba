//! Named patches: the unit of history.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::info::PatchInfo;
use crate::patch::{Invert, Patch};
use crate::prim::{AnchorPath, Prim};
use crate::seq::FL;

/// A sequence of patches recorded together under a [`PatchInfo`].
///
/// Besides the dependencies discovered by commutation, a named patch may
/// declare explicit dependencies on other named patches. A named patch never
/// commutes past one of its explicit dependencies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "P: Serialize",
    deserialize = "P: Deserialize<'de>"
))]
pub struct Named<P> {
    info: PatchInfo,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    deps: BTreeSet<PatchInfo>,
    payload: FL<P>,
}

impl<P> Named<P> {
    /// A named patch.
    pub fn new(info: PatchInfo, deps: BTreeSet<PatchInfo>, payload: FL<P>) -> Self {
        Self {
            info,
            deps,
            payload,
        }
    }

    /// The identity of the patch.
    pub fn info(&self) -> &PatchInfo {
        &self.info
    }

    /// The explicit dependencies of the patch.
    pub fn deps(&self) -> &BTreeSet<PatchInfo> {
        &self.deps
    }

    /// The patches recorded under this name.
    pub fn payload(&self) -> &FL<P> {
        &self.payload
    }

    /// Add explicit dependencies.
    #[must_use]
    pub fn with_deps(mut self, deps: impl IntoIterator<Item = PatchInfo>) -> Self {
        self.deps.extend(deps);
        self
    }

    /// The same identity and dependencies with a different payload.
    pub(crate) fn with_payload(&self, payload: FL<P>) -> Self {
        Self {
            info: self.info.clone(),
            deps: self.deps.clone(),
            payload,
        }
    }
}

impl Named<Prim> {
    /// A named patch consisting of a single patch on the default anchor
    /// path.
    pub fn with_patch(label: impl Into<SmolStr>, patch: Patch) -> Self {
        Self::on(label, AnchorPath::default(), patch)
    }

    /// A named patch consisting of a single patch on `anchor`.
    pub fn on(label: impl Into<SmolStr>, anchor: AnchorPath, patch: Patch) -> Self {
        Self::new(
            PatchInfo::new(label),
            BTreeSet::new(),
            FL::new().push(Prim::new(anchor, patch)),
        )
    }

    /// A named hunk on the default anchor path.
    pub fn hunk(label: impl Into<SmolStr>, line: usize, old_text: &str, new_text: &str) -> Self {
        Self::with_patch(label, Patch::hunk(line, old_text, new_text))
    }
}

impl<P: Invert> Invert for Named<P> {
    fn invert(&self) -> Self {
        Self {
            info: self.info.inverted(),
            deps: self.deps.iter().map(PatchInfo::inverted).collect(),
            payload: self.payload.invert(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn named_hunk() {
        let p = Named::hunk("p2", 1, "", "hello");
        assert_eq!(p.info().name(), "p2");
        assert!(p.deps().is_empty());
        assert_eq!(p.payload().len(), 1);
        assert_eq!(p.payload()[0].patch(), &Patch::hunk(1, "", "hello"));
        assert_eq!(p.payload()[0].anchor(), &AnchorPath::default());
    }

    #[test]
    fn invert_named() {
        let p = Named::with_patch("p1", Patch::add_file()).with_deps([PatchInfo::new("p0")]);
        let inv = p.invert();
        assert!(inv.info().is_inverted());
        assert!(inv.deps().iter().all(PatchInfo::is_inverted));
        assert_eq!(inv.payload()[0].patch(), &Patch::remove_file());
        assert_eq!(inv.invert(), p);
    }
}
