//! Patches anchored to a file.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use derive_more::{From, Into};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::patch::{Invert, Patch};

/// The path components identifying the file a patch applies to.
///
/// Patches on different anchor paths always commute.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AnchorPath(BTreeSet<SmolStr>);

impl AnchorPath {
    /// An anchor path from its components.
    pub fn new(components: impl IntoIterator<Item = impl Into<SmolStr>>) -> Self {
        Self(components.into_iter().map(Into::into).collect())
    }

    /// The components of the path.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(SmolStr::as_str)
    }
}

impl fmt::Display for AnchorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join("/"))
    }
}

/// A primitive patch: a [`Patch`] together with the file it applies to.
///
/// The patch itself is shared, never copied, when a primitive is cloned or
/// commuted past an unrelated one.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Prim {
    #[serde(default)]
    anchor: AnchorPath,
    patch: Rc<Patch>,
}

impl Prim {
    /// A primitive patch on `anchor`.
    pub fn new(anchor: AnchorPath, patch: impl Into<Rc<Patch>>) -> Self {
        Self {
            anchor,
            patch: patch.into(),
        }
    }

    /// A primitive patch on the file named by `components`.
    pub fn on(components: impl IntoIterator<Item = impl Into<SmolStr>>, patch: Patch) -> Self {
        Self::new(AnchorPath::new(components), patch)
    }

    /// The file the patch applies to.
    pub fn anchor(&self) -> &AnchorPath {
        &self.anchor
    }

    /// The patch.
    pub fn patch(&self) -> &Patch {
        &self.patch
    }

    pub(crate) fn shared_patch(&self) -> &Rc<Patch> {
        &self.patch
    }

    /// The same file with a different patch.
    pub(crate) fn with_patch(&self, patch: Rc<Patch>) -> Self {
        Self {
            anchor: self.anchor.clone(),
            patch,
        }
    }
}

impl From<Patch> for Prim {
    fn from(patch: Patch) -> Self {
        Self::new(AnchorPath::default(), patch)
    }
}

impl Invert for Prim {
    fn invert(&self) -> Self {
        self.with_patch(Rc::new(self.patch.invert()))
    }
}

impl fmt::Display for Prim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.patch, self.anchor)
    }
}
