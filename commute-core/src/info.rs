//! Identity and metadata of a named patch.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Metadata identifying a named patch.
///
/// Patch infos are totally ordered, lexicographically over date, name,
/// author, log and the inversion flag, and are used as the keys of a
/// [`DepsGraph`](crate::DepsGraph).
#[derive(
    Clone, Debug, Default, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[display("{name}")]
pub struct PatchInfo {
    #[serde(default)]
    date: SmolStr,
    name: SmolStr,
    #[serde(default)]
    author: SmolStr,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    log: Vec<SmolStr>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    legacy_is_inverted: bool,
}

impl PatchInfo {
    /// A patch info with the given name and no other metadata.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the date of the patch.
    #[must_use]
    pub fn with_date(mut self, date: impl Into<SmolStr>) -> Self {
        self.date = date.into();
        self
    }

    /// Set the author of the patch.
    #[must_use]
    pub fn with_author(mut self, author: impl Into<SmolStr>) -> Self {
        self.author = author.into();
        self
    }

    /// Set the log message, one entry per line.
    #[must_use]
    pub fn with_log(mut self, log: impl IntoIterator<Item = impl Into<SmolStr>>) -> Self {
        self.log = log.into_iter().map(Into::into).collect();
        self
    }

    /// The date of the patch.
    pub fn date(&self) -> &str {
        &self.date
    }

    /// The name of the patch.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The author of the patch.
    pub fn author(&self) -> &str {
        &self.author
    }

    /// The lines of the log message.
    pub fn log(&self) -> &[SmolStr] {
        &self.log
    }

    /// Whether this info identifies the inverse of a recorded patch.
    pub fn is_inverted(&self) -> bool {
        self.legacy_is_inverted
    }

    /// The info of the inverse patch.
    ///
    /// Inverting twice gives back the original info.
    #[must_use]
    pub fn inverted(&self) -> Self {
        Self {
            legacy_is_inverted: !self.legacy_is_inverted,
            ..self.clone()
        }
    }
}
