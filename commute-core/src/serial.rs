//! Serialized form of a patch history.
//!
//! Histories are described as a JSON document listing named patches oldest
//! first. Text is given as strings and split into lines, and explicit
//! dependencies refer to earlier patches by name:
//!
//! ```json
//! {"patches": [
//!   {"name": "p1", "path": ["a.txt"], "patch": {"type": "add_file"}},
//!   {"name": "p2", "path": ["a.txt"], "patch": {"type": "hunk", "line": 1, "new": "hello"}},
//!   {"name": "p3", "path": ["a.txt"], "depends": ["p1"],
//!    "patch": {"type": "tok_replace", "old": "hello", "new": "bye"}}
//! ]}
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

use crate::info::PatchInfo;
use crate::named::Named;
use crate::patch::token::DEFAULT_TOKEN_CLASS;
use crate::patch::{InvalidTokReplace, Patch};
use crate::prim::{AnchorPath, Prim};
use crate::seq::{FL, RL};

/// Error building a history from its serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SerialError {
    /// A token replacement could not be built.
    #[error("Invalid patch {name}: {source}")]
    InvalidPatch {
        /// The name of the patch.
        name: SmolStr,
        /// The cause.
        source: InvalidTokReplace,
    },
    /// Two patches share a name.
    #[error("Duplicate patch name {0}")]
    DuplicateName(SmolStr),
    /// An explicit dependency does not name an earlier patch.
    #[error("Patch {name} depends on {dependency}, which is not an earlier patch")]
    UnknownDependency {
        /// The name of the patch.
        name: SmolStr,
        /// The missing dependency.
        dependency: SmolStr,
    },
}

fn default_class() -> SmolStr {
    DEFAULT_TOKEN_CLASS.into()
}

/// A serialized primitive patch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum SerialPatch {
    /// See [`Patch::AddFile`].
    AddFile,
    /// See [`Patch::RemoveFile`].
    RemoveFile,
    /// See [`Patch::Hunk`].
    Hunk {
        /// First line affected, counting from 1.
        line: usize,
        /// Text removed.
        #[serde(default)]
        old: String,
        /// Text inserted.
        #[serde(default)]
        new: String,
    },
    /// See [`Patch::TokReplace`].
    TokReplace {
        /// Token class, identifiers by default.
        #[serde(default = "default_class")]
        class: SmolStr,
        /// Token replaced.
        old: SmolStr,
        /// Replacement token.
        new: SmolStr,
    },
}

impl SerialPatch {
    /// Build the patch.
    pub fn to_patch(&self) -> Result<Patch, InvalidTokReplace> {
        Ok(match self {
            SerialPatch::AddFile => Patch::add_file(),
            SerialPatch::RemoveFile => Patch::remove_file(),
            SerialPatch::Hunk { line, old, new } => Patch::hunk(*line, old, new),
            SerialPatch::TokReplace { class, old, new } => {
                Patch::tok_replace(class, old.clone(), new.clone())?
            }
        })
    }
}

/// A serialized named patch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialNamed {
    /// Unique name of the patch.
    pub name: SmolStr,
    /// Path components of the file patched.
    #[serde(default)]
    pub path: Vec<SmolStr>,
    /// The change.
    pub patch: SerialPatch,
    /// Names of earlier patches this one explicitly depends on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<SmolStr>,
    /// Author of the patch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<SmolStr>,
    /// Date of the patch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<SmolStr>,
    /// Log message, one entry per line.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub log: Vec<SmolStr>,
}

impl SerialNamed {
    /// A named patch on `path` with no metadata or explicit dependencies.
    pub fn new(
        name: impl Into<SmolStr>,
        path: impl IntoIterator<Item = impl Into<SmolStr>>,
        patch: SerialPatch,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into_iter().map(Into::into).collect(),
            patch,
            depends: Vec::new(),
            author: None,
            date: None,
            log: Vec::new(),
        }
    }

    fn info(&self) -> PatchInfo {
        let mut info = PatchInfo::new(self.name.clone()).with_log(self.log.iter().cloned());
        if let Some(author) = &self.author {
            info = info.with_author(author.clone());
        }
        if let Some(date) = &self.date {
            info = info.with_date(date.clone());
        }
        info
    }
}

/// A serialized history of named patches, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialPatchSequence {
    /// The patches.
    pub patches: Vec<SerialNamed>,
}

impl SerialPatchSequence {
    /// Build the history.
    pub fn to_sequence(&self) -> Result<RL<Named<Prim>>, SerialError> {
        let mut known: BTreeMap<&SmolStr, PatchInfo> = BTreeMap::new();
        let mut sequence = RL::new();
        for serial in &self.patches {
            let patch = serial
                .patch
                .to_patch()
                .map_err(|source| SerialError::InvalidPatch {
                    name: serial.name.clone(),
                    source,
                })?;
            let deps = serial
                .depends
                .iter()
                .map(|dependency| {
                    known
                        .get(dependency)
                        .cloned()
                        .ok_or_else(|| SerialError::UnknownDependency {
                            name: serial.name.clone(),
                            dependency: dependency.clone(),
                        })
                })
                .collect::<Result<BTreeSet<_>, _>>()?;
            let info = serial.info();
            if known.insert(&serial.name, info.clone()).is_some() {
                return Err(SerialError::DuplicateName(serial.name.clone()));
            }
            let prim = Prim::new(AnchorPath::new(serial.path.iter().cloned()), patch);
            sequence = sequence.push(Named::new(info, deps, FL::new().push(prim)));
        }
        Ok(sequence)
    }
}

impl std::str::FromStr for SerialPatchSequence {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const HISTORY: &str = r#"{"patches": [
        {"name": "p1", "path": ["a.txt"], "patch": {"type": "add_file"}},
        {"name": "p2", "path": ["a.txt"], "patch": {"type": "hunk", "line": 1, "new": "hello\nworld"}},
        {"name": "p3", "path": ["a.txt"], "depends": ["p1"], "author": "me", "log": ["rename"],
         "patch": {"type": "tok_replace", "old": "hello", "new": "bye"}}
    ]}"#;

    #[test]
    fn parse_history() {
        let serial: SerialPatchSequence = HISTORY.parse().unwrap();
        let seq = serial.to_sequence().unwrap();
        assert_eq!(seq.len(), 3);

        let p2 = &seq[1];
        assert_eq!(p2.payload()[0].patch(), &Patch::hunk(1, "", "hello\nworld"));
        assert_eq!(p2.payload()[0].anchor(), &AnchorPath::new(["a.txt"]));

        let p3 = &seq[2];
        assert_eq!(p3.info().author(), "me");
        assert_eq!(p3.info().log(), ["rename"]);
        assert_eq!(
            p3.deps().iter().map(PatchInfo::name).collect::<Vec<_>>(),
            vec!["p1"]
        );
        assert_eq!(
            p3.payload()[0].patch(),
            &Patch::tok_replace(DEFAULT_TOKEN_CLASS, "hello", "bye").unwrap()
        );
    }

    #[test]
    fn unknown_dependency() {
        let mut serial: SerialPatchSequence = HISTORY.parse().unwrap();
        serial.patches[0].depends.push("p3".into());
        assert_eq!(
            serial.to_sequence().unwrap_err(),
            SerialError::UnknownDependency {
                name: "p1".into(),
                dependency: "p3".into()
            }
        );
    }

    #[test]
    fn duplicate_name() {
        let mut serial: SerialPatchSequence = HISTORY.parse().unwrap();
        serial.patches[2].name = "p1".into();
        assert_eq!(
            serial.to_sequence().unwrap_err(),
            SerialError::DuplicateName("p1".into())
        );
    }

    #[test]
    fn invalid_token() {
        let serial = SerialPatchSequence {
            patches: vec![SerialNamed::new(
                "bad",
                ["a.txt"],
                SerialPatch::TokReplace {
                    class: "a-z".into(),
                    old: "x".into(),
                    new: "Y".into(),
                },
            )],
        };
        let err = serial.to_sequence().unwrap_err();
        assert!(matches!(err, SerialError::InvalidPatch { name, .. } if name == "bad"));
    }
}
