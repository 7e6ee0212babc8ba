//! Applying patches to an in-memory tree of files.
//!
//! The tree gives patches their meaning: two sequences of patches are
//! equivalent when they turn every tree they apply to into the same tree.

use std::collections::BTreeMap;

use smol_str::SmolStr;
use thiserror::Error;

use crate::named::Named;
use crate::patch::{Patch, lines};
use crate::prim::{AnchorPath, Prim};

/// Error applying a patch to a [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ApplyError {
    /// The file to add already exists.
    #[error("File {0} already exists")]
    FileExists(AnchorPath),
    /// The file to modify does not exist.
    #[error("File {0} does not exist")]
    MissingFile(AnchorPath),
    /// Only empty files can be removed.
    #[error("Cannot remove non-empty file {0}")]
    FileNotEmpty(AnchorPath),
    /// A hunk starts outside of the file.
    #[error("Hunk at line {line} is out of range for {path}, which has {len} lines")]
    LineOutOfRange {
        /// The file.
        path: AnchorPath,
        /// The first line of the hunk.
        line: usize,
        /// The number of lines of the file.
        len: usize,
    },
    /// The lines removed by a hunk are not those of the file.
    #[error("Hunk at line {line} does not match the contents of {path}")]
    HunkMismatch {
        /// The file.
        path: AnchorPath,
        /// The first line of the hunk.
        line: usize,
    },
    /// The replacement token already occurs in the file.
    #[error("Cannot replace {old} with {new} in {path}: {new} is already present")]
    TokenCollision {
        /// The file.
        path: AnchorPath,
        /// The token being replaced.
        old: SmolStr,
        /// The replacement token.
        new: SmolStr,
    },
}

/// A set of files, each a sequence of lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    files: BTreeMap<AnchorPath, Vec<SmolStr>>,
}

impl Tree {
    /// An empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with contents `text`.
    #[must_use]
    pub fn with_file(mut self, path: AnchorPath, text: &str) -> Self {
        self.files.insert(path, lines(text));
        self
    }

    /// The lines of the file at `path`.
    pub fn file(&self, path: &AnchorPath) -> Option<&[SmolStr]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// Apply a primitive patch.
    ///
    /// The tree is left unchanged if the patch does not apply.
    pub fn apply(&mut self, prim: &Prim) -> Result<(), ApplyError> {
        let path = prim.anchor();
        match prim.patch() {
            Patch::AddFile => {
                if self.files.contains_key(path) {
                    return Err(ApplyError::FileExists(path.clone()));
                }
                self.files.insert(path.clone(), Vec::new());
            }
            Patch::RemoveFile => match self.files.get(path) {
                None => return Err(ApplyError::MissingFile(path.clone())),
                Some(contents) if !contents.is_empty() => {
                    return Err(ApplyError::FileNotEmpty(path.clone()));
                }
                Some(_) => {
                    self.files.remove(path);
                }
            },
            Patch::Hunk(h) if h.is_empty() => {}
            Patch::Hunk(h) => {
                let contents = self.file_mut(path)?;
                let len = contents.len();
                if h.line() == 0 || h.line() > len + 1 {
                    return Err(ApplyError::LineOutOfRange {
                        path: path.clone(),
                        line: h.line(),
                        len,
                    });
                }
                let start = h.line() - 1;
                let end = start + h.old().len();
                if contents.get(start..end) != Some(h.old()) {
                    return Err(ApplyError::HunkMismatch {
                        path: path.clone(),
                        line: h.line(),
                    });
                }
                contents.splice(start..end, h.new_lines().iter().cloned());
            }
            Patch::TokReplace(t) => {
                let contents = self.file_mut(path)?;
                let replaced =
                    t.replace_lines(contents)
                        .ok_or_else(|| ApplyError::TokenCollision {
                            path: path.clone(),
                            old: t.old().into(),
                            new: t.new_token().into(),
                        })?;
                *contents = replaced;
            }
        }
        Ok(())
    }

    /// Apply every primitive patch of a named patch, in order.
    pub fn apply_named(&mut self, named: &Named<Prim>) -> Result<(), ApplyError> {
        named.payload().iter().try_for_each(|prim| self.apply(prim))
    }

    /// Apply a sequence of primitive patches, in order.
    pub fn apply_all<'a>(
        &mut self,
        prims: impl IntoIterator<Item = &'a Prim>,
    ) -> Result<(), ApplyError> {
        prims.into_iter().try_for_each(|prim| self.apply(prim))
    }

    fn file_mut(&mut self, path: &AnchorPath) -> Result<&mut Vec<SmolStr>, ApplyError> {
        self.files
            .get_mut(path)
            .ok_or_else(|| ApplyError::MissingFile(path.clone()))
    }
}
