//! Primitive patches and their inverses.

pub mod token;

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

use crate::seq::{FL, RL};
pub use token::{InvalidTokenClass, TokenClass};

/// An atomic change to a single file.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Patch {
    /// Create an empty file.
    AddFile,
    /// Delete an empty file.
    RemoveFile,
    /// Replace a run of lines.
    Hunk(FileHunk),
    /// Replace every occurrence of a token.
    TokReplace(TokReplace),
}

/// Replaces the lines `old` found at line `line` (counting from 1) with the
/// lines `new`.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileHunk {
    line: usize,
    #[serde(default)]
    old: Vec<SmolStr>,
    #[serde(default)]
    new: Vec<SmolStr>,
}

/// Replaces every token `old` with `new`, tokens being maximal runs of the
/// characters of a [`TokenClass`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTokReplace", into = "RawTokReplace")]
pub struct TokReplace {
    class: TokenClass,
    old: SmolStr,
    new: SmolStr,
}

/// Error building a token replacement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum InvalidTokReplace {
    /// The token class could not be parsed.
    #[error(transparent)]
    Class(#[from] InvalidTokenClass),
    /// One of the tokens is empty.
    #[error("Empty token in replacement of {old:?} by {new:?}")]
    EmptyToken {
        /// The token being replaced.
        old: SmolStr,
        /// The replacement token.
        new: SmolStr,
    },
    /// A token contains characters outside of the class.
    #[error("{token:?} is not a token of class {class}")]
    NotAToken {
        /// The offending token.
        token: SmolStr,
        /// The token class.
        class: TokenClass,
    },
}

/// Things that can be undone.
pub trait Invert {
    /// The change that undoes `self`.
    ///
    /// Applying a patch and then its inverse leaves the document unchanged,
    /// and inverting twice gives back the original.
    #[must_use]
    fn invert(&self) -> Self;
}

/// Split text into lines. A trailing newline does not start a new line.
pub fn lines(text: &str) -> Vec<SmolStr> {
    text.split_terminator('\n').map(SmolStr::from).collect()
}

impl Patch {
    /// A patch creating an empty file.
    pub fn add_file() -> Self {
        Patch::AddFile
    }

    /// A patch removing an empty file.
    pub fn remove_file() -> Self {
        Patch::RemoveFile
    }

    /// A hunk replacing the lines of `old_text` at `line` with the lines of
    /// `new_text`.
    pub fn hunk(line: usize, old_text: &str, new_text: &str) -> Self {
        Patch::Hunk(FileHunk::new(line, lines(old_text), lines(new_text)))
    }

    /// A hunk from explicit line sequences.
    pub fn hunk_lines(
        line: usize,
        old: impl IntoIterator<Item = impl Into<SmolStr>>,
        new: impl IntoIterator<Item = impl Into<SmolStr>>,
    ) -> Self {
        Patch::Hunk(FileHunk::new(
            line,
            old.into_iter().map(Into::into).collect(),
            new.into_iter().map(Into::into).collect(),
        ))
    }

    /// A token replacement of `old` by `new` within the token class `class`.
    pub fn tok_replace(
        class: &str,
        old: impl Into<SmolStr>,
        new: impl Into<SmolStr>,
    ) -> Result<Self, InvalidTokReplace> {
        let class = TokenClass::new(class)?;
        Ok(Patch::TokReplace(TokReplace::new(class, old, new)?))
    }

    /// Whether the patch leaves every document unchanged.
    pub fn is_identity(&self) -> bool {
        matches!(self, Patch::Hunk(h) if h.is_empty())
    }
}

impl Invert for Patch {
    fn invert(&self) -> Self {
        match self {
            Patch::AddFile => Patch::RemoveFile,
            Patch::RemoveFile => Patch::AddFile,
            Patch::Hunk(h) => Patch::Hunk(h.invert()),
            Patch::TokReplace(t) => Patch::TokReplace(t.invert()),
        }
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Patch::AddFile => write!(f, "addfile"),
            Patch::RemoveFile => write!(f, "rmfile"),
            Patch::Hunk(h) => write!(
                f,
                "hunk {} -{} +{}",
                h.line,
                h.old.len(),
                h.new.len()
            ),
            Patch::TokReplace(t) => write!(f, "replace {} {} {}", t.class, t.old, t.new),
        }
    }
}

impl FileHunk {
    /// A hunk replacing `old` with `new` at `line`.
    pub fn new(line: usize, old: Vec<SmolStr>, new: Vec<SmolStr>) -> Self {
        Self { line, old, new }
    }

    /// The first line affected, counting from 1.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The lines removed.
    pub fn old(&self) -> &[SmolStr] {
        &self.old
    }

    /// The lines inserted.
    pub fn new_lines(&self) -> &[SmolStr] {
        &self.new
    }

    /// Whether the hunk neither removes nor inserts anything.
    pub fn is_empty(&self) -> bool {
        self.old.is_empty() && self.new.is_empty()
    }
}

impl Invert for FileHunk {
    fn invert(&self) -> Self {
        Self {
            line: self.line,
            old: self.new.clone(),
            new: self.old.clone(),
        }
    }
}

impl TokReplace {
    /// A replacement of the token `old` by `new`.
    ///
    /// Both tokens must be non-empty and consist of characters of `class`
    /// only.
    pub fn new(
        class: TokenClass,
        old: impl Into<SmolStr>,
        new: impl Into<SmolStr>,
    ) -> Result<Self, InvalidTokReplace> {
        let (old, new) = (old.into(), new.into());
        if old.is_empty() || new.is_empty() {
            return Err(InvalidTokReplace::EmptyToken { old, new });
        }
        if let Some(token) = [&old, &new].into_iter().find(|t| !class.is_token(t)) {
            return Err(InvalidTokReplace::NotAToken {
                token: token.clone(),
                class,
            });
        }
        Ok(Self { class, old, new })
    }

    /// The token class.
    pub fn class(&self) -> &TokenClass {
        &self.class
    }

    /// The token being replaced.
    pub fn old(&self) -> &str {
        &self.old
    }

    /// The replacement token.
    pub fn new_token(&self) -> &str {
        &self.new
    }

    /// Apply the replacement to a sequence of lines.
    ///
    /// Returns `None` if any line already contains the replacement token.
    pub fn replace_lines(&self, lines: &[SmolStr]) -> Option<Vec<SmolStr>> {
        self.class.try_tok_replaces(&self.old, &self.new, lines)
    }

    /// Whether the two replacements interfere with each other, sharing a
    /// token or using different token classes.
    pub fn collides_with(&self, other: &Self) -> bool {
        self.class != other.class
            || self.old == other.old
            || self.new == other.old
            || self.old == other.new
            || self.new == other.new
    }
}

impl Invert for TokReplace {
    fn invert(&self) -> Self {
        Self {
            class: self.class.clone(),
            old: self.new.clone(),
            new: self.old.clone(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawTokReplace {
    class: TokenClass,
    old: SmolStr,
    new: SmolStr,
}

impl TryFrom<RawTokReplace> for TokReplace {
    type Error = InvalidTokReplace;

    fn try_from(raw: RawTokReplace) -> Result<Self, Self::Error> {
        Self::new(raw.class, raw.old, raw.new)
    }
}

impl From<TokReplace> for RawTokReplace {
    fn from(t: TokReplace) -> Self {
        Self {
            class: t.class,
            old: t.old,
            new: t.new,
        }
    }
}

/// Invert a forward list, giving the inverses in reverse order.
pub fn invert_fl<P: Invert>(fl: &FL<P>) -> RL<P> {
    let mut rl = RL::new();
    let inverses: Vec<P> = fl.iter().map(Invert::invert).collect();
    for p in inverses.into_iter().rev() {
        rl = rl.push(p);
    }
    rl
}

/// Invert a reverse list, giving the inverses in reverse order.
pub fn invert_rl<P: Invert>(rl: &RL<P>) -> FL<P> {
    let mut fl = FL::new();
    let inverses: Vec<P> = rl.iter_rev().map(Invert::invert).collect();
    for p in inverses.into_iter().rev() {
        fl = fl.push(p);
    }
    fl
}

impl<P: Invert> Invert for FL<P> {
    fn invert(&self) -> Self {
        let mut fl = FL::new();
        for p in self.iter() {
            fl = fl.push(p.invert());
        }
        fl
    }
}

impl<P: Invert> Invert for RL<P> {
    fn invert(&self) -> Self {
        let mut rl = RL::new();
        for p in self.iter_rev() {
            rl = rl.push(p.invert());
        }
        rl
    }
}

/// Inverting a pair `(p, q)` gives `(invert(q), invert(p))`.
impl<P: Invert> Invert for (P, P) {
    fn invert(&self) -> Self {
        (self.1.invert(), self.0.invert())
    }
}
