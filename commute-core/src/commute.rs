//! Commutation of adjacent patches.
//!
//! Commuting `p` followed by `q` means finding `q'` followed by `p'` with
//! the same effect on every document. Primitive patches are commuted with a
//! decision table over the pair of patch kinds. Each rule of the table
//! either proves the pair commutable, proves it non-commutable, or does not
//! apply; see [`Perhaps`].
//!
//! Rules are tried in order:
//!
//! 1. patches on different files always commute unchanged
//!    ([`speedy_commute`]),
//! 2. the per-kind rules of [`commute_fp`] on the pair,
//! 3. the same rules on the inverted pair `invert(q), invert(p)`, whose
//!    result is inverted back ([`clever_commute`]).
//!
//! A pair for which no rule applies does not commute.

pub mod sequence;

use std::rc::Rc;

use crate::named::Named;
use crate::patch::{FileHunk, Invert, Patch};
use crate::prim::Prim;
use crate::seq::FL;

pub use sequence::{commute_fl, commute_rl, commute_rl_fl};

/// Outcome of one commutation rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Perhaps<T> {
    /// The rule applied and produced a commuted pair.
    Succeeded(T),
    /// The rule applied and proved the pair does not commute.
    Failed,
    /// The rule does not apply.
    Unknown,
}

impl<T> Perhaps<T> {
    /// Try `f` if no rule has applied yet.
    pub fn or_else(self, f: impl FnOnce() -> Perhaps<T>) -> Perhaps<T> {
        match self {
            Perhaps::Unknown => f(),
            decided => decided,
        }
    }

    /// Map the commuted pair.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Perhaps<U> {
        match self {
            Perhaps::Succeeded(t) => Perhaps::Succeeded(f(t)),
            Perhaps::Failed => Perhaps::Failed,
            Perhaps::Unknown => Perhaps::Unknown,
        }
    }

    /// The commuted pair, if a rule succeeded.
    pub fn succeeded(self) -> Option<T> {
        match self {
            Perhaps::Succeeded(t) => Some(t),
            _ => None,
        }
    }

    /// Whether a rule succeeded.
    pub fn is_succeeded(&self) -> bool {
        matches!(self, Perhaps::Succeeded(_))
    }
}

impl<T> From<Option<T>> for Perhaps<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Perhaps::Failed, Perhaps::Succeeded)
    }
}

/// Patches that can be reordered.
pub trait Commute: Clone {
    /// Commute `self` followed by `other`.
    ///
    /// Returns `Some((other', self'))`, with `other'` applied first, if the
    /// two can be reordered.
    fn commute(&self, other: &Self) -> Option<(Self, Self)>;
}

/// Adjusted start lines of two commuted hunks.
///
/// Given a hunk at `line1` removing `old1` lines and inserting `new1`,
/// followed by a hunk at `line2` removing `old2` and inserting `new2`,
/// returns the start lines `(line2', line1')` of the second and first hunk
/// once swapped, or `None` if the hunks overlap.
///
/// Abutting hunks only commute if all four lengths are non-zero.
pub fn commute_hunk_lines(
    line1: usize,
    old1: usize,
    new1: usize,
    line2: usize,
    old2: usize,
    new2: usize,
) -> Option<(usize, usize)> {
    let non_empty = old1 > 0 && new1 > 0 && old2 > 0 && new2 > 0;
    // Line numbers that do not fit in a `usize` once shifted never commute.
    let end1 = line1.checked_add(new1)?;
    let end2 = line2.checked_add(old2)?;
    // The subtractions cannot underflow: `end1 <= line2` in the first case
    // and `end2 <= line1` in the second.
    if end1 < line2 || (non_empty && end1 == line2) {
        Some(((line2 - new1).checked_add(old1)?, line1))
    } else if end2 < line1 || (non_empty && end2 == line1) {
        Some((line2, (line1 - old2).checked_add(new2)?))
    } else {
        None
    }
}

fn commute_hunks(h1: &FileHunk, h2: &FileHunk) -> Option<(FileHunk, FileHunk)> {
    let (line2, line1) = commute_hunk_lines(
        h1.line(),
        h1.old().len(),
        h1.new_lines().len(),
        h2.line(),
        h2.old().len(),
        h2.new_lines().len(),
    )?;
    Some((
        FileHunk::new(line2, h2.old().to_vec(), h2.new_lines().to_vec()),
        FileHunk::new(line1, h1.old().to_vec(), h1.new_lines().to_vec()),
    ))
}

/// Commute two patches on the same file.
pub fn commute_fp(p: &Rc<Patch>, q: &Rc<Patch>) -> Perhaps<(Rc<Patch>, Rc<Patch>)> {
    if p.is_identity() || q.is_identity() {
        return Perhaps::Succeeded((q.clone(), p.clone()));
    }
    match (&**p, &**q) {
        (Patch::Hunk(h1), Patch::Hunk(h2)) => commute_hunks(h1, h2)
            .map(|(h2, h1)| (Rc::new(Patch::Hunk(h2)), Rc::new(Patch::Hunk(h1))))
            .into(),
        (Patch::Hunk(h), Patch::TokReplace(t)) => {
            let rewritten = t
                .replace_lines(h.old())
                .zip(t.replace_lines(h.new_lines()));
            rewritten
                .map(|(old, new)| (q.clone(), Rc::new(Patch::Hunk(FileHunk::new(h.line(), old, new)))))
                .into()
        }
        (Patch::TokReplace(t1), Patch::TokReplace(t2)) => {
            if t1.collides_with(t2) {
                Perhaps::Failed
            } else {
                Perhaps::Succeeded((q.clone(), p.clone()))
            }
        }
        _ => Perhaps::Unknown,
    }
}

/// Commute two primitive patches when they touch different files.
pub fn speedy_commute(p: &Prim, q: &Prim) -> Perhaps<(Prim, Prim)> {
    if p.anchor() != q.anchor() {
        Perhaps::Succeeded((q.clone(), p.clone()))
    } else {
        Perhaps::Unknown
    }
}

/// Commute two primitive patches, dispatching on their files and kinds.
pub fn commute_file_dir(p: &Prim, q: &Prim) -> Perhaps<(Prim, Prim)> {
    speedy_commute(p, q).or_else(|| {
        commute_fp(p.shared_patch(), q.shared_patch())
            .map(|(q2, p2)| (q.with_patch(q2), p.with_patch(p2)))
    })
}

/// Extend a commutation rule with its inverted counterpart.
///
/// When `rule` does not apply to `(p, q)`, it is tried on
/// `(invert(q), invert(p))`; a result `(a, b)` there gives
/// `(invert(b), invert(a))` for the original pair.
pub fn clever_commute<P: Invert>(
    rule: impl Fn(&P, &P) -> Perhaps<(P, P)>,
    p: &P,
    q: &P,
) -> Perhaps<(P, P)> {
    rule(p, q).or_else(|| rule(&q.invert(), &p.invert()).map(|(a, b)| (b.invert(), a.invert())))
}

/// Every rule of the decision table beyond the different-files shortcut.
pub fn everything_else_commute(p: &Prim, q: &Prim) -> Perhaps<(Prim, Prim)> {
    clever_commute(commute_file_dir, p, q)
}

impl Commute for Prim {
    fn commute(&self, other: &Self) -> Option<(Self, Self)> {
        speedy_commute(self, other)
            .or_else(|| everything_else_commute(self, other))
            .succeeded()
    }
}

impl<P: Commute> Commute for FL<P> {
    fn commute(&self, other: &Self) -> Option<(Self, Self)> {
        if self.is_empty() || other.is_empty() {
            return Some((other.clone(), self.clone()));
        }
        let (others, selves) = commute_rl_fl(&self.to_rl(), other)?;
        Some((others, selves.to_fl()))
    }
}

impl<P: Commute> Commute for Named<P> {
    fn commute(&self, other: &Self) -> Option<(Self, Self)> {
        if self.deps().contains(other.info()) || other.deps().contains(self.info()) {
            return None;
        }
        let (others, selves) = self.payload().commute(other.payload())?;
        Some((other.with_payload(others), self.with_payload(selves)))
    }
}

#[cfg(test)]
mod test;
