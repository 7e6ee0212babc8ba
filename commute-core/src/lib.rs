//! Patch commutation and dependency analysis.
//!
//! This crate implements the core of a commutative patch theory in the
//! style of darcs. A history is a sequence of named patches over text
//! files. Two adjacent patches *commute* when they can be swapped, possibly
//! after adjusting their contents, without changing the final state of the
//! files. Patches that cannot be moved past each other are *dependent*.
//!
//! Given a history, [`deps_graph`] computes for every patch the minimal set
//! of earlier patches it directly depends on, together with the dependencies
//! implied by those.
//!
//! ## Summary of data types
//!
//! - [`FL`] and [`RL`] Persistent forward and reverse lists, used for every
//!   sequence of patches. Pushing onto a list never changes the lists it
//!   shares nodes with.
//! - [`Patch`] A primitive change to a file: adding or removing it,
//!   replacing a run of lines ([`FileHunk`]) or replacing a token
//!   ([`TokReplace`]). Every patch can be inverted, see [`Invert`].
//! - [`Prim`] A patch together with the [`AnchorPath`] of the file it
//!   modifies.
//! - [`Named`] A sequence of patches recorded under a [`PatchInfo`], with
//!   optional explicit dependencies.
//! - [`DepsGraph`] The dependencies of every patch of a history.
//!
//! ## Usage
//!
//! ```
//! use commute_core::{Named, Patch, RL, deps_graph};
//!
//! let history: RL<_> = vec![
//!     Named::with_patch("p1", Patch::add_file()),
//!     Named::hunk("p2", 1, "", "hello"),
//!     Named::hunk("p3", 1, "", "world"),
//! ]
//! .into();
//! let graph = deps_graph(&history);
//!
//! let p3 = graph.iter().find(|(info, _)| info.name() == "p3").unwrap().1;
//! assert_eq!(p3.direct().iter().map(|i| i.name()).collect::<Vec<_>>(), ["p2"]);
//! assert_eq!(p3.indirect().iter().map(|i| i.name()).collect::<Vec<_>>(), ["p1"]);
//! ```

pub mod apply;
pub mod commute;
pub mod deps;
pub mod info;
pub mod named;
pub mod patch;
pub mod prim;
pub mod render;
pub mod seq;
pub mod serial;

#[cfg(test)]
pub(crate) mod proptest;

pub use apply::{ApplyError, Tree};
pub use commute::{Commute, Perhaps, commute_fl, commute_hunk_lines, commute_rl, commute_rl_fl};
pub use deps::{Deps, DepsGraph, all_deps, deps_graph, fold_deps};
pub use info::PatchInfo;
pub use named::Named;
pub use patch::{
    FileHunk, Invert, InvalidTokReplace, InvalidTokenClass, Patch, TokReplace, TokenClass,
    invert_fl, invert_rl,
};
pub use prim::{AnchorPath, Prim};
pub use render::RenderConfig;
pub use seq::{FL, Nil, RL};
pub use serial::{SerialError, SerialNamed, SerialPatch, SerialPatchSequence};
