//! Strategies for generating patches in property tests.
//!
//! Patches are drawn from tiny alphabets, so that generated pairs touch the
//! same file, overlap and share tokens often enough to exercise every rule
//! of the commutation table.

use ::proptest::collection::vec;
use ::proptest::prelude::*;
use ::proptest::sample::select;
use smol_str::SmolStr;

use crate::patch::{FileHunk, Patch};
use crate::prim::{AnchorPath, Prim};

const LINES: [&str; 3] = ["x", "y", "z"];
const TOKENS: [&str; 4] = ["foo", "bar", "baz", "qux"];
const CLASSES: [&str; 2] = ["a-z", "a-z_"];

/// A single line of text.
pub fn any_line() -> impl Strategy<Value = SmolStr> {
    select(LINES.to_vec()).prop_map(SmolStr::from)
}

/// A line of text made of tokens.
pub fn any_token_line() -> impl Strategy<Value = SmolStr> {
    vec(select(TOKENS.to_vec()), 0..3).prop_map(|toks| toks.join(" ").into())
}

/// A short sequence of lines.
pub fn any_lines() -> impl Strategy<Value = Vec<SmolStr>> {
    vec(prop_oneof![any_line(), any_token_line()], 0..3)
}

/// A hunk near the start of a file.
pub fn any_hunk() -> impl Strategy<Value = Patch> {
    (1usize..6, any_lines(), any_lines())
        .prop_map(|(line, old, new)| Patch::Hunk(FileHunk::new(line, old, new)))
}

/// A replacement between two distinct tokens.
pub fn any_tok_replace() -> impl Strategy<Value = Patch> {
    (select(CLASSES.to_vec()), select(TOKENS.to_vec()), select(TOKENS.to_vec()))
        .prop_filter("tokens must differ", |(_, old, new)| old != new)
        .prop_map(|(class, old, new)| {
            Patch::tok_replace(class, old, new).expect("tokens are in every class")
        })
}

/// Any patch.
pub fn any_patch() -> impl Strategy<Value = Patch> {
    prop_oneof![
        1 => Just(Patch::AddFile),
        1 => Just(Patch::RemoveFile),
        4 => any_hunk(),
        2 => any_tok_replace(),
    ]
}

/// One of two files.
pub fn any_anchor() -> impl Strategy<Value = AnchorPath> {
    prop_oneof![
        3 => Just(AnchorPath::new(["a.txt"])),
        1 => Just(AnchorPath::new(["b.txt"])),
    ]
}

/// Any primitive patch.
pub fn any_prim() -> impl Strategy<Value = Prim> {
    (any_anchor(), any_patch()).prop_map(|(anchor, patch)| Prim::new(anchor, patch))
}

/// A file together with a hunk that applies to it.
pub fn file_with_hunk() -> impl Strategy<Value = (Vec<SmolStr>, FileHunk)> {
    vec(any_line(), 0..6).prop_flat_map(|file| {
        let len = file.len();
        (1..=len + 1, any_lines()).prop_flat_map(move |(line, new)| {
            let file = file.clone();
            (0..=len + 1 - line).prop_map(move |old_len| {
                let old = file[line - 1..line - 1 + old_len].to_vec();
                (file.clone(), FileHunk::new(line, old, new.clone()))
            })
        })
    })
}

/// A file, a hunk that applies to it, and a hunk that applies to the
/// result.
pub fn file_with_hunks() -> impl Strategy<Value = (Vec<SmolStr>, FileHunk, FileHunk)> {
    file_with_hunk().prop_flat_map(|(file, first)| {
        let mut edited = file.clone();
        let start = first.line() - 1;
        edited.splice(start..start + first.old().len(), first.new_lines().iter().cloned());
        let len = edited.len();
        (1..=len + 1, any_lines()).prop_flat_map(move |(line, new)| {
            let (file, first, edited) = (file.clone(), first.clone(), edited.clone());
            (0..=len + 1 - line).prop_map(move |old_len| {
                let old = edited[line - 1..line - 1 + old_len].to_vec();
                (file.clone(), first.clone(), FileHunk::new(line, old, new.clone()))
            })
        })
    })
}
