//! Persistent, structurally shared patch sequences.
//!
//! Two orientations of the same singly linked structure are provided:
//!
//! - [`FL`], a forward list. [`FL::push`] conses a new element onto the
//!   *front* and [`FL::view`] yields the first element and the rest.
//! - [`RL`], a reverse list. [`RL::push`] snocs a new element onto the
//!   *back* and [`RL::view`] yields the last element and the rest.
//!
//! Both are cheap to clone: cloning shares every node. Pushing allocates a
//! single node and never changes a previously observable sequence, so an
//! algorithm can hold several versions of a list at the same time.
//!
//! Iteration, indexing, equality and conversion between the two
//! orientations always follow the *logical* order of the elements, first to
//! last.

use std::fmt;
use std::ops::{Index, Range};
use std::rc::Rc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Panic message when extracting from an empty sequence.
pub const EMPTY_SEQUENCE: &str = "cannot extract an element from an empty sequence";

#[track_caller]
fn index_out_of_range(index: usize, len: usize) -> ! {
    panic!("index {index} out of range for sequence of length {len}")
}

#[track_caller]
fn range_out_of_range(range: &Range<usize>, len: usize) -> ! {
    panic!(
        "index range {}..{} out of range for sequence of length {len}",
        range.start, range.end
    )
}

type Link<T> = Option<Rc<Node<T>>>;

#[derive(Debug)]
struct Node<T> {
    value: T,
    next: Link<T>,
}

/// A counted chain of shared nodes, starting at the most recently pushed one.
struct Chain<T> {
    top: Link<T>,
    len: usize,
}

impl<T> Chain<T> {
    const fn new() -> Self {
        Self { top: None, len: 0 }
    }

    fn push(&self, value: T) -> Self {
        let node = Node {
            value,
            next: self.top.clone(),
        };
        Self {
            top: Some(Rc::new(node)),
            len: self.len + 1,
        }
    }

    fn view(&self) -> Option<(&T, Self)> {
        let node = self.top.as_ref()?;
        let rest = Self {
            top: node.next.clone(),
            len: self.len - 1,
        };
        Some((&node.value, rest))
    }

    fn iter(&self) -> ChainIter<'_, T> {
        ChainIter {
            next: self.top.as_deref(),
            remaining: self.len,
        }
    }

    /// The chain below the first `n` nodes, sharing them.
    fn skip(&self, n: usize) -> Self {
        debug_assert!(n <= self.len);
        let mut top = self.top.as_ref();
        for _ in 0..n {
            top = top.and_then(|node| node.next.as_ref());
        }
        Self {
            top: top.cloned(),
            len: self.len - n,
        }
    }

    /// Copies of the first `n` nodes, stacked in the same order on `base`.
    fn copy_onto(&self, n: usize, base: Self) -> Self
    where
        T: Clone,
    {
        let prefix: Vec<&T> = self.iter().take(n).collect();
        prefix
            .into_iter()
            .rev()
            .fold(base, |chain, value| chain.push(value.clone()))
    }

    /// Replaces `remove` nodes at depth `at` with `insert`.
    ///
    /// Only the nodes above `at` are copied, the rest are shared.
    fn splice(&self, at: usize, remove: usize, insert: Option<T>) -> Self
    where
        T: Clone,
    {
        let mut rest = self.skip(at + remove);
        if let Some(value) = insert {
            rest = rest.push(value);
        }
        self.copy_onto(at, rest)
    }

    /// The nodes at depths `range`.
    fn slice(&self, range: Range<usize>) -> Self
    where
        T: Clone,
    {
        let rest = self.skip(range.start);
        if range.end == self.len {
            rest
        } else {
            rest.copy_onto(range.len(), Self::new())
        }
    }
}

impl<T> Clone for Chain<T> {
    fn clone(&self) -> Self {
        Self {
            top: self.top.clone(),
            len: self.len,
        }
    }
}

// Unlink uniquely owned nodes one at a time, so that dropping a long list
// does not recurse once per element.
impl<T> Drop for Chain<T> {
    fn drop(&mut self) {
        let mut link = self.top.take();
        while let Some(node) = link {
            match Rc::try_unwrap(node) {
                Ok(mut node) => link = node.next.take(),
                Err(_) => break,
            }
        }
    }
}

/// Iterator over a chain, from the most recently pushed node.
struct ChainIter<'a, T> {
    next: Option<&'a Node<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for ChainIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.next.as_deref();
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for ChainIter<'_, T> {}

/// The empty sequence.
///
/// Compares equal to every [`FL`] and [`RL`] of length zero, and converts
/// into either of them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Nil;

/// A persistent forward list.
pub struct FL<T>(Chain<T>);

/// A persistent reverse list.
pub struct RL<T>(Chain<T>);

/// Iterator over the elements of a [`FL`], first to last.
pub struct FLIter<'a, T>(ChainIter<'a, T>);

impl<'a, T> Iterator for FLIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<T> ExactSizeIterator for FLIter<'_, T> {}

/// Iterator over the elements of a [`RL`], first to last.
pub type RLIter<'a, T> = std::iter::Rev<std::vec::IntoIter<&'a T>>;

impl<T> FL<T> {
    /// The empty forward list.
    pub const fn new() -> Self {
        Self(Chain::new())
    }

    /// Number of elements in the list.
    pub fn len(&self) -> usize {
        self.0.len
    }

    /// Whether the list has no elements.
    pub fn is_empty(&self) -> bool {
        self.0.len == 0
    }

    /// Returns a new list with `item` in front of the elements of `self`.
    ///
    /// `self` is left untouched and shares all of its nodes with the result.
    #[must_use]
    pub fn push(&self, item: T) -> Self {
        Self(self.0.push(item))
    }

    /// The first element and the rest of the list, or `None` if empty.
    pub fn view(&self) -> Option<(&T, Self)> {
        self.0.view().map(|(first, rest)| (first, Self(rest)))
    }

    /// The first element and the rest of the list.
    ///
    /// # Panics
    ///
    /// If the list is empty.
    pub fn extract(&self) -> (&T, Self) {
        self.view().expect(EMPTY_SEQUENCE)
    }

    /// The first element of the list.
    pub fn first(&self) -> Option<&T> {
        self.0.top.as_ref().map(|node| &node.value)
    }

    /// The element at position `index`, counting from the front.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.iter().nth(index)
    }

    /// Iterate over the elements, first to last.
    pub fn iter(&self) -> FLIter<'_, T> {
        FLIter(self.0.iter())
    }

    /// Returns the elements of `self` followed by those of `other`.
    ///
    /// `other` is shared by the result, the elements of `self` are copied.
    #[must_use]
    pub fn append(&self, other: &Self) -> Self
    where
        T: Clone,
    {
        Self(self.0.copy_onto(self.len(), other.0.clone()))
    }

    /// Returns a new list with `item` at position `index`.
    ///
    /// # Panics
    ///
    /// If `index > len`.
    #[must_use]
    pub fn insert_at(&self, index: usize, item: T) -> Self
    where
        T: Clone,
    {
        if index > self.len() {
            index_out_of_range(index, self.len());
        }
        Self(self.0.splice(index, 0, Some(item)))
    }

    /// Returns a new list without the element at position `index`.
    ///
    /// # Panics
    ///
    /// If `index >= len`.
    #[must_use]
    pub fn remove_at(&self, index: usize) -> Self
    where
        T: Clone,
    {
        if index >= self.len() {
            index_out_of_range(index, self.len());
        }
        Self(self.0.splice(index, 1, None))
    }

    /// The elements at positions `range`.
    ///
    /// A slice reaching the end of the list shares its nodes.
    ///
    /// # Panics
    ///
    /// If the range is decreasing or extends past the end of the list.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> Self
    where
        T: Clone,
    {
        if range.start > range.end || range.end > self.len() {
            range_out_of_range(&range, self.len());
        }
        Self(self.0.slice(range))
    }

    /// The same elements as a reverse list.
    pub fn to_rl(&self) -> RL<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}

impl<T> RL<T> {
    /// The empty reverse list.
    pub const fn new() -> Self {
        Self(Chain::new())
    }

    /// Number of elements in the list.
    pub fn len(&self) -> usize {
        self.0.len
    }

    /// Whether the list has no elements.
    pub fn is_empty(&self) -> bool {
        self.0.len == 0
    }

    /// Returns a new list with `item` after the elements of `self`.
    ///
    /// `self` is left untouched and shares all of its nodes with the result.
    #[must_use]
    pub fn push(&self, item: T) -> Self {
        Self(self.0.push(item))
    }

    /// The last element and the list preceding it, or `None` if empty.
    pub fn view(&self) -> Option<(&T, Self)> {
        self.0.view().map(|(last, rest)| (last, Self(rest)))
    }

    /// The last element and the list preceding it.
    ///
    /// # Panics
    ///
    /// If the list is empty.
    pub fn extract(&self) -> (&T, Self) {
        self.view().expect(EMPTY_SEQUENCE)
    }

    /// The last element of the list.
    pub fn last(&self) -> Option<&T> {
        self.0.top.as_ref().map(|node| &node.value)
    }

    /// The element at position `index`, counting from the front.
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len() {
            return None;
        }
        self.iter_rev().nth(self.len() - 1 - index)
    }

    /// Returns the elements of `self` followed by those of `other`.
    ///
    /// `self` is shared by the result, the elements of `other` are copied.
    #[must_use]
    pub fn append(&self, other: &Self) -> Self
    where
        T: Clone,
    {
        Self(other.0.copy_onto(other.len(), self.0.clone()))
    }

    /// Returns a new list with `item` at position `index`, counting from
    /// the front.
    ///
    /// # Panics
    ///
    /// If `index > len`.
    #[must_use]
    pub fn insert_at(&self, index: usize, item: T) -> Self
    where
        T: Clone,
    {
        let len = self.len();
        if index > len {
            index_out_of_range(index, len);
        }
        Self(self.0.splice(len - index, 0, Some(item)))
    }

    /// Returns a new list without the element at position `index`, counting
    /// from the front.
    ///
    /// # Panics
    ///
    /// If `index >= len`.
    #[must_use]
    pub fn remove_at(&self, index: usize) -> Self
    where
        T: Clone,
    {
        let len = self.len();
        if index >= len {
            index_out_of_range(index, len);
        }
        Self(self.0.splice(len - 1 - index, 1, None))
    }

    /// The elements at positions `range`, counting from the front.
    ///
    /// A slice starting at the front of the list shares its nodes.
    ///
    /// # Panics
    ///
    /// If the range is decreasing or extends past the end of the list.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> Self
    where
        T: Clone,
    {
        let len = self.len();
        if range.start > range.end || range.end > len {
            range_out_of_range(&range, len);
        }
        Self(self.0.slice(len - range.end..len - range.start))
    }

    /// Iterate over the elements, first to last.
    ///
    /// Reverse lists are linked from the back, so this collects references
    /// before yielding. Prefer [`RL::iter_rev`] when the order does not
    /// matter.
    pub fn iter(&self) -> RLIter<'_, T> {
        self.iter_rev().collect::<Vec<_>>().into_iter().rev()
    }

    /// Iterate over the elements, last to first.
    pub fn iter_rev(&self) -> impl ExactSizeIterator<Item = &T> + '_ {
        self.0.iter()
    }

    /// The same elements as a forward list.
    pub fn to_fl(&self) -> FL<T>
    where
        T: Clone,
    {
        let mut fl = FL::new();
        for item in self.iter_rev() {
            fl = fl.push(item.clone());
        }
        fl
    }
}

macro_rules! impl_common {
    ($seq:ident) => {
        impl<T> Default for $seq<T> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<T> Clone for $seq<T> {
            fn clone(&self) -> Self {
                Self(self.0.clone())
            }
        }

        impl<T> From<Nil> for $seq<T> {
            fn from(_: Nil) -> Self {
                Self::new()
            }
        }

        impl<T: PartialEq> PartialEq for $seq<T> {
            fn eq(&self, other: &Self) -> bool {
                self.len() == other.len() && self.iter().eq(other.iter())
            }
        }

        impl<T: Eq> Eq for $seq<T> {}

        impl<T> PartialEq<Nil> for $seq<T> {
            fn eq(&self, _: &Nil) -> bool {
                self.is_empty()
            }
        }

        impl<T> PartialEq<$seq<T>> for Nil {
            fn eq(&self, other: &$seq<T>) -> bool {
                other.is_empty()
            }
        }

        impl<T> Index<usize> for $seq<T> {
            type Output = T;

            fn index(&self, index: usize) -> &T {
                self.get(index)
                    .unwrap_or_else(|| index_out_of_range(index, self.len()))
            }
        }

        impl<T: fmt::Debug> fmt::Debug for $seq<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", stringify!($seq))?;
                f.debug_list().entries(self.iter()).finish()
            }
        }

        impl<T: Serialize> Serialize for $seq<T> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_seq(self.iter())
            }
        }

        impl<'de, T: Deserialize<'de>> Deserialize<'de> for $seq<T> {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let items = Vec::<T>::deserialize(deserializer)?;
                Ok(items.into_iter().collect())
            }
        }
    };
}

impl_common!(FL);
impl_common!(RL);

impl<'a, T> IntoIterator for &'a FL<T> {
    type Item = &'a T;
    type IntoIter = FLIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a RL<T> {
    type Item = &'a T;
    type IntoIter = RLIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> FromIterator<T> for FL<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let items: Vec<T> = iter.into_iter().collect();
        let mut fl = FL::new();
        for item in items.into_iter().rev() {
            fl = fl.push(item);
        }
        fl
    }
}

impl<T> FromIterator<T> for RL<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut rl = RL::new();
        for item in iter {
            rl = rl.push(item);
        }
        rl
    }
}

impl<T> From<Vec<T>> for FL<T> {
    fn from(items: Vec<T>) -> Self {
        items.into_iter().collect()
    }
}

impl<T> From<Vec<T>> for RL<T> {
    fn from(items: Vec<T>) -> Self {
        items.into_iter().collect()
    }
}

impl<T: Clone> From<&RL<T>> for FL<T> {
    fn from(rl: &RL<T>) -> Self {
        rl.to_fl()
    }
}

impl<T: Clone> From<&FL<T>> for RL<T> {
    fn from(fl: &FL<T>) -> Self {
        fl.to_rl()
    }
}
