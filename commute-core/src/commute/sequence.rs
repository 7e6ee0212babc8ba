//! Commuting patches past whole sequences.
//!
//! Each operation either commutes every pair along the way or fails as a
//! whole; there is no partial result.

use super::Commute;
use crate::seq::{FL, RL};

/// Commute `x` past every element of `ys`, front to back.
///
/// Returns the commuted list followed by the transformed `x`.
pub fn commute_fl<P: Commute>(x: &P, ys: &FL<P>) -> Option<(FL<P>, P)> {
    let mut x = x.clone();
    let mut moved = Vec::with_capacity(ys.len());
    for y in ys.iter() {
        let (y2, x2) = x.commute(y)?;
        moved.push(y2);
        x = x2;
    }
    Some((moved.into(), x))
}

/// Commute every element of `xs`, back to front, past `y`.
///
/// Returns the transformed `y` followed by the commuted list.
pub fn commute_rl<P: Commute>(xs: &RL<P>, y: &P) -> Option<(P, RL<P>)> {
    let mut y = y.clone();
    let mut moved = Vec::with_capacity(xs.len());
    for x in xs.iter_rev() {
        let (y2, x2) = x.commute(&y)?;
        moved.push(x2);
        y = y2;
    }
    moved.reverse();
    Some((y, moved.into()))
}

/// Commute the reverse list `xs` past the forward list `ys`.
///
/// The elements of `ys` are moved one at a time, front to back, past the
/// whole of `xs`.
pub fn commute_rl_fl<P: Commute>(xs: &RL<P>, ys: &FL<P>) -> Option<(FL<P>, RL<P>)> {
    let mut xs = xs.clone();
    let mut moved = Vec::with_capacity(ys.len());
    for y in ys.iter() {
        let (y2, xs2) = commute_rl(&xs, y)?;
        moved.push(y2);
        xs = xs2;
    }
    Some((moved.into(), xs))
}
