use std::rc::Rc;

use ::proptest::prelude::*;
use rstest::rstest;

use super::*;
use crate::apply::Tree;
use crate::info::PatchInfo;
use crate::prim::AnchorPath;
use crate::proptest::{any_prim, file_with_hunks};
use crate::seq::{FL, RL};

fn on_a(patch: Patch) -> Prim {
    Prim::on(["a.txt"], patch)
}

fn tok(old: &str, new: &str) -> Patch {
    Patch::tok_replace("a-z", old, new).unwrap()
}

#[rstest]
#[case::abutting_with_empty_old((1, 0, 3, 1, 0, 2), None)]
#[case::disjoint((1, 0, 3, 5, 0, 2), Some((2, 1)))]
#[case::second_before_first((6, 1, 1, 2, 2, 1), Some((2, 5)))]
#[case::overlapping((2, 2, 2, 3, 1, 1), None)]
#[case::abutting_non_empty((1, 1, 2, 3, 1, 1), Some((2, 1)))]
#[case::abutting_non_empty_before((4, 1, 1, 2, 2, 3), Some((2, 5)))]
#[case::abutting_zero_new((1, 1, 0, 1, 1, 1), None)]
#[case::far_apart((1, 0, 1, usize::MAX, 0, 1), Some((usize::MAX - 1, 1)))]
#[case::first_end_overflows((usize::MAX, 0, 1, 1, 0, 1), None)]
#[case::second_end_overflows((1, 0, 1, usize::MAX, 1, 1), None)]
fn hunk_lines(
    #[case] (line1, old1, new1, line2, old2, new2): (usize, usize, usize, usize, usize, usize),
    #[case] expected: Option<(usize, usize)>,
) {
    assert_eq!(
        commute_hunk_lines(line1, old1, new1, line2, old2, new2),
        expected
    );
}

#[test]
fn perhaps_short_circuits() {
    let failed: Perhaps<u8> = Perhaps::Failed;
    assert_eq!(failed.or_else(|| Perhaps::Succeeded(1)), Perhaps::Failed);
    assert_eq!(Perhaps::Unknown.or_else(|| Perhaps::Succeeded(1)), Perhaps::Succeeded(1));
    assert_eq!(Perhaps::Succeeded(2).or_else(|| Perhaps::Failed), Perhaps::Succeeded(2));
    assert_eq!(Perhaps::from(None::<u8>), Perhaps::Failed);
    assert_eq!(Perhaps::Succeeded(3).map(|x| x * 2).succeeded(), Some(6));
}

#[test]
fn hunks_shift_lines() {
    let p = on_a(Patch::hunk(1, "", "a\nb\nc"));
    let q = on_a(Patch::hunk(5, "", "d\ne"));
    let (q2, p2) = p.commute(&q).unwrap();
    assert_eq!(q2, on_a(Patch::hunk(2, "", "d\ne")));
    assert_eq!(p2, p);
}

#[test]
fn overlapping_hunks_fail() {
    let p = on_a(Patch::hunk(1, "", "hello"));
    let q = on_a(Patch::hunk(1, "", "world"));
    assert_eq!(commute_file_dir(&p, &q), Perhaps::Failed);
    assert_eq!(p.commute(&q), None);
}

#[test]
fn different_files_share_patches() {
    let p = on_a(Patch::hunk(1, "", "hello"));
    let q = Prim::on(["b.txt"], Patch::hunk(1, "", "world"));
    let (q2, p2) = p.commute(&q).unwrap();
    assert!(Rc::ptr_eq(q2.shared_patch(), q.shared_patch()));
    assert!(Rc::ptr_eq(p2.shared_patch(), p.shared_patch()));
}

#[rstest]
#[case(Patch::add_file())]
#[case(Patch::remove_file())]
#[case(Patch::hunk(4, "x", "y"))]
#[case(tok("foo", "bar"))]
fn identity_hunk_commutes_with_anything(#[case] patch: Patch) {
    let noop = on_a(Patch::hunk(3, "", ""));
    let other = on_a(patch);
    assert_eq!(noop.commute(&other), Some((other.clone(), noop.clone())));
    assert_eq!(other.commute(&noop), Some((noop, other)));
}

#[rstest]
#[case(Patch::add_file(), Patch::hunk(1, "", "x"))]
#[case(Patch::hunk(1, "x", ""), Patch::remove_file())]
#[case(Patch::add_file(), tok("foo", "bar"))]
#[case(Patch::add_file(), Patch::remove_file())]
fn file_creation_does_not_commute(#[case] p: Patch, #[case] q: Patch) {
    let (p, q) = (on_a(p), on_a(q));
    assert_eq!(commute_file_dir(&p, &q), Perhaps::Unknown);
    assert_eq!(everything_else_commute(&p, &q), Perhaps::Unknown);
    assert_eq!(p.commute(&q), None);
}

#[test]
fn hunk_past_tok_replace() {
    let h = on_a(Patch::hunk(2, "foo x", "foo y\nbaz"));
    let t = on_a(tok("foo", "qux"));
    let (t2, h2) = h.commute(&t).unwrap();
    assert_eq!(t2, t);
    assert_eq!(h2, on_a(Patch::hunk(2, "qux x", "qux y\nbaz")));
}

#[test]
fn tok_replace_past_hunk() {
    let t = on_a(tok("foo", "qux"));
    let h = on_a(Patch::hunk(2, "qux x", "qux y"));
    assert_eq!(commute_fp(t.shared_patch(), h.shared_patch()), Perhaps::Unknown);
    let (h2, t2) = t.commute(&h).unwrap();
    assert_eq!(h2, on_a(Patch::hunk(2, "foo x", "foo y")));
    assert_eq!(t2, t);
}

#[test]
fn hunk_containing_new_token_fails() {
    let h = on_a(Patch::hunk(1, "", "bar"));
    let t = on_a(tok("foo", "bar"));
    assert_eq!(commute_file_dir(&h, &t), Perhaps::Failed);
    assert_eq!(h.commute(&t), None);
}

#[rstest]
#[case::chained(tok("foo", "bar"), tok("bar", "baz"), false)]
#[case::same_old(tok("foo", "bar"), tok("foo", "baz"), false)]
#[case::same_new(tok("foo", "baz"), tok("bar", "baz"), false)]
#[case::swapped(tok("foo", "bar"), tok("bar", "foo"), false)]
#[case::classes(tok("foo", "bar"), Patch::tok_replace("a-z_", "baz", "qux").unwrap(), false)]
#[case::independent(tok("foo", "bar"), tok("baz", "qux"), true)]
fn tok_replace_pairs(#[case] p: Patch, #[case] q: Patch, #[case] commutes: bool) {
    let (p, q) = (on_a(p), on_a(q));
    assert_eq!(p.commute(&q).is_some(), commutes);
    assert_eq!(q.commute(&p).is_some(), commutes);
}

#[test]
fn clever_commute_inverts_back() {
    // A rule that only knows how to commute hunks past token replacements.
    let rule = |p: &Prim, q: &Prim| match (p.patch(), q.patch()) {
        (Patch::Hunk(_), Patch::TokReplace(_)) => commute_file_dir(p, q),
        _ => Perhaps::Unknown,
    };
    let t = on_a(tok("foo", "qux"));
    let h = on_a(Patch::hunk(1, "qux", "qux qux"));
    let (h2, t2) = clever_commute(rule, &t, &h).succeeded().unwrap();
    assert_eq!(h2, on_a(Patch::hunk(1, "foo", "foo foo")));
    assert_eq!(t2, t);
}

#[test]
fn commute_fl_moves_through_list() {
    let x = on_a(Patch::hunk(1, "", "head"));
    let ys: FL<Prim> = vec![
        on_a(Patch::hunk(3, "", "a")),
        Prim::on(["b.txt"], Patch::add_file()),
        on_a(Patch::hunk(5, "b", "c")),
    ]
    .into();
    let (ys2, x2) = commute_fl(&x, &ys).unwrap();
    assert_eq!(x2, x);
    let expected: FL<Prim> = vec![
        on_a(Patch::hunk(2, "", "a")),
        Prim::on(["b.txt"], Patch::add_file()),
        on_a(Patch::hunk(4, "b", "c")),
    ]
    .into();
    assert_eq!(ys2, expected);

    let blocked = ys.push(on_a(Patch::hunk(1, "", "first")));
    assert_eq!(commute_fl(&x, &blocked), None);
}

#[test]
fn commute_rl_moves_back() {
    let xs: RL<Prim> = vec![
        on_a(Patch::hunk(1, "", "a")),
        on_a(Patch::hunk(2, "", "b")),
    ]
    .into();
    let y = on_a(Patch::hunk(4, "", "tail"));
    let (y2, xs2) = commute_rl(&xs, &y).unwrap();
    assert_eq!(y2, on_a(Patch::hunk(2, "", "tail")));
    assert_eq!(xs2, xs);
}

#[test]
fn commute_rl_fl_swaps_lists() {
    let xs: RL<Prim> = vec![on_a(Patch::hunk(1, "", "a"))].into();
    let ys: FL<Prim> = vec![
        on_a(Patch::hunk(3, "", "b")),
        on_a(Patch::hunk(5, "", "c")),
    ]
    .into();
    let (ys2, xs2) = commute_rl_fl(&xs, &ys).unwrap();
    let expected: FL<Prim> = vec![
        on_a(Patch::hunk(2, "", "b")),
        on_a(Patch::hunk(4, "", "c")),
    ]
    .into();
    assert_eq!(ys2, expected);
    assert_eq!(xs2, xs);

    let (back_xs, back_ys) = ys2.commute(&xs2.to_fl()).unwrap();
    assert_eq!(back_xs, xs.to_fl());
    assert_eq!(back_ys, ys);
}

#[test]
fn named_explicit_dependency() {
    let p = Named::with_patch("p", Patch::hunk(1, "", "a"));
    let q = Named::with_patch("q", Patch::hunk(9, "", "b"));
    let (q2, p2) = p.commute(&q).unwrap();
    assert_eq!(q2.info(), q.info());
    assert_eq!(p2.info(), p.info());
    assert_eq!(q2.payload()[0].patch(), &Patch::hunk(8, "", "b"));

    let q = q.with_deps([PatchInfo::new("p")]);
    assert_eq!(p.commute(&q), None);
}

#[test]
fn empty_payloads_swap() {
    let p: Named<Prim> = Named::new(PatchInfo::new("empty"), Default::default(), FL::new());
    let q = Named::with_patch("q", Patch::add_file());
    let (q2, p2) = p.commute(&q).unwrap();
    assert_eq!((q2, p2), (q, p));
}

#[test]
fn default_anchor_is_shared() {
    let p = Prim::from(Patch::add_file());
    assert_eq!(p.anchor(), &AnchorPath::default());
    assert!(speedy_commute(&p, &on_a(Patch::add_file())).is_succeeded());
}

proptest! {
    #[test]
    fn commute_is_symmetric(p in any_prim(), q in any_prim()) {
        if let Some((q2, p2)) = p.commute(&q) {
            prop_assert_eq!(q2.commute(&p2), Some((p, q)));
        }
    }

    #[test]
    fn invert_is_an_involution(p in any_prim()) {
        prop_assert_eq!(p.invert().invert(), p);
    }

    #[test]
    fn commute_respects_inversion(p in any_prim(), q in any_prim()) {
        if let Some((q2, p2)) = p.commute(&q) {
            prop_assert_eq!(
                q.invert().commute(&p.invert()),
                Some((p2.invert(), q2.invert()))
            );
        }
    }

    #[test]
    fn commuted_hunks_have_the_same_effect((file, first, second) in file_with_hunks()) {
        let path = AnchorPath::new(["a.txt"]);
        let tree = Tree::new().with_file(path.clone(), &file.join("\n"));
        let p = Prim::new(path.clone(), Patch::Hunk(first));
        let q = Prim::new(path.clone(), Patch::Hunk(second));

        let mut expected = tree.clone();
        expected.apply_all([&p, &q]).unwrap();
        if let Some((q2, p2)) = p.commute(&q) {
            let mut actual = tree.clone();
            prop_assert_eq!(actual.apply_all([&q2, &p2]), Ok(()));
            prop_assert_eq!(actual, expected);
        }
    }
}
