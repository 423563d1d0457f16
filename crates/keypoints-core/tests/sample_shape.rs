//! Integration test: reduce the 100-point sample outline shipped in `assets/`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;

use keypoints_core::{
    KeypointsError, Point, ReduceConfig, Reducer, ReducerKind, Ring, parse_points, reduce,
    simplify,
};

fn sample_points() -> Vec<Point> {
    let workspace_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf();
    let path = workspace_root.join("assets/shapes/flower.txt");
    assert!(path.exists(), "sample shape not found at {path:?}");
    let text = std::fs::read_to_string(&path).unwrap();
    parse_points(&text).expect("sample shape should parse")
}

#[test]
fn sample_has_one_hundred_points() {
    assert_eq!(sample_points().len(), 100);
}

#[test]
fn reduce_sample_to_forty() {
    let input = sample_points();
    let reduction = simplify(&input, &ReduceConfig::with_target(40)).unwrap();

    assert_eq!(reduction.outline.len(), 40);
    assert_eq!(reduction.removals.len(), 60);
    assert_eq!(reduction.initial.points(), input.as_slice());

    // Every survivor is an input point, and survivors keep their input order.
    let mut last_index = None;
    for p in reduction.outline.points() {
        let index = input
            .iter()
            .position(|q| q == p)
            .expect("survivor must come from the input");
        if let Some(prev) = last_index {
            assert!(index > prev, "survivors out of order at {p:?}");
        }
        last_index = Some(index);
    }
}

#[test]
fn survivors_and_removals_partition_the_input() {
    let input = sample_points();
    let mut ring = Ring::build(&input).unwrap();
    let removals = reduce(&mut ring, 25).unwrap();

    let mut seen: Vec<usize> = ring
        .nodes()
        .map(|n| n.index())
        .chain(removals.iter().map(|r| r.node.index()))
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..input.len()).collect::<Vec<_>>());
    for r in &removals {
        assert_eq!(input[r.node.index()], r.point);
    }
}

#[test]
fn ring_stays_closed_through_every_step() {
    let input = sample_points();
    let mut ring = Ring::build(&input).unwrap();
    for target in (2..input.len()).rev() {
        let removals = reduce(&mut ring, target).unwrap();
        assert_eq!(removals.len(), 1);
        assert_eq!(ring.len(), target);
        assert!(ring.is_closed_loop(), "broken at size {target}");
    }
    assert_eq!(
        reduce(&mut ring, 1).unwrap_err(),
        KeypointsError::UnreachableTarget {
            target: 1,
            minimum: 2
        }
    );
}

#[test]
fn step_by_step_matches_single_run() {
    let input = sample_points();

    let mut stepped = Ring::build(&input).unwrap();
    for target in (40..input.len()).rev() {
        reduce(&mut stepped, target).unwrap();
    }

    let mut direct = Ring::build(&input).unwrap();
    reduce(&mut direct, 40).unwrap();

    assert_eq!(stepped.to_polyline(), direct.to_polyline());
}

#[test]
fn strategies_agree_on_sample() {
    let input = sample_points();
    for target in [2, 3, 10, 40, 99, 100] {
        let mut a = Ring::build(&input).unwrap();
        let mut b = Ring::build(&input).unwrap();
        let ra = ReducerKind::Rescan.reduce(&mut a, target).unwrap();
        let rb = ReducerKind::LazyHeap.reduce(&mut b, target).unwrap();
        assert_eq!(ra, rb, "target {target}");
        assert_eq!(a.to_polyline(), b.to_polyline(), "target {target}");
    }
}

#[test]
fn reduction_at_full_size_is_identity() {
    let input = sample_points();
    let reduction = simplify(&input, &ReduceConfig::with_target(100)).unwrap();
    assert!(reduction.removals.is_empty());
    assert_eq!(reduction.outline, reduction.initial);
}
