use quickcheck_macros::quickcheck;
use scroll_chart_wasm::domain::series::{Point, PointSequence, merge_by_time};
use std::collections::BTreeSet;

fn points(raw: &[(i16, u8)]) -> Vec<Point> {
    raw.iter().map(|&(t, y)| Point::at(t as i64 * 1_000, y as f64)).collect()
}

fn is_canonical(points: &[Point]) -> bool {
    points.windows(2).all(|w| w[0].t < w[1].t)
}

fn timestamps(points: &[Point]) -> BTreeSet<i64> {
    points.iter().map(|p| p.t.value()).collect()
}

#[quickcheck]
fn merge_is_sorted_and_unique(left: Vec<(i16, u8)>, right: Vec<(i16, u8)>) -> bool {
    is_canonical(&merge_by_time(&points(&left), &points(&right)))
}

#[quickcheck]
fn merge_keeps_every_timestamp_once(left: Vec<(i16, u8)>, right: Vec<(i16, u8)>) -> bool {
    let (left, right) = (points(&left), points(&right));
    let merged = merge_by_time(&left, &right);
    let expected: BTreeSet<i64> = timestamps(&left).union(&timestamps(&right)).copied().collect();
    timestamps(&merged) == expected && merged.len() == expected.len()
}

#[quickcheck]
fn integrate_is_idempotent(base: Vec<(i16, u8)>, batch: Vec<(i16, u8)>) -> bool {
    let sequence = PointSequence::from_points(&points(&base));
    let once = sequence.integrate(&points(&batch));
    let twice = once.integrate(&points(&batch));
    once == twice
}

#[quickcheck]
fn integrate_never_changes_known_values(base: Vec<(i16, u8)>, batch: Vec<(i16, u8)>) -> bool {
    let sequence = PointSequence::from_points(&points(&base));
    let merged = sequence.integrate(&points(&batch));
    sequence
        .points()
        .iter()
        .all(|p| merged.points().iter().any(|m| m == p))
}

#[test]
fn left_argument_wins_ties() {
    let merged = merge_by_time(&[Point::at(1, 10.0), Point::at(2, 20.0)], &[Point::at(2, 99.0), Point::at(0, 5.0)]);
    assert_eq!(merged, vec![Point::at(0, 5.0), Point::at(1, 10.0), Point::at(2, 20.0)]);
}

#[test]
fn unsorted_batch_with_duplicates_is_canonicalized() {
    let sequence = PointSequence::from_points(&[Point::at(3, 3.0), Point::at(1, 1.0), Point::at(3, 4.0)]);
    assert_eq!(sequence.points(), &[Point::at(1, 1.0), Point::at(3, 3.0)]);
}

#[test]
fn older_batch_lands_in_front() {
    let sequence = PointSequence::from_points(&[Point::at(10, 1.0), Point::at(11, 1.0)]);
    let merged = sequence.integrate(&[Point::at(8, 2.0), Point::at(9, 2.0)]);
    assert_eq!(merged.len(), 4);
    assert_eq!(merged.count_before(sequence.first().unwrap().t), 2);
}
