use super::merge::merge_by_time;
use super::value_objects::{Price, Ticker, Timestamp};
use crate::domain::viewport::VisibleRange;
use derive_more::Constructor;
use serde::{Deserialize, Serialize};

/// Domain entity - a single price observation
#[derive(Debug, Clone, Copy, PartialEq, Constructor, Serialize, Deserialize)]
pub struct Point {
    pub t: Timestamp,
    pub y: Price,
}

impl Point {
    /// Shorthand for raw millisecond / value pairs
    pub fn at(t: i64, y: f64) -> Self {
        Self { t: Timestamp::from(t), y: Price::from(y) }
    }
}

/// A batch of points tagged with the ticker it belongs to.
/// Batches handed out by fetchers are ordered but not necessarily deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub ticker: Ticker,
    pub points: Vec<Point>,
}

impl PriceSeries {
    pub fn new(ticker: Ticker, points: Vec<Point>) -> Self {
        Self { ticker, points }
    }

    pub fn empty(ticker: Ticker) -> Self {
        Self { ticker, points: Vec::new() }
    }
}

/// Domain entity - the full known sequence of a session.
///
/// Always ascending by `t` with no duplicate timestamps. Never evicts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSequence {
    points: Vec<Point>,
}

impl PointSequence {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Build a canonical sequence from an arbitrary batch
    pub fn from_points(points: &[Point]) -> Self {
        Self { points: merge_by_time(points, &[]) }
    }

    /// Union of this sequence and `new_points`, keyed by `t`.
    ///
    /// On a timestamp collision the point already in the sequence is kept,
    /// so values already on screen never change under the user.
    pub fn integrate(&self, new_points: &[Point]) -> PointSequence {
        if new_points.is_empty() {
            return self.clone();
        }
        Self { points: merge_by_time(&self.points, new_points) }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn first(&self) -> Option<&Point> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Point> {
        self.points.last()
    }

    /// Points with `t` strictly before `t`
    pub fn count_before(&self, t: Timestamp) -> usize {
        self.points.partition_point(|p| p.t < t)
    }

    /// Points with `t` strictly after `t`
    pub fn count_after(&self, t: Timestamp) -> usize {
        self.points.len() - self.points.partition_point(|p| p.t <= t)
    }

    /// Inclusive slice addressed by a visible range; empty when out of bounds
    pub fn slice(&self, range: VisibleRange) -> &[Point] {
        if self.points.is_empty() || range.start > range.end {
            return &[];
        }
        let end = range.end.min(self.points.len() - 1);
        if range.start > end {
            return &[];
        }
        &self.points[range.start..=end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hourly(from: i64, to: i64) -> Vec<Point> {
        (from..to).map(|i| Point::at(i * 3_600_000, i as f64)).collect()
    }

    #[test]
    fn integrate_keeps_existing_value_on_collision() {
        let seq = PointSequence::from_points(&[Point::at(10, 1.0), Point::at(20, 2.0)]);
        let merged = seq.integrate(&[Point::at(20, 99.0), Point::at(30, 3.0)]);
        let values: Vec<f64> = merged.points().iter().map(|p| p.y.value()).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
        // integrate is pure
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn counts_around_an_edge() {
        let seq = PointSequence::from_points(&hourly(0, 10));
        let edge = Timestamp::from(3 * 3_600_000);
        assert_eq!(seq.count_before(edge), 3);
        assert_eq!(seq.count_after(edge), 6);
    }

    #[test]
    fn slice_is_inclusive_and_total() {
        let seq = PointSequence::from_points(&hourly(0, 5));
        assert_eq!(seq.slice(VisibleRange::new(1, 3)).len(), 3);
        assert_eq!(seq.slice(VisibleRange::new(3, 40)).len(), 2);
        assert!(seq.slice(VisibleRange::new(9, 12)).is_empty());
        assert!(PointSequence::new().slice(VisibleRange::default()).is_empty());
    }
}
