use super::entities::Point;
use serde::Serialize;

/// Summary of a visible slice, as shown next to the chart
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SeriesStats {
    pub first: f64,
    pub last: f64,
    pub high: f64,
    pub low: f64,
    pub change: f64,
    pub change_pct: f64,
}

impl SeriesStats {
    /// All-zero stats for an empty slice; `change_pct` is 0 when `first` is 0
    pub fn from_points(points: &[Point]) -> Self {
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return Self::default();
        };
        let first = first.y.value();
        let last = last.y.value();
        let (low, high) = points
            .iter()
            .map(|p| p.y.value())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| (lo.min(y), hi.max(y)));
        let change = last - first;
        let change_pct = if first != 0.0 { change / first * 100.0 } else { 0.0 };
        Self { first, last, high, low, change, change_pct }
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn is_up(&self) -> bool {
        self.change >= 0.0
    }
}
