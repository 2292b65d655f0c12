//! Visible index window over the point sequence.
//!
//! Every operation here is a total, pure function of the current range,
//! the sequence length and the request. Out-of-range, inverted and
//! negative requests are normalized, never rejected.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

/// Time direction relative to the known sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumIter, EnumString, AsRefStr, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Older points
    Left,
    /// Newer points
    Right,
}

/// Inclusive index range `[start, end]` into the sequence.
///
/// `end - start` is the zoom level. Persisted as a `[start, end]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize,
}

impl From<(usize, usize)> for VisibleRange {
    fn from((start, end): (usize, usize)) -> Self {
        Self { start, end }
    }
}

impl From<VisibleRange> for (usize, usize) {
    fn from(range: VisibleRange) -> Self {
        (range.start, range.end)
    }
}

/// Tunables for panning and zooming
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Width of a fresh window; 35 shows 36 points
    pub initial_width: usize,
    pub pan_step: usize,
    pub min_width: usize,
    pub zoom_in_factor: f64,
    pub zoom_out_factor: f64,
    /// Points requested per boundary load
    pub batch_size: usize,
    /// Points in a freshly seeded series
    pub seed_len: usize,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            initial_width: 35,
            pan_step: 10,
            min_width: 10,
            zoom_in_factor: 0.7,
            zoom_out_factor: 1.3,
            batch_size: 20,
            seed_len: 120,
        }
    }
}

/// Clamp a requested window into `[0, len - 1]`.
///
/// The requested width survives whenever the sequence can hold it: the
/// window slides inward from whichever edge overflowed. Only when
/// `len - 1 < width` does the width shrink to `len - 1`. An inverted
/// request is read with its ends swapped. `len == 0` yields `(0, 0)`.
pub fn clamp_range(start: i64, end: i64, len: usize) -> VisibleRange {
    if len == 0 {
        return VisibleRange::default();
    }
    let (start, end) = if start <= end { (start, end) } else { (end, start) };
    let (start, end) = (start as i128, end as i128);
    let last = (len - 1) as i128;
    let width = end - start;

    let mut s = start.clamp(0, last);
    let mut e = end.min(last).max(s);
    if e - s < width {
        e = last.min(e.max(width));
        s = (e - width).max(0);
    }
    VisibleRange { start: s as usize, end: e as usize }
}

impl VisibleRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn width(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Number of points the range covers in a sequence of `len`
    pub fn point_count(&self, len: usize) -> usize {
        if len == 0 { 0 } else { self.width() + 1 }
    }

    pub fn clamped(self, len: usize) -> Self {
        clamp_range(self.start as i64, self.end as i64, len)
    }

    pub fn is_at_start(&self) -> bool {
        self.start == 0
    }

    pub fn is_at_end(&self, len: usize) -> bool {
        len == 0 || self.end >= len - 1
    }

    /// Last `width` points; fewer when the sequence is shorter
    pub fn latest(width: usize, len: usize) -> Self {
        let start = len.saturating_sub(width + 1);
        let end = len.saturating_sub(1);
        clamp_range(start as i64, end as i64, len)
    }

    /// Move `step` points back in time. Flush with the start this is a no-op.
    pub fn pan_left(self, step: usize, len: usize) -> Self {
        let start = self.start.saturating_sub(step);
        clamp_range(start as i64, (start + self.width()) as i64, len)
    }

    /// Move `step` points forward in time. Flush with the end this is a no-op.
    pub fn pan_right(self, step: usize, len: usize) -> Self {
        if len == 0 {
            return Self::default();
        }
        let end = self.end.saturating_add(step).min(len - 1);
        clamp_range(end as i64 - self.width() as i64, end as i64, len)
    }

    /// Shrink to `max(min_width, floor(width * zoom_in_factor))` around the midpoint
    pub fn zoom_in(self, len: usize, config: &ViewportConfig) -> Self {
        let width = scale(self.width(), config.zoom_in_factor).max(config.min_width);
        self.recentered(width, len)
    }

    /// Grow to `min(len, floor(width * zoom_out_factor))` around the midpoint
    pub fn zoom_out(self, len: usize, config: &ViewportConfig) -> Self {
        let width = scale(self.width(), config.zoom_out_factor).min(len);
        self.recentered(width, len)
    }

    /// Keep the same points on screen after `count` points were prepended
    pub fn after_prepend(self, count: usize, len: usize) -> Self {
        clamp_range((self.start + count) as i64, (self.end + count) as i64, len)
    }

    /// Slide forward by `count` points keeping the width
    pub fn shifted_right(self, count: usize, len: usize) -> Self {
        let start = self.start + count;
        clamp_range(start as i64, (start + self.width()) as i64, len)
    }

    fn recentered(self, width: usize, len: usize) -> Self {
        let center = (self.start + self.end) / 2;
        let start = center.saturating_sub(width / 2);
        clamp_range(start as i64, (start + width) as i64, len)
    }
}

fn scale(width: usize, factor: f64) -> usize {
    (width as f64 * factor).floor() as usize
}
