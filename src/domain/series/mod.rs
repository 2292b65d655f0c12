//! Point data: value objects, the sequence store and the merge engine.

pub mod entities;
pub mod merge;
pub mod stats;
pub mod value_objects;

pub use entities::*;
pub use merge::merge_by_time;
pub use stats::SeriesStats;
pub use value_objects::*;
