//! Position resolution
//!
//! Maps annotation nodes from their clip-local time to absolute timecode on
//! the root timeline, composing trims, retiming curves, conform rates and
//! offsets at every level of nesting.

mod position;
mod time_map;

pub use position::PositionResolver;
pub use time_map::{TimeMap, TimePoint};
