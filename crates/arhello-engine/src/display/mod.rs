//! Display geometry: viewport size + rotation, and the latch that forwards
//! changes to the tracking session once per frame.

mod geometry;
mod tracker;

pub use geometry::{DisplayGeometry, Rotation};
pub use tracker::DisplayGeometryTracker;
