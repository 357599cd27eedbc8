//! Input subsystem.
//!
//! The only input the render thread consumes is single taps, handed over
//! from the UI thread through a bounded, lossy queue.

mod tap;

pub use tap::{DEFAULT_TAP_CAPACITY, Tap, TapQueue};
