//! arhello engine crate.
//!
//! A frame-synchronized AR renderer: each display refresh, push display
//! geometry into the tracking session, pull one frame, draw the camera image
//! full-screen and overlay every tracked plane.
//!
//! The tracking itself lives behind [`session::TrackingSession`];
//! [`session::SimulatedSession`] stands in for a real AR runtime on desktop.

pub mod config;
pub mod device;
pub mod display;
pub mod input;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod session;
pub mod time;
pub mod window;

pub use config::PipelineConfig;
pub use pipeline::{FrameOutcome, FramePipeline, FrameReport};
