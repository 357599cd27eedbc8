//! Desktop host: window, event loop and the render loop around
//! [`FramePipeline`](crate::pipeline::FramePipeline).

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
