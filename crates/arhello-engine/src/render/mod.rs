//! GPU rendering subsystem.
//!
//! Two renderers, both drawn into the swapchain view each frame:
//! - [`BackgroundRenderer`]: live camera image as a full-screen quad
//! - [`PlaneRenderer`]: translucent overlay per tracked plane
//!
//! Each renderer owns its GPU resources and records into its own render
//! pass. The pass is opened and closed inside `draw`, so no pipeline, bind
//! group, or vertex binding outlives the call.

mod background;
mod common;
mod ctx;
mod error;
mod plane;
mod plane_mesh;
mod shader;

pub use background::BackgroundRenderer;
pub use common::clear_target;
pub use ctx::{RenderCtx, RenderTarget};
pub use error::RenderSetupError;
pub use plane::{PlaneDrawCounts, PlaneRenderer};
pub use plane_mesh::{PlaneMesh, PlaneVertex, fan_index_count};
pub use shader::validate_wgsl;
