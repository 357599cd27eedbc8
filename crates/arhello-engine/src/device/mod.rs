//! GPU device + surface management.
//!
//! Creates the wgpu device and queue, configures the window surface and
//! hands out one [`GpuFrame`] per redraw.

mod frame;
mod gpu;
mod init;
mod surface;

pub use frame::GpuFrame;
pub use gpu::{Gpu, request_headless_device};
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
