//! Tracking-session collaborator contract.
//!
//! The session is the external AR runtime: it owns the camera, performs
//! visual-inertial tracking and plane detection, and hands back one [`Frame`]
//! per `update()`. The pipeline only pushes display geometry and the camera
//! texture destination into it and reads frames out.

mod config;
mod error;
mod frame;
mod monitor;
mod simulated;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{CameraImageUpdateMode, FocusMode, PlaneFindingMode, SessionConfig};
pub use error::SessionError;
pub use frame::{
    Camera, CameraImage, CameraTextureHandle, Frame, Plane, Pose, TrackingFailureReason,
    TrackingState,
};
pub use monitor::TrackingStateMonitor;
pub use simulated::SimulatedSession;

use crate::display::Rotation;

/// An AR tracking session.
///
/// All methods are called from the render thread.
pub trait TrackingSession {
    /// Applies session options. Expected before the first `resume()`.
    fn configure(&mut self, config: &SessionConfig) -> Result<(), SessionError>;

    /// Tells the session how the camera image maps onto the viewport.
    fn set_display_geometry(&mut self, rotation: Rotation, width: u32, height: u32);

    /// Names the texture the session should deliver camera images into.
    fn set_camera_texture_destination(&mut self, handle: CameraTextureHandle);

    /// Produces the next frame. May block briefly waiting for a camera image.
    fn update(&mut self) -> Result<Frame, SessionError>;

    fn resume(&mut self) -> Result<(), SessionError>;

    fn pause(&mut self) -> Result<(), SessionError>;

    /// Releases the session. Further `update()` calls fail with
    /// [`SessionError::Closed`].
    fn close(&mut self);
}

impl<S> TrackingSession for Box<S>
where
    S: TrackingSession + ?Sized,
{
    fn configure(&mut self, config: &SessionConfig) -> Result<(), SessionError> {
        (**self).configure(config)
    }

    fn set_display_geometry(&mut self, rotation: Rotation, width: u32, height: u32) {
        (**self).set_display_geometry(rotation, width, height)
    }

    fn set_camera_texture_destination(&mut self, handle: CameraTextureHandle) {
        (**self).set_camera_texture_destination(handle)
    }

    fn update(&mut self) -> Result<Frame, SessionError> {
        (**self).update()
    }

    fn resume(&mut self) -> Result<(), SessionError> {
        (**self).resume()
    }

    fn pause(&mut self) -> Result<(), SessionError> {
        (**self).pause()
    }

    fn close(&mut self) {
        (**self).close()
    }
}
