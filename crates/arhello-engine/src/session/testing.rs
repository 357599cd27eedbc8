//! Test doubles for the session contract.

use super::{CameraTextureHandle, Frame, SessionConfig, SessionError, TrackingSession};
use crate::display::Rotation;

/// Records every call; `update()` pops scripted results.
#[derive(Debug, Default)]
pub(crate) struct RecordingSession {
    pub geometry_calls: Vec<(Rotation, u32, u32)>,
    pub texture: Option<CameraTextureHandle>,
    pub updates: std::collections::VecDeque<Result<Frame, SessionError>>,
    pub update_calls: usize,
}

impl TrackingSession for RecordingSession {
    fn configure(&mut self, _config: &SessionConfig) -> Result<(), SessionError> {
        Ok(())
    }

    fn set_display_geometry(&mut self, rotation: Rotation, width: u32, height: u32) {
        self.geometry_calls.push((rotation, width, height));
    }

    fn set_camera_texture_destination(&mut self, handle: CameraTextureHandle) {
        self.texture = Some(handle);
    }

    fn update(&mut self) -> Result<Frame, SessionError> {
        self.update_calls += 1;
        self.updates
            .pop_front()
            .unwrap_or(Err(SessionError::NotYetAvailable))
    }

    fn resume(&mut self) -> Result<(), SessionError> {
        Ok(())
    }

    fn pause(&mut self) -> Result<(), SessionError> {
        Ok(())
    }

    fn close(&mut self) {}
}
