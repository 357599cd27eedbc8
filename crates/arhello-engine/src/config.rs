//! Pipeline configuration.

use crate::input::DEFAULT_TAP_CAPACITY;
use crate::session::SessionConfig;

/// Near clip plane in session units (meters).
pub const DEFAULT_NEAR_CLIP: f32 = 0.1;
/// Far clip plane in session units (meters).
pub const DEFAULT_FAR_CLIP: f32 = 100.0;

/// Everything the pipeline and its renderers need to know up front.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub near_clip: f32,
    pub far_clip: f32,

    /// Plane overlay color, straight linear RGBA.
    pub plane_color: [f32; 4],

    /// Framebuffer clear color, linear RGBA.
    pub clear_color: [f32; 4],

    /// Taps buffered between the UI and render threads.
    pub tap_capacity: usize,

    /// Resolution of the camera texture (and of the images the session delivers).
    pub camera_image_size: (u32, u32),

    pub session: SessionConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            near_clip: DEFAULT_NEAR_CLIP,
            far_clip: DEFAULT_FAR_CLIP,
            plane_color: [0.0, 0.6, 1.0, 0.45],
            clear_color: [0.0, 0.0, 0.0, 1.0],
            tap_capacity: DEFAULT_TAP_CAPACITY,
            camera_image_size: (640, 480),
            session: SessionConfig::default(),
        }
    }
}
