use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Mat4, Quat, Vec3};

use super::{
    Camera, CameraImage, CameraTextureHandle, Frame, Plane, Pose, SessionConfig, SessionError,
    TrackingFailureReason, TrackingSession, TrackingState,
};
use crate::display::{DisplayGeometry, Rotation};

/// Frames reported as `Paused` before tracking starts.
const WARMUP_FRAMES: u64 = 45;
/// The wall plane is detected this many frames after tracking starts.
const WALL_DETECT_DELAY: u64 = 90;
const FRAME_INTERVAL_NS: u64 = 16_666_667;

/// Deterministic stand-in for a real AR runtime.
///
/// The virtual camera orbits the origin at eye height and looks at it.
/// Detected planes: a floor octagon (horizontal) and a wall hexagon
/// (vertical), filtered by the configured plane-finding mode. Camera images
/// are a procedural gradient that scrolls with time.
#[derive(Debug)]
pub struct SimulatedSession {
    config: SessionConfig,
    image_size: (u32, u32),
    geometry: Option<DisplayGeometry>,
    texture: Option<CameraTextureHandle>,
    running: bool,
    closed: bool,
    frame_index: u64,
}

impl SimulatedSession {
    /// `image_size` is the camera image resolution delivered each frame.
    pub fn new(image_size: (u32, u32)) -> Self {
        Self {
            config: SessionConfig::default(),
            image_size,
            geometry: None,
            texture: None,
            running: false,
            closed: false,
            frame_index: 0,
        }
    }

    pub fn display_geometry(&self) -> Option<DisplayGeometry> {
        self.geometry
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn camera(&self) -> Camera {
        let t = self.frame_index as f32 / 60.0;
        let angle = t * 0.25 * TAU / 4.0;
        let eye = Vec3::new(3.0 * angle.sin(), 1.6, 3.0 * angle.cos());
        let view = Mat4::look_at_rh(eye, Vec3::new(0.0, 0.4, 0.0), Vec3::Y);

        let (tracking_state, failure_reason) = if self.frame_index <= WARMUP_FRAMES {
            (TrackingState::Paused, TrackingFailureReason::InsufficientFeatures)
        } else {
            (TrackingState::Tracking, TrackingFailureReason::None)
        };

        let aspect = self
            .geometry
            .filter(|g| g.is_valid())
            .map_or(1.0, |g| g.aspect());

        Camera {
            pose: Pose::from_matrix(view.inverse()),
            tracking_state,
            failure_reason,
            vertical_fov: 60f32.to_radians(),
            aspect,
        }
    }

    fn planes(&self) -> Vec<Plane> {
        let mut planes = Vec::new();
        if self.frame_index <= WARMUP_FRAMES {
            return planes;
        }

        if self.config.plane_finding.finds_horizontal() {
            planes.push(Plane {
                center_pose: Pose::IDENTITY,
                extent_x: 3.0,
                extent_z: 3.0,
                polygon: regular_polygon(8, 1.5),
                tracking_state: TrackingState::Tracking,
            });
        }

        if self.config.plane_finding.finds_vertical() {
            let detected = self.frame_index > WARMUP_FRAMES + WALL_DETECT_DELAY;
            planes.push(Plane {
                // Local +Y (plane normal) faces the origin along +Z.
                center_pose: Pose::new(Vec3::new(0.0, 1.0, -2.0), Quat::from_rotation_x(FRAC_PI_2)),
                extent_x: 2.0,
                extent_z: 2.0,
                polygon: regular_polygon(6, 1.0),
                tracking_state: if detected {
                    TrackingState::Tracking
                } else {
                    TrackingState::Paused
                },
            });
        }

        planes
    }

    fn camera_image(&self) -> CameraImage {
        let (width, height) = self.image_size;
        let shift = (self.frame_index % 256) as u32;
        let Some(len) = CameraImage::byte_len(width, height) else {
            log::warn!(
                "camera image size {width}x{height} is too large; sending an empty image"
            );
            return CameraImage {
                width,
                height,
                pixels: Vec::new(),
            };
        };
        let mut pixels = Vec::with_capacity(len);

        for y in 0..height {
            for x in 0..width {
                let checker = ((x / 16 + y / 16 + shift / 16) % 2) as u8;
                let r = (u64::from(x) * 255 / u64::from(width)) as u8;
                let g = (u64::from(y) * 255 / u64::from(height)) as u8;
                let b = 96 + checker * 64;
                pixels.extend_from_slice(&[r / 2, g / 2, b, 255]);
            }
        }

        CameraImage {
            width,
            height,
            pixels,
        }
    }
}

impl TrackingSession for SimulatedSession {
    fn configure(&mut self, config: &SessionConfig) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        log::info!("simulated session configured: {config:?}");
        self.config = *config;
        Ok(())
    }

    fn set_display_geometry(&mut self, rotation: Rotation, width: u32, height: u32) {
        self.geometry = Some(DisplayGeometry::new(rotation, width, height));
    }

    fn set_camera_texture_destination(&mut self, handle: CameraTextureHandle) {
        self.texture = Some(handle);
    }

    fn update(&mut self) -> Result<Frame, SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        if !self.running {
            return Err(SessionError::NotRunning);
        }
        if self.texture.is_none() {
            return Err(SessionError::CameraUnavailable);
        }

        self.frame_index += 1;

        Ok(Frame {
            timestamp_ns: self.frame_index * FRAME_INTERVAL_NS,
            camera: self.camera(),
            camera_image: Some(self.camera_image()),
            planes: self.planes(),
        })
    }

    fn resume(&mut self) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        self.running = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        self.running = false;
        Ok(())
    }

    fn close(&mut self) {
        self.running = false;
        self.closed = true;
    }
}

/// Regular `n`-gon of the given radius in the local XZ plane, counter-clockwise
/// seen from +Y.
fn regular_polygon(n: usize, radius: f32) -> Vec<Vec3> {
    (0..n)
        .map(|i| {
            let a = i as f32 / n as f32 * TAU;
            Vec3::new(radius * a.cos(), 0.0, -radius * a.sin())
        })
        .collect()
}
