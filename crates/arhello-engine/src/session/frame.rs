use std::num::NonZeroU32;

use glam::{Mat4, Quat, Vec3};

/// Opaque id of the texture the session writes camera images into.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct CameraTextureHandle(NonZeroU32);

impl CameraTextureHandle {
    #[inline]
    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(Self)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// Tracking classification of the camera or of a trackable.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TrackingState {
    Tracking,
    Paused,
    Stopped,
}

/// Why the camera is not tracking.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum TrackingFailureReason {
    #[default]
    None,
    BadState,
    InsufficientLight,
    ExcessiveMotion,
    InsufficientFeatures,
    CameraUnavailable,
}

impl TrackingFailureReason {
    /// User-facing guidance; empty for [`TrackingFailureReason::None`].
    pub fn message(self) -> &'static str {
        match self {
            Self::None => "",
            Self::BadState => "Bad state. Try restarting the app.",
            Self::InsufficientLight => "Too dark. Try moving to a well-lit area.",
            Self::ExcessiveMotion => "Too much motion. Try moving the device more slowly.",
            Self::InsufficientFeatures => {
                "Not enough surface detail. Try pointing at a different surface."
            }
            Self::CameraUnavailable => "Camera unavailable. Try restarting the app.",
        }
    }
}

/// Rigid transform from a local frame to world space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    #[inline]
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY)
    }

    /// Extracts rotation + translation from a rigid matrix (scale is discarded).
    pub fn from_matrix(m: Mat4) -> Self {
        let (_scale, rotation, translation) = m.to_scale_rotation_translation();
        Self::new(translation, rotation.normalize())
    }

    /// Local → world matrix.
    #[inline]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }

    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        Self::new(rotation * -self.translation, rotation)
    }

    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation * p + self.translation
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Virtual camera for the current frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    /// Camera → world.
    pub pose: Pose,
    pub tracking_state: TrackingState,
    pub failure_reason: TrackingFailureReason,
    /// Vertical field of view in radians.
    pub vertical_fov: f32,
    /// Viewport width over height, as set through the display geometry.
    pub aspect: f32,
}

impl Camera {
    /// World → camera.
    pub fn view_matrix(&self) -> Mat4 {
        self.pose.inverse().to_matrix()
    }

    /// Right-handed perspective projection in wgpu clip space (depth 0..1).
    pub fn projection_matrix(&self, near: f32, far: f32) -> Mat4 {
        Mat4::perspective_rh(self.vertical_fov, self.aspect.max(f32::EPSILON), near, far)
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking_state == TrackingState::Tracking
    }

    /// Guidance for the user while the camera is not tracking.
    pub fn status_message(&self) -> &'static str {
        match self.tracking_state {
            TrackingState::Tracking => "",
            TrackingState::Paused => self.failure_reason.message(),
            TrackingState::Stopped => "Tracking stopped.",
        }
    }
}

/// A detected plane.
///
/// `polygon` is the ordered boundary in the plane's local frame (Y up, so
/// the points lie in local XZ); the order defines the winding.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub center_pose: Pose,
    pub extent_x: f32,
    pub extent_z: f32,
    pub polygon: Vec<Vec3>,
    pub tracking_state: TrackingState,
}

impl Plane {
    pub fn is_tracking(&self) -> bool {
        self.tracking_state == TrackingState::Tracking
    }
}

/// Tightly packed RGBA8 camera image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl CameraImage {
    pub const BYTES_PER_PIXEL: u32 = 4;

    /// Bytes needed for a tightly packed `width` x `height` image, or `None`
    /// if that does not fit in memory.
    pub fn byte_len(width: u32, height: u32) -> Option<usize> {
        u64::from(width)
            .checked_mul(u64::from(height))?
            .checked_mul(u64::from(Self::BYTES_PER_PIXEL))
            .and_then(|len| usize::try_from(len).ok())
    }

    /// True when `pixels` holds exactly `width * height` RGBA texels.
    pub fn is_well_formed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && Self::byte_len(self.width, self.height) == Some(self.pixels.len())
    }
}

/// Result of one `TrackingSession::update()`. Valid for one draw cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub timestamp_ns: u64,
    pub camera: Camera,
    pub camera_image: Option<CameraImage>,
    pub planes: Vec<Plane>,
}

impl Frame {
    /// Planes currently in the `Tracking` state.
    pub fn tracked_planes(&self) -> impl Iterator<Item = &Plane> {
        self.planes.iter().filter(|p| p.is_tracking())
    }
}
