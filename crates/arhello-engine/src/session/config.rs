/// How `update()` waits for camera images.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum CameraImageUpdateMode {
    /// Block until a new camera image is available.
    Blocking,
    /// Return immediately with the most recent image.
    #[default]
    LatestCameraImage,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum FocusMode {
    Fixed,
    #[default]
    Auto,
}

/// Which plane orientations the session should detect.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum PlaneFindingMode {
    Disabled,
    Horizontal,
    Vertical,
    #[default]
    HorizontalAndVertical,
}

impl PlaneFindingMode {
    pub fn finds_horizontal(self) -> bool {
        matches!(self, Self::Horizontal | Self::HorizontalAndVertical)
    }

    pub fn finds_vertical(self) -> bool {
        matches!(self, Self::Vertical | Self::HorizontalAndVertical)
    }
}

/// Options applied once through `TrackingSession::configure`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct SessionConfig {
    pub update_mode: CameraImageUpdateMode,
    pub focus_mode: FocusMode,
    pub plane_finding: PlaneFindingMode,
}
