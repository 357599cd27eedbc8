/// Display rotation relative to the device's natural orientation.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Maps a rotation in degrees. Only multiples of 90 are valid.
    pub fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees % 360 {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }
}

/// Viewport size in physical pixels plus display rotation.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct DisplayGeometry {
    pub rotation: Rotation,
    pub width: u32,
    pub height: u32,
}

impl DisplayGeometry {
    #[inline]
    pub const fn new(rotation: Rotation, width: u32, height: u32) -> Self {
        Self {
            rotation,
            width,
            height,
        }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Width over height; 1.0 for a degenerate (zero-height) viewport.
    pub fn aspect(self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_from_degrees_wraps() {
        assert_eq!(Rotation::from_degrees(0), Some(Rotation::Deg0));
        assert_eq!(Rotation::from_degrees(270), Some(Rotation::Deg270));
        assert_eq!(Rotation::from_degrees(450), Some(Rotation::Deg90));
        assert_eq!(Rotation::from_degrees(45), None);
    }

    #[test]
    fn aspect_handles_zero_height() {
        assert_eq!(DisplayGeometry::new(Rotation::Deg0, 640, 0).aspect(), 1.0);
        assert_eq!(DisplayGeometry::new(Rotation::Deg0, 800, 400).aspect(), 2.0);
    }

    #[test]
    fn validity_requires_both_dimensions() {
        assert!(!DisplayGeometry::default().is_valid());
        assert!(!DisplayGeometry::new(Rotation::Deg0, 10, 0).is_valid());
        assert!(DisplayGeometry::new(Rotation::Deg0, 10, 10).is_valid());
    }
}
