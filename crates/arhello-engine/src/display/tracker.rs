use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::session::TrackingSession;

use super::{DisplayGeometry, Rotation};

#[derive(Debug, Default)]
struct Latch {
    geometry: DisplayGeometry,
    dirty: bool,
}

/// Debounced display-geometry latch.
///
/// The UI thread records resize and display-change notifications; the render
/// thread calls [`apply_if_dirty`](Self::apply_if_dirty) exactly once per
/// frame, before asking the session for the next frame. Notifications that
/// arrive between two applies collapse into one: only the latest geometry is
/// pushed.
///
/// Share between threads with `Arc<DisplayGeometryTracker>`.
#[derive(Debug, Default)]
pub struct DisplayGeometryTracker {
    latch: Mutex<Latch>,
}

impl DisplayGeometryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a known geometry, marked dirty so the first frame pushes it.
    pub fn with_geometry(geometry: DisplayGeometry) -> Self {
        Self {
            latch: Mutex::new(Latch {
                geometry,
                dirty: true,
            }),
        }
    }

    /// Surface size changed.
    pub fn notify_resize(&self, width: u32, height: u32) {
        let mut latch = self.lock();
        latch.geometry.width = width;
        latch.geometry.height = height;
        latch.dirty = true;
    }

    /// OS display-change callback. Marks dirty without new dimensions; some
    /// rotations (e.g. 180°) never produce a surface resize.
    pub fn notify_display_changed(&self) {
        self.lock().dirty = true;
    }

    /// Records the display's current rotation.
    pub fn set_rotation(&self, rotation: Rotation) {
        let mut latch = self.lock();
        if latch.geometry.rotation != rotation {
            latch.geometry.rotation = rotation;
            latch.dirty = true;
        }
    }

    /// Pushes the pending geometry into `session` if anything changed since
    /// the last apply, then clears the flag. Returns whether it applied.
    pub fn apply_if_dirty<S>(&self, session: &mut S) -> bool
    where
        S: TrackingSession + ?Sized,
    {
        // Copy out under the lock; never call into the session while holding it.
        let pending = {
            let mut latch = self.lock();
            if !latch.dirty {
                return false;
            }
            latch.dirty = false;
            latch.geometry
        };

        log::debug!(
            "display geometry -> session: {}x{} @ {}°",
            pending.width,
            pending.height,
            pending.rotation.degrees()
        );
        session.set_display_geometry(pending.rotation, pending.width, pending.height);
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.lock().dirty
    }

    pub fn geometry(&self) -> DisplayGeometry {
        self.lock().geometry
    }

    fn lock(&self) -> MutexGuard<'_, Latch> {
        // The latch holds plain data; a panic mid-update cannot leave it torn.
        self.latch.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
