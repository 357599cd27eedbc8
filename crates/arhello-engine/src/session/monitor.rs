use super::{Camera, TrackingState};

/// Reports camera tracking-state transitions.
///
/// Hosts use the transition to toggle things that should only change on
/// edges (keep-screen-on, status text) rather than every frame.
#[derive(Debug, Default)]
pub struct TrackingStateMonitor {
    previous: Option<TrackingState>,
}

impl TrackingStateMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the new state if it differs from the last observed one.
    pub fn observe(&mut self, camera: &Camera) -> Option<TrackingState> {
        let state = camera.tracking_state;
        if self.previous == Some(state) {
            return None;
        }
        self.previous = Some(state);

        match state {
            TrackingState::Tracking => log::info!("camera tracking"),
            _ => log::warn!("camera {:?}: {}", state, camera.status_message()),
        }
        Some(state)
    }

    pub fn current(&self) -> Option<TrackingState> {
        self.previous
    }

    /// Forgets the last state, e.g. after the session is paused.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Pose, TrackingFailureReason};

    fn camera(state: TrackingState) -> Camera {
        Camera {
            pose: Pose::IDENTITY,
            tracking_state: state,
            failure_reason: TrackingFailureReason::None,
            vertical_fov: 1.0,
            aspect: 1.0,
        }
    }

    #[test]
    fn reports_only_edges() {
        let mut monitor = TrackingStateMonitor::new();
        assert_eq!(
            monitor.observe(&camera(TrackingState::Paused)),
            Some(TrackingState::Paused)
        );
        assert_eq!(monitor.observe(&camera(TrackingState::Paused)), None);
        assert_eq!(
            monitor.observe(&camera(TrackingState::Tracking)),
            Some(TrackingState::Tracking)
        );
        assert_eq!(monitor.observe(&camera(TrackingState::Tracking)), None);
        assert_eq!(monitor.current(), Some(TrackingState::Tracking));
    }

    #[test]
    fn reset_reports_again() {
        let mut monitor = TrackingStateMonitor::new();
        monitor.observe(&camera(TrackingState::Tracking));
        monitor.reset();
        assert_eq!(
            monitor.observe(&camera(TrackingState::Tracking)),
            Some(TrackingState::Tracking)
        );
    }
}
