use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::display::DisplayGeometryTracker;
use crate::input::{Tap, TapQueue};
use crate::session::{SessionError, TrackingSession, TrackingState, TrackingStateMonitor};

use super::FrameSink;

/// What happened during one rendered tick.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub timestamp_ns: u64,
    pub camera_state: TrackingState,
    /// Set when the camera tracking state changed this frame.
    pub tracking_changed: Option<TrackingState>,
    pub background_drawn: bool,
    pub planes_drawn: usize,
    /// Tracked planes whose polygon could not be drawn.
    pub planes_skipped: usize,
    /// The tap polled this frame, if any.
    pub tap: Option<Tap>,
}

/// Result of [`FramePipeline::tick`].
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Rendered(FrameReport),
    /// The session produced no frame; nothing was drawn. Retried next tick.
    Skipped(SessionError),
}

impl FrameOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered(_))
    }

    pub fn report(&self) -> Option<&FrameReport> {
        match self {
            Self::Rendered(report) => Some(report),
            Self::Skipped(_) => None,
        }
    }
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct PipelineStats {
    pub frames_rendered: u64,
    pub frames_skipped: u64,
}

/// Render-loop driver.
///
/// Owns the shared display-geometry latch and tap queue (hand clones of the
/// `Arc`s to the UI thread) and sequences one frame:
///
/// 1. push pending display geometry into the session
/// 2. bind the camera texture destination
/// 3. `session.update()`; a failure skips the frame
/// 4. draw the background
/// 5. if the camera is tracking, draw every tracked plane
pub struct FramePipeline {
    config: PipelineConfig,
    geometry: Arc<DisplayGeometryTracker>,
    taps: Arc<TapQueue>,
    monitor: TrackingStateMonitor,
    stats: PipelineStats,
    last_error: Option<SessionError>,
}

impl FramePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let taps = Arc::new(TapQueue::new(config.tap_capacity));
        Self {
            config,
            geometry: Arc::new(DisplayGeometryTracker::new()),
            taps,
            monitor: TrackingStateMonitor::new(),
            stats: PipelineStats::default(),
            last_error: None,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Display-geometry latch; notify it from the UI thread.
    pub fn geometry(&self) -> &Arc<DisplayGeometryTracker> {
        &self.geometry
    }

    /// Tap queue; offer taps from the UI thread.
    pub fn taps(&self) -> &Arc<TapQueue> {
        &self.taps
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Forgets the last tracking state, so the next frame reports it again.
    /// Call when the session is paused.
    pub fn reset_tracking(&mut self) {
        self.monitor.reset();
        self.last_error = None;
    }

    /// Runs one frame. Never fails: session errors skip the frame.
    pub fn tick<S, K>(&mut self, session: &mut S, sink: &mut K) -> FrameOutcome
    where
        S: TrackingSession + ?Sized,
        K: FrameSink + ?Sized,
    {
        self.geometry.apply_if_dirty(session);

        if let Some(handle) = sink.camera_texture() {
            session.set_camera_texture_destination(handle);
        }

        let frame = match session.update() {
            Ok(frame) => frame,
            Err(err) => {
                self.note_skip(&err);
                return FrameOutcome::Skipped(err);
            }
        };
        if let Some(err) = self.last_error.take() {
            log::info!("session recovered after: {err}");
        }

        let tap = self.taps.poll();
        if let Some(tap) = tap {
            log::debug!("tap at ({:.1}, {:.1})", tap.x, tap.y);
        }

        let tracking_changed = self.monitor.observe(&frame.camera);
        let background_drawn = sink.draw_background(&frame);

        let mut planes_drawn = 0;
        let mut planes_skipped = 0;
        if frame.camera.is_tracking() {
            let projection = frame
                .camera
                .projection_matrix(self.config.near_clip, self.config.far_clip);

            for plane in frame.tracked_planes() {
                if sink.draw_plane(plane, &frame.camera.pose, &projection) {
                    planes_drawn += 1;
                } else {
                    planes_skipped += 1;
                }
            }
        }

        self.stats.frames_rendered += 1;
        log::trace!(
            "frame @{}ns: {:?}, {} planes drawn, {} skipped",
            frame.timestamp_ns,
            frame.camera.tracking_state,
            planes_drawn,
            planes_skipped
        );

        FrameOutcome::Rendered(FrameReport {
            timestamp_ns: frame.timestamp_ns,
            camera_state: frame.camera.tracking_state,
            tracking_changed,
            background_drawn,
            planes_drawn,
            planes_skipped,
            tap,
        })
    }

    fn note_skip(&mut self, err: &SessionError) {
        self.stats.frames_skipped += 1;
        // Same error every vsync would flood the log; report changes only.
        if self.last_error.as_ref() == Some(err) {
            log::trace!("frame skipped: {err}");
        } else {
            log::warn!("frame skipped: {err}");
            self.last_error = Some(err.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::*;
    use crate::display::Rotation;
    use crate::session::testing::RecordingSession;
    use crate::session::{
        Camera, CameraTextureHandle, Frame, Plane, Pose, TrackingFailureReason,
    };

    #[derive(Default)]
    struct RecordingSink {
        texture: Option<CameraTextureHandle>,
        backgrounds: usize,
        planes: Vec<usize>,
        events: Vec<&'static str>,
    }

    impl FrameSink for RecordingSink {
        fn camera_texture(&self) -> Option<CameraTextureHandle> {
            self.texture
        }

        fn draw_background(&mut self, _frame: &Frame) -> bool {
            self.backgrounds += 1;
            self.events.push("background");
            true
        }

        fn draw_plane(&mut self, plane: &Plane, _pose: &Pose, _projection: &Mat4) -> bool {
            self.events.push("plane");
            if plane.polygon.len() < 3 {
                return false;
            }
            self.planes.push(plane.polygon.len());
            true
        }
    }

    fn camera(state: TrackingState) -> Camera {
        Camera {
            pose: Pose::IDENTITY,
            tracking_state: state,
            failure_reason: TrackingFailureReason::None,
            vertical_fov: 1.0,
            aspect: 1.0,
        }
    }

    fn plane(state: TrackingState, points: usize) -> Plane {
        let polygon = (0..points)
            .map(|i| {
                let a = i as f32 / points as f32 * std::f32::consts::TAU;
                Vec3::new(a.cos(), 0.0, a.sin())
            })
            .collect();
        Plane {
            center_pose: Pose::IDENTITY,
            extent_x: 2.0,
            extent_z: 2.0,
            polygon,
            tracking_state: state,
        }
    }

    fn frame(state: TrackingState, planes: Vec<Plane>) -> Frame {
        Frame {
            timestamp_ns: 1,
            camera: camera(state),
            camera_image: None,
            planes,
        }
    }

    #[test]
    fn paused_camera_draws_background_only() {
        let mut pipeline = FramePipeline::new(PipelineConfig::default());
        let mut session = RecordingSession::default();
        session.updates.push_back(Ok(frame(
            TrackingState::Paused,
            vec![plane(TrackingState::Tracking, 4)],
        )));
        let mut sink = RecordingSink::default();

        let outcome = pipeline.tick(&mut session, &mut sink);

        let report = outcome.report().expect("rendered");
        assert!(report.background_drawn);
        assert_eq!(report.planes_drawn, 0);
        assert_eq!(sink.events, ["background"]);
    }

    #[test]
    fn only_tracked_planes_are_drawn() {
        let mut pipeline = FramePipeline::new(PipelineConfig::default());
        let mut session = RecordingSession::default();
        session.updates.push_back(Ok(frame(
            TrackingState::Tracking,
            vec![
                plane(TrackingState::Tracking, 6),
                plane(TrackingState::Stopped, 4),
                plane(TrackingState::Paused, 5),
            ],
        )));
        let mut sink = RecordingSink::default();

        let outcome = pipeline.tick(&mut session, &mut sink);

        assert_eq!(outcome.report().map(|r| r.planes_drawn), Some(1));
        assert_eq!(sink.planes, [6]);
        assert_eq!(sink.events, ["background", "plane"]);
    }

    #[test]
    fn degenerate_plane_is_counted_as_skipped() {
        let mut pipeline = FramePipeline::new(PipelineConfig::default());
        let mut session = RecordingSession::default();
        session.updates.push_back(Ok(frame(
            TrackingState::Tracking,
            vec![plane(TrackingState::Tracking, 2), plane(TrackingState::Tracking, 3)],
        )));
        let mut sink = RecordingSink::default();

        let report = match pipeline.tick(&mut session, &mut sink) {
            FrameOutcome::Rendered(report) => report,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(report.planes_drawn, 1);
        assert_eq!(report.planes_skipped, 1);
    }

    #[test]
    fn update_failure_skips_frame_and_next_tick_recovers() {
        let mut pipeline = FramePipeline::new(PipelineConfig::default());
        let mut session = RecordingSession::default();
        session
            .updates
            .push_back(Err(SessionError::Failed("camera glitch".into())));
        session
            .updates
            .push_back(Ok(frame(TrackingState::Tracking, Vec::new())));
        let mut sink = RecordingSink::default();

        let first = pipeline.tick(&mut session, &mut sink);
        assert_eq!(
            first,
            FrameOutcome::Skipped(SessionError::Failed("camera glitch".into()))
        );
        assert_eq!(sink.backgrounds, 0);

        let second = pipeline.tick(&mut session, &mut sink);
        assert!(second.is_rendered());
        assert_eq!(sink.backgrounds, 1);
        assert_eq!(
            pipeline.stats(),
            PipelineStats {
                frames_rendered: 1,
                frames_skipped: 1
            }
        );
    }

    #[test]
    fn pending_geometry_reaches_session_once() {
        let mut pipeline = FramePipeline::new(PipelineConfig::default());
        pipeline.geometry().notify_resize(1080, 1920);
        let mut session = RecordingSession::default();
        let mut sink = RecordingSink::default();

        pipeline.tick(&mut session, &mut sink);
        pipeline.tick(&mut session, &mut sink);

        assert_eq!(session.geometry_calls, [(Rotation::Deg0, 1080, 1920)]);
        assert_eq!(session.update_calls, 2);
    }

    #[test]
    fn camera_texture_is_bound_before_update() {
        let mut pipeline = FramePipeline::new(PipelineConfig::default());
        let mut session = RecordingSession::default();
        let handle = CameraTextureHandle::new(7).expect("non-zero");
        let mut sink = RecordingSink {
            texture: Some(handle),
            ..Default::default()
        };

        pipeline.tick(&mut session, &mut sink);
        assert_eq!(session.texture, Some(handle));
    }

    #[test]
    fn one_tap_consumed_per_rendered_frame() {
        let mut pipeline = FramePipeline::new(PipelineConfig::default());
        pipeline.taps().offer(Tap::new(1.0, 2.0));
        pipeline.taps().offer(Tap::new(3.0, 4.0));
        let mut session = RecordingSession::default();
        for _ in 0..2 {
            session
                .updates
                .push_back(Ok(frame(TrackingState::Tracking, Vec::new())));
        }
        let mut sink = RecordingSink::default();

        let first = pipeline.tick(&mut session, &mut sink);
        assert_eq!(first.report().and_then(|r| r.tap), Some(Tap::new(1.0, 2.0)));
        assert_eq!(pipeline.taps().len(), 1);

        let second = pipeline.tick(&mut session, &mut sink);
        assert_eq!(
            second.report().and_then(|r| r.tap),
            Some(Tap::new(3.0, 4.0))
        );
        assert!(pipeline.taps().is_empty());
    }

    #[test]
    fn tracking_transition_reported_once() {
        let mut pipeline = FramePipeline::new(PipelineConfig::default());
        let mut session = RecordingSession::default();
        for state in [
            TrackingState::Paused,
            TrackingState::Tracking,
            TrackingState::Tracking,
        ] {
            session.updates.push_back(Ok(frame(state, Vec::new())));
        }
        let mut sink = RecordingSink::default();

        let changes: Vec<_> = (0..3)
            .map(|_| {
                pipeline
                    .tick(&mut session, &mut sink)
                    .report()
                    .and_then(|r| r.tracking_changed)
            })
            .collect();
        assert_eq!(
            changes,
            [Some(TrackingState::Paused), Some(TrackingState::Tracking), None]
        );
    }
}
