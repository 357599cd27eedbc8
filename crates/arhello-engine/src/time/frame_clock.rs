use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,

    /// Monotonic frame counter, starting at 0.
    pub frame_index: u64,

    /// Smoothed frames per second.
    pub fps: f32,
}

/// Per-loop frame clock.
///
/// Delta time is clamped so a stall (debugger, backgrounded app) does not
/// report a multi-second frame. The fps estimate is an exponential moving
/// average over roughly the last 30 frames.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    fps: f32,
}

const DT_MIN: Duration = Duration::from_micros(100);
const DT_MAX: Duration = Duration::from_millis(250);
const FPS_SMOOTHING: f32 = 1.0 / 30.0;

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            frame_index: 0,
            fps: 0.0,
        }
    }

    /// Resets the baseline, e.g. after the session resumes.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(DT_MIN, DT_MAX)
            .as_secs_f32();
        self.last = now;

        let instant_fps = 1.0 / dt;
        self.fps = if self.frame_index == 0 {
            instant_fps
        } else {
            self.fps + (instant_fps - self.fps) * FPS_SMOOTHING
        };

        let ft = FrameTime {
            dt,
            frame_index: self.frame_index,
            fps: self.fps,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
