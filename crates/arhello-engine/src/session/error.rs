/// Per-frame session failure.
///
/// Every variant is recoverable from the pipeline's point of view: the frame
/// is skipped and the next tick tries again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session is not running (paused or never resumed)")]
    NotRunning,

    #[error("session has been closed")]
    Closed,

    #[error("camera is unavailable")]
    CameraUnavailable,

    #[error("no camera image available yet")]
    NotYetAvailable,

    #[error("session failure: {0}")]
    Failed(String),
}
