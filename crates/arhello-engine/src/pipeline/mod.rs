//! Per-frame orchestration.
//!
//! [`FramePipeline::tick`] runs once per display refresh on the render
//! thread. It talks to the GPU only through a [`FrameSink`]; the real sink
//! is [`GpuFrameSink`], which forwards to the two renderers.

mod frame_pipeline;
mod sink;

pub use frame_pipeline::{FrameOutcome, FramePipeline, FrameReport, PipelineStats};
pub use sink::{FrameSink, GpuFrameSink, Renderers};
