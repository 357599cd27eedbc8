use glam::Mat4;

use crate::config::PipelineConfig;
use crate::render::{BackgroundRenderer, PlaneRenderer, RenderCtx, RenderSetupError, RenderTarget};
use crate::session::{CameraTextureHandle, Frame, Plane, Pose};

/// Where the pipeline sends its draw calls.
pub trait FrameSink {
    /// Texture the session should deliver camera images into.
    fn camera_texture(&self) -> Option<CameraTextureHandle>;

    /// Draws the camera background. Returns whether anything was recorded.
    fn draw_background(&mut self, frame: &Frame) -> bool;

    /// Draws one tracked plane. Returns whether anything was recorded.
    fn draw_plane(&mut self, plane: &Plane, camera_pose: &Pose, projection: &Mat4) -> bool;
}

/// The two renderers, owned by the render thread.
pub struct Renderers {
    pub background: BackgroundRenderer,
    pub planes: PlaneRenderer,
}

impl Renderers {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            background: BackgroundRenderer::new(config.camera_image_size),
            planes: PlaneRenderer::new(config.plane_color),
        }
    }

    /// Creates GPU resources for both renderers. Shader failures are fatal.
    pub fn initialize(&mut self, ctx: &RenderCtx<'_>) -> Result<(), RenderSetupError> {
        self.background.initialize(ctx)?;
        self.planes.initialize(ctx)?;
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.background.is_ready() && self.planes.is_ready()
    }
}

/// Forwards one frame's draw calls to the renderers.
///
/// Build one per frame: construction resets the plane renderer's per-frame
/// scratch regions.
pub struct GpuFrameSink<'a, 'c, 't> {
    ctx: &'a RenderCtx<'c>,
    target: &'a mut RenderTarget<'t>,
    renderers: &'a mut Renderers,
}

impl<'a, 'c, 't> GpuFrameSink<'a, 'c, 't> {
    pub fn new(
        ctx: &'a RenderCtx<'c>,
        target: &'a mut RenderTarget<'t>,
        renderers: &'a mut Renderers,
    ) -> Self {
        renderers.planes.begin_frame();
        Self {
            ctx,
            target,
            renderers,
        }
    }
}

impl FrameSink for GpuFrameSink<'_, '_, '_> {
    fn camera_texture(&self) -> Option<CameraTextureHandle> {
        self.renderers.background.texture_handle()
    }

    fn draw_background(&mut self, frame: &Frame) -> bool {
        self.renderers.background.draw(self.ctx, self.target, frame)
    }

    fn draw_plane(&mut self, plane: &Plane, camera_pose: &Pose, projection: &Mat4) -> bool {
        self.renderers
            .planes
            .draw(self.ctx, self.target, plane, camera_pose, projection)
    }
}
