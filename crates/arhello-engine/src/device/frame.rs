/// One acquired swapchain image plus the encoder recording into it.
///
/// Holding it blocks acquisition of the next image; hand it back through
/// [`Gpu::submit`](super::Gpu::submit) promptly.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
