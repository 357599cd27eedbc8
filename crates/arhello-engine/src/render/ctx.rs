/// GPU handles a renderer needs while setting up or drawing.
///
/// Borrowed from the owner of the device (the window's `Gpu`, or a headless
/// device in tests); renderers never hold on to it between calls.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    /// Format of the color attachment the renderers draw into.
    pub surface_format: wgpu::TextureFormat,
}

impl<'a> RenderCtx<'a> {
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
        }
    }

    /// Required alignment of dynamic uniform buffer offsets, in bytes.
    pub fn uniform_offset_alignment(&self) -> u64 {
        u64::from(self.device.limits().min_uniform_buffer_offset_alignment)
    }
}

/// The frame being recorded: its encoder and color attachment.
///
/// Each renderer opens its own pass on `encoder` and ends it before
/// returning, so renderers can be called back to back on one target.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self {
            encoder,
            color_view,
        }
    }
}
