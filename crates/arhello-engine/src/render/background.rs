use std::sync::atomic::{AtomicU32, Ordering};

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::render::{RenderCtx, RenderSetupError, RenderTarget};
use crate::session::{CameraImage, CameraTextureHandle, Frame};

use super::common::begin_load_pass;
use super::shader::compile_wgsl;

const SHADER_LABEL: &str = "arhello background shader";
const CAMERA_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

static NEXT_TEXTURE_ID: AtomicU32 = AtomicU32::new(1);

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct QuadVertex {
    pos: [f32; 2],
    uv: [f32; 2],
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos (NDC)
        1 => Float32x2  // uv
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Full-screen triangle strip. Image row 0 is the top of the screen.
const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex {
        pos: [-1.0, -1.0],
        uv: [0.0, 1.0],
    },
    QuadVertex {
        pos: [-1.0, 1.0],
        uv: [0.0, 0.0],
    },
    QuadVertex {
        pos: [1.0, -1.0],
        uv: [1.0, 1.0],
    },
    QuadVertex {
        pos: [1.0, 1.0],
        uv: [1.0, 0.0],
    },
];

/// Camera passthrough renderer.
///
/// Uninitialized until [`initialize`](Self::initialize) succeeds; after that
/// the camera texture and its [`CameraTextureHandle`] stay fixed for the
/// renderer's lifetime. Each `draw` uploads the frame's camera image into
/// that texture and covers the whole target with it.
#[derive(Default)]
pub struct BackgroundRenderer {
    image_size: (u32, u32),
    handle: Option<CameraTextureHandle>,

    pipeline: Option<wgpu::RenderPipeline>,
    bind_group: Option<wgpu::BindGroup>,
    camera_texture: Option<wgpu::Texture>,
    quad_vbo: Option<wgpu::Buffer>,

    warned_uninitialized: bool,
    warned_image_mismatch: bool,
}

impl BackgroundRenderer {
    /// `image_size` is the camera image resolution the texture is allocated for.
    pub fn new(image_size: (u32, u32)) -> Self {
        Self {
            image_size: (image_size.0.max(1), image_size.1.max(1)),
            ..Self::default()
        }
    }

    pub fn is_ready(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Destination id for the session's camera images; `None` until initialized.
    pub fn texture_handle(&self) -> Option<CameraTextureHandle> {
        self.handle
    }

    /// Creates the camera texture, shader pipeline, and quad geometry.
    ///
    /// Fails if the shader does not compile or link. A second call is a no-op.
    pub fn initialize(&mut self, ctx: &RenderCtx<'_>) -> Result<(), RenderSetupError> {
        if self.is_ready() {
            return Ok(());
        }

        let shader = compile_wgsl(
            ctx.device,
            SHADER_LABEL,
            include_str!("shaders/background.wgsl"),
            &["vs_main", "fs_main"],
        )?;

        let (width, height) = self.image_size;
        let camera_texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("arhello camera texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: CAMERA_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let camera_view = camera_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("arhello camera sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("arhello background bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("arhello background bind group"),
            layout: &bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&camera_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("arhello background pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("arhello background pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let quad_vbo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("arhello background quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let handle = CameraTextureHandle::new(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed));
        log::debug!(
            "background renderer ready: camera texture {}x{} ({:?})",
            width,
            height,
            handle
        );

        self.pipeline = Some(pipeline);
        self.bind_group = Some(bind_group);
        self.camera_texture = Some(camera_texture);
        self.quad_vbo = Some(quad_vbo);
        self.handle = handle;
        Ok(())
    }

    /// Uploads the frame's camera image and draws it full-screen.
    ///
    /// Returns `false` without recording anything if the renderer is not
    /// initialized.
    pub fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        frame: &Frame,
    ) -> bool {
        if !self.is_ready() {
            if !self.warned_uninitialized {
                log::warn!("BackgroundRenderer::draw called before initialize; skipped");
                self.warned_uninitialized = true;
            }
            return false;
        }

        // Mutating upload first; immutable borrows of the GPU objects follow.
        if let Some(image) = &frame.camera_image {
            self.upload_camera_image(ctx, image);
        }

        let Some(pipeline) = self.pipeline.as_ref() else {
            return false;
        };
        let Some(bind_group) = self.bind_group.as_ref() else {
            return false;
        };
        let Some(quad_vbo) = self.quad_vbo.as_ref() else {
            return false;
        };

        let mut rpass = begin_load_pass(
            &mut *target.encoder,
            target.color_view,
            "arhello background pass",
        );
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, quad_vbo.slice(..));
        rpass.draw(0..QUAD_VERTICES.len() as u32, 0..1);
        true
    }

    fn upload_camera_image(&mut self, ctx: &RenderCtx<'_>, image: &CameraImage) {
        let Some(texture) = self.camera_texture.as_ref() else {
            return;
        };

        if (image.width, image.height) != self.image_size || !image.is_well_formed() {
            if !self.warned_image_mismatch {
                log::warn!(
                    "camera image {}x{} ({} bytes) does not fit the {}x{} camera texture; \
                     not uploaded",
                    image.width,
                    image.height,
                    image.pixels.len(),
                    self.image_size.0,
                    self.image_size.1
                );
                self.warned_image_mismatch = true;
            }
            return;
        }

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.width * CameraImage::BYTES_PER_PIXEL),
                rows_per_image: Some(image.height),
            },
            wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
        );
    }
}
