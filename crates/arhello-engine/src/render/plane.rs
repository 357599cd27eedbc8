use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::render::{RenderCtx, RenderSetupError, RenderTarget};
use crate::session::{Plane, Pose};

use super::common::{align_to, begin_load_pass, grown_capacity, premul_alpha_blend};
use super::plane_mesh::{PlaneMesh, PlaneVertex};
use super::shader::compile_wgsl;

const SHADER_LABEL: &str = "arhello plane shader";

const MIN_UNIFORM_SLOTS: usize = 8;
const MIN_VERTICES: usize = 256;
const MIN_INDICES: usize = 768;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct PlaneUniform {
    mvp: [[f32; 4]; 4],
    color: [f32; 4],
}

fn plane_uniform_size() -> wgpu::BufferSize {
    wgpu::BufferSize::new(std::mem::size_of::<PlaneUniform>() as u64)
        .expect("PlaneUniform has non-zero size by construction")
}

/// Element counts of the most recent plane draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PlaneDrawCounts {
    pub vertices: u32,
    pub indices: u32,
}

/// Per-frame write positions into the scratch buffers.
///
/// Every plane drawn in a frame gets its own region: queue writes all land
/// before the frame's commands execute, so sharing a region would leave
/// every plane drawn with the last plane's data.
#[derive(Debug, Default, Copy, Clone)]
struct FrameCursor {
    uniform_slot: usize,
    vertex: usize,
    index: usize,
}

/// Translucent overlay for tracked planes.
///
/// Geometry is rebuilt from the plane's boundary polygon on every draw; no
/// GPU resources are kept per plane. Call [`begin_frame`](Self::begin_frame)
/// once per frame before the first [`draw`](Self::draw).
pub struct PlaneRenderer {
    color: [f32; 4],

    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,

    uniform_buf: Option<wgpu::Buffer>,
    uniform_stride: u64,
    uniform_slots: usize,

    vertex_buf: Option<wgpu::Buffer>,
    vertex_capacity: usize,

    index_buf: Option<wgpu::Buffer>,
    index_capacity: usize,

    cursor: FrameCursor,
    mesh: PlaneMesh,
    last_draw: Option<PlaneDrawCounts>,
    warned_uninitialized: bool,
}

impl PlaneRenderer {
    /// `color` is straight (non-premultiplied) linear RGBA.
    pub fn new(color: [f32; 4]) -> Self {
        Self {
            color,
            pipeline: None,
            bind_group_layout: None,
            bind_group: None,
            uniform_buf: None,
            uniform_stride: 0,
            uniform_slots: 0,
            vertex_buf: None,
            vertex_capacity: 0,
            index_buf: None,
            index_capacity: 0,
            cursor: FrameCursor::default(),
            mesh: PlaneMesh::new(),
            last_draw: None,
            warned_uninitialized: false,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Counts used by the last successful `draw`.
    pub fn last_draw(&self) -> Option<PlaneDrawCounts> {
        self.last_draw
    }

    /// Compiles the plane shader and allocates the initial scratch buffers.
    pub fn initialize(&mut self, ctx: &RenderCtx<'_>) -> Result<(), RenderSetupError> {
        if self.is_ready() {
            return Ok(());
        }

        let shader = compile_wgsl(
            ctx.device,
            SHADER_LABEL,
            include_str!("shaders/plane.wgsl"),
            &["vs_main", "fs_main"],
        )?;

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("arhello plane bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: Some(plane_uniform_size()),
                },
                count: None,
            }],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("arhello plane pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("arhello plane pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[PlaneVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Planes are seen from both sides.
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

        let alignment = ctx.uniform_offset_alignment();
        self.uniform_stride = align_to(std::mem::size_of::<PlaneUniform>() as u64, alignment);

        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bgl);

        self.ensure_uniform_slots(ctx, MIN_UNIFORM_SLOTS);
        self.ensure_vertex_capacity(ctx, MIN_VERTICES);
        self.ensure_index_capacity(ctx, MIN_INDICES);

        log::debug!(
            "plane renderer ready (uniform stride {} bytes)",
            self.uniform_stride
        );
        Ok(())
    }

    /// Starts a new frame: scratch regions are reused from the beginning.
    pub fn begin_frame(&mut self) {
        self.cursor = FrameCursor::default();
    }

    /// Draws one plane. Returns `false` (nothing recorded) when the renderer
    /// is not initialized or the polygon is degenerate.
    pub fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        plane: &Plane,
        camera_pose: &Pose,
        projection: &Mat4,
    ) -> bool {
        if !self.is_ready() {
            if !self.warned_uninitialized {
                log::warn!("PlaneRenderer::draw called before initialize; skipped");
                self.warned_uninitialized = true;
            }
            return false;
        }

        if !self.mesh.rebuild(&plane.polygon) {
            log::trace!(
                "plane with {} boundary points has no drawable polygon",
                plane.polygon.len()
            );
            return false;
        }

        let world = plane.center_pose.to_matrix();
        let view = camera_pose.inverse().to_matrix();
        let uniform = PlaneUniform {
            mvp: (*projection * view * world).to_cols_array_2d(),
            color: self.color,
        };

        let vertex_count = self.mesh.vertices().len();
        let index_count = self.mesh.indices().len();

        // Growing replaces the buffer and restarts at its beginning; passes
        // already recorded this frame keep the old buffer alive.
        let slot_end = self.cursor.uniform_slot + 1;
        if slot_end > self.uniform_slots {
            self.ensure_uniform_slots(ctx, slot_end);
            self.cursor.uniform_slot = 0;
        }
        let vertex_end = self.cursor.vertex + vertex_count;
        if vertex_end > self.vertex_capacity {
            self.ensure_vertex_capacity(ctx, vertex_end);
            self.cursor.vertex = 0;
        }
        let index_end = self.cursor.index + index_count;
        if index_end > self.index_capacity {
            self.ensure_index_capacity(ctx, index_end);
            self.cursor.index = 0;
        }

        let Some(pipeline) = self.pipeline.as_ref() else {
            return false;
        };
        let Some(bind_group) = self.bind_group.as_ref() else {
            return false;
        };
        let Some(uniform_buf) = self.uniform_buf.as_ref() else {
            return false;
        };
        let Some(vertex_buf) = self.vertex_buf.as_ref() else {
            return false;
        };
        let Some(index_buf) = self.index_buf.as_ref() else {
            return false;
        };

        let uniform_offset = self.cursor.uniform_slot as u64 * self.uniform_stride;
        let vertex_offset = (self.cursor.vertex * std::mem::size_of::<PlaneVertex>()) as u64;
        let index_offset = (self.cursor.index * std::mem::size_of::<u32>()) as u64;

        ctx.queue.write_buffer(uniform_buf, uniform_offset, bytemuck::bytes_of(&uniform));
        ctx.queue.write_buffer(
            vertex_buf,
            vertex_offset,
            bytemuck::cast_slice(self.mesh.vertices()),
        );
        ctx.queue.write_buffer(
            index_buf,
            index_offset,
            bytemuck::cast_slice(self.mesh.indices()),
        );

        let first_index = self.cursor.index as u32;
        let base_vertex = self.cursor.vertex as i32;

        {
            let mut rpass = begin_load_pass(
                &mut *target.encoder,
                target.color_view,
                "arhello plane pass",
            );
            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(0, bind_group, &[uniform_offset as u32]);
            rpass.set_vertex_buffer(0, vertex_buf.slice(..));
            rpass.set_index_buffer(index_buf.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(
                first_index..first_index + index_count as u32,
                base_vertex,
                0..1,
            );
        }

        self.cursor.uniform_slot += 1;
        self.cursor.vertex += vertex_count;
        self.cursor.index += index_count;
        self.last_draw = Some(PlaneDrawCounts {
            vertices: vertex_count as u32,
            indices: index_count as u32,
        });
        true
    }

    fn ensure_uniform_slots(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.uniform_slots && self.uniform_buf.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else {
            return;
        };

        let slots = grown_capacity(required, MIN_UNIFORM_SLOTS);
        let uniform_buf = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("arhello plane ubo"),
            size: slots as u64 * self.uniform_stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("arhello plane bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buf,
                    offset: 0,
                    size: Some(plane_uniform_size()),
                }),
            }],
        });

        self.uniform_buf = Some(uniform_buf);
        self.bind_group = Some(bind_group);
        self.uniform_slots = slots;
    }

    fn ensure_vertex_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.vertex_capacity && self.vertex_buf.is_some() {
            return;
        }
        let capacity = grown_capacity(required, MIN_VERTICES);
        self.vertex_buf = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("arhello plane vbo"),
            size: (capacity * std::mem::size_of::<PlaneVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.vertex_capacity = capacity;
    }

    fn ensure_index_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.index_capacity && self.index_buf.is_some() {
            return;
        }
        let capacity = grown_capacity(required, MIN_INDICES);
        self.index_buf = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("arhello plane ibo"),
            size: (capacity * std::mem::size_of::<u32>()) as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.index_capacity = capacity;
    }
}
