//! Renders through the real renderers into an offscreen texture and reads
//! the pixels back.
//!
//! Skips (passes trivially) on machines without a usable adapter.

use arhello_engine::PipelineConfig;
use arhello_engine::device::{GpuInit, request_headless_device};
use arhello_engine::display::Rotation;
use arhello_engine::pipeline::{FramePipeline, GpuFrameSink, Renderers};
use arhello_engine::render::{PlaneDrawCounts, RenderCtx, RenderTarget, clear_target};
use arhello_engine::session::{CameraTextureHandle, Frame, SimulatedSession, TrackingSession};
use glam::Vec3;

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
const WIDTH: u32 = 128;
const HEIGHT: u32 = 96;
// 128 * 4 is already a multiple of COPY_BYTES_PER_ROW_ALIGNMENT.
const BYTES_PER_ROW: u32 = WIDTH * 4;
/// Enough frames for the floor to appear and the wall to be detected.
const TICKS: usize = 150;

fn device() -> Option<(wgpu::Device, wgpu::Queue)> {
    let init = GpuInit {
        power_preference: wgpu::PowerPreference::LowPower,
        ..Default::default()
    };
    match pollster::block_on(request_headless_device(&init)) {
        Ok(Some(pair)) => Some(pair),
        Ok(None) => {
            eprintln!("no GPU adapter; skipping");
            None
        }
        Err(e) => {
            eprintln!("device request failed ({e:#}); skipping");
            None
        }
    }
}

fn offscreen_texture(device: &wgpu::Device) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("offscreen target"),
        size: wgpu::Extent3d {
            width: WIDTH,
            height: HEIGHT,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

/// Copies the whole target into a mappable buffer and returns tightly packed RGBA rows.
fn read_pixels(device: &wgpu::Device, queue: &wgpu::Queue, texture: &wgpu::Texture) -> Vec<u8> {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("readback"),
        size: u64::from(BYTES_PER_ROW * HEIGHT),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("readback encoder"),
    });
    encoder.copy_texture_to_buffer(
        texture.as_image_copy(),
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(BYTES_PER_ROW),
                rows_per_image: Some(HEIGHT),
            },
        },
        texture.size(),
    );
    queue.submit(std::iter::once(encoder.finish()));

    let slice = buffer.slice(..);
    let (tx, rx) = crossbeam_channel::bounded(1);
    slice.map_async(wgpu::MapMode::Read, move |res| {
        let _ = tx.send(res);
    });
    device
        .poll(wgpu::PollType::wait_indefinitely())
        .expect("device poll");
    rx.recv().expect("map callback").expect("map readback buffer");

    let pixels = slice.get_mapped_range().to_vec();
    buffer.unmap();
    pixels
}

fn pixel(pixels: &[u8], x: u32, y: u32) -> [u8; 4] {
    let at = ((y * WIDTH + x) * 4) as usize;
    [pixels[at], pixels[at + 1], pixels[at + 2], pixels[at + 3]]
}

/// Target pixel covering `point`, or `None` when it projects off screen.
fn project(frame: &Frame, config: &PipelineConfig, point: Vec3) -> Option<(u32, u32)> {
    let projection = frame
        .camera
        .projection_matrix(config.near_clip, config.far_clip);
    let clip = projection * frame.camera.view_matrix() * point.extend(1.0);
    if clip.w <= 0.0 {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    let x = (ndc.x + 1.0) * 0.5 * WIDTH as f32;
    let y = (1.0 - ndc.y) * 0.5 * HEIGHT as f32;
    let on_screen = (0.0..WIDTH as f32).contains(&x) && (0.0..HEIGHT as f32).contains(&y);
    on_screen.then_some((x as u32, y as u32))
}

struct Run {
    history: Vec<(usize, Option<PlaneDrawCounts>)>,
    first_frame: Vec<u8>,
    last_frame: Vec<u8>,
}

/// Drives a `SimulatedSession` through the real renderers for `TICKS` frames.
fn render_simulated(device: &wgpu::Device, queue: &wgpu::Queue, config: PipelineConfig) -> Run {
    let ctx = RenderCtx::new(device, queue, TARGET_FORMAT);
    let texture = offscreen_texture(device);
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    let mut renderers = Renderers::new(&config);
    renderers.initialize(&ctx).expect("renderer setup");
    assert!(renderers.is_ready());
    assert!(renderers.background.texture_handle().is_some());

    let mut session = SimulatedSession::new(config.camera_image_size);
    session.configure(&config.session).expect("configure");
    session.resume().expect("resume");
    let mut pipeline = FramePipeline::new(config);
    pipeline.geometry().notify_resize(WIDTH, HEIGHT);

    let mut history = Vec::new();
    let mut first_frame = Vec::new();
    for tick in 0..TICKS {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("smoke encoder"),
        });
        let outcome = {
            let mut target = RenderTarget::new(&mut encoder, &view);
            clear_target(&mut target, [0.0, 0.0, 0.0, 1.0]);
            let mut sink = GpuFrameSink::new(&ctx, &mut target, &mut renderers);
            pipeline.tick(&mut session, &mut sink)
        };
        queue.submit(std::iter::once(encoder.finish()));

        let report = outcome.report().cloned().expect("rendered");
        assert!(report.background_drawn);
        assert_eq!(report.planes_skipped, 0);
        history.push((report.planes_drawn, renderers.planes.last_draw()));

        if tick == 0 {
            first_frame = read_pixels(device, queue, &texture);
        }
    }

    Run {
        history,
        first_frame,
        last_frame: read_pixels(device, queue, &texture),
    }
}

/// The frame the pipeline drew last, replayed on a second session.
fn last_simulated_frame(config: &PipelineConfig) -> Frame {
    let mut session = SimulatedSession::new(config.camera_image_size);
    session.configure(&config.session).expect("configure");
    session.set_display_geometry(Rotation::Deg0, WIDTH, HEIGHT);
    session.set_camera_texture_destination(CameraTextureHandle::new(1).expect("non-zero"));
    session.resume().expect("resume");

    let mut frame = session.update().expect("first frame");
    for _ in 1..TICKS {
        frame = session.update().expect("frame");
    }
    frame
}

fn smoke_config() -> PipelineConfig {
    PipelineConfig {
        camera_image_size: (64, 48),
        ..Default::default()
    }
}

#[test]
fn renders_background_and_planes_offscreen() {
    let Some((device, queue)) = device() else {
        return;
    };
    let run = render_simulated(&device, &queue, smoke_config());

    // Floor octagon once tracking starts, then the wall hexagon drawn after it.
    let floor = PlaneDrawCounts {
        vertices: 8,
        indices: 18,
    };
    let wall = PlaneDrawCounts {
        vertices: 6,
        indices: 12,
    };
    assert_eq!(run.history[0], (0, None));
    assert!(run.history.contains(&(1, Some(floor))));
    assert_eq!(run.history.last(), Some(&(2, Some(wall))));

    // The camera image covers the whole black clear; its blue channel is never zero.
    assert_eq!(run.first_frame.len(), (BYTES_PER_ROW * HEIGHT) as usize);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let [_, _, b, a] = pixel(&run.first_frame, x, y);
            assert!(b > 0, "pixel ({x}, {y}) is not covered by the camera image");
            assert_eq!(a, 255);
        }
    }
}

#[test]
fn tracked_planes_tint_their_centres() {
    let Some((device, queue)) = device() else {
        return;
    };
    let tinted = render_simulated(&device, &queue, smoke_config());
    let invisible = render_simulated(
        &device,
        &queue,
        PipelineConfig {
            plane_color: [0.0; 4],
            ..smoke_config()
        },
    );

    let config = smoke_config();
    let frame = last_simulated_frame(&config);
    assert_eq!(frame.tracked_planes().count(), 2);

    for plane in frame.tracked_planes() {
        let centre = plane.center_pose.translation;
        let (x, y) = project(&frame, &config, centre).expect("plane centre on screen");
        let [_, tg, tb, _] = pixel(&tinted.last_frame, x, y);
        let [_, bg, bb, _] = pixel(&invisible.last_frame, x, y);
        // The plane color is green-blue and the camera image is darker in both.
        assert!(tg > bg, "centre {centre} at ({x}, {y}): green {tg} <= {bg}");
        assert!(tb > bb, "centre {centre} at ({x}, {y}): blue {tb} <= {bb}");
    }
}

#[test]
fn renderers_initialize_once() {
    let Some((device, queue)) = device() else {
        return;
    };
    let ctx = RenderCtx::new(&device, &queue, TARGET_FORMAT);

    let mut renderers = Renderers::new(&PipelineConfig::default());
    renderers.initialize(&ctx).expect("first setup");
    let handle = renderers.background.texture_handle();
    renderers.initialize(&ctx).expect("second setup");
    assert_eq!(renderers.background.texture_handle(), handle);
}
