//! Helpers shared by the renderers.

use super::RenderTarget;

pub(super) fn premul_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

/// Opens a pass that keeps the existing color contents.
///
/// The returned pass borrows the encoder; dropping it ends the pass and with
/// it every binding set on it.
pub(super) fn begin_load_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    label: &str,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    })
}

/// Clears the whole target to `color` (linear RGBA) in a pass of its own.
pub fn clear_target(target: &mut RenderTarget<'_>, color: [f32; 4]) {
    let [r, g, b, a] = color.map(f64::from);
    let _pass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("arhello clear pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target.color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });
}

/// Rounds `value` up to a multiple of `alignment` (a power of two).
#[inline]
pub(super) fn align_to(value: u64, alignment: u64) -> u64 {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}

/// Capacity to allocate when `required` elements no longer fit.
#[inline]
pub(super) fn grown_capacity(required: usize, minimum: usize) -> usize {
    required.next_power_of_two().max(minimum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_rounds_up() {
        assert_eq!(align_to(80, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(257, 256), 512);
        assert_eq!(align_to(0, 64), 0);
    }

    #[test]
    fn growth_is_power_of_two_with_floor() {
        assert_eq!(grown_capacity(3, 64), 64);
        assert_eq!(grown_capacity(65, 64), 128);
        assert_eq!(grown_capacity(1000, 64), 1024);
    }
}
