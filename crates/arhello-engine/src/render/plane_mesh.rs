use bytemuck::{Pod, Zeroable};
use glam::Vec3;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PlaneVertex {
    pub pos: [f32; 3],
}

impl PlaneVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PlaneVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Number of triangle-fan indices for a polygon of `points` boundary points.
#[inline]
pub fn fan_index_count(points: usize) -> usize {
    if points < 3 { 0 } else { 3 * (points - 2) }
}

/// CPU-side triangulation of a plane's boundary polygon.
///
/// One vertex per boundary point, in the supplied order, fanned from the
/// first point: triangles `(0, i, i + 1)` for `i in 1..n - 1`. Plane
/// boundaries are convex (or star-shaped around their first point), so the
/// fan covers the polygon without overlap.
#[derive(Debug, Default, Clone)]
pub struct PlaneMesh {
    vertices: Vec<PlaneVertex>,
    indices: Vec<u32>,
}

impl PlaneMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mesh, or `None` for a degenerate polygon.
    pub fn from_polygon(points: &[Vec3]) -> Option<Self> {
        let mut mesh = Self::new();
        mesh.rebuild(points).then_some(mesh)
    }

    /// Replaces the contents with the triangulation of `points`, reusing the
    /// allocations. Returns `false` (and leaves the mesh empty) when there
    /// are fewer than 3 points or any coordinate is not finite.
    pub fn rebuild(&mut self, points: &[Vec3]) -> bool {
        self.vertices.clear();
        self.indices.clear();

        if points.len() < 3 || !points.iter().all(|p| p.is_finite()) {
            return false;
        }

        self.vertices
            .extend(points.iter().map(|p| PlaneVertex { pos: p.to_array() }));

        let n = points.len() as u32;
        self.indices.reserve(fan_index_count(points.len()));
        for i in 1..n - 1 {
            self.indices.extend_from_slice(&[0, i, i + 1]);
        }
        true
    }

    pub fn vertices(&self) -> &[PlaneVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
