use glam::Vec3;
use wgpu::util::DeviceExt;

use super::common::PositionVertex;

/// Primitive kind of an identification mesh.
///
/// Faces are drawn as triangles; wireframe overlays as lines or points, which
/// is what the depth bias exists for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Primitive {
    Triangles,
    Lines,
    Points,
}

impl Primitive {
    pub const ALL: [Primitive; 3] = [Primitive::Triangles, Primitive::Lines, Primitive::Points];

    #[inline]
    pub fn topology(self) -> wgpu::PrimitiveTopology {
        match self {
            Primitive::Triangles => wgpu::PrimitiveTopology::TriangleList,
            Primitive::Lines => wgpu::PrimitiveTopology::LineList,
            Primitive::Points => wgpu::PrimitiveTopology::PointList,
        }
    }

    /// Number of elements (vertices or indices) per primitive.
    #[inline]
    pub const fn arity(self) -> u32 {
        match self {
            Primitive::Triangles => 3,
            Primitive::Lines => 2,
            Primitive::Points => 1,
        }
    }

    #[inline]
    pub(super) const fn slot(self) -> usize {
        match self {
            Primitive::Triangles => 0,
            Primitive::Lines => 1,
            Primitive::Points => 2,
        }
    }

    #[inline]
    pub(super) const fn label(self) -> &'static str {
        match self {
            Primitive::Triangles => "triangles",
            Primitive::Lines => "lines",
            Primitive::Points => "points",
        }
    }
}

/// Geometry drawn by the identification pass.
///
/// Owns a position buffer and, optionally, a `u32` index buffer. Faces and
/// their wireframe usually share positions with different index lists, so
/// build one mesh per primitive kind.
pub struct IdentMesh {
    primitive: Primitive,
    positions: wgpu::Buffer,
    indices: Option<wgpu::Buffer>,
    vertex_count: u32,
    element_count: u32,
}

impl IdentMesh {
    /// Uploads `positions` (and `indices`, if any) to the GPU.
    ///
    /// Without indices, positions are consumed in order.
    pub fn new(
        device: &wgpu::Device,
        primitive: Primitive,
        positions: &[Vec3],
        indices: Option<&[u32]>,
    ) -> Self {
        let vertices: Vec<PositionVertex> = positions.iter().copied().map(Into::into).collect();

        let label = primitive.label();
        let positions_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("identpass {label} positions")),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let indices_buf = indices.map(|idx| {
            if let Some(bad) = first_out_of_range(idx, positions.len()) {
                log::warn!(
                    "IdentMesh: index {bad} out of range for {} {label} vertices",
                    positions.len()
                );
            }
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("identpass {label} indices")),
                contents: bytemuck::cast_slice(idx),
                usage: wgpu::BufferUsages::INDEX,
            })
        });

        let element_count = indices.map_or(positions.len(), <[u32]>::len) as u32;
        let trailing = trailing_elements(primitive, element_count);
        if trailing != 0 {
            log::warn!(
                "IdentMesh: {element_count} elements is not a whole number of {label}; \
                 the last {trailing} are ignored"
            );
        }

        log::trace!(
            "IdentMesh: {} {label} vertices, {element_count} elements",
            positions.len()
        );

        Self {
            primitive,
            positions: positions_buf,
            indices: indices_buf,
            vertex_count: positions.len() as u32,
            element_count,
        }
    }

    #[inline]
    pub fn primitive(&self) -> Primitive {
        self.primitive
    }

    /// Index count for indexed meshes, vertex count otherwise.
    #[inline]
    pub fn element_count(&self) -> u32 {
        self.element_count
    }

    /// True when the mesh cannot produce a single primitive.
    ///
    /// A mesh without positions is empty whatever its indices say; its vertex
    /// buffer has nothing to bind.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !is_drawable(self.primitive, self.vertex_count, self.element_count)
    }

    #[inline]
    pub(super) fn positions(&self) -> &wgpu::Buffer {
        &self.positions
    }

    #[inline]
    pub(super) fn indices(&self) -> Option<&wgpu::Buffer> {
        self.indices.as_ref()
    }
}

fn is_drawable(primitive: Primitive, vertex_count: u32, element_count: u32) -> bool {
    vertex_count > 0 && element_count >= primitive.arity()
}

fn first_out_of_range(indices: &[u32], vertex_count: usize) -> Option<u32> {
    indices.iter().copied().find(|&i| i as usize >= vertex_count)
}

fn trailing_elements(primitive: Primitive, element_count: u32) -> u32 {
    element_count % primitive.arity()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topologies() {
        assert_eq!(Primitive::Triangles.topology(), wgpu::PrimitiveTopology::TriangleList);
        assert_eq!(Primitive::Lines.topology(), wgpu::PrimitiveTopology::LineList);
        assert_eq!(Primitive::Points.topology(), wgpu::PrimitiveTopology::PointList);
    }

    #[test]
    fn slots_are_distinct_and_dense() {
        let mut slots: Vec<usize> = Primitive::ALL.iter().map(|p| p.slot()).collect();
        slots.sort_unstable();
        assert_eq!(slots, vec![0, 1, 2]);
    }

    #[test]
    fn trailing_elements_per_primitive() {
        assert_eq!(trailing_elements(Primitive::Triangles, 7), 1);
        assert_eq!(trailing_elements(Primitive::Triangles, 9), 0);
        assert_eq!(trailing_elements(Primitive::Lines, 5), 1);
        assert_eq!(trailing_elements(Primitive::Points, 5), 0);
    }

    #[test]
    fn indices_without_positions_are_not_drawable() {
        assert!(!is_drawable(Primitive::Triangles, 0, 3));
        assert!(!is_drawable(Primitive::Lines, 0, 2));
        assert!(!is_drawable(Primitive::Points, 0, 1));
    }

    #[test]
    fn drawable_needs_one_whole_primitive() {
        assert!(!is_drawable(Primitive::Triangles, 3, 2));
        assert!(is_drawable(Primitive::Triangles, 3, 3));
        assert!(!is_drawable(Primitive::Lines, 2, 1));
        assert!(is_drawable(Primitive::Points, 1, 1));
        assert!(!is_drawable(Primitive::Points, 1, 0));
    }

    #[test]
    fn out_of_range_index_is_reported() {
        assert_eq!(first_out_of_range(&[0, 1, 2], 3), None);
        assert_eq!(first_out_of_range(&[0, 3, 1, 9], 3), Some(3));
        assert_eq!(first_out_of_range(&[], 0), None);
    }
}
