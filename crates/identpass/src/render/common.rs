//! GPU types shared by the identification pipelines.

use bytemuck::{Pod, Zeroable};

// ── per-draw uniform ──────────────────────────────────────────────────────

/// Uniform block of one identification draw, mirrored by `IdentUniform` in
/// `ident.wgsl`.
///
/// Layout (std140-compatible, 160 bytes):
/// - `view`  @ 0   column-major
/// - `proj`  @ 64  column-major
/// - `bias`  @ 128 (`x` used, `yzw` zero)
/// - `color` @ 144
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct IdentUniform {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub bias: [f32; 4],
    pub color: [f32; 4],
}

/// Returns the `wgpu` minimum binding size for one `IdentUniform`.
pub(super) fn ident_ubo_min_binding_size() -> std::num::NonZeroU64 {
    std::num::NonZeroU64::new(std::mem::size_of::<IdentUniform>() as u64)
        .expect("IdentUniform has non-zero size by construction")
}

/// Distance between consecutive uniforms in the dynamic-offset buffer.
///
/// `alignment` is the device's `min_uniform_buffer_offset_alignment`.
pub(super) fn uniform_stride(alignment: u32) -> u64 {
    let size = std::mem::size_of::<IdentUniform>() as u64;
    let align = u64::from(alignment.max(1));
    size.div_ceil(align) * align
}

/// Lays uniforms out `stride` bytes apart, zero-filling the gaps.
pub(super) fn pack_uniforms(uniforms: &[IdentUniform], stride: u64) -> Vec<u8> {
    let stride = stride as usize;
    let mut bytes = vec![0u8; uniforms.len() * stride];
    for (chunk, u) in bytes.chunks_exact_mut(stride).zip(uniforms) {
        let raw = bytemuck::bytes_of(u);
        chunk[..raw.len()].copy_from_slice(raw);
    }
    bytes
}

// ── position vertex ───────────────────────────────────────────────────────

/// Local-space vertex position, attribute location 0.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PositionVertex {
    pub pos: [f32; 3],
}

impl PositionVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PositionVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

impl From<glam::Vec3> for PositionVertex {
    #[inline]
    fn from(v: glam::Vec3) -> Self {
        Self { pos: v.to_array() }
    }
}
