//! Vertex stage of the identification pass, evaluated on the CPU.
//!
//! `VertexTransform::clip_position` and `vs_main` in
//! `render/shaders/ident.wgsl` compute the same thing:
//!
//! ```text
//! clip = proj * view * (p, 1)
//! clip.z -= bias
//! ```

mod bias;
mod stage;

pub use bias::DepthBias;
pub use stage::VertexTransform;
