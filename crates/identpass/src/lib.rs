//! Identification pass crate.
//!
//! This crate owns the vertex stage of the object-identification pass: the
//! clip-space transform with its wireframe depth bias, and the wgpu pieces
//! (shader, layouts, pipelines, offscreen target) that run it on the GPU.

pub mod coords;
pub mod device;
pub mod logging;
pub mod render;
pub mod transform;
