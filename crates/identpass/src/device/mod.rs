//! Headless GPU device management.
//!
//! This module creates the wgpu Instance/Adapter/Device/Queue the
//! identification pass runs on. No surface is involved: the pass renders into
//! offscreen targets.

mod gpu;
mod init;

pub use gpu::Gpu;
pub use init::GpuInit;
