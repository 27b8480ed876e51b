//! Logging setup for identpass binaries.
//!
//! The library only talks to the `log` facade: pipeline (re)builds and uniform
//! buffer growth at debug, per-recording draw counts at trace, malformed mesh
//! input at warn. Hosts that already own a global logger keep it; headless
//! tools such as `identpass-demo` call `init_logging` once at startup, which
//! also holds wgpu/naga internals at warn unless `RUST_LOG` asks otherwise.

mod init;

pub use init::{init_logging, LoggingConfig};
