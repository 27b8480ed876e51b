//! GPU side of the identification pass.
//!
//! Renderers record into a caller-owned encoder via wgpu and own their GPU
//! resources (pipelines, uniform buffers).
//!
//! Convention:
//! - positions are local-space `Float32x3` at attribute location 0;
//! - every draw carries its own `IdentUniform` (view, proj, bias, color)
//!   bound at group 0 / binding 0 through a dynamic offset.

mod common;
mod ctx;
mod ident;
mod mesh;
mod target;

pub use common::{IdentUniform, PositionVertex};
pub use ctx::{RenderCtx, RenderTarget, TargetFormats};
pub use ident::{IdentDraw, IdentFrame, IdentPassConfig, IdentRenderer};
pub use mesh::{IdentMesh, Primitive};
pub use target::IdentTarget;

/// WGSL source of the identification pass (`vs_main` / `fs_main`).
pub const IDENT_SHADER_WGSL: &str = include_str!("shaders/ident.wgsl");

#[cfg(test)]
mod tests {
    use super::{IdentUniform, IDENT_SHADER_WGSL};

    fn parse() -> naga::Module {
        naga::front::wgsl::parse_str(IDENT_SHADER_WGSL).expect("ident.wgsl should parse")
    }

    #[test]
    fn shader_validates() {
        let module = parse();
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .expect("ident.wgsl should validate");
    }

    #[test]
    fn shader_exposes_both_entry_points() {
        let module = parse();
        let entries: Vec<(&str, naga::ShaderStage)> = module
            .entry_points
            .iter()
            .map(|ep| (ep.name.as_str(), ep.stage))
            .collect();
        assert!(entries.contains(&("vs_main", naga::ShaderStage::Vertex)));
        assert!(entries.contains(&("fs_main", naga::ShaderStage::Fragment)));
    }

    #[test]
    fn shader_uniform_matches_host_layout() {
        let module = parse();
        let (members, span) = module
            .types
            .iter()
            .find_map(|(_, ty)| match (ty.name.as_deref(), &ty.inner) {
                (Some("IdentUniform"), naga::TypeInner::Struct { members, span }) => {
                    Some((members.clone(), *span))
                }
                _ => None,
            })
            .expect("IdentUniform struct in shader");

        assert_eq!(span as usize, std::mem::size_of::<IdentUniform>());

        let layout: Vec<(Option<&str>, u32)> =
            members.iter().map(|m| (m.name.as_deref(), m.offset)).collect();
        assert_eq!(
            layout,
            vec![
                (Some("view"), 0),
                (Some("proj"), 64),
                (Some("bias"), 128),
                (Some("color"), 144),
            ]
        );
    }
}
