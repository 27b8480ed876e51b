//! Renders a cube and its wireframe through the identification pass, offscreen.
//!
//! The faces, edges and corners are drawn with distinct colors; the edges and
//! corners stay visible over the faces because only line and point draws get
//! the vertex-stage depth bias.

use anyhow::Result;
use glam::{Mat4, Vec3};
use identpass::coords::ColorRgba;
use identpass::device::{Gpu, GpuInit};
use identpass::logging::{init_logging, LoggingConfig};
use identpass::render::{
    IdentDraw, IdentFrame, IdentMesh, IdentPassConfig, IdentRenderer, IdentTarget, Primitive,
};
use identpass::transform::VertexTransform;

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;

const CUBE_CORNERS: [Vec3; 8] = [
    Vec3::new(-1.0, -1.0, -1.0),
    Vec3::new(1.0, -1.0, -1.0),
    Vec3::new(1.0, 1.0, -1.0),
    Vec3::new(-1.0, 1.0, -1.0),
    Vec3::new(-1.0, -1.0, 1.0),
    Vec3::new(1.0, -1.0, 1.0),
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(-1.0, 1.0, 1.0),
];

#[rustfmt::skip]
const CUBE_FACES: [u32; 36] = [
    0, 2, 1,  0, 3, 2, // -z
    4, 5, 6,  4, 6, 7, // +z
    0, 1, 5,  0, 5, 4, // -y
    3, 7, 6,  3, 6, 2, // +y
    0, 4, 7,  0, 7, 3, // -x
    1, 2, 6,  1, 6, 5, // +x
];

#[rustfmt::skip]
const CUBE_EDGES: [u32; 24] = [
    0, 1,  1, 2,  2, 3,  3, 0,
    4, 5,  5, 6,  6, 7,  7, 4,
    0, 4,  1, 5,  2, 6,  3, 7,
];

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());
    pollster::block_on(run())
}

async fn run() -> Result<()> {
    let gpu = Gpu::new(GpuInit::default()).await?;
    let config = IdentPassConfig::default();

    let mut renderer = IdentRenderer::new(config.clone())?;
    let target = IdentTarget::new(gpu.device(), WIDTH, HEIGHT, &config);

    let faces = IdentMesh::new(gpu.device(), Primitive::Triangles, &CUBE_CORNERS, Some(&CUBE_FACES));
    let edges = IdentMesh::new(gpu.device(), Primitive::Lines, &CUBE_CORNERS, Some(&CUBE_EDGES));
    let corners = IdentMesh::new(gpu.device(), Primitive::Points, &CUBE_CORNERS, None);

    let view = Mat4::look_at_rh(Vec3::new(4.0, -5.0, 3.0), Vec3::ZERO, Vec3::Z);
    let proj = Mat4::perspective_rh(50f32.to_radians(), WIDTH as f32 / HEIGHT as f32, 0.1, 100.0);
    let model = Mat4::from_rotation_z(0.3);

    let draws = [
        IdentDraw { mesh: &faces, model, color: ColorRgba::from_u8(1, 0, 0, 255) },
        IdentDraw { mesh: &edges, model, color: ColorRgba::from_u8(2, 0, 0, 255) },
        IdentDraw { mesh: &corners, model, color: ColorRgba::from_u8(3, 0, 0, 255) },
    ];
    let frame = IdentFrame { view, proj, draws: &draws };

    let mut encoder = gpu.create_encoder("identpass demo encoder");
    {
        let mut rt = target.render_target(&mut encoder);
        renderer.render(&gpu.render_ctx(), &mut rt, &frame);
    }
    gpu.submit(encoder);

    let probe = VertexTransform::new(view, proj)
        .with_model(model)
        .with_bias(renderer.config().depth_bias);
    for corner in CUBE_CORNERS.iter().take(2) {
        log::debug!("corner {corner} -> wireframe clip {}", probe.clip_position(*corner));
    }

    let (w, h) = target.size();
    log::info!(
        "identification pass recorded: {} draws into {w}x{h} {:?} target",
        draws.len(),
        config.color_format
    );

    Ok(())
}
