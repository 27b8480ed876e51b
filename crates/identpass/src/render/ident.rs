use anyhow::Result;
use glam::Mat4;

use crate::coords::ColorRgba;
use crate::render::{RenderCtx, RenderTarget, TargetFormats};
use crate::transform::{DepthBias, VertexTransform};

use super::common::{
    ident_ubo_min_binding_size, pack_uniforms, uniform_stride, IdentUniform, PositionVertex,
};
use super::mesh::{IdentMesh, Primitive};

/// Configuration of the identification pass.
///
/// The formats are what `IdentTarget::new` allocates. The renderer itself
/// follows whatever formats the target it records into reports.
#[derive(Debug, Clone)]
pub struct IdentPassConfig {
    /// Color attachment format. Use a non-sRGB format so ident colors are stored
    /// without conversion.
    pub color_format: wgpu::TextureFormat,

    /// Depth attachment format. Must have a depth aspect.
    pub depth_format: wgpu::TextureFormat,

    /// Clip-space Z offset applied to line and point draws. Faces are drawn
    /// unbiased so wireframe over them wins the depth test.
    pub depth_bias: DepthBias,

    /// Color of pixels no draw covers.
    pub clear_color: ColorRgba,
}

impl Default for IdentPassConfig {
    fn default() -> Self {
        Self {
            color_format: wgpu::TextureFormat::Rgba8Unorm,
            depth_format: wgpu::TextureFormat::Depth32Float,
            depth_bias: DepthBias::DEFAULT,
            clear_color: ColorRgba::transparent(),
        }
    }
}

impl IdentPassConfig {
    #[inline]
    pub fn formats(&self) -> TargetFormats {
        TargetFormats {
            color: self.color_format,
            depth: self.depth_format,
        }
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.depth_format.has_depth_aspect(),
            "depth format {:?} has no depth aspect",
            self.depth_format
        );
        anyhow::ensure!(
            !self.color_format.is_depth_stencil_format(),
            "color format {:?} is a depth/stencil format",
            self.color_format
        );
        anyhow::ensure!(
            self.clear_color.is_finite(),
            "clear color {:?} is not finite",
            self.clear_color
        );
        Ok(())
    }
}

/// One object drawn by the pass.
#[derive(Copy, Clone)]
pub struct IdentDraw<'a> {
    pub mesh: &'a IdentMesh,
    /// Local-to-world transform, folded into the view matrix.
    pub model: Mat4,
    pub color: ColorRgba,
}

/// Everything the pass draws in one recording.
#[derive(Copy, Clone)]
pub struct IdentFrame<'a> {
    pub view: Mat4,
    pub proj: Mat4,
    pub draws: &'a [IdentDraw<'a>],
}

/// Bias a draw of `primitive` receives.
///
/// Only lines and points are pulled forward; biasing faces by the same amount
/// would cancel out against their wireframe.
fn primitive_bias(primitive: Primitive, wire_bias: DepthBias) -> DepthBias {
    match primitive {
        Primitive::Triangles => DepthBias::NONE,
        Primitive::Lines | Primitive::Points => wire_bias,
    }
}

/// Uniform of one draw of `primitive` with local transform `model`.
fn draw_uniform(
    base: VertexTransform,
    primitive: Primitive,
    model: Mat4,
    color: ColorRgba,
) -> IdentUniform {
    base.with_model(model)
        .with_bias(primitive_bias(primitive, base.bias))
        .uniform(color)
}

/// Position of a frame draw in the uniform buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct DrawSlot {
    /// Index into `IdentFrame::draws`.
    draw: usize,
    /// Byte offset of its uniform.
    offset: wgpu::DynamicOffset,
}

/// Assigns consecutive uniform slots to the drawable entries of a frame.
///
/// Slot `k` sits at `k * stride`, the layout `pack_uniforms` produces.
fn draw_slots(drawable: impl IntoIterator<Item = bool>, stride: u64) -> Vec<DrawSlot> {
    drawable
        .into_iter()
        .enumerate()
        .filter(|&(_, ok)| ok)
        .map(|(draw, _)| draw)
        .enumerate()
        .map(|(slot, draw)| DrawSlot {
            draw,
            offset: (slot as u64 * stride) as wgpu::DynamicOffset,
        })
        .collect()
}

/// Identification pass renderer.
///
/// Clears the target, then draws every mesh with its flat color. Depth test
/// is `Less` with writes enabled; lines and points get the configured Z bias
/// in the vertex stage while faces do not, so wireframe drawn over coplanar
/// faces stays visible.
pub struct IdentRenderer {
    config: IdentPassConfig,

    pipeline_formats: Option<TargetFormats>,
    pipelines: [Option<wgpu::RenderPipeline>; 3],
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,

    uniform_buffer: Option<wgpu::Buffer>,
    uniform_capacity: usize,
    uniform_stride: u64,

    warned_empty: bool,
}

impl IdentRenderer {
    pub fn new(config: IdentPassConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            pipeline_formats: None,
            pipelines: [None, None, None],
            bind_group_layout: None,
            bind_group: None,
            uniform_buffer: None,
            uniform_capacity: 0,
            uniform_stride: 0,
            warned_empty: false,
        })
    }

    #[inline]
    pub fn config(&self) -> &IdentPassConfig {
        &self.config
    }

    /// Changes the wireframe depth bias for subsequent recordings. Pipelines are kept.
    pub fn set_depth_bias(&mut self, bias: DepthBias) {
        self.config.depth_bias = bias;
    }

    /// Records the identification pass for `frame` into `target`.
    ///
    /// Pipelines are rebuilt when `target.formats` differ from the last
    /// target's. Empty meshes are skipped (one-time debug message). An empty
    /// frame still clears the target.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        frame: &IdentFrame<'_>,
    ) {
        self.ensure_pipelines(ctx, target.formats);

        let drawable: Vec<bool> = frame.draws.iter().map(|d| !d.mesh.is_empty()).collect();
        let drawable_count = drawable.iter().filter(|&&ok| ok).count();
        if drawable_count < frame.draws.len() && !self.warned_empty {
            log::debug!("IdentRenderer: empty meshes in frame; skipped");
            self.warned_empty = true;
        }

        // Mutating methods must happen before borrowing pipelines/buffers immutably.
        self.ensure_uniform_capacity(ctx, drawable_count);
        self.ensure_bindings(ctx);

        let slots = draw_slots(drawable, self.uniform_stride);
        if !slots.is_empty() {
            if let Some(ubo) = self.uniform_buffer.as_ref() {
                let base = VertexTransform::new(frame.view, frame.proj)
                    .with_bias(self.config.depth_bias);
                let uniforms: Vec<IdentUniform> = slots
                    .iter()
                    .map(|s| {
                        let d = &frame.draws[s.draw];
                        draw_uniform(base, d.mesh.primitive(), d.model, d.color)
                    })
                    .collect();
                ctx.queue
                    .write_buffer(ubo, 0, &pack_uniforms(&uniforms, self.uniform_stride));
            }
        }

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("identpass ident pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.config.clear_color.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let Some(bind_group) = self.bind_group.as_ref() else { return };

        let mut bound: Option<Primitive> = None;
        for slot in &slots {
            let mesh = frame.draws[slot.draw].mesh;
            let primitive = mesh.primitive();
            if bound != Some(primitive) {
                let Some(pipeline) = self.pipelines[primitive.slot()].as_ref() else { continue };
                rpass.set_pipeline(pipeline);
                bound = Some(primitive);
            }

            rpass.set_bind_group(0, bind_group, &[slot.offset]);
            rpass.set_vertex_buffer(0, mesh.positions().slice(..));

            match mesh.indices() {
                Some(ibo) => {
                    rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..mesh.element_count(), 0, 0..1);
                }
                None => rpass.draw(0..mesh.element_count(), 0..1),
            }
        }

        log::trace!("IdentRenderer: recorded {} draws", slots.len());
    }

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>, formats: TargetFormats) {
        if !pipelines_stale(self.pipeline_formats, formats)
            && self.pipelines.iter().all(Option::is_some)
        {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("identpass ident shader"),
            source: wgpu::ShaderSource::Wgsl(super::IDENT_SHADER_WGSL.into()),
        });

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("identpass ident bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: true,
                            min_binding_size: Some(ident_ubo_min_binding_size()),
                        },
                        count: None,
                    }],
                });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("identpass ident pipeline layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    immediate_size: 0,
                });

        for primitive in Primitive::ALL {
            let pipeline = create_pipeline(ctx, &shader, &pipeline_layout, primitive, formats);
            self.pipelines[primitive.slot()] = Some(pipeline);
        }

        log::debug!(
            "IdentRenderer: pipelines built (color {:?}, depth {:?})",
            formats.color,
            formats.depth
        );

        self.pipeline_formats = Some(formats);
        self.bind_group_layout = Some(bind_group_layout);
        self.bind_group = None;
    }

    fn ensure_uniform_capacity(&mut self, ctx: &RenderCtx<'_>, required_draws: usize) {
        if required_draws <= self.uniform_capacity && self.uniform_buffer.is_some() {
            return;
        }

        let stride = uniform_stride(ctx.device.limits().min_uniform_buffer_offset_alignment);
        let new_cap = required_draws.next_power_of_two().max(16);

        self.uniform_buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("identpass ident ubo"),
            size: new_cap as u64 * stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.uniform_capacity = new_cap;
        self.uniform_stride = stride;

        // The bind group points at the old buffer.
        self.bind_group = None;

        log::debug!("IdentRenderer: uniform buffer grown to {new_cap} draws (stride {stride})");
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };
        let Some(ubo) = self.uniform_buffer.as_ref() else { return };

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("identpass ident bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: ubo,
                    offset: 0,
                    size: Some(ident_ubo_min_binding_size()),
                }),
            }],
        });

        self.bind_group = Some(bind_group);
    }
}

fn create_pipeline(
    ctx: &RenderCtx<'_>,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    primitive: Primitive,
    formats: TargetFormats,
) -> wgpu::RenderPipeline {
    let label = format!("identpass ident {} pipeline", primitive.label());
    ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&label),
        layout: Some(layout),

        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[PositionVertex::layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: formats.color,
                // Ident colors must land untouched.
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: primitive.topology(),
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        // Bias is applied in the vertex stage; hardware bias is triangle-only.
        depth_stencil: Some(wgpu::DepthStencilState {
            format: formats.depth,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),

        multiview_mask: None,
        cache: None,
    })
}

/// True when pipelines built for `cached` cannot render into `wanted`.
fn pipelines_stale(cached: Option<TargetFormats>, wanted: TargetFormats) -> bool {
    cached != Some(wanted)
}
