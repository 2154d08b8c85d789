//! The transfer-function pass: curve evaluation into the lookup table.
//!
//! A fullscreen pass over a 512x1 target, one fragment per LUT texel.
//! wgpu cannot attach a true 1-D texture as a render target, so the LUT is
//! a height-1 2-D texture; its width never follows the window size.

use wgpu::util::DeviceExt;

use volray_core::transfer::{TransferCurve, DEGREE, MAX_CONTROL_POINTS, TRANSFER_LUT_WIDTH};

use crate::error::RenderResult;
use crate::shader;
use crate::shader::ShaderSet;

/// Texture format of the lookup table.
pub const LUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// GPU mirror of the transfer curve, padded to the fixed capacity.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct CurveUniforms {
    colors: [[f32; 4]; MAX_CONTROL_POINTS],
    // Knot positions ride in .x; vec4 stride satisfies uniform layout
    // rules.
    knots: [[f32; 4]; MAX_CONTROL_POINTS + DEGREE + 1],
    num_colors: i32,
    degree: i32,
    _pad: [i32; 2],
}

impl CurveUniforms {
    fn from_curve(curve: &TransferCurve) -> Self {
        let mut colors = [[0.0; 4]; MAX_CONTROL_POINTS];
        for (slot, color) in colors.iter_mut().zip(curve.colors()) {
            *slot = color.to_array();
        }
        let mut knots = [[0.0; 4]; MAX_CONTROL_POINTS + DEGREE + 1];
        for (slot, &knot) in knots.iter_mut().zip(curve.knots()) {
            slot[0] = knot;
        }
        Self {
            colors,
            knots,
            num_colors: curve.num_points() as i32,
            degree: DEGREE as i32,
            _pad: [0; 2],
        }
    }
}

/// GPU resources for evaluating the transfer curve.
pub struct TransferPass {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    lut_view: wgpu::TextureView,
    lut_sampler: wgpu::Sampler,
}

impl TransferPass {
    /// Builds the pass and its fixed-width target.
    pub fn new(device: &wgpu::Device, sources: &ShaderSet) -> RenderResult<Self> {
        let module = shader::compile(device, "transfer function shader", &sources.transfer_function)?;

        let lut_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("transfer function lut"),
            size: wgpu::Extent3d {
                width: TRANSFER_LUT_WIDTH,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: LUT_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let lut_view = lut_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let lut_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("lut sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("transfer bind group layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("curve uniforms"),
            contents: bytemuck::bytes_of(&CurveUniforms::from_curve(&TransferCurve::empty())),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("transfer bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("transfer pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("transfer pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: LUT_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            pipeline,
            bind_group,
            uniform_buffer,
            lut_view,
            lut_sampler,
        })
    }

    /// Uploads this frame's curve. Called unconditionally every frame so
    /// live edits always land.
    pub fn update_curve(&self, queue: &wgpu::Queue, curve: &TransferCurve) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&CurveUniforms::from_curve(curve)),
        );
    }

    /// Encodes the evaluation pass, overwriting the whole LUT.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("transfer function pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.lut_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            ..Default::default()
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }

    /// The LUT view, for the ray-cast pass's bind group.
    #[must_use]
    pub fn lut_view(&self) -> &wgpu::TextureView {
        &self.lut_view
    }

    /// The LUT sampler.
    #[must_use]
    pub fn lut_sampler(&self) -> &wgpu::Sampler {
        &self.lut_sampler
    }

    /// Width of the lookup texture. Fixed; never follows the viewport.
    #[must_use]
    pub fn lut_width(&self) -> u32 {
        TRANSFER_LUT_WIDTH
    }
}
