//! The bounding-geometry pass: per-pixel ray entry and exit points.
//!
//! The convex bounding mesh is rasterized twice into screen-sized
//! `Rgba16Float` targets. Culling back faces with a `Less` depth test
//! keeps the nearest front-face fragment (ray entry); culling front faces
//! with a `Greater` depth test keeps the farthest back-face fragment (ray
//! exit). Fragments encode the volume-local position in RGB and coverage
//! in alpha; the clear leaves uncovered pixels at alpha 0.

use glam::Mat4;
use wgpu::util::DeviceExt;

use volray_core::mesh::BoundingMesh;

use crate::shader;
use crate::shader::ShaderSet;
use crate::error::RenderResult;

/// Texture format of the entry and exit targets.
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Depth format shared by both rasterization passes.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// The screen-sized entry/exit targets plus their shared depth buffer.
///
/// Owned by the pass, fully overwritten every frame, sampled by the
/// ray-cast pass.
pub struct GeometryTargets {
    pub entry_texture: wgpu::Texture,
    pub entry_view: wgpu::TextureView,
    pub exit_texture: wgpu::Texture,
    pub exit_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl GeometryTargets {
    /// Allocates targets at the given resolution.
    #[must_use]
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (entry_texture, entry_view) = Self::color_target(device, "entry texture", width, height);
        let (exit_texture, exit_view) = Self::color_target(device, "exit texture", width, height);
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("geometry depth"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            entry_texture,
            entry_view,
            exit_texture,
            exit_view,
            depth_view,
            width,
            height,
        }
    }

    fn color_target(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    /// Reallocates the targets for a new viewport.
    ///
    /// The completeness check the fixed-function API had becomes a limits
    /// check here: a resolution the device cannot attach is logged and the
    /// previous frame's targets stay in service — degraded, not fatal.
    /// Returns whether the targets were replaced.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        if width == self.width && height == self.height {
            return false;
        }
        let limit = device.limits().max_texture_dimension_2d;
        if width == 0 || height == 0 || width > limit || height > limit {
            log::error!(
                "entry/exit target {width}x{height} is not attachable (device limit {limit}); \
                 keeping previous targets"
            );
            return false;
        }
        *self = Self::new(device, width, height);
        true
    }

    /// Current target resolution.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// GPU resources for rasterizing the bounding geometry.
pub struct GeometryPass {
    entry_pipeline: wgpu::RenderPipeline,
    exit_pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct GeometryUniforms {
    mvp: [[f32; 4]; 4],
}

impl GeometryPass {
    /// Builds both pipelines and uploads the mesh.
    pub fn new(
        device: &wgpu::Device,
        sources: &ShaderSet,
        mesh: &BoundingMesh,
    ) -> RenderResult<Self> {
        let module = shader::compile(device, "bounding geometry shader", &sources.bounding_geometry)?;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("geometry bind group layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("geometry uniforms"),
            contents: bytemuck::bytes_of(&GeometryUniforms {
                mvp: Mat4::IDENTITY.to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("geometry bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("geometry pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let make_pipeline = |label: &str, cull: wgpu::Face, compare: wgpu::CompareFunction| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some("vs_main"),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: (std::mem::size_of::<f32>() * 3) as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                    }],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: TARGET_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(cull),
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: compare,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        // Entry: keep the nearest front face. Exit: keep the farthest
        // back face.
        let entry_pipeline = make_pipeline(
            "entry pipeline",
            wgpu::Face::Back,
            wgpu::CompareFunction::Less,
        );
        let exit_pipeline = make_pipeline(
            "exit pipeline",
            wgpu::Face::Front,
            wgpu::CompareFunction::Greater,
        );

        let positions: Vec<[f32; 3]> = mesh.positions().iter().map(|p| p.to_array()).collect();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("bounding mesh vertices"),
            contents: bytemuck::cast_slice(&positions),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("bounding mesh indices"),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        Ok(Self {
            entry_pipeline,
            exit_pipeline,
            bind_group,
            uniform_buffer,
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count() as u32,
        })
    }

    /// Uploads this frame's model-view-projection matrix.
    pub fn update_uniforms(&self, queue: &wgpu::Queue, mvp: Mat4) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&GeometryUniforms {
                mvp: mvp.to_cols_array_2d(),
            }),
        );
    }

    /// Encodes both rasterization passes, entry first.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, targets: &GeometryTargets) {
        self.encode_one(
            encoder,
            "entry pass",
            &self.entry_pipeline,
            &targets.entry_view,
            &targets.depth_view,
            1.0,
        );
        self.encode_one(
            encoder,
            "exit pass",
            &self.exit_pipeline,
            &targets.exit_view,
            &targets.depth_view,
            0.0,
        );
    }

    fn encode_one(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        pipeline: &wgpu::RenderPipeline,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        depth_clear: f32,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(depth_clear),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
