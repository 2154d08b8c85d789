//! The render engine: device ownership and frame orchestration.
//!
//! One engine owns the wgpu context, the three pipeline passes and their
//! per-frame resources. Every frame runs the same strict sequence —
//! bounding geometry (entry, exit), transfer function, ray cast — because
//! each pass samples the previous pass's output; there is no valid
//! reordering.

use std::sync::Arc;

use glam::Mat4;

use volray_core::mesh::BoundingMesh;
use volray_core::settings::RenderOptions;
use volray_core::transfer::TransferCurve;
use volray_core::volume::Volume;

use crate::camera::Camera;
use crate::error::{RenderError, RenderResult};
use crate::geometry_pass::{GeometryPass, GeometryTargets};
use crate::raycast_pass::RayCastPass;
use crate::shader::ShaderSet;
use crate::transfer_pass::TransferPass;
use crate::volume_texture::VolumeTexture;

/// Everything one frame reads: the trackball rotation, the live transfer
/// curve, and the settings snapshot taken at frame start.
pub struct FrameScene<'a> {
    /// Accumulated trackball rotation; the only model transform.
    pub rotation: Mat4,
    /// The transfer curve, re-uploaded unconditionally.
    pub curve: &'a TransferCurve,
    /// This frame's settings snapshot.
    pub options: RenderOptions,
}

/// The wgpu-backed rendering engine.
pub struct RenderEngine {
    /// The wgpu instance.
    pub instance: wgpu::Instance,
    /// The wgpu adapter.
    pub adapter: wgpu::Adapter,
    /// The wgpu device.
    pub device: wgpu::Device,
    /// The wgpu queue.
    pub queue: wgpu::Queue,
    /// The render surface (None for headless).
    pub surface: Option<wgpu::Surface<'static>>,
    surface_config: Option<wgpu::SurfaceConfiguration>,
    offscreen: Option<wgpu::Texture>,
    format: wgpu::TextureFormat,
    /// Main camera.
    pub camera: Camera,
    width: u32,
    height: u32,
    sources: ShaderSet,
    geometry_pass: GeometryPass,
    transfer_pass: TransferPass,
    raycast_pass: RayCastPass,
    targets: GeometryTargets,
    volume: Option<VolumeTexture>,
    raycast_bind_group: Option<wgpu::BindGroup>,
}

impl RenderEngine {
    /// Creates an engine presenting to a window, vsync-paced.
    pub async fn new_windowed(
        window: Arc<winit::window::Window>,
        sources: ShaderSet,
    ) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;
        let (adapter, device, queue) = Self::request_device(&instance, Some(&surface)).await?;

        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        Self::finish_init(
            instance,
            adapter,
            device,
            queue,
            Some(surface),
            Some(surface_config),
            format,
            width,
            height,
            sources,
        )
    }

    /// Creates a surface-free engine rendering into an offscreen texture,
    /// for tests and batch screenshots.
    pub async fn new_headless(width: u32, height: u32, sources: ShaderSet) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let (adapter, device, queue) = Self::request_device(&instance, None).await?;

        let width = width.max(1);
        let height = height.max(1);
        Self::finish_init(
            instance,
            adapter,
            device,
            queue,
            None,
            None,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            width,
            height,
            sources,
        )
    }

    async fn request_device(
        instance: &wgpu::Instance,
        surface: Option<&wgpu::Surface<'_>>,
    ) -> RenderResult<(wgpu::Adapter, wgpu::Device, wgpu::Queue)> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: surface,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("volray device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await?;

        Ok((adapter, device, queue))
    }

    #[allow(clippy::too_many_arguments)]
    fn finish_init(
        instance: wgpu::Instance,
        adapter: wgpu::Adapter,
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface: Option<wgpu::Surface<'static>>,
        surface_config: Option<wgpu::SurfaceConfiguration>,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        sources: ShaderSet,
    ) -> RenderResult<Self> {
        let geometry_pass = GeometryPass::new(&device, &sources, &BoundingMesh::cube())?;
        let transfer_pass = TransferPass::new(&device, &sources)?;
        let raycast_pass = RayCastPass::new(&device, &sources, format)?;
        let targets = GeometryTargets::new(&device, width, height);

        let offscreen = if surface.is_none() {
            Some(Self::make_offscreen(&device, format, width, height))
        } else {
            None
        };

        let camera = Camera::new(width as f32 / height as f32);

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            surface,
            surface_config,
            offscreen,
            format,
            camera,
            width,
            height,
            sources,
            geometry_pass,
            transfer_pass,
            raycast_pass,
            targets,
            volume: None,
            raycast_bind_group: None,
        })
    }

    fn make_offscreen(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("offscreen target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        })
    }

    /// Uploads a volume, replacing the previous one.
    pub fn set_volume(&mut self, volume: &Volume) {
        self.volume = Some(VolumeTexture::upload(&self.device, &self.queue, volume));
        self.rebuild_raycast_bind_group();
    }

    /// Replaces the bounding geometry.
    pub fn set_bounding_mesh(&mut self, mesh: &BoundingMesh) -> RenderResult<()> {
        self.geometry_pass = GeometryPass::new(&self.device, &self.sources, mesh)?;
        Ok(())
    }

    /// Recompiles all three passes from new sources. Compilation failure
    /// leaves the engine on the old programs and propagates the error;
    /// the caller decides whether that is fatal.
    pub fn reload_shaders(&mut self, sources: ShaderSet, mesh: &BoundingMesh) -> RenderResult<()> {
        let geometry_pass = GeometryPass::new(&self.device, &sources, mesh)?;
        let transfer_pass = TransferPass::new(&self.device, &sources)?;
        let raycast_pass = RayCastPass::new(&self.device, &sources, self.format)?;
        self.sources = sources;
        self.geometry_pass = geometry_pass;
        self.transfer_pass = transfer_pass;
        self.raycast_pass = raycast_pass;
        self.rebuild_raycast_bind_group();
        Ok(())
    }

    /// Adapts to a new viewport: surface reconfiguration plus synchronous
    /// entry/exit target reallocation, before the next frame's first pass.
    /// The transfer LUT keeps its fixed width.
    pub fn resize(&mut self, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        self.width = width;
        self.height = height;

        if let (Some(surface), Some(config)) = (&self.surface, &mut self.surface_config) {
            config.width = width;
            config.height = height;
            surface.configure(&self.device, config);
        }
        if self.offscreen.is_some() {
            self.offscreen = Some(Self::make_offscreen(
                &self.device,
                self.format,
                width,
                height,
            ));
        }

        if self.targets.resize(&self.device, width, height) {
            self.rebuild_raycast_bind_group();
        }
        self.camera.set_aspect(width as f32 / height as f32);
    }

    fn rebuild_raycast_bind_group(&mut self) {
        self.raycast_bind_group = self.volume.as_ref().map(|volume| {
            self.raycast_pass.create_bind_group(
                &self.device,
                &volume.view,
                &volume.sampler,
                &self.targets.entry_view,
                &self.targets.exit_view,
                self.transfer_pass.lut_view(),
                self.transfer_pass.lut_sampler(),
            )
        });
    }

    /// Renders one frame: uniform uploads, then the three passes in their
    /// data-dependency order, in a single command encoder.
    pub fn render_frame(&mut self, scene: &FrameScene<'_>) -> RenderResult<()> {
        self.camera.apply(&scene.options.lens);
        self.camera.set_aspect(self.width as f32 / self.height as f32);
        let mvp = self.camera.view_projection_matrix() * scene.rotation;

        self.geometry_pass.update_uniforms(&self.queue, mvp);
        self.transfer_pass.update_curve(&self.queue, scene.curve);
        self.raycast_pass
            .update_uniforms(&self.queue, &scene.options.ray, scene.options.background);

        let surface_texture = match &self.surface {
            Some(surface) => Some(surface.get_current_texture()?),
            None => None,
        };
        let target_view = match (&surface_texture, &self.offscreen) {
            (Some(frame), _) => frame
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default()),
            (None, Some(offscreen)) => {
                offscreen.create_view(&wgpu::TextureViewDescriptor::default())
            }
            (None, None) => return Err(RenderError::NoReadbackTarget),
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        self.geometry_pass.render(&mut encoder, &self.targets);
        self.transfer_pass.render(&mut encoder);
        self.raycast_pass
            .render(&mut encoder, &target_view, self.raycast_bind_group.as_ref());

        self.queue.submit(std::iter::once(encoder.finish()));

        if let Some(frame) = surface_texture {
            frame.present();
        }
        Ok(())
    }

    /// Reads the offscreen target back as tightly packed RGBA bytes.
    /// Headless engines only.
    pub fn read_pixels(&self) -> RenderResult<Vec<u8>> {
        let offscreen = self
            .offscreen
            .as_ref()
            .ok_or(RenderError::NoReadbackTarget)?;

        let bytes_per_row = Self::aligned_bytes_per_row(self.width);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback buffer"),
            size: u64::from(bytes_per_row) * u64::from(self.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: offscreen,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = self.device.poll(wgpu::PollType::wait());
        rx.recv()
            .map_err(|_| RenderError::BufferMapFailed)?
            .map_err(|_| RenderError::BufferMapFailed)?;

        let data = buffer_slice.get_mapped_range();
        let row_bytes = (self.width * 4) as usize;
        let mut pixels = Vec::with_capacity(row_bytes * self.height as usize);
        for row in 0..self.height {
            let start = (row * bytes_per_row) as usize;
            pixels.extend_from_slice(&data[start..start + row_bytes]);
        }
        drop(data);
        buffer.unmap();

        Ok(pixels)
    }

    fn aligned_bytes_per_row(width: u32) -> u32 {
        let unaligned = width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        unaligned.div_ceil(align) * align
    }

    /// Current viewport dimensions.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Current entry/exit target dimensions (normally the viewport; stale
    /// after a degraded resize).
    #[must_use]
    pub fn target_dimensions(&self) -> (u32, u32) {
        self.targets.dimensions()
    }

    /// Width of the transfer LUT. Constant across resizes.
    #[must_use]
    pub fn lut_width(&self) -> u32 {
        self.transfer_pass.lut_width()
    }

    /// Whether a volume has been uploaded.
    #[must_use]
    pub fn has_volume(&self) -> bool {
        self.volume.is_some()
    }
}
