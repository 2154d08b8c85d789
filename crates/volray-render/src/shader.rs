//! Shader source management and compilation.
//!
//! The canonical WGSL sources are embedded in the crate; a [`ShaderSet`]
//! can also be read from a directory, which is how the viewer hot-reloads
//! shaders while running. Compilation goes through a validation scope so a
//! broken program surfaces as a typed error instead of an uncaught device
//! error.

use std::path::Path;

use pollster::FutureExt;

use crate::error::{RenderError, RenderResult};

/// The WGSL sources for the three pipeline passes.
#[derive(Debug, Clone)]
pub struct ShaderSet {
    /// Entry/exit rasterization program.
    pub bounding_geometry: String,
    /// Transfer-function lookup-table program.
    pub transfer_function: String,
    /// Ray-marching compositing program.
    pub raycast: String,
}

impl ShaderSet {
    /// The sources compiled into this crate.
    #[must_use]
    pub fn embedded() -> Self {
        Self {
            bounding_geometry: include_str!("shaders/bounding_geometry.wgsl").to_string(),
            transfer_function: include_str!("shaders/transfer_function.wgsl").to_string(),
            raycast: include_str!("shaders/raycast.wgsl").to_string(),
        }
    }

    /// Reads the three sources from a directory, expecting the same file
    /// names this crate ships (`bounding_geometry.wgsl`,
    /// `transfer_function.wgsl`, `raycast.wgsl`).
    pub fn from_dir(dir: &Path) -> RenderResult<Self> {
        let read = |name: &str| -> RenderResult<String> {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|source| RenderError::ShaderReadFailed {
                path: path.display().to_string(),
                source,
            })
        };
        Ok(Self {
            bounding_geometry: read("bounding_geometry.wgsl")?,
            transfer_function: read("transfer_function.wgsl")?,
            raycast: read("raycast.wgsl")?,
        })
    }
}

impl Default for ShaderSet {
    fn default() -> Self {
        Self::embedded()
    }
}

/// Compiles one WGSL module, turning validation failure into a typed
/// error.
pub fn compile(
    device: &wgpu::Device,
    label: &str,
    source: &str,
) -> RenderResult<wgpu::ShaderModule> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    if let Some(error) = device.pop_error_scope().block_on() {
        return Err(RenderError::ShaderCompilationFailed {
            label: label.to_string(),
            message: error.to_string(),
        });
    }
    Ok(module)
}
