//! Rendering error types.

use thiserror::Error;

/// Errors that can occur during rendering operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create surface.
    #[error("failed to create surface: {0}")]
    SurfaceCreationFailed(#[from] wgpu::CreateSurfaceError),

    /// Failed to acquire the next surface frame.
    #[error("failed to acquire surface frame: {0}")]
    SurfaceAcquireFailed(#[from] wgpu::SurfaceError),

    /// Shader source could not be read from disk.
    #[error("failed to read shader source {path}: {source}")]
    ShaderReadFailed {
        path: String,
        source: std::io::Error,
    },

    /// Shader compilation or validation failed. Fatal: the pipeline cannot
    /// run without its program.
    #[error("shader compilation failed for {label}: {message}")]
    ShaderCompilationFailed { label: String, message: String },

    /// GPU readback mapping failed.
    #[error("GPU buffer mapping failed")]
    BufferMapFailed,

    /// Readback is only available on a headless engine.
    #[error("pixel readback requires a headless render target")]
    NoReadbackTarget,
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
