//! Top-level error type.

use thiserror::Error;

/// Errors surfaced by the volray facade and viewer.
#[derive(Debug, Error)]
pub enum VolrayError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error(transparent)]
    Core(#[from] volray_core::error::CoreError),

    #[error(transparent)]
    Render(#[from] volray_render::error::RenderError),

    #[error(transparent)]
    Preset(#[from] crate::presets::PresetError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// A specialized Result type for volray operations.
pub type Result<T> = std::result::Result<T, VolrayError>;
