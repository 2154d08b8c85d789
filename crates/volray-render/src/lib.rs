//! Rendering backend for volray.
//!
//! This crate provides the wgpu-based pipeline:
//! - the render engine (windowed and headless) and per-frame resources
//! - the three passes: bounding geometry, transfer function, ray cast
//! - WGSL shader sources and validated compilation
//! - the dual-lens camera

pub mod camera;
pub mod engine;
pub mod error;
pub mod geometry_pass;
pub mod raycast_pass;
pub mod screenshot;
pub mod shader;
pub mod transfer_pass;
pub mod volume_texture;

pub use camera::{Camera, Z_FAR, Z_NEAR};
pub use engine::{FrameScene, RenderEngine};
pub use error::{RenderError, RenderResult};
pub use geometry_pass::{GeometryPass, GeometryTargets};
pub use raycast_pass::RayCastPass;
pub use screenshot::{save_png, ScreenshotError};
pub use shader::ShaderSet;
pub use transfer_pass::TransferPass;
pub use volume_texture::VolumeTexture;
