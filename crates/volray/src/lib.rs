//! Interactive GPU volume ray casting.
//!
//! volray renders a 3-D scalar volume by marching viewing rays through a
//! GPU texture, compositing samples through a live-editable transfer
//! curve. Three strictly ordered passes run every frame: the bounding
//! geometry is rasterized twice into per-pixel ray entry/exit textures,
//! the transfer curve is evaluated into a lookup table, and a fullscreen
//! ray-cast pass resolves the image under the selected compositing mode.
//!
//! This crate is the facade: configuration, the winit viewer application,
//! and transfer-curve presets. The data model lives in `volray-core`, the
//! wgpu pipeline in `volray-render`.

pub mod app;
pub mod config;
pub mod demo;
pub mod error;
pub mod presets;

pub use config::{ConfigError, RootDir, ROOT_ENV_VAR};
pub use error::{Result, VolrayError};

pub use glam::{Mat4, Quat, UVec3, Vec2, Vec3, Vec4};
pub use volray_core::{
    BoundingMesh, ColorMode, LensMode, LensSettings, RaySettings, RenderOptions, Trackball,
    TransferCurve, Volume,
};
pub use volray_render::{Camera, FrameScene, RenderEngine, ShaderSet};

/// Opens the viewer on the demo volume and blocks until the window
/// closes. The root directory must already be resolved; missing
/// configuration is the binary's responsibility to report.
pub fn show(config: RootDir) -> Result<()> {
    app::run_app(config)
}
