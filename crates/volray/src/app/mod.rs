//! Application window and event loop management.

mod input;
mod render;

pub(super) use std::sync::Arc;

pub(super) use pollster::FutureExt;
pub(super) use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::KeyCode,
    window::{Window, WindowId},
};

pub(super) use glam::Vec2;
pub(super) use volray_core::{RenderOptions, Trackball, TransferCurve};
pub(super) use volray_render::{RenderEngine, ShaderSet};

use crate::config::RootDir;
use crate::error::Result;

/// The viewer application state.
pub struct App {
    pub(super) window: Option<Arc<Window>>,
    pub(super) engine: Option<RenderEngine>,
    pub(super) config: RootDir,
    pub(super) trackball: Trackball,
    /// Staged settings, edited by input and snapshotted at frame start.
    pub(super) staged: RenderOptions,
    pub(super) curve: TransferCurve,
    pub(super) bounding_mesh: volray_core::BoundingMesh,
    pub(super) mouse_pos: Vec2,
    pub(super) left_mouse_down: bool,
    pub(super) close_requested: bool,
}

impl App {
    /// Creates the application for a resolved root directory.
    #[must_use]
    pub fn new(config: RootDir) -> Self {
        let curve = crate::presets::load_or_default(&config.preset_dir());
        Self {
            window: None,
            engine: None,
            config,
            trackball: Trackball::default(),
            staged: RenderOptions::default(),
            curve,
            bounding_mesh: volray_core::BoundingMesh::cube(),
            mouse_pos: Vec2::ZERO,
            left_mouse_down: false,
            close_requested: false,
        }
    }

    /// Loads the shader set from the root directory, falling back to the
    /// embedded sources when the directory does not hold them.
    pub(super) fn load_shaders(&self) -> ShaderSet {
        match ShaderSet::from_dir(&self.config.shader_dir()) {
            Ok(sources) => sources,
            Err(err) => {
                log::info!("using embedded shaders ({err})");
                ShaderSet::embedded()
            }
        }
    }
}

/// Opens the viewer window and blocks until it closes.
pub fn run_app(config: RootDir) -> Result<()> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    Ok(())
}
