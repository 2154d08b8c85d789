use super::App;

use volray_render::{FrameScene, RenderError};

impl App {
    /// Renders one frame from a consistent settings snapshot.
    pub(super) fn render(&mut self) {
        let Some(engine) = &mut self.engine else {
            return;
        };

        // Input callbacks only ever touch the staged options; copying them
        // here is the single point where edits become visible to the
        // pipeline.
        let options = self.staged;

        let scene = FrameScene {
            rotation: self.trackball.rotation_matrix(),
            curve: &self.curve,
            options,
        };

        match engine.render_frame(&scene) {
            Ok(()) => {}
            Err(RenderError::SurfaceAcquireFailed(
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
            )) => {
                // Reconfiguring at the current size restores the swapchain;
                // the skipped frame is redrawn immediately after.
                let (width, height) = engine.dimensions();
                engine.resize(width, height);
            }
            Err(err) => {
                log::error!("frame failed: {err}");
            }
        }
    }
}
