use super::{
    ActiveEventLoop, App, ApplicationHandler, Arc, ElementState, FutureExt, KeyCode, LogicalSize,
    MouseButton, RenderEngine, Vec2, Window, WindowEvent, WindowId,
};

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title("volray")
            .with_inner_size(LogicalSize::new(1280, 720));

        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .expect("failed to create window"),
        );

        // Graphics-backend or shader failure here is a fatal configuration
        // error; the resulting panic terminates with a non-zero status.
        let mut engine = RenderEngine::new_windowed(window.clone(), self.load_shaders())
            .block_on()
            .expect("failed to create render engine");

        engine
            .set_bounding_mesh(&self.bounding_mesh)
            .expect("failed to build bounding geometry pass");
        engine.set_volume(&crate::demo::demo_volume());

        let size = window.inner_size();
        self.trackball
            .set_viewport(size.width as f32, size.height as f32);

        self.window = Some(window);
        self.engine = Some(engine);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.close_requested = true;
            }
            WindowEvent::Resized(size) => {
                if let Some(engine) = &mut self.engine {
                    engine.resize(size.width, size.height);
                }
                // Radius and center follow the viewport; the accumulated
                // rotation stays.
                self.trackball
                    .set_viewport(size.width as f32, size.height as f32);
            }
            WindowEvent::RedrawRequested => {
                self.render();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_pos = Vec2::new(position.x as f32, position.y as f32);
                // Physical button state guards the drag so a release that
                // happened outside the window cannot leave the trackball
                // stuck tracking.
                if self.left_mouse_down && self.trackball.tracking() {
                    self.trackball.move_to(self.mouse_pos);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    match state {
                        ElementState::Pressed => {
                            self.left_mouse_down = true;
                            // The hemisphere re-centers under the cursor,
                            // so the grab starts at its apex.
                            self.trackball.set_center(self.mouse_pos);
                            self.trackball.start_tracking(self.mouse_pos);
                        }
                        ElementState::Released => {
                            self.left_mouse_down = false;
                            self.trackball.stop_tracking();
                        }
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    winit::event::MouseScrollDelta::LineDelta(_, y) => y,
                    winit::event::MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                self.staged.lens.scroll(scroll);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                if let winit::keyboard::PhysicalKey::Code(code) = event.physical_key {
                    self.handle_key(code);
                }
            }
            _ => {}
        }

        if self.close_requested {
            event_loop.exit();
        }
    }
}

impl App {
    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Escape => {
                self.close_requested = true;
            }
            KeyCode::KeyR => self.reload_shaders(),
            KeyCode::KeyL => {
                self.staged.lens.lens = self.staged.lens.lens.toggled();
                log::info!("lens: {}", self.staged.lens.lens.name());
            }
            KeyCode::KeyC => {
                self.staged.ray.color_mode = self.staged.ray.color_mode.next();
                log::info!("color mode: {}", self.staged.ray.color_mode.name());
            }
            KeyCode::KeyV => {
                self.staged.ray.color_mode = self.staged.ray.color_mode.prev();
                log::info!("color mode: {}", self.staged.ray.color_mode.name());
            }
            KeyCode::KeyG => {
                self.staged.ray.gamma_correction = !self.staged.ray.gamma_correction;
                log::info!("gamma correction: {}", self.staged.ray.gamma_correction);
            }
            KeyCode::KeyI => {
                self.staged.ray.color_inversion = !self.staged.ray.color_inversion;
                log::info!("color inversion: {}", self.staged.ray.color_inversion);
            }
            _ => {}
        }
    }

    /// Recompiles the pipeline from on-disk sources. A reload that fails
    /// to compile is the shader service reporting a fatal error: the
    /// process terminates with a non-zero status.
    fn reload_shaders(&mut self) {
        let sources = self.load_shaders();
        let Some(engine) = &mut self.engine else {
            return;
        };
        match engine.reload_shaders(sources, &self.bounding_mesh) {
            Ok(()) => log::info!("shaders reloaded"),
            Err(err) => {
                log::error!("shader reload failed: {err}");
                std::process::exit(1);
            }
        }
    }
}
