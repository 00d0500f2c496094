use std::path::Path;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, KeyCode, NamedKey, PhysicalKey},
    window::{Window, WindowId},
};

use crate::catalog::Catalog;
use crate::mesh::TARGET_SIZE;

use super::{
    camera::ArcBallCamera,
    gpu::GpuState,
    loading::{LoadEvent, Loader},
    scene_renderer::{DARK_BACKGROUND, LIGHT_BACKGROUND, SceneRenderer},
    state::ViewerState,
    ui::{self, UiRenderer},
};

/// Application state for the viewer
struct ViewerApp {
    window: Option<Window>,
    gpu: Option<GpuState<'static>>,
    camera: Option<ArcBallCamera>,
    scene_renderer: Option<SceneRenderer>,
    ui_renderer: Option<UiRenderer>,
    state: ViewerState,
    catalog: Catalog,
    dir_label: String,
    loader: Loader,
    /// Largest dimension of the displayed model, None while the scene is empty
    current_max_dimension: Option<f32>,
    initial_model: Option<String>,
    mouse_pressed_left: bool,
    mouse_pressed_right: bool,
    last_mouse_pos: Option<winit::dpi::PhysicalPosition<f64>>,
    cursor_pos: Option<winit::dpi::PhysicalPosition<f64>>,
    last_frame: Instant,
    pending_screenshot: Option<String>,
    screenshot_serial: u32,
}

impl ViewerApp {
    fn new(catalog: Catalog, dir_label: String, initial_model: Option<String>) -> Self {
        Self {
            window: None,
            gpu: None,
            camera: None,
            scene_renderer: None,
            ui_renderer: None,
            state: ViewerState::default(),
            catalog,
            dir_label,
            loader: Loader::new(),
            current_max_dimension: None,
            initial_model,
            mouse_pressed_left: false,
            mouse_pressed_right: false,
            last_mouse_pos: None,
            cursor_pos: None,
            last_frame: Instant::now(),
            pending_screenshot: None,
            screenshot_serial: 0,
        }
    }

    /// Mark the entry active (deactivating any previous one) and issue an
    /// asynchronous load for it.
    fn select_and_load(&mut self, catalog_index: usize) {
        let Some(entry) = self.catalog.get(catalog_index) else {
            return;
        };
        let name = entry.display_name.clone();
        let path = entry.path.clone();

        // Detach the current model before issuing the request, so a failed
        // load leaves an empty scene rather than a stale one
        if let Some(renderer) = self.scene_renderer.as_mut() {
            renderer.clear_model();
        }
        self.current_max_dimension = None;
        self.state.selected = Some(catalog_index);

        let request_id = self.state.begin_load(&name);
        log::info!("loading {:?} (request {})", path, request_id);
        self.loader.spawn(request_id, name, path);
    }

    /// Drain pending load completions, dropping those of superseded requests
    fn process_load_events(&mut self) {
        while let Some(event) = self.loader.try_next() {
            if self.state.is_stale(event.request_id()) {
                log::debug!(
                    "discarding stale load completion (request {})",
                    event.request_id()
                );
                continue;
            }

            match event {
                LoadEvent::Loaded { name, model, .. } => {
                    let Some(gpu) = self.gpu.as_ref() else { continue };
                    let Some(renderer) = self.scene_renderer.as_mut() else {
                        continue;
                    };

                    renderer.load_model(&gpu.device, &model);
                    if let Some(camera) = self.camera.as_mut() {
                        camera.frame(model.max_dimension);
                    }
                    self.current_max_dimension = Some(model.max_dimension);

                    println!(
                        "Showing {}: {} meshes, {} triangles",
                        name, model.info.mesh_count, model.info.triangle_count
                    );
                    self.state.finish_load(&name, model.info.clone());
                }
                LoadEvent::Failed { name, message, .. } => {
                    log::error!("failed to load {}: {}", name, message);
                    self.state.fail_load(&name, message);
                }
            }
        }
    }

    /// Keep the keyboard highlight inside the filtered list
    fn clamp_cursor(&mut self) {
        let visible = self.catalog.filter_indexed(&self.state.search).len();
        self.state.cursor = self.state.cursor.min(visible.saturating_sub(1));
    }

    fn handle_search_key(&mut self, logical_key: &Key) {
        match logical_key {
            Key::Named(NamedKey::Escape) => {
                self.state.search.clear();
                self.state.search_active = false;
                self.clamp_cursor();
            }
            Key::Named(NamedKey::Enter) => {
                self.state.search_active = false;
            }
            Key::Named(NamedKey::Backspace) => {
                self.state.search.pop();
                self.clamp_cursor();
            }
            Key::Named(NamedKey::Space) => {
                self.state.search.push(' ');
                self.clamp_cursor();
            }
            Key::Character(text) => {
                self.state.search.push_str(text);
                self.clamp_cursor();
            }
            _ => {}
        }
    }

    fn handle_shortcut(&mut self, keycode: KeyCode, event_loop: &ActiveEventLoop) {
        match keycode {
            KeyCode::Slash => {
                self.state.search_active = true;
            }
            KeyCode::ArrowUp => {
                self.state.cursor = self.state.cursor.saturating_sub(1);
            }
            KeyCode::ArrowDown => {
                self.state.cursor += 1;
                self.clamp_cursor();
            }
            KeyCode::Enter => {
                let target = self
                    .catalog
                    .filter_indexed(&self.state.search)
                    .get(self.state.cursor)
                    .map(|(catalog_index, _)| *catalog_index);
                if let Some(catalog_index) = target {
                    self.select_and_load(catalog_index);
                }
            }
            KeyCode::KeyR => {
                // No-op while the scene is empty
                if let (Some(camera), Some(max_dimension)) =
                    (self.camera.as_mut(), self.current_max_dimension)
                {
                    camera.frame(max_dimension);
                    println!("Camera reset");
                }
            }
            KeyCode::KeyW => {
                let on = self.state.toggle_wireframe();
                println!("Wireframe: {}", if on { "ON" } else { "OFF" });
            }
            KeyCode::KeyG => {
                let on = self.state.toggle_grid();
                println!("Grid: {}", if on { "ON" } else { "OFF" });
            }
            KeyCode::KeyB => {
                let light = self.state.toggle_background();
                println!("Background: {}", if light { "LIGHT" } else { "DARK" });
            }
            KeyCode::KeyU => {
                self.state.show_ui = !self.state.show_ui;
            }
            KeyCode::KeyP => {
                self.screenshot_serial += 1;
                self.pending_screenshot = Some(format!("mshelf-{:03}.png", self.screenshot_serial));
            }
            KeyCode::KeyQ | KeyCode::Escape => {
                event_loop.exit();
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Window creation and GPU initialization happens here in winit 0.30
        if self.window.is_none() {
            let window_attributes = Window::default_attributes().with_title("modelshelf");
            let window = event_loop.create_window(window_attributes).unwrap();

            let size = window.inner_size();
            let gpu = pollster::block_on(async {
                // SAFETY: The window lives as long as ViewerApp, and we ensure
                // the surface (which borrows the window) is dropped before the window
                let window_ptr: &'static Window =
                    unsafe { std::mem::transmute(&window as &Window) };
                GpuState::new(window_ptr).await.unwrap()
            });

            // Framed for a normalized model until the first load lands
            let camera = ArcBallCamera::new(TARGET_SIZE, size.width, size.height);
            let scene_renderer = SceneRenderer::new(&gpu.device, &gpu.config);
            let ui_renderer = UiRenderer::new(&gpu.device, &gpu.config);

            self.gpu = Some(gpu);
            self.camera = Some(camera);
            self.scene_renderer = Some(scene_renderer);
            self.ui_renderer = Some(ui_renderer);
            self.window = Some(window);
            self.last_frame = Instant::now();

            println!("Browsing {} models...", self.catalog.len());
            println!("  Mouse: Rotate (drag), Zoom (scroll), Pan (right-drag)");
            println!("  Up/Down + Enter or Click: Show model");
            println!("  /: Search   R: Reset camera   P: Screenshot");
            println!("  W: Wireframe   G: Grid   B: Background   U: Hide UI");
            println!("  Q/ESC: Exit");

            if let Some(wanted) = self.initial_model.take() {
                let found = self
                    .catalog
                    .entries()
                    .iter()
                    .position(|e| e.file_name == wanted || e.display_name == wanted);
                match found {
                    Some(catalog_index) => self.select_and_load(catalog_index),
                    None => log::warn!("model {:?} not found in catalog", wanted),
                }
            }

            if let Some(window) = self.window.as_ref() {
                window.request_redraw();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Apply finished loads before reacting to input
        self.process_load_events();

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(gpu), Some(scene_renderer), Some(ui_renderer), Some(camera)) = (
                    self.gpu.as_mut(),
                    self.scene_renderer.as_mut(),
                    self.ui_renderer.as_mut(),
                    self.camera.as_mut(),
                ) {
                    gpu.resize(new_size);
                    scene_renderer.resize(&gpu.device, &gpu.config);
                    ui_renderer.resize(&gpu.queue, new_size.width, new_size.height);
                    camera.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed {
                    if self.state.search_active {
                        self.handle_search_key(&event.logical_key);
                    } else if let PhysicalKey::Code(keycode) = event.physical_key {
                        self.handle_shortcut(keycode, event_loop);
                    }
                }
            }
            WindowEvent::MouseInput {
                state: btn_state,
                button,
                ..
            } => match button {
                MouseButton::Left => {
                    if btn_state == ElementState::Pressed {
                        // Clicks over the panel select a model; elsewhere
                        // they start a rotate drag
                        let hit = self.cursor_pos.and_then(|pos| {
                            let visible = self.catalog.filter_indexed(&self.state.search);
                            ui::list_row_at(pos.x as f32, pos.y as f32, visible.len())
                                .map(|row| (row, visible[row].0))
                        });
                        let over_panel = self
                            .cursor_pos
                            .is_some_and(|pos| (pos.x as f32) < ui::PANEL_WIDTH);

                        if let Some((row, catalog_index)) = hit {
                            self.state.cursor = row;
                            self.select_and_load(catalog_index);
                        } else if !over_panel {
                            self.mouse_pressed_left = true;
                        }
                    } else {
                        self.mouse_pressed_left = false;
                        self.last_mouse_pos = None;
                    }
                }
                MouseButton::Right => {
                    self.mouse_pressed_right = btn_state == ElementState::Pressed;
                    if !self.mouse_pressed_right {
                        self.last_mouse_pos = None;
                    }
                }
                _ => {}
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_pos = Some(position);
                if let Some(camera) = self.camera.as_mut() {
                    if let Some(last_pos) = self.last_mouse_pos {
                        let delta_x = position.x - last_pos.x;
                        let delta_y = position.y - last_pos.y;

                        if self.mouse_pressed_left {
                            camera.rotate(delta_x as f32, delta_y as f32);
                        } else if self.mouse_pressed_right {
                            camera.pan(delta_x as f32, delta_y as f32);
                        }
                    }
                    if self.mouse_pressed_left || self.mouse_pressed_right {
                        self.last_mouse_pos = Some(position);
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(camera) = self.camera.as_mut() {
                    let scroll_delta = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y,
                        MouseScrollDelta::PixelDelta(pos) => (pos.y / 100.0) as f32,
                    };
                    camera.zoom(scroll_delta);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = now.duration_since(self.last_frame).as_secs_f32();
                self.last_frame = now;

                if let (Some(window), Some(gpu), Some(camera), Some(scene_renderer)) = (
                    self.window.as_ref(),
                    self.gpu.as_mut(),
                    self.camera.as_mut(),
                    self.scene_renderer.as_mut(),
                ) {
                    // Damped orbit motion, then draw
                    camera.update(dt);
                    scene_renderer.update_uniforms(
                        &gpu.queue,
                        &camera.view_projection_matrix(),
                        &camera.position(),
                    );

                    if self.state.show_ui
                        && let Some(ui_renderer) = self.ui_renderer.as_mut()
                    {
                        ui_renderer.queue_text(
                            &gpu.device,
                            &gpu.queue,
                            &self.state,
                            &self.catalog,
                            &self.dir_label,
                        );
                    }

                    let clear_color = if self.state.light_background {
                        LIGHT_BACKGROUND
                    } else {
                        DARK_BACKGROUND
                    };

                    match gpu.surface.get_current_texture() {
                        Ok(output) => {
                            let view = output
                                .texture
                                .create_view(&wgpu::TextureViewDescriptor::default());

                            let mut encoder =
                                gpu.device
                                    .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                                        label: Some("Render Encoder"),
                                    });

                            scene_renderer.render(
                                &mut encoder,
                                &view,
                                clear_color,
                                self.state.show_wireframe,
                                self.state.show_grid,
                            );

                            if self.state.show_ui
                                && let Some(ui_renderer) = self.ui_renderer.as_mut()
                            {
                                ui_renderer.render(&mut encoder, &view);
                            }

                            gpu.queue.submit(std::iter::once(encoder.finish()));

                            // Capture before present so the frame is still readable
                            if let Some(path) = self.pending_screenshot.take() {
                                match gpu.screenshot_from_texture(&output.texture, &path) {
                                    Ok(_) => println!("Screenshot saved to {}", path),
                                    Err(e) => log::error!("failed to save screenshot: {}", e),
                                }
                            }

                            output.present();
                        }
                        Err(e) => {
                            log::error!("failed to get surface texture: {:?}", e);
                        }
                    }

                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Scan a directory and run the viewer over its catalog
pub fn run(dir: &Path, initial_model: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::scan(dir)?;
    if catalog.is_empty() {
        println!("No models found in {:?} (looking for .glb/.gltf)", dir);
    }

    let mut app = ViewerApp::new(
        catalog,
        dir.display().to_string(),
        initial_model.map(String::from),
    );

    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
