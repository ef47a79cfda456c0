use crate::animation::Mixer;
use crate::error::ViewerResult;
use crate::loader::{self, LoadResult};
use crate::model::Model;
use crate::renderer::Renderer;
use crate::renderer::camera::CameraController;
use crate::settings::Settings;
use crate::ui::{Ui, UiActions};
use crate::video::ClipPlayer;
use egui_wgpu::ScreenDescriptor;
use egui_winit::State;
use log::{error, info};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::time::Instant;
use winit::window::Window;

pub struct EventResponse {
    pub repaint: bool,
    pub exit: bool,
}

pub struct App {
    pub window: Arc<Window>,
    rt: tokio::runtime::Handle,
    renderer: Renderer,
    camera_controller: CameraController,
    ui: Ui,
    settings: Settings,
    model: Option<Model>,
    mixer: Option<Mixer>,
    player: Option<ClipPlayer>,
    egui_state: State,
    egui_wants_pointer: bool,
    sender: Sender<LoadResult>,
    receiver: Receiver<LoadResult>,
    last_frame: Instant,
}

impl App {
    pub async fn new(
        window: Arc<Window>,
        rt: tokio::runtime::Handle,
        model_source: String,
        clip_source: String,
    ) -> ViewerResult<Self> {
        let renderer = Renderer::new(window.clone()).await?;

        // Initialize egui_winit state
        let egui_ctx = renderer.egui_context();

        // Enable egui persistence for collapsing headers, windows, etc.
        egui_ctx.options_mut(|options| {
            options.max_passes = std::num::NonZero::new(2).unwrap();
        });

        let egui_state = State::new(
            egui_ctx.clone(),
            egui::viewport::ViewportId::ROOT,
            &*window,
            None,
            None,
            None,
        );

        let settings = Settings::load();

        let (sender, receiver) = std::sync::mpsc::channel();
        loader::start_model_load(&rt, sender.clone(), model_source);
        loader::start_clip_load(&rt, sender.clone(), clip_source);

        Ok(Self {
            window,
            rt,
            renderer,
            camera_controller: CameraController::default(),
            ui: Ui::new(),
            settings,
            model: None,
            mixer: None,
            player: None,
            egui_state,
            egui_wants_pointer: false,
            sender,
            receiver,
            last_frame: Instant::now(),
        })
    }

    pub fn handle_event(&mut self, event: &winit::event::WindowEvent) -> EventResponse {
        // Let egui handle the event first
        let egui_response = self.egui_state.on_window_event(&self.window, event);
        let egui_wants_input = egui_response.consumed;

        match event {
            winit::event::WindowEvent::CloseRequested => {
                return EventResponse {
                    repaint: false,
                    exit: true,
                };
            }
            winit::event::WindowEvent::KeyboardInput { event, .. } => {
                if egui_wants_input {
                    return EventResponse {
                        repaint: egui_response.repaint,
                        exit: false,
                    };
                }

                if event.logical_key
                    == winit::keyboard::Key::Named(winit::keyboard::NamedKey::Escape)
                {
                    // Escape closes the clip overlay first, then the app
                    if self.ui.controls.is_overlay_open() {
                        if let Some(mixer) = &mut self.mixer {
                            self.ui.controls.stop(mixer, &mut self.player);
                        }
                        return EventResponse {
                            repaint: true,
                            exit: false,
                        };
                    }
                    return EventResponse {
                        repaint: false,
                        exit: true,
                    };
                }

                // Navigation keys only act on a loaded scene
                if event.state == winit::event::ElementState::Pressed && self.model.is_some() {
                    if let winit::keyboard::PhysicalKey::Code(code) = event.physical_key {
                        if self.camera_controller.on_key(code) {
                            return EventResponse {
                                repaint: true,
                                exit: false,
                            };
                        }
                    }
                }
            }
            winit::event::WindowEvent::Resized(size) => {
                self.renderer.resize(*size);
            }
            winit::event::WindowEvent::MouseInput { state, button, .. } => {
                // Don't handle mouse input if egui wants the pointer
                if self.egui_wants_pointer {
                    return EventResponse {
                        repaint: egui_response.repaint,
                        exit: false,
                    };
                }
                let is_pressed = *state == winit::event::ElementState::Pressed;
                self.camera_controller.on_mouse_button(*button, is_pressed);
            }
            winit::event::WindowEvent::CursorMoved { position, .. } => {
                if self.egui_wants_pointer {
                    return EventResponse {
                        repaint: egui_response.repaint,
                        exit: false,
                    };
                }
                self.camera_controller
                    .on_mouse_move((position.x, position.y));
            }
            winit::event::WindowEvent::MouseWheel { delta, .. } => {
                if self.egui_wants_pointer {
                    return EventResponse {
                        repaint: egui_response.repaint,
                        exit: false,
                    };
                }
                let scroll_delta = match delta {
                    winit::event::MouseScrollDelta::LineDelta(_, y) => *y,
                    winit::event::MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                self.camera_controller.zoom(scroll_delta);
            }
            _ => {}
        }

        EventResponse {
            repaint: false,
            exit: false,
        }
    }

    /// Drains finished background loads into the live scene.
    fn poll_loads(&mut self, now: Instant) {
        while let Ok(result) = self.receiver.try_recv() {
            match result {
                LoadResult::Model { source, model } => {
                    info!(
                        "Loaded model '{}' from {} ({} clips)",
                        model.name,
                        source,
                        model.clips.len()
                    );
                    let mixer = Mixer::from_model(&model);
                    self.renderer.update_model(&model, &mixer);
                    self.model = Some(*model);
                    self.mixer = Some(mixer);

                    // A replaced model starts over: overlay closed, clip rewound
                    self.ui.controls = Default::default();
                    if let Some(player) = &mut self.player {
                        player.pause();
                        player.rewind();
                    }

                    self.ui.loading.finish(now);
                }
                LoadResult::ModelError { source, error } => {
                    error!("Failed to load model from {source}: {error}");
                }
                LoadResult::Clip { source, frames } => {
                    info!(
                        "Loaded clip from {} ({} frames, {:.1}s)",
                        source,
                        frames.frames.len(),
                        frames.duration
                    );
                    self.player = Some(ClipPlayer::new(frames));
                }
                LoadResult::ClipError { source, error } => {
                    error!("Failed to load clip from {source}: {error}");
                }
            }
        }
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.poll_loads(now);

        self.camera_controller.update();
        if let Some(mixer) = &mut self.mixer {
            mixer.update(dt);
            self.renderer.update_pose(mixer);
        }
        self.ui.update(now, dt, &mut self.mixer, &mut self.player);

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let egui_ctx = self.renderer.egui_context();

        let mut actions = UiActions::default();
        let full_output = egui_ctx.run(raw_input, |ctx| {
            actions = self.ui.show(
                ctx,
                now,
                self.model.as_ref(),
                &mut self.mixer,
                &mut self.player,
                &mut self.settings,
            );
        });

        // Update egui pointer state for next frame
        self.egui_wants_pointer = egui_ctx.wants_pointer_input();

        if actions.open_model {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("glTF Model", &["glb", "gltf"])
                .pick_file()
            {
                if let Some(path_str) = path.to_str() {
                    self.ui.loading.arm();
                    loader::start_model_load(&self.rt, self.sender.clone(), path_str.to_string());
                }
            }
        }

        if actions.reset_camera {
            self.camera_controller.reset();
        }

        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = ScreenDescriptor {
            size_in_pixels: [
                self.window.inner_size().width,
                self.window.inner_size().height,
            ],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        self.renderer.render(
            self.camera_controller.state(),
            &self.settings.display,
            paint_jobs,
            full_output.textures_delta,
            screen_descriptor,
        )
    }
}
