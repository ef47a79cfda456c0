use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

mod animation;
mod app;
mod error;
mod loader;
mod model;
mod renderer;
mod settings;
mod timer;
mod ui;
mod video;

pub const CONFY_APP_NAME: &str = "rigvis-rs";

const DEFAULT_MODEL: &str = "assets/Model.glb";
const DEFAULT_CLIP: &str = "assets/ModelAnimation.gif";

struct AppHandler {
    app: Option<app::App>,
    model_source: String,
    clip_source: String,
    rt: tokio::runtime::Runtime,
}

impl ApplicationHandler for AppHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_none() {
            let window_attrs = Window::default_attributes()
                .with_title("RigVis-RS - Animated Model Viewer")
                .with_inner_size(winit::dpi::LogicalSize::new(1200.0, 800.0));

            let window = match event_loop.create_window(window_attrs) {
                Ok(window) => Arc::new(window),
                Err(e) => {
                    log::error!("Failed to create window: {e}");
                    event_loop.exit();
                    return;
                }
            };

            let app = self.rt.block_on(app::App::new(
                window,
                self.rt.handle().clone(),
                self.model_source.clone(),
                self.clip_source.clone(),
            ));

            match app {
                Ok(app) => self.app = Some(app),
                Err(e) => {
                    log::error!("Failed to initialize the viewer: {e}");
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(app) = &mut self.app {
            let response = app.handle_event(&event);
            if response.repaint {
                app.window.request_redraw();
            }
            if response.exit {
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(app) = &mut self.app {
            if let Err(e) = app.render() {
                log::error!("Render error: {e:?}");
            }
            app.window.request_redraw();
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let model_source = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let clip_source = args
        .get(2)
        .cloned()
        .unwrap_or_else(|| DEFAULT_CLIP.to_string());

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut handler = AppHandler {
        app: None,
        model_source,
        clip_source,
        rt: tokio::runtime::Runtime::new()?,
    };

    event_loop.run_app(&mut handler)?;

    Ok(())
}
