pub mod camera;
mod draw_info;
mod render;
mod renderer;
mod skinning;
mod vertex;

pub use renderer::Renderer;
