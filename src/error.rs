//! Error types for the viewer

use thiserror::Error;

/// Result type for viewer operations
pub type ViewerResult<T> = Result<T, ViewerError>;

/// Errors that can occur while loading assets or driving the window and GPU
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Model error: {0}")]
    Model(#[from] gltf::Error),

    #[error("Clip decode error: {0}")]
    Clip(#[from] image::ImageError),

    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("No suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("Device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("Frame error: {0}")]
    Frame(#[from] wgpu::SurfaceError),

    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("Unsupported model: {0}")]
    Unsupported(String),
}
