// Background asset loading. Models and clips are fetched and decoded on
// runtime tasks; results come back over a channel polled once per frame.

mod convert;

pub use convert::convert_document;

use std::path::Path;
use std::sync::mpsc::Sender;

use log::info;

use crate::error::ViewerResult;
use crate::model::Model;
use crate::video::{self, ClipFrames};

pub enum LoadResult {
    Model {
        source: String,
        model: Box<Model>,
    },
    ModelError {
        source: String,
        error: String,
    },
    Clip {
        source: String,
        frames: ClipFrames,
    },
    ClipError {
        source: String,
        error: String,
    },
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

async fn fetch_bytes(source: &str) -> ViewerResult<Vec<u8>> {
    if is_url(source) {
        let response = reqwest::get(source).await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    } else {
        Ok(tokio::fs::read(source).await?)
    }
}

fn model_name(source: &str) -> String {
    Path::new(source)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string())
}

async fn load_model(source: &str) -> ViewerResult<Model> {
    let name = model_name(source);
    if is_url(source) {
        // Remote models must be self-contained (GLB or embedded buffers).
        let bytes = fetch_bytes(source).await?;
        let (document, buffers, images) = gltf::import_slice(&bytes)?;
        Ok(convert_document(&document, &buffers, &images, name))
    } else {
        let (document, buffers, images) = gltf::import(source)?;
        Ok(convert_document(&document, &buffers, &images, name))
    }
}

pub fn start_model_load(rt: &tokio::runtime::Handle, sender: Sender<LoadResult>, source: String) {
    info!("Loading model: {}", source);
    rt.spawn(async move {
        let result = match load_model(&source).await {
            Ok(model) => LoadResult::Model {
                source,
                model: Box::new(model),
            },
            Err(e) => LoadResult::ModelError {
                source,
                error: e.to_string(),
            },
        };
        let _ = sender.send(result);
    });
}

pub fn start_clip_load(rt: &tokio::runtime::Handle, sender: Sender<LoadResult>, source: String) {
    info!("Loading clip: {}", source);
    rt.spawn(async move {
        let result = match fetch_bytes(&source).await {
            Ok(bytes) => match video::decode_clip(&bytes) {
                Ok(frames) => LoadResult::Clip { source, frames },
                Err(e) => LoadResult::ClipError {
                    source,
                    error: e.to_string(),
                },
            },
            Err(e) => LoadResult::ClipError {
                source,
                error: e.to_string(),
            },
        };
        let _ = sender.send(result);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_sources_are_recognized() {
        assert!(is_url("https://example.com/model.glb"));
        assert!(is_url("http://example.com/model.glb"));
        assert!(!is_url("assets/Model.glb"));
        assert!(!is_url("/tmp/model.glb"));
    }

    #[test]
    fn model_name_uses_the_file_stem() {
        assert_eq!(model_name("assets/Model.glb"), "Model");
        assert_eq!(model_name("https://example.com/robot.glb"), "robot");
    }
}
