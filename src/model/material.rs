/// Material parameters drawn from the asset. `base_color_image` indexes into
/// `Model::images`; primitives without one sample a white fallback texture.
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
    pub base_color_image: Option<usize>,
    pub alpha_blend: bool,
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            base_color: [1.0, 1.0, 1.0, 1.0],
            base_color_image: None,
            alpha_blend: false,
            double_sided: false,
        }
    }
}

/// A decoded image, always RGBA8.
#[derive(Debug, Clone)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}
