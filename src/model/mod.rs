mod material;
mod mesh;
mod node;

pub use material::*;
pub use mesh::*;
pub use node::*;

use crate::animation::Clip;

/// A loaded model: mesh geometry, the node hierarchy it hangs off,
/// skinning data, materials with their decoded images, and animation clips.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub nodes: Vec<Node>,
    pub skins: Vec<Skin>,
    pub materials: Vec<Material>,
    pub images: Vec<TextureImage>,
    pub clips: Vec<Clip>,
}

impl Model {
    pub fn vertex_count(&self) -> usize {
        self.meshes
            .iter()
            .flat_map(|mesh| &mesh.primitives)
            .map(|prim| prim.positions.len())
            .sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes
            .iter()
            .flat_map(|mesh| &mesh.primitives)
            .map(|prim| prim.indices.len() / 3)
            .sum()
    }

    pub fn clip_names(&self) -> impl Iterator<Item = &str> {
        self.clips.iter().map(|clip| clip.name.as_str())
    }
}
