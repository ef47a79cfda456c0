/// One mesh attached to a node. Skinned meshes reference a skin whose joints
/// drive the vertices; rigid meshes follow their node's global transform.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub node: usize,
    pub skin: Option<usize>,
    pub primitives: Vec<Primitive>,
}

/// Geometry drawn with a single material. Attribute vectors are all the same
/// length; `joints`/`weights` are empty for unskinned primitives.
#[derive(Debug, Clone, Default)]
pub struct Primitive {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub joints: Vec<[u16; 4]>,
    pub weights: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
    pub material: Option<usize>,
}

impl Primitive {
    pub fn is_skinned(&self) -> bool {
        !self.joints.is_empty() && !self.weights.is_empty()
    }
}
