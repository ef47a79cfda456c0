/// Where one mesh primitive lives inside the shared vertex and index buffers.
#[derive(Debug, Clone)]
pub struct MeshDrawInfo {
    pub vertex_start: u32,
    pub vertex_count: u32,
    pub index_start: u32,
    pub index_count: u32,
    /// Mesh index in the model.
    pub mesh: usize,
    /// Primitive index within that mesh.
    pub primitive: usize,
    pub material: Option<usize>,
}
