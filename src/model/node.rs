use nalgebra_glm as glm;

/// One node of the model hierarchy with its rest-pose local transform.
/// `parent` is an index into `Model::nodes`; roots have none.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub translation: glm::Vec3,
    pub rotation: glm::Quat,
    pub scale: glm::Vec3,
}

impl Node {
    pub fn local_matrix(&self) -> glm::Mat4 {
        glm::translation(&self.translation)
            * glm::quat_to_mat4(&self.rotation)
            * glm::scaling(&self.scale)
    }
}

impl Default for Node {
    fn default() -> Self {
        Self {
            name: String::new(),
            parent: None,
            children: Vec::new(),
            translation: glm::vec3(0.0, 0.0, 0.0),
            rotation: glm::Quat::identity(),
            scale: glm::vec3(1.0, 1.0, 1.0),
        }
    }
}

/// Skinning data: joint node indices and the matrices that bring vertices
/// from model space into each joint's local space.
#[derive(Debug, Clone, Default)]
pub struct Skin {
    pub joints: Vec<usize>,
    pub inverse_bind_matrices: Vec<glm::Mat4>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_local_matrix_is_identity_for_default_node() {
        let node = Node::default();
        let m = node.local_matrix();
        let id = glm::Mat4::identity();
        for i in 0..16 {
            assert!((m.as_slice()[i] - id.as_slice()[i]).abs() < 1e-6);
        }
    }

    #[test]
    fn local_matrix_applies_translation() {
        let node = Node {
            translation: glm::vec3(1.0, 2.0, 3.0),
            ..Node::default()
        };
        let p = node.local_matrix() * glm::vec4(0.0, 0.0, 0.0, 1.0);
        assert!((p.x - 1.0).abs() < 1e-6);
        assert!((p.y - 2.0).abs() < 1e-6);
        assert!((p.z - 3.0).abs() < 1e-6);
    }
}
