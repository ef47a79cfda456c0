use crate::model::Primitive;
use crate::renderer::vertex::Vertex;
use nalgebra_glm as glm;

/// Poses one primitive on the CPU. Skinned vertices blend their joint
/// matrices by weight, rigid vertices take the owning node's global
/// transform. Joint indices outside the palette count as identity so a
/// malformed influence never collapses the vertex.
pub fn pose_vertices(
    primitive: &Primitive,
    node_global: &glm::Mat4,
    joint_matrices: &[glm::Mat4],
) -> Vec<Vertex> {
    let skinned = primitive.is_skinned() && !joint_matrices.is_empty();
    let mut vertices = Vec::with_capacity(primitive.positions.len());

    for (i, position) in primitive.positions.iter().enumerate() {
        let matrix = if skinned {
            blend_matrix(
                primitive.joints.get(i).copied().unwrap_or_default(),
                primitive.weights.get(i).copied().unwrap_or_default(),
                joint_matrices,
            )
            .unwrap_or(*node_global)
        } else {
            *node_global
        };

        let normal = primitive
            .normals
            .get(i)
            .copied()
            .unwrap_or([0.0, 0.0, 1.0]);
        let uv = primitive.uvs.get(i).copied().unwrap_or([0.0, 0.0]);

        vertices.push(Vertex {
            position: transform_point(&matrix, position),
            normal: transform_direction(&matrix, &normal),
            uv,
        });
    }

    vertices
}

/// Weighted sum of joint matrices. Returns None when the weights carry
/// no influence, leaving the caller to fall back to the node transform.
fn blend_matrix(
    joints: [u16; 4],
    weights: [f32; 4],
    joint_matrices: &[glm::Mat4],
) -> Option<glm::Mat4> {
    let total: f32 = weights.iter().sum();
    if total < 1e-6 {
        return None;
    }

    let mut matrix = glm::Mat4::zeros();
    for (joint, weight) in joints.iter().zip(weights.iter()) {
        if *weight == 0.0 {
            continue;
        }
        match joint_matrices.get(*joint as usize) {
            Some(m) => matrix += m * *weight,
            None => matrix += glm::Mat4::identity() * *weight,
        }
    }
    Some(matrix)
}

fn transform_point(matrix: &glm::Mat4, point: &[f32; 3]) -> [f32; 3] {
    let p = matrix * glm::vec4(point[0], point[1], point[2], 1.0);
    [p.x, p.y, p.z]
}

fn transform_direction(matrix: &glm::Mat4, direction: &[f32; 3]) -> [f32; 3] {
    let d = matrix * glm::vec4(direction[0], direction[1], direction[2], 0.0);
    let v = glm::vec3(d.x, d.y, d.z);
    if glm::length(&v) < 1e-6 {
        return *direction;
    }
    let n = glm::normalize(&v);
    [n.x, n.y, n.z]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rigid_primitive() -> Primitive {
        Primitive {
            positions: vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0], [0.0, 0.0, 1.0]],
            uvs: vec![[0.0, 0.0], [1.0, 1.0]],
            joints: Vec::new(),
            weights: Vec::new(),
            indices: vec![0, 1],
            material: None,
        }
    }

    fn skinned_primitive(joints: [u16; 4], weights: [f32; 4]) -> Primitive {
        Primitive {
            positions: vec![[1.0, 0.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]],
            uvs: vec![[0.5, 0.5]],
            joints: vec![joints],
            weights: vec![weights],
            indices: vec![0],
            material: None,
        }
    }

    #[test]
    fn rigid_vertices_follow_the_node_transform() {
        let primitive = rigid_primitive();
        let global = glm::translation(&glm::vec3(0.0, 5.0, 0.0));
        let vertices = pose_vertices(&primitive, &global, &[]);

        assert_eq!(vertices.len(), 2);
        assert!((vertices[0].position[1] - 5.0).abs() < 1e-6);
        assert!((vertices[1].position[1] - 6.0).abs() < 1e-6);
        assert!((vertices[0].normal[2] - 1.0).abs() < 1e-6);
        assert_eq!(vertices[1].uv, [1.0, 1.0]);
    }

    #[test]
    fn fully_weighted_vertex_follows_its_joint() {
        let primitive = skinned_primitive([1, 0, 0, 0], [1.0, 0.0, 0.0, 0.0]);
        let joints = vec![
            glm::Mat4::identity(),
            glm::translation(&glm::vec3(0.0, 0.0, 3.0)),
        ];
        let vertices = pose_vertices(&primitive, &glm::Mat4::identity(), &joints);

        assert!((vertices[0].position[0] - 1.0).abs() < 1e-6);
        assert!((vertices[0].position[2] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn split_weights_blend_joint_matrices() {
        let primitive = skinned_primitive([0, 1, 0, 0], [0.5, 0.5, 0.0, 0.0]);
        let joints = vec![
            glm::Mat4::identity(),
            glm::translation(&glm::vec3(0.0, 4.0, 0.0)),
        ];
        let vertices = pose_vertices(&primitive, &glm::Mat4::identity(), &joints);

        assert!((vertices[0].position[1] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn zero_weights_fall_back_to_the_node_transform() {
        let primitive = skinned_primitive([0, 0, 0, 0], [0.0, 0.0, 0.0, 0.0]);
        let joints = vec![glm::translation(&glm::vec3(9.0, 9.0, 9.0))];
        let global = glm::translation(&glm::vec3(0.0, 1.0, 0.0));
        let vertices = pose_vertices(&primitive, &global, &joints);

        assert!((vertices[0].position[0] - 1.0).abs() < 1e-6);
        assert!((vertices[0].position[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_joints_count_as_identity() {
        let primitive = skinned_primitive([0, 7, 0, 0], [0.5, 0.5, 0.0, 0.0]);
        let joints = vec![glm::translation(&glm::vec3(0.0, 2.0, 0.0))];
        let vertices = pose_vertices(&primitive, &glm::Mat4::identity(), &joints);

        assert!((vertices[0].position[0] - 1.0).abs() < 1e-6);
        assert!((vertices[0].position[1] - 1.0).abs() < 1e-6);
    }
}
