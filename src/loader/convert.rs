// glTF document to Model conversion. Parsing is the gltf crate's job; this
// pulls the attributes, hierarchy, skins, and clips into the viewer's types.

use nalgebra_glm as glm;

use gltf::image::Format;
use log::{debug, warn};

use crate::animation::{Channel, ChannelOutputs, Clip, Interpolation};
use crate::model::{Material, Mesh, Model, Node, Primitive, Skin, TextureImage};

pub fn convert_document(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
    name: String,
) -> Model {
    let nodes = convert_nodes(document);
    let meshes = convert_meshes(document, buffers);
    let skins = convert_skins(document, buffers);
    let materials = convert_materials(document);
    let images = images.iter().map(convert_image).collect();
    let clips = convert_clips(document, buffers);

    Model {
        name,
        meshes,
        nodes,
        skins,
        materials,
        images,
        clips,
    }
}

fn convert_nodes(document: &gltf::Document) -> Vec<Node> {
    let mut nodes: Vec<Node> = document
        .nodes()
        .map(|node| {
            let (translation, rotation, scale) = node.transform().decomposed();
            Node {
                name: node.name().unwrap_or_default().to_string(),
                parent: None,
                children: node.children().map(|child| child.index()).collect(),
                translation: glm::vec3(translation[0], translation[1], translation[2]),
                // glTF stores quaternions as x, y, z, w.
                rotation: glm::Quat::new(rotation[3], rotation[0], rotation[1], rotation[2]),
                scale: glm::vec3(scale[0], scale[1], scale[2]),
            }
        })
        .collect();

    for index in 0..nodes.len() {
        let children = nodes[index].children.clone();
        for child in children {
            if let Some(node) = nodes.get_mut(child) {
                node.parent = Some(index);
            }
        }
    }

    nodes
}

/// Node indices reachable from the displayed scene. Assets can carry nodes
/// outside every scene; their meshes are not drawn.
fn scene_nodes(document: &gltf::Document) -> Vec<bool> {
    let mut reachable = vec![false; document.nodes().len()];
    let scene = document.default_scene().or_else(|| document.scenes().next());
    let Some(scene) = scene else {
        // No scene at all: show everything.
        reachable.iter_mut().for_each(|r| *r = true);
        return reachable;
    };

    let mut stack: Vec<gltf::Node> = scene.nodes().collect();
    while let Some(node) = stack.pop() {
        reachable[node.index()] = true;
        stack.extend(node.children());
    }
    reachable
}

fn convert_meshes(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Vec<Mesh> {
    let reachable = scene_nodes(document);
    let mut meshes = Vec::new();

    for node in document.nodes() {
        let Some(mesh) = node.mesh() else { continue };
        if !reachable[node.index()] {
            continue;
        }

        let primitives = mesh
            .primitives()
            .filter_map(|primitive| convert_primitive(&primitive, buffers))
            .collect::<Vec<_>>();
        if primitives.is_empty() {
            continue;
        }

        meshes.push(Mesh {
            name: mesh.name().unwrap_or_default().to_string(),
            node: node.index(),
            skin: node.skin().map(|skin| skin.index()),
            primitives,
        });
    }

    meshes
}

fn convert_primitive(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
) -> Option<Primitive> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        warn!("Skipping non-triangle primitive (mode {:?})", primitive.mode());
        return None;
    }

    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    let normals: Vec<[f32; 3]> = match reader.read_normals() {
        Some(normals) => normals.collect(),
        None => vec![[0.0, 0.0, 1.0]; positions.len()],
    };
    let uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
        Some(coords) => coords.into_f32().collect(),
        None => vec![[0.0, 0.0]; positions.len()],
    };
    let joints: Vec<[u16; 4]> = reader
        .read_joints(0)
        .map(|joints| joints.into_u16().collect())
        .unwrap_or_default();
    let weights: Vec<[f32; 4]> = reader
        .read_weights(0)
        .map(|weights| weights.into_f32().collect())
        .unwrap_or_default();
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    Some(Primitive {
        positions,
        normals,
        uvs,
        joints,
        weights,
        indices,
        material: primitive.material().index(),
    })
}

fn convert_skins(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Vec<Skin> {
    document
        .skins()
        .map(|skin| {
            let joints: Vec<usize> = skin.joints().map(|joint| joint.index()).collect();
            let reader = skin.reader(|buffer| Some(&buffers[buffer.index()]));
            let inverse_bind_matrices = match reader.read_inverse_bind_matrices() {
                Some(matrices) => matrices.map(|m| mat4_from_columns(&m)).collect(),
                // Identity bind matrices are allowed by the format.
                None => vec![glm::Mat4::identity(); joints.len()],
            };
            Skin {
                joints,
                inverse_bind_matrices,
            }
        })
        .collect()
}

fn mat4_from_columns(columns: &[[f32; 4]; 4]) -> glm::Mat4 {
    let flat: Vec<f32> = columns.iter().flatten().copied().collect();
    glm::Mat4::from_column_slice(&flat)
}

fn convert_materials(document: &gltf::Document) -> Vec<Material> {
    document
        .materials()
        .map(|material| {
            let pbr = material.pbr_metallic_roughness();
            Material {
                name: material.name().unwrap_or_default().to_string(),
                base_color: pbr.base_color_factor(),
                base_color_image: pbr
                    .base_color_texture()
                    .map(|info| info.texture().source().index()),
                alpha_blend: material.alpha_mode() == gltf::material::AlphaMode::Blend,
                double_sided: material.double_sided(),
            }
        })
        .collect()
}

fn convert_image(data: &gltf::image::Data) -> TextureImage {
    TextureImage {
        width: data.width,
        height: data.height,
        rgba: rgba8_pixels(data.format, &data.pixels),
    }
}

/// Normalize any decoded pixel format to RGBA8.
fn rgba8_pixels(format: Format, pixels: &[u8]) -> Vec<u8> {
    match format {
        Format::R8G8B8A8 => pixels.to_vec(),
        Format::R8G8B8 => pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R8 => pixels.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        Format::R8G8 => pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        // 16-bit channels, little endian: keep the high byte.
        Format::R16 => pixels
            .chunks_exact(2)
            .flat_map(|p| [p[1], p[1], p[1], 255])
            .collect(),
        Format::R16G16 => pixels
            .chunks_exact(4)
            .flat_map(|p| [p[1], p[3], 0, 255])
            .collect(),
        Format::R16G16B16 => pixels
            .chunks_exact(6)
            .flat_map(|p| [p[1], p[3], p[5], 255])
            .collect(),
        Format::R16G16B16A16 => pixels
            .chunks_exact(8)
            .flat_map(|p| [p[1], p[3], p[5], p[7]])
            .collect(),
        Format::R32G32B32FLOAT => pixels
            .chunks_exact(12)
            .flat_map(|p| {
                let c = |b: &[u8]| {
                    let v = f32::from_le_bytes([b[0], b[1], b[2], b[3]]);
                    (v.clamp(0.0, 1.0) * 255.0) as u8
                };
                [c(&p[0..4]), c(&p[4..8]), c(&p[8..12]), 255]
            })
            .collect(),
        Format::R32G32B32A32FLOAT => pixels
            .chunks_exact(16)
            .flat_map(|p| {
                let c = |b: &[u8]| {
                    let v = f32::from_le_bytes([b[0], b[1], b[2], b[3]]);
                    (v.clamp(0.0, 1.0) * 255.0) as u8
                };
                [c(&p[0..4]), c(&p[4..8]), c(&p[8..12]), c(&p[12..16])]
            })
            .collect(),
    }
}

fn clip_name(name: Option<&str>, index: usize) -> String {
    match name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("Animation {}", index),
    }
}

fn convert_clips(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Vec<Clip> {
    document
        .animations()
        .enumerate()
        .map(|(index, animation)| {
            let mut channels = Vec::new();
            let mut duration = 0.0f32;

            for channel in animation.channels() {
                let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));
                let Some(inputs) = reader.read_inputs() else {
                    continue;
                };
                let times: Vec<f32> = inputs.collect();
                if times.is_empty() {
                    continue;
                }

                let outputs = match reader.read_outputs() {
                    Some(gltf::animation::util::ReadOutputs::Translations(values)) => {
                        ChannelOutputs::Translations(
                            values.map(|v| glm::vec3(v[0], v[1], v[2])).collect(),
                        )
                    }
                    Some(gltf::animation::util::ReadOutputs::Rotations(values)) => {
                        ChannelOutputs::Rotations(
                            values
                                .into_f32()
                                .map(|r| glm::Quat::new(r[3], r[0], r[1], r[2]))
                                .collect(),
                        )
                    }
                    Some(gltf::animation::util::ReadOutputs::Scales(values)) => {
                        ChannelOutputs::Scales(
                            values.map(|v| glm::vec3(v[0], v[1], v[2])).collect(),
                        )
                    }
                    Some(gltf::animation::util::ReadOutputs::MorphTargetWeights(_)) => {
                        debug!("Skipping morph target channel");
                        continue;
                    }
                    None => continue,
                };

                if let Some(&last) = times.last() {
                    duration = duration.max(last);
                }
                channels.push(Channel {
                    node: channel.target().node().index(),
                    interpolation: match channel.sampler().interpolation() {
                        gltf::animation::Interpolation::Linear => Interpolation::Linear,
                        gltf::animation::Interpolation::Step => Interpolation::Step,
                        gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
                    },
                    times,
                    outputs,
                });
            }

            Clip {
                name: clip_name(animation.name(), index),
                duration,
                channels,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_pixels_gain_an_opaque_alpha() {
        let rgba = rgba8_pixels(Format::R8G8B8, &[10, 20, 30, 40, 50, 60]);
        assert_eq!(rgba, vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }

    #[test]
    fn gray_pixels_replicate_into_rgb() {
        let rgba = rgba8_pixels(Format::R8, &[7, 9]);
        assert_eq!(rgba, vec![7, 7, 7, 255, 9, 9, 9, 255]);
    }

    #[test]
    fn rgba_pixels_pass_through() {
        let pixels = [1, 2, 3, 4, 5, 6, 7, 8];
        assert_eq!(rgba8_pixels(Format::R8G8B8A8, &pixels), pixels.to_vec());
    }

    #[test]
    fn unnamed_clips_get_indexed_names() {
        assert_eq!(clip_name(Some("Walk"), 3), "Walk");
        assert_eq!(clip_name(Some(""), 3), "Animation 3");
        assert_eq!(clip_name(None, 0), "Animation 0");
    }
}
