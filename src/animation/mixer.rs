// Runtime pose evaluation for the loaded clip set.

use nalgebra_glm as glm;

use crate::animation::{ActionState, AnimationAction, ChannelOutputs, Clip};
use crate::model::{Model, Node, Skin};

#[derive(Debug, Clone, Copy)]
struct LocalPose {
    translation: glm::Vec3,
    rotation: glm::Quat,
    scale: glm::Vec3,
}

impl LocalPose {
    fn from_node(node: &Node) -> Self {
        Self {
            translation: node.translation,
            rotation: node.rotation,
            scale: node.scale,
        }
    }

    fn matrix(&self) -> glm::Mat4 {
        glm::translation(&self.translation)
            * glm::quat_to_mat4(&glm::quat_normalize(&self.rotation))
            * glm::scaling(&self.scale)
    }
}

/// Owns one action per clip and produces per-node global transforms each
/// frame. The pose blends the rest pose toward the sampled clip values by
/// each running action's weight.
pub struct Mixer {
    nodes: Vec<Node>,
    clips: Vec<Clip>,
    actions: Vec<(String, ActionState)>,
    locals: Vec<LocalPose>,
    globals: Vec<glm::Mat4>,
}

impl Mixer {
    pub fn from_model(model: &Model) -> Self {
        let nodes = model.nodes.clone();
        let clips = model.clips.clone();
        let actions = clips
            .iter()
            .enumerate()
            .map(|(index, clip)| (clip.name.clone(), ActionState::new(index, clip.duration)))
            .collect();
        let locals = nodes.iter().map(LocalPose::from_node).collect();
        let globals = vec![glm::Mat4::identity(); nodes.len()];

        let mut mixer = Self {
            nodes,
            clips,
            actions,
            locals,
            globals,
        };
        mixer.recompute_globals();
        mixer
    }

    pub fn has_actions(&self) -> bool {
        !self.actions.is_empty()
    }

    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(|(name, _)| name.as_str())
    }

    pub fn first_action_name(&self) -> Option<&str> {
        self.actions.first().map(|(name, _)| name.as_str())
    }

    pub fn action_mut(&mut self, name: &str) -> Option<&mut dyn AnimationAction> {
        self.actions
            .iter_mut()
            .find(|(action_name, _)| action_name == name)
            .map(|(_, action)| action as &mut dyn AnimationAction)
    }

    pub fn first_action_mut(&mut self) -> Option<&mut dyn AnimationAction> {
        self.actions
            .first_mut()
            .map(|(_, action)| action as &mut dyn AnimationAction)
    }

    pub fn any_running(&self) -> bool {
        self.actions.iter().any(|(_, action)| action.is_running())
    }

    /// Advance running actions and rebuild the global transforms.
    pub fn update(&mut self, dt: f32) {
        for (_, action) in &mut self.actions {
            action.update(dt);
        }

        for (index, node) in self.nodes.iter().enumerate() {
            self.locals[index] = LocalPose::from_node(node);
        }

        for action_index in 0..self.actions.len() {
            let (clip_index, weight, time) = {
                let action = &self.actions[action_index].1;
                (action.clip, action.effective_weight(), action.time())
            };
            if weight <= 0.0 {
                continue;
            }

            let clip = &self.clips[clip_index];
            for channel in &clip.channels {
                if channel.node >= self.locals.len() {
                    continue;
                }
                match &channel.outputs {
                    ChannelOutputs::Translations(values) => {
                        let sampled = channel.sample_vec3(time, values);
                        let local = &mut self.locals[channel.node];
                        local.translation = glm::lerp(&local.translation, &sampled, weight);
                    }
                    ChannelOutputs::Rotations(values) => {
                        let sampled = channel.sample_quat(time, values);
                        let local = &mut self.locals[channel.node];
                        local.rotation = glm::quat_slerp(&local.rotation, &sampled, weight);
                    }
                    ChannelOutputs::Scales(values) => {
                        let sampled = channel.sample_vec3(time, values);
                        let local = &mut self.locals[channel.node];
                        local.scale = glm::lerp(&local.scale, &sampled, weight);
                    }
                }
            }
        }

        self.recompute_globals();
    }

    fn recompute_globals(&mut self) {
        let mut stack: Vec<(usize, glm::Mat4)> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(index, _)| (index, glm::Mat4::identity()))
            .collect();

        while let Some((index, parent_global)) = stack.pop() {
            let global = parent_global * self.locals[index].matrix();
            self.globals[index] = global;
            for &child in &self.nodes[index].children {
                stack.push((child, global));
            }
        }
    }

    pub fn node_global(&self, index: usize) -> glm::Mat4 {
        self.globals
            .get(index)
            .copied()
            .unwrap_or_else(glm::Mat4::identity)
    }

    /// Joint matrices for one skin: joint global x inverse bind.
    pub fn joint_matrices(&self, skin: &Skin) -> Vec<glm::Mat4> {
        skin.joints
            .iter()
            .zip(&skin.inverse_bind_matrices)
            .map(|(&joint, ibm)| self.node_global(joint) * ibm)
            .collect()
    }
}
