// Keyframe data for one animation clip.

use nalgebra_glm as glm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    Step,
    CubicSpline,
}

/// Keyframe values of one channel. For cubic-spline channels the vector holds
/// in-tangent, value, out-tangent triples per keyframe.
#[derive(Debug, Clone)]
pub enum ChannelOutputs {
    Translations(Vec<glm::Vec3>),
    Rotations(Vec<glm::Quat>),
    Scales(Vec<glm::Vec3>),
}

/// Animates one TRS property of one node. `times` is non-empty and ascending.
#[derive(Debug, Clone)]
pub struct Channel {
    pub node: usize,
    pub interpolation: Interpolation,
    pub times: Vec<f32>,
    pub outputs: ChannelOutputs,
}

#[derive(Debug, Clone, Default)]
pub struct Clip {
    pub name: String,
    pub duration: f32,
    pub channels: Vec<Channel>,
}

/// Surrounding keyframes and the normalized position between them.
/// Clamps outside the keyframe range.
fn keyframe_span(times: &[f32], time: f32) -> (usize, usize, f32) {
    if time <= times[0] {
        return (0, 0, 0.0);
    }
    let last = times.len() - 1;
    if time >= times[last] {
        return (last, last, 0.0);
    }

    let mut before = 0;
    for (i, &t) in times.iter().enumerate() {
        if t <= time {
            before = i;
        } else {
            break;
        }
    }
    let after = before + 1;
    let t = (time - times[before]) / (times[after] - times[before]);
    (before, after, t)
}

fn hermite_basis(t: f32) -> (f32, f32, f32, f32) {
    let t2 = t * t;
    let t3 = t2 * t;
    (
        2.0 * t3 - 3.0 * t2 + 1.0,
        -2.0 * t3 + 3.0 * t2,
        t3 - 2.0 * t2 + t,
        t3 - t2,
    )
}

impl Channel {
    pub fn sample_vec3(&self, time: f32, values: &[glm::Vec3]) -> glm::Vec3 {
        let (before, after, t) = keyframe_span(&self.times, time);
        match self.interpolation {
            Interpolation::Step => values[before],
            Interpolation::Linear => {
                if before == after {
                    values[before]
                } else {
                    glm::lerp(&values[before], &values[after], t)
                }
            }
            Interpolation::CubicSpline => {
                // Triples of (in-tangent, value, out-tangent) per keyframe.
                if before == after {
                    return values[before * 3 + 1];
                }
                let dt = self.times[after] - self.times[before];
                let p0 = values[before * 3 + 1];
                let m0 = values[before * 3 + 2] * dt;
                let p1 = values[after * 3 + 1];
                let m1 = values[after * 3] * dt;
                let (h1, h2, h3, h4) = hermite_basis(t);
                p0 * h1 + p1 * h2 + m0 * h3 + m1 * h4
            }
        }
    }

    pub fn sample_quat(&self, time: f32, values: &[glm::Quat]) -> glm::Quat {
        let (before, after, t) = keyframe_span(&self.times, time);
        match self.interpolation {
            Interpolation::Step => values[before],
            Interpolation::Linear => {
                if before == after {
                    values[before]
                } else {
                    glm::quat_slerp(&values[before], &values[after], t)
                }
            }
            Interpolation::CubicSpline => {
                if before == after {
                    return values[before * 3 + 1];
                }
                let dt = self.times[after] - self.times[before];
                let (h1, h2, h3, h4) = hermite_basis(t);
                let p0 = values[before * 3 + 1];
                let m0 = values[before * 3 + 2];
                let p1 = values[after * 3 + 1];
                let m1 = values[after * 3];
                let mut q = glm::Quat::identity();
                q.coords = p0.coords * h1 + p1.coords * h2 + m0.coords * (h3 * dt) + m1.coords * (h4 * dt);
                glm::quat_normalize(&q)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translation_channel(interpolation: Interpolation, times: Vec<f32>, values: Vec<glm::Vec3>) -> Channel {
        Channel {
            node: 0,
            interpolation,
            times,
            outputs: ChannelOutputs::Translations(values),
        }
    }

    #[test]
    fn linear_interpolates_between_keyframes() {
        let values = vec![glm::vec3(0.0, 0.0, 0.0), glm::vec3(2.0, 4.0, 6.0)];
        let channel = translation_channel(Interpolation::Linear, vec![0.0, 1.0], values.clone());
        let v = channel.sample_vec3(0.5, &values);
        assert!((v.x - 1.0).abs() < 1e-6);
        assert!((v.y - 2.0).abs() < 1e-6);
        assert!((v.z - 3.0).abs() < 1e-6);
    }

    #[test]
    fn sampling_clamps_outside_the_keyframe_range() {
        let values = vec![glm::vec3(1.0, 0.0, 0.0), glm::vec3(5.0, 0.0, 0.0)];
        let channel = translation_channel(Interpolation::Linear, vec![1.0, 2.0], values.clone());
        assert!((channel.sample_vec3(0.0, &values).x - 1.0).abs() < 1e-6);
        assert!((channel.sample_vec3(9.0, &values).x - 5.0).abs() < 1e-6);
    }

    #[test]
    fn step_holds_the_previous_keyframe() {
        let values = vec![glm::vec3(1.0, 0.0, 0.0), glm::vec3(5.0, 0.0, 0.0)];
        let channel = translation_channel(Interpolation::Step, vec![0.0, 1.0], values.clone());
        assert!((channel.sample_vec3(0.99, &values).x - 1.0).abs() < 1e-6);
        assert!((channel.sample_vec3(1.0, &values).x - 5.0).abs() < 1e-6);
    }

    #[test]
    fn rotation_midpoint_is_half_the_turn() {
        let from = glm::Quat::identity();
        let half_turn = std::f32::consts::FRAC_PI_2;
        let to = glm::Quat::new((half_turn / 2.0).cos(), 0.0, 0.0, (half_turn / 2.0).sin());
        let values = vec![from, to];
        let channel = Channel {
            node: 0,
            interpolation: Interpolation::Linear,
            times: vec![0.0, 1.0],
            outputs: ChannelOutputs::Rotations(values.clone()),
        };
        let q = channel.sample_quat(0.5, &values);
        let quarter = half_turn / 2.0;
        assert!((q.w - (quarter / 2.0).cos()).abs() < 1e-5);
        assert!((q.k - (quarter / 2.0).sin()).abs() < 1e-5);
    }

    #[test]
    fn cubic_spline_with_zero_tangents_matches_hermite_midpoint() {
        // Triples: in-tangent, value, out-tangent.
        let zero = glm::vec3(0.0, 0.0, 0.0);
        let values = vec![
            zero,
            glm::vec3(0.0, 0.0, 0.0),
            zero,
            zero,
            glm::vec3(4.0, 0.0, 0.0),
            zero,
        ];
        let channel = translation_channel(Interpolation::CubicSpline, vec![0.0, 1.0], values.clone());
        let v = channel.sample_vec3(0.5, &values);
        assert!((v.x - 2.0).abs() < 1e-6);
    }
}
