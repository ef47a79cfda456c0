use nalgebra_glm as glm;

/// Camera pose around a look-at target, stored as yaw/pitch/distance with
/// the eye position derived. Yaw 0 looks down -Z; pitch is elevation above
/// the horizon.
#[derive(Debug, Clone)]
pub struct CameraState {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub target: glm::Vec3,
    pub default_yaw: f32,
    pub default_pitch: f32,
    pub default_distance: f32,
    pub default_target: glm::Vec3,
}

impl CameraState {
    pub fn new(yaw: f32, pitch: f32, distance: f32, target: glm::Vec3) -> Self {
        Self {
            yaw,
            pitch,
            distance,
            target,
            default_yaw: yaw,
            default_pitch: pitch,
            default_distance: distance,
            default_target: target,
        }
    }

    /// Derive the spherical pose that puts the eye at `position` looking at
    /// `target`.
    pub fn from_pose(position: glm::Vec3, target: glm::Vec3) -> Self {
        let offset = position - target;
        let distance = glm::length(&offset);
        let pitch = (offset.y / distance).asin();
        let yaw = offset.x.atan2(offset.z);
        Self::new(yaw, pitch, distance, target)
    }

    pub fn eye(&self) -> glm::Vec3 {
        self.target + self.offset()
    }

    fn offset(&self) -> glm::Vec3 {
        glm::vec3(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        ) * self.distance
    }

    /// Unit vector from the eye toward the target.
    pub fn forward(&self) -> glm::Vec3 {
        glm::normalize(&-self.offset())
    }

    pub fn reset(&mut self) {
        self.yaw = self.default_yaw;
        self.pitch = self.default_pitch;
        self.distance = self.default_distance;
        self.target = self.default_target;
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::from_pose(glm::vec3(-62.0, 10.0, 45.0), glm::vec3(-62.0, 5.0, 25.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec3_eq(a: glm::Vec3, b: glm::Vec3, eps: f32) {
        assert!((a.x - b.x).abs() < eps, "x: {} vs {}", a.x, b.x);
        assert!((a.y - b.y).abs() < eps, "y: {} vs {}", a.y, b.y);
        assert!((a.z - b.z).abs() < eps, "z: {} vs {}", a.z, b.z);
    }

    #[test]
    fn default_pose_reproduces_the_startup_camera() {
        let state = CameraState::default();
        assert_vec3_eq(state.eye(), glm::vec3(-62.0, 10.0, 45.0), 1e-4);
        assert_vec3_eq(state.target, glm::vec3(-62.0, 5.0, 25.0), 1e-4);
    }

    #[test]
    fn reset_restores_the_initial_pose_exactly() {
        let mut state = CameraState::default();
        let initial_eye = state.eye();
        let initial_target = state.target;

        state.yaw += 1.3;
        state.pitch -= 0.4;
        state.distance *= 3.0;
        state.target += glm::vec3(10.0, -4.0, 7.0);
        state.reset();

        assert_vec3_eq(state.eye(), initial_eye, 1e-6);
        assert_vec3_eq(state.target, initial_target, 1e-6);
        assert!((state.yaw - state.default_yaw).abs() < 1e-9);
        assert!((state.pitch - state.default_pitch).abs() < 1e-9);
        assert!((state.distance - state.default_distance).abs() < 1e-9);
    }

    #[test]
    fn forward_points_from_eye_to_target() {
        let state = CameraState::default();
        let expected = glm::normalize(&(state.target - state.eye()));
        assert_vec3_eq(state.forward(), expected, 1e-6);
    }
}
