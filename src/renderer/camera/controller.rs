use nalgebra_glm as glm;
use winit::keyboard::KeyCode;

use super::CameraState;

const ROTATE_SPEED: f32 = 0.01;
const DAMPING: f32 = 0.05;
const MIN_DISTANCE: f32 = 5.0;
const MAX_DISTANCE: f32 = 200.0;
// Polar angle capped at 2/3 pi from the pole, with a small guard below the
// pole itself so the view vector never collapses onto the up axis.
const MIN_PITCH: f32 = -(std::f32::consts::PI / 6.0);
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
const MOVE_STEP: f32 = 5.0;

fn world_up() -> glm::Vec3 {
    glm::vec3(0.0, 1.0, 0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Maps pointer and key input onto the camera pose. Rotation and pan are
/// damped: input accumulates into pending deltas that `update` bleeds into
/// the pose a fraction per frame.
pub struct CameraController {
    state: CameraState,
    left_mouse_pressed: bool,
    right_mouse_pressed: bool,
    middle_mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_pan: glm::Vec3,
}

impl CameraController {
    pub fn new(state: CameraState) -> Self {
        Self {
            state,
            left_mouse_pressed: false,
            right_mouse_pressed: false,
            middle_mouse_pressed: false,
            last_mouse_pos: None,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_pan: glm::vec3(0.0, 0.0, 0.0),
        }
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    /// Handle mouse button press/release
    pub fn on_mouse_button(&mut self, button: winit::event::MouseButton, pressed: bool) {
        match button {
            winit::event::MouseButton::Left => {
                self.left_mouse_pressed = pressed;
                if !pressed {
                    self.last_mouse_pos = None;
                }
            }
            winit::event::MouseButton::Right => {
                self.right_mouse_pressed = pressed;
                if !pressed {
                    self.last_mouse_pos = None;
                }
            }
            winit::event::MouseButton::Middle => {
                self.middle_mouse_pressed = pressed;
                if !pressed {
                    self.last_mouse_pos = None;
                }
            }
            _ => {}
        }
    }

    /// Handle mouse movement. Left drag rotates, right or middle drag pans.
    pub fn on_mouse_move(&mut self, position: (f64, f64)) -> bool {
        let should_rotate = self.left_mouse_pressed;
        let should_pan = self.right_mouse_pressed || self.middle_mouse_pressed;

        let mut handled = false;

        if should_rotate {
            if let Some(last_pos) = self.last_mouse_pos {
                let delta_x = (position.0 - last_pos.0) as f32;
                let delta_y = (position.1 - last_pos.1) as f32;
                self.rotate(delta_x, delta_y);
                handled = true;
            }
            self.last_mouse_pos = Some(position);
        } else if should_pan {
            if let Some(last_pos) = self.last_mouse_pos {
                let delta_x = (position.0 - last_pos.0) as f32;
                let delta_y = (position.1 - last_pos.1) as f32;
                self.pan(delta_x, -delta_y);
                handled = true;
            }
            self.last_mouse_pos = Some(position);
        } else {
            self.last_mouse_pos = None;
        }

        handled
    }

    /// Rotate camera around target
    fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        self.pending_yaw -= delta_x * ROTATE_SPEED;
        self.pending_pitch -= delta_y * ROTATE_SPEED;
    }

    /// Pan camera (move target)
    fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let forward = self.state.forward();
        let right = glm::normalize(&glm::cross(&forward, &world_up()));
        let up = glm::cross(&right, &forward);

        // Pan speed based on distance
        let pan_speed = self.state.distance * 0.001;
        self.pending_pan += right * (delta_x * pan_speed) - up * (delta_y * pan_speed);
    }

    pub fn zoom(&mut self, delta: f32) {
        let zoom_factor = 1.0 - delta * 0.1;
        self.state.distance = (self.state.distance * zoom_factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Translate position and target together, keeping the orbit intact.
    pub fn move_rig(&mut self, direction: MoveDirection) {
        let forward = self.state.forward();
        let right = glm::normalize(&glm::cross(&forward, &world_up()));
        let step = match direction {
            MoveDirection::Forward => forward * MOVE_STEP,
            MoveDirection::Backward => forward * -MOVE_STEP,
            MoveDirection::Left => right * -MOVE_STEP,
            MoveDirection::Right => right * MOVE_STEP,
            MoveDirection::Up => world_up() * MOVE_STEP,
            MoveDirection::Down => world_up() * -MOVE_STEP,
        };
        self.state.target += step;
    }

    /// Navigation keys: WASD and arrows move, Q/E raise and lower.
    pub fn on_key(&mut self, code: KeyCode) -> bool {
        let direction = match code {
            KeyCode::KeyW | KeyCode::ArrowUp => MoveDirection::Forward,
            KeyCode::KeyS | KeyCode::ArrowDown => MoveDirection::Backward,
            KeyCode::KeyA | KeyCode::ArrowLeft => MoveDirection::Left,
            KeyCode::KeyD | KeyCode::ArrowRight => MoveDirection::Right,
            KeyCode::KeyQ => MoveDirection::Up,
            KeyCode::KeyE => MoveDirection::Down,
            _ => return false,
        };
        self.move_rig(direction);
        true
    }

    /// Bleed pending rotation and pan into the pose, then decay them.
    pub fn update(&mut self) {
        self.state.yaw += self.pending_yaw * DAMPING;
        self.state.pitch =
            (self.state.pitch + self.pending_pitch * DAMPING).clamp(MIN_PITCH, MAX_PITCH);
        self.state.target += self.pending_pan * DAMPING;

        let decay = 1.0 - DAMPING;
        self.pending_yaw *= decay;
        self.pending_pitch *= decay;
        self.pending_pan *= decay;

        if self.pending_yaw.abs() < 1e-6 {
            self.pending_yaw = 0.0;
        }
        if self.pending_pitch.abs() < 1e-6 {
            self.pending_pitch = 0.0;
        }
        if glm::length(&self.pending_pan) < 1e-6 {
            self.pending_pan = glm::vec3(0.0, 0.0, 0.0);
        }
    }

    /// Reset camera to defaults
    pub fn reset(&mut self) {
        self.state.reset();
        self.last_mouse_pos = None;
        self.pending_yaw = 0.0;
        self.pending_pitch = 0.0;
        self.pending_pan = glm::vec3(0.0, 0.0, 0.0);
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(CameraState::default())
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
    fn opposite_moves_cancel_out() {
        let mut controller = CameraController::default();
        let eye = controller.state().eye();
        let target = controller.state().target;

        controller.move_rig(MoveDirection::Forward);
        controller.move_rig(MoveDirection::Backward);
        assert_vec3_eq(controller.state().eye(), eye, 1e-4);
        assert_vec3_eq(controller.state().target, target, 1e-4);

        controller.move_rig(MoveDirection::Left);
        controller.move_rig(MoveDirection::Right);
        controller.move_rig(MoveDirection::Up);
        controller.move_rig(MoveDirection::Down);
        assert_vec3_eq(controller.state().target, target, 1e-4);
    }

    #[test]
    fn forward_moves_the_rig_by_a_fixed_step_along_the_view() {
        let mut controller = CameraController::default();
        let forward = controller.state().forward();
        let eye = controller.state().eye();
        let target = controller.state().target;

        controller.move_rig(MoveDirection::Forward);
        assert_vec3_eq(controller.state().target, target + forward * 5.0, 1e-4);
        assert_vec3_eq(controller.state().eye(), eye + forward * 5.0, 1e-4);
    }

    #[test]
    fn reset_restores_the_default_pose_after_movement() {
        let mut controller = CameraController::default();
        let eye = controller.state().eye();
        let target = controller.state().target;

        for _ in 0..7 {
            controller.move_rig(MoveDirection::Forward);
            controller.move_rig(MoveDirection::Left);
        }
        controller.zoom(2.0);
        controller.on_mouse_button(winit::event::MouseButton::Left, true);
        controller.on_mouse_move((0.0, 0.0));
        controller.on_mouse_move((120.0, 60.0));
        controller.update();

        controller.reset();
        assert_vec3_eq(controller.state().eye(), eye, 1e-5);
        assert_vec3_eq(controller.state().target, target, 1e-5);

        // Pending motion was dropped with the reset.
        controller.update();
        assert_vec3_eq(controller.state().eye(), eye, 1e-5);
    }

    #[test]
    fn damped_rotation_converges_to_the_full_drag() {
        let mut controller = CameraController::default();
        let yaw_before = controller.state().yaw;

        controller.on_mouse_button(winit::event::MouseButton::Left, true);
        controller.on_mouse_move((0.0, 0.0));
        controller.on_mouse_move((100.0, 0.0));

        controller.update();
        let after_one = controller.state().yaw;
        assert!((after_one - (yaw_before - 1.0 * DAMPING)).abs() < 1e-6);

        for _ in 0..400 {
            controller.update();
        }
        assert!((controller.state().yaw - (yaw_before - 1.0)).abs() < 1e-3);
    }

    #[test]
    fn right_drag_pans_the_target_in_the_view_plane() {
        let mut controller = CameraController::default();
        let forward = controller.state().forward();
        let target = controller.state().target;
        let distance = controller.state().distance;

        controller.on_mouse_button(winit::event::MouseButton::Right, true);
        controller.on_mouse_move((0.0, 0.0));
        controller.on_mouse_move((200.0, 0.0));
        for _ in 0..400 {
            controller.update();
        }

        let moved = controller.state().target - target;
        assert!(glm::length(&moved) > 1e-3);
        // Pan slides the rig sideways without turning or zooming it.
        assert!(glm::dot(&moved, &forward).abs() < 1e-4);
        assert_vec3_eq(controller.state().forward(), forward, 1e-6);
        assert!((controller.state().distance - distance).abs() < 1e-6);
    }

    #[test]
    fn zoom_clamps_to_the_distance_range() {
        let mut controller = CameraController::default();
        for _ in 0..100 {
            controller.zoom(5.0);
        }
        assert!((controller.state().distance - MIN_DISTANCE).abs() < 1e-6);

        for _ in 0..100 {
            controller.zoom(-5.0);
        }
        assert!((controller.state().distance - MAX_DISTANCE).abs() < 1e-6);
    }

    #[test]
    fn pitch_stays_inside_the_polar_limits() {
        let mut controller = CameraController::default();
        controller.on_mouse_button(winit::event::MouseButton::Left, true);
        controller.on_mouse_move((0.0, 0.0));
        controller.on_mouse_move((0.0, -10000.0));
        for _ in 0..400 {
            controller.update();
        }
        assert!(controller.state().pitch <= MAX_PITCH + 1e-6);

        controller.on_mouse_move((0.0, 10000.0));
        for _ in 0..400 {
            controller.update();
        }
        assert!(controller.state().pitch >= MIN_PITCH - 1e-6);
    }

    #[test]
    fn navigation_keys_map_to_rig_moves() {
        let mut controller = CameraController::default();
        let target = controller.state().target;
        assert!(controller.on_key(KeyCode::KeyW));
        assert!(controller.on_key(KeyCode::KeyS));
        assert!(!controller.on_key(KeyCode::KeyZ));
        assert_vec3_eq(controller.state().target, target, 1e-4);
    }
}
