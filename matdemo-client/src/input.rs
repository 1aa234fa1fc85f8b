use std::collections::HashSet;

use glam::{Vec2, Vec3};
use matdemo_core::Camera;
use sdl2::keyboard::Keycode;

/// The current state of the keyboard.
#[derive(Default)]
pub struct KeyboardState {
    pub down: HashSet<Keycode>,
}

/// The current state of the mouse.
#[derive(Default)]
pub struct MouseState {
    /// Relative motion since the last frame, in pixels.
    pub delta: Vec2,
    /// Whether the mouse is captured for looking around.
    pub grabbed: bool,
}

/// Turns keyboard and mouse state into camera movement.
pub struct CameraController {
    pub speed: f32,
    pub sensitivity: f32,
}

impl CameraController {
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self { speed, sensitivity }
    }

    /// WASD moves in the view plane, Space and Left Shift move up and down. Mouse motion turns
    /// the camera only while the mouse is grabbed.
    pub fn apply(
        &self,
        camera: &mut Camera,
        keyboard: &KeyboardState,
        mouse: &MouseState,
        delta_time: f32,
    ) {
        if mouse.grabbed && mouse.delta != Vec2::ZERO {
            camera.look(
                mouse.delta.x * self.sensitivity,
                -mouse.delta.y * self.sensitivity,
            );
        }

        let axis = |positive: Keycode, negative: Keycode| {
            keyboard.down.contains(&positive) as i32 as f32
                - keyboard.down.contains(&negative) as i32 as f32
        };
        let movement = Vec3::new(
            axis(Keycode::D, Keycode::A),
            axis(Keycode::Space, Keycode::LShift),
            axis(Keycode::W, Keycode::S),
        );
        if movement != Vec3::ZERO {
            camera.fly(movement.normalize() * self.speed * delta_time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_key_moves_camera() {
        let controller = CameraController::new(2.0, 0.1);
        let mut camera = Camera::default();
        let mut keyboard = KeyboardState::default();
        keyboard.down.insert(Keycode::W);

        controller.apply(&mut camera, &keyboard, &MouseState::default(), 0.5);
        assert!(camera.position.abs_diff_eq(Vec3::new(0.0, 0.0, 4.0), 1e-6));
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let controller = CameraController::new(2.0, 0.1);
        let mut camera = Camera::default();
        let mut keyboard = KeyboardState::default();
        keyboard.down.insert(Keycode::A);
        keyboard.down.insert(Keycode::D);

        controller.apply(&mut camera, &keyboard, &MouseState::default(), 1.0);
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_mouse_only_turns_when_grabbed() {
        let controller = CameraController::new(2.0, 0.1);
        let mut camera = Camera::default();
        let keyboard = KeyboardState::default();
        let mut mouse = MouseState {
            delta: Vec2::new(900.0, 0.0),
            grabbed: false,
        };

        controller.apply(&mut camera, &keyboard, &mouse, 0.016);
        assert_eq!(camera.forward, Vec3::NEG_Z);

        mouse.grabbed = true;
        controller.apply(&mut camera, &keyboard, &mouse, 0.016);
        assert!(camera.forward.abs_diff_eq(Vec3::X, 1e-5));
    }
}
