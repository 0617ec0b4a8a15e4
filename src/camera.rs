use std::f32::consts::FRAC_PI_2;

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::transform::Transform3D;

/// Keeps the camera from flipping over the poles
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// First-person controller: WASD moves relative to where the camera faces, the mouse
/// turns it.
pub struct FpsCamera {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    speed: f32,
    sensitivity: f32,
    last_cursor: Option<(f64, f64)>,
    look: (f32, f32),

    // forward, strafe right, up
    motion: (i32, i32, i32),
}

impl FpsCamera {
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            speed,
            sensitivity,
            last_cursor: None,
            look: (0.0, 0.0),
            motion: (0, 0, 0),
        }
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Absolute cursor position, as reported by the window. The first report only sets
    /// the reference point.
    pub fn cursor_moved(&mut self, x: f64, y: f64) {
        if let Some((last_x, last_y)) = self.last_cursor {
            self.look.0 += (x - last_x) as f32;
            self.look.1 += (y - last_y) as f32;
        }
        self.last_cursor = Some((x, y));
    }

    pub fn process_input(&mut self, event: &winit::event::KeyEvent) {
        use winit::keyboard::{KeyCode, PhysicalKey};
        let pressed: i32 = (event.state == winit::event::ElementState::Pressed).into();
        match &event.physical_key {
            PhysicalKey::Code(KeyCode::KeyW) => self.motion.0 = pressed,
            PhysicalKey::Code(KeyCode::KeyS) => self.motion.0 = -pressed,
            PhysicalKey::Code(KeyCode::KeyD) => self.motion.1 = pressed,
            PhysicalKey::Code(KeyCode::KeyA) => self.motion.1 = -pressed,
            PhysicalKey::Code(KeyCode::Space) => self.motion.2 = pressed,
            PhysicalKey::Code(KeyCode::ShiftLeft) => self.motion.2 = -pressed,
            _ => (),
        };
    }

    /// Applies the mouse movement gathered since the last frame, then moves.
    pub fn update(&mut self, dt: f32) {
        let (dx, dy) = std::mem::take(&mut self.look);
        self.yaw -= dx * self.sensitivity;
        self.pitch = (self.pitch - dy * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);

        let orientation = self.orientation();
        let forward = orientation * Vec3::NEG_Z;
        let right = orientation * Vec3::X;
        let direction = forward * self.motion.0 as f32
            + right * self.motion.1 as f32
            + Vec3::Y * self.motion.2 as f32;

        self.position += direction.normalize_or_zero() * self.speed * dt;
    }

    pub fn transform(&self) -> Transform3D {
        Transform3D {
            position: self.position,
            rotation: self.orientation(),
            ..Transform3D::default()
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.transform().inverse_matrix()
    }

    #[cfg(test)]
    pub(crate) fn set_motion(&mut self, forward: i32, right: i32, up: i32) {
        self.motion = (forward, right, up);
    }
}
