use crate::data::Trackball;
use cgmath::{self, Deg, Matrix4, Vector2, Vector3};

/// A perspective projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in degrees.
    pub fov_y: f32,

    /// Viewport width in pixels.
    pub width: u32,

    /// Viewport height in pixels.
    pub height: u32,

    /// Near clip plane.
    pub clip_near: f32,

    /// Far clip plane.
    pub clip_far: f32,
}

impl Projection {
    /// Creates a projection with 45° vertical FOV, 0.01 and 10 as clip planes, and a 32px×32px
    /// viewport.
    pub fn new() -> Projection {
        Projection {
            fov_y: 45.,
            width: 32,
            height: 32,
            clip_near: 0.01,
            clip_far: 10.,
        }
    }

    /// Width over height. A zero height is treated as one pixel.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Returns the projection matrix.
    pub fn matrix(&self) -> Matrix4<f32> {
        cgmath::perspective(
            Deg(self.fov_y),
            self.aspect(),
            self.clip_near,
            self.clip_far,
        )
    }
}

impl Default for Projection {
    fn default() -> Projection {
        Projection::new()
    }
}

/// Which pointer button drives the camera during a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseControl {
    None,
    /// Rotate with the trackball.
    Left,
    /// Pan in the view plane.
    Middle,
    /// Move towards or away from the center.
    Right,
}

const PAN_SPEED: f32 = 0.5;
const DOLLY_SPEED: f32 = 2.;
const SCROLL_SPEED: f32 = 0.25;
const MIN_DOLLY: f32 = 0.01;

/// A camera orbiting the origin.
///
/// Owned by the host and lent to whichever plugin is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    default_dolly: f32,
    trackball: Trackball,
    dolly: f32,
    pan: Vector2<f32>,
}

impl OrbitCamera {
    /// Creates a camera at the given distance from the origin, looking down -Z.
    pub fn new(dolly: f32) -> OrbitCamera {
        OrbitCamera {
            default_dolly: dolly,
            trackball: Trackball::new(),
            dolly,
            pan: Vector2::new(0., 0.),
        }
    }

    /// Distance from the orbit center.
    pub fn dolly(&self) -> f32 {
        self.dolly
    }

    pub fn pan(&self) -> Vector2<f32> {
        self.pan
    }

    /// Returns the view matrix.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(Vector3::new(self.pan.x, self.pan.y, -self.dolly))
            * self.trackball.rotation_matrix()
    }

    /// Handles a pointer drag between two points in normalized window coordinates.
    pub fn mouse_move_control(&mut self, mode: MouseControl, old: Vector2<f32>, new: Vector2<f32>) {
        match mode {
            MouseControl::None => (),
            MouseControl::Left => self.rotate(old, new),
            MouseControl::Middle => self.pan += (new - old) * self.dolly * PAN_SPEED,
            MouseControl::Right => self.move_dolly((old.y - new.y) * DOLLY_SPEED),
        }
    }

    /// Handles scrolling; scrolling up moves closer.
    pub fn mouse_scroll_control(&mut self, _dx: f32, dy: f32) {
        self.move_dolly(-dy * SCROLL_SPEED);
    }

    /// Rotates with the trackball.
    pub fn rotate(&mut self, old: Vector2<f32>, new: Vector2<f32>) {
        self.trackball.track(old, new);
    }

    /// Moves along the view axis, never closer than 0.01 to the center.
    pub fn move_dolly(&mut self, d: f32) {
        self.dolly = (self.dolly + d).max(MIN_DOLLY);
    }

    /// Returns to the initial distance, without pan or rotation.
    pub fn reset(&mut self) {
        *self = OrbitCamera::new(self.default_dolly);
    }
}

impl Default for OrbitCamera {
    fn default() -> OrbitCamera {
        OrbitCamera::new(5.)
    }
}

#[test]
fn default_view_looks_down_z() {
    use cgmath::Vector4;

    let camera = OrbitCamera::default();
    let origin = camera.view_matrix() * Vector4::new(0., 0., 0., 1.);
    assert_eq!(origin, Vector4::new(0., 0., -5., 1.));
}

#[test]
fn camera_controls() {
    let mut camera = OrbitCamera::new(2.);

    camera.mouse_move_control(MouseControl::Right, Vector2::new(0., 0.), Vector2::new(0., 0.25));
    assert_eq!(camera.dolly(), 1.5);

    camera.mouse_scroll_control(0., -2.);
    assert_eq!(camera.dolly(), 2.);

    camera.move_dolly(-10.);
    assert_eq!(camera.dolly(), MIN_DOLLY);

    camera.move_dolly(1.99);
    camera.mouse_move_control(MouseControl::Middle, Vector2::new(0., 0.), Vector2::new(0.5, 0.));
    assert!((camera.pan().x - 0.5).abs() < 1e-6);

    camera.mouse_move_control(MouseControl::None, Vector2::new(0., 0.), Vector2::new(1., 1.));
    camera.reset();
    assert_eq!(camera, OrbitCamera::new(2.));
}

#[test]
fn projection_maps_clip_planes() {
    use cgmath::Vector4;

    let projection = Projection::new();
    let near = projection.matrix() * Vector4::new(0., 0., -projection.clip_near, 1.);
    let far = projection.matrix() * Vector4::new(0., 0., -projection.clip_far, 1.);
    assert!((near.z / near.w + 1.).abs() < 1e-4);
    assert!((far.z / far.w - 1.).abs() < 1e-4);
}
