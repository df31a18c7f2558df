use cgmath::{InnerSpace, Matrix4, Quaternion, Rad, Rotation3, Vector2, Vector3};

/// A virtual trackball.
///
/// Pointer positions are given in normalized window coordinates (-1 to 1, Y up). Points near the
/// center map onto a sphere, points further out onto a hyperbolic sheet, so dragging outside the
/// ball still rotates smoothly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trackball {
    radius: f32,
    rotation: Quaternion<f32>,
}

impl Trackball {
    /// Creates a trackball with radius 0.8 and no rotation.
    pub fn new() -> Trackball {
        Trackball {
            radius: 0.8,
            rotation: Quaternion::new(1., 0., 0., 0.),
        }
    }

    /// The accumulated rotation.
    pub fn rotation(&self) -> Quaternion<f32> {
        self.rotation
    }

    /// The accumulated rotation as a matrix.
    pub fn rotation_matrix(&self) -> Matrix4<f32> {
        self.rotation.into()
    }

    /// Forgets all rotation.
    pub fn reset(&mut self) {
        self.rotation = Quaternion::new(1., 0., 0., 0.);
    }

    /// Rotates by the drag from `from` to `to`.
    pub fn track(&mut self, from: Vector2<f32>, to: Vector2<f32>) {
        if from == to {
            return;
        }
        let a = self.map_to_sphere(from);
        let b = self.map_to_sphere(to);

        let axis = a.cross(b);
        if axis.magnitude2() == 0. {
            return;
        }
        let cos = a.normalize().dot(b.normalize()).max(-1.).min(1.);
        let delta = Quaternion::from_axis_angle(axis.normalize(), Rad(cos.acos()));
        self.rotation = (delta * self.rotation).normalize();
    }

    fn map_to_sphere(&self, p: Vector2<f32>) -> Vector3<f32> {
        let d2 = p.magnitude2();
        let r2 = self.radius * self.radius;
        let z = if d2 <= r2 / 2. {
            (r2 - d2).sqrt()
        } else {
            r2 / 2. / d2.sqrt()
        };
        Vector3::new(p.x, p.y, z)
    }
}

impl Default for Trackball {
    fn default() -> Trackball {
        Trackball::new()
    }
}

#[test]
fn horizontal_drag_rotates_about_y() {
    let mut ball = Trackball::new();
    ball.track(Vector2::new(0., 0.), Vector2::new(0.2, 0.));

    let q = ball.rotation();
    // pure rotation about +Y: no x or z component in the axis
    assert!(q.v.x.abs() < 1e-6 && q.v.z.abs() < 1e-6, "{:?}", q);
    assert!(q.v.y > 0.);

    ball.reset();
    assert_eq!(ball.rotation(), Quaternion::new(1., 0., 0., 0.));
}

#[test]
fn zero_drag_is_ignored() {
    let mut ball = Trackball::new();
    ball.track(Vector2::new(0.3, 0.3), Vector2::new(0.3, 0.3));
    assert_eq!(ball, Trackball::new());
}
