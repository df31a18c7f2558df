//! CGMath extension traits.

use cgmath::{Matrix4, SquareMatrix, Vector3, Vector4};

/// Vector4 extensions.
pub trait Vector4Ext {
    /// Divides by w. Returns None if w is zero or the result is not finite.
    fn dehomogenize(self) -> Option<Vector3<f32>>;
}

impl Vector4Ext for Vector4<f32> {
    fn dehomogenize(self) -> Option<Vector3<f32>> {
        if self.w == 0. {
            return None;
        }
        let v = self.truncate() / self.w;
        if v.x.is_finite() && v.y.is_finite() && v.z.is_finite() {
            Some(v)
        } else {
            None
        }
    }
}

/// Matrix4 extensions.
pub trait Matrix4Ext {
    /// Transforms a point (w = 1) and divides by the resulting w.
    fn transform_point3(&self, point: Vector3<f32>) -> Option<Vector3<f32>>;

    /// Transforms a point with the inverse of this matrix.
    fn inverse_transform_point3(&self, point: Vector3<f32>) -> Option<Vector3<f32>>;
}

impl Matrix4Ext for Matrix4<f32> {
    fn transform_point3(&self, point: Vector3<f32>) -> Option<Vector3<f32>> {
        (*self * point.extend(1.)).dehomogenize()
    }

    fn inverse_transform_point3(&self, point: Vector3<f32>) -> Option<Vector3<f32>> {
        self.invert()?.transform_point3(point)
    }
}

#[test]
fn point_transforms() {
    let m = Matrix4::from_translation(Vector3::new(1., 2., 3.)) * Matrix4::from_scale(2.);
    let p = Vector3::new(1., 1., 1.);
    let q = m.transform_point3(p).unwrap();
    assert_eq!(q, Vector3::new(3., 4., 5.));
    let back = m.inverse_transform_point3(q).unwrap();
    assert!((back - p).x.abs() < 1e-6 && (back - p).y.abs() < 1e-6 && (back - p).z.abs() < 1e-6);

    let singular = Matrix4::from_nonuniform_scale(1., 0., 1.);
    assert_eq!(singular.inverse_transform_point3(p), None);
    assert_eq!(Vector4::new(1., 1., 1., 0.).dehomogenize(), None);
}
