//! Matrix and vector helpers.
//!
//! Vector and matrix value types are glam's. Matrices use glam's
//! column-vector convention, so for `T * R * S` the scale is applied to a
//! point first and the translation last.
//!
//! The scene graph distinguishes "no transform" (`None`) from the identity
//! matrix: [`compose`] short-circuits on `None` instead of multiplying by an
//! identity, which keeps grouping nodes free of spurious products.

pub use glam::{Mat4, Vec2, Vec3, Vec4};

/// Rotation from Euler angles in radians, applied as `Rx * Ry * Rz`.
#[inline]
#[must_use]
pub fn rotation_xyz(angles: Vec3) -> Mat4 {
    Mat4::from_rotation_x(angles.x) * Mat4::from_rotation_y(angles.y) * Mat4::from_rotation_z(angles.z)
}

/// Model matrix `Translate(position) * RotateXYZ(rotation) * Scale(scale)`.
#[inline]
#[must_use]
pub fn compose_trs(position: Vec3, rotation: Vec3, scale: Vec3) -> Mat4 {
    Mat4::from_translation(position) * rotation_xyz(rotation) * Mat4::from_scale(scale)
}

/// Null-propagating matrix product `outer * inner`.
///
/// | outer | inner | result |
/// |-------|-------|--------|
/// | Some  | Some  | `outer * inner` |
/// | Some  | None  | `outer` |
/// | None  | Some  | `inner` |
/// | None  | None  | `None` |
#[inline]
#[must_use]
pub fn compose(outer: Option<Mat4>, inner: Option<Mat4>) -> Option<Mat4> {
    match (outer, inner) {
        (Some(o), Some(i)) => Some(o * i),
        (Some(m), None) | (None, Some(m)) => Some(m),
        (None, None) => None,
    }
}

/// Applies the full affine transform of `m` to the point `v`.
#[inline]
#[must_use]
pub fn transform_point(m: &Mat4, v: Vec3) -> Vec3 {
    m.transform_point3(v)
}

/// Right-handed perspective projection (depth range 0..1). `fov_degrees` is
/// the vertical field of view.
#[inline]
#[must_use]
pub fn perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh(fov_degrees.to_radians(), aspect, near, far)
}

/// Pixel-space orthographic projection with the origin in the top-left
/// corner and y growing downwards.
#[inline]
#[must_use]
pub fn orthographic_2d(display_size: Vec2, near: f32, far: f32) -> Mat4 {
    Mat4::orthographic_rh(0.0, display_size.x, display_size.y, 0.0, near, far)
}

/// Translation component of an affine matrix.
#[inline]
#[must_use]
pub fn translation_of(m: &Mat4) -> Vec3 {
    m.w_axis.truncate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-5;

    fn vec3_approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < EPSILON
    }

    #[test]
    fn compose_propagates_none() {
        let t = Mat4::from_translation(Vec3::X);
        assert_eq!(compose(None, None), None);
        assert_eq!(compose(Some(t), None), Some(t));
        assert_eq!(compose(None, Some(t)), Some(t));
        assert_eq!(compose(Some(t), Some(t)), Some(t * t));
    }

    #[test]
    fn trs_scales_before_rotating_before_translating() {
        let m = compose_trs(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, FRAC_PI_2), Vec3::splat(2.0));
        // (1,0,0) -> scale (2,0,0) -> rotate z 90° (0,2,0) -> translate (10,2,0)
        let p = transform_point(&m, Vec3::X);
        assert!(vec3_approx(p, Vec3::new(10.0, 2.0, 0.0)), "got {p}");
    }

    #[test]
    fn rotation_xyz_applies_z_first() {
        let angles = Vec3::new(FRAC_PI_2, 0.0, FRAC_PI_2);
        // Rz maps X -> Y, then Rx maps Y -> Z
        let p = transform_point(&rotation_xyz(angles), Vec3::X);
        assert!(vec3_approx(p, Vec3::Z), "got {p}");
    }

    #[test]
    fn orthographic_2d_maps_corners() {
        let m = orthographic_2d(Vec2::new(640.0, 480.0), 0.0, 1.0);
        assert!(vec3_approx(m.project_point3(Vec3::ZERO), Vec3::new(-1.0, 1.0, 0.0)));
        let corner = m.project_point3(Vec3::new(640.0, 480.0, 0.0));
        assert!((corner.x - 1.0).abs() < EPSILON);
        assert!((corner.y + 1.0).abs() < EPSILON);
    }

    #[test]
    fn translation_of_reads_last_column() {
        let m = compose_trs(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, Vec3::ONE);
        assert_eq!(translation_of(&m), Vec3::new(1.0, 2.0, 3.0));
    }
}
