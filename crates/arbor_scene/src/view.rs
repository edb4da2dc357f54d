//! Projection ([`View`]) and view transform ([`Camera`]) sources.
//!
//! Both cache their matrix and rebuild it eagerly in every setter, so
//! reading `matrix()` never computes anything.

use glam::{Mat4, Vec2, Vec3};

use arbor_core::math::{orthographic_2d, perspective, rotation_xyz, transform_point};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionType {
    /// `fov` is the vertical field of view in degrees.
    Perspective { fov: f32, near: f32, far: f32 },
    /// Pixel-space projection; z is allowed in `0..depth`.
    Orthographic2D { depth: f32 },
}

#[derive(Debug, Clone)]
pub struct View {
    projection_type: ProjectionType,
    display_size: Vec2,
    matrix: Mat4,
}

impl View {
    #[must_use]
    pub fn new_perspective(fov: f32, display_size: Vec2, near: f32, far: f32) -> Self {
        Self::with_projection(ProjectionType::Perspective { fov, near, far }, display_size)
    }

    #[must_use]
    pub fn new_orthographic_2d(display_size: Vec2, depth: f32) -> Self {
        Self::with_projection(ProjectionType::Orthographic2D { depth }, display_size)
    }

    fn with_projection(projection_type: ProjectionType, display_size: Vec2) -> Self {
        let mut view = Self {
            projection_type,
            display_size,
            matrix: Mat4::IDENTITY,
        };
        view.update_projection_matrix();
        view
    }

    fn update_projection_matrix(&mut self) {
        self.matrix = match self.projection_type {
            ProjectionType::Perspective { fov, near, far } => {
                let aspect = self.display_size.x / self.display_size.y.max(f32::EPSILON);
                perspective(fov, aspect, near, far)
            }
            ProjectionType::Orthographic2D { depth } => orthographic_2d(self.display_size, 0.0, depth),
        };
    }

    #[inline]
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    #[inline]
    #[must_use]
    pub fn projection_type(&self) -> ProjectionType {
        self.projection_type
    }

    #[inline]
    #[must_use]
    pub fn display_size(&self) -> Vec2 {
        self.display_size
    }

    pub fn set_display_size(&mut self, display_size: Vec2) {
        self.display_size = display_size;
        self.update_projection_matrix();
    }

    /// Ignored for 2D views.
    pub fn set_fov(&mut self, value: f32) {
        if let ProjectionType::Perspective { fov, .. } = &mut self.projection_type {
            *fov = value;
            self.update_projection_matrix();
        }
    }

    /// Ignored for 2D views.
    pub fn set_near_far(&mut self, z_near: f32, z_far: f32) {
        if let ProjectionType::Perspective { near, far, .. } = &mut self.projection_type {
            *near = z_near;
            *far = z_far;
            self.update_projection_matrix();
        }
    }

    /// Ignored for perspective views.
    pub fn set_depth(&mut self, value: f32) {
        if let ProjectionType::Orthographic2D { depth } = &mut self.projection_type {
            *depth = value;
            self.update_projection_matrix();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraKind {
    /// Identity view transform.
    Fixed,
    /// Eye at `position`, oriented by `rotation`.
    LookFrom,
    /// Orbits `position` at `distance`.
    LookAt { distance: f32 },
    /// 2D camera; `position` is the top-left corner of the visible area.
    TwoD { display_size: Vec2 },
}

#[derive(Debug, Clone)]
pub struct Camera {
    kind: CameraKind,
    position: Vec3,
    /// Euler angles in radians
    rotation: Vec3,
    matrix: Mat4,
}

impl Camera {
    #[must_use]
    pub fn new_fixed() -> Self {
        Self::with_kind(CameraKind::Fixed, Vec3::ZERO, Vec3::ZERO)
    }

    #[must_use]
    pub fn new_look_from(position: Vec3, rotation: Vec3) -> Self {
        Self::with_kind(CameraKind::LookFrom, position, rotation)
    }

    #[must_use]
    pub fn new_look_at(position: Vec3, rotation: Vec3, distance: f32) -> Self {
        Self::with_kind(CameraKind::LookAt { distance }, position, rotation)
    }

    #[must_use]
    pub fn new_2d(display_size: Vec2, position: Vec3, rotation: Vec3) -> Self {
        Self::with_kind(CameraKind::TwoD { display_size }, position, rotation)
    }

    fn with_kind(kind: CameraKind, position: Vec3, rotation: Vec3) -> Self {
        let mut camera = Self {
            kind,
            position,
            rotation,
            matrix: Mat4::IDENTITY,
        };
        camera.update_view_matrix();
        camera
    }

    fn update_view_matrix(&mut self) {
        let eye = Mat4::from_translation(-self.position);
        self.matrix = match self.kind {
            CameraKind::Fixed => Mat4::IDENTITY,
            CameraKind::LookFrom | CameraKind::TwoD { .. } => rotation_xyz(self.rotation) * eye,
            CameraKind::LookAt { distance } => {
                Mat4::from_translation(Vec3::new(0.0, 0.0, -distance)) * rotation_xyz(self.rotation) * eye
            }
        };
    }

    #[inline]
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> CameraKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_view_matrix();
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
        self.update_view_matrix();
    }

    /// Ignored unless this is a look-at camera.
    pub fn set_distance(&mut self, value: f32) {
        if let CameraKind::LookAt { distance } = &mut self.kind {
            *distance = value;
            self.update_view_matrix();
        }
    }

    /// Ignored unless this is a 2D camera.
    pub fn set_display_size(&mut self, value: Vec2) {
        if let CameraKind::TwoD { display_size } = &mut self.kind {
            *display_size = value;
            self.update_view_matrix();
        }
    }

    /// Eye position in world space.
    #[must_use]
    pub fn world_position(&self) -> Vec3 {
        match self.kind {
            CameraKind::TwoD { display_size } => self.position + (display_size * 0.5).extend(0.0),
            _ => transform_point(&self.matrix.inverse(), Vec3::ZERO),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new_fixed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-4;

    fn vec3_approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < EPSILON
    }

    #[test]
    fn setters_rebuild_projection() {
        let mut view = View::new_perspective(60.0, Vec2::new(800.0, 600.0), 0.1, 100.0);
        let before = view.matrix();
        view.set_fov(90.0);
        assert_ne!(view.matrix(), before);
        assert_eq!(view.matrix(), perspective(90.0, 800.0 / 600.0, 0.1, 100.0));

        // Depth has no meaning for a perspective view
        let unchanged = view.matrix();
        view.set_depth(5.0);
        assert_eq!(view.matrix(), unchanged);
    }

    #[test]
    fn orthographic_view_uses_depth() {
        let mut view = View::new_orthographic_2d(Vec2::new(640.0, 480.0), 1.0);
        view.set_depth(10.0);
        assert_eq!(view.matrix(), orthographic_2d(Vec2::new(640.0, 480.0), 0.0, 10.0));
    }

    #[test]
    fn look_from_moves_world_opposite_to_eye() {
        let camera = Camera::new_look_from(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let p = transform_point(&camera.matrix(), Vec3::ZERO);
        assert!(vec3_approx(p, Vec3::new(0.0, 0.0, -5.0)));
        assert!(vec3_approx(camera.world_position(), Vec3::new(0.0, 0.0, 5.0)));
    }

    #[test]
    fn look_at_orbits_target_at_distance() {
        let target = Vec3::new(1.0, 2.0, 3.0);
        let mut camera = Camera::new_look_at(target, Vec3::ZERO, 10.0);
        // The target sits straight ahead of the eye
        let p = transform_point(&camera.matrix(), target);
        assert!(vec3_approx(p, Vec3::new(0.0, 0.0, -10.0)));
        assert!(vec3_approx(camera.world_position(), target + Vec3::new(0.0, 0.0, 10.0)));

        camera.set_rotation(Vec3::new(0.0, FRAC_PI_2, 0.0));
        let eye = camera.world_position();
        assert!(((eye - target).length() - 10.0).abs() < EPSILON);
    }

    #[test]
    fn two_d_world_position_is_screen_centre() {
        let camera = Camera::new_2d(Vec2::new(640.0, 480.0), Vec3::new(10.0, 20.0, 0.0), Vec3::ZERO);
        assert!(vec3_approx(camera.world_position(), Vec3::new(330.0, 260.0, 0.0)));
    }

    #[test]
    fn fixed_camera_is_identity() {
        let mut camera = Camera::new_fixed();
        camera.set_position(Vec3::ONE);
        assert_eq!(camera.matrix(), Mat4::IDENTITY);
    }
}
