use glam::{Mat4, Vec3};

use arbor_core::math::compose_trs;

/// Position, Euler rotation (radians) and scale of a transform node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn from_rotation(rotation: Vec3) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn from_scale(scale: Vec3) -> Self {
        Self {
            scale,
            ..Self::IDENTITY
        }
    }

    /// `Translate(position) * RotateXYZ(rotation) * Scale(scale)`
    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> Mat4 {
        compose_trs(self.position, self.rotation, self.scale)
    }

    /// Local matrix with the camera rotation subtracted, so the node
    /// counter-rotates against the camera and keeps facing it.
    #[inline]
    #[must_use]
    pub fn billboard_matrix(&self, camera_rotation: Vec3) -> Mat4 {
        compose_trs(self.position, self.rotation - camera_rotation, self.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
