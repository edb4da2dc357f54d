//! Chainable transform editing.
//!
//! [`SceneNode`] borrows a [`Scene`] mutably and edits one node's transform
//! through a fluent API. Stale handles and nodes without a transform are
//! logged and skipped instead of failing the chain.
//!
//! ```rust,ignore
//! scene.node(handle)
//!     .set_position(Vec3::new(0.0, 3.0, 0.0))
//!     .set_uniform_scale(2.0)
//!     .rotate(Vec3::new(0.0, 0.1, 0.0));
//! ```
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::must_use_candidate)]
use glam::Vec3;

use crate::NodeHandle;
use crate::scene::Scene;
use crate::transform::Transform;

/// Temporary mutable borrow of a scene node for chainable operations.
pub struct SceneNode<'a> {
    scene: &'a mut Scene,
    handle: NodeHandle,
}

impl<'a> SceneNode<'a> {
    #[inline]
    pub fn new(scene: &'a mut Scene, handle: NodeHandle) -> Self {
        Self { scene, handle }
    }

    #[inline]
    #[must_use]
    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    fn apply(self, f: impl FnOnce(&mut Transform)) -> Self {
        if let Err(err) = self.scene.modify_transform(self.handle, f) {
            log::warn!("Ignoring transform change on node {:?}: {err}", self.handle);
        }
        self
    }

    #[inline]
    pub fn set_position(self, position: Vec3) -> Self {
        self.apply(|t| t.position = position)
    }

    /// Euler angles in radians.
    #[inline]
    pub fn set_rotation(self, rotation: Vec3) -> Self {
        self.apply(|t| t.rotation = rotation)
    }

    #[inline]
    pub fn set_scale(self, scale: Vec3) -> Self {
        self.apply(|t| t.scale = scale)
    }

    #[inline]
    pub fn set_uniform_scale(self, s: f32) -> Self {
        self.apply(|t| t.scale = Vec3::splat(s))
    }

    /// Moves the node by `offset` (cumulative).
    #[inline]
    pub fn translate(self, offset: Vec3) -> Self {
        self.apply(|t| t.position += offset)
    }

    /// Adds `angles` to the Euler rotation (cumulative).
    #[inline]
    pub fn rotate(self, angles: Vec3) -> Self {
        self.apply(|t| t.rotation += angles)
    }
}
