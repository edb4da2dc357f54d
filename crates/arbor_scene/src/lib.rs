//! Hierarchical scene graph.
//!
//! - [`scene`]: the arena-backed [`Scene`] with its flat index and lazy
//!   matrix caches
//! - [`node`]: node data and kinds
//! - [`transform`], [`view`], [`light`]: values carried by nodes and the scene
//! - [`wrapper`]: chainable [`SceneNode`] editing

pub mod flat_index;
pub mod light;
pub mod node;
pub mod scene;
pub mod transform;
pub(crate) mod transform_system;
pub mod view;
pub mod wrapper;

slotmap::new_key_type! {
    /// Stable handle to a node in a [`Scene`].
    pub struct NodeHandle;
}

pub use flat_index::FlatIndex;
pub use light::{Attenuation, DirectionalLight, Light, LightKind, PointLight};
pub use node::{CachedMatrix, LightNode, Node, NodeKind, NodeType, RenderNode};
pub use scene::Scene;
pub use transform::Transform;
pub use view::{Camera, CameraKind, ProjectionType, View};
pub use wrapper::SceneNode;
