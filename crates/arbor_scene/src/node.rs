use std::sync::Arc;

use glam::{Mat4, Vec3};

use arbor_resources::mesh::Mesh;

use crate::NodeHandle;
use crate::light::Light;
use crate::transform::Transform;

/// Flat-index bucket a node is registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    RenderOpaque,
    RenderTransparent,
    Light,
}

impl NodeType {
    pub const ALL: [Self; 3] = [Self::RenderOpaque, Self::RenderTransparent, Self::Light];

    #[inline]
    #[must_use]
    pub(crate) fn index(self) -> usize {
        match self {
            Self::RenderOpaque => 0,
            Self::RenderTransparent => 1,
            Self::Light => 2,
        }
    }
}

/// Drawable leaf: a shared mesh plus the transparency flag that picks its
/// bucket. Both are fixed at construction.
#[derive(Debug, Clone)]
pub struct RenderNode {
    mesh: Arc<Mesh>,
    transparent: bool,
}

impl RenderNode {
    #[must_use]
    pub fn new(mesh: Arc<Mesh>, transparent: bool) -> Self {
        Self { mesh, transparent }
    }

    #[inline]
    #[must_use]
    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    #[inline]
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.transparent
    }
}

#[derive(Debug, Clone)]
pub struct LightNode {
    pub light: Light,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Grouping node without a local transform.
    Group,
    /// The node owned by a [`Scene`](crate::scene::Scene).
    SceneRoot,
    Transform(Transform),
    /// Transform that counter-rotates against the scene camera.
    Billboard(Transform),
    Render(RenderNode),
    Light(LightNode),
}

impl NodeKind {
    #[must_use]
    pub fn render(mesh: Arc<Mesh>, transparent: bool) -> Self {
        Self::Render(RenderNode::new(mesh, transparent))
    }

    #[must_use]
    pub fn light(light: Light) -> Self {
        Self::Light(LightNode { light })
    }

    #[must_use]
    pub fn node_type(&self) -> Option<NodeType> {
        match self {
            Self::Render(r) if r.transparent => Some(NodeType::RenderTransparent),
            Self::Render(_) => Some(NodeType::RenderOpaque),
            Self::Light(_) => Some(NodeType::Light),
            Self::Group | Self::SceneRoot | Self::Transform(_) | Self::Billboard(_) => None,
        }
    }

    /// `None` means "no transform", which composes away instead of
    /// multiplying by identity.
    #[must_use]
    pub fn local_matrix(&self, camera_rotation: Option<Vec3>) -> Option<Mat4> {
        match self {
            Self::Transform(t) => Some(t.local_matrix()),
            Self::Billboard(t) => Some(match camera_rotation {
                Some(rotation) => t.billboard_matrix(rotation),
                None => t.local_matrix(),
            }),
            _ => None,
        }
    }
}

/// Lazily computed matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CachedMatrix {
    Stale,
    /// Computed value; `None` when nothing on the path has a transform.
    Ready(Option<Mat4>),
}

impl CachedMatrix {
    #[inline]
    #[must_use]
    pub fn get(self) -> Option<Option<Mat4>> {
        match self {
            Self::Stale => None,
            Self::Ready(m) => Some(m),
        }
    }
}

/// A scene graph node stored in the [`Scene`](crate::scene::Scene) arena.
///
/// Hierarchy links and caches are owned by the scene and only change through
/// its methods, which keep `root`, the flat index and the caches consistent.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,
    /// Topmost ancestor; the node itself when parentless.
    pub(crate) root: NodeHandle,
    pub(crate) kind: NodeKind,

    pub(crate) transform_cache: CachedMatrix,
    pub(crate) render_cache: CachedMatrix,
    /// View generation the render cache was computed against
    pub(crate) render_generation: u64,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, root: NodeHandle) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            root,
            kind,
            transform_cache: CachedMatrix::Stale,
            render_cache: CachedMatrix::Stale,
            render_generation: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[inline]
    #[must_use]
    pub fn node_type(&self) -> Option<NodeType> {
        self.kind.node_type()
    }

    #[must_use]
    pub fn transform(&self) -> Option<&Transform> {
        match &self.kind {
            NodeKind::Transform(t) | NodeKind::Billboard(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn render_node(&self) -> Option<&RenderNode> {
        match &self.kind {
            NodeKind::Render(r) => Some(r),
            _ => None,
        }
    }

    #[must_use]
    pub fn light(&self) -> Option<&Light> {
        match &self.kind {
            NodeKind::Light(l) => Some(&l.light),
            _ => None,
        }
    }

    /// Cached transform matrix, if computed.
    #[inline]
    #[must_use]
    pub fn cached_transform_matrix(&self) -> Option<Option<Mat4>> {
        self.transform_cache.get()
    }

    #[inline]
    pub(crate) fn invalidate(&mut self) {
        self.transform_cache = CachedMatrix::Stale;
        self.render_cache = CachedMatrix::Stale;
    }
}
