use std::sync::Arc;

use glam::{Mat4, Vec3};
use rustc_hash::FxHashSet;
use slotmap::SlotMap;

use arbor_core::errors::{ArborError, Result};
use arbor_core::math::{compose, transform_point, translation_of};
use arbor_resources::mesh::Mesh;

use crate::NodeHandle;
use crate::flat_index::FlatIndex;
use crate::light::Light;
use crate::node::{CachedMatrix, Node, NodeKind, NodeType};
use crate::transform::Transform;
use crate::transform_system::{self, ViewState};
use crate::view::{Camera, View};
use crate::wrapper::SceneNode;

/// Scene graph.
///
/// All nodes live in one arena and are addressed by [`NodeHandle`]. The
/// scene's own root node is part of the arena, so "the scene" is also a node
/// that others can be attached to. Nodes created without a parent are
/// standalone roots: they live in the same arena but are not part of the
/// scene tree and never appear in the flat index.
///
/// # Invariants
///
/// - `root` of every node is its parent's `root`, or the node itself when
///   parentless. Reparenting rewrites it for the whole moved subtree.
/// - The flat index holds exactly the live typed nodes whose root is the
///   scene root, and `billboards` exactly the live billboards under it.
/// - Cached matrices are either `Stale` or reflect the current transforms.
///   Transform edits stale the edited subtree; view and camera edits bump a
///   generation counter that stales every render matrix at once.
pub struct Scene {
    nodes: SlotMap<NodeHandle, Node>,
    root: NodeHandle,

    view: Option<View>,
    camera: Option<Camera>,
    view_generation: u64,

    flat_nodes: FlatIndex,
    /// Billboards under the scene root, invalidated on camera changes.
    billboards: FxHashSet<NodeHandle>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert_with_key(|key| Node::new(NodeKind::SceneRoot, key));
        Self {
            nodes,
            root,
            view: None,
            camera: None,
            view_generation: 1,
            flat_nodes: FlatIndex::new(),
            billboards: FxHashSet::default(),
        }
    }

    #[must_use]
    pub fn with_view(view: Option<View>, camera: Option<Camera>) -> Self {
        let mut scene = Self::new();
        scene.view = view;
        scene.camera = camera;
        scene
    }

    /// The scene's own root node.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// Number of live nodes, including the scene root and standalone roots.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.nodes.iter()
    }

    fn node_ref(&self, handle: NodeHandle) -> Result<&Node> {
        self.nodes.get(handle).ok_or(ArborError::NodeNotFound)
    }

    /// Root of the tree `handle` belongs to.
    #[must_use]
    pub fn root_of(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(handle).map(|n| n.root)
    }

    /// Whether `handle` is part of this scene's tree.
    #[must_use]
    pub fn is_in_scene(&self, handle: NodeHandle) -> bool {
        self.root_of(handle) == Some(self.root)
    }

    #[must_use]
    pub fn node_type(&self, handle: NodeHandle) -> Option<NodeType> {
        self.nodes.get(handle).and_then(Node::node_type)
    }

    /// Chainable transform editing for `handle`.
    pub fn node(&mut self, handle: NodeHandle) -> SceneNode<'_> {
        SceneNode::new(self, handle)
    }

    // ========================================================================
    // View & Camera
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn view(&self) -> Option<&View> {
        self.view.as_ref()
    }

    pub fn set_view(&mut self, view: Option<View>) {
        self.view = view;
        self.view_generation += 1;
    }

    /// Mutable access to the view. Every render matrix is recomputed on the
    /// next read.
    pub fn view_mut(&mut self) -> Option<&mut View> {
        self.view_generation += 1;
        self.view.as_mut()
    }

    #[inline]
    #[must_use]
    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    pub fn set_camera(&mut self, camera: Option<Camera>) {
        self.camera = camera;
        self.camera_changed();
    }

    /// Mutable access to the camera. Render matrices and billboard
    /// transforms are recomputed on the next read.
    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera_changed();
        self.camera.as_mut()
    }

    fn camera_changed(&mut self) {
        self.view_generation += 1;
        for &handle in &self.billboards {
            transform_system::invalidate_subtree(&mut self.nodes, handle);
        }
    }

    /// `view * camera`, or whichever of the two exists.
    #[must_use]
    pub fn view_matrix(&self) -> Option<Mat4> {
        compose(
            self.view.as_ref().map(View::matrix),
            self.camera.as_ref().map(Camera::matrix),
        )
    }

    fn view_state(&self) -> ViewState {
        ViewState {
            scene_root: self.root,
            view_matrix: self.view_matrix(),
            camera_rotation: self.camera.as_ref().map(Camera::rotation),
            generation: self.view_generation,
        }
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Inserts a node under `parent`, or as a standalone root when `parent`
    /// is `None`.
    pub fn add_node(&mut self, kind: NodeKind, parent: Option<NodeHandle>) -> Result<NodeHandle> {
        if matches!(kind, NodeKind::SceneRoot) {
            return Err(ArborError::InvalidOperation(
                "a scene has exactly one scene root node".into(),
            ));
        }
        if let Some(parent) = parent {
            self.node_ref(parent)?;
        }

        let handle = self.nodes.insert_with_key(|key| Node::new(kind, key));
        if parent.is_some() {
            self.set_parent(handle, parent)?;
        }
        Ok(handle)
    }

    pub fn add_group(&mut self, parent: Option<NodeHandle>) -> Result<NodeHandle> {
        self.add_node(NodeKind::Group, parent)
    }

    pub fn add_transform(&mut self, transform: Transform, parent: Option<NodeHandle>) -> Result<NodeHandle> {
        self.add_node(NodeKind::Transform(transform), parent)
    }

    pub fn add_billboard(&mut self, transform: Transform, parent: Option<NodeHandle>) -> Result<NodeHandle> {
        self.add_node(NodeKind::Billboard(transform), parent)
    }

    pub fn add_render(
        &mut self,
        mesh: Arc<Mesh>,
        transparent: bool,
        parent: Option<NodeHandle>,
    ) -> Result<NodeHandle> {
        self.add_node(NodeKind::render(mesh, transparent), parent)
    }

    pub fn add_light(&mut self, light: Light, parent: Option<NodeHandle>) -> Result<NodeHandle> {
        self.add_node(NodeKind::light(light), parent)
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Moves `handle` (with its subtree) under `parent`, or makes it a
    /// standalone root when `parent` is `None`.
    ///
    /// The subtree's `root`, flat-index membership and matrix caches are
    /// updated in the same call.
    pub fn set_parent(&mut self, handle: NodeHandle, parent: Option<NodeHandle>) -> Result<()> {
        let old_parent = self.node_ref(handle)?.parent;
        if let Some(p) = parent {
            self.node_ref(p)?;
        }
        if handle == self.root {
            return Err(ArborError::InvalidOperation("the scene root cannot be reparented".into()));
        }
        if let Some(p) = parent
            && (p == handle || self.is_ancestor(handle, p))
        {
            return Err(ArborError::InvalidOperation(
                "a node cannot become a child of itself or its descendant".into(),
            ));
        }
        if old_parent == parent {
            return Ok(());
        }

        // 1. Unlink from the old parent, keeping sibling order
        if let Some(old) = old_parent
            && let Some(old_node) = self.nodes.get_mut(old)
            && let Some(pos) = old_node.children.iter().position(|&c| c == handle)
        {
            old_node.children.remove(pos);
        }

        // 2. Link to the new parent
        let new_root = match parent {
            Some(p) => {
                let parent_node = &mut self.nodes[p];
                parent_node.children.push(handle);
                parent_node.root
            }
            None => handle,
        };
        self.nodes[handle].parent = parent;

        // 3. Propagate root, flat-index membership and cache invalidation
        for h in transform_system::collect_subtree(&self.nodes, handle) {
            let node = &mut self.nodes[h];
            let old_root = node.root;
            node.root = new_root;
            node.invalidate();

            if old_root == new_root {
                continue;
            }
            if let Some(node_type) = node.node_type() {
                if old_root == self.root {
                    self.flat_nodes.remove(node_type, h);
                }
                if new_root == self.root {
                    self.flat_nodes.insert(node_type, h);
                }
            }
            if matches!(node.kind, NodeKind::Billboard(_)) {
                if new_root == self.root {
                    self.billboards.insert(h);
                } else {
                    self.billboards.remove(&h);
                }
            }
        }

        log::debug!("Reparented node {handle:?}: {old_parent:?} -> {parent:?}");
        Ok(())
    }

    /// Shorthand for `set_parent(child, Some(parent))`.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) -> Result<()> {
        self.set_parent(child, Some(parent))
    }

    /// Shorthand for `set_parent(handle, None)`.
    pub fn detach(&mut self, handle: NodeHandle) -> Result<()> {
        self.set_parent(handle, None)
    }

    /// Whether `ancestor` lies on the parent chain of `node`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = self.nodes.get(node).and_then(|n| n.parent);
        while let Some(h) = current {
            if h == ancestor {
                return true;
            }
            current = self.nodes.get(h).and_then(|n| n.parent);
        }
        false
    }

    /// Destroys `handle` and its whole subtree.
    pub fn remove_node(&mut self, handle: NodeHandle) -> Result<()> {
        let parent = self.node_ref(handle)?.parent;
        if handle == self.root {
            return Err(ArborError::InvalidOperation("the scene root cannot be removed".into()));
        }

        if let Some(p) = parent
            && let Some(parent_node) = self.nodes.get_mut(p)
            && let Some(pos) = parent_node.children.iter().position(|&c| c == handle)
        {
            parent_node.children.remove(pos);
        }

        let subtree = transform_system::collect_subtree(&self.nodes, handle);
        for &h in &subtree {
            if let Some(node) = self.nodes.remove(h)
                && node.root == self.root
            {
                if let Some(node_type) = node.node_type() {
                    self.flat_nodes.remove(node_type, h);
                }
                self.billboards.remove(&h);
            }
        }

        log::debug!("Removed node {handle:?} ({} nodes destroyed)", subtree.len());
        Ok(())
    }

    /// Descendants of `handle` in depth-first pre-order, excluding itself.
    #[must_use]
    pub fn descendants(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        let mut all = transform_system::collect_subtree(&self.nodes, handle);
        if !all.is_empty() {
            all.remove(0);
        }
        all
    }

    // ========================================================================
    // Flat Index
    // ========================================================================

    /// Live nodes of `node_type` anywhere under the scene root.
    #[inline]
    #[must_use]
    pub fn flat_nodes(&self, node_type: NodeType) -> &[NodeHandle] {
        self.flat_nodes.get(node_type)
    }

    #[inline]
    #[must_use]
    pub fn flat_index(&self) -> &FlatIndex {
        &self.flat_nodes
    }

    // ========================================================================
    // Node Data
    // ========================================================================

    #[must_use]
    pub fn transform(&self, handle: NodeHandle) -> Option<&Transform> {
        self.nodes.get(handle).and_then(Node::transform)
    }

    pub fn set_transform(&mut self, handle: NodeHandle, transform: Transform) -> Result<()> {
        self.modify_transform(handle, |t| *t = transform)
    }

    /// Applies `f` to the transform of `handle` and stales its subtree.
    pub fn modify_transform(&mut self, handle: NodeHandle, f: impl FnOnce(&mut Transform)) -> Result<()> {
        let node = self.nodes.get_mut(handle).ok_or(ArborError::NodeNotFound)?;
        match &mut node.kind {
            NodeKind::Transform(t) | NodeKind::Billboard(t) => f(t),
            _ => {
                return Err(ArborError::InvalidOperation(format!(
                    "node {handle:?} has no transform"
                )));
            }
        }
        transform_system::invalidate_subtree(&mut self.nodes, handle);
        Ok(())
    }

    #[must_use]
    pub fn light(&self, handle: NodeHandle) -> Option<&Light> {
        self.nodes.get(handle).and_then(Node::light)
    }

    /// Light parameters do not affect any matrix, so no cache is touched.
    pub fn light_mut(&mut self, handle: NodeHandle) -> Option<&mut Light> {
        match &mut self.nodes.get_mut(handle)?.kind {
            NodeKind::Light(l) => Some(&mut l.light),
            _ => None,
        }
    }

    // ========================================================================
    // Matrices
    // ========================================================================

    /// Stale nodes from `handle` up to (excluding) the first ancestor with a
    /// cached transform, plus that cached value.
    fn stale_transform_path(&self, handle: NodeHandle) -> Result<(Vec<NodeHandle>, Option<Mat4>)> {
        let mut path = Vec::new();
        let mut current = handle;
        loop {
            let node = self.node_ref(current)?;
            if let CachedMatrix::Ready(m) = node.transform_cache {
                return Ok((path, m));
            }
            path.push(current);
            match node.parent {
                Some(p) => current = p,
                None => return Ok((path, None)),
            }
        }
    }

    /// Local-to-world matrix of `handle`, computing and caching it (and any
    /// stale ancestor) on a miss. Works on a never-updated tree.
    pub fn transform_matrix(&mut self, handle: NodeHandle) -> Result<Option<Mat4>> {
        let (path, mut acc) = self.stale_transform_path(handle)?;
        let state = self.view_state();
        for &h in path.iter().rev() {
            if let Some(node) = self.nodes.get_mut(h) {
                acc = compose(acc, state.local_matrix(node));
                node.transform_cache = CachedMatrix::Ready(acc);
            }
        }
        Ok(acc)
    }

    /// Scene-space matrix of `handle` (`view_matrix * transform_matrix` for
    /// nodes under the scene root), computed and cached on a miss.
    pub fn render_matrix(&mut self, handle: NodeHandle) -> Result<Option<Mat4>> {
        let node = self.node_ref(handle)?;
        if node.render_generation == self.view_generation
            && let CachedMatrix::Ready(m) = node.render_cache
        {
            return Ok(m);
        }

        let transform = self.transform_matrix(handle)?;
        let state = self.view_state();
        let node = self.nodes.get_mut(handle).ok_or(ArborError::NodeNotFound)?;
        let render = state.render_matrix(node.root, transform);
        node.render_cache = CachedMatrix::Ready(render);
        node.render_generation = state.generation;
        Ok(render)
    }

    /// Like [`transform_matrix`](Self::transform_matrix) but never writes
    /// the cache, for read-only consumers.
    pub fn resolve_transform_matrix(&self, handle: NodeHandle) -> Result<Option<Mat4>> {
        let (path, mut acc) = self.stale_transform_path(handle)?;
        let state = self.view_state();
        for &h in path.iter().rev() {
            acc = compose(acc, state.local_matrix(&self.nodes[h]));
        }
        Ok(acc)
    }

    /// Like [`render_matrix`](Self::render_matrix) but never writes the
    /// cache, for read-only consumers.
    pub fn resolve_render_matrix(&self, handle: NodeHandle) -> Result<Option<Mat4>> {
        let node = self.node_ref(handle)?;
        if node.render_generation == self.view_generation
            && let CachedMatrix::Ready(m) = node.render_cache
        {
            return Ok(m);
        }
        let transform = self.resolve_transform_matrix(handle)?;
        Ok(self.view_state().render_matrix(node.root, transform))
    }

    /// Origin of `handle` in world space.
    pub fn world_position(&self, handle: NodeHandle) -> Result<Vec3> {
        Ok(self
            .resolve_transform_matrix(handle)?
            .map_or(Vec3::ZERO, |m| translation_of(&m)))
    }

    /// Origin of `handle` after the render matrix.
    pub fn render_position(&self, handle: NodeHandle) -> Result<Vec3> {
        Ok(self
            .resolve_render_matrix(handle)?
            .map_or(Vec3::ZERO, |m| transform_point(&m, Vec3::ZERO)))
    }

    /// Distance of `handle`'s origin in front of the camera. Larger is
    /// farther away. Without a camera the world -z axis is used.
    pub fn view_depth(&self, handle: NodeHandle) -> Result<f32> {
        let world = self.world_position(handle)?;
        let eye_space = match &self.camera {
            Some(camera) => transform_point(&camera.matrix(), world),
            None => world,
        };
        Ok(-eye_space.z)
    }

    // ========================================================================
    // Update
    // ========================================================================

    /// Recomputes every matrix in the scene tree, top-down, children in
    /// insertion order. The view matrix is computed once before descending.
    pub fn update(&mut self) {
        let state = self.view_state();
        let visited = transform_system::update_hierarchy(&mut self.nodes, self.root, None, &state);
        log::trace!("Scene update visited {visited} nodes");
    }

    /// Recomputes `handle` and its subtree. Usable on standalone roots,
    /// which [`update`](Self::update) does not reach.
    pub fn update_subtree(&mut self, handle: NodeHandle) -> Result<()> {
        let parent_transform = match self.node_ref(handle)?.parent {
            Some(p) => self.transform_matrix(p)?,
            None => None,
        };
        let state = self.view_state();
        transform_system::update_hierarchy(&mut self.nodes, handle, parent_transform, &state);
        Ok(())
    }
}
