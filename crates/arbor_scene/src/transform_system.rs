//! Matrix propagation through the node hierarchy.
//!
//! Kept apart from [`Scene`](crate::scene::Scene) so the walk only borrows
//! the node arena plus a snapshot of the view state, not the whole scene.

use glam::{Mat4, Vec3};
use slotmap::SlotMap;

use arbor_core::math::compose;

use crate::NodeHandle;
use crate::node::{CachedMatrix, Node};

/// Everything the per-node matrix computation needs from the scene.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ViewState {
    pub scene_root: NodeHandle,
    pub view_matrix: Option<Mat4>,
    pub camera_rotation: Option<Vec3>,
    pub generation: u64,
}

impl ViewState {
    /// Local matrix of `node`. Billboards only see the camera when they live
    /// under the scene root.
    #[inline]
    pub fn local_matrix(&self, node: &Node) -> Option<Mat4> {
        let camera_rotation = if node.root == self.scene_root {
            self.camera_rotation
        } else {
            None
        };
        node.kind.local_matrix(camera_rotation)
    }

    /// Render matrix for a node under `root` with the given transform matrix.
    #[inline]
    pub fn render_matrix(&self, root: NodeHandle, transform: Option<Mat4>) -> Option<Mat4> {
        if root == self.scene_root {
            compose(self.view_matrix, transform)
        } else {
            transform
        }
    }
}

/// Recomputes transform and render matrices of `start` and its whole
/// subtree, depth-first pre-order with children in insertion order.
///
/// Uses an explicit stack so deep hierarchies cannot overflow the call
/// stack. `parent_transform` is the transform matrix of `start`'s parent.
pub(crate) fn update_hierarchy(
    nodes: &mut SlotMap<NodeHandle, Node>,
    start: NodeHandle,
    parent_transform: Option<Mat4>,
    state: &ViewState,
) -> usize {
    let mut stack: Vec<(NodeHandle, Option<Mat4>)> = Vec::with_capacity(64);
    stack.push((start, parent_transform));
    let mut visited = 0;

    while let Some((handle, parent_transform)) = stack.pop() {
        let Some(node) = nodes.get_mut(handle) else {
            continue;
        };

        let transform = compose(parent_transform, state.local_matrix(node));
        node.transform_cache = CachedMatrix::Ready(transform);
        node.render_cache = CachedMatrix::Ready(state.render_matrix(node.root, transform));
        node.render_generation = state.generation;
        visited += 1;

        // Reverse push keeps insertion order on pop
        for &child in node.children.iter().rev() {
            stack.push((child, transform));
        }
    }

    visited
}

/// Marks `start` and every descendant stale.
pub(crate) fn invalidate_subtree(nodes: &mut SlotMap<NodeHandle, Node>, start: NodeHandle) {
    let mut stack = vec![start];
    while let Some(handle) = stack.pop() {
        if let Some(node) = nodes.get_mut(handle) {
            node.invalidate();
            stack.extend_from_slice(&node.children);
        }
    }
}

/// `start` followed by all its descendants in depth-first pre-order.
pub(crate) fn collect_subtree(nodes: &SlotMap<NodeHandle, Node>, start: NodeHandle) -> Vec<NodeHandle> {
    let mut out = Vec::new();
    let mut stack = vec![start];
    while let Some(handle) = stack.pop() {
        if let Some(node) = nodes.get(handle) {
            out.push(handle);
            stack.extend(node.children.iter().rev());
        }
    }
    out
}
