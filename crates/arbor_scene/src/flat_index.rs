//! Per-type node lists maintained incrementally by the scene.

use rustc_hash::FxHashMap;

use crate::NodeHandle;
use crate::node::NodeType;

#[derive(Debug, Default, Clone)]
struct Bucket {
    nodes: Vec<NodeHandle>,
    positions: FxHashMap<NodeHandle, usize>,
}

impl Bucket {
    fn insert(&mut self, handle: NodeHandle) -> bool {
        if self.positions.contains_key(&handle) {
            return false;
        }
        self.positions.insert(handle, self.nodes.len());
        self.nodes.push(handle);
        true
    }

    fn remove(&mut self, handle: NodeHandle) -> bool {
        let Some(pos) = self.positions.remove(&handle) else {
            return false;
        };
        self.nodes.remove(pos);
        for &shifted in &self.nodes[pos..] {
            if let Some(p) = self.positions.get_mut(&shifted) {
                *p -= 1;
            }
        }
        true
    }
}

/// Fixed table of one bucket per [`NodeType`]. Each bucket lists its nodes
/// in registration order. Insert and lookup are O(1); removal shifts the
/// later entries down and is linear in the bucket length.
#[derive(Debug, Default, Clone)]
pub struct FlatIndex {
    buckets: [Bucket; 3],
}

impl FlatIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the node was already registered.
    pub fn insert(&mut self, node_type: NodeType, handle: NodeHandle) -> bool {
        self.buckets[node_type.index()].insert(handle)
    }

    /// Returns `false` if the node was not registered.
    pub fn remove(&mut self, node_type: NodeType, handle: NodeHandle) -> bool {
        self.buckets[node_type.index()].remove(handle)
    }

    #[must_use]
    pub fn contains(&self, node_type: NodeType, handle: NodeHandle) -> bool {
        self.buckets[node_type.index()].positions.contains_key(&handle)
    }

    #[must_use]
    pub fn get(&self, node_type: NodeType) -> &[NodeHandle] {
        &self.buckets[node_type.index()].nodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.nodes.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
