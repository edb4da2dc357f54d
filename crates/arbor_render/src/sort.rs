//! Draw-order policies.

use arbor_core::errors::Result;
use arbor_scene::{NodeHandle, Scene};

/// Opaque and transparent draw lists, in that order.
pub type DrawLists = (Vec<NodeHandle>, Vec<NodeHandle>);

/// Reorders the opaque and transparent draw lists before a frame. An error
/// aborts the frame.
///
/// Any infallible `Fn(&Scene, Vec<NodeHandle>, Vec<NodeHandle>) ->
/// (Vec<NodeHandle>, Vec<NodeHandle>)` closure is a sort method.
pub trait SortMethod {
    fn sort(&self, scene: &Scene, opaque: Vec<NodeHandle>, transparent: Vec<NodeHandle>) -> Result<DrawLists>;
}

impl<F> SortMethod for F
where
    F: Fn(&Scene, Vec<NodeHandle>, Vec<NodeHandle>) -> (Vec<NodeHandle>, Vec<NodeHandle>),
{
    fn sort(&self, scene: &Scene, opaque: Vec<NodeHandle>, transparent: Vec<NodeHandle>) -> Result<DrawLists> {
        Ok(self(scene, opaque, transparent))
    }
}

/// Opaque front-to-back (early depth rejection), transparent back-to-front
/// (required for correct blending). Ties keep flat-index order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepthSort;

impl DepthSort {
    fn by_depth(scene: &Scene, nodes: Vec<NodeHandle>, descending: bool) -> Result<Vec<NodeHandle>> {
        let mut keyed = nodes
            .into_iter()
            .map(|h| -> Result<(f32, NodeHandle)> { Ok((scene.view_depth(h)?, h)) })
            .collect::<Result<Vec<_>>>()?;
        keyed.sort_by(|a, b| {
            let order = a.0.total_cmp(&b.0);
            if descending { order.reverse() } else { order }
        });
        Ok(keyed.into_iter().map(|(_, h)| h).collect())
    }
}

impl SortMethod for DepthSort {
    fn sort(&self, scene: &Scene, opaque: Vec<NodeHandle>, transparent: Vec<NodeHandle>) -> Result<DrawLists> {
        Ok((
            Self::by_depth(scene, opaque, false)?,
            Self::by_depth(scene, transparent, true)?,
        ))
    }
}

/// Leaves both lists in flat-index order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsorted;

impl SortMethod for Unsorted {
    fn sort(&self, _scene: &Scene, opaque: Vec<NodeHandle>, transparent: Vec<NodeHandle>) -> Result<DrawLists> {
        Ok((opaque, transparent))
    }
}
