//! Rendering for Arbor scenes.
//!
//! - [`engine`]: [`RenderEngine`], one shader-bound pass over a scene's flat index
//! - [`lighting`]: light uniform upload and point-light slot allocation
//! - [`sort`]: draw-order policies
//! - [`uniforms`]: engine-defined uniform names

pub mod engine;
pub mod lighting;
pub mod sort;
pub mod uniforms;

pub use engine::{FrameStats, RenderEngine};
pub use lighting::{LightBinder, PointLightSlots};
pub use sort::{DepthSort, DrawLists, SortMethod, Unsorted};
pub use uniforms::{PointLightUniforms, UniformNames, standard_uniforms};
