//! Foundational types shared by the Arbor crates: math helpers, the error
//! type, engine settings and the frame clock.

pub mod errors;
pub mod math;
pub mod settings;
pub mod time;

pub use errors::{ArborError, Result};
pub use settings::{EngineSettings, LightOverflowPolicy};
pub use time::FrameClock;
