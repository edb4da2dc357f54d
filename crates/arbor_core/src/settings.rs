//! Engine Settings
//!
//! Runtime configuration for the render engine.
//!
//! ```rust,ignore
//! use arbor_core::settings::{EngineSettings, LightOverflowPolicy};
//!
//! // Defaults: 4 point lights, depth sorting on, overflow is an error
//! let settings = EngineSettings::default();
//!
//! // Skip point lights beyond the limit instead of failing the frame
//! let settings = EngineSettings {
//!     max_point_lights: 8,
//!     light_overflow: LightOverflowPolicy::Skip,
//!     ..Default::default()
//! };
//!
//! // Or from JSON; missing fields fall back to the defaults
//! let settings = EngineSettings::from_json(r#"{ "depth_sort": false }"#)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{ArborError, Result};

/// What the render engine does when more point lights are registered than
/// there are shader slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightOverflowPolicy {
    /// Abort the frame with [`ArborError::TooManyLights`].
    #[default]
    Error,
    /// Log a warning and leave the excess light unbound for this frame.
    Skip,
}

/// Render engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Number of `PointLights[i]` slots declared by the shader.
    pub max_point_lights: usize,
    /// Prefix prepended to every engine-defined uniform name.
    pub uniform_prefix: String,
    /// Sort opaque nodes front-to-back and transparent nodes back-to-front.
    pub depth_sort: bool,
    /// Behaviour when the point-light slots run out.
    pub light_overflow: LightOverflowPolicy,
    /// Texture unit bound to the sampler uniform.
    pub texture_unit: i32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_point_lights: 4,
            uniform_prefix: "ARBOR_".to_string(),
            depth_sort: true,
            light_overflow: LightOverflowPolicy::Error,
            texture_unit: 0,
        }
    }
}

impl EngineSettings {
    /// Parses settings from JSON and validates them.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        log::debug!(
            "Loaded engine settings: {} point lights, prefix {:?}, depth sort {}",
            settings.max_point_lights,
            settings.uniform_prefix,
            settings.depth_sort
        );
        Ok(settings)
    }

    /// Serializes the settings to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_point_lights == 0 {
            return Err(ArborError::Config("max_point_lights must be at least 1".into()));
        }
        if self.texture_unit < 0 {
            return Err(ArborError::Config(format!(
                "texture_unit must be non-negative, got {}",
                self.texture_unit
            )));
        }
        Ok(())
    }

    /// Returns `name` with the configured uniform prefix.
    #[inline]
    #[must_use]
    pub fn uniform_name(&self, name: &str) -> String {
        format!("{}{name}", self.uniform_prefix)
    }
}
