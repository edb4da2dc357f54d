//! Engine-defined uniform names.
//!
//! Names are built once from [`EngineSettings`] so the per-frame path never
//! formats strings.

use arbor_core::settings::EngineSettings;
use arbor_resources::backend::UniformKind;

/// Uniforms of one `PointLights[i]` array element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointLightUniforms {
    pub color: String,
    pub intensity: String,
    pub position: String,
    pub specular_power: String,
    pub attenuation_constant: String,
    pub attenuation_linear: String,
    pub attenuation_exponent: String,
}

impl PointLightUniforms {
    fn new(settings: &EngineSettings, slot: usize) -> Self {
        let field = |name: &str| settings.uniform_name(&format!("PointLights[{slot}].{name}"));
        Self {
            color: field("color"),
            intensity: field("intensity"),
            position: field("position"),
            specular_power: field("specularPower"),
            attenuation_constant: field("attenuationConstant"),
            attenuation_linear: field("attenuationLinear"),
            attenuation_exponent: field("attenuationExponent"),
        }
    }

    fn declarations(&self) -> [(String, UniformKind); 7] {
        [
            (self.color.clone(), UniformKind::Vec3),
            (self.intensity.clone(), UniformKind::Float),
            (self.position.clone(), UniformKind::Vec3),
            (self.specular_power.clone(), UniformKind::Float),
            (self.attenuation_constant.clone(), UniformKind::Float),
            (self.attenuation_linear.clone(), UniformKind::Float),
            (self.attenuation_exponent.clone(), UniformKind::Float),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformNames {
    /// Render matrix of the drawn node
    pub transformation: String,
    /// Transform (world) matrix of the drawn node
    pub local_transformation: String,
    pub camera_pos: String,
    pub tex_sampler: String,

    pub ambient_color: String,
    pub ambient_intensity: String,

    pub directional_color: String,
    pub directional_intensity: String,
    pub directional_normal: String,
    pub directional_specular_power: String,

    /// One entry per point-light slot
    pub point_lights: Vec<PointLightUniforms>,
}

impl UniformNames {
    #[must_use]
    pub fn new(settings: &EngineSettings) -> Self {
        let name = |n: &str| settings.uniform_name(n);
        Self {
            transformation: name("Transformation"),
            local_transformation: name("LocalTransformation"),
            camera_pos: name("CameraPos"),
            tex_sampler: name("TexSampler"),
            ambient_color: name("AmbientLight.color"),
            ambient_intensity: name("AmbientLight.intensity"),
            directional_color: name("DirectionalLight.color"),
            directional_intensity: name("DirectionalLight.intensity"),
            directional_normal: name("DirectionalLight.normal"),
            directional_specular_power: name("DirectionalLight.specularPower"),
            point_lights: (0..settings.max_point_lights)
                .map(|slot| PointLightUniforms::new(settings, slot))
                .collect(),
        }
    }

    /// Every uniform the engine uploads, with its kind.
    #[must_use]
    pub fn declarations(&self) -> Vec<(String, UniformKind)> {
        let mut out = vec![
            (self.transformation.clone(), UniformKind::Mat4),
            (self.local_transformation.clone(), UniformKind::Mat4),
            (self.camera_pos.clone(), UniformKind::Vec3),
            (self.tex_sampler.clone(), UniformKind::Int),
            (self.ambient_color.clone(), UniformKind::Vec3),
            (self.ambient_intensity.clone(), UniformKind::Float),
            (self.directional_color.clone(), UniformKind::Vec3),
            (self.directional_intensity.clone(), UniformKind::Float),
            (self.directional_normal.clone(), UniformKind::Vec3),
            (self.directional_specular_power.clone(), UniformKind::Float),
        ];
        for point in &self.point_lights {
            out.extend(point.declarations());
        }
        out
    }
}

/// Uniform declarations a shader needs to be driven by the render engine.
///
/// ```rust,ignore
/// let shader = Shader::new(VS, FS).with_uniforms(standard_uniforms(&settings));
/// ```
#[must_use]
pub fn standard_uniforms(settings: &EngineSettings) -> Vec<(String, UniformKind)> {
    UniformNames::new(settings).declarations()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_use_prefix() {
        let names = UniformNames::new(&EngineSettings::default());
        assert_eq!(names.transformation, "ARBOR_Transformation");
        assert_eq!(names.ambient_color, "ARBOR_AmbientLight.color");
        assert_eq!(names.point_lights[2].position, "ARBOR_PointLights[2].position");
        assert_eq!(
            names.point_lights[0].attenuation_exponent,
            "ARBOR_PointLights[0].attenuationExponent"
        );
    }

    #[test]
    fn declarations_cover_every_slot() {
        let settings = EngineSettings {
            max_point_lights: 2,
            uniform_prefix: "X_".into(),
            ..Default::default()
        };
        let decls = standard_uniforms(&settings);
        assert_eq!(decls.len(), 10 + 2 * 7);
        assert!(decls.contains(&("X_TexSampler".to_string(), UniformKind::Int)));
        assert!(decls.contains(&("X_PointLights[1].specularPower".to_string(), UniformKind::Float)));
    }
}
