use glam::Vec3;

/// Distance falloff of a point light: `1 / (constant + linear * d + exponent * d²)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub exponent: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.0,
            exponent: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    pub normal: Vec3,
    pub specular_power: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    pub specular_power: f32,
    pub attenuation: Attenuation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LightKind {
    Ambient,
    Directional(DirectionalLight),
    /// Positioned by the world transform of the owning light node.
    Point(PointLight),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,
}

impl Light {
    pub const DEFAULT_SPECULAR_POWER: f32 = 32.0;

    #[must_use]
    pub fn new_ambient(color: Vec3, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Ambient,
        }
    }

    #[must_use]
    pub fn new_directional(color: Vec3, intensity: f32, normal: Vec3) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Directional(DirectionalLight {
                normal,
                specular_power: Self::DEFAULT_SPECULAR_POWER,
            }),
        }
    }

    #[must_use]
    pub fn new_point(color: Vec3, intensity: f32, attenuation: Attenuation) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Point(PointLight {
                specular_power: Self::DEFAULT_SPECULAR_POWER,
                attenuation,
            }),
        }
    }

    #[must_use]
    pub fn with_specular_power(mut self, power: f32) -> Self {
        match &mut self.kind {
            LightKind::Directional(d) => d.specular_power = power,
            LightKind::Point(p) => p.specular_power = power,
            LightKind::Ambient => {}
        }
        self
    }

    #[inline]
    #[must_use]
    pub fn is_point(&self) -> bool {
        matches!(self.kind, LightKind::Point(_))
    }
}
