//! Light uniform binding.
//!
//! Ambient and directional lights write fixed uniforms. Point lights write
//! into a `PointLights[i]` array element, where `i` comes from a bounded
//! slot allocator: a light keeps its slot while it stays bound, and a
//! released slot is handed to the next light that asks for one.

use arbor_core::errors::{ArborError, Result};
use arbor_core::settings::LightOverflowPolicy;
use arbor_resources::backend::{GpuContext, GraphicsBackend};
use arbor_resources::shader::Shader;
use arbor_scene::light::LightKind;
use arbor_scene::{NodeHandle, Scene};

use crate::uniforms::UniformNames;

/// Fixed-size table of point-light slots.
#[derive(Debug, Clone)]
pub struct PointLightSlots {
    slots: Vec<Option<NodeHandle>>,
}

impl PointLightSlots {
    #[must_use]
    pub fn new(max: usize) -> Self {
        Self {
            slots: vec![None; max],
        }
    }

    #[inline]
    #[must_use]
    pub fn max(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn slot_of(&self, light: NodeHandle) -> Option<usize> {
        self.slots.iter().position(|s| *s == Some(light))
    }

    /// Slot of `light`, assigning the lowest free one if it has none yet.
    pub fn bind(&mut self, light: NodeHandle) -> Result<usize> {
        if let Some(slot) = self.slot_of(light) {
            return Ok(slot);
        }
        let slot = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(ArborError::TooManyLights { max: self.max() })?;
        self.slots[slot] = Some(light);
        Ok(slot)
    }

    /// Frees the slot of `light`, returning it.
    pub fn release(&mut self, light: NodeHandle) -> Option<usize> {
        let slot = self.slot_of(light)?;
        self.slots[slot] = None;
        Some(slot)
    }

    /// `(slot, light)` pairs currently in use.
    pub fn bound(&self) -> impl Iterator<Item = (usize, NodeHandle)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|h| (i, h)))
    }

    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

/// Uploads scene lights to a shader and owns the point-light slots.
#[derive(Debug, Clone)]
pub struct LightBinder {
    slots: PointLightSlots,
    overflow: LightOverflowPolicy,
}

impl LightBinder {
    #[must_use]
    pub fn new(max_point_lights: usize, overflow: LightOverflowPolicy) -> Self {
        Self {
            slots: PointLightSlots::new(max_point_lights),
            overflow,
        }
    }

    #[inline]
    #[must_use]
    pub fn slots(&self) -> &PointLightSlots {
        &self.slots
    }

    /// Uploads the light stored at `handle`. Returns `false` when nothing was
    /// bound: the node is not a light, or a point light was skipped because
    /// every slot is taken and the overflow policy is `Skip`.
    pub fn bind<B: GraphicsBackend>(
        &mut self,
        scene: &Scene,
        handle: NodeHandle,
        shader: &Shader,
        ctx: &mut GpuContext<B>,
        names: &UniformNames,
    ) -> Result<bool> {
        let Some(light) = scene.light(handle) else {
            return Ok(false);
        };

        match &light.kind {
            LightKind::Ambient => {
                shader.uniform(ctx, &names.ambient_color, light.color)?;
                shader.uniform(ctx, &names.ambient_intensity, light.intensity)?;
            }
            LightKind::Directional(d) => {
                shader.uniform(ctx, &names.directional_color, light.color)?;
                shader.uniform(ctx, &names.directional_intensity, light.intensity)?;
                shader.uniform(ctx, &names.directional_normal, d.normal)?;
                shader.uniform(ctx, &names.directional_specular_power, d.specular_power)?;
            }
            LightKind::Point(p) => {
                let slot = match self.slots.bind(handle) {
                    Ok(slot) => slot,
                    Err(err @ ArborError::TooManyLights { .. }) => match self.overflow {
                        LightOverflowPolicy::Error => return Err(err),
                        LightOverflowPolicy::Skip => {
                            log::warn!("Skipping point light {handle:?}: {err}");
                            return Ok(false);
                        }
                    },
                    Err(err) => return Err(err),
                };
                let Some(uniforms) = names.point_lights.get(slot) else {
                    return Err(ArborError::TooManyLights { max: names.point_lights.len() });
                };
                let position = scene.world_position(handle)?;
                shader.uniform(ctx, &uniforms.color, light.color)?;
                shader.uniform(ctx, &uniforms.intensity, light.intensity)?;
                shader.uniform(ctx, &uniforms.position, position)?;
                shader.uniform(ctx, &uniforms.specular_power, p.specular_power)?;
                shader.uniform(ctx, &uniforms.attenuation_constant, p.attenuation.constant)?;
                shader.uniform(ctx, &uniforms.attenuation_linear, p.attenuation.linear)?;
                shader.uniform(ctx, &uniforms.attenuation_exponent, p.attenuation.exponent)?;
            }
        }
        Ok(true)
    }

    /// Releases the slot of a point light and zeroes its intensity so the
    /// shader stops lighting with it. Returns the released slot.
    pub fn unbind<B: GraphicsBackend>(
        &mut self,
        handle: NodeHandle,
        shader: &Shader,
        ctx: &mut GpuContext<B>,
        names: &UniformNames,
    ) -> Result<Option<usize>> {
        let Some(slot) = self.slots.release(handle) else {
            return Ok(None);
        };
        if let Some(uniforms) = names.point_lights.get(slot) {
            shader.uniform(ctx, &uniforms.intensity, 0.0_f32)?;
        }
        log::debug!("Released point light slot {slot} held by {handle:?}");
        Ok(Some(slot))
    }

    /// Unbinds every slot whose light is gone from the scene tree or is no
    /// longer a point light.
    pub fn release_departed<B: GraphicsBackend>(
        &mut self,
        scene: &Scene,
        shader: &Shader,
        ctx: &mut GpuContext<B>,
        names: &UniformNames,
    ) -> Result<usize> {
        let departed: Vec<NodeHandle> = self
            .slots
            .bound()
            .map(|(_, h)| h)
            .filter(|&h| !scene.is_in_scene(h) || !scene.light(h).is_some_and(|l| l.is_point()))
            .collect();
        for &handle in &departed {
            self.unbind(handle, shader, ctx, names)?;
        }
        Ok(departed.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn handles(n: usize) -> Vec<NodeHandle> {
        let mut map: SlotMap<NodeHandle, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn slots_fill_lowest_first() {
        let h = handles(5);
        let mut slots = PointLightSlots::new(4);
        let assigned: Vec<usize> = h[..4].iter().map(|&l| slots.bind(l).unwrap()).collect();
        assert_eq!(assigned, vec![0, 1, 2, 3]);

        assert!(matches!(slots.bind(h[4]), Err(ArborError::TooManyLights { max: 4 })));

        // Re-binding keeps the slot
        assert_eq!(slots.bind(h[2]).unwrap(), 2);

        assert_eq!(slots.release(h[1]), Some(1));
        assert_eq!(slots.bind(h[4]).unwrap(), 1);
        assert_eq!(slots.bound_count(), 4);
        assert_eq!(slots.release(h[1]), None);
    }
}
