use glam::Vec3;

use crate::math::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// Uniform light from every direction
    Ambient,
    /// Parallel rays travelling from `position` towards `target`
    Directional { position: Vec3, target: Vec3 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: Color,
    pub intensity: f32,
}

impl Light {
    pub fn ambient(color: Color, intensity: f32) -> Self {
        Self {
            kind: LightKind::Ambient,
            color,
            intensity,
        }
    }

    /// Directional light aimed at the origin
    pub fn directional(color: Color, intensity: f32, position: Vec3) -> Self {
        Self {
            kind: LightKind::Directional {
                position,
                target: Vec3::ZERO,
            },
            color,
            intensity,
        }
    }

    /// Unit vector pointing from the lit surface towards the light
    pub fn direction_to_light(&self) -> Option<Vec3> {
        match self.kind {
            LightKind::Ambient => None,
            LightKind::Directional { position, target } => {
                Some((position - target).try_normalize().unwrap_or(Vec3::Y))
            }
        }
    }
}
