use crate::math::Color;

use super::TextureId;

/// Default specular exponent for lit materials
pub const DEFAULT_SHININESS: f32 = 30.0;

/// Lit (Blinn-Phong) surface description
///
/// When `map` is set the texture is the colour source and `color` only
/// tints it; until the texture is ready the flat `color` is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
    pub map: Option<TextureId>,
    pub shininess: f32,
}

impl Material {
    pub fn flat(color: Color) -> Self {
        Self {
            color,
            map: None,
            shininess: DEFAULT_SHININESS,
        }
    }

    pub fn textured(map: TextureId) -> Self {
        Self {
            color: Color::WHITE,
            map: Some(map),
            shininess: DEFAULT_SHININESS,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::flat(Color::WHITE)
    }
}
