use std::sync::Arc;

use glam::Vec2;

/// Decoded RGBA8 image
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    /// Solid colour image, mostly useful as a placeholder
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Face order: +X, -X, +Y, -Y, +Z, -Z
#[derive(Debug, Clone, PartialEq)]
pub enum TextureData {
    Flat(TextureImage),
    Cube(Box<[TextureImage; 6]>),
}

impl TextureData {
    pub fn is_cube(&self) -> bool {
        matches!(self, TextureData::Cube(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Pending,
    Ready(Arc<TextureData>),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WrapMode {
    #[default]
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

/// UV transform applied before sampling: scale by `repeat` around `center`,
/// rotate by `rotation` radians, then shift by `offset`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureTransform {
    pub offset: Vec2,
    pub repeat: Vec2,
    pub rotation: f32,
    pub center: Vec2,
}

impl Default for TextureTransform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            repeat: Vec2::ONE,
            rotation: 0.0,
            center: Vec2::ZERO,
        }
    }
}

impl TextureTransform {
    pub fn apply(&self, uv: Vec2) -> Vec2 {
        let scaled = (uv - self.center) * self.repeat;
        let (sin, cos) = self.rotation.sin_cos();
        let rotated = Vec2::new(cos * scaled.x - sin * scaled.y, sin * scaled.x + cos * scaled.y);
        rotated + self.center + self.offset
    }
}

/// Texture slot in a scene; lives from registration to the end of the session
#[derive(Debug, Clone)]
pub struct Texture {
    pub source: String,
    pub state: LoadState,
    pub wrap: WrapMode,
    pub transform: TextureTransform,
}

impl Texture {
    pub fn pending(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            state: LoadState::Pending,
            wrap: WrapMode::default(),
            transform: TextureTransform::default(),
        }
    }

    pub fn ready(source: impl Into<String>, data: TextureData) -> Self {
        Self {
            state: LoadState::Ready(Arc::new(data)),
            ..Self::pending(source)
        }
    }

    pub fn data(&self) -> Option<&Arc<TextureData>> {
        match &self.state {
            LoadState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, LoadState::Ready(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, LoadState::Pending)
    }
}
