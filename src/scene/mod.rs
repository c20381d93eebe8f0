//! Scene container: renderable objects, lights, textures, camera and background.
//!
//! A [`Scene`] is an explicit value handed to every construction and update
//! call. Objects, lights and textures are append-only; the handles returned
//! when they are added stay valid for the life of the scene.

mod factory;
mod geometry;
mod light;
mod material;
mod texture;

use std::sync::Arc;

use thiserror::Error;

pub use factory::SceneObjectFactory;
pub use geometry::{Geometry, MeshData};
pub use light::{Light, LightKind};
pub use material::{Material, DEFAULT_SHININESS};
pub use texture::{
    LoadState, Texture, TextureData, TextureImage, TextureTransform, WrapMode,
};

use crate::camera::PerspectiveCamera;
use crate::math::{Color, Transform};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("no object with handle {0:?}")]
    UnknownObject(ObjectHandle),
    #[error("no light with handle {0:?}")]
    UnknownLight(LightHandle),
    #[error("no texture with id {0:?}")]
    UnknownTexture(TextureId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectHandle(usize);

impl ObjectHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightHandle(usize);

impl LightHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(usize);

impl TextureId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Geometry + material + transform, drawn every frame
#[derive(Debug, Clone)]
pub struct RenderableObject {
    pub name: String,
    pub transform: Transform,
    pub material: Material,
    pub mesh: Arc<MeshData>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Background {
    Color(Color),
    /// Cube texture; the clear colour shows until it has loaded
    Skybox(TextureId),
}

impl Default for Background {
    fn default() -> Self {
        Background::Color(Color::BLACK)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: Vec<RenderableObject>,
    lights: Vec<Light>,
    textures: Vec<Texture>,
    pub camera: PerspectiveCamera,
    pub background: Background,
}

impl Scene {
    pub fn new(camera: PerspectiveCamera) -> Self {
        Self {
            camera,
            ..Default::default()
        }
    }

    pub fn add_object(&mut self, object: RenderableObject) -> ObjectHandle {
        self.objects.push(object);
        ObjectHandle(self.objects.len() - 1)
    }

    pub fn object(&self, handle: ObjectHandle) -> Result<&RenderableObject, SceneError> {
        self.objects
            .get(handle.0)
            .ok_or(SceneError::UnknownObject(handle))
    }

    pub fn object_mut(&mut self, handle: ObjectHandle) -> Result<&mut RenderableObject, SceneError> {
        self.objects
            .get_mut(handle.0)
            .ok_or(SceneError::UnknownObject(handle))
    }

    pub fn objects(&self) -> &[RenderableObject] {
        &self.objects
    }

    pub fn handles(&self) -> impl Iterator<Item = ObjectHandle> {
        (0..self.objects.len()).map(ObjectHandle)
    }

    pub fn add_light(&mut self, light: Light) -> LightHandle {
        self.lights.push(light);
        LightHandle(self.lights.len() - 1)
    }

    pub fn light(&self, handle: LightHandle) -> Result<&Light, SceneError> {
        self.lights
            .get(handle.0)
            .ok_or(SceneError::UnknownLight(handle))
    }

    pub fn light_mut(&mut self, handle: LightHandle) -> Result<&mut Light, SceneError> {
        self.lights
            .get_mut(handle.0)
            .ok_or(SceneError::UnknownLight(handle))
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn add_texture(&mut self, texture: Texture) -> TextureId {
        self.textures.push(texture);
        TextureId(self.textures.len() - 1)
    }

    pub fn texture(&self, id: TextureId) -> Result<&Texture, SceneError> {
        self.textures
            .get(id.0)
            .ok_or(SceneError::UnknownTexture(id))
    }

    pub fn texture_mut(&mut self, id: TextureId) -> Result<&mut Texture, SceneError> {
        self.textures
            .get_mut(id.0)
            .ok_or(SceneError::UnknownTexture(id))
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    pub fn texture_ids(&self) -> impl Iterator<Item = TextureId> {
        (0..self.textures.len()).map(TextureId)
    }

    pub fn pending_textures(&self) -> usize {
        self.textures.iter().filter(|t| t.is_pending()).count()
    }
}
