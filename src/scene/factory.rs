use glam::Vec3;
use log::debug;

use crate::math::{Color, Transform};

use super::{Geometry, Material, ObjectHandle, RenderableObject, Scene, SceneError, TextureId};

/// Builds renderable objects and registers them with the scene it borrows
pub struct SceneObjectFactory<'a> {
    scene: &'a mut Scene,
}

impl<'a> SceneObjectFactory<'a> {
    pub fn new(scene: &'a mut Scene) -> Self {
        Self { scene }
    }

    /// Flat-coloured or textured object at `position`
    ///
    /// With a texture the material samples it and `color` is ignored.
    pub fn create(
        &mut self,
        geometry: &Geometry,
        color: Color,
        position: Vec3,
        texture: Option<TextureId>,
    ) -> Result<ObjectHandle, SceneError> {
        let material = match texture {
            Some(id) => Material::textured(id),
            None => Material::flat(color),
        };
        let handle = self.create_with(geometry, material, Transform::IDENTITY)?;
        self.scene.object_mut(handle)?.transform.position = position;
        Ok(handle)
    }

    /// Fully specified object; nothing is added when a descriptor is invalid
    pub fn create_with(
        &mut self,
        geometry: &Geometry,
        material: Material,
        transform: Transform,
    ) -> Result<ObjectHandle, SceneError> {
        if let Some(id) = material.map {
            self.scene.texture(id)?;
        }
        let mesh = geometry.tessellate()?;
        let name = format!("{}-{}", kind_name(geometry), self.scene.objects().len());
        debug!(
            "Adding {} ({} vertices, {} triangles)",
            name,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(self.scene.add_object(RenderableObject {
            name,
            transform,
            material,
            mesh,
        }))
    }

    pub fn scene(&mut self) -> &mut Scene {
        self.scene
    }
}

fn kind_name(geometry: &Geometry) -> &'static str {
    match geometry {
        Geometry::Box { .. } => "box",
        Geometry::Sphere { .. } => "sphere",
        Geometry::Cylinder { .. } => "cylinder",
        Geometry::Plane { .. } => "plane",
        Geometry::Mesh(_) => "mesh",
    }
}
