use std::path::Path;

use glam::{Mat3, Mat4, Vec3};
use log::{debug, info};

use crate::math::Color;
use crate::scene::{MeshData, TextureImage};

use super::AssetError;

/// One drawable piece of an imported model, already in model space
#[derive(Debug, Clone)]
pub struct ModelPrimitive {
    pub mesh: MeshData,
    pub color: Color,
    /// Index into [`ModelData::images`]
    pub texture: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct ModelData {
    pub primitives: Vec<ModelPrimitive>,
    pub images: Vec<TextureImage>,
}

impl ModelData {
    pub fn vertex_count(&self) -> usize {
        self.primitives.iter().map(|p| p.mesh.vertex_count()).sum()
    }
}

/// Import a glTF / GLB file, flattening the node hierarchy
///
/// Node transforms are baked into the vertices. Images without an 8-bit RGB
/// or RGBA layout are dropped and their primitives fall back to flat colour.
pub fn load_model(path: &Path) -> Result<ModelData, AssetError> {
    let (document, buffers, images) = gltf::import(path).map_err(|err| match err {
        gltf::Error::Io(source) => AssetError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => AssetError::Gltf {
            path: path.to_path_buf(),
            source: other,
        },
    })?;

    debug!(
        "{}: {} scenes, {} nodes, {} meshes, {} images",
        path.display(),
        document.scenes().count(),
        document.nodes().count(),
        document.meshes().count(),
        images.len()
    );

    let mut model = ModelData {
        primitives: Vec::new(),
        images: Vec::new(),
    };
    let mut image_slots = Vec::with_capacity(images.len());
    for image in &images {
        image_slots.push(convert_image(image).map(|converted| {
            model.images.push(converted);
            model.images.len() - 1
        }));
    }

    for scene in document.scenes() {
        for node in scene.nodes() {
            process_node(&node, &buffers, &image_slots, &Mat4::IDENTITY, &mut model);
        }
    }

    if model.primitives.is_empty() {
        return Err(AssetError::EmptyModel {
            path: path.to_path_buf(),
        });
    }

    info!(
        "Imported {}: {} primitives, {} vertices",
        path.display(),
        model.primitives.len(),
        model.vertex_count()
    );
    Ok(model)
}

fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    image_slots: &[Option<usize>],
    parent_transform: &Mat4,
    model: &mut ModelData,
) {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = *parent_transform * local_transform;

    if let Some(mesh) = node.mesh() {
        process_mesh(&mesh, buffers, image_slots, &global_transform, model);
    }

    for child in node.children() {
        process_node(&child, buffers, image_slots, &global_transform, model);
    }
}

fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    image_slots: &[Option<usize>],
    transform: &Mat4,
    model: &mut ModelData,
) {
    let normal_matrix = Mat3::from_mat4(*transform).inverse().transpose();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            debug!("Skipping {:?} primitive in mesh {:?}", primitive.mode(), mesh.name());
            continue;
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        let Some(positions) = reader.read_positions() else {
            debug!("Mesh {:?} has a primitive without positions", mesh.name());
            continue;
        };

        let positions: Vec<[f32; 3]> = positions
            .map(|p| transform.transform_point3(Vec3::from_array(p)).to_array())
            .collect();
        if positions.is_empty() {
            continue;
        }
        let count = positions.len();

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..count as u32).collect(),
        };
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= count) {
            debug!(
                "Skipping primitive in mesh {:?}: index {} out of range for {} vertices",
                mesh.name(),
                bad,
                count
            );
            continue;
        }

        let uvs: Vec<[f32; 2]> = reader
            .read_tex_coords(0)
            .map(|coords| coords.into_f32().collect())
            .filter(|coords: &Vec<[f32; 2]>| coords.len() == count)
            .unwrap_or_else(|| vec![[0.0, 0.0]; count]);

        let mut mesh_data = MeshData {
            positions,
            normals: Vec::new(),
            uvs,
            indices,
        };

        match reader.read_normals() {
            Some(normals) => {
                mesh_data.normals = normals
                    .map(|n| {
                        (normal_matrix * Vec3::from_array(n))
                            .try_normalize()
                            .unwrap_or(Vec3::Y)
                            .to_array()
                    })
                    .collect();
                if mesh_data.normals.len() != count {
                    mesh_data.compute_normals();
                }
            }
            None => mesh_data.compute_normals(),
        }

        if let Err(err) = mesh_data.validate() {
            debug!("Skipping primitive in mesh {:?}: {}", mesh.name(), err);
            continue;
        }

        let pbr = primitive.material().pbr_metallic_roughness();
        let [r, g, b, _] = pbr.base_color_factor();
        let texture = pbr
            .base_color_texture()
            .and_then(|info| image_slots.get(info.texture().source().index()).copied().flatten());

        model.primitives.push(ModelPrimitive {
            mesh: mesh_data,
            color: Color::new(r, g, b),
            texture,
        });
    }
}

fn convert_image(image: &gltf::image::Data) -> Option<TextureImage> {
    let pixels = match image.format {
        gltf::image::Format::R8G8B8A8 => image.pixels.clone(),
        gltf::image::Format::R8G8B8 => image
            .pixels
            .chunks_exact(3)
            .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], 255])
            .collect(),
        other => {
            debug!("Dropping embedded image with format {:?}", other);
            return None;
        }
    };
    Some(TextureImage {
        width: image.width,
        height: image.height,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_image_gets_opaque_alpha() {
        let data = gltf::image::Data {
            pixels: vec![1, 2, 3, 4, 5, 6],
            format: gltf::image::Format::R8G8B8,
            width: 2,
            height: 1,
        };
        let image = convert_image(&data).unwrap();
        assert_eq!(image.pixels, vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }

    #[test]
    fn test_sixteen_bit_image_dropped() {
        let data = gltf::image::Data {
            pixels: vec![0; 8],
            format: gltf::image::Format::R16G16B16A16,
            width: 1,
            height: 1,
        };
        assert!(convert_image(&data).is_none());
    }

    #[test]
    fn test_missing_model_is_io_error() {
        let err = load_model(Path::new("/no/such/model.gltf")).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }
}
