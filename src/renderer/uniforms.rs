use glam::{Mat3, Mat4};

use crate::camera::PerspectiveCamera;
use crate::math::Color;
use crate::scene::{LightKind, MeshData, RenderableObject, Scene, Texture};

/// Directional lights beyond this many are ignored by the shader
pub const MAX_LIGHTS: usize = 4;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Interleave a mesh's attribute arrays
    pub fn from_mesh(mesh: &MeshData) -> Vec<Vertex> {
        mesh.positions
            .iter()
            .zip(&mesh.normals)
            .zip(&mesh.uvs)
            .map(|((&position, &normal), &uv)| Vertex {
                position,
                normal,
                uv,
            })
            .collect()
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// Surface-to-light direction in xyz
    pub direction: [f32; 4],
    /// Linear colour premultiplied by intensity
    pub color: [f32; 4],
}

/// Per-frame camera and lighting data (bind group 0)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalsUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub ambient: [f32; 4],
    pub light_count: [u32; 4],
    pub lights: [LightUniform; MAX_LIGHTS],
}

impl GlobalsUniform {
    pub fn from_scene(scene: &Scene) -> Self {
        let camera = &scene.camera;
        let mut ambient = [0.0f32; 3];
        let mut lights = [LightUniform::default(); MAX_LIGHTS];
        let mut count = 0;

        for light in scene.lights() {
            let [r, g, b] = linear_color(light.color);
            let radiance = [r * light.intensity, g * light.intensity, b * light.intensity];
            match light.kind {
                LightKind::Ambient => {
                    for (total, channel) in ambient.iter_mut().zip(radiance) {
                        *total += channel;
                    }
                }
                LightKind::Directional { .. } if count < MAX_LIGHTS => {
                    if let Some(direction) = light.direction_to_light() {
                        lights[count] = LightUniform {
                            direction: direction.extend(0.0).to_array(),
                            color: [radiance[0], radiance[1], radiance[2], 1.0],
                        };
                        count += 1;
                    }
                }
                LightKind::Directional { .. } => {}
            }
        }

        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_position: camera.position.extend(1.0).to_array(),
            ambient: [ambient[0], ambient[1], ambient[2], 1.0],
            light_count: [count as u32, 0, 0, 0],
            lights,
        }
    }
}

/// Per-object transform and material (bind group 1)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub uv_offset_repeat: [f32; 4],
    pub uv_rotation_center: [f32; 4],
    /// x: sample the map (0 or 1), y: shininess
    pub params: [f32; 4],
}

impl ObjectUniform {
    /// `texture` is the material's map slot, if it has one
    pub fn new(object: &RenderableObject, texture: Option<&Texture>) -> Self {
        let transform = &object.transform;
        let [r, g, b] = linear_color(object.material.color);
        let ready = texture.filter(|t| t.is_ready());
        let uv = ready.map(|t| t.transform).unwrap_or_default();

        Self {
            model: transform.matrix().to_cols_array_2d(),
            normal_matrix: Mat4::from_mat3(transform.normal_matrix()).to_cols_array_2d(),
            color: [r, g, b, 1.0],
            uv_offset_repeat: [uv.offset.x, uv.offset.y, uv.repeat.x, uv.repeat.y],
            uv_rotation_center: [uv.rotation, 0.0, uv.center.x, uv.center.y],
            params: [
                if ready.is_some() { 1.0 } else { 0.0 },
                object.material.shininess,
                0.0,
                0.0,
            ],
        }
    }
}

/// Sky pass: clip space back to a world direction, ignoring camera translation
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkyUniform {
    pub inv_view_proj: [[f32; 4]; 4],
}

impl SkyUniform {
    pub fn from_camera(camera: &PerspectiveCamera) -> Self {
        let rotation = Mat4::from_mat3(Mat3::from_mat4(camera.view_matrix()));
        let view_proj = camera.projection_matrix() * rotation;
        Self {
            inv_view_proj: view_proj.inverse().to_cols_array_2d(),
        }
    }
}

/// Hex colours are authored in sRGB; lighting happens in linear space
pub fn linear_color(color: Color) -> [f32; 3] {
    color.to_array().map(srgb_to_linear)
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Background clear colour; wgpu expects linear values for sRGB targets
pub fn clear_color(color: Color) -> wgpu::Color {
    let [r, g, b] = linear_color(color);
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    }
}
