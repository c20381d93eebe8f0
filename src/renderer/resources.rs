use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::scene::{MeshData, TextureData, TextureImage, WrapMode};

use super::uniforms::Vertex;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

pub struct GpuTexture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl GpuTexture {
    pub fn depth(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// Upload decoded pixels; cube data becomes a six-layer cube view
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &TextureData,
        label: &str,
    ) -> Self {
        match data {
            TextureData::Flat(image) => Self::from_layers(device, queue, &[image], label, false),
            TextureData::Cube(faces) => {
                let layers: Vec<&TextureImage> = faces.iter().collect();
                Self::from_layers(device, queue, &layers, label, true)
            }
        }
    }

    /// 1x1 white, bound wherever a material has no usable map
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let image = TextureImage::solid(1, 1, [255, 255, 255, 255]);
        Self::from_layers(device, queue, &[&image], "White Texture", false)
    }

    fn from_layers(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layers: &[&TextureImage],
        label: &str,
        cube: bool,
    ) -> Self {
        let (width, height) = layers
            .first()
            .map(|image| (image.width.max(1), image.height.max(1)))
            .unwrap_or((1, 1));
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: layers.len().max(1) as u32,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (layer, image) in layers.iter().enumerate() {
            if image.pixels.len() != image.byte_len() {
                continue;
            }
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: layer as u32,
                    },
                },
                &image.pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(image.width * 4),
                    rows_per_image: Some(image.height),
                },
                wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(if cube {
                wgpu::TextureViewDimension::Cube
            } else {
                wgpu::TextureViewDimension::D2
            }),
            ..Default::default()
        });
        Self { texture, view }
    }
}

/// One linear-filtering sampler per wrap mode
pub struct Samplers {
    clamp: wgpu::Sampler,
    repeat: wgpu::Sampler,
    mirrored: wgpu::Sampler,
}

impl Samplers {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            clamp: create_sampler(device, wgpu::AddressMode::ClampToEdge),
            repeat: create_sampler(device, wgpu::AddressMode::Repeat),
            mirrored: create_sampler(device, wgpu::AddressMode::MirrorRepeat),
        }
    }

    pub fn get(&self, wrap: WrapMode) -> &wgpu::Sampler {
        match wrap {
            WrapMode::ClampToEdge => &self.clamp,
            WrapMode::Repeat => &self.repeat,
            WrapMode::MirroredRepeat => &self.mirrored,
        }
    }
}

fn create_sampler(device: &wgpu::Device, mode: wgpu::AddressMode) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Material Sampler"),
        address_mode_u: mode,
        address_mode_v: mode,
        address_mode_w: mode,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

/// Vertex and index buffers for one tessellated mesh
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    source: Arc<MeshData>,
}

impl GpuMesh {
    pub fn new(device: &wgpu::Device, mesh: &Arc<MeshData>, label: &str) -> Self {
        let vertices = Vertex::from_mesh(mesh);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            source: Arc::clone(mesh),
        }
    }

    /// Still uploaded from this exact mesh allocation
    pub fn matches(&self, mesh: &Arc<MeshData>) -> bool {
        Arc::ptr_eq(&self.source, mesh)
    }
}
