//! wgpu forward renderer for a [`Scene`], with an egui overlay on top.

mod pipelines;
mod resources;
mod uniforms;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::controls::{ControlPanel, Hud};
use crate::scene::{Background, Material, RenderableObject, Scene, TextureId, WrapMode};

use pipelines::Layouts;
use resources::{GpuMesh, GpuTexture, Samplers};

pub use uniforms::{
    clear_color, linear_color, GlobalsUniform, LightUniform, ObjectUniform, SkyUniform, Vertex,
    MAX_LIGHTS,
};

/// Which map and sampler an object's bind group was built with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MapBinding {
    texture: Option<TextureId>,
    wrap: WrapMode,
}

impl MapBinding {
    const NONE: MapBinding = MapBinding {
        texture: None,
        wrap: WrapMode::ClampToEdge,
    };

    /// Only flat textures that finished loading are sampled
    fn for_material(scene: &Scene, material: &Material) -> Self {
        let Some(id) = material.map else {
            return Self::NONE;
        };
        match scene.texture(id) {
            Ok(texture) if texture.data().is_some_and(|data| !data.is_cube()) => MapBinding {
                texture: Some(id),
                wrap: texture.wrap,
            },
            _ => Self::NONE,
        }
    }
}

struct ObjectSlot {
    mesh: GpuMesh,
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    binding: MapBinding,
}

struct SkyBinding {
    texture: TextureId,
    bind_group: wgpu::BindGroup,
}

pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    depth: GpuTexture,
    layouts: Layouts,
    mesh_pipeline: wgpu::RenderPipeline,
    sky_pipeline: wgpu::RenderPipeline,
    samplers: Samplers,
    white: GpuTexture,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    sky_buffer: wgpu::Buffer,
    sky: Option<SkyBinding>,
    textures: HashMap<TextureId, GpuTexture>,
    objects: Vec<ObjectSlot>,
    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;
        let adapter = Self::request_adapter(&instance, &surface).await?;
        let (device, queue) = Self::request_device(&adapter).await?;

        let config = Self::create_surface_config(&surface, &adapter, size)?;
        surface.configure(&device, &config);

        let layouts = Layouts::new(&device);
        let mesh_pipeline = pipelines::create_mesh_pipeline(&device, &layouts, config.format);
        let sky_pipeline = pipelines::create_sky_pipeline(&device, &layouts, config.format);
        let depth = GpuTexture::depth(&device, config.width, config.height);
        let samplers = Samplers::new(&device);
        let white = GpuTexture::white(&device, &queue);

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globals Buffer"),
            contents: bytemuck::cast_slice(&[GlobalsUniform::from_scene(&Scene::default())]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &layouts.globals,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });
        let sky_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sky Buffer"),
            size: std::mem::size_of::<SkyUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(&device, config.format, egui_wgpu::RendererOptions::default());

        info!(
            "Renderer initialized: {}x{} {:?}",
            config.width, config.height, config.format
        );

        Ok(Self {
            device,
            queue,
            surface,
            config,
            depth,
            layouts,
            mesh_pipeline,
            sky_pipeline,
            samplers,
            white,
            globals_buffer,
            globals_bind_group,
            sky_buffer,
            sky: None,
            textures: HashMap::new(),
            objects: Vec::new(),
            egui_renderer,
            egui_state,
            egui_ctx,
        })
    }

    async fn request_adapter(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'_>,
    ) -> Result<wgpu::Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to find appropriate adapter")
    }

    async fn request_device(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue)> {
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("Failed to create device")
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> Result<wgpu::SurfaceConfiguration> {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("Surface reports no formats")?;

        Ok(wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Reconfigure the surface and depth buffer; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth = GpuTexture::depth(&self.device, width, height);
        debug!("Surface resized to {}x{}", width, height);
    }

    /// Returns true when egui consumed the event
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.egui_state.on_window_event(window, event).consumed
    }

    /// Draw one frame. The control panel runs first so its edits show at once.
    pub fn render(
        &mut self,
        window: &Window,
        scene: &mut Scene,
        panel: Option<&mut ControlPanel>,
        hud: Option<&Hud>,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        // egui texture deltas are only handed out once, so the UI runs after
        // the frame is certain to be drawn
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let raw_input = self.egui_state.take_egui_input(window);
        let full_output = build_ui(&self.egui_ctx, raw_input, scene, panel, hud);
        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        self.upload_textures(scene);
        self.sync_objects(scene);
        let sky_ready = self.sync_sky(scene);
        self.queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::cast_slice(&[GlobalsUniform::from_scene(scene)]),
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            });

        let clear = match scene.background {
            Background::Color(color) => clear_color(color),
            Background::Skybox(_) => wgpu::Color::BLACK,
        };

        // Scene pass - sky, then lit meshes
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let (true, Some(sky)) = (sky_ready, &self.sky) {
                render_pass.set_pipeline(&self.sky_pipeline);
                render_pass.set_bind_group(0, &sky.bind_group, &[]);
                render_pass.draw(0..3, 0..1);
            }

            render_pass.set_pipeline(&self.mesh_pipeline);
            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
            for slot in &self.objects {
                render_pass.set_bind_group(1, &slot.bind_group, &[]);
                render_pass.set_vertex_buffer(0, slot.mesh.vertex_buffer.slice(..));
                render_pass
                    .set_index_buffer(slot.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..slot.mesh.index_count, 0, 0..1);
            }
        }

        // egui pass - UI overlay
        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, self.egui_ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();

            self.egui_renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Upload every texture that became ready since the last frame
    fn upload_textures(&mut self, scene: &Scene) {
        for id in scene.texture_ids() {
            if self.textures.contains_key(&id) {
                continue;
            }
            let Ok(texture) = scene.texture(id) else {
                continue;
            };
            if let Some(data) = texture.data() {
                debug!("Uploading texture {}", texture.source);
                let gpu = GpuTexture::upload(&self.device, &self.queue, data, &texture.source);
                self.textures.insert(id, gpu);
            }
        }
    }

    fn sync_objects(&mut self, scene: &Scene) {
        for (index, object) in scene.objects().iter().enumerate() {
            let binding = MapBinding::for_material(scene, &object.material);
            let map = binding.texture.and_then(|id| scene.texture(id).ok());
            let uniform = ObjectUniform::new(object, map);

            let view = binding
                .texture
                .and_then(|id| self.textures.get(&id))
                .map_or(&self.white.view, |texture| &texture.view);
            let sampler = self.samplers.get(binding.wrap);

            let stale = self
                .objects
                .get(index)
                .is_none_or(|slot| !slot.mesh.matches(&object.mesh));
            if stale {
                let slot = self.create_slot(object, view, sampler, binding);
                if index < self.objects.len() {
                    self.objects[index] = slot;
                } else {
                    self.objects.push(slot);
                }
            } else if self.objects[index].binding != binding {
                let slot = &mut self.objects[index];
                slot.bind_group = create_object_bind_group(
                    &self.device,
                    &self.layouts.object,
                    &slot.uniform,
                    view,
                    sampler,
                );
                slot.binding = binding;
            }

            self.queue
                .write_buffer(&self.objects[index].uniform, 0, bytemuck::cast_slice(&[uniform]));
        }
    }

    fn create_slot(
        &self,
        object: &RenderableObject,
        view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
        binding: MapBinding,
    ) -> ObjectSlot {
        let mesh = GpuMesh::new(&self.device, &object.mesh, &object.name);
        let uniform = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&object.name),
            size: std::mem::size_of::<ObjectUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group =
            create_object_bind_group(&self.device, &self.layouts.object, &uniform, view, sampler);
        ObjectSlot {
            mesh,
            uniform,
            bind_group,
            binding,
        }
    }

    /// Returns whether a loaded cube map is ready to draw
    fn sync_sky(&mut self, scene: &Scene) -> bool {
        let Background::Skybox(id) = scene.background else {
            return false;
        };
        let is_cube = scene
            .texture(id)
            .ok()
            .and_then(|texture| texture.data())
            .is_some_and(|data| data.is_cube());
        let Some(gpu) = self.textures.get(&id).filter(|_| is_cube) else {
            return false;
        };

        if self.sky.as_ref().map(|sky| sky.texture) != Some(id) {
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("sky_bind_group"),
                layout: &self.layouts.sky,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: self.sky_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&gpu.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(
                            self.samplers.get(WrapMode::ClampToEdge),
                        ),
                    },
                ],
            });
            self.sky = Some(SkyBinding {
                texture: id,
                bind_group,
            });
        }

        self.queue.write_buffer(
            &self.sky_buffer,
            0,
            bytemuck::cast_slice(&[SkyUniform::from_camera(&scene.camera)]),
        );
        true
    }
}

/// One egui pass over the HUD and control panel
fn build_ui(
    ctx: &egui::Context,
    raw_input: egui::RawInput,
    scene: &mut Scene,
    mut panel: Option<&mut ControlPanel>,
    hud: Option<&Hud>,
) -> egui::FullOutput {
    ctx.run(raw_input, |ctx| {
        if let Some(hud) = hud {
            hud.show(ctx);
        }
        if let Some(panel) = panel.as_deref_mut() {
            panel.show(ctx, scene);
        }
    })
}

fn create_object_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniform: &wgpu::Buffer,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("object_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}
