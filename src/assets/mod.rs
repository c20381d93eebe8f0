//! Background loading of textures, cube maps and glTF models.
//!
//! Decoding runs on short-lived worker threads. Results come back over a
//! channel and are only applied to the scene from [`AssetLoader::poll`], so
//! every scene mutation stays on the thread that owns the scene. A failed
//! load is logged and leaves its slot in the `Failed` state; nothing retries.

mod images;
mod model;

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};
use thiserror::Error;

use crate::math::Transform;
use crate::scene::{
    Geometry, LoadState, Material, ObjectHandle, Scene, SceneObjectFactory, Texture, TextureData,
    TextureId,
};

pub use images::{decode_cube, decode_image};
pub use model::{load_model, ModelData, ModelPrimitive};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to import {}: {source}", path.display())]
    Gltf {
        path: PathBuf,
        #[source]
        source: ::gltf::Error,
    },
    #[error("unsupported asset {}: {detail}", path.display())]
    UnsupportedFormat { path: PathBuf, detail: String },
    #[error("{} contains no triangle geometry", path.display())]
    EmptyModel { path: PathBuf },
    #[error("loader crashed on {}: {message}", path.display())]
    Panicked { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId(usize);

#[derive(Debug, Clone, PartialEq)]
pub enum ModelState {
    Pending,
    Loaded(Vec<ObjectHandle>),
    Failed(String),
}

type TextureHandler = Box<dyn FnOnce(&mut Texture)>;

enum Loaded {
    Texture(TextureId, Result<TextureData, AssetError>),
    Model(ModelId, Result<ModelData, AssetError>),
}

/// Slot a worker reports back to, even when its job panics
#[derive(Debug, Clone, Copy)]
enum Target {
    Texture(TextureId),
    Model(ModelId),
}

impl Target {
    fn failed(self, err: AssetError) -> Loaded {
        match self {
            Target::Texture(id) => Loaded::Texture(id, Err(err)),
            Target::Model(id) => Loaded::Model(id, Err(err)),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

struct ModelSlot {
    source: String,
    transform: Transform,
    state: ModelState,
}

/// Starts loads and applies their results to a scene
pub struct AssetLoader {
    root: PathBuf,
    sender: Sender<Loaded>,
    receiver: Receiver<Loaded>,
    in_flight: usize,
    handlers: HashMap<TextureId, TextureHandler>,
    models: Vec<ModelSlot>,
}

impl AssetLoader {
    /// Relative asset paths are resolved against `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            root: root.into(),
            sender,
            receiver,
            in_flight: 0,
            handlers: HashMap::new(),
            models: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads started and not yet applied by `poll`
    pub fn pending(&self) -> usize {
        self.in_flight
    }

    /// Register a pending texture slot and start decoding it
    pub fn load_texture(&mut self, scene: &mut Scene, path: impl AsRef<Path>) -> TextureId {
        let path = path.as_ref();
        let id = scene.add_texture(Texture::pending(path.display().to_string()));
        let full = self.root.join(path);
        let started = self.dispatch(full.clone(), Target::Texture(id), move || {
            let result = decode_image(&full).map(TextureData::Flat);
            Loaded::Texture(id, result)
        });
        if !started {
            Self::fail_texture(scene, id, "loader thread could not be started");
        }
        id
    }

    /// As [`load_texture`](Self::load_texture), then run `on_load` on the
    /// main thread once the pixels are in place
    pub fn load_texture_with<F>(
        &mut self,
        scene: &mut Scene,
        path: impl AsRef<Path>,
        on_load: F,
    ) -> TextureId
    where
        F: FnOnce(&mut Texture) + 'static,
    {
        let id = self.load_texture(scene, path);
        if scene.texture(id).is_ok_and(|texture| texture.is_pending()) {
            self.handlers.insert(id, Box::new(on_load));
        }
        id
    }

    /// Cube texture from six faces in +X, -X, +Y, -Y, +Z, -Z order
    pub fn load_skybox<P: AsRef<Path>>(&mut self, scene: &mut Scene, faces: [P; 6]) -> TextureId {
        let label = faces[0]
            .as_ref()
            .parent()
            .unwrap_or(Path::new("."))
            .display()
            .to_string();
        let id = scene.add_texture(Texture::pending(format!("skybox:{}", label)));
        let dir = self.root.join(&label);
        let full: [PathBuf; 6] = faces.map(|face| self.root.join(face));
        let started = self.dispatch(dir, Target::Texture(id), move || {
            Loaded::Texture(id, decode_cube(&full))
        });
        if !started {
            Self::fail_texture(scene, id, "loader thread could not be started");
        }
        id
    }

    /// Import a glTF model; its primitives join the scene once `poll` sees it
    pub fn load_model(&mut self, path: impl AsRef<Path>, transform: Transform) -> ModelId {
        let path = path.as_ref();
        let id = ModelId(self.models.len());
        self.models.push(ModelSlot {
            source: path.display().to_string(),
            transform,
            state: ModelState::Pending,
        });
        let full = self.root.join(path);
        let started = self.dispatch(full.clone(), Target::Model(id), move || {
            Loaded::Model(id, load_model(&full))
        });
        if !started {
            self.models[id.0].state =
                ModelState::Failed("loader thread could not be started".into());
        }
        id
    }

    pub fn model_state(&self, id: ModelId) -> Option<&ModelState> {
        self.models.get(id.0).map(|slot| &slot.state)
    }

    /// Apply every finished load without blocking; returns how many were applied
    pub fn poll(&mut self, scene: &mut Scene) -> usize {
        let mut applied = 0;
        while let Ok(loaded) = self.receiver.try_recv() {
            self.apply(scene, loaded);
            applied += 1;
        }
        applied
    }

    /// Block until nothing is in flight or `timeout` passes
    pub fn wait_idle(&mut self, scene: &mut Scene, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut applied = 0;
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(loaded) => {
                    self.apply(scene, loaded);
                    applied += 1;
                }
                Err(_) => break,
            }
        }
        applied
    }

    /// Run `job` on a worker thread. A panicking job still reports a failure
    /// for `target`, so no slot is left pending.
    fn dispatch<F>(&mut self, path: PathBuf, target: Target, job: F) -> bool
    where
        F: FnOnce() -> Loaded + Send + 'static,
    {
        let sender = self.sender.clone();
        let label = path.display().to_string();
        let spawned = thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || {
                let loaded = panic::catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|payload| {
                    target.failed(AssetError::Panicked {
                        message: panic_message(payload.as_ref()),
                        path,
                    })
                });
                // The loader may already be gone when a slow decode finishes
                let _ = sender.send(loaded);
            });
        match spawned {
            Ok(_) => {
                self.in_flight += 1;
                true
            }
            Err(err) => {
                warn!("Could not start loading {}: {}", label, err);
                false
            }
        }
    }

    fn apply(&mut self, scene: &mut Scene, loaded: Loaded) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match loaded {
            Loaded::Texture(id, result) => {
                let handler = self.handlers.remove(&id);
                self.apply_texture(scene, id, result, handler);
            }
            Loaded::Model(id, result) => self.apply_model(scene, id, result),
        }
    }

    fn apply_texture(
        &self,
        scene: &mut Scene,
        id: TextureId,
        result: Result<TextureData, AssetError>,
        handler: Option<TextureHandler>,
    ) {
        let texture = match scene.texture_mut(id) {
            Ok(texture) => texture,
            Err(err) => {
                warn!("Dropping loaded texture: {}", err);
                return;
            }
        };
        match result {
            Ok(data) => {
                info!("Loaded texture {}", texture.source);
                texture.state = LoadState::Ready(Arc::new(data));
                if let Some(on_load) = handler {
                    on_load(texture);
                }
            }
            Err(err) => {
                warn!("Texture {} failed to load: {}", texture.source, err);
                texture.state = LoadState::Failed(err.to_string());
            }
        }
    }

    fn apply_model(&mut self, scene: &mut Scene, id: ModelId, result: Result<ModelData, AssetError>) {
        let Some(slot) = self.models.get_mut(id.0) else {
            return;
        };
        slot.state = match result.map(|model| instantiate(scene, &slot.source, model, slot.transform)) {
            Ok(Ok(handles)) => {
                info!("Model {} added {} objects", slot.source, handles.len());
                ModelState::Loaded(handles)
            }
            Ok(Err(err)) => {
                warn!("Model {} could not be added: {}", slot.source, err);
                ModelState::Failed(err.to_string())
            }
            Err(err) => {
                warn!("Model {} failed to load: {}", slot.source, err);
                ModelState::Failed(err.to_string())
            }
        };
    }

    fn fail_texture(scene: &mut Scene, id: TextureId, reason: &str) {
        if let Ok(texture) = scene.texture_mut(id) {
            texture.state = LoadState::Failed(reason.to_string());
        }
    }
}

/// Register a model's embedded images and primitives with the scene
fn instantiate(
    scene: &mut Scene,
    source: &str,
    model: ModelData,
    transform: Transform,
) -> Result<Vec<ObjectHandle>, crate::scene::SceneError> {
    let textures: Vec<TextureId> = model
        .images
        .into_iter()
        .enumerate()
        .map(|(i, image)| {
            scene.add_texture(Texture::ready(
                format!("{}#image{}", source, i),
                TextureData::Flat(image),
            ))
        })
        .collect();

    let mut factory = SceneObjectFactory::new(scene);
    let mut handles = Vec::with_capacity(model.primitives.len());
    for primitive in model.primitives {
        let material = match primitive.texture.and_then(|i| textures.get(i)) {
            Some(&map) => Material {
                color: primitive.color,
                ..Material::textured(map)
            },
            None => Material::flat(primitive.color),
        };
        let geometry = Geometry::Mesh(Arc::new(primitive.mesh));
        handles.push(factory.create_with(&geometry, material, transform)?);
    }
    Ok(handles)
}
