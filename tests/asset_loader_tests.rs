use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use glam::{Vec2, Vec3};
use spinning_scenes::animation::AnimationDriver;
use spinning_scenes::assets::{AssetLoader, ModelState};
use spinning_scenes::camera::PerspectiveCamera;
use spinning_scenes::core::FrameScheduler;
use spinning_scenes::math::Transform;
use spinning_scenes::scene::{LoadState, Scene, TextureData, WrapMode};

const WAIT: Duration = Duration::from_secs(10);

/// Fresh directory per test so parallel tests never share files
fn asset_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "spinning-scenes-loader-{}-{}",
        std::process::id(),
        name
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_png(dir: &Path, name: &str, size: u32, rgba: [u8; 4]) {
    image::RgbaImage::from_pixel(size, size, image::Rgba(rgba))
        .save(dir.join(name))
        .unwrap();
}

/// One red triangle: three positions and u16 indices in a 42-byte buffer
fn write_triangle_gltf(dir: &Path, indices: [u16; 3]) {
    let mut bin = Vec::new();
    for value in [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0] {
        bin.extend_from_slice(&value.to_le_bytes());
    }
    for index in indices {
        bin.extend_from_slice(&index.to_le_bytes());
    }
    fs::write(dir.join("triangle.bin"), &bin).unwrap();

    let gltf = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [ { "nodes": [0] } ],
        "nodes": [ { "mesh": 0, "translation": [0.0, 0.0, -1.0] } ],
        "meshes": [ { "primitives": [ { "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 } ] } ],
        "materials": [ { "pbrMetallicRoughness": { "baseColorFactor": [1.0, 0.0, 0.0, 1.0] } } ],
        "buffers": [ { "uri": "triangle.bin", "byteLength": 42 } ],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ]
    }"#;
    fs::write(dir.join("triangle.gltf"), gltf).unwrap();
}

struct NullScheduler;

impl FrameScheduler for NullScheduler {
    fn schedule_next(&self) {}
}

#[cfg(test)]
mod asset_loader_tests {
    use super::*;

    #[test]
    fn test_texture_is_pending_until_polled() {
        let dir = asset_dir("pending");
        write_png(&dir, "crate.png", 4, [200, 100, 50, 255]);
        let mut scene = Scene::new(PerspectiveCamera::default());
        let mut loader = AssetLoader::new(&dir);

        let id = loader.load_texture(&mut scene, "crate.png");
        assert!(scene.texture(id).unwrap().is_pending());
        assert_eq!(loader.pending(), 1);

        assert_eq!(loader.wait_idle(&mut scene, WAIT), 1);
        let texture = scene.texture(id).unwrap();
        match texture.data().map(|data| data.as_ref()) {
            Some(TextureData::Flat(image)) => {
                assert_eq!((image.width, image.height), (4, 4));
                assert_eq!(&image.pixels[..4], &[200, 100, 50, 255]);
            }
            other => panic!("unexpected texture data {:?}", other),
        }
        assert_eq!(loader.pending(), 0);
    }

    #[test]
    fn test_on_load_runs_after_pixels_arrive() {
        let dir = asset_dir("handler");
        write_png(&dir, "checker.png", 2, [255, 255, 255, 255]);
        let mut scene = Scene::default();
        let mut loader = AssetLoader::new(&dir);

        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        let id = loader.load_texture_with(&mut scene, "checker.png", move |texture| {
            assert!(texture.is_ready());
            texture.wrap = WrapMode::Repeat;
            texture.transform.repeat = Vec2::splat(4.0);
            flag.set(true);
        });
        assert!(!ran.get());

        loader.wait_idle(&mut scene, WAIT);
        assert!(ran.get());
        let texture = scene.texture(id).unwrap();
        assert_eq!(texture.wrap, WrapMode::Repeat);
        assert_eq!(texture.transform.repeat, Vec2::splat(4.0));
    }

    #[test]
    fn test_missing_texture_fails_without_stopping_frames() {
        let dir = asset_dir("missing");
        let mut scene = Scene::default();
        let mut loader = AssetLoader::new(&dir);
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        let id = loader.load_texture_with(&mut scene, "nope.png", move |_| flag.set(true));

        let mut driver = AnimationDriver::new();
        let scheduler = NullScheduler;
        for _ in 0..3 {
            driver.tick(&scheduler, |_| {
                loader.poll(&mut scene);
                Ok(())
            });
        }
        loader.wait_idle(&mut scene, WAIT);

        assert!(matches!(scene.texture(id).unwrap().state, LoadState::Failed(_)));
        assert!(!ran.get());
        assert_eq!(driver.ticks(), 3);
        assert_eq!(driver.failures(), 0);
    }

    #[test]
    fn test_skybox_needs_six_matching_faces() {
        let dir = asset_dir("skybox");
        let faces = ["px.png", "nx.png", "py.png", "ny.png", "pz.png", "nz.png"];
        for (i, face) in faces.iter().enumerate() {
            write_png(&dir, face, 8, [i as u8 * 40, 0, 0, 255]);
        }
        let mut scene = Scene::default();
        let mut loader = AssetLoader::new(&dir);
        let good = loader.load_skybox(&mut scene, faces);

        write_png(&dir, "small.png", 4, [0, 0, 0, 255]);
        let mut bad_faces = faces;
        bad_faces[3] = "small.png";
        let bad = loader.load_skybox(&mut scene, bad_faces);

        loader.wait_idle(&mut scene, WAIT);
        let good = scene.texture(good).unwrap();
        assert!(good.data().is_some_and(|data| data.is_cube()));
        assert!(matches!(scene.texture(bad).unwrap().state, LoadState::Failed(_)));
    }

    #[test]
    fn test_model_objects_join_scene() {
        let dir = asset_dir("model");
        write_triangle_gltf(&dir, [0, 1, 2]);
        let mut scene = Scene::default();
        let mut loader = AssetLoader::new(&dir);

        let id = loader.load_model(
            "triangle.gltf",
            Transform::from_position(Vec3::new(2.0, 0.0, 0.0)),
        );
        assert_eq!(loader.model_state(id), Some(&ModelState::Pending));
        assert!(scene.objects().is_empty());

        loader.wait_idle(&mut scene, WAIT);
        let Some(ModelState::Loaded(handles)) = loader.model_state(id) else {
            panic!("model did not load: {:?}", loader.model_state(id));
        };
        assert_eq!(handles.len(), 1);

        let object = scene.object(handles[0]).unwrap();
        assert_eq!(object.mesh.vertex_count(), 3);
        assert_eq!(object.material.color.to_hex(), 0xff0000);
        assert_eq!(object.transform.position, Vec3::new(2.0, 0.0, 0.0));
        // node translation is baked into the vertices
        assert_eq!(object.mesh.positions[0], [0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_missing_model_is_reported() {
        let dir = asset_dir("no-model");
        let mut scene = Scene::default();
        let mut loader = AssetLoader::new(&dir);
        let id = loader.load_model("absent.gltf", Transform::IDENTITY);

        loader.wait_idle(&mut scene, WAIT);
        assert!(matches!(loader.model_state(id), Some(ModelState::Failed(_))));
        assert!(scene.objects().is_empty());
    }

    #[test]
    fn test_model_with_stray_index_fails_cleanly() {
        let dir = asset_dir("stray-index");
        write_triangle_gltf(&dir, [0, 1, 7]);
        let mut scene = Scene::default();
        let mut loader = AssetLoader::new(&dir);
        let id = loader.load_model("triangle.gltf", Transform::IDENTITY);
        assert_eq!(loader.pending(), 1);

        loader.wait_idle(&mut scene, WAIT);
        assert!(matches!(loader.model_state(id), Some(ModelState::Failed(_))));
        assert_eq!(loader.pending(), 0);
        assert!(scene.objects().is_empty());
    }
}
