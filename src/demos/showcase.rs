use std::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};

use crate::animation::TrackedObjects;
use crate::assets::AssetLoader;
use crate::camera::PerspectiveCamera;
use crate::cli::DemoKind;
use crate::config::DemoConfig;
use crate::controls::{ColorBinding, ControlPanel, DegreesBinding, ScalarBinding};
use crate::math::{Axis, Color, Transform};
use crate::scene::{
    Background, Geometry, Light, Material, Scene, SceneError, SceneObjectFactory, Texture,
    TextureTransform, WrapMode,
};

use super::Demo;

const GROUND_SIZE: f32 = 40.0;
const GROUND_REPEAT: f32 = GROUND_SIZE / 2.0;

/// Tile the ground image, unless the repeat was already edited while loading
fn tile_ground(texture: &mut Texture) {
    texture.wrap = WrapMode::Repeat;
    if texture.transform.repeat == TextureTransform::default().repeat {
        texture.transform.repeat = Vec2::splat(GROUND_REPEAT);
    }
}

/// Lit ground, three slow spinners, an imported model and a skybox, with a
/// panel for the lights, camera and ground texture
pub fn build_showcase(config: &DemoConfig) -> Result<Demo, SceneError> {
    let camera = PerspectiveCamera::new(45.0, 2.0, 0.1, 100.0)
        .at(Vec3::new(0.0, 4.0, 10.0))
        .looking_at(Vec3::new(0.0, 1.0, 0.0));
    let mut scene = Scene::new(camera);

    let ambient = scene.add_light(Light::ambient(Color::from_hex(0xffffff), 0.6));
    let sun = scene.add_light(Light::directional(
        Color::from_hex(0xffffff),
        3.0,
        Vec3::new(5.0, 10.0, 2.0),
    ));

    let mut assets = AssetLoader::new(&config.assets.root);
    let ground_texture =
        assets.load_texture_with(&mut scene, &config.assets.ground_texture, tile_ground);
    let sky = assets.load_skybox(&mut scene, config.assets.skybox.clone());
    scene.background = Background::Skybox(sky);
    assets.load_model(
        &config.assets.model,
        Transform::from_position(Vec3::new(0.0, 0.0, -4.0)),
    );

    let mut factory = SceneObjectFactory::new(&mut scene);
    factory.create_with(
        &Geometry::Plane {
            width: GROUND_SIZE,
            height: GROUND_SIZE,
        },
        Material::textured(ground_texture),
        Transform::IDENTITY.with_rotation(Vec3::new(-FRAC_PI_2, 0.0, 0.0)),
    )?;

    let mut tracked = TrackedObjects::new();
    tracked.push(factory.create(
        &Geometry::cube(1.5),
        Color::from_hex(0x44aa88),
        Vec3::new(-3.0, 1.5, 0.0),
        None,
    )?);
    tracked.push(factory.create(
        &Geometry::Sphere {
            radius: 1.0,
            width_segments: 32,
            height_segments: 16,
        },
        Color::from_hex(0xca8a6a),
        Vec3::new(0.0, 1.5, 0.0),
        None,
    )?);
    tracked.push(factory.create(
        &Geometry::Cylinder {
            radius_top: 0.4,
            radius_bottom: 0.8,
            height: 1.6,
            radial_segments: 24,
        },
        Color::from_hex(0x6a8aca),
        Vec3::new(3.0, 1.5, 0.0),
        None,
    )?);

    let handles: Vec<_> = tracked.iter().collect();
    let mut panel = ControlPanel::new("Controls");
    panel
        .add_color("sun colour", ColorBinding::light(sun))
        .add_scalar("sun intensity", ScalarBinding::light_intensity(sun), 0.0..=10.0)
        .add_color("ambient colour", ColorBinding::light(ambient))
        .add_scalar(
            "ambient intensity",
            ScalarBinding::light_intensity(ambient),
            0.0..=2.0,
        )
        .add_degrees("field of view", DegreesBinding::camera_fov(), 20.0..=100.0)
        .add_degrees(
            "ground rotation",
            DegreesBinding::texture_rotation(ground_texture),
            -180.0..=180.0,
        )
        .add_scalar(
            "ground repeat",
            ScalarBinding::texture_repeat(ground_texture),
            1.0..=40.0,
        );
    for (name, handle) in ["cube", "sphere", "cylinder"].into_iter().zip(handles) {
        panel
            .add_color(format!("{} colour", name), ColorBinding::material(handle))
            .add_degrees(
                format!("{} tilt", name),
                DegreesBinding::rotation(handle, Axis::Z),
                -180.0..=180.0,
            );
    }

    Ok(Demo {
        kind: DemoKind::Showcase,
        scene,
        tracked,
        policy: config.spin_policy(DemoKind::Showcase),
        assets,
        panel: Some(panel),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::animation::SpinPolicy;
    use crate::controls::ControlBinding;
    use crate::scene::{ObjectHandle, TextureId};

    fn offline_config() -> DemoConfig {
        let mut config = DemoConfig::default();
        config.assets.root = std::env::temp_dir().join("spinning-scenes-no-assets");
        config
    }

    /// Config whose asset root holds only the ground image
    fn ground_only_config(name: &str) -> DemoConfig {
        let root = std::env::temp_dir().join(format!(
            "spinning-scenes-ground-{}-{}",
            std::process::id(),
            name
        ));
        std::fs::create_dir_all(&root).unwrap();
        image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 255, 255, 255]))
            .save(root.join("checker.png"))
            .unwrap();
        let mut config = DemoConfig::default();
        config.assets.root = root;
        config
    }

    fn ground_texture(demo: &Demo) -> TextureId {
        let ground = demo.scene.handles().next().unwrap();
        demo.scene.object(ground).unwrap().material.map.unwrap()
    }

    #[test]
    fn test_showcase_contents() {
        let demo = build_showcase(&offline_config()).unwrap();
        // ground + three spinners; the model arrives later, if at all
        assert_eq!(demo.scene.objects().len(), 4);
        assert_eq!(demo.tracked.len(), 3);
        assert_eq!(demo.policy, SpinPolicy::SHOWCASE);
        assert!(matches!(demo.scene.background, Background::Skybox(_)));
        assert_eq!(demo.scene.lights().len(), 2);
        assert!(demo.panel.as_ref().is_some_and(|panel| panel.len() == 13));
    }

    #[test]
    fn test_ground_is_not_tracked() {
        let demo = build_showcase(&offline_config()).unwrap();
        let ground = demo.scene.handles().next().unwrap();
        let tracked: Vec<ObjectHandle> = demo.tracked.iter().collect();
        assert!(!tracked.contains(&ground));

        let rotation = demo.scene.object(ground).unwrap().transform.rotation;
        assert!((rotation.x + FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_ground_tiles_once_loaded() {
        let mut demo = build_showcase(&ground_only_config("default")).unwrap();
        let id = ground_texture(&demo);
        demo.assets.wait_idle(&mut demo.scene, Duration::from_secs(10));

        let texture = demo.scene.texture(id).unwrap();
        assert!(texture.is_ready());
        assert_eq!(texture.wrap, WrapMode::Repeat);
        assert_eq!(texture.transform.repeat, Vec2::splat(GROUND_REPEAT));
    }

    #[test]
    fn test_repeat_edited_before_load_survives() {
        let mut demo = build_showcase(&ground_only_config("edited")).unwrap();
        let id = ground_texture(&demo);
        ScalarBinding::texture_repeat(id)
            .set(&mut demo.scene, 5.0)
            .unwrap();
        demo.assets.wait_idle(&mut demo.scene, Duration::from_secs(10));

        let texture = demo.scene.texture(id).unwrap();
        assert!(texture.is_ready());
        assert_eq!(texture.wrap, WrapMode::Repeat);
        assert_eq!(texture.transform.repeat, Vec2::splat(5.0));
    }
}
