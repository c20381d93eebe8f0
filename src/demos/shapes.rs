use glam::Vec3;

use crate::animation::TrackedObjects;
use crate::assets::AssetLoader;
use crate::camera::PerspectiveCamera;
use crate::cli::DemoKind;
use crate::config::DemoConfig;
use crate::math::Color;
use crate::scene::{Geometry, Light, Scene, SceneError, SceneObjectFactory, WrapMode};

use super::Demo;

/// Textured cube between a sphere and a cylinder, each spinning a little
/// faster than the one before it
pub fn build_shapes(config: &DemoConfig) -> Result<Demo, SceneError> {
    let camera = PerspectiveCamera::new(75.0, 2.0, 0.1, 5.0).at(Vec3::new(0.0, 0.0, 2.0));
    let mut scene = Scene::new(camera);
    scene.add_light(Light::directional(
        Color::from_hex(0xffffff),
        3.0,
        Vec3::new(-1.0, 2.0, 4.0),
    ));

    let mut assets = AssetLoader::new(&config.assets.root);
    let cube_texture = assets.load_texture_with(&mut scene, &config.assets.cube_texture, |texture| {
        texture.wrap = WrapMode::Repeat;
        texture.transform.offset = glam::Vec2::ZERO;
        texture.transform.repeat = glam::Vec2::ONE;
    });

    let mut factory = SceneObjectFactory::new(&mut scene);
    let cube = factory.create(&Geometry::cube(1.0), Color::WHITE, Vec3::ZERO, Some(cube_texture))?;
    let sphere = factory.create(
        &Geometry::Sphere {
            radius: 0.5,
            width_segments: 32,
            height_segments: 32,
        },
        Color::from_hex(0x8844aa),
        Vec3::new(-2.0, 0.0, 0.0),
        None,
    )?;
    let cylinder = factory.create(
        &Geometry::Cylinder {
            radius_top: 0.5,
            radius_bottom: 0.5,
            height: 1.0,
            radial_segments: 32,
        },
        Color::from_hex(0xaa8844),
        Vec3::new(2.0, 0.0, 0.0),
        None,
    )?;

    Ok(Demo {
        kind: DemoKind::Shapes,
        scene,
        tracked: [cube, sphere, cylinder].into_iter().collect(),
        policy: config.spin_policy(DemoKind::Shapes),
        assets,
        panel: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Background;

    fn offline_config() -> DemoConfig {
        let mut config = DemoConfig::default();
        config.assets.root = std::env::temp_dir().join("spinning-scenes-no-assets");
        config
    }

    #[test]
    fn test_shapes_layout() {
        let demo = build_shapes(&offline_config()).unwrap();
        let objects = demo.scene.objects();
        assert_eq!(objects.len(), 3);
        assert_eq!(demo.tracked.len(), 3);

        let xs: Vec<f32> = objects.iter().map(|o| o.transform.position.x).collect();
        assert_eq!(xs, vec![0.0, -2.0, 2.0]);
        assert!(objects[0].material.map.is_some());
        assert_eq!(objects[1].material.color.to_hex(), 0x8844aa);
        assert_eq!(objects[2].material.color.to_hex(), 0xaa8844);
        assert_eq!(demo.scene.background, Background::Color(Color::BLACK));
        assert!(demo.panel.is_none());
    }

    #[test]
    fn test_shapes_camera_and_light() {
        let demo = build_shapes(&offline_config()).unwrap();
        let camera = demo.scene.camera;
        assert!((camera.fov_y.to_degrees() - 75.0).abs() < 1e-4);
        assert_eq!(camera.far, 5.0);
        assert_eq!(camera.position.z, 2.0);

        let light = demo.scene.lights()[0];
        assert_eq!(light.intensity, 3.0);
        assert_eq!(light.color, Color::WHITE);
    }
}
