use std::fs;
use std::path::PathBuf;

use clap::Parser;
use spinning_scenes::animation::SpinPolicy;
use spinning_scenes::cli::{Cli, DemoKind};
use spinning_scenes::config::DemoConfig;
use spinning_scenes::demos::Demo;

fn write_config(name: &str, json: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "spinning-scenes-config-{}-{}.json",
        std::process::id(),
        name
    ));
    fs::write(&path, json).unwrap();
    path
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn test_file_then_cli_overrides() {
        let path = write_config(
            "override",
            r#"{
                "window": { "title": "Shapes", "width": 640 },
                "spin": { "base_speed": 2.0, "speed_increment": 0.25 },
                "assets": { "root": "/from/file" }
            }"#,
        );
        let cli = Cli::parse_from([
            "spinning-scenes",
            "--config",
            path.to_str().unwrap(),
            "--assets",
            "/from/cli",
        ]);

        let config = DemoConfig::from_cli(&cli).unwrap();
        assert_eq!(config.window.title, "Shapes");
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 400);
        assert_eq!(config.assets.root, PathBuf::from("/from/cli"));
        assert_eq!(config.spin_policy(DemoKind::Shapes), SpinPolicy::new(2.0, 0.25));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = write_config("broken", "{ window: ");
        let cli = Cli::parse_from(["spinning-scenes", "--config", path.to_str().unwrap()]);
        let err = DemoConfig::from_cli(&cli).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid config file"));
    }

    #[test]
    fn test_demo_builds_without_assets_on_disk() {
        let mut config = DemoConfig::default();
        config.assets.root = std::env::temp_dir().join("spinning-scenes-empty-root");

        for kind in [DemoKind::Shapes, DemoKind::Showcase] {
            let mut demo = Demo::build(kind, &config).unwrap();
            assert_eq!(demo.kind, kind);
            // every load fails, frames keep coming
            demo.assets
                .wait_idle(&mut demo.scene, std::time::Duration::from_secs(10));
            demo.update(1000.0).unwrap();
            demo.update(2000.0).unwrap();
            assert_eq!(demo.scene.pending_textures(), 0);
            assert_eq!(demo.assets.pending(), 0);
        }
    }
}
