use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::animation::SpinPolicy;
use crate::cli::{Cli, DemoKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Spinning Scenes".to_string(),
            width: 800,
            height: 400,
        }
    }
}

/// Asset locations; relative paths are resolved against `root`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub root: PathBuf,
    pub cube_texture: PathBuf,
    pub ground_texture: PathBuf,
    pub model: PathBuf,
    /// +X, -X, +Y, -Y, +Z, -Z
    pub skybox: [PathBuf; 6],
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            cube_texture: PathBuf::from("crate.png"),
            ground_texture: PathBuf::from("checker.png"),
            model: PathBuf::from("models/pyramid.gltf"),
            skybox: ["px", "nx", "py", "ny", "pz", "nz"]
                .map(|face| PathBuf::from(format!("skybox/{}.png", face))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub window: WindowConfig,
    /// Overrides the selected demo's own spin preset
    pub spin: Option<SpinPolicy>,
    pub assets: AssetPaths,
}

impl DemoConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_json::from_str(&text).with_context(|| format!("Invalid config file: {:?}", path))
    }

    /// File named by `--config` (or defaults), then command-line overrides
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(root) = &cli.assets {
            self.assets.root = root.clone();
        }
    }

    /// Explicit `spin` setting, else the demo's preset
    pub fn spin_policy(&self, kind: DemoKind) -> SpinPolicy {
        self.spin.unwrap_or(match kind {
            DemoKind::Shapes => SpinPolicy::SHAPES,
            DemoKind::Showcase => SpinPolicy::SHOWCASE,
        })
    }
}
