// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemoKind {
    /// Textured cube, sphere and cylinder under one directional light
    #[default]
    Shapes,
    /// Ground plane, skybox, glTF model and a control panel
    Showcase,
}

impl DemoKind {
    pub fn name(&self) -> &'static str {
        match self {
            DemoKind::Shapes => "shapes",
            DemoKind::Showcase => "showcase",
        }
    }
}

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "spinning-scenes")]
#[command(about = "Spinning primitives rendered with wgpu", long_about = None)]
pub struct Cli {
    /// Demo to run; falls back to the DEMO environment variable
    #[arg(long, value_enum)]
    pub demo: Option<DemoKind>,

    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory that relative asset paths are resolved against
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Disable UI elements and console output
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// Run this many ticks without a window, then exit
    #[arg(long, value_name = "TICKS")]
    pub headless: Option<u64>,
}

impl Cli {
    /// `--demo`, else `DEMO`, else the default demo
    pub fn demo_kind(&self) -> DemoKind {
        self.demo
            .or_else(|| {
                std::env::var("DEMO")
                    .ok()
                    .and_then(|name| DemoKind::from_str(&name, true).ok())
            })
            .unwrap_or_default()
    }
}
