//! The two runnable scenes and the per-frame logic they share.

mod shapes;
mod showcase;

use log::info;

use crate::animation::{millis_to_seconds, SpinPolicy, TrackedObjects};
use crate::assets::AssetLoader;
use crate::cli::DemoKind;
use crate::config::DemoConfig;
use crate::controls::{ControlPanel, Hud};
use crate::scene::{Scene, SceneError};

pub use shapes::build_shapes;
pub use showcase::build_showcase;

/// A scene plus everything needed to animate it
pub struct Demo {
    pub kind: DemoKind,
    pub scene: Scene,
    pub tracked: TrackedObjects,
    pub policy: SpinPolicy,
    pub assets: AssetLoader,
    pub panel: Option<ControlPanel>,
}

impl Demo {
    pub fn build(kind: DemoKind, config: &DemoConfig) -> Result<Self, SceneError> {
        let demo = match kind {
            DemoKind::Shapes => build_shapes(config)?,
            DemoKind::Showcase => build_showcase(config)?,
        };
        info!(
            "Built {} demo: {} objects, {} animated, {} loads started",
            kind.name(),
            demo.scene.objects().len(),
            demo.tracked.len(),
            demo.assets.pending()
        );
        Ok(demo)
    }

    /// Scene logic for one tick: apply finished loads, then spin
    pub fn update(&mut self, timestamp_millis: f64) -> Result<(), SceneError> {
        self.assets.poll(&mut self.scene);
        self.tracked.apply(
            &self.policy,
            &mut self.scene,
            millis_to_seconds(timestamp_millis),
        )
    }

    pub fn hud(&self, fps: f32) -> Hud {
        Hud {
            fps,
            objects: self.scene.objects().len(),
            pending_loads: self.assets.pending(),
        }
    }
}
