pub mod animation;
pub mod assets;
pub mod camera;
pub mod cli;
pub mod config;
pub mod controls;
pub mod core;
pub mod demos;
pub mod math;
pub mod renderer;
pub mod scene;
pub mod window;

pub use animation::{AnimationDriver, SpinPolicy, StopHandle, TrackedObjects, UpdatePolicy};
pub use assets::{AssetError, AssetLoader};
pub use camera::PerspectiveCamera;
pub use config::DemoConfig;
pub use controls::{ColorBinding, ControlBinding, ControlPanel, DegreesBinding};
pub use demos::Demo;
pub use math::{Color, Transform};
pub use scene::{Geometry, Scene, SceneError, SceneObjectFactory};
