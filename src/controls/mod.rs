//! Typed get/set adapters between GUI widgets and scene properties.
//!
//! A binding owns no state: it names a property inside a [`Scene`] and the
//! conversion applied on the way in and out. Widgets only ever see the
//! converted value (degrees, `#rrggbb` strings, plain scalars).

mod panel;

use thiserror::Error;

use crate::math::{Axis, Color, ColorParseError};
use crate::scene::{Background, LightHandle, ObjectHandle, Scene, SceneError, TextureId};

pub use panel::{ControlPanel, Hud};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlError {
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Color(#[from] ColorParseError),
    #[error("scene background is a skybox, not a colour")]
    BackgroundNotColor,
}

/// Read and write one scene property through a conversion
///
/// `get` after `set(v)` returns `v` up to the precision of the conversion.
pub trait ControlBinding {
    type Value;

    fn get(&self, scene: &Scene) -> Result<Self::Value, ControlError>;
    fn set(&self, scene: &mut Scene, value: Self::Value) -> Result<(), ControlError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorTarget {
    MaterialColor(ObjectHandle),
    LightColor(LightHandle),
    Background,
}

/// Colour property exposed as a `#rrggbb` string
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorBinding {
    pub target: ColorTarget,
}

impl ColorBinding {
    pub fn new(target: ColorTarget) -> Self {
        Self { target }
    }

    pub fn material(object: ObjectHandle) -> Self {
        Self::new(ColorTarget::MaterialColor(object))
    }

    pub fn light(light: LightHandle) -> Self {
        Self::new(ColorTarget::LightColor(light))
    }

    pub fn background() -> Self {
        Self::new(ColorTarget::Background)
    }

    pub fn color(&self, scene: &Scene) -> Result<Color, ControlError> {
        Ok(match self.target {
            ColorTarget::MaterialColor(handle) => scene.object(handle)?.material.color,
            ColorTarget::LightColor(handle) => scene.light(handle)?.color,
            ColorTarget::Background => match scene.background {
                Background::Color(color) => color,
                Background::Skybox(_) => return Err(ControlError::BackgroundNotColor),
            },
        })
    }

    pub fn set_color(&self, scene: &mut Scene, color: Color) -> Result<(), ControlError> {
        match self.target {
            ColorTarget::MaterialColor(handle) => scene.object_mut(handle)?.material.color = color,
            ColorTarget::LightColor(handle) => scene.light_mut(handle)?.color = color,
            ColorTarget::Background => scene.background = Background::Color(color),
        }
        Ok(())
    }
}

impl ControlBinding for ColorBinding {
    type Value = String;

    fn get(&self, scene: &Scene) -> Result<String, ControlError> {
        Ok(self.color(scene)?.to_hex_string())
    }

    fn set(&self, scene: &mut Scene, value: String) -> Result<(), ControlError> {
        let color = Color::parse_hex(&value)?;
        self.set_color(scene, color)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AngleTarget {
    Rotation(ObjectHandle, Axis),
    CameraFov,
    TextureRotation(TextureId),
}

/// Radian property exposed in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegreesBinding {
    pub target: AngleTarget,
}

impl DegreesBinding {
    pub fn new(target: AngleTarget) -> Self {
        Self { target }
    }

    pub fn rotation(object: ObjectHandle, axis: Axis) -> Self {
        Self::new(AngleTarget::Rotation(object, axis))
    }

    pub fn camera_fov() -> Self {
        Self::new(AngleTarget::CameraFov)
    }

    pub fn texture_rotation(texture: TextureId) -> Self {
        Self::new(AngleTarget::TextureRotation(texture))
    }

    fn radians(&self, scene: &Scene) -> Result<f32, ControlError> {
        Ok(match self.target {
            AngleTarget::Rotation(handle, axis) => scene.object(handle)?.transform.angle(axis),
            AngleTarget::CameraFov => scene.camera.fov_y,
            AngleTarget::TextureRotation(id) => scene.texture(id)?.transform.rotation,
        })
    }
}

impl ControlBinding for DegreesBinding {
    type Value = f32;

    fn get(&self, scene: &Scene) -> Result<f32, ControlError> {
        Ok(self.radians(scene)?.to_degrees())
    }

    fn set(&self, scene: &mut Scene, degrees: f32) -> Result<(), ControlError> {
        let radians = degrees.to_radians();
        match self.target {
            AngleTarget::Rotation(handle, axis) => {
                scene.object_mut(handle)?.transform.set_angle(axis, radians)
            }
            AngleTarget::CameraFov => scene.camera.fov_y = radians,
            AngleTarget::TextureRotation(id) => scene.texture_mut(id)?.transform.rotation = radians,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarTarget {
    LightIntensity(LightHandle),
    /// Uniform repeat on both texture axes; `get` reports the U repeat
    TextureRepeat(TextureId),
}

/// Plain number property with no conversion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarBinding {
    pub target: ScalarTarget,
}

impl ScalarBinding {
    pub fn new(target: ScalarTarget) -> Self {
        Self { target }
    }

    pub fn light_intensity(light: LightHandle) -> Self {
        Self::new(ScalarTarget::LightIntensity(light))
    }

    pub fn texture_repeat(texture: TextureId) -> Self {
        Self::new(ScalarTarget::TextureRepeat(texture))
    }
}

impl ControlBinding for ScalarBinding {
    type Value = f32;

    fn get(&self, scene: &Scene) -> Result<f32, ControlError> {
        Ok(match self.target {
            ScalarTarget::LightIntensity(handle) => scene.light(handle)?.intensity,
            ScalarTarget::TextureRepeat(id) => scene.texture(id)?.transform.repeat.x,
        })
    }

    fn set(&self, scene: &mut Scene, value: f32) -> Result<(), ControlError> {
        match self.target {
            ScalarTarget::LightIntensity(handle) => scene.light_mut(handle)?.intensity = value,
            ScalarTarget::TextureRepeat(id) => {
                scene.texture_mut(id)?.transform.repeat = glam::Vec2::splat(value)
            }
        }
        Ok(())
    }
}
