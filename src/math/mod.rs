mod color;
mod transform;

pub use color::{Color, ColorParseError};
pub use transform::{Axis, Transform};
