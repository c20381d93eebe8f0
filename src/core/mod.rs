pub mod clock;
pub mod window;

pub use clock::{Clock, TimeSource};
pub use window::{FrameScheduler, WindowDimensions};
