//! Frame loop and per-object motion.

mod driver;
mod policy;

pub use driver::{millis_to_seconds, AnimationDriver, StopHandle, TickOutcome};
pub use policy::{SpinPolicy, TrackedObjects, UpdatePolicy};
