use std::sync::Arc;
use winit::window::Window as WinitWindow;

use crate::core::{FrameScheduler, WindowDimensions};

/// Wrapper around winit Window that schedules frames through redraw requests
pub struct Window {
    inner: Arc<WinitWindow>,
}

impl Window {
    pub fn new(window: Arc<WinitWindow>) -> Self {
        Self { inner: window }
    }

    pub fn inner(&self) -> &Arc<WinitWindow> {
        &self.inner
    }

    pub fn dimensions(&self) -> WindowDimensions {
        let size = self.inner.inner_size();
        WindowDimensions::new(size.width, size.height)
    }
}

impl FrameScheduler for Window {
    fn schedule_next(&self) {
        self.inner.request_redraw();
    }
}
