/// Window dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDimensions {
    pub width: u32,
    pub height: u32,
}

impl WindowDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Minimised windows report a zero extent and must not be drawn to
    pub fn is_drawable(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Something that can request one more frame callback
///
/// A request covers exactly one future tick; nothing repeats implicitly.
pub trait FrameScheduler {
    fn schedule_next(&self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_window_dimensions_new() {
        let dims = WindowDimensions::new(1920, 1080);
        assert_eq!(dims.width, 1920);
        assert_eq!(dims.height, 1080);
    }

    #[test]
    fn test_window_dimensions_copy() {
        let dims1 = WindowDimensions::new(1024, 768);
        let dims2 = dims1; // Copy

        assert_eq!(dims1.width, 1024);
        assert_eq!(dims2.width, 1024);
    }

    #[test]
    fn test_window_dimensions_drawable() {
        assert!(WindowDimensions::new(800, 600).is_drawable());
        assert!(!WindowDimensions::new(0, 600).is_drawable());
        assert!(!WindowDimensions::new(800, 0).is_drawable());
    }

    // Mock scheduler for testing trait implementation
    struct MockScheduler {
        requests: RefCell<usize>,
    }

    impl FrameScheduler for MockScheduler {
        fn schedule_next(&self) {
            *self.requests.borrow_mut() += 1;
        }
    }

    #[test]
    fn test_scheduler_counts_requests() {
        let scheduler = MockScheduler {
            requests: RefCell::new(0),
        };

        scheduler.schedule_next();
        scheduler.schedule_next();
        assert_eq!(*scheduler.requests.borrow(), 2);
    }

    #[test]
    fn test_scheduler_as_trait_object() {
        let scheduler = MockScheduler {
            requests: RefCell::new(0),
        };
        let dyn_scheduler: &dyn FrameScheduler = &scheduler;
        dyn_scheduler.schedule_next();
        assert_eq!(*scheduler.requests.borrow(), 1);
    }
}
