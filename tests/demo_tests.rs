use std::cell::{Cell, RefCell};
use std::time::Duration;

use spinning_scenes::animation::{millis_to_seconds, AnimationDriver, SpinPolicy, TickOutcome};
use spinning_scenes::config::DemoConfig;
use spinning_scenes::core::{FrameScheduler, TimeSource};
use spinning_scenes::demos::build_shapes;
use spinning_scenes::scene::LoadState;

#[cfg(test)]
mod demo_tests {
    use super::*;

    struct CountingScheduler {
        requests: RefCell<u64>,
    }

    impl FrameScheduler for CountingScheduler {
        fn schedule_next(&self) {
            *self.requests.borrow_mut() += 1;
        }
    }

    /// Advances a fixed step per reading
    struct SteppedTime {
        step_millis: f64,
        readings: Cell<u32>,
    }

    impl TimeSource for SteppedTime {
        fn now_millis(&self) -> f64 {
            let n = self.readings.get();
            self.readings.set(n + 1);
            n as f64 * self.step_millis
        }
    }

    #[test]
    fn test_shapes_keep_spinning_after_texture_fails() {
        let mut config = DemoConfig::default();
        config.assets.root = std::env::temp_dir().join(format!(
            "spinning-scenes-demo-{}-missing",
            std::process::id()
        ));
        let mut demo = build_shapes(&config).unwrap();
        let handles: Vec<_> = demo.tracked.iter().collect();
        let cube_texture = demo
            .scene
            .object(handles[0])
            .unwrap()
            .material
            .map
            .unwrap();

        let scheduler = CountingScheduler {
            requests: RefCell::new(0),
        };
        let mut driver = AnimationDriver::with_time_source(SteppedTime {
            step_millis: 250.0,
            readings: Cell::new(0),
        });
        let last_timestamp = Cell::new(0.0);

        for tick in 1..=8u64 {
            if tick == 4 {
                demo.assets.wait_idle(&mut demo.scene, Duration::from_secs(10));
                assert!(matches!(
                    demo.scene.texture(cube_texture).unwrap().state,
                    LoadState::Failed(_)
                ));
            }
            let outcome = driver.tick(&scheduler, |timestamp| {
                last_timestamp.set(timestamp);
                demo.update(timestamp)?;
                Ok(())
            });
            assert_eq!(outcome, TickOutcome::Completed);
            assert_eq!(*scheduler.requests.borrow(), tick);
        }

        assert_eq!(driver.failures(), 0);
        assert_eq!(demo.assets.pending(), 0);

        let seconds = millis_to_seconds(last_timestamp.get());
        assert!(seconds > 0.0);
        for (index, handle) in handles.into_iter().enumerate() {
            let rotation = demo.scene.object(handle).unwrap().transform.rotation;
            let expected = SpinPolicy::SHAPES.angle(index, seconds);
            assert_eq!(rotation.x, expected, "object {} x", index);
            assert_eq!(rotation.y, expected, "object {} y", index);
        }
    }
}
