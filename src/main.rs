use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;
use log::info;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window as WinitWindow, WindowId},
};

use spinning_scenes::animation::{AnimationDriver, StopHandle};
use spinning_scenes::cli::Cli;
use spinning_scenes::config::DemoConfig;
use spinning_scenes::core::Clock;
use spinning_scenes::demos::Demo;
use spinning_scenes::renderer::Renderer;
use spinning_scenes::window::Window;

const FPS_UPDATE_INTERVAL: f32 = 1.0;
const HEADLESS_LOAD_TIMEOUT: Duration = Duration::from_secs(5);

struct App {
    config: DemoConfig,
    demo: Demo,
    show_ui: bool,
    window: Option<Window>,
    renderer: Option<Renderer>,
    driver: AnimationDriver,
    stop: Option<StopHandle>,
    clock: Clock,
    frame_count: u32,
    fps: f32,
    fps_update_timer: f32,
}

impl App {
    fn new(config: DemoConfig, demo: Demo, show_ui: bool) -> Self {
        Self {
            config,
            demo,
            show_ui,
            window: None,
            renderer: None,
            driver: AnimationDriver::new(),
            stop: None,
            clock: Clock::new(),
            frame_count: 0,
            fps: 0.0,
            fps_update_timer: 0.0,
        }
    }

    fn update_fps(&mut self, delta: f32) {
        self.frame_count += 1;
        self.fps_update_timer += delta;

        if self.fps_update_timer >= FPS_UPDATE_INTERVAL {
            self.fps = self.frame_count as f32 / self.fps_update_timer;
            if self.show_ui {
                println!("FPS: {:.1}", self.fps);
            }
            self.frame_count = 0;
            self.fps_update_timer = 0.0;
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(stop) = &self.stop {
            stop.stop();
        }
        info!(
            "Stopping after {} frames ({} failed)",
            self.driver.ticks(),
            self.driver.failures()
        );
        event_loop.exit();
    }

    fn redraw(&mut self) {
        let delta = self.clock.tick();
        self.update_fps(delta);

        let (Some(window), Some(renderer)) = (&self.window, &mut self.renderer) else {
            return;
        };
        let demo = &mut self.demo;
        let hud = self.show_ui.then(|| demo.hud(self.fps));

        self.driver.tick(window, |timestamp| {
            demo.update(timestamp)?;

            let dimensions = window.dimensions();
            if !dimensions.is_drawable() {
                return Ok(());
            }
            match renderer.render(
                window.inner(),
                &mut demo.scene,
                demo.panel.as_mut(),
                hud.as_ref(),
            ) {
                Ok(()) => Ok(()),
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    renderer.resize(dimensions.width, dimensions.height);
                    Ok(())
                }
                Err(e) => Err(anyhow!("Render error: {}", e)),
            }
        });
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            WinitWindow::default_attributes()
                .with_title(self.config.window.title.clone())
                .with_inner_size(winit::dpi::LogicalSize::new(
                    self.config.window.width,
                    self.config.window.height,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                eprintln!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let renderer = match pollster::block_on(Renderer::new(window.clone())) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Failed to initialize renderer: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        let (width, height) = renderer.size();
        self.demo.scene.camera.set_viewport(width, height);

        let window = Window::new(window);
        self.clock.reset();
        self.stop = Some(self.driver.start(&window));
        self.window = Some(window);
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
            if renderer.handle_event(window.inner(), &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => self.shutdown(event_loop),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size.width, size.height);
                }
                self.demo.scene.camera.set_viewport(size.width, size.height);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }
}

/// Tick the demo without a window, then report where it ended up
fn run_headless(mut demo: Demo, ticks: u64) -> Result<()> {
    let mut driver = AnimationDriver::new();
    let stop = driver.stop_handle();
    let mut remaining = ticks;

    if remaining > 0 {
        driver.run(|timestamp| {
            remaining -= 1;
            if remaining == 0 {
                stop.stop();
            }
            demo.update(timestamp)?;
            Ok(())
        });
    }
    demo.assets.wait_idle(&mut demo.scene, HEADLESS_LOAD_TIMEOUT);

    println!(
        "{}: {} ticks, {} failed, {} objects, {} textures still loading",
        demo.kind.name(),
        driver.ticks(),
        driver.failures(),
        demo.scene.objects().len(),
        demo.scene.pending_textures()
    );
    for handle in demo.tracked.iter() {
        let object = demo.scene.object(handle)?;
        let rotation = object.transform.rotation;
        println!(
            "  {:<10} rotation ({:.3}, {:.3}, {:.3})",
            object.name, rotation.x, rotation.y, rotation.z
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = DemoConfig::from_cli(&cli)?;
    let kind = cli.demo_kind();
    let mut demo = Demo::build(kind, &config)?;
    if cli.no_ui {
        demo.panel = None;
    }

    if let Some(ticks) = cli.headless {
        return run_headless(demo, ticks);
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, demo, !cli.no_ui);

    if !cli.no_ui {
        println!("Spinning Scenes ({}) - Escape to quit", kind.name());
    }
    event_loop.run_app(&mut app)?;

    Ok(())
}
