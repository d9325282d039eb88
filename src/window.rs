//! Window and event loop.
//!
//! A single fixed-size window driven by winit's [`ApplicationHandler`]. The
//! loop polls continuously: every `about_to_wait` requests a redraw, and each
//! redraw polls held keys and records one frame. Initialization happens in
//! `resumed`; if it fails, the error is stashed and the loop exits so the
//! caller can map it to an exit code.

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use crate::error::{Error, InitError, Result};
use crate::renderer::Renderer;
use crate::scene::SceneManifest;

const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 720;

struct App {
    manifest: SceneManifest,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    /// Set when startup fails; surfaced after the loop exits.
    error: Option<Error>,
}

impl App {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title("vista")
            .with_inner_size(PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
            .with_resizable(false);
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|e| InitError::Window(e.to_string()))?,
        );

        let renderer = Renderer::new(window.clone(), &self.manifest)?;

        self.window = Some(window);
        self.renderer = Some(renderer);
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            log::error!("startup failed: {e}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::CursorMoved { position, .. } => {
                renderer
                    .camera
                    .pointer_moved(position.x as f32, position.y as f32);
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => match state {
                ElementState::Pressed => renderer.keys.press(code),
                ElementState::Released => renderer.keys.release(code),
            },

            WindowEvent::RedrawRequested => match renderer.render() {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    renderer.reconfigure_surface();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("surface out of memory, exiting");
                    event_loop.exit();
                }
                Err(e) => log::warn!("dropped frame: {e}"),
            },

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Run the window loop to completion with the given scene.
pub fn run(manifest: SceneManifest) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|e| Error::Init(InitError::EventLoop(e.to_string())))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        manifest,
        window: None,
        renderer: None,
        error: None,
    };
    event_loop
        .run_app(&mut app)
        .map_err(|e| Error::Init(InitError::EventLoop(e.to_string())))?;

    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
