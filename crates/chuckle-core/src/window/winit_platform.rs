use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

use crate::error::Error;
use crate::input::{InputEvent, InputState, MouseButton};

use super::{Platform, WindowSettings};

/// Pump attempts while waiting for the initial `resumed` callback.
const OPEN_ATTEMPTS: u32 = 100;
const OPEN_PUMP_TIMEOUT: Duration = Duration::from_millis(10);

/// Wheel pixels treated as one line.
const PIXELS_PER_LINE: f32 = 20.0;

/// winit-backed `Platform`.
///
/// The event loop is pumped once per frame instead of owning the thread, so
/// the frame loop stays in control.
pub struct WinitPlatform {
    event_loop: EventLoop<()>,
    handler: WindowHandler,
}

struct WindowHandler {
    title: String,
    initial_size: LogicalSize<f64>,
    resizable: bool,

    window: Option<Arc<Window>>,
    create_error: Option<String>,

    close_requested: bool,
    pending_resize: Option<PhysicalSize<u32>>,
    input: InputState,
}

impl WinitPlatform {
    /// Creates the event loop and the window.
    ///
    /// Returns the window as well so a render device can bind a surface to it.
    pub fn open(settings: &WindowSettings) -> Result<(Self, Arc<Window>)> {
        let mut event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut handler = WindowHandler {
            title: settings.title.clone(),
            initial_size: LogicalSize::new(settings.width, settings.height),
            resizable: settings.resizable,
            window: None,
            create_error: None,
            close_requested: false,
            pending_resize: None,
            input: InputState::default(),
        };

        for _ in 0..OPEN_ATTEMPTS {
            let status = event_loop.pump_app_events(Some(OPEN_PUMP_TIMEOUT), &mut handler);

            if let Some(reason) = handler.create_error.take() {
                return Err(Error::Window(format!("failed to create window: {reason}")).into());
            }
            if let PumpStatus::Exit(code) = status {
                return Err(Error::Window(format!("event loop exited with code {code} while opening")).into());
            }
            if let Some(window) = handler.window.clone() {
                // The first frame fits itself to the actual size.
                handler.pending_resize = None;
                log::debug!("window '{}' opened", handler.title);
                return Ok((Self { event_loop, handler }, window));
            }
        }

        Err(Error::Window("platform never delivered a resumed event".into()).into())
    }

    pub fn window(&self) -> Option<&Arc<Window>> {
        self.handler.window.as_ref()
    }
}

impl Platform for WinitPlatform {
    fn poll_events(&mut self) {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.handler);
        if let PumpStatus::Exit(code) = status {
            log::debug!("event loop exited with code {code}");
            self.handler.close_requested = true;
        }
    }

    fn should_close(&self) -> bool {
        self.handler.close_requested
    }

    fn request_close(&mut self) {
        self.handler.close_requested = true;
    }

    fn size_in_pixels(&self) -> (u32, u32) {
        self.handler
            .window
            .as_ref()
            .map(|w| {
                let size = w.inner_size();
                (size.width, size.height)
            })
            .unwrap_or((0, 0))
    }

    fn input(&self) -> &InputState {
        &self.handler.input
    }

    fn take_resize(&mut self) -> Option<(u32, u32)> {
        self.handler
            .pending_resize
            .take()
            .map(|s| (s.width, s.height))
    }

    fn end_input_frame(&mut self) {
        self.handler.input.end_frame();
    }
}

impl ApplicationHandler for WindowHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(self.initial_size)
            .with_resizable(self.resizable);

        match event_loop.create_window(attributes) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => self.create_error = Some(e.to_string()),
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::debug!("close requested");
                self.close_requested = true;
            }

            WindowEvent::Resized(size) => self.pending_resize = Some(size),

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = &self.window {
                    self.pending_resize = Some(window.inner_size());
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let pressed = event.state == ElementState::Pressed;
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.input.apply_event(InputEvent::Key { code, pressed });
                }
                if pressed {
                    if let Some(text) = event.text.filter(|t| !t.is_empty()) {
                        self.input.apply_event(InputEvent::Text(text.to_string()));
                    }
                }
            }

            other => {
                if let Some(ev) = translate_input_event(&other) {
                    self.input.apply_event(ev);
                }
            }
        }
    }
}

fn translate_input_event(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::Focused(f) => Some(InputEvent::Focused(*f)),

        WindowEvent::CursorLeft { .. } => Some(InputEvent::PointerLeft),

        WindowEvent::CursorMoved { position, .. } => Some(InputEvent::PointerMoved(Vec2::new(
            position.x as f32,
            position.y as f32,
        ))),

        WindowEvent::MouseInput { state, button, .. } => Some(InputEvent::Button {
            button: map_mouse_button(*button),
            pressed: *state == ElementState::Pressed,
        }),

        WindowEvent::MouseWheel { delta, .. } => Some(InputEvent::Wheel(wheel_lines(*delta))),

        WindowEvent::Ime(winit::event::Ime::Commit(text)) if !text.is_empty() => {
            Some(InputEvent::Text(text.clone()))
        }

        _ => None,
    }
}

fn wheel_lines(delta: MouseScrollDelta) -> Vec2 {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => Vec2::new(x, y),
        MouseScrollDelta::PixelDelta(p) => {
            Vec2::new(p.x as f32, p.y as f32) / PIXELS_PER_LINE
        }
    }
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Other(3),
        WinitMouseButton::Forward => MouseButton::Other(4),
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn pixel_wheel_deltas_become_lines() {
        let d = wheel_lines(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 40.0)));
        assert_eq!(d, Vec2::new(0.0, 2.0));
        assert_eq!(wheel_lines(MouseScrollDelta::LineDelta(1.0, -1.0)), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn extra_buttons_map_to_other() {
        assert_eq!(map_mouse_button(WinitMouseButton::Left), MouseButton::Left);
        assert_eq!(map_mouse_button(WinitMouseButton::Back), MouseButton::Other(3));
        assert_eq!(map_mouse_button(WinitMouseButton::Other(9)), MouseButton::Other(9));
    }

    #[test]
    fn focus_and_pointer_events_translate() {
        assert_eq!(
            translate_input_event(&WindowEvent::Focused(true)),
            Some(InputEvent::Focused(true))
        );
        assert_eq!(
            translate_input_event(&WindowEvent::Ime(winit::event::Ime::Commit("é".into()))),
            Some(InputEvent::Text("é".into()))
        );
        assert_eq!(translate_input_event(&WindowEvent::Destroyed), None);
    }
}
