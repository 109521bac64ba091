use std::collections::HashSet;

use glam::Vec2;
use winit::keyboard::KeyCode;

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Platform-agnostic input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer moved; position in physical pixels.
    PointerMoved(Vec2),
    PointerLeft,
    Button { button: MouseButton, pressed: bool },
    Key { code: KeyCode, pressed: bool },
    /// Wheel delta in lines.
    Wheel(Vec2),
    Text(String),
    Focused(bool),
}

/// Current input state for the window plus this frame's transitions.
#[derive(Debug, Default)]
pub struct InputState {
    pub focused: bool,

    /// Pointer position in physical pixels.
    pub pointer_pos: Option<Vec2>,

    pub keys_down: HashSet<KeyCode>,
    pub buttons_down: HashSet<MouseButton>,

    /// Keys that went down this frame.
    pub keys_pressed: HashSet<KeyCode>,
    pub keys_released: HashSet<KeyCode>,
    pub buttons_pressed: HashSet<MouseButton>,
    pub buttons_released: HashSet<MouseButton>,

    /// Accumulated wheel delta this frame.
    pub wheel: Vec2,

    /// Text committed this frame.
    pub text: String,
}

impl InputState {
    pub fn apply_event(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::Focused(f) => {
                self.focused = f;
                if !f {
                    // Avoid stuck keys/buttons when focus changes mid-press.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }
            InputEvent::PointerMoved(p) => self.pointer_pos = Some(p),
            InputEvent::PointerLeft => self.pointer_pos = None,
            InputEvent::Key { code, pressed: true } => {
                if self.keys_down.insert(code) {
                    self.keys_pressed.insert(code);
                }
            }
            InputEvent::Key { code, pressed: false } => {
                if self.keys_down.remove(&code) {
                    self.keys_released.insert(code);
                }
            }
            InputEvent::Button { button, pressed: true } => {
                if self.buttons_down.insert(button) {
                    self.buttons_pressed.insert(button);
                }
            }
            InputEvent::Button { button, pressed: false } => {
                if self.buttons_down.remove(&button) {
                    self.buttons_released.insert(button);
                }
            }
            InputEvent::Wheel(d) => self.wheel += d,
            InputEvent::Text(t) => self.text.push_str(&t),
        }
    }

    /// Clears per-frame transitions. Held state is kept.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.buttons_pressed.clear();
        self.buttons_released.clear();
        self.wheel = Vec2::ZERO;
        self.text.clear();
    }

    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_records_transition_once() {
        let mut input = InputState::default();
        input.apply_event(InputEvent::Key { code: KeyCode::KeyA, pressed: true });
        input.apply_event(InputEvent::Key { code: KeyCode::KeyA, pressed: true });
        assert!(input.key_down(KeyCode::KeyA));
        assert!(input.key_pressed(KeyCode::KeyA));

        input.end_frame();
        assert!(input.key_down(KeyCode::KeyA));
        assert!(!input.key_pressed(KeyCode::KeyA));
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut input = InputState::default();
        input.apply_event(InputEvent::Button { button: MouseButton::Left, pressed: true });
        input.apply_event(InputEvent::Focused(false));
        assert!(!input.button_down(MouseButton::Left));
    }

    #[test]
    fn wheel_and_text_accumulate_per_frame() {
        let mut input = InputState::default();
        input.apply_event(InputEvent::Wheel(Vec2::new(0.0, 1.0)));
        input.apply_event(InputEvent::Wheel(Vec2::new(0.0, 2.0)));
        input.apply_event(InputEvent::Text("ab".into()));
        input.apply_event(InputEvent::Text("c".into()));
        assert_eq!(input.wheel, Vec2::new(0.0, 3.0));
        assert_eq!(input.text, "abc");

        input.end_frame();
        assert_eq!(input.wheel, Vec2::ZERO);
        assert!(input.text.is_empty());
    }

    #[test]
    fn pointer_left_clears_position() {
        let mut input = InputState::default();
        input.apply_event(InputEvent::PointerMoved(Vec2::new(3.0, 4.0)));
        assert_eq!(input.pointer_pos, Some(Vec2::new(3.0, 4.0)));
        input.apply_event(InputEvent::PointerLeft);
        assert!(input.pointer_pos.is_none());
    }
}
