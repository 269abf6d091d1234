use winit::dpi::PhysicalPosition;
use winit::event::{
    ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, TouchPhase, WindowEvent,
};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::input::{Action, Button, InputEvent, Key, KeyEvent, MouseEvent, ScrollEvent};

/// Translates winit window events into portable input events.
///
/// winit reports button presses without a position, so the translator keeps
/// the last cursor position it saw.
#[derive(Debug, Default)]
pub struct WinitTranslator {
    pointer: (i32, i32),
}

impl WinitTranslator {
    /// Returns `None` for events the input subsystem does not represent.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer = to_pixels(*position);
                Some(self.mouse(Button::None, Action::Move))
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let button = map_mouse_button(*button)?;
                Some(self.mouse(button, map_state(*state)))
            }

            WindowEvent::Touch(touch) => {
                self.pointer = to_pixels(touch.location);
                let action = match touch.phase {
                    TouchPhase::Started => Action::Down,
                    TouchPhase::Moved => Action::Move,
                    TouchPhase::Ended | TouchPhase::Cancelled => Action::Up,
                };
                let button = if action == Action::Move { Button::None } else { Button::Left };
                Some(self.mouse(button, action))
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let (dx, dy) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => (f64::from(*x), f64::from(*y)),
                    MouseScrollDelta::PixelDelta(p) => (p.x, p.y),
                };
                Some(InputEvent::Scroll(ScrollEvent::from_delta(dx, dy)))
            }

            WindowEvent::KeyboardInput { event, .. } => Some(InputEvent::Key(KeyEvent {
                key: map_key(event.physical_key),
                text: event.text.as_ref().map(|t| t.to_string()),
                action: map_state(event.state),
            })),

            _ => None,
        }
    }

    fn mouse(&self, button: Button, action: Action) -> InputEvent {
        let (x, y) = self.pointer;
        InputEvent::Mouse(MouseEvent { x, y, button, action })
    }
}

fn to_pixels(pos: PhysicalPosition<f64>) -> (i32, i32) {
    (pos.x.round() as i32, pos.y.round() as i32)
}

fn map_state(state: ElementState) -> Action {
    match state {
        ElementState::Pressed => Action::Down,
        ElementState::Released => Action::Up,
    }
}

fn map_mouse_button(b: WinitMouseButton) -> Option<Button> {
    match b {
        WinitMouseButton::Left => Some(Button::Left),
        WinitMouseButton::Middle => Some(Button::Middle),
        WinitMouseButton::Right => Some(Button::Right),
        _ => None,
    }
}

fn map_key(pk: PhysicalKey) -> Key {
    let PhysicalKey::Code(code) = pk else {
        // NativeKeyCode carries no stable numeric in winit 0.30.
        return Key::Unknown(0);
    };

    match code {
        KeyCode::KeyA => Key::A,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,

        KeyCode::Digit0 => Key::Digit0,
        KeyCode::Digit1 => Key::Digit1,
        KeyCode::Digit2 => Key::Digit2,
        KeyCode::Digit3 => Key::Digit3,
        KeyCode::Digit4 => Key::Digit4,
        KeyCode::Digit5 => Key::Digit5,
        KeyCode::Digit6 => Key::Digit6,
        KeyCode::Digit7 => Key::Digit7,
        KeyCode::Digit8 => Key::Digit8,
        KeyCode::Digit9 => Key::Digit9,

        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Space => Key::Space,
        KeyCode::Minus => Key::Minus,
        KeyCode::Equal => Key::Equal,
        KeyCode::BracketLeft => Key::BracketLeft,
        KeyCode::BracketRight => Key::BracketRight,
        KeyCode::Backslash => Key::Backslash,
        KeyCode::Semicolon => Key::Semicolon,
        KeyCode::Quote => Key::Quote,
        KeyCode::Backquote => Key::Backquote,
        KeyCode::Comma => Key::Comma,
        KeyCode::Period => Key::Period,
        KeyCode::Slash => Key::Slash,

        KeyCode::NumpadDivide => Key::NumpadDivide,
        KeyCode::NumpadMultiply => Key::NumpadMultiply,
        KeyCode::NumpadSubtract => Key::NumpadSubtract,
        KeyCode::NumpadAdd => Key::NumpadAdd,
        KeyCode::NumpadEnter => Key::NumpadEnter,
        KeyCode::NumpadDecimal => Key::NumpadDecimal,
        KeyCode::NumpadEqual => Key::NumpadEqual,
        KeyCode::Numpad0 => Key::Numpad0,
        KeyCode::Numpad1 => Key::Numpad1,
        KeyCode::Numpad2 => Key::Numpad2,
        KeyCode::Numpad3 => Key::Numpad3,
        KeyCode::Numpad4 => Key::Numpad4,
        KeyCode::Numpad5 => Key::Numpad5,
        KeyCode::Numpad6 => Key::Numpad6,
        KeyCode::Numpad7 => Key::Numpad7,
        KeyCode::Numpad8 => Key::Numpad8,
        KeyCode::Numpad9 => Key::Numpad9,

        KeyCode::Escape => Key::Escape,
        KeyCode::CapsLock => Key::CapsLock,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Pause => Key::Pause,
        KeyCode::Insert => Key::Insert,
        KeyCode::Home => Key::Home,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::Delete => Key::Delete,
        KeyCode::End => Key::End,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::NumLock => Key::NumLock,
        KeyCode::Help => Key::Help,
        KeyCode::AudioVolumeMute => Key::Mute,
        KeyCode::AudioVolumeUp => Key::VolumeUp,
        KeyCode::AudioVolumeDown => Key::VolumeDown,

        KeyCode::F1 => Key::F1,
        KeyCode::F2 => Key::F2,
        KeyCode::F3 => Key::F3,
        KeyCode::F4 => Key::F4,
        KeyCode::F5 => Key::F5,
        KeyCode::F6 => Key::F6,
        KeyCode::F7 => Key::F7,
        KeyCode::F8 => Key::F8,
        KeyCode::F9 => Key::F9,
        KeyCode::F10 => Key::F10,
        KeyCode::F11 => Key::F11,
        KeyCode::F12 => Key::F12,

        KeyCode::ControlLeft => Key::ControlLeft,
        KeyCode::ShiftLeft => Key::ShiftLeft,
        KeyCode::AltLeft => Key::AltLeft,
        KeyCode::SuperLeft => Key::SuperLeft,
        KeyCode::ControlRight => Key::ControlRight,
        KeyCode::ShiftRight => Key::ShiftRight,
        KeyCode::AltRight => Key::AltRight,
        KeyCode::SuperRight => Key::SuperRight,

        other => Key::Unknown(other as u32),
    }
}
