//! winit key/button translation.

use winit::dpi::PhysicalPosition;
use winit::event::MouseButton as WinitMouseButton;
use winit::keyboard::{Key as WinitKey, KeyCode, NamedKey, PhysicalKey};
use winit::window::Window;

use crate::input::{KeySymbol, MouseButton, Scancode};

pub(crate) fn to_logical_f32(window: &Window, pos: PhysicalPosition<f64>) -> (f32, f32) {
    let scale = window.scale_factor();
    let logical = pos.to_logical::<f64>(scale);
    (logical.x as f32, logical.y as f32)
}

pub(crate) fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

/// Logical key (layout-aware) to symbol.
pub(crate) fn map_symbol(key: &WinitKey) -> KeySymbol {
    match key {
        WinitKey::Named(named) => match named {
            NamedKey::Escape => KeySymbol::Escape,
            NamedKey::Enter => KeySymbol::Enter,
            NamedKey::Tab => KeySymbol::Tab,
            NamedKey::Backspace => KeySymbol::Backspace,
            NamedKey::Space => KeySymbol::Space,

            NamedKey::Insert => KeySymbol::Insert,
            NamedKey::Delete => KeySymbol::Delete,
            NamedKey::Home => KeySymbol::Home,
            NamedKey::End => KeySymbol::End,
            NamedKey::PageUp => KeySymbol::PageUp,
            NamedKey::PageDown => KeySymbol::PageDown,

            NamedKey::ArrowUp => KeySymbol::ArrowUp,
            NamedKey::ArrowDown => KeySymbol::ArrowDown,
            NamedKey::ArrowLeft => KeySymbol::ArrowLeft,
            NamedKey::ArrowRight => KeySymbol::ArrowRight,

            NamedKey::Shift => KeySymbol::Shift,
            NamedKey::Control => KeySymbol::Control,
            NamedKey::Alt => KeySymbol::Alt,
            NamedKey::Super | NamedKey::Meta => KeySymbol::Meta,

            NamedKey::F1 => KeySymbol::F1,
            NamedKey::F2 => KeySymbol::F2,
            NamedKey::F3 => KeySymbol::F3,
            NamedKey::F4 => KeySymbol::F4,
            NamedKey::F5 => KeySymbol::F5,
            NamedKey::F6 => KeySymbol::F6,
            NamedKey::F7 => KeySymbol::F7,
            NamedKey::F8 => KeySymbol::F8,
            NamedKey::F9 => KeySymbol::F9,
            NamedKey::F10 => KeySymbol::F10,
            NamedKey::F11 => KeySymbol::F11,
            NamedKey::F12 => KeySymbol::F12,

            _ => KeySymbol::Unknown(0),
        },

        WinitKey::Character(text) => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeySymbol::from_char(c).unwrap_or(KeySymbol::Unknown(c as u32)),
                _ => KeySymbol::Unknown(0),
            }
        }

        // Unidentified and dead keys carry no stable numeric.
        _ => KeySymbol::Unknown(0),
    }
}

/// Physical key position to scancode.
pub(crate) fn map_scancode(pk: PhysicalKey) -> Scancode {
    match pk {
        PhysicalKey::Code(code) => match code {
            KeyCode::Escape => Scancode::Escape,
            KeyCode::Enter => Scancode::Enter,
            KeyCode::Tab => Scancode::Tab,
            KeyCode::Backspace => Scancode::Backspace,
            KeyCode::Space => Scancode::Space,

            KeyCode::Insert => Scancode::Insert,
            KeyCode::Delete => Scancode::Delete,
            KeyCode::Home => Scancode::Home,
            KeyCode::End => Scancode::End,
            KeyCode::PageUp => Scancode::PageUp,
            KeyCode::PageDown => Scancode::PageDown,

            KeyCode::ArrowUp => Scancode::ArrowUp,
            KeyCode::ArrowDown => Scancode::ArrowDown,
            KeyCode::ArrowLeft => Scancode::ArrowLeft,
            KeyCode::ArrowRight => Scancode::ArrowRight,

            KeyCode::ShiftLeft => Scancode::ShiftLeft,
            KeyCode::ShiftRight => Scancode::ShiftRight,
            KeyCode::ControlLeft => Scancode::ControlLeft,
            KeyCode::ControlRight => Scancode::ControlRight,
            KeyCode::AltLeft => Scancode::AltLeft,
            KeyCode::AltRight => Scancode::AltRight,
            KeyCode::SuperLeft => Scancode::SuperLeft,
            KeyCode::SuperRight => Scancode::SuperRight,

            KeyCode::KeyA => Scancode::A,
            KeyCode::KeyB => Scancode::B,
            KeyCode::KeyC => Scancode::C,
            KeyCode::KeyD => Scancode::D,
            KeyCode::KeyE => Scancode::E,
            KeyCode::KeyF => Scancode::F,
            KeyCode::KeyG => Scancode::G,
            KeyCode::KeyH => Scancode::H,
            KeyCode::KeyI => Scancode::I,
            KeyCode::KeyJ => Scancode::J,
            KeyCode::KeyK => Scancode::K,
            KeyCode::KeyL => Scancode::L,
            KeyCode::KeyM => Scancode::M,
            KeyCode::KeyN => Scancode::N,
            KeyCode::KeyO => Scancode::O,
            KeyCode::KeyP => Scancode::P,
            KeyCode::KeyQ => Scancode::Q,
            KeyCode::KeyR => Scancode::R,
            KeyCode::KeyS => Scancode::S,
            KeyCode::KeyT => Scancode::T,
            KeyCode::KeyU => Scancode::U,
            KeyCode::KeyV => Scancode::V,
            KeyCode::KeyW => Scancode::W,
            KeyCode::KeyX => Scancode::X,
            KeyCode::KeyY => Scancode::Y,
            KeyCode::KeyZ => Scancode::Z,

            KeyCode::Digit0 => Scancode::Digit0,
            KeyCode::Digit1 => Scancode::Digit1,
            KeyCode::Digit2 => Scancode::Digit2,
            KeyCode::Digit3 => Scancode::Digit3,
            KeyCode::Digit4 => Scancode::Digit4,
            KeyCode::Digit5 => Scancode::Digit5,
            KeyCode::Digit6 => Scancode::Digit6,
            KeyCode::Digit7 => Scancode::Digit7,
            KeyCode::Digit8 => Scancode::Digit8,
            KeyCode::Digit9 => Scancode::Digit9,

            KeyCode::F1 => Scancode::F1,
            KeyCode::F2 => Scancode::F2,
            KeyCode::F3 => Scancode::F3,
            KeyCode::F4 => Scancode::F4,
            KeyCode::F5 => Scancode::F5,
            KeyCode::F6 => Scancode::F6,
            KeyCode::F7 => Scancode::F7,
            KeyCode::F8 => Scancode::F8,
            KeyCode::F9 => Scancode::F9,
            KeyCode::F10 => Scancode::F10,
            KeyCode::F11 => Scancode::F11,
            KeyCode::F12 => Scancode::F12,

            _ => Scancode::Unknown(0),
        },

        // winit 0.30 uses NativeKeyCode; no stable numeric is guaranteed here.
        PhysicalKey::Unidentified(_) => Scancode::Unknown(0),
    }
}
