use std::collections::HashSet;

use crate::platform::PlatformEvent;

use super::types::{KeySymbol, MouseButton, Scancode};

/// Held keys/buttons and the last known pointer position.
///
/// Updated by the event dispatcher before each callback runs, so a callback already
/// sees its own event reflected here.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<KeySymbol>,
    scancodes_down: HashSet<Scancode>,
    buttons_down: HashSet<MouseButton>,
    pointer: Option<(f32, f32)>,
}

impl InputState {
    pub(crate) fn apply(&mut self, event: &PlatformEvent) {
        match event {
            PlatformEvent::KeyDown {
                symbol, scancode, ..
            } => {
                self.keys_down.insert(*symbol);
                self.scancodes_down.insert(*scancode);
            }
            PlatformEvent::KeyUp { symbol, scancode } => {
                self.keys_down.remove(symbol);
                self.scancodes_down.remove(scancode);
            }
            PlatformEvent::MouseMoved { x, y } => {
                self.pointer = Some((*x, *y));
            }
            PlatformEvent::MouseButtonDown(ev) => {
                self.pointer = Some((ev.x, ev.y));
                self.buttons_down.insert(ev.button);
            }
            PlatformEvent::MouseButtonUp(ev) => {
                self.pointer = Some((ev.x, ev.y));
                self.buttons_down.remove(&ev.button);
            }
            _ => {}
        }
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_key_down(&self, symbol: KeySymbol) -> bool {
        self.keys_down.contains(&symbol)
    }

    pub fn is_scancode_down(&self, scancode: Scancode) -> bool {
        self.scancodes_down.contains(&scancode)
    }

    pub fn is_mouse_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    /// Pointer position in logical pixels, if the pointer has been seen.
    pub fn mouse_position(&self) -> Option<(f32, f32)> {
        self.pointer
    }
}
