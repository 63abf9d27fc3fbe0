use std::fmt;

/// Layout-dependent key identifier (what the key produces).
///
/// Backends map their logical key values into these variants where possible.
/// Unsupported keys use `KeySymbol::Unknown(u32)` with the character or platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum KeySymbol {
    // Common control keys
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    // Modifiers as keys, side-agnostic
    Shift,
    Control,
    Alt,
    Meta,

    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Digits
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    // Function keys
    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    /// Key not yet represented here.
    Unknown(u32),
}

impl KeySymbol {
    /// Maps an ASCII letter or digit (either case) to its symbol.
    pub fn from_char(c: char) -> Option<Self> {
        const LETTERS: [KeySymbol; 26] = [
            KeySymbol::A, KeySymbol::B, KeySymbol::C, KeySymbol::D, KeySymbol::E,
            KeySymbol::F, KeySymbol::G, KeySymbol::H, KeySymbol::I, KeySymbol::J,
            KeySymbol::K, KeySymbol::L, KeySymbol::M, KeySymbol::N, KeySymbol::O,
            KeySymbol::P, KeySymbol::Q, KeySymbol::R, KeySymbol::S, KeySymbol::T,
            KeySymbol::U, KeySymbol::V, KeySymbol::W, KeySymbol::X, KeySymbol::Y,
            KeySymbol::Z,
        ];
        const DIGITS: [KeySymbol; 10] = [
            KeySymbol::Digit0, KeySymbol::Digit1, KeySymbol::Digit2, KeySymbol::Digit3,
            KeySymbol::Digit4, KeySymbol::Digit5, KeySymbol::Digit6, KeySymbol::Digit7,
            KeySymbol::Digit8, KeySymbol::Digit9,
        ];

        let c = c.to_ascii_lowercase();
        match c {
            'a'..='z' => Some(LETTERS[(c as u8 - b'a') as usize]),
            '0'..='9' => Some(DIGITS[(c as u8 - b'0') as usize]),
            ' ' => Some(KeySymbol::Space),
            _ => None,
        }
    }
}

/// Physical key position, independent of the keyboard layout.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Scancode {
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    AltLeft,
    AltRight,
    SuperLeft,
    SuperRight,

    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    /// Stable platform code for a position not represented here.
    Unknown(u32),
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

impl MouseButton {
    /// 1-based button index (left = 1, right = 2, middle = 3).
    pub fn index(&self) -> u16 {
        match self {
            MouseButton::Left => 1,
            MouseButton::Right => 2,
            MouseButton::Middle => 3,
            MouseButton::Back => 4,
            MouseButton::Forward => 5,
            MouseButton::Other(v) => v.saturating_add(6),
        }
    }
}

impl fmt::Display for KeySymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl fmt::Display for Scancode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chars_map_case_insensitively() {
        assert_eq!(KeySymbol::from_char('a'), Some(KeySymbol::A));
        assert_eq!(KeySymbol::from_char('Z'), Some(KeySymbol::Z));
        assert_eq!(KeySymbol::from_char('7'), Some(KeySymbol::Digit7));
        assert_eq!(KeySymbol::from_char('é'), None);
    }
}
