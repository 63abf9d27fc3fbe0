use crate::input::{KeySymbol, MouseButton, Scancode};
use crate::joystick::{GamepadAxis, GamepadButton, InstanceId, JoystickHat};

/// Mouse button press/release in logical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MouseButtonEvent {
    pub x: f32,
    pub y: f32,
    pub button: MouseButton,
    /// True when the event was synthesized from a touch.
    pub is_touch: bool,
    /// Consecutive click count (1 = single, 2 = double, ...).
    pub clicks: u8,
}

/// Native events, already decoded into engine identifiers.
///
/// Raw axis values stay signed 16-bit; normalization happens in the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    Quit,

    KeyDown {
        symbol: KeySymbol,
        scancode: Scancode,
        repeat: bool,
    },
    KeyUp {
        symbol: KeySymbol,
        scancode: Scancode,
    },

    MouseMoved {
        x: f32,
        y: f32,
    },
    MouseButtonDown(MouseButtonEvent),
    MouseButtonUp(MouseButtonEvent),

    JoystickAdded(InstanceId),
    JoystickRemoved(InstanceId),
    JoystickAxis {
        id: InstanceId,
        axis: u8,
        value: i16,
    },
    JoystickButtonDown {
        id: InstanceId,
        button: u8,
    },
    JoystickButtonUp {
        id: InstanceId,
        button: u8,
    },
    JoystickHat {
        id: InstanceId,
        hat: u8,
        value: JoystickHat,
    },

    GamepadAxis {
        id: InstanceId,
        axis: GamepadAxis,
        value: i16,
    },
    GamepadButtonDown {
        id: InstanceId,
        button: GamepadButton,
    },
    GamepadButtonUp {
        id: InstanceId,
        button: GamepadButton,
    },
}

impl PlatformEvent {
    /// Short event name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PlatformEvent::Quit => "quit",
            PlatformEvent::KeyDown { .. } => "key-down",
            PlatformEvent::KeyUp { .. } => "key-up",
            PlatformEvent::MouseMoved { .. } => "mouse-moved",
            PlatformEvent::MouseButtonDown(_) => "mouse-button-down",
            PlatformEvent::MouseButtonUp(_) => "mouse-button-up",
            PlatformEvent::JoystickAdded(_) => "joystick-added",
            PlatformEvent::JoystickRemoved(_) => "joystick-removed",
            PlatformEvent::JoystickAxis { .. } => "joystick-axis",
            PlatformEvent::JoystickButtonDown { .. } => "joystick-button-down",
            PlatformEvent::JoystickButtonUp { .. } => "joystick-button-up",
            PlatformEvent::JoystickHat { .. } => "joystick-hat",
            PlatformEvent::GamepadAxis { .. } => "gamepad-axis",
            PlatformEvent::GamepadButtonDown { .. } => "gamepad-button-down",
            PlatformEvent::GamepadButtonUp { .. } => "gamepad-button-up",
        }
    }
}
