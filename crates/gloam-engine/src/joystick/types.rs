use std::fmt;

/// Backend-assigned identifier of a connected joystick.
///
/// Unique among currently connected devices. Not stable across unplug/replug.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct InstanceId(pub u32);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a joystick hat (d-pad style switch).
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum JoystickHat {
    #[default]
    Centered,
    Up,
    Right,
    Down,
    Left,
    RightUp,
    RightDown,
    LeftUp,
    LeftDown,
}

impl JoystickHat {
    pub const UP_BIT: u8 = 0x01;
    pub const RIGHT_BIT: u8 = 0x02;
    pub const DOWN_BIT: u8 = 0x04;
    pub const LEFT_BIT: u8 = 0x08;

    /// Decodes a native hat bitmask. Contradictory bits resolve to `Centered`.
    pub fn from_bits(bits: u8) -> Self {
        let up = bits & Self::UP_BIT != 0;
        let right = bits & Self::RIGHT_BIT != 0;
        let down = bits & Self::DOWN_BIT != 0;
        let left = bits & Self::LEFT_BIT != 0;

        match (up, right, down, left) {
            (true, false, false, false) => JoystickHat::Up,
            (false, true, false, false) => JoystickHat::Right,
            (false, false, true, false) => JoystickHat::Down,
            (false, false, false, true) => JoystickHat::Left,
            (true, true, false, false) => JoystickHat::RightUp,
            (false, true, true, false) => JoystickHat::RightDown,
            (true, false, false, true) => JoystickHat::LeftUp,
            (false, false, true, true) => JoystickHat::LeftDown,
            _ => JoystickHat::Centered,
        }
    }

    /// Builds a hat position from four directional switches.
    pub fn from_directions(up: bool, right: bool, down: bool, left: bool) -> Self {
        let mut bits = 0;
        if up {
            bits |= Self::UP_BIT;
        }
        if right {
            bits |= Self::RIGHT_BIT;
        }
        if down {
            bits |= Self::DOWN_BIT;
        }
        if left {
            bits |= Self::LEFT_BIT;
        }
        Self::from_bits(bits)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JoystickHat::Centered => "c",
            JoystickHat::Up => "u",
            JoystickHat::Right => "r",
            JoystickHat::Down => "d",
            JoystickHat::Left => "l",
            JoystickHat::RightUp => "ru",
            JoystickHat::RightDown => "rd",
            JoystickHat::LeftUp => "lu",
            JoystickHat::LeftDown => "ld",
        }
    }
}

/// Virtual gamepad axis in the standard controller layout.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GamepadAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    TriggerLeft,
    TriggerRight,
}

impl GamepadAxis {
    pub const ALL: [GamepadAxis; 6] = [
        GamepadAxis::LeftX,
        GamepadAxis::LeftY,
        GamepadAxis::RightX,
        GamepadAxis::RightY,
        GamepadAxis::TriggerLeft,
        GamepadAxis::TriggerRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GamepadAxis::LeftX => "leftx",
            GamepadAxis::LeftY => "lefty",
            GamepadAxis::RightX => "rightx",
            GamepadAxis::RightY => "righty",
            GamepadAxis::TriggerLeft => "triggerleft",
            GamepadAxis::TriggerRight => "triggerright",
        }
    }
}

/// Virtual gamepad button in the standard controller layout.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GamepadButton {
    A,
    B,
    X,
    Y,
    Back,
    Guide,
    Start,
    LeftStick,
    RightStick,
    LeftShoulder,
    RightShoulder,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
}

impl GamepadButton {
    pub const ALL: [GamepadButton; 15] = [
        GamepadButton::A,
        GamepadButton::B,
        GamepadButton::X,
        GamepadButton::Y,
        GamepadButton::Back,
        GamepadButton::Guide,
        GamepadButton::Start,
        GamepadButton::LeftStick,
        GamepadButton::RightStick,
        GamepadButton::LeftShoulder,
        GamepadButton::RightShoulder,
        GamepadButton::DPadUp,
        GamepadButton::DPadDown,
        GamepadButton::DPadLeft,
        GamepadButton::DPadRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GamepadButton::A => "a",
            GamepadButton::B => "b",
            GamepadButton::X => "x",
            GamepadButton::Y => "y",
            GamepadButton::Back => "back",
            GamepadButton::Guide => "guide",
            GamepadButton::Start => "start",
            GamepadButton::LeftStick => "leftstick",
            GamepadButton::RightStick => "rightstick",
            GamepadButton::LeftShoulder => "leftshoulder",
            GamepadButton::RightShoulder => "rightshoulder",
            GamepadButton::DPadUp => "dpup",
            GamepadButton::DPadDown => "dpdown",
            GamepadButton::DPadLeft => "dpleft",
            GamepadButton::DPadRight => "dpright",
        }
    }
}

impl fmt::Display for JoystickHat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for GamepadAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for GamepadButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// USB identification of a device. Zero where the backend cannot tell.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct DeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub product_version: u16,
}

/// Rumble motor strengths in `[0, 1]`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct VibrationStrength {
    pub left: f32,
    pub right: f32,
}

/// Maps a raw signed 16-bit axis reading onto `[-1, 1]`.
///
/// Negative readings divide by 32768 and positive ones by 32767, so both extremes
/// land exactly on -1 and 1 and 0 stays at 0.
pub fn normalize_axis(raw: i16) -> f32 {
    if raw < 0 {
        f32::from(raw) / 32768.0
    } else {
        f32::from(raw) / 32767.0
    }
}
