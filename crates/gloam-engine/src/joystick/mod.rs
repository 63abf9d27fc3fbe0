//! Joystick devices and the hot-plug registry.
//!
//! The registry owns every open device keyed by backend instance id. Devices are
//! opened on connect and disposed exactly once on disconnect or session teardown.

mod device;
mod registry;
mod types;

pub use device::Joystick;
pub use registry::DeviceRegistry;
pub use types::{
    normalize_axis,
    DeviceInfo,
    GamepadAxis,
    GamepadButton,
    InstanceId,
    JoystickHat,
    VibrationStrength,
};
