//! Native platform boundary.
//!
//! The session controller only talks to a backend through [`Platform`]: subsystem
//! lifecycle, the event queue, the tick source, device opening and the window.
//! - `headless`: in-process backend with scriptable events and virtual devices
//! - `desktop`: winit window + wgpu presentation, gilrs joysticks behind `gamepad`

mod event;
pub mod headless;

#[cfg(any(target_os = "windows", target_os = "macos", target_os = "linux"))]
pub mod desktop;

pub use event::{MouseButtonEvent, PlatformEvent};

use std::fmt;

use crate::config::ModulesConfig;
use crate::joystick::{DeviceInfo, GamepadAxis, GamepadButton, InstanceId, JoystickHat};
use crate::time::TimeSource;
use crate::window::Window;

/// Native subsystems a run brings up.
///
/// This is stored as booleans rather than bitflags to keep it explicit and stable.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Subsystems {
    pub video: bool,
    pub events: bool,
    pub joystick: bool,
    pub gamepad: bool,
}

impl Subsystems {
    pub const NONE: Subsystems = Subsystems {
        video: false,
        events: false,
        joystick: false,
        gamepad: false,
    };

    pub const ALL: Subsystems = Subsystems {
        video: true,
        events: true,
        joystick: true,
        gamepad: true,
    };

    pub fn is_empty(&self) -> bool {
        !(self.video || self.events || self.joystick || self.gamepad)
    }

    /// Every subsystem present in either set.
    pub fn union(self, other: Subsystems) -> Self {
        Self {
            video: self.video || other.video,
            events: self.events || other.events,
            joystick: self.joystick || other.joystick,
            gamepad: self.gamepad || other.gamepad,
        }
    }

    /// Subsystems in `self` that `other` lacks.
    pub fn difference(self, other: Subsystems) -> Self {
        Self {
            video: self.video && !other.video,
            events: self.events && !other.events,
            joystick: self.joystick && !other.joystick,
            gamepad: self.gamepad && !other.gamepad,
        }
    }

    /// Subsystems needed by the enabled engine modules.
    ///
    /// Keyboard and mouse input ride on the event subsystem.
    pub fn from_modules(modules: &ModulesConfig) -> Self {
        Self {
            video: modules.window,
            events: modules.event || modules.keyboard || modules.mouse,
            joystick: modules.joystick,
            gamepad: modules.joystick,
        }
    }
}

impl fmt::Display for Subsystems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }

        let names = [
            (self.video, "video"),
            (self.events, "events"),
            (self.joystick, "joystick"),
            (self.gamepad, "gamepad"),
        ];
        let mut first = true;
        for (enabled, name) in names {
            if enabled {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Native handle of an opened joystick.
///
/// Queries take `&self`; only `close` mutates. Raw axis values are signed 16-bit.
pub trait JoystickHandle {
    fn name(&self) -> String;
    fn guid(&self) -> String;
    fn device_info(&self) -> DeviceInfo;

    fn axis_count(&self) -> usize;
    fn axis(&self, index: usize) -> i16;
    fn button_count(&self) -> usize;
    fn button(&self, index: usize) -> bool;
    fn hat_count(&self) -> usize;
    fn hat(&self, index: usize) -> JoystickHat;

    fn is_connected(&self) -> bool {
        true
    }

    fn supports_rumble(&self) -> bool {
        false
    }

    /// Starts rumble on the low/high frequency motors for `duration_ms`.
    fn rumble(&self, low: u16, high: u16, duration_ms: u32) -> anyhow::Result<()> {
        let _ = (low, high, duration_ms);
        anyhow::bail!("rumble is not supported by this device")
    }

    /// Releases the native handle. Called at most once.
    fn close(&mut self);
}

/// Native handle of the gamepad view over a joystick with a known mapping.
pub trait GamepadHandle {
    fn axis(&self, axis: GamepadAxis) -> i16;
    fn button(&self, button: GamepadButton) -> bool;
    fn mapping(&self) -> Option<String>;
    fn close(&mut self);
}

/// Handles produced by [`Platform::open_joystick`].
pub struct OpenedJoystick {
    pub joystick: Box<dyn JoystickHandle>,
    /// Present when the backend recognizes the device as a gamepad.
    pub gamepad: Option<Box<dyn GamepadHandle>>,
}

/// Native backend driven by the session controller.
pub trait Platform {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    fn init_subsystems(&mut self, subsystems: Subsystems) -> anyhow::Result<()>;
    fn quit_subsystems(&mut self, subsystems: Subsystems);

    /// Gathers pending native events into the queue. Called once per frame before polling.
    fn pump_events(&mut self) {}

    fn poll_event(&mut self) -> Option<PlatformEvent>;

    /// Tick source for the run's clock.
    fn time_source(&self) -> Box<dyn TimeSource>;

    fn open_joystick(&mut self, id: InstanceId) -> anyhow::Result<OpenedJoystick>;

    fn window(&mut self) -> &mut dyn Window;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subsystems_follow_modules() {
        let mut modules = ModulesConfig::default();
        assert_eq!(Subsystems::from_modules(&modules), Subsystems::ALL);

        modules.joystick = false;
        modules.window = false;
        let subsystems = Subsystems::from_modules(&modules);
        assert!(!subsystems.video && !subsystems.joystick && !subsystems.gamepad);
        assert!(subsystems.events);
        assert_eq!(subsystems.to_string(), "events");
        assert_eq!(Subsystems::NONE.to_string(), "none");
        assert_eq!(Subsystems::ALL.to_string(), "video|events|joystick|gamepad");
    }

    #[test]
    fn subsystem_set_operations() {
        let video = Subsystems {
            video: true,
            ..Subsystems::NONE
        };
        let events = Subsystems {
            events: true,
            ..Subsystems::NONE
        };

        assert_eq!(video.union(events).to_string(), "video|events");
        assert_eq!(Subsystems::ALL.difference(video).to_string(), "events|joystick|gamepad");
        assert!(video.difference(Subsystems::ALL).is_empty());
    }
}
