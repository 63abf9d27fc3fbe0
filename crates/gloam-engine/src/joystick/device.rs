use std::cell::Cell;
use std::fmt;
use std::time::Duration;

use crate::platform::{GamepadHandle, JoystickHandle, OpenedJoystick};

use super::types::{
    normalize_axis, DeviceInfo, GamepadAxis, GamepadButton, InstanceId, JoystickHat,
    VibrationStrength,
};

/// An opened joystick.
///
/// Once disposed every query returns a neutral value (0, empty, false, centered)
/// instead of touching the released native handle. Dropping an undisposed joystick
/// releases it as a fallback.
pub struct Joystick {
    id: u32,
    instance_id: InstanceId,
    handle: Option<Box<dyn JoystickHandle>>,
    gamepad: Option<Box<dyn GamepadHandle>>,
    name: String,
    guid: String,
    connected: bool,
    disposed: bool,
    vibration: Cell<VibrationStrength>,
}

impl Joystick {
    pub(crate) fn open(id: u32, instance_id: InstanceId, opened: OpenedJoystick) -> Self {
        let name = opened.joystick.name();
        let guid = opened.joystick.guid();
        Self {
            id,
            instance_id,
            handle: Some(opened.joystick),
            gamepad: opened.gamepad,
            name,
            guid,
            connected: true,
            disposed: false,
            vibration: Cell::new(VibrationStrength::default()),
        }
    }

    fn live(&self) -> Option<&dyn JoystickHandle> {
        if self.disposed {
            return None;
        }
        self.handle.as_deref()
    }

    fn live_gamepad(&self) -> Option<&dyn GamepadHandle> {
        if self.disposed {
            return None;
        }
        self.gamepad.as_deref()
    }

    /// Registry-assigned id, 1-based, in connection order.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    /// Name read at open time; still available after dispose.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// GUID read at open time; still available after dispose.
    pub fn guid(&self) -> &str {
        &self.guid
    }

    pub fn device_info(&self) -> DeviceInfo {
        self.live().map(|h| h.device_info()).unwrap_or_default()
    }

    pub fn is_connected(&self) -> bool {
        self.connected && self.live().is_some_and(|h| h.is_connected())
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn is_gamepad(&self) -> bool {
        self.live_gamepad().is_some()
    }

    pub fn axis_count(&self) -> usize {
        self.live().map_or(0, |h| h.axis_count())
    }

    /// Normalized axis value in `[-1, 1]`; 0 for out-of-range indices.
    pub fn axis(&self, index: usize) -> f32 {
        match self.live() {
            Some(h) if index < h.axis_count() => normalize_axis(h.axis(index)),
            _ => 0.0,
        }
    }

    pub fn axes(&self) -> Vec<f32> {
        (0..self.axis_count()).map(|i| self.axis(i)).collect()
    }

    pub fn button_count(&self) -> usize {
        self.live().map_or(0, |h| h.button_count())
    }

    pub fn is_down(&self, button: usize) -> bool {
        match self.live() {
            Some(h) if button < h.button_count() => h.button(button),
            _ => false,
        }
    }

    pub fn hat_count(&self) -> usize {
        self.live().map_or(0, |h| h.hat_count())
    }

    pub fn hat(&self, index: usize) -> JoystickHat {
        match self.live() {
            Some(h) if index < h.hat_count() => h.hat(index),
            _ => JoystickHat::Centered,
        }
    }

    /// Normalized gamepad axis; 0 when the device is not a gamepad.
    pub fn gamepad_axis(&self, axis: GamepadAxis) -> f32 {
        self.live_gamepad()
            .map_or(0.0, |g| normalize_axis(g.axis(axis)))
    }

    pub fn is_gamepad_down(&self, button: GamepadButton) -> bool {
        self.live_gamepad().is_some_and(|g| g.button(button))
    }

    pub fn gamepad_mapping(&self) -> Option<String> {
        self.live_gamepad().and_then(|g| g.mapping())
    }

    pub fn is_vibration_supported(&self) -> bool {
        self.live().is_some_and(|h| h.supports_rumble())
    }

    /// Starts rumble with motor strengths clamped to `[0, 1]`.
    ///
    /// `None` keeps the motors running until changed. Returns `false` when the device
    /// is disposed, cannot rumble, or the backend rejects the request.
    pub fn set_vibration(&self, left: f32, right: f32, duration: Option<Duration>) -> bool {
        let Some(handle) = self.live() else {
            return false;
        };
        if !handle.supports_rumble() {
            return false;
        }

        let left = if left.is_nan() { 0.0 } else { left.clamp(0.0, 1.0) };
        let right = if right.is_nan() { 0.0 } else { right.clamp(0.0, 1.0) };
        let duration_ms = duration
            .map(|d| u32::try_from(d.as_millis()).unwrap_or(u32::MAX))
            .unwrap_or(u32::MAX);

        let low = (left * f32::from(u16::MAX)).round() as u16;
        let high = (right * f32::from(u16::MAX)).round() as u16;

        match handle.rumble(low, high, duration_ms) {
            Ok(()) => {
                self.vibration.set(VibrationStrength { left, right });
                true
            }
            Err(e) => {
                log::debug!("joystick {}: rumble rejected: {e:#}", self.instance_id);
                false
            }
        }
    }

    /// Last vibration strengths that were accepted.
    pub fn vibration(&self) -> VibrationStrength {
        if self.disposed {
            return VibrationStrength::default();
        }
        self.vibration.get()
    }

    pub(crate) fn mark_disconnected(&mut self) {
        self.connected = false;
    }

    /// Releases the native handles. Subsequent calls are no-ops.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        if let Some(mut gamepad) = self.gamepad.take() {
            gamepad.close();
        }
        if let Some(mut handle) = self.handle.take() {
            handle.close();
        }

        self.connected = false;
        self.disposed = true;
        self.vibration.set(VibrationStrength::default());
        log::debug!("joystick {} ('{}') disposed", self.instance_id, self.name);
    }
}

impl Drop for Joystick {
    fn drop(&mut self) {
        if !self.disposed {
            log::debug!(
                "joystick {} dropped without dispose; releasing native handle",
                self.instance_id
            );
            self.dispose();
        }
    }
}

impl fmt::Debug for Joystick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Joystick")
            .field("id", &self.id)
            .field("instance_id", &self.instance_id)
            .field("name", &self.name)
            .field("gamepad", &self.gamepad.is_some())
            .field("connected", &self.connected)
            .field("disposed", &self.disposed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::VirtualJoystick;

    fn open(device: &VirtualJoystick) -> Joystick {
        Joystick::open(1, InstanceId(7), device.open())
    }

    #[test]
    fn queries_read_through_to_the_device() {
        let device = VirtualJoystick::new("Pad")
            .with_axes(2)
            .with_buttons(4)
            .with_hats(1);
        device.set_axis(1, i16::MIN);
        device.set_button(3, true);
        device.set_hat(0, JoystickHat::Up);

        let js = open(&device);
        assert_eq!(js.name(), "Pad");
        assert_eq!(js.axis_count(), 2);
        assert_eq!(js.axis(1), -1.0);
        assert_eq!(js.axis(5), 0.0);
        assert!(js.is_down(3));
        assert!(!js.is_down(40));
        assert_eq!(js.hat(0), JoystickHat::Up);
        assert!(js.is_connected());
        assert!(!js.is_gamepad());
    }

    #[test]
    fn disposed_joystick_is_neutral() {
        let device = VirtualJoystick::new("Pad").with_axes(1).with_buttons(1).as_gamepad();
        device.set_axis(0, i16::MAX);
        device.set_button(0, true);

        let mut js = open(&device);
        let device_guid = js.guid().to_owned();
        js.dispose();
        js.dispose();

        assert!(js.is_disposed());
        assert_eq!(device.close_count(), 1);
        assert_eq!(js.name(), "Pad");
        assert_eq!(js.guid(), device_guid);
        assert_eq!(js.axis(0), 0.0);
        assert!(!js.is_down(0));
        assert!(!js.is_connected());
        assert!(!js.is_gamepad());
        assert_eq!(js.gamepad_axis(GamepadAxis::LeftX), 0.0);
        assert!(!js.set_vibration(1.0, 1.0, None));
    }

    #[test]
    fn vibration_is_clamped_and_remembered() {
        let device = VirtualJoystick::new("Rumbler").with_rumble();
        let js = open(&device);

        assert!(js.set_vibration(2.0, 0.5, Some(Duration::from_millis(250))));
        assert_eq!(js.vibration(), VibrationStrength { left: 1.0, right: 0.5 });
        assert_eq!(device.last_rumble(), Some((u16::MAX, 32768, 250)));
    }

    #[test]
    fn vibration_unsupported_returns_false() {
        let device = VirtualJoystick::new("Plain");
        let js = open(&device);
        assert!(!js.is_vibration_supported());
        assert!(!js.set_vibration(0.5, 0.5, None));
        assert_eq!(js.vibration(), VibrationStrength::default());
    }

    #[test]
    fn drop_releases_undisposed_handle() {
        let device = VirtualJoystick::new("Pad");
        drop(open(&device));
        assert_eq!(device.close_count(), 1);
    }
}
