use std::collections::HashMap;

use crate::platform::Platform;

use super::device::Joystick;
use super::types::InstanceId;

/// Open joysticks keyed by backend instance id.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: HashMap<InstanceId, Joystick>,
    next_id: u32,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the device and registers it.
    ///
    /// Adding an id that is already registered returns the existing joystick without
    /// reopening it. Returns `None` (and leaves the registry unchanged) when the
    /// backend cannot open the device.
    pub fn add(&mut self, platform: &mut dyn Platform, instance_id: InstanceId) -> Option<&Joystick> {
        if self.devices.contains_key(&instance_id) {
            log::debug!("joystick {instance_id} already registered");
            return self.devices.get(&instance_id);
        }

        let opened = match platform.open_joystick(instance_id) {
            Ok(opened) => opened,
            Err(e) => {
                log::warn!("failed to open joystick {instance_id}: {e:#}");
                return None;
            }
        };

        self.next_id += 1;
        let joystick = Joystick::open(self.next_id, instance_id, opened);
        log::info!(
            "joystick {instance_id} opened: '{}' (gamepad: {})",
            joystick.name(),
            joystick.is_gamepad()
        );

        let joystick: &Joystick = self.devices.entry(instance_id).or_insert(joystick);
        Some(joystick)
    }

    /// Unregisters a device and hands it back marked disconnected but not disposed.
    ///
    /// The caller disposes it once it has finished with it.
    pub fn remove(&mut self, instance_id: InstanceId) -> Option<Joystick> {
        let mut joystick = self.devices.remove(&instance_id)?;
        joystick.mark_disconnected();
        Some(joystick)
    }

    pub fn get(&self, instance_id: InstanceId) -> Option<&Joystick> {
        self.devices.get(&instance_id)
    }

    pub fn get_mut(&mut self, instance_id: InstanceId) -> Option<&mut Joystick> {
        self.devices.get_mut(&instance_id)
    }

    pub fn contains(&self, instance_id: InstanceId) -> bool {
        self.devices.contains_key(&instance_id)
    }

    /// Registered joysticks in connection order.
    pub fn joysticks(&self) -> Vec<&Joystick> {
        let mut list: Vec<&Joystick> = self.devices.values().collect();
        list.sort_by_key(|j| j.id());
        list
    }

    pub fn count(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Disposes and unregisters every device.
    pub fn clear(&mut self) {
        if self.devices.is_empty() {
            return;
        }

        log::debug!("disposing {} joystick(s)", self.devices.len());
        for (_, mut joystick) in self.devices.drain() {
            joystick.dispose();
        }
    }
}
