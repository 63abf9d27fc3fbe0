//! Joysticks and gamepads through gilrs.
//!
//! gilrs reports sticks up-positive; Y axes are flipped here so raw values read
//! down-positive like the rest of the engine.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use anyhow::{Context as _, anyhow};
use gilrs::ff::{BaseEffect, BaseEffectType, Effect, EffectBuilder, Replay, Ticks};
use gilrs::{Axis, Button, EventType, GamepadId, Gilrs, MappingSource};

use crate::joystick::{DeviceInfo, GamepadAxis, GamepadButton, InstanceId, JoystickHat};
use crate::platform::{GamepadHandle, JoystickHandle, OpenedJoystick, PlatformEvent};

/// Joystick-level axis layout: index -> (gilrs axis, flipped).
const JOYSTICK_AXES: [(Axis, bool); 6] = [
    (Axis::LeftStickX, false),
    (Axis::LeftStickY, true),
    (Axis::RightStickX, false),
    (Axis::RightStickY, true),
    (Axis::LeftZ, false),
    (Axis::RightZ, false),
];

/// Joystick-level button layout. The d-pad is reported as hat 0 instead.
const JOYSTICK_BUTTONS: [Button; 13] = [
    Button::South,
    Button::East,
    Button::North,
    Button::West,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::Mode,
    Button::LeftThumb,
    Button::RightThumb,
];

fn to_raw(value: f32) -> i16 {
    let v = if value.is_nan() { 0.0 } else { value.clamp(-1.0, 1.0) };
    if v < 0.0 {
        (v * 32768.0).round() as i16
    } else {
        (v * 32767.0).round() as i16
    }
}

fn joystick_axis_index(axis: Axis) -> Option<(usize, bool)> {
    JOYSTICK_AXES
        .iter()
        .position(|(a, _)| *a == axis)
        .map(|i| (i, JOYSTICK_AXES[i].1))
}

fn joystick_button_index(button: Button) -> Option<usize> {
    JOYSTICK_BUTTONS.iter().position(|b| *b == button)
}

fn is_dpad(button: Button) -> bool {
    matches!(
        button,
        Button::DPadUp | Button::DPadRight | Button::DPadDown | Button::DPadLeft
    )
}

fn gamepad_axis(axis: Axis) -> Option<(GamepadAxis, bool)> {
    match axis {
        Axis::LeftStickX => Some((GamepadAxis::LeftX, false)),
        Axis::LeftStickY => Some((GamepadAxis::LeftY, true)),
        Axis::RightStickX => Some((GamepadAxis::RightX, false)),
        Axis::RightStickY => Some((GamepadAxis::RightY, true)),
        _ => None,
    }
}

fn gamepad_button(button: Button) -> Option<GamepadButton> {
    match button {
        Button::South => Some(GamepadButton::A),
        Button::East => Some(GamepadButton::B),
        Button::West => Some(GamepadButton::X),
        Button::North => Some(GamepadButton::Y),
        Button::Select => Some(GamepadButton::Back),
        Button::Mode => Some(GamepadButton::Guide),
        Button::Start => Some(GamepadButton::Start),
        Button::LeftThumb => Some(GamepadButton::LeftStick),
        Button::RightThumb => Some(GamepadButton::RightStick),
        Button::LeftTrigger => Some(GamepadButton::LeftShoulder),
        Button::RightTrigger => Some(GamepadButton::RightShoulder),
        Button::DPadUp => Some(GamepadButton::DPadUp),
        Button::DPadDown => Some(GamepadButton::DPadDown),
        Button::DPadLeft => Some(GamepadButton::DPadLeft),
        Button::DPadRight => Some(GamepadButton::DPadRight),
        _ => None,
    }
}

fn to_gilrs_button(button: GamepadButton) -> Button {
    match button {
        GamepadButton::A => Button::South,
        GamepadButton::B => Button::East,
        GamepadButton::X => Button::West,
        GamepadButton::Y => Button::North,
        GamepadButton::Back => Button::Select,
        GamepadButton::Guide => Button::Mode,
        GamepadButton::Start => Button::Start,
        GamepadButton::LeftStick => Button::LeftThumb,
        GamepadButton::RightStick => Button::RightThumb,
        GamepadButton::LeftShoulder => Button::LeftTrigger,
        GamepadButton::RightShoulder => Button::RightTrigger,
        GamepadButton::DPadUp => Button::DPadUp,
        GamepadButton::DPadDown => Button::DPadDown,
        GamepadButton::DPadLeft => Button::DPadLeft,
        GamepadButton::DPadRight => Button::DPadRight,
    }
}

/// Binding list for the layout above, in `name:source` form.
fn layout_bindings() -> String {
    let mut parts = Vec::new();
    for button in GamepadButton::ALL {
        let target = to_gilrs_button(button);
        let source = match target {
            Button::DPadUp => format!("h0.{}", JoystickHat::UP_BIT),
            Button::DPadRight => format!("h0.{}", JoystickHat::RIGHT_BIT),
            Button::DPadDown => format!("h0.{}", JoystickHat::DOWN_BIT),
            Button::DPadLeft => format!("h0.{}", JoystickHat::LEFT_BIT),
            other => match joystick_button_index(other) {
                Some(i) => format!("b{i}"),
                None => continue,
            },
        };
        parts.push(format!("{}:{source}", button.as_str()));
    }
    for (name, index) in [("leftx", 0), ("lefty", 1), ("rightx", 2), ("righty", 3)] {
        parts.push(format!("{name}:a{index}"));
    }
    parts.push(format!(
        "triggerleft:b{}",
        joystick_button_index(Button::LeftTrigger2).unwrap_or(6)
    ));
    parts.push(format!(
        "triggerright:b{}",
        joystick_button_index(Button::RightTrigger2).unwrap_or(7)
    ));
    parts.join(",")
}

struct Backend {
    gilrs: Gilrs,
    instances: HashMap<GamepadId, InstanceId>,
    pads: HashMap<InstanceId, GamepadId>,
    next_instance: u32,
}

impl Backend {
    fn attach(&mut self, id: GamepadId) -> InstanceId {
        if let Some(instance) = self.instances.get(&id) {
            return *instance;
        }
        let instance = InstanceId(self.next_instance);
        self.next_instance += 1;
        self.instances.insert(id, instance);
        self.pads.insert(instance, id);
        instance
    }

    fn detach(&mut self, id: GamepadId) -> Option<InstanceId> {
        let instance = self.instances.remove(&id)?;
        self.pads.remove(&instance);
        Some(instance)
    }

    fn hat(&self, id: GamepadId) -> JoystickHat {
        match self.gilrs.connected_gamepad(id) {
            Some(pad) => JoystickHat::from_directions(
                pad.is_pressed(Button::DPadUp),
                pad.is_pressed(Button::DPadRight),
                pad.is_pressed(Button::DPadDown),
                pad.is_pressed(Button::DPadLeft),
            ),
            None => JoystickHat::Centered,
        }
    }

    fn button_event(
        &self,
        id: GamepadId,
        button: Button,
        down: bool,
        queue: &mut VecDeque<PlatformEvent>,
    ) {
        let Some(&instance) = self.instances.get(&id) else {
            return;
        };

        if is_dpad(button) {
            queue.push_back(PlatformEvent::JoystickHat {
                id: instance,
                hat: 0,
                value: self.hat(id),
            });
        } else if let Some(index) = joystick_button_index(button) {
            let button = index as u8;
            queue.push_back(if down {
                PlatformEvent::JoystickButtonDown { id: instance, button }
            } else {
                PlatformEvent::JoystickButtonUp { id: instance, button }
            });
        }

        if let Some(button) = gamepad_button(button) {
            queue.push_back(if down {
                PlatformEvent::GamepadButtonDown { id: instance, button }
            } else {
                PlatformEvent::GamepadButtonUp { id: instance, button }
            });
        }
    }

    fn translate(&mut self, id: GamepadId, event: EventType, queue: &mut VecDeque<PlatformEvent>) {
        match event {
            EventType::Connected => {
                let instance = self.attach(id);
                queue.push_back(PlatformEvent::JoystickAdded(instance));
            }
            EventType::Disconnected => {
                if let Some(instance) = self.detach(id) {
                    queue.push_back(PlatformEvent::JoystickRemoved(instance));
                }
            }
            EventType::ButtonPressed(button, _) => self.button_event(id, button, true, queue),
            EventType::ButtonReleased(button, _) => self.button_event(id, button, false, queue),
            EventType::ButtonChanged(button, value, _) => {
                let Some(&instance) = self.instances.get(&id) else {
                    return;
                };
                let axis = match button {
                    Button::LeftTrigger2 => GamepadAxis::TriggerLeft,
                    Button::RightTrigger2 => GamepadAxis::TriggerRight,
                    _ => return,
                };
                queue.push_back(PlatformEvent::GamepadAxis {
                    id: instance,
                    axis,
                    value: to_raw(value),
                });
            }
            EventType::AxisChanged(axis, value, _) => {
                let Some(&instance) = self.instances.get(&id) else {
                    return;
                };
                if let Some((index, flipped)) = joystick_axis_index(axis) {
                    let value = if flipped { -value } else { value };
                    queue.push_back(PlatformEvent::JoystickAxis {
                        id: instance,
                        axis: index as u8,
                        value: to_raw(value),
                    });
                }
                if let Some((axis, flipped)) = gamepad_axis(axis) {
                    let value = if flipped { -value } else { value };
                    queue.push_back(PlatformEvent::GamepadAxis {
                        id: instance,
                        axis,
                        value: to_raw(value),
                    });
                }
            }
            _ => {}
        }
    }
}

type Shared = Rc<RefCell<Backend>>;

/// gilrs context plus the mapping between gilrs ids and engine instance ids.
pub(crate) struct GamepadBackend {
    shared: Shared,
}

impl GamepadBackend {
    /// Starts gilrs and queues an added event for every pad already connected.
    pub(crate) fn new(queue: &mut VecDeque<PlatformEvent>) -> anyhow::Result<Self> {
        let gilrs = match Gilrs::new() {
            Ok(gilrs) => gilrs,
            Err(gilrs::Error::NotImplemented(dummy)) => {
                log::warn!("gamepads are not supported on this platform");
                dummy
            }
            Err(e) => return Err(anyhow!("failed to initialize gilrs: {e}")),
        };

        let mut backend = Backend {
            gilrs,
            instances: HashMap::new(),
            pads: HashMap::new(),
            next_instance: 0,
        };

        let present: Vec<GamepadId> = backend.gilrs.gamepads().map(|(id, _)| id).collect();
        for id in present {
            let instance = backend.attach(id);
            queue.push_back(PlatformEvent::JoystickAdded(instance));
        }
        log::debug!("gilrs started with {} pad(s)", backend.instances.len());

        Ok(Self {
            shared: Rc::new(RefCell::new(backend)),
        })
    }

    pub(crate) fn pump(&self, queue: &mut VecDeque<PlatformEvent>) {
        let mut backend = self.shared.borrow_mut();
        while let Some(event) = backend.gilrs.next_event() {
            backend.translate(event.id, event.event, queue);
        }
    }

    pub(crate) fn open(&self, instance: InstanceId) -> anyhow::Result<OpenedJoystick> {
        let backend = self.shared.borrow();
        let id = *backend
            .pads
            .get(&instance)
            .with_context(|| format!("no pad with instance id {instance}"))?;
        let pad = backend
            .gilrs
            .connected_gamepad(id)
            .with_context(|| format!("pad {instance} is not connected"))?;
        let is_gamepad = pad.mapping_source() != MappingSource::None;
        drop(backend);

        let joystick = GilrsJoystick {
            shared: Rc::clone(&self.shared),
            id,
            effect: RefCell::new(None),
        };
        let gamepad = is_gamepad.then(|| {
            Box::new(GilrsGamepad {
                shared: Rc::clone(&self.shared),
                id,
            }) as Box<dyn GamepadHandle>
        });

        Ok(OpenedJoystick {
            joystick: Box::new(joystick),
            gamepad,
        })
    }
}

fn with_pad<T>(shared: &Shared, id: GamepadId, f: impl FnOnce(gilrs::Gamepad<'_>) -> T) -> Option<T> {
    let backend = shared.borrow();
    backend.gilrs.connected_gamepad(id).map(f)
}

struct GilrsJoystick {
    shared: Shared,
    id: GamepadId,
    /// Running rumble; dropping it stops the motors.
    effect: RefCell<Option<Effect>>,
}

impl JoystickHandle for GilrsJoystick {
    fn name(&self) -> String {
        with_pad(&self.shared, self.id, |p| p.name().to_owned()).unwrap_or_default()
    }

    fn guid(&self) -> String {
        with_pad(&self.shared, self.id, |p| {
            p.uuid().iter().map(|b| format!("{b:02x}")).collect()
        })
        .unwrap_or_default()
    }

    fn device_info(&self) -> DeviceInfo {
        with_pad(&self.shared, self.id, |p| DeviceInfo {
            vendor_id: p.vendor_id().unwrap_or(0),
            product_id: p.product_id().unwrap_or(0),
            product_version: 0,
        })
        .unwrap_or_default()
    }

    fn axis_count(&self) -> usize {
        JOYSTICK_AXES.len()
    }

    fn axis(&self, index: usize) -> i16 {
        let Some(&(axis, flipped)) = JOYSTICK_AXES.get(index) else {
            return 0;
        };
        with_pad(&self.shared, self.id, |p| {
            let value = p.value(axis);
            to_raw(if flipped { -value } else { value })
        })
        .unwrap_or(0)
    }

    fn button_count(&self) -> usize {
        JOYSTICK_BUTTONS.len()
    }

    fn button(&self, index: usize) -> bool {
        let Some(&button) = JOYSTICK_BUTTONS.get(index) else {
            return false;
        };
        with_pad(&self.shared, self.id, |p| p.is_pressed(button)).unwrap_or(false)
    }

    fn hat_count(&self) -> usize {
        1
    }

    fn hat(&self, index: usize) -> JoystickHat {
        if index != 0 {
            return JoystickHat::Centered;
        }
        self.shared.borrow().hat(self.id)
    }

    fn is_connected(&self) -> bool {
        with_pad(&self.shared, self.id, |_| true).unwrap_or(false)
    }

    fn supports_rumble(&self) -> bool {
        with_pad(&self.shared, self.id, |p| p.is_ff_supported()).unwrap_or(false)
    }

    fn rumble(&self, low: u16, high: u16, duration_ms: u32) -> anyhow::Result<()> {
        if low == 0 && high == 0 {
            self.effect.borrow_mut().take();
            return Ok(());
        }

        let scheduling = Replay {
            play_for: Ticks::from_ms(duration_ms),
            ..Default::default()
        };
        let mut backend = self.shared.borrow_mut();
        let effect = EffectBuilder::new()
            .add_effect(BaseEffect {
                kind: BaseEffectType::Strong { magnitude: low },
                scheduling,
                ..Default::default()
            })
            .add_effect(BaseEffect {
                kind: BaseEffectType::Weak { magnitude: high },
                scheduling,
                ..Default::default()
            })
            .gamepads(&[self.id])
            .finish(&mut backend.gilrs)
            .map_err(|e| anyhow!("failed to build rumble effect: {e}"))?;
        effect
            .play()
            .map_err(|e| anyhow!("failed to start rumble: {e}"))?;

        *self.effect.borrow_mut() = Some(effect);
        Ok(())
    }

    fn close(&mut self) {
        self.effect.get_mut().take();
    }
}

struct GilrsGamepad {
    shared: Shared,
    id: GamepadId,
}

impl GamepadHandle for GilrsGamepad {
    fn axis(&self, axis: GamepadAxis) -> i16 {
        with_pad(&self.shared, self.id, |p| {
            let trigger = |button: Button| p.button_data(button).map_or(0.0, |d| d.value());
            let value = match axis {
                GamepadAxis::LeftX => p.value(Axis::LeftStickX),
                GamepadAxis::LeftY => -p.value(Axis::LeftStickY),
                GamepadAxis::RightX => p.value(Axis::RightStickX),
                GamepadAxis::RightY => -p.value(Axis::RightStickY),
                GamepadAxis::TriggerLeft => trigger(Button::LeftTrigger2),
                GamepadAxis::TriggerRight => trigger(Button::RightTrigger2),
            };
            to_raw(value)
        })
        .unwrap_or(0)
    }

    fn button(&self, button: GamepadButton) -> bool {
        let button = to_gilrs_button(button);
        with_pad(&self.shared, self.id, |p| p.is_pressed(button)).unwrap_or(false)
    }

    fn mapping(&self) -> Option<String> {
        with_pad(&self.shared, self.id, |p| {
            let guid: String = p.uuid().iter().map(|b| format!("{b:02x}")).collect();
            format!("{guid},{},{}", p.name(), layout_bindings())
        })
    }

    fn close(&mut self) {}
}
