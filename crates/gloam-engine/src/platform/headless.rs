//! In-process backend without native window or devices.
//!
//! Events are scripted through a [`HeadlessRemote`], which stays usable while the
//! platform is owned by a running framework. Joysticks are [`VirtualJoystick`]s whose
//! state can be changed from the outside at any time.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use anyhow::anyhow;

use crate::joystick::{DeviceInfo, GamepadAxis, GamepadButton, InstanceId, JoystickHat};
use crate::paint::Color;
use crate::time::{InstantSource, ManualTimeSource, TimeSource};
use crate::window::{FullscreenType, VSync, Window, WindowFlags, WindowMode};

use super::{GamepadHandle, JoystickHandle, OpenedJoystick, Platform, PlatformEvent, Subsystems};

/// Number of displays the headless backend pretends to have.
pub const HEADLESS_DISPLAYS: u32 = 2;

#[derive(Debug, Default)]
struct WindowState {
    open: bool,
    mode: WindowMode,
    title: String,
    clear_color: Color,
    presents: u64,
    shutdowns: u32,
    position: Option<(i32, i32)>,
    min_size: Option<(u32, u32)>,
    display: Option<u32>,
    fail_set_mode: bool,
    present_failure: Option<String>,
}

#[derive(Debug, Default)]
struct HeadlessState {
    initialized: Subsystems,
    init_calls: u32,
    quit_calls: u32,
    init_failure: Option<String>,
    queue: VecDeque<PlatformEvent>,
    pumps: u64,
    devices: HashMap<InstanceId, VirtualJoystick>,
    open_failures: HashSet<InstanceId>,
    window: WindowState,
}

/// Headless [`Platform`].
pub struct HeadlessPlatform {
    state: Rc<RefCell<HeadlessState>>,
    window: HeadlessWindow,
    clock: Option<ManualTimeSource>,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        let state = Rc::new(RefCell::new(HeadlessState::default()));
        Self {
            window: HeadlessWindow {
                state: Rc::clone(&state),
            },
            state,
            clock: None,
        }
    }

    /// Drives the run's clock from `source` instead of the wall clock.
    pub fn with_time_source(mut self, source: ManualTimeSource) -> Self {
        self.clock = Some(source);
        self
    }

    pub fn remote(&self) -> HeadlessRemote {
        HeadlessRemote {
            state: Rc::clone(&self.state),
        }
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for HeadlessPlatform {
    fn name(&self) -> &str {
        "headless"
    }

    fn init_subsystems(&mut self, subsystems: Subsystems) -> anyhow::Result<()> {
        let mut state = self.state.borrow_mut();
        state.init_calls += 1;
        if let Some(message) = state.init_failure.clone() {
            return Err(anyhow!(message));
        }
        state.initialized = state.initialized.union(subsystems);
        Ok(())
    }

    fn quit_subsystems(&mut self, subsystems: Subsystems) {
        let mut state = self.state.borrow_mut();
        state.quit_calls += 1;
        state.initialized = state.initialized.difference(subsystems);
    }

    fn pump_events(&mut self) {
        self.state.borrow_mut().pumps += 1;
    }

    fn poll_event(&mut self) -> Option<PlatformEvent> {
        self.state.borrow_mut().queue.pop_front()
    }

    fn time_source(&self) -> Box<dyn TimeSource> {
        match &self.clock {
            Some(source) => Box::new(source.clone()),
            None => Box::new(InstantSource::new()),
        }
    }

    fn open_joystick(&mut self, id: InstanceId) -> anyhow::Result<OpenedJoystick> {
        let state = self.state.borrow();
        if state.open_failures.contains(&id) {
            return Err(anyhow!("device {id} refused to open"));
        }
        let device = state
            .devices
            .get(&id)
            .ok_or_else(|| anyhow!("no device with instance id {id}"))?;
        Ok(device.open())
    }

    fn window(&mut self) -> &mut dyn Window {
        &mut self.window
    }
}

/// Window of a [`HeadlessPlatform`]. Presents only count frames.
pub struct HeadlessWindow {
    state: Rc<RefCell<HeadlessState>>,
}

impl Window for HeadlessWindow {
    fn set_mode(&mut self, width: u32, height: u32, flags: WindowFlags) -> bool {
        let mut state = self.state.borrow_mut();
        if state.window.fail_set_mode || width == 0 || height == 0 {
            return false;
        }
        let window = &mut state.window;
        window.mode.width = width;
        window.mode.height = height;
        window.mode.flags = flags;
        window.open = true;
        true
    }

    fn mode(&self) -> WindowMode {
        self.state.borrow().window.mode
    }

    fn set_title(&mut self, title: &str) {
        self.state.borrow_mut().window.title = title.to_owned();
    }

    fn title(&self) -> String {
        self.state.borrow().window.title.clone()
    }

    fn is_open(&self) -> bool {
        self.state.borrow().window.open
    }

    fn close(&mut self) {
        self.state.borrow_mut().window.open = false;
    }

    fn shutdown(&mut self) {
        let mut state = self.state.borrow_mut();
        state.window.open = false;
        state.window.shutdowns += 1;
    }

    fn has_renderer(&self) -> bool {
        self.state.borrow().window.open
    }

    fn set_fullscreen(&mut self, fullscreen: bool, kind: FullscreenType) -> bool {
        let mut state = self.state.borrow_mut();
        if !state.window.open {
            return false;
        }
        state.window.mode.fullscreen = fullscreen.then_some(kind);
        true
    }

    fn set_vsync(&mut self, vsync: VSync) -> bool {
        self.state.borrow_mut().window.mode.vsync = vsync;
        true
    }

    fn set_position(&mut self, x: i32, y: i32) -> bool {
        self.state.borrow_mut().window.position = Some((x, y));
        true
    }

    fn set_min_size(&mut self, width: u32, height: u32) -> bool {
        self.state.borrow_mut().window.min_size = Some((width, height));
        true
    }

    fn set_display(&mut self, display: u32) -> bool {
        if !(1..=HEADLESS_DISPLAYS).contains(&display) {
            return false;
        }
        self.state.borrow_mut().window.display = Some(display);
        true
    }

    fn set_clear_color(&mut self, color: Color) {
        self.state.borrow_mut().window.clear_color = color;
    }

    fn present(&mut self) -> anyhow::Result<()> {
        let mut state = self.state.borrow_mut();
        if !state.window.open {
            anyhow::bail!("window is not open");
        }
        if let Some(message) = &state.window.present_failure {
            return Err(anyhow!(message.clone()));
        }
        state.window.presents += 1;
        Ok(())
    }
}

/// Shared control over a [`HeadlessPlatform`].
#[derive(Clone)]
pub struct HeadlessRemote {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessRemote {
    pub fn push_event(&self, event: PlatformEvent) {
        self.state.borrow_mut().queue.push_back(event);
    }

    pub fn push_events(&self, events: impl IntoIterator<Item = PlatformEvent>) {
        self.state.borrow_mut().queue.extend(events);
    }

    /// Makes `device` openable under `id` without announcing it.
    pub fn register_device(&self, id: InstanceId, device: VirtualJoystick) {
        self.state.borrow_mut().devices.insert(id, device);
    }

    /// Registers `device` and queues its connection event.
    pub fn connect(&self, id: InstanceId, device: VirtualJoystick) {
        let mut state = self.state.borrow_mut();
        state.devices.insert(id, device);
        state.queue.push_back(PlatformEvent::JoystickAdded(id));
    }

    /// Unplugs the device and queues its removal event.
    pub fn disconnect(&self, id: InstanceId) {
        let mut state = self.state.borrow_mut();
        if let Some(device) = state.devices.remove(&id) {
            device.state.borrow_mut().connected = false;
        }
        state.queue.push_back(PlatformEvent::JoystickRemoved(id));
    }

    pub fn request_quit(&self) {
        self.push_event(PlatformEvent::Quit);
    }

    /// Makes every later `open_joystick(id)` fail.
    pub fn fail_open(&self, id: InstanceId) {
        self.state.borrow_mut().open_failures.insert(id);
    }

    /// Makes every later `init_subsystems` fail with `message`.
    pub fn fail_init(&self, message: impl Into<String>) {
        self.state.borrow_mut().init_failure = Some(message.into());
    }

    pub fn fail_set_mode(&self, fail: bool) {
        self.state.borrow_mut().window.fail_set_mode = fail;
    }

    /// Makes presents fail with `message`; `None` restores them.
    pub fn fail_present(&self, message: Option<&str>) {
        self.state.borrow_mut().window.present_failure = message.map(str::to_owned);
    }

    pub fn initialized(&self) -> Subsystems {
        self.state.borrow().initialized
    }

    pub fn init_calls(&self) -> u32 {
        self.state.borrow().init_calls
    }

    pub fn quit_calls(&self) -> u32 {
        self.state.borrow().quit_calls
    }

    pub fn pumps(&self) -> u64 {
        self.state.borrow().pumps
    }

    pub fn pending_events(&self) -> usize {
        self.state.borrow().queue.len()
    }

    pub fn presents(&self) -> u64 {
        self.state.borrow().window.presents
    }

    pub fn window_open(&self) -> bool {
        self.state.borrow().window.open
    }

    pub fn window_mode(&self) -> WindowMode {
        self.state.borrow().window.mode
    }

    pub fn window_title(&self) -> String {
        self.state.borrow().window.title.clone()
    }

    pub fn window_position(&self) -> Option<(i32, i32)> {
        self.state.borrow().window.position
    }

    pub fn window_min_size(&self) -> Option<(u32, u32)> {
        self.state.borrow().window.min_size
    }

    pub fn window_display(&self) -> Option<u32> {
        self.state.borrow().window.display
    }

    pub fn window_shutdowns(&self) -> u32 {
        self.state.borrow().window.shutdowns
    }

    pub fn clear_color(&self) -> Color {
        self.state.borrow().window.clear_color
    }
}

#[derive(Debug)]
struct VirtualGamepad {
    axes: [i16; 6],
    buttons: [bool; 15],
    mapping: String,
}

#[derive(Debug)]
struct VirtualState {
    name: String,
    guid: String,
    info: DeviceInfo,
    axes: Vec<i16>,
    buttons: Vec<bool>,
    hats: Vec<JoystickHat>,
    gamepad: Option<VirtualGamepad>,
    rumble: bool,
    last_rumble: Option<(u16, u16, u32)>,
    connected: bool,
    opens: u32,
    closes: u32,
}

/// Scriptable joystick. Clones share state.
#[derive(Debug, Clone)]
pub struct VirtualJoystick {
    state: Rc<RefCell<VirtualState>>,
}

impl VirtualJoystick {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let guid = format!("{:032x}", fnv1a(name.as_bytes()));
        Self {
            state: Rc::new(RefCell::new(VirtualState {
                name,
                guid,
                info: DeviceInfo::default(),
                axes: Vec::new(),
                buttons: Vec::new(),
                hats: Vec::new(),
                gamepad: None,
                rumble: false,
                last_rumble: None,
                connected: true,
                opens: 0,
                closes: 0,
            })),
        }
    }

    pub fn with_axes(self, count: usize) -> Self {
        self.state.borrow_mut().axes = vec![0; count];
        self
    }

    pub fn with_buttons(self, count: usize) -> Self {
        self.state.borrow_mut().buttons = vec![false; count];
        self
    }

    pub fn with_hats(self, count: usize) -> Self {
        self.state.borrow_mut().hats = vec![JoystickHat::Centered; count];
        self
    }

    pub fn with_device_info(self, info: DeviceInfo) -> Self {
        self.state.borrow_mut().info = info;
        self
    }

    /// Exposes the device as a gamepad with a standard mapping.
    pub fn as_gamepad(self) -> Self {
        {
            let mut state = self.state.borrow_mut();
            let mapping = format!("{},{},platform:headless", state.guid, state.name);
            state.gamepad = Some(VirtualGamepad {
                axes: [0; 6],
                buttons: [false; 15],
                mapping,
            });
        }
        self
    }

    pub fn with_rumble(self) -> Self {
        self.state.borrow_mut().rumble = true;
        self
    }

    pub fn set_axis(&self, index: usize, raw: i16) {
        if let Some(slot) = self.state.borrow_mut().axes.get_mut(index) {
            *slot = raw;
        }
    }

    pub fn set_button(&self, index: usize, down: bool) {
        if let Some(slot) = self.state.borrow_mut().buttons.get_mut(index) {
            *slot = down;
        }
    }

    pub fn set_hat(&self, index: usize, value: JoystickHat) {
        if let Some(slot) = self.state.borrow_mut().hats.get_mut(index) {
            *slot = value;
        }
    }

    pub fn set_gamepad_axis(&self, axis: GamepadAxis, raw: i16) {
        if let Some(pad) = self.state.borrow_mut().gamepad.as_mut() {
            pad.axes[gamepad_axis_slot(axis)] = raw;
        }
    }

    pub fn set_gamepad_button(&self, button: GamepadButton, down: bool) {
        if let Some(pad) = self.state.borrow_mut().gamepad.as_mut() {
            pad.buttons[gamepad_button_slot(button)] = down;
        }
    }

    /// Opens native-style handles onto this device.
    pub fn open(&self) -> OpenedJoystick {
        let gamepad = {
            let mut state = self.state.borrow_mut();
            state.opens += 1;
            state.connected = true;
            state.gamepad.is_some()
        };

        OpenedJoystick {
            joystick: Box::new(VirtualJoystickHandle {
                state: Rc::clone(&self.state),
            }),
            gamepad: gamepad.then(|| {
                Box::new(VirtualGamepadHandle {
                    state: Rc::clone(&self.state),
                }) as Box<dyn GamepadHandle>
            }),
        }
    }

    pub fn open_count(&self) -> u32 {
        self.state.borrow().opens
    }

    /// Number of times the joystick handle was closed.
    pub fn close_count(&self) -> u32 {
        self.state.borrow().closes
    }

    pub fn last_rumble(&self) -> Option<(u16, u16, u32)> {
        self.state.borrow().last_rumble
    }
}

fn gamepad_axis_slot(axis: GamepadAxis) -> usize {
    GamepadAxis::ALL.iter().position(|a| *a == axis).unwrap_or(0)
}

fn gamepad_button_slot(button: GamepadButton) -> usize {
    GamepadButton::ALL.iter().position(|b| *b == button).unwrap_or(0)
}

fn fnv1a(bytes: &[u8]) -> u128 {
    const OFFSET: u128 = 0x6c62272e07bb014262b821756295c58d;
    const PRIME: u128 = 0x0000000001000000000000000000013B;
    bytes
        .iter()
        .fold(OFFSET, |hash, b| (hash ^ u128::from(*b)).wrapping_mul(PRIME))
}

struct VirtualJoystickHandle {
    state: Rc<RefCell<VirtualState>>,
}

impl JoystickHandle for VirtualJoystickHandle {
    fn name(&self) -> String {
        self.state.borrow().name.clone()
    }

    fn guid(&self) -> String {
        self.state.borrow().guid.clone()
    }

    fn device_info(&self) -> DeviceInfo {
        self.state.borrow().info
    }

    fn axis_count(&self) -> usize {
        self.state.borrow().axes.len()
    }

    fn axis(&self, index: usize) -> i16 {
        self.state.borrow().axes.get(index).copied().unwrap_or(0)
    }

    fn button_count(&self) -> usize {
        self.state.borrow().buttons.len()
    }

    fn button(&self, index: usize) -> bool {
        self.state.borrow().buttons.get(index).copied().unwrap_or(false)
    }

    fn hat_count(&self) -> usize {
        self.state.borrow().hats.len()
    }

    fn hat(&self, index: usize) -> JoystickHat {
        self.state.borrow().hats.get(index).copied().unwrap_or_default()
    }

    fn is_connected(&self) -> bool {
        self.state.borrow().connected
    }

    fn supports_rumble(&self) -> bool {
        self.state.borrow().rumble
    }

    fn rumble(&self, low: u16, high: u16, duration_ms: u32) -> anyhow::Result<()> {
        let mut state = self.state.borrow_mut();
        if !state.rumble {
            anyhow::bail!("rumble is not supported by this device");
        }
        state.last_rumble = Some((low, high, duration_ms));
        Ok(())
    }

    fn close(&mut self) {
        self.state.borrow_mut().closes += 1;
    }
}

struct VirtualGamepadHandle {
    state: Rc<RefCell<VirtualState>>,
}

impl GamepadHandle for VirtualGamepadHandle {
    fn axis(&self, axis: GamepadAxis) -> i16 {
        self.state
            .borrow()
            .gamepad
            .as_ref()
            .map_or(0, |pad| pad.axes[gamepad_axis_slot(axis)])
    }

    fn button(&self, button: GamepadButton) -> bool {
        self.state
            .borrow()
            .gamepad
            .as_ref()
            .is_some_and(|pad| pad.buttons[gamepad_button_slot(button)])
    }

    fn mapping(&self) -> Option<String> {
        self.state.borrow().gamepad.as_ref().map(|pad| pad.mapping.clone())
    }

    fn close(&mut self) {}
}
