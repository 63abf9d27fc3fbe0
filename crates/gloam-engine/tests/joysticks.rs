use std::sync::Arc;

use gloam_engine::framework::{Framework, RunOutcome, SubsystemGuard};
use gloam_engine::joystick::{GamepadAxis, GamepadButton, InstanceId, Joystick, JoystickHat};
use gloam_engine::platform::headless::{HeadlessPlatform, HeadlessRemote, VirtualJoystick};
use gloam_engine::platform::PlatformEvent;
use gloam_engine::{Context, Game};

/// Records device callbacks; can unplug a device or fail on removal.
struct Pads {
    remote: HeadlessRemote,
    log: Vec<String>,
    updates: u64,
    quit_after: u64,
    unplug: Option<(u64, InstanceId)>,
    fail_removed: bool,
    registered_in_update: Vec<usize>,
}

impl Pads {
    fn new(remote: HeadlessRemote, quit_after: u64) -> Self {
        Self {
            remote,
            log: Vec::new(),
            updates: 0,
            quit_after,
            unplug: None,
            fail_removed: false,
            registered_in_update: Vec::new(),
        }
    }
}

impl Game for Pads {
    fn update(&mut self, ctx: &mut Context<'_>, _dt: f64) -> anyhow::Result<()> {
        self.updates += 1;
        self.registered_in_update.push(ctx.joysticks().count());
        if let Some((on, id)) = self.unplug {
            if on == self.updates {
                self.remote.disconnect(id);
            }
        }
        if self.updates >= self.quit_after {
            ctx.quit();
        }
        Ok(())
    }

    fn draw(&mut self, _ctx: &mut Context<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    fn joystick_added(&mut self, _ctx: &mut Context<'_>, joystick: &Joystick) -> anyhow::Result<()> {
        self.log.push(format!(
            "added:{}:{}:{}",
            joystick.instance_id(),
            joystick.name(),
            joystick.is_gamepad()
        ));
        Ok(())
    }

    fn joystick_removed(&mut self, _ctx: &mut Context<'_>, joystick: &Joystick) -> anyhow::Result<()> {
        self.log.push(format!(
            "removed:{}:{}:{}",
            joystick.name(),
            joystick.is_connected(),
            joystick.is_disposed()
        ));
        if self.fail_removed {
            anyhow::bail!("cleanup for {} failed", joystick.name());
        }
        Ok(())
    }

    fn joystick_axis(
        &mut self,
        _ctx: &mut Context<'_>,
        joystick: &Joystick,
        axis: usize,
        value: f32,
    ) -> anyhow::Result<()> {
        self.log
            .push(format!("axis:{}:{axis}:{value}", joystick.instance_id()));
        Ok(())
    }

    fn joystick_pressed(
        &mut self,
        _ctx: &mut Context<'_>,
        joystick: &Joystick,
        button: usize,
    ) -> anyhow::Result<()> {
        self.log.push(format!(
            "pressed:{button}:{}",
            joystick.is_down(button)
        ));
        Ok(())
    }

    fn joystick_hat(
        &mut self,
        _ctx: &mut Context<'_>,
        _joystick: &Joystick,
        hat: usize,
        direction: JoystickHat,
    ) -> anyhow::Result<()> {
        self.log.push(format!("hat:{hat}:{}", direction.as_str()));
        Ok(())
    }

    fn gamepad_axis(
        &mut self,
        _ctx: &mut Context<'_>,
        joystick: &Joystick,
        axis: GamepadAxis,
        value: f32,
    ) -> anyhow::Result<()> {
        self.log.push(format!(
            "gamepad_axis:{}:{}:{value}",
            joystick.instance_id(),
            axis.as_str()
        ));
        Ok(())
    }

    fn gamepad_pressed(
        &mut self,
        _ctx: &mut Context<'_>,
        joystick: &Joystick,
        button: GamepadButton,
    ) -> anyhow::Result<()> {
        self.log.push(format!(
            "gamepad_pressed:{}:{}",
            joystick.instance_id(),
            button.as_str()
        ));
        Ok(())
    }
}

fn framework(platform: HeadlessPlatform) -> Framework<HeadlessPlatform> {
    Framework::new(platform)
        .with_subsystem_guard(Arc::new(SubsystemGuard::new()))
        .silent(true)
}

#[test]
fn hot_plug_lifecycle_reaches_the_game() {
    let platform = HeadlessPlatform::new();
    let remote = platform.remote();
    let id = InstanceId(7);
    let stick = VirtualJoystick::new("Arcade Stick")
        .with_axes(2)
        .with_buttons(4)
        .with_hats(1);
    stick.set_button(3, true);

    remote.connect(id, stick.clone());
    remote.push_events([
        PlatformEvent::JoystickAxis {
            id,
            axis: 0,
            value: i16::MIN,
        },
        PlatformEvent::JoystickAxis {
            id,
            axis: 1,
            value: i16::MAX,
        },
        PlatformEvent::JoystickButtonDown { id, button: 3 },
        PlatformEvent::JoystickHat {
            id,
            hat: 0,
            value: JoystickHat::LeftUp,
        },
    ]);

    let mut game = Pads::new(remote.clone(), 2);
    game.unplug = Some((1, id));
    let summary = framework(platform).run(&mut game).expect("run completes");

    assert_eq!(summary.outcome, RunOutcome::Closed);
    assert_eq!(
        game.log,
        [
            "added:7:Arcade Stick:false",
            "axis:7:0:-1",
            "axis:7:1:1",
            "pressed:3:true",
            "hat:0:lu",
            "removed:Arcade Stick:false:false",
        ]
    );
    assert_eq!(game.registered_in_update, [1, 0]);
    assert_eq!(stick.open_count(), 1);
    assert_eq!(stick.close_count(), 1);
}

#[test]
fn failing_removal_callback_still_disposes_the_device() {
    let platform = HeadlessPlatform::new();
    let remote = platform.remote();
    let id = InstanceId(1);
    let stick = VirtualJoystick::new("Pad").with_buttons(2);
    remote.connect(id, stick.clone());

    let mut game = Pads::new(remote.clone(), 10);
    game.unplug = Some((1, id));
    game.fail_removed = true;
    let summary = framework(platform).run(&mut game).expect("run completes");

    assert_eq!(summary.outcome, RunOutcome::Errored);
    assert_eq!(summary.faults, 1);
    assert_eq!(summary.frames, 2);
    assert_eq!(game.log, ["added:1:Pad:false", "removed:Pad:false:false"]);
    assert_eq!(stick.close_count(), 1);
}

#[test]
fn events_for_unknown_devices_are_dropped() {
    let platform = HeadlessPlatform::new();
    let remote = platform.remote();
    let ghost = InstanceId(99);
    remote.push_events([
        PlatformEvent::JoystickAxis {
            id: ghost,
            axis: 0,
            value: 100,
        },
        PlatformEvent::JoystickButtonDown {
            id: ghost,
            button: 0,
        },
        PlatformEvent::GamepadButtonDown {
            id: ghost,
            button: GamepadButton::A,
        },
        PlatformEvent::JoystickRemoved(ghost),
    ]);

    let mut game = Pads::new(remote.clone(), 1);
    let summary = framework(platform).run(&mut game).expect("run completes");

    assert_eq!(summary.outcome, RunOutcome::Closed);
    assert_eq!(summary.faults, 0);
    assert!(game.log.is_empty());
}

#[test]
fn devices_that_fail_to_open_are_skipped() {
    let platform = HeadlessPlatform::new();
    let remote = platform.remote();
    let id = InstanceId(3);
    let stick = VirtualJoystick::new("Broken");
    remote.fail_open(id);
    remote.connect(id, stick.clone());

    let mut game = Pads::new(remote.clone(), 1);
    let summary = framework(platform).run(&mut game).expect("run completes");

    assert_eq!(summary.outcome, RunOutcome::Closed);
    assert!(game.log.is_empty());
    assert_eq!(game.registered_in_update, [0]);
    assert_eq!(stick.open_count(), 0);
}

#[test]
fn gamepad_events_only_reach_gamepads() {
    let platform = HeadlessPlatform::new();
    let remote = platform.remote();
    let plain = InstanceId(1);
    let pad = InstanceId(2);
    remote.connect(plain, VirtualJoystick::new("Flight Stick").with_axes(3));
    remote.connect(pad, VirtualJoystick::new("Pad").as_gamepad());
    remote.push_events([
        PlatformEvent::GamepadButtonDown {
            id: plain,
            button: GamepadButton::A,
        },
        PlatformEvent::GamepadButtonDown {
            id: pad,
            button: GamepadButton::A,
        },
        PlatformEvent::GamepadAxis {
            id: plain,
            axis: GamepadAxis::LeftX,
            value: i16::MAX,
        },
        PlatformEvent::GamepadAxis {
            id: pad,
            axis: GamepadAxis::TriggerLeft,
            value: 0,
        },
    ]);

    let mut game = Pads::new(remote.clone(), 1);
    framework(platform).run(&mut game).expect("run completes");

    assert_eq!(
        game.log,
        [
            "added:1:Flight Stick:false",
            "added:2:Pad:true",
            "gamepad_pressed:2:a",
            "gamepad_axis:2:triggerleft:0",
        ]
    );
}

#[test]
fn teardown_disposes_devices_still_registered() {
    let platform = HeadlessPlatform::new();
    let remote = platform.remote();
    let first = VirtualJoystick::new("One");
    let second = VirtualJoystick::new("Two").as_gamepad();
    remote.connect(InstanceId(10), first.clone());
    remote.connect(InstanceId(11), second.clone());

    let mut game = Pads::new(remote.clone(), 2);
    framework(platform).run(&mut game).expect("run completes");

    assert_eq!(game.registered_in_update, [2, 2]);
    assert_eq!(first.close_count(), 1);
    assert_eq!(second.close_count(), 1);
}

#[test]
fn duplicate_added_event_does_not_reopen() {
    let platform = HeadlessPlatform::new();
    let remote = platform.remote();
    let id = InstanceId(4);
    let stick = VirtualJoystick::new("Twice");
    remote.connect(id, stick.clone());
    remote.push_event(PlatformEvent::JoystickAdded(id));

    let mut game = Pads::new(remote.clone(), 1);
    framework(platform).run(&mut game).expect("run completes");

    assert_eq!(stick.open_count(), 1);
    assert_eq!(game.registered_in_update, [1]);
}
