use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::anyhow;

use gloam_engine::config::GameConfig;
use gloam_engine::framework::{Callback, FaultKind, Framework, RunOutcome, SessionState, SubsystemGuard};
use gloam_engine::input::{KeySymbol, MouseButton, Scancode};
use gloam_engine::platform::headless::{HeadlessPlatform, HeadlessRemote};
use gloam_engine::platform::{MouseButtonEvent, PlatformEvent, Subsystems};
use gloam_engine::time::{ManualTimeSource, MAX_FRAME_DURATION};
use gloam_engine::window::{FullscreenType, WindowFlags};
use gloam_engine::{Context, EngineError, Game};

/// Game that records every callback and misbehaves on request.
#[derive(Default)]
struct Script {
    log: Vec<String>,
    updates: u64,
    deltas: Vec<f64>,
    quit_after_updates: Option<u64>,
    fail_load: bool,
    quit_in_load: bool,
    mode_in_load: Option<(u32, u32)>,
    fail_update_on: Option<u64>,
    panic_draw: bool,
    clock: Option<ManualTimeSource>,
    tick: u64,
    key_seen_in_update: Option<bool>,
}

impl Script {
    fn quitting_after(updates: u64) -> Self {
        Self {
            quit_after_updates: Some(updates),
            ..Default::default()
        }
    }
}

impl Game for Script {
    fn load(&mut self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
        self.log.push("load".into());
        if self.fail_load {
            return Err(anyhow!("missing assets"));
        }
        if let Some((width, height)) = self.mode_in_load {
            anyhow::ensure!(
                ctx.window().set_mode(width, height, WindowFlags::default()),
                "set_mode({width}, {height}) refused"
            );
        }
        if self.quit_in_load {
            ctx.quit();
        }
        Ok(())
    }

    fn update(&mut self, ctx: &mut Context<'_>, dt: f64) -> anyhow::Result<()> {
        self.updates += 1;
        self.log.push("update".into());
        self.deltas.push(dt);
        if self.key_seen_in_update.is_none() {
            self.key_seen_in_update = Some(ctx.input().is_key_down(KeySymbol::Escape));
        }

        if self.fail_update_on == Some(self.updates) {
            return Err(anyhow!("update {} exploded", self.updates));
        }
        if let Some(clock) = &self.clock {
            clock.advance(self.tick);
        }
        if self.quit_after_updates == Some(self.updates) {
            ctx.quit();
        }
        Ok(())
    }

    fn draw(&mut self, _ctx: &mut Context<'_>) -> anyhow::Result<()> {
        self.log.push("draw".into());
        if self.panic_draw {
            panic!("draw blew up");
        }
        Ok(())
    }

    fn key_pressed(
        &mut self,
        _ctx: &mut Context<'_>,
        symbol: KeySymbol,
        scancode: Scancode,
        repeat: bool,
    ) -> anyhow::Result<()> {
        self.log.push(format!("key_pressed:{symbol:?}:{scancode:?}:{repeat}"));
        Ok(())
    }

    fn key_released(
        &mut self,
        _ctx: &mut Context<'_>,
        symbol: KeySymbol,
        _scancode: Scancode,
    ) -> anyhow::Result<()> {
        self.log.push(format!("key_released:{symbol:?}"));
        Ok(())
    }

    fn mouse_pressed(
        &mut self,
        _ctx: &mut Context<'_>,
        x: f32,
        y: f32,
        button: MouseButton,
        is_touch: bool,
        clicks: u8,
    ) -> anyhow::Result<()> {
        self.log
            .push(format!("mouse_pressed:{button:?}@{x},{y}:{is_touch}:{clicks}"));
        Ok(())
    }
}

fn framework(platform: HeadlessPlatform) -> Framework<HeadlessPlatform> {
    Framework::new(platform)
        .with_subsystem_guard(Arc::new(SubsystemGuard::new()))
        .silent(true)
}

fn faults_recorder() -> (Rc<RefCell<Vec<(Callback, String)>>>, impl FnMut(&gloam_engine::framework::GameFault)) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let handler = move |fault: &gloam_engine::framework::GameFault| {
        let detail = match &fault.kind {
            FaultKind::Failed(e) => format!("failed: {e}"),
            FaultKind::Panicked(message) => format!("panicked: {message}"),
        };
        sink.borrow_mut().push((fault.callback, detail));
    };
    (seen, handler)
}

fn assert_torn_down(remote: &HeadlessRemote) {
    assert!(!remote.window_open());
    assert_eq!(remote.initialized(), Subsystems::NONE);
    assert_eq!(remote.quit_calls(), 1);
}

#[test]
fn update_failure_ends_the_run_after_one_frame() {
    let platform = HeadlessPlatform::new();
    let remote = platform.remote();
    let mut config = GameConfig::default();
    config.window.title = "Test".into();
    config.window.width = 640;
    config.window.height = 480;

    let (faults, handler) = faults_recorder();
    let mut fw = framework(platform)
        .with_config(config)
        .with_error_handler(handler);
    let mut game = Script {
        mode_in_load: Some((800, 600)),
        fail_update_on: Some(2),
        ..Default::default()
    };

    let summary = fw.run(&mut game).expect("startup succeeds");

    assert_eq!(summary.outcome, RunOutcome::Errored);
    assert_eq!(summary.frames, 2);
    assert_eq!(summary.faults, 1);
    assert_eq!(summary.final_state, SessionState::Terminated);
    assert_eq!(game.log, ["load", "update", "draw", "update"]);

    let faults = faults.borrow();
    assert_eq!(faults.len(), 1);
    assert_eq!(faults[0].0, Callback::Update);
    assert_eq!(faults[0].1, "failed: update 2 exploded");

    assert_eq!(remote.presents(), 1);
    assert_eq!(remote.window_title(), "Test");
    assert_eq!(remote.window_mode().width, 800);
    assert_eq!(remote.window_mode().height, 600);
    assert_eq!(remote.window_shutdowns(), 1);
    assert_torn_down(&remote);
}

#[test]
fn load_failure_never_enters_the_loop() {
    let platform = HeadlessPlatform::new();
    let remote = platform.remote();
    let (faults, handler) = faults_recorder();
    let mut fw = framework(platform).with_error_handler(handler);
    let mut game = Script {
        fail_load: true,
        ..Default::default()
    };

    let summary = fw.run(&mut game).expect("load faults are not startup errors");

    assert_eq!(summary.outcome, RunOutcome::Errored);
    assert_eq!(summary.frames, 0);
    assert_eq!(game.log, ["load"]);
    assert_eq!(faults.borrow()[0].0, Callback::Load);
    assert_eq!(remote.presents(), 0);
    assert_torn_down(&remote);
}

#[test]
fn panic_in_draw_is_isolated() {
    let platform = HeadlessPlatform::new();
    let remote = platform.remote();
    let (faults, handler) = faults_recorder();
    let mut fw = framework(platform).with_error_handler(handler);
    let mut game = Script {
        panic_draw: true,
        ..Default::default()
    };

    let summary = fw.run(&mut game).expect("panics are game faults");

    assert_eq!(summary.outcome, RunOutcome::Errored);
    assert_eq!(summary.frames, 1);
    assert_eq!(game.log, ["load", "update", "draw"]);
    assert_eq!(
        faults.borrow().as_slice(),
        [(Callback::Draw, "panicked: draw blew up".to_owned())]
    );
    assert_eq!(remote.presents(), 0);
    assert_torn_down(&remote);
}

#[test]
fn panicking_error_handler_does_not_escape() {
    let platform = HeadlessPlatform::new();
    let remote = platform.remote();
    let mut fw = framework(platform).with_error_handler(|_| panic!("handler is broken"));
    let mut game = Script {
        fail_update_on: Some(1),
        ..Default::default()
    };

    let summary = fw.run(&mut game).expect("run completes");

    assert_eq!(summary.outcome, RunOutcome::Errored);
    assert_eq!(summary.faults, 1);
    assert_torn_down(&remote);
}

#[test]
fn subsystem_failure_is_fatal_before_load() {
    let platform = HeadlessPlatform::new();
    let remote = platform.remote();
    remote.fail_init("no display available");
    let guard = Arc::new(SubsystemGuard::new());
    let mut fw = Framework::new(platform)
        .with_subsystem_guard(Arc::clone(&guard))
        .silent(true);
    let mut game = Script::default();

    let err = fw.run(&mut game).expect_err("init failure is fatal");

    match err {
        EngineError::SubsystemInit(message) => assert!(message.contains("no display available")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(game.log.is_empty());
    assert!(!remote.window_open());
    assert_eq!(remote.quit_calls(), 0);
    assert!(!guard.is_initialized());
}

#[test]
fn window_mode_failure_is_fatal_and_tears_down() {
    let platform = HeadlessPlatform::new();
    let remote = platform.remote();
    remote.fail_set_mode(true);
    let mut fw = framework(platform);
    let mut game = Script::default();

    let err = fw.run(&mut game).expect_err("set_mode failure is fatal");

    assert!(matches!(
        err,
        EngineError::WindowMode {
            width: 800,
            height: 600
        }
    ));
    assert!(game.log.is_empty());
    assert_torn_down(&remote);
}

#[test]
fn closing_the_window_during_load_is_fatal() {
    let platform = HeadlessPlatform::new();
    let remote = platform.remote();
    let mut fw = framework(platform);
    let mut game = Script {
        quit_in_load: true,
        ..Default::default()
    };

    let err = fw.run(&mut game).expect_err("window closed after load");

    assert!(matches!(err, EngineError::WindowClosedAfterLoad));
    assert_eq!(game.log, ["load"]);
    assert_torn_down(&remote);
}

#[test]
fn quit_event_finishes_the_current_frame_then_stops() {
    let platform = HeadlessPlatform::new();
    let remote = platform.remote();
    remote.request_quit();
    let mut fw = framework(platform);
    let mut game = Script::default();

    let summary = fw.run(&mut game).expect("run completes");

    assert_eq!(summary.outcome, RunOutcome::Closed);
    assert_eq!(summary.frames, 1);
    assert_eq!(game.log, ["load", "update", "draw"]);
    assert_eq!(remote.presents(), 0);
    assert_torn_down(&remote);
}

#[test]
fn events_dispatch_in_order_before_update() {
    let platform = HeadlessPlatform::new();
    let remote = platform.remote();
    remote.push_events([
        PlatformEvent::KeyDown {
            symbol: KeySymbol::Escape,
            scancode: Scancode::Escape,
            repeat: false,
        },
        PlatformEvent::MouseMoved { x: 10.0, y: 20.0 },
        PlatformEvent::MouseButtonDown(MouseButtonEvent {
            x: 10.0,
            y: 20.0,
            button: MouseButton::Left,
            is_touch: false,
            clicks: 2,
        }),
    ]);
    let mut fw = framework(platform);
    let mut game = Script::quitting_after(2);

    let summary = fw.run(&mut game).expect("run completes");

    assert_eq!(summary.outcome, RunOutcome::Closed);
    assert_eq!(
        game.log,
        [
            "load",
            "key_pressed:Escape:Escape:false",
            "mouse_pressed:Left@10,20:false:2",
            "update",
            "draw",
            "update",
            "draw",
        ]
    );
    assert_eq!(game.key_seen_in_update, Some(true));
    assert_eq!(remote.presents(), 1);
    assert_eq!(remote.pumps(), 2);
}

#[test]
fn disabled_event_module_skips_dispatch() {
    let platform = HeadlessPlatform::new();
    let remote = platform.remote();
    remote.push_event(PlatformEvent::KeyUp {
        symbol: KeySymbol::Space,
        scancode: Scancode::Space,
    });
    let mut config = GameConfig::default();
    config.modules.event = false;
    config.modules.keyboard = false;
    config.modules.mouse = false;
    let mut fw = framework(platform).with_config(config);
    let mut game = Script::quitting_after(1);

    fw.run(&mut game).expect("run completes");

    assert_eq!(game.log, ["load", "update", "draw"]);
    assert_eq!(remote.pumps(), 0);
    assert_eq!(remote.pending_events(), 1);
}

#[test]
fn frame_deltas_follow_the_time_source_and_are_clamped() {
    let source = ManualTimeSource::new(1000);
    let platform = HeadlessPlatform::new().with_time_source(source.clone());
    let mut fw = framework(platform);
    let mut game = Script {
        clock: Some(source.clone()),
        tick: 16,
        quit_after_updates: Some(3),
        ..Default::default()
    };

    fw.run(&mut game).expect("run completes");

    assert_eq!(game.deltas.len(), 3);
    assert_eq!(game.deltas[0], 0.0);
    assert!((game.deltas[1] - 0.016).abs() < 1e-12);
    assert!((game.deltas[2] - 0.016).abs() < 1e-12);

    let platform = HeadlessPlatform::new().with_time_source(source.clone());
    let mut fw = framework(platform);
    let mut game = Script {
        clock: Some(source),
        tick: 5_000,
        quit_after_updates: Some(2),
        ..Default::default()
    };

    fw.run(&mut game).expect("run completes");

    assert_eq!(game.deltas, [0.0, MAX_FRAME_DURATION]);
}

#[test]
fn window_settings_are_applied_from_config() {
    let platform = HeadlessPlatform::new();
    let remote = platform.remote();
    let config = GameConfig::from_json_str(
        r#"{
            "window": {
                "title": "Configured",
                "width": 320,
                "height": 240,
                "fullscreen": true,
                "fullscreentype": "exclusive",
                "resizable": true,
                "highdpi": true,
                "minwidth": 160,
                "minheight": 120,
                "display": 2,
                "x": 15,
                "y": 25
            }
        }"#,
    )
    .expect("valid config");
    let mut fw = framework(platform).with_config(config);
    let mut game = Script::quitting_after(1);

    fw.run(&mut game).expect("run completes");

    let mode = remote.window_mode();
    assert_eq!((mode.width, mode.height), (320, 240));
    assert!(mode.flags.resizable);
    assert!(mode.flags.high_dpi);
    assert_eq!(mode.fullscreen, Some(FullscreenType::Exclusive));
    assert_eq!(remote.window_min_size(), Some((160, 120)));
    assert_eq!(remote.window_display(), Some(2));
    assert_eq!(remote.window_title(), "Configured");
    assert_eq!(remote.window_position(), Some((15, 25)));
}

#[test]
fn present_failures_are_not_fatal() {
    let platform = HeadlessPlatform::new();
    let remote = platform.remote();
    remote.fail_present(Some("surface lost"));
    let mut fw = framework(platform);
    let mut game = Script::quitting_after(3);

    let summary = fw.run(&mut game).expect("run completes");

    assert_eq!(summary.outcome, RunOutcome::Closed);
    assert_eq!(summary.frames, 3);
    assert_eq!(remote.presents(), 0);
}

#[test]
fn sequential_runs_reinitialize_subsystems() {
    let platform = HeadlessPlatform::new();
    let remote = platform.remote();
    let mut fw = framework(platform);

    for _ in 0..2 {
        let mut game = Script::quitting_after(1);
        let summary = fw.run(&mut game).expect("run completes");
        assert_eq!(summary.outcome, RunOutcome::Closed);
        assert!(!fw.subsystem_guard().is_initialized());
    }

    assert_eq!(remote.init_calls(), 2);
    assert_eq!(remote.quit_calls(), 2);
    assert_eq!(remote.window_shutdowns(), 2);
}

/// Starts a second framework from inside `load`, sharing the outer guard.
struct Nesting {
    guard: Arc<SubsystemGuard>,
    inner_events: Vec<PlatformEvent>,
    inner_remote: Option<HeadlessRemote>,
    inner_log: Vec<String>,
    guard_up_after_inner: bool,
}

impl Nesting {
    fn new(guard: &Arc<SubsystemGuard>) -> Self {
        Self {
            guard: Arc::clone(guard),
            inner_events: Vec::new(),
            inner_remote: None,
            inner_log: Vec::new(),
            guard_up_after_inner: false,
        }
    }
}

impl Game for Nesting {
    fn load(&mut self, _ctx: &mut Context<'_>) -> anyhow::Result<()> {
        let platform = HeadlessPlatform::new();
        let remote = platform.remote();
        remote.push_events(self.inner_events.drain(..));
        self.inner_remote = Some(remote);
        let mut inner = Framework::new(platform)
            .with_subsystem_guard(Arc::clone(&self.guard))
            .silent(true);

        let mut game = Script::quitting_after(1);
        let summary = inner.run(&mut game)?;
        anyhow::ensure!(summary.outcome == RunOutcome::Closed, "inner run errored");
        self.inner_log = game.log;
        self.guard_up_after_inner = self.guard.is_initialized();
        Ok(())
    }

    fn update(&mut self, ctx: &mut Context<'_>, _dt: f64) -> anyhow::Result<()> {
        ctx.quit();
        Ok(())
    }

    fn draw(&mut self, _ctx: &mut Context<'_>) -> anyhow::Result<()> {
        Ok(())
    }
}

#[test]
fn nested_run_borrows_the_outer_subsystems() {
    let guard = Arc::new(SubsystemGuard::new());
    let platform = HeadlessPlatform::new();
    let outer_remote = platform.remote();
    let mut fw = Framework::new(platform)
        .with_subsystem_guard(Arc::clone(&guard))
        .silent(true);
    let mut game = Nesting::new(&guard);

    let summary = fw.run(&mut game).expect("outer run completes");

    assert_eq!(summary.outcome, RunOutcome::Closed);
    assert!(game.guard_up_after_inner);

    let inner = game.inner_remote.expect("inner run started");
    assert_eq!(inner.init_calls(), 0);
    assert_eq!(inner.quit_calls(), 0);

    assert_eq!(outer_remote.init_calls(), 1);
    assert_eq!(outer_remote.quit_calls(), 1);
    assert!(!guard.is_initialized());
}

#[test]
fn nested_run_brings_up_the_subsystems_it_lacks() {
    let guard = Arc::new(SubsystemGuard::new());
    let mut config = GameConfig::default();
    config.modules.event = false;
    config.modules.keyboard = false;
    config.modules.mouse = false;
    let platform = HeadlessPlatform::new();
    let outer_remote = platform.remote();
    let mut fw = Framework::new(platform)
        .with_config(config)
        .with_subsystem_guard(Arc::clone(&guard))
        .silent(true);
    let mut game = Nesting::new(&guard);
    game.inner_events.push(PlatformEvent::KeyDown {
        symbol: KeySymbol::Escape,
        scancode: Scancode::Escape,
        repeat: false,
    });

    let summary = fw.run(&mut game).expect("outer run completes");

    assert_eq!(summary.outcome, RunOutcome::Closed);
    assert_eq!(game.inner_log, ["load", "key_pressed:Escape:Escape:false", "update", "draw"]);

    let inner = game.inner_remote.expect("inner run started");
    assert_eq!(inner.init_calls(), 1);
    assert_eq!(inner.quit_calls(), 1);
    assert_eq!(inner.initialized(), Subsystems::NONE);

    assert!(game.guard_up_after_inner);
    assert_eq!(outer_remote.init_calls(), 1);
    assert_eq!(outer_remote.quit_calls(), 1);
    assert!(!guard.is_initialized());
}

#[test]
fn missing_display_is_not_fatal() {
    let platform = HeadlessPlatform::new();
    let remote = platform.remote();
    let mut config = GameConfig::default();
    config.window.display = 7;
    let mut fw = framework(platform).with_config(config);
    let mut game = Script::quitting_after(1);

    let summary = fw.run(&mut game).expect("run completes");

    assert_eq!(summary.outcome, RunOutcome::Closed);
    assert_eq!(remote.window_display(), None);
    assert_eq!(remote.window_min_size(), Some((1, 1)));
}
