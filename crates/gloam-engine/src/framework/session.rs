use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::config::WindowConfig;
use crate::core::Context;
use crate::error::{EngineError, EngineResult};
use crate::input::InputState;
use crate::joystick::{DeviceRegistry, InstanceId, Joystick};
use crate::platform::{Platform, Subsystems};
use crate::time::Clock;

use super::fault::{isolate, panic_message, Callback, ErrorHandler, FaultKind, GameFault};
use super::guard::{Acquired, SubsystemGuard};

/// Lifecycle state of a run.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SessionState {
    Idle,
    SubsystemsInitializing,
    SubsystemsReady,
    WindowConfiguring,
    GameLoading,
    Running,
    ShuttingDown,
    Terminated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// State owned by a single `Framework::run` call.
///
/// Dropping a session tears it down if `shutdown` has not run yet.
pub(crate) struct Session<'r, P: Platform> {
    pub(crate) platform: &'r mut P,
    guard: &'r SubsystemGuard,
    error_handler: Option<&'r mut ErrorHandler>,
    pub(crate) clock: Clock,
    pub(crate) joysticks: DeviceRegistry,
    pub(crate) input: InputState,
    state: SessionState,
    lease: Acquired,
    subsystems: Subsystems,
    input_ready: bool,
    error_state: bool,
    faults: u32,
    pub(crate) frames: u64,
    present_warned: bool,
}

impl<'r, P: Platform> Session<'r, P> {
    pub(crate) fn new(
        platform: &'r mut P,
        guard: &'r SubsystemGuard,
        error_handler: Option<&'r mut ErrorHandler>,
    ) -> Self {
        let clock = Clock::new(platform.time_source());
        Self {
            platform,
            guard,
            error_handler,
            clock,
            joysticks: DeviceRegistry::new(),
            input: InputState::default(),
            state: SessionState::Idle,
            lease: Acquired::NONE,
            subsystems: Subsystems::NONE,
            input_ready: false,
            error_state: false,
            faults: 0,
            frames: 0,
            present_warned: false,
        }
    }

    pub(crate) fn state(&self) -> SessionState {
        self.state
    }

    pub(crate) fn transition(&mut self, next: SessionState) {
        log::debug!("session: {} -> {}", self.state, next);
        self.state = next;
    }

    pub(crate) fn is_errored(&self) -> bool {
        self.error_state
    }

    pub(crate) fn input_ready(&self) -> bool {
        self.input_ready
    }

    pub(crate) fn faults(&self) -> u32 {
        self.faults
    }

    /// Marks the run as failed without a game fault (framework-level failure).
    pub(crate) fn enter_error(&mut self) {
        self.error_state = true;
        let window = self.platform.window();
        if window.is_open() {
            window.close();
        }
    }

    pub(crate) fn bring_up(&mut self, requested: Subsystems) -> EngineResult<()> {
        self.transition(SessionState::SubsystemsInitializing);

        let acquired = self
            .guard
            .acquire(&mut *self.platform, requested)
            .map_err(|e| {
                log::error!("FATAL: subsystem initialization failed: {e:#}");
                EngineError::SubsystemInit(format!("{e:#}"))
            })?;

        self.lease = acquired;
        self.subsystems = acquired.subsystems;
        self.input_ready = self.subsystems.events;
        if !self.input_ready {
            log::warn!("event subsystem disabled; input callbacks will not fire");
        }

        self.transition(SessionState::SubsystemsReady);
        Ok(())
    }

    pub(crate) fn configure_window(&mut self, config: &WindowConfig) -> EngineResult<()> {
        self.transition(SessionState::WindowConfiguring);

        let window = self.platform.window();
        let flags = config.flags();
        log::debug!(
            "setting window mode {}x{} ({flags:?})",
            config.width,
            config.height
        );

        if !window.set_mode(config.width, config.height, flags) {
            log::error!(
                "FATAL: failed to set window mode {}x{}",
                config.width,
                config.height
            );
            return Err(EngineError::WindowMode {
                width: config.width,
                height: config.height,
            });
        }

        window.set_title(&config.title);
        log::info!("window '{}' opened at {}", window.title(), window.mode());

        if !window.set_min_size(config.min_width, config.min_height) {
            log::warn!(
                "failed to apply minimum size {}x{}",
                config.min_width,
                config.min_height
            );
        }

        if config.display != 1 && !window.set_display(config.display) {
            log::warn!("display {} unavailable; staying on the primary display", config.display);
        }

        if config.fullscreen {
            let kind = config.fullscreen_kind();
            if !window.set_fullscreen(true, kind) {
                log::warn!("failed to enter {kind:?} fullscreen");
            }
        }

        if window.has_renderer() {
            let vsync = config.vsync_mode();
            if !window.set_vsync(vsync) {
                log::warn!("failed to apply vsync mode {vsync:?}");
            }
        }

        if let Some((x, y)) = config.position() {
            if !window.set_position(x, y) {
                log::warn!("failed to move window to ({x}, {y})");
            }
        }

        if config.icon.is_some() {
            log::debug!("window icon is left to the game");
        }

        Ok(())
    }

    /// Runs a game callback with a fresh context. Returns `false` if it faulted.
    pub(crate) fn invoke<F>(&mut self, callback: Callback, f: F) -> bool
    where
        F: FnOnce(&mut Context<'_>) -> anyhow::Result<()>,
    {
        let result = {
            let mut ctx = Context::new(
                self.platform.window(),
                &self.clock,
                &self.joysticks,
                &self.input,
            );
            isolate(callback, || f(&mut ctx))
        };

        match result {
            Ok(()) => true,
            Err(fault) => {
                self.fail(fault);
                false
            }
        }
    }

    /// Like `invoke`, for a registered joystick. Unknown ids are logged and dropped.
    pub(crate) fn invoke_joystick<F>(&mut self, callback: Callback, id: InstanceId, f: F) -> bool
    where
        F: FnOnce(&mut Context<'_>, &Joystick) -> anyhow::Result<()>,
    {
        let result = {
            let Some(joystick) = self.joysticks.get(id) else {
                log::warn!("{callback} event for unknown joystick {id}; dropped");
                return true;
            };
            let mut ctx = Context::new(
                self.platform.window(),
                &self.clock,
                &self.joysticks,
                &self.input,
            );
            isolate(callback, || f(&mut ctx, joystick))
        };

        match result {
            Ok(()) => true,
            Err(fault) => {
                self.fail(fault);
                false
            }
        }
    }

    /// Like `invoke`, for a joystick that is no longer registered.
    pub(crate) fn invoke_detached<F>(&mut self, callback: Callback, joystick: &Joystick, f: F) -> bool
    where
        F: FnOnce(&mut Context<'_>, &Joystick) -> anyhow::Result<()>,
    {
        let result = {
            let mut ctx = Context::new(
                self.platform.window(),
                &self.clock,
                &self.joysticks,
                &self.input,
            );
            isolate(callback, || f(&mut ctx, joystick))
        };

        match result {
            Ok(()) => true,
            Err(fault) => {
                self.fail(fault);
                false
            }
        }
    }

    /// Records a game fault: log, error state, handler, close the window.
    pub(crate) fn fail(&mut self, fault: GameFault) {
        log::error!("{fault}");
        if let FaultKind::Failed(e) = &fault.kind {
            log::debug!("{e:?}");
        }

        self.error_state = true;
        self.faults += 1;

        match self.error_handler.as_deref_mut() {
            Some(handler) => {
                let handler = &mut **handler;
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| handler(&fault))) {
                    log::error!(
                        "FATAL: error handler panicked: {}",
                        panic_message(payload.as_ref())
                    );
                    log::error!("original fault: {fault}");
                }
            }
            None => report_fault(&fault),
        }

        let window = self.platform.window();
        if window.is_open() {
            window.close();
        }
    }

    pub(crate) fn present(&mut self) {
        if let Err(e) = self.platform.window().present() {
            if self.present_warned {
                log::debug!("present failed: {e:#}");
            } else {
                log::warn!("present failed: {e:#}");
                self.present_warned = true;
            }
        }
    }

    /// Releases everything the run acquired. Idempotent.
    pub(crate) fn shutdown(&mut self) {
        if self.state == SessionState::Terminated {
            return;
        }

        self.transition(SessionState::ShuttingDown);

        self.platform.window().shutdown();
        self.joysticks.clear();
        self.guard.release(&mut *self.platform, self.lease);
        self.lease = Acquired::NONE;
        self.input_ready = false;
        self.input.clear();

        self.transition(SessionState::Terminated);
    }
}

impl<P: Platform> Drop for Session<'_, P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Default fault report when no handler is installed.
fn report_fault(fault: &GameFault) {
    log::error!("the game stopped after an unhandled error in `{}`", fault.callback);
    match &fault.kind {
        FaultKind::Failed(e) => {
            for (depth, cause) in e.chain().enumerate() {
                log::error!("  {depth}: {cause}");
            }
        }
        FaultKind::Panicked(message) => log::error!("  panic: {message}"),
    }
}
