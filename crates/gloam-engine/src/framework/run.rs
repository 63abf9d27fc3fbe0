use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::config::{GameConfig, WindowConfig};
use crate::core::Game;
use crate::error::{EngineError, EngineResult};
use crate::platform::{Platform, Subsystems};

use super::fault::{panic_message, Callback, ErrorHandler, GameFault};
use super::guard::SubsystemGuard;
use super::session::{Session, SessionState};

/// How a run that reached the game ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RunOutcome {
    /// The window was closed (quit event or `Context::quit`).
    Closed,
    /// A game callback or the framework itself faulted.
    Errored,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    /// Frame loop iterations started.
    pub frames: u64,
    /// Game faults recorded.
    pub faults: u32,
    pub final_state: SessionState,
}

/// Entry point: owns a platform backend and runs games on it.
///
/// ```no_run
/// # use gloam_engine::{Context, Game};
/// # use gloam_engine::framework::Framework;
/// # use gloam_engine::platform::headless::HeadlessPlatform;
/// struct Idle;
///
/// impl Game for Idle {
///     fn update(&mut self, ctx: &mut Context<'_>, _dt: f64) -> anyhow::Result<()> {
///         ctx.quit();
///         Ok(())
///     }
///
///     fn draw(&mut self, _ctx: &mut Context<'_>) -> anyhow::Result<()> {
///         Ok(())
///     }
/// }
///
/// let mut framework = Framework::new(HeadlessPlatform::new());
/// let summary = framework.run(&mut Idle)?;
/// # Ok::<(), gloam_engine::EngineError>(())
/// ```
pub struct Framework<P: Platform> {
    platform: P,
    config: GameConfig,
    guard: Arc<SubsystemGuard>,
    error_handler: Option<ErrorHandler>,
    silent: bool,
}

impl<P: Platform> Framework<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            config: GameConfig::default(),
            guard: SubsystemGuard::global(),
            error_handler: None,
            silent: false,
        }
    }

    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses `guard` instead of the process-wide subsystem guard.
    pub fn with_subsystem_guard(mut self, guard: Arc<SubsystemGuard>) -> Self {
        self.guard = guard;
        self
    }

    /// Installs a handler called for every game fault, after it is logged.
    pub fn with_error_handler<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&GameFault) + 'static,
    {
        self.error_handler = Some(Box::new(handler));
        self
    }

    /// Suppresses the startup banner.
    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn subsystem_guard(&self) -> &Arc<SubsystemGuard> {
        &self.guard
    }

    /// Runs `game` until its window closes or a callback faults.
    ///
    /// Returns `Err` only for startup failures (subsystems, window mode, window
    /// closed during load). Game faults end the run with [`RunOutcome::Errored`].
    /// Teardown has always completed when this returns.
    pub fn run(&mut self, game: &mut dyn Game) -> EngineResult<RunSummary> {
        if !self.silent {
            self.log_banner();
        }

        let requested = Subsystems::from_modules(&self.config.modules);
        let window_config = &self.config.window;
        let mut session = Session::new(
            &mut self.platform,
            &self.guard,
            self.error_handler.as_mut(),
        );

        let body = panic::catch_unwind(AssertUnwindSafe(|| {
            session.drive(game, requested, window_config)
        }));

        let result = match body {
            Ok(result) => result,
            Err(payload) => {
                log::error!(
                    "FATAL: unexpected framework error: {}",
                    panic_message(payload.as_ref())
                );
                session.enter_error();
                Ok(())
            }
        };

        session.shutdown();

        let summary = RunSummary {
            outcome: if session.is_errored() {
                RunOutcome::Errored
            } else {
                RunOutcome::Closed
            },
            frames: session.frames,
            faults: session.faults(),
            final_state: session.state(),
        };
        drop(session);

        match result {
            Ok(()) => {
                log::info!(
                    "run finished: {:?} after {} frame(s)",
                    summary.outcome,
                    summary.frames
                );
                Ok(summary)
            }
            Err(e) => Err(e),
        }
    }

    fn log_banner(&self) {
        log::info!(
            "gloam {} on {} ({} {})",
            env!("CARGO_PKG_VERSION"),
            self.platform.name(),
            std::env::consts::OS,
            std::env::consts::ARCH
        );
    }
}

impl<P: Platform> Session<'_, P> {
    fn drive(
        &mut self,
        game: &mut dyn Game,
        requested: Subsystems,
        window: &WindowConfig,
    ) -> EngineResult<()> {
        self.bring_up(requested)?;
        self.configure_window(window)?;

        self.transition(SessionState::GameLoading);
        log::info!("loading game");
        if !self.invoke(Callback::Load, |ctx| game.load(ctx)) {
            return Ok(());
        }

        if !self.platform.window().is_open() {
            log::error!("FATAL: window is not open after load");
            return Err(EngineError::WindowClosedAfterLoad);
        }

        self.transition(SessionState::Running);
        self.main_loop(game);
        Ok(())
    }

    fn main_loop(&mut self, game: &mut dyn Game) {
        log::info!("entering main loop");
        self.clock.initialize();

        while self.platform.window().is_open() && !self.is_errored() {
            self.frames += 1;

            let dt = self.clock.step();
            self.clock.record_frame(dt);

            self.drain(game);
            if self.is_errored() {
                break;
            }

            if !self.invoke(Callback::Update, |ctx| game.update(ctx, dt)) {
                break;
            }

            if !self.invoke(Callback::Draw, |ctx| game.draw(ctx)) {
                break;
            }

            if self.platform.window().is_open() {
                self.present();
            }
        }

        log::info!(
            "main loop ended after {} frame(s) (window open: {}, errored: {})",
            self.frames,
            self.platform.window().is_open(),
            self.is_errored()
        );
    }
}
