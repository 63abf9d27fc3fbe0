use std::env;
use std::path::PathBuf;
use std::time::Duration;

use gloam_engine::config::GameConfig;
use gloam_engine::framework::Framework;
use gloam_engine::input::{KeySymbol, Scancode};
use gloam_engine::joystick::{GamepadButton, Joystick};
use gloam_engine::logging::{init_logging, LoggingConfig};
use gloam_engine::paint::Color;
use gloam_engine::platform::headless::HeadlessPlatform;
use gloam_engine::platform::Platform;
use gloam_engine::{time, Context, Game, RunSummary};

/// Frames a headless run lasts before quitting on its own.
const HEADLESS_FRAMES: u64 = 120;

/// Clear color pulses with time; Esc (or Start on a pad) quits.
struct Sandbox {
    frames: u64,
    frame_limit: Option<u64>,
    color: Color,
}

impl Sandbox {
    fn new(frame_limit: Option<u64>) -> Self {
        Self {
            frames: 0,
            frame_limit,
            color: Color::BLACK,
        }
    }
}

impl Game for Sandbox {
    fn load(&mut self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
        let mode = ctx.window().mode();
        log::info!("sandbox loaded in a {mode} window");
        Ok(())
    }

    fn update(&mut self, ctx: &mut Context<'_>, _dt: f64) -> anyhow::Result<()> {
        self.frames += 1;

        let t = ctx.timer().time() as f32;
        let pulse = 0.5 + 0.5 * (t * 1.5).sin();
        self.color = Color::rgb(0.05, 0.08, 0.12).lerp(Color::rgb(0.2, 0.35, 0.55), pulse);

        if self.frames % 60 == 0 {
            log::debug!(
                "fps {} (avg dt {:.4}s), {} joystick(s)",
                ctx.timer().fps(),
                ctx.timer().average_delta(),
                ctx.joysticks().count()
            );
        }

        if let Some(limit) = self.frame_limit {
            time::sleep(1.0 / 60.0);
            if self.frames >= limit {
                ctx.quit();
            }
        }
        Ok(())
    }

    fn draw(&mut self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
        ctx.window().set_clear_color(self.color);
        Ok(())
    }

    fn key_pressed(
        &mut self,
        ctx: &mut Context<'_>,
        symbol: KeySymbol,
        scancode: Scancode,
        repeat: bool,
    ) -> anyhow::Result<()> {
        if repeat {
            return Ok(());
        }
        log::info!("key {symbol} ({scancode})");
        if symbol == KeySymbol::Escape {
            ctx.quit();
        }
        Ok(())
    }

    fn joystick_added(&mut self, _ctx: &mut Context<'_>, joystick: &Joystick) -> anyhow::Result<()> {
        log::info!(
            "joystick {} '{}': {} axes, {} buttons, gamepad: {}",
            joystick.id(),
            joystick.name(),
            joystick.axis_count(),
            joystick.button_count(),
            joystick.is_gamepad()
        );
        if joystick.is_vibration_supported() {
            joystick.set_vibration(0.4, 0.4, Some(Duration::from_millis(200)));
        }
        Ok(())
    }

    fn joystick_removed(&mut self, _ctx: &mut Context<'_>, joystick: &Joystick) -> anyhow::Result<()> {
        log::info!("joystick {} '{}' removed", joystick.id(), joystick.name());
        Ok(())
    }

    fn gamepad_pressed(
        &mut self,
        ctx: &mut Context<'_>,
        _joystick: &Joystick,
        button: GamepadButton,
    ) -> anyhow::Result<()> {
        if button == GamepadButton::Start {
            ctx.quit();
        }
        Ok(())
    }
}

fn run_on<P: Platform>(platform: P, config: GameConfig, frame_limit: Option<u64>) -> anyhow::Result<RunSummary> {
    let mut framework = Framework::new(platform).with_config(config);
    let summary = framework.run(&mut Sandbox::new(frame_limit))?;
    Ok(summary)
}

#[cfg(any(target_os = "windows", target_os = "macos", target_os = "linux"))]
fn run_native(config: GameConfig) -> anyhow::Result<RunSummary> {
    let platform = gloam_engine::platform::desktop::DesktopPlatform::new()?;
    run_on(platform, config, None)
}

#[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
fn run_native(config: GameConfig) -> anyhow::Result<RunSummary> {
    log::warn!("no native backend for this target; running headless");
    run_on(HeadlessPlatform::new(), config, Some(HEADLESS_FRAMES))
}

fn main() -> anyhow::Result<()> {
    let level = env::var("GLOAM_LOG_LEVEL").unwrap_or_else(|_| "info".to_owned());
    init_logging(LoggingConfig::default().with_level_name(&level));

    let config_dir = env::var_os("GLOAM_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let config = GameConfig::load_from_dir(&config_dir);

    let headless = matches!(
        env::var("GLOAM_VIDEODRIVER").as_deref(),
        Ok("dummy" | "offscreen")
    );

    let summary = if headless {
        run_on(HeadlessPlatform::new(), config, Some(HEADLESS_FRAMES))?
    } else {
        run_native(config)?
    };

    log::info!(
        "sandbox exited: {:?} after {} frame(s), {} fault(s)",
        summary.outcome,
        summary.frames,
        summary.faults
    );
    Ok(())
}
