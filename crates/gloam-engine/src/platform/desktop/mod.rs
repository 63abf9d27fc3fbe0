//! Native backend: one winit window rendered with wgpu, pads through gilrs.

#[cfg(feature = "gamepad")]
mod gamepad;
mod keymap;
mod window;

use anyhow::Context as _;
use winit::event_loop::EventLoop;

use crate::gpu::GpuInit;
use crate::joystick::InstanceId;
use crate::time::{InstantSource, TimeSource};
use crate::window::Window;

use super::{OpenedJoystick, Platform, PlatformEvent, Subsystems};

pub use window::DesktopWindow;

/// Desktop backend.
///
/// winit allows one event loop per process, so create a single `DesktopPlatform`
/// and reuse it across runs.
pub struct DesktopPlatform {
    window: DesktopWindow,
    #[cfg(feature = "gamepad")]
    gamepads: Option<gamepad::GamepadBackend>,
}

impl DesktopPlatform {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_gpu_init(GpuInit::default())
    }

    pub fn with_gpu_init(init: GpuInit) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        Ok(Self {
            window: DesktopWindow::new(event_loop, init),
            #[cfg(feature = "gamepad")]
            gamepads: None,
        })
    }

    #[cfg(feature = "gamepad")]
    fn start_pads(&mut self) -> anyhow::Result<()> {
        if self.gamepads.is_none() {
            let backend = gamepad::GamepadBackend::new(self.window.queue_mut())?;
            self.gamepads = Some(backend);
        }
        Ok(())
    }

    #[cfg(not(feature = "gamepad"))]
    fn start_pads(&mut self) -> anyhow::Result<()> {
        log::warn!("built without the `gamepad` feature; joysticks are unavailable");
        Ok(())
    }

    fn stop_pads(&mut self) {
        #[cfg(feature = "gamepad")]
        {
            self.gamepads = None;
        }
    }
}

impl Platform for DesktopPlatform {
    fn name(&self) -> &str {
        "desktop"
    }

    fn init_subsystems(&mut self, subsystems: Subsystems) -> anyhow::Result<()> {
        if subsystems.joystick || subsystems.gamepad {
            self.start_pads()?;
        }
        Ok(())
    }

    fn quit_subsystems(&mut self, subsystems: Subsystems) {
        if subsystems.joystick || subsystems.gamepad {
            self.stop_pads();
        }
        if subsystems.video {
            self.window.shutdown();
        }
    }

    fn pump_events(&mut self) {
        self.window.pump();
        #[cfg(feature = "gamepad")]
        if let Some(pads) = self.gamepads.as_ref() {
            pads.pump(self.window.queue_mut());
        }
    }

    fn poll_event(&mut self) -> Option<PlatformEvent> {
        self.window.poll()
    }

    fn time_source(&self) -> Box<dyn TimeSource> {
        Box::new(InstantSource::new())
    }

    #[cfg(feature = "gamepad")]
    fn open_joystick(&mut self, id: InstanceId) -> anyhow::Result<OpenedJoystick> {
        self.gamepads
            .as_ref()
            .context("joystick subsystem is not initialized")?
            .open(id)
    }

    #[cfg(not(feature = "gamepad"))]
    fn open_joystick(&mut self, id: InstanceId) -> anyhow::Result<OpenedJoystick> {
        anyhow::bail!("cannot open joystick {id}: built without the `gamepad` feature")
    }

    fn window(&mut self) -> &mut dyn Window {
        &mut self.window
    }
}
