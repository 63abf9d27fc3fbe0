use crate::input::InputState;
use crate::joystick::DeviceRegistry;
use crate::time::Clock;
use crate::window::Window;

/// Per-callback context passed to every [`super::Game`] callback.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
pub struct Context<'a> {
    window: &'a mut dyn Window,
    clock: &'a Clock,
    joysticks: &'a DeviceRegistry,
    input: &'a InputState,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        window: &'a mut dyn Window,
        clock: &'a Clock,
        joysticks: &'a DeviceRegistry,
        input: &'a InputState,
    ) -> Self {
        Self {
            window,
            clock,
            joysticks,
            input,
        }
    }

    pub fn window(&mut self) -> &mut (dyn Window + 'a) {
        &mut *self.window
    }

    pub fn timer(&self) -> &Clock {
        self.clock
    }

    pub fn joysticks(&self) -> &DeviceRegistry {
        self.joysticks
    }

    pub fn input(&self) -> &InputState {
        self.input
    }

    /// Closes the window; the frame loop ends before the next frame.
    pub fn quit(&mut self) {
        log::info!("quit requested by game");
        self.window.close();
    }
}
