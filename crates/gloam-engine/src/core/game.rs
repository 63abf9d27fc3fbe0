use crate::input::{KeySymbol, MouseButton, Scancode};
use crate::joystick::{GamepadAxis, GamepadButton, Joystick, JoystickHat};

use super::ctx::Context;

/// Game contract driven by [`crate::framework::Framework::run`].
///
/// Every callback may fail. An `Err` (or a panic) ends the run: the fault is
/// logged, the error handler runs and the window is closed. Only `update` and
/// `draw` are required.
pub trait Game {
    /// Called once after the window is configured, before the first frame.
    fn load(&mut self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called once per frame with the clamped delta in seconds.
    fn update(&mut self, ctx: &mut Context<'_>, dt: f64) -> anyhow::Result<()>;

    /// Called once per frame after `update`, before the frame is presented.
    fn draw(&mut self, ctx: &mut Context<'_>) -> anyhow::Result<()>;

    fn key_pressed(
        &mut self,
        ctx: &mut Context<'_>,
        symbol: KeySymbol,
        scancode: Scancode,
        repeat: bool,
    ) -> anyhow::Result<()> {
        let _ = (ctx, symbol, scancode, repeat);
        Ok(())
    }

    fn key_released(
        &mut self,
        ctx: &mut Context<'_>,
        symbol: KeySymbol,
        scancode: Scancode,
    ) -> anyhow::Result<()> {
        let _ = (ctx, symbol, scancode);
        Ok(())
    }

    /// `clicks` counts consecutive presses (2 for a double click).
    fn mouse_pressed(
        &mut self,
        ctx: &mut Context<'_>,
        x: f32,
        y: f32,
        button: MouseButton,
        is_touch: bool,
        clicks: u8,
    ) -> anyhow::Result<()> {
        let _ = (ctx, x, y, button, is_touch, clicks);
        Ok(())
    }

    fn mouse_released(
        &mut self,
        ctx: &mut Context<'_>,
        x: f32,
        y: f32,
        button: MouseButton,
        is_touch: bool,
        clicks: u8,
    ) -> anyhow::Result<()> {
        let _ = (ctx, x, y, button, is_touch, clicks);
        Ok(())
    }

    fn joystick_added(&mut self, ctx: &mut Context<'_>, joystick: &Joystick) -> anyhow::Result<()> {
        let _ = (ctx, joystick);
        Ok(())
    }

    /// The joystick is already unregistered and is disposed right after this returns.
    fn joystick_removed(&mut self, ctx: &mut Context<'_>, joystick: &Joystick) -> anyhow::Result<()> {
        let _ = (ctx, joystick);
        Ok(())
    }

    /// `value` is normalized to `[-1, 1]`.
    fn joystick_axis(
        &mut self,
        ctx: &mut Context<'_>,
        joystick: &Joystick,
        axis: usize,
        value: f32,
    ) -> anyhow::Result<()> {
        let _ = (ctx, joystick, axis, value);
        Ok(())
    }

    fn joystick_pressed(
        &mut self,
        ctx: &mut Context<'_>,
        joystick: &Joystick,
        button: usize,
    ) -> anyhow::Result<()> {
        let _ = (ctx, joystick, button);
        Ok(())
    }

    fn joystick_released(
        &mut self,
        ctx: &mut Context<'_>,
        joystick: &Joystick,
        button: usize,
    ) -> anyhow::Result<()> {
        let _ = (ctx, joystick, button);
        Ok(())
    }

    fn joystick_hat(
        &mut self,
        ctx: &mut Context<'_>,
        joystick: &Joystick,
        hat: usize,
        direction: JoystickHat,
    ) -> anyhow::Result<()> {
        let _ = (ctx, joystick, hat, direction);
        Ok(())
    }

    /// Only delivered for joysticks recognized as gamepads.
    fn gamepad_axis(
        &mut self,
        ctx: &mut Context<'_>,
        joystick: &Joystick,
        axis: GamepadAxis,
        value: f32,
    ) -> anyhow::Result<()> {
        let _ = (ctx, joystick, axis, value);
        Ok(())
    }

    fn gamepad_pressed(
        &mut self,
        ctx: &mut Context<'_>,
        joystick: &Joystick,
        button: GamepadButton,
    ) -> anyhow::Result<()> {
        let _ = (ctx, joystick, button);
        Ok(())
    }

    fn gamepad_released(
        &mut self,
        ctx: &mut Context<'_>,
        joystick: &Joystick,
        button: GamepadButton,
    ) -> anyhow::Result<()> {
        let _ = (ctx, joystick, button);
        Ok(())
    }
}
