use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// Game callback a fault originated from.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Callback {
    Load,
    Update,
    Draw,
    KeyPressed,
    KeyReleased,
    MousePressed,
    MouseReleased,
    JoystickAdded,
    JoystickRemoved,
    JoystickAxis,
    JoystickPressed,
    JoystickReleased,
    JoystickHat,
    GamepadAxis,
    GamepadPressed,
    GamepadReleased,
}

impl Callback {
    pub fn as_str(&self) -> &'static str {
        match self {
            Callback::Load => "load",
            Callback::Update => "update",
            Callback::Draw => "draw",
            Callback::KeyPressed => "key_pressed",
            Callback::KeyReleased => "key_released",
            Callback::MousePressed => "mouse_pressed",
            Callback::MouseReleased => "mouse_released",
            Callback::JoystickAdded => "joystick_added",
            Callback::JoystickRemoved => "joystick_removed",
            Callback::JoystickAxis => "joystick_axis",
            Callback::JoystickPressed => "joystick_pressed",
            Callback::JoystickReleased => "joystick_released",
            Callback::JoystickHat => "joystick_hat",
            Callback::GamepadAxis => "gamepad_axis",
            Callback::GamepadPressed => "gamepad_pressed",
            Callback::GamepadReleased => "gamepad_released",
        }
    }
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub enum FaultKind {
    /// The callback returned an error.
    Failed(anyhow::Error),
    /// The callback panicked; holds the panic message.
    Panicked(String),
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::Failed(e) => write!(f, "failed: {e:#}"),
            FaultKind::Panicked(message) => write!(f, "panicked: {message}"),
        }
    }
}

/// A contained failure of a game callback.
#[derive(Debug, thiserror::Error)]
#[error("game callback `{callback}` {kind}")]
pub struct GameFault {
    pub callback: Callback,
    pub kind: FaultKind,
}

/// Custom fault handler installed with `Framework::with_error_handler`.
pub type ErrorHandler = Box<dyn FnMut(&GameFault)>;

/// Runs `f`, turning an `Err` return or a panic into a [`GameFault`].
pub(crate) fn isolate<F>(callback: Callback, f: F) -> Result<(), GameFault>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(error)) => Err(GameFault {
            callback,
            kind: FaultKind::Failed(error),
        }),
        Err(payload) => Err(GameFault {
            callback,
            kind: FaultKind::Panicked(panic_message(payload.as_ref())),
        }),
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context as _;

    #[test]
    fn ok_passes_through() {
        assert!(isolate(Callback::Update, || Ok(())).is_ok());
    }

    #[test]
    fn error_keeps_the_chain() {
        let fault = isolate(Callback::Draw, || {
            Err(anyhow::anyhow!("disk on fire")).context("saving screenshot")
        })
        .unwrap_err();

        assert_eq!(fault.callback, Callback::Draw);
        assert_eq!(
            fault.to_string(),
            "game callback `draw` failed: saving screenshot: disk on fire"
        );
    }

    #[test]
    fn panic_is_contained() {
        let fault = isolate(Callback::KeyPressed, || panic!("boom {}", 7)).unwrap_err();
        match fault.kind {
            FaultKind::Panicked(message) => assert_eq!(message, "boom 7"),
            other => panic!("unexpected fault kind: {other}"),
        }
    }
}
