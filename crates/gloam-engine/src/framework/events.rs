use crate::core::Game;
use crate::joystick::{normalize_axis, InstanceId};
use crate::platform::{Platform, PlatformEvent};

use super::fault::Callback;
use super::session::Session;

impl<P: Platform> Session<'_, P> {
    /// Pumps the backend once, then dispatches queued events until the queue is
    /// empty or a callback faults. Does nothing without the event subsystem.
    pub(crate) fn drain(&mut self, game: &mut dyn Game) {
        if !self.input_ready() {
            return;
        }
        self.platform.pump_events();

        while !self.is_errored() {
            let Some(event) = self.platform.poll_event() else {
                break;
            };
            self.dispatch(game, event);
        }
    }

    fn dispatch(&mut self, game: &mut dyn Game, event: PlatformEvent) {
        log::trace!("event: {}", event.kind());
        self.input.apply(&event);

        match event {
            PlatformEvent::Quit => {
                log::info!("quit requested; closing window");
                self.platform.window().close();
            }

            PlatformEvent::KeyDown {
                symbol,
                scancode,
                repeat,
            } => {
                self.invoke(Callback::KeyPressed, |ctx| {
                    game.key_pressed(ctx, symbol, scancode, repeat)
                });
            }
            PlatformEvent::KeyUp { symbol, scancode } => {
                self.invoke(Callback::KeyReleased, |ctx| {
                    game.key_released(ctx, symbol, scancode)
                });
            }

            // Position is tracked in the input state only.
            PlatformEvent::MouseMoved { .. } => {}
            PlatformEvent::MouseButtonDown(ev) => {
                self.invoke(Callback::MousePressed, |ctx| {
                    game.mouse_pressed(ctx, ev.x, ev.y, ev.button, ev.is_touch, ev.clicks)
                });
            }
            PlatformEvent::MouseButtonUp(ev) => {
                self.invoke(Callback::MouseReleased, |ctx| {
                    game.mouse_released(ctx, ev.x, ev.y, ev.button, ev.is_touch, ev.clicks)
                });
            }

            PlatformEvent::JoystickAdded(id) => self.joystick_added(game, id),
            PlatformEvent::JoystickRemoved(id) => self.joystick_removed(game, id),

            PlatformEvent::JoystickAxis { id, axis, value } => {
                let value = normalize_axis(value);
                self.invoke_joystick(Callback::JoystickAxis, id, |ctx, joystick| {
                    game.joystick_axis(ctx, joystick, usize::from(axis), value)
                });
            }
            PlatformEvent::JoystickButtonDown { id, button } => {
                self.invoke_joystick(Callback::JoystickPressed, id, |ctx, joystick| {
                    game.joystick_pressed(ctx, joystick, usize::from(button))
                });
            }
            PlatformEvent::JoystickButtonUp { id, button } => {
                self.invoke_joystick(Callback::JoystickReleased, id, |ctx, joystick| {
                    game.joystick_released(ctx, joystick, usize::from(button))
                });
            }
            PlatformEvent::JoystickHat { id, hat, value } => {
                self.invoke_joystick(Callback::JoystickHat, id, |ctx, joystick| {
                    game.joystick_hat(ctx, joystick, usize::from(hat), value)
                });
            }

            PlatformEvent::GamepadAxis { id, axis, value } => {
                if self.is_gamepad(id) {
                    let value = normalize_axis(value);
                    self.invoke_joystick(Callback::GamepadAxis, id, |ctx, joystick| {
                        game.gamepad_axis(ctx, joystick, axis, value)
                    });
                }
            }
            PlatformEvent::GamepadButtonDown { id, button } => {
                if self.is_gamepad(id) {
                    self.invoke_joystick(Callback::GamepadPressed, id, |ctx, joystick| {
                        game.gamepad_pressed(ctx, joystick, button)
                    });
                }
            }
            PlatformEvent::GamepadButtonUp { id, button } => {
                if self.is_gamepad(id) {
                    self.invoke_joystick(Callback::GamepadReleased, id, |ctx, joystick| {
                        game.gamepad_released(ctx, joystick, button)
                    });
                }
            }
        }
    }

    fn joystick_added(&mut self, game: &mut dyn Game, id: InstanceId) {
        log::info!("joystick {id} connected");

        if self.joysticks.add(&mut *self.platform, id).is_none() {
            log::warn!("joystick {id} could not be added");
            return;
        }

        self.invoke_joystick(Callback::JoystickAdded, id, |ctx, joystick| {
            game.joystick_added(ctx, joystick)
        });
    }

    fn joystick_removed(&mut self, game: &mut dyn Game, id: InstanceId) {
        log::info!("joystick {id} disconnected");

        let Some(mut joystick) = self.joysticks.remove(id) else {
            log::warn!("removal of unknown joystick {id}; ignored");
            return;
        };

        // The fault (if any) is already recorded; disposal happens regardless.
        self.invoke_detached(Callback::JoystickRemoved, &joystick, |ctx, joystick| {
            game.joystick_removed(ctx, joystick)
        });
        joystick.dispose();
    }

    fn is_gamepad(&self, id: InstanceId) -> bool {
        match self.joysticks.get(id) {
            Some(joystick) if joystick.is_gamepad() => true,
            Some(_) => {
                log::debug!("gamepad event from non-gamepad joystick {id}; dropped");
                false
            }
            None => {
                log::warn!("gamepad event for unknown joystick {id}; dropped");
                false
            }
        }
    }
}
