use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalPosition, LogicalSize, PhysicalSize, Size};
use winit::event::{ElementState, TouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Fullscreen, Window as WinitWindow, WindowAttributes, WindowId};

use crate::gpu::{Gpu, GpuInit};
use crate::input::MouseButton;
use crate::paint::Color;
use crate::platform::{MouseButtonEvent, PlatformEvent};
use crate::window::{FullscreenType, VSync, Window, WindowFlags, WindowMode};

use super::keymap::{map_mouse_button, map_scancode, map_symbol, to_logical_f32};

/// Pumps allowed for the backend to deliver a requested window.
const CREATE_PUMPS: usize = 8;

const MULTI_CLICK_INTERVAL: Duration = Duration::from_millis(500);
const MULTI_CLICK_SLOP: f32 = 4.0;

/// Client size for a mode: DPI-scaled points with `high_dpi`, raw pixels without.
fn client_size(width: u32, height: u32, flags: WindowFlags) -> Size {
    if flags.high_dpi {
        LogicalSize::new(f64::from(width), f64::from(height)).into()
    } else {
        PhysicalSize::new(width, height).into()
    }
}

/// Counts consecutive presses of the same button at (almost) the same spot.
#[derive(Debug, Default)]
pub(crate) struct ClickTracker {
    last: Option<(MouseButton, Instant, f32, f32)>,
    count: u8,
}

impl ClickTracker {
    pub(crate) fn press(&mut self, button: MouseButton, x: f32, y: f32, now: Instant) -> u8 {
        let chained = matches!(
            self.last,
            Some((b, at, lx, ly))
                if b == button
                    && now.saturating_duration_since(at) <= MULTI_CLICK_INTERVAL
                    && (x - lx).abs() <= MULTI_CLICK_SLOP
                    && (y - ly).abs() <= MULTI_CLICK_SLOP
        );

        self.count = if chained { self.count.saturating_add(1) } else { 1 };
        self.last = Some((button, now, x, y));
        self.count
    }

    pub(crate) fn release(&self, button: MouseButton) -> u8 {
        match self.last {
            Some((b, ..)) if b == button => self.count,
            _ => 1,
        }
    }
}

/// winit handler used while pumping: creates requested windows and queues events.
#[derive(Default)]
struct PumpHandler {
    pending: Option<WindowAttributes>,
    create_error: Option<String>,
    window: Option<Arc<WinitWindow>>,
    gpu: Option<Gpu>,
    events: VecDeque<PlatformEvent>,
    cursor: (f32, f32),
    clicks: ClickTracker,
}

impl PumpHandler {
    fn create_pending(&mut self, event_loop: &ActiveEventLoop) {
        let Some(attrs) = self.pending.take() else {
            return;
        };

        match event_loop.create_window(attrs) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => self.create_error = Some(e.to_string()),
        }
    }

    fn push_button(&mut self, pressed: bool, button: MouseButton, is_touch: bool) {
        let (x, y) = self.cursor;
        let event = if pressed {
            let clicks = self.clicks.press(button, x, y, Instant::now());
            PlatformEvent::MouseButtonDown(MouseButtonEvent {
                x,
                y,
                button,
                is_touch,
                clicks,
            })
        } else {
            PlatformEvent::MouseButtonUp(MouseButtonEvent {
                x,
                y,
                button,
                is_touch,
                clicks: self.clicks.release(button),
            })
        };
        self.events.push_back(event);
    }
}

impl ApplicationHandler for PumpHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.create_pending(event_loop);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.create_pending(event_loop);
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.events.push_back(PlatformEvent::Quit),

            WindowEvent::Resized(size) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(size);
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let size = window.inner_size();
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(size);
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = to_logical_f32(&window, position);
                self.cursor = (x, y);
                self.events.push_back(PlatformEvent::MouseMoved { x, y });
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = state == ElementState::Pressed;
                self.push_button(pressed, map_mouse_button(button), false);
            }

            WindowEvent::Touch(touch) => {
                self.cursor = to_logical_f32(&window, touch.location);
                match touch.phase {
                    TouchPhase::Started => self.push_button(true, MouseButton::Left, true),
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        self.push_button(false, MouseButton::Left, true)
                    }
                    TouchPhase::Moved => {
                        let (x, y) = self.cursor;
                        self.events.push_back(PlatformEvent::MouseMoved { x, y });
                    }
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let symbol = map_symbol(&event.logical_key);
                let scancode = map_scancode(event.physical_key);
                let translated = match event.state {
                    ElementState::Pressed => PlatformEvent::KeyDown {
                        symbol,
                        scancode,
                        repeat: event.repeat,
                    },
                    ElementState::Released => PlatformEvent::KeyUp { symbol, scancode },
                };
                self.events.push_back(translated);
            }

            _ => {}
        }
    }
}

/// Single winit window presented through wgpu.
///
/// Owns the process's winit `EventLoop`; it is pumped without blocking once per
/// frame instead of handing control to `run_app`.
pub struct DesktopWindow {
    event_loop: EventLoop<()>,
    handler: PumpHandler,
    gpu_init: GpuInit,
    mode: WindowMode,
    title: String,
    clear_color: Color,
}

impl DesktopWindow {
    pub(crate) fn new(event_loop: EventLoop<()>, gpu_init: GpuInit) -> Self {
        Self {
            event_loop,
            handler: PumpHandler::default(),
            gpu_init,
            mode: WindowMode::default(),
            title: String::new(),
            clear_color: Color::BLACK,
        }
    }

    pub(crate) fn pump(&mut self) {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.handler);

        if let PumpStatus::Exit(code) = status {
            log::debug!("winit event loop exited with code {code}");
            self.handler.events.push_back(PlatformEvent::Quit);
        }
    }

    pub(crate) fn poll(&mut self) -> Option<PlatformEvent> {
        self.handler.events.pop_front()
    }

    #[cfg(feature = "gamepad")]
    pub(crate) fn queue_mut(&mut self) -> &mut VecDeque<PlatformEvent> {
        &mut self.handler.events
    }
}

impl Window for DesktopWindow {
    fn set_mode(&mut self, width: u32, height: u32, flags: WindowFlags) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        let size = client_size(width, height, flags);

        if let Some(window) = self.handler.window.as_ref() {
            let _ = window.request_inner_size(size);
            window.set_resizable(flags.resizable);
            window.set_decorations(!flags.borderless);
            self.mode.width = width;
            self.mode.height = height;
            self.mode.flags = flags;
            return true;
        }

        let attrs = WinitWindow::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(size)
            .with_resizable(flags.resizable)
            .with_decorations(!flags.borderless);

        self.handler.create_error = None;
        self.handler.pending = Some(attrs);
        for _ in 0..CREATE_PUMPS {
            self.pump();
            if self.handler.window.is_some() || self.handler.create_error.is_some() {
                break;
            }
        }
        self.handler.pending = None;

        let Some(window) = self.handler.window.clone() else {
            let reason = self
                .handler
                .create_error
                .take()
                .unwrap_or_else(|| "the backend did not deliver a window".to_owned());
            log::error!("failed to create window: {reason}");
            return false;
        };

        match pollster::block_on(Gpu::new(window, self.gpu_init.clone())) {
            Ok(gpu) => self.handler.gpu = Some(gpu),
            Err(e) => log::warn!("renderer unavailable, frames will not be presented: {e:#}"),
        }

        self.mode = WindowMode {
            width,
            height,
            flags,
            fullscreen: None,
            vsync: VSync::On,
        };
        true
    }

    fn mode(&self) -> WindowMode {
        self.mode
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_owned();
        if let Some(window) = self.handler.window.as_ref() {
            window.set_title(title);
        }
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn is_open(&self) -> bool {
        self.handler.window.is_some()
    }

    fn close(&mut self) {
        // Surface first: it holds a reference to the window.
        self.handler.gpu = None;
        self.handler.window = None;
        self.handler.pending = None;
    }

    fn shutdown(&mut self) {
        self.close();
        self.handler.events.clear();
        self.handler.clicks = ClickTracker::default();
    }

    fn has_renderer(&self) -> bool {
        self.handler.gpu.is_some()
    }

    fn set_fullscreen(&mut self, fullscreen: bool, kind: FullscreenType) -> bool {
        let Some(window) = self.handler.window.as_ref() else {
            return false;
        };

        if !fullscreen {
            window.set_fullscreen(None);
            self.mode.fullscreen = None;
            return true;
        }

        let target = match kind {
            FullscreenType::Desktop => Fullscreen::Borderless(None),
            FullscreenType::Exclusive => {
                match window.current_monitor().and_then(|m| m.video_modes().next()) {
                    Some(mode) => Fullscreen::Exclusive(mode),
                    None => return false,
                }
            }
        };

        window.set_fullscreen(Some(target));
        self.mode.fullscreen = Some(kind);
        true
    }

    fn set_vsync(&mut self, vsync: VSync) -> bool {
        match self.handler.gpu.as_mut() {
            Some(gpu) => {
                gpu.set_vsync(vsync);
                self.mode.vsync = vsync;
                true
            }
            None => false,
        }
    }

    fn set_min_size(&mut self, width: u32, height: u32) -> bool {
        match self.handler.window.as_ref() {
            Some(window) => {
                window.set_min_inner_size(Some(client_size(width, height, self.mode.flags)));
                true
            }
            None => false,
        }
    }

    fn set_display(&mut self, display: u32) -> bool {
        let Some(window) = self.handler.window.as_ref() else {
            return false;
        };
        let Some(index) = display.checked_sub(1) else {
            return false;
        };
        let Some(monitor) = window.available_monitors().nth(index as usize) else {
            return false;
        };

        log::debug!("moving window to display {display} ({:?})", monitor.name());
        window.set_outer_position(monitor.position());
        true
    }

    fn set_position(&mut self, x: i32, y: i32) -> bool {
        match self.handler.window.as_ref() {
            Some(window) => {
                window.set_outer_position(LogicalPosition::new(x, y));
                true
            }
            None => false,
        }
    }

    fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    fn present(&mut self) -> anyhow::Result<()> {
        let Some(gpu) = self.handler.gpu.as_mut() else {
            anyhow::bail!("no renderer attached to the window");
        };
        if let Some(window) = self.handler.window.as_ref() {
            window.pre_present_notify();
        }
        gpu.clear_and_present(self.clear_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_dpi_sizes_are_logical() {
        let scaled = WindowFlags {
            high_dpi: true,
            ..WindowFlags::default()
        };

        assert_eq!(client_size(800, 600, scaled), Size::Logical(LogicalSize::new(800.0, 600.0)));
        assert_eq!(
            client_size(800, 600, WindowFlags::default()),
            Size::Physical(PhysicalSize::new(800, 600))
        );
    }

    #[test]
    fn clicks_chain_within_interval_and_slop() {
        let mut tracker = ClickTracker::default();
        let t0 = Instant::now();

        assert_eq!(tracker.press(MouseButton::Left, 10.0, 10.0, t0), 1);
        assert_eq!(tracker.release(MouseButton::Left), 1);
        assert_eq!(
            tracker.press(MouseButton::Left, 11.0, 9.0, t0 + Duration::from_millis(200)),
            2
        );
        assert_eq!(tracker.release(MouseButton::Left), 2);

        // too slow
        assert_eq!(
            tracker.press(MouseButton::Left, 11.0, 9.0, t0 + Duration::from_millis(900)),
            1
        );
        // other button
        assert_eq!(
            tracker.press(MouseButton::Right, 11.0, 9.0, t0 + Duration::from_millis(950)),
            1
        );
        // moved away
        assert_eq!(
            tracker.press(MouseButton::Right, 40.0, 9.0, t0 + Duration::from_millis(1000)),
            1
        );
    }
}
