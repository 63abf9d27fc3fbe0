//! Window surface contract.
//!
//! A `Window` is owned by the platform backend; the session controller configures it
//! from `WindowConfig`, games reach it through `Context::window()`.

use std::fmt;

use crate::paint::Color;

/// Window creation flags.
///
/// This is stored as booleans rather than bitflags to keep it explicit and stable.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct WindowFlags {
    pub resizable: bool,
    pub borderless: bool,
    pub high_dpi: bool,
}

/// How fullscreen is entered.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum FullscreenType {
    /// Borderless window covering the current monitor.
    #[default]
    Desktop,
    /// Exclusive video mode change.
    Exclusive,
}

impl FullscreenType {
    /// Parses a config value; anything other than `"exclusive"` means desktop.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("exclusive") {
            FullscreenType::Exclusive
        } else {
            FullscreenType::Desktop
        }
    }
}

/// Presentation synchronization.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum VSync {
    Off,
    #[default]
    On,
    /// Sync when on time, tear when late.
    Adaptive,
}

impl VSync {
    /// Maps the config integer: `0` off, negative adaptive, positive on.
    pub fn from_config(value: i32) -> Self {
        match value {
            0 => VSync::Off,
            v if v < 0 => VSync::Adaptive,
            _ => VSync::On,
        }
    }
}

/// Current window mode as last applied.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct WindowMode {
    pub width: u32,
    pub height: u32,
    pub flags: WindowFlags,
    pub fullscreen: Option<FullscreenType>,
    pub vsync: VSync,
}

impl fmt::Display for WindowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)?;
        if let Some(kind) = self.fullscreen {
            write!(f, " fullscreen({kind:?})")?;
        }
        Ok(())
    }
}

/// Native window surface.
///
/// Optional capabilities return `false` when the backend cannot honor them; the
/// caller decides whether that is worth a warning.
pub trait Window {
    /// Creates the window (or reconfigures an open one). Returns `false` on failure.
    fn set_mode(&mut self, width: u32, height: u32, flags: WindowFlags) -> bool;

    fn mode(&self) -> WindowMode;

    fn set_title(&mut self, title: &str);
    fn title(&self) -> String;

    fn is_open(&self) -> bool;

    /// Closes the window; the frame loop ends at its next check.
    fn close(&mut self);

    /// Releases every native window resource. Safe to call repeatedly.
    fn shutdown(&mut self);

    /// True when a renderer is attached and frames can be presented.
    fn has_renderer(&self) -> bool;

    fn set_fullscreen(&mut self, fullscreen: bool, kind: FullscreenType) -> bool {
        let _ = (fullscreen, kind);
        false
    }

    fn set_vsync(&mut self, vsync: VSync) -> bool {
        let _ = vsync;
        false
    }

    fn set_position(&mut self, x: i32, y: i32) -> bool {
        let _ = (x, y);
        false
    }

    /// Smallest client size the user can resize to.
    fn set_min_size(&mut self, width: u32, height: u32) -> bool {
        let _ = (width, height);
        false
    }

    /// Moves the window onto the 1-based `display`.
    fn set_display(&mut self, display: u32) -> bool {
        let _ = display;
        false
    }

    fn set_clear_color(&mut self, color: Color);

    /// Presents the current frame.
    fn present(&mut self) -> anyhow::Result<()>;
}
