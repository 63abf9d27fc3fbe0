use serde::{Deserialize, Serialize};

use crate::window::{FullscreenType, VSync, WindowFlags};

/// Window section of `config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,

    /// Icon image path. Loading images is left to the game.
    #[serde(default)]
    pub icon: Option<String>,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default)]
    pub borderless: bool,

    #[serde(default)]
    pub resizable: bool,

    #[serde(default = "default_min_size", rename = "minwidth")]
    pub min_width: u32,

    #[serde(default = "default_min_size", rename = "minheight")]
    pub min_height: u32,

    #[serde(default)]
    pub fullscreen: bool,

    /// `"desktop"` or `"exclusive"`.
    #[serde(default = "default_fullscreen_type", rename = "fullscreentype")]
    pub fullscreen_type: String,

    /// `-1` adaptive, `0` off, `1` on.
    #[serde(default = "default_vsync")]
    pub vsync: i32,

    /// 1-based display index.
    #[serde(default = "default_display")]
    pub display: u32,

    #[serde(default, rename = "highdpi")]
    pub high_dpi: bool,

    #[serde(default)]
    pub x: Option<i32>,

    #[serde(default)]
    pub y: Option<i32>,
}

fn default_title() -> String {
    "Untitled".to_string()
}
fn default_width() -> u32 {
    800
}
fn default_height() -> u32 {
    600
}
fn default_min_size() -> u32 {
    1
}
fn default_fullscreen_type() -> String {
    "desktop".to_string()
}
fn default_vsync() -> i32 {
    1
}
fn default_display() -> u32 {
    1
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            icon: None,
            width: default_width(),
            height: default_height(),
            borderless: false,
            resizable: false,
            min_width: default_min_size(),
            min_height: default_min_size(),
            fullscreen: false,
            fullscreen_type: default_fullscreen_type(),
            vsync: default_vsync(),
            display: default_display(),
            high_dpi: false,
            x: None,
            y: None,
        }
    }
}

impl WindowConfig {
    pub fn flags(&self) -> WindowFlags {
        WindowFlags {
            resizable: self.resizable,
            borderless: self.borderless,
            high_dpi: self.high_dpi,
        }
    }

    pub fn fullscreen_kind(&self) -> FullscreenType {
        FullscreenType::parse(&self.fullscreen_type)
    }

    pub fn vsync_mode(&self) -> VSync {
        VSync::from_config(self.vsync)
    }

    /// Explicit window position, only when both coordinates are set.
    pub fn position(&self) -> Option<(i32, i32)> {
        self.x.zip(self.y)
    }
}
