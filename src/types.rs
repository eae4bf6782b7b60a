// Core types shared by the capture, pipeline and display code.

use std::fmt;

use image::RgbaImage;

/// Fixed size of the display surface every frame is drawn onto.
pub const TARGET_WIDTH: u32 = 640;
pub const TARGET_HEIGHT: u32 = 480;

/// Flat row-major RGBA8 samples; `len == width * height * 4` is upheld by `image`.
pub type PixelBuffer = RgbaImage;

/// Which camera to ask for: the front ("user") or back ("environment") one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FacingMode {
    #[default]
    User,
    Environment,
}

impl FacingMode {
    pub fn toggled(self) -> Self {
        match self {
            FacingMode::User => FacingMode::Environment,
            FacingMode::Environment => FacingMode::User,
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacingMode::User => f.write_str("user"),
            FacingMode::Environment => f.write_str("environment"),
        }
    }
}

/// Snapshot of the user controls, read once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectParams {
    /// Reserved; read but never applied to pixels.
    pub warmth: i32,
    /// Signed offset added to R, G and B.
    pub brightness: i32,
    /// Blur radius in pixels, 0 = off.
    pub blur: u32,
    /// Per-channel gain where 255 is unity.
    pub red: i32,
    pub green: i32,
    pub blue: i32,
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            warmth: 0,
            brightness: 0,
            blur: 0,
            red: 255,
            green: 255,
            blue: 255,
        }
    }
}
