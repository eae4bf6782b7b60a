// Command-line configuration.

use std::path::PathBuf;

use clap::Parser;

use crate::types::{EffectParams, FacingMode};

#[derive(Parser, Debug, Clone)]
#[command(name = "webcam-fx")]
#[command(about = "Live webcam viewer with brightness, tint, blur and invert effects")]
#[command(version)]
pub struct Config {
    /// Camera index used for the front ("user") facing mode
    #[arg(long, default_value_t = 0)]
    pub user_camera: u32,

    /// Camera index used for the back ("environment") facing mode
    #[arg(long, default_value_t = 1)]
    pub environment_camera: u32,

    /// Facing mode to open at startup
    #[arg(long, value_enum, default_value_t = FacingMode::User)]
    pub facing: FacingMode,

    /// Initial brightness offset (-255..=255)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub brightness: i32,

    /// Initial blur radius in pixels (0 = off)
    #[arg(long, default_value_t = 0)]
    pub blur: u32,

    /// Initial warmth (reserved, no visual effect)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub warmth: i32,

    /// Initial red intensity (255 = unchanged)
    #[arg(long, default_value_t = 255)]
    pub red: i32,

    /// Initial green intensity (255 = unchanged)
    #[arg(long, default_value_t = 255)]
    pub green: i32,

    /// Initial blue intensity (255 = unchanged)
    #[arg(long, default_value_t = 255)]
    pub blue: i32,

    /// Where snapshots are written
    #[arg(long, default_value = "snapshot.png")]
    pub snapshot: PathBuf,
}

impl Config {
    pub fn initial_params(&self) -> EffectParams {
        EffectParams {
            warmth: self.warmth,
            brightness: self.brightness,
            blur: self.blur,
            red: self.red,
            green: self.green,
            blue: self.blue,
        }
    }
}
