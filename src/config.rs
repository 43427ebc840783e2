// Startup options: command line first, FINGERPAINT_* environment second.

use std::path::PathBuf;

use clap::Parser;

use crate::export::JpegExporter;
use crate::types::Size;

#[derive(Parser, Debug, Clone)]
#[command(name = "fingerpaint", about = "Freehand drawing over a background photo")]
pub struct Config {
    /// Canvas width in pixels.
    #[arg(long, env = "FINGERPAINT_WIDTH", default_value_t = 800)]
    pub width: usize,

    /// Canvas height in pixels.
    #[arg(long, env = "FINGERPAINT_HEIGHT", default_value_t = 600)]
    pub height: usize,

    /// Initial brush size in density-independent units.
    #[arg(long, env = "FINGERPAINT_BRUSH", default_value_t = 20.0)]
    pub brush_dp: f32,

    /// Device pixels per density-independent unit.
    #[arg(long, env = "FINGERPAINT_DENSITY", default_value_t = 1.0)]
    pub density: f32,

    /// Initial color as #RRGGBB or #AARRGGBB.
    #[arg(long, env = "FINGERPAINT_COLOR", default_value = "#000000")]
    pub color: String,

    /// Where saved drawings go. Defaults to <Pictures>/DrawingApp.
    #[arg(long, env = "FINGERPAINT_OUT_DIR")]
    pub out_dir: Option<PathBuf>,

    /// JPEG quality, 1..=100.
    #[arg(long, env = "FINGERPAINT_QUALITY", default_value_t = JpegExporter::DEFAULT_QUALITY)]
    pub quality: u8,

    /// Background photo(s); the gallery key cycles through them.
    #[arg(long = "background", env = "FINGERPAINT_BACKGROUND", value_delimiter = ',')]
    pub backgrounds: Vec<PathBuf>,

    /// Camera used for background snapshots.
    #[arg(long, env = "FINGERPAINT_CAMERA", default_value_t = 0)]
    pub camera_index: u32,

    /// Keep strokes and background after a successful save.
    #[arg(long, env = "FINGERPAINT_KEEP_AFTER_EXPORT")]
    pub keep_after_export: bool,
}

impl Config {
    pub fn canvas_size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.out_dir.clone().unwrap_or_else(|| {
            dirs::picture_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("DrawingApp")
        })
    }

    /// Reject values the rest of the app cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!("canvas must be non-empty, got {}x{}", self.width, self.height));
        }
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(format!("density must be positive, got {}", self.density));
        }
        if !(self.brush_dp.is_finite() && self.brush_dp > 0.0) {
            return Err(format!("brush size must be positive, got {}", self.brush_dp));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::try_parse_from(["fingerpaint"]).unwrap();
        assert_eq!(cfg.canvas_size(), Size::new(800, 600));
        assert_eq!(cfg.brush_dp, 20.0);
        assert_eq!(cfg.quality, 90);
        assert!(!cfg.keep_after_export);
        assert!(cfg.output_dir().ends_with("DrawingApp"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn flags_override() {
        let cfg = Config::try_parse_from([
            "fingerpaint",
            "--width",
            "320",
            "--height",
            "240",
            "--out-dir",
            "/tmp/pics",
            "--background",
            "a.png,b.jpg",
            "--keep-after-export",
        ])
        .unwrap();
        assert_eq!(cfg.canvas_size(), Size::new(320, 240));
        assert_eq!(cfg.output_dir(), PathBuf::from("/tmp/pics"));
        assert_eq!(cfg.backgrounds.len(), 2);
        assert!(cfg.keep_after_export);
    }

    #[test]
    fn zero_density_rejected() {
        let cfg = Config::try_parse_from(["fingerpaint", "--density", "0"]).unwrap();
        assert!(cfg.validate().is_err());
    }
}
