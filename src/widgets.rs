// Input widgets: palette buttons, the color picker and the brush-size slider.
// They speak to the core only through `InputEvent`; any text color codes are
// parsed here, before they reach the session.

use std::io::{self, BufRead};

use crossbeam::channel::{self, Receiver};

use crate::types::Color;

/// What the controls can ask the drawing app to do.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    ColorChanged(Color),
    /// Brush thickness in device pixels (already converted from dp).
    ThicknessChanged(f32),
    UndoRequested,
    ExportRequested,
    /// Pick a new background photo from the given source.
    BackgroundRequested(BackgroundKind),
    /// Remove the background photo.
    BackgroundCleared,
    /// Wipe all strokes, keep the background.
    ClearRequested,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackgroundKind {
    File,
    Camera,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("color code must start with '#': {0:?}")]
    MissingHash(String),
    #[error("color code must have 6 or 8 hex digits: {0:?}")]
    BadLength(String),
    #[error("invalid hex digit in color code: {0:?}")]
    BadDigit(String),
}

/// Parse `#RRGGBB` or `#AARRGGBB`.
pub fn parse_hex_color(code: &str) -> Result<Color, ColorParseError> {
    let digits = code
        .trim()
        .strip_prefix('#')
        .ok_or_else(|| ColorParseError::MissingHash(code.to_owned()))?;
    // from_str_radix alone would accept a leading '+'
    let value = match digits.chars().all(|c| c.is_ascii_hexdigit()) {
        true => u32::from_str_radix(digits, 16).map_err(|_| ColorParseError::BadLength(code.to_owned())),
        false => Err(ColorParseError::BadDigit(code.to_owned())),
    };
    match digits.len() {
        6 => Ok(Color::from_argb(0xFF00_0000 | value?)),
        8 => Ok(Color::from_argb(value?)),
        _ => Err(ColorParseError::BadLength(code.to_owned())),
    }
}

/// The quick-pick swatches, in button order (keys 1..6).
pub const PALETTE: [&str; 6] = ["#000000", "#7A277B", "#C62101", "#96A900", "#34B5E6", "#EE7722"];

/// Palette swatch `index` as a color, if there is one.
pub fn palette_color(index: usize) -> Option<Color> {
    PALETTE.get(index).and_then(|code| parse_hex_color(code).ok())
}

/// Brush-size slider: density-independent units in, device pixels out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushSlider {
    pub dp: f32,
    pub density: f32,
}

impl BrushSlider {
    pub const MIN_DP: f32 = 1.0;
    pub const MAX_DP: f32 = 100.0;
    pub const STEP_DP: f32 = 2.0;

    pub fn new(dp: f32, density: f32) -> Self {
        Self {
            dp: dp.clamp(Self::MIN_DP, Self::MAX_DP),
            density,
        }
    }

    pub fn pixels(&self) -> f32 {
        self.dp * self.density
    }

    /// Move the slider by `steps` notches and report the new thickness.
    pub fn nudge(&mut self, steps: i32) -> InputEvent {
        self.dp = (self.dp + steps as f32 * Self::STEP_DP).clamp(Self::MIN_DP, Self::MAX_DP);
        InputEvent::ThicknessChanged(self.pixels())
    }
}

/// Free color picker: type `#RRGGBB` or `#AARRGGBB` and Enter in the terminal
/// while drawing. Lines arrive on a reader thread; the UI loop polls.
pub struct HexColorInput {
    lines: Receiver<String>,
}

impl HexColorInput {
    pub fn from_lines(lines: Receiver<String>) -> Self {
        Self { lines }
    }

    /// Read lines from stdin on a background thread.
    pub fn spawn_stdin() -> io::Result<Self> {
        let (tx, lines) = channel::unbounded();
        std::thread::Builder::new()
            .name("color-input".into())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    match line {
                        Ok(line) => {
                            if tx.send(line).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            log::warn!("stdin closed: {e}");
                            break;
                        }
                    }
                }
            })?;
        Ok(Self::from_lines(lines))
    }

    /// Everything typed since the last poll, parsed. Blank lines are skipped.
    pub fn poll(&self) -> Vec<Result<InputEvent, ColorParseError>> {
        self.lines
            .try_iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| parse_hex_color(&line).map(InputEvent::ColorChanged))
            .collect()
    }
}
