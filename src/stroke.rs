// Strokes: the committed, immutable drawing unit, and the builder that
// accumulates the one currently under the finger.
// Visual: every line you see on the canvas is exactly one `Stroke`, except the
// one you are still dragging, which lives in the `StrokeBuilder`.

use crate::types::{Color, Point};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StrokeError {
    #[error("stroke thickness must be a positive number, got {0}")]
    InvalidThickness(f32),
    #[error("a stroke is already in progress")]
    AlreadyActive,
    #[error("no stroke in progress to commit")]
    NothingToCommit,
}

/// Reject zero, negative, NaN and infinite thicknesses.
pub fn check_thickness(thickness: f32) -> Result<f32, StrokeError> {
    if thickness.is_finite() && thickness > 0.0 {
        Ok(thickness)
    } else {
        Err(StrokeError::InvalidThickness(thickness))
    }
}

/// A finished line: points in drawing order, one color, one thickness.
/// Only [`StrokeBuilder::commit`] creates these; nothing mutates them afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    points: Vec<Point>,
    color: Color,
    thickness: f32,
}

impl Stroke {
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }
}

/// The in-progress stroke. `Idle` holds nothing; `Active` holds at least one point.
#[derive(Debug, Default)]
pub enum StrokeBuilder {
    #[default]
    Idle,
    Active {
        points: Vec<Point>,
        color: Color,
        thickness: f32,
    },
}

impl StrokeBuilder {
    pub fn new() -> Self {
        Self::Idle
    }

    /// Begin a stroke at `point`. Fails if one is already running; the caller
    /// decides whether to commit or cancel it first.
    pub fn start(&mut self, point: Point, color: Color, thickness: f32) -> Result<(), StrokeError> {
        let thickness = check_thickness(thickness)?;
        if self.is_active() {
            return Err(StrokeError::AlreadyActive);
        }
        *self = Self::Active {
            points: vec![point],
            color,
            thickness,
        };
        Ok(())
    }

    /// Append a point. Moves that arrive without a start are dropped.
    pub fn extend(&mut self, point: Point) {
        match self {
            Self::Active { points, .. } => points.push(point),
            Self::Idle => log::debug!("move at ({}, {}) with no stroke in progress", point.x, point.y),
        }
    }

    /// Package the accumulated points into a [`Stroke`] and go back to `Idle`.
    pub fn commit(&mut self) -> Result<Stroke, StrokeError> {
        match std::mem::take(self) {
            Self::Active {
                points,
                color,
                thickness,
            } => Ok(Stroke {
                points,
                color,
                thickness,
            }),
            Self::Idle => Err(StrokeError::NothingToCommit),
        }
    }

    /// Drop whatever is in progress.
    pub fn cancel(&mut self) {
        *self = Self::Idle;
    }

    /// Recolor the running stroke (the color picker can change mid-drag).
    pub fn set_color(&mut self, new_color: Color) {
        if let Self::Active { color, .. } = self {
            *color = new_color;
        }
    }

    /// Resize the running stroke's brush (the brush-size slider can move mid-drag).
    pub fn set_thickness(&mut self, new_thickness: f32) -> Result<(), StrokeError> {
        let new_thickness = check_thickness(new_thickness)?;
        if let Self::Active { thickness, .. } = self {
            *thickness = new_thickness;
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    pub fn is_empty(&self) -> bool {
        self.points().is_empty()
    }

    pub fn points(&self) -> &[Point] {
        match self {
            Self::Active { points, .. } => points,
            Self::Idle => &[],
        }
    }
}
