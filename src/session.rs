// One drawing: committed strokes, the stroke under the finger, the background
// photo and the currently selected brush. The host builds it and passes it
// around explicitly; nothing here is global.

use std::sync::Arc;

use crate::stroke::{Stroke, StrokeBuilder, StrokeError, check_thickness};
use crate::stroke_log::StrokeLog;
use crate::types::{Color, Point, Raster, Size};

/// What a saved picture contained: the strokes committed so far and the
/// background shown at that moment.
#[derive(Clone, Debug)]
pub struct SavedMark {
    strokes: u64,
    background: Option<Arc<Raster>>,
}

pub struct DrawingSession {
    log: StrokeLog,
    builder: StrokeBuilder,
    background: Option<Arc<Raster>>,
    color: Color,
    thickness: f32,
    size: Size,
}

impl DrawingSession {
    pub fn new(size: Size, color: Color, thickness: f32) -> Result<Self, StrokeError> {
        Ok(Self {
            log: StrokeLog::new(),
            builder: StrokeBuilder::new(),
            background: None,
            color,
            thickness: check_thickness(thickness)?,
            size,
        })
    }

    /* ---------- pointer events ---------- */

    /// Finger down: start a new stroke with the current brush.
    /// If a stroke is somehow still running (lost "up" event), it is committed first.
    pub fn pointer_down(&mut self, point: Point) -> Result<(), StrokeError> {
        match self.builder.start(point, self.color, self.thickness) {
            Err(StrokeError::AlreadyActive) => {
                log::debug!("pointer down while a stroke is active; committing it first");
                let stroke = self.builder.commit()?;
                self.log.append(stroke);
                self.builder.start(point, self.color, self.thickness)
            }
            other => other,
        }
    }

    pub fn pointer_move(&mut self, point: Point) {
        self.builder.extend(point);
    }

    /// Finger up: the running stroke joins the log. Returns false if nothing was running.
    pub fn pointer_up(&mut self) -> bool {
        match self.builder.commit() {
            Ok(stroke) => {
                log::debug!(
                    "committed stroke #{} ({} points, {:.1}px)",
                    self.log.len() + 1,
                    stroke.points().len(),
                    stroke.thickness()
                );
                self.log.append(stroke);
                true
            }
            Err(_) => {
                log::debug!("pointer up with no stroke in progress");
                false
            }
        }
    }

    /// Abandon the running stroke (gesture cancelled by the platform).
    pub fn cancel_stroke(&mut self) {
        self.builder.cancel();
    }

    /* ---------- brush ---------- */

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        self.builder.set_color(color);
    }

    pub fn set_thickness(&mut self, thickness: f32) -> Result<(), StrokeError> {
        self.thickness = check_thickness(thickness)?;
        self.builder.set_thickness(self.thickness)
    }

    /* ---------- history ---------- */

    /// Drop the newest committed stroke. Returns false when there was none.
    pub fn undo(&mut self) -> bool {
        self.log.undo_last().is_some()
    }

    /// Wipe every stroke but keep the background.
    pub fn clear_strokes(&mut self) {
        self.builder.cancel();
        self.log.clear();
    }

    /// Back to a blank canvas: no strokes, no background. Brush stays.
    pub fn reset(&mut self) {
        self.clear_strokes();
        self.background = None;
    }

    /// Remember what is on the canvas right now, before handing a render to the exporter.
    pub fn mark_saved(&self) -> SavedMark {
        SavedMark {
            strokes: self.log.mark(),
            background: self.background.clone(),
        }
    }

    /// After a successful save: drop only what the saved picture contained.
    /// Strokes drawn since, the stroke in progress and a newer background stay.
    pub fn clear_saved(&mut self, mark: &SavedMark) {
        self.log.remove_before(mark.strokes);
        let same_background = match (&self.background, &mark.background) {
            (Some(now), Some(saved)) => Arc::ptr_eq(now, saved),
            _ => false,
        };
        if same_background {
            self.background = None;
        }
    }

    /* ---------- surface ---------- */

    pub fn set_background(&mut self, background: Option<Arc<Raster>>) {
        self.background = background;
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size;
    }

    /* ---------- read access for rendering ---------- */

    pub fn strokes(&self) -> &[Stroke] {
        self.log.snapshot()
    }

    pub fn builder(&self) -> &StrokeBuilder {
        &self.builder
    }

    pub fn background(&self) -> Option<&Raster> {
        self.background.as_deref()
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    pub fn size(&self) -> Size {
        self.size
    }
}
