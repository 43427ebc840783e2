// Turns a DrawingSession into pixels: background photo (or blank paper),
// then every committed stroke oldest-first, then the live stroke on top.
// Visual: this is exactly the picture the window shows and the JPEG contains.

use crate::gamma::GammaLut;
use crate::session::DrawingSession;
use crate::types::{Color, Mask, Point, Raster, Size};

/// Surface color when no background photo is set.
pub const PAPER: Color = Color::WHITE;

pub struct Compositor {
    lut: GammaLut,
    frame: Raster,  // reused every render; reallocated only on resize
    coverage: Mask, // scratch: one stroke's coverage at a time
}

/// Pixel rectangle [x0,x1) x [y0,y1), already clipped to the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Bounds {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
}

impl Bounds {
    /// Box around `points` grown by `pad`, clipped to `size`. None if fully outside.
    fn around(points: &[Point], pad: f32, size: Size) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let clip = |v: f32, hi: usize| v.clamp(0.0, hi as f32) as usize;
        let b = Self {
            x0: clip((min_x - pad).floor(), size.width),
            y0: clip((min_y - pad).floor(), size.height),
            x1: clip((max_x + pad).ceil() + 1.0, size.width),
            y1: clip((max_y + pad).ceil() + 1.0, size.height),
        };
        (b.x0 < b.x1 && b.y0 < b.y1).then_some(b)
    }
}

impl Compositor {
    pub fn new(size: Size) -> Self {
        Self {
            lut: GammaLut::new(),
            frame: Raster::filled(size, PAPER),
            coverage: Mask::new(size),
        }
    }

    /// Drop the cached composite and start over at `size`. Strokes are untouched;
    /// they live in the session in view coordinates.
    pub fn resize(&mut self, size: Size) {
        if self.frame.size() == size {
            return;
        }
        log::debug!("compositor resize to {}x{}", size.width, size.height);
        self.frame.reshape(size);
        self.coverage.reshape(size);
    }

    /// Draw the whole session into the reusable frame and hand it back.
    /// Same session state in, same pixels out.
    pub fn render(&mut self, session: &DrawingSession) -> &Raster {
        self.resize(session.size());

        match session.background() {
            Some(bg) => fit_background(&mut self.frame, bg),
            None => self.frame.fill(PAPER),
        }

        for stroke in session.strokes() {
            self.draw_polyline(stroke.points(), stroke.color(), stroke.thickness());
        }

        // The live stroke goes last so it is always on top, with whatever brush
        // is selected right now.
        let live = session.builder();
        if !live.is_empty() {
            self.draw_polyline(live.points(), session.color(), session.thickness());
        }

        &self.frame
    }

    /// Render and copy out: an owned raster that can leave the UI thread.
    pub fn snapshot(&mut self, session: &DrawingSession) -> Raster {
        self.render(session).clone()
    }

    /// Stroke a round-cap, round-join line through `points`.
    /// Visual: each segment is a capsule; the union of capsules is the stroke.
    fn draw_polyline(&mut self, points: &[Point], color: Color, thickness: f32) {
        let radius = thickness * 0.5;
        let size = self.frame.size();
        let Some(area) = Bounds::around(points, radius + 1.0, size) else {
            return;
        };

        // 1) Clear the scratch coverage under this stroke only.
        for y in area.y0..area.y1 {
            let row = y * size.width;
            for a in &mut self.coverage.alpha[row + area.x0..row + area.x1] {
                *a = 0.0;
            }
        }

        // 2) Accumulate coverage per segment, keeping the max so overlaps
        //    (joins, self-crossings) don't paint twice.
        let pairs = points.windows(2).map(|w| (w[0], w[1]));
        let single = (points.len() == 1).then(|| (points[0], points[0]));
        for (a, b) in pairs.chain(single) {
            capsule_coverage(&mut self.coverage, a, b, radius);
        }

        // 3) Blend the stroke color through the coverage.
        for y in area.y0..area.y1 {
            let row = y * size.width;
            for x in area.x0..area.x1 {
                let cov = self.coverage.alpha[row + x];
                if cov > 0.0 {
                    let px = &mut self.frame.pixels[row + x];
                    *px = self.lut.mix(*px, color, cov);
                }
            }
        }
    }
}

/// Max-accumulate the anti-aliased coverage of the capsule a-b with `radius`.
fn capsule_coverage(mask: &mut Mask, a: Point, b: Point, radius: f32) {
    let size = Size::new(mask.width, mask.height);
    let Some(area) = Bounds::around(&[a, b], radius + 1.0, size) else {
        return;
    };

    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;

    for y in area.y0..area.y1 {
        let py = y as f32 + 0.5; // sample at pixel centers
        for x in area.x0..area.x1 {
            let px = x as f32 + 0.5;
            // Project onto the segment and clamp to its ends (the round caps).
            let t = if len2 > 0.0 {
                (((px - a.x) * dx + (py - a.y) * dy) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let (cx, cy) = (a.x + t * dx, a.y + t * dy);
            let d = ((px - cx) * (px - cx) + (py - cy) * (py - cy)).sqrt();

            // 1px feather centered on the ideal edge.
            let cov = (radius + 0.5 - d).clamp(0.0, 1.0);
            let idx = y * mask.width + x;
            if cov > mask.alpha[idx] {
                mask.alpha[idx] = cov;
            }
        }
    }
}

/// Stretch `bg` over the whole frame with nearest-neighbour sampling.
fn fit_background(frame: &mut Raster, bg: &Raster) {
    if bg.is_empty() {
        frame.fill(PAPER);
        return;
    }
    if bg.size() == frame.size() {
        frame.pixels.copy_from_slice(&bg.pixels);
        return;
    }
    for y in 0..frame.height {
        let sy = y * bg.height / frame.height;
        for x in 0..frame.width {
            let sx = x * bg.width / frame.width;
            frame.pixels[y * frame.width + x] = bg.pixels[sy * bg.width + sx];
        }
    }
}
