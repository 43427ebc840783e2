// Window + input glue.
// Visual effects provided here:
// 1) A window that shows the composited drawing.
// 2) Mouse drags become pointer down/move/up for the session.
// 3) A ring that follows the mouse and shows the current brush size
//    (display only; it never lands in a saved picture).

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::app::PointerEvent;
use crate::error::Error;
use crate::types::{Point, Raster, Size};
use crate::widgets::{BackgroundKind, BrushSlider, InputEvent, palette_color};

pub struct Drawer {
    window: Window,
    was_down: bool,
    last_pos: Option<(f32, f32)>,
    display: Raster, // compositor output + cursor ring
}

impl Drawer {
    /// Create a resizable window of the canvas size.
    pub fn new(title: &str, size: Size) -> Result<Self, Error> {
        let opts = WindowOptions {
            resize: true,
            ..WindowOptions::default()
        };
        let mut window = Window::new(title, size.width, size.height, opts)
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self {
            window,
            was_down: false,
            last_pos: None,
            display: Raster::filled(size, crate::compositor::PAPER),
        })
    }

    /// Push `frame` to the screen, with the brush ring at the mouse.
    pub fn present(&mut self, frame: &Raster, brush_px: f32) -> Result<(), Error> {
        self.display.reshape(frame.size());
        self.display.pixels.copy_from_slice(&frame.pixels);

        if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Discard) {
            let r = (brush_px * 0.5).round().max(1.0) as i32;
            draw_ring(&mut self.display, mx as i32, my as i32, r, 0x00_80_80_80);
        }

        self.window
            .update_with_buffer(&self.display.pixels, self.display.width, self.display.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    pub fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    /// Current client-area size; differs from the canvas after the user resizes.
    pub fn size(&self) -> Size {
        let (w, h) = self.window.get_size();
        Size::new(w, h)
    }

    /// Turn the left button state since last frame into a gesture step.
    pub fn pointer_event(&mut self) -> Option<PointerEvent> {
        let now = PointerSample {
            down: self.window.get_mouse_down(MouseButton::Left),
            focused: self.window.is_active(),
            pos: self.window.get_mouse_pos(MouseMode::Clamp),
        };
        let (event, held) = gesture_step(self.was_down, self.last_pos, now);
        self.was_down = held;
        self.last_pos = now.pos;
        event
    }

    /// Keyboard stand-ins for the app's buttons.
    pub fn input_events(&self, slider: &mut BrushSlider) -> Vec<InputEvent> {
        const SWATCH_KEYS: [Key; 6] = [Key::Key1, Key::Key2, Key::Key3, Key::Key4, Key::Key5, Key::Key6];

        let mut out = Vec::new();
        for (i, key) in SWATCH_KEYS.iter().enumerate() {
            if self.pressed(*key) {
                if let Some(color) = palette_color(i) {
                    out.push(InputEvent::ColorChanged(color));
                }
            }
        }
        if self.window.is_key_pressed(Key::RightBracket, KeyRepeat::Yes) {
            out.push(slider.nudge(1));
        }
        if self.window.is_key_pressed(Key::LeftBracket, KeyRepeat::Yes) {
            out.push(slider.nudge(-1));
        }
        if self.pressed(Key::U) || self.pressed(Key::Z) {
            out.push(InputEvent::UndoRequested);
        }
        if self.pressed(Key::S) {
            out.push(InputEvent::ExportRequested);
        }
        if self.pressed(Key::G) {
            out.push(InputEvent::BackgroundRequested(BackgroundKind::File));
        }
        if self.pressed(Key::K) {
            out.push(InputEvent::BackgroundRequested(BackgroundKind::Camera));
        }
        if self.pressed(Key::X) {
            out.push(InputEvent::BackgroundCleared);
        }
        if self.pressed(Key::C) {
            out.push(InputEvent::ClearRequested);
        }
        out
    }

    fn pressed(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }
}

/// Mouse state read once per frame.
#[derive(Clone, Copy, Debug)]
struct PointerSample {
    down: bool,
    focused: bool,
    pos: Option<(f32, f32)>,
}

/// One frame of the gesture state machine: (event to emit, is a gesture still held).
/// Losing focus mid-drag cancels the stroke; the release would never reach us.
fn gesture_step(
    was_down: bool,
    last_pos: Option<(f32, f32)>,
    now: PointerSample,
) -> (Option<PointerEvent>, bool) {
    match (was_down, now.down && now.focused, now.pos) {
        (true, _, _) if !now.focused => (Some(PointerEvent::Cancel), false),
        (false, true, Some((x, y))) => (Some(PointerEvent::Down(Point::new(x, y))), true),
        // pressed outside the window; wait for a position
        (false, true, None) => (None, false),
        (true, true, Some((x, y))) if last_pos != Some((x, y)) => {
            (Some(PointerEvent::Move(Point::new(x, y))), true)
        }
        (true, false, _) => (Some(PointerEvent::Up), false),
        (held, _, _) => (None, held),
    }
}

/* ---------- Software drawing for the overlay ---------- */

/// Put a pixel on the raster if (x,y) is inside bounds.
#[inline]
fn put_pixel(fb: &mut Raster, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    fb.pixels[y * fb.width + x] = color;
}

/// 1px circle outline (midpoint algorithm).
/// Visual: a thin grey ring the size of the brush around the cursor.
fn draw_ring(fb: &mut Raster, cx: i32, cy: i32, r: i32, color: u32) {
    let (mut x, mut y) = (r, 0);
    let mut err = 1 - r;
    while x >= y {
        for (dx, dy) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
            put_pixel(fb, cx + dx, cy + dy, color);
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}
