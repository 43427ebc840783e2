// Core value types shared by the stroke model, the compositor and the window.

/// An RGBA color. Channels are straight (not premultiplied) sRGB bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
    pub const RED: Color = Color::rgb(0xFF, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build from a packed 0xAARRGGBB value (the layout Android-style color ints use).
    pub const fn from_argb(argb: u32) -> Self {
        Self::rgba((argb >> 16) as u8, (argb >> 8) as u8, argb as u8, (argb >> 24) as u8)
    }

    /// Pack as 0x00RRGGBB for the window buffer. Alpha is dropped.
    #[inline]
    pub const fn to_pixel(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

/// A 2D coordinate in view-local pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub const fn area(self) -> usize {
        self.width * self.height
    }
}

/// A decoded pixel buffer, one u32 per pixel in 0x00RRGGBB (what minifb wants).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl Raster {
    /// A raster of `size` filled with one color.
    pub fn filled(size: Size, color: Color) -> Self {
        Self {
            width: size.width,
            height: size.height,
            pixels: vec![color.to_pixel(); size.area()],
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Reallocate for a new size, keeping the allocation when the size is unchanged.
    pub fn reshape(&mut self, size: Size) {
        if self.size() == size {
            return;
        }
        self.width = size.width;
        self.height = size.height;
        self.pixels.clear();
        self.pixels.resize(size.area(), 0);
    }

    pub fn fill(&mut self, color: Color) {
        let px = color.to_pixel();
        for p in &mut self.pixels {
            *p = px;
        }
    }

    /// Pixel at (x,y), if in bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    /// Convert to an `image` RGB buffer for encoding.
    pub fn to_rgb_image(&self) -> Result<image::RgbImage, RasterError> {
        let mismatch = RasterError::SizeMismatch {
            width: self.width,
            height: self.height,
            len: self.pixels.len(),
        };
        if self.pixels.len() != self.size().area() {
            return Err(mismatch);
        }
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for px in &self.pixels {
            bytes.push((px >> 16) as u8);
            bytes.push((px >> 8) as u8);
            bytes.push(*px as u8);
        }
        image::RgbImage::from_raw(self.width as u32, self.height as u32, bytes).ok_or(mismatch)
    }

    /// Pack any decoded image as 0x00RRGGBB. Transparent regions are flattened onto white.
    pub fn from_image(img: &image::DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        let (w, h) = rgba.dimensions();
        let mut pixels = Vec::with_capacity((w as usize) * (h as usize));
        for pixel in rgba.pixels() {
            let [r, g, b, a] = pixel.0;
            let a = a as u32;
            let flat = |c: u8| (c as u32 * a + 0xFF * (255 - a) + 127) / 255;
            pixels.push((flat(r) << 16) | (flat(g) << 8) | flat(b));
        }
        Self {
            width: w as usize,
            height: h as usize,
            pixels,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RasterError {
    #[error("raster is {width}x{height} but holds {len} pixels")]
    SizeMismatch { width: usize, height: usize, len: usize },
}

/// Per-pixel coverage in [0,1]; 1 = fully painted by the stroke, 0 = untouched.
/// Visual: unseen directly; it decides how strongly a stroke color lands on each pixel.
pub struct Mask {
    pub width: usize,
    pub height: usize,
    pub alpha: Vec<f32>, // length = width * height, values clamped to [0.0, 1.0]
}

impl Mask {
    pub fn new(size: Size) -> Self {
        Self {
            width: size.width,
            height: size.height,
            alpha: vec![0.0; size.area()],
        }
    }

    pub fn reshape(&mut self, size: Size) {
        self.width = size.width;
        self.height = size.height;
        self.alpha.clear();
        self.alpha.resize(size.area(), 0.0);
    }
}
