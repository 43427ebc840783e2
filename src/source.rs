// Image sources for the background photo.
// Visual: whatever `pick_image` returns is stretched under the strokes;
// `None` means the user picked nothing and the old background stays.

use std::path::PathBuf;

use crate::error::Error;
use crate::types::Raster;

// Bring in nokhwa types for camera control.
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
};

pub trait ImageSource {
    fn pick_image(&mut self) -> Result<Option<Raster>, Error>;
}

/// Photos from disk. Each pick takes the next file in the list, wrapping around.
pub struct FileSource {
    paths: Vec<PathBuf>,
    next: usize,
}

impl FileSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths, next: 0 }
    }
}

impl ImageSource for FileSource {
    fn pick_image(&mut self) -> Result<Option<Raster>, Error> {
        if self.paths.is_empty() {
            log::info!("no background files configured");
            return Ok(None);
        }
        let path = &self.paths[self.next % self.paths.len()];
        self.next = (self.next + 1) % self.paths.len();

        let img = image::open(path)?;
        log::info!("loaded background {} ({}x{})", path.display(), img.width(), img.height());
        Ok(Some(Raster::from_image(&img)))
    }
}

/// One still frame from a webcam. The stream is opened per pick and closed
/// again, so the camera light is only on while snapping.
pub struct CameraSource {
    index: u32,
    width: u32,
    height: u32,
}

impl CameraSource {
    /// Frames thrown away before keeping one; the first few are often dark
    /// while auto-exposure settles.
    const WARMUP_FRAMES: usize = 5;

    pub fn new(index: u32, width: u32, height: u32) -> Self {
        Self { index, width, height }
    }

    fn open(&self) -> Result<Camera, Error> {
        let fmt = CameraFormat::new(
            Resolution::new(self.width, self.height),
            FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
            30,
        );
        // Closest match to the canvas size; the compositor stretches the rest.
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam = Camera::new(CameraIndex::Index(self.index), req)
            .map_err(|e| Error::CameraInit(format!("Create camera: {e}")))?;
        cam.open_stream()
            .map_err(|e| Error::CameraInit(format!("Open stream: {e}")))?;
        Ok(cam)
    }

    fn grab(cam: &mut Camera) -> Result<Raster, Error> {
        let frame = cam
            .frame()
            .map_err(|e| Error::CameraFrame(format!("Fetch frame: {e}")))?;
        let rgb = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("Decode RGB: {e}")))?;
        // Pack by hand: nokhwa's buffer type may come from its own `image` version.
        let (w, h) = rgb.dimensions();
        let mut pixels = Vec::with_capacity((w as usize) * (h as usize));
        for (_x, _y, pixel) in rgb.enumerate_pixels() {
            pixels.push(((pixel[0] as u32) << 16) | ((pixel[1] as u32) << 8) | pixel[2] as u32);
        }
        Ok(Raster {
            width: w as usize,
            height: h as usize,
            pixels,
        })
    }
}

impl ImageSource for CameraSource {
    fn pick_image(&mut self) -> Result<Option<Raster>, Error> {
        let mut cam = self.open()?;
        let mut shot = Self::grab(&mut cam);
        for _ in 0..Self::WARMUP_FRAMES {
            shot = Self::grab(&mut cam);
        }
        if let Err(e) = cam.stop_stream() {
            log::warn!("camera {} did not stop cleanly: {e}", self.index);
        }
        let shot = shot?;
        log::info!("camera snapshot {}x{}", shot.width, shot.height);
        Ok(Some(shot))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::{Color, Size};

    #[test]
    fn empty_file_list_picks_nothing() {
        let mut src = FileSource::new(Vec::new());
        assert!(src.pick_image().unwrap().is_none());
    }

    #[test]
    fn files_are_decoded_and_cycled() {
        let dir = std::env::temp_dir().join(format!("fingerpaint-src-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let a = dir.join("a.png");
        let b = dir.join("b.png");
        image::RgbImage::from_pixel(3, 2, image::Rgb([0xFF, 0, 0])).save(&a).unwrap();
        image::RgbImage::from_pixel(1, 1, image::Rgb([0, 0, 0])).save(&b).unwrap();

        let mut src = FileSource::new(vec![a, b]);
        let first = src.pick_image().unwrap().unwrap();
        assert_eq!(first, Raster::filled(Size::new(3, 2), Color::RED));
        let second = src.pick_image().unwrap().unwrap();
        assert_eq!(second.size(), Size::new(1, 1));
        let third = src.pick_image().unwrap().unwrap();
        assert_eq!(third, first);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut src = FileSource::new(vec![PathBuf::from("/definitely/not/here.png")]);
        assert!(src.pick_image().is_err());
    }
}
