// Saving the picture: the exporter boundary and the background job that runs it.
// Visual: nothing changes on screen while a save runs; the host hears back once,
// on its own loop, and decides what to show (and whether to wipe the canvas).

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crossbeam::channel::{self, Receiver, TryRecvError};
use image::codecs::jpeg::JpegEncoder;

use crate::types::{Raster, RasterError};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("i/o: {0}")]
    Io(#[from] io::Error),
    #[error("encode: {0}")]
    Encode(#[from] image::ImageError),
    #[error("bad raster: {0}")]
    Raster(#[from] RasterError),
    #[error("nothing to save (empty raster)")]
    EmptyRaster,
    #[error("export worker exited without reporting")]
    WorkerLost,
}

/// Writes a finished raster somewhere and says where. Naming, folders and
/// collisions are the exporter's business.
pub trait ImageExporter: Send + Sync {
    fn export(&self, raster: &Raster, suggested_filename: &str) -> Result<PathBuf, ExportError>;
}

/// `Drawing_<unix millis>.jpg`
pub fn suggested_filename() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("Drawing_{millis}.jpg")
}

/// JPEG files in one directory.
pub struct JpegExporter {
    dir: PathBuf,
    quality: u8,
}

impl JpegExporter {
    pub const DEFAULT_QUALITY: u8 = 90;

    pub fn new(dir: impl Into<PathBuf>, quality: u8) -> Self {
        Self {
            dir: dir.into(),
            quality: quality.clamp(1, 100),
        }
    }

    /// First free path for `name`: `name`, then `stem-1.ext`, `stem-2.ext`, ...
    fn free_path(&self, name: &str) -> PathBuf {
        let first = self.dir.join(name);
        if !first.exists() {
            return first;
        }
        let as_path = Path::new(name);
        let stem = as_path.file_stem().and_then(|s| s.to_str()).unwrap_or("Drawing");
        let ext = as_path.extension().and_then(|s| s.to_str()).unwrap_or("jpg");
        (1..)
            .map(|n| self.dir.join(format!("{stem}-{n}.{ext}")))
            .find(|p| !p.exists())
            .unwrap_or(first)
    }
}

impl ImageExporter for JpegExporter {
    fn export(&self, raster: &Raster, suggested_filename: &str) -> Result<PathBuf, ExportError> {
        if raster.is_empty() {
            return Err(ExportError::EmptyRaster);
        }
        // convert first so a malformed raster leaves no file behind
        let img = raster.to_rgb_image()?;
        fs::create_dir_all(&self.dir)?;
        let path = self.free_path(suggested_filename);

        let mut out = BufWriter::new(File::create(&path)?);
        JpegEncoder::new_with_quality(&mut out, self.quality).encode_image(&img)?;
        out.flush()?;

        log::info!("saved {} ({}x{}, q{})", path.display(), raster.width, raster.height, self.quality);
        Ok(path)
    }
}

/// A save running on its own thread. It owns a copy of the raster, so the
/// compositor can keep drawing into its buffer meanwhile.
pub struct ExportJob {
    done: Receiver<Result<PathBuf, ExportError>>,
}

impl ExportJob {
    pub fn spawn(
        exporter: Arc<dyn ImageExporter>,
        raster: Raster,
        filename: String,
    ) -> io::Result<Self> {
        let (tx, done) = channel::bounded(1);
        std::thread::Builder::new()
            .name("export".into())
            .spawn(move || {
                let result = exporter.export(&raster, &filename);
                // Receiver gone means the app quit; nobody left to tell.
                let _ = tx.send(result);
            })?;
        Ok(Self { done })
    }

    /// Non-blocking check from the UI loop. `Some` exactly once.
    pub fn poll(&self) -> Option<Result<PathBuf, ExportError>> {
        match self.done.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ExportError::WorkerLost)),
        }
    }

    /// Block until the job reports.
    pub fn wait(self) -> Result<PathBuf, ExportError> {
        self.done.recv().unwrap_or(Err(ExportError::WorkerLost))
    }
}
