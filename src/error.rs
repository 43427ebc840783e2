// Crate-wide error type. Every variant states *where* things went wrong.

use crate::export::ExportError;
use crate::stroke::StrokeError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("window init error: {0}")]
    WindowInit(String),
    #[error("window update error: {0}")]
    WindowUpdate(String),
    #[error("camera init error: {0}")]
    CameraInit(String),
    #[error("camera frame error: {0}")]
    CameraFrame(String),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("stroke error: {0}")]
    Stroke(#[from] StrokeError),
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
    #[error("config error: {0}")]
    Config(String),
}
