// What you SEE:
// • A white canvas (or your background photo). Hold Left Mouse and drag to draw.
// • 1..6 pick a palette color, [ and ] change the brush size.
// • U / Z undo the last stroke, C clears all strokes.
// • G loads the next background file, K snaps one from the camera, X removes it.
// • S saves a JPEG; on success the saved strokes are wiped (unless --keep-after-export).
// • Type a color code like #34B5E6 + Enter in the terminal for any color.
// • ESC quits; a save still running is finished first.

mod app;
mod compositor;
mod config;
mod draw;
mod error;
mod export;
mod gamma;
mod permission;
mod session;
mod source;
mod stroke;
mod stroke_log;
mod types;
mod widgets;

use std::sync::Arc;

use app::{AfterExport, App, Notice};
use clap::Parser;
use config::Config;
use draw::Drawer;
use error::Error;
use export::JpegExporter;
use permission::DirectoryPermission;
use session::DrawingSession;
use source::{CameraSource, FileSource};
use widgets::{BrushSlider, HexColorInput, InputEvent, parse_hex_color};

const TITLE: &str = "Finger Paint";

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = Config::parse();
    cfg.validate().map_err(Error::Config)?;
    let color = parse_hex_color(&cfg.color).map_err(|e| Error::Config(e.to_string()))?;
    let size = cfg.canvas_size();
    let out_dir = cfg.output_dir();
    log::info!("canvas {}x{}, saving to {}", size.width, size.height, out_dir.display());

    /* --- Session + collaborators --- */
    let mut slider = BrushSlider::new(cfg.brush_dp, cfg.density);
    let session = DrawingSession::new(size, color, slider.pixels())?;
    let after_export = if cfg.keep_after_export { AfterExport::Keep } else { AfterExport::Reset };
    let mut app = App::new(
        session,
        Arc::new(JpegExporter::new(&out_dir, cfg.quality)),
        Box::new(DirectoryPermission::new(&out_dir)),
        Box::new(FileSource::new(cfg.backgrounds.clone())),
        Box::new(CameraSource::new(cfg.camera_index, size.width as u32, size.height as u32)),
        after_export,
    );

    // A background given on the command line shows from the start.
    if !cfg.backgrounds.is_empty() {
        if let Some(notice) = app.handle(InputEvent::BackgroundRequested(widgets::BackgroundKind::File)) {
            report(&mut None, notice);
        }
    }

    let colors = HexColorInput::spawn_stdin()?;
    let mut drawer = Drawer::new(TITLE, size)?;
    let mut status: Option<String> = None;

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Window resized? Strokes stay; only the frame is reallocated. */
        let now = drawer.size();
        if now != app.session().size() && now.area() > 0 {
            app.resize(now);
        }

        /* 2) Gesture + buttons */
        if let Some(ev) = drawer.pointer_event() {
            app.pointer(ev)?;
        }
        for ev in drawer.input_events(&mut slider) {
            if let Some(notice) = app.handle(ev) {
                report(&mut status, notice);
            }
        }
        for typed in colors.poll() {
            let notice = match typed {
                Ok(ev) => app.handle(ev),
                Err(e) => Some(Notice::Rejected(e.to_string())),
            };
            if let Some(notice) = notice {
                report(&mut status, notice);
            }
        }

        /* 3) A save finished on the worker? Handle it here, on the UI thread. */
        if let Some(notice) = app.poll_export() {
            report(&mut status, notice);
        }

        /* 4) Compose + present */
        let mut title = format!("{TITLE} | {} strokes", app.session().strokes().len());
        if app.export_in_flight() {
            title.push_str(" | saving…");
        } else if let Some(s) = &status {
            title.push_str(&format!(" | {s}"));
        }
        drawer.set_title(&title);
        let brush = app.session().thickness();
        drawer.present(app.frame(), brush)?;
    }

    // Dropping a running worker would cut the file short.
    if let Some(notice) = app.finish_export() {
        report(&mut status, notice);
    }
    Ok(())
}

/// Log a notice and keep a short version for the title bar.
fn report(status: &mut Option<String>, notice: Notice) {
    let text = match notice {
        Notice::Saving => "saving…".to_owned(),
        Notice::Saved(path) => format!("saved to {}", path.display()),
        Notice::SaveFailed(e) => format!("save failed: {e}"),
        Notice::SaveBusy => "still saving".to_owned(),
        Notice::PermissionDenied => "no permission to save".to_owned(),
        Notice::BackgroundSet => "background set".to_owned(),
        Notice::BackgroundFailed(e) => format!("background failed: {e}"),
        Notice::Rejected(e) => e,
    };
    log::info!("{text}");
    *status = Some(text);
}
