// Control layer: feeds pointer and widget events into the session, asks the
// compositor for frames, and runs saves without blocking the loop.
// Visual: everything the user does ends up here before it shows on screen.

use std::path::PathBuf;
use std::sync::Arc;

use crate::compositor::Compositor;
use crate::export::{ExportError, ExportJob, ImageExporter, suggested_filename};
use crate::permission::PermissionService;
use crate::session::{DrawingSession, SavedMark};
use crate::source::ImageSource;
use crate::stroke::StrokeError;
use crate::types::{Point, Raster, Size};
use crate::widgets::{BackgroundKind, InputEvent};

/// Finger/mouse gesture steps, already in view coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up,
    Cancel,
}

/// What happens to the drawing after a save succeeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AfterExport {
    Keep,
    /// Clear strokes and background, ready for a new drawing.
    Reset,
}

/// Things the host may want to tell the user about.
#[derive(Debug, PartialEq)]
pub enum Notice {
    Saving,
    Saved(PathBuf),
    SaveFailed(String),
    SaveBusy,
    PermissionDenied,
    BackgroundSet,
    BackgroundFailed(String),
    Rejected(String),
}

pub struct App {
    session: DrawingSession,
    compositor: Compositor,
    exporter: Arc<dyn ImageExporter>,
    permission: Box<dyn PermissionService>,
    files: Box<dyn ImageSource>,
    camera: Box<dyn ImageSource>,
    after_export: AfterExport,
    pending: Option<(ExportJob, SavedMark)>,
}

impl App {
    pub fn new(
        session: DrawingSession,
        exporter: Arc<dyn ImageExporter>,
        permission: Box<dyn PermissionService>,
        files: Box<dyn ImageSource>,
        camera: Box<dyn ImageSource>,
        after_export: AfterExport,
    ) -> Self {
        let compositor = Compositor::new(session.size());
        Self {
            session,
            compositor,
            exporter,
            permission,
            files,
            camera,
            after_export,
            pending: None,
        }
    }

    pub fn session(&self) -> &DrawingSession {
        &self.session
    }

    pub fn pointer(&mut self, event: PointerEvent) -> Result<(), StrokeError> {
        match event {
            PointerEvent::Down(p) => self.session.pointer_down(p)?,
            PointerEvent::Move(p) => self.session.pointer_move(p),
            PointerEvent::Up => {
                self.session.pointer_up();
            }
            PointerEvent::Cancel => self.session.cancel_stroke(),
        }
        Ok(())
    }

    pub fn handle(&mut self, event: InputEvent) -> Option<Notice> {
        match event {
            InputEvent::ColorChanged(color) => {
                self.session.set_color(color);
                None
            }
            InputEvent::ThicknessChanged(px) => match self.session.set_thickness(px) {
                Ok(()) => None,
                Err(e) => {
                    log::warn!("{e}");
                    Some(Notice::Rejected(e.to_string()))
                }
            },
            InputEvent::UndoRequested => {
                if !self.session.undo() {
                    log::debug!("undo with empty history");
                }
                None
            }
            InputEvent::ClearRequested => {
                self.session.clear_strokes();
                None
            }
            InputEvent::BackgroundCleared => {
                self.session.set_background(None);
                None
            }
            InputEvent::BackgroundRequested(kind) => self.pick_background(kind),
            InputEvent::ExportRequested => Some(self.start_export()),
        }
    }

    pub fn resize(&mut self, size: Size) {
        self.session.resize(size);
        self.compositor.resize(size);
    }

    /// The current picture, for the window.
    pub fn frame(&mut self) -> &Raster {
        self.compositor.render(&self.session)
    }

    pub fn export_in_flight(&self) -> bool {
        self.pending.is_some()
    }

    /// Called from the UI loop every frame; reports a finished save once and
    /// applies the post-save policy on this thread.
    pub fn poll_export(&mut self) -> Option<Notice> {
        let result = self.pending.as_ref()?.0.poll()?;
        let (_, mark) = self.pending.take()?;
        Some(self.finish(result, &mark))
    }

    /// Block until a running save is done (used on the way out, so the
    /// worker is never killed halfway through a file).
    pub fn finish_export(&mut self) -> Option<Notice> {
        let (job, mark) = self.pending.take()?;
        log::info!("waiting for the running save to finish");
        Some(self.finish(job.wait(), &mark))
    }

    fn finish(&mut self, result: Result<PathBuf, ExportError>, mark: &SavedMark) -> Notice {
        match result {
            Ok(path) => {
                if self.after_export == AfterExport::Reset {
                    self.session.clear_saved(mark);
                }
                Notice::Saved(path)
            }
            Err(e) => {
                log::error!("save failed: {e}");
                Notice::SaveFailed(e.to_string())
            }
        }
    }

    fn pick_background(&mut self, kind: BackgroundKind) -> Option<Notice> {
        let source = match kind {
            BackgroundKind::File => &mut self.files,
            BackgroundKind::Camera => &mut self.camera,
        };
        match source.pick_image() {
            Ok(Some(raster)) => {
                self.session.set_background(Some(Arc::new(raster)));
                Some(Notice::BackgroundSet)
            }
            Ok(None) => None,
            Err(e) => {
                log::warn!("background pick failed: {e}");
                Some(Notice::BackgroundFailed(e.to_string()))
            }
        }
    }

    fn start_export(&mut self) -> Notice {
        if self.pending.is_some() {
            log::info!("save requested while another is running; ignored");
            return Notice::SaveBusy;
        }
        if !self.permission.has_write_permission() && !self.permission.request_write_permission() {
            log::warn!("write permission denied; not saving");
            return Notice::PermissionDenied;
        }

        // Owned copy of the full view; the worker never sees the session.
        let raster = self.compositor.snapshot(&self.session);
        let mark = self.session.mark_saved();
        match ExportJob::spawn(self.exporter.clone(), raster, suggested_filename()) {
            Ok(job) => {
                self.pending = Some((job, mark));
                Notice::Saving
            }
            Err(e) => {
                log::error!("could not start save: {e}");
                Notice::SaveFailed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Error;
    use crate::types::Color;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        rasters: Mutex<Vec<Raster>>,
        fail: bool,
    }

    impl ImageExporter for Recorder {
        fn export(&self, raster: &Raster, name: &str) -> Result<PathBuf, ExportError> {
            self.rasters.lock().unwrap().push(raster.clone());
            if self.fail {
                Err(ExportError::Io(std::io::Error::other("disk full")))
            } else {
                Ok(PathBuf::from(name))
            }
        }
    }

    struct Perm(bool);
    impl PermissionService for Perm {
        fn has_write_permission(&self) -> bool {
            self.0
        }
        fn request_write_permission(&mut self) -> bool {
            self.0
        }
    }

    struct Fixed(Option<Raster>);
    impl ImageSource for Fixed {
        fn pick_image(&mut self) -> Result<Option<Raster>, Error> {
            Ok(self.0.clone())
        }
    }

    fn app(exporter: Arc<Recorder>, perm: bool, after: AfterExport) -> App {
        let session = DrawingSession::new(Size::new(40, 30), Color::RED, 4.0).unwrap();
        let bg = Raster::filled(Size::new(40, 30), Color::rgb(0, 0, 0xFF));
        App::new(
            session,
            exporter,
            Box::new(Perm(perm)),
            Box::new(Fixed(Some(bg))),
            Box::new(Fixed(None)),
            after,
        )
    }

    fn stroke(app: &mut App, a: (f32, f32), b: (f32, f32)) {
        app.pointer(PointerEvent::Down(Point::new(a.0, a.1))).unwrap();
        app.pointer(PointerEvent::Move(Point::new(b.0, b.1))).unwrap();
        app.pointer(PointerEvent::Up).unwrap();
    }

    fn wait_for_save(app: &mut App) -> Notice {
        for _ in 0..2000 {
            if let Some(n) = app.poll_export() {
                return n;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        panic!("save never reported");
    }

    #[test]
    fn export_sends_full_view_and_leaves_state() {
        let rec = Arc::new(Recorder::default());
        let mut app = app(rec.clone(), true, AfterExport::Reset);
        assert_eq!(app.handle(InputEvent::BackgroundRequested(BackgroundKind::File)), Some(Notice::BackgroundSet));
        stroke(&mut app, (2.0, 5.0), (38.0, 5.0));
        app.handle(InputEvent::ColorChanged(Color::BLACK));
        stroke(&mut app, (20.0, 0.0), (20.0, 30.0));
        let expected = app.frame().clone();

        assert_eq!(app.handle(InputEvent::ExportRequested), Some(Notice::Saving));
        // nothing reset yet
        assert_eq!(app.session().strokes().len(), 2);
        assert!(app.session().background().is_some());

        let notice = wait_for_save(&mut app);
        assert!(matches!(notice, Notice::Saved(_)));
        let rasters = rec.rasters.lock().unwrap();
        assert_eq!(rasters.len(), 1);
        assert_eq!(rasters[0], expected);
        // background, then red, then black on top where they cross
        assert_eq!(rasters[0].get(20, 5), Some(Color::BLACK.to_pixel()));
        assert_eq!(rasters[0].get(5, 4), Some(Color::RED.to_pixel()));
        assert_eq!(rasters[0].get(5, 20), Some(0x00_00_00_FF));
        drop(rasters);

        assert!(app.session().strokes().is_empty());
        assert!(app.session().background().is_none());
    }

    #[test]
    fn keep_policy_keeps_drawing() {
        let rec = Arc::new(Recorder::default());
        let mut app = app(rec, true, AfterExport::Keep);
        stroke(&mut app, (1.0, 1.0), (9.0, 9.0));
        app.handle(InputEvent::ExportRequested);
        assert!(matches!(wait_for_save(&mut app), Notice::Saved(_)));
        assert_eq!(app.session().strokes().len(), 1);
    }

    #[test]
    fn failed_save_keeps_everything_for_retry() {
        let rec = Arc::new(Recorder { fail: true, ..Default::default() });
        let mut app = app(rec, true, AfterExport::Reset);
        app.handle(InputEvent::BackgroundRequested(BackgroundKind::File));
        stroke(&mut app, (1.0, 1.0), (9.0, 9.0));

        app.handle(InputEvent::ExportRequested);
        assert!(matches!(wait_for_save(&mut app), Notice::SaveFailed(_)));
        assert_eq!(app.session().strokes().len(), 1);
        assert!(app.session().background().is_some());
        assert!(!app.export_in_flight());
    }

    #[test]
    fn denied_permission_skips_export() {
        let rec = Arc::new(Recorder::default());
        let mut app = app(rec.clone(), false, AfterExport::Reset);
        stroke(&mut app, (1.0, 1.0), (9.0, 9.0));
        assert_eq!(app.handle(InputEvent::ExportRequested), Some(Notice::PermissionDenied));
        assert!(!app.export_in_flight());
        assert!(rec.rasters.lock().unwrap().is_empty());
        assert_eq!(app.session().strokes().len(), 1);
    }

    #[test]
    fn picking_nothing_keeps_background() {
        let rec = Arc::new(Recorder::default());
        let mut app = app(rec, true, AfterExport::Keep);
        app.handle(InputEvent::BackgroundRequested(BackgroundKind::File));
        assert_eq!(app.handle(InputEvent::BackgroundRequested(BackgroundKind::Camera)), None);
        assert!(app.session().background().is_some());
        app.handle(InputEvent::BackgroundCleared);
        assert!(app.session().background().is_none());
    }

    #[test]
    fn widget_events_reach_session() {
        let rec = Arc::new(Recorder::default());
        let mut app = app(rec, true, AfterExport::Keep);
        assert!(matches!(app.handle(InputEvent::ThicknessChanged(-2.0)), Some(Notice::Rejected(_))));
        app.handle(InputEvent::ThicknessChanged(9.0));
        assert_eq!(app.session().thickness(), 9.0);

        stroke(&mut app, (1.0, 1.0), (2.0, 2.0));
        stroke(&mut app, (3.0, 3.0), (4.0, 4.0));
        app.handle(InputEvent::UndoRequested);
        assert_eq!(app.session().strokes().len(), 1);
        app.handle(InputEvent::ClearRequested);
        app.handle(InputEvent::UndoRequested);
        assert!(app.session().strokes().is_empty());
    }

    #[test]
    fn resize_keeps_strokes() {
        let rec = Arc::new(Recorder::default());
        let mut app = app(rec, true, AfterExport::Keep);
        stroke(&mut app, (1.0, 1.0), (9.0, 9.0));
        app.resize(Size::new(100, 10));
        assert_eq!(app.frame().size(), Size::new(100, 10));
        assert_eq!(app.session().strokes().len(), 1);
    }

    /// Exporter that holds the save open until the test lets it go.
    struct Gated {
        gate: crossbeam::channel::Receiver<()>,
    }

    impl ImageExporter for Gated {
        fn export(&self, _raster: &Raster, name: &str) -> Result<PathBuf, ExportError> {
            let _ = self.gate.recv();
            Ok(PathBuf::from(name))
        }
    }

    fn gated_app() -> (App, crossbeam::channel::Sender<()>) {
        let (open, gate) = crossbeam::channel::bounded(1);
        let session = DrawingSession::new(Size::new(40, 30), Color::RED, 4.0).unwrap();
        let app = App::new(
            session,
            Arc::new(Gated { gate }),
            Box::new(Perm(true)),
            Box::new(Fixed(Some(Raster::filled(Size::new(40, 30), Color::WHITE)))),
            Box::new(Fixed(None)),
            AfterExport::Reset,
        );
        (app, open)
    }

    #[test]
    fn strokes_drawn_during_save_survive_reset() {
        let (mut app, open) = gated_app();
        stroke(&mut app, (1.0, 1.0), (9.0, 9.0));
        assert_eq!(app.handle(InputEvent::ExportRequested), Some(Notice::Saving));

        stroke(&mut app, (20.0, 20.0), (30.0, 25.0));
        let unsaved = app.session().strokes()[1].clone();
        assert_eq!(app.poll_export(), None);

        open.send(()).unwrap();
        assert!(matches!(wait_for_save(&mut app), Notice::Saved(_)));
        assert_eq!(app.session().strokes(), &[unsaved]);
    }

    #[test]
    fn background_picked_during_save_survives_reset() {
        let (mut app, open) = gated_app();
        app.handle(InputEvent::BackgroundRequested(BackgroundKind::File));
        app.handle(InputEvent::ExportRequested);
        app.handle(InputEvent::BackgroundRequested(BackgroundKind::File));

        open.send(()).unwrap();
        assert!(matches!(wait_for_save(&mut app), Notice::Saved(_)));
        assert!(app.session().background().is_some());
    }

    #[test]
    fn finish_export_waits_for_running_save() {
        let (mut app, open) = gated_app();
        stroke(&mut app, (1.0, 1.0), (9.0, 9.0));
        app.handle(InputEvent::ExportRequested);
        assert!(app.export_in_flight());

        let release = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            let _ = open.send(());
        });
        assert!(matches!(app.finish_export(), Some(Notice::Saved(_))));
        release.join().unwrap();

        assert!(!app.export_in_flight());
        assert!(app.session().strokes().is_empty());
        assert_eq!(app.finish_export(), None);
    }
}
