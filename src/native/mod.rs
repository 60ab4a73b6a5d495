//! Desktop front-end (native only).
//!
//! A [`Session`] over a [`FetchThread`] reads the data directory off the UI
//! thread. The window polls it every frame, so navigation never waits on a
//! read and superseded reads are aborted while still queued.

mod fetch_thread;

pub use fetch_thread::FetchThread;

use crate::config::ViewerConfig;
use crate::session::Session;
use crate::source::FsSource;
use crate::ui::ViewerApp;

/// A session reading from the local filesystem.
pub type NativeSession = Session<FetchThread>;

/// Window title
const TITLE: &str = "Annotation Viewer";

/// Initial window size
const WINDOW_SIZE: [f32; 2] = [1400.0, 900.0];

/// Start a session; the manifest read is queued but not awaited.
pub fn start_session(config: ViewerConfig, source: FsSource) -> Result<NativeSession, String> {
    let fetcher = FetchThread::spawn(source)?;
    Ok(Session::new(config, fetcher))
}

/// Open the viewer window and block until it is closed.
pub fn run_viewer(config: ViewerConfig, source: FsSource) -> Result<(), String> {
    let session = start_session(config, source)?;
    log::info!("Opening viewer window");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(TITLE)
            .with_inner_size(WINDOW_SIZE),
        ..Default::default()
    };

    eframe::run_native(
        TITLE,
        options,
        Box::new(move |cc| Ok(Box::new(ViewerApp::new(cc, session)))),
    )
    .map_err(|e| format!("Viewer window failed: {}", e))
}
