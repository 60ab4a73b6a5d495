//! egui front-end, shared by the desktop and browser builds.
//!
//! Each module adds an `impl ViewerApp` block that draws one area of the
//! dashboard. Drawing only reads state; clicks, drags and key presses are
//! queued as [`Message`]s and dispatched once the frame is laid out.

mod annotation_panel;
mod sidebar;
mod strip;
mod topbar;

use std::time::Duration;

use crate::message::Message;
use crate::session::{Backend, Session};

/// Repaint interval while fetches are outstanding
const BUSY_REPAINT: Duration = Duration::from_millis(50);

/// Width of the selector panel
const SIDEBAR_WIDTH: f32 = 220.0;

/// Default width of the annotation panel
const ANNOTATION_WIDTH: f32 = 420.0;

/// The viewer window.
pub struct ViewerApp<B: Backend> {
    session: Session<B>,
    /// Strip offset last applied to the scroll area
    applied_scroll: Option<f32>,
    /// Strip width last reported to the dashboard
    reported_viewport: Option<f32>,
}

impl<B: Backend> ViewerApp<B> {
    /// Create the app and register the image loaders thumbnails need.
    pub fn new(cc: &eframe::CreationContext<'_>, session: Session<B>) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);
        Self::with_session(session)
    }

    /// Create the app without touching a rendering context.
    pub fn with_session(session: Session<B>) -> Self {
        Self {
            session,
            applied_scroll: None,
            reported_viewport: None,
        }
    }

    /// The session being shown.
    pub fn session(&self) -> &Session<B> {
        &self.session
    }

    /// Lay out one frame and apply what the user did in it.
    pub fn draw(&mut self, ctx: &egui::Context) {
        let applied = self.session.pump();
        if applied > 0 {
            log::trace!("Applied {} fetch results", applied);
        }

        let mut out = Vec::new();
        self.read_keys(ctx, &mut out);

        egui::TopBottomPanel::top("topbar").show(ctx, |ui| self.show_topbar(ui, &mut out));
        egui::TopBottomPanel::bottom("thumbnails")
            .resizable(false)
            .show(ctx, |ui| self.show_strip(ui, &mut out));
        egui::SidePanel::left("selectors")
            .default_width(SIDEBAR_WIDTH)
            .show(ctx, |ui| self.show_sidebar(ui, &mut out));
        egui::SidePanel::right("annotation")
            .default_width(ANNOTATION_WIDTH)
            .show(ctx, |ui| self.show_annotation(ui, &mut out));
        egui::CentralPanel::default().show(ctx, |ui| self.show_image(ui));

        for message in out {
            if let Some(text) = self.session.dispatch(message) {
                log::info!("Copied {} characters", text.chars().count());
                ctx.copy_text(text);
            }
        }

        if self.session.is_busy() {
            ctx.request_repaint_after(BUSY_REPAINT);
        }
    }

    /// Arrow keys step through images unless a widget holds focus.
    fn read_keys(&self, ctx: &egui::Context, out: &mut Vec<Message>) {
        if ctx.memory(|m| m.focused().is_some()) {
            return;
        }
        ctx.input(|i| {
            if i.key_pressed(egui::Key::ArrowLeft) {
                out.push(Message::PrevImage);
            }
            if i.key_pressed(egui::Key::ArrowRight) {
                out.push(Message::NextImage);
            }
        });
    }
}

impl<B: Backend> eframe::App for ViewerApp<B> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.draw(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::session::testing::ScriptedBackend;

    const MANIFEST: &str = r#"{"images": ["img_a", "img_b", "img_c"]}"#;

    fn app() -> ViewerApp<ScriptedBackend> {
        let mut backend = ScriptedBackend::default();
        backend.push(Message::ManifestFetched(Ok(MANIFEST.to_string())));
        ViewerApp::with_session(Session::new(ViewerConfig::default(), backend))
    }

    fn key(key: egui::Key) -> egui::RawInput {
        egui::RawInput {
            events: vec![egui::Event::Key {
                key,
                physical_key: None,
                pressed: true,
                repeat: false,
                modifiers: egui::Modifiers::default(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_first_frame_applies_manifest() {
        let ctx = egui::Context::default();
        let mut app = app();
        let _ = ctx.run(egui::RawInput::default(), |ctx| app.draw(ctx));

        let dashboard = app.session().dashboard();
        assert_eq!(dashboard.images().len(), 3);
        assert_eq!(dashboard.active_index(), Some(0));
        assert!(dashboard.is_loading_bundle());
    }

    #[test]
    fn test_arrow_keys_navigate() {
        let ctx = egui::Context::default();
        let mut app = app();
        let _ = ctx.run(egui::RawInput::default(), |ctx| app.draw(ctx));

        let _ = ctx.run(key(egui::Key::ArrowRight), |ctx| app.draw(ctx));
        assert_eq!(app.session().dashboard().active_index(), Some(1));

        let _ = ctx.run(key(egui::Key::ArrowLeft), |ctx| app.draw(ctx));
        assert_eq!(app.session().dashboard().active_index(), Some(0));
    }

    #[test]
    fn test_navigation_aborts_through_backend() {
        let ctx = egui::Context::default();
        let mut app = app();
        let _ = ctx.run(egui::RawInput::default(), |ctx| app.draw(ctx));
        let _ = ctx.run(key(egui::Key::ArrowRight), |ctx| app.draw(ctx));

        // The first image's read was still pending when the key landed
        let aborted = app.session().backend().aborted();
        assert_eq!(aborted.len(), 1);
        assert_eq!(aborted[0].image_id, "img_a");
    }
}
