//! Top bar: stepping buttons, position slider and status.

use super::ViewerApp;
use crate::manifest::ManifestState;
use crate::message::Message;
use crate::session::Backend;

impl<B: Backend> ViewerApp<B> {
    /// Prev/next buttons, the draggable position slider and the counter.
    pub(crate) fn show_topbar(&self, ui: &mut egui::Ui, out: &mut Vec<Message>) {
        let dashboard = self.session.dashboard();
        let strip = dashboard.strip();

        ui.horizontal(|ui| {
            let (at_start, at_end) = match strip.active() {
                Some(active) => (active == 0, active + 1 >= strip.len()),
                None => (true, true),
            };

            if ui
                .add_enabled(!at_start, egui::Button::new("◀ Prev"))
                .clicked()
            {
                out.push(Message::PrevImage);
            }
            if ui.add_enabled(!at_end, egui::Button::new("Next ▶")).clicked() {
                out.push(Message::NextImage);
            }

            // Every step while dragging becomes a ScrubTo; each one supersedes
            // the bundle read of the one before
            let mut position = strip.position();
            let slider = egui::Slider::new(&mut position, 0.0..=1.0)
                .show_value(false)
                .trailing_fill(true);
            let response = ui.add_enabled(strip.len() > 1, slider);
            if response.changed() {
                out.push(Message::ScrubTo(position));
            }

            ui.separator();
            match (strip.active(), dashboard.active_image()) {
                (Some(index), Some(record)) => {
                    ui.label(format!("{} / {}", index + 1, strip.len()));
                    ui.monospace(&record.id);
                }
                _ => {
                    ui.label(match dashboard.manifest_state() {
                        ManifestState::Loading => "Loading images...",
                        _ => "No images",
                    });
                }
            }

            if dashboard.is_loading_bundle() {
                ui.spinner();
            }
            if let Some(status) = dashboard.status_message() {
                ui.separator();
                ui.colored_label(ui.visuals().warn_fg_color, status);
            }
        });
    }
}
