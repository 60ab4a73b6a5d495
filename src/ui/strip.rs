//! Thumbnail strip along the bottom edge.

use super::ViewerApp;
use crate::message::Message;
use crate::session::Backend;

/// Gap between a thumbnail and its slot border
const THUMB_INSET: f32 = 3.0;

impl<B: Backend> ViewerApp<B> {
    /// Horizontally scrolling thumbnails; clicking one jumps to it.
    ///
    /// The dashboard owns the scroll offset. It is pushed into the scroll area
    /// only when it changes, so wheel scrolling in between is kept.
    pub(crate) fn show_strip(&mut self, ui: &mut egui::Ui, out: &mut Vec<Message>) {
        let dashboard = self.session.dashboard();
        let strip = dashboard.strip();
        let extent = strip.thumb_extent();

        let width = ui.available_width();
        if self.reported_viewport != Some(width) {
            self.reported_viewport = Some(width);
            out.push(Message::ViewportResized(width));
        }

        let offset = strip.scroll_offset();
        let mut area = egui::ScrollArea::horizontal()
            .id_salt("thumbnail_strip")
            .auto_shrink([false, true]);
        if self.applied_scroll != Some(offset) {
            area = area.horizontal_scroll_offset(offset);
            self.applied_scroll = Some(offset);
        }

        let active = strip.active();
        let session = &self.session;
        area.show(ui, |ui| {
            ui.horizontal(|ui| {
                // Slots must line up with the strip model's offsets
                ui.spacing_mut().item_spacing.x = 0.0;

                for (index, record) in dashboard.images().iter().enumerate() {
                    let (rect, response) =
                        ui.allocate_exact_size(egui::vec2(extent, extent), egui::Sense::click());

                    // Offscreen thumbnails are never requested
                    if ui.is_rect_visible(rect) {
                        egui::Image::new(session.asset_uri(&record.thumbnail_path))
                            .maintain_aspect_ratio(true)
                            .paint_at(ui, rect.shrink(THUMB_INSET));

                        if active == Some(index) {
                            let color = ui.visuals().selection.stroke.color;
                            ui.painter()
                                .rect_stroke(rect.shrink(1.0), 2.0, egui::Stroke::new(2.0, color));
                        } else if response.hovered() {
                            let color = ui.visuals().widgets.hovered.bg_stroke.color;
                            ui.painter()
                                .rect_stroke(rect.shrink(1.0), 2.0, egui::Stroke::new(1.0, color));
                        }
                    }

                    if response.on_hover_text(&record.id).clicked() {
                        out.push(Message::JumpTo(index));
                    }
                }
            });
        });
    }
}
