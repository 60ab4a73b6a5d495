//! Left panel: model and prompt selectors, platform badge, human reference.

use super::ViewerApp;
use crate::message::Message;
use crate::session::Backend;
use crate::views::{BadgeChip, humanize_key};

impl<B: Backend> ViewerApp<B> {
    /// Selectors for the sticky model/prompt choice and the platform chips.
    pub(crate) fn show_sidebar(&self, ui: &mut egui::Ui, out: &mut Vec<Message>) {
        let dashboard = self.session.dashboard();
        let selection = dashboard.selection();

        ui.heading("Model");
        let models = dashboard.model_names();
        ui.add_enabled_ui(!models.is_empty(), |ui| {
            egui::ComboBox::from_id_salt("model_select")
                .width(ui.available_width())
                .selected_text(selection.model.as_deref().unwrap_or("Select a model"))
                .show_ui(ui, |ui| {
                    for model in &models {
                        let selected = selection.model.as_deref() == Some(*model);
                        if ui.selectable_label(selected, *model).clicked() && !selected {
                            out.push(Message::SelectModel(model.to_string()));
                        }
                    }
                });
        });

        ui.add_space(8.0);
        ui.heading("Prompt");
        let prompts = dashboard.prompt_keys();
        let prompt_text = selection
            .prompt_key
            .as_deref()
            .map(humanize_key)
            .unwrap_or_else(|| "Select a prompt type".to_string());
        ui.add_enabled_ui(!prompts.is_empty(), |ui| {
            egui::ComboBox::from_id_salt("prompt_select")
                .width(ui.available_width())
                .selected_text(prompt_text)
                .show_ui(ui, |ui| {
                    for key in &prompts {
                        let selected = selection.prompt_key.as_deref() == Some(*key);
                        if ui.selectable_label(selected, humanize_key(key)).clicked() && !selected
                        {
                            out.push(Message::SelectPrompt(key.to_string()));
                        }
                    }
                });
        });

        if let Some(badge) = dashboard.badge() {
            ui.add_space(12.0);
            ui.separator();
            ui.horizontal_wrapped(|ui| {
                for chip in &badge.chips {
                    show_chip(ui, chip);
                }
            });
            ui.small(&badge.summary);
        }

        if let Some(reference) = dashboard.reference() {
            ui.add_space(12.0);
            ui.separator();
            ui.strong("Reference");
            if let Some(short) = &reference.short {
                ui.label(short);
            }
            if let Some(long) = &reference.long {
                egui::CollapsingHeader::new("Full description")
                    .id_salt("reference_long")
                    .show(ui, |ui| ui.label(long));
            }
            for line in reference.identifier_lines() {
                ui.small(line);
            }
        }
    }
}

fn show_chip(ui: &mut egui::Ui, chip: &BadgeChip) {
    let [r, g, b] = chip.color;
    let [tr, tg, tb] = chip.text_color();
    egui::Frame::none()
        .fill(egui::Color32::from_rgb(r, g, b))
        .rounding(4.0)
        .inner_margin(egui::Margin::symmetric(6.0, 2.0))
        .show(ui, |ui| {
            ui.colored_label(egui::Color32::from_rgb(tr, tg, tb), &chip.label);
        })
        .response
        .on_hover_text(&chip.title);
}
