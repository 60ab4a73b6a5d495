//! Annotation panel and the central image.

use super::ViewerApp;
use crate::manifest::ManifestState;
use crate::message::Message;
use crate::session::Backend;
use crate::views::{
    AnnotationPanel, AnnotationView, AuxiliaryTag, NodeContent, StructuredNode, ViewMode,
};

/// Structured levels expanded on first display
const OPEN_DEPTH: usize = 2;

impl<B: Backend> ViewerApp<B> {
    /// The full-resolution active image, scaled to fit.
    pub(crate) fn show_image(&self, ui: &mut egui::Ui) {
        let dashboard = self.session.dashboard();
        let Some(record) = dashboard.active_image() else {
            ui.centered_and_justified(|ui| {
                ui.label(match dashboard.manifest_state() {
                    ManifestState::Loading => "Loading images...",
                    _ => "No images to show",
                });
            });
            return;
        };

        let uri = self.session.asset_uri(&record.image_path);
        ui.centered_and_justified(|ui| {
            ui.add(
                egui::Image::new(uri)
                    .max_size(ui.available_size())
                    .maintain_aspect_ratio(true)
                    .show_loading_spinner(true),
            );
        });
    }

    /// Selected annotation, or why there is none.
    pub(crate) fn show_annotation(&self, ui: &mut egui::Ui, out: &mut Vec<Message>) {
        match self.session.dashboard().panel() {
            AnnotationPanel::Empty(state) => {
                ui.add_space(16.0);
                ui.weak(state.message());
            }
            AnnotationPanel::Annotation(view) => show_view(ui, &view, out),
        }
    }
}

fn show_view(ui: &mut egui::Ui, view: &AnnotationView<'_>, out: &mut Vec<Message>) {
    ui.heading(view.title());

    ui.horizontal(|ui| {
        if view.has_structured() {
            for mode in [ViewMode::Text, ViewMode::Structured] {
                if ui
                    .selectable_label(view.mode() == mode, mode.label())
                    .clicked()
                    && view.mode() != mode
                {
                    out.push(Message::SetViewMode(mode));
                }
            }
            ui.separator();
        }
        if ui
            .button("Copy")
            .on_hover_text(format!("Copy the {} view", view.mode().label().to_lowercase()))
            .clicked()
        {
            out.push(Message::Copy);
        }
    });

    if let Some(prompt) = &view.prompt.prompt_text {
        egui::CollapsingHeader::new("Prompt")
            .id_salt("prompt_text")
            .show(ui, |ui| ui.label(prompt));
    }
    if let Some(error) = view.error() {
        ui.colored_label(ui.visuals().error_fg_color, format!("Error: {}", error));
    }
    let flags = view.quality_flags();
    if !flags.is_empty() {
        ui.horizontal_wrapped(|ui| {
            ui.label("Flags:");
            for flag in flags {
                ui.colored_label(ui.visuals().warn_fg_color, flag);
            }
        });
    }

    ui.separator();

    egui::ScrollArea::vertical()
        .id_salt("annotation_body")
        .max_height((ui.available_height() - metrics_height(view)).max(120.0))
        .auto_shrink([false, true])
        .show(ui, |ui| match (view.mode(), view.structured_tree()) {
            (ViewMode::Structured, Some(tree)) => {
                show_children(ui, &tree, egui::Id::new("structured"), 0);
            }
            _ => {
                ui.add(egui::Label::new(view.response_text()).selectable(true));
            }
        });

    ui.separator();

    let metrics = view.metrics();
    if !metrics.is_empty() {
        egui::Grid::new("metrics")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                for metric in &metrics {
                    ui.label(metric.label);
                    ui.monospace(&metric.value);
                    ui.end_row();
                }
            });
    }

    ui.horizontal(|ui| {
        ui.label("Auxiliary tag:");
        match view.auxiliary_tag() {
            AuxiliaryTag::Present(tag) => {
                ui.strong(tag);
            }
            AuxiliaryTag::Missing { link } => {
                ui.hyperlink_to("Add a tag", link);
            }
        }
    });
}

/// Room kept below the response for metrics and the tag row.
fn metrics_height(view: &AnnotationView<'_>) -> f32 {
    (view.metrics().len() as f32 + 2.0) * 22.0
}

/// Lay out a container's children; scalars inline, containers collapsible.
fn show_children(ui: &mut egui::Ui, node: &StructuredNode, id: egui::Id, depth: usize) {
    let children = match &node.content {
        NodeContent::Map(children) | NodeContent::List(children) => children,
        NodeContent::Scalar(_) => {
            show_scalar(ui, node);
            return;
        }
    };

    if children.is_empty() {
        ui.weak("(empty)");
        return;
    }

    for (index, child) in children.iter().enumerate() {
        if child.is_scalar() {
            show_scalar(ui, child);
            continue;
        }
        let title = match &child.label {
            Some(label) => label.clone(),
            None => format!("#{}", index + 1),
        };
        let child_id = id.with(index);
        egui::CollapsingHeader::new(title)
            .id_salt(child_id)
            .default_open(depth < OPEN_DEPTH)
            .show(ui, |ui| show_children(ui, child, child_id, depth + 1));
    }
}

fn show_scalar(ui: &mut egui::Ui, node: &StructuredNode) {
    let NodeContent::Scalar(text) = &node.content else {
        return;
    };
    ui.horizontal_wrapped(|ui| {
        match &node.label {
            Some(label) => ui.strong(format!("{}:", label)),
            None => ui.label("•"),
        };
        ui.label(text);
    });
}
