use std::path::{Path, PathBuf};

use eframe::egui::{self, Color32};
use log::{error, info};
use rfd::FileDialog;

use crate::app::AppConfig;
use crate::export;
use crate::io;
use crate::tree::detail::{NodeDetails, NodeSummary, PLACEHOLDER_TEXT};
use crate::tree::painter::TreePainter;
use crate::tree::scene_graph::{ScenePrimitive, TreeSceneGraph};
use crate::tree::viewer::TreeViewer;

pub struct GiniTreeGui {
    config: AppConfig,
    viewer: Option<TreeViewer>,
    status: String,
    last_error: Option<String>,
    load_warning_dialog: Option<String>,
    export_feedback: Option<String>,
}

impl GiniTreeGui {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let mut app = Self {
            config,
            viewer: None,
            status: String::from("Open a tree data file to begin."),
            last_error: None,
            load_warning_dialog: None,
            export_feedback: None,
        };

        if let Some(path) = app.config.data_path.clone() {
            if let Err(err) = app.load_from_path(path.clone()) {
                error!("Failed to load {}: {}", path.display(), err);
            }
        }

        if let (Some(viewer), Some(node_id)) = (app.viewer.as_mut(), app.config.select) {
            viewer.on_node_click(node_id);
        }

        app
    }

    fn load_from_path(&mut self, path: PathBuf) -> Result<(), String> {
        match io::load_tree_data(&path) {
            Ok(data) => {
                self.status = format!(
                    "Loaded tree with {} node(s) and {} training label(s).",
                    data.tree.node_count(),
                    data.train_labels.len()
                );
                info!("Loaded tree data file {}", path.display());
                self.last_error = None;
                self.load_warning_dialog = None;
                self.export_feedback = None;
                self.viewer = Some(TreeViewer::new(data));
                self.config.data_path = Some(path);
                Ok(())
            }
            Err(err) => {
                let message = format!("{err:#}");
                self.status = String::from("Failed to load tree data file.");
                self.last_error = Some(message.clone());
                self.load_warning_dialog = Some(format!(
                    "Failed to load tree data:\n{}\n\n{}",
                    path.display(),
                    message
                ));
                Err(message)
            }
        }
    }

    fn open_file_dialog(&mut self) {
        if let Some(path) = FileDialog::new()
            .add_filter("Tree data", &["json"])
            .pick_file()
        {
            if let Err(err) = self.load_from_path(path) {
                self.last_error = Some(err);
            }
        }
    }

    fn default_export_file_name(&self, extension: &str) -> String {
        let base = self
            .config
            .data_path
            .as_ref()
            .and_then(|p| p.file_stem().and_then(|s| s.to_str()))
            .filter(|s| !s.is_empty())
            .unwrap_or("tree");
        format!("{base}.{extension}")
    }

    fn export_svg_dialog(&mut self) {
        if let Some(path) = FileDialog::new()
            .add_filter("SVG Image", &["svg"])
            .set_file_name(self.default_export_file_name("svg"))
            .save_file()
        {
            self.export_svg_to(&path);
        }
    }

    fn export_svg_to(&mut self, path: &Path) {
        let Some(viewer) = &self.viewer else {
            return;
        };
        match export::svg::export_svg(&viewer.render(), path) {
            Ok(()) => {
                self.export_feedback = Some(format!("Exported SVG to {}", path.display()));
                self.status = format!("Successfully exported to {}", path.display());
            }
            Err(err) => {
                error!("SVG export failed: {err:#}");
                self.last_error = Some(format!("Failed to export: {err:#}"));
            }
        }
    }

    fn draw_tree_canvas(&mut self, ui: &mut egui::Ui) {
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };

        // Full re-layout and re-scene on every frame keeps the drawing in
        // step with the selection.
        let scene = viewer.render();
        let (response, painter) = ui.allocate_painter(scene.size, egui::Sense::click());
        let origin = response.rect.min.to_vec2();
        paint_scene(&painter, &scene, origin);

        if response.clicked() {
            if let Some(pointer_pos) = response.interact_pointer_pos() {
                viewer.handle_click(pointer_pos - origin);
                ui.ctx().request_repaint();
            }
        }
    }

    fn draw_detail_panel(&self, ui: &mut egui::Ui) {
        ui.heading("Node details");
        ui.separator();

        let Some(viewer) = &self.viewer else {
            ui.label("No tree loaded.");
            return;
        };

        let details = viewer.details();
        match &details {
            NodeDetails::Placeholder => {
                ui.label(PLACEHOLDER_TEXT);
            }
            NodeDetails::Node(summary) => draw_summary(ui, summary),
        }

        ui.add_space(12.0);
        ui.heading("Samples");
        ui.separator();
        draw_sample_grid(ui, &details, viewer.painter());

        ui.add_space(12.0);
        draw_class_legend(ui, viewer.data().class_count(), viewer.painter());
    }
}

fn draw_summary(ui: &mut egui::Ui, summary: &NodeSummary) {
    egui::Grid::new("node_summary")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.strong("Node ID:");
            ui.label(summary.id.to_string());
            ui.end_row();

            ui.strong("Gini:");
            ui.label(summary.gini_text());
            ui.end_row();

            ui.strong("Class counts:");
            ui.label(summary.class_counts_text());
            ui.end_row();

            ui.strong("Samples:");
            ui.label(summary.sample_count.to_string());
            ui.end_row();
        });

    ui.add_space(6.0);
    ui.strong("Gini Calculation:");
    ui.add(egui::Label::new(egui::RichText::new(&summary.gini_calc).monospace()).wrap());
}

fn draw_sample_grid(ui: &mut egui::Ui, details: &NodeDetails, painter: &TreePainter) {
    let glyphs = details.glyphs();
    if glyphs.is_empty() {
        return;
    }

    let size = egui::vec2(painter.glyph_size, painter.glyph_size);
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing = egui::vec2(2.0, 2.0);
        for glyph in glyphs {
            let (rect, response) = ui.allocate_exact_size(size, egui::Sense::hover());
            ui.painter()
                .rect_filled(rect, 2.0, painter.class_color(glyph.label));
            response.on_hover_text(glyph.tooltip());
        }
    });
}

fn draw_class_legend(ui: &mut egui::Ui, class_count: usize, painter: &TreePainter) {
    if class_count == 0 {
        return;
    }
    ui.horizontal_wrapped(|ui| {
        for label in 0..class_count as i64 {
            let (rect, _) =
                ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
            ui.painter().rect_filled(rect, 2.0, painter.class_color(label));
            ui.label(format!("class {label}"));
            ui.add_space(6.0);
        }
    });
}

/// Replay scene primitives onto an egui painter, offset by `origin`.
fn paint_scene(painter: &egui::Painter, scene: &TreeSceneGraph, origin: egui::Vec2) {
    for primitive in &scene.primitives {
        match primitive {
            ScenePrimitive::FillRect { rect, color } => {
                painter.rect_filled(rect.translate(origin), 0.0, *color);
            }
            ScenePrimitive::StrokeCubic {
                from,
                ctrl1,
                ctrl2,
                to,
                style,
            } => {
                let curve = egui::epaint::CubicBezierShape::from_points_stroke(
                    [*from + origin, *ctrl1 + origin, *ctrl2 + origin, *to + origin],
                    false,
                    Color32::TRANSPARENT,
                    egui::Stroke::new(style.width, style.color),
                );
                painter.add(curve);
            }
            ScenePrimitive::Circle {
                center,
                radius,
                fill,
                stroke,
                ..
            } => {
                painter.circle(
                    *center + origin,
                    *radius,
                    *fill,
                    egui::Stroke::new(stroke.width, stroke.color),
                );
            }
            ScenePrimitive::Text {
                text,
                anchor,
                size,
                color,
                ..
            } => {
                painter.text(
                    *anchor + origin,
                    egui::Align2::CENTER_CENTER,
                    text,
                    egui::FontId::proportional(*size),
                    *color,
                );
            }
        }
    }
}

impl eframe::App for GiniTreeGui {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open...").clicked() {
                        self.open_file_dialog();
                        ui.close();
                    }

                    let has_data = self.config.data_path.is_some();
                    if ui
                        .add_enabled(has_data, egui::Button::new("Reload"))
                        .clicked()
                    {
                        if let Some(path) = self.config.data_path.clone() {
                            if let Err(err) = self.load_from_path(path) {
                                self.last_error = Some(err);
                            }
                        }
                        ui.close();
                    }

                    if ui
                        .add_enabled(self.viewer.is_some(), egui::Button::new("Export SVG..."))
                        .clicked()
                    {
                        self.export_svg_dialog();
                        ui.close();
                    }

                    ui.separator();

                    if ui.button("Close").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Selection", |ui| {
                    let has_selection = self
                        .viewer
                        .as_ref()
                        .is_some_and(|viewer| viewer.selected_node().is_some());
                    if ui
                        .add_enabled(has_selection, egui::Button::new("Clear selection"))
                        .clicked()
                    {
                        if let Some(viewer) = self.viewer.as_mut() {
                            viewer.on_background_click();
                        }
                        ui.close();
                    }
                });
            });
        });

        egui::SidePanel::right("node_details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        self.draw_detail_panel(ui);
                    });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.viewer.is_some() {
                egui::ScrollArea::both()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        self.draw_tree_canvas(ui);
                    });
            } else {
                ui.label("Use File > Open... to load a tree data file.");
            }

            if let Some(message) = &self.export_feedback {
                ui.separator();
                ui.label(message);
            }

            if let Some(err) = &self.last_error {
                ui.separator();
                ui.colored_label(egui::Color32::from_rgb(200, 0, 0), format!("Error: {err}"));
            }
        });

        egui::TopBottomPanel::bottom("ginitree_status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status);
                if let Some(path) = &self.config.data_path {
                    ui.separator();
                    ui.label(format!("Current file: {}", path.display()));
                }
            });
        });

        if self.load_warning_dialog.is_some() {
            let mut open = true;
            let mut close_clicked = false;
            let message = self
                .load_warning_dialog
                .as_deref()
                .unwrap_or("Failed to load tree data file.");
            egui::Window::new("Warning")
                .collapsible(false)
                .resizable(false)
                .open(&mut open)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        close_clicked = true;
                    }
                });
            if !open || close_clicked {
                self.load_warning_dialog = None;
            }
        }
    }
}
