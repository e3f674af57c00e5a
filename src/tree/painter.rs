use eframe::egui::{self, Color32, Stroke};

use super::NodeId;

/// Clickable disc covering one node marker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeHit {
    pub node_id: NodeId,
    pub center: egui::Pos2,
    pub radius: f32,
}

impl NodeHit {
    /// Whether `point` falls inside the marker, grown by `expand` points.
    pub fn contains(&self, point: egui::Pos2, expand: f32) -> bool {
        (point - self.center).length() <= self.radius + expand.max(0.0)
    }
}

/// Colors and sizes used to draw the tree and the sample grid.
#[derive(Clone, Debug)]
pub struct TreePainter {
    pub node_radius: f32,
    pub node_fill: Color32,
    pub node_stroke: Stroke,
    pub selected_fill: Color32,
    pub selected_stroke: Stroke,
    pub edge_stroke: Stroke,
    pub label_color: Color32,
    pub label_font_size: f32,
    /// Downward shift of the label baseline so the digits sit in the middle
    /// of the circle.
    pub label_baseline_offset: f32,
    pub background_color: Color32,
    pub glyph_size: f32,
    pub class_palette: Vec<Color32>,
}

impl Default for TreePainter {
    fn default() -> Self {
        Self {
            node_radius: 24.0,
            node_fill: Color32::WHITE,
            node_stroke: Stroke::new(2.0, Color32::from_rgb(0x88, 0x88, 0x88)),
            selected_fill: Color32::from_rgb(255, 236, 179),
            selected_stroke: Stroke::new(4.0, Color32::from_rgb(255, 152, 0)),
            edge_stroke: Stroke::new(2.0, Color32::from_rgb(0xbb, 0xbb, 0xbb)),
            label_color: Color32::from_rgb(0x33, 0x33, 0x33),
            label_font_size: 13.0,
            label_baseline_offset: 6.0,
            background_color: Color32::WHITE,
            glyph_size: 12.0,
            class_palette: vec![
                Color32::from_rgb(66, 133, 244),
                Color32::from_rgb(52, 168, 83),
                Color32::from_rgb(234, 67, 53),
                Color32::from_rgb(251, 188, 5),
                Color32::from_rgb(171, 71, 188),
                Color32::from_rgb(0, 172, 193),
            ],
        }
    }
}

impl TreePainter {
    pub fn fill_for(&self, selected: bool) -> Color32 {
        if selected {
            self.selected_fill
        } else {
            self.node_fill
        }
    }

    pub fn stroke_for(&self, selected: bool) -> Stroke {
        if selected {
            self.selected_stroke
        } else {
            self.node_stroke
        }
    }

    /// Glyph color for a class label; labels wrap around the palette and
    /// negative labels fall back to gray.
    pub fn class_color(&self, label: i64) -> Color32 {
        if label < 0 || self.class_palette.is_empty() {
            return Color32::GRAY;
        }
        self.class_palette[label as usize % self.class_palette.len()]
    }
}
