use eframe::egui::{self, Color32, Pos2, Rect, Vec2};

use crate::tree::layout::TreeLayout;
use crate::tree::painter::{NodeHit, TreePainter};
use crate::tree::NodeId;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub color: Color32,
}

impl From<egui::Stroke> for StrokeStyle {
    fn from(stroke: egui::Stroke) -> Self {
        Self {
            width: stroke.width,
            color: stroke.color,
        }
    }
}

/// Backend-neutral drawing command, in canvas-local coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum ScenePrimitive {
    FillRect {
        rect: Rect,
        color: Color32,
    },
    StrokeCubic {
        from: Pos2,
        ctrl1: Pos2,
        ctrl2: Pos2,
        to: Pos2,
        style: StrokeStyle,
    },
    Circle {
        node_id: NodeId,
        center: Pos2,
        radius: f32,
        fill: Color32,
        stroke: StrokeStyle,
        selected: bool,
    },
    Text {
        text: String,
        /// Visual center of the text.
        anchor: Pos2,
        /// Baseline shift for backends that place text by its baseline.
        baseline_offset: f32,
        size: f32,
        color: Color32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct TreeSceneGraph {
    pub size: Vec2,
    pub primitives: Vec<ScenePrimitive>,
    pub node_hits: Vec<NodeHit>,
}

impl TreeSceneGraph {
    /// Node whose marker contains `point`; the closest center wins when
    /// markers overlap.
    pub fn hit_test(&self, point: Pos2) -> Option<NodeId> {
        self.node_hits
            .iter()
            .filter(|hit| hit.contains(point, 0.0))
            .min_by(|a, b| {
                let da = (point - a.center).length_sq();
                let db = (point - b.center).length_sq();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|hit| hit.node_id)
    }
}

/// S-shaped connector between the bottom of the parent marker and the top of
/// the child marker. Both control points sit on the vertical midpoint.
pub fn connector_points(parent: Pos2, child: Pos2, radius: f32) -> [Pos2; 4] {
    let mid_y = (parent.y + child.y) / 2.0;
    [
        Pos2::new(parent.x, parent.y + radius),
        Pos2::new(parent.x, mid_y),
        Pos2::new(child.x, mid_y),
        Pos2::new(child.x, child.y - radius),
    ]
}

pub fn format_gini_label(gini: f64) -> String {
    format!("{gini:.2}")
}

pub fn build_tree_scene(
    layout: &TreeLayout,
    painter: &TreePainter,
    selected: Option<NodeId>,
) -> TreeSceneGraph {
    let size = Vec2::new(layout.width, layout.height);
    let mut primitives = Vec::with_capacity(1 + layout.edges.len() + layout.nodes.len() * 2);
    let mut node_hits = Vec::with_capacity(layout.nodes.len());

    primitives.push(ScenePrimitive::FillRect {
        rect: Rect::from_min_size(Pos2::ZERO, size),
        color: painter.background_color,
    });

    // Connectors go first so the markers cover their ends.
    for edge in &layout.edges {
        let (Some(parent), Some(child)) = (layout.node(edge.parent), layout.node(edge.child))
        else {
            continue;
        };
        let [from, ctrl1, ctrl2, to] = connector_points(
            Pos2::new(parent.x, parent.y),
            Pos2::new(child.x, child.y),
            painter.node_radius,
        );
        primitives.push(ScenePrimitive::StrokeCubic {
            from,
            ctrl1,
            ctrl2,
            to,
            style: painter.edge_stroke.into(),
        });
    }

    for node in &layout.nodes {
        let center = Pos2::new(node.x, node.y);
        let is_selected = selected == Some(node.id);
        primitives.push(ScenePrimitive::Circle {
            node_id: node.id,
            center,
            radius: painter.node_radius,
            fill: painter.fill_for(is_selected),
            stroke: painter.stroke_for(is_selected).into(),
            selected: is_selected,
        });
        primitives.push(ScenePrimitive::Text {
            text: format_gini_label(node.gini),
            anchor: center,
            baseline_offset: painter.label_baseline_offset,
            size: painter.label_font_size,
            color: painter.label_color,
        });
        node_hits.push(NodeHit {
            node_id: node.id,
            center,
            radius: painter.node_radius,
        });
    }

    TreeSceneGraph {
        size,
        primitives,
        node_hits,
    }
}
