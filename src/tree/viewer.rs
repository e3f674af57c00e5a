use eframe::egui::Pos2;
use log::debug;

use super::detail::NodeDetails;
use super::layout::{LayoutParams, TreeLayout};
use super::painter::TreePainter;
use super::scene_graph::{build_tree_scene, TreeSceneGraph};
use super::{NodeId, TreeData, TreeNode};

/// The two states of the inspection view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Selected(NodeId),
}

impl Selection {
    pub fn node_id(self) -> Option<NodeId> {
        match self {
            Selection::None => None,
            Selection::Selected(id) => Some(id),
        }
    }
}

/// Session state of the viewer: the loaded tree and the current selection.
/// Every render recomputes the layout and the scene from scratch.
#[derive(Debug, Clone)]
pub struct TreeViewer {
    data: TreeData,
    params: LayoutParams,
    painter: TreePainter,
    selection: Selection,
}

impl TreeViewer {
    pub fn new(data: TreeData) -> Self {
        Self::with_style(data, LayoutParams::default(), TreePainter::default())
    }

    pub fn with_style(data: TreeData, params: LayoutParams, painter: TreePainter) -> Self {
        Self {
            data,
            params,
            painter,
            selection: Selection::None,
        }
    }

    pub fn data(&self) -> &TreeData {
        &self.data
    }

    pub fn tree(&self) -> &TreeNode {
        &self.data.tree
    }

    pub fn painter(&self) -> &TreePainter {
        &self.painter
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn on_node_click(&mut self, node_id: NodeId) {
        if self.selection != Selection::Selected(node_id) {
            debug!("selection: {:?} -> node {}", self.selection, node_id);
        }
        self.selection = Selection::Selected(node_id);
    }

    pub fn on_background_click(&mut self) {
        if self.selection != Selection::None {
            debug!("selection: {:?} -> none", self.selection);
        }
        self.selection = Selection::None;
    }

    /// Route a click at canvas-local `point` to exactly one of the node or
    /// background handlers.
    pub fn handle_click(&mut self, point: Pos2) -> Selection {
        match self.render().hit_test(point) {
            Some(node_id) => self.on_node_click(node_id),
            None => self.on_background_click(),
        }
        self.selection
    }

    /// The selected node, or `None` when nothing is selected or the selected
    /// id is not part of the tree.
    pub fn selected_node(&self) -> Option<&TreeNode> {
        self.selection
            .node_id()
            .and_then(|id| self.data.tree.find(id))
    }

    pub fn layout(&self) -> TreeLayout {
        TreeLayout::build(&self.data.tree, &self.params)
    }

    pub fn render(&self) -> TreeSceneGraph {
        build_tree_scene(&self.layout(), &self.painter, self.selection.node_id())
    }

    pub fn details(&self) -> NodeDetails {
        NodeDetails::build(self.selected_node(), &self.data)
    }
}
