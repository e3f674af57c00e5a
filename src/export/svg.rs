use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use svg::node::element::{Circle, Group, Path as SvgPath, Rectangle, Text};
use svg::Document;

use eframe::egui::Color32;

use crate::tree::scene_graph::{ScenePrimitive, TreeSceneGraph};

/// Serialize a scene into an SVG document of the same size.
pub fn scene_to_document(scene: &TreeSceneGraph) -> Document {
    let width = scene.size.x;
    let height = scene.size.y;

    let mut document = Document::new()
        .set("width", width)
        .set("height", height)
        .set("viewBox", (0.0, 0.0, width, height));

    let mut tree_group = Group::new().set("id", "tree");
    // Circles and their labels are emitted as one group per node.
    let mut pending_node: Option<Group> = None;

    for primitive in &scene.primitives {
        match primitive {
            ScenePrimitive::FillRect { rect, color } => {
                let background = Rectangle::new()
                    .set("x", rect.min.x)
                    .set("y", rect.min.y)
                    .set("width", rect.width())
                    .set("height", rect.height())
                    .set("fill", color_to_hex(*color));
                document = document.add(background);
            }
            ScenePrimitive::StrokeCubic {
                from,
                ctrl1,
                ctrl2,
                to,
                style,
            } => {
                let path_data = format!(
                    "M{},{} C{},{} {},{} {},{}",
                    from.x, from.y, ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y
                );
                let connector = SvgPath::new()
                    .set("d", path_data)
                    .set("fill", "none")
                    .set("stroke", color_to_hex(style.color))
                    .set("stroke-width", style.width);
                tree_group = tree_group.add(connector);
            }
            ScenePrimitive::Circle {
                node_id,
                center,
                radius,
                fill,
                stroke,
                selected,
            } => {
                if let Some(group) = pending_node.take() {
                    tree_group = tree_group.add(group);
                }
                let mut circle = Circle::new()
                    .set("cx", center.x)
                    .set("cy", center.y)
                    .set("r", *radius)
                    .set("fill", color_to_hex(*fill))
                    .set("stroke", color_to_hex(stroke.color))
                    .set("stroke-width", stroke.width);
                if *selected {
                    circle = circle.set("class", "selected-node");
                }
                pending_node = Some(
                    Group::new()
                        .set("data-node-id", node_id.to_string())
                        .set("cursor", "pointer")
                        .add(circle),
                );
            }
            ScenePrimitive::Text {
                text,
                anchor,
                baseline_offset,
                size,
                color,
            } => {
                let label = Text::new("")
                    .set("x", anchor.x)
                    .set("y", anchor.y + baseline_offset)
                    .set("text-anchor", "middle")
                    .set("font-size", format!("{size}px"))
                    .set("fill", color_to_hex(*color))
                    .add(svg::node::Text::new(text.clone()));
                match pending_node.take() {
                    Some(group) => pending_node = Some(group.add(label)),
                    None => tree_group = tree_group.add(label),
                }
            }
        }
    }

    if let Some(group) = pending_node.take() {
        tree_group = tree_group.add(group);
    }

    document.add(tree_group)
}

/// Export the scene to an SVG file.
pub fn export_svg(scene: &TreeSceneGraph, path: &Path) -> Result<()> {
    let document = scene_to_document(scene);
    svg::save(path, &document)
        .with_context(|| format!("failed to write SVG to {}", path.display()))?;
    info!(
        "Exported {}x{} SVG to {}",
        scene.size.x,
        scene.size.y,
        path.display()
    );
    Ok(())
}

fn color_to_hex(color: Color32) -> String {
    let [r, g, b, _a] = color.to_srgba_unmultiplied();
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::layout::{LayoutParams, TreeLayout};
    use crate::tree::painter::TreePainter;
    use crate::tree::scene_graph::build_tree_scene;
    use crate::tree::TreeNode;

    fn render(selected: Option<usize>) -> String {
        let tree = TreeNode::new(0, vec![0, 1], vec![1, 1]).with_children(
            Some(TreeNode::new(1, vec![0], vec![1, 0])),
            Some(TreeNode::new(2, vec![1], vec![0, 1])),
        );
        let layout = TreeLayout::build(&tree, &LayoutParams::default());
        let scene = build_tree_scene(&layout, &TreePainter::default(), selected);
        scene_to_document(&scene).to_string()
    }

    #[test]
    fn document_has_canvas_size() {
        let svg = render(None);
        assert!(svg.contains("width=\"700\""));
        assert!(svg.contains("height=\"220\""));
    }

    #[test]
    fn connectors_are_cubic_paths() {
        let svg = render(None);
        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains("d=\"M350,84 C350,110 195,110 195,136\""));
    }

    #[test]
    fn nodes_are_grouped_circles_with_labels() {
        let svg = render(None);
        assert_eq!(svg.matches("<circle").count(), 3);
        assert_eq!(svg.matches("data-node-id").count(), 3);
        assert!(svg.contains(">0.50<") || svg.contains(">\n0.50\n<"));
        assert!(svg.contains("text-anchor=\"middle\""));
        assert!(svg.contains("y=\"66\""));
        assert!(!svg.contains("selected-node"));
    }

    #[test]
    fn selected_node_is_classed() {
        let svg = render(Some(2));
        assert_eq!(svg.matches("selected-node").count(), 1);
    }

    #[test]
    fn hex_colors() {
        assert_eq!(color_to_hex(Color32::from_rgb(0xbb, 0xbb, 0xbb)), "#bbbbbb");
    }
}
