use std::path::Path;

use anyhow::Result;
use log::warn;

use crate::export;
use crate::tree::layout;
use crate::tree::viewer::{Selection, TreeViewer};

pub fn render_preview(viewer: &TreeViewer) {
    let data = viewer.data();
    let tree_layout = viewer.layout();

    println!(
        "Loaded tree with {} node(s), {} leaf/leaves, depth {} and {} class(es).",
        data.tree.node_count(),
        tree_layout.leaf_count,
        tree_layout.max_depth,
        data.class_count()
    );
    println!(
        "Canvas {}x{} px; {} training label(s).",
        tree_layout.width,
        tree_layout.height,
        data.train_labels.len()
    );

    if let Some(first) = data.test_samples.first() {
        println!(
            "{} test sample(s) with {} feature(s) each; labels: {}.",
            data.test_samples.len(),
            first.features.len(),
            join_labels(data.test_samples.iter().map(|sample| sample.label))
        );
    }

    if let Selection::Selected(node_id) = viewer.selection() {
        if viewer.selected_node().is_none() {
            warn!("Node {} is not part of the tree; showing no selection.", node_id);
        }
    }

    let details = viewer.details();
    println!();
    println!("{details}");

    if let Some(node) = viewer.selected_node() {
        println!("Leaves below: {}", layout::leaf_count(node));
    }

    let glyphs = details.glyphs();
    if !glyphs.is_empty() {
        println!(
            "Sample labels: {}",
            join_labels(glyphs.iter().map(|glyph| glyph.label))
        );
    }
}

fn join_labels(labels: impl Iterator<Item = i64>) -> String {
    labels
        .map(|label| label.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn export(viewer: &TreeViewer, output: &Path) -> Result<()> {
    let scene = viewer.render();
    export::svg::export_svg(&scene, output)?;
    println!("Exported tree to {}", output.display());
    Ok(())
}
