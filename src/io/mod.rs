use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;

use crate::tree::TreeData;

/// Read, parse and validate a tree data file.
pub fn load_tree_data(path: &Path) -> Result<TreeData> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read tree data file: {}", path.display()))?;

    let data = parse_tree_data(&raw)
        .with_context(|| format!("invalid tree data in {}", path.display()))?;

    info!(
        "Loaded tree with {} node(s), {} class(es) and {} training label(s) from {}",
        data.tree.node_count(),
        data.class_count(),
        data.train_labels.len(),
        path.display()
    );
    Ok(data)
}

/// Parse tree data of any nesting depth; the stack grows on demand.
pub fn parse_tree_data(raw: &str) -> Result<TreeData> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    deserializer.disable_recursion_limit();
    let data = TreeData::deserialize(serde_stacker::Deserializer::new(&mut deserializer))
        .context("failed to parse tree data JSON")?;
    deserializer
        .end()
        .context("trailing characters after tree data JSON")?;
    data.validate().context("tree failed validation")?;
    Ok(data)
}
