use std::fmt;

use super::{LabelSource, NodeId, TreeNode};

pub const PLACEHOLDER_TEXT: &str = "Click a node to see details.";

/// One cell of the sample grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleGlyph {
    pub sample: usize,
    pub label: i64,
}

impl SampleGlyph {
    pub fn tooltip(&self) -> String {
        format!("Sample {} (class {})", self.sample, self.label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeSummary {
    pub id: NodeId,
    pub gini: f64,
    pub gini_calc: String,
    pub class_counts: Vec<u64>,
    pub sample_count: usize,
    pub glyphs: Vec<SampleGlyph>,
}

impl NodeSummary {
    pub fn gini_text(&self) -> String {
        format!("{:.3}", self.gini)
    }

    pub fn class_counts_text(&self) -> String {
        let counts = self
            .class_counts
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!("[{counts}]")
    }
}

/// Content of the detail panel and the sample grid.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeDetails {
    Placeholder,
    Node(NodeSummary),
}

impl NodeDetails {
    pub fn build<L>(node: Option<&TreeNode>, labels: &L) -> Self
    where
        L: LabelSource + ?Sized,
    {
        let Some(node) = node else {
            return NodeDetails::Placeholder;
        };

        let glyphs = node
            .samples
            .iter()
            .map(|&sample| SampleGlyph {
                sample,
                label: labels.label_for(sample),
            })
            .collect();

        NodeDetails::Node(NodeSummary {
            id: node.id,
            gini: node.gini,
            gini_calc: node.gini_calc.clone(),
            class_counts: node.class_counts.clone(),
            sample_count: node.sample_count(),
            glyphs,
        })
    }

    pub fn glyphs(&self) -> &[SampleGlyph] {
        match self {
            NodeDetails::Placeholder => &[],
            NodeDetails::Node(summary) => &summary.glyphs,
        }
    }
}

impl fmt::Display for NodeDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeDetails::Placeholder => write!(f, "{PLACEHOLDER_TEXT}"),
            NodeDetails::Node(summary) => {
                writeln!(f, "Node ID: {}", summary.id)?;
                writeln!(f, "Gini: {}", summary.gini_text())?;
                writeln!(f, "Gini Calculation:")?;
                writeln!(f, "    {}", summary.gini_calc)?;
                writeln!(f, "Class counts: {}", summary.class_counts_text())?;
                write!(f, "Samples: {}", summary.sample_count)
            }
        }
    }
}
