use std::collections::HashMap;

use super::{NodeId, TreeNode};

/// Geometry constants of the top-down layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Vertical position of the root row.
    pub base_offset: f32,
    /// Distance between two consecutive depth rows.
    pub row_height: f32,
    pub min_width: f32,
    pub per_leaf_width: f32,
    /// Horizontal padding on both sides of the root range.
    pub margin: f32,
    /// Canvas height of a tree whose deepest row is the root row.
    pub height_padding: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            base_offset: 60.0,
            row_height: 100.0,
            min_width: 700.0,
            per_leaf_width: 90.0,
            margin: 40.0,
            height_padding: 120.0,
        }
    }
}

impl LayoutParams {
    pub fn row_y(&self, depth: usize) -> f32 {
        self.base_offset + depth as f32 * self.row_height
    }

    pub fn canvas_width(&self, leaf_count: usize) -> f32 {
        self.min_width.max(leaf_count as f32 * self.per_leaf_width)
    }

    pub fn canvas_height(&self, max_depth: usize) -> f32 {
        self.height_padding + max_depth as f32 * self.row_height
    }
}

/// Half-open horizontal interval handed to a subtree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalRange {
    pub start: f32,
    pub end: f32,
}

impl HorizontalRange {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    pub fn width(&self) -> f32 {
        self.end - self.start
    }

    pub fn midpoint(&self) -> f32 {
        (self.start + self.end) / 2.0
    }

    /// Cut the range at `fraction` of its width. The two halves share the cut
    /// point, so they cover the original range exactly.
    pub fn split_at(&self, fraction: f32) -> (Self, Self) {
        let cut = self.start + self.width() * fraction;
        (Self::new(self.start, cut), Self::new(cut, self.end))
    }
}

/// Number of leaf descendants of `node` (1 for a leaf).
pub fn leaf_count(node: &TreeNode) -> usize {
    if node.is_leaf() {
        return 1;
    }
    node.children().map(leaf_count).sum()
}

/// Leaf counts of every subtree, computed once bottom-up.
#[derive(Debug, Clone, Default)]
pub struct LeafCounts {
    counts: HashMap<NodeId, usize>,
}

impl LeafCounts {
    pub fn compute(root: &TreeNode) -> Self {
        fn visit(node: &TreeNode, counts: &mut HashMap<NodeId, usize>) -> usize {
            let count = if node.is_leaf() {
                1
            } else {
                node.children().map(|child| visit(child, counts)).sum()
            };
            counts.insert(node.id, count);
            count
        }

        let mut counts = HashMap::new();
        visit(root, &mut counts);
        Self { counts }
    }

    pub fn get(&self, id: NodeId) -> usize {
        self.counts.get(&id).copied().unwrap_or(1)
    }

    /// Ranges for the two children of `node`, proportional to their leaf
    /// counts. `None` unless both children are present.
    pub fn split(
        &self,
        node: &TreeNode,
        range: HorizontalRange,
    ) -> Option<(HorizontalRange, HorizontalRange)> {
        let (left, right) = (node.left.as_deref()?, node.right.as_deref()?);
        let left_leaves = self.get(left.id) as f32;
        let right_leaves = self.get(right.id) as f32;
        Some(range.split_at(left_leaves / (left_leaves + right_leaves)))
    }
}

/// Display fields of a node plus its computed position.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedNode {
    pub id: NodeId,
    pub gini: f64,
    pub gini_calc: String,
    pub samples: usize,
    pub class_counts: Vec<u64>,
    pub x: f32,
    pub y: f32,
    pub depth: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub parent: NodeId,
    pub child: NodeId,
}

#[derive(Debug, Clone)]
pub struct TreeLayout {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<Edge>,
    pub width: f32,
    pub height: f32,
    pub max_depth: usize,
    pub leaf_count: usize,
    index: HashMap<NodeId, usize>,
}

struct LayoutState<'a> {
    params: &'a LayoutParams,
    leaf_counts: &'a LeafCounts,
    nodes: Vec<PositionedNode>,
    edges: Vec<Edge>,
    max_depth: usize,
}

impl TreeLayout {
    /// Lay out the tree top-down: rows by depth, columns by leaf order.
    pub fn build(root: &TreeNode, params: &LayoutParams) -> Self {
        let leaf_counts = LeafCounts::compute(root);
        let leaf_count = leaf_counts.get(root.id);
        let width = params.canvas_width(leaf_count);

        let mut state = LayoutState {
            params,
            leaf_counts: &leaf_counts,
            nodes: Vec::new(),
            edges: Vec::new(),
            max_depth: 0,
        };
        assign_positions(
            root,
            0,
            HorizontalRange::new(params.margin, width - params.margin),
            &mut state,
        );

        let index = state
            .nodes
            .iter()
            .enumerate()
            .map(|(slot, node)| (node.id, slot))
            .collect();

        Self {
            height: params.canvas_height(state.max_depth),
            width,
            max_depth: state.max_depth,
            leaf_count,
            nodes: state.nodes,
            edges: state.edges,
            index,
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&PositionedNode> {
        self.index.get(&id).map(|&slot| &self.nodes[slot])
    }
}

fn assign_positions(
    node: &TreeNode,
    depth: usize,
    range: HorizontalRange,
    state: &mut LayoutState<'_>,
) -> f32 {
    state.max_depth = state.max_depth.max(depth);

    let x = match (node.left.as_deref(), node.right.as_deref()) {
        (None, None) => range.midpoint(),
        (Some(left), Some(right)) => {
            let (left_range, right_range) = state
                .leaf_counts
                .split(node, range)
                .unwrap_or((range, range));
            let left_x = assign_positions(left, depth + 1, left_range, state);
            let right_x = assign_positions(right, depth + 1, right_range, state);
            (left_x + right_x) / 2.0
        }
        // A lone child inherits the whole range.
        (Some(only), None) | (None, Some(only)) => assign_positions(only, depth + 1, range, state),
    };

    state.nodes.push(PositionedNode {
        id: node.id,
        gini: node.gini,
        gini_calc: node.gini_calc.clone(),
        samples: node.sample_count(),
        class_counts: node.class_counts.clone(),
        x,
        y: state.params.row_y(depth),
        depth,
    });
    for child in node.children() {
        state.edges.push(Edge {
            parent: node.id,
            child: child.id,
        });
    }

    x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: NodeId, samples: usize) -> TreeNode {
        TreeNode::new(id, (0..samples).collect(), vec![samples as u64, 0])
    }

    fn two_leaf_tree() -> TreeNode {
        leaf(0, 40).with_children(Some(leaf(1, 30)), Some(leaf(2, 10)))
    }

    fn create_test_tree() -> TreeNode {
        //          0
        //        /   \
        //       1     2
        //      / \     \
        //     3   4     5
        //        / \
        //       6   7
        let four = leaf(4, 4).with_children(Some(leaf(6, 2)), Some(leaf(7, 2)));
        let one = leaf(1, 6).with_children(Some(leaf(3, 2)), Some(four));
        let two = leaf(2, 3).with_children(None, Some(leaf(5, 3)));
        leaf(0, 9).with_children(Some(one), Some(two))
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-3,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn leaf_count_matches_childless_nodes() {
        for tree in [create_test_tree(), two_leaf_tree(), leaf(9, 1)] {
            let childless = tree.iter().filter(|n| n.is_leaf()).count();
            assert_eq!(leaf_count(&tree), childless);
        }
    }

    #[test]
    fn precomputed_counts_agree_with_direct_count() {
        let tree = create_test_tree();
        let counts = LeafCounts::compute(&tree);
        for node in tree.iter() {
            assert_eq!(counts.get(node.id), leaf_count(node), "node {}", node.id);
        }
        assert_eq!(counts.get(0), 4);
        assert_eq!(counts.get(1), 3);
        assert_eq!(counts.get(2), 1);
    }

    #[test]
    fn sibling_ranges_tile_parent_range() {
        let tree = create_test_tree();
        let counts = LeafCounts::compute(&tree);
        let range = HorizontalRange::new(40.0, 660.0);

        for node in tree.iter() {
            if let Some((left, right)) = counts.split(node, range) {
                assert_close(left.start, range.start);
                assert_close(left.end, right.start);
                assert_close(right.end, range.end);
                assert_close(left.width() + right.width(), range.width());
            }
        }

        let (left, right) = counts.split(&tree, range).unwrap();
        assert_close(left.width(), range.width() * 0.75);
        assert_close(right.width(), range.width() * 0.25);
    }

    #[test]
    fn recursive_ranges_nest_and_tile() {
        fn walk(
            node: &TreeNode,
            range: HorizontalRange,
            counts: &LeafCounts,
            leaves: &mut Vec<(NodeId, HorizontalRange)>,
        ) {
            match counts.split(node, range) {
                Some((left, right)) => {
                    assert_close(left.start, range.start);
                    assert_close(left.end, right.start);
                    assert_close(right.end, range.end);
                    walk(node.left.as_deref().unwrap(), left, counts, leaves);
                    walk(node.right.as_deref().unwrap(), right, counts, leaves);
                }
                None if node.is_leaf() => leaves.push((node.id, range)),
                None => {
                    for child in node.children() {
                        walk(child, range, counts, leaves);
                    }
                }
            }
        }

        let tree = create_test_tree();
        let params = LayoutParams::default();
        let layout = TreeLayout::build(&tree, &params);
        let counts = LeafCounts::compute(&tree);
        let root_range = HorizontalRange::new(params.margin, layout.width - params.margin);

        let mut leaves = Vec::new();
        walk(&tree, root_range, &counts, &mut leaves);

        let order: Vec<NodeId> = leaves.iter().map(|(id, _)| *id).collect();
        assert_eq!(order, vec![3, 6, 7, 5]);

        // Leaf ranges cover the root range left to right without gaps.
        assert_close(leaves[0].1.start, root_range.start);
        assert_close(leaves[leaves.len() - 1].1.end, root_range.end);
        for pair in leaves.windows(2) {
            assert_close(pair[0].1.end, pair[1].1.start);
        }
        for (id, range) in &leaves {
            assert_close(range.width(), root_range.width() / 4.0);
            assert_close(layout.node(*id).unwrap().x, range.midpoint());
        }
    }

    #[test]
    fn two_leaf_split_uses_leaf_counts_not_samples() {
        let layout = TreeLayout::build(&two_leaf_tree(), &LayoutParams::default());

        assert_eq!(layout.leaf_count, 2);
        assert_close(layout.width, 700.0);
        assert_close(layout.height, 220.0);

        // Root range [40, 660] is split 1:1 even though the samples are 30:10.
        let a = layout.node(1).unwrap();
        let b = layout.node(2).unwrap();
        let root = layout.node(0).unwrap();
        assert_close(a.x, (40.0 + 350.0) / 2.0);
        assert_close(b.x, (350.0 + 660.0) / 2.0);
        assert_close(root.x, 350.0);
        assert_close(root.y, 60.0);
        assert_close(a.y, 160.0);
        assert_eq!(a.samples, 30);
    }

    #[test]
    fn single_leaf_is_centered() {
        let params = LayoutParams::default();
        let layout = TreeLayout::build(&leaf(0, 5), &params);

        assert_eq!(layout.nodes.len(), 1);
        assert!(layout.edges.is_empty());
        assert_eq!(layout.max_depth, 0);
        assert_close(layout.width, 700.0);
        assert_close(layout.height, 120.0);
        assert_close(layout.nodes[0].x, (40.0 + 660.0) / 2.0);
        assert_close(layout.nodes[0].y, params.base_offset);
    }

    #[test]
    fn wide_tree_grows_canvas() {
        // Right-leaning comb with `depth + 1` leaves.
        fn comb(depth: usize, next_id: &mut NodeId) -> TreeNode {
            let id = *next_id;
            *next_id += 1;
            if depth == 0 {
                return leaf(id, 1);
            }
            let left = leaf(*next_id, 1);
            *next_id += 1;
            leaf(id, 2).with_children(Some(left), Some(comb(depth - 1, next_id)))
        }

        let mut next_id = 1;
        let root = leaf(0, 1).with_children(Some(comb(8, &mut next_id)), Some(leaf(1000, 1)));

        let layout = TreeLayout::build(&root, &LayoutParams::default());
        assert_eq!(layout.leaf_count, 10);
        assert_close(layout.width, 900.0);
        assert_eq!(layout.max_depth, 9);
        assert_close(layout.height, 1020.0);
    }

    #[test]
    fn single_child_passes_through() {
        let layout = TreeLayout::build(&create_test_tree(), &LayoutParams::default());
        let two = layout.node(2).unwrap();
        let five = layout.node(5).unwrap();
        assert_close(two.x, five.x);
        assert!(five.y > two.y);
    }

    #[test]
    fn internal_node_is_average_of_children() {
        let layout = TreeLayout::build(&create_test_tree(), &LayoutParams::default());
        let x = |id| layout.node(id).unwrap().x;
        assert_close(x(4), (x(6) + x(7)) / 2.0);
        assert_close(x(1), (x(3) + x(4)) / 2.0);
        assert_close(x(0), (x(1) + x(2)) / 2.0);
    }

    #[test]
    fn rows_are_evenly_spaced() {
        let params = LayoutParams::default();
        let layout = TreeLayout::build(&create_test_tree(), &params);
        for node in &layout.nodes {
            assert_close(node.y, params.base_offset + node.depth as f32 * params.row_height);
        }
        assert_eq!(layout.max_depth, 3);
        assert_close(layout.height, 420.0);
    }

    #[test]
    fn nodes_on_same_row_never_share_x() {
        let layout = TreeLayout::build(&create_test_tree(), &LayoutParams::default());
        for depth in 0..=layout.max_depth {
            let mut xs: Vec<f32> = layout
                .nodes
                .iter()
                .filter(|n| n.depth == depth)
                .map(|n| n.x)
                .collect();
            xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
            for pair in xs.windows(2) {
                assert!(pair[1] - pair[0] > 1.0, "overlap on row {depth}: {xs:?}");
            }
        }
    }

    #[test]
    fn every_node_and_edge_is_emitted() {
        let tree = create_test_tree();
        let layout = TreeLayout::build(&tree, &LayoutParams::default());
        assert_eq!(layout.nodes.len(), tree.node_count());
        assert_eq!(layout.edges.len(), tree.node_count() - 1);
        assert!(layout.edges.contains(&Edge { parent: 2, child: 5 }));
        assert!(layout.edges.contains(&Edge { parent: 4, child: 7 }));
        // Post-order: the root is placed last.
        assert_eq!(layout.nodes.last().map(|n| n.id), Some(0));
    }

    #[test]
    fn layout_is_deterministic() {
        let tree = create_test_tree();
        let params = LayoutParams::default();
        let first = TreeLayout::build(&tree, &params);
        let second = TreeLayout::build(&tree, &params);
        assert_eq!(first.nodes, second.nodes);
        assert_eq!(first.edges, second.edges);
    }

    #[test]
    fn deep_skewed_tree_lays_out() {
        let mut node = leaf(0, 1);
        for depth in 1..300 {
            let id = depth * 2;
            node = leaf(id, 2).with_children(Some(node), Some(leaf(id + 1, 1)));
        }
        let layout = TreeLayout::build(&node, &LayoutParams::default());
        assert_eq!(layout.leaf_count, 300);
        assert_eq!(layout.max_depth, 299);
        assert_eq!(layout.nodes.len(), node.node_count());
    }
}
