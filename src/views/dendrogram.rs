//! Genre → music effect dendrogram
//!
//! ```text
//! Genres ─┬─ Rock ─┬─ Improve (12)
//!         │        ├─ No effect (4)
//!         │        └─ Worsen (1)
//!         └─ Jazz ─┬─ ...
//! ```
//!
//! Every genre gets all three effect leaves, zero counts included. Siblings
//! are ordered by descending subtotal. Leaves are spaced one row apart within
//! a genre and two rows apart across genres, parents sit midway between their
//! first and last child, and the whole column is scaled to
//! `leaf_count * row_height`.

use super::opacity_for;
use crate::config::ViewConfig;
use crate::palette::Palette;
use crate::record::{Genre, MusicEffect, RecordStore};
use crate::selection::SelectionState;
use serde::Serialize;

const ROOT_LABEL: &str = "Genres";
const ROOT_FILL: &str = "#999";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Root,
    Genre,
    Leaf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub id: usize,
    pub kind: NodeKind,
    pub depth: u8,
    pub label: String,
    /// The node's own genre, or its parent's for leaves. None for the root.
    pub genre: Option<Genre>,
    pub effect: Option<MusicEffect>,
    pub value: usize,
    pub parent: Option<usize>,
    /// Vertical position
    pub x: f64,
    /// Horizontal position
    pub y: f64,
    pub fill: String,
}

impl TreeNode {
    /// Hover text. Only leaves have one.
    pub fn tooltip(&self) -> Option<String> {
        match (self.kind, &self.genre, self.effect) {
            (NodeKind::Leaf, Some(genre), Some(effect)) => {
                Some(format!("{} → {}\nCount: {}", genre, effect, self.value))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TreeLink {
    pub source: usize,
    pub target: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDecoration {
    pub id: usize,
    pub opacity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dendrogram {
    nodes: Vec<TreeNode>,
    links: Vec<TreeLink>,
    height: f64,
}

fn leaf_fill(effect: MusicEffect) -> &'static str {
    match effect {
        MusicEffect::Improve => "#2ca02c",
        MusicEffect::Worsen => "red",
        MusicEffect::NoEffect => "#ccc",
    }
}

impl Dendrogram {
    pub fn build(store: &RecordStore, palette: &Palette, config: &ViewConfig) -> Self {
        let mut groups: Vec<(Genre, Vec<(MusicEffect, usize)>, usize)> = store
            .genre_effect_counts()
            .into_iter()
            .map(|(genre, counts)| {
                let mut leaves: Vec<_> = MusicEffect::ALL.iter().map(|&e| (e, counts.get(e))).collect();
                leaves.sort_by(|a, b| b.1.cmp(&a.1));
                (genre, leaves, counts.total())
            })
            .collect();
        groups.sort_by(|a, b| b.2.cmp(&a.2));

        // Unscaled vertical positions: +1 between siblings, +2 between cousins
        let mut leaf_pos = Vec::new();
        let mut genre_pos = Vec::new();
        let mut cursor = 0.0;
        for (i, (_, leaves, _)) in groups.iter().enumerate() {
            if i > 0 {
                cursor += 2.0;
            }
            let first = cursor;
            for j in 0..leaves.len() {
                if j > 0 {
                    cursor += 1.0;
                }
                leaf_pos.push(cursor);
            }
            genre_pos.push((first + cursor) / 2.0);
        }
        let root_pos = match (genre_pos.first(), genre_pos.last()) {
            (Some(first), Some(last)) => (first + last) / 2.0,
            _ => 0.0,
        };

        let leaf_count = leaf_pos.len();
        let height = leaf_count as f64 * config.row_height;
        let width = config.inner_width();

        // Half the separation between the outermost leaves pads each end
        let pad = if groups.len() > 1 { 1.0 } else { 0.5 };
        let span = leaf_pos.last().copied().unwrap_or(0.0) + 2.0 * pad;
        let kx = if span > 0.0 { height / span } else { 0.0 };
        let scale = |pos: f64| (pos + pad) * kx;
        let depth_x = |depth: u8| f64::from(depth) * width / 2.0;

        let mut nodes = vec![TreeNode {
            id: 0,
            kind: NodeKind::Root,
            depth: 0,
            label: ROOT_LABEL.to_string(),
            genre: None,
            effect: None,
            value: store.len(),
            parent: None,
            x: scale(root_pos),
            y: depth_x(0),
            fill: ROOT_FILL.to_string(),
        }];
        let mut links = Vec::new();
        let mut leaf_iter = leaf_pos.into_iter();

        for ((genre, leaves, total), pos) in groups.into_iter().zip(genre_pos) {
            let genre_id = nodes.len();
            nodes.push(TreeNode {
                id: genre_id,
                kind: NodeKind::Genre,
                depth: 1,
                label: genre.to_string(),
                genre: Some(genre.clone()),
                effect: None,
                value: total,
                parent: Some(0),
                x: scale(pos),
                y: depth_x(1),
                fill: palette.color(&genre).to_string(),
            });
            links.push(TreeLink { source: 0, target: genre_id });

            for ((effect, count), pos) in leaves.into_iter().zip(&mut leaf_iter) {
                let leaf_id = nodes.len();
                nodes.push(TreeNode {
                    id: leaf_id,
                    kind: NodeKind::Leaf,
                    depth: 2,
                    label: format!("{} ({})", effect, count),
                    genre: Some(genre.clone()),
                    effect: Some(effect),
                    value: count,
                    parent: Some(genre_id),
                    x: scale(pos),
                    y: depth_x(2),
                    fill: leaf_fill(effect).to_string(),
                });
                links.push(TreeLink { source: genre_id, target: leaf_id });
            }
        }

        Self { nodes, links, height }
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[TreeLink] {
        &self.links
    }

    /// Height of the laid-out tree, margins excluded
    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.kind == NodeKind::Leaf).count()
    }

    /// Opacity for every genre and leaf node. Root and links are never faded.
    pub fn decorate(&self, state: &SelectionState, config: &ViewConfig) -> Vec<NodeDecoration> {
        self.nodes
            .iter()
            .filter_map(|n| {
                let genre = n.genre.as_ref()?;
                Some(NodeDecoration { id: n.id, opacity: opacity_for(state, genre, config) })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::sample_store;
    use crate::selection::{BrushRange, FilterEngine};

    fn build() -> (RecordStore, Dendrogram) {
        let store = sample_store();
        let palette = Palette::new(store.genres());
        let tree = Dendrogram::build(&store, &palette, &ViewConfig::default());
        (store, tree)
    }

    fn node<'a>(tree: &'a Dendrogram, label: &str) -> &'a TreeNode {
        tree.nodes().iter().find(|n| n.label == label).unwrap()
    }

    // ==========================================================================
    // STRUCTURE TESTS
    // ==========================================================================

    #[test]
    fn test_three_levels() {
        let (store, tree) = build();
        let genres = store.genres().len();
        assert_eq!(tree.nodes().len(), 1 + genres + genres * 3);
        assert_eq!(tree.links().len(), tree.nodes().len() - 1);
        assert_eq!(tree.leaf_count(), genres * 3);
    }

    #[test]
    fn test_zero_count_leaves_present() {
        let (_, tree) = build();
        let jazz = node(&tree, "Jazz");
        let labels: Vec<&str> = tree
            .nodes()
            .iter()
            .filter(|n| n.parent == Some(jazz.id))
            .map(|n| n.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Improve (2)", "No effect (0)", "Worsen (0)"]);
    }

    #[test]
    fn test_leaves_carry_parent_genre() {
        let (_, tree) = build();
        for leaf in tree.nodes().iter().filter(|n| n.kind == NodeKind::Leaf) {
            let parent = &tree.nodes()[leaf.parent.unwrap()];
            assert_eq!(leaf.genre, parent.genre);
        }
    }

    #[test]
    fn test_genres_ordered_by_total() {
        let (_, tree) = build();
        let genres: Vec<&str> = tree
            .nodes()
            .iter()
            .filter(|n| n.kind == NodeKind::Genre)
            .map(|n| n.label.as_str())
            .collect();
        assert_eq!(genres, vec!["Jazz", "Rock", "Pop"]);
    }

    #[test]
    fn test_leaf_tooltip() {
        let (_, tree) = build();
        let leaf = node(&tree, "Worsen (1)");
        assert_eq!(leaf.tooltip().as_deref(), Some("Rock → Worsen\nCount: 1"));
        assert_eq!(node(&tree, "Rock").tooltip(), None);
    }

    // ==========================================================================
    // LAYOUT TESTS
    // ==========================================================================

    #[test]
    fn test_layout_fits_row_height() {
        let (_, tree) = build();
        assert_eq!(tree.height(), 9.0 * 30.0);
        for n in tree.nodes() {
            assert!(n.x > 0.0 && n.x < tree.height(), "{} at {}", n.label, n.x);
        }
    }

    #[test]
    fn test_parent_centered_on_children() {
        let (_, tree) = build();
        for parent in tree.nodes().iter().filter(|n| n.kind != NodeKind::Leaf) {
            let xs: Vec<f64> = tree
                .nodes()
                .iter()
                .filter(|n| n.parent == Some(parent.id))
                .map(|n| n.x)
                .collect();
            let mid = (xs[0] + xs[xs.len() - 1]) / 2.0;
            assert!((parent.x - mid).abs() < 1e-9);
        }
    }

    #[test]
    fn test_depth_columns() {
        let (_, tree) = build();
        let width = ViewConfig::default().inner_width();
        assert_eq!(node(&tree, "Genres").y, 0.0);
        assert_eq!(node(&tree, "Rock").y, width / 2.0);
        assert_eq!(node(&tree, "Improve (2)").y, width);
    }

    // ==========================================================================
    // DECORATION TESTS
    // ==========================================================================

    #[test]
    fn test_root_never_decorated() {
        let (store, tree) = build();
        let state = SelectionState::new(&store);
        let decorations = tree.decorate(&state, &ViewConfig::default());
        assert_eq!(decorations.len(), tree.nodes().len() - 1);
        assert!(decorations.iter().all(|d| d.id != 0));
        assert!(decorations.iter().all(|d| d.opacity == 1.0));
    }

    #[test]
    fn test_brush_fades_genre_and_its_leaves() {
        let (store, tree) = build();
        let engine = FilterEngine::new(&store);
        let mut state = SelectionState::new(&store);
        engine.brush(&mut state, Some(BrushRange::new(0.0, 2.0).unwrap()));

        for d in tree.decorate(&state, &ViewConfig::default()) {
            let n = &tree.nodes()[d.id];
            let expected = if n.genre.as_ref().map(Genre::as_str) == Some("Jazz") { 0.2 } else { 1.0 };
            assert_eq!(d.opacity, expected, "{}", n.label);
        }
    }
}
