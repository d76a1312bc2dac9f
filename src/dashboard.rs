//! Linked-view session
//!
//! A [`Dashboard`] owns one loaded dataset, its palette, the three views,
//! and the selection state. Interactions go through [`Dashboard::dispatch`],
//! which runs the filter engine to completion and returns the full set of
//! decorations for the pie and the dendrogram. Renderers apply the returned
//! [`Redraw`] as-is; they never evaluate the visibility rule themselves.

use crate::config::ViewConfig;
use crate::error::Result;
use crate::palette::Palette;
use crate::record::{Genre, RecordStore};
use crate::selection::{BrushRange, FilterEngine, SelectionState};
use crate::views::{Dendrogram, Histogram, NodeDecoration, PieChart, WedgeDecoration};
use log::debug;
use serde::Serialize;
use std::path::Path;

/// The interaction events a dashboard accepts
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// Brush ended on the histogram. `None` when the brush was cleared.
    Brush(Option<BrushRange>),
    /// A pie wedge was clicked
    SliceClicked(Genre),
    /// Clear both the brush and the pin
    Reset,
}

/// Decorations for every view that reacts to selection changes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Redraw {
    pub pie: Vec<WedgeDecoration>,
    pub dendrogram: Vec<NodeDecoration>,
    pub transition_ms: u64,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    store: RecordStore,
    config: ViewConfig,
    palette: Palette,
    selection: SelectionState,
    histogram: Histogram,
    pie: PieChart,
    dendrogram: Dendrogram,
}

/// Everything a renderer needs to draw a dashboard from scratch
#[derive(Serialize)]
pub struct Snapshot<'a> {
    pub config: &'a ViewConfig,
    pub records: usize,
    pub dropped: usize,
    pub palette: &'a Palette,
    pub selection: &'a SelectionState,
    pub histogram: &'a Histogram,
    pub pie: &'a PieChart,
    pub dendrogram: &'a Dendrogram,
    /// (hours, genre) for every record, for client-side brushing
    pub samples: Vec<(f64, &'a str)>,
    pub redraw: Redraw,
}

impl Dashboard {
    /// Build every view once from the full store
    pub fn new(store: RecordStore, config: ViewConfig) -> Self {
        let palette = Palette::new(store.genres());
        let selection = SelectionState::new(&store);
        let histogram = Histogram::build(&store, &config);
        let pie = PieChart::build(&store, &palette, &config);
        let dendrogram = Dendrogram::build(&store, &palette, &config);

        debug!(
            "Dashboard ready: {} records, {} genres, {} bins",
            store.len(),
            store.genres().len(),
            histogram.bins().len()
        );

        Self { store, config, palette, selection, histogram, pie, dendrogram }
    }

    /// Load a CSV file and build a dashboard from it
    pub fn load<P: AsRef<Path>>(path: P, config: ViewConfig) -> Result<Self> {
        Ok(Self::new(RecordStore::load(path)?, config))
    }

    /// Rebuild the views under a new config. The selection is kept.
    pub fn reconfigure(&mut self, config: ViewConfig) {
        self.histogram = Histogram::build(&self.store, &config);
        self.pie = PieChart::build(&self.store, &self.palette, &config);
        self.dendrogram = Dendrogram::build(&self.store, &self.palette, &config);
        self.config = config;
        debug!("Reconfigured: {} bins", self.histogram.bins().len());
    }

    pub fn dispatch(&mut self, interaction: Interaction) -> Redraw {
        let engine = FilterEngine::new(&self.store);
        match &interaction {
            Interaction::Brush(range) => engine.brush(&mut self.selection, *range),
            Interaction::SliceClicked(genre) => engine.click(&mut self.selection, genre),
            Interaction::Reset => engine.reset(&mut self.selection),
        }
        self.redraw()
    }

    /// Decorations for the current selection
    pub fn redraw(&self) -> Redraw {
        Redraw {
            pie: self.pie.decorate(&self.selection, &self.config),
            dendrogram: self.dendrogram.decorate(&self.selection, &self.config),
            transition_ms: self.config.transition_ms,
        }
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            config: &self.config,
            records: self.store.len(),
            dropped: self.store.dropped(),
            palette: &self.palette,
            selection: &self.selection,
            histogram: &self.histogram,
            pie: &self.pie,
            dendrogram: &self.dendrogram,
            samples: self
                .store
                .records()
                .iter()
                .map(|r| (r.hours_per_day, r.genre.as_str()))
                .collect(),
            redraw: self.redraw(),
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    pub fn pie(&self) -> &PieChart {
        &self.pie
    }

    pub fn dendrogram(&self) -> &Dendrogram {
        &self.dendrogram
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::sample_store;
    use crate::views::NodeKind;
    use std::collections::BTreeMap;

    fn dashboard() -> Dashboard {
        Dashboard::new(sample_store(), ViewConfig::default())
    }

    /// Genre → opacity as seen by the pie
    fn pie_view(redraw: &Redraw) -> BTreeMap<String, f64> {
        redraw.pie.iter().map(|d| (d.genre.to_string(), d.opacity)).collect()
    }

    /// Genre → opacity as seen by the dendrogram's genre nodes
    fn tree_view(dash: &Dashboard, redraw: &Redraw) -> BTreeMap<String, f64> {
        redraw
            .dendrogram
            .iter()
            .filter_map(|d| {
                let n = &dash.dendrogram().nodes()[d.id];
                (n.kind == NodeKind::Genre).then(|| (n.label.clone(), d.opacity))
            })
            .collect()
    }

    // ==========================================================================
    // CROSS-VIEW CONSISTENCY TESTS
    // ==========================================================================
    //
    // The pie and the dendrogram must agree on every genre after every
    // interaction, and dendrogram leaves must match their parent genre.
    // ==========================================================================

    fn assert_views_agree(dash: &Dashboard, redraw: &Redraw) {
        assert_eq!(pie_view(redraw), tree_view(dash, redraw));

        let nodes = dash.dendrogram().nodes();
        let by_id: BTreeMap<usize, f64> = redraw.dendrogram.iter().map(|d| (d.id, d.opacity)).collect();
        for leaf in nodes.iter().filter(|n| n.kind == NodeKind::Leaf) {
            assert_eq!(by_id[&leaf.id], by_id[&leaf.parent.unwrap()], "{}", leaf.label);
        }
    }

    #[test]
    fn test_views_agree_through_interaction_sequence() {
        let mut dash = dashboard();
        let steps = vec![
            Interaction::Brush(Some(BrushRange::new(0.0, 2.0).unwrap())),
            Interaction::SliceClicked(Genre::from("Rock")),
            Interaction::SliceClicked(Genre::from("Jazz")),
            Interaction::Brush(None),
            Interaction::Brush(Some(BrushRange::new(20.0, 21.0).unwrap())),
            Interaction::SliceClicked(Genre::from("Jazz")),
            Interaction::Reset,
        ];

        assert_views_agree(&dash, &dash.redraw());
        for step in steps {
            let redraw = dash.dispatch(step);
            assert_views_agree(&dash, &redraw);
        }
    }

    #[test]
    fn test_initial_render_is_reproducible() {
        let a = dashboard();
        let b = dashboard();
        assert_eq!(a.redraw(), b.redraw());
        assert!(a.redraw().pie.iter().all(|d| d.opacity == 1.0));
    }

    #[test]
    fn test_brush_then_clear_matches_initial() {
        let mut dash = dashboard();
        let initial = dash.redraw();
        dash.dispatch(Interaction::Brush(Some(BrushRange::new(5.0, 7.0).unwrap())));
        assert_eq!(dash.dispatch(Interaction::Brush(None)), initial);
    }

    #[test]
    fn test_histogram_unchanged_by_interactions() {
        let mut dash = dashboard();
        let before = dash.histogram().bins().to_vec();
        dash.dispatch(Interaction::Brush(Some(BrushRange::new(0.0, 1.0).unwrap())));
        dash.dispatch(Interaction::SliceClicked(Genre::from("Pop")));
        assert_eq!(dash.histogram().bins(), before.as_slice());
    }

    #[test]
    fn test_redraw_carries_transition() {
        let dash = dashboard();
        assert_eq!(dash.redraw().transition_ms, 500);
    }

    #[test]
    fn test_reconfigure_keeps_selection() {
        let mut dash = dashboard();
        dash.dispatch(Interaction::SliceClicked(Genre::from("Jazz")));
        let bins_before = dash.histogram().bins().len();

        dash.reconfigure(ViewConfig::new().with_bin_count(2).with_faded_opacity(0.5));
        assert!(dash.histogram().bins().len() < bins_before);
        assert_eq!(dash.selection().selected_genre(), Some(&Genre::from("Jazz")));

        let redraw = dash.redraw();
        let rock = redraw.pie.iter().find(|d| d.genre.as_str() == "Rock").unwrap();
        assert_eq!(rock.opacity, 0.5);
        assert_views_agree(&dash, &redraw);
    }

    #[test]
    fn test_snapshot_serializes() {
        let dash = dashboard();
        let json = serde_json::to_value(dash.snapshot()).unwrap();
        assert_eq!(json["records"], 5);
        assert_eq!(json["samples"].as_array().unwrap().len(), 5);
        assert_eq!(json["selection"]["selected_genre"], serde_json::Value::Null);
        assert_eq!(json["dendrogram"]["nodes"][0]["kind"], "root");
    }
}
