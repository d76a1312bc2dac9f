//! Genre-share pie chart
//!
//! Wedges are laid out clockwise from twelve o'clock in descending count
//! order (ties keep genre order). Clicking a wedge pins its genre.

use super::opacity_for;
use crate::config::ViewConfig;
use crate::palette::Palette;
use crate::record::{Genre, RecordStore};
use crate::selection::SelectionState;
use serde::Serialize;
use std::f64::consts::TAU;

/// Gap between the outer radius and the chart edge
const RADIUS_PADDING: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wedge {
    pub genre: Genre,
    pub count: usize,
    /// Share of all records, 0-100
    pub percent: f64,
    /// Radians, clockwise from twelve o'clock
    pub start_angle: f64,
    pub end_angle: f64,
    pub fill: String,
}

impl Wedge {
    /// Hover text: genre and share
    pub fn tooltip(&self) -> String {
        format!("{}\n{:.1}%", self.genre, self.percent)
    }

    /// SVG path for this wedge centered on the origin
    pub fn arc_path(&self, radius: f64) -> String {
        let point = |a: f64| (radius * a.sin(), -radius * a.cos());
        let sweep = self.end_angle - self.start_angle;

        if sweep >= TAU - 1e-9 {
            // Full circle needs two half arcs
            return format!(
                "M0,{top:.3}A{r:.3},{r:.3},0,1,1,0,{bottom:.3}A{r:.3},{r:.3},0,1,1,0,{top:.3}Z",
                r = radius,
                top = -radius,
                bottom = radius
            );
        }

        let (x0, y0) = point(self.start_angle);
        let (x1, y1) = point(self.end_angle);
        let large_arc = if sweep > TAU / 2.0 { 1 } else { 0 };
        format!(
            "M{:.3},{:.3}A{r:.3},{r:.3},0,{},1,{:.3},{:.3}L0,0Z",
            x0,
            y0,
            large_arc,
            x1,
            y1,
            r = radius
        )
    }
}

/// Per-wedge emphasis for the current selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WedgeDecoration {
    pub genre: Genre,
    pub opacity: f64,
    pub stroke: &'static str,
    pub stroke_width: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PieChart {
    wedges: Vec<Wedge>,
    total: usize,
    radius: f64,
}

impl PieChart {
    pub fn build(store: &RecordStore, palette: &Palette, config: &ViewConfig) -> Self {
        let counts = store.genre_counts();
        let total: usize = counts.values().sum();

        let mut order: Vec<(&Genre, usize)> = counts.iter().map(|(g, c)| (g, *c)).collect();
        // Stable, so equal counts keep sorted genre order
        order.sort_by(|a, b| b.1.cmp(&a.1));

        let scale = if total > 0 { TAU / total as f64 } else { 0.0 };
        let mut angle = 0.0;
        let wedges = order
            .into_iter()
            .map(|(genre, count)| {
                let start = angle;
                angle += count as f64 * scale;
                Wedge {
                    genre: genre.clone(),
                    count,
                    percent: count as f64 / total as f64 * 100.0,
                    start_angle: start,
                    end_angle: angle,
                    fill: palette.color(genre).to_string(),
                }
            })
            .collect();

        let radius = (config.inner_width().min(config.inner_height()) / 2.0 - RADIUS_PADDING).max(0.0);

        Self { wedges, total, radius }
    }

    /// Wedges in drawing order
    pub fn wedges(&self) -> &[Wedge] {
        &self.wedges
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn decorate(&self, state: &SelectionState, config: &ViewConfig) -> Vec<WedgeDecoration> {
        self.wedges
            .iter()
            .map(|w| {
                let pinned = state.selected_genre() == Some(&w.genre);
                WedgeDecoration {
                    genre: w.genre.clone(),
                    opacity: opacity_for(state, &w.genre, config),
                    stroke: if pinned { "black" } else { "white" },
                    stroke_width: if pinned { 3.0 } else { 1.0 },
                }
            })
            .collect()
    }
}
