//! Report generation for dashboards
//!
//! - **HTML**: interactive report with D3.js (brushable histogram, clickable
//!   pie, fading dendrogram)
//! - **JSON**: snapshot of every view's geometry and current decorations
//! - **SVG**: static picture of the current selection
//! - **CSV**: per-genre summary table
//!
//! # Usage
//!
//! ```ignore
//! use tunemood::report;
//!
//! // Automatically picks format based on extension
//! report::generate("report.html", &dashboard)?;  // HTML
//! report::generate("report.json", &dashboard)?;  // JSON
//! report::generate("report.svg", &dashboard)?;   // SVG
//! report::generate("report.csv", &dashboard)?;   // CSV
//! ```

pub mod csv;
pub mod html;
pub mod json;
pub mod svg;

use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::record::{Genre, MusicEffect};
use crate::selection::is_active;
use serde::Serialize;
use std::path::Path;

/// Generate a report in the appropriate format based on file extension
pub fn generate<P: AsRef<Path>>(path: P, dashboard: &Dashboard) -> Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = std::fs::File::create(path)?;

    match ext.as_str() {
        "html" | "htm" => html::write(&mut file, dashboard, html::Mode::Standalone),
        "json" => json::write(&mut file, dashboard),
        "svg" => svg::write(&mut file, dashboard),
        _ => csv::write(&mut file, dashboard),
    }
}

/// One row of the per-genre summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreSummary {
    pub genre: Genre,
    pub count: usize,
    pub percent: f64,
    pub improve: usize,
    pub no_effect: usize,
    pub worsen: usize,
    /// Whether the genre passes the current selection
    pub active: bool,
}

/// Summary rows in sorted genre order
pub fn summarize(dashboard: &Dashboard) -> Vec<GenreSummary> {
    let store = dashboard.store();
    let total = store.len() as f64;

    store
        .genre_effect_counts()
        .into_iter()
        .map(|(genre, counts)| GenreSummary {
            active: is_active(dashboard.selection(), &genre),
            count: counts.total(),
            percent: counts.total() as f64 / total * 100.0,
            improve: counts.get(MusicEffect::Improve),
            no_effect: counts.get(MusicEffect::NoEffect),
            worsen: counts.get(MusicEffect::Worsen),
            genre,
        })
        .collect()
}
