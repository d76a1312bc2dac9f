//! tunemood - Linked views of music and mental-health survey data
//!
//! tunemood loads a survey export (listening hours, anxiety and depression
//! scores, favorite genre, self-reported effect of music) and renders it as
//! three linked views:
//!
//! - a histogram of hours per day, which can be **brushed** to a range
//! - a pie chart of favorite genres, whose wedges can be **clicked** to pin
//!   a genre
//! - a dendrogram of genre → music effect counts
//!
//! Brushing and pinning both feed one [`SelectionState`]. The pie and the
//! dendrogram fade every genre that fails the shared visibility rule
//! ([`selection::is_active`]); the histogram always shows the full
//! distribution.
//!
//! # Quick Start
//!
//! ```no_run
//! use tunemood::{BrushRange, Dashboard, Genre, Interaction, ViewConfig};
//!
//! let mut dashboard = Dashboard::load("music_mental.csv", ViewConfig::default())?;
//!
//! // Brush the histogram to 0-2 hours per day
//! let redraw = dashboard.dispatch(Interaction::Brush(Some(BrushRange::new(0.0, 2.0)?)));
//! for wedge in &redraw.pie {
//!     println!("{}: opacity {}", wedge.genre, wedge.opacity);
//! }
//!
//! // Pin Jazz, then write a static picture of the result
//! dashboard.dispatch(Interaction::SliceClicked(Genre::from("Jazz")));
//! tunemood::report::generate("jazz.svg", &dashboard)?;
//! # Ok::<(), tunemood::Error>(())
//! ```
//!
//! # Modules
//!
//! - [`record`]: CSV loading, cleaning and aggregates
//! - [`selection`]: selection state, filter engine, visibility rule
//! - [`views`]: histogram, pie and dendrogram shapes and decorations
//! - [`dashboard`]: wires the views to the selection
//! - [`report`]: HTML, JSON, SVG and CSV output
//! - [`serve`]: interactive HTTP mode

pub mod config;
pub mod dashboard;
pub mod error;
pub mod palette;
pub mod record;
pub mod report;
pub mod selection;
pub mod serve;
pub mod views;

pub use config::ViewConfig;
pub use dashboard::{Dashboard, Interaction, Redraw};
pub use error::{Error, Result};
pub use palette::Palette;
pub use record::{Genre, MusicEffect, Record, RecordStore};
pub use selection::{BrushRange, FilterEngine, SelectionState};

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // PUBLIC API TESTS
    // ==========================================================================
    //
    // These tests verify the public API surface is correct and documented.
    // ==========================================================================

    #[test]
    fn test_public_exports() {
        let _ = MusicEffect::Improve;
        let _ = Genre::from("Rock");
        let _ = ViewConfig::default();
        assert!(BrushRange::new(0.0, 1.0).is_ok());
    }

    #[test]
    fn test_end_to_end_from_csv() {
        let csv = "\
Hours per day,Fav genre,Anxiety,Depression,Music effects
0.5,Rock,3,0,Improve
2,Pop,7,2,No effect
1,Rock,7,7,Worsen
3,Jazz,9,7,Improve
";
        let store = RecordStore::from_reader(csv.as_bytes()).unwrap();
        let mut dash = Dashboard::new(store, ViewConfig::default());

        let redraw = dash.dispatch(Interaction::Brush(Some(BrushRange::new(0.0, 2.0).unwrap())));
        let faded: Vec<&str> = redraw
            .pie
            .iter()
            .filter(|d| d.opacity < 1.0)
            .map(|d| d.genre.as_str())
            .collect();
        assert_eq!(faded, vec!["Jazz"]);
    }
}
