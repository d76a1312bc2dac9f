//! The three linked views
//!
//! Each view builds its shapes once from the full record store. Shape sets
//! never change afterwards; only decorations (opacity, stroke) are
//! recomputed when the selection changes.
//!
//! - [`histogram`]: hours-per-day distribution. Source of brush events,
//!   never decorated.
//! - [`pie`]: one wedge per genre. Source of click events, decorated.
//! - [`dendrogram`]: genre → effect tree. Decorated.

pub mod dendrogram;
pub mod histogram;
pub mod pie;

pub use dendrogram::{Dendrogram, NodeDecoration, NodeKind, TreeLink, TreeNode};
pub use histogram::{Bin, Histogram};
pub use pie::{PieChart, Wedge, WedgeDecoration};

use crate::config::ViewConfig;
use crate::record::Genre;
use crate::selection::{is_active, SelectionState};

/// Opacity for any shape keyed by `genre`
pub(crate) fn opacity_for(state: &SelectionState, genre: &Genre, config: &ViewConfig) -> f64 {
    if is_active(state, genre) {
        1.0
    } else {
        config.faded_opacity
    }
}
