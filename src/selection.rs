//! Cross-view selection state and the filter engine
//!
//! Two independent inputs drive what the linked views emphasize:
//!
//! 1. **Brush** on the histogram: a closed hours-per-day interval. The genres
//!    of every record inside it become the *active* set. Clearing the brush
//!    makes every known genre active again. A brush that catches no records
//!    leaves the active set empty, which fades every genre until cleared.
//!
//! 2. **Click** on a pie wedge: pins that genre, or un-pins it if it was
//!    already pinned. At most one genre is pinned at a time.
//!
//! A brush never touches the pin and a click never touches the active set.
//!
//! # Visibility
//!
//! ```text
//! active(g) = (pinned is none OR pinned == g) AND g in active_genres
//! ```
//!
//! [`is_active`] is the only implementation of that rule. The pie and the
//! dendrogram both call it, so they can never disagree about which genres
//! are live.

use crate::error::{Error, Result};
use crate::record::{Genre, RecordStore};
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeSet;

/// A closed hours-per-day interval with `lo <= hi`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BrushRange {
    lo: f64,
    hi: f64,
}

impl BrushRange {
    /// Bounds may be given in either order; both must be finite
    pub fn new(a: f64, b: f64) -> Result<Self> {
        if !a.is_finite() || !b.is_finite() {
            return Err(Error::InvalidRange(format!("[{}, {}]", a, b)));
        }
        Ok(Self { lo: a.min(b), hi: a.max(b) })
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    /// Inclusive on both ends
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lo && value <= self.hi
    }
}

/// Shared state read by the pie and dendrogram views
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionState {
    active_genres: BTreeSet<Genre>,
    selected_genre: Option<Genre>,
}

impl SelectionState {
    /// Everything active, nothing pinned
    pub fn new(store: &RecordStore) -> Self {
        Self {
            active_genres: store.genres().clone(),
            selected_genre: None,
        }
    }

    pub fn active_genres(&self) -> &BTreeSet<Genre> {
        &self.active_genres
    }

    pub fn selected_genre(&self) -> Option<&Genre> {
        self.selected_genre.as_ref()
    }
}

/// Visibility rule shared by every decorated view
pub fn is_active(state: &SelectionState, genre: &Genre) -> bool {
    let pin_allows = state.selected_genre.as_ref().map_or(true, |pinned| pinned == genre);
    pin_allows && state.active_genres.contains(genre)
}

/// Derives selection state from interactions against one record store
#[derive(Debug, Clone, Copy)]
pub struct FilterEngine<'a> {
    store: &'a RecordStore,
}

impl<'a> FilterEngine<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    /// Genres passing the brush. `None` means the brush was cleared.
    pub fn apply_brush(&self, range: Option<BrushRange>) -> BTreeSet<Genre> {
        match range {
            None => self.store.genres().clone(),
            Some(range) => self
                .store
                .records()
                .iter()
                .filter(|r| range.contains(r.hours_per_day))
                .map(|r| r.genre.clone())
                .collect(),
        }
    }

    /// Pin `clicked`, or un-pin it when it is already the pinned genre
    pub fn toggle_genre(&self, current: Option<&Genre>, clicked: &Genre) -> Option<Genre> {
        if current == Some(clicked) {
            None
        } else {
            Some(clicked.clone())
        }
    }

    /// Replace the active set from a brush-end event
    pub fn brush(&self, state: &mut SelectionState, range: Option<BrushRange>) {
        state.active_genres = self.apply_brush(range);
        match range {
            Some(r) => debug!(
                "Brush [{}, {}] -> {} active genres",
                r.lo,
                r.hi,
                state.active_genres.len()
            ),
            None => debug!("Brush cleared -> all {} genres active", state.active_genres.len()),
        }
    }

    /// Toggle the pin from a slice-click event. Unknown genres are ignored.
    pub fn click(&self, state: &mut SelectionState, genre: &Genre) {
        if !self.store.contains_genre(genre.as_str()) {
            warn!("Ignoring click on unknown genre '{}'", genre);
            return;
        }
        state.selected_genre = self.toggle_genre(state.selected_genre.as_ref(), genre);
        debug!("Pinned genre: {:?}", state.selected_genre.as_ref().map(Genre::as_str));
    }

    /// Back to the initial state: everything active, nothing pinned
    pub fn reset(&self, state: &mut SelectionState) {
        *state = SelectionState::new(self.store);
    }
}
