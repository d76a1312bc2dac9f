//! View configuration
//!
//! Shared by the CLI, the report writers and the interactive server. Every
//! field has a default, so a partial set of query parameters is enough.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Space reserved around each chart for axes and labels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

pub const MARGIN: Margin = Margin { top: 30.0, right: 30.0, bottom: 60.0, left: 60.0 };

/// Upper bound on requested histogram bins
pub const MAX_BIN_COUNT: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Target number of histogram bins
    pub bin_count: usize,
    /// Opacity of shapes whose genre fails the visibility rule
    pub faded_opacity: f64,
    /// Duration renderers should animate re-decoration over
    pub transition_ms: u64,
    /// Vertical spacing per dendrogram leaf
    pub row_height: f64,
    /// Outer chart width in pixels, margins included
    pub width: f64,
    /// Outer chart height in pixels, margins included
    pub height: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            bin_count: 20,
            faded_opacity: 0.2,
            transition_ms: 500,
            row_height: 30.0,
            width: 600.0,
            height: 400.0,
        }
    }
}

impl ViewConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bin_count(mut self, bins: usize) -> Self {
        self.bin_count = bins.clamp(1, MAX_BIN_COUNT);
        self
    }

    pub fn with_faded_opacity(mut self, opacity: f64) -> Self {
        self.faded_opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Parse a partial config from a query string. Missing fields take their
    /// defaults and out-of-range values are clamped.
    pub fn from_query(query: &str) -> Result<Self> {
        let config: ViewConfig = serde_urlencoded::from_str(query)
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        Ok(config.sanitized())
    }

    /// Apply the builder clamps to a config that bypassed them
    pub fn sanitized(self) -> Self {
        let (bins, opacity) = (self.bin_count, self.faded_opacity);
        let opacity = if opacity.is_finite() { opacity } else { Self::default().faded_opacity };
        self.with_bin_count(bins).with_faded_opacity(opacity)
    }

    /// Drawable width inside the margins
    pub fn inner_width(&self) -> f64 {
        (self.width - MARGIN.left - MARGIN.right).max(0.0)
    }

    /// Drawable height inside the margins
    pub fn inner_height(&self) -> f64 {
        (self.height - MARGIN.top - MARGIN.bottom).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewConfig::default();
        assert_eq!(config.bin_count, 20);
        assert_eq!(config.faded_opacity, 0.2);
        assert_eq!(config.inner_width(), 510.0);
        assert_eq!(config.inner_height(), 310.0);
    }

    #[test]
    fn test_builder_clamps() {
        let config = ViewConfig::new().with_bin_count(0).with_faded_opacity(3.0);
        assert_eq!(config.bin_count, 1);
        assert_eq!(config.faded_opacity, 1.0);
    }

    #[test]
    fn test_bin_count_capped() {
        let config = ViewConfig::new().with_bin_count(1_000_000_000);
        assert_eq!(config.bin_count, MAX_BIN_COUNT);
    }

    #[test]
    fn test_partial_query_uses_defaults() {
        let config = ViewConfig::from_query("bin_count=10").unwrap();
        assert_eq!(config.bin_count, 10);
        assert_eq!(config.transition_ms, 500);
        assert_eq!(config.faded_opacity, 0.2);
    }

    #[test]
    fn test_query_values_are_clamped() {
        let config = ViewConfig::from_query("bin_count=1000000000&faded_opacity=-2").unwrap();
        assert_eq!(config.bin_count, MAX_BIN_COUNT);
        assert_eq!(config.faded_opacity, 0.0);

        let config = ViewConfig::from_query("faded_opacity=NaN").unwrap();
        assert_eq!(config.faded_opacity, 0.2);
    }

    #[test]
    fn test_query_rejects_bad_values() {
        assert!(matches!(
            ViewConfig::from_query("bin_count=lots"),
            Err(Error::InvalidConfig(_))
        ));
    }
}
