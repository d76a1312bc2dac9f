//! Genre color palette
//!
//! Colors are sampled evenly along the Turbo colormap, in sorted genre order,
//! so the same dataset always yields the same colors.

use crate::record::Genre;
use serde::Serialize;
use std::collections::BTreeMap;

/// Fill used when a genre is not in the palette
const FALLBACK_COLOR: &str = "#999999";

#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Palette {
    colors: BTreeMap<Genre, String>,
}

impl Palette {
    /// Build from a sorted genre list
    pub fn new<'a, I>(genres: I) -> Self
    where
        I: IntoIterator<Item = &'a Genre>,
        I::IntoIter: ExactSizeIterator,
    {
        let genres = genres.into_iter();
        let n = genres.len();

        let colors = genres
            .enumerate()
            .map(|(i, genre)| {
                let t = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
                (genre.clone(), turbo_hex(t))
            })
            .collect();

        Self { colors }
    }

    pub fn color(&self, genre: &Genre) -> &str {
        self.colors
            .get(genre)
            .map(String::as_str)
            .unwrap_or(FALLBACK_COLOR)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// (genre, color) pairs in sorted genre order, for legends
    pub fn entries(&self) -> impl Iterator<Item = (&Genre, &str)> {
        self.colors.iter().map(|(g, c)| (g, c.as_str()))
    }
}

/// Polynomial approximation of the Turbo colormap, t in [0, 1]
fn turbo_rgb(t: f64) -> (u8, u8, u8) {
    let t = t.clamp(0.0, 1.0);
    let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;

    let r = 34.61 + t * (1172.33 - t * (10793.56 - t * (33300.12 - t * (38394.49 - t * 14825.05))));
    let g = 23.31 + t * (557.33 + t * (1225.33 - t * (3574.96 - t * (1073.77 + t * 707.56))));
    let b = 27.2 + t * (3211.1 - t * (15327.97 - t * (27814.0 - t * (22569.18 - t * 6838.66))));

    (channel(r), channel(g), channel(b))
}

fn turbo_hex(t: f64) -> String {
    let (r, g, b) = turbo_rgb(t);
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genres(names: &[&str]) -> Vec<Genre> {
        names.iter().map(|n| Genre::from(*n)).collect()
    }

    #[test]
    fn test_turbo_endpoints() {
        // Turbo starts near dark purple-blue and ends in dark red
        assert_eq!(turbo_rgb(0.0), (35, 23, 27));
        let (r, g, b) = turbo_rgb(1.0);
        assert!(r > g && r > b, "end of turbo should be red, got ({}, {}, {})", r, g, b);
    }

    #[test]
    fn test_palette_is_deterministic() {
        let list = genres(&["Jazz", "Pop", "Rock"]);
        let a = Palette::new(&list);
        let b = Palette::new(&list);
        for g in &list {
            assert_eq!(a.color(g), b.color(g));
        }
    }

    #[test]
    fn test_palette_distinct_colors() {
        let list = genres(&["Classical", "EDM", "Jazz", "Metal", "Pop", "Rock"]);
        let palette = Palette::new(&list);
        let mut seen: Vec<&str> = list.iter().map(|g| palette.color(g)).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), list.len());
    }

    #[test]
    fn test_single_genre_palette() {
        let list = genres(&["Rock"]);
        let palette = Palette::new(&list);
        assert_eq!(palette.color(&list[0]), "#23171b");
    }

    #[test]
    fn test_unknown_genre_fallback() {
        let palette = Palette::new(&genres(&["Rock"]));
        assert_eq!(palette.color(&Genre::from("Polka")), FALLBACK_COLOR);
    }
}
