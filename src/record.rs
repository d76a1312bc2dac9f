//! Survey records and the immutable record store
//!
//! The store is built once from a CSV export of the music and mental-health
//! survey. Each row is cleaned as it is read:
//!
//! - `Hours per day` must be a finite, non-negative number
//! - `Anxiety` and `Depression` must be finite numbers
//! - `Fav genre` must be non-empty after trimming
//! - `Music effects` must be one of `Improve`, `No effect`, `Worsen`
//!
//! Rows failing any check are dropped silently. Only the dropped count is
//! kept (and logged), so callers can report it if they care.
//!
//! Every aggregate the views need (genre totals, genre × effect totals) is
//! computed from the full store and never from a filtered subset.

use crate::error::{Error, Result};
use log::debug;
use serde::Serialize;
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

pub const COL_HOURS: &str = "Hours per day";
pub const COL_ANXIETY: &str = "Anxiety";
pub const COL_DEPRESSION: &str = "Depression";
pub const COL_GENRE: &str = "Fav genre";
pub const COL_EFFECT: &str = "Music effects";

/// A favorite-genre value, used as the key for every genre-associated shape
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Genre(String);

impl Genre {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Genre {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for Genre {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Self-reported effect of music on the respondent's mental health
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MusicEffect {
    Improve,
    #[serde(rename = "No effect")]
    NoEffect,
    Worsen,
}

impl MusicEffect {
    /// Fixed display order of the dendrogram leaves
    pub const ALL: [MusicEffect; 3] = [MusicEffect::Improve, MusicEffect::NoEffect, MusicEffect::Worsen];

    pub fn label(self) -> &'static str {
        match self {
            MusicEffect::Improve => "Improve",
            MusicEffect::NoEffect => "No effect",
            MusicEffect::Worsen => "Worsen",
        }
    }

    fn index(self) -> usize {
        match self {
            MusicEffect::Improve => 0,
            MusicEffect::NoEffect => 1,
            MusicEffect::Worsen => 2,
        }
    }
}

impl fmt::Display for MusicEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MusicEffect {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "Improve" => Ok(MusicEffect::Improve),
            "No effect" => Ok(MusicEffect::NoEffect),
            "Worsen" => Ok(MusicEffect::Worsen),
            _ => Err(()),
        }
    }
}

/// One cleaned survey response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub hours_per_day: f64,
    pub anxiety: f64,
    pub depression: f64,
    pub genre: Genre,
    pub effect: MusicEffect,
}

/// Per-genre counts of each music effect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EffectCounts([usize; 3]);

impl EffectCounts {
    pub fn get(&self, effect: MusicEffect) -> usize {
        self.0[effect.index()]
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    fn add(&mut self, effect: MusicEffect) {
        self.0[effect.index()] += 1;
    }
}

/// Column positions resolved from the header row
struct Columns {
    hours: usize,
    anxiety: usize,
    depression: usize,
    genre: usize,
    effect: usize,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(Error::MissingColumn(name))
        };

        Ok(Self {
            hours: find(COL_HOURS)?,
            anxiety: find(COL_ANXIETY)?,
            depression: find(COL_DEPRESSION)?,
            genre: find(COL_GENRE)?,
            effect: find(COL_EFFECT)?,
        })
    }

    fn parse(&self, row: &csv::StringRecord) -> Option<Record> {
        let number = |idx: usize| -> Option<f64> {
            let value: f64 = row.get(idx)?.trim().parse().ok()?;
            value.is_finite().then_some(value)
        };

        let hours_per_day = number(self.hours).filter(|h| *h >= 0.0)?;
        let anxiety = number(self.anxiety)?;
        let depression = number(self.depression)?;

        let genre = row.get(self.genre)?.trim();
        if genre.is_empty() {
            return None;
        }
        let effect = row.get(self.effect)?.parse().ok()?;

        Some(Record {
            hours_per_day,
            anxiety,
            depression,
            genre: Genre::from(genre),
            effect,
        })
    }
}

/// The cleaned dataset. Immutable once built.
#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Vec<Record>,
    genres: BTreeSet<Genre>,
    dropped: usize,
}

impl RecordStore {
    /// Load and clean a CSV file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading records from {}", path.display());
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Read and clean CSV data from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let columns = Columns::resolve(csv_reader.headers()?)?;

        let mut records = Vec::new();
        let mut dropped = 0;

        for row in csv_reader.records() {
            let row = match row {
                Ok(row) => row,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(_) => {
                    dropped += 1;
                    continue;
                }
            };

            match columns.parse(&row) {
                Some(record) => records.push(record),
                None => dropped += 1,
            }
        }

        debug!("Kept {} records, dropped {} malformed rows", records.len(), dropped);
        let mut store = Self::from_records(records)?;
        store.dropped = dropped;
        Ok(store)
    }

    /// Build a store from already-cleaned records
    pub fn from_records(records: Vec<Record>) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::EmptyDataset);
        }

        let genres = records.iter().map(|r| r.genre.clone()).collect();

        Ok(Self { records, genres, dropped: 0 })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Distinct genres across all records, sorted
    pub fn genres(&self) -> &BTreeSet<Genre> {
        &self.genres
    }

    pub fn contains_genre(&self, genre: &str) -> bool {
        self.genres.contains(genre)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of rows discarded while cleaning
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Minimum and maximum hours-per-day across all records
    pub fn hours_extent(&self) -> (f64, f64) {
        self.records.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
            (lo.min(r.hours_per_day), hi.max(r.hours_per_day))
        })
    }

    /// Number of respondents per favorite genre
    pub fn genre_counts(&self) -> BTreeMap<Genre, usize> {
        let mut counts = BTreeMap::new();
        for r in &self.records {
            *counts.entry(r.genre.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Number of respondents per genre and music effect
    pub fn genre_effect_counts(&self) -> BTreeMap<Genre, EffectCounts> {
        let mut counts: BTreeMap<Genre, EffectCounts> = BTreeMap::new();
        for r in &self.records {
            counts.entry(r.genre.clone()).or_default().add(r.effect);
        }
        counts
    }
}
