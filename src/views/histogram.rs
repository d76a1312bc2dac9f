//! Hours-per-day histogram
//!
//! The x domain is the data extent widened to round tick values. Bin
//! thresholds sit on the round ticks nearest the requested bin count, so a
//! request for 20 bins over [0, 24] yields 1-hour bins rather than 1.2-hour
//! ones. Bins are half-open `[x0, x1)` except the last, which also holds its
//! upper edge.
//!
//! The histogram always shows the unfiltered distribution. It emits brush
//! ranges and is never faded by them.

use crate::config::ViewConfig;
use crate::error::Result;
use crate::record::RecordStore;
use crate::selection::BrushRange;
use serde::Serialize;

/// Tick count used when rounding the axis domains
const NICE_TICKS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    /// Lower edge in hours
    pub x0: f64,
    /// Upper edge in hours
    pub x1: f64,
    pub count: usize,
    /// Pixel geometry within the chart area
    pub px: f64,
    pub py: f64,
    pub width: f64,
    pub height: f64,
}

impl Bin {
    /// Hover text: hour range and count
    pub fn tooltip(&self) -> String {
        format!("{:.1}–{:.1} hrs\nCount: {}", self.x0, self.x1, self.count)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Histogram {
    domain: (f64, f64),
    y_max: f64,
    bins: Vec<Bin>,
    width: f64,
    height: f64,
}

impl Histogram {
    pub fn build(store: &RecordStore, config: &ViewConfig) -> Self {
        let (lo, hi) = store.hours_extent();
        let domain = nice(lo, hi, NICE_TICKS);
        let width = config.inner_width();
        let height = config.inner_height();

        let mut edges = vec![domain.0];
        edges.extend(
            ticks(domain.0, domain.1, config.bin_count)
                .into_iter()
                .filter(|t| *t > domain.0 && *t < domain.1),
        );
        edges.push(domain.1);

        let mut counts = vec![0usize; edges.len() - 1];
        let thresholds = &edges[1..edges.len() - 1];
        for r in store.records() {
            let h = r.hours_per_day;
            if h < domain.0 || h > domain.1 {
                continue;
            }
            // Index of the first threshold greater than h
            let idx = thresholds.partition_point(|t| *t <= h);
            counts[idx] += 1;
        }

        let max_count = counts.iter().copied().max().unwrap_or(0);
        let y_max = nice(0.0, max_count as f64, NICE_TICKS).1;

        let mut histogram = Self { domain, y_max, bins: Vec::new(), width, height };
        histogram.bins = edges
            .windows(2)
            .zip(counts)
            .map(|(w, count)| {
                let (x0, x1) = (w[0], w[1]);
                let top = histogram.scale_y(count as f64);
                Bin {
                    x0,
                    x1,
                    count,
                    px: histogram.scale_x(x0) + 1.0,
                    py: top,
                    width: (histogram.scale_x(x1) - histogram.scale_x(x0) - 1.0).max(0.0),
                    height: height - top,
                }
            })
            .collect();

        histogram
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    /// Rounded x domain in hours
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Rounded top of the count axis
    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    /// Hours to pixels
    pub fn scale_x(&self, hours: f64) -> f64 {
        let (d0, d1) = self.domain;
        if d1 == d0 {
            return self.width / 2.0;
        }
        (hours - d0) / (d1 - d0) * self.width
    }

    /// Pixels to hours
    pub fn invert_x(&self, px: f64) -> f64 {
        let (d0, d1) = self.domain;
        if self.width == 0.0 {
            return d0;
        }
        d0 + px / self.width * (d1 - d0)
    }

    /// Count to pixels, measured from the top of the chart area
    pub fn scale_y(&self, count: f64) -> f64 {
        if self.y_max == 0.0 {
            return self.height;
        }
        self.height - count / self.y_max * self.height
    }

    /// Convert a brush selection in pixels to an hours interval
    pub fn brush_from_pixels(&self, px0: f64, px1: f64) -> Result<BrushRange> {
        BrushRange::new(self.invert_x(px0), self.invert_x(px1))
    }
}

/// Round a domain outward to multiples of a tick step
fn nice(mut start: f64, mut stop: f64, count: usize) -> (f64, f64) {
    let mut prev_step = None;
    loop {
        let step = tick_increment(start, stop, count);
        if prev_step == Some(step) || step == 0.0 || !step.is_finite() {
            return (start, stop);
        }
        if step > 0.0 {
            start = (start / step).floor() * step;
            stop = (stop / step).ceil() * step;
        } else {
            start = (start * step).ceil() / step;
            stop = (stop * step).floor() / step;
        }
        prev_step = Some(step);
    }
}

/// Returns (first index, last index, increment). A negative increment means
/// the step is its reciprocal, which keeps fractional steps exact.
fn tick_spec(start: f64, stop: f64, count: f64) -> (f64, f64, f64) {
    let e10 = 50f64.sqrt();
    let e5 = 10f64.sqrt();
    let e2 = 2f64.sqrt();

    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= e10 {
        10.0
    } else if error >= e5 {
        5.0
    } else if error >= e2 {
        2.0
    } else {
        1.0
    };

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let k = 10f64.powf(-power) / factor;
        i1 = (start * k).round();
        i2 = (stop * k).round();
        if i1 / k < start {
            i1 += 1.0;
        }
        if i2 / k > stop {
            i2 -= 1.0;
        }
        inc = -k;
    } else {
        let k = 10f64.powf(power) * factor;
        i1 = (start / k).round();
        i2 = (stop / k).round();
        if i1 * k < start {
            i1 += 1.0;
        }
        if i2 * k > stop {
            i2 -= 1.0;
        }
        inc = k;
    }

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    (i1, i2, inc)
}

fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    tick_spec(start, stop, count as f64).2
}

/// Round values spanning [start, stop], about `count` of them
fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }

    let (i1, i2, inc) = tick_spec(start, stop, count as f64);
    if !(i2 >= i1) {
        return Vec::new();
    }

    let n = (i2 - i1) as usize + 1;
    (0..n)
        .map(|i| {
            let idx = i1 + i as f64;
            if inc < 0.0 {
                idx / -inc
            } else {
                idx * inc
            }
        })
        .collect()
}
