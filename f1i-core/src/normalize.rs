//! Telemetry normalization
//!
//! Converts raw provider rows into distance-indexed samples and rescales lap
//! positions into a fixed drawing viewport.

use crate::error::{DominanceError, Result};
use crate::model::{Lap, LapTelemetry, NormalizedPoint, RawSample, TelemetrySample};

/// Fixed-size 2D drawing area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Attach a cumulative distance to every sample of `lap`
///
/// If the provider already supplies distance for every row it is passed
/// through unchanged. Otherwise distance is integrated from the first row:
/// speed over time where both rows carry speed, else the planar position
/// delta, else no progress. Time running backwards contributes nothing, so the
/// integrated distance is non-decreasing.
pub fn add_distance(lap: &Lap, raw: &[RawSample]) -> Result<LapTelemetry> {
    if raw.is_empty() {
        return Err(DominanceError::EmptyTelemetry {
            driver: lap.driver.clone(),
            lap_number: lap.lap_number,
        });
    }

    let precomputed = raw
        .iter()
        .all(|s| s.distance.map(f64::is_finite).unwrap_or(false));

    let samples = if precomputed {
        raw.iter()
            .map(|s| TelemetrySample {
                time_offset: s.time,
                distance: s.distance.unwrap_or_default(),
                position: s.position(),
            })
            .collect()
    } else {
        integrate_distance(raw)
    };

    Ok(LapTelemetry::new(lap.clone(), samples))
}

fn integrate_distance(raw: &[RawSample]) -> Vec<TelemetrySample> {
    let mut distance = 0.0;
    let mut samples = Vec::with_capacity(raw.len());

    for (i, sample) in raw.iter().enumerate() {
        if i > 0 {
            distance += step_distance(&raw[i - 1], sample);
        }
        samples.push(TelemetrySample {
            time_offset: sample.time,
            distance,
            position: sample.position(),
        });
    }

    samples
}

fn step_distance(prev: &RawSample, next: &RawSample) -> f64 {
    let dt = next.time - prev.time;
    let ds = match (prev.speed(), next.speed()) {
        (Some(a), Some(b)) if dt.is_finite() && dt > 0.0 => {
            (a.to_meters_per_second() + b.to_meters_per_second()) / 2.0 * dt
        }
        _ => match (prev.position(), next.position()) {
            (Some(a), Some(b)) if dt.is_finite() && dt >= 0.0 => a.distance_to(&b),
            _ => 0.0,
        },
    };

    if ds.is_finite() && ds > 0.0 {
        ds
    } else {
        0.0
    }
}

/// Positions of one lap rescaled into a viewport
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTrack {
    /// One point per sample carrying a position, in sample order
    pub points: Vec<NormalizedPoint>,
    pub scale: f64,
    pub origin_x: f64,
    pub origin_y: f64,
}

/// Bounding box of world positions
#[derive(Debug, Clone, Copy)]
struct BoundingBox {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl BoundingBox {
    fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    fn update(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Uniformly rescale sample positions to fit `viewport_width` x `viewport_height`
///
/// The bounding box minimum maps to the viewport origin and the scale is the
/// smaller of the two axis ratios, so the aspect ratio is preserved. A
/// degenerate bounding box (zero width or height) leaves the coordinates
/// untouched with `scale = 1.0` and origin `(0, 0)`.
pub fn normalize_positions(
    samples: &[TelemetrySample],
    viewport_width: f64,
    viewport_height: f64,
) -> NormalizedTrack {
    let positioned: Vec<(f64, f64, f64)> = samples
        .iter()
        .filter_map(|s| s.position.map(|p| (s.distance, p.x, p.y)))
        .collect();

    let mut bounds = BoundingBox::new();
    for &(_, x, y) in &positioned {
        bounds.update(x, y);
    }

    let (width, height) = (bounds.width(), bounds.height());
    let degenerate = !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0);

    if degenerate {
        return NormalizedTrack {
            points: positioned
                .into_iter()
                .map(|(d, x, y)| NormalizedPoint::new(d, x, y))
                .collect(),
            scale: 1.0,
            origin_x: 0.0,
            origin_y: 0.0,
        };
    }

    let scale = (viewport_width / width).min(viewport_height / height);
    let points = positioned
        .into_iter()
        .map(|(d, x, y)| {
            NormalizedPoint::new(
                d,
                ((x - bounds.min_x) * scale).clamp(0.0, viewport_width),
                ((y - bounds.min_y) * scale).clamp(0.0, viewport_height),
            )
        })
        .collect();

    NormalizedTrack {
        points,
        scale,
        origin_x: bounds.min_x,
        origin_y: bounds.min_y,
    }
}
