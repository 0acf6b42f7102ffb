//! Track dominance: per-segment time comparison of two laps
//!
//! The reference lap's distance is split into a fixed number of equal-length
//! segments. For each segment the time both drivers needed to cover it is
//! estimated from a piecewise-linear time-over-distance interpolation of
//! their own telemetry, so the two laps never need aligned samples.
//!
//! Sign convention: `advantage = other_delta - reference_delta`, positive when
//! the reference driver was quicker through the segment.

use crate::error::{DominanceError, Result};
use crate::model::{
    ComparisonResult, DriverColor, LapTelemetry, NormalizedPoint, SegmentAdvantage,
};
use crate::normalize::{normalize_positions, Viewport};
use crate::path::{render, PathDescriptor};

pub const DEFAULT_SEGMENT_COUNT: usize = 20;

/// Comparison parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompareOptions {
    pub segment_count: usize,
    pub viewport: Viewport,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            segment_count: DEFAULT_SEGMENT_COUNT,
            viewport: Viewport::default(),
        }
    }
}

/// Piecewise-linear elapsed time as a function of distance
///
/// Knots are the lap's `(distance, time)` samples sorted by distance. Where
/// several samples share a distance the earliest one is kept, which keeps
/// every slope finite. Outside the sampled range the first or last piece is
/// extended linearly.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeInterpolator {
    distance: Vec<f64>,
    time: Vec<f64>,
}

impl TimeInterpolator {
    pub fn new(lap: &LapTelemetry) -> Self {
        let mut knots: Vec<(f64, f64)> = lap
            .samples
            .iter()
            .map(|s| (s.distance, s.time_offset))
            .filter(|(d, t)| d.is_finite() && t.is_finite())
            .collect();
        knots.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        knots.dedup_by(|next, kept| next.0 == kept.0);

        let (distance, time) = knots.into_iter().unzip();
        Self { distance, time }
    }

    /// Sampled distance envelope, if the lap has any knots
    pub fn range(&self) -> Option<(f64, f64)> {
        Some((*self.distance.first()?, *self.distance.last()?))
    }

    /// Estimated elapsed time at `distance`
    ///
    /// `None` with fewer than two knots, where no line can be drawn.
    pub fn time_at(&self, distance: f64) -> Option<f64> {
        let n = self.distance.len();
        if n < 2 || !distance.is_finite() {
            return None;
        }

        let upper = self
            .distance
            .partition_point(|&d| d <= distance)
            .clamp(1, n - 1);
        let lower = upper - 1;

        let (d0, d1) = (self.distance[lower], self.distance[upper]);
        let (t0, t1) = (self.time[lower], self.time[upper]);
        let t = t0 + (distance - d0) * (t1 - t0) / (d1 - d0);

        t.is_finite().then_some(t)
    }

    /// Time needed to go from `start` to `end`, extrapolating as needed
    pub fn elapsed(&self, start: f64, end: f64) -> Option<f64> {
        Some(self.time_at(end)? - self.time_at(start)?)
    }

    /// Whether `[start, end]` touches the sampled envelope
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        self.range()
            .map(|(first, last)| end >= first && start <= last)
            .unwrap_or(false)
    }
}

/// Result of comparing two laps, before driver metadata is attached
#[derive(Debug, Clone, PartialEq)]
pub struct TrackDominance {
    /// Full reference lap path
    pub circuit_layout: PathDescriptor,
    pub segments: Vec<SegmentAdvantage>,
}

impl TrackDominance {
    pub fn into_result(
        self,
        driver1_color: DriverColor,
        driver2_color: DriverColor,
        reference: &LapTelemetry,
        other: &LapTelemetry,
    ) -> ComparisonResult {
        ComparisonResult {
            driver1: reference.driver().to_string(),
            driver2: other.driver().to_string(),
            driver1_color,
            driver2_color,
            circuit_layout: self.circuit_layout,
            segments: self.segments,
        }
    }
}

fn ensure_complete(lap: &LapTelemetry) -> Result<()> {
    if lap.samples.is_empty() {
        return Err(DominanceError::EmptyTelemetry {
            driver: lap.lap.driver.clone(),
            lap_number: lap.lap.lap_number,
        });
    }

    let missing = if lap.max_distance().is_none() {
        Some("distance")
    } else if !lap.samples.iter().any(|s| s.time_offset.is_finite()) {
        Some("time")
    } else if !lap.samples.iter().any(|s| s.position.is_some()) {
        Some("position")
    } else {
        None
    };

    match missing {
        Some(missing) => Err(DominanceError::IncompleteTelemetry {
            driver: lap.lap.driver.clone(),
            missing,
        }),
        None => Ok(()),
    }
}

/// Equal-width partition of `[0, total]` into `count` intervals
fn segment_boundaries(total: f64, count: usize) -> Vec<f64> {
    let mut boundaries: Vec<f64> = (0..=count)
        .map(|i| total * i as f64 / count as f64)
        .collect();
    // The last boundary must be exactly the lap distance
    boundaries[count] = total;
    boundaries
}

fn points_between(points: &[NormalizedPoint], start: f64, end: f64) -> Vec<NormalizedPoint> {
    points
        .iter()
        .filter(|p| p.distance >= start && p.distance <= end)
        .copied()
        .collect()
}

/// Compare `other` against `reference` over the reference lap's distance
///
/// Always returns `options.segment_count` segments in index order; segments
/// without an estimate carry a `None` advantage and segments without
/// reference samples carry an empty path.
pub fn analyze(
    reference: &LapTelemetry,
    other: &LapTelemetry,
    options: &CompareOptions,
) -> Result<TrackDominance> {
    if options.segment_count == 0 {
        return Err(DominanceError::InvalidSegmentCount);
    }
    ensure_complete(reference)?;
    ensure_complete(other)?;

    let track = normalize_positions(
        &reference.samples,
        options.viewport.width,
        options.viewport.height,
    );
    let circuit_layout = render(&track.points);

    let reference_time = TimeInterpolator::new(reference);
    let other_time = TimeInterpolator::new(other);

    let total_distance = reference.max_distance().unwrap_or_default();
    let boundaries = segment_boundaries(total_distance, options.segment_count);

    let segments = boundaries
        .windows(2)
        .enumerate()
        .map(|(segment_index, bounds)| {
            let (start, end) = (bounds[0], bounds[1]);
            // A segment neither lap has sampled has no estimate at all
            let sampled =
                reference_time.overlaps(start, end) || other_time.overlaps(start, end);
            let advantage = match (
                reference_time.elapsed(start, end),
                other_time.elapsed(start, end),
            ) {
                (Some(reference_delta), Some(other_delta)) if sampled => {
                    Some(other_delta - reference_delta)
                }
                _ => None,
            };

            SegmentAdvantage {
                segment_index,
                start_distance: start,
                end_distance: end,
                path: render(&points_between(&track.points, start, end)),
                advantage,
            }
        })
        .collect();

    Ok(TrackDominance {
        circuit_layout,
        segments,
    })
}

/// Per-segment advantages of `reference` over `other` in the default viewport
pub fn compare(
    reference: &LapTelemetry,
    other: &LapTelemetry,
    segment_count: usize,
) -> Result<Vec<SegmentAdvantage>> {
    let options = CompareOptions {
        segment_count,
        ..CompareOptions::default()
    };
    Ok(analyze(reference, other, &options)?.segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Lap, Position, TelemetrySample};
    use crate::units::Seconds;

    /// Lap along the x axis with a slight y drift so positions are not collinear
    fn lap(driver: &str, samples: &[(f64, f64)]) -> LapTelemetry {
        LapTelemetry::new(
            Lap::new(driver, 1, Some(Seconds(90.0))),
            samples
                .iter()
                .map(|&(distance, time)| TelemetrySample {
                    time_offset: time,
                    distance,
                    position: Some(Position::new(distance, (distance / 10.0).sin())),
                })
                .collect(),
        )
    }

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("advantage should be defined");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_two_segment_scenario() {
        let reference = lap("VER", &[(0.0, 0.0), (50.0, 5.0), (100.0, 11.0)]);
        let other = lap("HAM", &[(0.0, 0.0), (50.0, 4.0), (100.0, 9.0)]);

        let segments = compare(&reference, &other, 2).unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!((segments[0].start_distance, segments[0].end_distance), (0.0, 50.0));
        assert_eq!((segments[1].start_distance, segments[1].end_distance), (50.0, 100.0));
        assert_close(segments[0].advantage, -1.0);
        assert_close(segments[1].advantage, -1.0);
    }

    #[test]
    fn test_reference_faster_gives_positive_advantage() {
        let reference = lap("VER", &[(0.0, 100.0), (100.0, 104.0)]);
        let other = lap("HAM", &[(0.0, 200.0), (100.0, 205.0)]);

        let segments = compare(&reference, &other, 4).unwrap();
        for segment in &segments {
            assert_close(segment.advantage, 0.25);
        }
    }

    #[test]
    fn test_segment_count_and_tiling() {
        let samples: Vec<(f64, f64)> = (0..=60).map(|i| (i as f64 * 97.3, i as f64 * 1.41)).collect();
        let reference = lap("VER", &samples);
        let other = lap("LEC", &samples);

        for n in [1, 2, 7, 20, 33] {
            let segments = compare(&reference, &other, n).unwrap();
            assert_eq!(segments.len(), n);
            assert_eq!(segments[0].start_distance, 0.0);
            assert_eq!(segments[n - 1].end_distance, 60.0 * 97.3);
            for (i, segment) in segments.iter().enumerate() {
                assert_eq!(segment.segment_index, i);
                assert!(segment.end_distance > segment.start_distance);
            }
            for pair in segments.windows(2) {
                assert_eq!(pair[0].end_distance, pair[1].start_distance);
            }
        }
    }

    #[test]
    fn test_compare_is_idempotent() {
        let reference = lap("VER", &[(0.0, 0.0), (33.0, 2.1), (71.0, 4.9), (100.0, 7.7)]);
        let other = lap("NOR", &[(0.0, 0.0), (40.0, 2.6), (90.0, 6.1), (104.0, 7.5)]);

        let first = compare(&reference, &other, 5).unwrap();
        let second = compare(&reference, &other, 5).unwrap();
        assert_eq!(first, second);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(
                a.advantage.map(f64::to_bits),
                b.advantage.map(f64::to_bits)
            );
        }
    }

    #[test]
    fn test_segment_outside_both_laps_is_null() {
        // Both laps lost their first 60 m of samples
        let reference = lap("VER", &[(60.0, 6.0), (80.0, 8.0), (100.0, 10.0)]);
        let other = lap("HAM", &[(60.0, 5.0), (80.0, 7.0), (100.0, 9.0)]);

        let segments = compare(&reference, &other, 4).unwrap();
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0].advantage, None);
        assert!(segments[0].path.is_empty());
        // 50-75 overlaps the envelope and is extrapolated down to 50 m
        assert_close(segments[2].advantage, 0.0);
        assert_close(segments[3].advantage, 0.0);
    }

    #[test]
    fn test_other_lap_with_single_sample_degrades_to_null() {
        let reference = lap("VER", &[(0.0, 0.0), (50.0, 5.0), (100.0, 11.0)]);
        let other = lap("HAM", &[(0.0, 0.0)]);

        let segments = compare(&reference, &other, 3).unwrap();
        assert_eq!(segments.len(), 3);
        assert!(segments.iter().all(|s| s.advantage.is_none()));
        assert!(segments.iter().all(|s| !s.path.is_empty()));
    }

    #[test]
    fn test_slight_overshoot_is_extrapolated() {
        let reference = lap("VER", &[(0.0, 0.0), (50.0, 5.0), (100.0, 10.0)]);
        // Other lap's telemetry stops 2 m short of the line
        let other = lap("HAM", &[(0.0, 0.0), (49.0, 4.9), (98.0, 9.8)]);

        let segments = compare(&reference, &other, 2).unwrap();
        assert_close(segments[1].advantage, 0.0);
    }

    #[test]
    fn test_other_lap_dropout_is_extrapolated() {
        let reference = lap("VER", &[(0.0, 0.0), (50.0, 5.0), (100.0, 10.0)]);
        // Other lap's telemetry drops out after 40 m
        let other = lap("HAM", &[(0.0, 0.0), (20.0, 2.0), (40.0, 4.0)]);

        let segments = compare(&reference, &other, 2).unwrap();
        assert_close(segments[0].advantage, 0.0);
        assert_close(segments[1].advantage, 0.0);
    }

    #[test]
    fn test_zero_length_lap_gives_null_segments() {
        let reference = lap("VER", &[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0)]);
        let other = lap("HAM", &[(0.0, 0.0), (50.0, 5.0)]);

        let segments = compare(&reference, &other, 4).unwrap();
        assert_eq!(segments.len(), 4);
        for (i, segment) in segments.iter().enumerate() {
            assert_eq!(segment.segment_index, i);
            assert_eq!((segment.start_distance, segment.end_distance), (0.0, 0.0));
            assert_eq!(segment.advantage, None);
        }
    }

    #[test]
    fn test_overlaps_envelope() {
        let interp = TimeInterpolator::new(&lap("VER", &[(60.0, 6.0), (100.0, 10.0)]));
        assert!(interp.overlaps(50.0, 60.0));
        assert!(interp.overlaps(90.0, 120.0));
        assert!(!interp.overlaps(0.0, 59.0));
        assert!(!interp.overlaps(101.0, 120.0));
        assert_eq!(interp.elapsed(0.0, 50.0), Some(5.0));
    }

    #[test]
    fn test_empty_segment_path_is_still_emitted() {
        let reference = lap("VER", &[(0.0, 0.0), (10.0, 1.0), (100.0, 10.0)]);
        let other = lap("HAM", &[(0.0, 0.0), (100.0, 10.0)]);

        let segments = compare(&reference, &other, 10).unwrap();
        assert_eq!(segments.len(), 10);
        // 20-30 m has no reference samples but still carries an advantage
        assert!(segments[2].path.is_empty());
        assert_close(segments[2].advantage, 0.0);
        // boundary samples belong to both neighbouring segments
        assert!(segments[0].path.as_str().contains(" L "));
        assert!(!segments[1].path.is_empty());
    }

    #[test]
    fn test_zero_segments_is_rejected() {
        let reference = lap("VER", &[(0.0, 0.0), (100.0, 10.0)]);
        let err = compare(&reference, &reference, 0).unwrap_err();
        assert_eq!(err, DominanceError::InvalidSegmentCount);
    }

    #[test]
    fn test_incomplete_telemetry_names_driver() {
        let reference = lap("VER", &[(0.0, 0.0), (100.0, 10.0)]);
        let mut other = lap("HAM", &[(0.0, 0.0), (100.0, 10.0)]);
        for sample in &mut other.samples {
            sample.position = None;
        }

        let err = compare(&reference, &other, 4).unwrap_err();
        assert_eq!(
            err,
            DominanceError::IncompleteTelemetry {
                driver: "HAM".to_string(),
                missing: "position"
            }
        );

        let err = compare(&other, &reference, 4).unwrap_err();
        assert!(matches!(err, DominanceError::IncompleteTelemetry { ref driver, .. } if driver == "HAM"));
    }

    #[test]
    fn test_empty_telemetry_is_rejected() {
        let reference = lap("VER", &[(0.0, 0.0), (100.0, 10.0)]);
        let other = lap("HAM", &[]);
        let err = compare(&reference, &other, 4).unwrap_err();
        assert!(matches!(err, DominanceError::EmptyTelemetry { .. }));
    }

    #[test]
    fn test_analyze_renders_circuit_and_result() {
        let reference = lap("VER", &[(0.0, 0.0), (50.0, 5.0), (100.0, 11.0)]);
        let other = lap("HAM", &[(0.0, 0.0), (50.0, 4.0), (100.0, 9.0)]);

        let dominance = analyze(&reference, &other, &CompareOptions::default()).unwrap();
        assert!(dominance.circuit_layout.as_str().starts_with("M 0.00 "));
        assert_eq!(dominance.circuit_layout.as_str().matches(" L ").count(), 2);
        assert_eq!(dominance.segments.len(), DEFAULT_SEGMENT_COUNT);

        let result = dominance.into_result(
            "#FF0000".parse().unwrap(),
            "#0000FF".parse().unwrap(),
            &reference,
            &other,
        );
        assert_eq!(result.driver1, "VER");
        assert_eq!(result.driver2, "HAM");

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["driver1_color"], "#FF0000");
        assert!(json["circuit_layout"].is_string());
        assert_eq!(json["segments"].as_array().unwrap().len(), DEFAULT_SEGMENT_COUNT);
    }

    #[test]
    fn test_null_advantage_serializes_as_json_null() {
        let reference = lap("VER", &[(0.0, 0.0), (50.0, 5.0), (100.0, 11.0)]);
        let other = lap("HAM", &[(0.0, 0.0)]);
        let segments = compare(&reference, &other, 1).unwrap();
        let json = serde_json::to_value(&segments[0]).unwrap();
        assert!(json["advantage"].is_null());
        assert_eq!(json["segment_index"], 0);
    }

    #[test]
    fn test_interpolator_handles_unsorted_and_duplicate_distances() {
        let telemetry = lap("VER", &[(50.0, 5.0), (0.0, 0.0), (50.0, 5.5), (100.0, 10.0)]);
        let interp = TimeInterpolator::new(&telemetry);
        assert_eq!(interp.range(), Some((0.0, 100.0)));
        assert_eq!(interp.time_at(25.0), Some(2.5));
        assert_eq!(interp.time_at(50.0), Some(5.0));
        assert_eq!(interp.time_at(75.0), Some(7.5));
        // linear extension beyond the envelope
        assert_eq!(interp.time_at(110.0), Some(11.0));
        assert_eq!(interp.time_at(-10.0), Some(-1.0));
    }

    #[test]
    fn test_interpolator_needs_two_knots() {
        let interp = TimeInterpolator::new(&lap("VER", &[(10.0, 1.0)]));
        assert_eq!(interp.time_at(10.0), None);
        assert_eq!(interp.elapsed(0.0, 20.0), None);
    }
}
