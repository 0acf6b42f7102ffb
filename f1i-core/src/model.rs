//! Lap and telemetry data model
//!
//! Providers hand out [`Lap`] records and [`RawSample`] rows. Optional fields
//! are `Option<T>` because not every upstream feed carries every channel.
//! [`crate::normalize::add_distance`] turns raw rows into distance-indexed
//! [`TelemetrySample`]s, the only representation the comparator accepts.
//!
//! Coordinate system: world X/Y as reported by the timing feed, arbitrary
//! units that are consistent within one session.

use crate::path::PathDescriptor;
use crate::units::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while parsing request identifiers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown session type '{0}' (expected R, Q, S, SQ, FP1, FP2 or FP3)")]
    SessionKind(String),

    #[error("event identifier must not be empty")]
    EmptyEvent,

    #[error("invalid lap identifier '{0}' (expected 'fastest' or a lap number)")]
    LapSelection(String),

    #[error("invalid color '{0}' (expected #RGB or #RRGGBB)")]
    Color(String),
}

// === Session addressing ===

/// Session type within a race weekend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionKind {
    Practice1,
    Practice2,
    Practice3,
    SprintQualifying,
    Sprint,
    Qualifying,
    Race,
}

impl SessionKind {
    /// Short code used by the timing feed and in URLs
    pub fn code(&self) -> &'static str {
        match self {
            SessionKind::Practice1 => "FP1",
            SessionKind::Practice2 => "FP2",
            SessionKind::Practice3 => "FP3",
            SessionKind::SprintQualifying => "SQ",
            SessionKind::Sprint => "S",
            SessionKind::Qualifying => "Q",
            SessionKind::Race => "R",
        }
    }
}

impl FromStr for SessionKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "FP1" => Ok(SessionKind::Practice1),
            "FP2" => Ok(SessionKind::Practice2),
            "FP3" => Ok(SessionKind::Practice3),
            "SQ" => Ok(SessionKind::SprintQualifying),
            "S" => Ok(SessionKind::Sprint),
            "Q" => Ok(SessionKind::Qualifying),
            "R" => Ok(SessionKind::Race),
            _ => Err(ParseError::SessionKind(s.to_string())),
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Event identifier: a championship round number or an event name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventId {
    Round(u32),
    Name(String),
}

impl EventId {
    /// Filesystem and cache friendly form: the round number, or the
    /// lower-cased name with runs of non-alphanumerics collapsed to `_`
    pub fn slug(&self) -> String {
        match self {
            EventId::Round(round) => round.to_string(),
            EventId::Name(name) => {
                let mut slug = String::with_capacity(name.len());
                for c in name.trim().chars() {
                    if c.is_alphanumeric() {
                        slug.extend(c.to_lowercase());
                    } else if !slug.ends_with('_') {
                        slug.push('_');
                    }
                }
                slug.trim_matches('_').to_string()
            }
        }
    }
}

impl FromStr for EventId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::EmptyEvent);
        }
        match s.parse::<u32>() {
            Ok(round) => Ok(EventId::Round(round)),
            Err(_) => Ok(EventId::Name(s.to_string())),
        }
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventId::Round(round) => write!(f, "{}", round),
            EventId::Name(name) => f.write_str(name),
        }
    }
}

/// Identifies one session of one event in one season
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub year: u16,
    pub event: EventId,
    pub session: SessionKind,
}

impl SessionKey {
    pub fn new(year: u16, event: EventId, session: SessionKind) -> Self {
        Self {
            year,
            event,
            session,
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.year, self.event, self.session)
    }
}

// === Laps and telemetry ===

/// One traversal of the circuit by one driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lap {
    /// Driver abbreviation (e.g. "VER")
    pub driver: String,

    pub lap_number: u32,

    /// Total elapsed lap time; absent for laps without a valid timing
    /// (out-laps, in-laps, laps interrupted by a red flag)
    pub lap_time: Option<Seconds>,
}

impl Lap {
    pub fn new(driver: impl Into<String>, lap_number: u32, lap_time: Option<Seconds>) -> Self {
        Self {
            driver: driver.into(),
            lap_number,
            lap_time,
        }
    }

    /// Lap time in seconds if present and finite
    pub fn valid_lap_time(&self) -> Option<f64> {
        self.lap_time.map(|t| t.0).filter(|t| t.is_finite())
    }
}

/// One telemetry row as delivered by a provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Session time in seconds
    pub time: f64,

    /// Distance from the lap start in meters, when the feed computes it
    pub distance: Option<f64>,

    /// World position
    pub x: Option<f64>,
    pub y: Option<f64>,

    /// Speed in km/h
    pub speed: Option<f64>,

    pub rpm: Option<u32>,

    /// Current gear (0 = neutral)
    pub n_gear: Option<i8>,

    /// Throttle position (0-100%)
    pub throttle: Option<f64>,

    pub brake: Option<bool>,

    /// DRS status code as reported by the timing feed (0 = closed)
    pub drs: Option<u8>,
}

impl RawSample {
    pub fn position(&self) -> Option<Position> {
        match (self.x, self.y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some(Position { x, y }),
            _ => None,
        }
    }

    pub fn speed(&self) -> Option<KilometersPerHour> {
        self.speed.filter(|s| s.is_finite()).map(KilometersPerHour)
    }
}

/// 2D world position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Distance-indexed telemetry sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Seconds since session start
    pub time_offset: f64,

    /// Meters from the lap start, non-decreasing along a lap
    pub distance: f64,

    /// World position, absent when the feed dropped the position channel
    pub position: Option<Position>,
}

/// A lap together with its distance-augmented telemetry
#[derive(Debug, Clone, PartialEq)]
pub struct LapTelemetry {
    pub lap: Lap,
    pub samples: Vec<TelemetrySample>,
}

impl LapTelemetry {
    pub fn new(lap: Lap, samples: Vec<TelemetrySample>) -> Self {
        Self { lap, samples }
    }

    pub fn driver(&self) -> &str {
        &self.lap.driver
    }

    /// Largest recorded distance, or `None` without finite distances
    pub fn max_distance(&self) -> Option<f64> {
        self.samples
            .iter()
            .map(|s| s.distance)
            .filter(|d| d.is_finite())
            .max_by(f64::total_cmp)
    }
}

/// A position rescaled into drawing-viewport units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    /// Distance of the originating sample, used for segment membership
    pub distance: f64,
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    pub fn new(distance: f64, x: f64, y: f64) -> Self {
        Self { distance, x, y }
    }
}

// === Comparison output ===

/// Hex display color for a driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverColor(String);

impl DriverColor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for DriverColor {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let valid = s
            .strip_prefix('#')
            .map(|hex| {
                (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
            })
            .unwrap_or(false);

        if valid {
            Ok(DriverColor(s.to_uppercase()))
        } else {
            Err(ParseError::Color(s.to_string()))
        }
    }
}

/// Per-segment comparison between the reference driver and the other driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentAdvantage {
    /// 0-based, in equal-distance partition order
    pub segment_index: usize,

    pub start_distance: f64,

    pub end_distance: f64,

    /// Reference lap path through this segment
    pub path: PathDescriptor,

    /// Signed seconds; positive when the reference driver (driver 1) was
    /// faster across the segment. `None` when either lap's time could not be
    /// interpolated at both boundaries.
    pub advantage: Option<f64>,
}

/// Track dominance comparison between two drivers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub driver1: String,
    pub driver2: String,
    pub driver1_color: DriverColor,
    pub driver2_color: DriverColor,

    /// Full reference lap path
    pub circuit_layout: PathDescriptor,

    pub segments: Vec<SegmentAdvantage>,
}
