//! F1 Insight Core Library
//!
//! This crate provides the lap and telemetry data model, the session provider
//! trait, and the track dominance comparison: lap selection, telemetry
//! normalization, per-segment time comparison and SVG path rendering.

pub mod dominance;
pub mod error;
pub mod model;
pub mod normalize;
pub mod path;
pub mod provider;
pub mod selector;
pub mod stats;
pub mod units;

pub use dominance::{analyze, compare, CompareOptions, TrackDominance};
pub use error::DominanceError;
pub use model::{ComparisonResult, Lap, LapTelemetry, RawSample, SessionKey};
pub use provider::{ProviderError, SessionProvider};
pub use selector::{select, LapSelection};
