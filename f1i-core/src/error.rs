//! Errors raised by lap selection and track dominance comparison
//!
//! Every variant is a not-found condition from the caller's point of view.
//! Per-segment interpolation gaps are not errors; they surface as a `None`
//! advantage on the affected segment.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DominanceError {
    #[error("no valid laps found for driver {driver}")]
    NoValidLap { driver: String },

    #[error("lap {lap_number} not available for driver {driver}")]
    LapNotFound { driver: String, lap_number: u32 },

    #[error("no telemetry data available for {driver}'s lap {lap_number}")]
    EmptyTelemetry { driver: String, lap_number: u32 },

    #[error("required telemetry data missing for {driver}: {missing}")]
    IncompleteTelemetry {
        driver: String,
        missing: &'static str,
    },

    #[error("segment count must be at least 1")]
    InvalidSegmentCount,
}

pub type Result<T, E = DominanceError> = std::result::Result<T, E>;
