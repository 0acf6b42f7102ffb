//! Type-safe wrappers for physical units
//!
//! Provider records carry these newtypes so a lap time can never be mistaken
//! for a speed. Past the ingestion edge the core works on plain `f64`
//! seconds and meters.

use serde::{Deserialize, Serialize};

/// Seconds (session timestamps, lap times)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Seconds(pub f64);

/// Kilometers per hour
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct KilometersPerHour(pub f64);

impl KilometersPerHour {
    pub fn to_meters_per_second(self) -> f64 {
        self.0 / 3.6
    }
}
