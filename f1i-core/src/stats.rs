//! Summary statistics for a single lap's telemetry

use crate::model::RawSample;
use serde::{Deserialize, Serialize};

/// Per-lap channel summaries; a field is `None` when its channel is absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LapStatistics {
    /// km/h
    pub max_speed: Option<f64>,
    pub avg_speed: Option<f64>,
    pub max_rpm: Option<u32>,
    pub avg_rpm: Option<f64>,
    /// Mean throttle position (0-100%)
    pub throttle_percentage: Option<f64>,
    /// Share of samples with the brake applied (0-100%)
    pub brake_percentage: Option<f64>,
    /// Share of samples with DRS open (0-100%)
    pub drs_percentage: Option<f64>,
    pub gear_changes: Option<u32>,
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn share(flags: &[bool]) -> Option<f64> {
    if flags.is_empty() {
        None
    } else {
        Some(flags.iter().filter(|&&f| f).count() as f64 / flags.len() as f64 * 100.0)
    }
}

impl LapStatistics {
    pub fn from_samples(samples: &[RawSample]) -> Self {
        let speeds: Vec<f64> = samples
            .iter()
            .filter_map(|s| s.speed)
            .filter(|v| v.is_finite())
            .collect();
        let rpms: Vec<u32> = samples.iter().filter_map(|s| s.rpm).collect();
        let throttles: Vec<f64> = samples
            .iter()
            .filter_map(|s| s.throttle)
            .filter(|v| v.is_finite())
            .collect();
        let brakes: Vec<bool> = samples.iter().filter_map(|s| s.brake).collect();
        let drs: Vec<bool> = samples.iter().filter_map(|s| s.drs).map(|d| d > 0).collect();
        let gears: Vec<i8> = samples.iter().filter_map(|s| s.n_gear).collect();

        let rpm_values: Vec<f64> = rpms.iter().map(|&r| r as f64).collect();

        Self {
            max_speed: speeds.iter().copied().max_by(f64::total_cmp),
            avg_speed: mean(&speeds),
            max_rpm: rpms.iter().copied().max(),
            avg_rpm: mean(&rpm_values),
            throttle_percentage: mean(&throttles),
            brake_percentage: share(&brakes),
            drs_percentage: share(&drs),
            gear_changes: (!gears.is_empty())
                .then(|| gears.windows(2).filter(|w| w[0] != w[1]).count() as u32),
        }
    }
}
