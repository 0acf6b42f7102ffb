//! Lap selection policies

use crate::error::{DominanceError, Result};
use crate::model::{Lap, ParseError};
use std::fmt;
use std::str::FromStr;

/// Which lap of a driver to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LapSelection {
    /// Minimum valid lap time, ties broken by the lowest lap number
    #[default]
    Fastest,
    /// A specific lap number
    Explicit(u32),
}

impl FromStr for LapSelection {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("fastest") {
            return Ok(LapSelection::Fastest);
        }
        s.parse::<u32>()
            .map(LapSelection::Explicit)
            .map_err(|_| ParseError::LapSelection(s.to_string()))
    }
}

impl fmt::Display for LapSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LapSelection::Fastest => f.write_str("fastest"),
            LapSelection::Explicit(n) => write!(f, "{}", n),
        }
    }
}

/// Pick exactly one lap of `driver` according to `policy`
///
/// Laps without a valid lap time are never returned: `Fastest` skips them
/// and an explicitly requested lap without one is reported as not found.
pub fn select<'a>(driver: &str, laps: &'a [Lap], policy: LapSelection) -> Result<&'a Lap> {
    match policy {
        LapSelection::Fastest => laps
            .iter()
            .filter_map(|lap| lap.valid_lap_time().map(|t| (t, lap)))
            .min_by(|(ta, a), (tb, b)| ta.total_cmp(tb).then(a.lap_number.cmp(&b.lap_number)))
            .map(|(_, lap)| lap)
            .ok_or_else(|| DominanceError::NoValidLap {
                driver: driver.to_string(),
            }),
        LapSelection::Explicit(lap_number) => laps
            .iter()
            .find(|lap| lap.lap_number == lap_number)
            .filter(|lap| lap.valid_lap_time().is_some())
            .ok_or_else(|| DominanceError::LapNotFound {
                driver: driver.to_string(),
                lap_number,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Seconds;

    fn laps(times: &[Option<f64>]) -> Vec<Lap> {
        times
            .iter()
            .enumerate()
            .map(|(i, t)| Lap::new("LEC", i as u32 + 1, t.map(Seconds)))
            .collect()
    }

    #[test]
    fn test_fastest_skips_missing_lap_time() {
        let laps = laps(&[Some(91.2), None, Some(89.8)]);
        let lap = select("LEC", &laps, LapSelection::Fastest).unwrap();
        assert_eq!(lap.lap_number, 3);
        assert_eq!(lap.valid_lap_time(), Some(89.8));
    }

    #[test]
    fn test_fastest_ties_broken_by_lowest_lap_number() {
        let mut laps = laps(&[Some(90.0), Some(89.5), Some(89.5)]);
        laps.reverse();
        let lap = select("LEC", &laps, LapSelection::Fastest).unwrap();
        assert_eq!(lap.lap_number, 2);
    }

    #[test]
    fn test_fastest_ignores_nan_lap_time() {
        let laps = laps(&[Some(f64::NAN), Some(95.0)]);
        let lap = select("LEC", &laps, LapSelection::Fastest).unwrap();
        assert_eq!(lap.lap_number, 2);
    }

    #[test]
    fn test_fastest_without_valid_laps() {
        let laps = laps(&[None, None]);
        let err = select("LEC", &laps, LapSelection::Fastest).unwrap_err();
        assert_eq!(
            err,
            DominanceError::NoValidLap {
                driver: "LEC".to_string()
            }
        );

        let err = select("LEC", &[], LapSelection::Fastest).unwrap_err();
        assert!(matches!(err, DominanceError::NoValidLap { .. }));
    }

    #[test]
    fn test_explicit_returns_first_match() {
        let mut laps = laps(&[Some(92.0), Some(90.1)]);
        laps.push(Lap::new("LEC", 2, Some(Seconds(99.0))));
        let lap = select("LEC", &laps, LapSelection::Explicit(2)).unwrap();
        assert_eq!(lap.valid_lap_time(), Some(90.1));
    }

    #[test]
    fn test_explicit_missing_lap() {
        let laps = laps(&[Some(92.0)]);
        let err = select("LEC", &laps, LapSelection::Explicit(9)).unwrap_err();
        assert_eq!(
            err,
            DominanceError::LapNotFound {
                driver: "LEC".to_string(),
                lap_number: 9
            }
        );
    }

    #[test]
    fn test_explicit_lap_without_time_is_not_selectable() {
        let laps = laps(&[None, Some(90.0)]);
        let err = select("LEC", &laps, LapSelection::Explicit(1)).unwrap_err();
        assert!(matches!(err, DominanceError::LapNotFound { lap_number: 1, .. }));
    }

    #[test]
    fn test_lap_selection_parse() {
        assert_eq!("fastest".parse::<LapSelection>().unwrap(), LapSelection::Fastest);
        assert_eq!("FASTEST".parse::<LapSelection>().unwrap(), LapSelection::Fastest);
        assert_eq!("14".parse::<LapSelection>().unwrap(), LapSelection::Explicit(14));
        assert_eq!(
            "slowest".parse::<LapSelection>().unwrap_err(),
            ParseError::LapSelection("slowest".to_string())
        );
        assert!("-3".parse::<LapSelection>().is_err());
    }
}
