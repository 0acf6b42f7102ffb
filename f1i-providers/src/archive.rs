//! Provider backed by a directory of exported session files
//!
//! Layout: `<root>/<year>/<event-slug>/<SESSION>.json`, e.g.
//! `archive/2024/monza/Q.json`. Each file holds every driver's laps:
//!
//! ```json
//! {
//!   "drivers": {
//!     "VER": [
//!       { "lap_number": 1, "lap_time": null, "telemetry": [ { "time": 0.0, "x": 1.0, ... } ] }
//!     ]
//!   }
//! }
//! ```

use anyhow::Context;
use f1i_core::model::{Lap, RawSample, SessionKey};
use f1i_core::provider::{ProviderError, SessionProvider};
use f1i_core::units::Seconds;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct SessionFile {
    drivers: HashMap<String, Vec<ArchivedLap>>,
}

#[derive(Debug, Deserialize)]
struct ArchivedLap {
    lap_number: u32,
    #[serde(default)]
    lap_time: Option<f64>,
    #[serde(default)]
    telemetry: Vec<RawSample>,
}

impl SessionFile {
    fn driver_laps(&self, driver: &str) -> Option<&[ArchivedLap]> {
        self.drivers
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(driver))
            .map(|(_, laps)| laps.as_slice())
    }
}

/// Reads sessions from JSON exports on disk
///
/// Files are parsed on every call; the archive is expected to be small or
/// served from the OS page cache.
pub struct ArchiveProvider {
    root: PathBuf,
}

impl ArchiveProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the export for `session`, whether or not it exists
    pub fn session_path(&self, session: &SessionKey) -> PathBuf {
        self.root
            .join(session.year.to_string())
            .join(session.event.slug())
            .join(format!("{}.json", session.session.code()))
    }

    fn load(&self, session: &SessionKey) -> Result<SessionFile, ProviderError> {
        let path = self.session_path(session);
        if !path.is_file() {
            return Err(ProviderError::SessionNotFound(session.clone()));
        }

        debug!("Loading session {} from {}", session, path.display());
        let file = File::open(&path)
            .with_context(|| format!("Failed to open session file: {}", path.display()))?;
        let parsed = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse session file: {}", path.display()))?;
        Ok(parsed)
    }
}

impl SessionProvider for ArchiveProvider {
    fn name(&self) -> &str {
        "Archive"
    }

    fn drivers(&self, session: &SessionKey) -> Result<Vec<String>, ProviderError> {
        let file = self.load(session)?;
        let mut drivers: Vec<String> = file
            .drivers
            .keys()
            .map(|code| code.to_uppercase())
            .collect();
        drivers.sort();
        Ok(drivers)
    }

    fn laps(&self, session: &SessionKey, driver: &str) -> Result<Vec<Lap>, ProviderError> {
        let file = self.load(session)?;
        let laps = file
            .driver_laps(driver)
            .unwrap_or_default()
            .iter()
            .map(|l| Lap::new(driver.to_uppercase(), l.lap_number, l.lap_time.map(Seconds)))
            .collect();
        Ok(laps)
    }

    fn telemetry(&self, session: &SessionKey, lap: &Lap) -> Result<Vec<RawSample>, ProviderError> {
        let file = self.load(session)?;
        let samples = file
            .driver_laps(&lap.driver)
            .unwrap_or_default()
            .iter()
            .find(|l| l.lap_number == lap.lap_number)
            .map(|l| l.telemetry.clone())
            .unwrap_or_default();
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use f1i_core::model::{EventId, SessionKind};

    #[test]
    fn test_session_path_layout() {
        let provider = ArchiveProvider::new("/data");
        let key = SessionKey::new(
            2024,
            EventId::Name("Emilia Romagna".to_string()),
            SessionKind::Practice2,
        );
        let expected = PathBuf::from("/data")
            .join("2024")
            .join(EventId::Name("Emilia Romagna".to_string()).slug())
            .join("FP2.json");
        assert_eq!(provider.session_path(&key), expected);
        assert_eq!(provider.root(), Path::new("/data"));
    }

    #[test]
    fn test_session_file_driver_lookup_ignores_case() {
        let file: SessionFile = serde_json::from_str(
            r#"{"drivers": {"VER": [{"lap_number": 3, "lap_time": 80.5}]}}"#,
        )
        .unwrap();
        let laps = file.driver_laps("ver").unwrap();
        assert_eq!(laps[0].lap_number, 3);
        assert!(laps[0].telemetry.is_empty());
        assert!(file.driver_laps("HAM").is_none());
    }
}
