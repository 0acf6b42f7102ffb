//! Session telemetry provider trait definition

use crate::model::{Lap, RawSample, SessionKey};
use thiserror::Error;

/// Errors surfaced by a [`SessionProvider`]
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("session {0} not found")]
    SessionNotFound(SessionKey),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Trait for upstream session data sources
///
/// Each provider is responsible for:
/// - Resolving a session key to its lap table
/// - Returning the raw telemetry of a single lap
///
/// Calls may block on network or disk I/O. Providers own any caching or retry
/// policy; callers treat every call as fresh.
pub trait SessionProvider: Send + Sync {
    /// Get the name of this provider (e.g., "Demo", "Archive")
    fn name(&self) -> &str;

    /// Abbreviations of the drivers who took part in the session
    fn drivers(&self, session: &SessionKey) -> Result<Vec<String>, ProviderError>;

    /// All laps driven by `driver` in the session, in lap order
    ///
    /// An unknown driver yields an empty list rather than an error.
    fn laps(&self, session: &SessionKey, driver: &str) -> Result<Vec<Lap>, ProviderError>;

    /// Telemetry rows for one lap, ordered by session time
    fn telemetry(&self, session: &SessionKey, lap: &Lap) -> Result<Vec<RawSample>, ProviderError>;
}
