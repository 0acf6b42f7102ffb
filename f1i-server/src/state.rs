//! Application state management

use crate::config::ServerConfig;
use f1i_core::provider::SessionProvider;
use f1i_providers::{ArchiveProvider, DemoProvider};
use std::sync::Arc;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Upstream session data source
    pub provider: Arc<dyn SessionProvider>,

    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(provider: Arc<dyn SessionProvider>, config: ServerConfig) -> Self {
        Self {
            provider,
            config: Arc::new(config),
        }
    }

    /// State backed by the provider the configuration selects
    pub fn from_config(config: ServerConfig) -> Self {
        let provider: Arc<dyn SessionProvider> = match &config.archive_dir {
            Some(dir) => {
                let archive = ArchiveProvider::new(dir.clone());
                info!("Serving sessions from {}", archive.root().display());
                Arc::new(archive)
            }
            None => Arc::new(DemoProvider::new()),
        };
        info!("Using {} session provider", provider.name());
        Self::new(provider, config)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(ServerConfig::default())
    }
}
