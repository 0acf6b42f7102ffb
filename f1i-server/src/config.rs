//! Command line and environment configuration

use anyhow::{bail, Result};
use clap::Parser;
use f1i_core::dominance::{CompareOptions, DEFAULT_SEGMENT_COUNT};
use f1i_core::normalize::Viewport;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "F1 Insight track dominance API", long_about = None)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "F1I_BIND", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// Directory of exported sessions laid out as <year>/<event>/<SESSION>.json.
    /// Defaults to f1-insight/archive under the local data directory when that
    /// exists; demo data is served otherwise.
    #[arg(long, env = "F1I_ARCHIVE_DIR")]
    pub archive_dir: Option<PathBuf>,

    /// Allowed CORS origin (repeatable); any origin when none are given
    #[arg(long = "cors-origin", env = "F1I_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Default number of track segments for dominance comparisons
    #[arg(long, env = "F1I_SEGMENTS", default_value_t = DEFAULT_SEGMENT_COUNT)]
    pub segments: usize,

    #[arg(long, default_value_t = 800.0)]
    pub viewport_width: f64,

    #[arg(long, default_value_t = 600.0)]
    pub viewport_height: f64,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "F1I_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Validated runtime configuration shared with request handlers
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub archive_dir: Option<PathBuf>,
    pub cors_origins: Vec<String>,
    pub compare: CompareOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
            archive_dir: None,
            cors_origins: Vec::new(),
            compare: CompareOptions::default(),
        }
    }
}

/// Conventional archive location, if the platform has a local data directory
pub fn default_archive_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("f1-insight").join("archive"))
}

impl Cli {
    pub fn into_config(self) -> Result<ServerConfig> {
        if self.segments == 0 {
            bail!("--segments must be at least 1");
        }
        for (name, value) in [
            ("--viewport-width", self.viewport_width),
            ("--viewport-height", self.viewport_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                bail!("{} must be a positive number, got {}", name, value);
            }
        }

        let archive_dir = self
            .archive_dir
            .or_else(|| default_archive_dir().filter(|dir| dir.is_dir()));

        let cors_origins = self
            .cors_origins
            .into_iter()
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(ServerConfig {
            bind: self.bind,
            archive_dir,
            cors_origins,
            compare: CompareOptions {
                segment_count: self.segments,
                viewport: Viewport::new(self.viewport_width, self.viewport_height),
            },
        })
    }
}
