//! F1 Insight Server Library
//!
//! Exposes server components for integration testing.

pub mod api;
pub mod config;
pub mod error;
pub mod state;
