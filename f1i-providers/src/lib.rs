//! Session data providers for F1 Insight

pub mod archive;
pub mod demo;

pub use archive::ArchiveProvider;
pub use demo::DemoProvider;
