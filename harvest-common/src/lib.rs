//! Common types and utilities shared across Harvest crates.
//!
//! The shared error type, logging setup and the JSON layout every output
//! file uses. Every other crate in the workspace depends on it.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`json`]: Pretty JSON persistence matching the run's output format
//! - [`HarvestError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use harvest_common::HarvestError;
//! use std::path::PathBuf;
//!
//! let err = HarvestError::ArchiveNotFound(PathBuf::from("resources"));
//! assert!(err.is_missing_input());
//! assert_eq!(err.to_string(), "No zip archive found in resources");
//! ```
use std::path::PathBuf;

pub mod json;
pub mod observability;

/// Error types used across the Harvest pipeline.
#[derive(thiserror::Error, Debug)]
pub enum HarvestError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The configuration file exists but could not be parsed.
    #[error("Malformed configuration in {}: {message}", path.display())]
    ConfigMalformed { path: PathBuf, message: String },

    /// The resources directory holds no zip archive.
    #[error("No zip archive found in {}", .0.display())]
    ArchiveNotFound(PathBuf),

    /// The archive could not be opened or unpacked.
    #[error("Archive error: {0}")]
    Archive(String),

    /// No CSV file qualified as the URL export.
    #[error("No target CSV file found in {}", .0.display())]
    CsvNotFound(PathBuf),

    /// The CSV export lacks the expected column.
    #[error("Column '{column}' not found in {}", path.display())]
    MissingColumn { column: String, path: PathBuf },

    /// The CSV export could not be read.
    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The remote prediction call failed.
    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HarvestError {
    /// True for the "input not provided yet" family: the run stops early
    /// with a message instead of failing hard.
    pub fn is_missing_input(&self) -> bool {
        matches!(
            self,
            HarvestError::ArchiveNotFound(_) | HarvestError::CsvNotFound(_)
        )
    }
}

/// Convenient alias for results that use [`HarvestError`].
pub type Result<T> = std::result::Result<T, HarvestError>;
