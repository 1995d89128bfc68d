//! # Loading Errors
//!
//! Errors raised before decoding starts: reading configuration files and
//! turning document files into JSON trees.

use thiserror::Error;

/// Error while loading configuration or a document from disk.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The codec options file could not be loaded or parsed.
    #[error("config load error for '{path}': {reason}")]
    ConfigLoadError {
        /// Path to the configuration file.
        path: String,
        /// Reason the configuration could not be loaded.
        reason: String,
    },

    /// The document file could not be loaded or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoadError {
        /// Path to the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// IO error reading a file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
