//! # Codec Options
//!
//! Policy switches shared by the decoder and the encoder. Options can be
//! built in code or loaded from a YAML file:
//!
//! ```yaml
//! enforce_https: true
//! reject_unknown_fields: false
//! ```
//!
//! Missing keys take their defaults; unknown keys are rejected so that a
//! misspelled switch does not silently fall back to the default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Decoder and encoder policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecOptions {
    /// Require `https` URLs for the issuer identifier and every endpoint.
    /// Default: `true`.
    pub enforce_https: bool,
    /// Report members the schema does not declare as `UnknownField`
    /// errors instead of ignoring them. Default: `false`.
    pub reject_unknown_fields: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            enforce_https: true,
            reject_unknown_fields: false,
        }
    }
}

impl CodecOptions {
    /// Options with https enforcement disabled, for test and development
    /// issuers served over plain http.
    pub fn permissive() -> Self {
        Self {
            enforce_https: false,
            ..Self::default()
        }
    }

    /// Options that reject anything the schema does not declare.
    pub fn strict() -> Self {
        Self {
            enforce_https: true,
            reject_unknown_fields: true,
        }
    }

    /// Parse options from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ConfigLoadError` if the text is not valid YAML
    /// or names an unknown option.
    pub fn from_yaml_str(text: &str) -> Result<Self, SchemaError> {
        // An empty file is a valid configuration meaning "all defaults".
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| SchemaError::ConfigLoadError {
            path: "<inline>".into(),
            reason: e.to_string(),
        })
    }

    /// Load options from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ConfigLoadError` if the file cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path).map_err(|e| SchemaError::ConfigLoadError {
            path: path.display().to_string(),
            reason: format!("cannot read file: {e}"),
        })?;
        Self::from_yaml_str(&text).map_err(|e| match e {
            SchemaError::ConfigLoadError { reason, .. } => SchemaError::ConfigLoadError {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }
}
