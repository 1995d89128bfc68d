//! # Document Loading
//!
//! Reads metadata documents from disk into JSON trees for the decoder.
//! Files ending in `.yaml` or `.yml` are parsed as YAML and converted to
//! JSON; everything else is parsed as JSON.
//!
//! Both parsers bound nesting depth (128 levels), which also bounds the
//! claim trees a loaded document can contain.

use std::path::Path;

use serde_json::Value;

use crate::error::SchemaError;

/// Input syntax of a metadata document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick the syntax from the file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

/// Parse document text in the given syntax.
///
/// # Errors
///
/// Returns `SchemaError::DocumentLoadError` if the text does not parse.
pub fn parse_document(text: &str, format: DocumentFormat) -> Result<Value, SchemaError> {
    let failed = |reason: String| SchemaError::DocumentLoadError {
        path: "<inline>".into(),
        reason,
    };
    match format {
        DocumentFormat::Json => serde_json::from_str(text).map_err(|e| failed(e.to_string())),
        DocumentFormat::Yaml => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(text).map_err(|e| failed(format!("YAML parse error: {e}")))?;
            yaml_to_json(&yaml).map_err(failed)
        }
    }
}

/// Load a document file, choosing the parser from its extension.
///
/// # Errors
///
/// Returns `SchemaError::DocumentLoadError` naming the file if it cannot be
/// read or parsed.
pub fn load_document(path: &Path) -> Result<Value, SchemaError> {
    let text = std::fs::read_to_string(path).map_err(|e| SchemaError::DocumentLoadError {
        path: path.display().to_string(),
        reason: format!("cannot read file: {e}"),
    })?;
    let format = DocumentFormat::from_path(path);
    tracing::debug!(path = %path.display(), ?format, bytes = text.len(), "loading document");
    parse_document(&text, format).map_err(|e| match e {
        SchemaError::DocumentLoadError { reason, .. } => SchemaError::DocumentLoadError {
            path: path.display().to_string(),
            reason,
        },
        other => other,
    })
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Scalar keys are stringified; tags are dropped. Floats that JSON cannot
/// represent are rejected.
fn yaml_to_json(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut members = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key: {other:?}")),
                };
                members.insert(key, yaml_to_json(v)?);
            }
            Ok(Value::Object(members))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}
