//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout the metadata engine. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Decode errors are path-qualified and accumulated: a failed decode
//!   returns every defect in the document, never just the first.
//! - Encode errors fail fast with a single invariant violation, because
//!   partial canonical output must never reach a hashing or signing step.
//! - Canonicalization errors carry the offending value.

use std::fmt;

use thiserror::Error;

use crate::path::FieldPath;

/// Top-level error type for the metadata engine.
#[derive(Error, Debug)]
pub enum CimError {
    /// The document failed validation.
    #[error("decode failed:\n{0}")]
    Decode(#[from] DecodeErrors),

    /// A typed structure could not be encoded.
    #[error("encode failed: {0}")]
    Encode(#[from] EncodeError),

    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// An issuer identifier could not be turned into a metadata URL.
    #[error("invalid issuer identifier '{issuer}': {reason}")]
    InvalidIssuer {
        /// The identifier that was rejected.
        issuer: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Classification of a single field-level decode error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// A required field is absent or `null`.
    MissingRequired,

    /// A field is present with the wrong JSON shape.
    TypeMismatch {
        /// Shape the schema expects (e.g. `"array of string"`).
        expected: String,
        /// Shape that was found (e.g. `"number"`).
        actual: String,
    },

    /// Two entries of one display sequence share a locale.
    /// `None` means both entries omit the locale.
    DuplicateLocale {
        /// The repeated locale.
        locale: Option<String>,
    },

    /// A `credentialSubject` value is neither a nested definition, an
    /// array of definitions, nor a claim leaf object.
    UnrecognizedClaimShape {
        /// JSON shape that was found.
        actual: String,
    },

    /// An endpoint URL does not use the https scheme.
    InvalidUrlScheme {
        /// The scheme that was found.
        scheme: String,
    },

    /// An endpoint value is not an absolute URL at all.
    MalformedUrl {
        /// Parser diagnostic.
        reason: String,
    },

    /// A value repeats inside a field with set semantics.
    DuplicateEntry {
        /// The repeated value.
        value: String,
    },

    /// A member not declared by the schema, reported only when
    /// unknown-field rejection is enabled.
    UnknownField,
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequired => f.write_str("required field is missing"),
            Self::TypeMismatch { expected, actual } => {
                write!(f, "expected {expected}, found {actual}")
            }
            Self::DuplicateLocale { locale: Some(l) } => {
                write!(f, "more than one display entry for locale '{l}'")
            }
            Self::DuplicateLocale { locale: None } => {
                f.write_str("more than one display entry without a locale")
            }
            Self::UnrecognizedClaimShape { actual } => write!(
                f,
                "claim value must be a credential definition, an array of definitions, or a claim object; found {actual}"
            ),
            Self::InvalidUrlScheme { scheme } => {
                write!(f, "URL must use the https scheme, found '{scheme}'")
            }
            Self::MalformedUrl { reason } => write!(f, "not a valid URL: {reason}"),
            Self::DuplicateEntry { value } => write!(f, "duplicate entry '{value}'"),
            Self::UnknownField => f.write_str("field is not defined by the schema"),
        }
    }
}

/// A single decode error with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Path from the document root to the offending field.
    pub path: FieldPath,
    /// What is wrong with it.
    pub kind: FieldErrorKind,
}

impl FieldError {
    /// Construct a new field error.
    pub fn new(path: FieldPath, kind: FieldErrorKind) -> Self {
        Self { path, kind }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

/// Non-empty, ordered collection of decode errors.
///
/// Errors appear in document traversal order. A decoder returns this type
/// only when at least one error was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeErrors {
    errors: Vec<FieldError>,
}

impl DecodeErrors {
    /// Wrap a list of errors. Returns `None` for an empty list so that an
    /// empty `DecodeErrors` can never be observed.
    pub fn from_vec(errors: Vec<FieldError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    /// A list holding exactly one error.
    pub fn single(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// Returns the number of errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns a slice of all errors.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Iterate over the errors.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<FieldError> {
        self.errors
    }
}

impl fmt::Display for DecodeErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for DecodeErrors {}

impl<'a> IntoIterator for &'a DecodeErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Error while encoding a typed structure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The structure breaks an invariant the decoder would have enforced.
    #[error("invariant violation at {path}: {reason}")]
    InvariantViolation {
        /// Location of the violating field.
        path: FieldPath,
        /// Description of the broken invariant.
        reason: String,
    },
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Canonical documents never carry `null` placeholders.
    #[error("null is not permitted in canonical metadata (at {0})")]
    NullRejected(FieldPath),

    /// Non-integer numbers have JCS serialization edge cases and never
    /// appear in issuer metadata.
    #[error("float values are not permitted in canonical metadata: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_error_list_is_not_constructible() {
        assert!(DecodeErrors::from_vec(Vec::new()).is_none());
    }

    #[test]
    fn test_decode_errors_display_lists_every_error() {
        let errors = DecodeErrors::from_vec(vec![
            FieldError::new(
                FieldPath::root().key("credential_issuer"),
                FieldErrorKind::MissingRequired,
            ),
            FieldError::new(
                FieldPath::root().key("display").index(1),
                FieldErrorKind::DuplicateLocale {
                    locale: Some("en".into()),
                },
            ),
        ])
        .unwrap();
        let text = errors.to_string();
        assert!(text.contains("credential_issuer: required field is missing"));
        assert!(text.contains("display[1]: more than one display entry for locale 'en'"));
        assert_eq!(errors.len(), 2);
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_field_error_display_root() {
        let e = FieldError::new(
            FieldPath::root(),
            FieldErrorKind::TypeMismatch {
                expected: "object".into(),
                actual: "array".into(),
            },
        );
        assert_eq!(e.to_string(), "(root): expected object, found array");
    }

    #[test]
    fn test_cim_error_from_encode_error() {
        let err: CimError = EncodeError::InvariantViolation {
            path: FieldPath::root().key("credentials_supported"),
            reason: "bad".into(),
        }
        .into();
        assert!(err.to_string().contains("credentials_supported"));
    }
}
