//! # Canonical Encoder
//!
//! Turns a typed [`IssuerMetadata`] into its canonical JSON tree, and from
//! there into RFC 8785 bytes and a SHA-256 content digest.
//!
//! ## Canonical Form
//!
//! - Every record is written by walking its registry field list, so the
//!   set of emitted members is exactly what the registry declares.
//! - Absent optional fields are omitted. `null` is never emitted.
//! - `mandatory: false` on a claim leaf is the wire default and is
//!   omitted.
//! - Object keys come out in RFC 8785 order regardless of how the typed
//!   value was produced.
//!
//! ## Fail-Fast
//!
//! Decoding reports everything; encoding stops at the first broken
//! invariant. A typed value that the decoder could never have produced
//! (an empty `type` array, two display entries for one locale, an
//! `Unrecognized` enum value spelling a known literal, ...) yields a
//! single [`EncodeError::InvariantViolation`] and no output.

use cim_core::{
    sha256_digest, BaseDisplay, CanonicalBytes, CimError, ContentDigest, CredentialDisplay,
    CredentialMetadata, EncodeError, FieldPath, IssuerMetadata, Logo, OpenEnum,
};
use serde_json::{Map, Value};

use crate::constraints;
use crate::options::CodecOptions;
use crate::registry::{record_spec, FieldSpec, RecordType};

/// Encode with default options.
///
/// # Errors
///
/// Returns `EncodeError::InvariantViolation` for the first broken invariant.
pub fn encode(metadata: &IssuerMetadata) -> Result<Value, EncodeError> {
    Encoder::default().encode(metadata)
}

/// Encode with default options and serialize to RFC 8785 bytes.
pub fn encode_canonical(metadata: &IssuerMetadata) -> Result<CanonicalBytes, CimError> {
    Encoder::default().encode_canonical(metadata)
}

/// SHA-256 digest of the canonical bytes, with default options.
pub fn digest(metadata: &IssuerMetadata) -> Result<ContentDigest, CimError> {
    Encoder::default().digest(metadata)
}

/// Registry-driven encoder.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    options: CodecOptions,
}

impl Encoder {
    /// Create an encoder with the given options.
    pub fn new(options: CodecOptions) -> Self {
        Self { options }
    }

    /// The options this encoder applies.
    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Encode `metadata` into its canonical JSON tree.
    ///
    /// # Errors
    ///
    /// Returns `EncodeError::InvariantViolation` for the first broken
    /// invariant found.
    pub fn encode(&self, metadata: &IssuerMetadata) -> Result<Value, EncodeError> {
        let span = tracing::debug_span!("encode", record = "IssuerMetadata");
        let _guard = span.enter();

        let out = self.issuer_metadata(metadata, &FieldPath::root());
        match &out {
            Ok(_) => tracing::debug!(
                credentials = metadata.credentials_supported.len(),
                "document encoded"
            ),
            Err(e) => tracing::debug!(error = %e, "encode refused"),
        }
        out
    }

    /// Encode `metadata` and serialize it to RFC 8785 canonical bytes.
    ///
    /// # Errors
    ///
    /// Returns `CimError::Encode` for a broken invariant or
    /// `CimError::Canonicalization` if serialization fails.
    pub fn encode_canonical(&self, metadata: &IssuerMetadata) -> Result<CanonicalBytes, CimError> {
        let tree = self.encode(metadata)?;
        Ok(CanonicalBytes::new(&tree)?)
    }

    /// SHA-256 digest of the canonical bytes of `metadata`.
    pub fn digest(&self, metadata: &IssuerMetadata) -> Result<ContentDigest, CimError> {
        Ok(sha256_digest(&self.encode_canonical(metadata)?))
    }

    /// Write one record by walking its registry field list.
    ///
    /// `member` supplies the value for each declared field, or `None` when
    /// the typed value leaves it absent. Required fields must be supplied
    /// and every supplied value must satisfy the field's constraints.
    pub(crate) fn record(
        &self,
        record: RecordType,
        path: &FieldPath,
        mut member: impl FnMut(&'static str, &FieldPath) -> Result<Option<Value>, EncodeError>,
    ) -> Result<Value, EncodeError> {
        let spec = record_spec(record);
        let mut out = Map::new();
        for field in spec.fields {
            let field_path = path.key(field.name);
            match member(field.name, &field_path)? {
                Some(value) => {
                    self.check(field, &value, &field_path)?;
                    out.insert(field.name.to_string(), value);
                }
                None if field.required => {
                    return Err(violation(field_path, "required field is missing"));
                }
                None => {}
            }
        }
        Ok(Value::Object(out))
    }

    fn check(&self, field: &FieldSpec, value: &Value, path: &FieldPath) -> Result<(), EncodeError> {
        let mut errors = Vec::new();
        constraints::check(field, value, path, &self.options, &mut errors);
        match errors.into_iter().next() {
            Some(e) => Err(violation(e.path, &e.kind.to_string())),
            None => Ok(()),
        }
    }

    // ─── Records ─────────────────────────────────────────────────────────

    fn issuer_metadata(&self, md: &IssuerMetadata, path: &FieldPath) -> Result<Value, EncodeError> {
        self.record(RecordType::IssuerMetadata, path, |name, at| {
            Ok(match name {
                "credential_issuer" => Some(Value::from(md.credential_issuer.as_str())),
                "authorization_servers" => strings(&md.authorization_servers),
                "credential_endpoint" => Some(Value::from(md.credential_endpoint.as_str())),
                "batch_credential_endpoint" => string(&md.batch_credential_endpoint),
                "deferred_credential_endpoint" => string(&md.deferred_credential_endpoint),
                "display" => self.base_displays(&md.display, at)?,
                "credentials_supported" => {
                    let mut entries = Map::new();
                    for (id, credential) in &md.credentials_supported {
                        let value = self.credential_metadata(credential, &at.key(id.as_str()))?;
                        entries.insert(id.clone(), value);
                    }
                    Some(Value::Object(entries))
                }
                _ => None,
            })
        })
    }

    fn credential_metadata(
        &self,
        credential: &CredentialMetadata,
        path: &FieldPath,
    ) -> Result<Value, EncodeError> {
        self.record(RecordType::CredentialMetadata, path, |name, at| {
            Ok(match name {
                "format" => Some(open_enum(&credential.format, at)?),
                "scope" => string(&credential.scope),
                "cryptographic_binding_methods_supported" => {
                    open_enums(&credential.cryptographic_binding_methods_supported, at)?
                }
                "cryptographic_suites_supported" => strings(&credential.cryptographic_suites_supported),
                "proof_types_supported" => open_enums(&credential.proof_types_supported, at)?,
                "display" => match &credential.display {
                    Some(entries) => Some(self.sequence(entries, at, Self::credential_display)?),
                    None => None,
                },
                "credential_definition" => {
                    Some(self.credential_definition(&credential.credential_definition, at)?)
                }
                _ => None,
            })
        })
    }

    pub(crate) fn base_displays(
        &self,
        display: &Option<Vec<BaseDisplay>>,
        path: &FieldPath,
    ) -> Result<Option<Value>, EncodeError> {
        match display {
            Some(entries) => Ok(Some(self.sequence(entries, path, Self::base_display)?)),
            None => Ok(None),
        }
    }

    fn base_display(&self, display: &BaseDisplay, path: &FieldPath) -> Result<Value, EncodeError> {
        self.record(RecordType::BaseDisplay, path, |name, _| {
            Ok(match name {
                "name" => string(&display.name),
                "locale" => string(&display.locale),
                _ => None,
            })
        })
    }

    fn credential_display(
        &self,
        display: &CredentialDisplay,
        path: &FieldPath,
    ) -> Result<Value, EncodeError> {
        self.record(RecordType::CredentialDisplay, path, |name, at| {
            Ok(match name {
                "name" => string(&display.base.name),
                "locale" => string(&display.base.locale),
                "description" => string(&display.description),
                "logo" => match &display.logo {
                    Some(logo) => Some(self.logo(logo, at)?),
                    None => None,
                },
                "background_color" => string(&display.background_color),
                "text_color" => string(&display.text_color),
                _ => None,
            })
        })
    }

    fn logo(&self, logo: &Logo, path: &FieldPath) -> Result<Value, EncodeError> {
        self.record(RecordType::Logo, path, |name, _| {
            Ok(match name {
                "url" => string(&logo.url),
                "alt_text" => string(&logo.alt_text),
                _ => None,
            })
        })
    }

    fn sequence<T>(
        &self,
        items: &[T],
        path: &FieldPath,
        encode_item: impl Fn(&Self, &T, &FieldPath) -> Result<Value, EncodeError>,
    ) -> Result<Value, EncodeError> {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| encode_item(self, item, &path.index(i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

pub(crate) fn violation(path: FieldPath, reason: &str) -> EncodeError {
    EncodeError::InvariantViolation {
        path,
        reason: reason.to_string(),
    }
}

fn string(value: &Option<String>) -> Option<Value> {
    value.as_deref().map(Value::from)
}

fn strings(values: &Option<Vec<String>>) -> Option<Value> {
    values.as_deref().map(string_array)
}

pub(crate) fn string_array(values: &[String]) -> Value {
    Value::Array(values.iter().map(|s| Value::from(s.as_str())).collect())
}

fn open_enum<E: OpenEnum>(value: &E, path: &FieldPath) -> Result<Value, EncodeError> {
    if !value.is_canonical() {
        return Err(violation(
            path.clone(),
            &format!(
                "unrecognized value '{}' spells a recognized literal",
                value.as_str()
            ),
        ));
    }
    Ok(Value::from(value.as_str().into_owned()))
}

fn open_enums<E: OpenEnum>(values: &Option<Vec<E>>, path: &FieldPath) -> Result<Option<Value>, EncodeError> {
    let Some(values) = values else {
        return Ok(None);
    };
    values
        .iter()
        .enumerate()
        .map(|(i, v)| open_enum(v, &path.index(i)))
        .collect::<Result<Vec<_>, _>>()
        .map(|items| Some(Value::Array(items)))
}
