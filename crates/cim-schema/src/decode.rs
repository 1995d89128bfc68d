//! # Validating Decoder
//!
//! Turns a raw JSON tree into a typed [`IssuerMetadata`], or reports every
//! defect in the document.
//!
//! ## Accumulation
//!
//! The decoder never stops at the first problem. Each field is decoded
//! independently; a failed field contributes errors and yields nothing, and
//! its parent keeps going. Only when the whole tree has been visited does
//! the decoder decide between a typed result and a [`DecodeErrors`] list.
//! Errors appear in traversal order: records are visited in registry field
//! order, mappings and claim trees in key order.
//!
//! ## Absence
//!
//! A member that is missing and a member whose value is `null` are the
//! same thing. For a required field both produce `MissingRequired`; for an
//! optional field both mean "absent".

use std::collections::BTreeMap;

use cim_core::{
    BaseDisplay, CredentialDisplay, CredentialMetadata, DecodeErrors, FieldError, FieldErrorKind,
    FieldPath, IssuerMetadata, Logo, OpenEnum,
};
use serde_json::{Map, Value};

use crate::constraints;
use crate::options::CodecOptions;
use crate::registry::{json_kind, record_spec, FieldSpec, RecordSpec, RecordType, Shape};

/// Decode an issuer metadata document with default options.
///
/// # Errors
///
/// Returns every field error found in the document.
pub fn decode(raw: &Value) -> Result<IssuerMetadata, DecodeErrors> {
    Decoder::default().decode(raw)
}

/// Registry-driven decoder.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    options: CodecOptions,
}

impl Decoder {
    /// Create a decoder with the given options.
    pub fn new(options: CodecOptions) -> Self {
        Self { options }
    }

    /// The options this decoder applies.
    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Decode an issuer metadata document.
    ///
    /// # Errors
    ///
    /// Returns every field error found in the document, in traversal order.
    pub fn decode(&self, raw: &Value) -> Result<IssuerMetadata, DecodeErrors> {
        let span = tracing::debug_span!("decode", record = "IssuerMetadata");
        let _guard = span.enter();

        let mut ctx = DecodeCtx::new(&self.options);
        let decoded = ctx.issuer_metadata(raw, &FieldPath::root());
        match (decoded, DecodeErrors::from_vec(ctx.errors)) {
            (Some(metadata), None) => {
                tracing::debug!(
                    credentials = metadata.credentials_supported.len(),
                    "document accepted"
                );
                Ok(metadata)
            }
            (_, Some(errors)) => {
                tracing::debug!(errors = errors.len(), "document rejected");
                Err(errors)
            }
            // Every decode routine that yields nothing records why, so this
            // arm is only reachable through a registry/decoder mismatch.
            (None, None) => Err(DecodeErrors::single(FieldError::new(
                FieldPath::root(),
                FieldErrorKind::TypeMismatch {
                    expected: "IssuerMetadata object".into(),
                    actual: json_kind(raw).into(),
                },
            ))),
        }
    }
}

/// A JSON object opened as a registry record.
pub(crate) struct RecordView<'v> {
    pub(crate) spec: &'static RecordSpec,
    pub(crate) members: &'v Map<String, Value>,
    pub(crate) path: FieldPath,
}

/// Mutable decoding state: options and the accumulated error list.
pub(crate) struct DecodeCtx<'o> {
    pub(crate) options: &'o CodecOptions,
    pub(crate) errors: Vec<FieldError>,
}

impl<'o> DecodeCtx<'o> {
    pub(crate) fn new(options: &'o CodecOptions) -> Self {
        Self {
            options,
            errors: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, path: FieldPath, kind: FieldErrorKind) {
        self.errors.push(FieldError::new(path, kind));
    }

    pub(crate) fn type_mismatch(&mut self, path: FieldPath, expected: &str, found: &Value) {
        self.push(
            path,
            FieldErrorKind::TypeMismatch {
                expected: expected.to_string(),
                actual: json_kind(found).to_string(),
            },
        );
    }

    /// Open `value` as a record of type `record`, applying the unknown-field
    /// policy to members the registry does not declare.
    pub(crate) fn open<'v>(
        &mut self,
        value: &'v Value,
        path: &FieldPath,
        record: RecordType,
    ) -> Option<RecordView<'v>> {
        let Some(members) = value.as_object() else {
            self.type_mismatch(path.clone(), "object", value);
            return None;
        };
        let spec = record_spec(record);
        if spec.entries.is_none() {
            for name in members.keys() {
                if spec.field(name).is_some() {
                    continue;
                }
                if self.options.reject_unknown_fields {
                    self.push(path.key(name.as_str()), FieldErrorKind::UnknownField);
                } else {
                    tracing::debug!(
                        path = %path.key(name.as_str()),
                        record = record.name(),
                        "ignoring undeclared field"
                    );
                }
            }
        }
        Some(RecordView {
            spec,
            members,
            path: path.clone(),
        })
    }

    /// Decode one declared field of `view`.
    ///
    /// Handles absence and `null`, reports `MissingRequired`, runs `convert`
    /// on a present value and, if it added no errors, the field's
    /// constraints.
    pub(crate) fn field<'v, T>(
        &mut self,
        view: &RecordView<'v>,
        name: &str,
        convert: impl FnOnce(&mut Self, &'v Value, &FieldPath, &'static FieldSpec) -> Option<T>,
    ) -> Option<T> {
        let spec = view.spec.field(name)?;
        let path = view.path.key(name);
        let value = match view.members.get(name) {
            None | Some(Value::Null) => {
                if spec.required {
                    self.push(path, FieldErrorKind::MissingRequired);
                }
                return None;
            }
            Some(value) => value,
        };
        let before = self.errors.len();
        let out = convert(self, value, &path, spec);
        if self.errors.len() == before {
            constraints::check(spec, value, &path, self.options, &mut self.errors);
        }
        out
    }

    // ─── Field shapes ────────────────────────────────────────────────────

    pub(crate) fn string(&mut self, view: &RecordView<'_>, name: &str) -> Option<String> {
        self.field(view, name, |ctx, value, path, spec| {
            ctx.expect_str(value, path, &spec.shape).map(str::to_string)
        })
    }

    pub(crate) fn boolean(&mut self, view: &RecordView<'_>, name: &str) -> Option<bool> {
        self.field(view, name, |ctx, value, path, spec| match value {
            Value::Bool(b) => Some(*b),
            other => {
                ctx.type_mismatch(path.clone(), &spec.shape.describe(), other);
                None
            }
        })
    }

    pub(crate) fn strings(&mut self, view: &RecordView<'_>, name: &str) -> Option<Vec<String>> {
        self.field(view, name, |ctx, value, path, spec| {
            ctx.sequence(value, path, &spec.shape, |ctx, item, item_path, item_shape| {
                ctx.expect_str(item, item_path, item_shape).map(str::to_string)
            })
        })
    }

    pub(crate) fn open_enum<E: OpenEnum>(&mut self, view: &RecordView<'_>, name: &str) -> Option<E> {
        self.field(view, name, |ctx, value, path, spec| {
            let literal = ctx.expect_str(value, path, &spec.shape)?;
            Some(parse_open_enum::<E>(literal, path))
        })
    }

    pub(crate) fn open_enums<E: OpenEnum>(
        &mut self,
        view: &RecordView<'_>,
        name: &str,
    ) -> Option<Vec<E>> {
        self.field(view, name, |ctx, value, path, spec| {
            ctx.sequence(value, path, &spec.shape, |ctx, item, item_path, item_shape| {
                let literal = ctx.expect_str(item, item_path, item_shape)?;
                Some(parse_open_enum::<E>(literal, item_path))
            })
        })
    }

    /// Decode a sequence field whose elements are records.
    pub(crate) fn records<'v, T>(
        &mut self,
        view: &RecordView<'v>,
        name: &str,
        mut decode_item: impl FnMut(&mut Self, &'v Value, &FieldPath) -> Option<T>,
    ) -> Option<Vec<T>> {
        self.field(view, name, |ctx, value, path, spec| {
            ctx.sequence(value, path, &spec.shape, |ctx, item, item_path, _| {
                decode_item(ctx, item, item_path)
            })
        })
    }

    fn expect_str<'v>(&mut self, value: &'v Value, path: &FieldPath, shape: &Shape) -> Option<&'v str> {
        match value {
            Value::String(s) => Some(s.as_str()),
            other => {
                self.type_mismatch(path.clone(), &shape.describe(), other);
                None
            }
        }
    }

    /// Decode every element of an array. Yields `None` if any element
    /// failed, after visiting all of them.
    fn sequence<'v, T>(
        &mut self,
        value: &'v Value,
        path: &FieldPath,
        shape: &Shape,
        mut item: impl FnMut(&mut Self, &'v Value, &FieldPath, &Shape) -> Option<T>,
    ) -> Option<Vec<T>> {
        let (Value::Array(items), Shape::Sequence(item_shape)) = (value, shape) else {
            self.type_mismatch(path.clone(), &shape.describe(), value);
            return None;
        };
        let mut out = Vec::with_capacity(items.len());
        let mut failed = false;
        for (i, element) in items.iter().enumerate() {
            match item(self, element, &path.index(i), *item_shape) {
                Some(v) => out.push(v),
                None => failed = true,
            }
        }
        (!failed).then_some(out)
    }

    // ─── Records ─────────────────────────────────────────────────────────

    fn issuer_metadata(&mut self, value: &Value, path: &FieldPath) -> Option<IssuerMetadata> {
        let view = self.open(value, path, RecordType::IssuerMetadata)?;
        let credential_issuer = self.string(&view, "credential_issuer");
        let authorization_servers = self.strings(&view, "authorization_servers");
        let credential_endpoint = self.string(&view, "credential_endpoint");
        let batch_credential_endpoint = self.string(&view, "batch_credential_endpoint");
        let deferred_credential_endpoint = self.string(&view, "deferred_credential_endpoint");
        let display = self.records(&view, "display", Self::base_display);
        let credentials_supported = self.field(&view, "credentials_supported", |ctx, value, path, spec| {
            ctx.mapping(value, path, &spec.shape, Self::credential_metadata)
        });

        Some(IssuerMetadata {
            credential_issuer: credential_issuer?,
            authorization_servers,
            credential_endpoint: credential_endpoint?,
            batch_credential_endpoint,
            deferred_credential_endpoint,
            display,
            credentials_supported: credentials_supported?,
        })
    }

    /// Decode a mapping of record values keyed by arbitrary strings.
    fn mapping<'v, T>(
        &mut self,
        value: &'v Value,
        path: &FieldPath,
        shape: &Shape,
        mut entry: impl FnMut(&mut Self, &'v Value, &FieldPath) -> Option<T>,
    ) -> Option<BTreeMap<String, T>> {
        let Value::Object(members) = value else {
            self.type_mismatch(path.clone(), &shape.describe(), value);
            return None;
        };
        let mut out = BTreeMap::new();
        let mut failed = false;
        for (key, member) in members {
            match entry(self, member, &path.key(key.as_str())) {
                Some(v) => {
                    out.insert(key.clone(), v);
                }
                None => failed = true,
            }
        }
        (!failed).then_some(out)
    }

    fn credential_metadata(&mut self, value: &Value, path: &FieldPath) -> Option<CredentialMetadata> {
        let view = self.open(value, path, RecordType::CredentialMetadata)?;
        let format = self.open_enum(&view, "format");
        let scope = self.string(&view, "scope");
        let cryptographic_binding_methods_supported =
            self.open_enums(&view, "cryptographic_binding_methods_supported");
        let cryptographic_suites_supported = self.strings(&view, "cryptographic_suites_supported");
        let proof_types_supported = self.open_enums(&view, "proof_types_supported");
        let display = self.records(&view, "display", Self::credential_display);
        let credential_definition = self.field(&view, "credential_definition", |ctx, value, path, _| {
            ctx.credential_definition(value, path)
        });

        Some(CredentialMetadata {
            format: format?,
            scope,
            cryptographic_binding_methods_supported,
            cryptographic_suites_supported,
            proof_types_supported,
            display,
            credential_definition: credential_definition?,
        })
    }

    pub(crate) fn base_display(&mut self, value: &Value, path: &FieldPath) -> Option<BaseDisplay> {
        let view = self.open(value, path, RecordType::BaseDisplay)?;
        let name = self.string(&view, "name");
        let locale = self.string(&view, "locale");
        Some(BaseDisplay { name, locale })
    }

    fn credential_display(&mut self, value: &Value, path: &FieldPath) -> Option<CredentialDisplay> {
        let view = self.open(value, path, RecordType::CredentialDisplay)?;
        let name = self.string(&view, "name");
        let locale = self.string(&view, "locale");
        let description = self.string(&view, "description");
        let logo = self.field(&view, "logo", |ctx, value, path, _| ctx.logo(value, path));
        let background_color = self.string(&view, "background_color");
        let text_color = self.string(&view, "text_color");
        Some(CredentialDisplay {
            base: BaseDisplay { name, locale },
            description,
            logo,
            background_color,
            text_color,
        })
    }

    fn logo(&mut self, value: &Value, path: &FieldPath) -> Option<Logo> {
        let view = self.open(value, path, RecordType::Logo)?;
        let url = self.string(&view, "url");
        let alt_text = self.string(&view, "alt_text");
        Some(Logo { url, alt_text })
    }
}

fn parse_open_enum<E: OpenEnum>(literal: &str, path: &FieldPath) -> E {
    let parsed = E::parse(literal);
    if parsed.is_unrecognized() {
        tracing::debug!(%path, literal, "unrecognized value preserved");
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use cim_core::{BindingMethod, CredentialFormat, ProofType};
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "credential_issuer": "https://issuer.example",
            "credential_endpoint": "https://issuer.example/credential",
            "credentials_supported": {
                "Degree": {
                    "format": "jwt_vc_json",
                    "credential_definition": {"type": ["VerifiableCredential"]}
                }
            }
        })
    }

    fn paths(errors: &DecodeErrors) -> Vec<String> {
        errors.iter().map(|e| e.path.to_string()).collect()
    }

    #[test]
    fn test_minimal_document() {
        let md = decode(&minimal()).unwrap();
        assert_eq!(md.credential_issuer, "https://issuer.example");
        let degree = md.credential("Degree").unwrap();
        assert_eq!(degree.format, CredentialFormat::JwtVcJson);
        assert!(degree.credential_definition.credential_subject.is_none());
    }

    #[test]
    fn test_root_must_be_object() {
        let errors = decode(&json!([1, 2])).unwrap_err();
        assert_eq!(paths(&errors), vec!["(root)"]);
    }

    #[test]
    fn test_null_required_is_missing() {
        let mut doc = minimal();
        doc["credential_endpoint"] = Value::Null;
        let errors = decode(&doc).unwrap_err();
        assert_eq!(errors.errors()[0].kind, FieldErrorKind::MissingRequired);
        assert_eq!(paths(&errors), vec!["credential_endpoint"]);
    }

    #[test]
    fn test_null_optional_is_absent() {
        let mut doc = minimal();
        doc["batch_credential_endpoint"] = Value::Null;
        doc["display"] = Value::Null;
        let md = decode(&doc).unwrap();
        assert!(md.batch_credential_endpoint.is_none());
        assert!(md.display.is_none());
    }

    #[test]
    fn test_type_mismatch_reports_shapes() {
        let mut doc = minimal();
        doc["authorization_servers"] = json!("https://as.example");
        let errors = decode(&doc).unwrap_err();
        assert_eq!(
            errors.errors()[0].kind,
            FieldErrorKind::TypeMismatch {
                expected: "array of string".into(),
                actual: "string".into()
            }
        );
    }

    #[test]
    fn test_errors_accumulate_across_records() {
        let doc = json!({
            "credential_endpoint": 42,
            "credentials_supported": {
                "A": {"credential_definition": {"type": []}},
                "B": {"format": "ldp_vc", "credential_definition": {"type": ["VC"]},
                      "proof_types_supported": ["jwt", 7]}
            }
        });
        let errors = decode(&doc).unwrap_err();
        assert_eq!(
            paths(&errors),
            vec![
                "credential_issuer",
                "credential_endpoint",
                "credentials_supported.A.format",
                "credentials_supported.A.credential_definition.type",
                "credentials_supported.B.proof_types_supported[1]",
            ]
        );
    }

    #[test]
    fn test_open_enums_preserved() {
        let mut doc = minimal();
        doc["credentials_supported"]["Degree"]["format"] = json!("mso_mdoc");
        doc["credentials_supported"]["Degree"]["cryptographic_binding_methods_supported"] =
            json!(["did:web", "x509"]);
        doc["credentials_supported"]["Degree"]["proof_types_supported"] = json!(["attestation"]);
        let md = decode(&doc).unwrap();
        let degree = md.credential("Degree").unwrap();
        assert_eq!(degree.format, CredentialFormat::Unrecognized("mso_mdoc".into()));
        assert_eq!(
            degree.cryptographic_binding_methods_supported.as_deref().unwrap(),
            &[
                BindingMethod::Did { method: Some("web".into()) },
                BindingMethod::Unrecognized("x509".into())
            ]
        );
        assert_eq!(
            degree.proof_types_supported.as_deref().unwrap(),
            &[ProofType::Unrecognized("attestation".into())]
        );
    }

    #[test]
    fn test_unknown_fields_ignored_by_default() {
        let mut doc = minimal();
        doc["signed_metadata"] = json!("eyJ...");
        assert!(decode(&doc).is_ok());
    }

    #[test]
    fn test_unknown_fields_rejected_when_strict() {
        let mut doc = minimal();
        doc["signed_metadata"] = json!("eyJ...");
        doc["credentials_supported"]["Degree"]["order"] = json!(["a"]);
        let errors = Decoder::new(CodecOptions::strict()).decode(&doc).unwrap_err();
        assert_eq!(
            paths(&errors),
            vec!["signed_metadata", "credentials_supported.Degree.order"]
        );
        assert!(errors.iter().all(|e| e.kind == FieldErrorKind::UnknownField));
    }

    #[test]
    fn test_http_endpoint_toggle() {
        let mut doc = minimal();
        doc["credential_endpoint"] = json!("http://localhost:8080/credential");
        let errors = decode(&doc).unwrap_err();
        assert_eq!(
            errors.errors()[0].kind,
            FieldErrorKind::InvalidUrlScheme { scheme: "http".into() }
        );
        assert!(Decoder::new(CodecOptions::permissive()).decode(&doc).is_ok());
    }

    #[test]
    fn test_credential_display_with_logo() {
        let mut doc = minimal();
        doc["credentials_supported"]["Degree"]["display"] = json!([{
            "name": "University Credential",
            "locale": "en-US",
            "logo": {"url": "https://u.example/logo.png", "alt_text": "a square logo"},
            "background_color": "#12107c",
            "text_color": "#FFFFFF"
        }]);
        let md = decode(&doc).unwrap();
        let display = md.credential("Degree").unwrap().display_for_locale("en").unwrap();
        assert_eq!(display.base.name.as_deref(), Some("University Credential"));
        assert_eq!(
            display.logo.as_ref().and_then(|l| l.alt_text.as_deref()),
            Some("a square logo")
        );
    }

    #[test]
    fn test_logo_type_mismatch_path() {
        let mut doc = minimal();
        doc["credentials_supported"]["Degree"]["display"] = json!([{"name": "X", "logo": "logo.png"}]);
        let errors = decode(&doc).unwrap_err();
        assert_eq!(paths(&errors), vec!["credentials_supported.Degree.display[0].logo"]);
    }
}
