//! # Schema Registry
//!
//! A static, language-neutral description of every record type in the
//! Credential Issuer Metadata document: field wire names, required status,
//! shapes, and per-field constraints.
//!
//! The decoder and the encoder both walk these tables. Field names, the
//! required/optional split, and constraints such as https enforcement or
//! one-entry-per-locale therefore cannot drift apart between the two
//! directions.
//!
//! ## Wire Names
//!
//! Field names are part of the wire contract and are written here exactly
//! as they appear in documents. Note the mixed casing inside
//! `credential_definition`: `type` and `credentialSubject` follow the W3C
//! VC data model rather than the snake_case of the rest of the document.

use serde_json::{json, Value};

/// Every record type the registry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    IssuerMetadata,
    CredentialMetadata,
    CredentialDefinition,
    /// The recursive `credentialSubject` mapping.
    ClaimNode,
    ClaimLeaf,
    BaseDisplay,
    CredentialDisplay,
    Logo,
}

impl RecordType {
    /// All record types, root first.
    pub const ALL: &'static [RecordType] = &[
        RecordType::IssuerMetadata,
        RecordType::CredentialMetadata,
        RecordType::CredentialDefinition,
        RecordType::ClaimNode,
        RecordType::ClaimLeaf,
        RecordType::BaseDisplay,
        RecordType::CredentialDisplay,
        RecordType::Logo,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::IssuerMetadata => "IssuerMetadata",
            Self::CredentialMetadata => "CredentialMetadata",
            Self::CredentialDefinition => "CredentialDefinition",
            Self::ClaimNode => "ClaimNode",
            Self::ClaimLeaf => "ClaimLeaf",
            Self::BaseDisplay => "BaseDisplay",
            Self::CredentialDisplay => "CredentialDisplay",
            Self::Logo => "Logo",
        }
    }
}

/// Scalar JSON types used by metadata fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Boolean,
}

/// Shape descriptor of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A JSON scalar.
    Scalar(ScalarKind),
    /// A string drawn from `allowed`. Open enums accept any other string
    /// and preserve it.
    Enum {
        allowed: &'static [&'static str],
        open: bool,
    },
    /// A JSON array whose elements have the inner shape.
    Sequence(&'static Shape),
    /// A JSON object with arbitrary keys and values of the inner shape.
    Mapping(&'static Shape),
    /// A nested record.
    Record(RecordType),
    /// An untagged union; the variant is chosen structurally.
    Union(&'static [Shape]),
    /// A reference back to a record type that may contain itself.
    RecursiveRef(RecordType),
}

impl Shape {
    /// Human-readable description used in type-mismatch errors.
    pub fn describe(&self) -> String {
        match self {
            Shape::Scalar(ScalarKind::String) | Shape::Enum { .. } => "string".into(),
            Shape::Scalar(ScalarKind::Boolean) => "boolean".into(),
            Shape::Sequence(inner) => format!("array of {}", inner.describe()),
            Shape::Mapping(_) | Shape::Record(_) | Shape::RecursiveRef(_) => "object".into(),
            Shape::Union(variants) => {
                let parts: Vec<String> = variants.iter().map(Shape::describe).collect();
                format!("one of ({})", parts.join(" | "))
            }
        }
    }

    /// Language-neutral JSON description of this shape.
    pub fn to_json(&self) -> Value {
        match self {
            Shape::Scalar(ScalarKind::String) => json!({"scalar": "string"}),
            Shape::Scalar(ScalarKind::Boolean) => json!({"scalar": "boolean"}),
            Shape::Enum { allowed, open } => json!({"enum": allowed, "open": open}),
            Shape::Sequence(inner) => json!({"sequence": inner.to_json()}),
            Shape::Mapping(inner) => json!({"mapping": {"key": "string", "value": inner.to_json()}}),
            Shape::Record(r) => json!({"record": r.name()}),
            Shape::Union(variants) => {
                json!({"union": variants.iter().map(Shape::to_json).collect::<Vec<_>>()})
            }
            Shape::RecursiveRef(r) => json!({"recursive_ref": r.name()}),
        }
    }
}

/// Extra rules a field value must satisfy beyond its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// An absolute https URL, checked when https enforcement is enabled.
    HttpsUrl,
    /// A sequence with at least one element.
    NonEmpty,
    /// A sequence of strings without repeats.
    UniqueItems,
    /// A sequence of display objects with at most one entry per `locale`.
    UniqueLocale,
}

impl Constraint {
    pub fn name(self) -> &'static str {
        match self {
            Self::HttpsUrl => "https_url",
            Self::NonEmpty => "non_empty",
            Self::UniqueItems => "unique_items",
            Self::UniqueLocale => "unique_locale",
        }
    }
}

/// One field of a record.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Wire name.
    pub name: &'static str,
    pub required: bool,
    pub shape: Shape,
    pub constraints: &'static [Constraint],
}

/// Description of one record type.
#[derive(Debug)]
pub struct RecordSpec {
    pub record: RecordType,
    /// Declared fields, in canonical order.
    pub fields: &'static [FieldSpec],
    /// Shape of members not named in `fields`, for records that are
    /// open mappings (`ClaimNode`). `None` means undeclared members are
    /// unknown fields.
    pub entries: Option<Shape>,
}

impl RecordSpec {
    /// Look up a declared field by wire name.
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Wire names of the required fields.
    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> {
        self.fields.iter().filter(|f| f.required).map(|f| f.name)
    }

    /// Language-neutral JSON description of this record.
    pub fn to_json(&self) -> Value {
        let fields: Vec<Value> = self
            .fields
            .iter()
            .map(|f| {
                json!({
                    "name": f.name,
                    "required": f.required,
                    "shape": f.shape.to_json(),
                    "constraints": f.constraints.iter().map(|c| c.name()).collect::<Vec<_>>(),
                })
            })
            .collect();
        let mut out = json!({"record": self.record.name(), "fields": fields});
        if let Some(entries) = &self.entries {
            out["entries"] = entries.to_json();
        }
        out
    }
}

// ─── Shapes ──────────────────────────────────────────────────────────────

const STRING: Shape = Shape::Scalar(ScalarKind::String);
const BOOLEAN: Shape = Shape::Scalar(ScalarKind::Boolean);
const STRINGS: Shape = Shape::Sequence(&STRING);

/// Recognized `format` literals.
pub const KNOWN_FORMATS: &[&str] = &["jwt_vc_json", "ldp_vc", "jwt_vc_json-ld"];
/// Recognized binding method literals (`did:<method>` is also recognized).
pub const KNOWN_BINDING_METHODS: &[&str] = &["jwk", "cose_key", "did"];
/// Recognized proof type literals.
pub const KNOWN_PROOF_TYPES: &[&str] = &["jwt", "cwt", "ldp_vp"];

const FORMAT: Shape = Shape::Enum {
    allowed: KNOWN_FORMATS,
    open: true,
};
const BINDING_METHOD: Shape = Shape::Enum {
    allowed: KNOWN_BINDING_METHODS,
    open: true,
};
const PROOF_TYPE: Shape = Shape::Enum {
    allowed: KNOWN_PROOF_TYPES,
    open: true,
};

const BASE_DISPLAYS: Shape = Shape::Sequence(&Shape::Record(RecordType::BaseDisplay));
const CREDENTIAL_DISPLAYS: Shape = Shape::Sequence(&Shape::Record(RecordType::CredentialDisplay));
const DEFINITION: Shape = Shape::Record(RecordType::CredentialDefinition);

/// Shape of a `credentialSubject` member value, in sniffing order.
pub const CLAIM_VALUE: Shape = Shape::Union(&[
    DEFINITION,
    Shape::Sequence(&DEFINITION),
    Shape::Record(RecordType::ClaimLeaf),
]);

const fn required(name: &'static str, shape: Shape) -> FieldSpec {
    FieldSpec {
        name,
        required: true,
        shape,
        constraints: &[],
    }
}

const fn optional(name: &'static str, shape: Shape) -> FieldSpec {
    FieldSpec {
        name,
        required: false,
        shape,
        constraints: &[],
    }
}

const fn constrained(spec: FieldSpec, constraints: &'static [Constraint]) -> FieldSpec {
    FieldSpec {
        constraints,
        ..spec
    }
}

// ─── Records ─────────────────────────────────────────────────────────────

pub static ISSUER_METADATA: RecordSpec = RecordSpec {
    record: RecordType::IssuerMetadata,
    fields: &[
        constrained(required("credential_issuer", STRING), &[Constraint::HttpsUrl]),
        optional("authorization_servers", STRINGS),
        constrained(required("credential_endpoint", STRING), &[Constraint::HttpsUrl]),
        constrained(optional("batch_credential_endpoint", STRING), &[Constraint::HttpsUrl]),
        constrained(optional("deferred_credential_endpoint", STRING), &[Constraint::HttpsUrl]),
        constrained(optional("display", BASE_DISPLAYS), &[Constraint::UniqueLocale]),
        required(
            "credentials_supported",
            Shape::Mapping(&Shape::Record(RecordType::CredentialMetadata)),
        ),
    ],
    entries: None,
};

pub static CREDENTIAL_METADATA: RecordSpec = RecordSpec {
    record: RecordType::CredentialMetadata,
    fields: &[
        required("format", FORMAT),
        optional("scope", STRING),
        constrained(
            optional(
                "cryptographic_binding_methods_supported",
                Shape::Sequence(&BINDING_METHOD),
            ),
            &[Constraint::UniqueItems],
        ),
        constrained(optional("cryptographic_suites_supported", STRINGS), &[Constraint::UniqueItems]),
        constrained(
            optional("proof_types_supported", Shape::Sequence(&PROOF_TYPE)),
            &[Constraint::UniqueItems],
        ),
        constrained(optional("display", CREDENTIAL_DISPLAYS), &[Constraint::UniqueLocale]),
        required("credential_definition", DEFINITION),
    ],
    entries: None,
};

pub static CREDENTIAL_DEFINITION: RecordSpec = RecordSpec {
    record: RecordType::CredentialDefinition,
    fields: &[
        constrained(required("type", STRINGS), &[Constraint::NonEmpty]),
        optional("credentialSubject", Shape::RecursiveRef(RecordType::ClaimNode)),
    ],
    entries: None,
};

pub static CLAIM_NODE: RecordSpec = RecordSpec {
    record: RecordType::ClaimNode,
    fields: &[],
    entries: Some(CLAIM_VALUE),
};

pub static CLAIM_LEAF: RecordSpec = RecordSpec {
    record: RecordType::ClaimLeaf,
    fields: &[
        optional("mandatory", BOOLEAN),
        optional("value_type", STRING),
        constrained(optional("display", BASE_DISPLAYS), &[Constraint::UniqueLocale]),
    ],
    entries: None,
};

pub static BASE_DISPLAY: RecordSpec = RecordSpec {
    record: RecordType::BaseDisplay,
    fields: &[optional("name", STRING), optional("locale", STRING)],
    entries: None,
};

pub static CREDENTIAL_DISPLAY: RecordSpec = RecordSpec {
    record: RecordType::CredentialDisplay,
    fields: &[
        optional("name", STRING),
        optional("locale", STRING),
        optional("description", STRING),
        optional("logo", Shape::Record(RecordType::Logo)),
        optional("background_color", STRING),
        optional("text_color", STRING),
    ],
    entries: None,
};

pub static LOGO: RecordSpec = RecordSpec {
    record: RecordType::Logo,
    fields: &[optional("url", STRING), optional("alt_text", STRING)],
    entries: None,
};

/// Lookup surface over the static record tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaRegistry;

impl SchemaRegistry {
    /// The field table of a record type.
    pub fn get(&self, record: RecordType) -> &'static RecordSpec {
        record_spec(record)
    }

    /// All record specs, root first.
    pub fn records(&self) -> impl Iterator<Item = &'static RecordSpec> {
        RecordType::ALL.iter().map(|r| record_spec(*r))
    }

    /// Language-neutral JSON description of the whole registry.
    pub fn describe(&self) -> Value {
        Value::Array(self.records().map(RecordSpec::to_json).collect())
    }
}

/// The field table of a record type.
pub fn record_spec(record: RecordType) -> &'static RecordSpec {
    match record {
        RecordType::IssuerMetadata => &ISSUER_METADATA,
        RecordType::CredentialMetadata => &CREDENTIAL_METADATA,
        RecordType::CredentialDefinition => &CREDENTIAL_DEFINITION,
        RecordType::ClaimNode => &CLAIM_NODE,
        RecordType::ClaimLeaf => &CLAIM_LEAF,
        RecordType::BaseDisplay => &BASE_DISPLAY,
        RecordType::CredentialDisplay => &CREDENTIAL_DISPLAY,
        RecordType::Logo => &LOGO,
    }
}

/// JSON type name of a value, for type-mismatch errors.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cim_core::{BindingMethod, CredentialFormat, OpenEnum, ProofType};

    #[test]
    fn test_every_record_type_resolves() {
        for record in RecordType::ALL {
            assert_eq!(record_spec(*record).record, *record);
        }
    }

    #[test]
    fn test_issuer_required_fields() {
        let required: Vec<&str> = ISSUER_METADATA.required_fields().collect();
        assert_eq!(
            required,
            vec!["credential_issuer", "credential_endpoint", "credentials_supported"]
        );
    }

    #[test]
    fn test_wire_names_are_exact() {
        assert!(CREDENTIAL_METADATA
            .field("cryptographic_binding_methods_supported")
            .is_some());
        assert!(CREDENTIAL_DEFINITION.field("credentialSubject").is_some());
        assert!(CREDENTIAL_DEFINITION.field("credential_subject").is_none());
        assert!(LOGO.field("alt_text").is_some());
    }

    #[test]
    fn test_known_literals_match_open_enums() {
        assert_eq!(KNOWN_FORMATS, CredentialFormat::KNOWN);
        assert_eq!(KNOWN_BINDING_METHODS, BindingMethod::KNOWN);
        assert_eq!(KNOWN_PROOF_TYPES, ProofType::KNOWN);
    }

    #[test]
    fn test_https_constraint_on_endpoints_only() {
        let https: Vec<&str> = ISSUER_METADATA
            .fields
            .iter()
            .filter(|f| f.constraints.contains(&Constraint::HttpsUrl))
            .map(|f| f.name)
            .collect();
        assert_eq!(
            https,
            vec![
                "credential_issuer",
                "credential_endpoint",
                "batch_credential_endpoint",
                "deferred_credential_endpoint"
            ]
        );
    }

    #[test]
    fn test_describe_shapes() {
        assert_eq!(STRINGS.describe(), "array of string");
        assert_eq!(
            CLAIM_VALUE.describe(),
            "one of (object | array of object | object)"
        );
    }

    #[test]
    fn test_registry_description_is_json() {
        let desc = SchemaRegistry.describe();
        let records = desc.as_array().unwrap();
        assert_eq!(records.len(), RecordType::ALL.len());
        assert_eq!(records[0]["record"], "IssuerMetadata");
        assert_eq!(records[0]["fields"][0]["name"], "credential_issuer");
        assert_eq!(records[0]["fields"][0]["constraints"][0], "https_url");
        assert_eq!(records[3]["entries"]["union"][1]["sequence"]["record"], "CredentialDefinition");
    }
}
