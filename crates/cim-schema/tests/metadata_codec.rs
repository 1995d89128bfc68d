//! Integration tests: decode/encode behavior over whole metadata documents.
//!
//! Covers round-trip, idempotent canonicalization, error accumulation,
//! open-enum tolerance, duplicate locales, ordering and digest stability,
//! and YAML/JSON equivalence.

use std::path::PathBuf;

use cim_core::{
    sha256_digest, BindingMethod, CanonicalBytes, ClaimValue, CredentialFormat, EncodeError,
    FieldErrorKind, ProofType,
};
use cim_schema::{
    decode, encode, encode_canonical, load_document, parse_document, CodecOptions, Decoder,
    DocumentFormat, Encoder,
};
use serde_json::{json, Value};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn university() -> Value {
    load_document(&fixture("university.json")).expect("fixture loads")
}

fn error_paths(raw: &Value) -> Vec<String> {
    decode(raw)
        .expect_err("document should be rejected")
        .iter()
        .map(|e| e.path.to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Round trip
// ---------------------------------------------------------------------------

#[test]
fn test_fixture_roundtrip_is_exact() {
    let raw = university();
    let md = decode(&raw).unwrap();
    assert_eq!(encode(&md).unwrap(), raw);
}

#[test]
fn test_decode_encode_decode_is_identity() {
    let md = decode(&university()).unwrap();
    let again = decode(&encode(&md).unwrap()).unwrap();
    assert_eq!(md, again);
}

#[test]
fn test_fixture_model() {
    let md = decode(&university()).unwrap();
    assert_eq!(md.credentials_supported.len(), 2);
    assert!(md.accepts_authorization_server("https://server.example.com"));
    assert_eq!(
        md.display_for_locale("fr").and_then(|d| d.name.as_deref()),
        Some("Université Exemple")
    );

    let jwt = md.credential("UniversityDegree_JWT").unwrap();
    assert_eq!(jwt.format, CredentialFormat::JwtVcJson);
    assert_eq!(
        jwt.cryptographic_binding_methods_supported.as_deref(),
        Some(&[BindingMethod::Did { method: Some("example".into()) }][..])
    );
    let subject = jwt.credential_definition.credential_subject.as_ref().unwrap();
    assert_eq!(subject.len(), 6);
    assert!(matches!(subject.get("address"), Some(ClaimValue::Definition(_))));
    assert!(matches!(subject.get("previous_degrees"), Some(ClaimValue::DefinitionList(l)) if l.len() == 2));
    assert_eq!(subject.mandatory_claims(), vec!["gpa", "previous_degrees.title"]);

    let ldp = md.credential("UniversityDegree_LDP").unwrap();
    assert_eq!(ldp.effective_proof_types(), vec![ProofType::Jwt]);
    let ids: Vec<&str> = md.credentials_of_type("UniversityDegreeCredential").collect();
    assert_eq!(ids, vec!["UniversityDegree_JWT", "UniversityDegree_LDP"]);
}

// ---------------------------------------------------------------------------
// Canonical form
// ---------------------------------------------------------------------------

#[test]
fn test_canonicalization_is_idempotent() {
    let md = decode(&university()).unwrap();
    let first = encode_canonical(&md).unwrap();
    let reparsed: Value = serde_json::from_slice(first.as_bytes()).unwrap();
    let second = encode_canonical(&decode(&reparsed).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_input_key_order_does_not_matter() {
    let a: Value = serde_json::from_str(
        r#"{"credential_issuer":"https://i.example","credential_endpoint":"https://i.example/c",
            "credentials_supported":{"B":{"format":"ldp_vc","credential_definition":{"type":["VC"]}},
                                     "A":{"credential_definition":{"type":["VC"]},"format":"jwt_vc_json"}}}"#,
    )
    .unwrap();
    let b: Value = serde_json::from_str(
        r#"{"credentials_supported":{"A":{"format":"jwt_vc_json","credential_definition":{"type":["VC"]}},
                                     "B":{"credential_definition":{"type":["VC"]},"format":"ldp_vc"}},
            "credential_endpoint":"https://i.example/c","credential_issuer":"https://i.example"}"#,
    )
    .unwrap();
    let ca = encode_canonical(&decode(&a).unwrap()).unwrap();
    let cb = encode_canonical(&decode(&b).unwrap()).unwrap();
    assert_eq!(ca.as_str(), cb.as_str());
    assert_eq!(sha256_digest(&ca), sha256_digest(&cb));
    assert!(ca.as_str().starts_with(r#"{"credential_endpoint":"#));
}

#[test]
fn test_digest_matches_independent_vector() {
    // Same document as the cim-core canonical vector, so the digest is
    // pinned across both crates.
    let raw = json!({
        "credential_issuer": "https://issuer.example",
        "credential_endpoint": "https://issuer.example/credential",
        "credentials_supported": {
            "UniversityDegree_JWT": {
                "format": "jwt_vc_json",
                "credential_definition": {
                    "type": ["VerifiableCredential", "UniversityDegreeCredential"],
                    "credentialSubject": {
                        "given_name": {"display": [{"name": "Given Name", "locale": "en-US"}]},
                        "gpa": {"mandatory": true, "value_type": "number"}
                    }
                }
            }
        }
    });
    let md = decode(&raw).unwrap();
    assert_eq!(
        cim_schema::digest(&md).unwrap().to_hex(),
        "fdf122dc9970660df087c0bb467a0317c624db9813d30db721e39d68671dd8f9"
    );
    assert_eq!(
        encode_canonical(&md).unwrap(),
        CanonicalBytes::new(&raw).unwrap()
    );
}

#[test]
fn test_claim_names_sorted_by_utf16_code_units() {
    let raw = json!({
        "credential_issuer": "https://issuer.example",
        "credential_endpoint": "https://issuer.example/credential",
        "credentials_supported": {
            "\u{00f6}ffentlich": {"format": "ldp_vc", "credential_definition": {"type": ["VC"]}},
            "Z": {
                "format": "jwt_vc_json",
                "credential_definition": {
                    "type": ["VC"],
                    "credentialSubject": {
                        "\u{fb33}": {},
                        "\u{1f600}": {"mandatory": true},
                        "\r": {},
                        "1": {}
                    }
                }
            }
        }
    });
    let md = decode(&raw).unwrap();
    let bytes = encode_canonical(&md).unwrap();
    assert_eq!(
        bytes.as_str(),
        "{\"credential_endpoint\":\"https://issuer.example/credential\",\
         \"credential_issuer\":\"https://issuer.example\",\
         \"credentials_supported\":{\"Z\":{\"credential_definition\":{\"credentialSubject\":\
         {\"\\r\":{},\"1\":{},\"\u{1f600}\":{\"mandatory\":true},\"\u{fb33}\":{}},\
         \"type\":[\"VC\"]},\"format\":\"jwt_vc_json\"},\
         \"\u{00f6}ffentlich\":{\"credential_definition\":{\"type\":[\"VC\"]},\"format\":\"ldp_vc\"}}}"
    );
    assert_eq!(
        sha256_digest(&bytes).to_hex(),
        "18971b93859b04514251aca4e883f3b29f99dc8eb1e5fd48cad7e92cf2b202d5"
    );
}

#[test]
fn test_null_optionals_vanish_from_canonical_output() {
    let mut raw = university();
    raw["deferred_credential_endpoint"] = Value::Null;
    raw["credentials_supported"]["UniversityDegree_LDP"]["scope"] = Value::Null;
    let bytes = encode_canonical(&decode(&raw).unwrap()).unwrap();
    assert!(!bytes.as_str().contains("deferred_credential_endpoint"));
    assert!(!bytes.as_str().contains("null"));
}

// ---------------------------------------------------------------------------
// Error accumulation
// ---------------------------------------------------------------------------

#[test]
fn test_missing_issuer_reported_with_other_errors() {
    let mut raw = university();
    raw.as_object_mut().unwrap().remove("credential_issuer");
    raw["credentials_supported"]["UniversityDegree_LDP"]["credential_definition"]["type"] =
        json!("VerifiableCredential");
    raw["display"][1]["locale"] = json!("en-US");

    assert_eq!(
        error_paths(&raw),
        vec![
            "credential_issuer",
            "display[1].locale",
            "credentials_supported.UniversityDegree_LDP.credential_definition.type",
        ]
    );
}

#[test]
fn test_error_messages_are_path_qualified() {
    let mut raw = university();
    raw.as_object_mut().unwrap().remove("credential_issuer");
    let err = decode(&raw).unwrap_err();
    assert_eq!(err.len(), 1);
    assert_eq!(err.errors()[0].kind, FieldErrorKind::MissingRequired);
    assert_eq!(err.to_string(), "  credential_issuer: required field is missing");
}

#[test]
fn test_duplicate_locale_rejected() {
    let mut raw = university();
    raw["credentials_supported"]["UniversityDegree_JWT"]["credential_definition"]
        ["credentialSubject"]["given_name"]["display"] =
        json!([{"name": "Given Name", "locale": "en-US"}, {"name": "First name", "locale": "en-US"}]);
    let err = decode(&raw).unwrap_err();
    assert_eq!(
        err.errors()[0].kind,
        FieldErrorKind::DuplicateLocale { locale: Some("en-US".into()) }
    );
    assert_eq!(
        err.errors()[0].path.to_string(),
        "credentials_supported.UniversityDegree_JWT.credential_definition.credentialSubject.given_name.display[1].locale"
    );
}

#[test]
fn test_keys_with_dots_are_bracketed_in_paths() {
    let mut raw = university();
    raw["credentials_supported"]["org.example.degree"] =
        json!({"format": "ldp_vc", "credential_definition": {}});
    assert_eq!(
        error_paths(&raw),
        vec![r#"credentials_supported["org.example.degree"].credential_definition.type"#]
    );
}

// ---------------------------------------------------------------------------
// Open enums
// ---------------------------------------------------------------------------

#[test]
fn test_future_format_roundtrips() {
    let mut raw = university();
    raw["credentials_supported"]["UniversityDegree_LDP"]["format"] = json!("future_format_x");
    raw["credentials_supported"]["UniversityDegree_LDP"]["proof_types_supported"] =
        json!(["jwt", "future_proof"]);
    let md = decode(&raw).unwrap();
    assert_eq!(
        md.credential("UniversityDegree_LDP").unwrap().format,
        CredentialFormat::Unrecognized("future_format_x".into())
    );
    assert_eq!(encode(&md).unwrap(), raw);
}

// ---------------------------------------------------------------------------
// Encoder invariants
// ---------------------------------------------------------------------------

#[test]
fn test_encoder_refuses_with_single_violation() {
    let mut md = decode(&university()).unwrap();
    let jwt = md.credentials_supported.get_mut("UniversityDegree_JWT").unwrap();
    jwt.credential_definition.types.clear();
    jwt.proof_types_supported = Some(vec![ProofType::Unrecognized("cwt".into())]);

    let err = encode(&md).unwrap_err();
    let EncodeError::InvariantViolation { path, .. } = &err;
    assert!(path
        .to_string()
        .starts_with("credentials_supported.UniversityDegree_JWT."));
    assert!(encode_canonical(&md).is_err());
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[test]
fn test_https_enforcement_toggle() {
    let mut raw = university();
    raw["credential_issuer"] = json!("http://localhost:8080");
    raw["deferred_credential_endpoint"] = json!("not a url");

    let err = decode(&raw).unwrap_err();
    let kinds: Vec<&FieldErrorKind> = err.iter().map(|e| &e.kind).collect();
    assert_eq!(kinds.len(), 2);
    assert_eq!(
        kinds[0],
        &FieldErrorKind::InvalidUrlScheme { scheme: "http".into() }
    );
    assert!(matches!(kinds[1], FieldErrorKind::MalformedUrl { .. }));

    let options = CodecOptions::permissive();
    let md = Decoder::new(options).decode(&raw).unwrap();
    assert_eq!(Encoder::new(options).encode(&md).unwrap(), raw);
    assert!(Encoder::default().encode(&md).is_err());
}

#[test]
fn test_options_loaded_from_yaml_drive_decoder() {
    let options = CodecOptions::from_yaml_str("reject_unknown_fields: true\n").unwrap();
    let mut raw = university();
    raw["credential_response_encryption"] = json!({"alg_values_supported": ["RSA-OAEP"]});
    assert!(decode(&raw).is_ok());
    let err = Decoder::new(options).decode(&raw).unwrap_err();
    assert_eq!(err.errors()[0].kind, FieldErrorKind::UnknownField);
}

// ---------------------------------------------------------------------------
// YAML input
// ---------------------------------------------------------------------------

#[test]
fn test_yaml_and_json_decode_identically() {
    let yaml = r#"
credential_issuer: https://credential-issuer.example.com
credential_endpoint: https://credential-issuer.example.com/credential
display:
  - name: Example University
    locale: en-US
credentials_supported:
  UniversityDegree_JWT:
    format: jwt_vc_json
    proof_types_supported: [jwt]
    credential_definition:
      type: [VerifiableCredential, UniversityDegreeCredential]
      credentialSubject:
        gpa:
          mandatory: true
        address:
          type: [PostalAddress]
          credentialSubject:
            locality: {value_type: string}
"#;
    let json_text = r#"{
        "credential_issuer": "https://credential-issuer.example.com",
        "credential_endpoint": "https://credential-issuer.example.com/credential",
        "display": [{"name": "Example University", "locale": "en-US"}],
        "credentials_supported": {"UniversityDegree_JWT": {
            "format": "jwt_vc_json",
            "proof_types_supported": ["jwt"],
            "credential_definition": {
                "type": ["VerifiableCredential", "UniversityDegreeCredential"],
                "credentialSubject": {
                    "gpa": {"mandatory": true},
                    "address": {"type": ["PostalAddress"],
                                "credentialSubject": {"locality": {"value_type": "string"}}}
                }
            }
        }}
    }"#;
    let from_yaml = decode(&parse_document(yaml, DocumentFormat::Yaml).unwrap()).unwrap();
    let from_json = decode(&parse_document(json_text, DocumentFormat::Json).unwrap()).unwrap();
    assert_eq!(from_yaml, from_json);
    assert_eq!(
        encode_canonical(&from_yaml).unwrap(),
        encode_canonical(&from_json).unwrap()
    );
}
