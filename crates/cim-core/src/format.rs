//! # Open Enumerations
//!
//! Enumerated metadata fields whose registries grow over time: credential
//! formats, cryptographic binding methods, and proof types.
//!
//! Each is a closed set of known variants plus an `Unrecognized(String)`
//! variant carrying the literal verbatim. Unknown values are never rejected
//! and never coerced; they survive a decode/encode round trip unchanged.
//!
//! ## Canonical Form
//!
//! An `Unrecognized` value whose literal spells a known variant (e.g.
//! `Unrecognized("ldp_vc")`) cannot arise from parsing and would not
//! survive a round trip. [`OpenEnum::is_canonical`] detects such values so
//! the encoder can refuse them.

use std::borrow::Cow;
use std::fmt;

/// Shared behavior of the open enumerations.
pub trait OpenEnum: Sized + PartialEq {
    /// Literals of the known variants, in registry order.
    const KNOWN: &'static [&'static str];

    /// Parse a wire literal. Never fails.
    fn parse(literal: &str) -> Self;

    /// The wire literal.
    fn as_str(&self) -> Cow<'_, str>;

    /// Returns true if this value came from a literal outside [`Self::KNOWN`].
    fn is_unrecognized(&self) -> bool;

    /// Returns true if parsing the wire literal yields this exact value.
    fn is_canonical(&self) -> bool {
        Self::parse(&self.as_str()) == *self
    }
}

/// Credential format identifier (`format`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CredentialFormat {
    /// `jwt_vc_json` — JWT-secured VC without JSON-LD.
    JwtVcJson,
    /// `ldp_vc` — Data Integrity secured VC.
    LdpVc,
    /// `jwt_vc_json-ld` — JWT-secured VC using JSON-LD.
    JwtVcJsonLd,
    /// Any other format identifier.
    Unrecognized(String),
}

impl OpenEnum for CredentialFormat {
    const KNOWN: &'static [&'static str] = &["jwt_vc_json", "ldp_vc", "jwt_vc_json-ld"];

    fn parse(literal: &str) -> Self {
        match literal {
            "jwt_vc_json" => Self::JwtVcJson,
            "ldp_vc" => Self::LdpVc,
            "jwt_vc_json-ld" => Self::JwtVcJsonLd,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    fn as_str(&self) -> Cow<'_, str> {
        match self {
            Self::JwtVcJson => Cow::Borrowed("jwt_vc_json"),
            Self::LdpVc => Cow::Borrowed("ldp_vc"),
            Self::JwtVcJsonLd => Cow::Borrowed("jwt_vc_json-ld"),
            Self::Unrecognized(s) => Cow::Borrowed(s),
        }
    }

    fn is_unrecognized(&self) -> bool {
        matches!(self, Self::Unrecognized(_))
    }
}

/// How an issued credential is bound to its holder
/// (`cryptographic_binding_methods_supported` entries).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingMethod {
    /// `jwk` — a key in JWK format.
    Jwk,
    /// `cose_key` — a COSE Key object.
    CoseKey,
    /// `did` (every registered DID method) or `did:<method>`.
    Did {
        /// The method name, `None` for the bare `did` literal.
        method: Option<String>,
    },
    /// Any other binding method.
    Unrecognized(String),
}

impl OpenEnum for BindingMethod {
    const KNOWN: &'static [&'static str] = &["jwk", "cose_key", "did"];

    fn parse(literal: &str) -> Self {
        match literal {
            "jwk" => Self::Jwk,
            "cose_key" => Self::CoseKey,
            "did" => Self::Did { method: None },
            other => match other.strip_prefix("did:") {
                Some(method) if !method.is_empty() && !method.contains(':') => Self::Did {
                    method: Some(method.to_string()),
                },
                _ => Self::Unrecognized(other.to_string()),
            },
        }
    }

    fn as_str(&self) -> Cow<'_, str> {
        match self {
            Self::Jwk => Cow::Borrowed("jwk"),
            Self::CoseKey => Cow::Borrowed("cose_key"),
            Self::Did { method: None } => Cow::Borrowed("did"),
            Self::Did { method: Some(m) } => Cow::Owned(format!("did:{m}")),
            Self::Unrecognized(s) => Cow::Borrowed(s),
        }
    }

    fn is_unrecognized(&self) -> bool {
        matches!(self, Self::Unrecognized(_))
    }
}

/// Key proof type the issuer accepts (`proof_types_supported` entries).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProofType {
    /// `jwt` — the implied default when the field is absent.
    Jwt,
    /// `cwt`.
    Cwt,
    /// `ldp_vp`.
    LdpVp,
    /// Any other proof type.
    Unrecognized(String),
}

impl OpenEnum for ProofType {
    const KNOWN: &'static [&'static str] = &["jwt", "cwt", "ldp_vp"];

    fn parse(literal: &str) -> Self {
        match literal {
            "jwt" => Self::Jwt,
            "cwt" => Self::Cwt,
            "ldp_vp" => Self::LdpVp,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    fn as_str(&self) -> Cow<'_, str> {
        match self {
            Self::Jwt => Cow::Borrowed("jwt"),
            Self::Cwt => Cow::Borrowed("cwt"),
            Self::LdpVp => Cow::Borrowed("ldp_vp"),
            Self::Unrecognized(s) => Cow::Borrowed(s),
        }
    }

    fn is_unrecognized(&self) -> bool {
        matches!(self, Self::Unrecognized(_))
    }
}

macro_rules! display_via_as_str {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.as_str())
                }
            }
        )*
    };
}

display_via_as_str!(CredentialFormat, BindingMethod, ProofType);
