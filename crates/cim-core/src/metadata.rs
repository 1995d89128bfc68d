//! # Issuer Metadata Model
//!
//! Typed records for the Credential Issuer Metadata document. Every record
//! is an immutable value once the decoder has produced it; equality is
//! structural.
//!
//! Field names here are Rust names. The wire names (`credential_issuer`,
//! `credentials_supported`, `alt_text`, ...) live in the schema registry
//! of `cim-schema` and nowhere else.

use std::collections::BTreeMap;

use crate::claims::CredentialDefinition;
use crate::format::{BindingMethod, CredentialFormat, ProofType};

/// Display properties shared by issuer, credential and claim displays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BaseDisplay {
    /// Display name.
    pub name: Option<String>,
    /// BCP 47 language tag.
    pub locale: Option<String>,
}

impl BaseDisplay {
    /// A display entry with a name and locale.
    pub fn new(name: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            locale: Some(locale.into()),
        }
    }
}

/// Logo of a credential.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Logo {
    /// Where the wallet can obtain the image.
    pub url: Option<String>,
    /// Alternative text for the image.
    pub alt_text: Option<String>,
}

/// Display properties of a supported credential.
///
/// Embeds [`BaseDisplay`] by value rather than extending it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CredentialDisplay {
    pub base: BaseDisplay,
    pub description: Option<String>,
    pub logo: Option<Logo>,
    /// CSS color value; not checked for color syntax.
    pub background_color: Option<String>,
    /// CSS color value; not checked for color syntax.
    pub text_color: Option<String>,
}

/// Access to the locale of a display entry, for locale lookup and the
/// one-entry-per-locale rule.
pub trait Localized {
    fn locale(&self) -> Option<&str>;
}

impl Localized for BaseDisplay {
    fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }
}

impl Localized for CredentialDisplay {
    fn locale(&self) -> Option<&str> {
        self.base.locale.as_deref()
    }
}

/// Pick the display entry for `locale`.
///
/// Exact match first, then any entry with the same primary language
/// subtag (`en` matches `en-US` and `en-GB`), then the entry without a
/// locale. Comparison ignores ASCII case.
pub fn display_for_locale<'a, T: Localized>(entries: &'a [T], locale: &str) -> Option<&'a T> {
    let primary = locale.split('-').next().unwrap_or(locale);
    entries
        .iter()
        .find(|d| d.locale().is_some_and(|l| l.eq_ignore_ascii_case(locale)))
        .or_else(|| {
            entries.iter().find(|d| {
                d.locale()
                    .and_then(|l| l.split('-').next())
                    .is_some_and(|p| p.eq_ignore_ascii_case(primary))
            })
        })
        .or_else(|| entries.iter().find(|d| d.locale().is_none()))
}

/// Returns the first locale that appears more than once in `entries`.
///
/// The outer `Option` says whether a duplicate exists; the inner one is the
/// duplicated locale (`None` for two entries without a locale). Locales
/// compare exactly, as written.
pub fn duplicate_locale<T: Localized>(entries: &[T]) -> Option<(usize, Option<&str>)> {
    let mut seen = std::collections::HashSet::new();
    for (i, entry) in entries.iter().enumerate() {
        if !seen.insert(entry.locale()) {
            return Some((i, entry.locale()));
        }
    }
    None
}

/// Metadata about one supported credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialMetadata {
    pub format: CredentialFormat,
    /// OAuth scope the wallet may request for this credential.
    pub scope: Option<String>,
    pub cryptographic_binding_methods_supported: Option<Vec<BindingMethod>>,
    /// Algorithm or suite names; free-form strings.
    pub cryptographic_suites_supported: Option<Vec<String>>,
    pub proof_types_supported: Option<Vec<ProofType>>,
    pub display: Option<Vec<CredentialDisplay>>,
    pub credential_definition: CredentialDefinition,
}

impl CredentialMetadata {
    /// Credential metadata with only the required fields set.
    pub fn new(format: CredentialFormat, credential_definition: CredentialDefinition) -> Self {
        Self {
            format,
            scope: None,
            cryptographic_binding_methods_supported: None,
            cryptographic_suites_supported: None,
            proof_types_supported: None,
            display: None,
            credential_definition,
        }
    }

    /// Proof types in effect: the declared list, or `jwt` when the field
    /// is absent.
    pub fn effective_proof_types(&self) -> Vec<ProofType> {
        self.proof_types_supported
            .clone()
            .unwrap_or_else(|| vec![ProofType::Jwt])
    }

    /// Display entry for a language tag.
    pub fn display_for_locale(&self, locale: &str) -> Option<&CredentialDisplay> {
        self.display
            .as_deref()
            .and_then(|d| display_for_locale(d, locale))
    }
}

/// The Credential Issuer Metadata document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuerMetadata {
    /// The Credential Issuer identifier (`credential_issuer`).
    pub credential_issuer: String,
    pub authorization_servers: Option<Vec<String>>,
    pub credential_endpoint: String,
    pub batch_credential_endpoint: Option<String>,
    pub deferred_credential_endpoint: Option<String>,
    pub display: Option<Vec<BaseDisplay>>,
    /// Supported credentials keyed by the identifier used in credential
    /// offers.
    pub credentials_supported: BTreeMap<String, CredentialMetadata>,
}

impl IssuerMetadata {
    /// Issuer metadata with only the required fields set.
    pub fn new(
        credential_issuer: impl Into<String>,
        credential_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            credential_issuer: credential_issuer.into(),
            authorization_servers: None,
            credential_endpoint: credential_endpoint.into(),
            batch_credential_endpoint: None,
            deferred_credential_endpoint: None,
            display: None,
            credentials_supported: BTreeMap::new(),
        }
    }

    /// Builder: add a supported credential.
    pub fn with_credential(mut self, id: impl Into<String>, credential: CredentialMetadata) -> Self {
        self.credentials_supported.insert(id.into(), credential);
        self
    }

    /// Look up a supported credential by its offer identifier.
    pub fn credential(&self, id: &str) -> Option<&CredentialMetadata> {
        self.credentials_supported.get(id)
    }

    /// Authorization servers in effect. When the field is omitted the
    /// issuer is its own authorization server.
    pub fn effective_authorization_servers(&self) -> Vec<&str> {
        match &self.authorization_servers {
            Some(servers) => servers.iter().map(String::as_str).collect(),
            None => vec![self.credential_issuer.as_str()],
        }
    }

    /// Whether an `authorization_server` hint from a credential offer may be
    /// used with this issuer.
    pub fn accepts_authorization_server(&self, server: &str) -> bool {
        self.effective_authorization_servers().contains(&server)
    }

    /// Issuer display entry for a language tag.
    pub fn display_for_locale(&self, locale: &str) -> Option<&BaseDisplay> {
        self.display
            .as_deref()
            .and_then(|d| display_for_locale(d, locale))
    }

    /// Identifiers of supported credentials whose definition lists `ty`.
    pub fn credentials_of_type<'a>(&'a self, ty: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.credentials_supported
            .iter()
            .filter(move |(_, c)| c.credential_definition.has_type(ty))
            .map(|(id, _)| id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn degree() -> CredentialMetadata {
        CredentialMetadata::new(
            CredentialFormat::JwtVcJson,
            CredentialDefinition::new(["VerifiableCredential", "UniversityDegreeCredential"]),
        )
    }

    #[test]
    fn test_effective_authorization_servers_defaults_to_issuer() {
        let m = IssuerMetadata::new("https://issuer.example", "https://issuer.example/credential");
        assert_eq!(m.effective_authorization_servers(), vec!["https://issuer.example"]);
        assert!(m.accepts_authorization_server("https://issuer.example"));

        let mut m = m;
        m.authorization_servers = Some(vec!["https://as.example".into()]);
        assert_eq!(m.effective_authorization_servers(), vec!["https://as.example"]);
        assert!(!m.accepts_authorization_server("https://issuer.example"));
    }

    #[test]
    fn test_effective_proof_types_defaults_to_jwt() {
        let mut c = degree();
        assert_eq!(c.effective_proof_types(), vec![ProofType::Jwt]);
        c.proof_types_supported = Some(vec![ProofType::Cwt]);
        assert_eq!(c.effective_proof_types(), vec![ProofType::Cwt]);
    }

    #[test]
    fn test_display_for_locale_fallbacks() {
        let entries = vec![
            BaseDisplay::new("Issuer", "en"),
            BaseDisplay::new("Aussteller", "de-DE"),
            BaseDisplay {
                name: Some("Default".into()),
                locale: None,
            },
        ];
        assert_eq!(display_for_locale(&entries, "de-DE").unwrap().name.as_deref(), Some("Aussteller"));
        assert_eq!(display_for_locale(&entries, "en-US").unwrap().name.as_deref(), Some("Issuer"));
        assert_eq!(display_for_locale(&entries, "de").unwrap().name.as_deref(), Some("Aussteller"));
        assert_eq!(display_for_locale(&entries, "fr").unwrap().name.as_deref(), Some("Default"));
    }

    #[test]
    fn test_duplicate_locale_detection() {
        let entries = vec![BaseDisplay::new("A", "en"), BaseDisplay::new("B", "en")];
        assert_eq!(duplicate_locale(&entries), Some((1, Some("en"))));

        let entries = vec![BaseDisplay::default(), BaseDisplay::default()];
        assert_eq!(duplicate_locale(&entries), Some((1, None)));

        let entries = vec![BaseDisplay::new("A", "en"), BaseDisplay::new("B", "en-US")];
        assert_eq!(duplicate_locale(&entries), None);
    }

    #[test]
    fn test_credential_lookup() {
        let m = IssuerMetadata::new("https://issuer.example", "https://issuer.example/credential")
            .with_credential("UniversityDegree_JWT", degree());
        assert!(m.credential("UniversityDegree_JWT").is_some());
        assert!(m.credential("missing").is_none());
        let ids: Vec<&str> = m.credentials_of_type("UniversityDegreeCredential").collect();
        assert_eq!(ids, vec!["UniversityDegree_JWT"]);
    }
}
