//! # Endpoint URLs
//!
//! HTTPS checks for issuer identifiers and endpoint URLs, and derivation of
//! the well-known metadata location for an issuer.
//!
//! Fetching the metadata document is left to the caller's HTTP client;
//! this module only computes where to fetch it from.

use url::Url;

use crate::error::{CimError, FieldErrorKind};

/// Path segment under which issuers publish their metadata.
pub const WELL_KNOWN_SUFFIX: &str = "/.well-known/openid-credential-issuer";

/// Check that `value` is an absolute URL using the https scheme.
///
/// Returns the field error kind to report when it is not.
pub fn check_https_url(value: &str) -> Result<Url, FieldErrorKind> {
    let url = Url::parse(value).map_err(|e| FieldErrorKind::MalformedUrl {
        reason: e.to_string(),
    })?;
    if url.scheme() != "https" {
        return Err(FieldErrorKind::InvalidUrlScheme {
            scheme: url.scheme().to_string(),
        });
    }
    Ok(url)
}

/// The URL at which the issuer identified by `issuer` publishes its
/// metadata: the identifier with [`WELL_KNOWN_SUFFIX`] appended.
///
/// # Errors
///
/// Returns `CimError::InvalidIssuer` if the identifier is not an https URL
/// or carries a query or fragment component.
pub fn well_known_url(issuer: &str) -> Result<Url, CimError> {
    let invalid = |reason: String| CimError::InvalidIssuer {
        issuer: issuer.to_string(),
        reason,
    };
    let parsed = check_https_url(issuer).map_err(|kind| invalid(kind.to_string()))?;
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("issuer identifier must not contain query or fragment".into()));
    }
    let base = issuer.strip_suffix('/').unwrap_or(issuer);
    Url::parse(&format!("{base}{WELL_KNOWN_SUFFIX}")).map_err(|e| invalid(e.to_string()))
}
