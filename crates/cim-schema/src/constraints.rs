//! Field constraints, checked against JSON values.
//!
//! The decoder runs these on the raw member after its shape has been
//! accepted; the encoder runs them on the member it is about to emit and
//! turns the first error into an invariant violation. Both directions
//! therefore enforce the same rules from the same registry entry.

use std::collections::HashSet;

use cim_core::{check_https_url, FieldError, FieldErrorKind, FieldPath};
use serde_json::Value;

use crate::options::CodecOptions;
use crate::registry::{Constraint, FieldSpec};

/// Check every constraint declared on `field` against `value`, appending
/// errors to `errors`.
pub(crate) fn check(
    field: &FieldSpec,
    value: &Value,
    path: &FieldPath,
    options: &CodecOptions,
    errors: &mut Vec<FieldError>,
) {
    for constraint in field.constraints {
        match constraint {
            Constraint::HttpsUrl => {
                if options.enforce_https {
                    https_url(value, path, errors);
                }
            }
            Constraint::NonEmpty => non_empty(value, path, errors),
            Constraint::UniqueItems => unique_items(value, path, errors),
            Constraint::UniqueLocale => unique_locale(value, path, errors),
        }
    }
}

fn https_url(value: &Value, path: &FieldPath, errors: &mut Vec<FieldError>) {
    if let Some(s) = value.as_str() {
        if let Err(kind) = check_https_url(s) {
            errors.push(FieldError::new(path.clone(), kind));
        }
    }
}

fn non_empty(value: &Value, path: &FieldPath, errors: &mut Vec<FieldError>) {
    if value.as_array().is_some_and(Vec::is_empty) {
        errors.push(FieldError::new(
            path.clone(),
            FieldErrorKind::TypeMismatch {
                expected: "non-empty array of string".into(),
                actual: "empty array".into(),
            },
        ));
    }
}

fn unique_items(value: &Value, path: &FieldPath, errors: &mut Vec<FieldError>) {
    let Some(items) = value.as_array() else {
        return;
    };
    let mut seen = HashSet::new();
    for (i, item) in items.iter().enumerate() {
        if let Some(s) = item.as_str() {
            if !seen.insert(s) {
                errors.push(FieldError::new(
                    path.index(i),
                    FieldErrorKind::DuplicateEntry { value: s.to_string() },
                ));
            }
        }
    }
}

fn unique_locale(value: &Value, path: &FieldPath, errors: &mut Vec<FieldError>) {
    let Some(entries) = value.as_array() else {
        return;
    };
    let mut seen: HashSet<Option<&str>> = HashSet::new();
    for (i, entry) in entries.iter().enumerate() {
        let locale = entry.get("locale").and_then(Value::as_str);
        if !seen.insert(locale) {
            let at = match locale {
                Some(_) => path.index(i).key("locale"),
                None => path.index(i),
            };
            errors.push(FieldError::new(
                at,
                FieldErrorKind::DuplicateLocale {
                    locale: locale.map(str::to_string),
                },
            ));
        }
    }
}
