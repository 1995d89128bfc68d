//! # Canonical Serialization — JCS-Compatible Byte Production
//!
//! This module defines `CanonicalBytes`, the sole construction path for the
//! bytes of a canonical metadata document.
//!
//! ## Security Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only way to
//! construct it is through `CanonicalBytes::new()`, which checks the value
//! tree before JCS serialization. Anything that signs or hashes metadata
//! accepts `&CanonicalBytes`, so a non-canonical serialization path cannot
//! reach a digest.
//!
//! ## Rules
//!
//! 1. **Reject `null`** — canonical metadata omits absent optional fields
//!    and never carries `null` placeholders.
//! 2. **Reject floats** — issuer metadata has no numeric fields, and floats
//!    have non-deterministic JCS number serialization edge cases.
//! 3. Serialize per RFC 8785: compact separators, object members sorted by
//!    the UTF-16 code units of their names, strings escaped as
//!    `serde_json` writes them (which matches the RFC's escaping rules).
//!
//! Member names are compared as UTF-16, not as UTF-8 bytes. The two orders
//! disagree once names mix BMP characters above U+E000 with characters
//! outside the BMP (`"\u{fb33}"` sorts after `"\u{1f600}"`).

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;
use crate::path::FieldPath;

/// Bytes produced exclusively by JCS canonicalization of a checked value.
///
/// # Invariants
///
/// - The only constructor is `CanonicalBytes::new()`.
/// - The serialized tree contains no `null` and no non-integer numbers.
/// - Object keys are sorted and separators are compact (RFC 8785).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::NullRejected` or `FloatRejected` if
    /// the value breaks the canonical rules, and `SerializationFailed` if
    /// JCS serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        check_canonical_value(&value)?;
        Ok(Self(write_canonical(&value)?))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The canonical document as text. Canonical bytes are always UTF-8.
    pub fn as_str(&self) -> &str {
        // Written from `str` data and ASCII punctuation only.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the raw bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Walk the value tree with an explicit stack and reject `null` and floats.
fn check_canonical_value(value: &Value) -> Result<(), CanonicalizationError> {
    let mut stack: Vec<(&Value, FieldPath)> = vec![(value, FieldPath::root())];
    while let Some((value, path)) = stack.pop() {
        match value {
            Value::Null => return Err(CanonicalizationError::NullRejected(path)),
            Value::Bool(_) | Value::String(_) => {}
            Value::Number(n) => {
                if !n.is_i64() && !n.is_u64() {
                    if let Some(f) = n.as_f64() {
                        return Err(CanonicalizationError::FloatRejected(f));
                    }
                }
            }
            Value::Array(items) => {
                stack.extend(items.iter().enumerate().map(|(i, v)| (v, path.index(i))));
            }
            Value::Object(map) => {
                stack.extend(map.iter().map(|(k, v)| (v, path.key(k.as_str()))));
            }
        }
    }
    Ok(())
}

enum Step<'a> {
    Value(&'a Value),
    Name(&'a str),
    Raw(&'static [u8]),
}

/// Emit RFC 8785 text for a checked value, walking it with an explicit
/// stack.
fn write_canonical(value: &Value) -> Result<Vec<u8>, CanonicalizationError> {
    let mut out = Vec::new();
    let mut stack = vec![Step::Value(value)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Raw(bytes) => out.extend_from_slice(bytes),
            Step::Name(name) => serde_json::to_writer(&mut out, name)?,
            Step::Value(Value::Object(map)) => {
                let mut members: Vec<(&String, &Value)> = map.iter().collect();
                members.sort_by(|(a, _), (b, _)| a.encode_utf16().cmp(b.encode_utf16()));
                out.push(b'{');
                stack.push(Step::Raw(b"}"));
                for (i, (name, member)) in members.into_iter().enumerate().rev() {
                    stack.push(Step::Value(member));
                    stack.push(Step::Raw(b":"));
                    stack.push(Step::Name(name));
                    if i > 0 {
                        stack.push(Step::Raw(b","));
                    }
                }
            }
            Step::Value(Value::Array(items)) => {
                out.push(b'[');
                stack.push(Step::Raw(b"]"));
                for (i, item) in items.iter().enumerate().rev() {
                    stack.push(Step::Value(item));
                    if i > 0 {
                        stack.push(Step::Raw(b","));
                    }
                }
            }
            Step::Value(scalar) => serde_json::to_writer(&mut out, scalar)?,
        }
    }
    Ok(out)
}
