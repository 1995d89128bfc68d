//! # cim-schema — Schema Registry, Decoder & Canonical Encoder
//!
//! Validates raw Credential Issuer Metadata documents into the typed model
//! of `cim-core` and writes typed values back out in canonical form.
//!
//! ## Registry (`registry`)
//!
//! A static table per record type: wire names, required status, shapes
//! and constraints. [`SchemaRegistry::describe`] renders it as JSON.
//!
//! ## Decoding (`decode`)
//!
//! [`decode`] / [`Decoder::decode`] visit the whole document and either
//! return an [`cim_core::IssuerMetadata`] or every field error found, each
//! with its path from the document root.
//!
//! ## Encoding (`encode`)
//!
//! [`encode`], [`encode_canonical`] and [`digest`] write the canonical JSON
//! tree, its RFC 8785 bytes, and the SHA-256 digest of those bytes. A typed
//! value that breaks an invariant is refused with a single error.
//!
//! ## Claim Trees (`claims`)
//!
//! `credentialSubject` trees are decoded and encoded without native
//! recursion; see [`claims`] for the shape-sniffing rules.
//!
//! ## Crate Policy
//!
//! - Depends only on `cim-core` internally.
//! - The registry is the single source of field names and constraints for
//!   both directions. Adding a field means adding it to the registry and to
//!   the typed model, never to just one codec direction.
//! - Decoding is a trust boundary: invalid documents are rejected with
//!   structured, path-qualified errors.

pub mod claims;
mod constraints;
pub mod decode;
pub mod document;
pub mod encode;
pub mod error;
pub mod options;
pub mod registry;

pub use claims::{sniff, ClaimShape};
pub use decode::{decode, Decoder};
pub use document::{load_document, parse_document, DocumentFormat};
pub use encode::{digest, encode, encode_canonical, Encoder};
pub use error::SchemaError;
pub use options::CodecOptions;
pub use registry::{
    record_spec, Constraint, FieldSpec, RecordSpec, RecordType, ScalarKind, SchemaRegistry, Shape,
};
