//! # cim-core — Foundational Types for Credential Issuer Metadata
//!
//! This crate defines the typed model of the Credential Issuer Metadata
//! document and the primitives every other crate in the workspace builds
//! on. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Explicit sum types for untagged unions.** A claim value is a
//!    [`ClaimValue`] with three named variants. The structural sniffing that
//!    picks the variant happens once, in the decoder.
//!
//! 2. **Open enums.** `format`, binding methods and proof types keep an
//!    `Unrecognized(String)` variant so new registry values round-trip
//!    unchanged.
//!
//! 3. **Composition over inheritance.** [`CredentialDisplay`] embeds a
//!    [`BaseDisplay`] by value.
//!
//! 4. **`CanonicalBytes` newtype.** All digest computation flows through
//!    `CanonicalBytes::new()`; [`sha256_digest()`] accepts nothing else.
//!
//! 5. **No native recursion over claim trees.** Traversals and `Drop` use
//!    explicit stacks.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cim-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod claims;
pub mod digest;
pub mod endpoint;
pub mod error;
pub mod format;
pub mod metadata;
pub mod path;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use claims::{ClaimLeaf, ClaimNode, ClaimValue, CredentialDefinition};
pub use digest::{sha256_digest, ContentDigest};
pub use endpoint::{check_https_url, well_known_url, WELL_KNOWN_SUFFIX};
pub use error::{
    CanonicalizationError, CimError, DecodeErrors, EncodeError, FieldError, FieldErrorKind,
};
pub use format::{BindingMethod, CredentialFormat, OpenEnum, ProofType};
pub use metadata::{
    display_for_locale, duplicate_locale, BaseDisplay, CredentialDisplay, CredentialMetadata,
    IssuerMetadata, Localized, Logo,
};
pub use path::{FieldPath, PathSegment};
