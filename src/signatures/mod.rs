//! CMS signature verification module.
//!
//! This module checks that a `.p7s` signer's signature value matches the
//! content it claims to sign.
//!
//! ## Features
//!
//! - **Detached and attached signatures**: detached ones take the original
//!   document bytes, attached ones hash their own eContent
//! - **Signed attributes**: the message-digest attribute is compared to the
//!   content digest before the signature over the attributes is checked
//! - **Pluggable crypto**: hashing and public-key operations go through the
//!   [`CryptoEngine`] trait
//!
//! ## Supported Algorithms
//!
//! - Digests: MD5, SHA-1, SHA-224, SHA-256, SHA-384, SHA-512
//! - Signatures: RSA PKCS#1 v1.5, RSASSA-PSS, ECDSA P-256 and P-384
//!
//! ## Example
//!
//! ```ignore
//! use p7s_oxide::signatures::SignatureVerifier;
//! use p7s_oxide::VerifyOptions;
//!
//! let verifier = SignatureVerifier::new();
//! let outcome = verifier.verify(&p7s, Some(&pdf), &VerifyOptions::default())?;
//! if !outcome.ok {
//!     println!("{}", outcome.reason.unwrap_or_default());
//! }
//! ```
//!
//! Certificate chains, trust anchors and revocation are out of scope: a
//! valid outcome only means the signature matches the content.

mod engine;
mod types;
mod verifier;

pub use engine::{CryptoEngine, RustCryptoEngine};
pub use types::{DigestAlgorithm, FailureKind, SignatureAlgorithm, VerificationOutcome};
pub use verifier::{find_signer_certificate, SignatureVerifier};
