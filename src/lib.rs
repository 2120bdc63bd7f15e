//! # P7S Oxide
//!
//! Detached PKCS#7/CMS (`.p7s`) signature summarization and cryptographic
//! verification for document-signature validation portals.
//!
//! ## Core Features
//!
//! - **Summaries**: content type, detached flag, digest algorithm and per-signer
//!   metadata (issuer, serial number, signing time) straight from the SignedData
//! - **BER and DER**: streamed BER output (indefinite lengths, chunked OCTET
//!   STRINGs) is accepted alongside DER
//! - **Verification**: detached or attached content, with or without signed
//!   attributes, RSA (PKCS#1 v1.5, PSS) and ECDSA (P-256, P-384)
//! - **Structured outcomes**: expected negatives (not a SignedData, missing
//!   document, mismatch) are data, not errors
//!
//! Certificate chain, trust-anchor and revocation checks are deliberately
//! not performed: a valid outcome answers "does this signature match this
//! content", not "should this signer be trusted".
//!
//! ## Quick Start
//!
//! ```ignore
//! use p7s_oxide::{summarize, verify, VerifyOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let p7s = std::fs::read("contrato.pdf.p7s")?;
//! let pdf = std::fs::read("contrato.pdf")?;
//!
//! let summary = summarize(&p7s)?;
//! println!("detached: {}, signers: {}", summary.detached, summary.signers.len());
//!
//! let outcome = verify(&p7s, Some(&pdf), &VerifyOptions::default())?;
//! println!("ok: {} {:?}", outcome.ok, outcome.reason);
//! # Ok(())
//! # }
//! ```
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// CMS/PKCS#7 decoding
pub mod cms;

// Signature verification
pub mod signatures;

// Upload handling
pub mod input;

// Re-exports
pub use crate::cms::{summarize, SignatureSummary, SignerDescriptor};
pub use config::VerifyOptions;
pub use error::{Error, Result};
pub use input::{read_input, user_message, InputKind};
pub use signatures::{
    CryptoEngine, FailureKind, RustCryptoEngine, SignatureVerifier, VerificationOutcome,
};

/// Verify a `.p7s` with the default [`RustCryptoEngine`].
///
/// See [`SignatureVerifier::verify`].
pub fn verify(
    p7s: &[u8],
    content: Option<&[u8]>,
    options: &VerifyOptions,
) -> Result<VerificationOutcome> {
    SignatureVerifier::new().verify(p7s, content, options)
}

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        // VERSION is populated from CARGO_PKG_VERSION at compile time
        assert!(VERSION.starts_with("0."));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "p7s_oxide");
    }
}
