//! CMS/PKCS#7 `.p7s` decoding.
//!
//! Turns raw BER or DER bytes into a [`SignatureSummary`] for display and
//! into a [`ParsedSignedData`] for the verifier.
//!
//! ## Example
//!
//! ```ignore
//! use p7s_oxide::cms::summarize;
//!
//! let summary = summarize(&std::fs::read("document.pdf.p7s")?)?;
//! for signer in &summary.signers {
//!     println!("{:?} {:?}", signer.issuer_distinguished_name, signer.signing_time);
//! }
//! ```
//!
//! ## References
//!
//! - RFC 5652 - Cryptographic Message Syntax
//! - ITU-T X.690 - BER and DER encoding rules

pub mod ber;
mod certificate;
pub mod oid;
pub mod signed_data;
mod summary;
mod types;

pub use certificate::SignerCertificate;
pub use signed_data::{decode, DecodedMessage, ParsedSignedData, ParsedSigner, SignerId};
pub use summary::{describe, render_issuer, render_name, serial_to_decimal, summarize};
pub use types::{SignatureSummary, SignerDescriptor};
