//! Display-safe summary types for `.p7s` messages.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Public projection of a decoded SignedData, suitable for display.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureSummary {
    /// True only if the content type is id-signedData
    pub is_signed_data: bool,
    /// True when the encapsulated content is absent
    pub detached: bool,
    /// Dotted OID of the first declared digest algorithm
    pub digest_algorithm: Option<String>,
    /// One entry per SignerInfo, in order of appearance
    pub signers: Vec<SignerDescriptor>,
}

impl SignatureSummary {
    /// Summary for a ContentInfo whose content type is not SignedData.
    pub fn not_signed_data() -> Self {
        Self::default()
    }

    /// Display name of the first digest algorithm (`SHA-256`), if any.
    pub fn digest_algorithm_name(&self) -> Option<String> {
        let dotted = self.digest_algorithm.as_deref()?;
        let name = dotted
            .parse::<der::asn1::ObjectIdentifier>()
            .map(|oid| super::oid::display_name(&oid))
            .unwrap_or_else(|_| dotted.to_string());
        Some(name)
    }
}

/// Per-signer metadata, extracted without resolving the signer certificate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerDescriptor {
    /// Never populated: the signer certificate subject is not resolved
    pub common_name: Option<String>,
    /// Decimal serial number, when the signer is identified by issuer and serial
    pub serial_number: Option<String>,
    /// Issuer rendered as `type=value` pairs joined by `, `
    pub issuer_distinguished_name: Option<String>,
    /// Value of the signing-time signed attribute
    pub signing_time: Option<DateTime<Utc>>,
}
