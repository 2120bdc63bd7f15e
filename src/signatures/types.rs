//! Signature verification types and data structures.

use crate::cms::oid;
use crate::cms::SignatureSummary;
use crate::error::{Error, Result};
use const_oid::db::rfc5912;
use der::asn1::ObjectIdentifier;
use serde::Serialize;

/// Digest algorithm declared by a signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DigestAlgorithm {
    /// MD5 (broken, still found in very old signatures)
    Md5,
    /// SHA-1 (deprecated, but still common in legacy signatures)
    Sha1,
    /// SHA-224
    Sha224,
    /// SHA-256 (recommended)
    #[default]
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl DigestAlgorithm {
    /// Get the OID for this digest algorithm.
    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            DigestAlgorithm::Md5 => rfc5912::ID_MD_5,
            DigestAlgorithm::Sha1 => rfc5912::ID_SHA_1,
            DigestAlgorithm::Sha224 => rfc5912::ID_SHA_224,
            DigestAlgorithm::Sha256 => rfc5912::ID_SHA_256,
            DigestAlgorithm::Sha384 => rfc5912::ID_SHA_384,
            DigestAlgorithm::Sha512 => rfc5912::ID_SHA_512,
        }
    }

    /// Get the name of this algorithm.
    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "MD5",
            DigestAlgorithm::Sha1 => "SHA-1",
            DigestAlgorithm::Sha224 => "SHA-224",
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Sha384 => "SHA-384",
            DigestAlgorithm::Sha512 => "SHA-512",
        }
    }

    /// Output length in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            DigestAlgorithm::Md5 => 16,
            DigestAlgorithm::Sha1 => 20,
            DigestAlgorithm::Sha224 => 28,
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha384 => 48,
            DigestAlgorithm::Sha512 => 64,
        }
    }

    /// Look up a digest algorithm by OID.
    pub fn from_oid(algorithm: &ObjectIdentifier) -> Result<Self> {
        [
            DigestAlgorithm::Md5,
            DigestAlgorithm::Sha1,
            DigestAlgorithm::Sha224,
            DigestAlgorithm::Sha256,
            DigestAlgorithm::Sha384,
            DigestAlgorithm::Sha512,
        ]
        .into_iter()
        .find(|alg| alg.oid() == *algorithm)
        .ok_or_else(|| Error::UnsupportedAlgorithm(format!("digest algorithm {}", algorithm)))
    }
}

/// Signature scheme of a SignerInfo.
///
/// The hash is always the signer's [`DigestAlgorithm`]; the combined
/// `sha256WithRSAEncryption`-style OIDs only select the scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    /// RSASSA-PKCS1-v1_5
    RsaPkcs1v15,
    /// RSASSA-PSS
    RsaPss,
    /// ECDSA over a named curve
    Ecdsa,
}

impl SignatureAlgorithm {
    /// Look up a signature scheme by OID.
    pub fn from_oid(algorithm: &ObjectIdentifier) -> Result<Self> {
        let rsa_oids = [
            rfc5912::RSA_ENCRYPTION,
            rfc5912::MD_5_WITH_RSA_ENCRYPTION,
            rfc5912::SHA_1_WITH_RSA_ENCRYPTION,
            rfc5912::SHA_224_WITH_RSA_ENCRYPTION,
            rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
            rfc5912::SHA_384_WITH_RSA_ENCRYPTION,
            rfc5912::SHA_512_WITH_RSA_ENCRYPTION,
        ];
        let ecdsa_oids = [
            rfc5912::ID_EC_PUBLIC_KEY,
            oid::ECDSA_WITH_SHA1,
            rfc5912::ECDSA_WITH_SHA_224,
            rfc5912::ECDSA_WITH_SHA_256,
            rfc5912::ECDSA_WITH_SHA_384,
            rfc5912::ECDSA_WITH_SHA_512,
        ];

        if rsa_oids.contains(algorithm) {
            Ok(SignatureAlgorithm::RsaPkcs1v15)
        } else if *algorithm == rfc5912::ID_RSASSA_PSS {
            Ok(SignatureAlgorithm::RsaPss)
        } else if ecdsa_oids.contains(algorithm) {
            Ok(SignatureAlgorithm::Ecdsa)
        } else {
            Err(Error::UnsupportedAlgorithm(format!("signature algorithm {}", algorithm)))
        }
    }

    /// Get the name of this scheme.
    pub fn name(&self) -> &'static str {
        match self {
            SignatureAlgorithm::RsaPkcs1v15 => "RSA PKCS#1 v1.5",
            SignatureAlgorithm::RsaPss => "RSASSA-PSS",
            SignatureAlgorithm::Ecdsa => "ECDSA",
        }
    }
}

/// Why a verification came out negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// Content type is not id-signedData
    NotSignedData,
    /// Detached signature verified without the signed document
    MissingDetachedContent,
    /// Digest or signature value does not match the content
    SignatureMismatch,
    /// Evaluation failed (unsupported algorithm, bad key, missing certificate)
    VerificationException,
}

impl FailureKind {
    /// Default human-readable reason.
    pub fn reason(&self) -> &'static str {
        match self {
            FailureKind::NotSignedData => "not a CMS SignedData (.p7s) structure",
            FailureKind::MissingDetachedContent => "content required for detached signature",
            FailureKind::SignatureMismatch => "signature does not match document content",
            FailureKind::VerificationException => "signature verification failed",
        }
    }
}

/// Result of verifying one signer of a `.p7s` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    /// Whether the signature value matches the content
    pub ok: bool,
    /// Human-readable failure reason, set only when `ok` is false
    pub reason: Option<String>,
    /// Failure category, set only when `ok` is false
    pub failure: Option<FailureKind>,
    /// Summary of the decoded message
    pub summary: SignatureSummary,
}

impl VerificationOutcome {
    /// A successful verification.
    pub fn valid(summary: SignatureSummary) -> Self {
        Self {
            ok: true,
            reason: None,
            failure: None,
            summary,
        }
    }

    /// A negative outcome with the default reason for `kind`.
    pub fn failed(kind: FailureKind, summary: SignatureSummary) -> Self {
        Self::failed_with(kind, kind.reason(), summary)
    }

    /// A negative outcome with an explicit reason.
    pub fn failed_with(
        kind: FailureKind,
        reason: impl Into<String>,
        summary: SignatureSummary,
    ) -> Self {
        Self {
            ok: false,
            reason: Some(reason.into()),
            failure: Some(kind),
            summary,
        }
    }

    /// Pretty-printed JSON for API responses and the command line.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_algorithm_names() {
        assert_eq!(DigestAlgorithm::Sha256.name(), "SHA-256");
        assert_eq!(DigestAlgorithm::Sha1.name(), "SHA-1");
        assert_eq!(DigestAlgorithm::default(), DigestAlgorithm::Sha256);
    }

    #[test]
    fn test_digest_algorithm_from_oid() {
        assert_eq!(DigestAlgorithm::from_oid(&rfc5912::ID_SHA_384).unwrap(), DigestAlgorithm::Sha384);
        assert_eq!(DigestAlgorithm::from_oid(&rfc5912::ID_MD_5).unwrap(), DigestAlgorithm::Md5);

        let err = DigestAlgorithm::from_oid(&rfc5912::RSA_ENCRYPTION).unwrap_err();
        assert!(matches!(err, Error::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn test_signature_algorithm_from_oid() {
        assert_eq!(
            SignatureAlgorithm::from_oid(&rfc5912::RSA_ENCRYPTION).unwrap(),
            SignatureAlgorithm::RsaPkcs1v15
        );
        assert_eq!(
            SignatureAlgorithm::from_oid(&rfc5912::SHA_256_WITH_RSA_ENCRYPTION).unwrap(),
            SignatureAlgorithm::RsaPkcs1v15
        );
        assert_eq!(
            SignatureAlgorithm::from_oid(&rfc5912::ECDSA_WITH_SHA_256).unwrap(),
            SignatureAlgorithm::Ecdsa
        );
        assert_eq!(SignatureAlgorithm::from_oid(&rfc5912::ID_RSASSA_PSS).unwrap(), SignatureAlgorithm::RsaPss);
        assert!(SignatureAlgorithm::from_oid(&rfc5912::ID_SHA_256).is_err());
    }

    #[test]
    fn test_failure_reasons_are_distinct() {
        let kinds = [
            FailureKind::NotSignedData,
            FailureKind::MissingDetachedContent,
            FailureKind::SignatureMismatch,
            FailureKind::VerificationException,
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a.reason(), b.reason());
            }
        }
    }

    #[test]
    fn test_outcome_constructors() {
        let ok = VerificationOutcome::valid(SignatureSummary::default());
        assert!(ok.ok);
        assert!(ok.reason.is_none());

        let failed = VerificationOutcome::failed(
            FailureKind::MissingDetachedContent,
            SignatureSummary::default(),
        );
        assert!(!failed.ok);
        assert_eq!(failed.reason.as_deref(), Some("content required for detached signature"));
    }

    #[test]
    fn test_outcome_serializes_failure_kind() {
        let outcome = VerificationOutcome::failed(
            FailureKind::SignatureMismatch,
            SignatureSummary::not_signed_data(),
        );
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["failure"], "signatureMismatch");
        assert_eq!(json["summary"]["isSignedData"], false);
    }

    #[test]
    fn test_outcome_to_json() {
        let json = VerificationOutcome::valid(SignatureSummary::default()).to_json().unwrap();
        assert!(json.contains("\"ok\": true"));
        assert!(json.contains("\"reason\": null"));
    }
}
