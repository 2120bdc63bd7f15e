//! `.p7s` signature verification.
//!
//! Confirms that a signer's signature value matches the signed content
//! (RFC 5652 §5.4). The signer certificate is only used as a key carrier:
//! chain building, trust anchors and revocation are never consulted.

use super::engine::{CryptoEngine, RustCryptoEngine};
use super::types::{DigestAlgorithm, FailureKind, SignatureAlgorithm, VerificationOutcome};
use crate::cms::{
    self, signed_data, DecodedMessage, ParsedSignedData, ParsedSigner, SignatureSummary,
    SignerCertificate, SignerId,
};
use crate::config::VerifyOptions;
use crate::error::{Error, Result};
use std::sync::Arc;

const DIGEST_MISMATCH: &str = "message digest does not match document content";

/// Verifier for detached and attached CMS signatures.
///
/// Holds nothing but a shared, stateless [`CryptoEngine`], so one instance
/// can serve concurrent requests.
#[derive(Clone)]
pub struct SignatureVerifier {
    engine: Arc<dyn CryptoEngine>,
}

enum Check {
    Valid,
    Mismatch(&'static str),
}

impl SignatureVerifier {
    /// Create a verifier backed by [`RustCryptoEngine`].
    pub fn new() -> Self {
        Self::with_engine(Arc::new(RustCryptoEngine::new()))
    }

    /// Create a verifier backed by a custom engine.
    pub fn with_engine(engine: Arc<dyn CryptoEngine>) -> Self {
        Self { engine }
    }

    /// Verify one signer of `p7s`.
    ///
    /// `content` is the original document and is required when the
    /// signature is detached; it is ignored when the content is attached.
    /// Only input that cannot be decoded at all is returned as `Err`; every
    /// other failure is reported on the outcome.
    pub fn verify(
        &self,
        p7s: &[u8],
        content: Option<&[u8]>,
        options: &VerifyOptions,
    ) -> Result<VerificationOutcome> {
        let parsed = match cms::decode(p7s)? {
            DecodedMessage::SignedData(parsed) => parsed,
            DecodedMessage::Other(content_type) => {
                log::info!("Rejecting ContentInfo of type {}", content_type);
                return Ok(VerificationOutcome::failed(
                    FailureKind::NotSignedData,
                    SignatureSummary::not_signed_data(),
                ));
            },
        };
        let summary = cms::describe(&parsed);

        let content = match parsed.encapsulated_content() {
            Some(attached) => {
                if content.is_some() {
                    log::debug!("Ignoring supplied content for an attached signature");
                }
                attached
            },
            None => match content {
                Some(detached) => detached,
                None => {
                    return Ok(VerificationOutcome::failed(
                        FailureKind::MissingDetachedContent,
                        summary,
                    ))
                },
            },
        };

        let index = options.signer_index;
        let Some(signer) = parsed.signer_infos.get(index) else {
            let reason = format!(
                "signer index {} out of range ({} signers)",
                index,
                parsed.signer_infos.len()
            );
            return Ok(VerificationOutcome::failed_with(
                FailureKind::VerificationException,
                reason,
                summary,
            ));
        };

        let outcome = match self.check_signer(&parsed, signer, content) {
            Ok(Check::Valid) => {
                log::info!("Signer {} verified", index);
                VerificationOutcome::valid(summary)
            },
            Ok(Check::Mismatch(reason)) => {
                log::info!("Signer {} rejected: {}", index, reason);
                VerificationOutcome::failed_with(FailureKind::SignatureMismatch, reason, summary)
            },
            Err(e) => {
                log::warn!("Signer {} could not be verified: {}", index, e);
                VerificationOutcome::failed_with(
                    FailureKind::VerificationException,
                    e.to_string(),
                    summary,
                )
            },
        };
        Ok(outcome)
    }

    fn check_signer(
        &self,
        parsed: &ParsedSignedData,
        signer: &ParsedSigner,
        content: &[u8],
    ) -> Result<Check> {
        let digest_algorithm = DigestAlgorithm::from_oid(&signer.digest_alg.oid)?;
        let signature_algorithm = SignatureAlgorithm::from_oid(&signer.signature_algorithm.oid)?;
        let certificate = find_signer_certificate(&parsed.certificates, &signer.sid)?;

        log::debug!(
            "Verifying {} with {} over {} content bytes",
            signature_algorithm.name(),
            digest_algorithm.name(),
            content.len()
        );

        let content_digest = self.engine.digest(digest_algorithm, content)?;

        let signed_digest = match signed_data::signed_attributes_der(signer) {
            Some(attributes) => {
                let asserted = signed_data::message_digest(signer)?.ok_or_else(|| {
                    Error::MalformedEncoding(
                        "signed attributes lack a message-digest attribute".to_string(),
                    )
                })?;
                if asserted != content_digest {
                    return Ok(Check::Mismatch(DIGEST_MISMATCH));
                }
                self.engine.digest(digest_algorithm, attributes)?
            },
            None => content_digest,
        };

        let verified = self.engine.verify_signature(
            signature_algorithm,
            digest_algorithm,
            &signed_digest,
            signer.signature.as_bytes(),
            &certificate.subject_public_key_info,
        )?;

        if verified {
            Ok(Check::Valid)
        } else {
            Ok(Check::Mismatch(FailureKind::SignatureMismatch.reason()))
        }
    }
}

impl Default for SignatureVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier").finish_non_exhaustive()
    }
}

/// Find the certificate named by a signer identifier.
///
/// Certificates are decoded one at a time; entries that do not decode are
/// skipped rather than failing the lookup.
pub fn find_signer_certificate(
    certificates: &[Vec<u8>],
    sid: &SignerId,
) -> Result<SignerCertificate> {
    for (index, encoded) in certificates.iter().enumerate() {
        match SignerCertificate::from_der(encoded) {
            Ok(cert) if cert.matches(sid) => return Ok(cert),
            Ok(_) => {},
            Err(e) => log::warn!("Skipping certificate {}: {}", index, e),
        }
    }

    let who = match sid {
        SignerId::IssuerAndSerialNumber {
            issuer,
            serial_number,
        } => format!(
            "issuer {} serial {}",
            cms::render_issuer(issuer).unwrap_or_else(|| "<unreadable>".to_string()),
            cms::serial_to_decimal(serial_number)
        ),
        SignerId::SubjectKeyIdentifier(_) => "subject key identifier".to_string(),
    };
    Err(Error::CertificateNotFound(who))
}
