//! Cryptographic primitives used by the verifier.
//!
//! The verifier only ever talks to a [`CryptoEngine`]; [`RustCryptoEngine`]
//! is the default implementation on top of the RustCrypto crates.

use super::types::{DigestAlgorithm, SignatureAlgorithm};
use crate::error::{Error, Result};
use const_oid::db::rfc5912;
use der::asn1::ObjectIdentifier;
use der::Encode;
use pkcs1::DecodeRsaPublicKey;
use pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Sign, Pss, RsaPublicKey};
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use signature::hazmat::PrehashVerifier;
use spki::SubjectPublicKeyInfoOwned;

/// Hashing and signature-verification capability.
///
/// Implementations must be stateless so a single engine can be shared
/// across concurrent verifications.
pub trait CryptoEngine: Send + Sync {
    /// Hash `data` with `algorithm`.
    fn digest(&self, algorithm: DigestAlgorithm, data: &[u8]) -> Result<Vec<u8>>;

    /// Check `signature` over a precomputed `digest`.
    ///
    /// `Ok(false)` means the signature is well-formed enough to check but
    /// does not match; `Err` means it could not be evaluated at all.
    fn verify_signature(
        &self,
        algorithm: SignatureAlgorithm,
        digest_algorithm: DigestAlgorithm,
        digest: &[u8],
        signature: &[u8],
        public_key: &SubjectPublicKeyInfoOwned,
    ) -> Result<bool>;
}

/// Default engine: `sha1`/`sha2`/`md-5` digests, `rsa` and `p256`/`p384` signatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCryptoEngine;

impl RustCryptoEngine {
    /// Create a new engine.
    pub fn new() -> Self {
        Self
    }

    fn rsa_key(public_key: &SubjectPublicKeyInfoOwned) -> Result<RsaPublicKey> {
        if public_key.algorithm.oid != rfc5912::RSA_ENCRYPTION
            && public_key.algorithm.oid != rfc5912::ID_RSASSA_PSS
        {
            return Err(Error::InvalidKey(format!(
                "expected an RSA key, found {}",
                public_key.algorithm.oid
            )));
        }
        RsaPublicKey::from_pkcs1_der(public_key.subject_public_key.raw_bytes())
            .map_err(|e| Error::InvalidKey(format!("RSA public key: {}", e)))
    }

    fn verify_rsa(
        scheme: SignatureAlgorithm,
        digest_algorithm: DigestAlgorithm,
        digest: &[u8],
        signature: &[u8],
        public_key: &SubjectPublicKeyInfoOwned,
    ) -> Result<bool> {
        let key = Self::rsa_key(public_key)?;

        let verified = match scheme {
            SignatureAlgorithm::RsaPss => {
                let pss = match digest_algorithm {
                    DigestAlgorithm::Md5 => Pss::new::<md5::Md5>(),
                    DigestAlgorithm::Sha1 => Pss::new::<Sha1>(),
                    DigestAlgorithm::Sha224 => Pss::new::<Sha224>(),
                    DigestAlgorithm::Sha256 => Pss::new::<Sha256>(),
                    DigestAlgorithm::Sha384 => Pss::new::<Sha384>(),
                    DigestAlgorithm::Sha512 => Pss::new::<Sha512>(),
                };
                key.verify(pss, digest, signature)
            },
            _ => {
                let pkcs1v15 = match digest_algorithm {
                    DigestAlgorithm::Md5 => Pkcs1v15Sign::new::<md5::Md5>(),
                    DigestAlgorithm::Sha1 => Pkcs1v15Sign::new::<Sha1>(),
                    DigestAlgorithm::Sha224 => Pkcs1v15Sign::new::<Sha224>(),
                    DigestAlgorithm::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
                    DigestAlgorithm::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
                    DigestAlgorithm::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
                };
                key.verify(pkcs1v15, digest, signature)
            },
        };

        if let Err(e) = &verified {
            log::debug!("RSA signature rejected: {}", e);
        }
        Ok(verified.is_ok())
    }

    fn verify_ecdsa(
        digest: &[u8],
        signature: &[u8],
        public_key: &SubjectPublicKeyInfoOwned,
    ) -> Result<bool> {
        if public_key.algorithm.oid != rfc5912::ID_EC_PUBLIC_KEY {
            return Err(Error::InvalidKey(format!(
                "expected an EC key, found {}",
                public_key.algorithm.oid
            )));
        }
        let curve = public_key
            .algorithm
            .parameters
            .as_ref()
            .ok_or_else(|| Error::InvalidKey("EC key without named curve".to_string()))?
            .decode_as::<ObjectIdentifier>()
            .map_err(|e| Error::InvalidKey(format!("EC curve parameters: {}", e)))?;
        let spki_der = public_key.to_der()?;

        if curve == rfc5912::SECP_256_R_1 {
            let key = p256::ecdsa::VerifyingKey::from_public_key_der(&spki_der)
                .map_err(|e| Error::InvalidKey(format!("P-256 public key: {}", e)))?;
            let Ok(sig) = p256::ecdsa::Signature::from_der(signature) else {
                return Ok(false);
            };
            Ok(key.verify_prehash(digest, &sig).is_ok())
        } else if curve == rfc5912::SECP_384_R_1 {
            let key = p384::ecdsa::VerifyingKey::from_public_key_der(&spki_der)
                .map_err(|e| Error::InvalidKey(format!("P-384 public key: {}", e)))?;
            let Ok(sig) = p384::ecdsa::Signature::from_der(signature) else {
                return Ok(false);
            };
            Ok(key.verify_prehash(digest, &sig).is_ok())
        } else {
            Err(Error::UnsupportedAlgorithm(format!("elliptic curve {}", curve)))
        }
    }
}

impl CryptoEngine for RustCryptoEngine {
    fn digest(&self, algorithm: DigestAlgorithm, data: &[u8]) -> Result<Vec<u8>> {
        let digest = match algorithm {
            DigestAlgorithm::Md5 => md5::Md5::digest(data).to_vec(),
            DigestAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
            DigestAlgorithm::Sha224 => Sha224::digest(data).to_vec(),
            DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            DigestAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
            DigestAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        };
        Ok(digest)
    }

    fn verify_signature(
        &self,
        algorithm: SignatureAlgorithm,
        digest_algorithm: DigestAlgorithm,
        digest: &[u8],
        signature: &[u8],
        public_key: &SubjectPublicKeyInfoOwned,
    ) -> Result<bool> {
        if digest.len() != digest_algorithm.output_len() {
            return Err(Error::Crypto(format!(
                "{} digest must be {} bytes, got {}",
                digest_algorithm.name(),
                digest_algorithm.output_len(),
                digest.len()
            )));
        }

        match algorithm {
            SignatureAlgorithm::RsaPkcs1v15 | SignatureAlgorithm::RsaPss => {
                Self::verify_rsa(algorithm, digest_algorithm, digest, signature, public_key)
            },
            SignatureAlgorithm::Ecdsa => Self::verify_ecdsa(digest, signature, public_key),
        }
    }
}
