//! Lenient view of the certificates embedded in a SignedData.
//!
//! Certificates are only key carriers here, so they are decoded on demand
//! and only as far as signer matching needs. Profile rules that a full
//! X.509 decoder enforces (serial length, extension contents) do not apply.

use super::signed_data::SignerId;
use crate::error::{Error, Result};
use cms::cert::x509::ext::Extension;
use const_oid::db::rfc5280;
use der::asn1::OctetString;
use der::{Any, Decode, Encode, Sequence, Tag, Tagged};
use spki::SubjectPublicKeyInfoOwned;

#[derive(Clone, Debug, Sequence)]
struct CertificateView {
    tbs_certificate: TbsCertificateView,
    signature_algorithm: Any,
    signature: Any,
}

#[derive(Clone, Debug, Sequence)]
struct TbsCertificateView {
    #[asn1(context_specific = "0", tag_mode = "EXPLICIT", optional = "true")]
    version: Option<Any>,
    serial_number: Any,
    signature: Any,
    issuer: Any,
    validity: Any,
    subject: Any,
    subject_public_key_info: SubjectPublicKeyInfoOwned,
    #[asn1(context_specific = "1", tag_mode = "IMPLICIT", optional = "true")]
    issuer_unique_id: Option<Any>,
    #[asn1(context_specific = "2", tag_mode = "IMPLICIT", optional = "true")]
    subject_unique_id: Option<Any>,
    #[asn1(context_specific = "3", tag_mode = "EXPLICIT", optional = "true")]
    extensions: Option<Any>,
}

/// The parts of an embedded certificate needed to verify a signer.
#[derive(Debug, Clone)]
pub struct SignerCertificate {
    /// DER encoding of the issuer Name
    pub issuer: Vec<u8>,
    /// Content octets of the serialNumber INTEGER
    pub serial_number: Vec<u8>,
    /// Subject public key
    pub subject_public_key_info: SubjectPublicKeyInfoOwned,
    /// Value of the subjectKeyIdentifier extension, if any
    pub subject_key_identifier: Option<Vec<u8>>,
}

impl SignerCertificate {
    /// Decode the signer-relevant fields of a DER certificate.
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        let view = CertificateView::from_der(bytes)
            .map_err(|e| Error::MalformedEncoding(format!("invalid certificate: {}", e)))?;
        let tbs = view.tbs_certificate;

        if tbs.serial_number.tag() != Tag::Integer {
            return Err(Error::MalformedEncoding(format!(
                "certificate serial number is {} instead of INTEGER",
                tbs.serial_number.tag()
            )));
        }

        let subject_key_identifier = tbs.extensions.as_ref().and_then(subject_key_identifier);

        Ok(Self {
            issuer: tbs.issuer.to_der()?,
            serial_number: tbs.serial_number.value().to_vec(),
            subject_public_key_info: tbs.subject_public_key_info,
            subject_key_identifier,
        })
    }

    /// Whether this certificate is the one `sid` names.
    pub fn matches(&self, sid: &SignerId) -> bool {
        match sid {
            SignerId::IssuerAndSerialNumber {
                issuer,
                serial_number,
            } => self.issuer == *issuer && self.serial_number == *serial_number,
            SignerId::SubjectKeyIdentifier(ski) => {
                self.subject_key_identifier.as_deref() == Some(ski.as_slice())
            },
        }
    }
}

fn subject_key_identifier(extensions: &Any) -> Option<Vec<u8>> {
    let extensions = match extensions.decode_as::<Vec<Extension>>() {
        Ok(extensions) => extensions,
        Err(e) => {
            log::debug!("Skipping unreadable certificate extensions: {}", e);
            return None;
        },
    };

    extensions
        .iter()
        .find(|ext| ext.extn_id == rfc5280::ID_CE_SUBJECT_KEY_IDENTIFIER)
        .and_then(|ext| OctetString::from_der(ext.extn_value.as_bytes()).ok())
        .map(|ski| ski.as_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSA_CERT: &[u8] = include_bytes!("../../tests/data/rsa_cert.der");
    const EC_CERT: &[u8] = include_bytes!("../../tests/data/ec_cert.der");

    #[test]
    fn test_decode_rsa_certificate() {
        let cert = SignerCertificate::from_der(RSA_CERT).unwrap();
        assert_eq!(cert.serial_number, vec![0x12, 0x34]);
        assert_eq!(cert.issuer[0], 0x30);
        assert_eq!(
            cert.subject_public_key_info.algorithm.oid,
            const_oid::db::rfc5912::RSA_ENCRYPTION
        );
        assert!(cert.subject_key_identifier.is_some());
    }

    #[test]
    fn test_matches_issuer_and_serial() {
        let cert = SignerCertificate::from_der(RSA_CERT).unwrap();
        let sid = SignerId::IssuerAndSerialNumber {
            issuer: cert.issuer.clone(),
            serial_number: vec![0x12, 0x34],
        };
        assert!(cert.matches(&sid));

        let other_serial = SignerId::IssuerAndSerialNumber {
            issuer: cert.issuer.clone(),
            serial_number: vec![0x12, 0x35],
        };
        assert!(!cert.matches(&other_serial));
    }

    #[test]
    fn test_matches_subject_key_identifier() {
        let cert = SignerCertificate::from_der(EC_CERT).unwrap();
        let ski = cert.subject_key_identifier.clone().unwrap();
        assert!(cert.matches(&SignerId::SubjectKeyIdentifier(ski)));
        assert!(!cert.matches(&SignerId::SubjectKeyIdentifier(vec![0u8; 20])));
    }

    #[test]
    fn test_non_certificate_is_malformed() {
        let err = SignerCertificate::from_der(&[0x30, 0x03, 0x02, 0x01, 0x01]).unwrap_err();
        assert!(err.is_structural());
    }
}
