//! Signature summaries for display.
//!
//! Summarizing never resolves or validates certificates: everything comes
//! straight from the SignerInfo structures.

use super::signed_data::{self, DecodedMessage, ParsedSignedData, ParsedSigner, SignerId};
use super::types::{SignatureSummary, SignerDescriptor};
use crate::error::Result;
use cms::cert::x509::name::Name;
use der::{Any, Decode, Tag, Tagged};
use rsa::BigUint;

/// Decode `.p7s` bytes and describe their signers.
///
/// A well-formed ContentInfo of any type other than SignedData yields
/// [`SignatureSummary::not_signed_data`]. Structurally broken input is an
/// error.
pub fn summarize(bytes: &[u8]) -> Result<SignatureSummary> {
    match signed_data::decode(bytes)? {
        DecodedMessage::SignedData(parsed) => Ok(describe(&parsed)),
        DecodedMessage::Other(_) => Ok(SignatureSummary::not_signed_data()),
    }
}

/// Summary of an already decoded SignedData.
pub fn describe(parsed: &ParsedSignedData) -> SignatureSummary {
    let signers = parsed
        .signer_infos
        .iter()
        .enumerate()
        .map(|(index, signer)| describe_signer(index, signer))
        .collect();

    SignatureSummary {
        is_signed_data: true,
        detached: parsed.is_detached(),
        digest_algorithm: parsed
            .digest_algorithms
            .first()
            .map(|alg| alg.oid.to_string()),
        signers,
    }
}

fn describe_signer(index: usize, signer: &ParsedSigner) -> SignerDescriptor {
    let (serial_number, issuer_distinguished_name) = match &signer.sid {
        SignerId::IssuerAndSerialNumber {
            issuer,
            serial_number,
        } => {
            let issuer = render_issuer(issuer);
            if issuer.is_none() {
                log::warn!("Signer {}: unreadable issuer name", index);
            }
            (Some(serial_to_decimal(serial_number)), issuer)
        },
        SignerId::SubjectKeyIdentifier(_) => (None, None),
    };

    let signing_time = match signed_data::signing_time(signer) {
        Ok(time) => time,
        Err(e) => {
            log::warn!("Signer {}: unreadable signing time: {}", index, e);
            None
        },
    };

    SignerDescriptor {
        common_name: None,
        serial_number,
        issuer_distinguished_name,
        signing_time,
    }
}

/// Decimal rendering of the content octets of a serial number INTEGER.
pub fn serial_to_decimal(bytes: &[u8]) -> String {
    let value = BigUint::from_bytes_be(bytes);

    // Serials are INTEGERs; a set high bit means a negative two's complement value
    match bytes.first() {
        Some(first) if first & 0x80 != 0 => {
            let modulus = BigUint::from(1u8) << (bytes.len() * 8);
            format!("-{}", modulus - value)
        },
        _ => value.to_string(),
    }
}

/// Render a DER-encoded issuer Name, or `None` if it does not decode.
pub fn render_issuer(issuer: &[u8]) -> Option<String> {
    Name::from_der(issuer).ok().map(|name| render_name(&name))
}

/// Render a distinguished name as `oid=value` pairs, in encoded order.
pub fn render_name(name: &Name) -> String {
    name.0
        .iter()
        .flat_map(|rdn| rdn.0.iter())
        .map(|atv| format!("{}={}", atv.oid, attribute_text(&atv.value)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn attribute_text(value: &Any) -> String {
    let bytes = value.value();
    match value.tag() {
        Tag::Utf8String
        | Tag::PrintableString
        | Tag::Ia5String
        | Tag::VisibleString
        | Tag::NumericString
        | Tag::TeletexString => String::from_utf8_lossy(bytes).into_owned(),
        Tag::BmpString => {
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        },
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_detached() {
        let summary = summarize(include_bytes!("../../tests/data/detached_rsa.p7s")).unwrap();
        assert!(summary.is_signed_data);
        assert!(summary.detached);
        assert_eq!(summary.digest_algorithm.as_deref(), Some("2.16.840.1.101.3.4.2.1"));
        assert_eq!(summary.signers.len(), 1);

        let signer = &summary.signers[0];
        assert_eq!(signer.serial_number.as_deref(), Some("4660"));
        assert_eq!(
            signer.issuer_distinguished_name.as_deref(),
            Some("2.5.4.6=BR, 2.5.4.10=ICP-Brasil Test, 2.5.4.3=Test Signer")
        );
        assert!(signer.common_name.is_none());
    }

    #[test]
    fn test_summarize_key_identifier_signer() {
        let summary =
            summarize(include_bytes!("../../tests/data/detached_rsa_keyid.p7s")).unwrap();
        let signer = &summary.signers[0];
        assert!(signer.serial_number.is_none());
        assert!(signer.issuer_distinguished_name.is_none());
        assert!(signer.signing_time.is_some());
    }

    #[test]
    fn test_serial_to_decimal() {
        assert_eq!(serial_to_decimal(&[0x12, 0x34]), "4660");
        assert_eq!(
            serial_to_decimal(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A]),
            "4759477275222530853130"
        );
        assert_eq!(serial_to_decimal(&[0x00, 0x80]), "128");
    }

    #[test]
    fn test_high_bit_serial_is_negative() {
        assert_eq!(serial_to_decimal(&[0xFF]), "-1");
        assert_eq!(serial_to_decimal(&[0x80]), "-128");
        assert_eq!(serial_to_decimal(&[0xFF, 0x7F]), "-129");
    }

    #[test]
    fn test_serial_longer_than_twenty_octets() {
        let serial: Vec<u8> = (1..=22).collect();
        assert_eq!(
            serial_to_decimal(&serial),
            "377084639044278688715625566080814255100343344174358"
        );
    }

    #[test]
    fn test_render_issuer_rejects_non_name() {
        assert!(render_issuer(&[0x02, 0x01, 0x01]).is_none());
    }

    #[test]
    fn test_attribute_text_string_types() {
        let utf8 = Any::new(Tag::Utf8String, "Assinador".as_bytes()).unwrap();
        assert_eq!(attribute_text(&utf8), "Assinador");

        let bmp = Any::new(Tag::BmpString, vec![0x00, b'O', 0x00, b'K']).unwrap();
        assert_eq!(attribute_text(&bmp), "OK");

        let integer = Any::new(Tag::Integer, vec![0x01]).unwrap();
        assert_eq!(attribute_text(&integer), "");
    }
}
