//! Object identifiers used by the CMS decoder and verifier.
//!
//! Named constants come from the `const-oid` database (`rfc5280`,
//! `rfc5911`, `rfc5912`); only identifiers missing there are defined here.

use const_oid::db::rfc5912;
use der::asn1::ObjectIdentifier;

/// ecdsa-with-SHA1 (RFC 3279 §2.2.3)
pub const ECDSA_WITH_SHA1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.1");

const NAMES: &[(ObjectIdentifier, &str)] = &[
    (rfc5912::ID_MD_5, "MD5"),
    (rfc5912::ID_SHA_1, "SHA-1"),
    (rfc5912::ID_SHA_224, "SHA-224"),
    (rfc5912::ID_SHA_256, "SHA-256"),
    (rfc5912::ID_SHA_384, "SHA-384"),
    (rfc5912::ID_SHA_512, "SHA-512"),
    (rfc5912::RSA_ENCRYPTION, "RSA"),
    (rfc5912::MD_5_WITH_RSA_ENCRYPTION, "RSA with MD5"),
    (rfc5912::SHA_1_WITH_RSA_ENCRYPTION, "RSA with SHA-1"),
    (rfc5912::SHA_224_WITH_RSA_ENCRYPTION, "RSA with SHA-224"),
    (rfc5912::SHA_256_WITH_RSA_ENCRYPTION, "RSA with SHA-256"),
    (rfc5912::SHA_384_WITH_RSA_ENCRYPTION, "RSA with SHA-384"),
    (rfc5912::SHA_512_WITH_RSA_ENCRYPTION, "RSA with SHA-512"),
    (rfc5912::ID_RSASSA_PSS, "RSASSA-PSS"),
    (ECDSA_WITH_SHA1, "ECDSA with SHA-1"),
    (rfc5912::ECDSA_WITH_SHA_224, "ECDSA with SHA-224"),
    (rfc5912::ECDSA_WITH_SHA_256, "ECDSA with SHA-256"),
    (rfc5912::ECDSA_WITH_SHA_384, "ECDSA with SHA-384"),
    (rfc5912::ECDSA_WITH_SHA_512, "ECDSA with SHA-512"),
];

/// Human-readable name for an algorithm OID, falling back to the dotted form.
pub fn display_name(oid: &ObjectIdentifier) -> String {
    NAMES
        .iter()
        .find(|(known, _)| known == oid)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| oid.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use const_oid::db::rfc5911;

    #[test]
    fn test_display_name_known() {
        assert_eq!(display_name(&rfc5912::ID_SHA_256), "SHA-256");
        assert_eq!(display_name(&rfc5912::SHA_256_WITH_RSA_ENCRYPTION), "RSA with SHA-256");
        assert_eq!(display_name(&rfc5912::ECDSA_WITH_SHA_384), "ECDSA with SHA-384");
        assert_eq!(display_name(&ECDSA_WITH_SHA1), "ECDSA with SHA-1");
    }

    #[test]
    fn test_display_name_unknown_falls_back_to_dotted() {
        let oid = ObjectIdentifier::new_unwrap("1.2.3.4.5");
        assert_eq!(display_name(&oid), "1.2.3.4.5");
    }

    #[test]
    fn test_signed_data_dotted_form() {
        assert_eq!(rfc5911::ID_SIGNED_DATA.to_string(), "1.2.840.113549.1.7.2");
    }
}
