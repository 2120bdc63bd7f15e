//! Integration tests for `.p7s` verification against real OpenSSL output.

use p7s_oxide::signatures::SignatureVerifier;
use p7s_oxide::{read_input, user_message, verify, Error, FailureKind, VerifyOptions};
use std::io::Write;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn fixture(name: &str) -> Vec<u8> {
    read_input(fixture_path(name)).expect("Failed to read fixture")
}

fn document() -> Vec<u8> {
    fixture("document.pdf")
}

#[test]
fn test_valid_detached_signatures() {
    let document = document();
    for name in [
        "detached_rsa.p7s",
        "detached_rsa_noattr.p7s",
        "detached_rsa_keyid.p7s",
        "detached_rsa_sha384.p7s",
        "detached_ec.p7s",
    ] {
        let outcome = verify(&fixture(name), Some(&document), &VerifyOptions::default())
            .unwrap_or_else(|e| panic!("{}: {}", name, e));
        assert!(outcome.ok, "{}: {:?}", name, outcome.reason);
        assert!(outcome.reason.is_none());
        assert!(outcome.summary.detached);
    }
}

#[test]
fn test_unsorted_signed_attributes_verify_as_encoded() {
    let outcome = verify(
        &fixture("detached_rsa_unsorted_attrs.p7s"),
        Some(&document()),
        &VerifyOptions::default(),
    )
    .unwrap();
    assert!(outcome.ok, "{:?}", outcome.reason);
    assert!(outcome.failure.is_none());
}

#[test]
fn test_long_certificate_serial_verifies() {
    let outcome = verify(
        &fixture("detached_rsa_long_serial.p7s"),
        Some(&document()),
        &VerifyOptions::default(),
    )
    .unwrap();
    assert!(outcome.ok, "{:?}", outcome.reason);
    assert_eq!(
        outcome.summary.signers[0].serial_number.as_deref(),
        Some("377084639044278688715625566080814255100343344174358")
    );
}

#[test]
fn test_valid_attached_signatures() {
    for name in ["attached_rsa.p7s", "attached_rsa_ber.p7s"] {
        let outcome = verify(&fixture(name), None, &VerifyOptions::default()).unwrap();
        assert!(outcome.ok, "{}: {:?}", name, outcome.reason);
        assert!(!outcome.summary.detached);
    }
}

#[test]
fn test_attached_signature_ignores_supplied_content() {
    let outcome = verify(
        &fixture("attached_rsa.p7s"),
        Some(b"unrelated bytes"),
        &VerifyOptions::default(),
    )
    .unwrap();
    assert!(outcome.ok);
}

#[test]
fn test_tampered_document_is_rejected() {
    let mut tampered = document();
    tampered[10] ^= 0x20;

    let outcome =
        verify(&fixture("detached_rsa.p7s"), Some(&tampered), &VerifyOptions::default()).unwrap();
    assert!(!outcome.ok);
    assert_eq!(outcome.failure, Some(FailureKind::SignatureMismatch));
    assert_eq!(
        outcome.reason.as_deref(),
        Some("message digest does not match document content")
    );
}

#[test]
fn test_tampered_document_without_signed_attributes() {
    let mut tampered = document();
    tampered[10] ^= 0x20;

    let outcome = verify(
        &fixture("detached_rsa_noattr.p7s"),
        Some(&tampered),
        &VerifyOptions::default(),
    )
    .unwrap();
    assert!(!outcome.ok);
    assert_eq!(outcome.failure, Some(FailureKind::SignatureMismatch));
    assert_eq!(outcome.reason.as_deref(), Some("signature does not match document content"));
}

#[test]
fn test_tampered_signature_value_is_rejected() {
    let mut p7s = fixture("detached_rsa.p7s");
    // The RSA signature value is the last element of the file
    let last = p7s.len() - 1;
    p7s[last] ^= 0x01;

    let outcome = verify(&p7s, Some(&document()), &VerifyOptions::default()).unwrap();
    assert!(!outcome.ok);
    assert_eq!(outcome.failure, Some(FailureKind::SignatureMismatch));
}

#[test]
fn test_detached_without_content() {
    let outcome = verify(&fixture("detached_rsa.p7s"), None, &VerifyOptions::default()).unwrap();
    assert!(!outcome.ok);
    assert_eq!(outcome.failure, Some(FailureKind::MissingDetachedContent));
    assert_eq!(outcome.reason.as_deref(), Some("content required for detached signature"));
    assert!(user_message(&outcome).contains("original document"));
}

#[test]
fn test_not_signed_data() {
    let outcome =
        verify(&fixture("data_content_info.der"), Some(&document()), &VerifyOptions::default())
            .unwrap();
    assert!(!outcome.ok);
    assert_eq!(outcome.failure, Some(FailureKind::NotSignedData));
    assert_eq!(outcome.reason.as_deref(), Some("not a CMS SignedData (.p7s) structure"));
    assert!(!outcome.summary.is_signed_data);
}

#[test]
fn test_malformed_input_is_error() {
    let err = verify(&[0x30, 0x82, 0x05], Some(&document()), &VerifyOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::MalformedEncoding(_)));
}

#[test]
fn test_select_second_signer() {
    let p7s = fixture("detached_two_signers.p7s");
    let document = document();
    let verifier = SignatureVerifier::new();

    for index in 0..2 {
        let options = VerifyOptions::new().with_signer_index(index);
        let outcome = verifier.verify(&p7s, Some(&document), &options).unwrap();
        assert!(outcome.ok, "signer {}: {:?}", index, outcome.reason);
    }

    let options = VerifyOptions::new().with_signer_index(2);
    let outcome = verifier.verify(&p7s, Some(&document), &options).unwrap();
    assert_eq!(outcome.failure, Some(FailureKind::VerificationException));
}

#[test]
fn test_certificates_only_has_no_signer() {
    let outcome =
        verify(&fixture("certs_only.p7s"), Some(&document()), &VerifyOptions::default()).unwrap();
    assert!(!outcome.ok);
    assert_eq!(outcome.failure, Some(FailureKind::VerificationException));
}

#[test]
fn test_verifier_is_shareable_across_threads() {
    let verifier = SignatureVerifier::new();
    let p7s = fixture("detached_ec.p7s");
    let document = document();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let outcome = verifier
                    .verify(&p7s, Some(&document), &VerifyOptions::default())
                    .unwrap();
                assert!(outcome.ok);
            });
        }
    });
}

#[test]
fn test_verify_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let p7s_path = dir.path().join("contrato.pdf.p7s");
    let pdf_path = dir.path().join("contrato.pdf");

    std::fs::File::create(&p7s_path)
        .unwrap()
        .write_all(&fixture("detached_rsa.p7s"))
        .unwrap();
    std::fs::File::create(&pdf_path)
        .unwrap()
        .write_all(&document())
        .unwrap();

    let p7s = read_input(&p7s_path).unwrap();
    let pdf = read_input(&pdf_path).unwrap();
    let outcome = verify(&p7s, Some(&pdf), &VerifyOptions::default()).unwrap();
    assert!(outcome.ok);
}
