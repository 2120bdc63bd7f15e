//! Typed decoding of `ContentInfo` and `SignedData`.
//!
//! The outer structures are decoded through local views rather than the
//! `cms` crate's `ContentInfo`/`SignedData` so that an absent `content`
//! field is representable, SETs keep their order of appearance and the
//! signed attributes keep the exact encoding their signature covers.
//! Embedded certificates are kept undecoded; see
//! [`SignerCertificate`](super::SignerCertificate).

use super::ber;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use cms::cert::x509::time::Time;
use cms::content_info::CmsVersion;
use cms::signed_data::EncapsulatedContentInfo;
use const_oid::db::rfc5911;
use der::asn1::{ObjectIdentifier, OctetString};
use der::{Any, AnyRef, Decode, Encode, Reader, Sequence, SliceReader, Tag, TagNumber, Tagged};
use spki::AlgorithmIdentifierOwned;

/// `ContentInfo` with an optional `content` field.
#[derive(Clone, Debug, Sequence)]
struct ContentInfoView {
    content_type: ObjectIdentifier,
    #[asn1(context_specific = "0", tag_mode = "EXPLICIT", optional = "true")]
    content: Option<Any>,
}

/// `SignedData` with its SET OF fields left undecoded.
#[derive(Clone, Debug, Sequence)]
struct SignedDataView {
    version: CmsVersion,
    digest_algorithms: Any,
    encap_content_info: EncapsulatedContentInfo,
    #[asn1(context_specific = "0", tag_mode = "IMPLICIT", optional = "true")]
    certificates: Option<Any>,
    #[asn1(context_specific = "1", tag_mode = "IMPLICIT", optional = "true")]
    crls: Option<Any>,
    signer_infos: Any,
}

/// `SignerInfo` with the identifier and attribute sets left undecoded.
#[derive(Clone, Debug, Sequence)]
struct SignerInfoView {
    version: Any,
    sid: Any,
    digest_alg: AlgorithmIdentifierOwned,
    #[asn1(context_specific = "0", tag_mode = "IMPLICIT", optional = "true")]
    signed_attrs: Option<Any>,
    signature_algorithm: AlgorithmIdentifierOwned,
    signature: OctetString,
    #[asn1(context_specific = "1", tag_mode = "IMPLICIT", optional = "true")]
    unsigned_attrs: Option<Any>,
}

#[derive(Clone, Debug, Sequence)]
struct AttributeView {
    attr_type: ObjectIdentifier,
    attr_values: Any,
}

/// Result of decoding an encoded message.
#[derive(Debug, Clone)]
pub enum DecodedMessage {
    /// The content type was id-signedData
    SignedData(Box<ParsedSignedData>),
    /// Any other content type
    Other(ObjectIdentifier),
}

/// A decoded CMS `SignedData` structure.
#[derive(Debug, Clone)]
pub struct ParsedSignedData {
    /// CMS version of the SignedData
    pub version: CmsVersion,
    /// Declared digest algorithms, in order of appearance
    pub digest_algorithms: Vec<AlgorithmIdentifierOwned>,
    /// Encapsulated content info (eContent absent for detached signatures)
    pub encap_content_info: EncapsulatedContentInfo,
    /// DER encodings of the X.509 certificates in the `certificates` field
    pub certificates: Vec<Vec<u8>>,
    /// SignerInfos, in order of appearance
    pub signer_infos: Vec<ParsedSigner>,
}

impl ParsedSignedData {
    /// Whether the encapsulated content is absent.
    pub fn is_detached(&self) -> bool {
        self.encap_content_info.econtent.is_none()
    }

    /// Bytes of the encapsulated content, when attached.
    pub fn encapsulated_content(&self) -> Option<&[u8]> {
        self.encap_content_info.econtent.as_ref().map(|content| content.value())
    }
}

/// Signer identifier (RFC 5652 §5.3), kept in encoded form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignerId {
    /// issuerAndSerialNumber
    IssuerAndSerialNumber {
        /// DER encoding of the issuer Name
        issuer: Vec<u8>,
        /// Content octets of the serialNumber INTEGER
        serial_number: Vec<u8>,
    },
    /// subjectKeyIdentifier
    SubjectKeyIdentifier(Vec<u8>),
}

impl SignerId {
    fn from_any(sid: &Any) -> Result<Self> {
        match sid.tag() {
            Tag::Sequence => {
                let mut reader = SliceReader::new(sid.value())?;
                if reader.peek_tag()? != Tag::Sequence {
                    return Err(Error::MalformedEncoding(
                        "signer identifier issuer is not a Name".to_string(),
                    ));
                }
                let issuer = reader.tlv_bytes()?.to_vec();
                let serial = Any::decode(&mut reader)?;
                if serial.tag() != Tag::Integer {
                    return Err(Error::MalformedEncoding(format!(
                        "signer serial number is {} instead of INTEGER",
                        serial.tag()
                    )));
                }
                Ok(SignerId::IssuerAndSerialNumber {
                    issuer,
                    serial_number: serial.value().to_vec(),
                })
            },
            Tag::ContextSpecific { number, .. } if number == TagNumber::N0 => {
                Ok(SignerId::SubjectKeyIdentifier(sid.value().to_vec()))
            },
            other => Err(Error::MalformedEncoding(format!(
                "unexpected signer identifier {}",
                other
            ))),
        }
    }
}

/// Signed attributes of a SignerInfo, in encoded order.
#[derive(Debug, Clone)]
pub struct SignedAttributes {
    encoded: Vec<u8>,
    attributes: Vec<(ObjectIdentifier, Any)>,
}

impl SignedAttributes {
    fn from_implicit(field: &Any) -> Result<Self> {
        // The signature covers the SET OF with its universal tag, byte for byte
        let encoded = AnyRef::new(Tag::Set, field.value())?.to_der()?;

        let mut reader = SliceReader::new(field.value())?;
        let mut attributes = Vec::new();
        while !reader.is_finished() {
            let attr = AttributeView::decode(&mut reader)
                .map_err(|e| Error::MalformedEncoding(format!("invalid signed attribute: {}", e)))?;
            if attr.attr_values.tag() != Tag::Set {
                return Err(Error::MalformedEncoding(format!(
                    "attribute {} values are {} instead of SET",
                    attr.attr_type,
                    attr.attr_values.tag()
                )));
            }
            attributes.push((attr.attr_type, attr.attr_values));
        }

        Ok(Self {
            encoded,
            attributes,
        })
    }

    /// The `SET OF Attribute` encoding the signature value is computed over.
    pub fn as_der(&self) -> &[u8] {
        &self.encoded
    }

    /// Attribute types, in encoded order.
    pub fn types(&self) -> impl Iterator<Item = &ObjectIdentifier> {
        self.attributes.iter().map(|(attr_type, _)| attr_type)
    }

    /// First value of the first attribute of type `attr_type`.
    fn first_value(&self, attr_type: &ObjectIdentifier) -> Result<Option<Any>> {
        let Some((_, values)) = self.attributes.iter().find(|(known, _)| known == attr_type) else {
            return Ok(None);
        };
        let mut reader = SliceReader::new(values.value())?;
        if reader.is_finished() {
            return Err(Error::MalformedEncoding(format!("attribute {} has no value", attr_type)));
        }
        Ok(Some(Any::decode(&mut reader)?))
    }
}

/// A decoded SignerInfo.
#[derive(Debug, Clone)]
pub struct ParsedSigner {
    /// Identifier of the signer certificate
    pub sid: SignerId,
    /// Digest algorithm applied to the content and signed attributes
    pub digest_alg: AlgorithmIdentifierOwned,
    /// Signed attributes, when present
    pub signed_attrs: Option<SignedAttributes>,
    /// Signature algorithm
    pub signature_algorithm: AlgorithmIdentifierOwned,
    /// Signature value
    pub signature: OctetString,
}

impl ParsedSigner {
    fn from_view(view: SignerInfoView) -> Result<Self> {
        Ok(Self {
            sid: SignerId::from_any(&view.sid)?,
            digest_alg: view.digest_alg,
            signed_attrs: view
                .signed_attrs
                .as_ref()
                .map(SignedAttributes::from_implicit)
                .transpose()?,
            signature_algorithm: view.signature_algorithm,
            signature: view.signature,
        })
    }
}

/// Decode raw `.p7s` bytes (BER or DER).
///
/// Fails only when the bytes are not a ContentInfo at all, or claim to be
/// SignedData but do not decode as one.
pub fn decode(bytes: &[u8]) -> Result<DecodedMessage> {
    let der = ber::to_der(bytes)?;

    let content_info = ContentInfoView::from_der(&der)
        .map_err(|e| Error::MalformedEncoding(format!("not a CMS ContentInfo: {}", e)))?;

    if content_info.content_type != rfc5911::ID_SIGNED_DATA {
        log::debug!("ContentInfo type {} is not SignedData", content_info.content_type);
        return Ok(DecodedMessage::Other(content_info.content_type));
    }

    let content = content_info.content.ok_or_else(|| {
        Error::MalformedEncoding("SignedData ContentInfo has no content".to_string())
    })?;
    let view = SignedDataView::from_der(&content.to_der()?)
        .map_err(|e| Error::MalformedEncoding(format!("invalid SignedData: {}", e)))?;

    let digest_algorithms = decode_set_of::<AlgorithmIdentifierOwned>(
        &view.digest_algorithms,
        "digestAlgorithms",
    )?;
    let signer_infos = decode_set_of::<SignerInfoView>(&view.signer_infos, "signerInfos")?
        .into_iter()
        .map(ParsedSigner::from_view)
        .collect::<Result<Vec<_>>>()?;
    let certificates = view
        .certificates
        .as_ref()
        .map(certificate_entries)
        .transpose()?
        .unwrap_or_default();

    let parsed = ParsedSignedData {
        version: view.version,
        digest_algorithms,
        encap_content_info: view.encap_content_info,
        certificates,
        signer_infos,
    };

    log::debug!(
        "Decoded SignedData: {} digest algorithms, {} certificates, {} signers, detached={}",
        parsed.digest_algorithms.len(),
        parsed.certificates.len(),
        parsed.signer_infos.len(),
        parsed.is_detached()
    );

    Ok(DecodedMessage::SignedData(Box::new(parsed)))
}

/// Decode the elements of a SET OF in encoded order.
fn decode_set_of<'a, T: Decode<'a>>(set: &'a Any, field: &str) -> Result<Vec<T>> {
    if set.tag() != Tag::Set {
        return Err(Error::MalformedEncoding(format!(
            "{} is {} instead of SET",
            field,
            set.tag()
        )));
    }

    let mut reader = SliceReader::new(set.value())?;
    let mut items = Vec::new();
    while !reader.is_finished() {
        let item = T::decode(&mut reader)
            .map_err(|e| Error::MalformedEncoding(format!("invalid {} entry: {}", field, e)))?;
        items.push(item);
    }
    Ok(items)
}

/// Split the `certificates` field into X.509 certificate encodings.
///
/// Other CertificateChoices (attribute certificates and the like) are skipped.
fn certificate_entries(set: &Any) -> Result<Vec<Vec<u8>>> {
    let mut reader = SliceReader::new(set.value())?;
    let mut entries = Vec::new();
    while !reader.is_finished() {
        let tag = reader.peek_tag()?;
        let tlv = reader.tlv_bytes()?;
        if tag == Tag::Sequence {
            entries.push(tlv.to_vec());
        } else {
            log::debug!("Skipping certificate choice {}", tag);
        }
    }
    Ok(entries)
}

/// The signing-time signed attribute, converted to UTC.
///
/// `Ok(None)` when the attribute is absent.
pub fn signing_time(signer: &ParsedSigner) -> Result<Option<DateTime<Utc>>> {
    let Some(attrs) = &signer.signed_attrs else {
        return Ok(None);
    };
    let Some(value) = attrs.first_value(&rfc5911::ID_SIGNING_TIME)? else {
        return Ok(None);
    };

    let time = Time::from_der(&value.to_der()?)?;
    let since_epoch = time.to_unix_duration();
    let secs = i64::try_from(since_epoch.as_secs())
        .map_err(|_| Error::MalformedEncoding("signing time out of range".to_string()))?;
    DateTime::<Utc>::from_timestamp(secs, since_epoch.subsec_nanos())
        .map(Some)
        .ok_or_else(|| Error::MalformedEncoding("signing time out of range".to_string()))
}

/// The message-digest signed attribute value.
///
/// `Ok(None)` when the attribute is absent.
pub fn message_digest(signer: &ParsedSigner) -> Result<Option<Vec<u8>>> {
    let Some(attrs) = &signer.signed_attrs else {
        return Ok(None);
    };
    let Some(value) = attrs.first_value(&rfc5911::ID_MESSAGE_DIGEST)? else {
        return Ok(None);
    };
    let digest = OctetString::from_der(&value.to_der()?)?;
    Ok(Some(digest.as_bytes().to_vec()))
}

/// DER encoding of the signed attributes as the universal SET OF that the
/// signature value covers (RFC 5652 §5.4).
pub fn signed_attributes_der(signer: &ParsedSigner) -> Option<&[u8]> {
    signer.signed_attrs.as_ref().map(SignedAttributes::as_der)
}
