//! Signed objects.
//
// See RFC 6488 and RFC 5652.

use bytes::Bytes;
use log::debug;
use crate::oid;
use crate::cert::Cert;
use crate::crypto::{DigestAlgorithm, KeyIdentifier, Signature};
use crate::der::{
    decode, Constructed, Content, DecodeError, ErrorKind, Integer,
    OctetString, Oid, Tag
};
use crate::x509::{update_once, Name, Time};


//------------ SignedObject --------------------------------------------------

/// A signed object.
///
/// Signed objects are a profile of the CMS signed-data object used for all
/// objects published in the RPKI. They are specified in [RFC 6488] while
/// CMS itself is specified in [RFC 5652].
///
/// Decoding checks the structure of the object but performs no
/// cryptographic verification whatsoever. In relaxed mode, a few deviations
/// from the RPKI profile seen in the wild are tolerated: unknown signed
/// attributes and a `crls` field are skipped and the content-type and
/// message-digest attributes are optional. Strict mode rejects all of these.
///
/// [RFC 5652]: https://tools.ietf.org/html/rfc5652
/// [RFC 6488]: https://tools.ietf.org/html/rfc6488
#[derive(Clone, Debug)]
pub struct SignedObject {
    //--- From SignedData
    //
    digest_algorithm: DigestAlgorithm,
    content_type: Oid,
    content: Option<Bytes>,
    cert: Cert,

    //--- From SignerInfo
    //
    sid: SignerIdentifier,
    signed_attrs: Option<SignedAttrs>,
    signature: Signature,
}

/// # Data Access
///
impl SignedObject {
    /// Returns a reference to the object’s content type.
    pub fn content_type(&self) -> &Oid {
        &self.content_type
    }

    /// Returns a reference to the object’s content if present.
    pub fn content(&self) -> Option<&Bytes> {
        self.content.as_ref()
    }

    /// Returns a reference to the certificate the object is signed with.
    pub fn cert(&self) -> &Cert {
        &self.cert
    }

    pub fn digest_algorithm(&self) -> DigestAlgorithm {
        self.digest_algorithm
    }

    /// Returns the identifier of the signer.
    pub fn signer_identifier(&self) -> &SignerIdentifier {
        &self.sid
    }

    /// Returns the signed attributes if there were any.
    pub fn signed_attrs(&self) -> Option<&SignedAttrs> {
        self.signed_attrs.as_ref()
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Returns the signing time if available.
    ///
    /// A signing-time attribute that is present but can’t be decoded is
    /// treated as if it was missing.
    pub fn signing_time(&self) -> Option<Time> {
        self.signing_time_attr().to_option()
    }

    /// Returns the state of the signing-time attribute.
    pub fn signing_time_attr(&self) -> AttrValue {
        match self.signed_attrs.as_ref() {
            Some(attrs) => attrs.signing_time().clone(),
            None => AttrValue::Absent,
        }
    }
}

/// # Decoding
///
impl SignedObject {
    /// Decodes a signed object from its DER encoding.
    pub fn decode(data: &[u8], strict: bool) -> Result<Self, DecodeError> {
        decode(data, |cons| Self::take_from(cons, strict))
    }

    /// Takes a signed object from an encoded constructed value.
    pub fn take_from(
        cons: &mut Constructed, strict: bool
    ) -> Result<Self, DecodeError> {
        cons.take_sequence(|cons| { // ContentInfo
            oid::SIGNED_DATA.skip_if(cons)?; // contentType
            cons.take_constructed_if(Tag::CTX_0, |cons| { // content
                cons.take_sequence(|cons| { // SignedData
                    Self::signed_data_from_constructed(cons, strict)
                })
            })
        })
    }

    fn signed_data_from_constructed(
        cons: &mut Constructed, strict: bool
    ) -> Result<Self, DecodeError> {
        cons.skip_u8_if(3)?; // version -- must be 3
        let digest_algorithm = DigestAlgorithm::take_set_from(cons)?;
        let (content_type, content) = {
            cons.take_sequence(|cons| { // encapContentInfo
                Ok((
                    Oid::<Bytes>::take_from(cons)?,
                    cons.take_opt_constructed_if(Tag::CTX_0, |cons| {
                        cons.take::<OctetString>()
                    })?.map(OctetString::into_bytes)
                ))
            })?
        };
        let cert = Self::take_certificates(cons)?;
        let pos = cons.pos();
        if cons.take_opt_constructed_if(Tag::CTX_1, |cons| {
            cons.skip_all()
        })?.is_some() && strict {
            return Err(DecodeError::new(
                ErrorKind::SchemaMismatch, pos, "unexpected crls field"
            ))
        }
        let (sid, signed_attrs, signature) = {
            cons.take_set(|cons| { // signerInfos
                if cons.is_empty() {
                    return Err(cons.err(
                        ErrorKind::SchemaMismatch, "missing signer info"
                    ))
                }
                let res = Self::take_signer_info(
                    cons, digest_algorithm, &content_type, strict
                )?;
                if !cons.is_empty() {
                    return Err(cons.err(
                        ErrorKind::SchemaMismatch, "more than one signer info"
                    ))
                }
                Ok(res)
            })?
        };
        Ok(SignedObject {
            digest_algorithm,
            content_type,
            content,
            cert,
            sid,
            signed_attrs,
            signature,
        })
    }

    /// Takes the certificates field.
    ///
    /// RPKI signed objects carry exactly one certificate, the EE certificate
    /// of the object. A missing field counts as zero certificates.
    fn take_certificates(cons: &mut Constructed) -> Result<Cert, DecodeError> {
        let pos = cons.pos();
        let certs = cons.take_opt_constructed_if(Tag::CTX_0, |cons| {
            cons.take_all(|cons| cons.take_one())
        })?.unwrap_or_default();
        match certs.as_slice() {
            [cert] => {
                cert.expect_tag(Tag::SEQUENCE)?;
                cert.decode_constructed(Cert::from_constructed)
            }
            _ => {
                Err(DecodeError::new(
                    ErrorKind::UnexpectedCertificateCount, pos,
                    "expected exactly one certificate"
                ))
            }
        }
    }

    /// Takes a SignerInfo.
    ///
    /// ```text
    /// SignerInfo ::= SEQUENCE {
    ///     version CMSVersion,
    ///     sid SignerIdentifier,
    ///     digestAlgorithm DigestAlgorithmIdentifier,
    ///     signedAttrs [0] IMPLICIT SignedAttributes OPTIONAL,
    ///     signatureAlgorithm SignatureAlgorithmIdentifier,
    ///     signature SignatureValue,
    ///     unsignedAttrs [1] IMPLICIT UnsignedAttributes OPTIONAL }
    /// ```
    fn take_signer_info(
        cons: &mut Constructed,
        digest_algorithm: DigestAlgorithm,
        content_type: &Oid,
        strict: bool,
    ) -> Result<
        (SignerIdentifier, Option<SignedAttrs>, Signature), DecodeError
    > {
        cons.take_sequence(|cons| {
            let pos = cons.pos();
            let sid = match cons.take_u8()? {
                3 => SignerIdentifier::take_key_identifier_from(cons)?,
                1 => SignerIdentifier::take_issuer_and_serial_from(cons)?,
                _ => {
                    return Err(DecodeError::new(
                        ErrorKind::SchemaMismatch, pos,
                        "unexpected signer info version"
                    ))
                }
            };
            let pos = cons.pos();
            if DigestAlgorithm::take_from(cons)? != digest_algorithm {
                return Err(DecodeError::new(
                    ErrorKind::SchemaMismatch, pos,
                    "digest algorithm mismatch"
                ))
            }
            let signed_attrs = SignedAttrs::take_opt_from(
                cons, content_type, strict
            )?;
            let signature = Signature::cms_take_from(cons)?;
            // unsignedAttrs are of no interest.
            cons.take_opt_constructed_if(Tag::CTX_1, |cons| cons.skip_all())?;
            Ok((sid, signed_attrs, signature))
        })
    }
}


//------------ SignerIdentifier ----------------------------------------------

/// The identifier of the signer of a signed object.
///
/// RPKI signed objects must use the subject key identifier, which is what
/// version 3 signer infos do. Version 1 uses issuer and serial number.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SignerIdentifier {
    SubjectKeyIdentifier(KeyIdentifier),
    IssuerAndSerialNumber {
        issuer: Name,
        serial: Integer,
    },
}

impl SignerIdentifier {
    fn take_key_identifier_from(
        cons: &mut Constructed
    ) -> Result<Self, DecodeError> {
        cons.take_primitive_if(Tag::CTX_0, KeyIdentifier::from_content).map(
            SignerIdentifier::SubjectKeyIdentifier
        )
    }

    fn take_issuer_and_serial_from(
        cons: &mut Constructed
    ) -> Result<Self, DecodeError> {
        cons.take_sequence(|cons| {
            Ok(SignerIdentifier::IssuerAndSerialNumber {
                issuer: Name::take_from(cons)?,
                serial: cons.take()?,
            })
        })
    }

    /// Returns the subject key identifier if that is used.
    pub fn key_identifier(&self) -> Option<KeyIdentifier> {
        match *self {
            SignerIdentifier::SubjectKeyIdentifier(id) => Some(id),
            _ => None
        }
    }
}


//------------ SignedAttrs ---------------------------------------------------

/// The signed attributes of a signed object.
///
/// Only the content-type, message-digest, and signing-time attributes are
/// kept. The raw content is kept as well.
#[derive(Clone, Debug)]
pub struct SignedAttrs {
    raw: Bytes,
    content_type: Option<Oid>,
    message_digest: Option<OctetString>,
    signing_time: AttrValue,
}

impl SignedAttrs {
    /// Takes the signed attributes if present.
    ///
    /// In strict mode, the content-type and message-digest attributes must
    /// be present, the content type must match `content_type`, and no other
    /// attributes besides these and signing-time are allowed.
    pub fn take_opt_from(
        cons: &mut Constructed,
        content_type: &Oid,
        strict: bool,
    ) -> Result<Option<Self>, DecodeError> {
        let content = match cons.take_opt_value_if(
            Tag::CTX_0, |content| Ok(content.clone())
        )? {
            Some(content) => content,
            None => return Ok(None)
        };
        let mut res = SignedAttrs {
            raw: Bytes::copy_from_slice(content.as_slice()),
            content_type: None,
            message_digest: None,
            signing_time: AttrValue::Absent,
        };
        content.decode_constructed(|cons| {
            while let Some(()) = cons.take_opt_sequence(|cons| {
                res.take_attr(cons, strict)
            })? { }
            Ok(())
        })?;
        if strict {
            res.check_strict(&content, content_type)?;
        }
        if let AttrValue::Malformed(ref err) = res.signing_time {
            debug!("Ignoring malformed signing time attribute: {}", err);
        }
        Ok(Some(res))
    }

    /// Takes the content of a single Attribute sequence.
    ///
    /// ```text
    /// Attribute ::= SEQUENCE {
    ///     attrType OBJECT IDENTIFIER,
    ///     attrValues SET OF AttributeValue }
    /// ```
    fn take_attr(
        &mut self, cons: &mut Constructed, strict: bool
    ) -> Result<(), DecodeError> {
        let pos = cons.pos();
        let oid = Oid::<Bytes>::take_from(cons)?;
        if oid == oid::CONTENT_TYPE {
            update_once(&mut self.content_type, pos, || {
                cons.take_set(Oid::<Bytes>::take_from)
            })
        }
        else if oid == oid::MESSAGE_DIGEST {
            update_once(&mut self.message_digest, pos, || {
                cons.take_set(|cons| cons.take::<OctetString>())
            })
        }
        else if oid == oid::SIGNING_TIME {
            let values = cons.take_one()?;
            self.signing_time = match self.signing_time {
                AttrValue::Absent => AttrValue::from_values(&values),
                _ => {
                    AttrValue::Malformed(DecodeError::new(
                        ErrorKind::SchemaMismatch, pos,
                        "duplicate signing time attribute"
                    ))
                }
            };
            Ok(())
        }
        else if strict {
            Err(DecodeError::new(
                ErrorKind::SchemaMismatch, pos, "unexpected signed attribute"
            ))
        }
        else {
            cons.skip_all()
        }
    }

    fn check_strict(
        &self, content: &Content, content_type: &Oid
    ) -> Result<(), DecodeError> {
        match self.content_type.as_ref() {
            Some(attr) if attr == content_type => { }
            Some(_) => {
                return Err(content.err(
                    ErrorKind::SchemaMismatch,
                    "content type in signed attributes differs"
                ))
            }
            None => {
                return Err(content.err(
                    ErrorKind::SchemaMismatch,
                    "missing content type in signed attributes"
                ))
            }
        }
        if self.message_digest.is_none() {
            return Err(content.err(
                ErrorKind::SchemaMismatch,
                "missing message digest in signed attributes"
            ))
        }
        Ok(())
    }

    /// Returns the content octets of the encoded attributes.
    pub fn as_slice(&self) -> &[u8] {
        self.raw.as_ref()
    }

    pub fn content_type(&self) -> Option<&Oid> {
        self.content_type.as_ref()
    }

    pub fn message_digest(&self) -> Option<&OctetString> {
        self.message_digest.as_ref()
    }

    pub fn signing_time(&self) -> &AttrValue {
        &self.signing_time
    }
}


//------------ AttrValue -----------------------------------------------------

/// The value of an optional signed attribute.
///
/// Besides being present or absent, the attribute can also be present but
/// broken. Its value then is the error encountered while decoding it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AttrValue {
    Absent,
    Malformed(DecodeError),
    Present(Time),
}

impl AttrValue {
    /// Decodes the value set of a signing-time attribute.
    ///
    /// The set must contain exactly one time value.
    fn from_values(values: &Content) -> Self {
        let res = values.expect_tag(Tag::SET).and_then(|_| {
            values.decode_constructed(Time::take_from)
        });
        match res {
            Ok(time) => AttrValue::Present(time),
            Err(err) => AttrValue::Malformed(err),
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(*self, AttrValue::Present(_))
    }

    /// Returns the value, folding malformed values into `None`.
    pub fn to_option(&self) -> Option<Time> {
        match *self {
            AttrValue::Present(time) => Some(time),
            _ => None
        }
    }
}


//============ Tests =========================================================
