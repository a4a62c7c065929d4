//! Resource certificates.
//!
//! This module contains the type [`Cert`] for decoding the certificates
//! embedded in RPKI signed objects. Decoding follows the certificate profile
//! of [RFC 6487] as far as it concerns the structure of the certificate.
//! Nothing is verified: neither the signature nor the validity period nor
//! the resources of the certificate are looked at.
//!
//! From the extensions, the key identifiers and the access URIs are
//! extracted. All other extensions are skipped. Whether the key identifiers
//! are present is left to the users of the certificate.
//!
//! [RFC 6487]: https://tools.ietf.org/html/rfc6487

use bytes::Bytes;
use crate::crypto::{KeyIdentifier, PublicKey, Signature, SignatureAlgorithm};
use crate::der::{
    decode, Constructed, Content, DecodeError, ErrorKind, Ia5String, Integer,
    Oid, Tag
};
use crate::oid;
use crate::uri::Uri;
use crate::x509::{update_first, update_once, Name, Validity};


//------------ Cert ----------------------------------------------------------

/// A resource certificate.
///
/// ```txt
/// Certificate  ::=  SEQUENCE  {
///         tbsCertificate       TBSCertificate,
///         signatureAlgorithm   AlgorithmIdentifier,
///         signatureValue       BIT STRING  }
///
/// TBSCertificate  ::=  SEQUENCE  {
///         version         [0]  EXPLICIT Version DEFAULT v1,
///         serialNumber         CertificateSerialNumber,
///         signature            AlgorithmIdentifier,
///         issuer               Name,
///         validity             Validity,
///         subject              Name,
///         subjectPublicKeyInfo SubjectPublicKeyInfo,
///         issuerUniqueID  [1]  IMPLICIT UniqueIdentifier OPTIONAL,
///         subjectUniqueID [2]  IMPLICIT UniqueIdentifier OPTIONAL,
///         extensions      [3]  EXPLICIT Extensions OPTIONAL }
/// ```
#[derive(Clone, Debug)]
pub struct Cert {
    /// The serial number.
    serial_number: Integer,

    /// The algorithm used for signing the certificate.
    signature: SignatureAlgorithm,

    /// The name of the issuer.
    issuer: Name,

    /// The validity of the certificate.
    validity: Validity,

    /// The name of the subject of this certificate.
    subject: Name,

    /// Information about the public key of this certificate.
    subject_public_key_info: PublicKey,

    /// Subject Key Identifier.
    subject_key_identifier: Option<KeyIdentifier>,

    /// Authority Key Identifier.
    ///
    /// This is `None` if the extension is missing or lacks the
    /// keyIdentifier field.
    authority_key_identifier: Option<KeyIdentifier>,

    /// CRL Distribution Points.
    crl_uri: Option<Uri>,

    /// Authority Information Access of type `id-ad-caIssuer`.
    ca_issuer: Option<Uri>,

    /// Subject Information Access.
    sia: Option<Sia>,

    /// The outer signature of the certificate.
    outer_signature: Signature,
}

/// # Decoding
///
impl Cert {
    /// Decodes a certificate from its DER encoding.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        decode(data, Self::take_from)
    }

    /// Takes an encoded certificate from the beginning of a value.
    pub fn take_from(cons: &mut Constructed) -> Result<Self, DecodeError> {
        cons.take_sequence(Self::from_constructed)
    }

    /// Parses the content of a Certificate sequence.
    pub fn from_constructed(
        cons: &mut Constructed
    ) -> Result<Self, DecodeError> {
        let mut res = cons.take_sequence(Self::tbs_from_constructed)?;
        res.outer_signature = Signature::x509_take_from(cons)?;
        Ok(res)
    }

    /// Parses the content of the TBSCertificate sequence.
    ///
    /// The outer signature is left at a default value.
    fn tbs_from_constructed(
        cons: &mut Constructed
    ) -> Result<Self, DecodeError> {
        // version [0] EXPLICIT Version DEFAULT v1.
        //  -- we need extensions so apparently, we want v3 which,
        //     confusingly, is 2.
        cons.take_constructed_if(Tag::CTX_0, |c| c.skip_u8_if(2))?;

        let serial_number = cons.take::<Integer>()?;
        let signature = SignatureAlgorithm::x509_take_from(cons)?;
        let issuer = Name::take_from(cons)?;
        let validity = Validity::take_from(cons)?;
        let subject = Name::take_from(cons)?;
        let subject_public_key_info = PublicKey::take_from(cons)?;

        // issuerUniqueID and subjectUniqueID must not be present in
        // resource certificates but are harmless.
        cons.take_opt_value_if(Tag::CTX_1, |_| Ok(()))?;
        cons.take_opt_value_if(Tag::CTX_2, |_| Ok(()))?;

        let mut ext = Extensions::default();
        cons.take_opt_constructed_if(Tag::CTX_3, |cons| {
            cons.take_sequence(|cons| ext.take_all(cons))
        })?;

        Ok(Cert {
            serial_number,
            signature,
            issuer,
            validity,
            subject,
            subject_public_key_info,
            subject_key_identifier: ext.subject_key_id,
            authority_key_identifier: ext.authority_key_id.flatten(),
            crl_uri: ext.crl_uri.flatten(),
            ca_issuer: ext.ca_issuer.flatten(),
            sia: ext.sia,
            outer_signature: Signature::new(
                SignatureAlgorithm::default(), Bytes::new()
            ),
        })
    }
}

/// # Data Access
///
impl Cert {
    /// Returns the serial number of the certificate.
    pub fn serial_number(&self) -> &Integer {
        &self.serial_number
    }

    /// Returns the signature algorithm stated inside the certificate.
    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        self.signature
    }

    /// Returns the issuer name.
    pub fn issuer(&self) -> &Name {
        &self.issuer
    }

    /// Returns the validity period of the certificate.
    pub fn validity(&self) -> Validity {
        self.validity
    }

    /// Returns the subject name.
    pub fn subject(&self) -> &Name {
        &self.subject
    }

    /// Returns a reference to the certificate’s public key.
    pub fn subject_public_key_info(&self) -> &PublicKey {
        &self.subject_public_key_info
    }

    /// Returns the subject key identifier if present.
    pub fn subject_key_identifier(&self) -> Option<KeyIdentifier> {
        self.subject_key_identifier
    }

    /// Returns the authority key identifier if present.
    pub fn authority_key_identifier(&self) -> Option<KeyIdentifier> {
        self.authority_key_identifier
    }

    /// Returns the CRL distribution point URI if present.
    pub fn crl_uri(&self) -> Option<&Uri> {
        self.crl_uri.as_ref()
    }

    /// Returns the first caIssuers URI of the AIA extension if present.
    pub fn ca_issuer(&self) -> Option<&Uri> {
        self.ca_issuer.as_ref()
    }

    /// Returns the Subject Information Access extension if present.
    pub fn sia(&self) -> Option<&Sia> {
        self.sia.as_ref()
    }

    /// Returns the caRepository URI of the SIA extension if present.
    pub fn ca_repository(&self) -> Option<&Uri> {
        self.sia.as_ref().and_then(Sia::ca_repository)
    }

    /// Returns the rpkiManifest URI of the SIA extension if present.
    pub fn rpki_manifest(&self) -> Option<&Uri> {
        self.sia.as_ref().and_then(Sia::rpki_manifest)
    }

    /// Returns the signedObject URI of the SIA extension if present.
    pub fn signed_object(&self) -> Option<&Uri> {
        self.sia.as_ref().and_then(Sia::signed_object)
    }

    /// Returns the rpkiNotify URI of the SIA extension if present.
    pub fn rpki_notify(&self) -> Option<&Uri> {
        self.sia.as_ref().and_then(Sia::rpki_notify)
    }

    /// Returns the outer signature of the certificate.
    pub fn outer_signature(&self) -> &Signature {
        &self.outer_signature
    }
}


//------------ Extensions ----------------------------------------------------

/// Internal helper type collecting the extensions we care about.
///
/// The URI fields are doubly optional: the outer option tracks whether the
/// extension was present, the inner whether it contained a usable URI.
#[derive(Default)]
struct Extensions {
    subject_key_id: Option<KeyIdentifier>,
    authority_key_id: Option<Option<KeyIdentifier>>,
    crl_uri: Option<Option<Uri>>,
    ca_issuer: Option<Option<Uri>>,
    sia: Option<Sia>,
}

impl Extensions {
    /// Takes all extensions from the content of the Extensions sequence.
    ///
    /// ```txt
    /// Extension  ::=  SEQUENCE  {
    ///      extnID      OBJECT IDENTIFIER,
    ///      critical    BOOLEAN DEFAULT FALSE,
    ///      extnValue   OCTET STRING }
    /// ```
    fn take_all(&mut self, cons: &mut Constructed) -> Result<(), DecodeError> {
        while let Some(()) = cons.take_opt_sequence(|cons| {
            let pos = cons.pos();
            let id = Oid::<Bytes>::take_from(cons)?;
            // Unknown extensions are skipped whether critical or not.
            let _critical = cons.take_opt_bool()?.unwrap_or(false);
            let value = cons.take_primitive_if(
                Tag::OCTET_STRING, |content| Ok(content.clone())
            )?;
            self.take_extension(&id, pos, &value)
        })? { }
        Ok(())
    }

    fn take_extension(
        &mut self, id: &Oid, pos: usize, value: &Content
    ) -> Result<(), DecodeError> {
        if *id == oid::CE_SUBJECT_KEY_IDENTIFIER {
            update_once(&mut self.subject_key_id, pos, || {
                value.decode_nested(KeyIdentifier::take_from)
            })
        }
        else if *id == oid::CE_AUTHORITY_KEY_IDENTIFIER {
            update_once(&mut self.authority_key_id, pos, || {
                value.decode_nested(take_authority_key_identifier)
            })
        }
        else if *id == oid::CE_CRL_DISTRIBUTION_POINTS {
            update_once(&mut self.crl_uri, pos, || {
                value.decode_nested(take_crl_distribution_points)
            })
        }
        else if *id == oid::PE_AUTHORITY_INFO_ACCESS {
            update_once(&mut self.ca_issuer, pos, || {
                value.decode_nested(take_authority_info_access)
            })
        }
        else if *id == oid::PE_SUBJECT_INFO_ACCESS {
            update_once(&mut self.sia, pos, || {
                value.decode_nested(Sia::take_from)
            })
        }
        else {
            // RFC 5280 says we can ignore non-critical extensions we don’t
            // know of. We don’t validate, so we ignore critical ones, too.
            Ok(())
        }
    }
}


/// Parses the Authority Key Identifier extension.
///
/// ```text
/// AuthorityKeyIdentifier ::= SEQUENCE {
///   keyIdentifier             [0] KeyIdentifier           OPTIONAL,
///   authorityCertIssuer       [1] GeneralNames            OPTIONAL,
///   authorityCertSerialNumber [2] CertificateSerialNumber OPTIONAL  }
/// ```
///
/// Returns the keyIdentifier field if present. The others are skipped.
fn take_authority_key_identifier(
    cons: &mut Constructed
) -> Result<Option<KeyIdentifier>, DecodeError> {
    cons.take_sequence(|cons| {
        let res = cons.take_opt_primitive_if(
            Tag::CTX_0, KeyIdentifier::from_content
        )?;
        cons.skip_all()?;
        Ok(res)
    })
}

/// Parses the CRL Distribution Points extension.
///
/// ```text
/// CRLDistributionPoints ::= SEQUENCE SIZE (1..MAX) OF DistributionPoint
///
/// DistributionPoint ::= SEQUENCE {
///    distributionPoint       [0]     DistributionPointName OPTIONAL,
///    reasons                 [1]     ReasonFlags OPTIONAL,
///    cRLIssuer               [2]     GeneralNames OPTIONAL }
///
/// DistributionPointName ::= CHOICE {
///    fullName                [0]     GeneralNames,
///    nameRelativeToCRLIssuer [1]     RelativeDistinguishedName }
/// ```
///
/// Returns the first URI of the fullName of the first distribution point.
fn take_crl_distribution_points(
    cons: &mut Constructed
) -> Result<Option<Uri>, DecodeError> {
    cons.take_sequence(|cons| {
        let res = cons.take_sequence(|cons| {
            let res = cons.take_opt_constructed_if(Tag::CTX_0, |cons| {
                let res = cons.take_opt_constructed_if(
                    Tag::CTX_0, take_general_names_content
                )?;
                cons.skip_all()?;
                Ok(res.flatten())
            })?;
            cons.skip_all()?;
            Ok(res.flatten())
        })?;
        cons.skip_all()?;
        Ok(res)
    })
}

/// Parses the Authority Information Access extension.
///
/// ```text
/// AuthorityInfoAccessSyntax  ::=
///         SEQUENCE SIZE (1..MAX) OF AccessDescription
///
/// AccessDescription  ::=  SEQUENCE {
///         accessMethod          OBJECT IDENTIFIER,
///         accessLocation        GeneralName  }
/// ```
///
/// Returns the first URI with accessMethod id-ad-caIssuers.
fn take_authority_info_access(
    cons: &mut Constructed
) -> Result<Option<Uri>, DecodeError> {
    let mut res = None;
    take_access_descriptions(cons, |oid, cons| {
        if *oid == oid::AD_CA_ISSUERS {
            update_first(&mut res, || take_general_name(cons))
        }
        else {
            cons.skip_one()
        }
    })?;
    Ok(res)
}

/// Takes the content of an access information extension.
///
/// Runs `op` for each access description with the access method and the
/// constructed value positioned at the access location. The sequence must
/// not be empty.
fn take_access_descriptions<F>(
    cons: &mut Constructed, mut op: F
) -> Result<(), DecodeError>
where F: FnMut(&Oid, &mut Constructed) -> Result<(), DecodeError> {
    cons.take_sequence(|cons| {
        let mut any_seen = false;
        while let Some(()) = cons.take_opt_sequence(|cons| {
            let oid = Oid::<Bytes>::take_from(cons)?;
            any_seen = true;
            op(&oid, cons)
        })? { }
        if any_seen {
            Ok(())
        }
        else {
            Err(cons.err(
                ErrorKind::SchemaMismatch, "empty access information"
            ))
        }
    })
}

/// Parses the URI from the content of a GeneralNames sequence.
///
/// ```text
/// GeneralNames ::= SEQUENCE SIZE (1..MAX) OF GeneralName
/// ```
///
/// Returns the first usable URI.
fn take_general_names_content(
    cons: &mut Constructed
) -> Result<Option<Uri>, DecodeError> {
    let mut res = None;
    while !cons.is_empty() {
        update_first(&mut res, || take_general_name(cons))?;
    }
    Ok(res)
}

/// Takes a single general name and returns it if it is a usable URI.
///
/// ```text
/// GeneralName ::= CHOICE {
///    ...
///    uniformResourceIdentifier       [6]     IA5String,
///    ... }
/// ```
///
/// Other choices and URIs we can’t parse are skipped. URIs must be valid
/// IA5Strings, though.
fn take_general_name(
    cons: &mut Constructed
) -> Result<Option<Uri>, DecodeError> {
    let content = cons.take_one()?;
    if content.tag() != Tag::CTX_6 {
        return Ok(None)
    }
    content.expect_primitive()?;
    let uri = Ia5String::from_content(&content)?;
    Ok(Uri::from_bytes(uri.into_bytes()).ok())
}


//------------ Sia -----------------------------------------------------------

/// The Subject Information Access extension.
///
/// ```text
/// SubjectInfoAccessSyntax  ::=
///         SEQUENCE SIZE (1..MAX) OF AccessDescription
/// ```
///
/// Only the first URI of each of the access methods relevant to RPKI is
/// kept.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Sia {
    ca_repository: Option<Uri>,
    rpki_manifest: Option<Uri>,
    signed_object: Option<Uri>,
    rpki_notify: Option<Uri>,
}

impl Sia {
    pub fn take_from(cons: &mut Constructed) -> Result<Self, DecodeError> {
        let mut sia = Sia::default();
        take_access_descriptions(cons, |oid, cons| {
            if *oid == oid::AD_CA_REPOSITORY {
                update_first(&mut sia.ca_repository, || {
                    take_general_name(cons)
                })
            }
            else if *oid == oid::AD_RPKI_MANIFEST {
                update_first(&mut sia.rpki_manifest, || {
                    take_general_name(cons)
                })
            }
            else if *oid == oid::AD_SIGNED_OBJECT {
                update_first(&mut sia.signed_object, || {
                    take_general_name(cons)
                })
            }
            else if *oid == oid::AD_RPKI_NOTIFY {
                update_first(&mut sia.rpki_notify, || {
                    take_general_name(cons)
                })
            }
            else {
                cons.skip_all()
            }
        })?;
        Ok(sia)
    }

    pub fn ca_repository(&self) -> Option<&Uri> {
        self.ca_repository.as_ref()
    }

    pub fn rpki_manifest(&self) -> Option<&Uri> {
        self.rpki_manifest.as_ref()
    }

    pub fn signed_object(&self) -> Option<&Uri> {
        self.signed_object.as_ref()
    }

    pub fn rpki_notify(&self) -> Option<&Uri> {
        self.rpki_notify.as_ref()
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::{CertBuilder, TEST_AKI, TEST_SKI};

    #[test]
    fn decode_ee_cert() {
        let cert = Cert::decode(&CertBuilder::new().build()).unwrap();
        assert_eq!(cert.subject_key_identifier().unwrap(), TEST_SKI);
        assert_eq!(cert.authority_key_identifier().unwrap(), TEST_AKI);
        assert_eq!(cert.serial_number().to_u64(), Some(0x1234));
        assert_eq!(
            cert.ca_issuer().unwrap().as_str(),
            "rsync://rpki.example.net/repo/ta/ca.cer"
        );
        assert_eq!(
            cert.crl_uri().unwrap().as_str(),
            "rsync://rpki.example.net/repo/ca/revoked.crl"
        );
        assert_eq!(
            cert.signed_object().unwrap().as_str(),
            "rsync://rpki.example.net/repo/ca/manifest.mft"
        );
        assert_eq!(
            cert.rpki_notify().unwrap().as_str(),
            "https://rrdp.example.net/notification.xml"
        );
        assert!(cert.ca_repository().is_none());
        assert!(cert.rpki_manifest().is_none());
        assert_eq!(cert.validity().not_before().timestamp(), 1735689600);
        assert_eq!(cert.outer_signature().value().as_ref(), b"sig");
    }

    #[test]
    fn missing_key_identifiers() {
        let cert = Cert::decode(
            &CertBuilder::new().without_ski().build()
        ).unwrap();
        assert!(cert.subject_key_identifier().is_none());
        assert_eq!(cert.authority_key_identifier().unwrap(), TEST_AKI);

        for builder in [
            CertBuilder::new().without_aki(),
            CertBuilder::new().aki_without_key_id(),
        ] {
            let cert = Cert::decode(&builder.build()).unwrap();
            assert!(cert.authority_key_identifier().is_none());
            assert_eq!(cert.subject_key_identifier().unwrap(), TEST_SKI);
        }
    }

    #[test]
    fn optional_access_extensions() {
        let cert = Cert::decode(
            &CertBuilder::new().without_aia().without_sia().build()
        ).unwrap();
        assert!(cert.ca_issuer().is_none());
        assert!(cert.sia().is_none());
        assert!(cert.signed_object().is_none());
    }

    #[test]
    fn duplicate_extension() {
        let err = Cert::decode(
            &CertBuilder::new().duplicate_ski().build()
        ).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    }

    #[test]
    fn empty_sia() {
        let err = Cert::decode(
            &CertBuilder::new().empty_sia().build()
        ).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    }

    #[test]
    fn wrong_ski_length() {
        let err = Cert::decode(
            &CertBuilder::new().short_ski().build()
        ).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    }

    #[test]
    fn unknown_extensions_skipped() {
        Cert::decode(
            &CertBuilder::new().with_unknown_critical_extension().build()
        ).unwrap();
    }

    #[test]
    fn wrong_version() {
        let err = Cert::decode(
            &CertBuilder::new().version(1).build()
        ).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    }
}
