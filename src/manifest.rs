//! RPKI Manifests.
//!
//! Manifests list all the files that are currently published by an RPKI CA.
//! They are defined in RFC 9286.
//!
//! This module defines the type [`Manifest`] that represents a decoded
//! manifest and the type [`ManifestContent`] for the content of the
//! manifest alone, as well as some helper types for accessing the content.

use std::{fmt, ops, slice};
use std::collections::HashSet;
use bytes::Bytes;
use num_bigint::BigUint;
use crate::oid;
use crate::crypto::{DigestAlgorithm, KeyIdentifier};
use crate::der::{
    decode, Constructed, DecodeError, ErrorKind, Ia5String, Integer, Oid, Tag
};
use crate::sigobj::SignedObject;
use crate::uri::{self, Uri};
use crate::util::hex;
use crate::x509::Time;


//------------ Manifest ------------------------------------------------------

/// A decoded RPKI manifest.
///
/// The value combines the manifest content with the information taken from
/// the signed object it was wrapped in and the EE certificate of that
/// object. It owns all its data.
///
/// Nothing is validated: neither the signature nor the certificate nor the
/// validity period of the manifest. The file list can be accessed directly
/// through the value which behaves like a slice of [`FileAndHash`] items.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Manifest {
    version: u8,
    manifest_number: BigUint,
    this_update: Time,
    next_update: Time,
    file_hash_algorithm: Oid,
    file_list: Vec<FileAndHash>,

    /// The key identifiers of the EE certificate.
    aki: KeyIdentifier,
    ski: KeyIdentifier,

    /// The caIssuers URI of the EE certificate.
    aia: Option<Uri>,

    /// The URI the manifest is published at.
    sia: Option<Uri>,

    signing_time: Option<Time>,
}

/// # Decoding
///
impl Manifest {
    /// Decodes a manifest from its encoded signed object.
    ///
    /// The signed object is decoded in relaxed mode.
    pub fn from_content(data: &[u8]) -> Result<Self, DecodeError> {
        Self::decode(data, false)
    }

    /// Decodes a manifest using the given mode for the signed object.
    pub fn decode(data: &[u8], strict: bool) -> Result<Self, DecodeError> {
        Self::from_signed_object(SignedObject::decode(data, strict)?)
    }

    /// Creates a manifest from a decoded signed object.
    ///
    /// Errors for the wrong content type, missing content, or missing key
    /// identifiers of the EE certificate are reported at offset 0. Errors in
    /// the content carry offsets relative to the start of the content.
    pub fn from_signed_object(
        signed: SignedObject
    ) -> Result<Self, DecodeError> {
        if *signed.content_type() != oid::CT_RPKI_MANIFEST {
            return Err(DecodeError::new(
                ErrorKind::SchemaMismatch, 0, "not a manifest"
            ))
        }
        let cert = signed.cert();
        let ski = cert.subject_key_identifier().ok_or_else(|| {
            DecodeError::new(
                ErrorKind::MissingExtension, 0,
                "missing Subject Key Identifier extension"
            )
        })?;
        let aki = cert.authority_key_identifier().ok_or_else(|| {
            DecodeError::new(
                ErrorKind::MissingExtension, 0,
                "missing keyIdentifier in Authority Key Identifier"
            )
        })?;
        let content = match signed.content() {
            Some(content) => ManifestContent::decode(content.as_ref())?,
            None => {
                return Err(DecodeError::new(
                    ErrorKind::SchemaMismatch, 0, "missing manifest content"
                ))
            }
        };
        let sia = cert.signed_object()
            .or_else(|| cert.rpki_manifest())
            .or_else(|| cert.ca_repository())
            .cloned();
        Ok(Manifest {
            version: content.version,
            manifest_number: content.manifest_number,
            this_update: content.this_update,
            next_update: content.next_update,
            file_hash_algorithm: content.file_hash_alg.oid().to_oid(),
            file_list: content.file_list,
            aki,
            ski,
            aia: cert.ca_issuer().cloned(),
            sia,
            signing_time: signed.signing_time(),
        })
    }
}

/// # Data Access
///
impl Manifest {
    /// Returns the version of the manifest content. This is always 0.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Returns the manifest number.
    pub fn manifest_number(&self) -> &BigUint {
        &self.manifest_number
    }

    /// Returns the time this iteration of the manifest was created.
    pub fn this_update(&self) -> Time {
        self.this_update
    }

    /// Returns the time the next iteration of the manifest is due.
    pub fn next_update(&self) -> Time {
        self.next_update
    }

    pub fn file_hash_algorithm(&self) -> &Oid {
        &self.file_hash_algorithm
    }

    /// Returns the list of files in their encoding order.
    pub fn file_list(&self) -> &[FileAndHash] {
        &self.file_list
    }

    /// Returns the authority key identifier of the EE certificate.
    pub fn aki(&self) -> KeyIdentifier {
        self.aki
    }

    /// Returns the subject key identifier of the EE certificate.
    pub fn ski(&self) -> KeyIdentifier {
        self.ski
    }

    /// Returns the URI of the certificate of the issuing CA.
    pub fn aia(&self) -> Option<&Uri> {
        self.aia.as_ref()
    }

    /// Returns the URI the manifest is published under.
    ///
    /// This is the signedObject URI of the EE certificate. If that is
    /// missing, the rpkiManifest and then the caRepository URIs are tried.
    pub fn sia(&self) -> Option<&Uri> {
        self.sia.as_ref()
    }

    /// Returns the signing time if the object had a usable one.
    pub fn signing_time(&self) -> Option<Time> {
        self.signing_time
    }

    /// Returns whether the manifest is stale at the given time.
    ///
    /// A manifest is stale if it’s nextUpdate time has passed.
    pub fn is_stale_at(&self, now: Time) -> bool {
        self.next_update.is_before(now)
    }

    /// Returns whether the manifest is stale now.
    pub fn is_stale(&self) -> bool {
        self.is_stale_at(Time::now())
    }
}

/// # Access to the File List
///
impl Manifest {
    /// Returns the number of entries in the file list.
    pub fn len(&self) -> usize {
        self.file_list.len()
    }

    /// Returns whether the file list is empty.
    pub fn is_empty(&self) -> bool {
        self.file_list.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FileAndHash> {
        self.file_list.get(index)
    }

    pub fn iter(&self) -> slice::Iter<FileAndHash> {
        self.file_list.iter()
    }

    /// Returns an iterator over the files with their absolute URIs.
    ///
    /// The file names are relative to the directory the manifest is
    /// published in, so the URIs are formed by joining them onto the
    /// parent of the manifest’s SIA URI. If that URI already ends in a
    /// slash, it is used as is.
    ///
    /// Returns `None` if the manifest doesn’t have a SIA URI.
    pub fn iter_uris(&self) -> Option<ManifestIter> {
        let sia = self.sia.as_ref()?;
        let base = if sia.is_directory() {
            sia.clone()
        }
        else {
            sia.parent().unwrap_or_else(|| sia.clone())
        };
        Some(ManifestIter { base, files: self.file_list.iter() })
    }
}


//--- Index and IntoIterator

impl ops::Index<usize> for Manifest {
    type Output = FileAndHash;

    fn index(&self, index: usize) -> &FileAndHash {
        &self.file_list[index]
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a FileAndHash;
    type IntoIter = slice::Iter<'a, FileAndHash>;

    fn into_iter(self) -> Self::IntoIter {
        self.file_list.iter()
    }
}


//------------ ManifestIter --------------------------------------------------

/// An iterator over the files in the manifest.
///
/// The iterator returns pairs of the absolute URIs of the files and their
/// entry in the file list. It fails for file names that can’t be part of a
/// URI.
#[derive(Clone, Debug)]
pub struct ManifestIter<'a> {
    base: Uri,
    files: slice::Iter<'a, FileAndHash>,
}

impl<'a> Iterator for ManifestIter<'a> {
    type Item = Result<(Uri, &'a FileAndHash), uri::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.files.next()?;
        Some(self.base.join(item.file.as_ref()).map(|uri| (uri, item)))
    }
}


//------------ ManifestContent -----------------------------------------------

/// The content of an RPKI manifest.
///
/// A manifests consists chiefly of a list of files and their hash value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ManifestContent {
    /// The version of the manifest.
    version: u8,

    /// The number of this manifest.
    ///
    /// These numbers are similar to the serial numbers of certificates.
    manifest_number: BigUint,

    /// The time this iteration of the manifest was created.
    this_update: Time,

    /// The time the next iteration of the manifest is likely to be created.
    next_update: Time,

    /// The algorithm used for hashing the files.
    file_hash_alg: DigestAlgorithm,

    /// The list of files.
    file_list: Vec<FileAndHash>,
}

impl ManifestContent {
    /// Decodes the manifest content from its encoded form.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        decode(data, Self::take_from)
    }

    /// Takes the manifest content from the beginning of a constructed value.
    pub fn take_from(cons: &mut Constructed) -> Result<Self, DecodeError> {
        cons.take_sequence(|cons| {
            let pos = cons.pos();
            let version = cons.take_opt_constructed_if(Tag::CTX_0, |cons| {
                cons.take_u8()
            })?.unwrap_or(0);
            if version != 0 {
                return Err(DecodeError::new(
                    ErrorKind::SchemaMismatch, pos,
                    "unsupported manifest version"
                ))
            }
            let pos = cons.pos();
            let manifest_number = cons.take::<Integer>()?.to_biguint()
                .ok_or_else(|| {
                    DecodeError::new(
                        ErrorKind::SchemaMismatch, pos,
                        "negative manifest number"
                    )
                })?;
            let this_update = Time::take_generalized_from(cons)?;
            let next_update = Time::take_generalized_from(cons)?;
            let file_hash_alg = DigestAlgorithm::take_oid_from(cons)?;
            let file_list = cons.take_sequence(|cons| {
                let mut names = HashSet::new();
                cons.take_all(|cons| {
                    let pos = cons.pos();
                    let item = FileAndHash::take_from(cons, file_hash_alg)?;
                    if names.insert(item.file.clone()) {
                        Ok(item)
                    }
                    else {
                        Err(DecodeError::new(
                            ErrorKind::SchemaMismatch, pos,
                            "duplicate file name"
                        ))
                    }
                })
            })?;
            Ok(ManifestContent {
                version, manifest_number, this_update, next_update,
                file_hash_alg, file_list
            })
        })
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn manifest_number(&self) -> &BigUint {
        &self.manifest_number
    }

    pub fn this_update(&self) -> Time {
        self.this_update
    }

    pub fn next_update(&self) -> Time {
        self.next_update
    }

    pub fn file_hash_alg(&self) -> DigestAlgorithm {
        self.file_hash_alg
    }

    pub fn file_list(&self) -> &[FileAndHash] {
        &self.file_list
    }

    /// Returns the number of entries in the file list.
    pub fn len(&self) -> usize {
        self.file_list.len()
    }

    /// Returns whether the file list is empty.
    pub fn is_empty(&self) -> bool {
        self.file_list.is_empty()
    }
}


//------------ FileAndHash ---------------------------------------------------

/// An entry in the list of a manifest.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FileAndHash {
    /// The name of the file.
    ///
    /// This is guaranteed to be printable ASCII without slashes.
    file: Bytes,

    /// The hash over the file’s content.
    hash: Bytes,
}

impl FileAndHash {
    /// Takes an entry from the beginning of a constructed value.
    ///
    /// The hash must have the length of the digest of `alg`.
    pub fn take_from(
        cons: &mut Constructed, alg: DigestAlgorithm
    ) -> Result<Self, DecodeError> {
        cons.take_sequence(|cons| {
            let file = cons.take_primitive_if(
                Tag::IA5_STRING, |content| {
                    let file = Ia5String::from_content(content)?;
                    if is_file_name(file.as_str()) {
                        Ok(file.into_bytes())
                    }
                    else {
                        Err(content.err(
                            ErrorKind::InvalidString, "invalid file name"
                        ))
                    }
                }
            )?;
            let hash = cons.take_primitive_if(
                Tag::BIT_STRING, |content| {
                    match content.as_slice().split_first() {
                        Some((&0, hash)) if hash.len() == alg.digest_len() => {
                            Ok(Bytes::copy_from_slice(hash))
                        }
                        Some((&0, _)) => {
                            Err(content.err(
                                ErrorKind::InvalidHashEncoding,
                                "hash with wrong length"
                            ))
                        }
                        _ => {
                            Err(content.err(
                                ErrorKind::InvalidHashEncoding,
                                "hash is not byte-aligned"
                            ))
                        }
                    }
                }
            )?;
            Ok(FileAndHash { file, hash })
        })
    }

    /// Returns the name of the file.
    pub fn file(&self) -> &str {
        // Only ever contains printable ASCII.
        unsafe { std::str::from_utf8_unchecked(self.file.as_ref()) }
    }

    /// Returns the hash value of the file.
    pub fn hash(&self) -> &[u8] {
        self.hash.as_ref()
    }

    /// Returns the hash value as lower-case hex digits.
    pub fn hash_hex(&self) -> String {
        hex::encode_lower(self.hash.as_ref())
    }
}

/// Returns whether `name` is acceptable as the name of a listed file.
///
/// The name must not be empty, refer to a directory, or contain slashes or
/// control characters.
fn is_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".."
        && name.bytes().all(|ch| ch > 0x1F && ch < 0x7F && ch != b'/')
}


//--- Display

impl fmt::Display for FileAndHash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f, "FileAndHash(file={}, hash={})", self.file(), self.hash_hex()
        )
    }
}


//--- Serialize

#[cfg(feature = "serde")]
impl serde::Serialize for FileAndHash {
    fn serialize<S: serde::Serializer>(
        &self, serializer: S
    ) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("FileAndHash", 2)?;
        s.serialize_field("file", self.file())?;
        s.serialize_field("hash", &self.hash_hex())?;
        s.end()
    }
}


//============ Tests =========================================================



//============ Specification Documentation ===================================

/// Manifest Specification.
///
/// This is a documentation-only module. It summarizes the specification for
/// manifests and how they are parsed.
///
/// A manifest is a signed object that lists all the objects published by
/// an RPKI certificate authority. It is specified in [RFC 9286].
///
/// The content of a manifest signed object is of type `Manifest` which is
/// defined as follows:
///
/// ```txt
/// Manifest            ::= SEQUENCE {
///     version             [0] INTEGER DEFAULT 0,
///     manifestNumber      INTEGER (0..MAX),
///     thisUpdate          GeneralizedTime,
///     nextUpdate          GeneralizedTime,
///     fileHashAlg         OBJECT IDENTIFIER,
///     fileList            SEQUENCE SIZE (0..MAX) OF FileAndHash
/// }
///
/// FileAndHash         ::= SEQUENCE {
///     file                IA5String,
///     hash                BIT STRING
/// }
/// ```
///
/// The _version_ must be 0. Both time values must be GeneralizedTime values
/// in the form required for certificates. The only accepted _fileHashAlg_ is
/// SHA-256 and every _hash_ must be an octet-aligned SHA-256 digest.
///
/// [RFC 9286]: https://tools.ietf.org/html/rfc9286
pub mod spec { }
