//! Digest algorithms.

use bytes::Bytes;
use crate::der::{ConstOid, Constructed, DecodeError, ErrorKind, Oid};
use crate::oid;


//------------ DigestAlgorithm -----------------------------------------------

/// The digest algorithms used by RPKI.
///
/// These are the algorithms used by the signature algorithms and for the
/// file hashes of manifests. For use in RPKI, [RFC 7935] limits them to
/// exactly one, SHA-256. Because of that, this type is currently a
/// zero-sized struct. If additional algorithms are ever introduced in the
/// future, it will change into an enum.
///
/// Digests are never calculated by this crate, the type only describes the
/// algorithm and the length of its output.
///
/// [RFC 7935]: https://tools.ietf.org/html/rfc7935
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct DigestAlgorithm(());

impl DigestAlgorithm {
    /// Returns the SHA-256 algorithm.
    pub fn sha256() -> Self {
        DigestAlgorithm(())
    }

    /// Returns the length in octets of a digest of this algorithm.
    pub fn digest_len(self) -> usize {
        32
    }

    /// Returns the object identifier of the algorithm.
    pub fn oid(self) -> ConstOid {
        oid::SHA256
    }
}


/// # ASN.1 Values
///
/// Digest algorithms appear in CMS either alone or in sets with the following
/// syntax:
///
/// ```txt
/// DigestAlgorithmIdentifiers ::= SET OF DigestAlgorithmIdentifier
/// DigestAlgorithmIdentifier  ::= AlgorithmIdentifier
/// AlgorithmIdentifier        ::= SEQUENCE {
///      algorithm                 OBJECT IDENTIFIER,
///      parameters                ANY DEFINED BY algorithm OPTIONAL }
/// ```
///
/// In RPKI signed objects, a set is limited to exactly one identifer. The
/// _parameters_ field may either be absent or `NULL`. Manifests only carry
/// the bare object identifier.
impl DigestAlgorithm {
    /// Takes and returns a single digest algorithm identifier.
    pub fn take_from(cons: &mut Constructed) -> Result<Self, DecodeError> {
        cons.take_sequence(Self::from_constructed)
    }

    /// Takes and returns an optional digest algorithm identifier.
    ///
    /// Returns `Ok(None)` if the next value isn’t a sequence.
    pub fn take_opt_from(
        cons: &mut Constructed
    ) -> Result<Option<Self>, DecodeError> {
        cons.take_opt_sequence(Self::from_constructed)
    }

    /// Takes and returns a set of digest algorithm identifiers.
    ///
    /// The set must contain exactly one identifier as required everywhere
    /// for RPKI.
    pub fn take_set_from(
        cons: &mut Constructed
    ) -> Result<Self, DecodeError> {
        cons.take_set(|cons| {
            match Self::take_opt_from(cons)? {
                Some(res) => Ok(res),
                None => Err(cons.err(
                    ErrorKind::SchemaMismatch,
                    "empty set of digest algorithms"
                ))
            }
        })
    }

    /// Takes a bare algorithm object identifier.
    pub fn take_oid_from(
        cons: &mut Constructed
    ) -> Result<Self, DecodeError> {
        let pos = cons.pos();
        let oid = Oid::<Bytes>::take_from(cons)?;
        if oid == oid::SHA256 {
            Ok(Self::sha256())
        }
        else {
            Err(DecodeError::new(
                ErrorKind::SchemaMismatch, pos,
                "unsupported digest algorithm"
            ))
        }
    }

    /// Parses the algorithm identifier from the contents of its sequence.
    fn from_constructed(
        cons: &mut Constructed
    ) -> Result<Self, DecodeError> {
        let res = Self::take_oid_from(cons)?;
        cons.take_opt_null()?;
        Ok(res)
    }
}


//============ Tests =========================================================
