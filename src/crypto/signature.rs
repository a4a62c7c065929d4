//! Signature algorithms and signature values.

use bytes::Bytes;
use crate::der::{BitString, Constructed, DecodeError, ErrorKind, Oid, Tag};
use crate::oid;


//------------ SignatureAlgorithm --------------------------------------------

/// A signature algorithm used by RPKI.
///
/// For RPKI, [RFC 7935] allows only one algorithm, RSA PKCS #1 v1.5 with
/// SHA-256. However, there are two possible representations of the
/// non-existant algorithm parameters. This type keeps track of the
/// representation used.
///
/// [RFC 7935]: https://tools.ietf.org/html/rfc7935
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SignatureAlgorithm {
    /// Is the parameter field present?
    ///
    /// If `true`, then a parameter field is present and NULL. Otherwise it
    /// is missing.
    has_parameter: bool
}

/// # ASN.1 Values
///
/// ```txt
/// SignatureAlgorithmIdentifier ::= AlgorithmIdentifier
/// AlgorithmIdentifier          ::= SEQUENCE {
///      algorithm                   OBJECT IDENTIFIER,
///      parameters                  ANY DEFINED BY algorithm OPTIONAL }
/// ```
///
/// For X.509 objects, the identifier is `sha256WithRSAEncryption` from
/// [RFC 4055]. For signed objects, it should be `rsaEncryption` from
/// [RFC 3370] but both are accepted when reading.
///
/// [RFC 3370]: https://tools.ietf.org/html/rfc3370
/// [RFC 4055]: https://tools.ietf.org/html/rfc4055
impl SignatureAlgorithm {
    pub fn has_parameter(self) -> bool {
        self.has_parameter
    }

    /// Takes a signature algorithm identifier for X.509 objects.
    pub fn x509_take_from(
        cons: &mut Constructed
    ) -> Result<Self, DecodeError> {
        cons.take_sequence(|cons| {
            oid::SHA256_WITH_RSA_ENCRYPTION.skip_if(cons)?;
            Self::take_parameter(cons)
        })
    }

    /// Takes a signature algorithm identifier for CMS objects.
    pub fn cms_take_from(
        cons: &mut Constructed
    ) -> Result<Self, DecodeError> {
        cons.take_sequence(|cons| {
            let pos = cons.pos();
            let oid = Oid::<Bytes>::take_from(cons)?;
            if
                oid != oid::RSA_ENCRYPTION
                && oid != oid::SHA256_WITH_RSA_ENCRYPTION
            {
                return Err(DecodeError::new(
                    ErrorKind::SchemaMismatch, pos,
                    "invalid signature algorithm"
                ))
            }
            Self::take_parameter(cons)
        })
    }

    fn take_parameter(cons: &mut Constructed) -> Result<Self, DecodeError> {
        let has_parameter = cons.take_opt_null()?.is_some();
        Ok(SignatureAlgorithm { has_parameter })
    }
}


//--- Default

impl Default for SignatureAlgorithm {
    fn default() -> Self {
        SignatureAlgorithm { has_parameter: true }
    }
}


//------------ Signature -----------------------------------------------------

/// A signature: the algorithm and the signature value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Signature {
    algorithm: SignatureAlgorithm,
    value: Bytes
}

impl Signature {
    pub fn new(algorithm: SignatureAlgorithm, value: Bytes) -> Self {
        Signature { algorithm, value }
    }

    /// Takes the signature algorithm and BIT STRING value of X.509 objects.
    pub fn x509_take_from(
        cons: &mut Constructed
    ) -> Result<Self, DecodeError> {
        let algorithm = SignatureAlgorithm::x509_take_from(cons)?;
        let pos = cons.pos();
        let bits = cons.take::<BitString>()?;
        let value = match bits.octet_slice() {
            Some(slice) => Bytes::copy_from_slice(slice),
            None => {
                return Err(DecodeError::new(
                    ErrorKind::SchemaMismatch, pos,
                    "signature value with unused bits"
                ))
            }
        };
        Ok(Signature { algorithm, value })
    }

    /// Takes the signature algorithm and OCTET STRING value of SignerInfo.
    pub fn cms_take_from(
        cons: &mut Constructed
    ) -> Result<Self, DecodeError> {
        let algorithm = SignatureAlgorithm::cms_take_from(cons)?;
        let value = cons.take_primitive_if(Tag::OCTET_STRING, |content| {
            Ok(Bytes::copy_from_slice(content.as_slice()))
        })?;
        Ok(Signature { algorithm, value })
    }

    pub fn algorithm(&self) -> &SignatureAlgorithm {
        &self.algorithm
    }

    pub fn value(&self) -> &Bytes {
        &self.value
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::der::decode;

    #[test]
    fn cms_algorithms() {
        // rsaEncryption with NULL
        let alg = decode(
            b"\x30\x0d\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x01\x05\x00",
            SignatureAlgorithm::cms_take_from
        ).unwrap();
        assert!(alg.has_parameter());

        // sha256WithRSAEncryption without parameters
        let alg = decode(
            b"\x30\x0b\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x0b",
            SignatureAlgorithm::cms_take_from
        ).unwrap();
        assert!(!alg.has_parameter());
        assert_ne!(alg, SignatureAlgorithm::default());
    }

    #[test]
    fn x509_algorithm() {
        decode(
            b"\x30\x0d\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x0b\x05\x00",
            SignatureAlgorithm::x509_take_from
        ).unwrap();
        assert_eq!(
            decode(
                b"\x30\x0d\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x01\
                  \x05\x00",
                SignatureAlgorithm::x509_take_from
            ).unwrap_err().kind(),
            ErrorKind::SchemaMismatch
        );
    }

    #[test]
    fn cms_rejects_other_algorithms() {
        // ecdsa-with-SHA256
        assert_eq!(
            decode(
                b"\x30\x0a\x06\x08\x2a\x86\x48\xce\x3d\x04\x03\x02",
                SignatureAlgorithm::cms_take_from
            ).unwrap_err().kind(),
            ErrorKind::SchemaMismatch
        );
    }
}
