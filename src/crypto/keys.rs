//! Public keys and key identifiers.

use std::{error, fmt, str};
use std::str::FromStr;
use bytes::Bytes;
use crate::der::{
    BitString, Constructed, Content, DecodeError, ErrorKind, Oid, Tag
};
use crate::util::hex;


//------------ PublicKey -----------------------------------------------------

/// A public key as it appears in a certificate.
///
/// ```txt
/// SubjectPublicKeyInfo ::= SEQUENCE {
///      algorithm            AlgorithmIdentifier,
///      subjectPublicKey     BIT STRING }
/// ```
///
/// The key is kept as is. Since nothing is ever verified, the algorithm is
/// not restricted beyond being a well-formed identifier.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PublicKey {
    algorithm: Oid,
    bits: BitString,
}

impl PublicKey {
    pub fn take_from(cons: &mut Constructed) -> Result<Self, DecodeError> {
        cons.take_sequence(|cons| {
            let algorithm = cons.take_sequence(|cons| {
                let oid = Oid::<Bytes>::take_from(cons)?;
                // The parameters depend on the algorithm.
                cons.skip_all()?;
                Ok(oid)
            })?;
            Ok(PublicKey { algorithm, bits: cons.take()? })
        })
    }

    /// Returns the object identifier of the key algorithm.
    pub fn algorithm(&self) -> &Oid {
        &self.algorithm
    }

    /// Returns the key bits.
    pub fn bits(&self) -> &BitString {
        &self.bits
    }
}


//------------ KeyIdentifier -------------------------------------------------

/// A key identifier.
///
/// This is the SHA-1 hash over the public key’s bits and thus exactly 20
/// octets long.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialOrd)]
pub struct KeyIdentifier([u8; 20]);

impl KeyIdentifier {
    /// Returns an octet slice of the key identifer’s value.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Takes an encoded key identifier from a constructed value.
    ///
    /// ```text
    /// KeyIdentifier ::= OCTET STRING
    /// ```
    ///
    /// The content of the octet string needs to be a SHA-1 hash, so it must
    /// be exactly 20 octets long.
    pub fn take_from(cons: &mut Constructed) -> Result<Self, DecodeError> {
        cons.take_primitive_if(Tag::OCTET_STRING, Self::from_content)
    }

    /// Parses an encoded key identifer from a encoded content.
    pub fn from_content(content: &Content) -> Result<Self, DecodeError> {
        Self::try_from(content.as_slice()).map_err(|_| {
            content.err(
                ErrorKind::SchemaMismatch, "key identifier of wrong length"
            )
        })
    }
}


//--- TryFrom and FromStr

impl<'a> TryFrom<&'a [u8]> for KeyIdentifier {
    type Error = RepresentationError;

    fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
        value.try_into().map(KeyIdentifier).map_err(|_| RepresentationError)
    }
}

impl From<[u8; 20]> for KeyIdentifier {
    fn from(src: [u8; 20]) -> Self {
        KeyIdentifier(src)
    }
}

impl FromStr for KeyIdentifier {
    type Err = RepresentationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.len() != 40 || !value.is_ascii() {
            return Err(RepresentationError)
        }
        let mut res = KeyIdentifier(Default::default());
        for (pos, ch) in value.as_bytes().chunks(2).enumerate() {
            let ch = unsafe { str::from_utf8_unchecked(ch) };
            res.0[pos] = u8::from_str_radix(ch, 16)
                            .map_err(|_| RepresentationError)?;
        }
        Ok(res)
    }
}


//--- AsRef and PartialEq

impl AsRef<[u8]> for KeyIdentifier {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl<T: AsRef<[u8]>> PartialEq<T> for KeyIdentifier {
    fn eq(&self, other: &T) -> bool {
        self.0.as_ref().eq(other.as_ref())
    }
}


//--- Display and Debug

impl fmt::Display for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut buf = [0u8; 40];
        write!(f, "{}", hex::encode(self.as_slice(), &mut buf))
    }
}

impl fmt::Debug for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "KeyIdentifier({})", self)
    }
}


//--- Deserialize and Serialize

#[cfg(feature = "serde")]
impl serde::Serialize for KeyIdentifier {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S
    ) -> Result<S::Ok, S::Error> {
        let mut buf = [0u8; 40];
        serializer.serialize_str(hex::encode(self.as_slice(), &mut buf))
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for KeyIdentifier {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        struct KeyIdentifierVisitor;

        impl<'de> serde::de::Visitor<'de> for KeyIdentifierVisitor {
            type Value = KeyIdentifier;

            fn expecting(
                &self, formatter: &mut fmt::Formatter
            ) -> fmt::Result {
                write!(formatter,
                    "a string containing a key identifier as hex digits"
                )
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where E: serde::de::Error {
                KeyIdentifier::from_str(s).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(KeyIdentifierVisitor)
    }
}


//------------ RepresentationError -------------------------------------------

/// A key identifier was given in an invalid representation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RepresentationError;

impl fmt::Display for RepresentationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid key identifier representation")
    }
}

impl error::Error for RepresentationError { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::der::decode;

    #[test]
    fn take_key_identifier() {
        let mut data = vec![0x04, 20];
        data.extend(1u8..=20);
        let ki = decode(&data, KeyIdentifier::take_from).unwrap();
        assert_eq!(ki.as_slice(), &data[2..]);
        assert_eq!(
            ki.to_string(), "0102030405060708090A0B0C0D0E0F1011121314"
        );
        assert_eq!(
            KeyIdentifier::from_str(&ki.to_string()).unwrap(), ki
        );

        assert_eq!(
            decode(b"\x04\x02\x01\x02", KeyIdentifier::take_from)
                .unwrap_err().kind(),
            ErrorKind::SchemaMismatch
        );
    }

    #[test]
    fn from_str_rejects_garbage() {
        assert!(KeyIdentifier::from_str("0102").is_err());
        assert!(KeyIdentifier::from_str(
            "0102030405060708090A0B0C0D0E0F101112131X"
        ).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_key_identifier() {
        let ki = KeyIdentifier::from([0xab; 20]);
        let json = serde_json::to_string(&ki).unwrap();
        assert_eq!(json, format!("\"{}\"", "AB".repeat(20)));
        let back: KeyIdentifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ki);
    }
}
