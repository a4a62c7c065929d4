//! String types: OCTET STRING, BIT STRING, and restricted character strings.

use std::{fmt, str};
use bytes::Bytes;
use super::cons::{Constructed, Content, Decode};
use super::error::{DecodeError, ErrorKind};
use super::tag::Tag;


//------------ OctetString ---------------------------------------------------

/// The content of an OCTET STRING.
///
/// Only the primitive form is accepted as DER does not allow anything else.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct OctetString(Bytes);

impl OctetString {
    pub fn new(bytes: Bytes) -> Self {
        OctetString(bytes)
    }

    pub fn from_content(content: &Content) -> Result<Self, DecodeError> {
        Ok(OctetString(Bytes::copy_from_slice(content.as_slice())))
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Decode for OctetString {
    fn take_from(cons: &mut Constructed) -> Result<Self, DecodeError> {
        cons.take_primitive_if(Tag::OCTET_STRING, Self::from_content)
    }
}

impl AsRef<[u8]> for OctetString {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl fmt::Debug for OctetString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("OctetString(")?;
        for octet in self.as_slice() {
            write!(f, "{:02x}", octet)?;
        }
        f.write_str(")")
    }
}


//------------ BitString -----------------------------------------------------

/// The content of a BIT STRING.
///
/// The first content octet gives the number of unused bits in the last
/// octet. DER requires these bits to be zero.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct BitString {
    unused: u8,
    bits: Bytes,
}

impl BitString {
    pub fn from_content(content: &Content) -> Result<Self, DecodeError> {
        let (&unused, bits) = match content.as_slice().split_first() {
            Some(some) => some,
            None => {
                return Err(content.err(
                    ErrorKind::InvalidLength, "empty bit string"
                ))
            }
        };
        if unused > 7 {
            return Err(content.err(
                ErrorKind::SchemaMismatch, "invalid unused bit count"
            ))
        }
        if unused > 0 {
            match bits.last() {
                None => {
                    return Err(content.err(
                        ErrorKind::SchemaMismatch,
                        "unused bits in empty bit string"
                    ))
                }
                Some(last) if last & ((1 << unused) - 1) != 0 => {
                    return Err(content.err(
                        ErrorKind::SchemaMismatch,
                        "non-zero unused bits"
                    ))
                }
                _ => { }
            }
        }
        Ok(BitString { unused, bits: Bytes::copy_from_slice(bits) })
    }

    /// Returns the number of unused bits in the last octet.
    pub fn unused(&self) -> u8 {
        self.unused
    }

    /// Returns the octets of the bit string including the last one.
    pub fn bits(&self) -> &[u8] {
        self.bits.as_ref()
    }

    /// Returns the octets if the bit string contains full octets only.
    pub fn octet_slice(&self) -> Option<&[u8]> {
        if self.unused == 0 {
            Some(self.bits.as_ref())
        }
        else {
            None
        }
    }

    /// Returns the number of bits in the string.
    pub fn bit_len(&self) -> usize {
        self.bits.len() * 8 - usize::from(self.unused)
    }
}

impl Decode for BitString {
    fn take_from(cons: &mut Constructed) -> Result<Self, DecodeError> {
        cons.take_primitive_if(Tag::BIT_STRING, Self::from_content)
    }
}


//------------ Ia5String -----------------------------------------------------

/// An IA5String, i.e., a string of 7 bit ASCII characters.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct Ia5String(Bytes);

impl Ia5String {
    pub fn from_content(content: &Content) -> Result<Self, DecodeError> {
        let slice = content.as_slice();
        if slice.iter().any(|&ch| ch > 0x7F) {
            return Err(content.err(
                ErrorKind::InvalidString, "non-ASCII character in IA5String"
            ))
        }
        Ok(Ia5String(Bytes::copy_from_slice(slice)))
    }

    pub fn as_str(&self) -> &str {
        // All octets are ASCII and thus valid UTF-8.
        unsafe { str::from_utf8_unchecked(self.0.as_ref()) }
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl Decode for Ia5String {
    fn take_from(cons: &mut Constructed) -> Result<Self, DecodeError> {
        cons.take_primitive_if(Tag::IA5_STRING, Self::from_content)
    }
}

impl fmt::Display for Ia5String {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Ia5String {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Ia5String({:?})", self.as_str())
    }
}


//------------ PrintableString -----------------------------------------------

/// A PrintableString.
///
/// Permitted are letters, digits, the space, and `'()+,-./:=?`.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct PrintableString(Bytes);

impl PrintableString {
    pub fn from_content(content: &Content) -> Result<Self, DecodeError> {
        let slice = content.as_slice();
        if !slice.iter().all(|&ch| Self::is_printable(ch)) {
            return Err(content.err(
                ErrorKind::InvalidString,
                "invalid character in PrintableString"
            ))
        }
        Ok(PrintableString(Bytes::copy_from_slice(slice)))
    }

    fn is_printable(ch: u8) -> bool {
        ch.is_ascii_alphanumeric() || matches!(
            ch,
            b' ' | b'\'' | b'(' | b')' | b'+' | b',' | b'-' | b'.' | b'/'
            | b':' | b'=' | b'?'
        )
    }

    pub fn as_str(&self) -> &str {
        // All octets are ASCII and thus valid UTF-8.
        unsafe { str::from_utf8_unchecked(self.0.as_ref()) }
    }
}

impl Decode for PrintableString {
    fn take_from(cons: &mut Constructed) -> Result<Self, DecodeError> {
        cons.take_primitive_if(Tag::PRINTABLE_STRING, Self::from_content)
    }
}

impl fmt::Display for PrintableString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for PrintableString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PrintableString({:?})", self.as_str())
    }
}


//============ Tests =========================================================
