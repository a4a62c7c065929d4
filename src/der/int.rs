//! INTEGER values.

use std::{cmp, fmt};
use bytes::Bytes;
use num_bigint::{BigInt, BigUint};
use super::cons::{Constructed, Content, Decode};
use super::error::{DecodeError, ErrorKind};
use super::tag::Tag;


//------------ Integer -------------------------------------------------------

/// An arbitrary precision integer.
///
/// The value is kept in its encoded form, i.e., as the big-endian two’s
/// complement octets with no redundant leading octets. Conversions into
/// native integer types and into [`BigInt`] are available.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct Integer(Bytes);

impl Integer {
    /// Decodes the content of an INTEGER value.
    ///
    /// The content must not be empty and must be minimally encoded.
    pub fn from_content(content: &Content) -> Result<Self, DecodeError> {
        Self::from_slice(content.as_slice()).map_err(|(kind, msg)| {
            content.err(kind, msg)
        })
    }

    fn from_slice(
        slice: &[u8]
    ) -> Result<Self, (ErrorKind, &'static str)> {
        match slice {
            [] => Err((ErrorKind::InvalidLength, "empty integer")),
            [0, second, ..] if second & 0x80 == 0 => {
                Err((ErrorKind::SchemaMismatch, "non-minimal integer"))
            }
            [0xFF, second, ..] if second & 0x80 != 0 => {
                Err((ErrorKind::SchemaMismatch, "non-minimal integer"))
            }
            _ => Ok(Integer(Bytes::copy_from_slice(slice)))
        }
    }

    /// Returns the encoded octets.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns whether the value is less than zero.
    pub fn is_negative(&self) -> bool {
        self.0[0] & 0x80 != 0
    }

    /// Converts the value into a `BigInt`.
    pub fn to_bigint(&self) -> BigInt {
        BigInt::from_signed_bytes_be(self.as_slice())
    }

    /// Converts the value into a `BigUint` if it isn’t negative.
    pub fn to_biguint(&self) -> Option<BigUint> {
        if self.is_negative() {
            None
        }
        else {
            Some(BigUint::from_bytes_be(self.as_slice()))
        }
    }

    /// Returns the value as a `u64` if it is non-negative and fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.is_negative() {
            return None
        }
        let slice = match self.as_slice() {
            [0, rest @ ..] => rest,
            slice => slice
        };
        if slice.len() > 8 {
            return None
        }
        Some(slice.iter().fold(0, |res, &octet| (res << 8) | u64::from(octet)))
    }

    pub fn to_u32(&self) -> Option<u32> {
        self.to_u64().and_then(|v| u32::try_from(v).ok())
    }

    pub fn to_u8(&self) -> Option<u8> {
        self.to_u64().and_then(|v| u8::try_from(v).ok())
    }
}


//--- Decode

impl Decode for Integer {
    fn take_from(cons: &mut Constructed) -> Result<Self, DecodeError> {
        cons.take_primitive_if(Tag::INTEGER, Self::from_content)
    }
}


//--- PartialOrd and Ord

impl PartialOrd for Integer {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Integer {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.to_bigint().cmp(&other.to_bigint())
    }
}


//--- Display and Debug

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.to_bigint(), f)
    }
}

impl fmt::Debug for Integer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Integer({})", self)
    }
}


//--- From

impl From<Integer> for BigInt {
    fn from(src: Integer) -> Self {
        src.to_bigint()
    }
}

impl From<u64> for Integer {
    fn from(value: u64) -> Self {
        let bytes = BigUint::from(value).to_bytes_be();
        let mut res = Vec::with_capacity(bytes.len() + 1);
        if bytes[0] & 0x80 != 0 {
            res.push(0)
        }
        res.extend_from_slice(&bytes);
        Integer(res.into())
    }
}


//============ Tests =========================================================
