//! OBJECT IDENTIFIER values.

use std::fmt;
use bytes::Bytes;
use super::cons::{Constructed, Content, Decode};
use super::error::{DecodeError, ErrorKind};
use super::tag::Tag;


//------------ Oid -----------------------------------------------------------

/// An object identifier.
///
/// The identifier is kept in its encoded form: the content octets of the
/// OBJECT IDENTIFIER value. Since DER encoding is unique, two identifiers
/// are equal if their octets are equal. Constants are best defined as
/// `Oid<&'static [u8]>` and can be compared against decoded values directly.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialOrd)]
pub struct Oid<T: AsRef<[u8]> = Bytes>(pub T);

/// A statically defined object identifier.
pub type ConstOid = Oid<&'static [u8]>;

impl Oid {
    /// Takes an OBJECT IDENTIFIER value.
    pub fn take_from(cons: &mut Constructed) -> Result<Self, DecodeError> {
        cons.take_primitive_if(Tag::OID, Self::from_content)
    }

    /// Decodes the content of an OBJECT IDENTIFIER value.
    pub fn from_content(content: &Content) -> Result<Self, DecodeError> {
        let slice = content.as_slice();
        if !Self::is_valid(slice) {
            return Err(content.err(
                ErrorKind::SchemaMismatch, "invalid object identifier"
            ))
        }
        Ok(Oid(Bytes::copy_from_slice(slice)))
    }

    /// Checks that the octets are a valid encoding.
    ///
    /// There must be at least one subidentifier, the last octet must end a
    /// subidentifier, and no subidentifier may start with a padding octet.
    fn is_valid(slice: &[u8]) -> bool {
        match slice.last() {
            Some(last) if last & 0x80 == 0 => { }
            _ => return false
        }
        let mut start = true;
        for &octet in slice {
            if start && octet == 0x80 {
                return false
            }
            start = octet & 0x80 == 0;
        }
        true
    }
}

impl<T: AsRef<[u8]>> Oid<T> {
    /// Returns the encoded octets.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns an iterator over the arcs of the identifier.
    ///
    /// The first two arcs are derived from the first subidentifier as
    /// described in X.690. Arcs too large for a `u128` end the iteration.
    pub fn arcs(&self) -> Arcs {
        Arcs { slice: self.as_slice(), first: true, pending: None }
    }

    /// Takes the next value and checks that it is this identifier.
    pub fn skip_if(&self, cons: &mut Constructed) -> Result<(), DecodeError> {
        let pos = cons.pos();
        let oid = Oid::<Bytes>::take_from(cons)?;
        if oid == *self {
            Ok(())
        }
        else {
            Err(DecodeError::new(
                ErrorKind::SchemaMismatch, pos, "unexpected object identifier"
            ))
        }
    }

    /// Converts the identifier into one owning its octets.
    pub fn to_oid(&self) -> Oid {
        Oid(Bytes::copy_from_slice(self.as_slice()))
    }
}


//--- Decode

impl Decode for Oid {
    fn take_from(cons: &mut Constructed) -> Result<Self, DecodeError> {
        Oid::take_from(cons)
    }
}


//--- PartialEq

impl<T: AsRef<[u8]>, U: AsRef<[u8]>> PartialEq<Oid<U>> for Oid<T> {
    fn eq(&self, other: &Oid<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}


//--- Display and Debug

impl<T: AsRef<[u8]>> fmt::Display for Oid<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for arc in self.arcs() {
            if first {
                first = false;
            }
            else {
                f.write_str(".")?;
            }
            write!(f, "{}", arc)?;
        }
        Ok(())
    }
}

impl<T: AsRef<[u8]>> fmt::Debug for Oid<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}


//--- Serialize

#[cfg(feature = "serde")]
impl<T: AsRef<[u8]>> serde::Serialize for Oid<T> {
    fn serialize<S: serde::Serializer>(
        &self, serializer: S
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}


//------------ Arcs ----------------------------------------------------------

/// An iterator over the arcs of an object identifier.
#[derive(Clone, Debug)]
pub struct Arcs<'a> {
    slice: &'a [u8],
    first: bool,
    pending: Option<u128>,
}

impl<'a> Arcs<'a> {
    fn next_subidentifier(&mut self) -> Option<u128> {
        let mut res: u128 = 0;
        loop {
            let (&octet, tail) = self.slice.split_first()?;
            self.slice = tail;
            res = res.checked_mul(128)?.checked_add(
                u128::from(octet & 0x7F)
            )?;
            if octet & 0x80 == 0 {
                return Some(res)
            }
        }
    }
}

impl<'a> Iterator for Arcs<'a> {
    type Item = u128;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(pending) = self.pending.take() {
            return Some(pending)
        }
        let sub = match self.next_subidentifier() {
            Some(sub) => sub,
            None => {
                self.slice = &[];
                return None
            }
        };
        if self.first {
            self.first = false;
            let (first, second) = match sub {
                0..=39 => (0, sub),
                40..=79 => (1, sub - 40),
                _ => (2, sub - 80),
            };
            self.pending = Some(second);
            Some(first)
        }
        else {
            Some(sub)
        }
    }
}


//============ Tests =========================================================
