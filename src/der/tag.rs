//! Tags and value headers.

use std::fmt;
use untrusted::{Input, Reader};
use super::error::{DecodeError, ErrorKind};


//------------ Class ---------------------------------------------------------

/// The class of a tag.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Class {
    Universal,
    Application,
    Context,
    Private,
}

impl Class {
    fn from_bits(octet: u8) -> Self {
        match octet >> 6 {
            0 => Class::Universal,
            1 => Class::Application,
            2 => Class::Context,
            _ => Class::Private,
        }
    }

    fn into_bits(self) -> u8 {
        match self {
            Class::Universal => 0x00,
            Class::Application => 0x40,
            Class::Context => 0x80,
            Class::Private => 0xC0,
        }
    }
}


//------------ Tag -----------------------------------------------------------

/// The tag of a value: its class and number.
///
/// Whether the value is primitive or constructed is not part of the tag but
/// of the [`Header`].
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct Tag {
    class: Class,
    number: u32,
}

impl Tag {
    pub const BOOLEAN: Self = Self::universal(1);
    pub const INTEGER: Self = Self::universal(2);
    pub const BIT_STRING: Self = Self::universal(3);
    pub const OCTET_STRING: Self = Self::universal(4);
    pub const NULL: Self = Self::universal(5);
    pub const OID: Self = Self::universal(6);
    pub const UTF8_STRING: Self = Self::universal(12);
    pub const SEQUENCE: Self = Self::universal(16);
    pub const SET: Self = Self::universal(17);
    pub const PRINTABLE_STRING: Self = Self::universal(19);
    pub const IA5_STRING: Self = Self::universal(22);
    pub const UTC_TIME: Self = Self::universal(23);
    pub const GENERALIZED_TIME: Self = Self::universal(24);

    pub const CTX_0: Self = Self::ctx(0);
    pub const CTX_1: Self = Self::ctx(1);
    pub const CTX_2: Self = Self::ctx(2);
    pub const CTX_3: Self = Self::ctx(3);
    pub const CTX_6: Self = Self::ctx(6);

    /// Creates a tag of the given class and number.
    pub const fn new(class: Class, number: u32) -> Self {
        Tag { class, number }
    }

    /// Creates a universal tag.
    pub const fn universal(number: u32) -> Self {
        Tag::new(Class::Universal, number)
    }

    /// Creates a context-specific tag.
    pub const fn ctx(number: u32) -> Self {
        Tag::new(Class::Context, number)
    }

    pub fn class(self) -> Class {
        self.class
    }

    pub fn number(self) -> u32 {
        self.number
    }

    /// Returns the single identifier octet of the tag, if there is one.
    ///
    /// Tags with numbers of 31 and above use more than one octet and return
    /// `None`.
    pub fn identifier_octet(self, constructed: bool) -> Option<u8> {
        if self.number > 30 {
            return None
        }
        let mut res = self.class.into_bits() | self.number as u8;
        if constructed {
            res |= 0x20
        }
        Some(res)
    }

    /// Returns whether DER requires a certain encoding form for the tag.
    ///
    /// Returns `Some(true)` for universal types that must be constructed and
    /// `Some(false)` for those that must be primitive.
    fn der_form(self) -> Option<bool> {
        if self.class != Class::Universal {
            return None
        }
        match self.number {
            16 | 17 => Some(true),
            1..=15 | 18..=30 => Some(false),
            _ => None
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.class {
            Class::Universal => write!(f, "Tag::universal({})", self.number),
            Class::Application => write!(f, "Tag::app({})", self.number),
            Class::Context => write!(f, "Tag::ctx({})", self.number),
            Class::Private => write!(f, "Tag::private({})", self.number),
        }
    }
}


//------------ Header --------------------------------------------------------

/// The tag and length portion of an encoded value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Header {
    tag: Tag,
    constructed: bool,
    len: usize,
    offset: usize,
    header_len: usize,
}

impl Header {
    /// Parses a header from the start of `data`.
    ///
    /// The `offset` is the position of `data` within the overall input and
    /// is used for error reporting only. The header is checked for being
    /// valid DER, but the length is not yet checked against the available
    /// data.
    pub fn parse(data: &[u8], offset: usize) -> Result<Self, DecodeError> {
        Self::take_from(&mut Reader::new(Input::from(data)), offset)
    }

    /// Takes a header from the beginning of a reader.
    pub(crate) fn take_from(
        reader: &mut Reader,
        offset: usize
    ) -> Result<Self, DecodeError> {
        let mut pos = 0;
        let mut next = |msg: &'static str| {
            let res = reader.read_byte().map_err(|_| {
                DecodeError::new(ErrorKind::TruncatedInput, offset + pos, msg)
            });
            pos += 1;
            res
        };

        let first = next("missing tag")?;
        let class = Class::from_bits(first);
        let constructed = first & 0x20 != 0;
        let number = if first & 0x1F == 0x1F {
            let mut number: u32 = 0;
            let mut count = 0;
            loop {
                let octet = next("truncated tag")?;
                if count == 0 && octet == 0x80 {
                    return Err(DecodeError::new(
                        ErrorKind::InvalidTag, offset,
                        "non-minimal tag number"
                    ))
                }
                count += 1;
                if count > 4 {
                    return Err(DecodeError::new(
                        ErrorKind::InvalidTag, offset,
                        "tag number too large"
                    ))
                }
                number = (number << 7) | u32::from(octet & 0x7F);
                if octet & 0x80 == 0 {
                    break
                }
            }
            if number < 31 {
                return Err(DecodeError::new(
                    ErrorKind::InvalidTag, offset,
                    "non-minimal tag number"
                ))
            }
            number
        }
        else {
            u32::from(first & 0x1F)
        };
        let tag = Tag::new(class, number);
        if class == Class::Universal && number == 0 {
            return Err(DecodeError::new(
                ErrorKind::InvalidTag, offset, "reserved tag"
            ))
        }
        if let Some(form) = tag.der_form() {
            if form != constructed {
                return Err(DecodeError::new(
                    ErrorKind::InvalidTag, offset,
                    "encoding form not allowed in DER"
                ))
            }
        }

        let first = next("missing length")?;
        let len = if first < 0x80 {
            usize::from(first)
        }
        else if first == 0x80 {
            return Err(DecodeError::new(
                ErrorKind::InvalidLength, offset, "indefinite length"
            ))
        }
        else if first == 0xFF {
            return Err(DecodeError::new(
                ErrorKind::InvalidLength, offset, "reserved length octet"
            ))
        }
        else {
            let count = usize::from(first & 0x7F);
            if count > std::mem::size_of::<usize>() {
                return Err(DecodeError::new(
                    ErrorKind::InvalidLength, offset, "length too large"
                ))
            }
            let mut len: usize = 0;
            for i in 0..count {
                let octet = next("truncated length")?;
                if i == 0 && octet == 0 {
                    return Err(DecodeError::new(
                        ErrorKind::InvalidLength, offset,
                        "non-minimal length"
                    ))
                }
                len = (len << 8) | usize::from(octet);
            }
            if len < 0x80 {
                return Err(DecodeError::new(
                    ErrorKind::InvalidLength, offset,
                    "non-minimal length"
                ))
            }
            len
        };

        Ok(Header { tag, constructed, len, offset, header_len: pos })
    }

    /// Returns the tag of the value.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns whether the value uses the constructed form.
    pub fn is_constructed(&self) -> bool {
        self.constructed
    }

    /// Returns the length of the value’s content.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the value’s content is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the offset of the first octet of the header.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the number of octets used by the header itself.
    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// Returns the offset of the first octet of the content.
    pub fn content_offset(&self) -> usize {
        self.offset + self.header_len
    }
}


//============ Tests =========================================================
