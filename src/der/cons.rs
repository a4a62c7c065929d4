//! Walking through encoded values.
//!
//! Decoding follows the pattern of passing closures into methods of a
//! [`Constructed`] that each consume one value from its content. Each value
//! handed to a closure must be consumed completely; left-over octets are a
//! [`TrailingData`] error.
//!
//! [`TrailingData`]: super::ErrorKind::TrailingData

use std::fmt;
use untrusted::{Input, Reader};
use super::error::{DecodeError, ErrorKind};
use super::int::Integer;
use super::tag::{Header, Tag};


//------------ Functions -----------------------------------------------------

/// Decodes a complete octet sequence.
///
/// The closure is given the octets as the content of a constructed value.
/// It must consume all of it.
pub fn decode<'a, F, T>(data: &'a [u8], op: F) -> Result<T, DecodeError>
where F: FnOnce(&mut Constructed<'a>) -> Result<T, DecodeError> {
    Constructed::new(Input::from(data), 0).decode_all(op)
}


//------------ Decode --------------------------------------------------------

/// A type that can be decoded from the next value of a constructed value.
///
/// This is the capability used when decoding a SEQUENCE OF or SET OF a
/// single type through [`Constructed::take_sequence_of`] and friends.
pub trait Decode: Sized {
    /// Takes a value from the beginning of the constructed value.
    fn take_from(cons: &mut Constructed) -> Result<Self, DecodeError>;
}


//------------ Constructed ---------------------------------------------------

/// The content of a constructed value.
///
/// The type keeps track of the absolute offset of the next octet so that
/// errors can point to where things went wrong.
pub struct Constructed<'a> {
    reader: Reader<'a>,
    pos: usize,
}

impl<'a> Constructed<'a> {
    pub(crate) fn new(input: Input<'a>, pos: usize) -> Self {
        Constructed { reader: Reader::new(input), pos }
    }

    /// Runs `op` on the content and checks that it consumed everything.
    pub fn decode_all<F, T>(mut self, op: F) -> Result<T, DecodeError>
    where F: FnOnce(&mut Self) -> Result<T, DecodeError> {
        let res = op(&mut self)?;
        if !self.is_empty() {
            return Err(self.err(
                ErrorKind::TrailingData, "unexpected trailing octets"
            ))
        }
        Ok(res)
    }

    /// Returns the offset of the next octet.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns whether all the content has been consumed.
    pub fn is_empty(&self) -> bool {
        self.reader.at_end()
    }

    /// Creates an error at the current position.
    pub fn err(&self, kind: ErrorKind, msg: &'static str) -> DecodeError {
        DecodeError::new(kind, self.pos, msg)
    }

    /// Returns whether the next value has the given tag and form.
    fn peek_tag(&self, tag: Tag, constructed: bool) -> bool {
        match tag.identifier_octet(constructed) {
            Some(octet) => self.reader.peek(octet),
            None => false
        }
    }
}

impl<'a> fmt::Debug for Constructed<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Constructed").field("pos", &self.pos).finish()
    }
}

/// # Taking Headers and Values
///
impl<'a> Constructed<'a> {
    /// Takes the header of the next value.
    ///
    /// Afterwards, the content of the value must be taken via
    /// [`take_content`][Self::take_content].
    pub fn take_header(&mut self) -> Result<Header, DecodeError> {
        if self.is_empty() {
            return Err(self.err(
                ErrorKind::UnexpectedEnd, "missing value"
            ))
        }
        let header = Header::take_from(&mut self.reader, self.pos)?;
        self.pos += header.header_len();
        Ok(header)
    }

    /// Takes the content of a value whose header was just taken.
    pub fn take_content(
        &mut self, header: Header
    ) -> Result<Content<'a>, DecodeError> {
        let input = self.reader.read_bytes(header.len()).map_err(|_| {
            DecodeError::new(
                ErrorKind::TruncatedInput, header.content_offset(),
                "content exceeds available data"
            )
        })?;
        self.pos += header.len();
        Ok(Content { header, input })
    }

    /// Takes the next value.
    pub fn take_one(&mut self) -> Result<Content<'a>, DecodeError> {
        let header = self.take_header()?;
        self.take_content(header)
    }

    /// Takes the next value if there is one.
    pub fn take_opt_one(
        &mut self
    ) -> Result<Option<Content<'a>>, DecodeError> {
        if self.is_empty() {
            Ok(None)
        }
        else {
            self.take_one().map(Some)
        }
    }

    /// Takes the next value if it has the given tag.
    pub fn take_value_if<F, T>(
        &mut self, tag: Tag, op: F
    ) -> Result<T, DecodeError>
    where F: FnOnce(&Content<'a>) -> Result<T, DecodeError> {
        let content = self.take_one()?;
        content.expect_tag(tag)?;
        op(&content)
    }

    /// Takes the next value if it is present and has the given tag.
    pub fn take_opt_value_if<F, T>(
        &mut self, tag: Tag, op: F
    ) -> Result<Option<T>, DecodeError>
    where F: FnOnce(&Content<'a>) -> Result<T, DecodeError> {
        if self.peek_tag(tag, false) || self.peek_tag(tag, true) {
            self.take_value_if(tag, op).map(Some)
        }
        else {
            Ok(None)
        }
    }

    /// Takes a primitive value with the given tag.
    pub fn take_primitive_if<F, T>(
        &mut self, tag: Tag, op: F
    ) -> Result<T, DecodeError>
    where F: FnOnce(&Content<'a>) -> Result<T, DecodeError> {
        self.take_value_if(tag, |content| {
            content.expect_primitive()?;
            op(content)
        })
    }

    /// Takes an optional primitive value with the given tag.
    pub fn take_opt_primitive_if<F, T>(
        &mut self, tag: Tag, op: F
    ) -> Result<Option<T>, DecodeError>
    where F: FnOnce(&Content<'a>) -> Result<T, DecodeError> {
        if self.peek_tag(tag, false) {
            self.take_primitive_if(tag, op).map(Some)
        }
        else {
            Ok(None)
        }
    }

    /// Takes a constructed value with the given tag.
    pub fn take_constructed_if<F, T>(
        &mut self, tag: Tag, op: F
    ) -> Result<T, DecodeError>
    where F: FnOnce(&mut Constructed<'a>) -> Result<T, DecodeError> {
        let content = self.take_one()?;
        content.expect_tag(tag)?;
        content.decode_constructed(op)
    }

    /// Takes an optional constructed value with the given tag.
    pub fn take_opt_constructed_if<F, T>(
        &mut self, tag: Tag, op: F
    ) -> Result<Option<T>, DecodeError>
    where F: FnOnce(&mut Constructed<'a>) -> Result<T, DecodeError> {
        if self.peek_tag(tag, true) {
            self.take_constructed_if(tag, op).map(Some)
        }
        else {
            Ok(None)
        }
    }

    pub fn take_sequence<F, T>(&mut self, op: F) -> Result<T, DecodeError>
    where F: FnOnce(&mut Constructed<'a>) -> Result<T, DecodeError> {
        self.take_constructed_if(Tag::SEQUENCE, op)
    }

    pub fn take_opt_sequence<F, T>(
        &mut self, op: F
    ) -> Result<Option<T>, DecodeError>
    where F: FnOnce(&mut Constructed<'a>) -> Result<T, DecodeError> {
        self.take_opt_constructed_if(Tag::SEQUENCE, op)
    }

    pub fn take_set<F, T>(&mut self, op: F) -> Result<T, DecodeError>
    where F: FnOnce(&mut Constructed<'a>) -> Result<T, DecodeError> {
        self.take_constructed_if(Tag::SET, op)
    }

    pub fn take_opt_set<F, T>(
        &mut self, op: F
    ) -> Result<Option<T>, DecodeError>
    where F: FnOnce(&mut Constructed<'a>) -> Result<T, DecodeError> {
        self.take_opt_constructed_if(Tag::SET, op)
    }

    /// Takes a value of a type implementing [`Decode`].
    pub fn take<T: Decode>(&mut self) -> Result<T, DecodeError> {
        T::take_from(self)
    }

    /// Takes a SEQUENCE OF values each decoded by `op`.
    ///
    /// Elements are decoded until the content of the sequence is exhausted.
    /// Each invocation of `op` must take exactly one element.
    pub fn take_sequence_of<F, T>(
        &mut self, op: F
    ) -> Result<Vec<T>, DecodeError>
    where F: FnMut(&mut Constructed<'a>) -> Result<T, DecodeError> {
        self.take_sequence(|cons| cons.take_all(op))
    }

    /// Takes a SET OF values each decoded by `op`.
    pub fn take_set_of<F, T>(
        &mut self, op: F
    ) -> Result<Vec<T>, DecodeError>
    where F: FnMut(&mut Constructed<'a>) -> Result<T, DecodeError> {
        self.take_set(|cons| cons.take_all(op))
    }

    /// Repeatedly runs `op` until the content is exhausted.
    pub fn take_all<F, T>(
        &mut self, mut op: F
    ) -> Result<Vec<T>, DecodeError>
    where F: FnMut(&mut Constructed<'a>) -> Result<T, DecodeError> {
        let mut res = Vec::new();
        while !self.is_empty() {
            res.push(op(self)?);
        }
        Ok(res)
    }

    /// Takes all the remaining content as a new constructed value.
    ///
    /// This allows decoding the remainder in isolation, so that errors in it
    /// can be dealt with separately.
    pub fn take_rest(&mut self) -> Constructed<'a> {
        let input = self.reader.read_bytes_to_end();
        let len = input.len();
        let res = Constructed::new(input, self.pos);
        self.pos += len;
        res
    }
}

/// # Skipping and Capturing
///
impl<'a> Constructed<'a> {
    /// Skips over the next value.
    pub fn skip_one(&mut self) -> Result<(), DecodeError> {
        self.take_one().map(|_| ())
    }

    /// Skips over all remaining values.
    ///
    /// All values are still checked for having a valid header and a content
    /// that fits.
    pub fn skip_all(&mut self) -> Result<(), DecodeError> {
        while !self.is_empty() {
            self.skip_one()?;
        }
        Ok(())
    }

    /// Captures the complete encoding of the next value.
    pub fn capture_one(&mut self) -> Result<&'a [u8], DecodeError> {
        if self.is_empty() {
            return Err(self.err(
                ErrorKind::UnexpectedEnd, "missing value"
            ))
        }
        let pos = self.pos;
        let (input, _) = self.reader.read_partial(|reader| {
            let header = Header::take_from(reader, pos)?;
            reader.skip(header.len()).map_err(|_| {
                DecodeError::new(
                    ErrorKind::TruncatedInput, header.content_offset(),
                    "content exceeds available data"
                )
            })
        })?;
        self.pos += input.len();
        Ok(input.as_slice_less_safe())
    }
}

/// # Simple Primitive Values
///
impl<'a> Constructed<'a> {
    /// Takes an optional BOOLEAN value.
    pub fn take_opt_bool(&mut self) -> Result<Option<bool>, DecodeError> {
        self.take_opt_primitive_if(Tag::BOOLEAN, |content| {
            match content.as_slice() {
                [0] => Ok(false),
                [0xFF] => Ok(true),
                _ => Err(content.err(
                    ErrorKind::SchemaMismatch, "invalid boolean"
                ))
            }
        })
    }

    /// Takes an optional NULL value.
    pub fn take_opt_null(&mut self) -> Result<Option<()>, DecodeError> {
        self.take_opt_primitive_if(Tag::NULL, |content| {
            if content.is_empty() {
                Ok(())
            }
            else {
                Err(content.err(ErrorKind::InvalidLength, "non-empty NULL"))
            }
        })
    }

    /// Takes an INTEGER that must fit into a `u8`.
    pub fn take_u8(&mut self) -> Result<u8, DecodeError> {
        self.take_primitive_if(Tag::INTEGER, |content| {
            Integer::from_content(content)?.to_u8().ok_or_else(|| {
                content.err(ErrorKind::SchemaMismatch, "integer out of range")
            })
        })
    }

    /// Takes an INTEGER and checks that it has the given value.
    pub fn skip_u8_if(&mut self, expected: u8) -> Result<(), DecodeError> {
        let pos = self.pos;
        if self.take_u8()? == expected {
            Ok(())
        }
        else {
            Err(DecodeError::new(
                ErrorKind::SchemaMismatch, pos, "unexpected integer value"
            ))
        }
    }
}


//------------ Content -------------------------------------------------------

/// A single value: its header and its content octets.
#[derive(Clone)]
pub struct Content<'a> {
    header: Header,
    input: Input<'a>,
}

impl<'a> Content<'a> {
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn tag(&self) -> Tag {
        self.header.tag()
    }

    pub fn is_constructed(&self) -> bool {
        self.header.is_constructed()
    }

    /// Returns the content octets.
    pub fn as_slice(&self) -> &'a [u8] {
        self.input.as_slice_less_safe()
    }

    pub fn len(&self) -> usize {
        self.input.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    /// Returns the offset of the first content octet.
    pub fn offset(&self) -> usize {
        self.header.content_offset()
    }

    /// Creates an error at the start of the content.
    pub fn err(&self, kind: ErrorKind, msg: &'static str) -> DecodeError {
        DecodeError::new(kind, self.offset(), msg)
    }

    /// Checks that the value has the given tag.
    pub fn expect_tag(&self, tag: Tag) -> Result<(), DecodeError> {
        if self.tag() == tag {
            Ok(())
        }
        else {
            Err(DecodeError::new(
                ErrorKind::SchemaMismatch, self.header.offset(),
                "unexpected tag"
            ))
        }
    }

    /// Checks that the value uses the primitive form.
    pub fn expect_primitive(&self) -> Result<(), DecodeError> {
        if self.is_constructed() {
            Err(DecodeError::new(
                ErrorKind::SchemaMismatch, self.header.offset(),
                "expected primitive value"
            ))
        }
        else {
            Ok(())
        }
    }

    /// Decodes the content as a constructed value.
    pub fn decode_constructed<F, T>(&self, op: F) -> Result<T, DecodeError>
    where F: FnOnce(&mut Constructed<'a>) -> Result<T, DecodeError> {
        if !self.is_constructed() {
            return Err(DecodeError::new(
                ErrorKind::SchemaMismatch, self.header.offset(),
                "expected constructed value"
            ))
        }
        self.decode_nested(op)
    }

    /// Decodes the content octets as a sequence of encoded values.
    ///
    /// This is for values such as certificate extensions that wrap encoded
    /// data into an OCTET STRING. The form of the value is not checked.
    pub fn decode_nested<F, T>(&self, op: F) -> Result<T, DecodeError>
    where F: FnOnce(&mut Constructed<'a>) -> Result<T, DecodeError> {
        Constructed::new(
            Input::from(self.as_slice()), self.offset()
        ).decode_all(op)
    }
}

impl<'a> fmt::Debug for Content<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Content")
            .field("header", &self.header)
            .field("content", &self.as_slice())
            .finish()
    }
}


//============ Tests =========================================================
