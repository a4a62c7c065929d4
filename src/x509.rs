//! Types common to all things X.509.

use std::{fmt, ops};
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use crate::der::{Constructed, Content, DecodeError, ErrorKind, Oid, Tag};


//------------ Functions -----------------------------------------------------

/// Updates an optional value that must only be given once.
///
/// Runs `op` and assigns its result to `opt`. If `opt` already holds a
/// value, returns a schema mismatch error at `pos` instead.
pub fn update_once<F, T>(
    opt: &mut Option<T>, pos: usize, op: F
) -> Result<(), DecodeError>
where F: FnOnce() -> Result<T, DecodeError> {
    if opt.is_some() {
        Err(DecodeError::new(
            ErrorKind::SchemaMismatch, pos, "duplicate value"
        ))
    }
    else {
        *opt = Some(op()?);
        Ok(())
    }
}


/// Updates an optional value the first time.
///
/// Always runs `op` but only assigns its result to `opt` if that doesn’t
/// hold a value yet.
pub fn update_first<F, T, E>(opt: &mut Option<T>, op: F) -> Result<(), E>
where F: FnOnce() -> Result<Option<T>, E> {
    if let Some(value) = op()? {
        if opt.is_none() {
            *opt = Some(value);
        }
    }
    Ok(())
}


//------------ Name ----------------------------------------------------------

/// A distinguished name.
///
/// The name is kept as the encoded content of its RDNSequence. Its structure
/// is checked when decoding but the attributes aren’t interpreted.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct Name(Bytes);

impl Name {
    pub fn take_from(cons: &mut Constructed) -> Result<Self, DecodeError> {
        let content = cons.take_one()?;
        content.expect_tag(Tag::SEQUENCE)?;
        content.decode_constructed(|cons| { // RDNSequence
            while let Some(()) = cons.take_opt_set(|cons| {
                // RelativeDistinguishedName ::= SET SIZE (1..MAX) OF
                //                               AttributeTypeAndValue
                let mut any = false;
                while let Some(()) = cons.take_opt_sequence(|cons| {
                    Oid::<Bytes>::take_from(cons)?;
                    cons.skip_one()
                })? {
                    any = true;
                }
                if any {
                    Ok(())
                }
                else {
                    Err(cons.err(
                        ErrorKind::SchemaMismatch,
                        "empty relative distinguished name"
                    ))
                }
            })? { }
            Ok(())
        })?;
        Ok(Name(Bytes::copy_from_slice(content.as_slice())))
    }

    /// Returns the content octets of the encoded RDNSequence.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Name({} octets)", self.0.len())
    }
}


//------------ Time ----------------------------------------------------------

/// A point in time with second precision.
///
/// Both UTCTime and GeneralizedTime values decode into this type. Only the
/// forms required by RFC 5280 are accepted: `YYMMDDHHMMSSZ` and
/// `YYYYMMDDHHMMSSZ` respectively.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Time(DateTime<Utc>);

impl Time {
    pub fn new(dt: DateTime<Utc>) -> Self {
        Time(dt)
    }

    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    /// Creates a time from its parts.
    ///
    /// Returns `None` if the parts do not describe a valid point in time.
    pub fn utc(
        year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32
    ) -> Option<Self> {
        Utc.with_ymd_and_hms(
            year, month, day, hour, min, sec
        ).single().map(Time)
    }

    /// Takes a UTCTime or GeneralizedTime value.
    pub fn take_from(cons: &mut Constructed) -> Result<Self, DecodeError> {
        let content = cons.take_one()?;
        Self::from_any_content(&content)
    }

    /// Takes a UTCTime or GeneralizedTime value if there is one.
    pub fn take_opt_from(
        cons: &mut Constructed
    ) -> Result<Option<Self>, DecodeError> {
        if let Some(res) = cons.take_opt_primitive_if(
            Tag::UTC_TIME, Self::from_utc_content
        )? {
            return Ok(Some(res))
        }
        cons.take_opt_primitive_if(
            Tag::GENERALIZED_TIME, Self::from_generalized_content
        )
    }

    /// Takes a value that must be a GeneralizedTime.
    pub fn take_generalized_from(
        cons: &mut Constructed
    ) -> Result<Self, DecodeError> {
        cons.take_primitive_if(
            Tag::GENERALIZED_TIME, Self::from_generalized_content
        )
    }

    /// Decodes a value of either time type.
    pub fn from_any_content(content: &Content) -> Result<Self, DecodeError> {
        let tag = content.tag();
        if tag != Tag::UTC_TIME && tag != Tag::GENERALIZED_TIME {
            return Err(DecodeError::new(
                ErrorKind::SchemaMismatch, content.header().offset(),
                "expected time value"
            ))
        }
        content.expect_primitive()?;
        if tag == Tag::UTC_TIME {
            Self::from_utc_content(content)
        }
        else {
            Self::from_generalized_content(content)
        }
    }

    /// Decodes the content of a UTCTime value.
    pub fn from_utc_content(content: &Content) -> Result<Self, DecodeError> {
        // RFC 5280 requires the format YYMMDDHHMMSSZ
        let slice = match content.as_slice() {
            [digits @ .., b'Z'] if digits.len() == 12 => digits,
            _ => return Err(Self::err(content))
        };
        let year = read_digits(&slice[0..2]).ok_or_else(|| {
            Self::err(content)
        })? as i32;
        let year = if year >= 50 { year + 1900 } else { year + 2000 };
        Self::from_parts(year, &slice[2..]).ok_or_else(|| Self::err(content))
    }

    /// Decodes the content of a GeneralizedTime value.
    pub fn from_generalized_content(
        content: &Content
    ) -> Result<Self, DecodeError> {
        // RFC 5280 requires the format YYYYMMDDHHMMSSZ
        let slice = match content.as_slice() {
            [digits @ .., b'Z'] if digits.len() == 14 => digits,
            _ => return Err(Self::err(content))
        };
        let year = read_digits(&slice[0..4]).ok_or_else(|| {
            Self::err(content)
        })? as i32;
        Self::from_parts(year, &slice[4..]).ok_or_else(|| Self::err(content))
    }

    /// Creates the time from the year and the remaining ten digits.
    fn from_parts(year: i32, rest: &[u8]) -> Option<Self> {
        Self::utc(
            year,
            read_digits(&rest[0..2])?,
            read_digits(&rest[2..4])?,
            read_digits(&rest[4..6])?,
            read_digits(&rest[6..8])?,
            read_digits(&rest[8..10])?,
        )
    }

    fn err(content: &Content) -> DecodeError {
        content.err(ErrorKind::InvalidTimestamp, "malformed time value")
    }

    /// Returns whether this time has passed at `now`.
    pub fn is_before(self, now: Time) -> bool {
        self.0 < now.0
    }
}


//--- Deref and AsRef

impl ops::Deref for Time {
    type Target = DateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<DateTime<Utc>> for Time {
    fn as_ref(&self) -> &DateTime<Utc> {
        &self.0
    }
}


//--- From

impl From<DateTime<Utc>> for Time {
    fn from(time: DateTime<Utc>) -> Self {
        Time(time)
    }
}

impl From<Time> for DateTime<Utc> {
    fn from(time: Time) -> Self {
        time.0
    }
}

/// Reads a non-empty sequence of ASCII digits as a decimal number.
fn read_digits(slice: &[u8]) -> Option<u32> {
    if slice.is_empty() {
        return None
    }
    slice.iter().try_fold(0u32, |res, &ch| {
        if ch.is_ascii_digit() {
            Some(res * 10 + u32::from(ch - b'0'))
        }
        else {
            None
        }
    })
}


//------------ Validity ------------------------------------------------------

/// The validity period of a certificate.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Validity {
    not_before: Time,
    not_after: Time,
}

impl Validity {
    pub fn new(not_before: Time, not_after: Time) -> Self {
        Validity { not_before, not_after }
    }

    pub fn not_before(&self) -> Time {
        self.not_before
    }

    pub fn not_after(&self) -> Time {
        self.not_after
    }

    pub fn take_from(cons: &mut Constructed) -> Result<Self, DecodeError> {
        cons.take_sequence(|cons| {
            Ok(Validity::new(
                Time::take_from(cons)?,
                Time::take_from(cons)?,
            ))
        })
    }
}


//============ Tests =========================================================
