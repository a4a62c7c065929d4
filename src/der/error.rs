//! Decoding errors.

use std::{error, fmt};


//------------ ErrorKind -----------------------------------------------------

/// The kind of problem encountered while decoding.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// A header or the content announced by it runs past the end of data.
    TruncatedInput,

    /// A length octet sequence is not a valid DER length.
    InvalidLength,

    /// A tag is reserved, not minimally encoded, or uses the wrong form.
    InvalidTag,

    /// A string contains characters outside its permitted set.
    InvalidString,

    /// A time value is not one of the permitted canonical encodings.
    InvalidTimestamp,

    /// Octets remain in a value after its last expected element.
    TrailingData,

    /// A value ended before all its required elements were read.
    UnexpectedEnd,

    /// A signed object does not carry exactly one certificate.
    UnexpectedCertificateCount,

    /// A mandatory certificate extension is missing.
    MissingExtension,

    /// A manifest hash is not a byte-aligned digest of the right length.
    InvalidHashEncoding,

    /// The data does not follow the expected structure.
    SchemaMismatch,
}

impl ErrorKind {
    fn as_str(self) -> &'static str {
        match self {
            ErrorKind::TruncatedInput => "truncated input",
            ErrorKind::InvalidLength => "invalid length",
            ErrorKind::InvalidTag => "invalid tag",
            ErrorKind::InvalidString => "invalid string",
            ErrorKind::InvalidTimestamp => "invalid timestamp",
            ErrorKind::TrailingData => "trailing data",
            ErrorKind::UnexpectedEnd => "unexpected end of value",
            ErrorKind::UnexpectedCertificateCount => {
                "unexpected certificate count"
            }
            ErrorKind::MissingExtension => "missing extension",
            ErrorKind::InvalidHashEncoding => "invalid hash encoding",
            ErrorKind::SchemaMismatch => "schema mismatch",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


//------------ DecodeError ---------------------------------------------------

/// An error happened while decoding data.
///
/// The error carries its [`ErrorKind`], the offset into the decoded octets
/// at which the problem was detected, and a short static description.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodeError {
    kind: ErrorKind,
    offset: usize,
    msg: &'static str,
}

impl DecodeError {
    /// Creates a new error.
    pub fn new(kind: ErrorKind, offset: usize, msg: &'static str) -> Self {
        DecodeError { kind, offset, msg }
    }

    /// Returns the kind of the error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the offset of the octet where decoding failed.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the description of the error.
    pub fn msg(&self) -> &'static str {
        self.msg
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at offset {}: {}", self.kind, self.offset, self.msg)
    }
}

impl error::Error for DecodeError { }


//============ Tests =========================================================
