//! Decoding of DER-encoded data.
//!
//! This module contains a small, strict decoder for the subset of the
//! Distinguished Encoding Rules needed by RPKI signed objects. It only ever
//! borrows the input and reports every failure as a [`DecodeError`] that
//! carries the offset of the offending octet.
//!
//! Decoding starts with [`decode`] which hands a [`Constructed`] to a
//! closure. The closure then takes values off the front of it, descending
//! into nested values via further closures.

pub use self::cons::{decode, Constructed, Content, Decode};
pub use self::error::{DecodeError, ErrorKind};
pub use self::int::Integer;
pub use self::oid::{Arcs, ConstOid, Oid};
pub use self::string::{BitString, Ia5String, OctetString, PrintableString};
pub use self::tag::{Class, Header, Tag};

mod cons;
mod error;
mod int;
mod oid;
mod string;
mod tag;
