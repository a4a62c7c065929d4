//! URIs.

use std::{error, fmt, str};
use std::str::FromStr;
use bytes::{BufMut, Bytes, BytesMut};


//------------ Uri -----------------------------------------------------------

/// A URI as it appears in the access extensions of a certificate.
///
/// This implements a simplified form of the URIs defined in RFC 3986. Only
/// absolute URIs including an authority are allowed, i.e., the URI must
/// start with a scheme followed by `://` and a non-empty authority.
///
/// Parsing is simplified in that it only checks for the correct structure and
/// that no forbidden characters are present.
///
//  In particular, forbidden characters are
//
//     SPACE CONTROL " # < > ? [ \\ ] ^ ` { | }
//
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct Uri {
    /// The complete URI.
    bytes: Bytes,

    /// The scheme of the URI.
    scheme: Scheme,

    /// The index of the first octet of the path.
    ///
    /// This is the index of the slash following the authority or the length
    /// of the URI if there is no path.
    path_start: usize,
}

impl Uri {
    pub fn from_slice(slice: &[u8]) -> Result<Self, Error> {
        Self::from_bytes(Bytes::copy_from_slice(slice))
    }

    pub fn from_bytes(bytes: Bytes) -> Result<Self, Error> {
        if !is_uri_ascii(&bytes) {
            return Err(Error::NotAscii)
        }
        let (scheme, scheme_len) = Scheme::parse(&bytes)?;
        let rest = &bytes[scheme_len..];
        let authority_len = rest.iter().position(|&ch| ch == b'/')
            .unwrap_or(rest.len());
        if authority_len == 0 {
            return Err(Error::BadUri)
        }
        Ok(Uri {
            path_start: scheme_len + authority_len,
            scheme,
            bytes,
        })
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn as_str(&self) -> &str {
        // Only ever contains ASCII characters.
        unsafe { str::from_utf8_unchecked(self.bytes.as_ref()) }
    }

    pub fn as_slice(&self) -> &[u8] {
        self.bytes.as_ref()
    }

    /// Returns the authority part of the URI.
    pub fn authority(&self) -> &str {
        &self.as_str()[self.scheme_len()..self.path_start]
    }

    /// Returns the path of the URI including its leading slash.
    pub fn path(&self) -> &str {
        &self.as_str()[self.path_start..]
    }

    fn scheme_len(&self) -> usize {
        self.as_str().find("://").map(|pos| pos + 3).unwrap_or(0)
    }

    pub fn ends_with(&self, extension: &str) -> bool {
        self.bytes.ends_with(extension.as_bytes())
    }

    /// Returns whether the URI refers to a directory, i.e., ends in a slash.
    pub fn is_directory(&self) -> bool {
        self.bytes.ends_with(b"/")
    }

    /// Returns the URI of the directory containing this URI.
    ///
    /// The result ends in a slash. Returns `None` if the URI already ends in
    /// a slash or has no path.
    pub fn parent(&self) -> Option<Self> {
        if self.is_directory() {
            return None
        }
        let path = &self.bytes[self.path_start..];
        let last = path.iter().rposition(|&ch| ch == b'/')?;
        let mut res = self.clone();
        res.bytes = self.bytes.slice(..self.path_start + last + 1);
        Some(res)
    }

    /// Appends a relative path to a directory URI.
    ///
    /// A slash is inserted if the URI doesn’t end in one already.
    pub fn join(&self, path: &[u8]) -> Result<Self, Error> {
        if !is_uri_ascii(path) {
            return Err(Error::NotAscii)
        }
        let mut res = BytesMut::with_capacity(
            self.bytes.len() + path.len() + 1
        );
        res.put_slice(self.bytes.as_ref());
        if !self.is_directory() {
            res.put_slice(b"/");
        }
        res.put_slice(path);
        Ok(Uri {
            bytes: res.freeze(),
            scheme: self.scheme,
            path_start: self.path_start,
        })
    }
}


//--- FromStr

impl FromStr for Uri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slice(s.as_bytes())
    }
}


//--- AsRef

impl AsRef<str> for Uri {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}


//--- Display and Debug

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Uri {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Uri({})", self.as_str())
    }
}


//--- Serialize

#[cfg(feature = "serde")]
impl serde::Serialize for Uri {
    fn serialize<S: serde::Serializer>(
        &self, serializer: S
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}


//------------ Scheme --------------------------------------------------------

/// The scheme of a URI.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Scheme {
    Rsync,
    Https,
    Http,

    /// Any other syntactically valid scheme.
    Other,
}

impl Scheme {
    /// Parses the scheme and returns it with the length including `://`.
    fn parse(bytes: &[u8]) -> Result<(Self, usize), Error> {
        let len = match bytes.windows(3).position(|win| win == b"://") {
            Some(len) => len,
            None => return Err(Error::BadScheme)
        };
        let name = &bytes[..len];
        match name.split_first() {
            Some((first, tail)) if first.is_ascii_alphabetic() => {
                if !tail.iter().all(|&ch| {
                    ch.is_ascii_alphanumeric()
                    || ch == b'+' || ch == b'-' || ch == b'.'
                }) {
                    return Err(Error::BadScheme)
                }
            }
            _ => return Err(Error::BadScheme)
        }
        let scheme = if name.eq_ignore_ascii_case(b"rsync") {
            Scheme::Rsync
        }
        else if name.eq_ignore_ascii_case(b"https") {
            Scheme::Https
        }
        else if name.eq_ignore_ascii_case(b"http") {
            Scheme::Http
        }
        else {
            Scheme::Other
        };
        Ok((scheme, len + 3))
    }
}


//------------ Helper Functions ----------------------------------------------

pub fn is_uri_ascii<S: AsRef<[u8]>>(slice: S) -> bool {
    slice.as_ref().iter().all(|&ch| {
        ch > b' ' && ch != b'"' && ch != b'#' && ch != b'<' && ch != b'>'
            && ch != b'?' && ch != b'[' && ch != b'\\' && ch != b']'
            && ch != b'^' && ch != b'`' && ch != b'{' && ch != b'|'
            && ch != b'}' && ch < 0x7F
    })
}


//------------ Error ---------------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    NotAscii,
    BadUri,
    BadScheme,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Error::NotAscii => "invalid characters",
            Error::BadUri => "bad URI",
            Error::BadScheme => "bad URI scheme",
        })
    }
}

impl error::Error for Error { }


//============ Tests =========================================================
