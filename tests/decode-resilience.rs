//! Broken input must be rejected with the right error and never panic.

use rpki_mft::{cms_signing_time, Manifest, SignedObject};
use rpki_mft::der::ErrorKind;

/// A ContentInfo of type id-data instead of id-signedData.
const DATA_CONTENT_INFO: &[u8] = b"\x30\x0d\
    \x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x07\x01\
    \xa0\x00";

fn check(data: &[u8], kind: ErrorKind) {
    let err = Manifest::from_content(data).unwrap_err();
    assert_eq!(err.kind(), kind, "{:02x?}: {}", data, err);
    assert!(SignedObject::decode(data, true).is_err());
    assert_eq!(cms_signing_time(data), None);
}

#[test]
fn broken_headers() {
    check(b"", ErrorKind::UnexpectedEnd);
    check(b"\x30", ErrorKind::TruncatedInput);
    check(b"\x30\x80\x00\x00", ErrorKind::InvalidLength);
    check(b"\x30\x81\x05\x00", ErrorKind::InvalidLength);
    check(b"\x30\x84\xff\xff\xff\xff", ErrorKind::TruncatedInput);
    check(
        b"\x30\x89\x01\x00\x00\x00\x00\x00\x00\x00\x00",
        ErrorKind::InvalidLength
    );
    check(b"\x3f\x80\x01\x00", ErrorKind::InvalidTag);
    check(b"\x00\x00", ErrorKind::InvalidTag);
    check(b"\x10\x00", ErrorKind::InvalidTag);
}

#[test]
fn wrong_content_type() {
    let err = Manifest::from_content(DATA_CONTENT_INFO).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    assert_eq!(err.offset(), 2);
}
