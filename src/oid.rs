//! The object identifiers used in this crate.
//!
//! This module collects all the object indentifiers used at various places
//! in this crate in one central place. They are public so you can refer to
//! them should that ever become necessary.

use crate::der::{ConstOid, Oid};

/// [RFC 4055](https://tools.ietf.org/html/rfc4055) `id-sha256`
///
/// Identifies the SHA-256 one-way hash function.
pub const SHA256: ConstOid
    = Oid(&[96, 134, 72, 1, 101, 3, 4, 2, 1]);

/// [RFC 4055](https://tools.ietf.org/html/rfc4055) `rsaEncryption`
///
/// Identifies an RSA public key with no limitation to either RSASSA-PSS or
/// RSAES-OEAP.
pub const RSA_ENCRYPTION: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 1]);

/// [RFC 4055](https://tools.ietf.org/html/rfc4055) `sha256WithRSAEncryption`
///
/// Identifies the PKCS #1 version 1.5 signature algorithm with SHA-256.
pub const SHA256_WITH_RSA_ENCRYPTION: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 11]);


/// [RFC 5652](https://tools.ietf.org/html/rfc5652) `id-signedData`
pub const SIGNED_DATA: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 7, 2]);
pub const CONTENT_TYPE: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 3]);
pub const MESSAGE_DIGEST: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 4]);
pub const SIGNING_TIME: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 5]);

/// [RFC 9286](https://tools.ietf.org/html/rfc9286) `id-ct-rpkiManifest`
pub const CT_RPKI_MANIFEST: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 1, 26]);


pub const AD_CA_ISSUERS: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 48, 2]);
pub const AD_CA_REPOSITORY: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 48, 5]);
pub const AD_RPKI_MANIFEST: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 48, 10]);
pub const AD_RPKI_NOTIFY: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 48, 13]);
pub const AD_SIGNED_OBJECT: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 48, 11]);

pub const CE_AUTHORITY_KEY_IDENTIFIER: ConstOid = Oid(&[85, 29, 35]);
pub const CE_CRL_DISTRIBUTION_POINTS: ConstOid = Oid(&[85, 29, 31]);
pub const CE_SUBJECT_KEY_IDENTIFIER: ConstOid = Oid(&[85, 29, 14]);

pub const PE_AUTHORITY_INFO_ACCESS: ConstOid
    = Oid(&[43, 6, 1, 5, 5, 7, 1, 1]);
pub const PE_SUBJECT_INFO_ACCESS: ConstOid
    = Oid(&[43, 6, 1, 5, 5, 7, 1, 11]);

