//! Decoding RPKI manifests.
//!
//! The _Resource Public Key Infrastructure_ (RPKI) is an application of
//! PKI to Internet routing security. Each RPKI certificate authority
//! publishes a manifest listing all the files it currently publishes
//! together with their hashes. Manifests are CMS signed objects.
//!
//! This crate decodes such manifests from their DER encoding into owned
//! values. It only decodes: no signatures are checked, no hashes are
//! calculated, and no certificate is validated.
//!
//! There are two entry points. [`Manifest::from_content`] decodes a
//! complete manifest, including the interesting parts of the EE certificate
//! embedded in it. [`cms_signing_time`] only extracts the signing time of
//! any CMS signed object.
//!
//! The modules follow the layering of the decoder: [`der`] provides the
//! basic decoding machinery and primitive types, [`x509`], [`cert`], and
//! [`crypto`] the certificate, [`sigobj`] the CMS wrapper, and [`manifest`]
//! finally the manifest itself.
//!
//! # Feature Flags
//!
//! * `serde`: implements `Serialize` for the decoded manifest and the
//!   types it contains.

pub use self::manifest::{FileAndHash, Manifest};
pub use self::sigobj::SignedObject;
pub use self::x509::Time;

use log::debug;

pub mod cert;
pub mod crypto;
pub mod der;
pub mod manifest;
pub mod oid;
pub mod sigobj;
pub mod uri;
pub mod util;
pub mod x509;

#[cfg(test)]
mod test;


//------------ cms_signing_time ----------------------------------------------

/// Returns the signing time of a CMS signed object.
///
/// The object is decoded in relaxed mode. If it can’t be decoded at all,
/// if it doesn’t have a signing-time attribute, or if that attribute is
/// malformed, returns `None`.
pub fn cms_signing_time(data: &[u8]) -> Option<Time> {
    match SignedObject::decode(data, false) {
        Ok(obj) => obj.signing_time(),
        Err(err) => {
            debug!("Failed to decode signed object: {}", err);
            None
        }
    }
}


//============ Tests =========================================================
