//! Algorithm identifiers, keys, and signature values.
//!
//! Nothing in here performs cryptographic operations. The types only
//! describe what a signed object claims to use.

pub use self::digest::DigestAlgorithm;
pub use self::keys::{KeyIdentifier, PublicKey, RepresentationError};
pub use self::signature::{Signature, SignatureAlgorithm};

pub mod digest;
pub mod keys;
pub mod signature;
