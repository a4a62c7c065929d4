//! Various useful things.

pub mod hex;
