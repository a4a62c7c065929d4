//! Converting octet sequences into hex strings.

use std::str;


/// Encodes an octet sequence as an upper-case hex string.
///
/// The function uses `dest` as the buffer for encoding which therefore must
/// be at least twice the length of `src`. It returns a reference to the
/// used part of this buffer as a `&str`.
///
/// # Panics
///
/// The function panics if `dest` is shorter than twice the length of `src`.
pub fn encode<'a>(src: &[u8], dest: &'a mut [u8]) -> &'a str {
    encode_with(src, dest, UPPER)
}

/// Encodes an octet sequence as a lower-case hex string.
pub fn encode_lower(src: &[u8]) -> String {
    let mut res = vec![0u8; src.len() * 2];
    encode_with(src, &mut res, LOWER);
    // Only ever contains ASCII digits.
    unsafe { String::from_utf8_unchecked(res) }
}

fn encode_with<'a>(
    src: &[u8], dest: &'a mut [u8], digits: &[u8]
) -> &'a str {
    let dest = &mut dest[..src.len() * 2];
    for (s, d) in src.iter().zip(dest.chunks_mut(2)) {
        d[0] = digits[usize::from(s >> 4)];
        d[1] = digits[usize::from(s & 0x0F)];
    }
    unsafe { str::from_utf8_unchecked(dest) }
}

const UPPER: &[u8] = b"0123456789ABCDEF";
const LOWER: &[u8] = b"0123456789abcdef";


//============ Tests =========================================================
