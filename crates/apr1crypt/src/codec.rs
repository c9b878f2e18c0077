//! The itoa64 codec shared by salts and digests.
//!
//! The alphabet is the one from Apache APR's `to64()`:
//!
//! ```c
//! static unsigned char itoa64[] =
//!     "./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
//! ```
//!
//! Unlike RFC 4648 base64 the bits are taken least significant first: the
//! bytes `b0 b1 b2` form the value `b0 | b1 << 8 | b2 << 16`, which is emitted
//! as four characters starting with the lowest six bits. A trailing group of
//! one or two bytes produces two or three characters, there is no padding.

use crate::error::{InvalidEncodingSnafu, Result};

/// itoa64 alphabet.
pub const ITOA64: &[u8; 64] = b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Number of characters produced for `len` input bytes.
pub const fn encoded_len(len: usize) -> usize {
    (len * 8).div_ceil(6)
}

/// Encode bytes with the itoa64 alphabet.
pub fn encode(src: &[u8]) -> String {
    let mut result = String::with_capacity(encoded_len(src.len()));
    for chunk in src.chunks(3) {
        let value = chunk
            .iter()
            .enumerate()
            .fold(0u32, |acc, (i, &byte)| acc | u32::from(byte) << (8 * i));
        to64(&mut result, value, chunk.len() + 1);
    }
    result
}

/// Appends `n` 6-bit values of `v` to `out`, lowest bits first.
fn to64(out: &mut String, mut v: u32, n: usize) {
    for _ in 0..n {
        out.push(ITOA64[(v & 0x3f) as usize] as char);
        v >>= 6;
    }
}

/// Position of `c` in the itoa64 alphabet.
fn from64(c: u8) -> Option<u32> {
    let index = match c {
        b'.' => 0,
        b'/' => 1,
        b'0'..=b'9' => c - b'0' + 2,
        b'A'..=b'Z' => c - b'A' + 12,
        b'a'..=b'z' => c - b'a' + 38,
        _ => return None,
    };
    Some(u32::from(index))
}

/// Decode an itoa64 string produced by [`encode`].
///
/// Fails on characters outside the alphabet, on a length that no byte
/// sequence encodes to, and on a final character carrying bits beyond the
/// last byte.
pub fn decode(src: &str) -> Result<Vec<u8>> {
    let src = src.as_bytes();
    snafu::ensure!(
        src.len() % 4 != 1,
        InvalidEncodingSnafu {
            reason: format!("length {} is not a valid itoa64 length", src.len()),
        }
    );

    let mut result = Vec::with_capacity(src.len() * 6 / 8);
    for chunk in src.chunks(4) {
        let mut value = 0u32;
        for (i, &c) in chunk.iter().enumerate() {
            let bits = from64(c).ok_or_else(|| {
                InvalidEncodingSnafu {
                    reason: format!("character {:?} is not in the itoa64 alphabet", c as char),
                }
                .build()
            })?;
            value |= bits << (6 * i);
        }

        let bytes = chunk.len() - 1;
        snafu::ensure!(
            value >> (8 * bytes) == 0,
            InvalidEncodingSnafu {
                reason: "trailing bits are not zero".to_string(),
            }
        );
        result.extend(value.to_le_bytes().into_iter().take(bytes));
    }
    Ok(result)
}
