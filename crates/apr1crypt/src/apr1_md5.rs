//! Apache APR1-MD5 password hashing.
//!
//! This is Poul-Henning Kamp's MD5-Crypt from FreeBSD with the magic string
//! `$apr1$` instead of `$1$`, as used by Apache's htpasswd tool. The format
//! is `$apr1$salt$hash`.
//!
//! Key references:
//! - Apache APR: https://github.com/apache/apr-util/blob/master/crypto/apr_md5.c
//! - FreeBSD crypt.c: https://github.com/freebsd/freebsd-src/blob/master/lib/libcrypt/crypt.c
//!
//! # Security Warning
//!
//! MD5 is cryptographically broken. This scheme is provided for
//! compatibility with existing Apache htpasswd files only.

use crate::codec;
use crate::error::{InvalidSaltFormatSnafu, Result};
use crate::salt::{MAGIC_PREFIX, SALT_LEN_MAX, generate_salt, parse_salt};
use md5::{Digest, Md5};
use snafu::OptionExt;
use subtle::ConstantTimeEq;

/// Number of MD5 rounds in the APR1 algorithm.
const APR1_ROUNDS: u32 = 1000;

/// Order in which the final digest bytes are fed to the itoa64 encoder.
///
/// This is Apache's encoding from `apr_md5_encode()` expressed as a
/// permutation:
/// ```c
/// l = (final[ 0]<<16) | (final[ 6]<<8) | final[12]; to64(p, l, 4); p += 4;
/// l = (final[ 1]<<16) | (final[ 7]<<8) | final[13]; to64(p, l, 4); p += 4;
/// l = (final[ 2]<<16) | (final[ 8]<<8) | final[14]; to64(p, l, 4); p += 4;
/// l = (final[ 3]<<16) | (final[ 9]<<8) | final[15]; to64(p, l, 4); p += 4;
/// l = (final[ 4]<<16) | (final[10]<<8) | final[ 5]; to64(p, l, 4); p += 4;
/// l = final[11];                                     to64(p, l, 2); p += 2;
/// ```
pub(crate) const DIGEST_ORDER: [usize; 16] = [12, 6, 0, 13, 7, 1, 14, 8, 2, 15, 9, 3, 5, 10, 4, 11];

/// Length of the encoded digest.
pub const ENCODED_DIGEST_LEN: usize = codec::encoded_len(16);

/// Raw MD5 digest.
pub(crate) type Md5Output = [u8; 16];

/// Run the MD5-Crypt mixing rounds and return the final digest.
///
/// `salt` must already be truncated to [`SALT_LEN_MAX`] bytes.
///
/// 1. alternate = MD5(key + salt + key)
/// 2. intermediate = MD5(key + "$apr1$" + salt + alternate repeated over the
///    key length + one byte per bit of the key length: NUL for a set bit,
///    the first key byte for a clear one)
/// 3. 1000 rounds, each MD5 of:
///    - key if the round is odd, else the previous digest
///    - salt unless the round is a multiple of 3
///    - key unless the round is a multiple of 7
///    - the previous digest if the round is odd, else key
pub(crate) fn md5_crypt_digest(key: &[u8], salt: &[u8]) -> Md5Output {
    let alternate: Md5Output = Md5::new()
        .chain_update(key)
        .chain_update(salt)
        .chain_update(key)
        .finalize()
        .into();

    let mut intermediate = Md5::new();
    intermediate.update(key);
    intermediate.update(MAGIC_PREFIX);
    intermediate.update(salt);
    for chunk in key.chunks(alternate.len()) {
        intermediate.update(&alternate[..chunk.len()]);
    }
    let mut i = key.len();
    while i > 0 {
        if i & 1 == 0 {
            intermediate.update(&key[..1]);
        } else {
            intermediate.update([0u8]);
        }
        i >>= 1;
    }
    let mut digest: Md5Output = intermediate.finalize().into();

    for round in 0..APR1_ROUNDS {
        let mut ctx = Md5::new();
        let odd = round & 1 == 1;

        if odd {
            ctx.update(key);
        } else {
            ctx.update(digest);
        }
        if round % 3 != 0 {
            ctx.update(salt);
        }
        if round % 7 != 0 {
            ctx.update(key);
        }
        if odd {
            ctx.update(digest);
        } else {
            ctx.update(key);
        }

        digest = ctx.finalize().into();
    }

    digest
}

/// Render a final digest as the 22-character hash suffix.
pub(crate) fn encode_digest(digest: &Md5Output) -> String {
    codec::encode(&DIGEST_ORDER.map(|i| digest[i]))
}

/// Hash `key` with the APR1-MD5 algorithm.
///
/// `salt_param` is either empty, in which case a random salt of
/// [`SALT_LEN_MAX`] characters is generated, or a salt parameter such as
/// `$apr1$xlWep/gn`. A complete hash string is also a valid salt parameter:
/// only its salt field is used.
///
/// # Example
///
/// ```
/// let hash = apr1crypt::crypt(b"hello", "$apr1$xlWep/gn").unwrap();
/// assert_eq!(hash, "$apr1$xlWep/gn$6UNiHq3WE714EKfeH2X5c.");
/// ```
pub fn crypt(key: &[u8], salt_param: &str) -> Result<String> {
    if salt_param.is_empty() {
        let generated = generate_salt(SALT_LEN_MAX)?;
        return crypt_with_salt(key, parse_salt(&generated)?);
    }
    crypt_with_salt(key, parse_salt(salt_param)?)
}

/// Hash `key` with a raw salt.
///
/// Salts longer than [`SALT_LEN_MAX`] bytes are truncated. The salt ends up
/// in the hash string, so it must be valid UTF-8 after truncation and must
/// not contain the `$` delimiter.
pub fn crypt_with_salt(key: &[u8], salt: &[u8]) -> Result<String> {
    let salt = &salt[..salt.len().min(SALT_LEN_MAX)];
    let salt_str = std::str::from_utf8(salt)
        .ok()
        .with_context(|| InvalidSaltFormatSnafu {
            salt_param: String::from_utf8_lossy(salt),
            reason: "salt is not valid UTF-8",
        })?;
    snafu::ensure!(
        !salt_str.contains('$'),
        InvalidSaltFormatSnafu {
            salt_param: salt_str,
            reason: "salt contains the '$' delimiter",
        }
    );

    let digest = md5_crypt_digest(key, salt);
    Ok(format!("{MAGIC_PREFIX}{salt_str}${}", encode_digest(&digest)))
}

/// Verify `key` against an APR1-MD5 hash string.
///
/// The hash is recomputed with the stored salt and compared in constant
/// time. A malformed hash never matches.
pub fn verify(key: &[u8], hash: &str) -> bool {
    if hash.is_empty() {
        return false;
    }
    match crypt(key, hash) {
        Ok(computed) => computed.as_bytes().ct_eq(hash.as_bytes()).into(),
        Err(error) => {
            tracing::debug!(%error, "not a valid APR1-MD5 hash");
            false
        }
    }
}
