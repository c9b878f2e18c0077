use crate::apr1_md5::{DIGEST_ORDER, ENCODED_DIGEST_LEN, Md5Output, encode_digest, md5_crypt_digest};
use crate::codec;
use crate::error::{
    Error, InvalidEncodingSnafu, InvalidMagicPrefixSnafu, InvalidSaltFormatSnafu, Result,
};
use crate::salt::{MAGIC_PREFIX, SALT_LEN_MAX};
use snafu::OptionExt;
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;

/// Check whether a hash string uses the APR1-MD5 scheme.
pub fn is_apr1_hash(hash: &str) -> bool {
    hash.starts_with(MAGIC_PREFIX)
}

/// A parsed `$apr1$salt$digest` hash string.
///
/// Parsing is stricter than [`crate::crypt`]'s salt handling: the salt must
/// be at most [`SALT_LEN_MAX`] bytes and the digest exactly 22 itoa64
/// characters that decode to 16 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Apr1Hash {
    salt: String,
    digest: Md5Output,
}

impl Apr1Hash {
    /// Hash `key` with the given salt parameter, see [`crate::crypt`].
    pub fn compute(key: &[u8], salt_param: &str) -> Result<Self> {
        crate::crypt(key, salt_param)?.parse()
    }

    /// The salt, without the prefix and delimiters.
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// The final MD5 digest in its natural byte order.
    pub fn digest(&self) -> &[u8; 16] {
        &self.digest
    }

    /// Check `key` against this hash in constant time.
    pub fn verify(&self, key: &[u8]) -> bool {
        let computed = md5_crypt_digest(key, self.salt.as_bytes());
        computed.as_slice().ct_eq(self.digest.as_slice()).into()
    }
}

impl FromStr for Apr1Hash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let rest = s
            .strip_prefix(MAGIC_PREFIX)
            .context(InvalidMagicPrefixSnafu { salt_param: s })?;
        let (salt, encoded) = rest.split_once('$').context(InvalidSaltFormatSnafu {
            salt_param: s,
            reason: "missing digest field",
        })?;
        snafu::ensure!(
            salt.len() <= SALT_LEN_MAX,
            InvalidSaltFormatSnafu {
                salt_param: s,
                reason: "salt is longer than 8 bytes",
            }
        );
        snafu::ensure!(
            encoded.len() == ENCODED_DIGEST_LEN,
            InvalidEncodingSnafu {
                reason: format!(
                    "digest must be {ENCODED_DIGEST_LEN} characters, got {}",
                    encoded.len()
                ),
            }
        );

        let permuted = codec::decode(encoded)?;
        let mut digest = Md5Output::default();
        for (&position, &byte) in DIGEST_ORDER.iter().zip(&permuted) {
            digest[position] = byte;
        }

        Ok(Self {
            salt: salt.to_string(),
            digest,
        })
    }
}

impl fmt::Display for Apr1Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{MAGIC_PREFIX}{}${}", self.salt, encode_digest(&self.digest))
    }
}
