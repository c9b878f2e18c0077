//! Salt parameter generation and parsing.
//!
//! A salt parameter is the front part of an APR1-MD5 hash, `$apr1$<salt>`,
//! optionally followed by `$` and anything else. Full hash strings are
//! therefore valid salt parameters, which is what verification relies on.

use crate::codec;
use crate::error::{InvalidMagicPrefixSnafu, InvalidSaltFormatSnafu, RandomSourceSnafu, Result};
use snafu::{OptionExt, ResultExt};

/// APR1-MD5 hash prefix.
pub const MAGIC_PREFIX: &str = "$apr1$";

/// Maximum salt length, longer salts are truncated.
pub const SALT_LEN_MAX: usize = 8;

/// Minimum length of a generated salt. An empty salt is accepted when
/// parsing, but never generated.
pub const SALT_LEN_MIN: usize = 1;

/// Generate a random salt parameter of the form `$apr1$<salt>`.
///
/// `length` is clamped into `SALT_LEN_MIN..=SALT_LEN_MAX`. Each salt
/// character carries 6 bits, so `ceil(length * 6 / 8)` random bytes are read
/// and encoded with [`codec::encode`].
pub fn generate_salt(length: usize) -> Result<String> {
    let length = length.clamp(SALT_LEN_MIN, SALT_LEN_MAX);

    let mut salt_bytes = [0u8; (SALT_LEN_MAX * 6).div_ceil(8)];
    let salt_bytes = &mut salt_bytes[..(length * 6).div_ceil(8)];
    getrandom::fill(salt_bytes).context(RandomSourceSnafu)?;

    let mut salt = codec::encode(salt_bytes);
    salt.truncate(length);
    tracing::debug!(length, "generated random salt");

    Ok(format!("{MAGIC_PREFIX}{salt}"))
}

/// Extract the salt from a salt parameter or a full hash string.
///
/// The salt is the third `$`-separated field, truncated to
/// [`SALT_LEN_MAX`] bytes. The bare prefix `$apr1$` carries no salt field
/// and is rejected, while `$apr1$$` is an explicit empty salt.
pub fn parse_salt(salt_param: &str) -> Result<&[u8]> {
    let rest = salt_param
        .strip_prefix(MAGIC_PREFIX)
        .context(InvalidMagicPrefixSnafu { salt_param })?;
    snafu::ensure!(
        !rest.is_empty(),
        InvalidSaltFormatSnafu {
            salt_param,
            reason: "missing salt field",
        }
    );

    // `rest` starts right after the second `$`, so the salt runs up to the
    // next delimiter.
    let salt = rest.split('$').next().unwrap_or_default();
    let salt = &salt.as_bytes()[..salt.len().min(SALT_LEN_MAX)];
    tracing::trace!(salt_len = salt.len(), "parsed salt parameter");

    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_generate_salt_length() {
        for length in SALT_LEN_MIN..=SALT_LEN_MAX {
            let salt = generate_salt(length).unwrap();
            assert_eq!(salt.len(), MAGIC_PREFIX.len() + length);
        }
    }

    #[test]
    fn test_generate_salt_clamps_length() {
        assert_eq!(generate_salt(0).unwrap().len(), MAGIC_PREFIX.len() + SALT_LEN_MIN);
        assert_eq!(generate_salt(9).unwrap().len(), MAGIC_PREFIX.len() + SALT_LEN_MAX);
        assert_eq!(
            generate_salt(usize::MAX).unwrap().len(),
            MAGIC_PREFIX.len() + SALT_LEN_MAX
        );
    }

    #[test]
    fn test_generate_salt_valid_chars() {
        let salt = generate_salt(SALT_LEN_MAX).unwrap();
        let salt = salt.strip_prefix(MAGIC_PREFIX).unwrap();
        for ch in salt.bytes() {
            assert!(codec::ITOA64.contains(&ch), "Invalid salt character: {}", ch as char);
        }
    }

    #[test]
    fn test_generate_salt_is_parseable() {
        let param = generate_salt(SALT_LEN_MAX).unwrap();
        let salt = parse_salt(&param).unwrap();
        assert_eq!(salt, &param.as_bytes()[MAGIC_PREFIX.len()..]);
    }

    #[test]
    fn test_generate_salt_differs() {
        let first = generate_salt(SALT_LEN_MAX).unwrap();
        let second = generate_salt(SALT_LEN_MAX).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_parse_salt_parameter() {
        assert_eq!(parse_salt("$apr1$xlWep/gn").unwrap(), b"xlWep/gn");
        assert_eq!(parse_salt("$apr1$abc").unwrap(), b"abc");
    }

    #[test]
    fn test_parse_salt_from_hash() {
        assert_eq!(
            parse_salt("$apr1$xlWep/gn$6UNiHq3WE714EKfeH2X5c.").unwrap(),
            b"xlWep/gn"
        );
        assert_eq!(parse_salt("$apr1$abc$").unwrap(), b"abc");
    }

    #[test]
    fn test_parse_salt_truncates() {
        assert_eq!(parse_salt("$apr1$abcdefgh12345678").unwrap(), b"abcdefgh");
        assert_eq!(parse_salt("$apr1$abcdefghi$hash").unwrap(), b"abcdefgh");
    }

    #[test]
    fn test_parse_salt_empty_salt() {
        assert_eq!(parse_salt("$apr1$$").unwrap(), b"");
        assert_eq!(parse_salt("$apr1$$somehash").unwrap(), b"");
    }

    #[test]
    fn test_parse_salt_invalid_prefix() {
        for param in ["$1$abc", "apr1$abc", "$apr1", "$APR1$abc", "abc"] {
            assert!(
                matches!(parse_salt(param), Err(Error::InvalidMagicPrefix { .. })),
                "{param}"
            );
        }
    }

    #[test]
    fn test_parse_salt_missing_salt() {
        assert!(matches!(
            parse_salt("$apr1$"),
            Err(Error::InvalidSaltFormat { .. })
        ));
    }
}
