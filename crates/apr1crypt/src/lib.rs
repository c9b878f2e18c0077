#![warn(missing_docs)]

//! Apache APR1-MD5 (MD5-Crypt) password hashing.
//!
//! This library implements the `$apr1$` password scheme used by Apache's
//! htpasswd tool and `openssl passwd -apr1`: hashing a key with a new or
//! given salt, and verifying a key against a stored hash.
//!
//! # Example
//!
//! ```
//! use apr1crypt::{crypt, generate_salt, verify};
//!
//! # fn main() -> Result<(), apr1crypt::Error> {
//! // Hash with a freshly generated 8-character salt
//! let salt = generate_salt(8)?;
//! let hash = crypt(b"password123", &salt)?;
//!
//! // An empty salt parameter does the same
//! let other = crypt(b"password123", "")?;
//! assert_ne!(hash, other);
//!
//! // Verify a password
//! assert!(verify(b"password123", &hash));
//! assert!(!verify(b"wrong", &hash));
//! # Ok(())
//! # }
//! ```

mod apr1_md5;
pub mod codec;
mod error;
mod hash;
mod salt;

pub use apr1_md5::{ENCODED_DIGEST_LEN, crypt, crypt_with_salt, verify};
pub use error::{Error, Result};
pub use hash::{Apr1Hash, is_apr1_hash};
pub use salt::{MAGIC_PREFIX, SALT_LEN_MAX, SALT_LEN_MIN, generate_salt, parse_salt};
