//! OpenSSL compatibility tests
//!
//! These tests check hashes in both directions against `openssl passwd -apr1`.
//! They only run when an `openssl` binary is available on the `PATH`.

use apr1crypt::{SALT_LEN_MAX, crypt, generate_salt, verify};
use std::process::Command;

/// Run `openssl passwd -apr1`, returning `None` when openssl is not usable.
fn openssl_apr1(password: &str, salt: Option<&str>) -> Option<String> {
    let mut cmd = Command::new("openssl");
    cmd.args(["passwd", "-apr1"]);
    if let Some(salt) = salt {
        cmd.args(["-salt", salt]);
    }
    let output = cmd.arg(password).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

const PASSWORDS: &[&str] = &[
    "a",
    "secret",
    "correct horse battery staple",
    "p@ss:w0rd$with$dollars",
    "0123456789abcdef",
    "0123456789abcdef0",
    "a much longer password that spans several md5 blocks of input data",
];

#[test]
fn test_openssl_reads_our_hashes() {
    for password in PASSWORDS {
        let ours = crypt(password.as_bytes(), "").unwrap();
        let salt = ours.split('$').nth(2).unwrap();
        let Some(theirs) = openssl_apr1(password, Some(salt)) else {
            return;
        };
        assert_eq!(ours, theirs, "password {password:?}");
    }
}

#[test]
fn test_we_read_openssl_hashes() {
    for password in PASSWORDS {
        let Some(theirs) = openssl_apr1(password, None) else {
            return;
        };
        assert!(verify(password.as_bytes(), &theirs), "{theirs}");
        assert!(!verify(b"not the password", &theirs), "{theirs}");
    }
}

#[test]
fn test_short_salts_match_openssl() {
    for length in 1..=SALT_LEN_MAX {
        let salt_param = generate_salt(length).unwrap();
        let salt = &salt_param[apr1crypt::MAGIC_PREFIX.len()..];
        let Some(theirs) = openssl_apr1("secret", Some(salt)) else {
            return;
        };
        assert_eq!(crypt(b"secret", &salt_param).unwrap(), theirs);
    }
}
