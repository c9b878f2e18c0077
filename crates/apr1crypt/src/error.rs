use snafu::Snafu;

/// Errors that can occur while producing or parsing APR1-MD5 hashes.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    /// The salt parameter does not start with `$apr1$`.
    #[snafu(display("Salt parameter '{salt_param}' does not start with the $apr1$ prefix"))]
    InvalidMagicPrefix { salt_param: String },

    /// The salt parameter has no salt field after the prefix.
    #[snafu(display("Salt parameter '{salt_param}' is malformed: {reason}"))]
    InvalidSaltFormat {
        salt_param: String,
        reason: &'static str,
    },

    /// The operating system random source failed.
    #[snafu(display("Failed to read random bytes for the salt"))]
    RandomSource { source: getrandom::Error },

    /// A string is not a valid itoa64 rendering.
    #[snafu(display("Invalid itoa64 encoding: {reason}"))]
    InvalidEncoding { reason: String },
}

/// Result type of this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
