use clap::Parser;
use snafu::ResultExt;
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

/// Generate and verify Apache APR1-MD5 password hashes.
#[derive(Parser)]
#[command(name = "apr1crypt")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG is used otherwise)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Print a random salt parameter such as `$apr1$xlWep/gn`
    Salt {
        /// Number of salt characters, clamped to 1..=8
        #[arg(long, env = "APR1CRYPT_SALT_LEN", default_value_t = apr1crypt::SALT_LEN_MAX)]
        length: usize,
    },

    /// Hash a password
    Hash {
        /// Salt parameter (`$apr1$salt`); a random salt is used when omitted
        #[arg(long, default_value = "")]
        salt: String,
        /// Read password from stdin instead of prompting
        #[arg(long)]
        stdin: bool,
    },

    /// Verify a password against a hash
    Verify {
        /// Hash to verify against, `$apr1$salt$digest`
        hash: String,
        /// Read password from stdin instead of prompting
        #[arg(long)]
        stdin: bool,
    },
}

type Result<T> = ::std::result::Result<T, snafu::Whatever>;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_password_from_stdin() -> Result<Zeroizing<String>> {
    let mut password = Zeroizing::new(String::new());
    io::stdin()
        .read_to_string(&mut password)
        .whatever_context("Can't read password from stdin")?;
    Ok(Zeroizing::new(password.trim_end_matches(['\r', '\n']).to_string()))
}

fn prompt_password() -> Result<Zeroizing<String>> {
    rpassword::prompt_password("Enter password: ")
        .whatever_context("Can't prompt for password")
        .map(Zeroizing::new)
}

fn prompt_password_confirm() -> Result<Zeroizing<String>> {
    loop {
        let password = Zeroizing::new(
            rpassword::prompt_password("New password: ")
                .whatever_context("Can't prompt for new password")?,
        );
        let confirm = Zeroizing::new(
            rpassword::prompt_password("Re-type new password: ")
                .whatever_context("Can't prompt for password re-type")?,
        );

        if *password == *confirm {
            return Ok(password);
        }

        eprintln!("Password verification error: passwords do not match");
        eprint!("Try again? [Y/n]: ");
        let mut response = String::new();
        io::stdin()
            .read_line(&mut response)
            .whatever_context("Can't read line")?;
        let response = response.trim().to_lowercase();

        snafu::ensure_whatever!(
            response != "n" && response != "no",
            "Password confirmation failed"
        );
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Salt { length } => {
            let salt = apr1crypt::generate_salt(length).whatever_context("Can't generate salt")?;
            println!("{salt}");
            Ok(())
        }

        Commands::Hash { salt, stdin } => {
            let password = if stdin {
                read_password_from_stdin()?
            } else {
                prompt_password_confirm()?
            };

            tracing::debug!(%salt, "hashing password");
            let hash = apr1crypt::crypt(password.as_bytes(), &salt)
                .whatever_context("Can't hash password")?;
            println!("{hash}");
            Ok(())
        }

        Commands::Verify { hash, stdin } => {
            snafu::ensure_whatever!(
                apr1crypt::is_apr1_hash(&hash),
                "'{hash}' is not an APR1-MD5 hash"
            );
            let password = if stdin {
                read_password_from_stdin()?
            } else {
                prompt_password()?
            };

            tracing::debug!(%hash, "verifying password");
            if apr1crypt::verify(password.as_bytes(), &hash) {
                println!("password correct");
                Ok(())
            } else {
                snafu::whatever!("password incorrect")
            }
        }
    }
}

#[snafu::report]
fn main() -> Result<()> {
    run()
}
