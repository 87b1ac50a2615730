use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by key generation, signing, verification and persistence.
///
/// A signature that simply does not match is not an error; `verify` reports it
/// as `Ok(false)`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O failure on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed key file: {0}")]
    MalformedKeyFile(String),

    #[error("Malformed signature file: {0}")]
    MalformedSignatureFile(String),

    #[error("Invalid signature: value is not smaller than the modulus")]
    InvalidSignature,

    #[error("No {bits}-bit prime found after {attempts} candidates")]
    PrimeGenerationExhausted { bits: u32, attempts: u32 },

    #[error("No public exponent coprime with phi found after {attempts} attempts")]
    CoprimalityExhausted { attempts: u32 },

    #[error("Invalid key size {0}: must be even and at least {min} bits", min = crate::rsa::MIN_KEY_BITS)]
    InvalidKeySize(u32),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for every fallible operation in the crate
pub type Result<T> = std::result::Result<T, Error>;
