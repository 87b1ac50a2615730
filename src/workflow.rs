//! File-level signing workflow.
//!
//! Each function here is one blocking call that reads or writes the key,
//! signature and input files and reports progress through `tracing`. None of
//! them touch shared state, so they can run on a worker thread.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rand::{CryptoRng, Rng};
use tracing::{debug, info, warn};

use crate::config::SignerConfig;
use crate::error::Result;
use crate::rsa::bigint::RsaBigInt;
use crate::rsa::{self, KeyMaterial, RsaPrivateKey, RsaPublicKey};
use crate::util::file_ops::{format_file_size, get_file_size};
use crate::util::{
    decode_key, decode_signature, encode_key, encode_signature, hash_file, read_file,
    signature_path, write_file,
};

/// Hex digits shown when logging big integers
const PREVIEW_DIGITS: usize = 64;

/// Key sizes below this are fine for tests but not for real use
const RECOMMENDED_MIN_BITS: u32 = 512;

fn preview(value: &RsaBigInt) -> String {
    let hex = format!("{:x}", value);
    if hex.len() > PREVIEW_DIGITS {
        format!("{}...", &hex[..PREVIEW_DIGITS])
    } else {
        hex
    }
}

/// Generate a key pair and store both halves. Returns the public key.
pub fn generate_keys<R>(
    config: &SignerConfig,
    private_key_path: &Path,
    public_key_path: &Path,
    rng: &mut R,
) -> Result<RsaPublicKey>
where
    R: Rng + CryptoRng + ?Sized,
{
    if config.key_bits < RECOMMENDED_MIN_BITS {
        warn!(
            bits = config.key_bits,
            "Key size below {} bits offers no real security", RECOMMENDED_MIN_BITS
        );
    }
    info!(
        bits = config.key_bits,
        parallel = config.parallel_keygen,
        "Generating RSA key pair"
    );

    let started = Instant::now();
    let keypair = rsa::generate_keypair(config, rng)?;
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        modulus = %preview(&keypair.n),
        "Key generation finished"
    );

    let (public_key, private_key) = keypair.split();

    write_file(private_key_path, &encode_key(&KeyMaterial::from(private_key)))?;
    info!(path = %private_key_path.display(), "Private key saved");

    write_file(public_key_path, &encode_key(&KeyMaterial::from(public_key.clone())))?;
    info!(path = %public_key_path.display(), "Public key saved");

    Ok(public_key)
}

pub fn load_public_key(path: &Path) -> Result<RsaPublicKey> {
    let key = decode_key(&read_file(path)?)?;
    debug!(path = %path.display(), bits = key.modulus.bits(), "Public key loaded");
    Ok(RsaPublicKey::from(key))
}

pub fn load_private_key(path: &Path) -> Result<RsaPrivateKey> {
    let key = decode_key(&read_file(path)?)?;
    debug!(path = %path.display(), bits = key.modulus.bits(), "Private key loaded");
    Ok(RsaPrivateKey::from(key))
}

/// Sign `file` with the private key stored at `private_key_path`.
///
/// The signature is written next to the file as `<file>.<signature_extension>`
/// and that path is returned.
pub fn sign_file(file: &Path, private_key_path: &Path, config: &SignerConfig) -> Result<PathBuf> {
    info!(file = %file.display(), "Signing file");

    let private_key = load_private_key(private_key_path)?;
    let digest = hash_file(file)?;
    debug!(
        size = %format_file_size(get_file_size(file)?),
        digest = %digest,
        "SHA-256 computed"
    );

    let signature = rsa::sign(&digest, &private_key);
    debug!(signature = %preview(signature.value()), "Signature computed");

    let output = signature_path(file, &config.signature_extension);
    let encoded = encode_signature(&signature);
    write_file(&output, &encoded)?;
    info!(
        path = %output.display(),
        bytes = encoded.len(),
        "Signature saved"
    );

    Ok(output)
}

/// Verify `file` against `<file>.<signature_extension>` and the public key at
/// `public_key_path`.
pub fn verify_file(file: &Path, public_key_path: &Path, config: &SignerConfig) -> Result<bool> {
    let signature_file = signature_path(file, &config.signature_extension);
    verify_file_with(file, &signature_file, public_key_path)
}

/// Verify `file` against an explicit signature file.
///
/// `Ok(false)` means the signature does not match; errors are reserved for
/// unreadable or malformed inputs.
pub fn verify_file_with(file: &Path, signature_file: &Path, public_key_path: &Path) -> Result<bool> {
    info!(file = %file.display(), "Verifying signature");

    let public_key = load_public_key(public_key_path)?;
    let digest = hash_file(file)?;
    debug!(digest = %digest, "SHA-256 computed");

    let signature = decode_signature(&read_file(signature_file)?)?;
    debug!(
        path = %signature_file.display(),
        signature = %preview(signature.value()),
        "Signature loaded"
    );

    let valid = rsa::verify(&digest, &signature, &public_key)?;
    if valid {
        info!(file = %file.display(), "Signature is valid");
    } else {
        warn!(file = %file.display(), "Signature is NOT valid");
    }

    Ok(valid)
}
