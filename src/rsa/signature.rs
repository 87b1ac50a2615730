// RSA Signature Engine
// Textbook RSA over a SHA-256 digest: no padding, the digest is reduced mod n

use std::fmt;

use super::bigint::{mod_pow, RsaBigInt};
use super::keygen::{RsaPrivateKey, RsaPublicKey};
use crate::digest::Digest;
use crate::error::{Error, Result};

/// A signature value, always smaller than the modulus that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(RsaBigInt);

impl Signature {
    pub fn new(value: RsaBigInt) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &RsaBigInt {
        &self.0
    }

    pub fn into_inner(self) -> RsaBigInt {
        self.0
    }
}

impl From<RsaBigInt> for Signature {
    fn from(value: RsaBigInt) -> Self {
        Self(value)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

/// Digest as an integer in `[0, modulus)`.
///
/// Digests wider than the modulus lose their high part here; signing and
/// verification both apply the same reduction.
pub fn reduce_digest(digest: &Digest, modulus: &RsaBigInt) -> RsaBigInt {
    let h = digest.to_biguint();
    if &h >= modulus {
        h % modulus
    } else {
        h
    }
}

/// signature = (digest mod n)^d mod n
///
/// # Panics
///
/// Panics if the key's modulus is zero. Keys from generation or from
/// [`crate::util::codec::decode_key`] never have one.
pub fn sign(digest: &Digest, private_key: &RsaPrivateKey) -> Signature {
    let h = reduce_digest(digest, &private_key.n);
    Signature(mod_pow(&h, &private_key.d, &private_key.n))
}

/// Check `signature^e mod n == digest mod n`.
///
/// A mismatch is `Ok(false)`. A signature that is not below the modulus cannot
/// have come from this key and is rejected with `InvalidSignature` before any
/// exponentiation.
pub fn verify(digest: &Digest, signature: &Signature, public_key: &RsaPublicKey) -> Result<bool> {
    if signature.value() >= &public_key.n {
        return Err(Error::InvalidSignature);
    }

    let h = reduce_digest(digest, &public_key.n);
    let recovered = mod_pow(signature.value(), &public_key.e, &public_key.n);

    Ok(h == recovered)
}
