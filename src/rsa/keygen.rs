// RSA Key Generation
// Implements RSA key pair generation (public and private keys)

use std::thread;

use num_integer::Integer;
use num_traits::{One, Zero};
use rand::rngs::StdRng;
use rand::{CryptoRng, Rng, SeedableRng};

use super::bigint::{from_u64, gcd, mod_inverse, random_prime, RsaBigInt};
use crate::config::SignerConfig;
use crate::error::{Error, Result};

/// Smallest modulus size accepted; below this `e = 65537` no longer fits under phi
pub const MIN_KEY_BITS: u32 = 64;

/// A modulus paired with one exponent, as stored in a key file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    pub modulus: RsaBigInt,
    pub exponent: RsaBigInt,
}

impl KeyMaterial {
    pub fn new(modulus: RsaBigInt, exponent: RsaBigInt) -> Self {
        Self { modulus, exponent }
    }

    /// Check that the modulus is odd and non-zero and that `1 < exponent < modulus`
    pub fn validate(&self) -> Result<()> {
        if self.modulus.is_zero() || self.modulus.is_even() {
            return Err(Error::MalformedKeyFile(
                "modulus must be odd and non-zero".to_string(),
            ));
        }
        if self.exponent <= RsaBigInt::one() || self.exponent >= self.modulus {
            return Err(Error::MalformedKeyFile(
                "exponent must lie strictly between 1 and the modulus".to_string(),
            ));
        }
        Ok(())
    }
}

/// RSA Public Key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    pub n: RsaBigInt, // Modulus
    pub e: RsaBigInt, // Public exponent
}

/// RSA Private Key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPrivateKey {
    pub n: RsaBigInt, // Modulus (same as public)
    pub d: RsaBigInt, // Private exponent
}

impl RsaPublicKey {
    /// Get the bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        self.n.bits()
    }
}

impl RsaPrivateKey {
    /// Get the bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        self.n.bits()
    }
}

impl From<RsaPublicKey> for KeyMaterial {
    fn from(key: RsaPublicKey) -> Self {
        KeyMaterial::new(key.n, key.e)
    }
}

impl From<RsaPrivateKey> for KeyMaterial {
    fn from(key: RsaPrivateKey) -> Self {
        KeyMaterial::new(key.n, key.d)
    }
}

impl From<KeyMaterial> for RsaPublicKey {
    fn from(material: KeyMaterial) -> Self {
        RsaPublicKey {
            n: material.modulus,
            e: material.exponent,
        }
    }
}

impl From<KeyMaterial> for RsaPrivateKey {
    fn from(material: KeyMaterial) -> Self {
        RsaPrivateKey {
            n: material.modulus,
            d: material.exponent,
        }
    }
}

/// Everything produced while generating a key pair.
///
/// Only `n`, `e` and `d` survive [`RsaKeyPair::split`]; the factors and phi
/// are dropped with this value.
#[derive(Debug, Clone)]
pub struct RsaKeyPair {
    pub p: RsaBigInt,
    pub q: RsaBigInt,
    pub n: RsaBigInt,
    pub phi: RsaBigInt,
    pub e: RsaBigInt,
    pub d: RsaBigInt,
}

impl RsaKeyPair {
    /// Get the bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        self.n.bits()
    }

    pub fn public_key(&self) -> RsaPublicKey {
        RsaPublicKey {
            n: self.n.clone(),
            e: self.e.clone(),
        }
    }

    pub fn private_key(&self) -> RsaPrivateKey {
        RsaPrivateKey {
            n: self.n.clone(),
            d: self.d.clone(),
        }
    }

    /// Discard the factors and hand out the two persistable halves
    pub fn split(self) -> (RsaPublicKey, RsaPrivateKey) {
        let public_key = RsaPublicKey {
            n: self.n.clone(),
            e: self.e,
        };
        let private_key = RsaPrivateKey {
            n: self.n,
            d: self.d,
        };
        (public_key, private_key)
    }
}

/// Generate an RSA key pair with a modulus of `config.key_bits` bits.
///
/// `p` and `q` are drawn independently with `key_bits / 2` bits each, on two
/// threads when `config.parallel_keygen` is set. The public exponent starts at
/// `config.public_exponent` and steps by 2 until it is coprime with phi.
pub fn generate_keypair<R>(config: &SignerConfig, rng: &mut R) -> Result<RsaKeyPair>
where
    R: Rng + CryptoRng + ?Sized,
{
    let bit_length = config.key_bits;
    if bit_length < MIN_KEY_BITS || bit_length % 2 != 0 {
        return Err(Error::InvalidKeySize(bit_length));
    }
    let half_bits = bit_length / 2;

    // Step 1: Generate two random primes p and q
    let (p, mut q) = draw_primes(half_bits, config, rng)?;

    // Ensure p != q
    let mut redraws = 0;
    while p == q {
        if redraws == config.max_prime_attempts {
            return Err(Error::PrimeGenerationExhausted {
                bits: half_bits,
                attempts: redraws,
            });
        }
        q = random_prime(
            half_bits,
            config.primality_rounds,
            config.max_prime_attempts,
            rng,
        )?;
        redraws += 1;
    }

    // Step 2: Compute n = p * q
    let n = &p * &q;

    // Step 3: Compute φ(n) = (p-1)(q-1)
    let phi = (&p - 1u8) * (&q - 1u8);

    // Step 4: Find e coprime with φ(n)
    let e = choose_public_exponent(
        &from_u64(config.public_exponent),
        &phi,
        config.max_exponent_attempts,
    )?;

    // Step 5: Compute d = e^(-1) mod φ(n)
    let d = mod_inverse(&e, &phi).ok_or(Error::CoprimalityExhausted {
        attempts: config.max_exponent_attempts,
    })?;

    Ok(RsaKeyPair { p, q, n, phi, e, d })
}

/// Step `e` by 2 from `start` until `gcd(e, phi) = 1` with `1 < e < phi`
pub fn choose_public_exponent(
    start: &RsaBigInt,
    phi: &RsaBigInt,
    max_attempts: u32,
) -> Result<RsaBigInt> {
    let mut e = start.clone();

    for _ in 0..max_attempts {
        if &e >= phi {
            break;
        }
        if e > RsaBigInt::one() && gcd(&e, phi).is_one() {
            return Ok(e);
        }
        e += 2u8;
    }

    Err(Error::CoprimalityExhausted {
        attempts: max_attempts,
    })
}

fn draw_primes<R>(
    half_bits: u32,
    config: &SignerConfig,
    rng: &mut R,
) -> Result<(RsaBigInt, RsaBigInt)>
where
    R: Rng + CryptoRng + ?Sized,
{
    let rounds = config.primality_rounds;
    let attempts = config.max_prime_attempts;

    if !config.parallel_keygen {
        let p = random_prime(half_bits, rounds, attempts, rng)?;
        let q = random_prime(half_bits, rounds, attempts, rng)?;
        return Ok((p, q));
    }

    // Each worker owns a generator seeded from the caller's, so nothing is shared.
    let mut p_rng = StdRng::from_seed(rng.gen());
    let mut q_rng = StdRng::from_seed(rng.gen());

    let (p, q) = thread::scope(|scope| {
        let p_search = scope.spawn(move || random_prime(half_bits, rounds, attempts, &mut p_rng));
        let q_search = scope.spawn(move || random_prime(half_bits, rounds, attempts, &mut q_rng));
        (
            p_search
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic)),
            q_search
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic)),
        )
    });

    Ok((p?, q?))
}
