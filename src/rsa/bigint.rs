// RSA Big Integer Operations
// Thin facade over num-bigint for the arithmetic RSA needs

use num_bigint::{BigInt, BigUint, RandBigInt, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, Rng};

use crate::error::{Error, Result};

/// RSA Big Integer type alias
pub type RsaBigInt = BigUint;

/// Primes used to discard most composite candidates before Miller-Rabin
const SMALL_PRIMES: [u32; 54] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

/// Create a big integer from u64
pub fn from_u64(n: u64) -> RsaBigInt {
    RsaBigInt::from(n)
}

/// Create a big integer from bytes (big-endian, unsigned)
pub fn from_bytes(bytes: &[u8]) -> RsaBigInt {
    RsaBigInt::from_bytes_be(bytes)
}

/// Convert big integer to its minimal big-endian magnitude (zero encodes as `[0]`)
pub fn to_bytes(n: &RsaBigInt) -> Vec<u8> {
    n.to_bytes_be()
}

/// Modular exponentiation: base^exp mod modulus
///
/// `modulus` must be non-zero.
pub fn mod_pow(base: &RsaBigInt, exp: &RsaBigInt, modulus: &RsaBigInt) -> RsaBigInt {
    if modulus.is_one() {
        return RsaBigInt::zero();
    }
    base.modpow(exp, modulus)
}

/// Extended Euclidean Algorithm
/// Returns (gcd, x, y) such that a*x + b*y = gcd = gcd(a, b)
pub fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    let (mut old_t, mut t) = (BigInt::zero(), BigInt::one());

    while !r.is_zero() {
        let quotient = &old_r / &r;

        let next_r = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, next_r);

        let next_s = &old_s - &quotient * &s;
        old_s = std::mem::replace(&mut s, next_s);

        let next_t = &old_t - &quotient * &t;
        old_t = std::mem::replace(&mut t, next_t);
    }

    (old_r, old_s, old_t)
}

/// Compute modular inverse: a^(-1) mod m
/// Returns None if the inverse doesn't exist
pub fn mod_inverse(a: &RsaBigInt, m: &RsaBigInt) -> Option<RsaBigInt> {
    if m.is_zero() {
        return None;
    }

    let a = BigInt::from_biguint(Sign::Plus, a.clone());
    let m = BigInt::from_biguint(Sign::Plus, m.clone());
    let (gcd, x, _) = extended_gcd(&a, &m);

    if !gcd.is_one() {
        return None;
    }

    // mod_floor keeps the result in [0, m) even when x is negative
    x.mod_floor(&m).to_biguint()
}

/// Greatest common divisor
pub fn gcd(a: &RsaBigInt, b: &RsaBigInt) -> RsaBigInt {
    a.gcd(b)
}

/// Uniform random integer in `[low, high)`
pub fn random_in_range<R>(rng: &mut R, low: &RsaBigInt, high: &RsaBigInt) -> RsaBigInt
where
    R: Rng + CryptoRng + ?Sized,
{
    rng.gen_biguint_range(low, high)
}

/// Miller-Rabin primality test preceded by trial division
/// Returns true if n is probably prime; a composite survives with probability at most 4^-rounds
pub fn is_probable_prime<R>(n: &RsaBigInt, rounds: u32, rng: &mut R) -> bool
where
    R: Rng + CryptoRng + ?Sized,
{
    if n < &RsaBigInt::from(2u8) {
        return false;
    }

    for &p in SMALL_PRIMES.iter() {
        let p = RsaBigInt::from(p);
        if n == &p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }

    // Write n-1 as d * 2^s with d odd
    let n_minus_one = n - 1u8;
    let mut d = n_minus_one.clone();
    let mut s = 0u32;
    while d.is_even() {
        d >>= 1;
        s += 1;
    }

    let two = RsaBigInt::from(2u8);
    let n_minus_two = n - 2u8;

    'witness: for _ in 0..rounds {
        // Random witness a in [2, n-2)
        let a = random_in_range(rng, &two, &n_minus_two);
        let mut x = mod_pow(&a, &d, n);

        if x.is_one() || x == n_minus_one {
            continue;
        }

        for _ in 1..s {
            x = mod_pow(&x, &two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }

        // Composite
        return false;
    }

    // Probably prime
    true
}

/// Generate a random probable prime of exactly `bit_length` bits
///
/// Gives up with `PrimeGenerationExhausted` after `max_attempts` candidates.
pub fn random_prime<R>(
    bit_length: u32,
    rounds: u32,
    max_attempts: u32,
    rng: &mut R,
) -> Result<RsaBigInt>
where
    R: Rng + CryptoRng + ?Sized,
{
    let lower = RsaBigInt::one() << (bit_length as usize - 1);
    let upper = RsaBigInt::one() << bit_length as usize;

    for _ in 0..max_attempts {
        let mut candidate = random_in_range(rng, &lower, &upper);

        // Make it odd
        if candidate.is_even() {
            candidate += 1u8;
        }

        if is_probable_prime(&candidate, rounds, rng) {
            return Ok(candidate);
        }
    }

    Err(Error::PrimeGenerationExhausted {
        bits: bit_length,
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    #[test]
    fn test_mod_pow() {
        // 3^5 mod 7 = 243 mod 7 = 5
        let result = mod_pow(&from_u64(3), &from_u64(5), &from_u64(7));
        assert_eq!(result, from_u64(5));
        assert_eq!(mod_pow(&from_u64(3), &from_u64(5), &from_u64(1)), from_u64(0));
    }

    #[test]
    fn test_mod_inverse() {
        // 3 * 5 = 15 ≡ 1 mod 7, so inverse of 3 mod 7 is 5
        let a = from_u64(3);
        let m = from_u64(7);
        let inv = mod_inverse(&a, &m).unwrap();
        assert_eq!(inv, from_u64(5));
        assert_eq!((a * inv) % m, from_u64(1));
    }

    #[test]
    fn test_mod_inverse_negative_coefficient() {
        // 17 * d ≡ 1 (mod 3120): the Bezout coefficient comes out negative
        let e = from_u64(17);
        let phi = from_u64(3120);
        let d = mod_inverse(&e, &phi).unwrap();
        assert_eq!(d, from_u64(2753));
        assert!((&e * &d % &phi).is_one());
    }

    #[test]
    fn test_mod_inverse_missing() {
        assert_eq!(mod_inverse(&from_u64(6), &from_u64(9)), None);
        assert_eq!(mod_inverse(&from_u64(3), &from_u64(0)), None);
    }

    #[test]
    fn test_extended_gcd_identity() {
        let a = BigInt::from(240);
        let b = BigInt::from(46);
        let (g, x, y) = extended_gcd(&a, &b);
        assert_eq!(g, BigInt::from(2));
        assert_eq!(&a * &x + &b * &y, g);
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(&from_u64(48), &from_u64(18)), from_u64(6));
        assert_eq!(gcd(&from_u64(65537), &from_u64(3120)), from_u64(1));
    }

    #[test]
    fn test_is_probable_prime() {
        let mut rng = rng();
        for p in [2u64, 3, 5, 7, 251, 257, 65537, 2_147_483_647, 4_294_967_291] {
            assert!(is_probable_prime(&from_u64(p), 20, &mut rng), "{} is prime", p);
        }
        for c in [0u64, 1, 4, 9, 255, 65535, 561, 1_105, 4_294_967_297] {
            assert!(!is_probable_prime(&from_u64(c), 20, &mut rng), "{} is composite", c);
        }
    }

    #[test]
    fn test_random_in_range() {
        let mut rng = rng();
        let low = from_u64(10);
        let high = from_u64(20);
        for _ in 0..100 {
            let value = random_in_range(&mut rng, &low, &high);
            assert!(value >= low && value < high);
        }
    }

    #[test]
    fn test_random_prime_bit_length() {
        let mut rng = rng();
        for bits in [16u32, 32, 128] {
            let prime = random_prime(bits, 20, 10_000, &mut rng).unwrap();
            assert_eq!(prime.bits(), bits as u64);
            assert!(prime.is_odd());
        }
    }

    #[test]
    fn test_random_prime_exhausted() {
        let mut rng = rng();
        // Zero attempts can never succeed
        let result = random_prime(64, 20, 0, &mut rng);
        assert!(matches!(
            result,
            Err(Error::PrimeGenerationExhausted { bits: 64, attempts: 0 })
        ));
    }
}
