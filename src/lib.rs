//! # rsa_filesign
//!
//! File integrity signing with textbook RSA.
//!
//! A file is hashed with a hand-written SHA-256, the digest is read as an
//! unsigned integer and raised to the private exponent modulo `n`. Verification
//! recomputes the digest and compares it with `signature^e mod n`.
//!
//! ## Quick Start
//!
//! ```rust
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use rsa_filesign::digest::hash;
//! use rsa_filesign::rsa::{generate_keypair, sign, verify};
//! use rsa_filesign::SignerConfig;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let config = SignerConfig::default().with_key_bits(512);
//! let (public_key, private_key) = generate_keypair(&config, &mut rng).unwrap().split();
//!
//! let digest = hash(b"Hello, World!");
//! let signature = sign(&digest, &private_key);
//! assert!(verify(&digest, &signature, &public_key).unwrap());
//! ```
//!
//! ## Security
//!
//! No padding scheme is applied: the digest (reduced modulo `n`) is signed
//! directly, so signatures are multiplicative. Use this for tamper detection
//! of your own files, not as a general-purpose signature scheme.

pub mod config;
pub mod digest;
pub mod error;
pub mod rsa;
pub mod util;
pub mod workflow;

pub use config::SignerConfig;
pub use digest::{hash, Digest, Sha256};
pub use error::{Error, Result};
pub use rsa::{KeyMaterial, RsaKeyPair, RsaPrivateKey, RsaPublicKey, Signature};
