// RSA Module - Main module file
// Exports key generation, signing and verification

pub mod bigint;
pub mod keygen;
pub mod signature;

pub use keygen::{
    choose_public_exponent, generate_keypair, KeyMaterial, RsaKeyPair, RsaPrivateKey,
    RsaPublicKey, MIN_KEY_BITS,
};
pub use signature::{reduce_digest, sign, verify, Signature};
