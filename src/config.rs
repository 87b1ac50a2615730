// Signer configuration
// Tunables for key generation and signature file placement

/// Default modulus size in bits
pub const DEFAULT_KEY_BITS: u32 = 2048;

/// Conventional public exponent (prime, so coprimality with phi rarely fails)
pub const DEFAULT_PUBLIC_EXPONENT: u64 = 65537;

/// Miller-Rabin rounds; each round bounds the error by 1/4, so 50 rounds give 2^-100
pub const DEFAULT_PRIMALITY_ROUNDS: u32 = 50;

pub const DEFAULT_MAX_PRIME_ATTEMPTS: u32 = 100_000;
pub const DEFAULT_MAX_EXPONENT_ATTEMPTS: u32 = 1_000;
pub const DEFAULT_SIGNATURE_EXTENSION: &str = "sig";

/// Configuration shared by key generation, signing and verification
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignerConfig {
    pub key_bits: u32,
    pub public_exponent: u64,
    pub primality_rounds: u32,
    /// Candidates drawn per prime before giving up
    pub max_prime_attempts: u32,
    /// Increments of `e` tried before giving up on coprimality
    pub max_exponent_attempts: u32,
    /// Appended to the signed file's name to locate its signature
    pub signature_extension: String,
    /// Search for `p` and `q` on two threads
    pub parallel_keygen: bool,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            key_bits: DEFAULT_KEY_BITS,
            public_exponent: DEFAULT_PUBLIC_EXPONENT,
            primality_rounds: DEFAULT_PRIMALITY_ROUNDS,
            max_prime_attempts: DEFAULT_MAX_PRIME_ATTEMPTS,
            max_exponent_attempts: DEFAULT_MAX_EXPONENT_ATTEMPTS,
            signature_extension: DEFAULT_SIGNATURE_EXTENSION.to_string(),
            parallel_keygen: false,
        }
    }
}

impl SignerConfig {
    pub fn with_key_bits(mut self, bits: u32) -> Self {
        self.key_bits = bits;
        self
    }

    pub fn with_public_exponent(mut self, e: u64) -> Self {
        self.public_exponent = e;
        self
    }

    pub fn with_primality_rounds(mut self, rounds: u32) -> Self {
        self.primality_rounds = rounds;
        self
    }

    pub fn with_max_prime_attempts(mut self, attempts: u32) -> Self {
        self.max_prime_attempts = attempts;
        self
    }

    pub fn with_max_exponent_attempts(mut self, attempts: u32) -> Self {
        self.max_exponent_attempts = attempts;
        self
    }

    pub fn with_signature_extension(mut self, extension: impl Into<String>) -> Self {
        self.signature_extension = extension.into();
        self
    }

    pub fn with_parallel_keygen(mut self, parallel: bool) -> Self {
        self.parallel_keygen = parallel;
        self
    }
}
