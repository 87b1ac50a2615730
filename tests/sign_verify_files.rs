//! End-to-end signing of files on disk: generate keys, sign, verify, and
//! check that tampering with the file or the stored signature is detected.

use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use rsa_filesign::workflow::{generate_keys, sign_file, verify_file, verify_file_with};
use rsa_filesign::{Error, SignerConfig};

struct Fixture {
    dir: TempDir,
    config: SignerConfig,
}

impl Fixture {
    fn new(bits: u32) -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            config: SignerConfig::default()
                .with_key_bits(bits)
                .with_primality_rounds(20),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn keys(&self, prefix: &str, seed: u64) -> (PathBuf, PathBuf) {
        let private_key = self.path(&format!("{}-private.key", prefix));
        let public_key = self.path(&format!("{}-public.key", prefix));
        let mut rng = StdRng::seed_from_u64(seed);
        generate_keys(&self.config, &private_key, &public_key, &mut rng).unwrap();
        (private_key, public_key)
    }

    fn document(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).unwrap();
        path
    }
}

fn flip_byte(path: &Path, index: usize) {
    let mut bytes = fs::read(path).unwrap();
    bytes[index] ^= 0x01;
    fs::write(path, bytes).unwrap();
}

#[test]
fn signed_file_verifies() {
    let fixture = Fixture::new(512);
    let (private_key, public_key) = fixture.keys("a", 100);
    let document = fixture.document("report.pdf", b"%PDF-1.7 quarterly numbers");

    let signature = sign_file(&document, &private_key, &fixture.config).unwrap();
    assert_eq!(signature, fixture.path("report.pdf.sig"));
    assert!(signature.exists());

    assert!(verify_file(&document, &public_key, &fixture.config).unwrap());
    // Repeated verification gives the same answer
    assert!(verify_file(&document, &public_key, &fixture.config).unwrap());
}

#[test]
fn empty_file_can_be_signed() {
    let fixture = Fixture::new(256);
    let (private_key, public_key) = fixture.keys("a", 101);
    let document = fixture.document("empty", b"");

    sign_file(&document, &private_key, &fixture.config).unwrap();
    assert!(verify_file(&document, &public_key, &fixture.config).unwrap());
}

#[test]
fn small_modulus_round_trip() {
    // A 64-bit modulus is far below the 256-bit digest, so both sides reduce it
    let fixture = Fixture::new(64);
    let (private_key, public_key) = fixture.keys("tiny", 102);

    for (i, contents) in [&b"alpha"[..], b"beta", b"gamma delta"].iter().enumerate() {
        let document = fixture.document(&format!("doc{}.txt", i), contents);
        sign_file(&document, &private_key, &fixture.config).unwrap();
        assert!(verify_file(&document, &public_key, &fixture.config).unwrap());
    }
}

#[test]
fn modified_file_is_rejected() {
    let fixture = Fixture::new(512);
    let (private_key, public_key) = fixture.keys("a", 103);
    let contents = b"pay 100 to alice".to_vec();
    let document = fixture.document("order.txt", &contents);
    sign_file(&document, &private_key, &fixture.config).unwrap();

    for index in [0, contents.len() / 2, contents.len() - 1] {
        flip_byte(&document, index);
        assert!(
            !verify_file(&document, &public_key, &fixture.config).unwrap(),
            "flipped byte {} went unnoticed",
            index
        );
        // Restore for the next position
        flip_byte(&document, index);
    }
    assert!(verify_file(&document, &public_key, &fixture.config).unwrap());
}

#[test]
fn modified_signature_is_rejected() {
    let fixture = Fixture::new(512);
    let (private_key, public_key) = fixture.keys("a", 104);
    let document = fixture.document("notes.md", b"# Notes");
    let signature = sign_file(&document, &private_key, &fixture.config).unwrap();

    // Last byte of the magnitude
    let len = fs::metadata(&signature).unwrap().len() as usize;
    flip_byte(&signature, len - 1);
    assert!(!verify_file(&document, &public_key, &fixture.config).unwrap());
}

#[test]
fn corrupted_signature_length_is_malformed() {
    let fixture = Fixture::new(256);
    let (private_key, public_key) = fixture.keys("a", 105);
    let document = fixture.document("data.bin", &[1, 2, 3]);
    let signature = sign_file(&document, &private_key, &fixture.config).unwrap();

    // Length prefix now disagrees with the payload
    flip_byte(&signature, 3);
    let result = verify_file(&document, &public_key, &fixture.config);
    assert!(matches!(result, Err(Error::MalformedSignatureFile(_))));
}

#[test]
fn other_key_pair_is_rejected() {
    let fixture = Fixture::new(512);
    let (private_a, _) = fixture.keys("a", 106);
    let (_, public_b) = fixture.keys("b", 107);
    let document = fixture.document("contract.txt", b"terms and conditions");
    sign_file(&document, &private_a, &fixture.config).unwrap();

    match verify_file(&document, &public_b, &fixture.config) {
        Ok(valid) => assert!(!valid),
        // The signature may not even fit under the other modulus
        Err(e) => assert!(matches!(e, Error::InvalidSignature)),
    }
}

#[test]
fn explicit_signature_path() {
    let fixture = Fixture::new(256);
    let (private_key, public_key) = fixture.keys("a", 108);
    let document = fixture.document("image.png", &[0x89, b'P', b'N', b'G']);
    let signature = sign_file(&document, &private_key, &fixture.config).unwrap();

    let moved = fixture.path("detached.signature");
    fs::rename(&signature, &moved).unwrap();

    assert!(verify_file_with(&document, &moved, &public_key).unwrap());
    assert!(matches!(
        verify_file(&document, &public_key, &fixture.config),
        Err(Error::Io { .. })
    ));
}

#[test]
fn custom_signature_extension() {
    let mut fixture = Fixture::new(256);
    fixture.config = fixture.config.clone().with_signature_extension("rsasig");
    let (private_key, public_key) = fixture.keys("a", 109);
    let document = fixture.document("log.txt", b"entry");

    let signature = sign_file(&document, &private_key, &fixture.config).unwrap();
    assert_eq!(signature, fixture.path("log.txt.rsasig"));
    assert!(verify_file(&document, &public_key, &fixture.config).unwrap());
}

#[test]
fn key_file_errors() {
    let fixture = Fixture::new(256);
    let document = fixture.document("doc.txt", b"text");

    let missing = fixture.path("missing.key");
    assert!(matches!(
        sign_file(&document, &missing, &fixture.config),
        Err(Error::Io { .. })
    ));

    let garbage = fixture.document("garbage.key", b"not a key");
    assert!(matches!(
        sign_file(&document, &garbage, &fixture.config),
        Err(Error::MalformedKeyFile(_))
    ));
}

#[test]
fn key_files_hold_only_modulus_and_exponent() {
    let fixture = Fixture::new(512);
    let (private_key, public_key) = fixture.keys("a", 110);

    let private = rsa_filesign::util::decode_key(&fs::read(&private_key).unwrap()).unwrap();
    let public = rsa_filesign::util::decode_key(&fs::read(&public_key).unwrap()).unwrap();

    assert_eq!(private.modulus, public.modulus);
    assert_eq!(public.exponent, num_bigint::BigUint::from(65537u32));
    assert_ne!(private.exponent, public.exponent);
}
