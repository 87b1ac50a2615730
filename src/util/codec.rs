// Persistence Codec
// Key and signature files: each integer is a u32 big-endian byte count
// followed by the unsigned big-endian magnitude. No sign byte is written.

use crate::error::{Error, Result};
use crate::rsa::bigint::{from_bytes, to_bytes, RsaBigInt};
use crate::rsa::{KeyMaterial, Signature};

const LEN_PREFIX: usize = 4;

fn put_field(out: &mut Vec<u8>, value: &RsaBigInt) {
    let bytes = to_bytes(value);
    debug_assert!(bytes.len() <= u32::MAX as usize);
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(&bytes);
}

/// Split one length-prefixed field off the front of `input`
fn take_field<'a>(input: &mut &'a [u8], name: &str) -> std::result::Result<&'a [u8], String> {
    if input.len() < LEN_PREFIX {
        return Err(format!(
            "truncated {} length: need {} bytes, have {}",
            name,
            LEN_PREFIX,
            input.len()
        ));
    }
    let (prefix, rest) = input.split_at(LEN_PREFIX);
    let len = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;

    if len == 0 {
        return Err(format!("{} has zero length", name));
    }
    if rest.len() < len {
        return Err(format!(
            "truncated {}: declared {} bytes, have {}",
            name,
            len,
            rest.len()
        ));
    }

    let (field, remaining) = rest.split_at(len);
    *input = remaining;
    Ok(field)
}

fn expect_end(input: &[u8]) -> std::result::Result<(), String> {
    if input.is_empty() {
        Ok(())
    } else {
        Err(format!("{} unexpected trailing bytes", input.len()))
    }
}

/// Encode a modulus/exponent pair in key file layout
pub fn encode_key(key: &KeyMaterial) -> Vec<u8> {
    let mut out = Vec::new();
    put_field(&mut out, &key.modulus);
    put_field(&mut out, &key.exponent);
    out
}

/// Decode a key file, rejecting truncated, over-length or out-of-range contents
pub fn decode_key(bytes: &[u8]) -> Result<KeyMaterial> {
    let mut input = bytes;
    let modulus = take_field(&mut input, "modulus").map_err(Error::MalformedKeyFile)?;
    let exponent = take_field(&mut input, "exponent").map_err(Error::MalformedKeyFile)?;
    expect_end(input).map_err(Error::MalformedKeyFile)?;

    let key = KeyMaterial::new(from_bytes(modulus), from_bytes(exponent));
    key.validate()?;
    Ok(key)
}

/// Encode a signature in signature file layout
pub fn encode_signature(signature: &Signature) -> Vec<u8> {
    let mut out = Vec::new();
    put_field(&mut out, signature.value());
    out
}

/// Decode a signature file, rejecting truncated or over-length contents
pub fn decode_signature(bytes: &[u8]) -> Result<Signature> {
    let mut input = bytes;
    let value = take_field(&mut input, "signature").map_err(Error::MalformedSignatureFile)?;
    expect_end(input).map_err(Error::MalformedSignatureFile)?;
    Ok(Signature::new(from_bytes(value)))
}
