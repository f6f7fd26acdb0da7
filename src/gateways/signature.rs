//! Canonical plaintext and HMAC-SHA256 signatures for gateway messages.
//!
//! The gateway rebuilds the same plaintext on its side, so field selection
//! and ordering here are part of the wire contract.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Prefix shared by every field that takes part in a signature.
pub const SIGNABLE_PREFIX: &str = "x_";

/// A message whose fields can be signed.
///
/// Implementors list every field with its external (wire) name. The
/// `signature` field itself is listed too; it is dropped by prefix.
pub trait Signable {
    fn fields(&self) -> Vec<(&'static str, &str)>;

    fn canonical_plaintext(&self) -> String {
        encode_canonical_plaintext(&self.fields())
    }
}

pub fn encode_canonical_plaintext(fields: &[(&str, &str)]) -> String {
    let mut signable: Vec<&(&str, &str)> = fields
        .iter()
        .filter(|(name, value)| name.starts_with(SIGNABLE_PREFIX) && !value.is_empty())
        .collect();
    signable.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    let mut plaintext = String::new();
    for (name, value) in signable {
        plaintext.push_str(name);
        plaintext.push_str(value);
    }
    plaintext
}

/// Lowercase hex HMAC-SHA256 of `plaintext` under `key`.
pub fn sign(plaintext: &str, key: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(plaintext.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Checks `signature_hex` against `plaintext` in constant time.
pub fn verify(plaintext: &str, signature_hex: &str, key: &str) -> bool {
    let Ok(provided) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(key.as_bytes()) else {
        return false;
    };
    mac.update(plaintext.as_bytes());
    mac.verify_slice(&provided).is_ok()
}

pub fn sign_message<T: Signable + ?Sized>(message: &T, key: &str) -> String {
    sign(&message.canonical_plaintext(), key)
}
