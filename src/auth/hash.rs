//! Client-side password digest
//!
//! Obscures the plaintext password in transit. The server re-hashes
//! whatever it receives, so this is an obfuscation step, not a
//! security boundary.

use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Fixed framing applied before digesting; the server's login path
/// expects passwords pre-hashed with exactly this salt scheme.
fn salted(password: &str) -> String {
    format!("ems_{password}_salt")
}

/// A pluggable digest over the salted password.
pub trait PasswordDigest {
    fn digest(&self, input: &str) -> String;
}

/// Primary digest.
pub struct Sha256Digest;

impl PasswordDigest for Sha256Digest {
    fn digest(&self, input: &str) -> String {
        hex_string(Sha256::digest(input.as_bytes()).as_slice())
    }
}

/// Fallback for environments where the primary primitive is
/// unavailable. The server accepts either form.
pub struct Sha1Digest;

impl PasswordDigest for Sha1Digest {
    fn digest(&self, input: &str) -> String {
        hex_string(Sha1::digest(input.as_bytes()).as_slice())
    }
}

/// Digest a password for transmission using the given strategy.
pub fn hash_password_with(digest: &dyn PasswordDigest, password: &str) -> String {
    digest.digest(&salted(password))
}

/// Digest a password with the primary strategy.
pub fn hash_password(password: &str) -> String {
    hash_password_with(&Sha256Digest, password)
}

fn hex_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}
