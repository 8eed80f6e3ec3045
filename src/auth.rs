//! Salted password hashing for the credential store.
//!
//! Credentials are stored as a per-account random salt plus a fixed-cost
//! Argon2 digest derived from it. Lookup failure and digest mismatch are
//! indistinguishable to callers so account existence does not leak.

use argon2::Argon2;
use constant_time_eq::constant_time_eq;
use rand::{RngCore, rngs::OsRng};

/// Maximum length in characters for usernames and passwords.
pub const MAX_CREDENTIAL_LEN: usize = 20;
/// Salt length in bytes.
pub const SALT_LEN: usize = 16;
/// Derived digest length in bytes.
pub const HASH_LEN: usize = 32;

/// Generates a fresh random salt from the OS CSPRNG.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derives the stored digest for `password` under `salt`.
///
/// Deterministic for a fixed (password, salt) pair; the cost parameters are
/// the crate defaults and never vary per account.
pub fn derive_hash(password: &str, salt: &[u8]) -> Result<[u8; HASH_LEN], argon2::Error> {
    let mut out = [0u8; HASH_LEN];
    Argon2::default().hash_password_into(password.as_bytes(), salt, &mut out)?;
    Ok(out)
}

/// Checks `password` against a stored digest in constant time.
pub fn verify(password: &str, salt: &[u8], stored: &[u8]) -> Result<bool, argon2::Error> {
    let derived = derive_hash(password, salt)?;
    Ok(constant_time_eq(&derived, stored))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_and_verify_roundtrip() {
        let salt = generate_salt();
        let hash = derive_hash("hunter2", &salt).expect("derive");
        assert!(verify("hunter2", &salt, &hash).expect("verify"));
        assert!(!verify("hunter3", &salt, &hash).expect("verify"));
    }

    #[test]
    fn salts_are_unique_and_change_the_digest() {
        let s1 = generate_salt();
        let s2 = generate_salt();
        assert_ne!(s1, s2);
        let h1 = derive_hash("same-password", &s1).expect("derive");
        let h2 = derive_hash("same-password", &s2).expect("derive");
        assert_ne!(h1, h2);
    }
}
