// SPDX-License-Identifier: Apache-2.0

//! Password digests and opaque tokens.
//!
//! Encoded password format: `sha256$<salt>$<hex digest of salt:password>`.
//! Salts and tokens come from `rand`'s thread-local CSPRNG, which is seeded
//! from the operating system.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

pub const PASSWORD_SCHEME: &str = "sha256";

/// 256 random bits, url-safe encoded. Used for session ids.
#[must_use]
pub fn random_token() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// 96 random bits, url-safe encoded.
#[must_use]
pub fn random_salt() -> String {
    let bytes: [u8; 12] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

#[must_use]
pub fn hash_password(salt: &str, password: &str) -> String {
    format!("{PASSWORD_SCHEME}${salt}${}", digest(salt, password))
}

#[must_use]
pub fn verify_password(encoded: &str, password: &str) -> bool {
    let mut parts = encoded.splitn(3, '$');
    let (Some(scheme), Some(salt), Some(expected)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != PASSWORD_SCHEME {
        return false;
    }
    constant_time_eq(digest(salt, password).as_bytes(), expected.as_bytes())
}

fn digest(salt: &str, password: &str) -> String {
    crate::sha256_hex(format!("{salt}:{password}").as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0_u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
