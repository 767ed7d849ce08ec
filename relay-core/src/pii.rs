//! Customer identifier hashing
//!
//! The conversion API matches users on SHA-256 digests of normalised
//! identifiers. Raw email addresses and phone numbers never leave this
//! module.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `data`
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Trimmed, lowercased email
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Digits only
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Hash an email; `None` when absent or empty after normalisation
pub fn hash_email(email: Option<&str>) -> Option<String> {
    digest_normalized(email?, normalize_email)
}

/// Hash a phone number; `None` when absent or without digits
pub fn hash_phone(phone: Option<&str>) -> Option<String> {
    digest_normalized(phone?, normalize_phone)
}

fn digest_normalized(raw: &str, normalize: fn(&str) -> String) -> Option<String> {
    let normalized = normalize(raw);
    if normalized.is_empty() {
        return None;
    }
    Some(sha256_hex(normalized.as_bytes()))
}
