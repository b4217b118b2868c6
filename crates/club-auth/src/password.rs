//! Password hashes for member logins.
//!
//! Hashes are stored as `pbkdf2-sha256$<rounds>$<salt>$<key>`
//! with salt and key hex encoded.

use sha2::Sha256;

const SCHEME: &str = "pbkdf2-sha256";
const ROUNDS: u32 = 100_000;
const KEY_LEN: usize = 32;

/// Hash a password with a fresh random salt
pub fn hash(password: &str) -> String {
    hash_with_rounds(password, ROUNDS)
}

pub fn hash_with_rounds(password: &str, rounds: u32) -> String {
    let salt: [u8; 16] = rand::random();
    let key = derive(password, &salt, rounds);
    format!(
        "{}${}${}${}",
        SCHEME,
        rounds,
        hex::encode(salt),
        hex::encode(key)
    )
}

/// Check a password against a stored hash.
/// Malformed hashes never verify.
pub fn verify(password: &str, stored: &str) -> bool {
    let parts: Vec<&str> = stored.split('$').collect();
    let [scheme, rounds, salt, key] = parts[..] else {
        return false;
    };
    if scheme != SCHEME {
        return false;
    }
    let (Ok(rounds), Ok(salt), Ok(key)) = (rounds.parse::<u32>(), hex::decode(salt), hex::decode(key))
    else {
        return false;
    };
    if rounds == 0 || key.len() != KEY_LEN {
        return false;
    }

    let derived = derive(password, &salt, rounds);
    // Compare without short circuit
    derived
        .iter()
        .zip(key.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

fn derive(password: &str, salt: &[u8], rounds: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, rounds, &mut key);
    key
}
