use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use crate::envelope::SALT_LEN;

/// Round count for every stored envelope. Changing it orphans existing stashes.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

pub const KEY_LEN: usize = 32;

/// Derive a 256-bit AES key from a secret and the envelope salt.
pub fn derive_key(secret: &str, salt: &[u8; SALT_LEN]) -> [u8; KEY_LEN] {
    derive_key_with_iterations(secret, salt, PBKDF2_ITERATIONS)
}

pub(crate) fn derive_key_with_iterations(
    secret: &str,
    salt: &[u8; SALT_LEN],
    iterations: u32,
) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(secret.as_bytes(), salt, iterations, &mut key);
    key
}
