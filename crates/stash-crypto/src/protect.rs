use aes_gcm::{
    Aes256Gcm, Key, Nonce, Tag,
    aead::{AeadInPlace, KeyInit, OsRng, rand_core::RngCore},
};

use crate::envelope::{Envelope, IV_LEN, SALT_LEN, TAG_LEN};
use crate::kdf::{PBKDF2_ITERATIONS, derive_key_with_iterations};
use crate::{CryptoError, Result};

/// Seals and opens stash content. Stateless apart from the KDF round count,
/// so a single value can be shared across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StashCipher {
    iterations: u32,
}

impl Default for StashCipher {
    fn default() -> Self {
        Self {
            iterations: PBKDF2_ITERATIONS,
        }
    }
}

impl StashCipher {
    /// Envelopes are only readable by a cipher with the same round count
    /// they were sealed with. Stored stashes always use the default.
    pub fn with_iterations(iterations: u32) -> Self {
        Self { iterations }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Encrypt `plaintext` under a key derived from `secret` and return the
    /// base64 envelope. Salt and IV are fresh per call.
    pub fn protect(&self, plaintext: &str, secret: &str) -> Result<String> {
        let mut salt = [0u8; SALT_LEN];
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut iv);

        let key = derive_key_with_iterations(secret, &salt, self.iterations);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));

        let mut ciphertext = plaintext.as_bytes().to_vec();
        let tag = cipher
            .encrypt_in_place_detached(Nonce::from_slice(&iv), b"", &mut ciphertext)
            .map_err(|_| CryptoError::EncryptionFailed)?;

        let mut tag_bytes = [0u8; TAG_LEN];
        tag_bytes.copy_from_slice(&tag);

        Ok(Envelope {
            salt,
            iv,
            ciphertext,
            tag: tag_bytes,
        }
        .encode())
    }

    /// Decode, re-derive the key from the stored salt, and verify + decrypt.
    pub fn reveal(&self, envelope_text: &str, secret: &str) -> Result<String> {
        let envelope = Envelope::decode(envelope_text)?;

        let key = derive_key_with_iterations(secret, &envelope.salt, self.iterations);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));

        let mut buf = envelope.ciphertext;
        cipher
            .decrypt_in_place_detached(
                Nonce::from_slice(&envelope.iv),
                b"",
                &mut buf,
                Tag::from_slice(&envelope.tag),
            )
            .map_err(|_| CryptoError::AuthenticationFailed)?;

        String::from_utf8(buf).map_err(|_| CryptoError::MalformedEnvelope)
    }
}

pub fn protect(plaintext: &str, secret: &str) -> Result<String> {
    StashCipher::default().protect(plaintext, secret)
}

pub fn reveal(envelope_text: &str, secret: &str) -> Result<String> {
    StashCipher::default().reveal(envelope_text, secret)
}
