//! Stash Crypto Library
//!
//! Password-protected stashes are stored as envelopes:
//! base64(salt(16) || iv(12) || ciphertext || tag(16)).
//! The key is PBKDF2-HMAC-SHA256(secret, salt, 100k rounds) and the cipher is
//! AES-256-GCM. The byte layout matches envelopes written by the browser
//! client, so it must not change.

pub mod envelope;
pub mod kdf;
pub mod protect;

pub use envelope::Envelope;
pub use kdf::{PBKDF2_ITERATIONS, derive_key};
pub use protect::{StashCipher, protect, reveal};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Stored content is not a decodable envelope.
    #[error("malformed envelope")]
    MalformedEnvelope,
    /// Tag check failed: wrong secret or tampered data. Deliberately one variant.
    #[error("authentication failed")]
    AuthenticationFailed,
    #[error("encryption failed")]
    EncryptionFailed,
}

pub type Result<T> = std::result::Result<T, CryptoError>;
