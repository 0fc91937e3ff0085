use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::{CryptoError, Result};

pub const SALT_LEN: usize = 16;
pub const IV_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

const HEADER_LEN: usize = SALT_LEN + IV_LEN;
const MIN_LEN: usize = HEADER_LEN + TAG_LEN;

/// Decoded form of a protected stash's `content` column.
///
/// Wire layout (after base64): `salt[0..16] || iv[16..28] || ciphertext || tag[-16..]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub salt: [u8; SALT_LEN],
    pub iv: [u8; IV_LEN],
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_LEN],
}

impl Envelope {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(MIN_LEN + self.ciphertext.len());
        buf.extend_from_slice(&self.salt);
        buf.extend_from_slice(&self.iv);
        buf.extend_from_slice(&self.ciphertext);
        buf.extend_from_slice(&self.tag);
        buf
    }

    /// Split a raw envelope buffer positionally. Anything shorter than
    /// salt + iv + tag cannot be an envelope; an empty ciphertext is allowed.
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        if buf.len() < MIN_LEN {
            return Err(CryptoError::MalformedEnvelope);
        }

        let (salt, rest) = buf.split_at(SALT_LEN);
        let (iv, rest) = rest.split_at(IV_LEN);
        let (ciphertext, tag) = rest.split_at(rest.len() - TAG_LEN);

        Ok(Self {
            salt: salt.try_into().map_err(|_| CryptoError::MalformedEnvelope)?,
            iv: iv.try_into().map_err(|_| CryptoError::MalformedEnvelope)?,
            ciphertext: ciphertext.to_vec(),
            tag: tag.try_into().map_err(|_| CryptoError::MalformedEnvelope)?,
        })
    }

    pub fn encode(&self) -> String {
        BASE64.encode(self.to_bytes())
    }

    pub fn decode(text: &str) -> Result<Self> {
        let buf = BASE64
            .decode(text.trim())
            .map_err(|_| CryptoError::MalformedEnvelope)?;
        Self::from_bytes(&buf)
    }
}
