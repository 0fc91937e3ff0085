use tracing::warn;

use stash_crypto::StashCipher;
use stash_types::models::Stash;

use crate::error::ApiError;

/// How the caller wants the stash: `Raw` is the machine-readable fetch
/// (`?raw=1`) and never gets a locked placeholder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestMode {
    #[default]
    Normal,
    Raw,
}

impl RequestMode {
    pub fn from_query(raw: Option<&str>) -> Result<Self, ApiError> {
        let Some(value) = raw else {
            return Ok(Self::Normal);
        };

        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Self::Raw),
            "" | "0" | "false" | "no" | "off" => Ok(Self::Normal),
            _ => Err(ApiError::BadRequest(format!("Invalid value for raw: {value}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    /// Plaintext the caller may see.
    Resolved(String),
    /// Protected and no credential offered; carries the envelope untouched.
    Locked(String),
    Denied,
}

/// Decide what a caller sees for an existing stash.
///
/// The credential is used directly as the decryption secret. A wrong
/// credential, a tampered envelope and a malformed envelope all end in
/// `Denied`; the reason is only logged.
pub fn resolve_visibility(
    cipher: &StashCipher,
    stash: &Stash,
    credential: Option<&str>,
    mode: RequestMode,
) -> Visibility {
    if !stash.protected {
        return Visibility::Resolved(stash.content.clone());
    }

    match credential {
        Some(secret) => match cipher.reveal(&stash.content, secret) {
            Ok(plaintext) => Visibility::Resolved(plaintext),
            Err(e) => {
                warn!("Stash {} could not be revealed: {}", stash.id, e);
                Visibility::Denied
            }
        },
        None if mode == RequestMode::Raw => Visibility::Denied,
        None => Visibility::Locked(stash.content.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> StashCipher {
        StashCipher::with_iterations(4)
    }

    fn stash(content: &str, protected: bool) -> Stash {
        Stash {
            id: "abcdef".into(),
            content: content.into(),
            protected,
            owner_id: None,
        }
    }

    #[test]
    fn unprotected_passes_through_for_every_caller() {
        let s = stash("plain text", false);
        for credential in [None, Some("anything")] {
            for mode in [RequestMode::Normal, RequestMode::Raw] {
                assert_eq!(
                    resolve_visibility(&cipher(), &s, credential, mode),
                    Visibility::Resolved("plain text".into())
                );
            }
        }
    }

    #[test]
    fn correct_credential_resolves_in_both_modes() {
        let env = cipher().protect("hello world", "tok123").unwrap();
        let s = stash(&env, true);
        for mode in [RequestMode::Normal, RequestMode::Raw] {
            assert_eq!(
                resolve_visibility(&cipher(), &s, Some("tok123"), mode),
                Visibility::Resolved("hello world".into())
            );
        }
    }

    #[test]
    fn wrong_credential_is_denied() {
        let env = cipher().protect("hello world", "tok123").unwrap();
        let s = stash(&env, true);
        assert_eq!(
            resolve_visibility(&cipher(), &s, Some("wrong"), RequestMode::Normal),
            Visibility::Denied
        );
    }

    #[test]
    fn raw_without_credential_is_denied_not_locked() {
        let env = cipher().protect("hello world", "tok123").unwrap();
        assert_eq!(
            resolve_visibility(&cipher(), &stash(&env, true), None, RequestMode::Raw),
            Visibility::Denied
        );
    }

    #[test]
    fn normal_without_credential_is_locked_with_envelope() {
        let env = cipher().protect("hello world", "tok123").unwrap();
        assert_eq!(
            resolve_visibility(&cipher(), &stash(&env, true), None, RequestMode::Normal),
            Visibility::Locked(env)
        );
    }

    #[test]
    fn malformed_envelope_is_denied() {
        let s = stash("definitely not an envelope", true);
        assert_eq!(
            resolve_visibility(&cipher(), &s, Some("tok123"), RequestMode::Raw),
            Visibility::Denied
        );
    }

    #[test]
    fn raw_query_parsing() {
        assert_eq!(RequestMode::from_query(None).unwrap(), RequestMode::Normal);
        assert_eq!(RequestMode::from_query(Some("1")).unwrap(), RequestMode::Raw);
        assert_eq!(RequestMode::from_query(Some("True")).unwrap(), RequestMode::Raw);
        assert_eq!(RequestMode::from_query(Some("0")).unwrap(), RequestMode::Normal);
        assert!(RequestMode::from_query(Some("maybe")).is_err());
    }
}
