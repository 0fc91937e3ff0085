use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
    response::IntoResponse,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::info;

use stash_crypto::StashCipher;
use stash_db::Database;
use stash_db::models::UserRow;
use stash_types::api::{Claims, TokenRequest, TokenResponse};

use crate::error::{ApiError, blocking};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub cipher: StashCipher,
}

pub const SCOPE_ME: &str = "me";

const INVALID_CREDENTIALS: &str = "Could not validate credentials";

/// POST /token — OAuth2 password grant. `username` is the account email.
pub async fn login(
    State(state): State<AppState>,
    form: Result<Form<TokenRequest>, FormRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Form(req) = form?;
    let st = state.clone();
    let user = blocking(move || {
        let user = st
            .db
            .get_user_by_email(&req.username)?
            .ok_or(ApiError::Unauthorized(INVALID_CREDENTIALS))?;

        if !verify_password(&req.password, &user.hashed_password)? {
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS));
        }
        Ok(user)
    })
    .await?;

    let access_token = create_token(
        &state.jwt_secret,
        &user.email,
        &[SCOPE_ME],
        state.token_ttl_minutes,
    )?;
    info!("Issued access token for user {}", user.id);

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".into(),
    }))
}

/// Hash a password with Argon2id into a PHC string.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, hashed: &str) -> anyhow::Result<bool> {
    let parsed_hash =
        PasswordHash::new(hashed).map_err(|e| anyhow::anyhow!("Stored hash is invalid: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn create_token(
    secret: &str,
    email: &str,
    scopes: &[&str],
    ttl_minutes: i64,
) -> anyhow::Result<String> {
    let claims = Claims {
        sub: email.to_string(),
        scopes: scopes.iter().map(|s| s.to_string()).collect(),
        exp: (chrono::Utc::now() + chrono::Duration::minutes(ttl_minutes)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Create an admin account unless one with this email already exists.
/// Returns the new row, or `None` when the email was taken.
pub fn ensure_admin(db: &Database, email: &str, password: &str) -> anyhow::Result<Option<UserRow>> {
    if db.get_user_by_email(email)?.is_some() {
        return Ok(None);
    }
    let hash = hash_password(password)?;
    let user = db.create_user(email, &hash, true)?;
    info!("Bootstrapped admin user {} ({})", user.id, user.email);
    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn token_carries_email_and_scopes() {
        let token = create_token("secret", "a@example.com", &[SCOPE_ME], 30).unwrap();
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secret"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(data.claims.sub, "a@example.com");
        assert_eq!(data.claims.scopes, vec!["me".to_string()]);
    }

    #[test]
    fn ensure_admin_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let first = ensure_admin(&db, "root@example.com", "hunter22").unwrap();
        assert!(first.unwrap().is_admin);
        assert!(ensure_admin(&db, "root@example.com", "other").unwrap().is_none());
    }
}
