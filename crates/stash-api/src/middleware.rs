use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use stash_types::api::Claims;

use crate::auth::AppState;
use crate::error::ApiError;

/// The bearer token supplied with a request, if any. An empty token counts
/// as no token.
///
/// The token is everything after the first space, unchanged: it doubles as
/// the decryption secret for protected stashes. Header bytes are read as
/// UTF-8, falling back to Latin-1, so non-ASCII secrets still arrive intact.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = decode_header_bytes(headers.get(header::AUTHORIZATION)?.as_bytes());
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

fn decode_header_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Extract and validate JWT from Authorization header.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())
        .ok_or(ApiError::Unauthorized("Not authenticated"))?;

    let token_data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized("Could not validate credentials"))?;

    req.extensions_mut().insert(token_data.claims);
    Ok(next.run(req).await)
}
