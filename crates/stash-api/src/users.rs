use axum::{Extension, Json, extract::State, response::IntoResponse};

use stash_db::models::UserRow;
use stash_types::api::Claims;
use stash_types::models::User;

use crate::auth::{AppState, SCOPE_ME};
use crate::error::{ApiError, blocking};

/// Resolve the token subject to an active user holding every `scope`.
async fn current_active_user(
    state: &AppState,
    claims: Claims,
    scopes: &[&str],
) -> Result<UserRow, ApiError> {
    if scopes.iter().any(|s| !claims.scopes.iter().any(|c| c == s)) {
        return Err(ApiError::Unauthorized("Not enough permissions"));
    }

    let st = state.clone();
    let user = blocking(move || {
        st.db
            .get_user_by_email(&claims.sub)?
            .ok_or(ApiError::Unauthorized("Could not validate credentials"))
    })
    .await?;

    if !user.is_active {
        return Err(ApiError::BadRequest("Inactive user".into()));
    }
    Ok(user)
}

/// GET /users/me
pub async fn read_users_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user = current_active_user(&state, claims, &[SCOPE_ME]).await?;
    Ok(Json(User::from(&user)))
}

/// GET /admin
pub async fn admin(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user = current_active_user(&state, claims, &[SCOPE_ME]).await?;
    if !user.is_admin {
        return Err(ApiError::Unauthorized("Unauthorized"));
    }
    Ok(Json("admin"))
}
