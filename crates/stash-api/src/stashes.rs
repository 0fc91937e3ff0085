use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{debug, info};

use stash_crypto::Envelope;
use stash_types::api::{RawContent, StashCreate, StashView};
use stash_types::models::Stash;

use crate::auth::AppState;
use crate::error::{ApiError, blocking};
use crate::middleware::bearer_token;
use crate::visibility::{RequestMode, Visibility, resolve_visibility};

#[derive(Debug, Deserialize)]
pub struct StashQuery {
    pub raw: Option<String>,
}

/// POST /upload
///
/// With `password`, the server seals the content. With `protected` alone the
/// content must already be an envelope; it is checked but not opened.
pub async fn upload(
    State(state): State<AppState>,
    payload: Result<Json<StashCreate>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    if req.content.trim().is_empty() {
        return Err(ApiError::BadRequest("Content cannot be empty".into()));
    }

    let st = state.clone();
    let row = blocking(move || {
        let password = req.password.as_deref().filter(|p| !p.is_empty());

        let (content, protected) = match password {
            Some(password) => {
                let sealed = st
                    .cipher
                    .protect(&req.content, password)
                    .map_err(anyhow::Error::from)?;
                (sealed, true)
            }
            None => {
                if req.protected && Envelope::decode(&req.content).is_err() {
                    return Err(ApiError::BadRequest(
                        "Protected content must be an encrypted envelope".into(),
                    ));
                }
                (req.content, req.protected)
            }
        };

        Ok(st.db.create_stash(&content, protected, None)?)
    })
    .await?;

    info!("Stash {} uploaded (protected: {})", row.id, row.protected);
    Ok((StatusCode::CREATED, Json(Stash::from(row))))
}

/// GET /{stash_id}
///
/// The bearer token, when present, is the decryption secret for protected
/// stashes. `?raw=1` returns `{"content": ...}` and refuses locked stashes.
pub async fn get_stash(
    State(state): State<AppState>,
    Path(stash_id): Path<String>,
    query: Result<Query<StashQuery>, QueryRejection>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let mode = RequestMode::from_query(query.raw.as_deref())?;
    let credential = bearer_token(&headers);

    let st = state.clone();
    let (stash, visibility) = blocking(move || {
        let stash: Stash = st
            .db
            .get_stash_by_id(&stash_id)?
            .ok_or(ApiError::NotFound)?
            .into();
        let visibility = resolve_visibility(&st.cipher, &stash, credential.as_deref(), mode);
        Ok((stash, visibility))
    })
    .await?;

    debug!("Stash {} requested in {:?} mode", stash.id, mode);

    match (mode, visibility) {
        (_, Visibility::Denied) | (RequestMode::Raw, Visibility::Locked(_)) => {
            Err(ApiError::Unauthorized("Invalid token"))
        }
        (RequestMode::Raw, Visibility::Resolved(content)) => {
            Ok(Json(RawContent { content }).into_response())
        }
        (RequestMode::Normal, Visibility::Resolved(content)) => Ok(Json(StashView {
            id: stash.id,
            content,
            protected: stash.protected,
            locked: false,
        })
        .into_response()),
        (RequestMode::Normal, Visibility::Locked(envelope)) => Ok(Json(StashView {
            id: stash.id,
            content: envelope,
            protected: true,
            locked: true,
        })
        .into_response()),
    }
}
