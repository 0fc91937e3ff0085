use serde::{Deserialize, Serialize};

// -- JWT Claims --

/// Login token claims. `sub` is the user's email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub exp: usize,
}

// -- Auth --

/// OAuth2 password-grant form body for `POST /token`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

// -- Stashes --

/// Upload body. Unknown fields such as the browser client's `owner_id` are
/// ignored; uploads are always anonymous.
#[derive(Debug, Deserialize)]
pub struct StashCreate {
    pub content: String,
    #[serde(default)]
    pub protected: bool,
    /// When set, the server seals `content` itself instead of trusting a
    /// client-built envelope.
    #[serde(default)]
    pub password: Option<String>,
}

/// Response to `GET /{id}` in normal mode. `locked` means `content` is
/// still the envelope and the reader should be prompted for a secret.
#[derive(Debug, Serialize, Deserialize)]
pub struct StashView {
    pub id: String,
    pub content: String,
    pub protected: bool,
    pub locked: bool,
}

/// Response to `GET /{id}?raw=1`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RawContent {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
