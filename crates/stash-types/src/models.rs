use serde::{Deserialize, Serialize};

/// A stored paste. When `protected` is set, `content` is a base64 envelope
/// and never plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stash {
    pub id: String,
    pub content: String,
    pub protected: bool,
    pub owner_id: Option<i64>,
}

/// Public view of a user. The password hash stays in the DB layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub is_active: bool,
    pub is_admin: bool,
}
