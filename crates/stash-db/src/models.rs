//! Database row types — these map directly to SQLite rows.
//! Distinct from stash-types API models to keep the DB layer independent.

use stash_types::models::{Stash, User};

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub hashed_password: String,
    pub is_active: bool,
    pub is_admin: bool,
}

#[derive(Debug, Clone)]
pub struct StashRow {
    pub id: String,
    pub content: String,
    pub protected: bool,
    pub owner_id: Option<i64>,
}

impl From<StashRow> for Stash {
    fn from(row: StashRow) -> Self {
        Stash {
            id: row.id,
            content: row.content,
            protected: row.protected,
            owner_id: row.owner_id,
        }
    }
}

impl From<&UserRow> for User {
    fn from(row: &UserRow) -> Self {
        User {
            id: row.id,
            email: row.email.clone(),
            is_active: row.is_active,
            is_admin: row.is_admin,
        }
    }
}
