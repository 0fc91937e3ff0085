use crate::Database;
use crate::models::{StashRow, UserRow};
use anyhow::{Result, anyhow};
use rand::Rng;
use rusqlite::Connection;
use tracing::debug;

pub const STASH_ID_LEN: usize = 6;

/// Give up after this many id collisions in a row; the id space is
/// 52^6 so hitting it means something else is wrong.
const MAX_ID_ATTEMPTS: usize = 32;

const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Ids that collide with fixed HTTP routes and would never be reachable.
const RESERVED_IDS: &[&str] = &["health", "upload"];

impl Database {
    // -- Stashes --

    /// Insert a stash under a fresh random id and return the stored row.
    /// `content` must already be an envelope when `protected` is set.
    pub fn create_stash(
        &self,
        content: &str,
        protected: bool,
        owner_id: Option<i64>,
    ) -> Result<StashRow> {
        self.with_conn(|conn| {
            let id = unused_stash_id(conn)?;
            conn.execute(
                "INSERT INTO stashes (id, content, protected, owner_id) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, content, protected, owner_id],
            )?;
            debug!("Created stash {} (protected: {})", id, protected);
            Ok(StashRow {
                id,
                content: content.to_string(),
                protected,
                owner_id,
            })
        })
    }

    pub fn get_stash_by_id(&self, id: &str) -> Result<Option<StashRow>> {
        self.with_conn(|conn| query_stash_by_id(conn, id))
    }

    pub fn get_stashes(&self, skip: u32, limit: u32) -> Result<Vec<StashRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, content, protected, owner_id FROM stashes
                 ORDER BY rowid LIMIT ?1 OFFSET ?2",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![limit, skip], stash_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_stash_ids(&self, skip: u32, limit: u32) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id FROM stashes ORDER BY rowid LIMIT ?1 OFFSET ?2")?;
            let ids = stmt
                .query_map(rusqlite::params![limit, skip], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(ids)
        })
    }

    // -- Users --

    pub fn create_user(&self, email: &str, password_hash: &str, is_admin: bool) -> Result<UserRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (email, hashed_password, is_admin) VALUES (?1, ?2, ?3)",
                rusqlite::params![email, password_hash, is_admin],
            )?;
            let id = conn.last_insert_rowid();
            query_user_by_id(conn, id)?.ok_or_else(|| anyhow!("User {} vanished after insert", id))
        })
    }

    pub fn get_user(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, email, hashed_password, is_active, is_admin FROM users
                 WHERE email = ?1",
            )?;
            let row = stmt.query_row([email], user_from_row).optional()?;
            Ok(row)
        })
    }

    pub fn get_users(&self, skip: u32, limit: u32) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, email, hashed_password, is_active, is_admin FROM users
                 ORDER BY id LIMIT ?1 OFFSET ?2",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![limit, skip], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

pub fn generate_stash_id() -> String {
    let mut rng = rand::rng();
    (0..STASH_ID_LEN)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

// Runs under the connection lock, so the check and the insert that follows
// cannot race another writer.
fn unused_stash_id(conn: &Connection) -> Result<String> {
    for _ in 0..MAX_ID_ATTEMPTS {
        let id = generate_stash_id();
        if RESERVED_IDS.contains(&id.as_str()) {
            continue;
        }
        let taken: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM stashes WHERE id = ?1)",
            [&id],
            |row| row.get(0),
        )?;
        if !taken {
            return Ok(id);
        }
    }
    Err(anyhow!("No free stash id after {} attempts", MAX_ID_ATTEMPTS))
}

fn query_stash_by_id(conn: &Connection, id: &str) -> Result<Option<StashRow>> {
    let mut stmt =
        conn.prepare("SELECT id, content, protected, owner_id FROM stashes WHERE id = ?1")?;
    let row = stmt.query_row([id], stash_from_row).optional()?;
    Ok(row)
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, email, hashed_password, is_active, is_admin FROM users WHERE id = ?1",
    )?;
    let row = stmt.query_row([id], user_from_row).optional()?;
    Ok(row)
}

fn stash_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StashRow> {
    Ok(StashRow {
        id: row.get(0)?,
        content: row.get(1)?,
        protected: row.get(2)?,
        owner_id: row.get(3)?,
    })
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        hashed_password: row.get(2)?,
        is_active: row.get(3)?,
        is_admin: row.get(4)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn stash_ids_are_six_ascii_letters() {
        for _ in 0..100 {
            let id = generate_stash_id();
            assert_eq!(id.len(), STASH_ID_LEN);
            assert!(id.bytes().all(|b| b.is_ascii_alphabetic()));
        }
    }

    #[test]
    fn create_and_lookup_stash() {
        let db = db();
        let row = db.create_stash("hello", false, None).unwrap();

        let found = db.get_stash_by_id(&row.id).unwrap().unwrap();
        assert_eq!(found.content, "hello");
        assert!(!found.protected);
        assert_eq!(found.owner_id, None);
    }

    #[test]
    fn unknown_stash_is_none() {
        assert!(db().get_stash_by_id("nopeee").unwrap().is_none());
    }

    #[test]
    fn stash_listing_pages() {
        let db = db();
        let ids: Vec<String> = (0..5)
            .map(|i| db.create_stash(&format!("s{i}"), false, None).unwrap().id)
            .collect();

        assert_eq!(db.get_stash_ids(0, 100).unwrap(), ids);
        assert_eq!(db.get_stash_ids(2, 2).unwrap(), ids[2..4].to_vec());

        let page = db.get_stashes(4, 10).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].content, "s4");
    }

    #[test]
    fn stash_owner_must_exist() {
        let db = db();
        assert!(db.create_stash("x", false, Some(42)).is_err());

        let user = db.create_user("a@example.com", "hash", false).unwrap();
        let row = db.create_stash("x", true, Some(user.id)).unwrap();
        assert_eq!(row.owner_id, Some(user.id));
        assert!(db.get_stash_by_id(&row.id).unwrap().unwrap().protected);
    }

    #[test]
    fn users_by_id_and_email() {
        let db = db();
        let user = db.create_user("a@example.com", "hash", true).unwrap();
        assert!(user.is_active);
        assert!(user.is_admin);

        let by_email = db.get_user_by_email("a@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(db.get_user(user.id).unwrap().unwrap().email, "a@example.com");
        assert!(db.get_user_by_email("b@example.com").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let db = db();
        db.create_user("a@example.com", "hash", false).unwrap();
        assert!(db.create_user("a@example.com", "hash", false).is_err());
        assert_eq!(db.get_users(0, 100).unwrap().len(), 1);
    }
}
