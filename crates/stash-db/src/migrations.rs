use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            email            TEXT NOT NULL UNIQUE,
            hashed_password  TEXT NOT NULL,
            is_active        INTEGER NOT NULL DEFAULT 1,
            is_admin         INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS stashes (
            id          TEXT PRIMARY KEY,
            content     TEXT NOT NULL,
            protected   INTEGER NOT NULL DEFAULT 0,
            owner_id    INTEGER REFERENCES users(id)
        );

        CREATE INDEX IF NOT EXISTS idx_stashes_owner
            ON stashes(owner_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
