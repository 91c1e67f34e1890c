use crate::{error::ImportError, record::UserEntry};
use rusqlite::{params, Connection};
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS provisioned_users (
    user_id     TEXT PRIMARY KEY,
    group_token TEXT NOT NULL,
    group_name  TEXT NOT NULL,
    auth_token  TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
)";

/// Destination for provisioned users. Each save stands on its own; there
/// is no transaction spanning several entries.
pub trait UserStore {
    fn save(&mut self, entry: &UserEntry) -> Result<(), ImportError>;
}

#[cfg(test)]
impl UserStore for Vec<UserEntry> {
    fn save(&mut self, entry: &UserEntry) -> Result<(), ImportError> {
        self.push(entry.clone());
        Ok(())
    }
}

/// `UserStore` backed by a SQLite database.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the database file and make sure the table exists.
    pub fn open(path: &Path) -> Result<Self, ImportError> {
        SqliteStore::with_connection(Connection::open(path)?)
    }

    pub fn with_connection(conn: Connection) -> Result<Self, ImportError> {
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore { conn })
    }

    /// Number of stored users.
    pub fn count(&self) -> Result<i64, ImportError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM provisioned_users", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl UserStore for SqliteStore {
    /// Insert the entry, replacing any previous one for the same user.
    fn save(&mut self, entry: &UserEntry) -> Result<(), ImportError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO provisioned_users (user_id, group_token, group_name, auth_token)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                entry.user_id().to_string(),
                entry.group_token(),
                entry.group_name(),
                entry.auth_token(),
            ],
        )?;

        Ok(())
    }
}
