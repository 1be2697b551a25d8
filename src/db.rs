// src/db.rs
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database connection failed")]
    Connection(#[from] rusqlite::Error),
    #[error("Failed to get application data directory")]
    DataDir,
    #[error("I/O error accessing database file")]
    Io(#[from] std::io::Error),
    #[error("Database query failed: {0}")]
    QueryFailed(rusqlite::Error),
    #[error("Database write failed: {0}")]
    WriteFailed(rusqlite::Error),
    #[error("Database delete failed: {0}")]
    DeleteFailed(rusqlite::Error),
}

const DB_FILE_NAME: &str = "storage.sqlite";
const APP_DATA_DIR: &str = "mapty";

/// Persistent string slots, like a browser's local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error>;
    /// Overwrites whatever the slot held before.
    fn set(&mut self, key: &str, value: &str) -> Result<(), Error>;
    fn remove(&mut self, key: &str) -> Result<(), Error>;
}

/// Gets the path to the SQLite database file within the app's data directory.
/// Creates the directory if it doesn't exist.
pub fn get_db_path() -> Result<PathBuf, Error> {
    let data_dir = dirs::data_dir().ok_or(Error::DataDir)?;
    let app_dir = data_dir.join(APP_DATA_DIR);
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir.join(DB_FILE_NAME))
}

/// Opens a connection to the SQLite database.
pub fn open_db<P: AsRef<Path>>(path: P) -> Result<Connection, Error> {
    Connection::open(path).map_err(Error::Connection)
}

/// Creates the key-value table if it doesn't exist.
pub fn init_db(conn: &Connection) -> Result<(), Error> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL
        )",
        [],
    )
    .map_err(Error::Connection)?;
    Ok(())
}

/// Key-value store kept in a single SQLite table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (and initializes) the store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let conn = open_db(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory().map_err(Error::Connection)?;
        Self::from_connection(conn)
    }

    pub fn from_connection(conn: Connection) -> Result<Self, Error> {
        init_db(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(Error::QueryFailed)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(Error::WriteFailed)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), Error> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(Error::DeleteFailed)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_and_remove_deletes() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get("workouts").unwrap(), None);
        store.set("workouts", "[]").unwrap();
        store.set("workouts", "[1]").unwrap();
        assert_eq!(store.get("workouts").unwrap().as_deref(), Some("[1]"));
        store.remove("workouts").unwrap();
        assert_eq!(store.get("workouts").unwrap(), None);
        // Removing a missing slot is fine.
        store.remove("workouts").unwrap();
    }

    #[test]
    fn init_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        init_db(store.connection()).unwrap();
    }
}
