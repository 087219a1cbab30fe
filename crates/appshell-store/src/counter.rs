//! SQLite-backed counter
//!
//! Uses an in-memory database by default; a file path can be given to keep
//! the value across restarts.

use rusqlite::types::Value as SqlValue;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info};

/// Name of the row holding the counter
pub const COUNTER_NAME: &str = "counter";

/// Largest integer an f64 holds exactly
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Counter row missing: {0}")]
    MissingRow(String),
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Counter store owning its connection
pub struct CounterStore {
    conn: Mutex<Connection>,
}

impl CounterStore {
    /// Open a fresh in-memory store with the counter at zero
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    /// Open or create a store at a specific path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        info!("Opened counter store at {:?}", path);
        Self::init(conn)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute(
            "create table if not exists incr
                (name text primary key,
                value integer default 0)",
            [],
        )?;
        conn.execute(
            "insert or ignore into incr (name, value) values (?1, 0)",
            params![COUNTER_NAME],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Current counter value. A NULL value reads as NaN.
    pub fn get(&self) -> StoreResult<f64> {
        let conn = self.lock()?;
        read_value(&conn)
    }

    /// Overwrite the counter, returning the number of rows changed
    pub fn set(&self, value: f64) -> StoreResult<usize> {
        let conn = self.lock()?;
        let changes = write_value(&conn, value)?;
        debug!("Counter set to {} ({} row(s) changed)", value, changes);
        Ok(changes)
    }

    /// Read-modify-write the counter under the lock and inside a
    /// transaction. Returns the value written.
    pub fn apply<F>(&self, f: F) -> StoreResult<f64>
    where
        F: FnOnce(f64) -> f64,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let current = read_value(&tx)?;
        let next = f(current);
        let changes = write_value(&tx, next)?;
        tx.commit()?;

        debug!(
            "Counter {} -> {} ({} row(s) changed)",
            current, next, changes
        );
        Ok(next)
    }

    /// Close the underlying connection
    pub fn close(self) -> StoreResult<()> {
        let conn = self.conn.into_inner().map_err(|_| StoreError::Poisoned)?;
        conn.close().map_err(|(_, e)| StoreError::Sqlite(e))?;
        info!("Counter store closed");
        Ok(())
    }
}

fn read_value(conn: &Connection) -> StoreResult<f64> {
    let value: Option<Option<f64>> = conn
        .query_row(
            "select value from incr where name = ?1",
            params![COUNTER_NAME],
            |row| row.get(0),
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(other),
        })?;

    match value {
        Some(value) => Ok(value.unwrap_or(f64::NAN)),
        None => Err(StoreError::MissingRow(COUNTER_NAME.to_string())),
    }
}

fn write_value(conn: &Connection, value: f64) -> StoreResult<usize> {
    Ok(conn.execute(
        "update incr set value = ?1 where name = ?2",
        params![to_sql_value(value), COUNTER_NAME],
    )?)
}

/// Bind a number the way SQLite stores JavaScript numbers: integral values
/// as INTEGER, fractional ones as REAL, NaN as NULL.
fn to_sql_value(value: f64) -> SqlValue {
    if value.is_nan() {
        SqlValue::Null
    } else if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        SqlValue::Integer(value as i64)
    } else {
        SqlValue::Real(value)
    }
}
