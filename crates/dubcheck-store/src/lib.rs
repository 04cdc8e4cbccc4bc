//! DubCheck Storage Layer
//!
//! Implements the `AccountStore` trait on SQLite.
//!
//! # Architecture
//!
//! - One connection guarded by a mutex; every trait method holds the lock for
//!   its full duration
//! - Credit debits are a single conditional `UPDATE`, so the balance cannot
//!   go negative even with several connections on the same database file
//! - A charged fact-check is inserted and debited in one transaction, so a
//!   refused debit leaves no record behind
//! - Evidence sources are stored as a JSON array column
//!
//! # Examples
//!
//! ```no_run
//! use dubcheck_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for account operations
//! ```

#![warn(missing_docs)]

use dubcheck_domain::traits::{AccountStore, Debit};
use dubcheck_domain::{FactCheckRecord, RecordId, Session, Source, User, UserId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Source list could not be encoded or decoded
    #[error("Source encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A thread panicked while holding the connection
    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Evidence source as stored in the `sources` JSON column
#[derive(Serialize, Deserialize)]
struct StoredSource {
    title: String,
    url: String,
    snippet: String,
}

impl From<&Source> for StoredSource {
    fn from(source: &Source) -> Self {
        Self {
            title: source.title.clone(),
            url: source.url.clone(),
            snippet: source.snippet.clone(),
        }
    }
}

impl From<StoredSource> for Source {
    fn from(stored: StoredSource) -> Self {
        Source::new(stored.title, stored.url, stored.snippet)
    }
}

const USER_COLUMNS: &str =
    "id, email, name, plan, credits, credits_reset_at, created_at, is_active";

const RECORD_COLUMNS: &str =
    "id, user_id, text, likelihood_score, reasoning, sources, credits_used, created_at";

/// SQLite-based implementation of AccountStore
///
/// # Thread Safety
///
/// The connection sits behind a mutex, so a single `SqliteStore` can be shared
/// across threads and async tasks via `Arc`.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dubcheck_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("dubcheck.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("schema.sql"))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn id_to_bytes(value: u128) -> Vec<u8> {
        value.to_be_bytes().to_vec()
    }

    fn bytes_to_id(bytes: &[u8]) -> Result<u128, StoreError> {
        let arr: [u8; 16] = bytes.try_into().map_err(|_| {
            StoreError::InvalidData(format!("Expected 16 bytes for id, got {}", bytes.len()))
        })?;
        Ok(u128::from_be_bytes(arr))
    }

    /// Read a blob id column, surfacing bad lengths as a conversion failure
    fn id_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<u128> {
        let bytes: Vec<u8> = row.get(idx)?;
        Self::bytes_to_id(&bytes).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Blob, Box::new(e))
        })
    }

    fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: UserId::from_value(Self::id_column(row, 0)?),
            email: row.get(1)?,
            name: row.get(2)?,
            plan: row.get(3)?,
            credits: row.get(4)?,
            credits_reset_at: row.get::<_, i64>(5)? as u64,
            created_at: row.get::<_, i64>(6)? as u64,
            is_active: row.get(7)?,
        })
    }

    fn record_from_row(row: &Row<'_>) -> rusqlite::Result<FactCheckRecord> {
        let sources_json: String = row.get(5)?;
        let stored: Vec<StoredSource> = serde_json::from_str(&sources_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(FactCheckRecord {
            id: RecordId::from_value(Self::id_column(row, 0)?),
            user_id: UserId::from_value(Self::id_column(row, 1)?),
            text: row.get(2)?,
            likelihood_score: row.get(3)?,
            reasoning: row.get(4)?,
            sources: stored.into_iter().map(Source::from).collect(),
            credits_used: row.get(6)?,
            created_at: row.get::<_, i64>(7)? as u64,
        })
    }

    fn balance(conn: &Connection, id_bytes: &[u8]) -> Result<Option<u32>, StoreError> {
        let credits = conn
            .query_row(
                "SELECT credits FROM users WHERE id = ?1",
                params![id_bytes],
                |row| row.get(0),
            )
            .optional()?;
        Ok(credits)
    }

    /// Conditional debit on an already locked connection or transaction
    fn debit(conn: &Connection, id_bytes: &[u8], amount: u32) -> Result<Debit, StoreError> {
        let changed = conn.execute(
            "UPDATE users SET credits = credits - ?1 WHERE id = ?2 AND credits >= ?1",
            params![amount, id_bytes],
        )?;

        let balance = Self::balance(conn, id_bytes)?;
        Ok(match (changed, balance) {
            (1, Some(remaining)) => Debit::Applied { remaining },
            (_, Some(available)) => Debit::Insufficient { available },
            (_, None) => Debit::UnknownUser,
        })
    }

    fn write_record(conn: &Connection, record: &FactCheckRecord) -> Result<(), StoreError> {
        let stored: Vec<StoredSource> = record.sources.iter().map(StoredSource::from).collect();
        let sources_json = serde_json::to_string(&stored)?;

        conn.execute(
            &format!(
                "INSERT INTO fact_checks ({RECORD_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
            ),
            params![
                Self::id_to_bytes(record.id.value()),
                Self::id_to_bytes(record.user_id.value()),
                &record.text,
                record.likelihood_score,
                &record.reasoning,
                sources_json,
                record.credits_used,
                record.created_at as i64,
            ],
        )?;
        Ok(())
    }
}

impl AccountStore for SqliteStore {
    type Error = StoreError;

    fn insert_user(&self, user: &User) -> Result<bool, Self::Error> {
        let conn = self.conn()?;
        let inserted = conn.execute(
            &format!(
                "INSERT INTO users ({USER_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(email) DO NOTHING"
            ),
            params![
                Self::id_to_bytes(user.id.value()),
                &user.email,
                &user.name,
                &user.plan,
                user.credits,
                user.credits_reset_at as i64,
                user.created_at as i64,
                user.is_active,
            ],
        )?;

        Ok(inserted == 1)
    }

    fn find_user(&self, id: UserId) -> Result<Option<User>, Self::Error> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![Self::id_to_bytes(id.value())],
                Self::user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, Self::Error> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email],
                Self::user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn reset_credits(
        &self,
        id: UserId,
        credits: u32,
        next_reset_at: u64,
        now: u64,
    ) -> Result<bool, Self::Error> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE users SET credits = ?1, credits_reset_at = ?2
             WHERE id = ?3 AND credits_reset_at < ?4",
            params![
                credits,
                next_reset_at as i64,
                Self::id_to_bytes(id.value()),
                now as i64,
            ],
        )?;
        Ok(changed == 1)
    }

    fn debit_credits(&self, id: UserId, amount: u32) -> Result<Debit, Self::Error> {
        let conn = self.conn()?;
        Self::debit(&conn, &Self::id_to_bytes(id.value()), amount)
    }

    fn update_plan(&self, id: UserId, plan: &str) -> Result<bool, Self::Error> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE users SET plan = ?1 WHERE id = ?2",
            params![plan, Self::id_to_bytes(id.value())],
        )?;
        Ok(changed == 1)
    }

    fn insert_session(&self, session: &Session) -> Result<(), Self::Error> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                &session.token,
                Self::id_to_bytes(session.user_id.value()),
                session.created_at as i64,
                session.expires_at as i64,
            ],
        )?;
        Ok(())
    }

    fn find_session(&self, token: &str) -> Result<Option<Session>, Self::Error> {
        let conn = self.conn()?;
        let session = conn
            .query_row(
                "SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = ?1",
                params![token],
                |row| {
                    Ok(Session {
                        token: row.get(0)?,
                        user_id: UserId::from_value(Self::id_column(row, 1)?),
                        created_at: row.get::<_, i64>(2)? as u64,
                        expires_at: row.get::<_, i64>(3)? as u64,
                    })
                },
            )
            .optional()?;
        Ok(session)
    }

    fn insert_record(&self, record: &FactCheckRecord) -> Result<(), Self::Error> {
        let conn = self.conn()?;
        Self::write_record(&conn, record)
    }

    fn record_and_debit(&self, record: &FactCheckRecord) -> Result<Debit, Self::Error> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        Self::write_record(&tx, record)?;
        let outcome = Self::debit(
            &tx,
            &Self::id_to_bytes(record.user_id.value()),
            record.credits_used,
        )?;

        // Dropping the transaction rolls the insert back
        if let Debit::Applied { .. } = outcome {
            tx.commit()?;
        }
        Ok(outcome)
    }

    fn recent_records(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<FactCheckRecord>, Self::Error> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM fact_checks
             WHERE user_id = ?1
             ORDER BY created_at DESC, seq DESC
             LIMIT ?2"
        ))?;

        let records = stmt
            .query_map(
                params![Self::id_to_bytes(user_id.value()), limit as i64],
                Self::record_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_bytes_round_trip() {
        let id = UserId::new();
        let bytes = SqliteStore::id_to_bytes(id.value());
        assert_eq!(bytes.len(), 16);
        assert_eq!(SqliteStore::bytes_to_id(&bytes).unwrap(), id.value());
    }

    #[test]
    fn test_bad_id_length() {
        let result = SqliteStore::bytes_to_id(&[1, 2, 3]);
        assert!(matches!(result, Err(StoreError::InvalidData(_))));
    }

    #[test]
    fn test_schema_is_idempotent() {
        let store = SqliteStore::new(":memory:").unwrap();
        let conn = store.conn().unwrap();
        conn.execute_batch(include_str!("schema.sql")).unwrap();
    }
}
