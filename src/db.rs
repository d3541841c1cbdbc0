//! Database module
//!
//! Append-only persistence for members and submissions.

mod schema;

pub use schema::*;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Database lock poisoned")]
    LockPoisoned,
    #[error("Database worker failed: {0}")]
    Worker(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn conn(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Write Operations ====================

    /// Append a submission to its category table
    pub fn insert_submission(
        &self,
        category: SubmissionCategory,
        user_id: UserId,
        text: &str,
    ) -> DbResult<RecordId> {
        let conn = self.conn()?;
        let sql = format!(
            "INSERT INTO {} (user_id, text, created_at) VALUES (?1, ?2, ?3)",
            category.table()
        );
        conn.execute(&sql, params![user_id.0, text, Utc::now().to_rfc3339()])?;
        Ok(conn.last_insert_rowid())
    }

    /// Append a member registration
    pub fn register_member(&self, user_id: UserId, name: &str, phone: &str) -> DbResult<RecordId> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO members (user_id, name, phone, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user_id.0, name, phone, Utc::now().to_rfc3339()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    // ==================== Read Operations ====================

    pub fn count_all(&self) -> DbResult<RecordCounts> {
        let conn = self.conn()?;
        let count = |table: &str| -> DbResult<u64> {
            let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })?;
            Ok(u64::try_from(n).unwrap_or(0))
        };

        Ok(RecordCounts {
            members: count("members")?,
            prayers: count(SubmissionCategory::Prayer.table())?,
            counsel: count(SubmissionCategory::Counseling.table())?,
            testimonies: count(SubmissionCategory::Testimony.table())?,
        })
    }

    /// Distinct identities that have registered at least once
    pub fn distinct_member_identities(&self) -> DbResult<Vec<UserId>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT DISTINCT user_id FROM members ORDER BY user_id")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0).map(UserId))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    pub fn list_members(&self) -> DbResult<Vec<MemberRecord>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, user_id, name, phone, created_at FROM members ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(MemberRecord {
                    id: row.get(0)?,
                    user_id: UserId(row.get(1)?),
                    name: row.get(2)?,
                    phone: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn list_submissions(&self, category: SubmissionCategory) -> DbResult<Vec<SubmissionRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT id, user_id, text, created_at FROM {} ORDER BY id",
            category.table()
        ))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(SubmissionRecord {
                    id: row.get(0)?,
                    user_id: UserId(row.get(1)?),
                    text: row.get(2)?,
                    created_at: parse_datetime(&row.get::<_, String>(3)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Snapshot of every table for export
    pub fn export_all(&self) -> DbResult<ExportSnapshot> {
        Ok(ExportSnapshot {
            members: self.list_members()?,
            prayers: self.list_submissions(SubmissionCategory::Prayer)?,
            counsel: self.list_submissions(SubmissionCategory::Counseling)?,
            testimonies: self.list_submissions(SubmissionCategory::Testimony)?,
        })
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
