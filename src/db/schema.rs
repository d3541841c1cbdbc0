//! Database schema and types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS members (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    phone TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_members_user ON members(user_id);

CREATE TABLE IF NOT EXISTS prayer_requests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    text TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS counseling_requests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    text TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS testimonies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    text TEXT NOT NULL,
    created_at TEXT NOT NULL
);
";

/// Generated row id
pub type RecordId = i64;

/// Chat-platform identity of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three free-text submission categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionCategory {
    Prayer,
    Counseling,
    Testimony,
}

impl SubmissionCategory {
    /// Backing table. Table names are never taken from user input.
    pub fn table(self) -> &'static str {
        match self {
            SubmissionCategory::Prayer => "prayer_requests",
            SubmissionCategory::Counseling => "counseling_requests",
            SubmissionCategory::Testimony => "testimonies",
        }
    }
}

impl fmt::Display for SubmissionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionCategory::Prayer => write!(f, "prayer"),
            SubmissionCategory::Counseling => write!(f, "counseling"),
            SubmissionCategory::Testimony => write!(f, "testimony"),
        }
    }
}

/// Registered member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub id: RecordId,
    pub user_id: UserId,
    pub name: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

/// Prayer, counseling or testimony entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: RecordId,
    pub user_id: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Row counts across all four tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecordCounts {
    pub members: u64,
    pub prayers: u64,
    pub counsel: u64,
    pub testimonies: u64,
}

/// Full contents of every table, in id order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportSnapshot {
    pub members: Vec<MemberRecord>,
    pub prayers: Vec<SubmissionRecord>,
    pub counsel: Vec<SubmissionRecord>,
    pub testimonies: Vec<SubmissionRecord>,
}
