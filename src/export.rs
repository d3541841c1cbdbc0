//! Data export rendering
//!
//! One workbook per export, one sheet per record category. Sheets are a
//! header row plus data rows so spreadsheet tools can import them directly.

use crate::db::{ExportSnapshot, MemberRecord, SubmissionRecord};
use chrono::{DateTime, TimeZone};
use serde::Serialize;
use serde_json::{json, Value};

/// Downloadable export file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Serialize)]
struct Workbook<'a> {
    generated_at: String,
    sheets: Vec<Sheet<'a>>,
}

#[derive(Debug, Serialize)]
struct Sheet<'a> {
    name: &'a str,
    columns: &'a [&'a str],
    rows: Vec<Vec<Value>>,
}

const MEMBER_COLUMNS: &[&str] = &["id", "user_id", "name", "phone", "created_at"];
const SUBMISSION_COLUMNS: &[&str] = &["id", "user_id", "text", "created_at"];

fn member_rows(members: &[MemberRecord]) -> Vec<Vec<Value>> {
    members
        .iter()
        .map(|m| {
            vec![
                json!(m.id),
                json!(m.user_id),
                json!(m.name),
                json!(m.phone),
                json!(m.created_at.to_rfc3339()),
            ]
        })
        .collect()
}

fn submission_rows(records: &[SubmissionRecord]) -> Vec<Vec<Value>> {
    records
        .iter()
        .map(|r| {
            vec![
                json!(r.id),
                json!(r.user_id),
                json!(r.text),
                json!(r.created_at.to_rfc3339()),
            ]
        })
        .collect()
}

/// Render a snapshot taken at `at` into a single workbook file
pub fn render<Tz>(snapshot: &ExportSnapshot, at: &DateTime<Tz>) -> Result<ExportArtifact, serde_json::Error>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let workbook = Workbook {
        generated_at: at.to_rfc3339(),
        sheets: vec![
            Sheet {
                name: "Members",
                columns: MEMBER_COLUMNS,
                rows: member_rows(&snapshot.members),
            },
            Sheet {
                name: "Prayer Requests",
                columns: SUBMISSION_COLUMNS,
                rows: submission_rows(&snapshot.prayers),
            },
            Sheet {
                name: "Counseling",
                columns: SUBMISSION_COLUMNS,
                rows: submission_rows(&snapshot.counsel),
            },
            Sheet {
                name: "Testimonies",
                columns: SUBMISSION_COLUMNS,
                rows: submission_rows(&snapshot.testimonies),
            },
        ],
    };

    Ok(ExportArtifact {
        file_name: format!("church_data_{}.json", at.format("%Y%m%d_%H%M%S")),
        bytes: serde_json::to_vec_pretty(&workbook)?,
    })
}
