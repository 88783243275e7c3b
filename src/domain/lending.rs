//! Lending value types and the overdue derivation rule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::DomainError;
use crate::utils::dates;
use crate::utils::text::contains_ignore_case;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Borrowed,
    Returned,
    Overdue,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Borrowed => "borrowed",
            LoanStatus::Returned => "returned",
            LoanStatus::Overdue => "overdue",
        }
    }

    /// An open record still holds its copy.
    pub fn is_open(&self) -> bool {
        matches!(self, LoanStatus::Borrowed | LoanStatus::Overdue)
    }
}

impl FromStr for LoanStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "borrowed" => Ok(LoanStatus::Borrowed),
            "returned" => Ok(LoanStatus::Returned),
            "overdue" => Ok(LoanStatus::Overdue),
            other => Err(DomainError::validation(format!(
                "Invalid status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRecord {
    pub id: i32,
    /// Representative copy id of the borrowed title, for display only
    pub book: i32,
    /// Code of the physical copy
    pub book_copy: String,
    pub company: String,
    pub borrower_name: String,
    pub borrow_date: String,
    pub expected_return_date: String,
    pub return_date: Option<String>,
    pub status: LoanStatus,
    pub comments: String,
    pub borrowed_by: Option<i32>,
    pub returned_by: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewBorrowRecord {
    pub book: i32,
    pub book_copy: String,
    pub company: String,
    pub borrower_name: String,
    pub borrow_date: String,
    pub expected_return_date: String,
    pub comments: String,
    pub borrowed_by: Option<i32>,
}

/// Status as it should be reported at `now`: a borrowed record past its
/// expected return date is overdue. Everything else is left as stored.
pub fn derive_status(record: &BorrowRecord, now: DateTime<Utc>) -> LoanStatus {
    if record.status != LoanStatus::Borrowed {
        return record.status;
    }
    match dates::parse_timestamp(&record.expected_return_date) {
        Some(expected) if expected < now => LoanStatus::Overdue,
        _ => record.status,
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowInput {
    pub copy_id: Option<i32>,
    pub book_id: Option<i32>,
    pub borrower_name: Option<String>,
    pub expected_return_date: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ReturnInput {
    pub comments: Option<String>,
}

/// Query string of the history endpoint.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Store-level filter over borrow records.
#[derive(Debug, Default, Clone)]
pub struct LoanFilter {
    pub company: String,
    /// Case-insensitive substring over borrower name and copy code
    pub search: Option<String>,
    /// Stored statuses to match; empty means any
    pub statuses: Vec<LoanStatus>,
    /// Inclusive lower bound on the borrow date
    pub borrowed_from: Option<String>,
    /// Inclusive upper bound on the borrow date
    pub borrowed_until: Option<String>,
}

impl LoanFilter {
    /// Whether `record` satisfies the free-text search, if any.
    pub fn matches_search(&self, record: &BorrowRecord) -> bool {
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(q) => {
                contains_ignore_case(&record.borrower_name, q)
                    || contains_ignore_case(&record.book_copy, q)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookSummary {
    pub title: String,
    pub author: String,
}

/// A record enriched for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanView {
    #[serde(flatten)]
    pub record: BorrowRecord,
    pub book_details: Option<BookSummary>,
    pub borrowed_by_name: Option<String>,
    pub returned_by_name: Option<String>,
}
