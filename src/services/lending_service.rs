//! Lending Service - borrow/return flows and history queries
//!
//! A copy's `status` and its open borrow record move together: borrow flips
//! the copy with a compare-and-set before the record is written, return
//! writes the record after releasing the copy. Overdue is derived on read
//! and persisted back opportunistically.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use futures::future::join_all;

use crate::domain::{
    BookCopy, BookSummary, BorrowInput, BorrowRecord, CopyRepository, CopyStatus, DomainError,
    HistoryQuery, LoanFilter, LoanRepository, LoanStatus, LoanView, NewBorrowRecord,
    UserRepository, derive_status,
};
use crate::utils::dates::{format_timestamp, parse_end_of_day, parse_timestamp};

/// Display name used when an acting user no longer exists
pub const UNKNOWN_USER: &str = "Unknown user";

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Lend an available copy. Only one open record can ever exist per copy:
/// the status flip is a compare-and-set, so concurrent borrowers race on it
/// and exactly one wins.
pub async fn borrow(
    copies: &dyn CopyRepository,
    loans: &dyn LoanRepository,
    company: &str,
    user_id: i32,
    input: BorrowInput,
) -> Result<BorrowRecord, DomainError> {
    let copy_id = input
        .copy_id
        .ok_or_else(|| DomainError::validation("copyId is required"))?;
    let borrower_name = non_blank(input.borrower_name)
        .ok_or_else(|| DomainError::validation("borrowerName is required"))?;
    let expected_return_date = non_blank(input.expected_return_date)
        .ok_or_else(|| DomainError::validation("expectedReturnDate is required"))?;
    let expected_return_date = parse_timestamp(&expected_return_date)
        .map(format_timestamp)
        .ok_or_else(|| DomainError::validation("Invalid expectedReturnDate"))?;

    let copy = copies
        .find_by_id(copy_id)
        .await?
        .filter(|c| c.company == company)
        .ok_or_else(|| DomainError::not_found("Book copy"))?;

    let flipped = copies
        .transition_status(copy.id, CopyStatus::Available, CopyStatus::Borrowed)
        .await?;
    if !flipped {
        return Err(DomainError::Conflict(format!(
            "Book copy {} is not available",
            copy.code
        )));
    }

    let record = loans
        .create(NewBorrowRecord {
            book: input.book_id.unwrap_or(copy.id),
            book_copy: copy.code.clone(),
            company: company.to_string(),
            borrower_name,
            borrow_date: format_timestamp(Utc::now()),
            expected_return_date,
            comments: input.comments.unwrap_or_default(),
            borrowed_by: Some(user_id),
        })
        .await
        .inspect_err(|e| {
            tracing::error!(
                "Copy {} marked borrowed but its record could not be written: {}",
                copy.code,
                e
            )
        })?;

    tracing::info!(
        "Copy {} lent to '{}' (record {})",
        record.book_copy,
        record.borrower_name,
        record.id
    );
    Ok(record)
}

/// Close a borrow record and release its copy. Returning an already
/// returned record rewrites the return stamp and is otherwise harmless.
pub async fn return_loan(
    copies: &dyn CopyRepository,
    loans: &dyn LoanRepository,
    company: &str,
    user_id: i32,
    record_id: i32,
    comments: Option<String>,
) -> Result<BorrowRecord, DomainError> {
    let record = loans
        .find_by_id(record_id)
        .await?
        .filter(|r| r.company == company)
        .ok_or_else(|| DomainError::not_found("Borrow record"))?;

    let released = copies
        .set_status_by_code(&record.book_copy, CopyStatus::Available)
        .await?;
    if !released {
        tracing::info!(
            "Copy {} no longer exists; closing record {} anyway",
            record.book_copy,
            record.id
        );
    }

    let returned = loans
        .mark_returned(
            record.id,
            &format_timestamp(Utc::now()),
            Some(user_id),
            non_blank(comments),
        )
        .await?;

    tracing::info!("Record {} returned (copy {})", returned.id, returned.book_copy);
    Ok(returned)
}

/// Apply the overdue rule to `records` and persist every change.
/// Write failures are logged and never fail the read.
async fn refresh_overdue(
    loans: &dyn LoanRepository,
    mut records: Vec<BorrowRecord>,
    now: DateTime<Utc>,
) -> Vec<BorrowRecord> {
    let mut changed = Vec::new();
    for record in records.iter_mut() {
        let status = derive_status(record, now);
        if status != record.status {
            record.status = status;
            changed.push(record.id);
        }
    }

    if !changed.is_empty() {
        let writes = changed
            .iter()
            .map(|id| loans.set_status(*id, LoanStatus::Overdue));
        for (id, result) in changed.iter().zip(join_all(writes).await) {
            match result {
                Ok(true) => {}
                Ok(false) => tracing::debug!("Record {} left borrowed state first", id),
                Err(e) => {
                    tracing::warn!("Failed to persist overdue status of record {}: {}", id, e)
                }
            }
        }
        tracing::debug!("Marked {} records overdue", changed.len());
    }

    records
}

fn summary(copy: BookCopy) -> BookSummary {
    BookSummary {
        title: copy.title,
        author: copy.author,
    }
}

async fn enrich(
    copies: &dyn CopyRepository,
    users: &dyn UserRepository,
    records: Vec<BorrowRecord>,
) -> Result<Vec<LoanView>, DomainError> {
    let user_ids: Vec<i32> = records
        .iter()
        .flat_map(|r| [r.borrowed_by, r.returned_by])
        .flatten()
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let names = users.display_names(&user_ids).await?;
    let name_of = |id: Option<i32>| {
        id.map(|id| {
            names
                .get(&id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_USER.to_string())
        })
    };

    let mut books: HashMap<i32, Option<BookSummary>> = HashMap::new();
    let mut views = Vec::with_capacity(records.len());
    for record in records {
        let by_id = match books.get(&record.book) {
            Some(cached) => cached.clone(),
            None => {
                let found = copies.find_by_id(record.book).await?.map(summary);
                books.insert(record.book, found.clone());
                found
            }
        };
        // The representative may be gone; fall back to the copy itself
        let book_details = match by_id {
            Some(s) => Some(s),
            None => copies.find_by_code(&record.book_copy).await?.map(summary),
        };

        views.push(LoanView {
            borrowed_by_name: name_of(record.borrowed_by),
            returned_by_name: name_of(record.returned_by),
            book_details,
            record,
        });
    }
    Ok(views)
}

/// Filtered lending history of a tenant, newest first
pub async fn history(
    copies: &dyn CopyRepository,
    loans: &dyn LoanRepository,
    users: &dyn UserRepository,
    company: &str,
    query: HistoryQuery,
) -> Result<Vec<LoanView>, DomainError> {
    let wanted = match non_blank(query.status) {
        None => None,
        Some(s) if s.eq_ignore_ascii_case("all") => None,
        Some(s) => Some(s.parse::<LoanStatus>()?),
    };

    // Overdue may still be stored as borrowed, so both are fetched and the
    // derived status decides.
    let statuses = match wanted {
        None => Vec::new(),
        Some(LoanStatus::Returned) => vec![LoanStatus::Returned],
        Some(_) => vec![LoanStatus::Borrowed, LoanStatus::Overdue],
    };

    let borrowed_from = non_blank(query.start_date)
        .map(|d| {
            parse_timestamp(&d)
                .map(format_timestamp)
                .ok_or_else(|| DomainError::validation("Invalid startDate"))
        })
        .transpose()?;
    let borrowed_until = non_blank(query.end_date)
        .map(|d| {
            parse_end_of_day(&d)
                .map(format_timestamp)
                .ok_or_else(|| DomainError::validation("Invalid endDate"))
        })
        .transpose()?;

    let filter = LoanFilter {
        company: company.to_string(),
        search: non_blank(query.search),
        statuses,
        borrowed_from,
        borrowed_until,
    };

    let mut records = refresh_overdue(loans, loans.find(&filter).await?, Utc::now()).await;
    if let Some(wanted) = wanted {
        records.retain(|r| r.status == wanted);
    }

    enrich(copies, users, records).await
}

/// Open records (borrowed or overdue) of a tenant, newest first
pub async fn active_borrows(
    copies: &dyn CopyRepository,
    loans: &dyn LoanRepository,
    users: &dyn UserRepository,
    company: &str,
) -> Result<Vec<LoanView>, DomainError> {
    let filter = LoanFilter {
        company: company.to_string(),
        statuses: vec![LoanStatus::Borrowed, LoanStatus::Overdue],
        ..Default::default()
    };

    let records = refresh_overdue(loans, loans.find(&filter).await?, Utc::now()).await;
    enrich(copies, users, records).await
}

/// Distinct borrower names of a tenant, sorted
pub async fn borrower_names(
    loans: &dyn LoanRepository,
    company: &str,
) -> Result<Vec<String>, DomainError> {
    loans.borrower_names(company).await
}
