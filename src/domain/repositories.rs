//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use std::collections::HashMap;

use super::DomainError;
use super::inventory::{BookCopy, CopyFilter, CopyPatch, CopyStatus, NewCopy};
use super::lending::{BorrowRecord, LoanFilter, LoanStatus, NewBorrowRecord};

/// Repository trait for copy documents
#[async_trait]
pub trait CopyRepository: Send + Sync {
    /// Find a copy by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<BookCopy>, DomainError>;

    /// Find a copy by its human-readable code
    async fn find_by_code(&self, code: &str) -> Result<Option<BookCopy>, DomainError>;

    /// All copies of a group, in id order
    async fn find_group(&self, group_id: &str) -> Result<Vec<BookCopy>, DomainError>;

    /// Live number of copies sharing `group_id`
    async fn count_group(&self, group_id: &str) -> Result<u64, DomainError>;

    /// Copies matching the filter, in store (id) order
    async fn find_matching(&self, filter: &CopyFilter) -> Result<Vec<BookCopy>, DomainError>;

    /// Available copies belonging to any of the given groups
    async fn find_available_in_groups(
        &self,
        group_ids: &[String],
    ) -> Result<Vec<BookCopy>, DomainError>;

    /// Insert a new copy
    async fn create(&self, copy: NewCopy) -> Result<BookCopy, DomainError>;

    /// Apply a patch to a single copy
    async fn update(&self, id: i32, patch: &CopyPatch) -> Result<BookCopy, DomainError>;

    /// Apply a patch to every copy of a group. Returns the number of copies touched.
    async fn update_group(&self, group_id: &str, patch: &CopyPatch) -> Result<u64, DomainError>;

    /// Set the status of a copy only if it currently has `expected`.
    /// Returns false when no row matched.
    async fn transition_status(
        &self,
        id: i32,
        expected: CopyStatus,
        next: CopyStatus,
    ) -> Result<bool, DomainError>;

    /// Set the status of the copy carrying `code`. Returns false when no copy has it.
    async fn set_status_by_code(&self, code: &str, status: CopyStatus)
    -> Result<bool, DomainError>;

    /// Delete a copy
    async fn delete(&self, id: i32) -> Result<(), DomainError>;

    /// Delete every copy of a group. Returns the number of copies removed.
    async fn delete_group(&self, group_id: &str) -> Result<u64, DomainError>;

    /// Distinct category values across all copies
    async fn distinct_categories(&self) -> Result<Vec<String>, DomainError>;

    /// Distinct tenant values across all copies
    async fn distinct_companies(&self) -> Result<Vec<String>, DomainError>;
}

/// Repository trait for borrow records
#[async_trait]
pub trait LoanRepository: Send + Sync {
    async fn create(&self, record: NewBorrowRecord) -> Result<BorrowRecord, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<BorrowRecord>, DomainError>;

    /// Records matching the filter, newest borrow first
    async fn find(&self, filter: &LoanFilter) -> Result<Vec<BorrowRecord>, DomainError>;

    /// Mark a record returned
    async fn mark_returned(
        &self,
        id: i32,
        returned_at: &str,
        returned_by: Option<i32>,
        comments: Option<String>,
    ) -> Result<BorrowRecord, DomainError>;

    /// Move an open (borrowed) record to `status`. Returns false when the
    /// record is no longer borrowed, e.g. it was returned meanwhile.
    async fn set_status(&self, id: i32, status: LoanStatus) -> Result<bool, DomainError>;

    /// Distinct borrower names for a tenant
    async fn borrower_names(&self, company: &str) -> Result<Vec<String>, DomainError>;
}

/// Account data for API responses (never carries the password hash)
#[derive(Debug, Clone, serde::Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub company: String,
    pub role: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub company: String,
    pub role: String,
}

/// Repository trait for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;

    /// Find a user and its password hash by e-mail
    async fn find_credentials(&self, email: &str) -> Result<Option<(User, String)>, DomainError>;

    async fn exists(&self, username: &str, email: &str) -> Result<bool, DomainError>;

    /// Usernames of the given ids; unknown ids are absent from the map
    async fn display_names(&self, ids: &[i32]) -> Result<HashMap<i32, String>, DomainError>;
}

/// Equipment data for API responses
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Equipment {
    pub id: i32,
    pub code: String,
    pub description: String,
    pub status: String,
    pub observations: String,
}

/// Input for creating or updating equipment
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct EquipmentInput {
    pub code: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub observations: Option<String>,
}

/// Repository trait for Equipment entity
#[async_trait]
pub trait EquipmentRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Equipment>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Equipment>, DomainError>;

    async fn code_exists(&self, code: &str) -> Result<bool, DomainError>;

    async fn create(
        &self,
        code: String,
        description: String,
        status: String,
        observations: String,
    ) -> Result<Equipment, DomainError>;

    async fn update(&self, id: i32, input: EquipmentInput) -> Result<Equipment, DomainError>;

    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}
