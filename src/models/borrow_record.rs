use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{BorrowRecord, LoanStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "borrow_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Representative copy id, display only
    pub book_id: i32,
    /// Code of the borrowed copy. Not a foreign key: the copy may be deleted
    /// while the record lives on.
    pub book_copy: String,
    pub company: String,
    pub borrower_name: String,
    pub borrow_date: String,
    pub expected_return_date: String,
    pub return_date: Option<String>,
    pub status: String, // 'borrowed', 'returned', 'overdue'
    pub comments: String,
    pub borrowed_by: Option<i32>,
    pub returned_by: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for BorrowRecord {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            book: model.book_id,
            book_copy: model.book_copy,
            company: model.company,
            borrower_name: model.borrower_name,
            borrow_date: model.borrow_date,
            expected_return_date: model.expected_return_date,
            return_date: model.return_date,
            status: model.status.parse().unwrap_or(LoanStatus::Borrowed),
            comments: model.comments,
            borrowed_by: model.borrowed_by,
            returned_by: model.returned_by,
        }
    }
}
