//! SeaORM implementation of LoanRepository

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::domain::{
    BorrowRecord, DomainError, LoanFilter, LoanRepository, LoanStatus, NewBorrowRecord,
};
use crate::models::borrow_record::{ActiveModel, Column, Entity as LoanEntity};
use crate::utils::dates::now_timestamp;

/// SeaORM-based implementation of LoanRepository
pub struct SeaOrmLoanRepository {
    db: DatabaseConnection,
}

impl SeaOrmLoanRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LoanRepository for SeaOrmLoanRepository {
    async fn create(&self, record: NewBorrowRecord) -> Result<BorrowRecord, DomainError> {
        let now = now_timestamp();

        let new_record = ActiveModel {
            book_id: Set(record.book),
            book_copy: Set(record.book_copy),
            company: Set(record.company),
            borrower_name: Set(record.borrower_name),
            borrow_date: Set(record.borrow_date),
            expected_return_date: Set(record.expected_return_date),
            return_date: Set(None),
            status: Set(LoanStatus::Borrowed.as_str().to_owned()),
            comments: Set(record.comments),
            borrowed_by: Set(record.borrowed_by),
            returned_by: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let saved = new_record.insert(&self.db).await?;
        Ok(BorrowRecord::from(saved))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<BorrowRecord>, DomainError> {
        let record = LoanEntity::find_by_id(id).one(&self.db).await?;
        Ok(record.map(BorrowRecord::from))
    }

    async fn find(&self, filter: &LoanFilter) -> Result<Vec<BorrowRecord>, DomainError> {
        let mut condition = Condition::all().add(Column::Company.eq(filter.company.as_str()));

        if !filter.statuses.is_empty() {
            let statuses: Vec<&str> = filter.statuses.iter().map(|s| s.as_str()).collect();
            condition = condition.add(Column::Status.is_in(statuses));
        }

        if let Some(from) = &filter.borrowed_from {
            condition = condition.add(Column::BorrowDate.gte(from.as_str()));
        }

        if let Some(until) = &filter.borrowed_until {
            condition = condition.add(Column::BorrowDate.lte(until.as_str()));
        }

        let records = LoanEntity::find()
            .filter(condition)
            .order_by_desc(Column::BorrowDate)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await?;

        // Search runs here rather than in SQL: LIKE only folds ASCII case
        Ok(records
            .into_iter()
            .map(BorrowRecord::from)
            .filter(|record| filter.matches_search(record))
            .collect())
    }

    async fn mark_returned(
        &self,
        id: i32,
        returned_at: &str,
        returned_by: Option<i32>,
        comments: Option<String>,
    ) -> Result<BorrowRecord, DomainError> {
        let existing = LoanEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Borrow record"))?;

        let mut active: ActiveModel = existing.into();
        active.return_date = Set(Some(returned_at.to_owned()));
        active.status = Set(LoanStatus::Returned.as_str().to_owned());
        active.returned_by = Set(returned_by);
        if let Some(comments) = comments {
            active.comments = Set(comments);
        }
        active.updated_at = Set(now_timestamp());

        let updated = active.update(&self.db).await?;
        Ok(BorrowRecord::from(updated))
    }

    async fn set_status(&self, id: i32, status: LoanStatus) -> Result<bool, DomainError> {
        let result = LoanEntity::update_many()
            .col_expr(Column::Status, Expr::value(status.as_str()))
            .col_expr(Column::UpdatedAt, Expr::value(now_timestamp()))
            .filter(Column::Id.eq(id))
            .filter(Column::Status.eq(LoanStatus::Borrowed.as_str()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn borrower_names(&self, company: &str) -> Result<Vec<String>, DomainError> {
        let names: Vec<String> = LoanEntity::find()
            .select_only()
            .column(Column::BorrowerName)
            .distinct()
            .filter(Column::Company.eq(company))
            .order_by_asc(Column::BorrowerName)
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(names)
    }
}
