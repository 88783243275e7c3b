//! SeaORM implementation of CopyRepository

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::collections::BTreeSet;

use crate::domain::{
    BookCopy, CopyFilter, CopyPatch, CopyRepository, CopyStatus, DomainError, NewCopy,
};
use crate::models::book_copy::{ActiveModel, Column, Entity as CopyEntity};
use crate::utils::dates::now_timestamp;

/// SeaORM-based implementation of CopyRepository
pub struct SeaOrmCopyRepository {
    db: DatabaseConnection,
}

impl SeaOrmCopyRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn categories_json(categories: &[String]) -> String {
    serde_json::to_string(categories).unwrap_or_else(|_| "[]".to_string())
}

/// Copy the fields present in `patch` onto `active`.
fn apply_patch(active: &mut ActiveModel, patch: &CopyPatch) {
    if let Some(title) = &patch.title {
        active.title = Set(title.clone());
    }
    if let Some(author) = &patch.author {
        active.author = Set(author.clone());
    }
    if let Some(editorial) = &patch.editorial {
        active.editorial = Set(editorial.clone());
    }
    if let Some(edition) = &patch.edition {
        active.edition = Set(edition.clone());
    }
    if let Some(categories) = &patch.categories {
        active.categories = Set(categories_json(categories));
    }
    if let Some(cover_type) = patch.cover_type {
        active.cover_type = Set(cover_type.as_str().to_string());
    }
    if let Some(location) = &patch.location {
        active.location = Set(location.clone());
    }
    if let Some(cost) = patch.cost {
        active.cost = Set(cost);
    }
    if let Some(date) = &patch.date_acquired {
        active.date_acquired = Set(date.clone());
    }
    if let Some(condition) = patch.condition {
        active.condition = Set(condition.as_str().to_string());
    }
    if let Some(observations) = &patch.observations {
        active.observations = Set(observations.clone());
    }
    if let Some(invoice_code) = &patch.invoice_code {
        active.invoice_code = Set(invoice_code.clone());
    }
    if let Some(image_url) = &patch.image_url {
        active.image_url = Set(image_url.clone());
    }
    if let Some(status) = patch.status {
        active.status = Set(status.as_str().to_string());
    }
    if let Some(count) = patch.copies_count {
        active.copies_count = Set(count);
    }
    active.updated_at = Set(now_timestamp());
}

#[async_trait]
impl CopyRepository for SeaOrmCopyRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<BookCopy>, DomainError> {
        let copy = CopyEntity::find_by_id(id).one(&self.db).await?;
        Ok(copy.map(BookCopy::from))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<BookCopy>, DomainError> {
        let copy = CopyEntity::find()
            .filter(Column::Code.eq(code))
            .one(&self.db)
            .await?;
        Ok(copy.map(BookCopy::from))
    }

    async fn find_group(&self, group_id: &str) -> Result<Vec<BookCopy>, DomainError> {
        let copies = CopyEntity::find()
            .filter(Column::GroupId.eq(group_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;
        Ok(copies.into_iter().map(BookCopy::from).collect())
    }

    async fn count_group(&self, group_id: &str) -> Result<u64, DomainError> {
        let count = CopyEntity::find()
            .filter(Column::GroupId.eq(group_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn find_matching(&self, filter: &CopyFilter) -> Result<Vec<BookCopy>, DomainError> {
        let mut query = CopyEntity::find();

        if let Some(company) = &filter.company
            && !company.is_empty()
        {
            query = query.filter(Column::Company.eq(company.as_str()));
        }

        // Coarse match on the JSON text; exact membership is checked below
        if !filter.categories.is_empty() {
            let mut cond = Condition::any();
            for category in &filter.categories {
                let quoted = serde_json::to_string(category).unwrap_or_default();
                cond = cond.add(Column::Categories.contains(quoted));
            }
            query = query.filter(cond);
        }

        let copies = query.order_by_asc(Column::Id).all(&self.db).await?;

        Ok(copies
            .into_iter()
            .map(BookCopy::from)
            .filter(|copy| filter.matches_search(copy))
            .filter(|copy| {
                filter.categories.is_empty()
                    || copy
                        .categories
                        .iter()
                        .any(|c| filter.categories.contains(c))
            })
            .collect())
    }

    async fn find_available_in_groups(
        &self,
        group_ids: &[String],
    ) -> Result<Vec<BookCopy>, DomainError> {
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let copies = CopyEntity::find()
            .filter(Column::GroupId.is_in(group_ids.to_vec()))
            .filter(Column::Status.eq(CopyStatus::Available.as_str()))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;
        Ok(copies.into_iter().map(BookCopy::from).collect())
    }

    async fn create(&self, copy: NewCopy) -> Result<BookCopy, DomainError> {
        let now = now_timestamp();

        let new_copy = ActiveModel {
            code: Set(copy.code),
            group_id: Set(copy.group_id),
            title: Set(copy.title),
            author: Set(copy.author),
            editorial: Set(copy.editorial),
            edition: Set(copy.edition),
            categories: Set(categories_json(&copy.categories)),
            cover_type: Set(copy.cover_type.as_str().to_string()),
            location: Set(copy.location),
            cost: Set(copy.cost),
            date_acquired: Set(copy.date_acquired),
            condition: Set(copy.condition.as_str().to_string()),
            observations: Set(copy.observations),
            invoice_code: Set(copy.invoice_code),
            image_url: Set(copy.image_url),
            status: Set(copy.status.as_str().to_string()),
            company: Set(copy.company),
            copies_count: Set(copy.copies_count),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = new_copy.insert(&self.db).await?;
        Ok(BookCopy::from(result))
    }

    async fn update(&self, id: i32, patch: &CopyPatch) -> Result<BookCopy, DomainError> {
        let existing = CopyEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Book"))?;

        let mut active: ActiveModel = existing.into();
        apply_patch(&mut active, patch);

        let result = active.update(&self.db).await?;
        Ok(BookCopy::from(result))
    }

    async fn update_group(&self, group_id: &str, patch: &CopyPatch) -> Result<u64, DomainError> {
        let mut active = <ActiveModel as Default>::default();
        apply_patch(&mut active, patch);

        let result = CopyEntity::update_many()
            .set(active)
            .filter(Column::GroupId.eq(group_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn transition_status(
        &self,
        id: i32,
        expected: CopyStatus,
        next: CopyStatus,
    ) -> Result<bool, DomainError> {
        let result = CopyEntity::update_many()
            .col_expr(Column::Status, Expr::value(next.as_str()))
            .col_expr(Column::UpdatedAt, Expr::value(now_timestamp()))
            .filter(Column::Id.eq(id))
            .filter(Column::Status.eq(expected.as_str()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn set_status_by_code(
        &self,
        code: &str,
        status: CopyStatus,
    ) -> Result<bool, DomainError> {
        let result = CopyEntity::update_many()
            .col_expr(Column::Status, Expr::value(status.as_str()))
            .col_expr(Column::UpdatedAt, Expr::value(now_timestamp()))
            .filter(Column::Code.eq(code))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = CopyEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Book"));
        }

        Ok(())
    }

    async fn delete_group(&self, group_id: &str) -> Result<u64, DomainError> {
        let result = CopyEntity::delete_many()
            .filter(Column::GroupId.eq(group_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn distinct_categories(&self) -> Result<Vec<String>, DomainError> {
        let rows: Vec<String> = CopyEntity::find()
            .select_only()
            .column(Column::Categories)
            .distinct()
            .into_tuple()
            .all(&self.db)
            .await?;

        let categories: BTreeSet<String> = rows
            .iter()
            .filter_map(|json| serde_json::from_str::<Vec<String>>(json).ok())
            .flatten()
            .collect();
        Ok(categories.into_iter().collect())
    }

    async fn distinct_companies(&self) -> Result<Vec<String>, DomainError> {
        let companies: Vec<String> = CopyEntity::find()
            .select_only()
            .column(Column::Company)
            .distinct()
            .order_by_asc(Column::Company)
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(companies)
    }
}
