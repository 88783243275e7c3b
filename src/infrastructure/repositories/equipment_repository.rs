//! SeaORM implementation of EquipmentRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::{DomainError, Equipment, EquipmentInput, EquipmentRepository};
use crate::models::equipment::{ActiveModel, Column, Entity as EquipmentEntity};
use crate::utils::dates::now_timestamp;

/// SeaORM-based implementation of EquipmentRepository
pub struct SeaOrmEquipmentRepository {
    db: DatabaseConnection,
}

impl SeaOrmEquipmentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EquipmentRepository for SeaOrmEquipmentRepository {
    async fn find_all(&self) -> Result<Vec<Equipment>, DomainError> {
        let items = EquipmentEntity::find()
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;
        Ok(items.into_iter().map(Equipment::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Equipment>, DomainError> {
        let item = EquipmentEntity::find_by_id(id).one(&self.db).await?;
        Ok(item.map(Equipment::from))
    }

    async fn code_exists(&self, code: &str) -> Result<bool, DomainError> {
        let count = EquipmentEntity::find()
            .filter(Column::Code.eq(code))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn create(
        &self,
        code: String,
        description: String,
        status: String,
        observations: String,
    ) -> Result<Equipment, DomainError> {
        let now = now_timestamp();

        let item = ActiveModel {
            code: Set(code),
            description: Set(description),
            status: Set(status),
            observations: Set(observations),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = item.insert(&self.db).await?;
        Ok(Equipment::from(result))
    }

    async fn update(&self, id: i32, input: EquipmentInput) -> Result<Equipment, DomainError> {
        let existing = EquipmentEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Equipment"))?;

        let mut active: ActiveModel = existing.into();

        if let Some(code) = input.code {
            active.code = Set(code);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        if let Some(observations) = input.observations {
            active.observations = Set(observations);
        }
        active.updated_at = Set(now_timestamp());

        let result = active.update(&self.db).await?;
        Ok(Equipment::from(result))
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = EquipmentEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Equipment"));
        }

        Ok(())
    }
}
