//! SeaORM implementation of UserRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use std::collections::HashMap;

use crate::domain::{DomainError, NewUser, User, UserRepository};
use crate::models::user::{ActiveModel, Column, Entity as UserEntity};
use crate::utils::dates::now_timestamp;

/// SeaORM-based implementation of UserRepository
pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let now = now_timestamp();

        let new_user = ActiveModel {
            username: Set(user.username),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            company: Set(user.company),
            role: Set(user.role),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = new_user.insert(&self.db).await?;
        Ok(User::from(result))
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<(User, String)>, DomainError> {
        let user = UserEntity::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(user.map(|u| {
            let hash = u.password_hash.clone();
            (User::from(u), hash)
        }))
    }

    async fn exists(&self, username: &str, email: &str) -> Result<bool, DomainError> {
        let count = UserEntity::find()
            .filter(
                Condition::any()
                    .add(Column::Username.eq(username))
                    .add(Column::Email.eq(email)),
            )
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn display_names(&self, ids: &[i32]) -> Result<HashMap<i32, String>, DomainError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = UserEntity::find()
            .filter(Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await?;

        Ok(users.into_iter().map(|u| (u.id, u.username)).collect())
    }
}
