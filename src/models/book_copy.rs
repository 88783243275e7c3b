use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::BookCopy;

/// One physical copy. Copies of the same title share `group_id` and carry a
/// duplicate of the group metadata.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "book_copies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub code: String,
    pub group_id: String,
    pub title: String,
    pub author: String,
    pub editorial: String,
    pub edition: String,
    pub categories: String, // JSON array
    pub cover_type: String,
    pub location: String,
    pub cost: f64,
    pub date_acquired: String,
    pub condition: String,
    pub observations: String,
    pub invoice_code: String,
    pub image_url: String,
    /// `available` or `borrowed`
    pub status: String,
    pub company: String,
    /// Cached size of the group, rewritten on every add/remove
    pub copies_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for BookCopy {
    fn from(model: Model) -> Self {
        let categories: Vec<String> = serde_json::from_str(&model.categories).unwrap_or_default();

        Self {
            id: model.id,
            code: model.code,
            group_id: model.group_id,
            title: model.title,
            author: model.author,
            editorial: model.editorial,
            edition: model.edition,
            categories,
            cover_type: model
                .cover_type
                .parse()
                .unwrap_or(crate::domain::CoverType::Soft),
            location: model.location,
            cost: model.cost,
            date_acquired: model.date_acquired,
            condition: model
                .condition
                .parse()
                .unwrap_or(crate::domain::Condition::Good),
            observations: model.observations,
            invoice_code: model.invoice_code,
            image_url: model.image_url,
            status: model
                .status
                .parse()
                .unwrap_or(crate::domain::CopyStatus::Available),
            company: model.company,
            copies_count: model.copies_count,
        }
    }
}
