//! Description to category rules used when summarizing bank transactions.

use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

/// Mapping entry exposed to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryMapping {
    pub id: Uuid,
    pub category_id: Uuid,
    pub transaction_name: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "category_transaction_mappings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub budget_id: Uuid,
    pub category_id: Uuid,
    pub transaction_name: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Categories,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CategoryMapping {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            category_id: model.category_id,
            transaction_name: model.transaction_name,
        }
    }
}
